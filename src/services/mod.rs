//! Services used by the configuration provider

pub mod encryption;

pub use encryption::{AesGcmStringEncryptor, StringEncryptor};
