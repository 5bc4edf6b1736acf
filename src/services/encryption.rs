//! String encryption using AES-256-GCM
//!
//! Configuration payloads are encrypted at rest. The stored form is the
//! standard base64 encoding of `nonce (12 bytes) || ciphertext || tag (16 bytes)`,
//! with a fresh random nonce for every encryption.
//!
//! ## Configuration
//!
//! The key is loaded from `ODS_ADMIN_ENCRYPTION_KEY` (base64-encoded 32 bytes),
//! or from the `[encryption]` section of the settings file.
//!
//! ## Legacy payloads
//!
//! [`StringEncryptor::try_decrypt`] reports failure with `None` instead of an
//! error. Callers treat that as "this payload was never encrypted". A corrupted
//! ciphertext is indistinguishable from legacy plaintext.

use crate::config::EncryptionConfig;
use crate::errors::{Error, Result};
use base64::Engine;
use ring::aead::{self, Aad, BoundKey, Nonce, NonceSequence, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;
use tracing::{debug, error, instrument, trace};
use zeroize::Zeroizing;

/// Size of AES-256-GCM nonce in bytes
const NONCE_SIZE: usize = 12;

/// Size of AES-256-GCM tag in bytes
const TAG_SIZE: usize = 16;

/// Encrypts configuration text and attempts to decrypt stored payloads
pub trait StringEncryptor: Send + Sync {
    /// Encrypt plaintext into its stored string form
    fn encrypt(&self, plaintext: &str) -> Result<String>;

    /// Decrypt a stored payload, or `None` if it is not a valid ciphertext
    fn try_decrypt(&self, payload: &str) -> Option<String>;
}

/// Single-use nonce sequence for AES-GCM
struct SingleNonce {
    nonce: Option<[u8; NONCE_SIZE]>,
}

impl SingleNonce {
    fn new(nonce_bytes: [u8; NONCE_SIZE]) -> Self {
        Self {
            nonce: Some(nonce_bytes),
        }
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> std::result::Result<Nonce, ring::error::Unspecified> {
        self.nonce
            .take()
            .map(Nonce::assume_unique_for_key)
            .ok_or(ring::error::Unspecified)
    }
}

/// AES-256-GCM string encryptor
#[derive(Clone)]
pub struct AesGcmStringEncryptor {
    key_bytes: Arc<Zeroizing<[u8; 32]>>,
    key_version: String,
    rng: Arc<SystemRandom>,
}

impl AesGcmStringEncryptor {
    /// Create a new encryptor from configuration
    pub fn new(config: &EncryptionConfig) -> Result<Self> {
        let key_bytes = config.key_bytes()?;

        let mut key_array = Zeroizing::new([0u8; 32]);
        key_array.copy_from_slice(&key_bytes);

        debug!(key_version = %config.key_version, "String encryptor initialized");

        Ok(Self {
            key_bytes: Arc::new(key_array),
            key_version: config.key_version.clone(),
            rng: Arc::new(SystemRandom::new()),
        })
    }

    /// Generate a new random key, base64-encoded
    pub fn generate_key() -> Result<String> {
        let mut key = Zeroizing::new([0u8; 32]);
        SystemRandom::new()
            .fill(key.as_mut_slice())
            .map_err(|_| Error::encryption("Failed to generate random key"))?;
        Ok(base64::engine::general_purpose::STANDARD.encode(&key[..]))
    }

    /// Get the current key version
    pub fn key_version(&self) -> &str {
        &self.key_version
    }

    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        self.rng.fill(&mut nonce_bytes).map_err(|_| {
            error!("Failed to generate random nonce");
            Error::encryption("Failed to generate random nonce for encryption")
        })?;

        let unbound_key = UnboundKey::new(&AES_256_GCM, &self.key_bytes[..]).map_err(|_| {
            error!("Failed to create encryption key");
            Error::encryption("Failed to create encryption key")
        })?;

        let mut sealing_key = aead::SealingKey::new(unbound_key, SingleNonce::new(nonce_bytes));

        let mut sealed = plaintext.to_vec();
        sealed.reserve(TAG_SIZE);

        sealing_key
            .seal_in_place_append_tag(Aad::empty(), &mut sealed)
            .map_err(|_| {
                error!("Encryption failed");
                Error::encryption("Failed to encrypt configuration payload")
            })?;

        let mut output = Vec::with_capacity(NONCE_SIZE + sealed.len());
        output.extend_from_slice(&nonce_bytes);
        output.extend_from_slice(&sealed);
        Ok(output)
    }

    fn open(&self, payload: &[u8]) -> Option<Vec<u8>> {
        if payload.len() < NONCE_SIZE + TAG_SIZE {
            return None;
        }

        let (nonce, ciphertext) = payload.split_at(NONCE_SIZE);
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        nonce_bytes.copy_from_slice(nonce);

        let unbound_key = UnboundKey::new(&AES_256_GCM, &self.key_bytes[..]).ok()?;
        let mut opening_key = aead::OpeningKey::new(unbound_key, SingleNonce::new(nonce_bytes));

        let mut buffer = ciphertext.to_vec();
        let decrypted = opening_key.open_in_place(Aad::empty(), &mut buffer).ok()?;
        Some(decrypted.to_vec())
    }
}

impl StringEncryptor for AesGcmStringEncryptor {
    #[instrument(skip(self, plaintext), fields(plaintext_len = plaintext.len()))]
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let sealed = self.seal(plaintext.as_bytes())?;
        debug!(sealed_len = sealed.len(), "Encrypted configuration payload");
        Ok(base64::engine::general_purpose::STANDARD.encode(sealed))
    }

    #[instrument(skip(self, payload), fields(payload_len = payload.len()))]
    fn try_decrypt(&self, payload: &str) -> Option<String> {
        let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(payload.trim()) else {
            trace!("Payload is not base64");
            return None;
        };

        let Some(plaintext) = self.open(&bytes) else {
            trace!("Payload did not authenticate");
            return None;
        };

        match String::from_utf8(plaintext) {
            Ok(text) => Some(text),
            Err(_) => {
                trace!("Decrypted payload is not UTF-8");
                None
            }
        }
    }
}

impl std::fmt::Debug for AesGcmStringEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmStringEncryptor")
            .field("key_version", &self.key_version)
            .field("key_bytes", &"[REDACTED]")
            .finish()
    }
}
