//! Domain layer
//!
//! Configuration shapes and identifiers, free of storage and caching concerns.

pub mod configuration;
pub mod id;

pub use configuration::{
    BulkUploadCredential, LearningStandardsCredential, OdsApiCredential, OdsSecretConfiguration,
    OdsSqlConfiguration, SqlCredential,
};
pub use id::InstanceRegistrationId;
