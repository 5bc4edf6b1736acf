//! Stored payload decoding.
//!
//! Stored text is either ciphertext produced by the configured encryptor or
//! unencrypted JSON left behind by older deployments. A payload that fails to
//! decrypt is taken to be the latter.

use crate::errors::{Error, Result};
use crate::services::StringEncryptor;
use serde::de::DeserializeOwned;

/// Stored text after the decrypt attempt
#[derive(Clone, PartialEq, Eq)]
pub enum ConfigurationPayload {
    /// Decrypted from ciphertext
    Decrypted(String),
    /// Stored without encryption
    Plaintext(String),
}

impl ConfigurationPayload {
    /// Decrypt `raw`, or pass it through unchanged when it is not ciphertext
    pub fn resolve(raw: &str, encryptor: &dyn StringEncryptor) -> Self {
        match encryptor.try_decrypt(raw) {
            Some(json) => Self::Decrypted(json),
            None => Self::Plaintext(raw.to_string()),
        }
    }

    pub fn is_plaintext(&self) -> bool {
        matches!(self, Self::Plaintext(_))
    }

    pub fn as_json(&self) -> &str {
        match self {
            Self::Decrypted(json) | Self::Plaintext(json) => json,
        }
    }

    /// Parse the JSON into a configuration type
    pub fn parse<T: DeserializeOwned>(&self, what: &str) -> Result<T> {
        serde_json::from_str(self.as_json()).map_err(|e| {
            let origin = if self.is_plaintext() { "unencrypted" } else { "decrypted" };
            Error::serialization(e, format!("Failed to parse {} {}", origin, what))
        })
    }
}

// Payload text is secret material
impl std::fmt::Debug for ConfigurationPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (variant, len) = match self {
            Self::Decrypted(json) => ("Decrypted", json.len()),
            Self::Plaintext(json) => ("Plaintext", json.len()),
        };
        f.debug_struct(variant).field("len", &len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncryptionConfig;
    use crate::domain::OdsSecretConfiguration;
    use crate::services::AesGcmStringEncryptor;

    fn encryptor() -> AesGcmStringEncryptor {
        AesGcmStringEncryptor::new(&EncryptionConfig::for_testing()).unwrap()
    }

    #[test]
    fn test_resolve_ciphertext() {
        let encryptor = encryptor();
        let sealed = encryptor.encrypt(r#"{"OdsApiCredential":null}"#).unwrap();

        let payload = ConfigurationPayload::resolve(&sealed, &encryptor);

        assert_eq!(
            payload,
            ConfigurationPayload::Decrypted(r#"{"OdsApiCredential":null}"#.into())
        );
    }

    #[test]
    fn test_resolve_plaintext() {
        let payload = ConfigurationPayload::resolve("{}", &encryptor());
        assert!(payload.is_plaintext());

        let config: OdsSecretConfiguration = payload.parse("secret configuration").unwrap();
        assert_eq!(config, OdsSecretConfiguration::default());
    }

    #[test]
    fn test_parse_failure_is_format_error() {
        let payload = ConfigurationPayload::resolve("not json at all", &encryptor());

        let err = payload
            .parse::<OdsSecretConfiguration>("secret configuration")
            .unwrap_err();

        assert!(err.is_format());
        assert!(err.to_string().contains("unencrypted secret configuration"));
    }

    #[test]
    fn test_debug_hides_contents() {
        let payload = ConfigurationPayload::Plaintext(r#"{"Password":"hunter2"}"#.into());
        assert!(!format!("{:?}", payload).contains("hunter2"));
    }
}
