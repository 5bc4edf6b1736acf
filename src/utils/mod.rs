//! Utility functions and helpers

pub mod ms_date;

use serde::{Deserialize, Deserializer};

/// Mask a secret for display, keeping at most the first four characters
pub fn mask_secret(value: &str) -> String {
    if value.chars().count() <= 4 {
        return "****".to_string();
    }
    let visible: String = value.chars().take(4).collect();
    format!("{}****", visible)
}

/// Deserialize a value that may be `null`, using the type's default for `null`
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Login {
        #[serde(default, deserialize_with = "null_as_default")]
        name: String,
    }

    #[test]
    fn test_null_as_default() {
        let login: Login = serde_json::from_str(r#"{"name":null}"#).unwrap();
        assert_eq!(login.name, "");
        let login: Login = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(login.name, "");
        let login: Login = serde_json::from_str(r#"{"name":"sa"}"#).unwrap();
        assert_eq!(login.name, "sa");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret("adminPassword"), "admi****");
        assert_eq!(mask_secret(""), "****");
    }
}
