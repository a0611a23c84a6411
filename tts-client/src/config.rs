use serde::{Deserialize, Serialize};

/// Provider-specific configuration
///
/// Embedded by the application config as its `[provider]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (optional, can use env var instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OAuth access token, used when no API key is available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Custom base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_provider_config() {
        let config = ProviderConfig::default();
        assert!(config.api_key.is_none());
        assert!(config.access_token.is_none());
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let config: ProviderConfig = serde_json::from_value(serde_json::json!({
            "api_key": "abc",
            "base_url": "http://localhost:8080"
        }))
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_unset_fields_not_serialized() {
        let value = serde_json::to_value(ProviderConfig::default()).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }
}
