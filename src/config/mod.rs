use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_secret, validate_url, Validate,
};
use std::time::Duration;

pub const DEFAULT_PORT_BASE_URL: &str = "https://api.getport.io/v1";
pub const DEFAULT_CHECKMARX_IAM_URL: &str = "https://deu.iam.checkmarx.net";
pub const DEFAULT_CHECKMARX_TENANT: &str = "port-nfr";
pub const DEFAULT_BLUEPRINT: &str = "checkMarxProject";
pub const DEFAULT_SERVICE_BLUEPRINT: &str = "service";
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct PortConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub blueprint: String,
    pub service_blueprint: String,
}

#[derive(Clone)]
pub struct CheckmarxConfig {
    pub base_url: String,
    pub api_key: String,
    pub iam_url: String,
    pub tenant: String,
    pub page_size: usize,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub port: PortConfig,
    pub checkmarx: CheckmarxConfig,
    pub http_timeout: Duration,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 從任意來源讀取設定，測試時不必修改行程環境變數
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| SyncError::MissingConfigError {
                field: key.to_string(),
            })
        };
        let optional = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let port = PortConfig {
            base_url: optional("PORT_BASE_URL", DEFAULT_PORT_BASE_URL),
            client_id: required("PORT_CLIENT_ID")?,
            client_secret: required("PORT_CLIENT_SECRET")?,
            blueprint: optional("PORT_BLUEPRINT", DEFAULT_BLUEPRINT),
            service_blueprint: optional("PORT_SERVICE_BLUEPRINT", DEFAULT_SERVICE_BLUEPRINT),
        };

        let checkmarx = CheckmarxConfig {
            base_url: required("CHECKMARX_BASE_URL")?,
            api_key: required("CHECKMARX_API_KEY")?,
            iam_url: optional("CHECKMARX_IAM_URL", DEFAULT_CHECKMARX_IAM_URL),
            tenant: optional("CHECKMARX_TENANT", DEFAULT_CHECKMARX_TENANT),
            page_size: parse_number("CHECKMARX_PAGE_SIZE", get("CHECKMARX_PAGE_SIZE"))?
                .unwrap_or(DEFAULT_PAGE_SIZE),
        };

        let timeout_secs = parse_number("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"))?
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        Ok(Self {
            port,
            checkmarx,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, raw: Option<String>) -> Result<Option<T>> {
    raw.map(|value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|_| SyncError::InvalidConfigValueError {
                field: field.to_string(),
                value: value.clone(),
                reason: "Value must be a positive integer".to_string(),
            })
    })
    .transpose()
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        validate_url("PORT_BASE_URL", &self.port.base_url)?;
        validate_non_empty_string("PORT_CLIENT_ID", &self.port.client_id)?;
        validate_secret("PORT_CLIENT_SECRET", &self.port.client_secret)?;
        validate_non_empty_string("PORT_BLUEPRINT", &self.port.blueprint)?;
        validate_non_empty_string("PORT_SERVICE_BLUEPRINT", &self.port.service_blueprint)?;

        validate_url("CHECKMARX_BASE_URL", &self.checkmarx.base_url)?;
        validate_secret("CHECKMARX_API_KEY", &self.checkmarx.api_key)?;
        validate_url("CHECKMARX_IAM_URL", &self.checkmarx.iam_url)?;
        validate_non_empty_string("CHECKMARX_TENANT", &self.checkmarx.tenant)?;
        validate_range("CHECKMARX_PAGE_SIZE", self.checkmarx.page_size, 1, 1000)?;

        validate_range("HTTP_TIMEOUT_SECS", self.http_timeout.as_secs(), 1, 600)?;

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}

impl std::fmt::Debug for PortConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("blueprint", &self.blueprint)
            .field("service_blueprint", &self.service_blueprint)
            .finish()
    }
}

impl std::fmt::Debug for CheckmarxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckmarxConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("iam_url", &self.iam_url)
            .field("tenant", &self.tenant)
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn required_env() -> HashMap<String, String> {
        env(&[
            ("PORT_CLIENT_ID", "port-id"),
            ("PORT_CLIENT_SECRET", "port-secret"),
            ("CHECKMARX_BASE_URL", "https://eu.ast.checkmarx.net"),
            ("CHECKMARX_API_KEY", "cx-api-key"),
        ])
    }

    #[test]
    fn test_defaults_applied() {
        let vars = required_env();
        let config = SyncConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.port.base_url, DEFAULT_PORT_BASE_URL);
        assert_eq!(config.port.blueprint, "checkMarxProject");
        assert_eq!(config.port.service_blueprint, "service");
        assert_eq!(config.checkmarx.iam_url, DEFAULT_CHECKMARX_IAM_URL);
        assert_eq!(config.checkmarx.tenant, "port-nfr");
        assert_eq!(config.checkmarx.page_size, 100);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_required_variable() {
        let mut vars = required_env();
        vars.remove("CHECKMARX_API_KEY");

        let err = SyncConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        match err {
            SyncError::MissingConfigError { field } => assert_eq!(field, "CHECKMARX_API_KEY"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blank_variable_counts_as_missing() {
        let mut vars = required_env();
        vars.insert("PORT_CLIENT_ID".to_string(), "   ".to_string());

        let err = SyncConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, SyncError::MissingConfigError { ref field } if field == "PORT_CLIENT_ID"));
    }

    #[test]
    fn test_invalid_page_size() {
        let mut vars = required_env();
        vars.insert("CHECKMARX_PAGE_SIZE".to_string(), "lots".to_string());
        assert!(SyncConfig::from_lookup(|k| vars.get(k).cloned()).is_err());

        vars.insert("CHECKMARX_PAGE_SIZE".to_string(), "5000".to_string());
        let config = SyncConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut vars = required_env();
        vars.insert("CHECKMARX_BASE_URL".to_string(), "eu.ast.checkmarx.net".to_string());

        let config = SyncConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let vars = required_env();
        let config = SyncConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        let rendered = format!("{:?}", config);

        assert!(rendered.contains("port-id"));
        assert!(!rendered.contains("port-secret"));
        assert!(!rendered.contains("cx-api-key"));
    }
}
