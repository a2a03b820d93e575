use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing configuration: {field} is required")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{service} authentication failed with status {status}: {body}")]
    AuthError {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{operation} failed with status {status}")]
    UnexpectedStatus {
        operation: String,
        status: StatusCode,
        body: String,
    },

    #[error("{service} client used before authentication")]
    NotAuthenticated { service: &'static str },
}

pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    /// 遠端回應的原始內容（若有）
    pub fn response_body(&self) -> Option<&str> {
        match self {
            SyncError::AuthError { body, .. } | SyncError::UnexpectedStatus { body, .. }
                if !body.is_empty() =>
            {
                Some(body.as_str())
            }
            _ => None,
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::MissingConfigError { .. } | SyncError::InvalidConfigValueError { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SyncError::MissingConfigError { .. } => {
                "Export PORT_CLIENT_ID, PORT_CLIENT_SECRET, CHECKMARX_BASE_URL and CHECKMARX_API_KEY"
            }
            SyncError::InvalidConfigValueError { .. } => {
                "Check the environment variable named in the error"
            }
            SyncError::AuthError { .. } => {
                "Verify the credentials and, for Checkmarx, the IAM URL and tenant"
            }
            SyncError::UnexpectedStatus { status, .. } if status.is_server_error() => {
                "The remote service is failing; try again later"
            }
            SyncError::UnexpectedStatus { .. } => {
                "Inspect the response body; the request was rejected by the remote service"
            }
            SyncError::ApiError(_) => "Check network connectivity and the configured base URLs",
            SyncError::SerializationError(_) => {
                "The remote service returned an unexpected payload shape"
            }
            SyncError::NotAuthenticated { .. } => "Authenticate the client before calling it",
        }
    }

    /// 依錯誤類型決定退出碼
    pub fn exit_code(&self) -> i32 {
        match self {
            e if e.is_config_error() => 2,
            SyncError::AuthError { .. } => 3,
            _ => 1,
        }
    }
}
