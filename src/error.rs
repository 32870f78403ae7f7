use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Argument error: {0}")]
    Argument(String),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request error: {0}")]
    Request(#[from] rquest::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl AppError {
    /// Status code of the failed response, when the failure was a non-200.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AppError::Client(ClientError::ResponseError { status_code, .. }) => Some(*status_code),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required configuration: {0}")]
    MissingField(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to build client: {0}")]
    BuildError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Response error {status_code}")]
    ResponseError { status_code: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Selector error: {0}")]
    SelectorError(String),

    #[error("Missing element: {0}")]
    MissingElement(&'static str),

    #[error("Missing attribute {attribute} on {element}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("No digits in {field}: {text:?}")]
    NoDigits { field: &'static str, text: String },
}

pub type Result<T> = std::result::Result<T, AppError>;
