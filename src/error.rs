use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UmamiErrorCode {
    InvalidConfig,
    UtmFetchFailed,
}

impl UmamiErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UmamiErrorCode::InvalidConfig => "umami/invalid-config",
            UmamiErrorCode::UtmFetchFailed => "umami/utm-fetch-failed",
        }
    }
}

#[derive(Clone, Debug)]
pub struct UmamiError {
    pub code: UmamiErrorCode,
    message: String,
}

impl UmamiError {
    pub fn new(code: UmamiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl Display for UmamiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for UmamiError {}

pub type UmamiResult<T> = Result<T, UmamiError>;

pub fn invalid_config(message: impl Into<String>) -> UmamiError {
    UmamiError::new(UmamiErrorCode::InvalidConfig, message)
}

pub fn utm_fetch_failed(message: impl Into<String>) -> UmamiError {
    UmamiError::new(UmamiErrorCode::UtmFetchFailed, message)
}
