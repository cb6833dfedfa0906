use jokebox_common::admin::AccessDenied;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt::Display};

pub type FrontendResult<T> = Result<T, FrontendError>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrontendError(String);

impl FrontendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn not_logged_in() -> Self {
        Self::new("Login required")
    }

    pub fn message(self) -> String {
        self.0
    }
}

impl Display for FrontendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for FrontendError {}

#[cfg(not(target_family = "wasm"))]
impl From<reqwest::Error> for FrontendError {
    fn from(value: reqwest::Error) -> Self {
        Self(value.to_string())
    }
}

#[cfg(target_family = "wasm")]
impl From<gloo_net::Error> for FrontendError {
    fn from(value: gloo_net::Error) -> Self {
        Self(value.to_string())
    }
}

impl From<url::ParseError> for FrontendError {
    fn from(value: url::ParseError) -> Self {
        Self(value.to_string())
    }
}

impl From<serde_urlencoded::ser::Error> for FrontendError {
    fn from(value: serde_urlencoded::ser::Error) -> Self {
        Self(value.to_string())
    }
}

impl From<serde_json::Error> for FrontendError {
    fn from(value: serde_json::Error) -> Self {
        Self(value.to_string())
    }
}

impl From<AccessDenied> for FrontendError {
    fn from(value: AccessDenied) -> Self {
        Self(value.to_string())
    }
}
