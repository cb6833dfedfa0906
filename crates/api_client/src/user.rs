use super::ApiClient;
use crate::{
    errors::{FrontendError, FrontendResult},
    session::Session,
};
use chrono::Utc;
use jokebox_common::{
    user::UserIdentity,
    validation::{validate_registration, RegistrationErrors},
    TokenResponse,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use url::Url;

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct RegisterParams {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct LoginParams {
    pub email: String,
    pub password: String,
}

/// Registration fails either locally, with messages for each form field, or on the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterError {
    Validation(RegistrationErrors),
    Request(FrontendError),
}

impl Display for RegisterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegisterError::Validation(e) => write!(f, "{e}"),
            RegisterError::Request(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RegisterError {}

impl From<FrontendError> for RegisterError {
    fn from(value: FrontendError) -> Self {
        Self::Request(value)
    }
}

impl From<RegistrationErrors> for RegisterError {
    fn from(value: RegistrationErrors) -> Self {
        Self::Validation(value)
    }
}

impl ApiClient {
    /// Validates the form before anything is sent. Logs the new user in on success.
    pub async fn register(&self, params: RegisterParams) -> Result<UserIdentity, RegisterError> {
        validate_registration(&params.username, &params.email, &params.password)?;
        let res: TokenResponse = self.post("auth/register", Some(&params)).await?;
        Ok(self.start_session(&res.token)?)
    }

    pub async fn login(&self, params: LoginParams) -> FrontendResult<UserIdentity> {
        let res: TokenResponse = self.post("auth/login", Some(&params)).await?;
        self.start_session(&res.token)
    }

    /// Where to send the user for logging in with an external provider. The provider
    /// redirects back to `redirect_uri` with a `token` parameter, see [Self::complete_oauth].
    pub fn oauth_login_url(&self, provider: &str, redirect_uri: &str) -> FrontendResult<Url> {
        let mut url = Url::parse(&self.request_endpoint(&format!("auth/{provider}/login")))?;
        url.query_pairs_mut()
            .append_pair("redirect_uri", redirect_uri);
        Ok(url)
    }

    pub fn complete_oauth(&self, callback: &Url) -> FrontendResult<UserIdentity> {
        let session = Session::from_oauth_callback(callback, Utc::now());
        let identity = session
            .identity()
            .cloned()
            .ok_or_else(|| FrontendError::new("OAuth login failed"))?;
        self.set_session(session);
        Ok(identity)
    }

    /// Only forgets the token, the backend keeps no session state.
    pub fn logout(&self) {
        if let Some(identity) = self.identity() {
            info!("Logging out {}", identity.username);
        }
        self.set_session(Session::anonymous());
    }

    fn start_session(&self, token: &str) -> FrontendResult<UserIdentity> {
        let session = Session::restore(token, Utc::now());
        let identity = session
            .identity()
            .cloned()
            .ok_or_else(|| FrontendError::new("Received invalid token from backend"))?;
        info!("Logged in as {}", identity.username);
        self.set_session(session);
        Ok(identity)
    }
}
