use chrono::{DateTime, Utc};
use jokebox_common::user::{TokenClaims, UserIdentity};
use log::{info, warn};
use url::Url;

/// Login state of the current viewer.
///
/// Restored once on startup from a stored token and cleared again on logout. Pure logic never
/// reads the session itself, callers pass the identity along explicitly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    identity: Option<UserIdentity>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Tokens which cant be decoded or which are already expired result in an anonymous session.
    pub fn restore(token: &str, now: DateTime<Utc>) -> Self {
        let Some(claims) = TokenClaims::decode(token) else {
            warn!("Discarding unreadable token");
            return Self::anonymous();
        };
        if claims.is_expired(now) {
            info!("Token for {} has expired", claims.username);
            return Self::anonymous();
        }
        Self {
            token: Some(token.trim().to_string()),
            identity: Some(claims.into()),
        }
    }

    /// The backend sends the user back to the redirect uri with the token as query parameter.
    pub fn from_oauth_callback(callback: &Url, now: DateTime<Utc>) -> Self {
        match callback.query_pairs().find(|(k, _)| k == "token") {
            Some((_, token)) => Self::restore(&token, now),
            None => {
                warn!("OAuth callback without token: {callback}");
                Self::anonymous()
            }
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn identity(&self) -> Option<&UserIdentity> {
        self.identity.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn logout(&mut self) {
        *self = Self::anonymous();
    }
}
