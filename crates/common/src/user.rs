use crate::{comment::Comment, joke::Joke, newtypes::UserId};
use base64::{
    engine::{general_purpose::GeneralPurpose, DecodePaddingMode, GeneralPurposeConfig},
    Engine,
};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

/// Accepts the payload segment with or without trailing `=`.
const TOKEN_PAYLOAD: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims inside the payload of the bearer token issued by the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub user_id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Unix timestamp
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Reads the claims without verifying the signature, which only the backend can do.
    pub fn decode(token: &str) -> Option<Self> {
        let mut segments = token.trim().split('.');
        let payload = match (segments.next(), segments.next()) {
            (Some(_), Some(payload)) => payload,
            _ => {
                debug!("Token has no payload segment");
                return None;
            }
        };
        let bytes = TOKEN_PAYLOAD
            .decode(payload)
            .map_err(|e| debug!("Failed to decode token payload: {e}"))
            .ok()?;
        serde_json::from_slice(&bytes)
            .map_err(|e| debug!("Failed to parse token claims: {e}"))
            .ok()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| exp <= now.timestamp())
    }
}

/// Who is looking at the site. Anonymous viewers have no identity at all.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: UserId,
    pub username: String,
    pub is_admin: bool,
}

impl UserIdentity {
    /// A missing, malformed or otherwise unreadable token means anonymous, never an error.
    pub fn from_token(token: &str) -> Option<Self> {
        TokenClaims::decode(token).map(Self::from)
    }

    pub fn can_delete_comment(&self, comment: &Comment) -> bool {
        !comment.is_deleted && (self.is_admin || comment.author_id == self.user_id)
    }

    pub fn can_delete_joke(&self, joke: &Joke) -> bool {
        joke.author_id == self.user_id
    }

    pub fn is_author_of(&self, comment: &Comment) -> bool {
        comment.author_id == self.user_id
    }
}

impl From<TokenClaims> for UserIdentity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

/// Replying, voting and reacting all require a logged in viewer.
pub fn can_interact(identity: Option<&UserIdentity>) -> bool {
    identity.is_some()
}
