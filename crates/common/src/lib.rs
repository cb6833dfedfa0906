pub mod admin;
pub mod comment;
#[cfg(not(target_family = "wasm"))]
pub mod config;
pub mod error;
pub mod joke;
pub mod newtypes;
pub mod pagination;
pub mod social;
pub mod thread;
pub mod user;
pub mod utils;
pub mod validation;

use serde::{Deserialize, Serialize};

pub static AUTH_HEADER_SCHEME: &str = "Bearer";

/// Returned by the backend on login and registration.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct TokenResponse {
    pub token: String,
}

/// Which kind of entity a vote or reaction is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Joke,
    Comment,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Joke => "joke",
            EntityType::Comment => "comment",
        }
    }
}

/// Returned by the backend when a joke or comment was created.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreatedResponse<I> {
    pub id: I,
}
