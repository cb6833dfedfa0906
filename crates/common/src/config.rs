use crate::{
    error::CommonResult,
    pagination::{Sort, SortField, SortOrder},
};
use config::Config;
use doku::Document;
use serde::Deserialize;
use smart_default::SmartDefault;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Document, SmartDefault)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct JokeboxConfig {
    /// Where the backend can be reached
    pub api: JokeboxConfigApi,
    /// Defaults for the joke feed
    pub feed: JokeboxConfigFeed,
    pub auth: JokeboxConfigAuth,
}

impl JokeboxConfig {
    pub fn read() -> CommonResult<Self> {
        let config_file = if cfg!(test) {
            "../../config.toml"
        } else {
            "config.toml"
        };
        let config = Config::builder()
            .add_source(config::File::with_name(config_file).required(false))
            // Cant use _ as separator due to https://github.com/mehcode/config-rs/issues/391
            .add_source(config::Environment::with_prefix("JOKEBOX").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Document, SmartDefault)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct JokeboxConfigApi {
    /// Base url of the REST api, including the `/api` prefix
    #[default("http://localhost:9999/api")]
    #[doku(example = "http://localhost:9999/api")]
    pub base_url: String,
    /// Page on this client where OAuth providers send the user back to
    #[default("http://localhost:5173/auth/callback")]
    #[doku(example = "http://localhost:5173/auth/callback")]
    pub oauth_redirect_uri: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Document, SmartDefault)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct JokeboxConfigFeed {
    /// Number of jokes fetched per page
    #[default(10)]
    #[doku(example = "10")]
    pub page_size: u32,
    pub sort_field: SortField,
    pub order: SortOrder,
}

impl JokeboxConfigFeed {
    pub fn sort(&self) -> Sort {
        Sort {
            field: self.sort_field,
            order: self.order,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Document, SmartDefault)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct JokeboxConfigAuth {
    /// Bearer token from a previous login, used to restore the session
    #[default(None)]
    #[doku(example = "eyJhbGciOiJIUzI1NiJ9.eyJ1c2VyX2lkIjoxfQ.c2ln")]
    pub token: Option<String>,
}
