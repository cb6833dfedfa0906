use crate::{
    comment::Comment,
    newtypes::{JokeId, UserId},
    social::SocialAggregate,
    utils::null_as_default,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Joke {
    pub id: JokeId,
    #[serde(default)]
    pub title: String,
    /// Rich text as html
    pub body: String,
    pub author_id: UserId,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub social: SocialAggregate,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct JokeWithComments {
    pub joke: Joke,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: Vec<Comment>,
}
