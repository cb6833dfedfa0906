use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(
    Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

#[derive(
    Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct JokeId(pub i64);

#[derive(
    Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CommentId(pub i64);

#[derive(
    Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ModerationLogId(pub i64);

impl CommentId {
    /// Ids handed out for comments which were not yet confirmed by the backend are negative.
    pub fn is_transient(&self) -> bool {
        self.0 < 0
    }
}

macro_rules! display_inner {
    ($($t:ty),*) => {
        $(impl Display for $t {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        })*
    };
}

display_inner!(UserId, JokeId, CommentId, ModerationLogId);
