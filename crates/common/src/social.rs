//! Votes and emoji reactions on jokes and comments.
//!
//! Everything in here is a pure computation over the locally displayed state. Callers apply the
//! result right away and only then send the corresponding request to the backend.

use crate::utils::null_as_default;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    error::Error,
    fmt::{Display, Formatter},
    str::FromStr,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Laugh,
    Heart,
    Neutral,
    Surprised,
    Fire,
    Poop,
    Angry,
    Monkey,
    ThumbsUp,
    ThumbsDown,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 10] = [
        ReactionKind::Laugh,
        ReactionKind::Heart,
        ReactionKind::Neutral,
        ReactionKind::Surprised,
        ReactionKind::Fire,
        ReactionKind::Poop,
        ReactionKind::Angry,
        ReactionKind::Monkey,
        ReactionKind::ThumbsUp,
        ReactionKind::ThumbsDown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Laugh => "laugh",
            ReactionKind::Heart => "heart",
            ReactionKind::Neutral => "neutral",
            ReactionKind::Surprised => "surprised",
            ReactionKind::Fire => "fire",
            ReactionKind::Poop => "poop",
            ReactionKind::Angry => "angry",
            ReactionKind::Monkey => "monkey",
            ReactionKind::ThumbsUp => "thumbs_up",
            ReactionKind::ThumbsDown => "thumbs_down",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ReactionKind::Laugh => "😂",
            ReactionKind::Heart => "❤️",
            ReactionKind::Neutral => "😐",
            ReactionKind::Surprised => "😲",
            ReactionKind::Fire => "🔥",
            ReactionKind::Poop => "💩",
            ReactionKind::Angry => "😡",
            ReactionKind::Monkey => "🙈",
            ReactionKind::ThumbsUp => "👍",
            ReactionKind::ThumbsDown => "👎",
        }
    }
}

impl Display for ReactionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReactionKind(pub String);

impl Display for UnknownReactionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown reaction kind {}", self.0)
    }
}

impl Error for UnknownReactionKind {}

impl FromStr for ReactionKind {
    type Err = UnknownReactionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReactionKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownReactionKind(s.to_string()))
    }
}

/// Number of reactions per kind on a single joke or comment. Kinds with a count of zero are
/// removed instead of being stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReactionCounts(BTreeMap<ReactionKind, i64>);

impl ReactionCounts {
    pub fn get(&self, kind: ReactionKind) -> i64 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn contains(&self, kind: ReactionKind) -> bool {
        self.0.contains_key(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ReactionKind, i64)> + '_ {
        self.0.iter().map(|(k, c)| (*k, *c))
    }
}

impl FromIterator<(ReactionKind, i64)> for ReactionCounts {
    fn from_iter<I: IntoIterator<Item = (ReactionKind, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for ReactionCounts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<HashMap<String, i64>>::deserialize(deserializer)?.unwrap_or_default();
        let mut counts = BTreeMap::new();
        for (name, count) in raw {
            match name.parse::<ReactionKind>() {
                Ok(kind) if count > 0 => {
                    counts.insert(kind, count);
                }
                Ok(_) => {}
                Err(e) => warn!("Ignoring reaction count: {e}"),
            }
        }
        Ok(Self(counts))
    }
}

fn reaction_set<'de, D>(deserializer: D) -> Result<BTreeSet<ReactionKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|name| match name.parse() {
            Ok(kind) => Some(kind),
            Err(e) => {
                warn!("Ignoring own reaction: {e}");
                None
            }
        })
        .collect())
}

/// The vote which the current viewer has cast on an entity. No vote is `""` on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    #[default]
    #[serde(rename = "", alias = "none")]
    None,
    Plus,
    Minus,
}

/// A click on one of the vote buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Plus,
    Minus,
}

impl Vote {
    fn weight(&self) -> i64 {
        match self {
            Vote::Plus => 1,
            Vote::Minus => -1,
        }
    }
}

impl From<Vote> for VoteType {
    fn from(value: Vote) -> Self {
        match value {
            Vote::Plus => VoteType::Plus,
            Vote::Minus => VoteType::Minus,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteOutcome {
    pub vote_type: VoteType,
    pub score: i64,
}

/// Voting again with the same button retracts the vote, voting with the opposite button swings
/// the score by two.
pub fn apply_vote(current: VoteType, score: i64, requested: Vote) -> VoteOutcome {
    let requested_type = VoteType::from(requested);
    let (vote_type, delta) = if current == VoteType::None {
        (requested_type, requested.weight())
    } else if current == requested_type {
        (VoteType::None, -requested.weight())
    } else {
        (requested_type, 2 * requested.weight())
    };
    VoteOutcome {
        vote_type,
        score: score + delta,
    }
}

/// Toggles `kind` for the viewer. Unlike votes any number of kinds can be active at once.
pub fn apply_reaction(
    counts: &ReactionCounts,
    own: &BTreeSet<ReactionKind>,
    kind: ReactionKind,
) -> (ReactionCounts, BTreeSet<ReactionKind>) {
    let mut counts = counts.clone();
    let mut own = own.clone();
    if own.remove(&kind) {
        let count = (counts.0.get(&kind).copied().unwrap_or(1) - 1).max(0);
        if count == 0 {
            counts.0.remove(&kind);
        } else {
            counts.0.insert(kind, count);
        }
    } else {
        *counts.0.entry(kind).or_insert(0) += 1;
        own.insert(kind);
    }
    (counts, own)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionEntry {
    pub kind: ReactionKind,
    pub emoji: &'static str,
    pub count: i64,
    /// The viewer has applied this reaction
    pub active: bool,
}

/// Reactions in the order they are shown: most used first, equal counts in the order of
/// [ReactionKind::ALL]. Kinds without any reactions are left out.
pub fn reaction_display(
    counts: &ReactionCounts,
    own: &BTreeSet<ReactionKind>,
) -> Vec<ReactionEntry> {
    let mut entries: Vec<_> = counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(kind, count)| ReactionEntry {
            kind,
            emoji: kind.emoji(),
            count,
            active: own.contains(&kind),
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerInteraction {
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_type: VoteType,
    #[serde(default, deserialize_with = "reaction_set")]
    pub reactions: BTreeSet<ReactionKind>,
}

/// Votes and reactions embedded in every joke and comment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialAggregate {
    #[serde(default)]
    pub pluses: i64,
    #[serde(default)]
    pub minuses: i64,
    #[serde(default)]
    pub reactions: ReactionCounts,
    /// Missing for anonymous viewers
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: ViewerInteraction,
}

impl SocialAggregate {
    pub fn score(&self) -> i64 {
        self.pluses - self.minuses
    }

    /// Applies the vote locally, keeping the plus and minus tallies in line with the new score.
    pub fn apply_vote(&mut self, vote: Vote) -> VoteOutcome {
        let outcome = apply_vote(self.user.vote_type, self.score(), vote);
        match self.user.vote_type {
            VoteType::Plus => self.pluses -= 1,
            VoteType::Minus => self.minuses -= 1,
            VoteType::None => {}
        }
        match outcome.vote_type {
            VoteType::Plus => self.pluses += 1,
            VoteType::Minus => self.minuses += 1,
            VoteType::None => {}
        }
        self.user.vote_type = outcome.vote_type;
        outcome
    }

    pub fn apply_reaction(&mut self, kind: ReactionKind) {
        let (counts, own) = apply_reaction(&self.reactions, &self.user.reactions, kind);
        self.reactions = counts;
        self.user.reactions = own;
    }

    pub fn reaction_display(&self) -> Vec<ReactionEntry> {
        reaction_display(&self.reactions, &self.user.reactions)
    }
}
