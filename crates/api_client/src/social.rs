use super::ApiClient;
use crate::errors::{FrontendError, FrontendResult};
use jokebox_common::{
    newtypes::{CommentId, JokeId},
    social::{ReactionKind, SocialAggregate, Vote, VoteOutcome, VoteType},
    EntityType,
};
use log::warn;
use serde::{de::IgnoredAny, Deserialize, Serialize};
use std::fmt::Display;

/// The entity a vote or reaction is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SocialTarget {
    Joke(JokeId),
    Comment(CommentId),
}

impl SocialTarget {
    pub fn entity_type(&self) -> EntityType {
        match self {
            SocialTarget::Joke(_) => EntityType::Joke,
            SocialTarget::Comment(_) => EntityType::Comment,
        }
    }

    pub fn entity_id(&self) -> i64 {
        match self {
            SocialTarget::Joke(id) => id.0,
            SocialTarget::Comment(id) => id.0,
        }
    }
}

impl Display for SocialTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.entity_type().as_str(), self.entity_id())
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct VoteParams {
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub vote_type: VoteType,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ReactParams {
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub reaction_type: ReactionKind,
}

/// Result of a change which was applied locally before it was sent.
#[derive(Debug)]
pub struct OptimisticUpdate<T> {
    pub local: T,
    /// Failures are not rolled back, the local state stays as it is.
    pub dispatch: FrontendResult<()>,
}

impl<T> OptimisticUpdate<T> {
    pub fn is_synced(&self) -> bool {
        self.dispatch.is_ok()
    }
}

impl ApiClient {
    /// Stores `vote_type` as the viewer's vote on `target`, [VoteType::None] removes it.
    pub async fn send_vote(&self, target: SocialTarget, vote_type: VoteType) -> FrontendResult<()> {
        let params = VoteParams {
            entity_type: target.entity_type(),
            entity_id: target.entity_id(),
            vote_type,
        };
        let _: IgnoredAny = self.post("jokes/vote", Some(&params)).await?;
        Ok(())
    }

    pub async fn send_reaction(
        &self,
        target: SocialTarget,
        kind: ReactionKind,
    ) -> FrontendResult<()> {
        let params = ReactParams {
            entity_type: target.entity_type(),
            entity_id: target.entity_id(),
            reaction_type: kind,
        };
        let _: IgnoredAny = self.post("jokes/react", Some(&params)).await?;
        Ok(())
    }

    pub async fn vote(
        &self,
        target: SocialTarget,
        social: &mut SocialAggregate,
        vote: Vote,
    ) -> FrontendResult<OptimisticUpdate<VoteOutcome>> {
        if self.identity().is_none() {
            return Err(FrontendError::not_logged_in());
        }
        let local = social.apply_vote(vote);
        let dispatch = self.send_vote(target, local.vote_type).await;
        if let Err(e) = &dispatch {
            warn!("Failed to vote on {target}: {e}");
        }
        Ok(OptimisticUpdate { local, dispatch })
    }

    pub async fn react(
        &self,
        target: SocialTarget,
        social: &mut SocialAggregate,
        kind: ReactionKind,
    ) -> FrontendResult<OptimisticUpdate<bool>> {
        if self.identity().is_none() {
            return Err(FrontendError::not_logged_in());
        }
        social.apply_reaction(kind);
        let local = social.user.reactions.contains(&kind);
        let dispatch = self.send_reaction(target, kind).await;
        if let Err(e) = &dispatch {
            warn!("Failed to react with {kind} on {target}: {e}");
        }
        Ok(OptimisticUpdate { local, dispatch })
    }
}
