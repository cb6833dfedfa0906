use super::ApiClient;
use crate::errors::{FrontendError, FrontendResult};
use chrono::Utc;
use jokebox_common::{
    comment::Comment,
    newtypes::{CommentId, JokeId},
    thread::JokeThread,
    CreatedResponse,
};
use log::{debug, warn};
use serde::{de::IgnoredAny, Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
pub struct CreateCommentParams {
    pub joke_id: JokeId,
    pub body: String,
    pub parent_comment_id: Option<CommentId>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ListCommentsParams {
    pub joke_id: JokeId,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct DeleteCommentParams {
    pub comment_id: CommentId,
}

impl ApiClient {
    pub async fn list_comments(&self, joke_id: JokeId) -> FrontendResult<Vec<Comment>> {
        let params = ListCommentsParams { joke_id };
        let comments: Option<Vec<Comment>> = self.get("comments", Some(&params)).await?;
        Ok(comments.unwrap_or_default())
    }

    pub async fn create_comment(&self, params: &CreateCommentParams) -> FrontendResult<CommentId> {
        let res: CreatedResponse<CommentId> = self.post("comments", Some(params)).await?;
        Ok(res.id)
    }

    pub async fn delete_comment(&self, comment_id: CommentId) -> FrontendResult<()> {
        let params = DeleteCommentParams { comment_id };
        let _: IgnoredAny = self.delete("comments/delete", Some(&params)).await?;
        Ok(())
    }

    /// Shows the comment right away and sends it afterwards. If sending fails the comment stays
    /// in the thread as pending, the error is returned to the caller.
    pub async fn submit_comment(
        &self,
        thread: &mut JokeThread,
        body: &str,
        parent_id: Option<CommentId>,
    ) -> FrontendResult<CommentId> {
        let identity = self.identity().ok_or_else(FrontendError::not_logged_in)?;
        let body = body.trim();
        if body.is_empty() {
            return Err(FrontendError::new("Comment cannot be empty"));
        }
        if parent_id.is_some_and(|p| p.is_transient()) {
            return Err(FrontendError::new("Cannot reply to a comment which is not saved yet"));
        }
        let transient_id =
            thread.insert_optimistic(&identity, body.to_string(), parent_id, Utc::now());
        let params = CreateCommentParams {
            joke_id: thread.joke.id,
            body: body.to_string(),
            parent_comment_id: parent_id,
        };
        match self.create_comment(&params).await {
            Ok(id) => {
                debug!("Comment {transient_id} stored as {id}");
                thread.confirm(transient_id, id);
                Ok(id)
            }
            Err(e) => {
                warn!("Failed to submit comment on joke {}: {e}", thread.joke.id);
                Err(e)
            }
        }
    }

    /// Admins delete foreign comments through the moderation endpoint. The comment is only
    /// tombstoned once the backend confirmed.
    pub async fn delete_comment_in(
        &self,
        thread: &mut JokeThread,
        comment_id: CommentId,
    ) -> FrontendResult<()> {
        let identity = self.identity().ok_or_else(FrontendError::not_logged_in)?;
        let comment = thread
            .comments()
            .iter()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| FrontendError::new(format!("Comment {comment_id} not found")))?;
        if !identity.can_delete_comment(comment) {
            return Err(FrontendError::new("Not allowed to delete this comment"));
        }
        if comment_id.is_transient() {
            return Err(FrontendError::new("Comment is not saved yet"));
        }
        if identity.is_admin && !identity.is_author_of(comment) {
            self.admin_delete_comment(comment_id).await?;
        } else {
            self.delete_comment(comment_id).await?;
        }
        thread.tombstone(comment_id);
        Ok(())
    }
}
