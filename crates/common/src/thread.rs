use crate::{
    comment::{build_comment_tree, Comment},
    joke::{Joke, JokeWithComments},
    newtypes::CommentId,
    user::UserIdentity,
};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::BTreeSet;

/// A joke together with its comments as shown on the detail page.
///
/// Comments are kept as the flat list returned by the backend and nested on demand. New comments
/// are inserted right away with a temporary negative id and swapped for the stored version once
/// the backend returned it.
#[derive(Clone, Debug, PartialEq)]
pub struct JokeThread {
    pub joke: Joke,
    comments: Vec<Comment>,
    pending: BTreeSet<CommentId>,
    next_transient_id: i64,
}

impl JokeThread {
    pub fn new(joke: Joke, comments: Vec<Comment>) -> Self {
        Self {
            joke,
            comments,
            pending: BTreeSet::new(),
            next_transient_id: -1,
        }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn comment_mut(&mut self, id: CommentId) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| c.id == id)
    }

    pub fn tree(&self) -> Vec<Comment> {
        build_comment_tree(&self.comments)
    }

    /// Comments which were submitted but not yet confirmed by the backend.
    pub fn pending(&self) -> &BTreeSet<CommentId> {
        &self.pending
    }

    pub fn insert_optimistic(
        &mut self,
        author: &UserIdentity,
        body: String,
        parent_id: Option<CommentId>,
        now: DateTime<Utc>,
    ) -> CommentId {
        let id = CommentId(self.next_transient_id);
        self.next_transient_id -= 1;
        if parent_id.is_none() {
            self.joke.comment_count += 1;
        }
        self.comments.push(Comment {
            id,
            joke_id: self.joke.id,
            parent_id,
            body,
            author_id: author.user_id,
            author_username: author.username.clone(),
            created_at: now,
            is_deleted: false,
            social: Default::default(),
            children: vec![],
        });
        self.pending.insert(id);
        debug!("Inserted comment {id} on joke {}", self.joke.id);
        id
    }

    /// Swaps the transient id for the one assigned by the backend. Replies which were written
    /// in the meantime are moved over to the new id. Returns false if the comment is gone.
    pub fn confirm(&mut self, transient_id: CommentId, stored_id: CommentId) -> bool {
        self.pending.remove(&transient_id);
        let Some(comment) = self.comment_mut(transient_id) else {
            warn!("Confirmed comment {transient_id} is not in thread anymore");
            return false;
        };
        comment.id = stored_id;
        for comment in &mut self.comments {
            if comment.parent_id == Some(transient_id) {
                comment.parent_id = Some(stored_id);
            }
        }
        true
    }

    /// Marks the comment as deleted after the backend confirmed it. Returns false if it isnt
    /// part of this thread.
    pub fn tombstone(&mut self, id: CommentId) -> bool {
        match self.comment_mut(id) {
            Some(comment) => {
                comment.tombstone();
                true
            }
            None => false,
        }
    }

    /// Authoritative state from a refetch, drops all local modifications.
    pub fn replace(&mut self, data: JokeWithComments) {
        self.joke = data.joke;
        self.replace_comments(data.comments);
    }

    pub fn replace_comments(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
        self.pending.clear();
    }
}

impl From<JokeWithComments> for JokeThread {
    fn from(data: JokeWithComments) -> Self {
        Self::new(data.joke, data.comments)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{
        comment::{count_nodes, tests::comment},
        newtypes::{JokeId, UserId},
    };
    use pretty_assertions::assert_eq;

    fn thread() -> JokeThread {
        let joke = Joke {
            id: JokeId(1),
            title: String::new(),
            body: "<p>knock knock</p>".to_string(),
            author_id: UserId(1),
            author_username: "alice".to_string(),
            created_at: Utc::now(),
            comment_count: 1,
            social: Default::default(),
        };
        JokeThread::new(joke, vec![comment(10, None)])
    }

    fn bob() -> UserIdentity {
        UserIdentity {
            user_id: UserId(2),
            username: "bob".to_string(),
            is_admin: false,
        }
    }

    #[test]
    fn test_optimistic_root_comment() {
        let mut thread = thread();
        let id = thread.insert_optimistic(&bob(), "who is there".to_string(), None, Utc::now());
        assert!(id.is_transient());
        assert_eq!(2, thread.joke.comment_count);
        assert!(thread.pending().contains(&id));
        assert_eq!(2, thread.tree().len());
    }

    #[test]
    fn test_optimistic_reply_keeps_count() {
        let mut thread = thread();
        let id =
            thread.insert_optimistic(&bob(), "reply".to_string(), Some(CommentId(10)), Utc::now());
        assert_eq!(1, thread.joke.comment_count);
        let tree = thread.tree();
        assert_eq!(1, tree.len());
        assert_eq!(id, tree[0].children[0].id);
    }

    #[test]
    fn test_confirm_replaces_transient() {
        let mut thread = thread();
        let id = thread.insert_optimistic(&bob(), "first".to_string(), None, Utc::now());
        let reply = thread.insert_optimistic(&bob(), "second".to_string(), Some(id), Utc::now());
        assert_ne!(id, reply);

        assert!(thread.confirm(id, CommentId(11)));
        assert!(!thread.confirm(CommentId(-40), CommentId(12)));
        assert!(!thread.pending().contains(&id));
        assert!(thread.pending().contains(&reply));
        assert_eq!(
            Some(CommentId(11)),
            thread.comment_mut(reply).unwrap().parent_id
        );
        let tree = thread.tree();
        assert_eq!(
            vec![CommentId(10), CommentId(11)],
            tree.iter().map(|c| c.id).collect::<Vec<_>>()
        );
        assert_eq!(3, count_nodes(&tree));
    }

    #[test]
    fn test_tombstone_keeps_replies() {
        let mut thread = thread();
        thread.insert_optimistic(&bob(), "reply".to_string(), Some(CommentId(10)), Utc::now());
        assert!(thread.tombstone(CommentId(10)));
        assert!(!thread.tombstone(CommentId(99)));
        let tree = thread.tree();
        assert!(tree[0].is_deleted);
        assert!(tree[0].body.is_empty());
        assert_eq!(1, tree[0].children.len());
    }
}
