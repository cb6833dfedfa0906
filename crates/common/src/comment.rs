use crate::{
    newtypes::{CommentId, JokeId, UserId},
    social::SocialAggregate,
    utils::{null_as_default, parent_id},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DELETED_COMMENT_TEXT: &str = "This comment has been deleted";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub joke_id: JokeId,
    #[serde(default, deserialize_with = "parent_id")]
    pub parent_id: Option<CommentId>,
    /// Rich text as html
    pub body: String,
    pub author_id: UserId,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub social: SocialAggregate,
    /// Only filled by [build_comment_tree], the api always sends a flat list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Comment>,
}

impl Comment {
    /// Soft delete, the comment stays in place so that replies remain visible.
    pub fn tombstone(&mut self) {
        self.is_deleted = true;
        self.body.clear();
    }

    pub fn display_body(&self) -> &str {
        if self.is_deleted {
            DELETED_COMMENT_TEXT
        } else {
            &self.body
        }
    }
}

/// Nests a flat list of comments by their parent reference.
///
/// Siblings keep the order in which they appear in `comments`. A comment whose parent is not part
/// of the list (eg because it is on another page) is shown at the top level. Comments caught in a
/// parent cycle are not reachable from any root, they are also moved to the top level so that
/// every input comment appears exactly once in the output.
pub fn build_comment_tree(comments: &[Comment]) -> Vec<Comment> {
    let mut index = HashMap::with_capacity(comments.len());
    for (i, comment) in comments.iter().enumerate() {
        index.entry(comment.id).or_insert(i);
    }

    let mut children = vec![Vec::new(); comments.len()];
    let mut roots = Vec::new();
    for (i, comment) in comments.iter().enumerate() {
        match comment.parent_id.and_then(|p| index.get(&p)) {
            Some(&parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    let mut visited = vec![false; comments.len()];
    let mut tree: Vec<_> = roots
        .into_iter()
        .map(|i| attach(i, comments, &children, &mut visited))
        .collect();
    for i in 0..comments.len() {
        if !visited[i] {
            tree.push(attach(i, comments, &children, &mut visited));
        }
    }
    tree
}

fn attach(
    i: usize,
    comments: &[Comment],
    children: &[Vec<usize>],
    visited: &mut [bool],
) -> Comment {
    visited[i] = true;
    let mut node = Comment {
        children: Vec::with_capacity(children[i].len()),
        ..comments[i].clone()
    };
    for &child in &children[i] {
        if !visited[child] {
            node.children.push(attach(child, comments, children, visited));
        }
    }
    node
}

/// Total number of comments in a forest, including all nested replies.
pub fn count_nodes(tree: &[Comment]) -> usize {
    tree.iter().map(|c| 1 + count_nodes(&c.children)).sum()
}
