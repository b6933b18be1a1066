use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::error::DomainError;

pub(crate) const MAX_COMMENT_LEN: usize = 1000;

#[derive(Debug, Clone)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) content: String,
    pub(crate) parent_id: Option<i64>,
    pub(crate) likes_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Comment {
    pub(crate) fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CreateCommentRequest {
    pub(crate) content: String,
    pub(crate) parent_id: Option<i64>,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            content: normalize_comment_content(&self.content)?,
            parent_id: self.parent_id,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UpdateCommentRequest {
    pub(crate) content: String,
}

impl UpdateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            content: normalize_comment_content(&self.content)?,
        })
    }
}

fn normalize_comment_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    if content.chars().count() > MAX_COMMENT_LEN {
        return Err(DomainError::Validation {
            field: "content",
            message: "must be at most 1000 chars",
        });
    }
    Ok(content.to_string())
}

/// One node of an assembled comment thread.
#[derive(Debug, Clone)]
pub(crate) struct CommentNode {
    pub(crate) comment: Comment,
    pub(crate) replies: Vec<CommentNode>,
}

/// Assembles a flat comment relation into a forest rooted at comments with
/// no parent. Roots come out newest-created-first, replies in creation
/// order. `depth` bounds how many reply levels are expanded; the default
/// view uses 1 (roots plus their direct replies).
pub(crate) fn build_thread(comments: Vec<Comment>, depth: usize) -> Vec<CommentNode> {
    let mut roots = Vec::new();
    let mut by_parent: HashMap<i64, Vec<Comment>> = HashMap::new();

    for comment in comments {
        match comment.parent_id {
            None => roots.push(comment),
            Some(parent_id) => by_parent.entry(parent_id).or_default().push(comment),
        }
    }

    roots.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    for replies in by_parent.values_mut() {
        replies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    }

    roots
        .into_iter()
        .map(|root| attach_replies(root, &mut by_parent, depth))
        .collect()
}

fn attach_replies(
    comment: Comment,
    by_parent: &mut HashMap<i64, Vec<Comment>>,
    depth: usize,
) -> CommentNode {
    let replies = if depth == 0 {
        Vec::new()
    } else {
        by_parent
            .remove(&comment.id)
            .unwrap_or_default()
            .into_iter()
            .map(|reply| attach_replies(reply, by_parent, depth - 1))
            .collect()
    };
    CommentNode { comment, replies }
}
