use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use super::models::{Comment, NewComment};
use crate::error::ShareItResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, input: NewComment) -> ShareItResult<Comment>;

    /// Comments on the item, oldest first
    async fn list_by_item(&self, item_id: i64) -> ShareItResult<Vec<Comment>>;

    async fn delete_by_items(&self, item_ids: Vec<i64>) -> ShareItResult<u64>;

    async fn delete_by_author(&self, author_id: i64) -> ShareItResult<u64>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryCommentRepository {
    comments: Arc<RwLock<BTreeMap<i64, Comment>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn create(&self, input: NewComment) -> ShareItResult<Comment> {
        let mut comments = self.comments.write().await;

        let comment = Comment {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            text: input.text,
            item_id: input.item_id,
            author_id: input.author_id,
            created: input.created,
        };
        comments.insert(comment.id, comment.clone());

        tracing::info!(
            comment_id = comment.id,
            item_id = comment.item_id,
            author_id = comment.author_id,
            "Created comment"
        );
        Ok(comment)
    }

    async fn list_by_item(&self, item_id: i64) -> ShareItResult<Vec<Comment>> {
        let comments = self.comments.read().await;
        Ok(comments
            .values()
            .filter(|c| c.item_id == item_id)
            .cloned()
            .collect())
    }

    async fn delete_by_items(&self, item_ids: Vec<i64>) -> ShareItResult<u64> {
        let mut comments = self.comments.write().await;

        let before = comments.len();
        comments.retain(|_, c| !item_ids.contains(&c.item_id));
        Ok((before - comments.len()) as u64)
    }

    async fn delete_by_author(&self, author_id: i64) -> ShareItResult<u64> {
        let mut comments = self.comments.write().await;

        let before = comments.len();
        comments.retain(|_, c| c.author_id != author_id);
        Ok((before - comments.len()) as u64)
    }
}
