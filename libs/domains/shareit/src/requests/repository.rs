use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use super::models::{ItemRequest, NewItemRequest};
use crate::error::ShareItResult;
use crate::pagination::PageParams;

/// Repository trait for ItemRequest persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRequestRepository: Send + Sync {
    async fn create(&self, input: NewItemRequest) -> ShareItResult<ItemRequest>;

    async fn get_by_id(&self, id: i64) -> ShareItResult<Option<ItemRequest>>;

    /// The user's own requests, oldest first
    async fn list_by_requestor(&self, requestor_id: i64) -> ShareItResult<Vec<ItemRequest>>;

    /// Everyone else's requests, oldest first
    async fn list_others(
        &self,
        requestor_id: i64,
        page: PageParams,
    ) -> ShareItResult<Vec<ItemRequest>>;

    /// Removes the user's requests, returning their ids
    async fn delete_by_requestor(&self, requestor_id: i64) -> ShareItResult<Vec<i64>>;
}

fn oldest_first(a: &ItemRequest, b: &ItemRequest) -> std::cmp::Ordering {
    a.created.cmp(&b.created).then(a.id.cmp(&b.id))
}

/// In-memory implementation of ItemRequestRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryItemRequestRepository {
    requests: Arc<RwLock<BTreeMap<i64, ItemRequest>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryItemRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemRequestRepository for InMemoryItemRequestRepository {
    async fn create(&self, input: NewItemRequest) -> ShareItResult<ItemRequest> {
        let mut requests = self.requests.write().await;

        let request = ItemRequest {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            description: input.description,
            requestor_id: input.requestor_id,
            created: input.created,
        };
        requests.insert(request.id, request.clone());

        tracing::info!(
            request_id = request.id,
            requestor_id = request.requestor_id,
            "Created item request"
        );
        Ok(request)
    }

    async fn get_by_id(&self, id: i64) -> ShareItResult<Option<ItemRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.get(&id).cloned())
    }

    async fn list_by_requestor(&self, requestor_id: i64) -> ShareItResult<Vec<ItemRequest>> {
        let requests = self.requests.read().await;

        let mut result: Vec<ItemRequest> = requests
            .values()
            .filter(|r| r.requestor_id == requestor_id)
            .cloned()
            .collect();
        result.sort_by(oldest_first);
        Ok(result)
    }

    async fn list_others(
        &self,
        requestor_id: i64,
        page: PageParams,
    ) -> ShareItResult<Vec<ItemRequest>> {
        let requests = self.requests.read().await;

        let mut result: Vec<ItemRequest> = requests
            .values()
            .filter(|r| r.requestor_id != requestor_id)
            .cloned()
            .collect();
        result.sort_by(oldest_first);
        Ok(page.slice(result))
    }

    async fn delete_by_requestor(&self, requestor_id: i64) -> ShareItResult<Vec<i64>> {
        let mut requests = self.requests.write().await;

        let ids: Vec<i64> = requests
            .values()
            .filter(|r| r.requestor_id == requestor_id)
            .map(|r| r.id)
            .collect();
        for id in &ids {
            requests.remove(id);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn new_request(requestor_id: i64, minutes_ago: i64) -> NewItemRequest {
        NewItemRequest {
            description: format!("request by {}", requestor_id),
            requestor_id,
            created: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_own_requests_oldest_first() {
        let repo = InMemoryItemRequestRepository::new();
        let newer = repo.create(new_request(1, 1)).await.unwrap();
        let older = repo.create(new_request(1, 30)).await.unwrap();
        repo.create(new_request(2, 10)).await.unwrap();

        let own = repo.list_by_requestor(1).await.unwrap();
        assert_eq!(own, vec![older, newer]);
    }

    #[tokio::test]
    async fn test_others_excludes_caller_and_pages() {
        let repo = InMemoryItemRequestRepository::new();
        repo.create(new_request(1, 5)).await.unwrap();
        let first = repo.create(new_request(2, 20)).await.unwrap();
        let second = repo.create(new_request(3, 10)).await.unwrap();

        let others = repo.list_others(1, PageParams::default()).await.unwrap();
        assert_eq!(others, vec![first, second.clone()]);

        let paged = repo.list_others(1, PageParams::new(1, 5)).await.unwrap();
        assert_eq!(paged, vec![second]);
    }

    #[tokio::test]
    async fn test_delete_by_requestor() {
        let repo = InMemoryItemRequestRepository::new();
        let removed = repo.create(new_request(1, 5)).await.unwrap();
        let kept = repo.create(new_request(2, 5)).await.unwrap();

        assert_eq!(repo.delete_by_requestor(1).await.unwrap(), vec![removed.id]);
        assert!(repo.list_by_requestor(1).await.unwrap().is_empty());
        assert_eq!(repo.get_by_id(kept.id).await.unwrap(), Some(kept));
    }
}
