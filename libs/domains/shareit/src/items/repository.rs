use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use super::models::{Item, NewItem, UpdateItem};
use crate::error::{ShareItError, ShareItResult};
use crate::pagination::PageParams;

/// Repository trait for Item persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn create(&self, input: NewItem) -> ShareItResult<Item>;

    async fn get_by_id(&self, id: i64) -> ShareItResult<Option<Item>>;

    async fn update(&self, id: i64, input: UpdateItem) -> ShareItResult<Item>;

    /// Returns false when no such item existed
    async fn delete(&self, id: i64) -> ShareItResult<bool>;

    /// Removes every item the user owns, returning their ids
    async fn delete_by_owner(&self, owner_id: i64) -> ShareItResult<Vec<i64>>;

    /// Clears the request link of items answering any of the given requests
    async fn detach_requests(&self, request_ids: Vec<i64>) -> ShareItResult<()>;

    /// The owner's items ordered by id
    async fn list_by_owner(&self, owner_id: i64, page: PageParams) -> ShareItResult<Vec<Item>>;

    async fn ids_by_owner(&self, owner_id: i64) -> ShareItResult<Vec<i64>>;

    /// Available items whose name or description contains `text`, any case, ordered by id
    async fn search(&self, text: String, page: PageParams) -> ShareItResult<Vec<Item>>;

    /// Items listed in answer to any of the given requests, ordered by id
    async fn list_by_requests(&self, request_ids: Vec<i64>) -> ShareItResult<Vec<Item>>;
}

/// In-memory implementation of ItemRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryItemRepository {
    items: Arc<RwLock<BTreeMap<i64, Item>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn create(&self, input: NewItem) -> ShareItResult<Item> {
        let mut items = self.items.write().await;

        let item = Item {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: input.name,
            description: input.description,
            available: input.available,
            owner_id: input.owner_id,
            request_id: input.request_id,
        };
        items.insert(item.id, item.clone());

        tracing::info!(item_id = item.id, owner_id = item.owner_id, "Created item");
        Ok(item)
    }

    async fn get_by_id(&self, id: i64) -> ShareItResult<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.get(&id).cloned())
    }

    async fn update(&self, id: i64, input: UpdateItem) -> ShareItResult<Item> {
        let mut items = self.items.write().await;

        let item = items
            .get_mut(&id)
            .ok_or_else(|| ShareItError::item_not_found(id))?;
        item.apply_update(input);

        tracing::info!(item_id = id, "Updated item");
        Ok(item.clone())
    }

    async fn delete(&self, id: i64) -> ShareItResult<bool> {
        let mut items = self.items.write().await;
        let removed = items.remove(&id).is_some();

        if removed {
            tracing::info!(item_id = id, "Deleted item");
        }
        Ok(removed)
    }

    async fn delete_by_owner(&self, owner_id: i64) -> ShareItResult<Vec<i64>> {
        let mut items = self.items.write().await;

        let ids: Vec<i64> = items
            .values()
            .filter(|i| i.owner_id == owner_id)
            .map(|i| i.id)
            .collect();
        for id in &ids {
            items.remove(id);
        }

        tracing::info!(owner_id, count = ids.len(), "Deleted owner's items");
        Ok(ids)
    }

    async fn detach_requests(&self, request_ids: Vec<i64>) -> ShareItResult<()> {
        let mut items = self.items.write().await;

        for item in items.values_mut() {
            if item.request_id.is_some_and(|id| request_ids.contains(&id)) {
                item.request_id = None;
            }
        }
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: i64, page: PageParams) -> ShareItResult<Vec<Item>> {
        let items = self.items.read().await;
        Ok(page.slice(items.values().filter(|i| i.owner_id == owner_id).cloned()))
    }

    async fn ids_by_owner(&self, owner_id: i64) -> ShareItResult<Vec<i64>> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .filter(|i| i.owner_id == owner_id)
            .map(|i| i.id)
            .collect())
    }

    async fn search(&self, text: String, page: PageParams) -> ShareItResult<Vec<Item>> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let items = self.items.read().await;
        Ok(page.slice(
            items
                .values()
                .filter(|i| i.available && i.matches_text(&needle))
                .cloned(),
        ))
    }

    async fn list_by_requests(&self, request_ids: Vec<i64>) -> ShareItResult<Vec<Item>> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .filter(|i| i.request_id.is_some_and(|id| request_ids.contains(&id)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item(name: &str, description: &str, available: bool, owner_id: i64) -> NewItem {
        NewItem {
            name: name.into(),
            description: description.into(),
            available,
            owner_id,
            request_id: None,
        }
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_skips_unavailable() {
        let repo = InMemoryItemRepository::new();
        let drill = repo
            .create(new_item("Drill", "Cordless", true, 1))
            .await
            .unwrap();
        repo.create(new_item("Hammer drill", "Heavy", false, 1))
            .await
            .unwrap();
        let saw = repo
            .create(new_item("Saw", "Cuts like a DRILL never could", true, 2))
            .await
            .unwrap();

        let found = repo
            .search("dRiLl".into(), PageParams::default())
            .await
            .unwrap();
        assert_eq!(found, vec![drill, saw]);
    }

    #[tokio::test]
    async fn test_blank_search_is_empty() {
        let repo = InMemoryItemRepository::new();
        repo.create(new_item("Drill", "Cordless", true, 1))
            .await
            .unwrap();

        assert!(repo.search("".into(), PageParams::default()).await.unwrap().is_empty());
        assert!(repo.search("   ".into(), PageParams::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_owner_listing_and_ids() {
        let repo = InMemoryItemRepository::new();
        let first = repo.create(new_item("A", "a", true, 1)).await.unwrap();
        repo.create(new_item("B", "b", true, 2)).await.unwrap();
        let third = repo.create(new_item("C", "c", false, 1)).await.unwrap();

        let listed = repo.list_by_owner(1, PageParams::default()).await.unwrap();
        assert_eq!(listed, vec![first.clone(), third.clone()]);
        assert_eq!(repo.ids_by_owner(1).await.unwrap(), vec![first.id, third.id]);

        let second_page = repo.list_by_owner(1, PageParams::new(1, 1)).await.unwrap();
        assert_eq!(second_page, vec![third]);
    }

    #[tokio::test]
    async fn test_list_by_requests() {
        let repo = InMemoryItemRepository::new();
        let answer = repo
            .create(NewItem {
                request_id: Some(5),
                ..new_item("Tent", "Two person", true, 3)
            })
            .await
            .unwrap();
        repo.create(new_item("Stove", "Gas", true, 3)).await.unwrap();

        assert_eq!(repo.list_by_requests(vec![5, 6]).await.unwrap(), vec![answer]);
        assert!(repo.list_by_requests(vec![]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_owner_leaves_other_owners() {
        let repo = InMemoryItemRepository::new();
        let first = repo.create(new_item("Drill", "a", true, 1)).await.unwrap();
        let kept = repo.create(new_item("Saw", "b", true, 2)).await.unwrap();
        let third = repo.create(new_item("Drill bit", "c", true, 1)).await.unwrap();

        let removed = repo.delete_by_owner(1).await.unwrap();
        assert_eq!(removed, vec![first.id, third.id]);

        let found = repo
            .search("drill".into(), PageParams::default())
            .await
            .unwrap();
        assert!(found.is_empty());
        assert_eq!(repo.get_by_id(kept.id).await.unwrap(), Some(kept));
    }

    #[tokio::test]
    async fn test_detach_requests() {
        let repo = InMemoryItemRepository::new();
        let answer = repo
            .create(NewItem {
                request_id: Some(5),
                ..new_item("Tent", "Two person", true, 3)
            })
            .await
            .unwrap();

        repo.detach_requests(vec![5]).await.unwrap();

        assert!(repo.list_by_requests(vec![5]).await.unwrap().is_empty());
        let item = repo.get_by_id(answer.id).await.unwrap().unwrap();
        assert_eq!(item.request_id, None);
    }

    #[tokio::test]
    async fn test_update_missing_item() {
        let repo = InMemoryItemRepository::new();
        let result = repo.update(4, UpdateItem::default()).await;
        assert!(matches!(result, Err(ShareItError::NotFound(_))));
    }
}
