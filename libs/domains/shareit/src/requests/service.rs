use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use super::models::{CreateItemRequest, ItemRequest, ItemRequestResponse, NewItemRequest};
use super::repository::ItemRequestRepository;
use crate::error::{ShareItError, ShareItResult};
use crate::items::{Item, ItemRepository};
use crate::pagination::PageParams;
use crate::users::UserRepository;

/// Service layer for the item-request board
#[derive(Clone)]
pub struct ItemRequestService {
    requests: Arc<dyn ItemRequestRepository>,
    users: Arc<dyn UserRepository>,
    items: Arc<dyn ItemRepository>,
}

impl ItemRequestService {
    pub fn new(
        requests: Arc<dyn ItemRequestRepository>,
        users: Arc<dyn UserRepository>,
        items: Arc<dyn ItemRepository>,
    ) -> Self {
        Self {
            requests,
            users,
            items,
        }
    }

    async fn ensure_user(&self, id: i64) -> ShareItResult<()> {
        match self.users.get_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(ShareItError::user_not_found(id)),
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_request(
        &self,
        requestor_id: i64,
        input: CreateItemRequest,
    ) -> ShareItResult<ItemRequestResponse> {
        input.validate()?;
        self.ensure_user(requestor_id).await?;

        let request = self
            .requests
            .create(NewItemRequest {
                description: input.description,
                requestor_id,
                created: Utc::now(),
            })
            .await?;

        Ok(ItemRequestResponse::new(request, Vec::new()))
    }

    /// The caller's own requests with their answers, oldest first
    #[instrument(skip(self))]
    pub async fn list_own(&self, requestor_id: i64) -> ShareItResult<Vec<ItemRequestResponse>> {
        self.ensure_user(requestor_id).await?;
        let requests = self.requests.list_by_requestor(requestor_id).await?;
        self.with_items(requests).await
    }

    /// Requests posted by other users
    #[instrument(skip(self))]
    pub async fn list_all(
        &self,
        user_id: i64,
        page: PageParams,
    ) -> ShareItResult<Vec<ItemRequestResponse>> {
        self.ensure_user(user_id).await?;
        let requests = self.requests.list_others(user_id, page).await?;
        self.with_items(requests).await
    }

    #[instrument(skip(self))]
    pub async fn get_request(
        &self,
        user_id: i64,
        request_id: i64,
    ) -> ShareItResult<ItemRequestResponse> {
        self.ensure_user(user_id).await?;
        let request = self
            .requests
            .get_by_id(request_id)
            .await?
            .ok_or_else(|| ShareItError::request_not_found(request_id))?;

        let mut responses = self.with_items(vec![request]).await?;
        responses
            .pop()
            .ok_or_else(|| ShareItError::request_not_found(request_id))
    }

    async fn with_items(
        &self,
        requests: Vec<ItemRequest>,
    ) -> ShareItResult<Vec<ItemRequestResponse>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let ids = requests.iter().map(|r| r.id).collect();
        let mut answers: HashMap<i64, Vec<Item>> = HashMap::new();
        for item in self.items.list_by_requests(ids).await? {
            if let Some(request_id) = item.request_id {
                answers.entry(request_id).or_default().push(item);
            }
        }

        Ok(requests
            .into_iter()
            .map(|request| {
                let items = answers.remove(&request.id).unwrap_or_default();
                ItemRequestResponse::new(request, items)
            })
            .collect())
    }
}
