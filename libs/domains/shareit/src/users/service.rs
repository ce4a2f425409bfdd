use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use super::models::{CreateUser, UpdateUser, User};
use super::repository::UserRepository;
use crate::bookings::BookingRepository;
use crate::comments::CommentRepository;
use crate::error::{ShareItError, ShareItResult};
use crate::items::ItemRepository;
use crate::requests::ItemRequestRepository;

/// Service layer for the user registry
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    items: Arc<dyn ItemRepository>,
    bookings: Arc<dyn BookingRepository>,
    comments: Arc<dyn CommentRepository>,
    requests: Arc<dyn ItemRequestRepository>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        items: Arc<dyn ItemRepository>,
        bookings: Arc<dyn BookingRepository>,
        comments: Arc<dyn CommentRepository>,
        requests: Arc<dyn ItemRequestRepository>,
    ) -> Self {
        Self {
            users,
            items,
            bookings,
            comments,
            requests,
        }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: CreateUser) -> ShareItResult<User> {
        input.validate()?;
        self.users.create(input).await
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i64) -> ShareItResult<User> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or_else(|| ShareItError::user_not_found(id))
    }

    pub async fn list_users(&self) -> ShareItResult<Vec<User>> {
        self.users.list().await
    }

    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: i64, input: UpdateUser) -> ShareItResult<User> {
        input.validate()?;
        self.get_user(id).await?;
        self.users.update(id, input).await
    }

    /// Removes the user together with their items, bookings, comments and
    /// requests. Items answering a removed request lose the link.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> ShareItResult<()> {
        self.get_user(id).await?;

        let item_ids = self.items.delete_by_owner(id).await?;
        let bookings = self.bookings.delete_by_items(item_ids.clone()).await?
            + self.bookings.delete_by_booker(id).await?;
        let comments = self.comments.delete_by_items(item_ids.clone()).await?
            + self.comments.delete_by_author(id).await?;

        let request_ids = self.requests.delete_by_requestor(id).await?;
        self.items.detach_requests(request_ids.clone()).await?;

        if !self.users.delete(id).await? {
            return Err(ShareItError::user_not_found(id));
        }

        tracing::info!(
            user_id = id,
            items = item_ids.len(),
            bookings,
            comments,
            requests = request_ids.len(),
            "Deleted user with dependents"
        );
        Ok(())
    }
}
