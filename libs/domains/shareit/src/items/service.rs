use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use super::models::{CreateItem, Item, ItemResponse, NewItem, UpdateItem};
use super::repository::ItemRepository;
use crate::access;
use crate::bookings::{BookingRepository, BookingStatus};
use crate::comments::{CommentRepository, CommentResponse, CreateComment, NewComment};
use crate::error::{ShareItError, ShareItResult};
use crate::pagination::PageParams;
use crate::requests::ItemRequestRepository;
use crate::users::{User, UserRepository};

/// Service layer for the item catalog and its comments
#[derive(Clone)]
pub struct ItemService {
    items: Arc<dyn ItemRepository>,
    users: Arc<dyn UserRepository>,
    bookings: Arc<dyn BookingRepository>,
    comments: Arc<dyn CommentRepository>,
    requests: Arc<dyn ItemRequestRepository>,
}

impl ItemService {
    pub fn new(
        items: Arc<dyn ItemRepository>,
        users: Arc<dyn UserRepository>,
        bookings: Arc<dyn BookingRepository>,
        comments: Arc<dyn CommentRepository>,
        requests: Arc<dyn ItemRequestRepository>,
    ) -> Self {
        Self {
            items,
            users,
            bookings,
            comments,
            requests,
        }
    }

    async fn user(&self, id: i64) -> ShareItResult<User> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or_else(|| ShareItError::user_not_found(id))
    }

    async fn item(&self, id: i64) -> ShareItResult<Item> {
        self.items
            .get_by_id(id)
            .await?
            .ok_or_else(|| ShareItError::item_not_found(id))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_item(&self, owner_id: i64, input: CreateItem) -> ShareItResult<ItemResponse> {
        input.validate()?;
        self.user(owner_id).await?;

        if let Some(request_id) = input.request_id {
            if self.requests.get_by_id(request_id).await?.is_none() {
                return Err(ShareItError::request_not_found(request_id));
            }
        }

        let item = self
            .items
            .create(NewItem {
                name: input.name,
                description: input.description,
                available: input.available,
                owner_id,
                request_id: input.request_id,
            })
            .await?;

        Ok(item.into())
    }

    #[instrument(skip(self, input))]
    pub async fn update_item(
        &self,
        owner_id: i64,
        item_id: i64,
        input: UpdateItem,
    ) -> ShareItResult<ItemResponse> {
        input.validate()?;
        let item = self.item(item_id).await?;
        access::ensure_item_owner(&item, owner_id)?;

        let updated = self.items.update(item_id, input).await?;
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, owner_id: i64, item_id: i64) -> ShareItResult<()> {
        let item = self.item(item_id).await?;
        access::ensure_item_owner(&item, owner_id)?;

        self.bookings.delete_by_items(vec![item_id]).await?;
        self.comments.delete_by_items(vec![item_id]).await?;
        if !self.items.delete(item_id).await? {
            return Err(ShareItError::item_not_found(item_id));
        }
        Ok(())
    }

    /// Any caller sees comments; the owner also sees last and next bookings
    #[instrument(skip(self))]
    pub async fn get_item(&self, user_id: i64, item_id: i64) -> ShareItResult<ItemResponse> {
        let item = self.item(item_id).await?;
        let is_owner = item.owner_id == user_id;

        let mut response = ItemResponse::from(item);
        response.comments = self.comment_responses(item_id).await?;
        if is_owner {
            self.attach_bookings(&mut response).await?;
        }

        Ok(response)
    }

    /// The owner's items with booking context and comments
    #[instrument(skip(self))]
    pub async fn list_owner_items(
        &self,
        owner_id: i64,
        page: PageParams,
    ) -> ShareItResult<Vec<ItemResponse>> {
        let items = self.items.list_by_owner(owner_id, page).await?;

        let mut responses = Vec::with_capacity(items.len());
        for item in items {
            let mut response = ItemResponse::from(item);
            response.comments = self.comment_responses(response.id).await?;
            self.attach_bookings(&mut response).await?;
            responses.push(response);
        }

        Ok(responses)
    }

    #[instrument(skip(self))]
    pub async fn search(&self, text: &str, page: PageParams) -> ShareItResult<Vec<ItemResponse>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let items = self.items.search(text.to_string(), page).await?;
        Ok(items.into_iter().map(Into::into).collect())
    }

    /// Comment on an item after an approved rental of it has ended
    #[instrument(skip(self, input))]
    pub async fn add_comment(
        &self,
        author_id: i64,
        item_id: i64,
        input: CreateComment,
    ) -> ShareItResult<CommentResponse> {
        input.validate()?;
        let author = self.user(author_id).await?;
        self.item(item_id).await?;

        let now = Utc::now();
        if !self
            .bookings
            .has_finished_approved(author_id, item_id, now)
            .await?
        {
            return Err(ShareItError::Validation(format!(
                "User {} has no finished approved booking of item {}",
                author_id, item_id
            )));
        }

        let comment = self
            .comments
            .create(NewComment {
                text: input.text,
                item_id,
                author_id,
                created: now,
            })
            .await?;

        Ok(CommentResponse::new(comment, author.name))
    }

    async fn attach_bookings(&self, response: &mut ItemResponse) -> ShareItResult<()> {
        let now = Utc::now();

        response.last_booking = self
            .bookings
            .last_started(response.id, now)
            .await?
            .filter(|b| b.status == BookingStatus::Approved)
            .map(Into::into);

        response.next_booking = self
            .bookings
            .next_starting(response.id, now)
            .await?
            .filter(|b| b.status != BookingStatus::Rejected)
            .map(Into::into);

        Ok(())
    }

    async fn comment_responses(&self, item_id: i64) -> ShareItResult<Vec<CommentResponse>> {
        let comments = self.comments.list_by_item(item_id).await?;
        let mut names: HashMap<i64, String> = HashMap::new();
        let mut responses = Vec::with_capacity(comments.len());

        for comment in comments {
            let name = match names.get(&comment.author_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self
                        .users
                        .get_by_id(comment.author_id)
                        .await?
                        .map(|u| u.name)
                        .unwrap_or_default();
                    names.insert(comment.author_id, name.clone());
                    name
                }
            };
            responses.push(CommentResponse::new(comment, name));
        }

        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::Booking;
    use crate::bookings::repository::MockBookingRepository;
    use crate::comments::Comment;
    use crate::comments::repository::MockCommentRepository;
    use crate::items::repository::MockItemRepository;
    use crate::requests::repository::MockItemRequestRepository;
    use crate::users::repository::MockUserRepository;
    use chrono::Duration;
    use mockall::predicate::eq;

    const OWNER: i64 = 1;
    const BOOKER: i64 = 2;

    struct Mocks {
        items: MockItemRepository,
        users: MockUserRepository,
        bookings: MockBookingRepository,
        comments: MockCommentRepository,
        requests: MockItemRequestRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                items: MockItemRepository::new(),
                users: MockUserRepository::new(),
                bookings: MockBookingRepository::new(),
                comments: MockCommentRepository::new(),
                requests: MockItemRequestRepository::new(),
            }
        }

        fn with_users(mut self) -> Self {
            self.users.expect_get_by_id().returning(|id| {
                Ok(Some(User {
                    id,
                    name: format!("user{}", id),
                    email: format!("user{}@example.com", id),
                }))
            });
            self
        }

        fn with_drill(mut self) -> Self {
            self.items
                .expect_get_by_id()
                .returning(|_| Ok(Some(drill())));
            self
        }

        fn service(self) -> ItemService {
            ItemService::new(
                Arc::new(self.items),
                Arc::new(self.users),
                Arc::new(self.bookings),
                Arc::new(self.comments),
                Arc::new(self.requests),
            )
        }
    }

    fn drill() -> Item {
        Item {
            id: 10,
            name: "Drill".into(),
            description: "Cordless".into(),
            available: true,
            owner_id: OWNER,
            request_id: None,
        }
    }

    fn booking(id: i64, start_days: i64, status: BookingStatus) -> Booking {
        Booking {
            id,
            start: Utc::now() + Duration::days(start_days),
            end: Utc::now() + Duration::days(start_days + 1),
            item_id: 10,
            booker_id: BOOKER,
            status,
        }
    }

    fn create_drill(request_id: Option<i64>) -> CreateItem {
        CreateItem {
            name: "Drill".into(),
            description: "Cordless".into(),
            available: true,
            request_id,
        }
    }

    #[tokio::test]
    async fn test_create_for_unknown_owner_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.users.expect_get_by_id().returning(|_| Ok(None));
        mocks.items.expect_create().never();

        let result = mocks.service().create_item(OWNER, create_drill(None)).await;
        assert!(matches!(result, Err(ShareItError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_with_unknown_request_is_not_found() {
        let mut mocks = Mocks::new().with_users();
        mocks.requests.expect_get_by_id().returning(|_| Ok(None));
        mocks.items.expect_create().never();

        let err = mocks
            .service()
            .create_item(OWNER, create_drill(Some(3)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Item request 3 not found");
    }

    #[tokio::test]
    async fn test_create_links_request() {
        let mut mocks = Mocks::new().with_users();
        mocks.requests.expect_get_by_id().returning(|id| {
            Ok(Some(crate::requests::ItemRequest {
                id,
                description: "Need a drill".into(),
                requestor_id: BOOKER,
                created: Utc::now(),
            }))
        });
        mocks
            .items
            .expect_create()
            .withf(|input| input.request_id == Some(3) && input.owner_id == OWNER)
            .returning(|input| {
                Ok(Item {
                    id: 10,
                    name: input.name,
                    description: input.description,
                    available: input.available,
                    owner_id: input.owner_id,
                    request_id: input.request_id,
                })
            });

        let response = mocks
            .service()
            .create_item(OWNER, create_drill(Some(3)))
            .await
            .unwrap();
        assert_eq!(response.request_id, Some(3));
        assert!(response.comments.is_empty());
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_not_found() {
        let mut mocks = Mocks::new().with_drill();
        mocks.items.expect_update().never();

        let result = mocks
            .service()
            .update_item(
                BOOKER,
                10,
                UpdateItem {
                    available: Some(false),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ShareItError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_not_found() {
        let mut mocks = Mocks::new().with_drill();
        mocks.items.expect_delete().never();

        let result = mocks.service().delete_item(BOOKER, 10).await;
        assert!(matches!(result, Err(ShareItError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_bookings_and_comments() {
        let mut mocks = Mocks::new().with_drill();
        mocks
            .bookings
            .expect_delete_by_items()
            .with(eq(vec![10]))
            .times(1)
            .returning(|_| Ok(1));
        mocks
            .comments
            .expect_delete_by_items()
            .with(eq(vec![10]))
            .times(1)
            .returning(|_| Ok(0));
        mocks
            .items
            .expect_delete()
            .with(eq(10))
            .times(1)
            .returning(|_| Ok(true));

        mocks.service().delete_item(OWNER, 10).await.unwrap();
    }

    #[tokio::test]
    async fn test_owner_sees_booking_context() {
        let mut mocks = Mocks::new().with_drill().with_users();
        mocks.comments.expect_list_by_item().returning(|_| Ok(vec![]));
        mocks
            .bookings
            .expect_last_started()
            .returning(|_, _| Ok(Some(booking(1, -3, BookingStatus::Approved))));
        mocks
            .bookings
            .expect_next_starting()
            .returning(|_, _| Ok(Some(booking(2, 3, BookingStatus::Waiting))));

        let response = mocks.service().get_item(OWNER, 10).await.unwrap();
        assert_eq!(response.last_booking.map(|b| b.id), Some(1));
        assert_eq!(response.next_booking.map(|b| b.id), Some(2));
    }

    #[tokio::test]
    async fn test_booking_context_hides_unapproved_last_and_rejected_next() {
        let mut mocks = Mocks::new().with_drill();
        mocks.comments.expect_list_by_item().returning(|_| Ok(vec![]));
        mocks
            .bookings
            .expect_last_started()
            .returning(|_, _| Ok(Some(booking(1, -3, BookingStatus::Waiting))));
        mocks
            .bookings
            .expect_next_starting()
            .returning(|_, _| Ok(Some(booking(2, 3, BookingStatus::Rejected))));

        let response = mocks.service().get_item(OWNER, 10).await.unwrap();
        assert!(response.last_booking.is_none());
        assert!(response.next_booking.is_none());
    }

    #[tokio::test]
    async fn test_non_owner_sees_comments_only() {
        let mut mocks = Mocks::new().with_drill().with_users();
        mocks.comments.expect_list_by_item().returning(|item_id| {
            Ok(vec![Comment {
                id: 1,
                text: "Great drill".into(),
                item_id,
                author_id: BOOKER,
                created: Utc::now(),
            }])
        });
        mocks.bookings.expect_last_started().never();
        mocks.bookings.expect_next_starting().never();

        let response = mocks.service().get_item(BOOKER, 10).await.unwrap();
        assert_eq!(response.comments.len(), 1);
        assert_eq!(response.comments[0].author_name, "user2");
        assert!(response.last_booking.is_none());
    }

    #[tokio::test]
    async fn test_blank_search_skips_repository() {
        let mut mocks = Mocks::new();
        mocks.items.expect_search().never();

        let result = mocks
            .service()
            .search("  ", PageParams::default())
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_comment_requires_finished_approved_booking() {
        let mut mocks = Mocks::new().with_drill().with_users();
        mocks
            .bookings
            .expect_has_finished_approved()
            .returning(|_, _, _| Ok(false));
        mocks.comments.expect_create().never();

        let result = mocks
            .service()
            .add_comment(
                BOOKER,
                10,
                CreateComment {
                    text: "Great".into(),
                },
            )
            .await;
        assert!(matches!(result, Err(ShareItError::Validation(_))));
    }

    #[tokio::test]
    async fn test_comment_carries_author_name() {
        let mut mocks = Mocks::new().with_drill().with_users();
        mocks
            .bookings
            .expect_has_finished_approved()
            .returning(|_, _, _| Ok(true));
        mocks.comments.expect_create().returning(|input| {
            Ok(Comment {
                id: 5,
                text: input.text,
                item_id: input.item_id,
                author_id: input.author_id,
                created: input.created,
            })
        });

        let response = mocks
            .service()
            .add_comment(
                BOOKER,
                10,
                CreateComment {
                    text: "Great".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(response.author_name, "user2");
        assert_eq!(response.text, "Great");
    }

    #[tokio::test]
    async fn test_blank_comment_is_rejected() {
        let mocks = Mocks::new();
        let result = mocks
            .service()
            .add_comment(BOOKER, 10, CreateComment { text: " ".into() })
            .await;
        assert!(matches!(result, Err(ShareItError::Validation(_))));
    }
}
