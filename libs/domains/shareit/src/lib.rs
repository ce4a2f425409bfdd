//! ShareIt Domain
//!
//! Users list items for rent, book each other's items for a time window,
//! post requests for items nobody offers yet, and comment on items after a
//! finished rental.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, caller from X-Sharer-User-Id
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Services   │  ← Business rules, access policy
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory + Postgres)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, enums
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_shareit::Repositories;
//!
//! let repositories = Repositories::in_memory();
//! let router = domain_shareit::router(&repositories);
//! ```

pub mod access;
pub mod bookings;
pub mod comments;
pub mod error;
pub mod items;
pub mod pagination;
pub mod requests;
pub mod timestamp;
pub mod users;
pub mod validation;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub use bookings::{
    Booking, BookingRepository, BookingResponse, BookingService, BookingShort, BookingState,
    BookingStatus, CreateBooking,
};
pub use comments::{Comment, CommentRepository, CommentResponse, CreateComment};
pub use error::{ShareItError, ShareItResult};
pub use items::{CreateItem, Item, ItemRepository, ItemResponse, ItemService, UpdateItem};
pub use pagination::PageParams;
pub use requests::{
    CreateItemRequest, ItemRequest, ItemRequestRepository, ItemRequestResponse, ItemRequestService,
};
pub use users::{CreateUser, UpdateUser, User, UserRepository, UserService};

/// The storage seams shared by all services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub items: Arc<dyn ItemRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub requests: Arc<dyn ItemRequestRepository>,
}

impl Repositories {
    /// Process-local storage, lost on restart.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(users::InMemoryUserRepository::new()),
            items: Arc::new(items::InMemoryItemRepository::new()),
            bookings: Arc::new(bookings::InMemoryBookingRepository::new()),
            comments: Arc::new(comments::InMemoryCommentRepository::new()),
            requests: Arc::new(requests::InMemoryItemRequestRepository::new()),
        }
    }

    /// Postgres storage over a shared connection pool.
    pub fn postgres(db: DatabaseConnection) -> Self {
        Self {
            users: Arc::new(users::PgUserRepository::new(db.clone())),
            items: Arc::new(items::PgItemRepository::new(db.clone())),
            bookings: Arc::new(bookings::PgBookingRepository::new(db.clone())),
            comments: Arc::new(comments::PgCommentRepository::new(db.clone())),
            requests: Arc::new(requests::PgItemRequestRepository::new(db)),
        }
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(
            self.users.clone(),
            self.items.clone(),
            self.bookings.clone(),
            self.comments.clone(),
            self.requests.clone(),
        )
    }

    pub fn item_service(&self) -> ItemService {
        ItemService::new(
            self.items.clone(),
            self.users.clone(),
            self.bookings.clone(),
            self.comments.clone(),
            self.requests.clone(),
        )
    }

    pub fn booking_service(&self) -> BookingService {
        BookingService::new(self.bookings.clone(), self.items.clone(), self.users.clone())
    }

    pub fn request_service(&self) -> ItemRequestService {
        ItemRequestService::new(self.requests.clone(), self.users.clone(), self.items.clone())
    }
}

/// All ShareIt endpoints, nested under their resource prefixes.
pub fn router(repositories: &Repositories) -> Router {
    Router::new()
        .nest("/users", users::handlers::router(repositories.user_service()))
        .nest("/items", items::handlers::router(repositories.item_service()))
        .nest(
            "/bookings",
            bookings::handlers::router(repositories.booking_service()),
        )
        .nest(
            "/requests",
            requests::handlers::router(repositories.request_service()),
        )
}
