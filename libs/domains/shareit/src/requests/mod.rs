//! Item-request board: calls for items nobody lists yet.

pub mod entity;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use models::{CreateItemRequest, ItemRequest, ItemRequestResponse, NewItemRequest};
pub use postgres::PgItemRequestRepository;
pub use repository::{InMemoryItemRequestRepository, ItemRequestRepository};
pub use service::ItemRequestService;
