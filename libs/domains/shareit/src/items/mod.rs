//! Item catalog, including comments and the owner's booking context.

pub mod entity;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use models::{CreateItem, Item, ItemResponse, NewItem, SearchParams, UpdateItem};
pub use postgres::PgItemRepository;
pub use repository::{InMemoryItemRepository, ItemRepository};
pub use service::ItemService;
