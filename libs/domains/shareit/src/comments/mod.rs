//! Comments left on items after a finished rental.
//!
//! Comments are created through the item endpoints; this module owns
//! their storage.

pub mod entity;
pub mod models;
pub mod postgres;
pub mod repository;

pub use models::{Comment, CommentResponse, CreateComment, NewComment};
pub use postgres::PgCommentRepository;
pub use repository::{CommentRepository, InMemoryCommentRepository};
