//! Custom extractors for Axum handlers.
//!
//! Every rejection is rendered through [`AppError`](crate::errors::AppError),
//! so clients always receive the flat `{"error": "..."}` body with a 400.

pub mod id_path;
pub mod sharer_user_id;
pub mod validated_json;
pub mod validated_query;

pub use id_path::IdPath;
pub use sharer_user_id::{SHARER_USER_ID_HEADER, SharerUserId};
pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;
