use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::bookings::BookingShort;
use crate::comments::CommentResponse;
use crate::validation::not_blank;

/// A rentable object owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    /// Request this item was listed in answer to
    pub request_id: Option<i64>,
}

impl Item {
    pub fn apply_update(&mut self, update: UpdateItem) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(available) = update.available {
            self.available = available;
        }
    }

    /// Case-insensitive substring match on name or description.
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
    }
}

/// Row to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

/// DTO for listing an item
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItem {
    #[validate(length(max = 255), custom(function = "not_blank"))]
    #[schema(example = "Drill")]
    pub name: String,

    #[validate(length(max = 512), custom(function = "not_blank"))]
    #[schema(example = "Cordless drill with two batteries")]
    pub description: String,

    pub available: bool,

    pub request_id: Option<i64>,
}

/// DTO for a partial item update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateItem {
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub name: Option<String>,

    #[validate(length(max = 512), custom(function = "not_blank"))]
    pub description: Option<String>,

    pub available: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Substring to look for; blank returns nothing
    #[serde(default)]
    pub text: String,
}

/// Item as shown to clients.
///
/// Booking context is filled in only for the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
    pub last_booking: Option<BookingShort>,
    pub next_booking: Option<BookingShort>,
    pub comments: Vec<CommentResponse>,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id,
            last_booking: None,
            next_booking: None,
            comments: Vec::new(),
        }
    }
}
