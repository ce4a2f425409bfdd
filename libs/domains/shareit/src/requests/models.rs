use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::items::Item;
use crate::validation::not_blank;

/// A user's open call for an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub id: i64,
    pub description: String,
    pub requestor_id: i64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItemRequest {
    pub description: String,
    pub requestor_id: i64,
    pub created: DateTime<Utc>,
}

/// DTO for posting a request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    #[validate(length(max = 512), custom(function = "not_blank"))]
    #[schema(example = "Looking for a ladder for the weekend")]
    pub description: String,
}

/// Request with every item listed in answer to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestResponse {
    pub id: i64,
    pub description: String,
    pub requestor_id: i64,
    pub created: DateTime<Utc>,
    pub items: Vec<Item>,
}

impl ItemRequestResponse {
    pub fn new(request: ItemRequest, items: Vec<Item>) -> Self {
        Self {
            id: request.id,
            description: request.description,
            requestor_id: request.requestor_id,
            created: request.created,
            items,
        }
    }
}
