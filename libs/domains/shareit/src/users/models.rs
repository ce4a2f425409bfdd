use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::not_blank;

/// A registered member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[schema(example = "ann@example.com")]
    pub email: String,
}

impl User {
    pub fn apply_update(&mut self, update: UpdateUser) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
    }
}

/// DTO for registering a user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub name: String,

    #[validate(length(max = 512), email(message = "must be a well-formed email address"))]
    #[schema(example = "ann@example.com")]
    pub email: String,
}

/// DTO for a partial user update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub name: Option<String>,

    #[validate(length(max = 512), email(message = "must be a well-formed email address"))]
    pub email: Option<String>,
}

/// E-mails are compared case-insensitively.
pub(crate) fn same_email(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
