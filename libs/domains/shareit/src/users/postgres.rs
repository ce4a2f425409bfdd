use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, SqlErr,
};

use super::entity;
use super::models::{CreateUser, UpdateUser, User};
use super::repository::UserRepository;
use crate::error::{ShareItError, ShareItResult};

pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn email_taken(&self, email: &str, except: Option<i64>) -> ShareItResult<bool> {
        let mut query = entity::Entity::find()
            .filter(Expr::cust_with_values("LOWER(email) = ?", [email.to_lowercase()]));
        if let Some(id) = except {
            query = query.filter(entity::Column::Id.ne(id));
        }

        Ok(query.one(&self.db).await?.is_some())
    }
}

/// The unique index on `LOWER(email)` catches races the pre-check misses.
fn map_write_error(err: DbErr, email: &str) -> ShareItError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ShareItError::DuplicateEmail(email.to_string())
        }
        _ => err.into(),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, input: CreateUser) -> ShareItResult<User> {
        if self.email_taken(&input.email, None).await? {
            return Err(ShareItError::DuplicateEmail(input.email));
        }

        let model = entity::ActiveModel {
            id: NotSet,
            name: Set(input.name),
            email: Set(input.email.clone()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_write_error(e, &input.email))?;

        tracing::info!(user_id = model.id, "Created user");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> ShareItResult<Option<User>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self) -> ShareItResult<Vec<User>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i64, input: UpdateUser) -> ShareItResult<User> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ShareItError::user_not_found(id))?;

        if let Some(ref email) = input.email {
            if self.email_taken(email, Some(id)).await? {
                return Err(ShareItError::DuplicateEmail(email.clone()));
            }
        }

        let email = input.email.clone().unwrap_or_else(|| model.email.clone());
        let mut active = model.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(new_email) = input.email {
            active.email = Set(new_email);
        }

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| map_write_error(e, &email))?;

        tracing::info!(user_id = id, "Updated user");
        Ok(updated.into())
    }

    async fn delete(&self, id: i64) -> ShareItResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(user_id = id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
