use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect,
};

use super::entity::{self, Column};
use super::models::{Item, NewItem, UpdateItem};
use super::repository::ItemRepository;
use crate::error::{ShareItError, ShareItResult};
use crate::pagination::PageParams;

pub struct PgItemRepository {
    db: DatabaseConnection,
}

impl PgItemRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// `LIKE` pattern matching `text` anywhere, with wildcards in the input escaped.
fn contains_pattern(text: &str) -> String {
    let escaped = text
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn create(&self, input: NewItem) -> ShareItResult<Item> {
        let model = entity::ActiveModel {
            id: NotSet,
            name: Set(input.name),
            description: Set(input.description),
            available: Set(input.available),
            owner_id: Set(input.owner_id),
            request_id: Set(input.request_id),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(item_id = model.id, owner_id = model.owner_id, "Created item");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> ShareItResult<Option<Item>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn update(&self, id: i64, input: UpdateItem) -> ShareItResult<Item> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ShareItError::item_not_found(id))?;

        let mut active = model.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(available) = input.available {
            active.available = Set(available);
        }

        let updated = active.update(&self.db).await?;

        tracing::info!(item_id = id, "Updated item");
        Ok(updated.into())
    }

    async fn delete(&self, id: i64) -> ShareItResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(item_id = id, "Deleted item");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete_by_owner(&self, owner_id: i64) -> ShareItResult<Vec<i64>> {
        let ids = self.ids_by_owner(owner_id).await?;
        if ids.is_empty() {
            return Ok(ids);
        }

        entity::Entity::delete_many()
            .filter(Column::OwnerId.eq(owner_id))
            .exec(&self.db)
            .await?;

        tracing::info!(owner_id, count = ids.len(), "Deleted owner's items");
        Ok(ids)
    }

    async fn detach_requests(&self, request_ids: Vec<i64>) -> ShareItResult<()> {
        if request_ids.is_empty() {
            return Ok(());
        }

        entity::Entity::update_many()
            .col_expr(Column::RequestId, Expr::value(Option::<i64>::None))
            .filter(Column::RequestId.is_in(request_ids))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: i64, page: PageParams) -> ShareItResult<Vec<Item>> {
        let models = entity::Entity::find()
            .filter(Column::OwnerId.eq(owner_id))
            .order_by_asc(Column::Id)
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn ids_by_owner(&self, owner_id: i64) -> ShareItResult<Vec<i64>> {
        let ids = entity::Entity::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::OwnerId.eq(owner_id))
            .order_by_asc(Column::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await?;

        Ok(ids)
    }

    async fn search(&self, text: String, page: PageParams) -> ShareItResult<Vec<Item>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = contains_pattern(text);
        let models = entity::Entity::find()
            .filter(Column::Available.eq(true))
            .filter(Expr::cust_with_values(
                "(LOWER(name) LIKE ? OR LOWER(description) LIKE ?)",
                [pattern.clone(), pattern],
            ))
            .order_by_asc(Column::Id)
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_by_requests(&self, request_ids: Vec<i64>) -> ShareItResult<Vec<Item>> {
        if request_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = entity::Entity::find()
            .filter(Column::RequestId.is_in(request_ids))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
