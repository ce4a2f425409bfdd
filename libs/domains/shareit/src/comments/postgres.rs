use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use super::entity::{self, Column};
use super::models::{Comment, NewComment};
use super::repository::CommentRepository;
use crate::error::ShareItResult;

pub struct PgCommentRepository {
    db: DatabaseConnection,
}

impl PgCommentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, input: NewComment) -> ShareItResult<Comment> {
        let model = entity::ActiveModel {
            id: NotSet,
            text: Set(input.text),
            item_id: Set(input.item_id),
            author_id: Set(input.author_id),
            created: Set(input.created.into()),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(
            comment_id = model.id,
            item_id = model.item_id,
            author_id = model.author_id,
            "Created comment"
        );
        Ok(model.into())
    }

    async fn list_by_item(&self, item_id: i64) -> ShareItResult<Vec<Comment>> {
        let models = entity::Entity::find()
            .filter(Column::ItemId.eq(item_id))
            .order_by_asc(Column::Created)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete_by_items(&self, item_ids: Vec<i64>) -> ShareItResult<u64> {
        if item_ids.is_empty() {
            return Ok(0);
        }

        let result = entity::Entity::delete_many()
            .filter(Column::ItemId.is_in(item_ids))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete_by_author(&self, author_id: i64) -> ShareItResult<u64> {
        let result = entity::Entity::delete_many()
            .filter(Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
