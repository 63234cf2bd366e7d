use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{sea_query::OnConflict, DatabaseConnection, QueryOrder, Set};

use crate::errors::ModelError;
use crate::record::{ContentRecord, RouteContent};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "json_routes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub route: String,
    pub kind: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the stored row; fails only for this row when its content is corrupt.
    pub fn to_record(&self) -> Result<ContentRecord, ModelError> {
        let content = RouteContent::from_column(&self.kind, &self.content)?;
        Ok(ContentRecord { route: self.route.clone(), content })
    }
}

fn db_err(e: DbErr) -> ModelError {
    ModelError::Db(e.to_string())
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, ModelError> {
    Entity::find().order_by_asc(Column::Route).all(db).await.map_err(db_err)
}

pub async fn find(db: &DatabaseConnection, route: &str) -> Result<Option<Model>, ModelError> {
    Entity::find_by_id(route.to_string()).one(db).await.map_err(db_err)
}

/// Insert or fully replace the row for `route`. `created_at` is kept on conflict.
pub async fn upsert(db: &DatabaseConnection, route: &str, content: &RouteContent) -> Result<(), ModelError> {
    let text = content.to_column_text()?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let am = ActiveModel {
        route: Set(route.to_string()),
        kind: Set(content.kind().as_str().to_string()),
        content: Set(text),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Entity::insert(am)
        .on_conflict(
            OnConflict::column(Column::Route)
                .update_columns([Column::Kind, Column::Content, Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await
        .map_err(db_err)?;
    Ok(())
}

/// Delete the row for `route`; returns whether it existed.
pub async fn delete(db: &DatabaseConnection, route: &str) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(route.to_string()).exec(db).await.map_err(db_err)?;
    Ok(res.rows_affected > 0)
}
