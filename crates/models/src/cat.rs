use chrono::{DateTime, Utc};
use sea_orm::{entity::prelude::*, sea_query::Expr, DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

pub const MAX_NAME_LEN: usize = 128;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cat")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() { return Err(ModelError::Validation("name required".into())); }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ModelError::Validation(format!("name longer than {MAX_NAME_LEN} characters")));
    }
    Ok(())
}

/// 24 hex digits: seconds since epoch followed by 64 random bits.
///
/// The time prefix saturates: instants before 1970 read as `00000000` and
/// instants past 2106 as `ffffffff`.
pub fn new_id(now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    let secs = u32::try_from(now.timestamp().max(0)).unwrap_or(u32::MAX);
    format!("{secs:08x}{}", &random[..16])
}

/// Insert a cat; `now` becomes both creation and modification time.
pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    now: DateTime<Utc>,
) -> Result<Model, ModelError> {
    validate_name(name)?;
    let stamp: DateTimeWithTimeZone = now.into();
    let am = ActiveModel {
        id: Set(new_id(now)),
        name: Set(name.to_string()),
        url: Set(None),
        created_at: Set(stamp),
        updated_at: Set(stamp),
    };
    Ok(am.insert(db).await?)
}

/// Set metadata fields that are present and bump `updated_at`. Returns affected rows.
pub async fn update_metadata(
    db: &DatabaseConnection,
    id: &str,
    url: Option<&str>,
    now: DateTime<Utc>,
) -> Result<u64, ModelError> {
    let stamp: DateTimeWithTimeZone = now.into();
    let mut update = Entity::update_many().col_expr(Column::UpdatedAt, Expr::value(stamp));
    if let Some(url) = url {
        update = update.col_expr(Column::Url, Expr::value(url.to_string()));
    }
    let res = update.filter(Column::Id.eq(id)).exec(db).await?;
    Ok(res.rows_affected)
}

pub async fn hard_delete(db: &DatabaseConnection, id: &str) -> Result<u64, ModelError> {
    let res = Entity::delete_by_id(id.to_string()).exec(db).await?;
    Ok(res.rows_affected)
}
