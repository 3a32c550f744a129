use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::dates::{SystemClock, TimeSource};
use models::cat as cat_entity;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
    Select,
};
use tracing::debug;

use crate::cat::domain::{
    Cat, CatFilter, CatID, CatSortKey, CatSortPredicates, Page, PartialUpdateCat, ResultCount,
    SortOrder, UnsavedCat,
};
use crate::cat::repository::CatRepository;
use crate::errors::ServiceError;

/// SeaORM-backed record store.
pub struct SeaOrmCatRepository {
    pub db: DatabaseConnection,
    clock: Arc<dyn TimeSource>,
}

impl SeaOrmCatRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self::with_clock(db, Arc::new(SystemClock)) }

    /// `clock` stamps `updated_at` on metadata updates.
    pub fn with_clock(db: DatabaseConnection, clock: Arc<dyn TimeSource>) -> Self {
        Self { db, clock }
    }
}

fn to_cat(m: cat_entity::Model) -> Cat {
    Cat {
        id: CatID::new(m.id),
        name: m.name,
        ctime: m.created_at.with_timezone(&Utc),
        mtime: m.updated_at.with_timezone(&Utc),
        url: m.url,
    }
}

fn filtered(cat_filter: &CatFilter) -> Select<cat_entity::Entity> {
    let mut q = cat_entity::Entity::find();
    if let Some(id) = &cat_filter.cat_id {
        q = q.filter(cat_entity::Column::Id.eq(id.as_str()));
    }
    if let Some(name) = &cat_filter.name {
        q = q.filter(cat_entity::Column::Name.eq(name.as_str()));
    }
    q
}

fn column(key: CatSortKey) -> cat_entity::Column {
    match key {
        CatSortKey::Id => cat_entity::Column::Id,
        CatSortKey::Name => cat_entity::Column::Name,
        CatSortKey::Ctime => cat_entity::Column::CreatedAt,
        CatSortKey::Mtime => cat_entity::Column::UpdatedAt,
    }
}

fn order(order: SortOrder) -> Order {
    match order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

/// Apply predicates in priority order; id ascending breaks remaining ties.
fn sorted(
    mut q: Select<cat_entity::Entity>,
    cat_sort_params: &CatSortPredicates,
) -> Select<cat_entity::Entity> {
    for p in cat_sort_params {
        q = q.order_by(column(p.key), order(p.order));
    }
    if !cat_sort_params.iter().any(|p| p.key == CatSortKey::Id) {
        q = q.order_by_asc(cat_entity::Column::Id);
    }
    q
}

#[async_trait]
impl CatRepository for SeaOrmCatRepository {
    async fn create_cat(
        &self,
        new_cat: UnsavedCat,
        now: DateTime<Utc>,
    ) -> Result<Cat, ServiceError> {
        let created = cat_entity::create(&self.db, &new_cat.name, now).await?;
        Ok(to_cat(created))
    }

    async fn find_one(&self, cat_filter: CatFilter) -> Result<Option<Cat>, ServiceError> {
        let res = sorted(filtered(&cat_filter), &Vec::new()).one(&self.db).await?;
        Ok(res.map(to_cat))
    }

    async fn find_many(
        &self,
        cat_filter: CatFilter,
        cat_sort_params: CatSortPredicates,
        page: Page,
    ) -> Result<Vec<Cat>, ServiceError> {
        let (page_idx, per_page) = page.normalize();
        // SeaORM's paginate uses 0-based page index internally via fetch_page
        let rows = sorted(filtered(&cat_filter), &cat_sort_params)
            .paginate(&self.db, per_page)
            .fetch_page(page_idx)
            .await?;
        debug!(rows = rows.len(), page_idx, per_page, "cats_fetched");
        Ok(rows.into_iter().map(to_cat).collect())
    }

    async fn delete_one(&self, cat_id: CatID) -> Result<(), ServiceError> {
        let rows = cat_entity::hard_delete(&self.db, cat_id.as_str()).await?;
        debug!(%cat_id, rows, "cat_delete_executed");
        Ok(())
    }

    async fn update_cat_metadata(
        &self,
        cat_id: CatID,
        partial_update: PartialUpdateCat,
    ) -> Result<ResultCount, ServiceError> {
        let now = self.clock.utcnow();
        let url = partial_update.url.as_deref();
        let rows = cat_entity::update_metadata(&self.db, cat_id.as_str(), url, now).await?;
        Ok(ResultCount::new(rows))
    }
}
