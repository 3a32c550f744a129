use std::sync::Arc;

use common::dates::{SystemClock, TimeSource};
use tracing::{debug, info, instrument};

use super::domain::{
    Cat, CatFilter, CatID, CatSortPredicates, Page, PartialUpdateCat, ResultCount, UnsavedCat,
};
use super::repository::CatRepository;
use crate::errors::ServiceError;

/// Cat domain service.
///
/// Stamps the creation time and otherwise hands every call to the record store,
/// returning whatever the store returns. Holds no state of its own.
pub struct CatService<R: CatRepository, C: TimeSource = SystemClock> {
    repo: Arc<R>,
    clock: Arc<C>,
}

impl<R: CatRepository, C: TimeSource> Clone for CatService<R, C> {
    fn clone(&self) -> Self {
        Self { repo: Arc::clone(&self.repo), clock: Arc::clone(&self.clock) }
    }
}

impl<R: CatRepository> CatService<R, SystemClock> {
    pub fn with_system_clock(repo: Arc<R>) -> Self { Self::new(repo, Arc::new(SystemClock)) }
}

impl<R: CatRepository, C: TimeSource> CatService<R, C> {
    pub fn new(repo: Arc<R>, clock: Arc<C>) -> Self { Self { repo, clock } }

    /// Create a cat stamped with the current time.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use chrono::TimeZone;
    /// use common::dates::mock::FixedClock;
    /// use service::cat::{CatService, repository::mock::MockCatRepository, domain::UnsavedCat};
    /// let now = chrono::Utc.with_ymd_and_hms(2019, 1, 1, 23, 59, 0).unwrap();
    /// let repo = Arc::new(MockCatRepository::default());
    /// let svc = CatService::new(repo, Arc::new(FixedClock::new(now)));
    /// let cat = tokio_test::block_on(svc.create_cat(UnsavedCat::new("Sammybridge Cat"))).unwrap();
    /// assert_eq!(cat.name, "Sammybridge Cat");
    /// assert_eq!(cat.ctime, now);
    /// ```
    #[instrument(skip(self, new_cat), fields(name = %new_cat.name))]
    pub async fn create_cat(&self, new_cat: UnsavedCat) -> Result<Cat, ServiceError> {
        let now = self.clock.utcnow();
        let cat = self.repo.create_cat(new_cat, now).await?;
        info!(cat_id = %cat.id, %now, "cat_created");
        Ok(cat)
    }

    /// Find the first cat matching `cat_filter`, if any.
    #[instrument(skip(self))]
    pub async fn find_one(&self, cat_filter: CatFilter) -> Result<Option<Cat>, ServiceError> {
        let found = self.repo.find_one(cat_filter).await?;
        debug!(found = found.is_some(), "cat_lookup");
        Ok(found)
    }

    /// List cats; sorting and paging are executed by the store.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::cat::{CatService, repository::mock::MockCatRepository};
    /// use service::cat::domain::{CatFilter, Page, UnsavedCat, parse_sort_params};
    /// let svc = CatService::with_system_clock(Arc::new(MockCatRepository::default()));
    /// for name in ["Tom", "Felix", "Garfield"] {
    ///     tokio_test::block_on(svc.create_cat(UnsavedCat::new(name))).unwrap();
    /// }
    /// let sort = parse_sort_params("name:asc").unwrap();
    /// let listing = svc.find_many(CatFilter::default(), sort, Page::new(1, 2));
    /// let page = tokio_test::block_on(listing).unwrap();
    /// let names: Vec<_> = page.iter().map(|c| c.name.as_str()).collect();
    /// assert_eq!(names, ["Felix", "Garfield"]);
    /// ```
    #[instrument(
        skip(self, cat_sort_params, page),
        fields(sort_keys = cat_sort_params.len(), page = page.number, per_page = page.size)
    )]
    pub async fn find_many(
        &self,
        cat_filter: CatFilter,
        cat_sort_params: CatSortPredicates,
        page: Page,
    ) -> Result<Vec<Cat>, ServiceError> {
        let cats = self.repo.find_many(cat_filter, cat_sort_params, page).await?;
        debug!(count = cats.len(), "cats_listed");
        Ok(cats)
    }

    /// Delete a cat. Whether a missing id is an error is up to the store.
    #[instrument(skip(self, cat_id), fields(cat_id = %cat_id))]
    pub async fn delete_one(&self, cat_id: CatID) -> Result<(), ServiceError> {
        self.repo.delete_one(cat_id.clone()).await?;
        info!(%cat_id, "cat_deleted");
        Ok(())
    }

    /// Merge `partial_update` into a cat. The store stamps `mtime`.
    #[instrument(
        skip(self, cat_id, partial_update),
        fields(cat_id = %cat_id, has_url = partial_update.url.is_some())
    )]
    pub async fn update_cat_metadata(
        &self,
        cat_id: CatID,
        partial_update: PartialUpdateCat,
    ) -> Result<ResultCount, ServiceError> {
        let result = self.repo.update_cat_metadata(cat_id, partial_update).await?;
        info!(count = result.count, "cat_metadata_updated");
        Ok(result)
    }
}
