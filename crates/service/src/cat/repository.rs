use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::domain::{
    Cat, CatFilter, CatID, CatSortPredicates, Page, PartialUpdateCat, ResultCount, UnsavedCat,
};
use crate::errors::ServiceError;

/// Record store abstraction for cats.
///
/// Stores own the record lifecycle: they assign identifiers, keep `ctime` fixed,
/// bump `mtime` on updates and decide how sorting and paging are executed.
#[async_trait]
pub trait CatRepository: Send + Sync {
    async fn create_cat(
        &self,
        new_cat: UnsavedCat,
        now: DateTime<Utc>,
    ) -> Result<Cat, ServiceError>;
    async fn find_one(&self, cat_filter: CatFilter) -> Result<Option<Cat>, ServiceError>;
    async fn find_many(
        &self,
        cat_filter: CatFilter,
        cat_sort_params: CatSortPredicates,
        page: Page,
    ) -> Result<Vec<Cat>, ServiceError>;
    async fn delete_one(&self, cat_id: CatID) -> Result<(), ServiceError>;
    async fn update_cat_metadata(
        &self,
        cat_id: CatID,
        partial_update: PartialUpdateCat,
    ) -> Result<ResultCount, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use common::dates::{SystemClock, TimeSource};
    use crate::cat::domain::{CatSortKey, CatSortPredicate, SortOrder};

    pub struct MockCatRepository {
        cats: Mutex<HashMap<CatID, Cat>>, // key: cat id
        clock: Arc<dyn TimeSource>,       // stamps mtime on updates
    }

    impl Default for MockCatRepository {
        fn default() -> Self { Self::with_clock(Arc::new(SystemClock)) }
    }

    impl MockCatRepository {
        pub fn with_clock(clock: Arc<dyn TimeSource>) -> Self {
            Self { cats: Mutex::new(HashMap::new()), clock }
        }

        /// Seed records as they are, identifiers and timestamps included.
        pub fn with_cats(self, cats: impl IntoIterator<Item = Cat>) -> Self {
            {
                let mut map = self.cats.lock().unwrap();
                for cat in cats {
                    map.insert(cat.id.clone(), cat);
                }
            }
            self
        }

        pub fn len(&self) -> usize { self.cats.lock().unwrap().len() }

        pub fn is_empty(&self) -> bool { self.len() == 0 }

        fn matching(&self, cat_filter: &CatFilter) -> Vec<Cat> {
            let cats = self.cats.lock().unwrap();
            cats.values().filter(|c| cat_filter.matches(c)).cloned().collect()
        }

        fn sorted(mut cats: Vec<Cat>, params: &CatSortPredicates) -> Vec<Cat> {
            let tie_break = CatSortPredicate::new(CatSortKey::Id, SortOrder::Asc);
            cats.sort_by(|a, b| {
                params
                    .iter()
                    .chain(std::iter::once(&tie_break))
                    .map(|p| p.compare(a, b))
                    .find(|ord| ord.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            cats
        }
    }

    #[async_trait]
    impl CatRepository for MockCatRepository {
        async fn create_cat(
            &self,
            new_cat: UnsavedCat,
            now: DateTime<Utc>,
        ) -> Result<Cat, ServiceError> {
            models::cat::validate_name(&new_cat.name)?;
            let mut cats = self.cats.lock().unwrap();
            let id = CatID::new(models::cat::new_id(now));
            if cats.contains_key(&id) {
                return Err(ServiceError::Conflict(format!("cat {id} already exists")));
            }
            let cat = Cat { id: id.clone(), name: new_cat.name, ctime: now, mtime: now, url: None };
            cats.insert(id, cat.clone());
            Ok(cat)
        }

        async fn find_one(&self, cat_filter: CatFilter) -> Result<Option<Cat>, ServiceError> {
            let matching = self.matching(&cat_filter);
            Ok(Self::sorted(matching, &Vec::new()).into_iter().next())
        }

        async fn find_many(
            &self,
            cat_filter: CatFilter,
            cat_sort_params: CatSortPredicates,
            page: Page,
        ) -> Result<Vec<Cat>, ServiceError> {
            let matching = self.matching(&cat_filter);
            let (_, size) = page.normalize();
            Ok(Self::sorted(matching, &cat_sort_params)
                .into_iter()
                .skip(page.offset() as usize)
                .take(size as usize)
                .collect())
        }

        async fn delete_one(&self, cat_id: CatID) -> Result<(), ServiceError> {
            self.cats.lock().unwrap().remove(&cat_id);
            Ok(())
        }

        async fn update_cat_metadata(
            &self,
            cat_id: CatID,
            partial_update: PartialUpdateCat,
        ) -> Result<ResultCount, ServiceError> {
            let mut cats = self.cats.lock().unwrap();
            let Some(cat) = cats.get_mut(&cat_id) else {
                return Ok(ResultCount::new(0));
            };
            if let Some(url) = partial_update.url {
                cat.url = Some(url);
            }
            cat.mtime = self.clock.utcnow();
            Ok(ResultCount::new(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use common::dates::mock::FixedClock;

    use super::mock::MockCatRepository;
    use super::*;
    use crate::cat::domain::{CatSortKey, CatSortPredicate, SortOrder};

    fn at(day: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(2020, 1, day, 0, 0, 0).unwrap() }

    fn seeded() -> MockCatRepository {
        let cat = |id: &str, name: &str, day: u32| Cat {
            id: CatID::new(id),
            name: name.into(),
            ctime: at(day),
            mtime: at(day),
            url: None,
        };
        MockCatRepository::default().with_cats([
            cat("000000000000000000000101", "Sammybridge Cat", 3),
            cat("000000000000000000000102", "Alpha", 1),
            cat("000000000000000000000103", "Sammybridge Cat", 2),
            cat("000000000000000000000104", "Zulu", 4),
        ])
    }

    fn ids(cats: &[Cat]) -> Vec<&str> { cats.iter().map(|c| c.id.as_str()).collect() }

    #[tokio::test]
    async fn create_assigns_id_and_stamps_both_times() {
        let repo = MockCatRepository::default();
        let cat = repo.create_cat(UnsavedCat::new("Sammybridge Cat"), at(1)).await.unwrap();
        assert_eq!(cat.id.as_str().len(), 24);
        assert_eq!(cat.ctime, at(1));
        assert_eq!(cat.mtime, at(1));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let repo = MockCatRepository::default();
        let err = repo.create_cat(UnsavedCat::new("  "), at(1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn find_one_returns_none_when_nothing_matches() {
        let repo = seeded();
        assert!(repo.find_one(CatFilter::by_name("Nobody")).await.unwrap().is_none());
        let found =
            repo.find_one(CatFilter::by_id("000000000000000000000104")).await.unwrap().unwrap();
        assert_eq!(found.name, "Zulu");
    }

    #[tokio::test]
    async fn find_many_defaults_to_id_order() {
        let repo = seeded();
        let all = repo.find_many(CatFilter::default(), Vec::new(), Page::default()).await.unwrap();
        assert_eq!(
            ids(&all),
            [
                "000000000000000000000101",
                "000000000000000000000102",
                "000000000000000000000103",
                "000000000000000000000104",
            ]
        );
    }

    #[tokio::test]
    async fn find_many_applies_sort_predicates_in_priority_order() {
        let repo = seeded();
        let params = vec![
            CatSortPredicate::new(CatSortKey::Name, SortOrder::Desc),
            CatSortPredicate::new(CatSortKey::Ctime, SortOrder::Asc),
        ];
        let all = repo.find_many(CatFilter::default(), params, Page::default()).await.unwrap();
        assert_eq!(
            ids(&all),
            [
                "000000000000000000000104",
                "000000000000000000000103",
                "000000000000000000000101",
                "000000000000000000000102",
            ]
        );
    }

    #[tokio::test]
    async fn find_many_filters_then_pages() {
        let repo = seeded();
        let sammies = repo
            .find_many(CatFilter::by_name("Sammybridge Cat"), Vec::new(), Page::new(2, 1))
            .await
            .unwrap();
        assert_eq!(ids(&sammies), ["000000000000000000000103"]);
        let beyond =
            repo.find_many(CatFilter::default(), Vec::new(), Page::new(3, 2)).await.unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn update_sets_url_and_bumps_mtime_only() {
        let clock = Arc::new(FixedClock::new(at(9)));
        let existing =
            seeded().find_many(CatFilter::default(), Vec::new(), Page::default()).await.unwrap();
        let repo = MockCatRepository::with_clock(clock).with_cats(existing);
        let id = CatID::new("000000000000000000000101");

        let upd = PartialUpdateCat::url("http://placekitten.com/200/300");
        let n = repo.update_cat_metadata(id.clone(), upd).await.unwrap();
        assert_eq!(n, ResultCount::new(1));

        let cat = repo.find_one(CatFilter::by_id(id)).await.unwrap().unwrap();
        assert_eq!(cat.url.as_deref(), Some("http://placekitten.com/200/300"));
        assert_eq!(cat.ctime, at(3));
        assert_eq!(cat.mtime, at(9));
    }

    #[tokio::test]
    async fn update_of_missing_cat_counts_zero() {
        let repo = seeded();
        let n = repo
            .update_cat_metadata(CatID::new("ffffffffffffffffffffffff"), PartialUpdateCat::url("x"))
            .await
            .unwrap();
        assert_eq!(n.count, 0);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = seeded();
        let id = CatID::new("000000000000000000000102");
        repo.delete_one(id.clone()).await.unwrap();
        repo.delete_one(id.clone()).await.unwrap();
        assert_eq!(repo.len(), 3);
        assert!(repo.find_one(CatFilter::by_id(id)).await.unwrap().is_none());
    }
}
