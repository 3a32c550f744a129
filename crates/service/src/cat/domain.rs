use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

pub use crate::pagination::Page;

/// Opaque cat identifier assigned by the record store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatID(String);

impl CatID {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CatID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<String> for CatID {
    fn from(id: String) -> Self { Self(id) }
}

impl From<&str> for CatID {
    fn from(id: &str) -> Self { Self(id.to_string()) }
}

/// Persisted cat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cat {
    pub id: CatID,
    pub name: String,
    pub ctime: DateTime<Utc>,
    pub mtime: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Creation input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsavedCat {
    pub name: String,
}

impl UnsavedCat {
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into() } }
}

/// Sparse metadata update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialUpdateCat {
    #[serde(default)]
    pub url: Option<String>,
}

impl PartialUpdateCat {
    pub fn url(url: impl Into<String>) -> Self { Self { url: Some(url.into()) } }

    pub fn is_empty(&self) -> bool { self.url.is_none() }
}

/// Selection predicates. Every predicate that is set must match; an empty filter
/// matches all cats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatFilter {
    #[serde(default)]
    pub cat_id: Option<CatID>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CatFilter {
    pub fn by_id(cat_id: impl Into<CatID>) -> Self {
        Self { cat_id: Some(cat_id.into()), ..Default::default() }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Default::default() }
    }

    pub fn matches(&self, cat: &Cat) -> bool {
        self.cat_id.as_ref().map_or(true, |id| *id == cat.id)
            && self.name.as_deref().map_or(true, |name| name == cat.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatSortKey {
    Id,
    Name,
    Ctime,
    Mtime,
}

impl FromStr for CatSortKey {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(CatSortKey::Id),
            "name" => Ok(CatSortKey::Name),
            "ctime" => Ok(CatSortKey::Ctime),
            "mtime" => Ok(CatSortKey::Mtime),
            other => Err(ServiceError::Validation(format!("unknown sort key '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ServiceError::Validation(format!("unknown sort order '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatSortPredicate {
    pub key: CatSortKey,
    pub order: SortOrder,
}

impl CatSortPredicate {
    pub fn new(key: CatSortKey, order: SortOrder) -> Self { Self { key, order } }

    pub fn compare(&self, a: &Cat, b: &Cat) -> Ordering {
        let ord = match self.key {
            CatSortKey::Id => a.id.cmp(&b.id),
            CatSortKey::Name => a.name.cmp(&b.name),
            CatSortKey::Ctime => a.ctime.cmp(&b.ctime),
            CatSortKey::Mtime => a.mtime.cmp(&b.mtime),
        };
        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

/// `key` or `key:order`, e.g. `name:desc`
impl FromStr for CatSortPredicate {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, order) = match s.split_once(':') {
            Some((key, order)) => (key.parse()?, order.parse()?),
            None => (s.parse()?, SortOrder::Asc),
        };
        Ok(Self { key, order })
    }
}

/// Sort predicates in priority order; the first one is the primary key.
pub type CatSortPredicates = Vec<CatSortPredicate>;

/// Parse a comma separated list such as `id:asc,name:desc`. Blank input yields no predicates.
pub fn parse_sort_params(s: &str) -> Result<CatSortPredicates, ServiceError> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse::<CatSortPredicate>)
        .collect()
}

/// Number of records a mutation touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCount {
    pub count: u64,
}

impl ResultCount {
    pub fn new(count: u64) -> Self { Self { count } }
}
