//! Service layer for cat records.
//! - `cat`: domain types, the record store abstraction and `CatService`.
//! - Separates business logic from data access; entities live in `models`.

pub mod errors;
pub mod pagination;
pub mod cat;
