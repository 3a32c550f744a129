//! Cat module: domain types, record store abstraction, store implementations and the
//! domain service that forwards to them.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use repository::CatRepository;
pub use service::CatService;
