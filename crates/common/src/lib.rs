//! Shared building blocks for the cat workspace.
//! - `dates`: injectable time source used for timestamp stamping.
//! - `utils::logging`: tracing subscriber initialisation.

pub mod dates;
pub mod utils;
