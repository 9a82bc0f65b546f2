//! # taskdeck-core
//!
//! Core types, traits, and engines for taskdeck.
//!
//! This crate owns the domain model (todos, categories, tags), the error
//! taxonomy, the due-date policy, and the two engines that implement todo
//! behavior: [`TodoService`] for mutations and [`TodoSearchEngine`] for
//! filtered listing. Storage and identity are reached only through the traits
//! in [`traits`], implemented by `taskdeck-db` for PostgreSQL and by
//! [`mock::InMemoryStore`] for tests.
//!
//! ## Log levels
//!
//! Spans carry `subsystem`, `component` and `op` fields. WARN marks a
//! best-effort step that failed and was swallowed (category counters), INFO a
//! completed mutation or lifecycle event, DEBUG a decision point.

pub mod error;
pub mod models;
pub mod patch;
pub mod search;
pub mod service;
pub mod temporal;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types at crate root
pub use error::{Error, Result, ValidationErrors};
pub use models::*;
pub use patch::Patch;
pub use search::*;
pub use service::{
    CatalogService, TodoSearchEngine, TodoService, CATEGORY_NOT_OWNED_MESSAGE,
    TAGS_NOT_OWNED_MESSAGE,
};
pub use temporal::{
    is_before_today, parse_date, Clock, FixedClock, SystemClock, DATE_FORMAT, INVALID_DATE_MESSAGE,
    PAST_DUE_DATE_MESSAGE,
};
pub use traits::*;
