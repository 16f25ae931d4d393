// src/lib.rs
// Public library surface for the binary, integration tests and the probe tool.

pub mod api;
pub mod categories;
pub mod error;
pub mod i18n;
pub mod icons;
pub mod ingest;
pub mod metrics;
pub mod page;
pub mod resolver;
pub mod selection;
pub mod service;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::categories::{Category, CATEGORIES};
pub use crate::error::NewsError;
pub use crate::ingest::types::NewsItem;
pub use crate::service::NewsService;
