//! contencioso-core — ingestion, normalization and aggregation engine for
//! the litigation-portfolio dashboard.
//!
//! The pipeline turns heterogeneous spreadsheet exports into one canonical
//! case table and answers a fixed catalog of pre-aggregated views over it:
//!
//!   1. `source`   reads a workbook export and picks the right sheet
//!   2. `resolver` maps source headers onto the canonical schema
//!   3. `derive`   computes status, SLA, criticality and the other flags
//!   4. `merge`    reconciles the principal base with the newer one
//!   5. `store`    publishes the table as an immutable snapshot
//!   6. `filter` + `views` answer dashboard queries, JSON-safe
//!
//! The HTTP layer lives outside this crate: it parses parameters, calls
//! `filter::apply_filters` and one view function, and maps errors to
//! responses.

pub mod config;
pub mod derive;
pub mod error;
pub mod filter;
pub mod loader;
pub mod merge;
pub mod raw;
pub mod record;
pub mod resolver;
pub mod sanitize;
pub mod source;
pub mod storage;
pub mod store;
pub mod types;
pub mod views;

pub use error::{CoreError, CoreResult};
pub use record::{CaseRecord, CaseTable, Sentenca, Status};
pub use store::TableStore;
