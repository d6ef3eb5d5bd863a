pub mod catalog;
pub mod config;
pub mod criteria;
pub mod error;
pub mod locations;
pub mod pipeline;
pub mod prefs;
pub mod render;
pub mod service;
pub mod session;
pub mod telemetry;
pub mod web;

pub use catalog::{CatalogLoader, CreatureRecord};
pub use criteria::{FilterCriteria, Selection};
pub use pipeline::{filter_and_group, AggregatedEntry, GroupedTables, LocationGroup};
pub use render::{render_tables, Layout};
