//! Resource SDK: schema-driven generic REST resources with a query-string compiler,
//! a tag validator and a field merge engine.

pub mod case;
pub mod config;
pub mod error;
pub mod handlers;
pub mod merge;
pub mod query;
pub mod record;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;
pub mod validate;
pub mod value;

pub use config::{load_from_path, load_from_str, resolve, Registry, RegistryConfig, Schema};
pub use error::{AppError, ConfigError};
pub use merge::{MergeMode, MergeRule};
pub use query::{compile, QuerySpec};
pub use record::{Record, Resource};
pub use response::{success_created, success_many, success_one};
pub use routes::{app, common_routes, entity_routes};
pub use service::{Lifecycle, Plain, ResourceService, Stamped};
pub use settings::Settings;
pub use state::AppState;
pub use store::{MemoryStore, PgStore, Store};
pub use validate::{validate_record, Validator, Verdict};
pub use value::{FieldKind, Value};
