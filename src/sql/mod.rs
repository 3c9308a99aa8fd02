//! Safe SQL builder: identifiers from descriptors only, values as typed parameters.

mod builder;
pub mod params;
pub use builder::{insert, select, select_by_id, update, QueryBuf};
pub use params::PgBindValue;
