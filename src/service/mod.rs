//! ResourceService: generic list/read/create/update/delete over any registered schema.

mod crud;
mod lifecycle;
pub use crud::ResourceService;
pub use lifecycle::{check, Lifecycle, Plain, Stamped};
