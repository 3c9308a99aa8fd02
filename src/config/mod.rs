//! Resource descriptors and the schema registry built from them.

pub mod loader;
pub mod resolved;
pub mod types;
pub mod validator;

pub use loader::{load_from_path, load_from_str, resolve};
pub use resolved::{FieldDescriptor, Registry, Schema};
pub use types::*;
pub use validator::validate;
