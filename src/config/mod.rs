pub mod loader;
pub mod types;

pub use loader::{load_configuration_file, parse_configuration_json, resolve_configuration};
pub use types::{Category, Configuration};
