pub mod config;
pub mod error;

pub use config::{LoadOptions, RendererConfig};
pub use error::{EntityError, FetchError, Result, SchemaError};
