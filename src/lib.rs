//! Entity Sheet - renders entity JSON documents onto entity pages

pub mod core;
pub mod document;
pub mod fetch;
pub mod init;
pub mod interaction;
pub mod renderer;
pub mod view;

pub use crate::core::config::{LoadOptions, RendererConfig};
pub use crate::core::error::{EntityError, FetchError, Result, SchemaError};
pub use crate::document::EntityDocument;
pub use crate::init::InitCoordinator;
pub use crate::renderer::{EntityRenderer, RenderResult};
