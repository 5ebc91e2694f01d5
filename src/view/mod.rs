//! View layer: pure patch planning plus the page surface that applies it

pub mod page;
pub mod patch;

pub use page::{Link, Page, PageSurface};
pub use patch::{plan, Anchor, ViewNode, ViewPatch};
