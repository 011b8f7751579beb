//! Data types shared by the layout engine and the viewer.

mod selection;
mod sheet;

pub use selection::*;
pub use sheet::*;
