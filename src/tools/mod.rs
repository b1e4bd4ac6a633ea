//! Tool abstraction and the desktop tool set.

pub mod desktop;
pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::*;
