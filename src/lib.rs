//! q-desktop: desktop automation tools for a host automation runtime.

pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod plugin;
pub mod tools;
