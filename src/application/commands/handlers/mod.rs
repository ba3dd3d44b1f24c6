//! Command Handlers 实现

mod process_handlers;

pub use process_handlers::*;
