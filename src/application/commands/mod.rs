//! 应用层 - 命令
//!
//! 每个用户动作一个命令及其处理器

mod process_commands;

pub mod handlers;

pub use process_commands::*;
