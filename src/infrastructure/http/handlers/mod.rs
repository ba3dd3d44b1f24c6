//! HTTP Handlers

mod ping;
mod process;
mod status;
mod websocket;

pub use ping::*;
pub use process::*;
pub use status::*;
pub use websocket::*;
