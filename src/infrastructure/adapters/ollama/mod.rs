//! Ollama Adapter - 本地推理服务客户端实现

mod http_ollama_client;
pub mod normalizer;
mod scripted_client;

pub use http_ollama_client::{HttpOllamaClient, HttpOllamaClientConfig};
pub use scripted_client::{ScriptedCall, ScriptedInferenceClient};
