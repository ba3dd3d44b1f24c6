//! Worker Layer - Background Task Processing
//!
//! TaskOrchestrator 为每个任务启动独立的执行单元

mod orchestrator;
mod tasks;

pub use orchestrator::{TaskOrchestrator, TaskOrchestratorConfig, UnitModels};
