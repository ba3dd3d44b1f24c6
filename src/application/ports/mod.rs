//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod availability;
mod inference_engine;
mod task_dispatcher;

pub use availability::{AvailabilityPort, AvailabilitySnapshot, AvailabilityState};
pub use inference_engine::{GenerateOptions, GenerateRequest, InferenceEnginePort, InferenceError};
pub use task_dispatcher::{TaskDispatcherPort, UnitHandle, UnitMessage};
