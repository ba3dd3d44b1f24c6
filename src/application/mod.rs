//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（InferenceEngine、TaskDispatcher、Availability）
//! - commands: 用户动作命令及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{
    handlers::{ProcessImageHandler, RefreshAvailabilityHandler, TranslateTextHandler},
    Mode, ProcessImageCommand, ProgressRelay, RefreshAvailabilityCommand,
    RefreshAvailabilityResponse, TranslateTextCommand,
};

pub use error::ApplicationError;

pub use ports::{
    // Availability
    AvailabilityPort,
    AvailabilitySnapshot,
    AvailabilityState,
    // Inference engine
    GenerateOptions,
    GenerateRequest,
    InferenceEnginePort,
    InferenceError,
    // Task dispatcher
    TaskDispatcherPort,
    UnitHandle,
    UnitMessage,
};
