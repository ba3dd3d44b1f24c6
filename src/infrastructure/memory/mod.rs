//! Memory Layer - In-Memory State Management
//!
//! 进程内唯一的共享状态：推理服务可用性

mod availability;

pub use availability::{AvailabilityMonitor, AvailabilityMonitorConfig, AvailabilityProbeLoop};
