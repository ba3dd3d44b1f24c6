//! Application State
//!
//! 路由共享的端口与命令处理器

use std::sync::Arc;

use crate::application::{
    AvailabilityPort, ProcessImageHandler, RefreshAvailabilityHandler, TaskDispatcherPort,
    TranslateTextHandler,
};

/// 应用状态
pub struct AppState {
    pub availability: Arc<dyn AvailabilityPort>,

    pub process_image_handler: ProcessImageHandler,
    pub translate_text_handler: TranslateTextHandler,
    pub refresh_availability_handler: RefreshAvailabilityHandler,
}

impl AppState {
    pub fn new(
        dispatcher: Arc<dyn TaskDispatcherPort>,
        availability: Arc<dyn AvailabilityPort>,
    ) -> Self {
        Self {
            availability: availability.clone(),
            process_image_handler: ProcessImageHandler::new(dispatcher.clone()),
            translate_text_handler: TranslateTextHandler::new(dispatcher),
            refresh_availability_handler: RefreshAvailabilityHandler::new(availability),
        }
    }
}
