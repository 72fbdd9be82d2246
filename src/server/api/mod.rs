pub mod channel_controller;
pub mod guide_controller;
pub mod health_controller;
pub mod ruv_controller;
