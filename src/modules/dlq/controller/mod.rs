pub mod dlq_controller;

pub use dlq_controller::{json_config, AddMessageResponse, Confirmation, DEFAULT_MAX_BODY_BYTES};
