pub mod dlq_service;

pub use dlq_service::{DlqService, DlqServiceImpl, ServiceError, ServiceResult};
