/// 死信队列模块 / Dead-letter queue module
///
/// model → repo → service → controller，routes 负责挂载。
pub mod controller;
pub mod model;
pub mod repo;
pub mod routes;
pub mod service;

pub use model::{Message, NewMessage};
pub use repo::{MemoryMessageRepository, MessageRepository, PgMessageRepository};
pub use service::{DlqService, DlqServiceImpl, ServiceError};
