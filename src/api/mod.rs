pub mod health;
pub mod swagger;
