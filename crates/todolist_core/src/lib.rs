pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod reminder;
pub mod storage;
pub mod todo_api;
