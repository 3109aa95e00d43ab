pub mod prize_service;

pub use prize_service::*;
