pub mod prize;

pub use prize::*;
