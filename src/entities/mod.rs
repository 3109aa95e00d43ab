pub mod prizes;

pub use prizes as prize_entity;
pub use prizes::PrizeStatus;
