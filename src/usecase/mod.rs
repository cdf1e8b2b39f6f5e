pub mod contracts;
pub mod error;
pub mod ratings;
pub mod stats;
pub mod surveys;
