pub mod geo;
pub mod page;
pub mod rating;
pub mod stats;
pub mod survey;
