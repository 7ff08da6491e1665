#![forbid(unsafe_code)]

pub mod generator;
pub mod model;
pub mod time;

pub use generator::ProblemGenerator;
pub use time::Clock;
