pub mod class;
pub mod config;
pub mod execute;
pub mod invocation;
pub mod listener;
pub mod report;
pub mod runner;
pub mod validate;

pub use class::TheoryClass;
pub use runner::TheoryRunner;
