pub mod assignment;
pub mod data_point;
pub mod expand;
pub mod signal;
pub mod supplier;
