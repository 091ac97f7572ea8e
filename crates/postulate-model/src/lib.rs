pub mod failure;
pub mod signature;
pub mod source;
pub mod supplier;
pub mod value;
