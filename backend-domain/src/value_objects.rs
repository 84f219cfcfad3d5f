// Domain value objects
pub mod gateway_backend;
pub mod identifiers;

pub use gateway_backend::*;
pub use identifiers::*;
