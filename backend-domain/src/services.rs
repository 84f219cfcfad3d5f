// Pure domain services
pub mod roster_parser;
pub mod ticket_assigner;

pub use roster_parser::*;
pub use ticket_assigner::*;
