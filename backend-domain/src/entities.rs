// Domain entities
pub mod attendee;
pub mod config;
pub mod queries;
pub mod roster;
pub mod scan;

pub use attendee::*;
pub use config::*;
pub use queries::*;
pub use roster::*;
pub use scan::*;
