pub mod memory_gateway;
pub mod sqlite_gateway;

pub use memory_gateway::*;
pub use sqlite_gateway::*;
