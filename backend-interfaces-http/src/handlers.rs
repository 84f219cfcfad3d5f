pub mod attendee_handlers;
pub mod ops_handlers;
pub mod roster_handlers;
pub mod scan_handlers;
pub mod ticket_handlers;

pub use attendee_handlers::*;
pub use ops_handlers::*;
pub use roster_handlers::*;
pub use scan_handlers::*;
pub use ticket_handlers::*;
