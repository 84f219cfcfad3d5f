pub mod attendee_queries;
pub mod ticket_queries;
