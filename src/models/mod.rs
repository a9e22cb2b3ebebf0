pub mod customer;
pub mod showing;
pub mod ticket;

pub use customer::Customer;
pub use showing::Showing;
pub use ticket::{NewTicket, Ticket};
