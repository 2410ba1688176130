pub mod assignment;
pub mod delivery;

pub use assignment::{assignment_order, find_idle_agent, Assignment};
pub use delivery::{DeliveryReceipt, Message};
