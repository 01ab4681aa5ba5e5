pub mod assignment;
pub mod scheduled_event;

pub use assignment::*;
pub use scheduled_event::*;
