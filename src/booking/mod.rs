//! Booking records, lifecycle restrictions and the calculation session

pub mod lifecycle;
pub mod lr;
pub mod session;

pub use lifecycle::*;
pub use lr::*;
pub use session::*;
