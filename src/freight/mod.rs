//! Freight rating: CFT weight, rate resolution, freight and balance freight

pub mod balance;
pub mod calculator;
pub mod cft;
pub mod ftl;
pub mod matcher;
pub mod trace;

pub use balance::*;
pub use calculator::*;
pub use cft::*;
pub use ftl::*;
pub use matcher::*;
pub use trace::*;
