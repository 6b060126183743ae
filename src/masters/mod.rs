//! Master data: cities, clients and rate records

pub mod city;
pub mod rate_book;
pub mod rate_record;

pub use city::*;
pub use rate_book::*;
pub use rate_record::*;
