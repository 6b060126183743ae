//! # LR Freight Core
//!
//! Freight rate resolution and charge calculation for road-freight lorry
//! receipt (LR) bookings.
//!
//! ## Features
//!
//! - **CFT weight**: volumetric weight from box dimensions in cm or inches
//! - **Rate resolution**: matches client and route against Simple, CityWise,
//!   WeightSlab and PerBox rate master records
//! - **Freight calculation**: per-piece or by-weight freight with minimum
//!   freight, higher-of-weight and manual override tracking
//! - **GST**: exempted, reverse charge and percentage policies with
//!   CGST/SGST/IGST split
//! - **FTL**: flat freight, multi-stop point charges and balance freight
//! - **Master data abstraction**: persistence-agnostic loading through a trait
//!
//! ## Quick Start
//!
//! ```rust
//! use lr_freight_core::{City, Client, RateBook, RateQuery, resolve_rate};
//!
//! let rates = serde_json::from_str(
//!     r#"[{"clientId": "1", "status": "Active", "origin": "MUM", "destination": "PUN", "ratePerBox": 45}]"#,
//! ).unwrap();
//! let book = RateBook::load(
//!     vec![Client::new("1", "ACME", "Acme Traders")],
//!     vec![
//!         City::new("10", "MUM", "Mumbai", "Maharashtra"),
//!         City::new("11", "PUN", "Pune", "Maharashtra"),
//!     ],
//!     rates,
//! );
//!
//! let found = resolve_rate(&book, &RateQuery::new("ACME", "MUM", "PUN")).unwrap();
//! assert_eq!(found.rate, bigdecimal::BigDecimal::from(45));
//! ```

pub mod booking;
pub mod config;
pub mod freight;
pub mod masters;
pub mod print;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use booking::*;
pub use config::*;
pub use freight::*;
pub use masters::*;
pub use print::*;
pub use tax::gst::*;
pub use traits::*;
pub use types::*;
