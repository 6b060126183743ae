//! Tax calculations

pub mod gst;
