//! Treatment sources for carbstat
//!
//! This crate implements the `TreatmentSource` trait for a Nightscout
//! server and for treatment dumps stored on disk.

pub mod file;
pub mod nightscout;

pub use file::FileSource;
pub use nightscout::NightscoutClient;
