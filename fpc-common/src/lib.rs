//! # FPC Common Library
//!
//! Shared code for the FPC tools including:
//! - Fingerprint data model (tagged attribute values)
//! - Weight table (point system) model
//! - Configuration loading and root folder resolution
//! - JSON loading of weight tables and fingerprints
//! - Error types

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod loader;
pub mod weights;

pub use error::{Error, Result};
pub use fingerprint::{AttributeKey, AttributeValue, Fingerprint, Record};
pub use weights::{PointSystem, WeightEntry, WeightTable};
