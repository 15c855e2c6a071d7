//! Fixed-asset register domain logic.
//!
//! Everything in this crate is pure: asset-number encoding, straight-line
//! depreciation, permission resolution, filtering, dashboard aggregation and
//! spreadsheet row shaping. Persistence, identity and rendering live in the
//! callers.

pub mod asset;
pub mod asset_number;
pub mod dashboard;
pub mod department;
pub mod depreciation;
pub mod error;
pub mod export;
pub mod filter;
pub mod importer;
pub mod nfc;
pub mod permissions;
pub mod types;
