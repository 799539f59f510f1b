//! Fixed assets and depreciation scheduling

pub mod depreciation;

pub use depreciation::*;
