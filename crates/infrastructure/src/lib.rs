//! Quarry DNS Infrastructure Layer
pub mod dns;
