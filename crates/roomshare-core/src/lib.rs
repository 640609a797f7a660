//! Service plumbing shared by Roomshare binaries: error bodies, request
//! tracing, configuration loading and sea-orm helpers.

pub mod config;
pub mod error;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
