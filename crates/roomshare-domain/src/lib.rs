//! Domain types shared across Roomshare crates.
//!
//! Pure types with no framework dependencies. Import in `usecase/` and
//! `domain/` layers; adapters convert at the edges.

pub mod pagination;
pub mod user;
