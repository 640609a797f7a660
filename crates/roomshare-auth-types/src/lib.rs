//! Session handling for Roomshare.
//!
//! Provides the session token (JWT) issuer/validator, cookie builders, and the
//! `Session` request extractor.

pub mod cookie;
pub mod session;
pub mod token;
