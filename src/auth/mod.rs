//! Authentication session persistence.
//!
//! This module provides `Session`, token-based session state persisted
//! to the shared key-value storage under its own key, outside the cache
//! namespace. Tokens expire after 30 minutes.
//!
//! Obtaining a token (the login flow) is the embedding application's
//! concern; this module only holds on to one.

pub mod session;

pub use session::{Session, SessionData};
