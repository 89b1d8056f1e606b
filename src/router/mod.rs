//! # Router Module
//!
//! The router module provides route storage and request resolution. It keeps
//! static routes in per-method hash maps and variable routes as compiled
//! regular expressions, combined into bounded alternation chunks for
//! matching efficiency.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Storing routes registered through [`RouteTable::add`] or the
//!   [`Router`] front-end
//! - Rejecting conflicting or malformed registrations up front
//! - Matching incoming `(method, path)` pairs to handlers
//! - Extracting named path parameters from matched routes
//!
//! ## Architecture
//!
//! Matching is a two-phase approach:
//!
//! 1. **Registration**: patterns are parsed, expanded over their optional
//!    segments, and stored either as literal paths or as per-route regexes
//!    whose text doubles as the duplicate-detection key.
//!
//! 2. **Lookup**: the request path is tried against the static map, then
//!    against the method's chunked alternation expressions; `HEAD` retries
//!    as `GET` and the wildcard method `*` is consulted last. A miss is
//!    classified as 405 when the path is registered under another method,
//!    404 otherwise.

mod chunks;
mod core;

pub use self::core::{wildcard, ParamVec, RouteMatch, RouteTable, Router, MAX_INLINE_PARAMS};
