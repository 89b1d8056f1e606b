//! # routex
//!
//! **routex** is an HTTP request-routing engine: given a method and a path
//! it selects the registered handler and extracts named path parameters.
//!
//! Route patterns are plain paths with named placeholders and nested
//! trailing optional segments:
//!
//! - `/users/all` - static, matched by string equality
//! - `/users/{id}` - `{id}` matches `[^/]+` by default
//! - `/users/{id:\d+}` - placeholder with a custom regex
//! - `/archive[/{year:\d{4}}[/{month:\d{2}}]]` - optional segments, each
//!   nesting level may be omitted by the caller
//!
//! Variable routes are matched through combined alternation expressions
//! built in bounded chunks, using the capture-group count of a match to
//! recover which route fired ("group-count dispatch"). Conflicts -
//! duplicate routes, static paths shadowed by an earlier variable route,
//! duplicate or capturing placeholders, malformed brackets - are rejected
//! when the route is added, not when a request hits it.
//!
//! ## Example
//!
//! ```
//! use http::Method;
//! use routex::Router;
//!
//! # fn main() -> Result<(), routex::BadRoute> {
//! let mut router = Router::new();
//! router.get("/hello[/{id:\\d+}[/{name}]]", "hello_handler")?;
//!
//! let found = router
//!     .lookup(&Method::GET, "/hello/1234/john")
//!     .expect("route should match");
//! assert_eq!(*found.handler, "hello_handler");
//! assert_eq!(found.param("id"), Some("1234"));
//! assert_eq!(found.param("name"), Some("john"));
//! # Ok(())
//! # }
//! ```
//!
//! Lookup misses distinguish a path nobody serves
//! ([`DispatchError::RouteNotFound`]) from a path served under different
//! methods ([`DispatchError::MethodNotAllowed`]);
//! [`RouteTable::allowed_methods`] reports which methods would accept the
//! path, e.g. for an `Allow` response header.
//!
//! The table is intended to be built once during startup and then queried
//! for the lifetime of the process. Handlers are opaque to the crate: they
//! are stored and returned, never inspected or invoked.

pub mod error;
pub mod pattern;
pub mod route;
pub mod router;

pub use error::{BadRoute, DispatchError};
pub use pattern::{parse_path, Token, DEFAULT_PLACEHOLDER_REGEX};
pub use route::Route;
pub use router::{wildcard, ParamVec, RouteMatch, RouteTable, Router, MAX_INLINE_PARAMS};
