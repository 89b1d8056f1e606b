//! Error types for route registration and request dispatch.
//!
//! Registration failures ([`BadRoute`]) are programmer errors: the route
//! definitions themselves are contradictory or malformed, and the caller is
//! expected to abort startup. Dispatch failures ([`DispatchError`]) are
//! ordinary request-time outcomes the caller maps onto 404/405 responses.

use http::{Method, StatusCode};
use thiserror::Error;

/// A route definition was rejected at registration time.
///
/// Each variant carries enough context to name the exact conflict in its
/// `Display` output; the messages are stable and asserted in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BadRoute {
    /// A `[` was opened that is never closed, or a `]` closed nothing.
    #[error("number of opening '[' and closing ']' brackets do not match")]
    UnbalancedOptionalBrackets,

    /// A `]` appeared before the end of the pattern.
    #[error("optional segments can only occur at the end of a route")]
    MisplacedOptionalSegment,

    /// `[]` with nothing inside it.
    #[error("optional segments cannot be empty")]
    EmptyOptionalSegment,

    /// Two routes for the same method share a literal path or a canonical
    /// regex. `key` is the literal path for static routes and the compiled
    /// per-route regex for variable routes.
    #[error("cannot register two routes matching \"{key}\" for method \"{method}\"")]
    DuplicateRoute { method: Method, key: String },

    /// A literal path can never be reached because an earlier variable
    /// route for the same method already matches it.
    #[error(
        "static route \"{path}\" is shadowed by previously defined variable route \"{regex}\" for method \"{method}\""
    )]
    ShadowedStaticRoute {
        method: Method,
        path: String,
        regex: String,
    },

    /// The same placeholder name was used twice within one route.
    #[error("cannot use the same placeholder \"{name}\" twice")]
    DuplicatePlaceholder { name: String },

    /// A placeholder's regex fragment contains a capturing group, which
    /// would shift group numbering and break group-count dispatch.
    #[error("regex \"{regex}\" for parameter \"{name}\" contains a capturing group")]
    CapturingGroup { name: String, regex: String },

    /// A placeholder's regex fragment was rejected by the regex engine.
    #[error("regex \"{regex}\" for parameter \"{name}\" is not a valid expression: {message}")]
    InvalidPlaceholderRegex {
        name: String,
        regex: String,
        message: String,
    },
}

/// A lookup failed to resolve to a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No route matches the path under any method.
    #[error("route \"{0}\" cannot be found")]
    RouteNotFound(String),

    /// The path matches under some other method. Callers typically pair
    /// this with [`allowed_methods`](crate::RouteTable::allowed_methods)
    /// to populate an `Allow` header.
    #[error("method \"{0}\" not allowed")]
    MethodNotAllowed(Method),
}

impl DispatchError {
    /// The HTTP status code conventionally associated with this failure.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            DispatchError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}
