//! Declarative route descriptor.

use http::Method;

/// An immutable `{methods, path}` pair describing where a handler should
/// be mounted.
///
/// `Route` carries no behavior of its own; it is a transport value between
/// whatever layer discovers routes (attribute scanning, config files, a
/// builder) and [`Router::apply`](crate::Router::apply). The path is
/// normalized to a single leading `/` at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    methods: Vec<Method>,
    path: String,
}

impl Route {
    pub fn new(methods: impl IntoIterator<Item = Method>, path: impl AsRef<str>) -> Self {
        Route {
            methods: methods.into_iter().collect(),
            path: format!("/{}", path.as_ref().trim_start_matches('/')),
        }
    }

    /// Shorthand for a route served under a single method.
    pub fn single(method: Method, path: impl AsRef<str>) -> Self {
        Route::new([method], path)
    }

    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}
