//! Route table and lookup - hot path for request routing.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::error::{BadRoute, DispatchError};
use crate::pattern::{parse_path, Token};
use crate::route::Route;

use super::chunks::{self, Chunk};

/// Maximum number of path parameters before heap allocation. Most routes
/// carry well under eight placeholders.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the match hot path.
///
/// Param names use `Arc<str>` because they come from the route table and
/// are known at registration time; values are per-request data extracted
/// from the path.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

static WILDCARD: Lazy<Method> =
    Lazy::new(|| Method::from_bytes(b"*").expect("`*` is a valid extension method"));

/// The wildcard registration method `*`.
///
/// Routes stored under it are consulted only after every concrete-method
/// lookup, including the `HEAD` to `GET` fallback, has failed.
#[must_use]
pub fn wildcard() -> Method {
    WILDCARD.clone()
}

/// Result of successfully matching a request path to a route.
#[derive(Debug)]
pub struct RouteMatch<'t, H> {
    /// The handler stored at registration. The table never inspects or
    /// invokes it.
    pub handler: &'t H,
    /// Extracted path parameters in placeholder order, e.g. `{id}` →
    /// `("id", "123")`.
    pub params: ParamVec,
}

impl<H> RouteMatch<'_, H> {
    /// Get a path parameter by name. With duplicate names the last
    /// occurrence wins.
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert the parameters to a `HashMap`. This allocates - prefer
    /// [`param`](Self::param) in hot paths.
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

impl<H> Clone for RouteMatch<'_, H> {
    fn clone(&self) -> Self {
        RouteMatch {
            handler: self.handler,
            params: self.params.clone(),
        }
    }
}

/// A variable route stored for one method.
pub(crate) struct VarRoute {
    /// Canonical regex text, unanchored. Two token sequences producing the
    /// same text are the same route.
    pub(crate) regex_key: String,
    /// Anchored form of `regex_key`, compiled at registration.
    pub(crate) regex: Regex,
    /// Placeholder names in capture order.
    pub(crate) var_names: Vec<Arc<str>>,
    handler: usize,
}

#[derive(Default)]
struct ChunkCache {
    generation: u64,
    per_method: HashMap<Method, Vec<Chunk>>,
}

#[derive(Default)]
struct AllowedCache {
    generation: u64,
    per_path: HashMap<String, Vec<Method>>,
}

/// Stores static and variable routes per HTTP method and resolves
/// `(method, path)` lookups against them.
///
/// The table is built by a sequence of [`add`](Self::add) calls during a
/// registration phase and then queried repeatedly. Conflicts - duplicate
/// routes, unreachable static routes, malformed placeholders - are
/// rejected at registration time so that dispatch never has to
/// disambiguate.
///
/// Compiled chunk expressions and the allowed-methods memo live in
/// `RefCell` caches invalidated by a table generation counter, which keeps
/// every lookup consistent with the current route data. The interior
/// mutability makes the table `!Sync` by construction: build it first,
/// then query it from one thread.
pub struct RouteTable<H> {
    handlers: Vec<H>,
    static_routes: HashMap<Method, HashMap<String, usize>>,
    /// Variable routes in method-registration order; per-method route
    /// order is add order, which is what makes first-match-wins stable.
    variable_routes: Vec<(Method, Vec<VarRoute>)>,
    /// Methods registered statically for an exact path, in add order.
    static_method_index: HashMap<String, Vec<Method>>,
    generation: u64,
    chunk_cache: RefCell<ChunkCache>,
    allowed_cache: RefCell<AllowedCache>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        RouteTable {
            handlers: Vec::new(),
            static_routes: HashMap::new(),
            variable_routes: Vec::new(),
            static_method_index: HashMap::new(),
            generation: 0,
            chunk_cache: RefCell::new(ChunkCache::default()),
            allowed_cache: RefCell::new(AllowedCache::default()),
        }
    }
}

impl<H> RouteTable<H> {
    #[must_use]
    pub fn new() -> Self {
        RouteTable::default()
    }

    /// Registers `handler` under `pattern` for every method in `methods`.
    ///
    /// The pattern is parsed into one variant per optional-segment
    /// expansion; a variant that is a single literal becomes a static
    /// route, everything else a variable route.
    ///
    /// # Errors
    ///
    /// Fails with [`BadRoute`] on a malformed pattern or a conflict with a
    /// previously registered route. Registration errors are programmer
    /// errors; the table may be left partially updated and the caller is
    /// expected to abort startup.
    pub fn add(&mut self, methods: &[Method], pattern: &str, handler: H) -> Result<(), BadRoute> {
        let variants = parse_path(pattern)?;

        let handler_index = self.handlers.len();
        self.handlers.push(handler);
        self.generation += 1;

        for method in methods {
            for variant in &variants {
                match variant.as_slice() {
                    [Token::Literal(path)] => {
                        self.add_static(method.clone(), path, handler_index)?;
                    }
                    tokens => self.add_variable(method.clone(), tokens, handler_index)?,
                }
            }
        }
        Ok(())
    }

    /// Resolves a request to a handler and its extracted path parameters.
    ///
    /// Lookup order: exact static match for `method`, variable match for
    /// `method`, a full `GET` retry when `method` is `HEAD`, then static
    /// and variable matches under the wildcard method `*`.
    ///
    /// # Errors
    ///
    /// [`DispatchError::MethodNotAllowed`] when the path is registered
    /// under some other method, [`DispatchError::RouteNotFound`] when it
    /// is not registered at all.
    pub fn route_data(
        &self,
        method: &Method,
        path: &str,
    ) -> Result<RouteMatch<'_, H>, DispatchError> {
        if let Some(found) = self.lookup_method(method, path) {
            debug!(method = %method, path = %path, params = ?found.params, "route matched");
            return Ok(found);
        }

        // HEAD retries the whole chain as GET before any wildcard fallback
        if *method == Method::HEAD {
            return self.route_data(&Method::GET, path);
        }

        if let Some(found) = self.lookup_method(&wildcard(), path) {
            debug!(
                method = %method,
                path = %path,
                params = ?found.params,
                "route matched under wildcard method"
            );
            return Ok(found);
        }

        if self.allowed_methods(path).is_empty() {
            warn!(method = %method, path = %path, "no route matched");
            Err(DispatchError::RouteNotFound(path.to_string()))
        } else {
            warn!(method = %method, path = %path, "path is registered under other methods");
            Err(DispatchError::MethodNotAllowed(method.clone()))
        }
    }

    /// Every method with a static or variable route matching `path`
    /// exactly. Never fails; an empty result means no method matches.
    ///
    /// Results are memoized per path until the next [`add`](Self::add).
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        {
            let mut cache = self.allowed_cache.borrow_mut();
            if cache.generation != self.generation {
                cache.per_path.clear();
                cache.generation = self.generation;
            }
            if let Some(methods) = cache.per_path.get(path) {
                return methods.clone();
            }
        }

        let mut methods: Vec<Method> = self
            .static_method_index
            .get(path)
            .cloned()
            .unwrap_or_default();

        for (method, routes) in &self.variable_routes {
            if routes.is_empty() || methods.contains(method) {
                continue;
            }
            if self.match_variable(method, path).is_some() {
                methods.push(method.clone());
            }
        }

        self.allowed_cache
            .borrow_mut()
            .per_path
            .insert(path.to_string(), methods.clone());
        methods
    }

    fn lookup_method(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, H>> {
        if let Some(&handler) = self
            .static_routes
            .get(method)
            .and_then(|routes| routes.get(path))
        {
            return Some(RouteMatch {
                handler: &self.handlers[handler],
                params: ParamVec::new(),
            });
        }
        self.match_variable(method, path)
    }

    /// Matches `path` against the method's variable routes, one compiled
    /// chunk at a time, first match wins. Chunks are rebuilt lazily when
    /// the table generation has moved.
    fn match_variable(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, H>> {
        let routes = self
            .variable_routes
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, routes)| routes)?;
        if routes.is_empty() {
            return None;
        }

        let mut cache = self.chunk_cache.borrow_mut();
        if cache.generation != self.generation {
            cache.per_method.clear();
            cache.generation = self.generation;
        }
        let compiled = cache
            .per_method
            .entry(method.clone())
            .or_insert_with(|| chunks::compile(routes));

        for chunk in compiled.iter() {
            if let Some(found) = chunk.find(path) {
                let route = &routes[found.route];
                let params: ParamVec = route
                    .var_names
                    .iter()
                    .cloned()
                    .zip(found.values)
                    .collect();
                return Some(RouteMatch {
                    handler: &self.handlers[route.handler],
                    params,
                });
            }
        }
        None
    }

    fn add_static(&mut self, method: Method, path: &str, handler: usize) -> Result<(), BadRoute> {
        if self
            .static_routes
            .get(&method)
            .is_some_and(|routes| routes.contains_key(path))
        {
            return Err(BadRoute::DuplicateRoute {
                method,
                key: path.to_string(),
            });
        }

        if let Some((_, routes)) = self.variable_routes.iter().find(|(m, _)| *m == method) {
            if let Some(route) = routes.iter().find(|route| route.regex.is_match(path)) {
                return Err(BadRoute::ShadowedStaticRoute {
                    method,
                    path: path.to_string(),
                    regex: route.regex_key.clone(),
                });
            }
        }

        debug!(method = %method, path = %path, "static route registered");
        self.static_routes
            .entry(method.clone())
            .or_default()
            .insert(path.to_string(), handler);
        self.static_method_index
            .entry(path.to_string())
            .or_default()
            .push(method);
        Ok(())
    }

    fn add_variable(
        &mut self,
        method: Method,
        tokens: &[Token],
        handler: usize,
    ) -> Result<(), BadRoute> {
        let (regex_key, var_names) = build_route_regex(tokens)?;

        if self
            .variable_routes_mut(&method)
            .iter()
            .any(|route| route.regex_key == regex_key)
        {
            return Err(BadRoute::DuplicateRoute {
                method,
                key: regex_key,
            });
        }

        // fragments were validated individually, so the anchored
        // concatenation compiles
        let regex = Regex::new(&format!("^{regex_key}$")).expect("failed to compile route regex");

        debug!(method = %method, regex = %regex_key, vars = ?var_names, "variable route registered");
        self.variable_routes_mut(&method).push(VarRoute {
            regex_key,
            regex,
            var_names,
            handler,
        });
        Ok(())
    }

    fn variable_routes_mut(&mut self, method: &Method) -> &mut Vec<VarRoute> {
        let index = match self.variable_routes.iter().position(|(m, _)| m == method) {
            Some(index) => index,
            None => {
                self.variable_routes.push((method.clone(), Vec::new()));
                self.variable_routes.len() - 1
            }
        };
        &mut self.variable_routes[index].1
    }
}

/// Builds the canonical per-route regex: literals escaped, each
/// placeholder fragment wrapped in a capturing group, concatenated in
/// token order.
pub(crate) fn build_route_regex(tokens: &[Token]) -> Result<(String, Vec<Arc<str>>), BadRoute> {
    let mut regex_key = String::new();
    let mut var_names: Vec<Arc<str>> = Vec::new();

    for token in tokens {
        match token {
            Token::Literal(literal) => regex_key.push_str(&regex::escape(literal)),
            Token::Placeholder { name, regex } => {
                if var_names.iter().any(|known| known.as_ref() == name.as_str()) {
                    return Err(BadRoute::DuplicatePlaceholder { name: name.clone() });
                }
                if has_capturing_group(regex) {
                    return Err(BadRoute::CapturingGroup {
                        name: name.clone(),
                        regex: regex.clone(),
                    });
                }
                if let Err(err) = Regex::new(&format!("(?:{regex})")) {
                    return Err(BadRoute::InvalidPlaceholderRegex {
                        name: name.clone(),
                        regex: regex.clone(),
                        message: err.to_string(),
                    });
                }
                var_names.push(Arc::from(name.as_str()));
                regex_key.push('(');
                regex_key.push_str(regex);
                regex_key.push(')');
            }
        }
    }
    Ok((regex_key, var_names))
}

/// Detects an unescaped capturing `(` in a regex fragment, skipping
/// escaped characters and character classes. Named groups count as
/// capturing; lookarounds, `(?:`, inline flags and control verbs do not.
pub(crate) fn has_capturing_group(fragment: &str) -> bool {
    let bytes = fragment.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'[' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b']' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'(' => {
                match bytes.get(i + 1) {
                    Some(&b'?') => match bytes.get(i + 2) {
                        Some(&b'<') if !matches!(bytes.get(i + 3), Some(&b'=') | Some(&b'!')) => {
                            return true;
                        }
                        Some(&b'P') if bytes.get(i + 3) == Some(&b'<') => return true,
                        Some(&b'\'') => return true,
                        _ => {}
                    },
                    Some(&b'*') => {}
                    _ => return true,
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    false
}

/// Registration front-end over [`RouteTable`].
///
/// Mirrors the usual router surface: `map` plus per-verb helpers, and
/// [`apply`](Self::apply) for declarative [`Route`] values produced by a
/// discovery layer.
pub struct Router<H> {
    table: RouteTable<H>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Router {
            table: RouteTable::new(),
        }
    }
}

impl<H> Router<H> {
    #[must_use]
    pub fn new() -> Self {
        Router::default()
    }

    /// Registers `handler` for `pattern` under every method in `methods`.
    pub fn map(&mut self, methods: &[Method], pattern: &str, handler: H) -> Result<(), BadRoute> {
        self.table.add(methods, pattern, handler)
    }

    pub fn get(&mut self, pattern: &str, handler: H) -> Result<(), BadRoute> {
        self.map(&[Method::GET], pattern, handler)
    }

    pub fn post(&mut self, pattern: &str, handler: H) -> Result<(), BadRoute> {
        self.map(&[Method::POST], pattern, handler)
    }

    pub fn put(&mut self, pattern: &str, handler: H) -> Result<(), BadRoute> {
        self.map(&[Method::PUT], pattern, handler)
    }

    pub fn patch(&mut self, pattern: &str, handler: H) -> Result<(), BadRoute> {
        self.map(&[Method::PATCH], pattern, handler)
    }

    pub fn delete(&mut self, pattern: &str, handler: H) -> Result<(), BadRoute> {
        self.map(&[Method::DELETE], pattern, handler)
    }

    pub fn head(&mut self, pattern: &str, handler: H) -> Result<(), BadRoute> {
        self.map(&[Method::HEAD], pattern, handler)
    }

    pub fn options(&mut self, pattern: &str, handler: H) -> Result<(), BadRoute> {
        self.map(&[Method::OPTIONS], pattern, handler)
    }

    /// Registers a catch-all under the wildcard method `*`.
    pub fn any(&mut self, pattern: &str, handler: H) -> Result<(), BadRoute> {
        self.map(&[wildcard()], pattern, handler)
    }

    /// Registers a declarative [`Route`] value with its handler.
    pub fn apply(&mut self, route: &Route, handler: H) -> Result<(), BadRoute> {
        self.table.add(route.methods(), route.path(), handler)
    }

    /// See [`RouteTable::route_data`].
    pub fn lookup(&self, method: &Method, path: &str) -> Result<RouteMatch<'_, H>, DispatchError> {
        self.table.route_data(method, path)
    }

    /// See [`RouteTable::allowed_methods`].
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        self.table.allowed_methods(path)
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable<H> {
        &self.table
    }
}
