//! Request context types.
//!
//! The [`RequestContext`] carries the per-request values a repository may ask
//! for: the opaque [`RequestParams`] bundle and the security [`Principal`].

use crate::Principal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::time::Instant;
use uuid::Uuid;

/// Maximum number of query parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// A unique identifier for each request, using UUID v7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new time-ordered request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque request parameters (pagination, filtering, sorting, inclusion).
///
/// The engine never interprets the query pairs; it only passes the bundle to
/// repositories that declare a [`RequestParams`] parameter. The one value the
/// engine sets is the id list of a multi-id collection read.
///
/// # Example
///
/// ```rust
/// use heron_core::RequestParams;
///
/// let params = RequestParams::new()
///     .with_query("page[size]", "10")
///     .with_query("include", "project");
///
/// assert_eq!(params.get("page[size]"), Some("10"));
/// assert_eq!(params.get("sort"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestParams {
    /// Storage for query (name, value) pairs, in arrival order.
    query: SmallVec<[(String, String); INLINE_PARAMS]>,
    /// Ids addressed by the path, for multi-id reads.
    ids: Vec<String>,
}

impl RequestParams {
    /// Creates an empty parameter bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a query parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.query.push((name.into(), value.into()));
    }

    /// Returns a copy with an extra query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Returns the first value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value for a parameter by name.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns an iterator over the query parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the number of query parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.query.len()
    }

    /// Returns true if there are no query parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Returns the ids addressed by the path; empty unless this is a multi-id read.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Returns a copy carrying the addressed ids.
    #[must_use]
    pub fn with_ids(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ids = ids.into_iter().map(Into::into).collect();
        self
    }
}

impl FromIterator<(String, String)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            query: iter.into_iter().collect(),
            ids: Vec::new(),
        }
    }
}

/// Per-request context handed to controllers.
///
/// # Example
///
/// ```
/// use heron_core::{Principal, RequestContext, RequestParams};
///
/// let ctx = RequestContext::new()
///     .with_params(RequestParams::new().with_query("sort", "-name"))
///     .with_principal(Principal::subject("u1"));
///
/// assert_eq!(ctx.params().get("sort"), Some("-name"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// Opaque query parameters.
    params: RequestParams,

    /// The caller the request runs on behalf of.
    principal: Principal,

    /// When the request started processing.
    started_at: Instant,
}

impl RequestContext {
    /// Creates a context with a fresh request ID, no parameters and an
    /// anonymous principal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            params: RequestParams::new(),
            principal: Principal::Anonymous,
            started_at: Instant::now(),
        }
    }

    /// Creates a mock context for testing purposes.
    #[must_use]
    pub fn mock() -> Self {
        Self::new()
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns a new context with the specified request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the request parameters.
    #[must_use]
    pub const fn params(&self) -> &RequestParams {
        &self.params
    }

    /// Returns a new context with the specified parameters.
    #[must_use]
    pub fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }

    /// Returns the principal.
    #[must_use]
    pub const fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Returns a new context with the specified principal.
    #[must_use]
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = principal;
        self
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
