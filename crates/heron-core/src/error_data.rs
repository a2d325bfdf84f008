//! Protocol error documents.
//!
//! [`ErrorData`] is one entry of the protocol's `errors` array. It is built once
//! through [`ErrorDataBuilder`] and never mutated afterwards.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// A single error object.
///
/// Equality and hashing are structural over every member, including `meta`.
///
/// # Example
///
/// ```
/// use heron_core::ErrorData;
///
/// let error = ErrorData::builder()
///     .status("404")
///     .code("RESOURCE_NOT_FOUND")
///     .title("Resource not found")
///     .source_parameter("id")
///     .build();
///
/// assert_eq!(error.status(), Some("404"));
/// assert_eq!(error.source_parameter(), Some("id"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorData {
    id: Option<String>,
    about_link: Option<String>,
    status: Option<String>,
    code: Option<String>,
    title: Option<String>,
    detail: Option<String>,
    source_pointer: Option<String>,
    source_parameter: Option<String>,
    meta: BTreeMap<String, Value>,
}

impl ErrorData {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> ErrorDataBuilder {
        ErrorDataBuilder::default()
    }

    /// A unique identifier for this occurrence of the problem.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// A link leading to further details about this occurrence.
    #[must_use]
    pub fn about_link(&self) -> Option<&str> {
        self.about_link.as_deref()
    }

    /// The HTTP status code, as a string.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// The application-specific error code.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// A short summary of the problem kind.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// An explanation specific to this occurrence.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// A JSON pointer to the offending member of the request document.
    #[must_use]
    pub fn source_pointer(&self) -> Option<&str> {
        self.source_pointer.as_deref()
    }

    /// The query parameter that caused the error.
    #[must_use]
    pub fn source_parameter(&self) -> Option<&str> {
        self.source_parameter.as_deref()
    }

    /// Non-standard meta information.
    #[must_use]
    pub fn meta(&self) -> &BTreeMap<String, Value> {
        &self.meta
    }
}

impl Hash for ErrorData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.about_link.hash(state);
        self.status.hash(state);
        self.code.hash(state);
        self.title.hash(state);
        self.detail.hash(state);
        self.source_pointer.hash(state);
        self.source_parameter.hash(state);
        // serde_json::Value has no Hash impl; its canonical text is stable for equal values.
        for (key, value) in &self.meta {
            key.hash(state);
            value.to_string().hash(state);
        }
    }
}

impl Serialize for ErrorData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(id) = &self.id {
            map.serialize_entry("id", id)?;
        }
        if let Some(about) = &self.about_link {
            map.serialize_entry("links", &BTreeMap::from([("about", about)]))?;
        }
        if let Some(status) = &self.status {
            map.serialize_entry("status", status)?;
        }
        if let Some(code) = &self.code {
            map.serialize_entry("code", code)?;
        }
        if let Some(title) = &self.title {
            map.serialize_entry("title", title)?;
        }
        if let Some(detail) = &self.detail {
            map.serialize_entry("detail", detail)?;
        }
        if self.source_pointer.is_some() || self.source_parameter.is_some() {
            let mut source = BTreeMap::new();
            if let Some(pointer) = &self.source_pointer {
                source.insert("pointer", pointer);
            }
            if let Some(parameter) = &self.source_parameter {
                source.insert("parameter", parameter);
            }
            map.serialize_entry("source", &source)?;
        }
        if !self.meta.is_empty() {
            map.serialize_entry("meta", &self.meta)?;
        }
        map.end()
    }
}

/// Builder for [`ErrorData`].
#[derive(Debug, Default)]
pub struct ErrorDataBuilder {
    inner: ErrorData,
}

impl ErrorDataBuilder {
    /// Sets the occurrence identifier.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.inner.id = Some(id.into());
        self
    }

    /// Sets the about link.
    #[must_use]
    pub fn about_link(mut self, link: impl Into<String>) -> Self {
        self.inner.about_link = Some(link.into());
        self
    }

    /// Sets the status code string.
    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.inner.status = Some(status.into());
        self
    }

    /// Sets the application error code.
    #[must_use]
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.inner.code = Some(code.into());
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.inner.title = Some(title.into());
        self
    }

    /// Sets the detail.
    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.inner.detail = Some(detail.into());
        self
    }

    /// Sets the source pointer.
    #[must_use]
    pub fn source_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.inner.source_pointer = Some(pointer.into());
        self
    }

    /// Sets the source parameter.
    #[must_use]
    pub fn source_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.inner.source_parameter = Some(parameter.into());
        self
    }

    /// Adds a meta entry.
    #[must_use]
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inner.meta.insert(key.into(), value.into());
        self
    }

    /// Builds the error object.
    #[must_use]
    pub fn build(self) -> ErrorData {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample() -> ErrorData {
        ErrorData::builder()
            .id("e-1")
            .about_link("https://errors.example.com/e-1")
            .status("422")
            .code("VALIDATION_ERROR")
            .title("Validation failed")
            .detail("name must not be blank")
            .source_pointer("/data/attributes/name")
            .meta("attempt", 2)
            .build()
    }

    #[test]
    fn test_structural_equality_and_hash() {
        let mut set = HashSet::new();
        set.insert(sample());
        set.insert(sample());
        assert_eq!(set.len(), 1);

        let other = ErrorData::builder().status("422").build();
        assert_ne!(sample(), other);
    }

    #[test]
    fn test_meta_participates_in_equality() {
        let a = ErrorData::builder().meta("attempt", 1).build();
        let b = ErrorData::builder().meta("attempt", 2).build();
        assert_ne!(a, b);
    }

    #[test]
    fn test_serialization_layout() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["links"]["about"], "https://errors.example.com/e-1");
        assert_eq!(json["source"]["pointer"], "/data/attributes/name");
        assert_eq!(json["status"], "422");
        assert_eq!(json["meta"]["attempt"], 2);
        assert!(json.get("source").unwrap().get("parameter").is_none());
    }

    #[test]
    fn test_empty_members_are_omitted() {
        let json = serde_json::to_string(&ErrorData::builder().status("500").build()).unwrap();
        assert_eq!(json, r#"{"status":"500"}"#);
    }
}
