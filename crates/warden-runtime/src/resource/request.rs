//! Incoming requests.

use serde::{Deserialize, Serialize};
use warden_types::{RequestId, ResourceId};

/// Request method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Read.
    Get,
    /// Create.
    Post,
    /// Replace.
    Put,
    /// Remove.
    Delete,
    /// Anything else, kept verbatim.
    #[serde(untagged)]
    Unsupported(String),
}

impl Method {
    /// Parses a method name, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            _ => Self::Unsupported(value.to_string()),
        }
    }

    /// Returns the method name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Unsupported(other) => other,
        }
    }

    /// Returns `false` for [`Method::Unsupported`].
    #[must_use]
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    id: RequestId,
    method: Method,
    path: String,
}

impl Request {
    /// Creates a request with a fresh id.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            id: RequestId::random(),
            method,
            path: path.into(),
        }
    }

    /// Creates a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Returns the request id.
    #[must_use]
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// Returns the method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the raw path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The resource name: the path without query, fragment, or outer
    /// slashes. `/` and the empty path both yield `""`.
    #[must_use]
    pub fn resource_name(&self) -> &str {
        let end = self.path.find(['?', '#']).unwrap_or(self.path.len());
        self.path[..end].trim_matches('/')
    }

    /// Identifier of the requested resource.
    #[must_use]
    pub fn resource_id(&self) -> ResourceId {
        ResourceId::from(self.resource_name())
    }
}
