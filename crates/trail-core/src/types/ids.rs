//! Vertex and edge identifiers
//!
//! Identifiers are owned by the provider and only referenced by the search
//! state. Both are `Arc<str>` newtypes so cloning a Step or a candidate never
//! copies the underlying id.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Shared string type used for identifiers - O(1) clone, `Send + Sync`
pub type SharedStr = Arc<str>;

/// Serde support for SharedStr - serializes as a plain string
mod shared_str_serde {
    use super::*;

    pub fn serialize<S>(value: &SharedStr, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SharedStr, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SharedStr::from(s))
    }
}

/// Identifier of a vertex, of the form `"<collection>/<key>"`
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexRef(#[serde(with = "shared_str_serde")] SharedStr);

impl VertexRef {
    pub fn new(id: impl Into<SharedStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Collection part of the id (everything before the first `/`)
    ///
    /// Ids without a `/` are their own collection.
    pub fn collection(&self) -> &str {
        match self.0.find('/') {
            Some(pos) => &self.0[..pos],
            None => &self.0,
        }
    }
}

impl fmt::Display for VertexRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for VertexRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VertexRef({})", self.0)
    }
}

impl From<&str> for VertexRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for VertexRef {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Identifier of a traversed edge
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeRef(#[serde(with = "shared_str_serde")] SharedStr);

impl EdgeRef {
    pub fn new(id: impl Into<SharedStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EdgeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeRef({})", self.0)
    }
}

impl From<&str> for EdgeRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EdgeRef {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Direction in which edges are followed
///
/// Configured for the forward ball; the backward ball walks the reverse so
/// that both halves describe the same source-to-target path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Outbound,
    Inbound,
    /// Edges in either direction
    Any,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Direction::Outbound => Direction::Inbound,
            Direction::Inbound => Direction::Outbound,
            Direction::Any => Direction::Any,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::wasm_bindgen_test as test;

    #[test]
    fn test_vertex_collection() {
        assert_eq!(VertexRef::from("persons/alice").collection(), "persons");
        assert_eq!(VertexRef::from("a/b/c").collection(), "a");
        assert_eq!(VertexRef::from("loose").collection(), "loose");
    }

    #[test]
    fn test_ids_serialize_as_strings() {
        let v = VertexRef::from("v/A");
        let e = EdgeRef::from("e/1");
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"v/A\"");
        assert_eq!(serde_json::to_string(&e).unwrap(), "\"e/1\"");

        let back: VertexRef = serde_json::from_str("\"v/B\"").unwrap();
        assert_eq!(back, VertexRef::from("v/B"));
    }

    #[test]
    fn test_clone_shares_storage() {
        let v = VertexRef::from("v/shared");
        let w = v.clone();
        assert!(std::ptr::eq(v.as_str(), w.as_str()));
    }

    #[test]
    fn test_direction_reverse() {
        assert_eq!(Direction::Outbound.reverse(), Direction::Inbound);
        assert_eq!(Direction::Inbound.reverse(), Direction::Outbound);
        assert_eq!(Direction::Any.reverse(), Direction::Any);
    }
}
