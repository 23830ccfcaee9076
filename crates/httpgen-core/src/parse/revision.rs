//! Revision tagging and the read-only parameter interface the resolvers use.
//!
//! OpenAPI 3.0 and 3.1 disagree on a handful of shapes (single versus array
//! `type`, boolean versus numeric exclusive bounds, `example` versus
//! `examples` on schemas). One permissive serde model accepts both, so the
//! revision only gates which documents are accepted. Everything downstream
//! reads parameters through [`ParameterView`] and never branches on it.

use super::parameter::{Parameter, ParameterLocation};
use super::schema::SchemaOrRef;

/// The OpenAPI revision a document declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecRevision {
    V3_0,
    /// 3.1 and later (3.2 is a superset of 3.1 for everything read here).
    V3_1,
}

impl SpecRevision {
    /// Classify an `openapi` version string. Returns `None` for anything that
    /// is not a 3.x document.
    pub fn detect(version: &str) -> Option<Self> {
        let rest = version.trim().strip_prefix("3.")?;
        let minor: u32 = rest.split('.').next()?.parse().ok()?;
        Some(if minor == 0 {
            SpecRevision::V3_0
        } else {
            SpecRevision::V3_1
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecRevision::V3_0 => "3.0",
            SpecRevision::V3_1 => "3.1",
        }
    }
}

/// Uniform capability interface over a declared parameter.
pub trait ParameterView {
    fn name(&self) -> &str;
    fn location(&self) -> ParameterLocation;
    fn schema(&self) -> Option<&SchemaOrRef>;
    /// The single inline `example`, if present.
    fn example(&self) -> Option<&serde_json::Value>;
    /// The value of the first entry in `examples`, if any.
    fn first_named_example(&self) -> Option<&serde_json::Value>;
    fn description(&self) -> Option<&str>;
}

impl ParameterView for Parameter {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> ParameterLocation {
        self.location
    }

    fn schema(&self) -> Option<&SchemaOrRef> {
        self.schema.as_ref()
    }

    fn example(&self) -> Option<&serde_json::Value> {
        self.example.as_ref().filter(|v| !v.is_null())
    }

    fn first_named_example(&self) -> Option<&serde_json::Value> {
        self.examples.values().next().and_then(|ex| ex.value())
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl<T: ParameterView + ?Sized> ParameterView for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn location(&self) -> ParameterLocation {
        (**self).location()
    }

    fn schema(&self) -> Option<&SchemaOrRef> {
        (**self).schema()
    }

    fn example(&self) -> Option<&serde_json::Value> {
        (**self).example()
    }

    fn first_named_example(&self) -> Option<&serde_json::Value> {
        (**self).first_named_example()
    }

    fn description(&self) -> Option<&str> {
        (**self).description()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_revision() {
        assert_eq!(SpecRevision::detect("3.0.3"), Some(SpecRevision::V3_0));
        assert_eq!(SpecRevision::detect("3.1.0"), Some(SpecRevision::V3_1));
        assert_eq!(SpecRevision::detect("3.2.0"), Some(SpecRevision::V3_1));
        assert_eq!(SpecRevision::detect("2.0"), None);
        assert_eq!(SpecRevision::detect("3.x"), None);
    }
}
