use serde::{Deserialize, Serialize};

/// An Example object attached to a parameter or media type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// `externalValue` examples are not fetched, so this is all that is read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// A reference or inline example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExampleOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Example(Example),
}

impl ExampleOrRef {
    /// The literal example value, if this is a resolved example carrying one.
    pub fn value(&self) -> Option<&serde_json::Value> {
        match self {
            ExampleOrRef::Example(ex) => ex.value.as_ref(),
            ExampleOrRef::Ref { .. } => None,
        }
    }
}
