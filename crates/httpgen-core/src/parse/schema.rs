use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON Schema type keyword value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

/// `type` is a single name in 3.0 and may be a list in 3.1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Schema(Box<Schema>),
}

impl SchemaOrRef {
    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            SchemaOrRef::Schema(schema) => Some(&**schema),
            SchemaOrRef::Ref { .. } => None,
        }
    }
}

/// The subset of JSON Schema the sampler reads. Both the 3.0 dialect and the
/// 3.1 JSON Schema dialect deserialize into it; unknown keywords are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// 3.1 array form. Kept untyped because 3.0 documents in the wild put
    /// maps here too.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Value>,
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaOrRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaOrRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaOrRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// A boolean modifier of `minimum` in 3.0, a bound of its own in 3.1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub write_only: bool,
}

/// One side of a numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub exclusive: bool,
}

impl Schema {
    /// First entry of a 3.1 `examples` array.
    pub fn first_example(&self) -> Option<&Value> {
        match self.examples.as_ref()? {
            Value::Array(items) => items.first(),
            _ => None,
        }
    }

    /// The first non-null type this schema declares.
    pub fn primary_type(&self) -> Option<&SchemaType> {
        match self.schema_type.as_ref()? {
            TypeSet::Single(t) => Some(t),
            TypeSet::Multiple(types) => types.iter().find(|t| **t != SchemaType::Null),
        }
    }

    /// The tighter of `minimum` and a 3.1 numeric `exclusiveMinimum`.
    pub fn lower_bound(&self) -> Option<Bound> {
        bound(self.minimum, self.exclusive_minimum.as_ref(), f64::max)
    }

    /// The tighter of `maximum` and a 3.1 numeric `exclusiveMaximum`.
    pub fn upper_bound(&self) -> Option<Bound> {
        bound(self.maximum, self.exclusive_maximum.as_ref(), f64::min)
    }
}

fn bound(inclusive: Option<f64>, exclusive: Option<&Value>, tighter: fn(f64, f64) -> f64) -> Option<Bound> {
    let plain = inclusive.map(|value| Bound {
        value,
        exclusive: matches!(exclusive, Some(Value::Bool(true))),
    });
    let numeric = exclusive.and_then(Value::as_f64).map(|value| Bound {
        value,
        exclusive: true,
    });
    match (plain, numeric) {
        (Some(a), Some(b)) if tighter(a.value, b.value) == a.value && a.value != b.value => Some(a),
        (_, Some(b)) => Some(b),
        (a, None) => a,
    }
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<SchemaOrRef>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(yaml: &str) -> Schema {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_bounds_from_both_dialects() {
        let s = schema("{minimum: 5, exclusiveMinimum: true, maximum: 9}");
        assert_eq!(s.lower_bound(), Some(Bound { value: 5.0, exclusive: true }));
        assert_eq!(s.upper_bound(), Some(Bound { value: 9.0, exclusive: false }));

        let s = schema("{exclusiveMinimum: 5, exclusiveMaximum: 7}");
        assert_eq!(s.lower_bound(), Some(Bound { value: 5.0, exclusive: true }));
        assert_eq!(s.upper_bound(), Some(Bound { value: 7.0, exclusive: true }));

        let s = schema("{minimum: 8, exclusiveMinimum: 5}");
        assert_eq!(s.lower_bound(), Some(Bound { value: 8.0, exclusive: false }));
        let s = schema("{minimum: 5, exclusiveMinimum: 5}");
        assert_eq!(s.lower_bound(), Some(Bound { value: 5.0, exclusive: true }));

        assert_eq!(schema("{type: integer}").lower_bound(), None);
    }

    #[test]
    fn test_read_write_only_flags() {
        let s = schema("{readOnly: true, minLength: 2, additionalProperties: false}");
        assert!(s.read_only);
        assert!(!s.write_only);
        assert_eq!(s.min_length, Some(2));
        assert_eq!(s.additional_properties, Some(AdditionalProperties::Bool(false)));
    }
}
