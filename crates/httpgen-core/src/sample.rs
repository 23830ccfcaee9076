//! Synthetic sample values for schemas without explicit examples.

use serde_json::{Map, Value, json};

use crate::error::SampleError;
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType};

/// Default nesting limit for [`SchemaSampler`].
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Longest string a sample is padded to, whatever `minLength` asks for.
pub const MAX_SAMPLE_LENGTH: u64 = 1024;

/// Most items a sampled array holds, whatever `minItems` asks for.
pub const MAX_SAMPLE_ITEMS: u64 = 64;

/// Which side of the exchange a sample is for. `readOnly` properties are
/// left out of requests and `writeOnly` ones out of responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleUsage {
    Request,
    Response,
}

impl SampleUsage {
    fn includes(self, property: &SchemaOrRef) -> bool {
        match (self, property.as_schema()) {
            (SampleUsage::Request, Some(schema)) => !schema.read_only,
            (SampleUsage::Response, Some(schema)) => !schema.write_only,
            (_, None) => true,
        }
    }
}

/// Produces a value conforming to a schema.
pub trait SampleGenerator {
    fn generate(&self, schema: &SchemaOrRef, usage: SampleUsage) -> Result<Value, SampleError>;
}

/// Deterministic sampler: the same schema always yields the same value.
#[derive(Debug, Clone)]
pub struct SchemaSampler {
    max_depth: usize,
}

impl Default for SchemaSampler {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SchemaSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    fn sample(&self, schema: &SchemaOrRef, usage: SampleUsage, depth: usize) -> Result<Value, SampleError> {
        if depth > self.max_depth {
            return Err(SampleError::TooDeep(self.max_depth));
        }
        match schema {
            SchemaOrRef::Ref { ref_path } => Err(SampleError::UnresolvedRef(ref_path.clone())),
            SchemaOrRef::Schema(schema) => self.sample_schema(schema, usage, depth),
        }
    }

    fn sample_schema(&self, schema: &Schema, usage: SampleUsage, depth: usize) -> Result<Value, SampleError> {
        let literal = schema
            .default_value
            .as_ref()
            .or(schema.example.as_ref())
            .or_else(|| schema.first_example())
            .or(schema.const_value.as_ref())
            .or_else(|| schema.enum_values.first());
        if let Some(value) = literal {
            return Ok(value.clone());
        }

        if let Some(first) = schema.one_of.first().or_else(|| schema.any_of.first()) {
            return self.sample(first, usage, depth + 1);
        }

        if !schema.all_of.is_empty() {
            return self.sample_all_of(schema, usage, depth);
        }

        match infer_type(schema) {
            Some(SchemaType::String) => Ok(Value::String(sample_string(schema))),
            Some(SchemaType::Integer) => Ok(json!(sample_integer(schema))),
            Some(SchemaType::Number) => Ok(json!(sample_number(schema))),
            Some(SchemaType::Boolean) => Ok(Value::Bool(true)),
            Some(SchemaType::Null) | None => Ok(Value::Null),
            Some(SchemaType::Array) => self.sample_array(schema, usage, depth),
            Some(SchemaType::Object) => self.sample_object(schema, usage, depth).map(Value::Object),
        }
    }

    /// Merges object parts; the first non-object part wins otherwise.
    fn sample_all_of(&self, schema: &Schema, usage: SampleUsage, depth: usize) -> Result<Value, SampleError> {
        let mut merged = Map::new();
        for part in &schema.all_of {
            match self.sample(part, usage, depth + 1)? {
                Value::Object(map) => merged.extend(map),
                Value::Null => {}
                other => return Ok(other),
            }
        }
        if !schema.properties.is_empty() {
            merged.extend(self.sample_object(schema, usage, depth)?);
        }
        Ok(Value::Object(merged))
    }

    /// One item, repeated up to `minItems` and never past `maxItems` or
    /// [`MAX_SAMPLE_ITEMS`].
    fn sample_array(&self, schema: &Schema, usage: SampleUsage, depth: usize) -> Result<Value, SampleError> {
        let Some(items) = schema.items.as_deref() else {
            return Ok(Value::Array(Vec::new()));
        };
        let count = schema
            .min_items
            .unwrap_or(1)
            .max(1)
            .min(schema.max_items.unwrap_or(u64::MAX))
            .min(MAX_SAMPLE_ITEMS);
        if count == 0 {
            return Ok(Value::Array(Vec::new()));
        }
        let item = self.sample(items, usage, depth + 1)?;
        Ok(Value::Array(vec![item; count as usize]))
    }

    fn sample_object(
        &self,
        schema: &Schema,
        usage: SampleUsage,
        depth: usize,
    ) -> Result<Map<String, Value>, SampleError> {
        let mut map = Map::new();
        for (name, prop) in schema.properties.iter().filter(|(_, p)| usage.includes(p)) {
            map.insert(name.clone(), self.sample(prop, usage, depth + 1)?);
        }
        if schema.properties.is_empty()
            && let Some(AdditionalProperties::Schema(extra)) = &schema.additional_properties
        {
            map.insert("additionalProp1".to_string(), self.sample(extra, usage, depth + 1)?);
        }
        Ok(map)
    }
}

impl SampleGenerator for SchemaSampler {
    fn generate(&self, schema: &SchemaOrRef, usage: SampleUsage) -> Result<Value, SampleError> {
        self.sample(schema, usage, 0)
    }
}

fn infer_type(schema: &Schema) -> Option<SchemaType> {
    if let Some(t) = schema.primary_type() {
        return Some(t.clone());
    }
    if !schema.properties.is_empty() || schema.additional_properties.is_some() {
        Some(SchemaType::Object)
    } else if schema.items.is_some() {
        Some(SchemaType::Array)
    } else if schema.format.is_some() {
        Some(SchemaType::String)
    } else {
        None
    }
}

fn sample_string(schema: &Schema) -> String {
    let base = match schema.format.as_deref() {
        Some("date-time") => "2024-01-01T00:00:00Z",
        Some("date") => "2024-01-01",
        Some("time") => "00:00:00",
        Some("email") => "user@example.com",
        Some("uuid") => "3fa85f64-5717-4562-b3fc-2c963f66afa6",
        Some("uri" | "url") => "https://example.com",
        Some("hostname") => "example.com",
        Some("ipv4") => "192.0.2.1",
        Some("ipv6") => "2001:db8::1",
        Some("byte") => "c3RyaW5n",
        Some("binary") => "<binary>",
        Some("duration") => "P1D",
        Some("password") => "********",
        _ => "string",
    };
    let max = schema.max_length.unwrap_or(MAX_SAMPLE_LENGTH).min(MAX_SAMPLE_LENGTH) as usize;
    let min = (schema.min_length.unwrap_or(0).min(MAX_SAMPLE_LENGTH) as usize).min(max);
    let mut value: String = base.chars().take(max).collect();
    let deficit = min.saturating_sub(value.chars().count());
    value.extend(std::iter::repeat_n('x', deficit));
    value
}

/// The lowest integer the bounds allow, or the one closest to zero when only
/// an upper bound is declared. A lower bound wins over a contradictory upper
/// bound.
fn sample_integer(schema: &Schema) -> i64 {
    let low = schema.lower_bound().map(|b| {
        let n = b.value.ceil();
        if b.exclusive && n == b.value {
            (n as i64).saturating_add(1)
        } else {
            n as i64
        }
    });
    let high = schema.upper_bound().map(|b| {
        let n = b.value.floor();
        if b.exclusive && n == b.value {
            (n as i64).saturating_sub(1)
        } else {
            n as i64
        }
    });
    match (low, high) {
        (Some(low), _) => low,
        (None, Some(high)) => high.min(0),
        (None, None) => 0,
    }
}

fn sample_number(schema: &Schema) -> f64 {
    match (schema.lower_bound(), schema.upper_bound()) {
        (Some(low), _) if !low.exclusive => low.value,
        (Some(low), Some(high)) => (low.value + high.value) / 2.0,
        (Some(low), None) => low.value + 1.0,
        (None, Some(high)) if high.value > 0.0 || (high.value == 0.0 && !high.exclusive) => 0.0,
        (None, Some(high)) if high.exclusive => high.value - 1.0,
        (None, Some(high)) => high.value,
        (None, None) => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(yaml: &str) -> SchemaOrRef {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    fn sample(yaml: &str) -> Result<Value, SampleError> {
        SchemaSampler::new().generate(&schema(yaml), SampleUsage::Request)
    }

    #[test]
    fn test_object_with_array_property() {
        let value = sample(
            r#"
type: object
properties:
  items:
    type: array
    items:
      type: string
"#,
        )
        .unwrap();
        assert_eq!(value, json!({ "items": ["string"] }));
    }

    #[test]
    fn test_literal_precedence() {
        let value = sample("{type: string, default: d, example: e, enum: [a, b]}").unwrap();
        assert_eq!(value, json!("d"));
        let value = sample("{type: string, example: e, enum: [a, b]}").unwrap();
        assert_eq!(value, json!("e"));
        let value = sample("{type: string, examples: [x, y], enum: [a, b]}").unwrap();
        assert_eq!(value, json!("x"));
        let value = sample("{type: string, enum: [a, b]}").unwrap();
        assert_eq!(value, json!("a"));
    }

    #[test]
    fn test_string_formats() {
        assert_eq!(sample("{type: string, format: uuid}").unwrap(), json!("3fa85f64-5717-4562-b3fc-2c963f66afa6"));
        assert_eq!(sample("{type: string, format: date}").unwrap(), json!("2024-01-01"));
        assert_eq!(sample("{type: string, minLength: 8}").unwrap(), json!("stringxx"));
    }

    #[test]
    fn test_numbers_honor_minimum() {
        assert_eq!(sample("{type: integer, minimum: 5}").unwrap(), json!(5));
        assert_eq!(sample("{type: integer, minimum: 5, exclusiveMinimum: true}").unwrap(), json!(6));
        assert_eq!(sample("{type: integer}").unwrap(), json!(0));
        assert_eq!(sample("{type: number, minimum: 1.5}").unwrap(), json!(1.5));
    }

    #[test]
    fn test_numeric_bounds() {
        assert_eq!(sample("{type: integer, exclusiveMinimum: 5}").unwrap(), json!(6));
        assert_eq!(sample("{type: integer, minimum: 2.5}").unwrap(), json!(3));
        assert_eq!(sample("{type: integer, maximum: -5}").unwrap(), json!(-5));
        assert_eq!(sample("{type: integer, exclusiveMaximum: -5}").unwrap(), json!(-6));
        assert_eq!(sample("{type: integer, maximum: 10}").unwrap(), json!(0));
        assert_eq!(sample("{type: number, maximum: -2.5}").unwrap(), json!(-2.5));
        assert_eq!(
            sample("{type: number, exclusiveMinimum: 1, exclusiveMaximum: 2}").unwrap(),
            json!(1.5)
        );
    }

    #[test]
    fn test_integer_bounds_saturate() {
        let value = sample("{type: integer, minimum: 9223372036854775807, exclusiveMinimum: true}").unwrap();
        assert_eq!(value, json!(i64::MAX));
        let value = sample("{type: integer, maximum: -9223372036854775808, exclusiveMaximum: true}").unwrap();
        assert_eq!(value, json!(i64::MIN));
    }

    #[test]
    fn test_string_length_is_capped() {
        let value = sample("{type: string, minLength: 1000000}").unwrap();
        assert_eq!(value.as_str().unwrap().len(), MAX_SAMPLE_LENGTH as usize);
        assert_eq!(sample("{type: string, maxLength: 3}").unwrap(), json!("str"));
        assert_eq!(sample("{type: string, minLength: 4, maxLength: 5}").unwrap(), json!("strin"));
    }

    #[test]
    fn test_array_length_is_capped() {
        let value = sample("{type: array, minItems: 4294967296, items: {type: boolean}}").unwrap();
        assert_eq!(value.as_array().unwrap().len(), MAX_SAMPLE_ITEMS as usize);
        let value = sample("{type: array, minItems: 3, maxItems: 2, items: {type: boolean}}").unwrap();
        assert_eq!(value, json!([true, true]));
        assert_eq!(sample("{type: array, maxItems: 0, items: {type: boolean}}").unwrap(), json!([]));
    }

    #[test]
    fn test_read_only_and_write_only_properties() {
        let user = schema(
            r#"
type: object
properties:
  id: {type: integer, readOnly: true}
  name: {type: string}
  password: {type: string, writeOnly: true}
"#,
        );
        let sampler = SchemaSampler::new();
        assert_eq!(
            sampler.generate(&user, SampleUsage::Request).unwrap(),
            json!({"name": "string", "password": "string"})
        );
        assert_eq!(
            sampler.generate(&user, SampleUsage::Response).unwrap(),
            json!({"id": 0, "name": "string"})
        );
    }

    #[test]
    fn test_nullable_type_array_uses_first_non_null() {
        assert_eq!(sample("{type: [\"null\", boolean]}").unwrap(), json!(true));
    }

    #[test]
    fn test_composition() {
        let value = sample(
            r#"
allOf:
  - type: object
    properties:
      id: {type: integer}
  - type: object
    properties:
      name: {type: string}
"#,
        )
        .unwrap();
        assert_eq!(value, json!({ "id": 0, "name": "string" }));

        let value = sample("{oneOf: [{type: boolean}, {type: string}]}").unwrap();
        assert_eq!(value, json!(true));
    }

    #[test]
    fn test_array_min_items_and_additional_properties() {
        let value = sample("{type: array, minItems: 2, items: {type: integer}}").unwrap();
        assert_eq!(value, json!([0, 0]));
        let value = sample("{type: object, additionalProperties: {type: string}}").unwrap();
        assert_eq!(value, json!({ "additionalProp1": "string" }));
    }

    #[test]
    fn test_unresolved_ref_fails() {
        let err = sample(
            r##"
type: object
properties:
  next:
    $ref: "#/components/schemas/Node"
"##,
        )
        .unwrap_err();
        assert_eq!(err, SampleError::UnresolvedRef("#/components/schemas/Node".into()));
    }

    #[test]
    fn test_depth_limit() {
        let sampler = SchemaSampler::with_max_depth(2);
        let nested = schema("{type: array, items: {type: array, items: {type: array, items: {type: string}}}}");
        assert_eq!(
            sampler.generate(&nested, SampleUsage::Request).unwrap_err(),
            SampleError::TooDeep(2)
        );
    }

    #[test]
    fn test_deterministic() {
        let s = schema("{type: object, properties: {a: {type: string, format: email}, b: {type: number}}}");
        let sampler = SchemaSampler::new();
        assert_eq!(
            sampler.generate(&s, SampleUsage::Response).unwrap(),
            sampler.generate(&s, SampleUsage::Response).unwrap()
        );
    }
}
