//! Request body shapes.
//!
//! A shape lists its fields; validation strips anything undeclared and
//! reports one message per violated rule, in declaration order. Within a field
//! the checks run required, then type, then emptiness, then length, stopping
//! at the first failure.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct StringField {
    pub name: &'static str,
    pub required: bool,
    pub max_len: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ObjectSchema {
    pub fields: &'static [StringField],
}

/// Shape shared by channel and standup creation.
pub const NAME_SCHEMA: ObjectSchema = ObjectSchema {
    fields: &[StringField {
        name: "name",
        required: true,
        max_len: 70,
    }],
};

/// Validated body of `POST /channels`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewChannel {
    pub name: String,
}

/// Validated body of `POST /standups`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewStandup {
    pub name: String,
}

impl ObjectSchema {
    /// Check `payload` against the shape and return only the declared fields.
    /// A missing payload is validated as an empty object.
    pub fn validate(&self, payload: Option<&Value>) -> Result<Map<String, Value>, ApiError> {
        let empty = Map::new();
        let object = match payload {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(object)) => object,
            Some(_) => {
                return Err(ApiError::InvalidRequestData(vec![
                    "\"value\" must be of type object".to_string(),
                ]))
            }
        };

        let mut violations = Vec::new();
        let mut normalized = Map::new();

        for field in self.fields {
            match object.get(field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        violations.push(format!("\"{}\" is required", field.name));
                    }
                }
                Some(Value::String(value)) => {
                    if value.is_empty() {
                        violations.push(format!("\"{}\" is not allowed to be empty", field.name));
                    } else if value.chars().count() > field.max_len {
                        violations.push(format!(
                            "\"{}\" length must be less than or equal to {} characters long",
                            field.name, field.max_len
                        ));
                    } else {
                        normalized.insert(field.name.to_string(), Value::String(value.clone()));
                    }
                }
                Some(_) => violations.push(format!("\"{}\" must be a string", field.name)),
            }
        }

        if !violations.is_empty() {
            return Err(ApiError::InvalidRequestData(violations));
        }
        Ok(normalized)
    }

    /// Validate, then deserialize the normalized fields into `T`.
    pub fn parse<T: DeserializeOwned>(&self, payload: Option<&Value>) -> Result<T, ApiError> {
        let normalized = self.validate(payload)?;
        serde_json::from_value(Value::Object(normalized))
            .map_err(|e| ApiError::InvalidRequestData(vec![e.to_string()]))
    }
}

pub fn validate_channel(payload: Option<&Value>) -> Result<NewChannel, ApiError> {
    NAME_SCHEMA.parse(payload)
}

pub fn validate_standup(payload: Option<&Value>) -> Result<NewStandup, ApiError> {
    NAME_SCHEMA.parse(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violations(payload: Value) -> Vec<String> {
        match NAME_SCHEMA.validate(Some(&payload)) {
            Err(ApiError::InvalidRequestData(list)) => list,
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn requires_name() {
        assert_eq!(violations(json!({})), vec!["\"name\" is required"]);
        assert_eq!(violations(json!({ "name": null })), vec!["\"name\" is required"]);
        assert!(matches!(
            validate_channel(None),
            Err(ApiError::InvalidRequestData(list)) if list == vec!["\"name\" is required"]
        ));
    }

    #[test]
    fn requires_string_name() {
        assert_eq!(violations(json!({ "name": 1 })), vec!["\"name\" must be a string"]);
        assert_eq!(violations(json!({ "name": ["a"] })), vec!["\"name\" must be a string"]);
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(violations(json!({ "name": "" })), vec!["\"name\" is not allowed to be empty"]);
    }

    #[test]
    fn enforces_max_length_inclusive() {
        let at_limit = "a".repeat(70);
        assert!(NAME_SCHEMA.validate(Some(&json!({ "name": at_limit }))).is_ok());

        let too_long = "a".repeat(71);
        assert_eq!(
            violations(json!({ "name": too_long })),
            vec!["\"name\" length must be less than or equal to 70 characters long"]
        );
    }

    #[test]
    fn counts_characters_not_bytes() {
        let name = "é".repeat(70);
        assert!(NAME_SCHEMA.validate(Some(&json!({ "name": name }))).is_ok());
    }

    #[test]
    fn rejects_non_objects() {
        assert_eq!(violations(json!("Daily standup")), vec!["\"value\" must be of type object"]);
        assert_eq!(violations(json!([1, 2])), vec!["\"value\" must be of type object"]);
    }

    #[test]
    fn strips_unknown_fields() {
        let payload = json!({ "name": "Daily standup", "isPrivate": false, "id": "forged" });
        let normalized = NAME_SCHEMA.validate(Some(&payload)).unwrap();
        assert_eq!(Value::Object(normalized), json!({ "name": "Daily standup" }));

        let channel = validate_channel(Some(&payload)).unwrap();
        assert_eq!(channel.name, "Daily standup");
        let standup = validate_standup(Some(&payload)).unwrap();
        assert_eq!(standup.name, "Daily standup");
    }
}
