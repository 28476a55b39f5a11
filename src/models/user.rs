use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::utils::error::ValidationError;

/// User document (collection `users`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    /// Unique across the collection
    pub email: String,
    pub age: f64,
}

impl User {
    pub fn from_new(id: ObjectId, new_user: NewUser) -> Self {
        User {
            id: Some(id),
            name: new_user.name,
            email: new_user.email,
            age: new_user.age,
        }
    }
}

/// The three mutable fields, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: f64,
}

/// Request body for create and update.
///
/// Fields are kept as raw JSON so that presence is judged on the value as
/// sent, and a present value of another type is cast the way a Mongoose
/// schema would (`"30"` becomes 30, `123` becomes "123").
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UserPayload {
    #[schema(value_type = Option<String>, example = "Ana")]
    pub name: Option<Value>,
    #[schema(value_type = Option<String>, example = "ana@x.com")]
    pub email: Option<Value>,
    #[schema(value_type = Option<f64>, example = 30)]
    pub age: Option<Value>,
}

impl UserPayload {
    /// Fails with `MissingFields` when any field is falsy: absent, null,
    /// `false`, empty string or `0`. An age of zero is therefore treated as
    /// missing. Truthy values that cannot be cast fail with `Cast`.
    pub fn validate(self) -> Result<NewUser, ValidationError> {
        let (name, email, age) = match (self.name, self.email, self.age) {
            (Some(name), Some(email), Some(age))
                if is_truthy(&name) && is_truthy(&email) && is_truthy(&age) =>
            {
                (name, email, age)
            }
            _ => return Err(ValidationError::MissingFields),
        };

        Ok(NewUser {
            name: cast_string("name", &name)?,
            email: cast_string("email", &email)?,
            age: cast_number("age", &age)?,
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn cast_error(field: &'static str, value: &Value) -> ValidationError {
    ValidationError::Cast {
        field,
        value: value.to_string(),
    }
}

fn cast_string(field: &'static str, value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => Ok(i.to_string()),
            (_, Some(u), _) => Ok(u.to_string()),
            (_, _, Some(f)) => Ok(number_to_string(f)),
            _ => Err(cast_error(field, value)),
        },
        _ => Err(cast_error(field, value)),
    }
}

// 30.0 prints as "30", like a JS number
fn number_to_string(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

fn cast_number(field: &'static str, value: &Value) -> Result<f64, ValidationError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };

    number
        .filter(|n| n.is_finite())
        .ok_or_else(|| cast_error(field, value))
}

/// User as returned by the API
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[serde(rename = "_id")]
    #[schema(example = "65f1c0a2b3d4e5f60718293a")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(serialize_with = "serialize_age")]
    #[schema(example = 30)]
    pub age: f64,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse {
            id: u.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: u.name,
            email: u.email,
            age: u.age,
        }
    }
}

// Whole ages go out as JSON integers (30, not 30.0).
fn serialize_age<S: Serializer>(age: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if age.fract() == 0.0 && age.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*age as i64)
    } else {
        serializer.serialize_f64(*age)
    }
}
