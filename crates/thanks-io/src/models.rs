//! Typed shapes of the thanks.io node: selectors, request bodies and
//! list-search records.

use std::fmt;
use std::str::FromStr;

use nodes::{ListSearchEntry, NodeError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

// ---------------------------------------------------------------------------
// Resource / operation selectors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Recipient,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Recipient => "recipient",
        }
    }
}

impl FromStr for Resource {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recipient" => Ok(Resource::Recipient),
            other => Err(NodeError::UnsupportedResource(other.to_string())),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Get,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Get => "get",
        }
    }

    /// Parse `value` as an operation of `resource`.
    ///
    /// # Errors
    /// `NodeError::UnsupportedOperation` for anything the resource lacks.
    pub fn parse(resource: Resource, value: &str) -> Result<Self, NodeError> {
        match (resource, value) {
            (Resource::Recipient, "create") => Ok(Operation::Create),
            (Resource::Recipient, "get") => Ok(Operation::Get),
            (resource, other) => Err(NodeError::UnsupportedOperation {
                resource: resource.to_string(),
                operation: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Mailing list ID
// ---------------------------------------------------------------------------

/// The `mailing_list_id` parameter: a raw value, or a picker object
/// `{ mode, value }` produced by the resource-locator widget.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MailingListId {
    Picked {
        #[serde(default)]
        mode: Option<String>,
        value: RawListId,
    },
    Direct(RawListId),
}

/// A list ID as typed or picked: a JSON number or numeric text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawListId {
    Number(Number),
    Text(String),
}

impl MailingListId {
    /// Read the parameter value into one of the two forms.
    ///
    /// # Errors
    /// `NodeError::Validation` when the value is neither form.
    pub fn parse(value: Value) -> Result<Self, NodeError> {
        serde_json::from_value(value).map_err(|_| invalid_mailing_list_id())
    }

    /// The numeric ID, read the way a user would type it: leading
    /// whitespace is skipped and trailing non-digits are ignored.
    ///
    /// # Errors
    /// `NodeError::Validation` when no positive integer can be read.
    pub fn resolve(&self) -> Result<i64, NodeError> {
        let raw = match self {
            MailingListId::Picked { value, .. } | MailingListId::Direct(value) => value,
        };
        let parsed = match raw {
            RawListId::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            RawListId::Text(s) => parse_leading_int(s),
        };
        parsed.filter(|id| *id > 0).ok_or_else(invalid_mailing_list_id)
    }
}

fn invalid_mailing_list_id() -> NodeError {
    NodeError::Validation("Invalid Mailing List ID".to_string())
}

fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

// ---------------------------------------------------------------------------
// Recipient bodies
// ---------------------------------------------------------------------------

/// Country sent when the parameter is not set.
pub const DEFAULT_COUNTRY: &str = "US";

/// Body of `POST /recipients` before additional fields are merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipientCreateRequest {
    pub mailing_list_id: i64,
    pub name: String,
    pub address: String,
    pub address2: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country: String,
}

/// Optional recipient attributes from the "additional fields" collection.
///
/// Values are sent as given, whatever their JSON type. Unknown keys are
/// carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom1: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom2: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom3: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom4: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl RecipientCreateRequest {
    /// The JSON body with `additional` merged over the base fields.
    ///
    /// # Errors
    /// `NodeError::Validation` if serialisation fails.
    pub fn into_body(self, additional: &AdditionalFields) -> Result<Map<String, Value>, NodeError> {
        let mut body = to_object(&self)?;
        body.extend(to_object(additional)?);
        Ok(body)
    }
}

fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>, NodeError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Ok(Map::new()),
        Err(e) => Err(NodeError::Validation(e.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Mailing lists
// ---------------------------------------------------------------------------

/// One record of `GET /mailing-lists`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailingList {
    pub id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub total_recipients: i64,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailingListPage {
    #[serde(default)]
    pub data: Vec<MailingList>,
}

impl From<MailingList> for ListSearchEntry {
    fn from(list: MailingList) -> Self {
        ListSearchEntry {
            name: format!("{} ({})", list.description, list.total_recipients),
            value: Value::from(list.id),
            description: Some(list.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(value: Value) -> Result<i64, NodeError> {
        MailingListId::parse(value)?.resolve()
    }

    #[test]
    fn mailing_list_id_accepts_raw_and_picked_values() {
        assert_eq!(resolve(json!(42)), Ok(42));
        assert_eq!(resolve(json!({ "mode": "id", "value": "42" })), Ok(42));
        assert_eq!(resolve(json!({ "mode": "list", "value": 7 })), Ok(7));
        assert_eq!(resolve(json!(" 12abc")), Ok(12));
        assert_eq!(resolve(json!(9.0)), Ok(9));
    }

    #[test]
    fn mailing_list_id_rejects_non_numeric() {
        let invalid = Err(NodeError::Validation("Invalid Mailing List ID".into()));
        assert_eq!(resolve(json!("abc")), invalid);
        assert_eq!(resolve(json!({ "mode": "list", "value": "" })), invalid);
        assert_eq!(resolve(json!({ "mode": "list", "value": null })), invalid);
        assert_eq!(resolve(json!({ "mode": "list" })), invalid);
        assert_eq!(resolve(json!(true)), invalid);
        assert_eq!(resolve(Value::Null), invalid);
        assert_eq!(resolve(json!("0")), invalid);
    }

    #[test]
    fn deserialises_untagged() {
        let picked = MailingListId::parse(json!({ "mode": "id", "value": "9" })).unwrap();
        assert_eq!(
            picked,
            MailingListId::Picked { mode: Some("id".into()), value: RawListId::Text("9".into()) }
        );
        let direct = MailingListId::parse(json!(9)).unwrap();
        assert_eq!(direct, MailingListId::Direct(RawListId::Number(Number::from(9u64))));
    }

    #[test]
    fn additional_fields_keep_non_string_values() {
        let additional: AdditionalFields =
            serde_json::from_value(json!({ "phone": 5551234, "custom1": 12345, "vip": true })).unwrap();
        assert_eq!(additional.phone, Some(json!(5551234)));
        assert_eq!(additional.custom1, Some(json!(12345)));
        assert_eq!(additional.other.get("vip"), Some(&json!(true)));
    }

    #[test]
    fn additional_fields_override_base_fields() {
        let request = RecipientCreateRequest {
            mailing_list_id: 1,
            name: "Jane".into(),
            address: "1 Main St".into(),
            address2: String::new(),
            city: "Springfield".into(),
            province: "IL".into(),
            postal_code: "62704".into(),
            country: "US".into(),
        };
        let additional: AdditionalFields =
            serde_json::from_value(json!({ "email": "jane@example.com", "name": "Jane Q. Doe" })).unwrap();
        let body = request.into_body(&additional).unwrap();
        assert_eq!(body["name"], "Jane Q. Doe");
        assert_eq!(body["email"], "jane@example.com");
        assert_eq!(body["mailing_list_id"], 1);
        assert!(!body.contains_key("phone"));
    }

    #[test]
    fn unknown_selectors_are_errors() {
        assert_eq!(
            "order".parse::<Resource>(),
            Err(NodeError::UnsupportedResource("order".into()))
        );
        assert!(matches!(
            Operation::parse(Resource::Recipient, "delete"),
            Err(NodeError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn mailing_list_display_entry() {
        let entry: ListSearchEntry = MailingList {
            id: 5,
            description: "Holiday cards".into(),
            total_recipients: 120,
            created_at: "2024-11-01 10:00:00".into(),
        }
        .into();
        assert_eq!(entry.name, "Holiday cards (120)");
        assert_eq!(entry.value, json!(5));
        assert_eq!(entry.description.as_deref(), Some("2024-11-01 10:00:00"));
    }
}
