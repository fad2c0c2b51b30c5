//! Declarative node and credential descriptors.
//!
//! These types are data, not behaviour: the host serialises them to JSON and
//! renders a parameter form from them. The only logic here is visibility
//! evaluation, which the host and the CLI both need.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Node description
// ---------------------------------------------------------------------------

/// Static description of a node type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub version: u32,
    pub group: Vec<String>,
    /// Expression the UI renders under the node title.
    pub subtitle: String,
    pub defaults: Map<String, Value>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub credentials: Vec<NodeCredential>,
    pub properties: Vec<NodeProperty>,
}

impl NodeDescription {
    /// Look up a top-level property by name.
    pub fn property(&self, name: &str) -> Option<&NodeProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Properties shown for the given parameter values.
    pub fn visible_properties<'a>(&'a self, values: &'a Map<String, Value>) -> impl Iterator<Item = &'a NodeProperty> + 'a {
        self.properties.iter().filter(move |p| p.is_visible(values))
    }
}

/// A credential type the node accepts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeCredential {
    pub name: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_options: Option<DisplayOptions>,
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// Widget kind of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyType {
    String,
    Number,
    Options,
    Collection,
    ResourceLocator,
    Hidden,
}

/// One user-facing field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperty {
    pub display_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyType,
    pub default: Value,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// The value may not be an expression (resource/operation selectors).
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_data_expression: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_options: Option<DisplayOptions>,
    /// Choices for `Options`; nested fields for `Collection`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<PropertyOption>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub type_options: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modes: Vec<ResourceLocatorMode>,
}

impl NodeProperty {
    /// A bare property with the given label, name, kind and default.
    pub fn new(display_name: &str, name: &str, kind: PropertyType, default: Value) -> Self {
        Self {
            display_name: display_name.to_string(),
            name: name.to_string(),
            kind,
            default,
            required: false,
            description: None,
            placeholder: None,
            no_data_expression: false,
            display_options: None,
            options: Vec::new(),
            type_options: Map::new(),
            modes: Vec::new(),
        }
    }

    pub fn string(display_name: &str, name: &str) -> Self {
        Self::new(display_name, name, PropertyType::String, Value::String(String::new()))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    pub fn placeholder(mut self, text: &str) -> Self {
        self.placeholder = Some(text.to_string());
        self
    }

    pub fn no_data_expression(mut self) -> Self {
        self.no_data_expression = true;
        self
    }

    pub fn show_when(mut self, display: DisplayOptions) -> Self {
        self.display_options = Some(display);
        self
    }

    pub fn options(mut self, options: Vec<PropertyOption>) -> Self {
        self.options = options;
        self
    }

    pub fn type_option(mut self, key: &str, value: Value) -> Self {
        self.type_options.insert(key.to_string(), value);
        self
    }

    pub fn modes(mut self, modes: Vec<ResourceLocatorMode>) -> Self {
        self.modes = modes;
        self
    }

    /// Whether the property is shown for the given parameter values.
    pub fn is_visible(&self, values: &Map<String, Value>) -> bool {
        self.display_options
            .as_ref()
            .map_or(true, |display| display.matches(values))
    }
}

/// A choice within an `Options` property, or a field within a `Collection`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PropertyOption {
    Choice(OptionChoice),
    Field(Box<NodeProperty>),
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionChoice {
    pub name: String,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertyOption {
    pub fn choice(name: &str, value: &str) -> Self {
        PropertyOption::Choice(OptionChoice {
            name: name.to_string(),
            value: Value::String(value.to_string()),
            action: None,
            description: None,
        })
    }

    pub fn action(name: &str, value: &str, action: &str, description: &str) -> Self {
        PropertyOption::Choice(OptionChoice {
            name: name.to_string(),
            value: Value::String(value.to_string()),
            action: Some(action.to_string()),
            description: Some(description.to_string()),
        })
    }

    pub fn field(property: NodeProperty) -> Self {
        PropertyOption::Field(Box::new(property))
    }

    /// The option's value (choices) or field name (collections).
    pub fn value(&self) -> Value {
        match self {
            PropertyOption::Choice(c) => c.value.clone(),
            PropertyOption::Field(f) => Value::String(f.name.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

/// `show` rules: every listed parameter must hold one of the listed values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayOptions {
    pub show: BTreeMap<String, Vec<String>>,
}

impl DisplayOptions {
    /// Show only while `name` holds one of `values`.
    pub fn when(name: &str, values: &[&str]) -> Self {
        Self::default().and(name, values)
    }

    /// Add another rule.
    pub fn and(mut self, name: &str, values: &[&str]) -> Self {
        self.show
            .insert(name.to_string(), values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn matches(&self, values: &Map<String, Value>) -> bool {
        self.show.iter().all(|(name, allowed)| {
            values
                .get(name)
                .and_then(Value::as_str)
                .is_some_and(|current| allowed.iter().any(|a| a == current))
        })
    }
}

// ---------------------------------------------------------------------------
// Resource locator
// ---------------------------------------------------------------------------

/// How a resource-locator mode collects its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LocatorModeKind {
    /// Searchable list backed by a list-search method.
    List,
    /// Free-text identifier.
    String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLocatorMode {
    pub display_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LocatorModeKind,
    pub placeholder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_list_method: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub searchable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<RegexValidation>,
    /// Link template for viewing the selected resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegexValidation {
    pub regex: String,
    pub error_message: String,
}

// ---------------------------------------------------------------------------
// Credential description
// ---------------------------------------------------------------------------

/// Static description of a credential type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDescription {
    pub name: String,
    pub display_name: String,
    pub documentation_url: String,
    /// Generic credential types this one specialises (e.g. `oAuth2Api`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    pub properties: Vec<NodeProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticate: Option<Authenticate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<CredentialTest>,
}

impl CredentialDescription {
    pub fn extends(&self, base: &str) -> bool {
        self.extends.iter().any(|e| e == base)
    }
}

/// How stored credential data is attached to outgoing requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Authenticate {
    /// `Authorization: Bearer <data[property]>`.
    BearerHeader { property: String },
}

/// Request issued to confirm a credential works.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialTest {
    pub method: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn display_options_require_every_rule() {
        let display = DisplayOptions::when("resource", &["recipient"]).and("operation", &["get"]);
        assert!(display.matches(&values(json!({ "resource": "recipient", "operation": "get" }))));
        assert!(!display.matches(&values(json!({ "resource": "recipient", "operation": "create" }))));
        assert!(!display.matches(&values(json!({ "operation": "get" }))));
    }

    #[test]
    fn property_without_rules_is_always_visible() {
        let prop = NodeProperty::string("Name", "name");
        assert!(prop.is_visible(&Map::new()));
    }

    #[test]
    fn property_serialises_with_host_field_names() {
        let prop = NodeProperty::new("Recipient ID", "recipientId", PropertyType::Number, json!(1))
            .required()
            .show_when(DisplayOptions::when("operation", &["get"]));
        let out = serde_json::to_value(&prop).unwrap();
        assert_eq!(out["displayName"], "Recipient ID");
        assert_eq!(out["type"], "number");
        assert_eq!(out["required"], true);
        assert_eq!(out["displayOptions"]["show"]["operation"], json!(["get"]));
        assert!(out.get("modes").is_none());
    }
}
