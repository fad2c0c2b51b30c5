//! Parameter schema of the thanks.io node.

use nodes::schema::{
    DisplayOptions, LocatorModeKind, NodeCredential, NodeDescription, NodeProperty, PropertyOption,
    PropertyType, RegexValidation, ResourceLocatorMode,
};
use serde_json::{json, Map, Value};

use crate::countries::country_options;
use crate::credentials::{
    API_KEY_AUTHENTICATION, API_KEY_CREDENTIAL, OAUTH2_AUTHENTICATION, OAUTH2_CREDENTIAL,
};
use crate::models::{Operation, Resource, DEFAULT_COUNTRY};

pub const NODE_NAME: &str = "thanksIo";

/// List-search method backing the mailing list picker.
pub const SEARCH_MAILING_LISTS: &str = "searchMailingLists";

const CUSTOM_FIELD_HINT: &str = "Custom info about the recipient like order ID or customer ID";

/// Shown only for `resource` + `operation`.
fn for_operation(resource: Resource, operation: Operation) -> DisplayOptions {
    DisplayOptions::when("resource", &[resource.as_str()]).and("operation", &[operation.as_str()])
}

pub fn node_description() -> NodeDescription {
    let create = for_operation(Resource::Recipient, Operation::Create);
    let get = for_operation(Resource::Recipient, Operation::Get);

    let mut defaults = Map::new();
    defaults.insert("name".into(), Value::String("thanks.io".into()));

    let mut properties = vec![
        NodeProperty::new(
            "Authentication",
            "authentication",
            PropertyType::Options,
            json!(API_KEY_AUTHENTICATION),
        )
        .options(vec![
            PropertyOption::choice("Personal Access Tokens (API Key)", API_KEY_AUTHENTICATION),
            PropertyOption::choice("OAuth2", OAUTH2_AUTHENTICATION),
        ]),
        NodeProperty::new("Resource", "resource", PropertyType::Options, json!("recipient"))
            .no_data_expression()
            .options(vec![PropertyOption::choice("Recipient", Resource::Recipient.as_str())]),
        NodeProperty::new("Operation", "operation", PropertyType::Options, json!("create"))
            .no_data_expression()
            .show_when(DisplayOptions::when("resource", &[Resource::Recipient.as_str()]))
            .options(vec![
                PropertyOption::action("Create", "create", "Create recipient", "Add recipient to mailing list"),
                PropertyOption::action("Get", "get", "Get recipient", "Retrieve a recipient by ID"),
            ]),
    ];

    properties.push(mailing_list_locator().show_when(create.clone()));
    properties.extend(
        [
            NodeProperty::string("Name", "name"),
            NodeProperty::string("Street Address (or Full Address)", "address").placeholder("7777 Main st"),
            NodeProperty::string("Address 2", "address2")
                .placeholder("Apartment #1")
                .description("Address line 2 (e.g. apartment, suite, unit, or building)"),
            NodeProperty::string("City", "city"),
            NodeProperty::string("State", "province").description("State or Province"),
            NodeProperty::string("Postal Code", "postal_code").description("ZIP or Postal Code"),
            NodeProperty::new("Country", "country", PropertyType::Options, json!(DEFAULT_COUNTRY))
                .type_option("searchable", Value::Bool(true))
                .options(country_options()),
            additional_fields(),
        ]
        .into_iter()
        .map(|p| p.show_when(create.clone())),
    );
    properties.push(
        NodeProperty::new("Recipient ID", "recipientId", PropertyType::Number, json!(1))
            .required()
            .show_when(get),
    );

    NodeDescription {
        name: NODE_NAME.to_string(),
        display_name: "thanks.io".to_string(),
        description: "Interact with thanks.io API".to_string(),
        version: 1,
        group: vec!["transform".to_string()],
        subtitle: r#"={{$parameter["resource"] + ": " + $parameter["operation"]}}"#.to_string(),
        defaults,
        inputs: vec!["main".to_string()],
        outputs: vec!["main".to_string()],
        credentials: vec![
            NodeCredential {
                name: API_KEY_CREDENTIAL.to_string(),
                required: true,
                display_options: Some(DisplayOptions::when("authentication", &[API_KEY_AUTHENTICATION])),
            },
            NodeCredential {
                name: OAUTH2_CREDENTIAL.to_string(),
                required: true,
                display_options: Some(DisplayOptions::when("authentication", &[OAUTH2_AUTHENTICATION])),
            },
        ],
        properties,
    }
}

fn mailing_list_locator() -> NodeProperty {
    NodeProperty::new(
        "Mailing List ID",
        "mailing_list_id",
        PropertyType::ResourceLocator,
        json!({ "mode": "list", "value": "" }),
    )
    .required()
    .description("ID of the mailing list to add the recipient to")
    .modes(vec![
        ResourceLocatorMode {
            display_name: "From List".to_string(),
            name: "list".to_string(),
            kind: LocatorModeKind::List,
            placeholder: "Select a Mailing List...".to_string(),
            search_list_method: Some(SEARCH_MAILING_LISTS.to_string()),
            searchable: true,
            validation: Vec::new(),
            url: None,
        },
        ResourceLocatorMode {
            display_name: "ID".to_string(),
            name: "id".to_string(),
            kind: LocatorModeKind::String,
            placeholder: "e.g. 12345".to_string(),
            search_list_method: None,
            searchable: false,
            validation: vec![RegexValidation {
                regex: "[0-9]{1,}".to_string(),
                error_message: "Not a valid Mailing List ID".to_string(),
            }],
            url: Some("=https://dashboard.thanks.io/mailing_lists/{{$value}}".to_string()),
        },
    ])
}

fn additional_fields() -> NodeProperty {
    let custom = |n: u8| {
        NodeProperty::string(&format!("Custom {n}"), &format!("custom{n}")).description(CUSTOM_FIELD_HINT)
    };
    NodeProperty::new("Additional Fields", "additionalFields", PropertyType::Collection, json!({}))
        .placeholder("Add Field")
        .options(
            [
                NodeProperty::string("Company (or Spouse)", "company"),
                custom(1),
                custom(2),
                custom(3),
                custom(4),
                NodeProperty::string("DOB", "dob")
                    .placeholder("MM/DD/YYYY")
                    .description("Date of birth of the recipient"),
                NodeProperty::string("Email", "email").placeholder("name@email.com"),
                NodeProperty::string("Phone", "phone").description("Telephone number of the recipient to create"),
            ]
            .into_iter()
            .map(PropertyOption::field)
            .collect(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(resource: &str, operation: &str) -> Map<String, Value> {
        json!({ "resource": resource, "operation": operation })
            .as_object()
            .cloned()
            .unwrap_or_default()
    }

    fn visible_names(resource: &str, operation: &str) -> Vec<String> {
        let description = node_description();
        let values = values(resource, operation);
        description
            .visible_properties(&values)
            .map(|p| p.name.clone())
            .collect()
    }

    #[test]
    fn create_shows_address_fields_only() {
        let names = visible_names("recipient", "create");
        for field in [
            "mailing_list_id", "name", "address", "address2", "city", "province", "postal_code", "country",
            "additionalFields",
        ] {
            assert!(names.iter().any(|n| n == field), "{field} should be visible");
        }
        assert!(!names.iter().any(|n| n == "recipientId"));
    }

    #[test]
    fn get_shows_recipient_id_only() {
        let names = visible_names("recipient", "get");
        assert!(names.iter().any(|n| n == "recipientId"));
        assert!(!names.iter().any(|n| n == "mailing_list_id"));
        assert!(!names.iter().any(|n| n == "name"));
    }

    #[test]
    fn mailing_list_locator_has_list_and_id_modes() {
        let description = node_description();
        let locator = description.property("mailing_list_id").expect("locator");
        assert_eq!(locator.kind, PropertyType::ResourceLocator);
        assert!(locator.required);
        let list = &locator.modes[0];
        assert_eq!(list.search_list_method.as_deref(), Some(SEARCH_MAILING_LISTS));
        let id = &locator.modes[1];
        assert_eq!(id.validation[0].regex, "[0-9]{1,}");
    }

    #[test]
    fn additional_fields_expose_optional_attributes() {
        let description = node_description();
        let collection = description.property("additionalFields").expect("collection");
        let names: Vec<Value> = collection.options.iter().map(PropertyOption::value).collect();
        assert_eq!(
            names,
            vec![
                json!("company"), json!("custom1"), json!("custom2"), json!("custom3"),
                json!("custom4"), json!("dob"), json!("email"), json!("phone"),
            ]
        );
    }

    #[test]
    fn country_defaults_to_us() {
        let description = node_description();
        let country = description.property("country").expect("country");
        assert_eq!(country.default, json!("US"));
        assert!(country.options.len() > 200);
    }
}
