use catalogue_core::{
    Action, ActionFunction, AllowedValue, FieldDescription, Normalizer, OptionType, TypeDescription,
};
use indexmap::IndexMap;
use serde_json::{json, Value as JsonValue};

fn ticket_fields() -> IndexMap<String, FieldDescription> {
    serde_json::from_value(json!({
        "subject": {"type": "string", "required": true, "display_name": "Subject"},
        "priority": {
            "type": "*string",
            "allowed_values": [
                {"value": "low", "display_name": "Low"},
                {"value": "urgent"}
            ]
        },
        "due_at": {"type": "*softdate", "desc": "When the task is due"},
        "comment": {
            "type": {
                "body": {"type": "string", "required": true},
                "public": {"type": "bool", "default_value": true}
            }
        },
        "collaborator_ids": {"type": ["int"], "example_value": [1, 2]}
    }))
    .unwrap()
}

#[test]
fn normalizes_a_ticket_action() {
    let options = Normalizer::default().normalize_fields(&ticket_fields()).unwrap();
    let response = Normalizer::default()
        .normalize_type(&TypeDescription::fields([
            ("id", FieldDescription::new("int")),
            ("url", FieldDescription::new("string")),
        ]))
        .unwrap();

    let action = Action::function(
        "Zendesk",
        "create_ticket",
        ActionFunction::new(|input, _, _| async move { Ok(JsonValue::Object(input)) }),
    )
    .with_options(options)
    .with_response_type(response);

    assert_eq!(
        action.options.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["subject", "priority", "due_at", "comment", "collaborator_ids"]
    );
    assert!(action.options["subject"].required);
    assert_eq!(action.options["due_at"].option_type.to_string(), "*softdate");
    assert_eq!(action.options["due_at"].short_desc, "When the task is due");
    assert_eq!(
        action.options["priority"].allowed_values[1],
        AllowedValue::labelled("urgent", "urgent")
    );

    let comment = action.options["comment"].option_type.fields().unwrap();
    assert_eq!(comment["public"].default_value, Some(json!(true)));
    assert!(comment["body"].required);

    assert!(matches!(action.options["collaborator_ids"].option_type, OptionType::List(_)));
    assert_eq!(action.response_type.as_ref().unwrap().to_string(), "{id: int, url: string}");
}
