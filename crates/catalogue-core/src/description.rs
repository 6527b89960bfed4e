//! Hand-written type descriptions accepted by the normalizer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::option::AllowedValue;
use crate::resolver::{AllowedValuesResolver, DependentOptionsResolver};

/// Loose description of a type, as authored in app metadata or derived from a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDescription {
    /// A primitive type name, e.g. `"*softint"`
    Named(String),
    /// A typed list; must contain exactly one element
    List(Vec<TypeDescription>),
    /// A nested shape
    Fields(IndexMap<String, FieldDescription>),
}

impl TypeDescription {
    pub fn named(name: impl Into<String>) -> Self {
        TypeDescription::Named(name.into())
    }

    pub fn list_of(item: TypeDescription) -> Self {
        TypeDescription::List(vec![item])
    }

    pub fn fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldDescription)>,
        K: Into<String>,
    {
        TypeDescription::Fields(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<String> for TypeDescription {
    fn from(value: String) -> Self {
        TypeDescription::Named(value)
    }
}

impl From<&str> for TypeDescription {
    fn from(value: &str) -> Self {
        TypeDescription::Named(value.to_string())
    }
}

/// One field of a nested description: display metadata plus the field's own type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(rename = "type")]
    pub field_type: TypeDescription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<AllowedValue>,
    #[serde(skip)]
    pub get_allowed_values: Option<AllowedValuesResolver>,
    #[serde(skip)]
    pub get_dependent_options: Option<DependentOptionsResolver>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub preselected: bool,
}

impl FieldDescription {
    pub fn new(field_type: impl Into<TypeDescription>) -> Self {
        Self {
            display_name: None,
            short_desc: None,
            desc: None,
            field_type: field_type.into(),
            default_value: None,
            example_value: None,
            allowed_values: Vec::new(),
            get_allowed_values: None,
            get_dependent_options: None,
            depends_on: Vec::new(),
            required: false,
            preselected: false,
        }
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn short_desc(mut self, text: impl Into<String>) -> Self {
        self.short_desc = Some(text.into());
        self
    }

    pub fn desc(mut self, text: impl Into<String>) -> Self {
        self.desc = Some(text.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn default_value(mut self, value: JsonValue) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn example_value(mut self, value: JsonValue) -> Self {
        self.example_value = Some(value);
        self
    }

    pub fn allowed_values(mut self, values: Vec<AllowedValue>) -> Self {
        self.allowed_values = values;
        self
    }

    pub fn get_allowed_values(mut self, resolver: AllowedValuesResolver) -> Self {
        self.get_allowed_values = Some(resolver);
        self
    }

    pub fn get_dependent_options(mut self, resolver: DependentOptionsResolver) -> Self {
        self.get_dependent_options = Some(resolver);
        self
    }

    pub fn depends_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = names.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_nested_description() {
        let desc: TypeDescription = serde_json::from_value(json!({
            "id": {"type": "int", "required": true},
            "tags": {"type": ["string"]},
            "owner": {"type": {"email": {"type": "*string"}}}
        }))
        .unwrap();

        let TypeDescription::Fields(fields) = desc else { panic!("expected fields") };
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["id", "tags", "owner"]);
        assert!(fields["id"].required);
        assert!(matches!(fields["tags"].field_type, TypeDescription::List(_)));
        assert!(matches!(fields["owner"].field_type, TypeDescription::Fields(_)));
    }
}
