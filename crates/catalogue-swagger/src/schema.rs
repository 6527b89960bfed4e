//! Conversion of swagger schemas into type descriptions.

use catalogue_core::{AllowedValue, FieldDescription, TypeDescription};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::document::Schema;
use crate::error::SwaggerResult;
use crate::resolver::RefResolver;

/// Walks a schema, following `$ref`s and cutting recursion at the first repeat
pub struct SchemaConverter<'a> {
    resolver: RefResolver<'a>,
    stack: Vec<String>,
}

impl<'a> SchemaConverter<'a> {
    pub fn new(resolver: RefResolver<'a>) -> Self {
        Self {
            resolver,
            stack: Vec::new(),
        }
    }

    pub fn convert(&mut self, schema: &Schema) -> SwaggerResult<TypeDescription> {
        if let Some(reference) = &schema.reference {
            let (name, target) = self.resolver.definition(reference)?;
            if self.stack.contains(&name) {
                debug!(definition = %name, "recursive reference cut to hash");
                return Ok(nullable(
                    TypeDescription::named("hash"),
                    schema.nullable || target.nullable,
                ));
            }
            self.stack.push(name);
            let converted = self.convert(target);
            self.stack.pop();
            return Ok(nullable(converted?, schema.nullable));
        }

        if !schema.all_of.is_empty() {
            return self.convert_all_of(schema);
        }

        let description = match schema.schema_type.as_deref() {
            Some("object") => self.convert_object(schema)?,
            None if !schema.properties.is_empty() => self.convert_object(schema)?,
            None => TypeDescription::named("any"),
            Some("array") => match &schema.items {
                Some(items) => TypeDescription::list_of(self.convert(items)?),
                None => TypeDescription::named("list"),
            },
            Some("string") => match schema.format.as_deref() {
                Some("date") | Some("date-time") => TypeDescription::named("date"),
                Some("binary") | Some("byte") => TypeDescription::named("binary"),
                _ => TypeDescription::named("string"),
            },
            Some("integer") => TypeDescription::named("int"),
            Some("number") => TypeDescription::named("number"),
            Some("boolean") => TypeDescription::named("bool"),
            Some("file") => TypeDescription::named("binary"),
            // left for the normalizer to reject with the field path
            Some(other) => TypeDescription::named(other),
        };
        Ok(nullable(description, schema.nullable))
    }

    /// Fields of an object schema, or `None` when it is not an object with properties
    pub fn object_fields(
        &mut self,
        schema: &Schema,
    ) -> SwaggerResult<Option<IndexMap<String, FieldDescription>>> {
        match self.convert(schema)? {
            TypeDescription::Fields(fields) => Ok(Some(fields)),
            _ => Ok(None),
        }
    }

    fn convert_object(&mut self, schema: &Schema) -> SwaggerResult<TypeDescription> {
        if schema.properties.is_empty() {
            return Ok(TypeDescription::named("hash"));
        }
        let mut fields = IndexMap::with_capacity(schema.properties.len());
        for (name, property) in &schema.properties {
            let required = schema.required.iter().any(|r| r == name);
            fields.insert(name.clone(), self.field(property, required)?);
        }
        Ok(TypeDescription::Fields(fields))
    }

    fn convert_all_of(&mut self, schema: &Schema) -> SwaggerResult<TypeDescription> {
        let mut merged = IndexMap::new();
        for part in &schema.all_of {
            match self.convert(part)? {
                TypeDescription::Fields(fields) => merged.extend(fields),
                TypeDescription::Named(name) if name.trim_start_matches('*') == "hash" => {}
                other => {
                    debug!(part = ?other, "allOf part is not an object, keeping hash");
                    return Ok(TypeDescription::named("hash"));
                }
            }
        }
        if let TypeDescription::Fields(own) = self.convert_object(schema)? {
            merged.extend(own);
        }
        if merged.is_empty() {
            return Ok(TypeDescription::named("hash"));
        }
        Ok(TypeDescription::Fields(merged))
    }

    /// One described field built from a property or parameter schema
    pub fn field(&mut self, schema: &Schema, required: bool) -> SwaggerResult<FieldDescription> {
        let mut field = FieldDescription::new(self.convert(schema)?).required(required);
        field.display_name = schema.title.clone();
        field.desc = schema.description.clone();
        field.default_value = schema.default.clone();
        field.example_value = schema.example.clone();
        field.allowed_values = allowed_values(&schema.enum_values);
        Ok(field)
    }
}

fn nullable(description: TypeDescription, nullable: bool) -> TypeDescription {
    match description {
        TypeDescription::Named(name) if nullable && !name.starts_with('*') => {
            TypeDescription::Named(format!("*{name}"))
        }
        other => other,
    }
}

fn allowed_values(values: &[JsonValue]) -> Vec<AllowedValue> {
    values
        .iter()
        .map(|value| {
            let label = match value {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            AllowedValue::labelled(value.clone(), label)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SwaggerDocument;
    use serde_json::json;

    fn doc() -> SwaggerDocument {
        serde_json::from_value(json!({
            "swagger": "2.0",
            "paths": {},
            "definitions": {
                "Node": {
                    "type": "object",
                    "properties": {
                        "value": {"type": "string"},
                        "children": {"type": "array", "items": {"$ref": "#/definitions/Node"}}
                    }
                },
                "Named": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {"name": {"type": "string"}}
                },
                "Dated": {
                    "type": "object",
                    "properties": {"at": {"type": "string", "format": "date-time"}}
                }
            }
        }))
        .unwrap()
    }

    fn convert(doc: &SwaggerDocument, schema: serde_json::Value) -> SwaggerResult<TypeDescription> {
        let schema: Schema = serde_json::from_value(schema).unwrap();
        SchemaConverter::new(RefResolver::new(doc)).convert(&schema)
    }

    #[test]
    fn test_primitive_mapping() {
        let doc = doc();
        let cases = [
            (json!({"type": "integer", "format": "int64"}), "int"),
            (json!({"type": "boolean"}), "bool"),
            (json!({"type": "number"}), "number"),
            (json!({"type": "string", "format": "date"}), "date"),
            (json!({"type": "string", "format": "byte"}), "binary"),
            (json!({"type": "file"}), "binary"),
            (json!({"type": "object"}), "hash"),
            (json!({"type": "array"}), "list"),
            (json!({}), "any"),
            (json!({"type": "string", "x-nullable": true}), "*string"),
        ];
        for (schema, expected) in cases {
            assert_eq!(convert(&doc, schema).unwrap(), TypeDescription::named(expected));
        }
    }

    #[test]
    fn test_recursive_definition_terminates() {
        let doc = doc();
        let converted = convert(&doc, json!({"$ref": "#/definitions/Node"})).unwrap();
        let TypeDescription::Fields(fields) = converted else { panic!("expected fields") };
        assert_eq!(
            fields["children"].field_type,
            TypeDescription::list_of(TypeDescription::named("hash"))
        );
    }

    #[test]
    fn test_all_of_merges_properties() {
        let doc = doc();
        let converted = convert(
            &doc,
            json!({"allOf": [{"$ref": "#/definitions/Named"}, {"$ref": "#/definitions/Dated"}],
                   "properties": {"extra": {"type": "integer"}}}),
        )
        .unwrap();
        let TypeDescription::Fields(fields) = converted else { panic!("expected fields") };
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["name", "at", "extra"]);
        assert!(fields["name"].required);
        assert_eq!(fields["at"].field_type, TypeDescription::named("date"));
    }

    #[test]
    fn test_enum_becomes_allowed_values() {
        let doc = doc();
        let schema: Schema =
            serde_json::from_value(json!({"type": "string", "enum": ["open", "closed"]})).unwrap();
        let field = SchemaConverter::new(RefResolver::new(&doc))
            .field(&schema, false)
            .unwrap();
        assert_eq!(field.allowed_values[1], AllowedValue::labelled("closed", "closed"));
    }

    #[test]
    fn test_dangling_reference_fails() {
        let doc = doc();
        assert!(convert(&doc, json!({"$ref": "#/definitions/Missing"})).is_err());
    }
}
