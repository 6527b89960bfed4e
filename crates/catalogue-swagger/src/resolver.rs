//! Local `$ref` resolution inside one document.
//!
//! Only in-document pointers of the form `#/<section>/<name>` are supported;
//! anything else is a schema resolution error.

use crate::document::{Parameter, ParameterOrRef, Response, ResponseOrRef, Schema, SwaggerDocument};
use crate::error::{SwaggerError, SwaggerResult};

#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    doc: &'a SwaggerDocument,
}

impl<'a> RefResolver<'a> {
    pub fn new(doc: &'a SwaggerDocument) -> Self {
        Self { doc }
    }

    pub fn document(&self) -> &'a SwaggerDocument {
        self.doc
    }

    /// Resolve `#/definitions/<name>`, returning the definition name with the schema
    pub fn definition(&self, reference: &str) -> SwaggerResult<(String, &'a Schema)> {
        let name = local_name(reference, "definitions")?;
        let schema = self
            .doc
            .definitions
            .get(&name)
            .ok_or_else(|| {
                SwaggerError::resolution(format!("unresolved reference '{reference}'"))
            })?;
        Ok((name, schema))
    }

    pub fn parameter(&self, param: &'a ParameterOrRef) -> SwaggerResult<&'a Parameter> {
        match param {
            ParameterOrRef::Parameter(p) => Ok(p),
            ParameterOrRef::Ref(r) => {
                let name = local_name(&r.reference, "parameters")?;
                self.doc.parameters.get(&name).ok_or_else(|| {
                    SwaggerError::resolution(format!("unresolved reference '{}'", r.reference))
                })
            }
        }
    }

    pub fn response(&self, response: &'a ResponseOrRef) -> SwaggerResult<&'a Response> {
        match response {
            ResponseOrRef::Response(r) => Ok(r),
            ResponseOrRef::Ref(r) => {
                let name = local_name(&r.reference, "responses")?;
                self.doc.responses.get(&name).ok_or_else(|| {
                    SwaggerError::resolution(format!("unresolved reference '{}'", r.reference))
                })
            }
        }
    }
}

/// Extract `<name>` from `#/<section>/<name>`, unescaping JSON pointer tokens
fn local_name(reference: &str, section: &str) -> SwaggerResult<String> {
    let pointer = reference.strip_prefix("#/").ok_or_else(|| {
        SwaggerError::resolution(format!("external reference '{reference}' is not supported"))
    })?;
    let mut tokens = pointer.split('/');
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(s), Some(name), None) if s == section && !name.is_empty() => Ok(unescape(name)),
        (Some(s), _, _) if s != section => Err(SwaggerError::resolution(format!(
            "reference '{reference}' points outside '#/{section}'"
        ))),
        _ => Err(SwaggerError::resolution(format!("unsupported reference pointer '{reference}'"))),
    }
}

fn unescape(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Reference;

    fn doc() -> SwaggerDocument {
        serde_json::from_str(
            r#"{
                "swagger": "2.0",
                "paths": {},
                "definitions": {"Pet": {"type": "object"}, "a/b": {"type": "string"}},
                "parameters": {"Limit": {"name": "limit", "in": "query", "type": "integer"}}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolves_local_definitions() {
        let doc = doc();
        let resolver = RefResolver::new(&doc);
        let (name, schema) = resolver.definition("#/definitions/Pet").unwrap();
        assert_eq!(name, "Pet");
        assert_eq!(schema.schema_type.as_deref(), Some("object"));

        let (escaped, _) = resolver.definition("#/definitions/a~1b").unwrap();
        assert_eq!(escaped, "a/b");
    }

    #[test]
    fn test_dangling_and_external_refs_fail() {
        let doc = doc();
        let resolver = RefResolver::new(&doc);
        for reference in [
            "#/definitions/Nope",
            "other.json#/definitions/Pet",
            "#/parameters/Limit",
            "#/definitions/Pet/properties/x",
        ] {
            let err = resolver.definition(reference).unwrap_err();
            assert!(matches!(err, SwaggerError::SchemaResolution(_)), "{reference}: {err}");
        }
    }

    #[test]
    fn test_resolves_parameter_refs() {
        let doc = doc();
        let param = ParameterOrRef::Ref(Reference {
            reference: "#/parameters/Limit".into(),
        });
        let resolved = RefResolver::new(&doc).parameter(&param).unwrap();
        assert_eq!(resolved.name, "limit");
    }
}
