//! Builds catalogue actions from the operations of a swagger document.

use catalogue_core::{
    normalize_name, Action, ActionOption, CollisionPolicy, Diagnostic, Diagnostics,
    FieldDescription, HttpMethod, Normalizer, OptionType, SwaggerPath,
};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::document::{Operation, Parameter, ParameterLocation, PathItem, SwaggerDocument};
use crate::error::{SwaggerError, SwaggerResult};
use crate::resolver::RefResolver;
use crate::schema::SchemaConverter;

pub const DIAGNOSTIC_SOURCE: &str = "swagger";

/// An action derived from one operation, not yet attached to an app
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub path: String,
    pub method: HttpMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub deprecated: bool,
    pub options: IndexMap<String, ActionOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<OptionType>,
    /// Body properties dropped because a parameter already uses the name
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shadowed_body_fields: Vec<String>,
}

impl ActionDescriptor {
    pub fn swagger_path(&self) -> SwaggerPath {
        SwaggerPath::new(self.path.clone(), self.method)
    }

    /// Record mapping gaps of this operation as diagnostics for `app`
    pub fn report(&self, app: &str, diagnostics: &mut Diagnostics) {
        for field in &self.shadowed_body_fields {
            diagnostics.push(
                Diagnostic::warning(
                    DIAGNOSTIC_SOURCE,
                    format!("body field '{field}' shadowed by a parameter of the same name"),
                )
                .app(app)
                .action(self.name.clone()),
            );
        }
    }

    pub fn into_action(self, app: &str) -> Action {
        let swagger_path = self.swagger_path();
        let mut action = Action::swagger(app, self.name, swagger_path)
            .with_labels(
                self.summary.as_deref(),
                self.summary.as_deref(),
                self.description.as_deref(),
            )
            .with_options(self.options);
        action.response_type = self.response_type;
        action
    }
}

/// An operation the builder could not turn into an action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedOperation {
    pub path: String,
    pub method: HttpMethod,
    pub name: Option<String>,
    pub reason: String,
}

/// Result of a lenient build
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildOutcome {
    pub actions: Vec<ActionDescriptor>,
    pub skipped: Vec<SkippedOperation>,
    /// Allowed paths the document does not define
    pub missing_paths: Vec<String>,
    /// Action names defined by more than one operation
    pub collisions: Vec<String>,
}

impl BuildOutcome {
    /// Record everything that did not map cleanly as diagnostics for `app`
    pub fn report(&self, app: &str, diagnostics: &mut Diagnostics) {
        for action in &self.actions {
            action.report(app, diagnostics);
        }
        for path in &self.missing_paths {
            let message = format!("allowed path '{path}' not found in document");
            diagnostics.push(Diagnostic::warning(DIAGNOSTIC_SOURCE, message).app(app));
        }
        for name in &self.collisions {
            let message = "action name defined by more than one operation";
            diagnostics.push(
                Diagnostic::warning(DIAGNOSTIC_SOURCE, message)
                    .app(app)
                    .action(name.clone()),
            );
        }
        for skipped in &self.skipped {
            let mut diagnostic = Diagnostic::error(
                DIAGNOSTIC_SOURCE,
                format!("{} {} skipped: {}", skipped.method, skipped.path, skipped.reason),
            )
            .app(app);
            if let Some(name) = &skipped.name {
                diagnostic = diagnostic.action(name.clone());
            }
            diagnostics.push(diagnostic);
        }
    }

    pub fn into_actions(self, app: &str) -> Vec<Action> {
        self.actions.into_iter().map(|d| d.into_action(app)).collect()
    }
}

pub struct SwaggerActionBuilder<'a> {
    doc: &'a SwaggerDocument,
    allowed_paths: Vec<String>,
    policy: CollisionPolicy,
    normalizer: Normalizer,
}

impl<'a> SwaggerActionBuilder<'a> {
    pub fn new(doc: &'a SwaggerDocument) -> Self {
        Self {
            doc,
            allowed_paths: Vec::new(),
            policy: CollisionPolicy::default(),
            normalizer: Normalizer::default(),
        }
    }

    /// Literal path templates to include; empty means every path
    pub fn with_allowed_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    fn is_allowed(&self, path: &str) -> bool {
        self.allowed_paths.is_empty() || self.allowed_paths.iter().any(|p| p == path)
    }

    fn operations(
        &self,
    ) -> impl Iterator<Item = (&'a str, &'a PathItem, HttpMethod, &'a Operation)> + '_ {
        self.doc
            .paths
            .iter()
            .filter(|(path, _)| self.is_allowed(path))
            .flat_map(|(path, item)| {
                item.operations()
                    .map(move |(method, op)| (path.as_str(), item, method, op))
            })
    }

    /// Build every allowed operation, collecting failures instead of stopping
    pub fn build(&self) -> BuildOutcome {
        let mut outcome = BuildOutcome {
            missing_paths: self
                .allowed_paths
                .iter()
                .filter(|p| !self.doc.paths.contains_key(p.as_str()))
                .cloned()
                .collect(),
            ..Default::default()
        };
        let mut built: IndexMap<String, ActionDescriptor> = IndexMap::new();

        for (path, item, method, op) in self.operations() {
            let descriptor = match self.describe(path, item, method, op) {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    outcome.skipped.push(SkippedOperation {
                        path: path.to_string(),
                        method,
                        name: Some(action_name(path, method, op)),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            if let Some(existing) = built.get(&descriptor.name) {
                outcome.collisions.push(descriptor.name.clone());
                match self.policy {
                    CollisionPolicy::Overwrite => {
                        warn!(
                            action = %descriptor.name,
                            replaced = %existing.swagger_path(),
                            by = %descriptor.swagger_path(),
                            "duplicate action name, later operation wins"
                        );
                    }
                    CollisionPolicy::Reject => {
                        outcome.skipped.push(SkippedOperation {
                            path: path.to_string(),
                            method,
                            name: Some(descriptor.name.clone()),
                            reason: format!("duplicate action '{}'", descriptor.name),
                        });
                        continue;
                    }
                }
            }
            built.insert(descriptor.name.clone(), descriptor);
        }

        outcome.actions = built.into_values().collect();
        outcome
    }

    /// Build every allowed operation, failing on the first error
    pub fn build_strict(&self) -> SwaggerResult<Vec<ActionDescriptor>> {
        let mut built: IndexMap<String, ActionDescriptor> = IndexMap::new();
        for (path, item, method, op) in self.operations() {
            let descriptor = self.describe(path, item, method, op)?;
            if built.contains_key(&descriptor.name) {
                if self.policy == CollisionPolicy::Reject {
                    return Err(SwaggerError::DuplicateAction(descriptor.name));
                }
                warn!(action = %descriptor.name, "duplicate action name, later operation wins");
            }
            built.insert(descriptor.name.clone(), descriptor);
        }
        Ok(built.into_values().collect())
    }

    /// Build the action for one explicit operation, ignoring the allow-list
    pub fn build_operation(
        &self,
        path: &str,
        method: HttpMethod,
    ) -> SwaggerResult<ActionDescriptor> {
        let not_found = || SwaggerError::OperationNotFound {
            path: path.to_string(),
            method,
        };
        let (path, item) = self.doc.paths.get_key_value(path).ok_or_else(not_found)?;
        let op = item.operation(method).ok_or_else(not_found)?;
        self.describe(path, item, method, op)
    }

    fn describe(
        &self,
        path: &str,
        item: &PathItem,
        method: HttpMethod,
        op: &Operation,
    ) -> SwaggerResult<ActionDescriptor> {
        let resolver = RefResolver::new(self.doc);
        let name = action_name(path, method, op);
        let normalizer = self.normalizer.scoped(&name);

        // operation-level parameters override path-level ones with the same name and location
        let mut params: IndexMap<(String, ParameterLocation), &Parameter> = IndexMap::new();
        for param in item.parameters.iter().chain(op.parameters.iter()) {
            let param = resolver.parameter(param)?;
            params.insert((param.name.clone(), param.location), param);
        }

        let mut fields: IndexMap<String, FieldDescription> = IndexMap::new();
        let mut body: IndexMap<String, FieldDescription> = IndexMap::new();
        for param in params.values() {
            let mut converter = SchemaConverter::new(resolver);
            match param.location {
                ParameterLocation::Header => {
                    debug!(
                        action = %name,
                        header = %param.name,
                        "header parameter left to the connection"
                    );
                }
                ParameterLocation::Body => {
                    let schema = param.value_schema();
                    match converter.object_fields(&schema)? {
                        Some(body_fields) => body.extend(body_fields),
                        None => {
                            let field = converter.field(&schema, param.required)?;
                            body.insert(param.name.clone(), with_param_desc(field, param));
                        }
                    }
                }
                ParameterLocation::Path => {
                    let field = converter.field(&param.value_schema(), true)?;
                    fields.insert(param.name.clone(), with_param_desc(field, param));
                }
                ParameterLocation::Query | ParameterLocation::FormData => {
                    let field = converter.field(&param.value_schema(), param.required)?;
                    fields.insert(param.name.clone(), with_param_desc(field, param));
                }
            }
        }
        // path, query and form parameters keep their names; clashing body fields are dropped
        let mut shadowed_body_fields = Vec::new();
        for (field_name, field) in body {
            if fields.contains_key(&field_name) {
                warn!(
                    action = %name,
                    field = %field_name,
                    "body field shadowed by a parameter of the same name"
                );
                shadowed_body_fields.push(field_name);
            } else {
                fields.insert(field_name, field);
            }
        }
        let options = normalizer.normalize_fields(&fields)?;

        let response_type = match success_response(op) {
            Some(response) => match &resolver.response(response)?.schema {
                Some(schema) => {
                    let description = SchemaConverter::new(resolver).convert(schema)?;
                    Some(normalizer.normalize_type(&description)?)
                }
                None => None,
            },
            None => None,
        };

        debug!(action = %name, %method, path, options = options.len(), "mapped swagger operation");
        Ok(ActionDescriptor {
            name,
            path: path.to_string(),
            method,
            operation_id: op.operation_id.clone(),
            summary: op.summary.clone(),
            description: op.description.clone(),
            deprecated: op.deprecated,
            options,
            response_type,
            shadowed_body_fields,
        })
    }
}

/// Build the actions of `document` restricted to `allowed_paths` (empty means all)
pub fn build_actions(
    document: &SwaggerDocument,
    allowed_paths: &[String],
) -> SwaggerResult<Vec<ActionDescriptor>> {
    SwaggerActionBuilder::new(document)
        .with_allowed_paths(allowed_paths.iter().cloned())
        .build_strict()
}

fn action_name(path: &str, method: HttpMethod, op: &Operation) -> String {
    op.operation_id
        .as_deref()
        .map(normalize_name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| normalize_name(&format!("{method} {path}")))
}

fn with_param_desc(mut field: FieldDescription, param: &Parameter) -> FieldDescription {
    if field.desc.is_none() {
        field.desc = param.description.clone();
    }
    field
}

/// Lowest 2xx response, falling back to `default`
fn success_response(op: &Operation) -> Option<&crate::document::ResponseOrRef> {
    op.responses
        .iter()
        .filter_map(|(code, response)| code.parse::<u16>().ok().map(|code| (code, response)))
        .filter(|(code, _)| (200..300).contains(code))
        .min_by_key(|(code, _)| *code)
        .map(|(_, response)| response)
        .or_else(|| op.responses.get("default"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn petstore() -> SwaggerDocument {
        serde_json::from_value(json!({
            "swagger": "2.0",
            "info": {"title": "Petstore", "version": "1"},
            "paths": {
                "/pets": {
                    "get": {
                        "operationId": "listPets",
                        "parameters": [{"name": "limit", "in": "query", "type": "integer"}],
                        "responses": {"200": {
                            "description": "ok",
                            "schema": {"type": "array", "items": {"$ref": "#/definitions/Pet"}}
                        }}
                    }
                },
                "/pets/{id}": {
                    "parameters": [
                        {"name": "id", "in": "path", "type": "integer", "description": "Pet id"}
                    ],
                    "get": {
                        "summary": "Get a pet",
                        "responses": {
                            "404": {"description": "missing"},
                            "201": {"description": "never", "schema": {"type": "string"}},
                            "200": {"description": "ok", "schema": {"$ref": "#/definitions/Pet"}}
                        }
                    },
                    "post": {
                        "operationId": "updatePet",
                        "parameters": [
                            {"name": "X-Request-Id", "in": "header", "type": "string"},
                            {
                                "name": "body",
                                "in": "body",
                                "required": true,
                                "schema": {"$ref": "#/definitions/Pet"}
                            }
                        ],
                        "responses": {
                            "default": {"description": "any", "schema": {"type": "object"}}
                        }
                    }
                }
            },
            "definitions": {
                "Pet": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": {"type": "string"},
                        "tag": {"type": "string", "x-nullable": true}
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_allow_list_keeps_only_literal_path() {
        let doc = petstore();
        let actions = build_actions(&doc, &["/pets/{id}".to_string()]).unwrap();
        assert_eq!(actions.len(), 2);
        assert!(actions.iter().all(|a| a.path == "/pets/{id}"));
        assert_eq!(actions[0].method, HttpMethod::Get);
        assert_eq!(actions[1].method, HttpMethod::Post);
    }

    #[test]
    fn test_names_from_operation_id_or_method_and_path() {
        let doc = petstore();
        let names: Vec<String> = build_actions(&doc, &[])
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["list_pets", "get_pets_id", "update_pet"]);
    }

    #[test]
    fn test_parameters_and_body_flattening() {
        let doc = petstore();
        let builder = SwaggerActionBuilder::new(&doc);

        let get = builder.build_operation("/pets/{id}", HttpMethod::Get).unwrap();
        assert!(get.options["id"].required);
        assert_eq!(get.options["id"].option_type.to_string(), "int");
        assert_eq!(get.options["id"].desc, "Pet id");
        assert_eq!(get.response_type.unwrap().to_string(), "{name: string, tag: *string}");

        let post = builder.build_operation("/pets/{id}", HttpMethod::Post).unwrap();
        assert_eq!(post.options.keys().collect::<Vec<_>>(), vec!["id", "name", "tag"]);
        assert!(post.options["name"].required);
        assert!(!post.options["tag"].required);
        assert_eq!(post.response_type.unwrap().to_string(), "hash");
    }

    #[test]
    fn test_body_field_does_not_replace_path_parameter() {
        let doc: SwaggerDocument = serde_json::from_value(json!({
            "swagger": "2.0",
            "paths": {
                "/pets/{id}": {
                    "put": {
                        "operationId": "replacePet",
                        "parameters": [
                            {"name": "id", "in": "path", "required": true, "type": "integer"},
                            {"name": "body", "in": "body", "schema": {
                                "type": "object",
                                "properties": {"id": {"type": "string"}, "name": {"type": "string"}}
                            }}
                        ],
                        "responses": {"204": {"description": "replaced"}}
                    }
                }
            }
        }))
        .unwrap();

        let outcome = SwaggerActionBuilder::new(&doc).build();
        let put = &outcome.actions[0];
        assert_eq!(put.options.keys().collect::<Vec<_>>(), vec!["id", "name"]);
        assert!(put.options["id"].required);
        assert_eq!(put.options["id"].option_type.to_string(), "int");
        assert_eq!(put.shadowed_body_fields, vec!["id"]);

        let mut diagnostics = Diagnostics::new();
        outcome.report("Petstore", &mut diagnostics);
        let warnings: Vec<_> = diagnostics.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].action.as_deref(), Some("replace_pet"));
        assert!(warnings[0].message.contains("'id'"));
    }

    #[test]
    fn test_list_response() {
        let doc = petstore();
        let list = SwaggerActionBuilder::new(&doc)
            .build_operation("/pets", HttpMethod::Get)
            .unwrap();
        assert_eq!(list.response_type.unwrap().to_string(), "[{name: string, tag: *string}]");
        assert!(!list.options["limit"].required);
    }

    #[test]
    fn test_missing_operation() {
        let doc = petstore();
        let err = SwaggerActionBuilder::new(&doc)
            .build_operation("/pets", HttpMethod::Delete)
            .unwrap_err();
        assert!(matches!(err, SwaggerError::OperationNotFound { .. }));
    }

    #[test]
    fn test_into_action_is_swagger_backed() {
        let doc = petstore();
        let descriptor = SwaggerActionBuilder::new(&doc)
            .build_operation("/pets/{id}", HttpMethod::Get)
            .unwrap();
        let action = descriptor.into_action("Petstore");
        assert_eq!(action.app, "Petstore");
        assert_eq!(action.display_name, "Get a pet");
        assert_eq!(action.swagger_path().unwrap().to_string(), "/pets/{id}/GET");
        assert!(action.function_ref().is_none());
    }
}
