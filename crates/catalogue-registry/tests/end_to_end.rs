use catalogue_core::{
    ActionContext, App, AppWithActions, BuildContext, Deferred, Diagnostics, JsonMap, RestConfig,
    RestModifiers, StaticProvider,
};
use catalogue_pieces::{
    ActionDef, DropdownState, Fetcher, PieceAuth, PieceDef, PiecesProvider, Property,
};
use catalogue_registry::{CatalogueBuilder, RecordingHost, RegistryError};
use catalogue_swagger::{swagger_app, SwaggerDocument};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
#[error("upstream said no")]
struct UpstreamError;

fn stripe_provider() -> StaticProvider {
    let doc = SwaggerDocument::from_json_str(
        r#"{
            "swagger": "2.0",
            "paths": {
                "/v1/customers": {
                    "post": {
                        "operationId": "PostCustomers",
                        "parameters": [{"name": "email", "in": "formData", "type": "string"}],
                        "responses": {"200": {"description": "ok", "schema": {"type": "object"}}}
                    }
                },
                "/v1/charges": {"get": {"operationId": "GetCharges", "responses": {}}}
            }
        }"#,
    )
    .unwrap();

    let mut app = App::new("Stripe", "Stripe").with_rest(RestConfig::new("https://api.stripe.com"));
    app.rest_modifiers = Some(RestModifiers {
        set_options_post_auth: Some(Deferred::new(|ctx: ActionContext| async move {
            let mut opts = JsonMap::new();
            opts.insert("account".into(), json!(format!("acct-for-{}", ctx.conn_name)));
            Ok(opts)
        })),
        ..Default::default()
    });

    let mut diagnostics = Diagnostics::new();
    let allowed = ["/v1/customers".to_string()];
    let built = swagger_app(app, &doc, &allowed, &BuildContext::default(), &mut diagnostics);
    assert!(diagnostics.is_empty());
    StaticProvider::new("declared", vec![built])
}

fn asana_provider() -> PiecesProvider {
    PiecesProvider::new().with_piece(
        "asana",
        PieceDef::new("Asana", "Work management", PieceAuth::None).action(
            "createTask",
            ActionDef::new("Create Task", "Create a task", |_| async {
                Err(anyhow::Error::new(UpstreamError))
            })
            .prop(
                "workspace",
                Property::dropdown(
                    "Workspace",
                    Fetcher::new(|_| async {
                        Err::<DropdownState, _>(anyhow::Error::new(UpstreamError))
                    }),
                ),
            ),
        ),
    )
}

#[tokio::test]
async fn builds_registers_and_dispatches() {
    let catalogue = CatalogueBuilder::new()
        .provider(stripe_provider())
        .provider(asana_provider())
        .build();
    assert!(!catalogue.diagnostics().has_errors());

    let mut host = RecordingHost::new();
    let summary = catalogue.register_apps(&mut host).unwrap();
    assert_eq!(summary.apps, 2);
    assert_eq!(summary.actions, 2);
    assert_eq!(
        host.calls,
        vec!["app:Stripe", "action:Stripe.post_customers", "app:Asana", "action:Asana.create_task"]
    );
    assert_eq!(host.actions[0].action, "post_customers");
    assert_eq!(host.actions[1].action, "create_task");

    // swagger actions belong to the host's REST executor
    let err = catalogue
        .invoke(
            "Stripe",
            "post_customers",
            JsonMap::new(),
            JsonMap::new(),
            ActionContext::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::NotInvocable(_)));

    let post_auth = catalogue
        .post_auth_options("Stripe", ActionContext::new("live"))
        .await
        .unwrap();
    assert_eq!(post_auth.get("account"), Some(&json!("acct-for-live")));
    let none = catalogue
        .post_auth_options("Asana", ActionContext::default())
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn resolver_and_handler_errors_pass_through() {
    let catalogue = CatalogueBuilder::new().provider(asana_provider()).build();

    let err = catalogue
        .invoke("Asana", "create_task", JsonMap::new(), JsonMap::new(), ActionContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "upstream said no");
    match err {
        RegistryError::Resolver(inner) => assert!(inner.downcast_ref::<UpstreamError>().is_some()),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = catalogue
        .allowed_values("Asana", "create_task", "workspace", ActionContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "upstream said no");

    let missing = catalogue
        .dependent_options("Asana", "create_task", "project", ActionContext::default())
        .await
        .unwrap_err();
    assert!(matches!(missing, RegistryError::OptionNotFound { .. }));

    let none = catalogue
        .dependent_options("Asana", "create_task", "workspace", ActionContext::default())
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn empty_app_still_registers() {
    let catalogue = CatalogueBuilder::new()
        .provider(StaticProvider::new(
            "declared",
            vec![AppWithActions::new(App::new("Zendesk", "Zendesk"))],
        ))
        .build();
    let mut host = RecordingHost::new();
    catalogue.register_apps(&mut host).unwrap();
    assert_eq!(host.calls, vec!["app:Zendesk".to_string()]);
}
