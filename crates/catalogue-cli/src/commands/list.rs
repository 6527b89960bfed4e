//! List command for apps and actions

use crate::{
    cli::{ListResource, OutputFormat},
    error::CliResult,
    utils::{load_catalogue, truncate_text, ColoredOutput},
};
use catalogue_core::{Action, App};
use catalogue_registry::Catalogue;
use serde_json::{json, Value as JsonValue};
use std::path::Path;
use tracing::debug;

pub struct ListCommand;

impl ListCommand {
    pub fn run(manifest: &Path, resource: ListResource) -> CliResult<()> {
        let catalogue = load_catalogue(manifest)?;
        match resource {
            ListResource::Apps { format } => Self::list_apps(&catalogue, format),
            ListResource::Actions { app, format } => {
                Self::list_actions(&catalogue, app.as_deref(), format)
            }
        }
    }

    fn list_apps(catalogue: &Catalogue, format: OutputFormat) -> CliResult<()> {
        let apps: Vec<&App> = catalogue.apps().collect();
        match format {
            OutputFormat::Table => Self::display_apps_table(catalogue, &apps),
            _ => {
                let json_data: Vec<JsonValue> = apps
                    .iter()
                    .map(|app| {
                        json!({
                            "name": app.name,
                            "display_name": app.display_name,
                            "auth": auth_label(app),
                            "actions": catalogue.actions(&app.name).map(|a| a.count()).unwrap_or(0),
                        })
                    })
                    .collect();
                println!("{}", format.format_json(&JsonValue::Array(json_data))?);
            }
        }
        Ok(())
    }

    fn list_actions(
        catalogue: &Catalogue,
        app_filter: Option<&str>,
        format: OutputFormat,
    ) -> CliResult<()> {
        debug!("Listing actions with app filter: {:?}", app_filter);

        let actions: Vec<&Action> = match app_filter {
            Some(app) => catalogue.actions(app)?.collect(),
            None => catalogue.entries().flat_map(|entry| entry.actions.values()).collect(),
        };

        match format {
            OutputFormat::Table => Self::display_actions_table(&actions),
            _ => {
                let json_data: Vec<JsonValue> = actions
                    .iter()
                    .map(|action| {
                        json!({
                            "app": action.app,
                            "action": action.action,
                            "display_name": action.display_name,
                            "target": target_label(action),
                            "options": action.options.keys().collect::<Vec<_>>(),
                        })
                    })
                    .collect();
                println!("{}", format.format_json(&JsonValue::Array(json_data))?);
            }
        }
        Ok(())
    }

    fn display_apps_table(catalogue: &Catalogue, apps: &[&App]) {
        if apps.is_empty() {
            println!("{}", ColoredOutput::info("No apps found"));
            return;
        }

        println!("{}", ColoredOutput::success(&format!("Found {} app(s):", apps.len())));
        println!();
        println!(
            "{:<24} {:<30} {:<10} {:<8}",
            ColoredOutput::highlight("Name"),
            ColoredOutput::highlight("Display Name"),
            ColoredOutput::highlight("Auth"),
            ColoredOutput::highlight("Actions")
        );
        println!("{}", "-".repeat(75));

        for app in apps {
            let count = catalogue.actions(&app.name).map(|a| a.count()).unwrap_or(0);
            println!(
                "{:<24} {:<30} {:<10} {:<8}",
                truncate_text(&app.name, 24),
                truncate_text(&app.display_name, 30),
                auth_label(app),
                count
            );
        }
    }

    fn display_actions_table(actions: &[&Action]) {
        if actions.is_empty() {
            println!("{}", ColoredOutput::info("No actions found"));
            return;
        }

        println!("{}", ColoredOutput::success(&format!("Found {} action(s):", actions.len())));
        println!();
        println!(
            "{:<20} {:<32} {:<36} {:<8}",
            ColoredOutput::highlight("App"),
            ColoredOutput::highlight("Action"),
            ColoredOutput::highlight("Target"),
            ColoredOutput::highlight("Options")
        );
        println!("{}", "-".repeat(100));

        for action in actions {
            println!(
                "{:<20} {:<32} {:<36} {:<8}",
                truncate_text(&action.app, 20),
                truncate_text(&action.action, 32),
                truncate_text(&target_label(action), 36),
                action.options.len()
            );
        }
    }
}

fn auth_label(app: &App) -> &'static str {
    match &app.rest {
        Some(rest) if rest.is_oauth2() => "oauth2",
        Some(_) => "rest",
        None => "-",
    }
}

fn target_label(action: &Action) -> String {
    match action.swagger_path() {
        Some(path) => path.to_string(),
        None => "function".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalogue_core::{ActionFunction, HttpMethod, RestConfig, SwaggerPath};

    #[test]
    fn test_labels() {
        let mut rest = RestConfig::new("https://api.example.com");
        assert_eq!(auth_label(&App::new("A", "A").with_rest(rest.clone())), "rest");
        rest.oauth2_grant_type = Some("authorization_code".into());
        assert_eq!(auth_label(&App::new("A", "A").with_rest(rest)), "oauth2");
        assert_eq!(auth_label(&App::new("A", "A")), "-");

        let swagger =
            Action::swagger("A", "get_pet", SwaggerPath::new("/pets/{id}", HttpMethod::Get));
        assert_eq!(target_label(&swagger), "/pets/{id}/GET");
        let echo = ActionFunction::new(|input, _, _| async move { Ok(JsonValue::Object(input)) });
        let function = Action::function("A", "echo", echo);
        assert_eq!(target_label(&function), "function");
    }
}
