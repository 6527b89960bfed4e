//! Name conventions for apps, actions and display labels.

use once_cell::sync::Lazy;
use regex::Regex;

static LOWER_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());
static ACRONYM_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap());
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

/// Split an identifier in any common casing into its words
pub fn split_words(input: &str) -> Vec<String> {
    let spaced = LOWER_UPPER.replace_all(input, "$1 $2");
    let spaced = ACRONYM_WORD.replace_all(&spaced, "$1 $2");
    SEPARATORS.split(&spaced).filter(|w| !w.is_empty()).map(str::to_string).collect()
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// App key from a plugin identifier: `google-sheets` -> `GoogleSheets`
pub fn normalize_app_name(input: &str) -> String {
    split_words(input).iter().map(|w| capitalize(w)).collect()
}

/// Snake-cased action or option key: `createNewFolder` -> `create_new_folder`
pub fn normalize_name(input: &str) -> String {
    split_words(input).iter().map(|w| w.to_lowercase()).collect::<Vec<_>>().join("_")
}

/// Title-cased label: `page_size` -> `Page Size`
pub fn humanize(input: &str) -> String {
    split_words(input).iter().map(|w| capitalize(w)).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_names() {
        assert_eq!(normalize_app_name("google-sheets"), "GoogleSheets");
        assert_eq!(normalize_app_name("dropbox"), "Dropbox");
        assert_eq!(normalize_app_name("@activepieces/piece-docusign"), "ActivepiecesPieceDocusign");
    }

    #[test]
    fn test_action_names() {
        assert_eq!(normalize_name("create_new_dropbox_folder"), "create_new_dropbox_folder");
        assert_eq!(normalize_name("createNewDropboxFolder"), "create_new_dropbox_folder");
        assert_eq!(normalize_name("list-issues"), "list_issues");
        assert_eq!(normalize_name("getHTTPStatus"), "get_http_status");
        assert_eq!(normalize_name("GET /pets/{id}"), "get_pets_id");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("page_size"), "Page Size");
        assert_eq!(humanize("pageSize"), "Page Size");
        assert_eq!(humanize("id"), "Id");
        assert_eq!(humanize(""), "");
    }
}
