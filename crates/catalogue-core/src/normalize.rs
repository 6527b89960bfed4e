//! Type/option normalizer.
//!
//! Turns loose [`TypeDescription`]s into fully described [`ActionOption`]s.
//! The transform is pure: no I/O, resolvers are carried over un-invoked, and
//! normalizing the same description twice yields equal trees.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::description::{FieldDescription, TypeDescription};
use crate::error::{CoreError, CoreResult};
use crate::naming::humanize;
use crate::option::{ActionOption, AllowedValue, OptionType, PrimitiveType};

pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Lookup hook for localized display strings
pub trait Translator: Send + Sync {
    fn translate(&self, locale: &str, key: &str) -> Option<String>;
}

/// Translator backed by an in-memory table keyed by `(locale, key)`
#[derive(Debug, Default, Clone)]
pub struct StaticTranslator {
    entries: IndexMap<(String, String), String>,
}

impl StaticTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, locale: &str, key: &str, text: &str) -> Self {
        self.entries.insert((locale.to_string(), key.to_string()), text.to_string());
        self
    }
}

impl Translator for StaticTranslator {
    fn translate(&self, locale: &str, key: &str) -> Option<String> {
        self.entries.get(&(locale.to_string(), key.to_string())).cloned()
    }
}

#[derive(Clone)]
pub struct Normalizer {
    locale: String,
    scope: Option<String>,
    translator: Option<Arc<dyn Translator>>,
    max_depth: usize,
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("locale", &self.locale)
            .field("scope", &self.scope)
            .field("translator", &self.translator.is_some())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl Normalizer {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            scope: None,
            translator: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Prefix for translation keys, usually `{app}.{action}`
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Copy of this normalizer with `segment` appended to the translation scope
    pub fn scoped(&self, segment: &str) -> Self {
        let mut next = self.clone();
        next.scope = Some(match &self.scope {
            Some(scope) => format!("{scope}.{segment}"),
            None => segment.to_string(),
        });
        next
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Normalize a bare description into an option named `name`
    pub fn normalize(&self, name: &str, description: &TypeDescription) -> CoreResult<ActionOption> {
        let mut option = ActionOption::new(name, self.normalize_type_at(description, name, 0)?);
        self.fill_labels(&mut option, name, None, None, None);
        Ok(option)
    }

    /// Normalize a description into a bare type tree
    pub fn normalize_type(&self, description: &TypeDescription) -> CoreResult<OptionType> {
        self.normalize_type_at(description, "", 0)
    }

    /// Normalize one described field, copying its display metadata
    pub fn normalize_field(
        &self,
        name: &str,
        field: &FieldDescription,
    ) -> CoreResult<ActionOption> {
        self.field_at(name, name, field, 0)
    }

    /// Normalize a set of fields, preserving their order
    pub fn normalize_fields(
        &self,
        fields: &IndexMap<String, FieldDescription>,
    ) -> CoreResult<IndexMap<String, ActionOption>> {
        self.fields_at(fields, "", 0)
    }

    fn fields_at(
        &self,
        fields: &IndexMap<String, FieldDescription>,
        parent: &str,
        depth: usize,
    ) -> CoreResult<IndexMap<String, ActionOption>> {
        let mut out = IndexMap::with_capacity(fields.len());
        for (name, field) in fields {
            let path = join_path(parent, name);
            out.insert(name.clone(), self.field_at(name, &path, field, depth)?);
        }
        Ok(out)
    }

    fn field_at(
        &self,
        name: &str,
        path: &str,
        field: &FieldDescription,
        depth: usize,
    ) -> CoreResult<ActionOption> {
        let option_type = self.normalize_type_at(&field.field_type, path, depth)?;
        let mut option = ActionOption::new(name, option_type);
        option.default_value = field.default_value.clone();
        option.example_value = field.example_value.clone();
        option.allowed_values = field.allowed_values.iter().map(fill_allowed_value).collect();
        option.get_allowed_values = field.get_allowed_values.clone();
        option.get_dependent_options = field.get_dependent_options.clone();
        option.depends_on = field.depends_on.clone();
        option.required = field.required;
        option.preselected = field.preselected;
        self.fill_labels(
            &mut option,
            path,
            field.display_name.as_deref(),
            field.short_desc.as_deref(),
            field.desc.as_deref(),
        );
        trace!(path = %path, option_type = %option.option_type, "normalized field");
        Ok(option)
    }

    fn normalize_type_at(
        &self,
        description: &TypeDescription,
        path: &str,
        depth: usize,
    ) -> CoreResult<OptionType> {
        if depth > self.max_depth {
            return Err(CoreError::InvalidTypeDescription {
                path: path.to_string(),
                reason: format!("nesting deeper than {} levels", self.max_depth),
            });
        }
        match description {
            TypeDescription::Named(name) => PrimitiveType::parse(name)
                .map(OptionType::Primitive)
                .ok_or_else(|| CoreError::UnknownType {
                    name: name.clone(),
                    path: path.to_string(),
                }),
            TypeDescription::List(items) => match items.as_slice() {
                [item] => Ok(OptionType::List(Box::new(self.normalize_type_at(
                    item,
                    &format!("{path}[]"),
                    depth + 1,
                )?))),
                _ => Err(CoreError::InvalidTypeDescription {
                    path: path.to_string(),
                    reason: format!("list type must have exactly one element, got {}", items.len()),
                }),
            },
            TypeDescription::Fields(fields) => {
                Ok(OptionType::Hash(self.fields_at(fields, path, depth + 1)?))
            }
        }
    }

    fn fill_labels(
        &self,
        option: &mut ActionOption,
        path: &str,
        display_name: Option<&str>,
        short_desc: Option<&str>,
        desc: Option<&str>,
    ) {
        let display_name = non_empty(display_name)
            .or_else(|| self.lookup(path, "display_name"))
            .unwrap_or_else(|| humanize(&option.name));
        let explicit_desc = non_empty(desc).or_else(|| self.lookup(path, "desc"));
        let short_desc = non_empty(short_desc)
            .or_else(|| self.lookup(path, "short_desc"))
            .or_else(|| explicit_desc.clone())
            .unwrap_or_else(|| display_name.clone());
        option.desc = explicit_desc.unwrap_or_else(|| short_desc.clone());
        option.short_desc = short_desc;
        option.display_name = display_name;
    }

    fn lookup(&self, path: &str, attribute: &str) -> Option<String> {
        let translator = self.translator.as_ref()?;
        let key = match &self.scope {
            Some(scope) => format!("{scope}.{path}.{attribute}"),
            None => format!("{path}.{attribute}"),
        };
        translator.translate(&self.locale, &key).filter(|s| !s.is_empty())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty()).map(str::to_string)
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn fill_allowed_value(value: &AllowedValue) -> AllowedValue {
    let mut filled = value.clone();
    if filled.display_name.is_empty() {
        filled.display_name = value.value_text();
    }
    if filled.short_desc.is_empty() {
        filled.short_desc = filled.display_name.clone();
    }
    if filled.desc.is_empty() {
        filled.desc = filled.short_desc.clone();
    }
    filled
}
