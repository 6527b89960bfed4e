//! Normalized option and type model shared by every app source.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::resolver::{ActionContext, AllowedValuesResolver, DependentOptionsResolver};

/// Base type vocabulary understood by the host engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    String,
    Int,
    Integer,
    Bool,
    Boolean,
    Float,
    Number,
    Binary,
    Data,
    List,
    Hash,
    Date,
    Any,
}

impl BaseType {
    pub const ALL: [BaseType; 13] = [
        BaseType::String,
        BaseType::Int,
        BaseType::Integer,
        BaseType::Bool,
        BaseType::Boolean,
        BaseType::Float,
        BaseType::Number,
        BaseType::Binary,
        BaseType::Data,
        BaseType::List,
        BaseType::Hash,
        BaseType::Date,
        BaseType::Any,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::String => "string",
            BaseType::Int => "int",
            BaseType::Integer => "integer",
            BaseType::Bool => "bool",
            BaseType::Boolean => "boolean",
            BaseType::Float => "float",
            BaseType::Number => "number",
            BaseType::Binary => "binary",
            BaseType::Data => "data",
            BaseType::List => "list",
            BaseType::Hash => "hash",
            BaseType::Date => "date",
            BaseType::Any => "any",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// Whether the `soft` prefix may be applied to this type
    pub fn allows_soft(&self) -> bool {
        matches!(
            self,
            BaseType::String
                | BaseType::Int
                | BaseType::Bool
                | BaseType::Float
                | BaseType::Number
                | BaseType::Date
                | BaseType::Binary
                | BaseType::List
        )
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A primitive type tag such as `string`, `*int` or `*softdate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrimitiveType {
    pub base: BaseType,
    /// `soft` prefix: the host coerces the value instead of rejecting it
    pub soft: bool,
    /// `*` prefix: the value may be absent
    pub or_nothing: bool,
}

impl PrimitiveType {
    pub fn new(base: BaseType) -> Self {
        Self {
            base,
            soft: false,
            or_nothing: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.or_nothing = true;
        self
    }

    pub fn soft(mut self) -> Self {
        self.soft = true;
        self
    }

    /// Parse a type name, returning `None` outside the vocabulary
    pub fn parse(name: &str) -> Option<Self> {
        let (or_nothing, rest) = match name.strip_prefix('*') {
            Some(rest) => (true, rest),
            None => (false, name),
        };
        let (soft, rest) = match rest.strip_prefix("soft") {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        let base = BaseType::parse(rest)?;
        if soft && !base.allows_soft() {
            return None;
        }
        Some(Self {
            base,
            soft,
            or_nothing,
        })
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.or_nothing {
            f.write_str("*")?;
        }
        if self.soft {
            f.write_str("soft")?;
        }
        f.write_str(self.base.as_str())
    }
}

impl FromStr for PrimitiveType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::UnknownType {
            name: s.to_string(),
            path: String::new(),
        })
    }
}

impl TryFrom<String> for PrimitiveType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PrimitiveType> for String {
    fn from(value: PrimitiveType) -> Self {
        value.to_string()
    }
}

/// Normalized type tree of an option or a response
///
/// Serialized the way the host reads it: a primitive as its name, a nested
/// shape as a map of options and a typed list as a one-element array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OptionTypeRepr", into = "OptionTypeRepr")]
pub enum OptionType {
    Primitive(PrimitiveType),
    Hash(IndexMap<String, ActionOption>),
    List(Box<OptionType>),
}

impl OptionType {
    pub fn primitive(base: BaseType) -> Self {
        OptionType::Primitive(PrimitiveType::new(base))
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveType> {
        match self {
            OptionType::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn fields(&self) -> Option<&IndexMap<String, ActionOption>> {
        match self {
            OptionType::Hash(fields) => Some(fields),
            _ => None,
        }
    }

    /// Number of nested levels below this node
    pub fn depth(&self) -> usize {
        match self {
            OptionType::Primitive(_) => 0,
            OptionType::Hash(fields) => {
                1 + fields.values().map(|o| o.option_type.depth()).max().unwrap_or(0)
            }
            OptionType::List(item) => 1 + item.depth(),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Primitive(p) => write!(f, "{p}"),
            OptionType::Hash(fields) => {
                write!(f, "{{")?;
                for (i, (name, option)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {}", option.option_type)?;
                }
                write!(f, "}}")
            }
            OptionType::List(item) => write!(f, "[{item}]"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum OptionTypeRepr {
    Name(String),
    List(Vec<OptionType>),
    Fields(IndexMap<String, ActionOption>),
}

impl TryFrom<OptionTypeRepr> for OptionType {
    type Error = CoreError;

    fn try_from(repr: OptionTypeRepr) -> Result<Self, Self::Error> {
        match repr {
            OptionTypeRepr::Name(name) => Ok(OptionType::Primitive(name.parse()?)),
            OptionTypeRepr::List(mut items) => {
                if items.len() != 1 {
                    return Err(CoreError::InvalidTypeDescription {
                        path: String::new(),
                        reason: format!(
                            "list type must have exactly one element, got {}",
                            items.len()
                        ),
                    });
                }
                Ok(OptionType::List(Box::new(items.remove(0))))
            }
            OptionTypeRepr::Fields(mut fields) => {
                for (name, option) in fields.iter_mut() {
                    if option.name.is_empty() {
                        option.name = name.clone();
                    }
                }
                Ok(OptionType::Hash(fields))
            }
        }
    }
}

impl From<OptionType> for OptionTypeRepr {
    fn from(value: OptionType) -> Self {
        match value {
            OptionType::Primitive(p) => OptionTypeRepr::Name(p.to_string()),
            OptionType::List(item) => OptionTypeRepr::List(vec![*item]),
            OptionType::Hash(fields) => OptionTypeRepr::Fields(fields),
        }
    }
}

/// One entry of an option's allowed value list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowedValue {
    pub value: JsonValue,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub short_desc: String,
    #[serde(default)]
    pub desc: String,
}

impl AllowedValue {
    /// Allowed value whose display name and descriptions all carry the same label
    pub fn labelled(value: impl Into<JsonValue>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            value: value.into(),
            display_name: label.clone(),
            short_desc: label.clone(),
            desc: label,
        }
    }

    /// Text form of the value, used when no label was supplied
    pub fn value_text(&self) -> String {
        match &self.value {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// A normalized, typed and described action input or response field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOption {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub short_desc: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "type")]
    pub option_type: OptionType,
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

impl ActionOption {
    pub fn new(name: impl Into<String>, option_type: OptionType) -> Self {
        Self {
            name: name.into(),
            display_name: String::new(),
            short_desc: String::new(),
            desc: String::new(),
            option_type,
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

    pub fn is_dynamic(&self) -> bool {
        self.get_allowed_values.is_some() || self.get_dependent_options.is_some()
    }

    /// Static allowed values merged with whatever the deferred resolver returns
    pub async fn allowed_values_for(
        &self,
        ctx: ActionContext,
    ) -> anyhow::Result<Vec<AllowedValue>> {
        let mut values = self.allowed_values.clone();
        if let Some(resolver) = &self.get_allowed_values {
            values.extend(resolver.resolve(ctx).await?);
        }
        Ok(values)
    }

    /// Options that appear once this option has a value; empty without a resolver
    pub async fn dependent_options_for(
        &self,
        ctx: ActionContext,
    ) -> anyhow::Result<IndexMap<String, ActionOption>> {
        match &self.get_dependent_options {
            Some(resolver) => resolver.resolve(ctx).await,
            None => Ok(IndexMap::new()),
        }
    }
}
