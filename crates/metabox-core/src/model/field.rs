use crate::{
    model::ModelError,
    raw::RawValue,
    sanitize::SanitizeOutcome,
    value::Value,
};
use convert_case::{Case, Casing};
use serde::Serialize;
use std::{borrow::Cow, collections::BTreeSet, fmt, sync::Arc};

///
/// FieldType
///
/// Dispatch tag for the handler registry. The builtin set is closed by
/// convention only; hosts may register handlers for their own tags.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldType(Cow<'static, str>);

impl FieldType {
    pub const CHECKBOX: Self = Self(Cow::Borrowed("checkbox"));
    pub const FILE: Self = Self(Cow::Borrowed("file"));
    pub const GROUP: Self = Self(Cow::Borrowed("group"));
    pub const HIDDEN: Self = Self(Cow::Borrowed("hidden"));
    pub const MULTICHECK: Self = Self(Cow::Borrowed("multicheck"));
    pub const OEMBED: Self = Self(Cow::Borrowed("oembed"));
    pub const RADIO: Self = Self(Cow::Borrowed("radio"));
    pub const SELECT: Self = Self(Cow::Borrowed("select"));
    pub const TAXONOMY_MULTICHECK: Self = Self(Cow::Borrowed("taxonomy_multicheck"));
    pub const TAXONOMY_RADIO: Self = Self(Cow::Borrowed("taxonomy_radio"));
    pub const TAXONOMY_SELECT: Self = Self(Cow::Borrowed("taxonomy_select"));
    pub const TEXT: Self = Self(Cow::Borrowed("text"));
    pub const TEXTAREA: Self = Self(Cow::Borrowed("textarea"));
    pub const TEXT_DATE: Self = Self(Cow::Borrowed("text_date"));
    pub const TEXT_DATETIME: Self = Self(Cow::Borrowed("text_datetime"));
    pub const TITLE: Self = Self(Cow::Borrowed("title"));

    /// Host-defined tag for custom handlers.
    #[must_use]
    pub fn custom(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///
/// SanitizeOverride
///
/// Per-field callback replacing the builtin routine for that field's type.
///

#[derive(Clone)]
pub struct SanitizeOverride(
    Arc<dyn Fn(&FieldModel, &RawValue) -> SanitizeOutcome + Send + Sync>,
);

impl SanitizeOverride {
    pub fn new(f: impl Fn(&FieldModel, &RawValue) -> SanitizeOutcome + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn apply(&self, field: &FieldModel, raw: &RawValue) -> SanitizeOutcome {
        (self.0)(field, raw)
    }
}

impl fmt::Debug for SanitizeOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SanitizeOverride(..)")
    }
}

///
/// Choice
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

///
/// FieldOptions
///
/// Behavior configuration carried by a descriptor. Everything is optional;
/// handlers fall back to their own defaults.
///

#[derive(Clone, Debug, Serialize)]
pub struct FieldOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub repeatable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy: Option<String>,
    /// URL scheme allow-list for oembed/URL-ish types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<String>>,
    /// `time` format description, e.g. `[year]-[month]-[day]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    /// Sibling field id consulted for a UTC offset during datetime sanitize.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone_field: Option<String>,
    pub show_in_rest: bool,
    #[serde(skip)]
    pub sanitize_override: Option<SanitizeOverride>,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            label: None,
            description: None,
            default: None,
            repeatable: false,
            choices: Vec::new(),
            taxonomy: None,
            protocols: None,
            date_format: None,
            timezone_field: None,
            show_in_rest: true,
            sanitize_override: None,
        }
    }
}

///
/// FieldModel
///
/// Schema node for one form field. Construction validates identity
/// invariants; everything else is configuration the handlers interpret.
///

#[derive(Clone, Debug, Serialize)]
pub struct FieldModel {
    id: String,
    field_type: FieldType,
    #[serde(flatten)]
    options: FieldOptions,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldModel>,
}

impl FieldModel {
    pub fn new(id: impl Into<String>, field_type: FieldType) -> Result<Self, ModelError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ModelError::EmptyFieldId);
        }

        Ok(Self {
            id,
            field_type,
            options: FieldOptions::default(),
            fields: Vec::new(),
        })
    }

    /// Attach child descriptors; only groups nest, one level deep.
    pub fn with_fields(mut self, fields: Vec<Self>) -> Result<Self, ModelError> {
        if self.field_type != FieldType::GROUP {
            return Err(ModelError::FieldsOnNonGroup(self.id));
        }

        let mut seen = BTreeSet::new();
        for child in &fields {
            if child.field_type == FieldType::GROUP {
                return Err(ModelError::NestedGroup {
                    group: self.id,
                    child: child.id.clone(),
                });
            }
            if !seen.insert(child.id.as_str()) {
                return Err(ModelError::DuplicateChildId {
                    group: self.id,
                    child: child.id.clone(),
                });
            }
        }

        self.fields = fields;
        Ok(self)
    }

    // ======================================================================
    // Option builders
    // ======================================================================

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.options.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.options.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.options.default = Some(default.into());
        self
    }

    #[must_use]
    pub const fn repeatable(mut self) -> Self {
        self.options.repeatable = true;
        self
    }

    #[must_use]
    pub fn with_choices<I, V, L>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        self.options.choices = choices
            .into_iter()
            .map(|(value, label)| Choice::new(value, label))
            .collect();
        self
    }

    #[must_use]
    pub fn with_taxonomy(mut self, taxonomy: impl Into<String>) -> Self {
        self.options.taxonomy = Some(taxonomy.into());
        self
    }

    #[must_use]
    pub fn with_protocols<I: IntoIterator<Item = S>, S: Into<String>>(mut self, protocols: I) -> Self {
        self.options.protocols = Some(protocols.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.options.date_format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_timezone_field(mut self, field_id: impl Into<String>) -> Self {
        self.options.timezone_field = Some(field_id.into());
        self
    }

    #[must_use]
    pub const fn hide_from_rest(mut self) -> Self {
        self.options.show_in_rest = false;
        self
    }

    #[must_use]
    pub fn with_sanitize_override(
        mut self,
        f: impl Fn(&Self, &RawValue) -> SanitizeOutcome + Send + Sync + 'static,
    ) -> Self {
        self.options.sanitize_override = Some(SanitizeOverride::new(f));
        self
    }

    // ======================================================================
    // Accessors
    // ======================================================================

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    #[must_use]
    pub const fn options(&self) -> &FieldOptions {
        &self.options
    }

    #[must_use]
    pub fn fields(&self) -> &[Self] {
        &self.fields
    }

    /// Display label: configured, or Title Case derived from the id.
    #[must_use]
    pub fn label(&self) -> String {
        self.options
            .label
            .clone()
            .unwrap_or_else(|| self.id.to_case(Case::Title))
    }

    /// Supporting field id for compound results (file attachment ids).
    #[must_use]
    pub fn companion_id(&self) -> String {
        format!("{}_id", self.id)
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.field_type == FieldType::GROUP
    }

    #[must_use]
    pub fn is_title(&self) -> bool {
        self.field_type == FieldType::TITLE
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.field_type == FieldType::HIDDEN
    }
}

///
/// TESTS
///
