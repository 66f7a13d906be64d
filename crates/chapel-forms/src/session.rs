//! Form render session
//!
//! Holds the values for one rendering of a schema. Every change goes
//! through [`FormSession::set_value`], after which visibility, preview and
//! totals are derived again from the schema and the current values.

use crate::error::{FormsError, Result};
use crate::js;
use crate::money;
use crate::pricing::{self, LineItem};
use crate::schema::{FieldDescriptor, FieldKind, FieldWidth, FormSchema, FormValues};
use crate::visibility::is_visible;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

pub struct FormSession {
    schema: FormSchema,
    values: FormValues,
}

/// Rendered field in the live preview
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PreviewField {
    pub name: String,
    pub label: String,
    pub kind: &'static str,
    pub width: FieldWidth,
    pub required: bool,
    pub display: String,
    #[serde(with = "money::amount")]
    pub contribution: Decimal,
}

/// Live preview: visible fields plus the running total when the form is priced
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormPreview {
    pub title: String,
    pub description: String,
    pub fields: Vec<PreviewField>,
    #[serde(with = "money::optional_amount", skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
}

/// Payload sent when the form is submitted
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormSubmission {
    pub values: FormValues,
    #[serde(with = "money::optional_amount", skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
}

impl FormSession {
    /// Start a session with default values seeded for toggles and multi-selects
    pub fn new(schema: FormSchema) -> Self {
        let mut values = FormValues::new();
        for field in &schema.fields {
            let default = match &field.kind {
                FieldKind::Checkbox { .. } | FieldKind::Switch { .. } => Value::Bool(false),
                FieldKind::Select { multiple: true, .. } => Value::Array(vec![]),
                _ => continue,
            };
            values.insert(field.name.clone(), default);
        }
        Self { schema, values }
    }

    /// Start a session from previously entered values
    pub fn with_values(schema: FormSchema, values: FormValues) -> Self {
        let mut session = Self::new(schema);
        session.values.extend(values);
        session
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Change handler for one field
    pub fn set_value(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        if self.schema.field(name).is_none() {
            return Err(FormsError::FieldNotFound(name.to_string()));
        }
        let value = value.into();
        tracing::debug!(field = name, %value, "form value changed");
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    pub fn clear_value(&mut self, name: &str) {
        self.values.remove(name);
    }

    pub fn is_field_visible(&self, name: &str) -> bool {
        self.schema
            .field(name)
            .is_some_and(|f| is_visible(f.visible_if.as_deref(), &self.values))
    }

    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldDescriptor> + '_ {
        self.schema
            .fields
            .iter()
            .filter(|f| is_visible(f.visible_if.as_deref(), &self.values))
    }

    pub fn total(&self) -> Decimal {
        pricing::compute_total(&self.schema.fields, &self.values)
    }

    pub fn line_items(&self) -> Vec<LineItem> {
        pricing::line_items(&self.schema.fields, &self.values)
    }

    /// Whether the running total is shown at all
    pub fn shows_total(&self) -> bool {
        pricing::has_pricing(&self.schema.fields)
    }

    pub fn preview(&self) -> FormPreview {
        let fields = self
            .visible_fields()
            .map(|f| PreviewField {
                name: f.name.clone(),
                label: f.label.clone(),
                kind: f.kind.type_name(),
                width: f.width(),
                required: f.required,
                display: display_value(f, self.values.get(&f.name)),
                contribution: pricing::field_contribution(f, &self.values),
            })
            .collect();
        FormPreview {
            title: self.schema.meta.title.clone(),
            description: self.schema.meta.description.clone(),
            fields,
            total: self.shows_total().then(|| self.total()),
        }
    }

    /// Required fields that are visible must hold a value
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<String> = self
            .visible_fields()
            .filter(|f| f.required && !f.is_display_only())
            .filter(|f| is_empty(f, self.values.get(&f.name)))
            .map(|f| if f.label.is_empty() { f.name.clone() } else { f.label.clone() })
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(FormsError::MissingRequired(missing))
        }
    }

    /// Validated values of visible fields, with the total when priced
    pub fn submission(&self) -> Result<FormSubmission> {
        self.validate()?;
        let values = self
            .visible_fields()
            .filter(|f| !f.is_display_only())
            .filter_map(|f| Some((f.name.clone(), self.values.get(&f.name)?.clone())))
            .collect();
        Ok(FormSubmission {
            values,
            total: self.shows_total().then(|| self.total()),
        })
    }
}

fn is_empty(field: &FieldDescriptor, value: Option<&Value>) -> bool {
    match (&field.kind, value) {
        (_, None) | (_, Some(Value::Null)) => true,
        (FieldKind::Checkbox { .. } | FieldKind::Switch { .. }, Some(v)) => !js::is_truthy(Some(v)),
        (_, Some(Value::String(s))) => s.trim().is_empty(),
        (_, Some(Value::Array(items))) => items.is_empty(),
        (FieldKind::Date { .. }, Some(v @ Value::Object(_))) => pricing::date_range(v).is_none(),
        _ => false,
    }
}

fn display_value(field: &FieldDescriptor, value: Option<&Value>) -> String {
    if let FieldKind::Static { content } = &field.kind {
        return content.clone().unwrap_or_default();
    }
    let Some(value) = value else {
        return String::new();
    };
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::String(s) => option_label(field, value).unwrap_or_else(|| s.clone()),
        Value::Number(n) => option_label(field, value).unwrap_or_else(|| n.to_string()),
        Value::Array(items) => items
            .iter()
            .map(|item| display_value(field, Some(item)))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => match pricing::date_range(value) {
            Some((from, to)) if from == to => from.to_string(),
            Some((from, to)) => format!("{} to {}", from, to),
            None => String::new(),
        },
    }
}

fn option_label(field: &FieldDescriptor, value: &Value) -> Option<String> {
    field
        .options()
        .iter()
        .find(|o| o.matches(value))
        .map(|o| o.label.clone())
}
