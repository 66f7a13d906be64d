//! Field descriptors and form schemas
//!
//! A field descriptor carries the attributes every field shares (`id`,
//! `name`, `label`, `required`, `width`, `visibleIf`) and a [`FieldKind`]
//! discriminated by the JSON `type` key. `name` is the key used to read and
//! write form values and must be unique within a schema.

use crate::error::{FormsError, Result};
use crate::money;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Current form values keyed by field name
pub type FormValues = serde_json::Map<String, Value>;

// =============================================================================
// Field Descriptor
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<FieldWidth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl FieldDescriptor {
    /// Create a field with the shared attributes defaulted
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        label: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            label: label.into(),
            required: false,
            width: None,
            visible_if: None,
            placeholder: None,
            help_text: None,
            kind,
        }
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a visibility expression
    pub fn visible_if(mut self, expr: impl Into<String>) -> Self {
        self.visible_if = Some(expr.into());
        self
    }

    /// Effective width
    pub fn width(&self) -> FieldWidth {
        self.width.unwrap_or_default()
    }

    /// Choice options for select and radio fields
    pub fn options(&self) -> &[FieldOption] {
        match &self.kind {
            FieldKind::Select { options, .. } | FieldKind::Radio { options } => options,
            _ => &[],
        }
    }

    /// Whether the field only displays content and never holds a value
    pub fn is_display_only(&self) -> bool {
        matches!(self.kind, FieldKind::Static { .. })
    }
}

/// Field type with its type-specific attributes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Email,
    Phone,
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    Select {
        #[serde(default)]
        options: Vec<FieldOption>,
        #[serde(default, skip_serializing_if = "is_false")]
        multiple: bool,
    },
    Radio {
        #[serde(default)]
        options: Vec<FieldOption>,
    },
    Checkbox {
        #[serde(default, with = "money::optional_amount", skip_serializing_if = "Option::is_none")]
        price: Option<Decimal>,
    },
    Switch {
        #[serde(default, with = "money::optional_amount", skip_serializing_if = "Option::is_none")]
        price: Option<Decimal>,
    },
    Date {
        #[serde(default)]
        mode: DateMode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pricing: Option<DatePricing>,
    },
    Time,
    Price {
        #[serde(default, with = "money::optional_amount", skip_serializing_if = "Option::is_none")]
        amount: Option<Decimal>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        currency: Option<String>,
    },
    Static {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
    /// Any type this crate does not know; renders inert and prices at zero
    #[serde(other)]
    Unknown,
}

impl FieldKind {
    /// JSON `type` tag
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::Number { .. } => "number",
            FieldKind::Select { .. } => "select",
            FieldKind::Radio { .. } => "radio",
            FieldKind::Checkbox { .. } => "checkbox",
            FieldKind::Switch { .. } => "switch",
            FieldKind::Date { .. } => "date",
            FieldKind::Time => "time",
            FieldKind::Price { .. } => "price",
            FieldKind::Static { .. } => "static",
            FieldKind::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: Value,
    #[serde(default, with = "money::optional_amount", skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { label: label.into(), value: value.into(), price: None }
    }

    pub fn priced(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Whether a form value selects this option
    ///
    /// Values written by the browser may be the option value itself or its
    /// string form (`1` and `"1"` select the same option).
    pub fn matches(&self, selected: &Value) -> bool {
        if &self.value == selected {
            return true;
        }
        match (scalar_text(&self.value), scalar_text(selected)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    #[default]
    Single,
    Range,
}

/// Per-day pricing for date fields
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatePricing {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, with = "money::optional_amount", skip_serializing_if = "Option::is_none")]
    pub base_per_day: Option<Decimal>,
    /// `0` is Sunday, `6` is Saturday
    #[serde(default, with = "money::weekday_prices", skip_serializing_if = "BTreeMap::is_empty")]
    pub weekday_overrides: BTreeMap<u8, Decimal>,
    /// Keyed by `yyyy-MM-dd`
    #[serde(default, with = "money::date_prices", skip_serializing_if = "BTreeMap::is_empty")]
    pub specific_dates: BTreeMap<String, Decimal>,
}

/// Layout width of a field in the rendered form
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldWidth {
    #[default]
    Full,
    Half,
    Third,
    Quarter,
}

impl FieldWidth {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldWidth::Full => "full",
            FieldWidth::Half => "half",
            FieldWidth::Third => "third",
            FieldWidth::Quarter => "quarter",
        }
    }

    /// Columns out of twelve
    pub fn columns(&self) -> u8 {
        match self {
            FieldWidth::Full => 12,
            FieldWidth::Half => 6,
            FieldWidth::Third => 4,
            FieldWidth::Quarter => 3,
        }
    }
}

impl Serialize for FieldWidth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Older documents stored percentages; anything unrecognised lays out full width.
impl<'de> Deserialize<'de> for FieldWidth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let width = match raw.as_str().map(str::trim) {
            Some("half") | Some("50%") | Some("1/2") => FieldWidth::Half,
            Some("third") | Some("33%") | Some("1/3") => FieldWidth::Third,
            Some("quarter") | Some("25%") | Some("1/4") => FieldWidth::Quarter,
            _ => FieldWidth::Full,
        };
        Ok(width)
    }
}

// =============================================================================
// Form Schema
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    #[serde(default)]
    pub meta: FormMeta,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl FormSchema {
    pub fn new(title: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            meta: FormMeta { title: title.into(), description: String::new() },
            fields,
        }
    }

    /// Field by value key
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check that every field has a usable, unique name
    pub fn validate_names(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !is_valid_name(&field.name) {
                return Err(FormsError::InvalidName(field.name.clone()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(FormsError::DuplicateName(field.name.clone()));
            }
        }
        Ok(())
    }
}

/// Names must be word identifiers so visibility expressions can reference them
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_priced_fields() {
        let raw = json!([
            { "id": "f1", "type": "checkbox", "name": "lunch", "label": "Lunch", "price": 12 },
            { "id": "f2", "type": "select", "name": "size", "label": "Size", "multiple": true,
              "options": [{ "label": "S", "value": "s", "price": "5" }, { "label": "M", "value": "m" }] },
            { "id": "f3", "type": "date", "name": "stay", "label": "Stay", "mode": "range",
              "pricing": { "enabled": true, "basePerDay": 10, "weekdayOverrides": { "0": 0 },
                           "specificDates": { "2024-12-25": 50 } } },
            { "id": "f4", "type": "signature", "name": "sig", "label": "Sign here" },
        ]);
        let fields: Vec<FieldDescriptor> = serde_json::from_value(raw).unwrap();

        assert_eq!(fields[0].kind, FieldKind::Checkbox { price: Some(Decimal::new(12, 0)) });
        assert_eq!(fields[1].options()[0].price, Some(Decimal::new(5, 0)));
        assert_eq!(fields[1].options()[1].price, None);
        match &fields[2].kind {
            FieldKind::Date { mode, pricing: Some(p) } => {
                assert_eq!(*mode, DateMode::Range);
                assert!(p.enabled);
                assert_eq!(p.weekday_overrides.get(&0), Some(&Decimal::ZERO));
                assert_eq!(p.specific_dates.get("2024-12-25"), Some(&Decimal::new(50, 0)));
            }
            other => panic!("unexpected kind: {:?}", other),
        }
        assert_eq!(fields[3].kind, FieldKind::Unknown);
    }

    #[test]
    fn test_non_numeric_price_is_absent() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "id": "f1", "type": "switch", "name": "tshirt", "label": "T-shirt", "price": "n/a"
        }))
        .unwrap();
        assert_eq!(field.kind, FieldKind::Switch { price: None });
    }

    #[test]
    fn test_serializes_camel_case_with_type_tag() {
        let field = FieldDescriptor::new("f1", "guests", "Guests", FieldKind::Number {
            min: Some(0.0),
            max: None,
            step: None,
        })
        .visible_if("attending == true");
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "number");
        assert_eq!(value["visibleIf"], "attending == true");
        assert!(value.get("required").is_none());
    }

    #[test]
    fn test_width_tolerates_legacy_values() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "id": "f1", "type": "text", "name": "first", "label": "First", "width": "50%"
        }))
        .unwrap();
        assert_eq!(field.width(), FieldWidth::Half);
        assert_eq!(field.width().columns(), 6);
    }

    #[test]
    fn test_validate_names() {
        let schema = FormSchema::new("Signup", vec![
            FieldDescriptor::new("1", "email", "Email", FieldKind::Email),
            FieldDescriptor::new("2", "email", "Email again", FieldKind::Email),
        ]);
        assert!(matches!(schema.validate_names(), Err(FormsError::DuplicateName(n)) if n == "email"));

        let schema = FormSchema::new("Signup", vec![
            FieldDescriptor::new("1", "first name", "First", FieldKind::Text),
        ]);
        assert!(matches!(schema.validate_names(), Err(FormsError::InvalidName(_))));
    }

    #[test]
    fn test_option_matches_string_form() {
        let option = FieldOption::new("One", 1);
        assert!(option.matches(&json!(1)));
        assert!(option.matches(&json!("1")));
        assert!(!option.matches(&json!("2")));
    }
}
