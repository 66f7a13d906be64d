//! Persisted form documents
//!
//! The canonical document is `{ title, description, folder, data }` where
//! `data` is the field list. Older builder surfaces exported
//! `{ fields: [...] }` (optionally with a `meta` block); import accepts
//! both, export always writes the canonical shape.

use crate::error::{FormsError, Result};
use crate::schema::{FieldDescriptor, FormMeta, FormSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default)]
    pub data: Vec<FieldDescriptor>,
}

impl PersistedForm {
    pub fn from_schema(schema: FormSchema, folder: Option<String>) -> Self {
        Self {
            title: schema.meta.title,
            description: schema.meta.description,
            folder,
            data: schema.fields,
        }
    }

    pub fn into_schema(self) -> FormSchema {
        FormSchema {
            meta: FormMeta { title: self.title, description: self.description },
            fields: self.data,
        }
    }
}

#[derive(Deserialize)]
struct LegacyForm {
    #[serde(default)]
    meta: Option<FormMeta>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    fields: Vec<FieldDescriptor>,
}

/// Parse an exported form document
pub fn import_form(json: &str) -> Result<PersistedForm> {
    let raw: Value = serde_json::from_str(json)?;
    let Some(object) = raw.as_object() else {
        return Err(FormsError::UnsupportedShape("expected a JSON object".into()));
    };
    let form = if object.get("data").is_some_and(Value::is_array) {
        serde_json::from_value::<PersistedForm>(raw)?
    } else if object.get("fields").is_some_and(Value::is_array) {
        tracing::debug!("importing legacy form document");
        let legacy: LegacyForm = serde_json::from_value(raw)?;
        let meta = legacy.meta.unwrap_or_default();
        PersistedForm {
            title: legacy.title.unwrap_or(meta.title),
            description: legacy.description.unwrap_or(meta.description),
            folder: None,
            data: legacy.fields,
        }
    } else {
        return Err(FormsError::UnsupportedShape("no `data` or `fields` array".into()));
    };
    FormSchema { meta: FormMeta::default(), fields: form.data.clone() }.validate_names()?;
    Ok(form)
}

/// Serialize in the canonical shape
pub fn export_form(form: &PersistedForm) -> Result<String> {
    Ok(serde_json::to_string_pretty(form)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;

    #[test]
    fn test_import_canonical() {
        let json = r#"{
            "title": "Building Fund",
            "description": "Give towards the new hall",
            "folder": "giving",
            "data": [
                { "id": "1", "type": "price", "name": "gift", "label": "Gift", "amount": 50 },
                { "id": "2", "type": "text", "name": "note", "label": "Note" }
            ]
        }"#;
        let form = import_form(json).unwrap();
        assert_eq!(form.title, "Building Fund");
        assert_eq!(form.folder.as_deref(), Some("giving"));
        assert_eq!(form.data.len(), 2);
        assert_eq!(form.data[1].kind, FieldKind::Text);
    }

    #[test]
    fn test_import_legacy_fields_shape() {
        let json = r#"{
            "meta": { "title": "Volunteer", "description": "Serve on Sunday" },
            "fields": [{ "id": "1", "type": "email", "name": "email", "label": "Email" }]
        }"#;
        let form = import_form(json).unwrap();
        assert_eq!(form.title, "Volunteer");
        assert_eq!(form.description, "Serve on Sunday");
        assert_eq!(form.data[0].name, "email");
    }

    #[test]
    fn test_import_rejects_other_shapes() {
        assert!(matches!(import_form("[]"), Err(FormsError::UnsupportedShape(_))));
        assert!(matches!(import_form(r#"{"items": []}"#), Err(FormsError::UnsupportedShape(_))));
        assert!(matches!(import_form("{not json"), Err(FormsError::Json(_))));
    }

    #[test]
    fn test_import_rejects_duplicate_names() {
        let json = r#"{ "title": "x", "data": [
            { "id": "1", "type": "text", "name": "a" },
            { "id": "2", "type": "text", "name": "a" }
        ]}"#;
        assert!(matches!(import_form(json), Err(FormsError::DuplicateName(_))));
    }

    #[test]
    fn test_export_is_canonical() {
        let schema = FormSchema::new("Prayer Request", vec![
            FieldDescriptor::new("1", "request", "Request", FieldKind::Textarea).required(),
        ]);
        let exported = export_form(&PersistedForm::from_schema(schema.clone(), None)).unwrap();
        let value: Value = serde_json::from_str(&exported).unwrap();
        assert!(value.get("data").is_some());
        assert!(value.get("fields").is_none());
        assert_eq!(import_form(&exported).unwrap().into_schema(), schema);
    }
}
