//! Schema store for a form-builder editing session
//!
//! The builder's palette, canvas and property panel all work on the same
//! schema. Instead of a module-level store, each session owns a
//! [`SchemaStore`] handle that is cloned into whichever component needs it.

use crate::error::{FormsError, Result};
use crate::schema::{is_valid_name, FieldDescriptor, FieldKind, FormMeta, FormSchema};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Default)]
struct BuilderState {
    schema: FormSchema,
    selected: Option<String>,
    dirty: bool,
}

/// Shared handle over the schema being edited
#[derive(Clone, Debug, Default)]
pub struct SchemaStore {
    inner: Arc<RwLock<BuilderState>>,
}

impl SchemaStore {
    pub fn new(schema: FormSchema) -> Self {
        Self {
            inner: Arc::new(RwLock::new(BuilderState { schema, selected: None, dirty: false })),
        }
    }

    /// Snapshot of the current schema
    pub fn schema(&self) -> FormSchema {
        self.inner.read().schema.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.read().dirty
    }

    /// Clear the dirty flag after a successful save
    pub fn mark_saved(&self) {
        self.inner.write().dirty = false;
    }

    pub fn set_meta(&self, meta: FormMeta) {
        let mut state = self.inner.write();
        state.schema.meta = meta;
        state.dirty = true;
    }

    /// Append a field; the id is generated and the name derived from the label
    pub fn add_field(&self, kind: FieldKind, label: &str) -> FieldDescriptor {
        let mut state = self.inner.write();
        let name = unique_name(&state.schema, &slugify(label));
        let field = FieldDescriptor::new(uuid::Uuid::new_v4().to_string(), name, label, kind);
        tracing::debug!(id = %field.id, name = %field.name, kind = field.kind.type_name(), "field added");
        state.schema.fields.push(field.clone());
        state.selected = Some(field.id.clone());
        state.dirty = true;
        field
    }

    /// Copy a field directly below the original under a fresh id and name
    pub fn duplicate_field(&self, id: &str) -> Result<FieldDescriptor> {
        let mut state = self.inner.write();
        let index = position(&state.schema, id)?;
        let mut copy = state.schema.fields[index].clone();
        copy.id = uuid::Uuid::new_v4().to_string();
        copy.name = unique_name(&state.schema, &copy.name);
        state.schema.fields.insert(index + 1, copy.clone());
        state.selected = Some(copy.id.clone());
        state.dirty = true;
        Ok(copy)
    }

    /// Edit a field in place; the edit is discarded if it breaks name rules
    pub fn update_field(&self, id: &str, edit: impl FnOnce(&mut FieldDescriptor)) -> Result<()> {
        let mut state = self.inner.write();
        let index = position(&state.schema, id)?;
        let original = state.schema.fields[index].clone();
        edit(&mut state.schema.fields[index]);
        state.schema.fields[index].id = original.id.clone();
        if let Err(e) = state.schema.validate_names() {
            state.schema.fields[index] = original;
            return Err(e);
        }
        state.dirty = true;
        Ok(())
    }

    pub fn rename_field(&self, id: &str, name: &str) -> Result<()> {
        if !is_valid_name(name) {
            return Err(FormsError::InvalidName(name.to_string()));
        }
        self.update_field(id, |f| f.name = name.to_string())
    }

    pub fn remove_field(&self, id: &str) -> Result<FieldDescriptor> {
        let mut state = self.inner.write();
        let index = position(&state.schema, id)?;
        let removed = state.schema.fields.remove(index);
        if state.selected.as_deref() == Some(id) {
            state.selected = None;
        }
        state.dirty = true;
        Ok(removed)
    }

    /// Drag-and-drop move on the canvas
    pub fn move_field(&self, from: usize, to: usize) -> Result<()> {
        let mut state = self.inner.write();
        let len = state.schema.fields.len();
        if from >= len {
            return Err(FormsError::OutOfRange(from));
        }
        if to >= len {
            return Err(FormsError::OutOfRange(to));
        }
        let field = state.schema.fields.remove(from);
        state.schema.fields.insert(to, field);
        state.dirty = true;
        Ok(())
    }

    pub fn select(&self, id: Option<&str>) -> Result<()> {
        let mut state = self.inner.write();
        if let Some(id) = id {
            position(&state.schema, id)?;
        }
        state.selected = id.map(String::from);
        Ok(())
    }

    pub fn selected(&self) -> Option<FieldDescriptor> {
        let state = self.inner.read();
        let id = state.selected.as_deref()?;
        state.schema.fields.iter().find(|f| f.id == id).cloned()
    }

    /// Replace the whole schema, e.g. after an import
    pub fn replace(&self, schema: FormSchema) -> Result<()> {
        schema.validate_names()?;
        let mut state = self.inner.write();
        state.schema = schema;
        state.selected = None;
        state.dirty = true;
        Ok(())
    }
}

fn position(schema: &FormSchema, id: &str) -> Result<usize> {
    schema
        .fields
        .iter()
        .position(|f| f.id == id)
        .ok_or_else(|| FormsError::FieldNotFound(id.to_string()))
}

/// Snake-case value key from a label
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for c in label.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') && !slug.is_empty() {
            slug.push('_');
        }
    }
    let slug = slug.trim_end_matches('_').to_string();
    match slug.chars().next() {
        None => "field".to_string(),
        Some(c) if c.is_ascii_digit() => format!("field_{}", slug),
        Some(_) => slug,
    }
}

fn unique_name(schema: &FormSchema, base: &str) -> String {
    let taken = |candidate: &str| schema.fields.iter().any(|f| f.name == candidate);
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !taken(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("First Name"), "first_name");
        assert_eq!(slugify("  Email -- address! "), "email_address");
        assert_eq!(slugify("2nd choice"), "field_2nd_choice");
        assert_eq!(slugify("¿?"), "field");
    }

    #[test]
    fn test_add_field_generates_unique_names() {
        let store = SchemaStore::default();
        let a = store.add_field(FieldKind::Text, "Name");
        let b = store.add_field(FieldKind::Text, "Name");
        let c = store.add_field(FieldKind::Text, "Name");
        assert_eq!(a.name, "name");
        assert_eq!(b.name, "name_2");
        assert_eq!(c.name, "name_3");
        assert_ne!(a.id, b.id);
        assert!(store.is_dirty());
        assert_eq!(store.selected().map(|f| f.id), Some(c.id));
    }

    #[test]
    fn test_rename_rejects_duplicates_and_keeps_original() {
        let store = SchemaStore::default();
        let first = store.add_field(FieldKind::Email, "Email");
        let second = store.add_field(FieldKind::Phone, "Phone");

        assert!(matches!(store.rename_field(&second.id, "email"), Err(FormsError::DuplicateName(_))));
        assert!(matches!(store.rename_field(&second.id, "bad name"), Err(FormsError::InvalidName(_))));
        assert_eq!(store.schema().fields[1].name, "phone");

        store.rename_field(&first.id, "contact_email").unwrap();
        assert_eq!(store.schema().fields[0].name, "contact_email");
    }

    #[test]
    fn test_update_cannot_change_id() {
        let store = SchemaStore::default();
        let field = store.add_field(FieldKind::Text, "Title");
        store
            .update_field(&field.id, |f| {
                f.id = "hijacked".into();
                f.required = true;
            })
            .unwrap();
        let schema = store.schema();
        assert_eq!(schema.fields[0].id, field.id);
        assert!(schema.fields[0].required);
    }

    #[test]
    fn test_move_duplicate_remove() {
        let store = SchemaStore::default();
        let a = store.add_field(FieldKind::Text, "A");
        let b = store.add_field(FieldKind::Text, "B");
        store.move_field(1, 0).unwrap();
        assert_eq!(store.schema().fields[0].id, b.id);
        assert!(matches!(store.move_field(0, 5), Err(FormsError::OutOfRange(5))));

        let copy = store.duplicate_field(&a.id).unwrap();
        assert_eq!(copy.name, "a_2");
        assert_eq!(store.schema().fields[2].id, copy.id);

        store.remove_field(&copy.id).unwrap();
        assert!(store.selected().is_none());
        assert_eq!(store.schema().fields.len(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let store = SchemaStore::default();
        let panel = store.clone();
        store.add_field(FieldKind::Text, "Shared");
        assert_eq!(panel.schema().fields.len(), 1);
        panel.mark_saved();
        assert!(!store.is_dirty());
    }
}
