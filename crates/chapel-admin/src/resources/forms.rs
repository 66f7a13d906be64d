//! Forms and their responses
//!
//! A form is stored as the persisted builder document. The builder's
//! `SchemaStore` converts to a draft for saving; responses are read-only.

use super::{list_with, require, Draft, Id, Resource};
use crate::client::ApiClient;
use crate::error::Result;
use crate::filters::DateRangeFilter;
use crate::pagination::{Page, Pagination};
use chapel_forms::{money, FieldDescriptor, FormSchema, FormSession, FormSubmission, FormValues, PersistedForm, SchemaStore};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub data: Vec<FieldDescriptor>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub response_count: u64,
}

impl FormRecord {
    pub fn schema(&self) -> FormSchema {
        self.persisted().into_schema()
    }

    pub fn persisted(&self) -> PersistedForm {
        PersistedForm {
            title: self.title.clone(),
            description: self.description.clone(),
            folder: self.folder.clone(),
            data: self.data.clone(),
        }
    }

    /// Fresh render session for a preview or a manual entry
    pub fn session(&self) -> FormSession {
        FormSession::new(self.schema())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDraft {
    #[serde(flatten)]
    pub form: PersistedForm,
    pub is_active: bool,
}

impl FormDraft {
    /// Draft from the builder's current schema
    pub fn from_store(store: &SchemaStore, folder: Option<String>, is_active: bool) -> Self {
        Self { form: PersistedForm::from_schema(store.schema(), folder), is_active }
    }
}

impl Draft for FormDraft {
    type Record = FormRecord;

    fn from_record(record: &FormRecord) -> Self {
        Self { form: record.persisted(), is_active: record.is_active }
    }

    fn validate(&self) -> Result<()> {
        require(&self.form.title, "Form title")?;
        self.form.clone().into_schema().validate_names()?;
        Ok(())
    }

    fn normalize(&self) -> Self {
        let mut form = self.form.clone();
        form.title = form.title.trim().to_string();
        form.folder = super::non_blank(&form.folder);
        Self { form, is_active: self.is_active }
    }
}

pub struct Forms;

impl Resource for Forms {
    const PATH: &'static str = "/forms";
    const NAME: &'static str = "forms";
    type Record = FormRecord;
    type Draft = FormDraft;

    fn id(record: &FormRecord) -> Id {
        record.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormResponse {
    pub id: Id,
    pub form_id: Id,
    #[serde(default)]
    pub data: FormValues,
    #[serde(default, with = "money::optional_amount")]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

pub async fn responses(client: &ApiClient, form_id: Id, page: Pagination, dates: &DateRangeFilter) -> Result<Page<FormResponse>> {
    dates.validate()?;
    let mut query = dates.query("start_date", "end_date");
    query.extend(page.query());
    let result: Page<FormResponse> = client
        .get_with(&format!("{}/{}/responses", Forms::PATH, form_id), &query)
        .await?;
    Ok(result.assume(page))
}

/// Validate the session and submit its visible values with the total
pub async fn submit(client: &ApiClient, form_id: Id, session: &FormSession) -> Result<FormResponse> {
    let submission: FormSubmission = session.submission()?;
    let response = client
        .post(&format!("{}/{}/responses", Forms::PATH, form_id), &submission)
        .await?;
    info!(form_id, "form response submitted");
    Ok(response)
}

/// Forms in a folder, or all forms when `folder` is `None`
pub async fn list_in_folder(client: &ApiClient, page: Pagination, folder: Option<&str>) -> Result<Page<FormRecord>> {
    let query = folder.map(|f| vec![("folder", f.to_string())]).unwrap_or_default();
    list_with::<Forms>(client, page, query).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdminError;
    use crate::mock;
    use axum::{extract::Path, routing::post, Json, Router};
    use chapel_forms::FieldKind;
    use serde_json::{json, Value};

    fn store() -> SchemaStore {
        let store = SchemaStore::new(FormSchema::new("Retreat", vec![]));
        store.add_field(FieldKind::Text, "Full name");
        store.add_field(FieldKind::Checkbox { price: Some(Decimal::new(15, 0)) }, "Lunch");
        store
    }

    #[test]
    fn test_draft_from_store_serializes_canonical_shape() {
        let draft = FormDraft::from_store(&store(), Some("Events".into()), true).normalize();
        assert!(draft.validate().is_ok());
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["title"], "Retreat");
        assert_eq!(json["folder"], "Events");
        assert_eq!(json["is_active"], true);
        assert_eq!(json["data"][1]["name"], "lunch");
    }

    #[test]
    fn test_untitled_form_rejected() {
        let draft = FormDraft::default();
        assert!(matches!(draft.validate(), Err(AdminError::Validation(_))));
    }

    #[tokio::test]
    async fn test_submit_sends_total() {
        let router = Router::new().route(
            "/forms/:id/responses",
            post(|Path(id): Path<Id>, Json(body): Json<Value>| async move {
                Json(json!({ "id": 1, "form_id": id, "data": body["values"], "total": body["total"] }))
            }),
        );
        let client = ApiClient::new(&mock::serve(router).await, None);

        let schema = store().schema();
        let mut session = FormSession::new(schema);
        session.set_value("full_name", "Grace Park").unwrap();
        session.set_value("lunch", true).unwrap();

        let response = submit(&client, 3, &session).await.unwrap();
        assert_eq!(response.form_id, 3);
        assert_eq!(response.total, Some(Decimal::new(15, 0)));
        assert_eq!(response.data["full_name"], "Grace Park");
    }
}
