//! REST resources
//!
//! Each resource names its collection path, the record the server returns
//! and the draft the admin edits. The generic functions here cover the
//! plain CRUD endpoints; resource modules add their action endpoints.

pub mod bulletins;
pub mod dashboard_pages;
pub mod forms;
pub mod notifications;
pub mod page_components;
pub mod pages;
pub mod refunds;
pub mod services;
pub mod transactions;

use crate::client::ApiClient;
use crate::error::{AdminError, Result};
use crate::pagination::{Page, Pagination};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Server-assigned record id
pub type Id = i64;

/// Editable copy of a record
pub trait Draft: Clone + Default + Serialize + Send + Sync {
    type Record;

    /// Draft seeded from the latest server copy
    fn from_record(record: &Self::Record) -> Self;

    /// Local checks run before any request is sent
    fn validate(&self) -> Result<()>;

    /// Payload with absent optional fields defaulted
    fn normalize(&self) -> Self {
        self.clone()
    }
}

pub trait Resource: Send + Sync + 'static {
    /// Collection path, e.g. `/bulletins`
    const PATH: &'static str;
    /// Human name used in messages and permission names
    const NAME: &'static str;

    type Record: DeserializeOwned + Clone + Send + Sync;
    type Draft: Draft<Record = Self::Record>;

    fn id(record: &Self::Record) -> Id;

    fn item_path(id: Id) -> String {
        format!("{}/{}", Self::PATH, id)
    }
}

pub async fn list<R: Resource>(client: &ApiClient, page: Pagination) -> Result<Page<R::Record>> {
    list_with::<R>(client, page, vec![]).await
}

/// List with extra query parameters (search, filters)
pub async fn list_with<R: Resource>(
    client: &ApiClient,
    page: Pagination,
    mut query: Vec<(&'static str, String)>,
) -> Result<Page<R::Record>> {
    query.extend(page.query());
    let result: Page<R::Record> = client.get_with(R::PATH, &query).await?;
    Ok(result.assume(page))
}

/// Every record, for lists the server does not paginate
pub async fn list_all<R: Resource>(client: &ApiClient) -> Result<Vec<R::Record>> {
    let result: Page<R::Record> = client.get(R::PATH).await?;
    Ok(result.items)
}

pub async fn get<R: Resource>(client: &ApiClient, id: Id) -> Result<R::Record> {
    client.get(&R::item_path(id)).await
}

pub async fn create<R: Resource>(client: &ApiClient, draft: &R::Draft) -> Result<R::Record> {
    draft.validate()?;
    client.post(R::PATH, &draft.normalize()).await
}

pub async fn update<R: Resource>(client: &ApiClient, id: Id, draft: &R::Draft) -> Result<R::Record> {
    draft.validate()?;
    client.put(&R::item_path(id), &draft.normalize()).await
}

pub async fn delete<R: Resource>(client: &ApiClient, id: Id) -> Result<()> {
    client.delete(&R::item_path(id)).await
}

/// Trimmed text that must not be blank
pub(crate) fn require(value: &str, label: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AdminError::Validation(format!("{} is required", label)));
    }
    Ok(())
}

/// Blank optional text reads as absent
pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Drop repeated entries, keeping the first occurrence of each
pub(crate) fn dedup_in_order<T: PartialEq>(items: &mut Vec<T>) {
    let mut index = 0;
    while index < items.len() {
        if items[..index].contains(&items[index]) {
            items.remove(index);
        } else {
            index += 1;
        }
    }
}

/// Lowercase dash-separated URL slug
pub(crate) fn url_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
