//! Public site pages
//!
//! The builder edits a staging copy of the page document. Autosave writes
//! staging only; publishing promotes staging to the live copy.

use super::{require, url_slug, Draft, Id, Resource};
use crate::client::ApiClient;
use crate::error::{AdminError, Result};
use chapel_pages::{resolve_language, PageDocument};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitePage {
    pub id: Id,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub staging_content: Option<PageDocument>,
    #[serde(default)]
    pub published_content: Option<PageDocument>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl SitePage {
    /// Staging has edits the live page does not
    pub fn has_unpublished_changes(&self) -> bool {
        match (&self.staging_content, &self.published_content) {
            (Some(staging), Some(live)) => staging != live,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Document the builder should open: staging, else live, else blank
    pub fn editable_document(&self) -> PageDocument {
        self.staging_content
            .clone()
            .or_else(|| self.published_content.clone())
            .unwrap_or_else(|| PageDocument::new(self.title.clone()))
    }

    /// Language to render the live page in for a visitor
    pub fn render_language(&self, user: Option<&str>, browser: &[&str], default: &str) -> Option<String> {
        resolve_language(&self.languages, user, browser, default)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SitePageDraft {
    pub title: String,
    pub slug: String,
    pub languages: Vec<String>,
}

impl Draft for SitePageDraft {
    type Record = SitePage;

    fn from_record(record: &SitePage) -> Self {
        Self {
            title: record.title.clone(),
            slug: record.slug.clone(),
            languages: record.languages.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        require(&self.title, "Page title")?;
        let slug = self.slug.trim().trim_start_matches('/');
        if !slug.is_empty() && slug.split('/').any(|part| url_slug(part) != part) {
            return Err(AdminError::validation(
                "Slug may only contain lowercase letters, digits, dashes and slashes",
            ));
        }
        Ok(())
    }

    fn normalize(&self) -> Self {
        let slug = match self.slug.trim().trim_start_matches('/') {
            "" => url_slug(&self.title),
            given => given.to_string(),
        };
        let mut languages: Vec<String> = self.languages.iter().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect();
        super::dedup_in_order(&mut languages);
        Self { title: self.title.trim().to_string(), slug, languages }
    }
}

pub struct Pages;

impl Resource for Pages {
    const PATH: &'static str = "/pages";
    const NAME: &'static str = "pages";
    type Record = SitePage;
    type Draft = SitePageDraft;

    fn id(record: &SitePage) -> Id {
        record.id
    }
}

#[derive(Debug, Serialize)]
struct StagingRequest<'a> {
    content: &'a PageDocument,
}

/// Validate and store the builder document as the staging copy
pub async fn save_staging(client: &ApiClient, id: Id, document: &PageDocument) -> Result<SitePage> {
    document.validate()?;
    let mut document = document.clone();
    document.ensure_ids();
    let page = client
        .put(&format!("{}/{}/staging", Pages::PATH, id), &StagingRequest { content: &document })
        .await?;
    debug!(id, blocks = document.block_count(), "staging saved");
    Ok(page)
}

pub async fn publish(client: &ApiClient, id: Id) -> Result<SitePage> {
    let page: SitePage = client
        .post(&format!("{}/{}/publish", Pages::PATH, id), &serde_json::json!({}))
        .await?;
    info!(id, slug = %page.slug, "page published");
    Ok(page)
}

/// Throw away staging edits, going back to the live copy
pub async fn discard_staging(client: &ApiClient, id: Id) -> Result<()> {
    client.delete(&format!("{}/{}/staging", Pages::PATH, id)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;
    use axum::{
        extract::{Path, State},
        routing::{post, put},
        Json, Router,
    };
    use chapel_pages::BlockKind;
    use serde_json::Value;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    type Db = Arc<RwLock<SitePage>>;

    fn page() -> SitePage {
        SitePage {
            id: 1,
            title: "Home".into(),
            slug: "home".into(),
            staging_content: None,
            published_content: None,
            is_published: false,
            languages: vec!["en".into(), "es".into()],
            updated_at: None,
        }
    }

    async fn stage(Path(_id): Path<Id>, State(db): State<Db>, Json(body): Json<Value>) -> Json<SitePage> {
        let mut page = db.write().await;
        page.staging_content = serde_json::from_value(body["content"].clone()).ok();
        Json(page.clone())
    }

    async fn promote(Path(_id): Path<Id>, State(db): State<Db>) -> Json<SitePage> {
        let mut page = db.write().await;
        page.published_content = page.staging_content.clone();
        page.is_published = true;
        Json(page.clone())
    }

    #[tokio::test]
    async fn test_stage_then_publish() {
        let db: Db = Arc::new(RwLock::new(page()));
        let router = Router::new()
            .route("/pages/:id/staging", put(stage))
            .route("/pages/:id/publish", post(promote))
            .with_state(db);
        let client = ApiClient::new(&mock::serve(router).await, None);

        let mut document = page().editable_document();
        let mut text = BlockKind::Text.default_block();
        text.common_mut().id.clear();
        document.content.push(text);

        let staged = save_staging(&client, 1, &document).await.unwrap();
        assert!(staged.has_unpublished_changes());
        let stored = staged.staging_content.clone().unwrap();
        assert!(!stored.content[0].id().is_empty());

        let live = publish(&client, 1).await.unwrap();
        assert!(live.is_published);
        assert!(!live.has_unpublished_changes());
        assert_eq!(live.editable_document(), stored);
    }

    #[tokio::test]
    async fn test_invalid_document_not_sent() {
        let client = ApiClient::new("http://127.0.0.1:9", None);
        let mut document = PageDocument::new("Broken");
        let block = BlockKind::Divider.default_block();
        document.content.push(block.clone());
        document.content.push(block);
        assert!(matches!(save_staging(&client, 1, &document).await, Err(AdminError::Pages(_))));
    }

    #[test]
    fn test_slug_and_language() {
        let draft = SitePageDraft { title: "Plan Your Visit".into(), ..Default::default() }.normalize();
        assert_eq!(draft.slug, "plan-your-visit");
        let langs = SitePageDraft { title: "x".into(), slug: String::new(), languages: vec!["en".into(), " es".into(), "en".into()] };
        assert_eq!(langs.normalize().languages, vec!["en", "es"]);
        let nested = SitePageDraft { title: "x".into(), slug: "/ministries/youth".into(), languages: vec![] };
        assert!(nested.validate().is_ok());
        let bad = SitePageDraft { slug: "Youth Group".into(), ..nested };
        assert!(bad.validate().is_err());

        assert_eq!(page().render_language(None, &["es-MX"], "en").as_deref(), Some("es"));
    }
}
