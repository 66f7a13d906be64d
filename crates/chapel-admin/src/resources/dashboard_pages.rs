//! Dashboard page configuration
//!
//! Which sections appear in the member dashboard, in which order and for
//! which roles.

use super::{non_blank, require, url_slug, Draft, Id, Resource};
use crate::error::{AdminError, Result};
use crate::reorder::Ordered;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardPage {
    pub id: Id,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub is_visible: bool,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Ordered for DashboardPage {
    fn id(&self) -> Id {
        self.id
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardPageDraft {
    pub title: String,
    pub slug: String,
    pub icon: Option<String>,
    pub is_visible: bool,
    pub roles: Vec<String>,
}

impl Default for DashboardPageDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            slug: String::new(),
            icon: None,
            is_visible: true,
            roles: vec![],
        }
    }
}

impl Draft for DashboardPageDraft {
    type Record = DashboardPage;

    fn from_record(record: &DashboardPage) -> Self {
        Self {
            title: record.title.clone(),
            slug: record.slug.clone(),
            icon: record.icon.clone(),
            is_visible: record.is_visible,
            roles: record.roles.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        require(&self.title, "Page title")?;
        let slug = self.slug.trim();
        if !slug.is_empty() && url_slug(slug) != slug {
            return Err(AdminError::Validation(format!(
                "Slug may only contain lowercase letters, digits and dashes (try \"{}\")",
                url_slug(slug)
            )));
        }
        Ok(())
    }

    fn normalize(&self) -> Self {
        let slug = match self.slug.trim() {
            "" => url_slug(&self.title),
            given => given.to_string(),
        };
        let mut roles: Vec<String> = self
            .roles
            .iter()
            .filter_map(|r| non_blank(&Some(r.clone())))
            .collect();
        roles.sort();
        roles.dedup();
        Self {
            title: self.title.trim().to_string(),
            slug,
            icon: non_blank(&self.icon),
            roles,
            ..self.clone()
        }
    }
}

pub struct DashboardPages;

impl Resource for DashboardPages {
    const PATH: &'static str = "/dashboard-pages";
    const NAME: &'static str = "dashboard_pages";
    type Record = DashboardPage;
    type Draft = DashboardPageDraft;

    fn id(record: &DashboardPage) -> Id {
        record.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_title() {
        let draft = DashboardPageDraft {
            title: " Small Groups ".into(),
            roles: vec!["member".into(), " ".into(), "leader".into(), "member".into()],
            ..Default::default()
        };
        assert!(draft.validate().is_ok());
        let payload = draft.normalize();
        assert_eq!(payload.slug, "small-groups");
        assert_eq!(payload.roles, vec!["leader", "member"]);
        assert!(payload.is_visible);
    }

    #[test]
    fn test_bad_slug_rejected() {
        let draft = DashboardPageDraft { title: "Giving".into(), slug: "My Giving".into(), ..Default::default() };
        let err = draft.validate().unwrap_err();
        assert!(err.to_string().contains("my-giving"));
    }
}
