//! Bulletins

use super::{non_blank, require, Draft, Id, Resource};
use crate::error::Result;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bulletin {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulletinDraft {
    pub title: String,
    pub content: String,
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub is_published: bool,
    pub is_pinned: bool,
}

impl Draft for BulletinDraft {
    type Record = Bulletin;

    fn from_record(record: &Bulletin) -> Self {
        Self {
            title: record.title.clone(),
            content: record.content.clone(),
            date: record.date,
            category: record.category.clone(),
            is_published: record.is_published,
            is_pinned: record.is_pinned,
        }
    }

    fn validate(&self) -> Result<()> {
        require(&self.title, "Title")
    }

    fn normalize(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            date: Some(self.date.unwrap_or_else(|| Local::now().date_naive())),
            category: Some(non_blank(&self.category).unwrap_or_else(|| "general".into())),
            ..self.clone()
        }
    }
}

pub struct Bulletins;

impl Resource for Bulletins {
    const PATH: &'static str = "/bulletins";
    const NAME: &'static str = "bulletins";
    type Record = Bulletin;
    type Draft = BulletinDraft;

    fn id(record: &Bulletin) -> Id {
        record.id
    }
}
