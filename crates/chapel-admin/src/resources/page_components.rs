//! Saved page components (block templates)

use super::{require, Draft, Id, Resource};
use crate::error::{AdminError, Result};
use chapel_pages::{Block, Template};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageComponent {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub data: Vec<Block>,
}

impl PageComponent {
    pub fn template(&self) -> Template {
        Template {
            id: Some(self.id.to_string()),
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            blocks: self.data.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageComponentDraft {
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub data: Vec<Block>,
}

impl From<&Template> for PageComponentDraft {
    fn from(template: &Template) -> Self {
        Self {
            name: template.name.clone(),
            description: template.description.clone(),
            category: template.category.clone(),
            data: template.blocks.clone(),
        }
    }
}

impl Draft for PageComponentDraft {
    type Record = PageComponent;

    fn from_record(record: &PageComponent) -> Self {
        Self::from(&record.template())
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "Component name")?;
        if self.data.is_empty() {
            return Err(AdminError::validation("A component needs at least one block"));
        }
        for block in &self.data {
            block.validate()?;
        }
        Ok(())
    }

    fn normalize(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            category: Some(super::non_blank(&self.category).unwrap_or_else(|| "custom".into())),
            data: self.data.clone(),
        }
    }
}

pub struct PageComponents;

impl Resource for PageComponents {
    const PATH: &'static str = "/page-components";
    const NAME: &'static str = "pages";
    type Record = PageComponent;
    type Draft = PageComponentDraft;

    fn id(record: &PageComponent) -> Id {
        record.id
    }
}
