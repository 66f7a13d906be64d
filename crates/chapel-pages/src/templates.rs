//! Reusable block groups
//!
//! A template is a named group of blocks saved from the canvas so it can be
//! dropped onto other pages. Instantiating gives every block a fresh id so
//! the same template can appear more than once on a page.

use crate::blocks::Block;
use crate::error::{PagesError, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    pub blocks: Vec<Block>,
}

impl Template {
    /// Group the selected blocks under a name
    pub fn from_selection(name: impl Into<String>, blocks: Vec<Block>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PagesError::InvalidProps {
                block: "template".into(),
                reason: "name is required".into(),
            });
        }
        if blocks.is_empty() {
            return Err(PagesError::InvalidProps {
                block: "template".into(),
                reason: "at least one block is required".into(),
            });
        }
        for block in &blocks {
            block.validate()?;
        }
        Ok(Self { id: None, name, description: String::new(), category: None, blocks })
    }

    /// Copies of the blocks, each (including nested children) with a new id
    pub fn instantiate(&self) -> Vec<Block> {
        fn refresh(blocks: &mut [Block]) {
            for block in blocks {
                block.common_mut().id = uuid::Uuid::new_v4().to_string();
                if let Some(children) = block.children_mut() {
                    refresh(children);
                }
            }
        }
        let mut blocks = self.blocks.clone();
        refresh(&mut blocks);
        blocks
    }
}
