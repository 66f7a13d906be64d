//! Page documents
//!
//! The builder persists a page as `{ content: [block], root: { props } }`.
//! Container blocks nest further blocks in their `children` slot.

use crate::blocks::Block;
use crate::error::{PagesError, Result};
use crate::translations::Translations;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RootProps {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Translations::is_empty")]
    pub translations: Translations,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Root {
    #[serde(default)]
    pub props: RootProps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    #[serde(default)]
    pub content: Vec<Block>,
    #[serde(default)]
    pub root: Root,
}

impl PageDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            content: vec![],
            root: Root { props: RootProps { title: title.into(), ..Default::default() } },
        }
    }

    /// Parse and validate a persisted document
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: PageDocument =
            serde_json::from_str(json).map_err(|e| PagesError::InvalidDocument(e.to_string()))?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Depth-first visit of every block, children after their container
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Block, usize)) {
        fn go<'a>(blocks: &'a [Block], depth: usize, visit: &mut impl FnMut(&'a Block, usize)) {
            for block in blocks {
                visit(block, depth);
                go(block.children(), depth + 1, visit);
            }
        }
        go(&self.content, 0, visit);
    }

    pub fn block_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_, _| count += 1);
        count
    }

    pub fn find(&self, id: &str) -> Option<&Block> {
        let mut found = None;
        self.walk(&mut |block, _| {
            if found.is_none() && block.id() == id {
                found = Some(block);
            }
        });
        found
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Block> {
        fn go<'a>(blocks: &'a mut [Block], id: &str) -> Option<&'a mut Block> {
            for block in blocks {
                if block.id() == id {
                    return Some(block);
                }
                if let Some(children) = block.children_mut() {
                    if let Some(found) = go(children, id) {
                        return Some(found);
                    }
                }
            }
            None
        }
        go(&mut self.content, id)
    }

    /// Every block's props in range and block ids unique
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let mut result = Ok(());
        self.walk(&mut |block, _| {
            if result.is_err() {
                return;
            }
            if let Err(e) = block.validate() {
                result = Err(e);
            } else if !block.id().is_empty() && !seen.insert(block.id().to_string()) {
                result = Err(PagesError::DuplicateId(block.id().to_string()));
            }
        });
        result
    }

    /// Give every block without an id a fresh one
    pub fn ensure_ids(&mut self) {
        fn go(blocks: &mut [Block]) {
            for block in blocks {
                if block.id().is_empty() {
                    block.common_mut().id = uuid::Uuid::new_v4().to_string();
                }
                if let Some(children) = block.children_mut() {
                    go(children);
                }
            }
        }
        go(&mut self.content);
    }

    /// Languages that appear in any translation overlay
    pub fn localized_languages(&self) -> Vec<String> {
        let mut langs: BTreeSet<String> = self.root.props.translations.keys().cloned().collect();
        self.walk(&mut |block, _| langs.extend(block.common().translations.keys().cloned()));
        langs.into_iter().collect()
    }

    /// `(block id, field)` pairs with base text but no overlay in `lang`
    pub fn missing_translations(&self, lang: &str) -> Vec<(String, String)> {
        let mut missing = vec![];
        self.walk(&mut |block, _| {
            for key in block.translatable_keys() {
                let has_base = block.base_text(&key).is_some_and(|t| !t.trim().is_empty());
                let translated = block
                    .common()
                    .translations
                    .get(lang)
                    .and_then(|fields| fields.get(&key))
                    .is_some_and(|t| !t.trim().is_empty());
                if has_base && !translated {
                    missing.push((block.id().to_string(), key));
                }
            }
        });
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockKind;

    const SAMPLE: &str = r#"{
        "content": [
            { "type": "Hero", "props": { "id": "hero", "title": "Welcome home",
              "translations": { "es": { "title": "Bienvenido" } } } },
            { "type": "Grid", "props": { "id": "grid", "columns": 2, "children": [
                { "type": "Text", "props": { "id": "left", "text": "Worship 10am" } },
                { "type": "Button", "props": { "id": "right", "label": "Directions", "href": "/visit",
                  "translations": { "ko": { "label": "오시는 길" } } } }
            ] } }
        ],
        "root": { "props": { "title": "Home" } }
    }"#;

    #[test]
    fn test_parse_nested_document() {
        let doc = PageDocument::from_json(SAMPLE).unwrap();
        assert_eq!(doc.root.props.title, "Home");
        assert_eq!(doc.block_count(), 4);
        assert_eq!(doc.find("right").map(|b| b.kind()), Some(BlockKind::Button));

        let mut depths = vec![];
        doc.walk(&mut |block, depth| depths.push((block.id().to_string(), depth)));
        assert_eq!(depths[2], ("left".to_string(), 1));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids_and_bad_props() {
        let dup = SAMPLE.replace("\"id\": \"right\"", "\"id\": \"left\"");
        assert!(matches!(PageDocument::from_json(&dup), Err(PagesError::DuplicateId(id)) if id == "left"));

        let bad = SAMPLE.replace("\"columns\": 2", "\"columns\": 0");
        assert!(matches!(PageDocument::from_json(&bad), Err(PagesError::InvalidProps { .. })));

        assert!(matches!(
            PageDocument::from_json(r#"{ "content": [{ "type": "Marquee", "props": {} }] }"#),
            Err(PagesError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_languages_and_missing_translations() {
        let doc = PageDocument::from_json(SAMPLE).unwrap();
        assert_eq!(doc.localized_languages(), vec!["es", "ko"]);

        let missing = doc.missing_translations("es");
        assert!(missing.contains(&("left".to_string(), "text".to_string())));
        assert!(missing.contains(&("right".to_string(), "label".to_string())));
        assert!(!missing.iter().any(|(id, field)| id == "hero" && field == "title"));
    }

    #[test]
    fn test_ensure_ids_and_find_mut() {
        let mut doc = PageDocument::new("About");
        let mut grid = BlockKind::Grid.default_block();
        let mut text = BlockKind::Text.default_block();
        text.common_mut().id.clear();
        grid.children_mut().unwrap().push(text);
        doc.content.push(grid);

        doc.ensure_ids();
        let child_id = doc.content[0].children()[0].id().to_string();
        assert!(!child_id.is_empty());

        doc.find_mut(&child_id).unwrap().common_mut().set_translation("es", "text", "Hola");
        assert_eq!(doc.missing_translations("es").len(), 0);
    }
}
