//! Block catalogue
//!
//! A page is a list of [`Block`]s persisted as `{ type, props }`. The set
//! of kinds is closed; each kind has its own props struct whose `Default`
//! is what the builder drops onto the canvas.

use crate::error::{PagesError, Result};
use crate::translations::{overlay, Translations};
use serde::{Deserialize, Serialize};

/// Props every block carries
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockCommon {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Translations::is_empty")]
    pub translations: Translations,
}

impl BlockCommon {
    fn with_new_id() -> Self {
        Self { id: uuid::Uuid::new_v4().to_string(), translations: Translations::new() }
    }

    /// Text for `field` in `lang`, falling back to the base value
    pub fn text<'a>(&'a self, lang: Option<&str>, field: &str, base: &'a str) -> &'a str {
        overlay(&self.translations, lang, field).unwrap_or(base)
    }

    pub fn set_translation(&mut self, lang: &str, field: &str, value: impl Into<String>) {
        self.translations
            .entry(lang.to_string())
            .or_default()
            .insert(field.to_string(), value.into());
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    Small,
    #[default]
    Base,
    Large,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Outline,
}

// =============================================================================
// Props
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroProps {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub title: String,
    pub subtitle: String,
    pub background_image: String,
    pub button_label: String,
    pub button_href: String,
    pub align: Align,
}

impl Default for HeroProps {
    fn default() -> Self {
        Self {
            common: BlockCommon::default(),
            title: "Welcome".into(),
            subtitle: "Join us this Sunday".into(),
            background_image: String::new(),
            button_label: String::new(),
            button_href: String::new(),
            align: Align::Center,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextProps {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub text: String,
    pub align: Align,
    pub size: TextSize,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            common: BlockCommon::default(),
            text: "Write something here".into(),
            align: Align::Left,
            size: TextSize::Base,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeadingProps {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub text: String,
    pub level: u8,
    pub align: Align,
}

impl Default for HeadingProps {
    fn default() -> Self {
        Self { common: BlockCommon::default(), text: "Heading".into(), level: 2, align: Align::Left }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonProps {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub label: String,
    pub href: String,
    pub variant: ButtonVariant,
    pub open_in_new_tab: bool,
}

impl Default for ButtonProps {
    fn default() -> Self {
        Self {
            common: BlockCommon::default(),
            label: "Learn more".into(),
            href: "#".into(),
            variant: ButtonVariant::Primary,
            open_in_new_tab: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProps {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub src: String,
    pub alt: String,
    pub caption: String,
    pub width: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridProps {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub columns: u8,
    pub gap: u32,
    /// Slot holding nested blocks
    pub children: Vec<Block>,
}

impl Default for GridProps {
    fn default() -> Self {
        Self { common: BlockCommon::default(), columns: 2, gap: 16, children: vec![] }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatItem {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsProps {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub items: Vec<StatItem>,
}

impl Default for StatsProps {
    fn default() -> Self {
        Self {
            common: BlockCommon::default(),
            items: vec![
                StatItem { label: "Members".into(), value: "250".into() },
                StatItem { label: "Ministries".into(), value: "12".into() },
                StatItem { label: "Years serving".into(), value: "40".into() },
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpacerProps {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub height: u32,
}

impl Default for SpacerProps {
    fn default() -> Self {
        Self { common: BlockCommon::default(), height: 32 }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DividerProps {
    #[serde(flatten)]
    pub common: BlockCommon,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoProps {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub url: String,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallToActionProps {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub heading: String,
    pub body: String,
    pub button_label: String,
    pub button_href: String,
}

impl Default for CallToActionProps {
    fn default() -> Self {
        Self {
            common: BlockCommon::default(),
            heading: "Plan your visit".into(),
            body: "We would love to meet you.".into(),
            button_label: "Get directions".into(),
            button_href: "#".into(),
        }
    }
}

// =============================================================================
// Block
// =============================================================================

/// A placed block, persisted as `{ "type": ..., "props": ... }`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "props")]
pub enum Block {
    Hero(HeroProps),
    Text(TextProps),
    Heading(HeadingProps),
    Button(ButtonProps),
    Image(ImageProps),
    Grid(GridProps),
    Stats(StatsProps),
    Spacer(SpacerProps),
    Divider(DividerProps),
    Video(VideoProps),
    CallToAction(CallToActionProps),
}

macro_rules! each_props {
    ($block:expr, $props:ident => $body:expr) => {
        match $block {
            Block::Hero($props) => $body,
            Block::Text($props) => $body,
            Block::Heading($props) => $body,
            Block::Button($props) => $body,
            Block::Image($props) => $body,
            Block::Grid($props) => $body,
            Block::Stats($props) => $body,
            Block::Spacer($props) => $body,
            Block::Divider($props) => $body,
            Block::Video($props) => $body,
            Block::CallToAction($props) => $body,
        }
    };
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Hero(_) => BlockKind::Hero,
            Block::Text(_) => BlockKind::Text,
            Block::Heading(_) => BlockKind::Heading,
            Block::Button(_) => BlockKind::Button,
            Block::Image(_) => BlockKind::Image,
            Block::Grid(_) => BlockKind::Grid,
            Block::Stats(_) => BlockKind::Stats,
            Block::Spacer(_) => BlockKind::Spacer,
            Block::Divider(_) => BlockKind::Divider,
            Block::Video(_) => BlockKind::Video,
            Block::CallToAction(_) => BlockKind::CallToAction,
        }
    }

    pub fn common(&self) -> &BlockCommon {
        each_props!(self, p => &p.common)
    }

    pub fn common_mut(&mut self) -> &mut BlockCommon {
        each_props!(self, p => &mut p.common)
    }

    pub fn id(&self) -> &str {
        &self.common().id
    }

    /// Nested blocks of container kinds
    pub fn children(&self) -> &[Block] {
        match self {
            Block::Grid(p) => &p.children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            Block::Grid(p) => Some(&mut p.children),
            _ => None,
        }
    }

    /// Untranslated value of a translatable field
    pub fn base_text(&self, field: &str) -> Option<&str> {
        let text = match (self, field) {
            (Block::Hero(p), "title") => &p.title,
            (Block::Hero(p), "subtitle") => &p.subtitle,
            (Block::Hero(p), "buttonLabel") => &p.button_label,
            (Block::Text(p), "text") => &p.text,
            (Block::Heading(p), "text") => &p.text,
            (Block::Button(p), "label") => &p.label,
            (Block::Image(p), "alt") => &p.alt,
            (Block::Image(p), "caption") => &p.caption,
            (Block::Video(p), "title") => &p.title,
            (Block::CallToAction(p), "heading") => &p.heading,
            (Block::CallToAction(p), "body") => &p.body,
            (Block::CallToAction(p), "buttonLabel") => &p.button_label,
            (Block::Stats(p), key) => {
                let index: usize = key.strip_prefix("items.")?.strip_suffix(".label")?.parse().ok()?;
                &p.items.get(index)?.label
            }
            _ => return None,
        };
        Some(text.as_str())
    }

    /// Field keys the translation overlay may override
    pub fn translatable_keys(&self) -> Vec<String> {
        match self {
            Block::Stats(p) => (0..p.items.len()).map(|i| format!("items.{}.label", i)).collect(),
            other => other
                .kind()
                .fields()
                .into_iter()
                .filter(|f| f.translatable)
                .map(|f| f.name.to_string())
                .collect(),
        }
    }

    /// Range checks the editor enforces on numeric props
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| PagesError::InvalidProps {
            block: format!("{}({})", self.kind().label(), self.id()),
            reason,
        };
        match self {
            Block::Grid(p) if !(1..=6).contains(&p.columns) => {
                Err(invalid(format!("columns must be 1-6, got {}", p.columns)))
            }
            Block::Heading(p) if !(1..=6).contains(&p.level) => {
                Err(invalid(format!("level must be 1-6, got {}", p.level)))
            }
            Block::Spacer(p) if p.height > 400 => {
                Err(invalid(format!("height must be at most 400, got {}", p.height)))
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Kinds and editable fields
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Hero,
    Text,
    Heading,
    Button,
    Image,
    Grid,
    Stats,
    Spacer,
    Divider,
    Video,
    CallToAction,
}

/// Input control shown in the property panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorInput {
    Text,
    Textarea,
    Url,
    Number { min: i64, max: i64 },
    Select { options: &'static [&'static str] },
    Toggle,
    List,
    Slot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditableField {
    pub name: &'static str,
    pub label: &'static str,
    pub input: EditorInput,
    pub translatable: bool,
}

const fn field(name: &'static str, label: &'static str, input: EditorInput, translatable: bool) -> EditableField {
    EditableField { name, label, input, translatable }
}

const ALIGN: EditorInput = EditorInput::Select { options: &["left", "center", "right"] };

impl BlockKind {
    pub const ALL: [BlockKind; 11] = [
        BlockKind::Hero,
        BlockKind::Text,
        BlockKind::Heading,
        BlockKind::Button,
        BlockKind::Image,
        BlockKind::Grid,
        BlockKind::Stats,
        BlockKind::Spacer,
        BlockKind::Divider,
        BlockKind::Video,
        BlockKind::CallToAction,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Hero => "Hero",
            BlockKind::Text => "Text",
            BlockKind::Heading => "Heading",
            BlockKind::Button => "Button",
            BlockKind::Image => "Image",
            BlockKind::Grid => "Grid",
            BlockKind::Stats => "Stats",
            BlockKind::Spacer => "Spacer",
            BlockKind::Divider => "Divider",
            BlockKind::Video => "Video",
            BlockKind::CallToAction => "Call to action",
        }
    }

    pub fn fields(&self) -> Vec<EditableField> {
        use EditorInput::*;
        match self {
            BlockKind::Hero => vec![
                field("title", "Title", Text, true),
                field("subtitle", "Subtitle", Textarea, true),
                field("backgroundImage", "Background image", Url, false),
                field("buttonLabel", "Button label", Text, true),
                field("buttonHref", "Button link", Url, false),
                field("align", "Alignment", ALIGN, false),
            ],
            BlockKind::Text => vec![
                field("text", "Text", Textarea, true),
                field("align", "Alignment", ALIGN, false),
                field("size", "Size", Select { options: &["small", "base", "large"] }, false),
            ],
            BlockKind::Heading => vec![
                field("text", "Text", Text, true),
                field("level", "Level", Number { min: 1, max: 6 }, false),
                field("align", "Alignment", ALIGN, false),
            ],
            BlockKind::Button => vec![
                field("label", "Label", Text, true),
                field("href", "Link", Url, false),
                field("variant", "Style", Select { options: &["primary", "secondary", "outline"] }, false),
                field("openInNewTab", "Open in new tab", Toggle, false),
            ],
            BlockKind::Image => vec![
                field("src", "Image", Url, false),
                field("alt", "Alt text", Text, true),
                field("caption", "Caption", Text, true),
                field("width", "Width (px)", Number { min: 16, max: 2400 }, false),
            ],
            BlockKind::Grid => vec![
                field("columns", "Columns", Number { min: 1, max: 6 }, false),
                field("gap", "Gap (px)", Number { min: 0, max: 96 }, false),
                field("children", "Content", Slot, false),
            ],
            BlockKind::Stats => vec![field("items", "Items", List, false)],
            BlockKind::Spacer => vec![field("height", "Height (px)", Number { min: 0, max: 400 }, false)],
            BlockKind::Divider => vec![],
            BlockKind::Video => vec![
                field("url", "Video URL", Url, false),
                field("title", "Title", Text, true),
            ],
            BlockKind::CallToAction => vec![
                field("heading", "Heading", Text, true),
                field("body", "Body", Textarea, true),
                field("buttonLabel", "Button label", Text, true),
                field("buttonHref", "Button link", Url, false),
            ],
        }
    }

    /// A new instance with default props and a fresh id
    pub fn default_block(&self) -> Block {
        let common = BlockCommon::with_new_id();
        match self {
            BlockKind::Hero => Block::Hero(HeroProps { common, ..Default::default() }),
            BlockKind::Text => Block::Text(TextProps { common, ..Default::default() }),
            BlockKind::Heading => Block::Heading(HeadingProps { common, ..Default::default() }),
            BlockKind::Button => Block::Button(ButtonProps { common, ..Default::default() }),
            BlockKind::Image => Block::Image(ImageProps { common, ..Default::default() }),
            BlockKind::Grid => Block::Grid(GridProps { common, ..Default::default() }),
            BlockKind::Stats => Block::Stats(StatsProps { common, ..Default::default() }),
            BlockKind::Spacer => Block::Spacer(SpacerProps { common, ..Default::default() }),
            BlockKind::Divider => Block::Divider(DividerProps { common }),
            BlockKind::Video => Block::Video(VideoProps { common, ..Default::default() }),
            BlockKind::CallToAction => Block::CallToAction(CallToActionProps { common, ..Default::default() }),
        }
    }
}
