//! HTML render of blocks
//!
//! Rendering is a pure function of props and the active language. Text
//! goes through the translation overlay and is HTML-escaped; links with a
//! script scheme are replaced by `#`.

use crate::blocks::{Block, ButtonVariant, TextSize};
use crate::document::PageDocument;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

/// Render a whole page in `lang`
pub fn render_document(doc: &PageDocument, lang: Option<&str>) -> String {
    let mut out = String::new();
    let title = crate::translations::overlay(&doc.root.props.translations, lang, "title")
        .unwrap_or(doc.root.props.title.as_str());
    out.push_str(&format!("<main data-page-title=\"{}\">", attr(title)));
    for block in &doc.content {
        out.push_str(&render_block(block, lang));
    }
    out.push_str("</main>");
    out
}

/// Render one block (and its children) in `lang`
pub fn render_block(block: &Block, lang: Option<&str>) -> String {
    let mut out = String::new();
    let id = attr(block.id()).to_string();
    match block {
        Block::Hero(p) => {
            let c = &p.common;
            out.push_str(&format!("<section id=\"{}\" class=\"hero align-{}\"", id, p.align.as_str()));
            if !p.background_image.is_empty() {
                out.push_str(&format!(" style=\"background-image:url('{}')\"", attr(&css_url(&p.background_image))));
            }
            out.push('>');
            out.push_str(&format!("<h1>{}</h1>", text(c.text(lang, "title", &p.title))));
            let subtitle = c.text(lang, "subtitle", &p.subtitle);
            if !subtitle.is_empty() {
                out.push_str(&format!("<p>{}</p>", text(subtitle)));
            }
            let label = c.text(lang, "buttonLabel", &p.button_label);
            if !label.is_empty() {
                out.push_str(&format!("<a class=\"btn btn-primary\" href=\"{}\">{}</a>", attr(&safe_url(&p.button_href)), text(label)));
            }
            out.push_str("</section>");
        }
        Block::Text(p) => {
            let size = match p.size {
                TextSize::Small => "sm",
                TextSize::Base => "base",
                TextSize::Large => "lg",
            };
            out.push_str(&format!(
                "<div id=\"{}\" class=\"text text-{} align-{}\">{}</div>",
                id,
                size,
                p.align.as_str(),
                paragraphs(p.common.text(lang, "text", &p.text))
            ));
        }
        Block::Heading(p) => {
            let level = p.level.clamp(1, 6);
            out.push_str(&format!(
                "<h{level} id=\"{}\" class=\"align-{}\">{}</h{level}>",
                id,
                p.align.as_str(),
                text(p.common.text(lang, "text", &p.text)),
                level = level
            ));
        }
        Block::Button(p) => {
            let variant = match p.variant {
                ButtonVariant::Primary => "primary",
                ButtonVariant::Secondary => "secondary",
                ButtonVariant::Outline => "outline",
            };
            let target = if p.open_in_new_tab { " target=\"_blank\" rel=\"noopener noreferrer\"" } else { "" };
            out.push_str(&format!(
                "<a id=\"{}\" class=\"btn btn-{}\" href=\"{}\"{}>{}</a>",
                id,
                variant,
                attr(&safe_url(&p.href)),
                target,
                text(p.common.text(lang, "label", &p.label))
            ));
        }
        Block::Image(p) => {
            out.push_str(&format!("<figure id=\"{}\"><img src=\"{}\" alt=\"{}\"", id, attr(&safe_url(&p.src)), attr(p.common.text(lang, "alt", &p.alt))));
            if let Some(width) = p.width {
                out.push_str(&format!(" width=\"{}\"", width));
            }
            out.push_str(" loading=\"lazy\">");
            let caption = p.common.text(lang, "caption", &p.caption);
            if !caption.is_empty() {
                out.push_str(&format!("<figcaption>{}</figcaption>", text(caption)));
            }
            out.push_str("</figure>");
        }
        Block::Grid(p) => {
            out.push_str(&format!(
                "<div id=\"{}\" class=\"grid\" style=\"display:grid;grid-template-columns:repeat({},minmax(0,1fr));gap:{}px\">",
                id,
                p.columns.clamp(1, 6),
                p.gap
            ));
            for child in &p.children {
                out.push_str(&render_block(child, lang));
            }
            out.push_str("</div>");
        }
        Block::Stats(p) => {
            out.push_str(&format!("<dl id=\"{}\" class=\"stats\">", id));
            for (i, item) in p.items.iter().enumerate() {
                let key = format!("items.{}.label", i);
                out.push_str(&format!(
                    "<div class=\"stat\"><dt>{}</dt><dd>{}</dd></div>",
                    text(p.common.text(lang, &key, &item.label)),
                    text(&item.value)
                ));
            }
            out.push_str("</dl>");
        }
        Block::Spacer(p) => {
            out.push_str(&format!("<div id=\"{}\" class=\"spacer\" style=\"height:{}px\"></div>", id, p.height));
        }
        Block::Divider(_) => {
            out.push_str(&format!("<hr id=\"{}\">", id));
        }
        Block::Video(p) => {
            out.push_str(&format!(
                "<div id=\"{}\" class=\"video\"><iframe src=\"{}\" title=\"{}\" allowfullscreen></iframe></div>",
                id,
                attr(&embed_url(&p.url)),
                attr(p.common.text(lang, "title", &p.title))
            ));
        }
        Block::CallToAction(p) => {
            let c = &p.common;
            out.push_str(&format!(
                "<section id=\"{}\" class=\"cta\"><h2>{}</h2>{}",
                id,
                text(c.text(lang, "heading", &p.heading)),
                paragraphs(c.text(lang, "body", &p.body))
            ));
            let label = c.text(lang, "buttonLabel", &p.button_label);
            if !label.is_empty() {
                out.push_str(&format!("<a class=\"btn btn-primary\" href=\"{}\">{}</a>", attr(&safe_url(&p.button_href)), text(label)));
            }
            out.push_str("</section>");
        }
    }
    out
}

/// Blank-line separated paragraphs
fn paragraphs(body: &str) -> String {
    body.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", text(p).replace('\n', "<br>")))
        .collect()
}

/// Link target with script schemes replaced by `#`
///
/// Browsers drop tab and newline anywhere in a URL and ignore leading
/// control characters, so the scheme is read after doing the same.
fn safe_url(url: &str) -> String {
    let cleaned: String = url
        .trim_start_matches(|c: char| c <= ' ')
        .trim_end()
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();
    if let Some((scheme, _)) = cleaned.split_once(':') {
        let scheme = scheme.to_ascii_lowercase();
        if matches!(scheme.as_str(), "javascript" | "vbscript" | "data") {
            tracing::warn!(url = %cleaned, "dropping link with script scheme");
            return "#".to_string();
        }
    }
    cleaned
}

/// `safe_url` that can sit inside a single-quoted CSS `url('...')`
fn css_url(url: &str) -> String {
    safe_url(url)
        .replace('\\', "%5C")
        .replace('\'', "%27")
        .replace(['(', ')'], "")
}

/// Watch links from the common hosts become embeddable player links
fn embed_url(url: &str) -> String {
    let url = safe_url(url);
    if let Some(id) = url
        .strip_prefix("https://www.youtube.com/watch?v=")
        .or_else(|| url.strip_prefix("https://youtube.com/watch?v="))
        .or_else(|| url.strip_prefix("https://youtu.be/"))
    {
        let id = id.split(['&', '?']).next().unwrap_or(id);
        return format!("https://www.youtube.com/embed/{}", id);
    }
    if let Some(id) = url.strip_prefix("https://vimeo.com/") {
        return format!("https://player.vimeo.com/video/{}", id);
    }
    url
}
