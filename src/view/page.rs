//! Page surface: applies view patches to a concrete page
//!
//! [`PageSurface`] is the seam between the pure planner and whatever UI
//! actually shows the entity. [`Page`] is the in-memory implementation used
//! by the renderer, the preview binary and the tests; it serializes to HTML.

use crate::core::config::RendererConfig;
use crate::interaction::ClickDelay;
use crate::view::patch::{Anchor, ViewNode, ViewPatch};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

/// What the page says about the auto-init container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerProbe {
    /// No container element on the page
    Missing,
    /// Container present; carries the source attribute value if set
    Present(Option<String>),
}

/// Anything the renderer can write an entity into
pub trait PageSurface {
    /// Apply one patch. Returns false when the target anchor is absent.
    fn apply(&mut self, patch: &ViewPatch) -> bool;

    fn links(&self) -> &[Link];

    fn links_mut(&mut self) -> &mut [Link];

    /// Add a class to the page body (idempotent)
    fn add_body_class(&mut self, class: &str);

    /// Look up the auto-init container and its source attribute
    fn probe_container(&self, config: &RendererConfig) -> ContainerProbe;
}

/// An anchor region as the page currently shows it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    pub text: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<ViewNode>,
}

/// An `<a>` element on the page
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub href: Option<String>,
    pub classes: Vec<String>,
    pub label: String,
    /// Click-delay handler attached by the renderer, if any
    pub click_delay: Option<ClickDelay>,
}

impl Link {
    pub fn new(href: Option<&str>, classes: &str, label: &str) -> Self {
        Self {
            href: href.map(str::to_string),
            classes: classes.split_whitespace().map(str::to_string).collect(),
            label: label.to_string(),
            click_delay: None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Container {
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
}

/// In-memory entity page
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub document_title: String,
    pub body_classes: BTreeSet<String>,
    regions: BTreeMap<Anchor, Region>,
    container: Option<Container>,
    links: Vec<Link>,
}

impl Page {
    /// A blank page: no anchors, no container, no links
    pub fn new() -> Self {
        Self::default()
    }

    /// The conventional entity page: every anchor, a `main.container`
    /// (with `data-json` when `source` is given) and a back link
    pub fn standard(source: Option<&str>) -> Self {
        let mut page = Anchor::ALL
            .iter()
            .fold(Page::new(), |page, anchor| page.with_anchor(*anchor))
            .with_container("container", source.map(|s| ("data-json", s)))
            .with_link(Link::new(Some("../index.html"), "back-button", "Back"));
        page.document_title = "Entity".to_string();
        page
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.regions.entry(anchor).or_default();
        self
    }

    pub fn with_container(mut self, classes: &str, attribute: Option<(&str, &str)>) -> Self {
        let mut container = Container {
            classes: classes.split_whitespace().map(str::to_string).collect(),
            attributes: BTreeMap::new(),
        };
        if let Some((name, value)) = attribute {
            container.attributes.insert(name.to_string(), value.to_string());
        }
        self.container = Some(container);
        self
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    pub fn region(&self, anchor: Anchor) -> Option<&Region> {
        self.regions.get(&anchor)
    }

    /// Text of an anchor, `None` if the page lacks it
    pub fn text(&self, anchor: Anchor) -> Option<&str> {
        self.region(anchor).map(|r| r.text.as_str())
    }

    pub fn attribute(&self, anchor: Anchor, name: &str) -> Option<&str> {
        self.region(anchor)
            .and_then(|r| r.attributes.get(name))
            .map(String::as_str)
    }

    /// Children appended under an anchor (empty if absent)
    pub fn children(&self, anchor: Anchor) -> &[ViewNode] {
        self.region(anchor)
            .map(|r| r.children.as_slice())
            .unwrap_or(&[])
    }

    /// Serialize the page as an HTML document
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(html, "<title>{}</title>", escape(&self.document_title));
        html.push_str("</head>\n");

        if self.body_classes.is_empty() {
            html.push_str("<body>\n");
        } else {
            let classes: Vec<&str> = self.body_classes.iter().map(String::as_str).collect();
            let _ = writeln!(html, "<body class=\"{}\">", escape(&classes.join(" ")));
        }

        let inner = self.body_html();
        match &self.container {
            Some(container) => {
                html.push_str("<main");
                if !container.classes.is_empty() {
                    let _ = write!(html, " class=\"{}\"", escape(&container.classes.join(" ")));
                }
                for (name, value) in &container.attributes {
                    let _ = write!(html, " {}=\"{}\"", name, escape(value));
                }
                html.push_str(">\n");
                html.push_str(&inner);
                html.push_str("</main>\n");
            }
            None => html.push_str(&inner),
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    fn body_html(&self) -> String {
        let mut html = String::new();
        for link in &self.links {
            html.push_str("<a");
            if !link.classes.is_empty() {
                let _ = write!(html, " class=\"{}\"", escape(&link.classes.join(" ")));
            }
            if let Some(href) = &link.href {
                let _ = write!(html, " href=\"{}\"", escape(href));
            }
            let _ = writeln!(html, ">{}</a>", escape(&link.label));
        }

        for (anchor, region) in &self.regions {
            write_region(&mut html, *anchor, region);
        }
        html
    }
}

impl PageSurface for Page {
    fn apply(&mut self, patch: &ViewPatch) -> bool {
        if let ViewPatch::SetDocumentTitle { title } = patch {
            self.document_title = title.clone();
            return true;
        }

        let Some(anchor) = patch.anchor() else {
            return false;
        };
        let Some(region) = self.regions.get_mut(&anchor) else {
            tracing::trace!("Anchor {} absent, skipping patch", anchor.selector());
            return false;
        };

        match patch {
            ViewPatch::SetText { text, .. } => {
                region.children.clear();
                region.text = text.clone();
            }
            ViewPatch::SetAttribute { name, value, .. } => {
                region.attributes.insert(name.to_string(), value.clone());
            }
            ViewPatch::Clear { .. } => {
                region.children.clear();
                region.text.clear();
            }
            ViewPatch::Append { node, .. } => region.children.push(node.clone()),
            ViewPatch::SetDocumentTitle { .. } => return false,
        }
        true
    }

    fn links(&self) -> &[Link] {
        &self.links
    }

    fn links_mut(&mut self) -> &mut [Link] {
        &mut self.links
    }

    fn add_body_class(&mut self, class: &str) {
        self.body_classes.insert(class.to_string());
    }

    fn probe_container(&self, config: &RendererConfig) -> ContainerProbe {
        match &self.container {
            Some(c) if c.classes.iter().any(|class| *class == config.container_class) => {
                ContainerProbe::Present(c.attributes.get(&config.source_attribute).cloned())
            }
            _ => ContainerProbe::Missing,
        }
    }
}

/// Element the conventional markup uses for each anchor, with the
/// identifying attribute
fn anchor_element(anchor: Anchor) -> (&'static str, &'static str) {
    let selector = anchor.selector();
    let tag = match anchor {
        Anchor::Title => "h1",
        Anchor::Subtitle | Anchor::Lore => "p",
        Anchor::Portrait => "img",
        Anchor::StatsList | Anchor::AttacksGrid | Anchor::AbilitiesWrap => "div",
    };
    (tag, selector)
}

fn write_region(html: &mut String, anchor: Anchor, region: &Region) {
    let (tag, selector) = anchor_element(anchor);
    let _ = write!(html, "<{}", tag);
    if let Some(id) = selector.strip_prefix('#') {
        let _ = write!(html, " id=\"{}\"", id);
    } else if let Some(class) = selector.strip_prefix('.') {
        let _ = write!(html, " class=\"{}\"", class);
    }
    for (name, value) in &region.attributes {
        let _ = write!(html, " {}=\"{}\"", name, escape(value));
    }

    if tag == "img" {
        html.push_str(">\n");
        return;
    }

    html.push('>');
    html.push_str(&escape(&region.text));
    for child in &region.children {
        write_node(html, child);
    }
    let _ = writeln!(html, "</{}>", tag);
}

fn write_node(html: &mut String, node: &ViewNode) {
    let _ = write!(html, "<{}", node.tag);
    if !node.classes.is_empty() {
        let _ = write!(html, " class=\"{}\"", node.classes.join(" "));
    }
    html.push('>');
    if let Some(text) = &node.text {
        html.push_str(&escape(text));
    }
    for child in &node.children {
        write_node(html, child);
    }
    let _ = write!(html, "</{}>", node.tag);
}

/// Escape text for use in HTML content and double-quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
