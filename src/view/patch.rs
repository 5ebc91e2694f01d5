//! Document → view-patch planning
//!
//! [`plan`] is pure: it turns an [`EntityDocument`] into the ordered list of
//! mutations a page needs (meta, lore, stats, attacks, abilities). All label
//! formatting and conditional line selection happens here, so none of it
//! depends on the surface that eventually applies the patches.

use crate::document::{format_number, Ability, Attack, AttackGroup, EntityDocument, Meta};
use serde::Serialize;

/// Heading shown above the abilities panel
pub const ABILITIES_HEADING: &str = "Other Abilities";

/// Alt text for the portrait when the document names nobody
pub const PORTRAIT_FALLBACK_ALT: &str = "ritratto";

/// Named regions of the host page the renderer writes into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Title,
    Subtitle,
    Portrait,
    Lore,
    StatsList,
    AttacksGrid,
    AbilitiesWrap,
}

impl Anchor {
    pub const ALL: [Anchor; 7] = [
        Anchor::Title,
        Anchor::Subtitle,
        Anchor::Portrait,
        Anchor::Lore,
        Anchor::StatsList,
        Anchor::AttacksGrid,
        Anchor::AbilitiesWrap,
    ];

    /// CSS selector of the anchor in the conventional page markup
    pub fn selector(&self) -> &'static str {
        match self {
            Anchor::Title => "#entity-title",
            Anchor::Subtitle => ".entity-human",
            Anchor::Portrait => "#portrait-img",
            Anchor::Lore => "#lore",
            Anchor::StatsList => "#stats-list",
            Anchor::AttacksGrid => "#attacks-grid",
            Anchor::AbilitiesWrap => "#abilities-wrap",
        }
    }
}

/// A detached element to be appended under an anchor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewNode {
    pub tag: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// `div` with the given space-separated classes
    pub fn div(classes: &'static str) -> Self {
        Self::new("div").with_classes(classes)
    }

    pub fn with_classes(mut self, classes: &'static str) -> Self {
        self.classes.extend(classes.split_whitespace());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: ViewNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| *c == class)
    }

    /// Concatenated text of this node and its descendants, depth-first
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone().unwrap_or_default();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }

    /// Depth-first search for descendants (self included) carrying `class`
    pub fn find_by_class<'a>(&'a self, class: &str, out: &mut Vec<&'a ViewNode>) {
        if self.has_class(class) {
            out.push(self);
        }
        for child in &self.children {
            child.find_by_class(class, out);
        }
    }
}

/// One mutation of the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ViewPatch {
    SetText { anchor: Anchor, text: String },
    SetAttribute {
        anchor: Anchor,
        name: &'static str,
        value: String,
    },
    /// Remove every child of the anchor
    Clear { anchor: Anchor },
    Append { anchor: Anchor, node: ViewNode },
    SetDocumentTitle { title: String },
}

impl ViewPatch {
    pub fn anchor(&self) -> Option<Anchor> {
        match self {
            ViewPatch::SetText { anchor, .. }
            | ViewPatch::SetAttribute { anchor, .. }
            | ViewPatch::Clear { anchor }
            | ViewPatch::Append { anchor, .. } => Some(*anchor),
            ViewPatch::SetDocumentTitle { .. } => None,
        }
    }
}

/// Plan the full render of a document, in page order
pub fn plan(doc: &EntityDocument) -> Vec<ViewPatch> {
    let mut patches = Vec::new();
    if let Some(meta) = &doc.meta {
        plan_meta(meta, &mut patches);
    }
    plan_lore(doc.lore.as_deref(), &mut patches);
    plan_stats(doc, &mut patches);
    plan_attacks(&doc.attacks, &mut patches);
    plan_abilities(&doc.abilities, &mut patches);
    patches
}

pub fn plan_meta(meta: &Meta, patches: &mut Vec<ViewPatch>) {
    let entity = meta.entity.as_deref().unwrap_or("");
    let human = meta.human_name.as_deref().unwrap_or("");

    patches.push(ViewPatch::SetText {
        anchor: Anchor::Title,
        text: entity.to_string(),
    });
    patches.push(ViewPatch::SetText {
        anchor: Anchor::Subtitle,
        text: human.to_string(),
    });

    if let Some(portrait) = &meta.portrait {
        patches.push(ViewPatch::SetAttribute {
            anchor: Anchor::Portrait,
            name: "src",
            value: portrait.clone(),
        });
    }
    let alt = meta
        .entity
        .as_deref()
        .or(meta.human_name.as_deref())
        .unwrap_or(PORTRAIT_FALLBACK_ALT);
    patches.push(ViewPatch::SetAttribute {
        anchor: Anchor::Portrait,
        name: "alt",
        value: alt.to_string(),
    });

    if !entity.is_empty() || !human.is_empty() {
        patches.push(ViewPatch::SetDocumentTitle {
            title: format_document_title(entity, human),
        });
    }
}

pub fn plan_lore(lore: Option<&str>, patches: &mut Vec<ViewPatch>) {
    patches.push(ViewPatch::SetText {
        anchor: Anchor::Lore,
        text: lore.unwrap_or("").to_string(),
    });
}

pub fn plan_stats(doc: &EntityDocument, patches: &mut Vec<ViewPatch>) {
    patches.push(ViewPatch::Clear {
        anchor: Anchor::StatsList,
    });
    for (key, value) in doc.ordered_stats() {
        let row = ViewNode::div("stat")
            .with_child(ViewNode::div("label").with_text(format_stat_label(key)))
            .with_child(ViewNode::div("value").with_text(value.to_string()));
        patches.push(ViewPatch::Append {
            anchor: Anchor::StatsList,
            node: row,
        });
    }
}

pub fn plan_attacks(groups: &[AttackGroup], patches: &mut Vec<ViewPatch>) {
    patches.push(ViewPatch::Clear {
        anchor: Anchor::AttacksGrid,
    });
    for group in groups {
        let mut col = ViewNode::div("attacks-col").with_child(group_title(&group.group));
        for attack in &group.items {
            col = col.with_child(attack_box(attack));
        }
        patches.push(ViewPatch::Append {
            anchor: Anchor::AttacksGrid,
            node: col,
        });
    }
}

pub fn plan_abilities(abilities: &[Ability], patches: &mut Vec<ViewPatch>) {
    patches.push(ViewPatch::Clear {
        anchor: Anchor::AbilitiesWrap,
    });
    if abilities.is_empty() {
        return;
    }

    patches.push(ViewPatch::Append {
        anchor: Anchor::AbilitiesWrap,
        node: group_title(ABILITIES_HEADING),
    });
    for ability in abilities {
        patches.push(ViewPatch::Append {
            anchor: Anchor::AbilitiesWrap,
            node: ability_box(ability),
        });
    }
}

fn group_title(title: &str) -> ViewNode {
    ViewNode::new("h3")
        .with_classes("attack-group-title")
        .with_text(title)
}

/// `attack` box: a name/description block followed by a numbers block
fn entry_box(name: &str, desc: Option<&str>, numbers: Vec<ViewNode>) -> ViewNode {
    let meta = ViewNode::div("meta")
        .with_child(ViewNode::div("name").with_text(name))
        .with_child(ViewNode::div("desc muted").with_text(desc.unwrap_or("")));

    let numbers = numbers
        .into_iter()
        .fold(ViewNode::div("numbers"), ViewNode::with_child);

    ViewNode::div("attack").with_child(meta).with_child(numbers)
}

fn attack_box(attack: &Attack) -> ViewNode {
    entry_box(&attack.name, attack.desc.as_deref(), attack_lines(attack))
}

fn ability_box(ability: &Ability) -> ViewNode {
    entry_box(&ability.name, ability.desc.as_deref(), ability_lines(ability))
}

/// Damage and energy-cost lines, each only when the field is present
pub fn attack_lines(attack: &Attack) -> Vec<ViewNode> {
    let mut lines = Vec::new();
    if let Some(damage) = attack.damage {
        lines.push(ViewNode::div("dmg").with_text(format!("Danno: {}", format_number(damage))));
    }
    if let Some(cost) = attack.energy_cost {
        lines.push(energy_cost_line(cost));
    }
    lines
}

/// Percent-effect lines when `effects` exists, otherwise the energy-cost
/// line. Never both.
pub fn ability_lines(ability: &Ability) -> Vec<ViewNode> {
    let mut lines = Vec::new();
    match (&ability.effects, ability.energy_cost) {
        (Some(effects), _) => {
            if let Some(health) = effects.health_percent {
                lines.push(
                    ViewNode::div("dmg").with_text(format!("Health: +{}%", format_number(health))),
                );
            }
            if let Some(energy) = effects.energy_percent {
                lines.push(
                    ViewNode::div("cost")
                        .with_text(format!("Energies: +{}%", format_number(energy))),
                );
            }
        }
        (None, Some(cost)) => lines.push(energy_cost_line(cost)),
        (None, None) => {}
    }
    lines
}

fn energy_cost_line(cost: f64) -> ViewNode {
    ViewNode::div("cost").with_text(format!("Energia: {}", format_number(cost)))
}

/// `maxHealth` → `Max Health`: a space before every internal ASCII capital,
/// first character uppercased
pub fn format_stat_label(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            label.extend(c.to_uppercase());
        } else {
            if c.is_ascii_uppercase() {
                label.push(' ');
            }
            label.push(c);
        }
    }
    label
}

/// `"{entity} — {human}"`, trimmed
pub fn format_document_title(entity: &str, human: &str) -> String {
    format!("{} — {}", entity, human).trim().to_string()
}
