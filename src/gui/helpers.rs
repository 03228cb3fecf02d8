use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use eframe::egui::Color32;
use crate::models::{ChannelStore, ChatCategory, Element, Highlight, Roster};

/// Changes whenever anything that affects the bar list changes, so the
/// sorted rows are only rebuilt when needed.
pub fn compute_store_hash(store: &ChannelStore, roster: &Roster, salt: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    salt.hash(&mut hasher);

    let mut actors: Vec<_> = store.iter().collect();
    actors.sort_by(|a, b| a.name.cmp(&b.name));
    for actor in actors {
        actor.name.hash(&mut hasher);
        actor.total.hash(&mut hasher);
        actor.abilities.len().hash(&mut hasher);
    }

    // BTreeMaps iterate in order
    for (actor, allegiance) in &roster.overrides {
        actor.hash(&mut hasher);
        allegiance.hash(&mut hasher);
    }
    roster.classes.len().hash(&mut hasher);
    roster.summon_bindings.len().hash(&mut hasher);

    hasher.finish()
}

pub fn element_color(element: Option<Element>) -> Color32 {
    match element {
        Some(Element::Fire) => Color32::from_rgb(255, 120, 60),
        Some(Element::Water) => Color32::from_rgb(80, 170, 255),
        Some(Element::Earth) => Color32::from_rgb(150, 200, 80),
        Some(Element::Air) => Color32::from_rgb(200, 140, 255),
        Some(Element::Light) => Color32::from_rgb(255, 230, 120),
        Some(Element::Stasis) => Color32::from_rgb(120, 200, 200),
        Some(Element::Neutral) | None => Color32::from_gray(190),
    }
}

pub fn category_color(category: ChatCategory) -> Color32 {
    let [r, g, b] = category.color();
    Color32::from_rgb(r, g, b)
}

/// Text colour for a markup span, falling back to the message's channel colour.
pub fn highlight_color(highlight: Highlight, base: Color32) -> Color32 {
    match highlight {
        Highlight::Plain | Highlight::Bold => base,
        Highlight::Kamas => Color32::from_rgb(255, 215, 0),
        Highlight::Number => Color32::from_rgb(135, 206, 250),
        Highlight::Damage => Color32::from_rgb(255, 90, 90),
        Highlight::Resistance => Color32::from_rgb(120, 220, 160),
        Highlight::Level => Color32::from_rgb(255, 170, 0),
        Highlight::Element(element) => element_color(Some(element)),
    }
}

pub const ALLY_BAR: Color32 = Color32::from_rgb(50, 110, 200);
pub const ENEMY_BAR: Color32 = Color32::from_rgb(200, 50, 50);
