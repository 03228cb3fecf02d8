use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedItem {
    pub name: String,
    pub current: u64,
    pub target: u64,
    /// Unit price in kamas, used for the value footer.
    #[serde(default)]
    pub price: u64,
}

impl TrackedItem {
    pub fn new(name: impl Into<String>, target: u64) -> Self {
        Self { name: name.into(), current: 0, target, price: 0 }
    }

    pub fn is_complete(&self) -> bool {
        self.target > 0 && self.current >= self.target
    }

    pub fn progress(&self) -> f32 {
        (self.current as f32 / self.target.max(1) as f32).min(1.0)
    }
}

/// Outcome of crediting one pickup to a tracked item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LootProgress {
    pub item: String,
    pub added: u64,
    pub current: u64,
    pub target: u64,
    pub goal_reached: bool,
}

pub fn normalize_item_name(name: &str) -> String {
    name.replace('\u{00A0}', " ").trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemTracker {
    items: Vec<TrackedItem>,
}

impl ItemTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `name`; re-tracking an existing item only updates its target.
    pub fn track(&mut self, name: &str, target: u64) {
        let key = normalize_item_name(name);
        match self.items.iter_mut().find(|i| normalize_item_name(&i.name) == key) {
            Some(existing) => existing.target = target,
            None => self.items.push(TrackedItem::new(name.trim(), target)),
        }
    }

    pub fn untrack(&mut self, name: &str) -> bool {
        let key = normalize_item_name(name);
        let before = self.items.len();
        self.items.retain(|i| normalize_item_name(&i.name) != key);
        before != self.items.len()
    }

    pub fn set_price(&mut self, name: &str, price: u64) {
        let key = normalize_item_name(name);
        for item in self.items.iter_mut().filter(|i| normalize_item_name(&i.name) == key) {
            item.price = price;
        }
    }

    /// Credits `quantity` to every tracked item named `item`.
    pub fn record(&mut self, item: &str, quantity: u64) -> Vec<LootProgress> {
        let key = normalize_item_name(item);
        let mut progress = Vec::new();
        for tracked in self.items.iter_mut() {
            if normalize_item_name(&tracked.name) != key {
                continue;
            }
            let was_complete = tracked.current >= tracked.target;
            tracked.current += quantity;
            progress.push(LootProgress {
                item: tracked.name.clone(),
                added: quantity,
                current: tracked.current,
                target: tracked.target,
                goal_reached: !was_complete && tracked.current >= tracked.target,
            });
        }
        progress
    }

    pub fn items(&self) -> &[TrackedItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// (current value, target value) in kamas.
    pub fn value_totals(&self) -> (u64, u64) {
        self.items.iter().fold((0, 0), |(cur, tar), item| {
            (cur + item.current * item.price, tar + item.target * item.price)
        })
    }
}
