use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChatCategory {
    Logs,
    Vicinity,
    Private,
    Group,
    Guild,
    Trade,
    Community,
    Recruitment,
    Politics,
    Pvp,
    #[default]
    Other,
}

impl ChatCategory {
    pub const ALL: [ChatCategory; 11] = [
        ChatCategory::Logs,
        ChatCategory::Vicinity,
        ChatCategory::Private,
        ChatCategory::Group,
        ChatCategory::Guild,
        ChatCategory::Trade,
        ChatCategory::Community,
        ChatCategory::Recruitment,
        ChatCategory::Politics,
        ChatCategory::Pvp,
        ChatCategory::Other,
    ];

    /// Channel colour as RGB.
    pub fn color(&self) -> [u8; 3] {
        match self {
            ChatCategory::Vicinity => [0xcc, 0xcc, 0xcc],
            ChatCategory::Private => [0x00, 0xe1, 0xff],
            ChatCategory::Group => [0xaa, 0x66, 0xff],
            ChatCategory::Guild => [0xff, 0xaa, 0x00],
            ChatCategory::Trade => [0xdd, 0x77, 0x00],
            ChatCategory::Politics => [0xff, 0xff, 0x00],
            ChatCategory::Pvp => [0x00, 0xaa, 0xaa],
            ChatCategory::Community => [0x33, 0x66, 0xff],
            ChatCategory::Recruitment => [0xff, 0x22, 0x55],
            ChatCategory::Logs => [0xbb, 0xbb, 0xbb],
            ChatCategory::Other => [0x88, 0x88, 0x88],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChatCategory::Logs => "Logs",
            ChatCategory::Vicinity => "Vicinity",
            ChatCategory::Private => "Private",
            ChatCategory::Group => "Group",
            ChatCategory::Guild => "Guild",
            ChatCategory::Trade => "Trade",
            ChatCategory::Community => "Community",
            ChatCategory::Recruitment => "Recruitment",
            ChatCategory::Politics => "Politics",
            ChatCategory::Pvp => "PvP",
            ChatCategory::Other => "Other",
        }
    }
}

/// Styling attached to a run of message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Highlight {
    Plain,
    Bold,
    Kamas,
    Number,
    Damage,
    Resistance,
    Level,
    Element(crate::models::combat::Element),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub highlight: Highlight,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), highlight: Highlight::Plain }
    }

    pub fn new(text: impl Into<String>, highlight: Highlight) -> Self {
        Self { text: text.into(), highlight }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub time: String,
    pub channel: String,
    pub author: String,
    pub message: String,
    pub category: ChatCategory,
    pub spans: Vec<Span>,
    /// Seconds the game asked the player to wait before posting again.
    pub cooldown_seconds: Option<u32>,
}

impl ChatMessage {
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    fn search_text(&self) -> String {
        format!("[{}] {} {}", self.channel, self.author, self.message).to_lowercase()
    }
}

/// Feed filter. Vicinity and private messages stay visible under any
/// single-category filter; logs only show under their own filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChatFilter {
    #[default]
    All,
    Only(ChatCategory),
}

impl ChatFilter {
    pub fn shows(&self, category: ChatCategory) -> bool {
        match self {
            ChatFilter::All => category != ChatCategory::Logs,
            ChatFilter::Only(ChatCategory::Logs) => category == ChatCategory::Logs,
            ChatFilter::Only(wanted) => {
                category == *wanted
                    || matches!(category, ChatCategory::Vicinity | ChatCategory::Private)
            }
        }
    }

    /// Category filter plus an optional case-insensitive search term.
    pub fn is_visible(&self, message: &ChatMessage, search: &str) -> bool {
        if !self.shows(message.category) {
            return false;
        }
        let term = search.trim().to_lowercase();
        term.is_empty() || message.search_text().contains(&term)
    }
}
