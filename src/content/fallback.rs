//! Built-in fallback content
//!
//! Static quote and good-deed lists served whenever fetching yields nothing,
//! so every read endpoint has content even without network access.

use super::{CategoryBucket, ContentKind, Difficulty, Item, Theme};

/// A compile-time fallback entry
///
/// Uses `&'static str` so the catalog can live in a static array. Entries are
/// turned into validated [`Item`]s by [`fallback`].
#[derive(Debug, Clone, Copy)]
pub struct FallbackEntry {
    pub text: &'static str,
    pub author: Option<&'static str>,
    pub theme: Theme,
    pub difficulty: Option<Difficulty>,
}

/// Fallback spiritual quotes
pub static FALLBACK_QUOTES: [FallbackEntry; 5] = [
    FallbackEntry {
        text: "The mind is everything. What you think you become.",
        author: Some("Buddha"),
        theme: Theme::Spiritual,
        difficulty: None,
    },
    FallbackEntry {
        text: "Peace comes from within. Do not seek it without.",
        author: Some("Buddha"),
        theme: Theme::Spiritual,
        difficulty: None,
    },
    FallbackEntry {
        text: "Your task is not to seek for love, but merely to seek and find all the barriers within yourself.",
        author: Some("Rumi"),
        theme: Theme::Spiritual,
        difficulty: None,
    },
    FallbackEntry {
        text: "The whole purpose of religion is to facilitate love and compassion, patience, tolerance, humility, and forgiveness.",
        author: Some("Dalai Lama"),
        theme: Theme::Spiritual,
        difficulty: None,
    },
    FallbackEntry {
        text: "Be yourself and you will be at peace.",
        author: Some("Lao Tzu"),
        theme: Theme::Spiritual,
        difficulty: None,
    },
];

/// Fallback good deeds
pub static FALLBACK_DEEDS: [FallbackEntry; 5] = [
    FallbackEntry {
        text: "Smile at a stranger and brighten their day",
        author: None,
        theme: Theme::Kindness,
        difficulty: Some(Difficulty::Easy),
    },
    FallbackEntry {
        text: "Help someone carry their groceries",
        author: None,
        theme: Theme::Kindness,
        difficulty: Some(Difficulty::Easy),
    },
    FallbackEntry {
        text: "Call a friend or family member you haven't spoken to in a while",
        author: None,
        theme: Theme::Family,
        difficulty: Some(Difficulty::Easy),
    },
    FallbackEntry {
        text: "Write a thank you note to someone who has helped you",
        author: None,
        theme: Theme::Kindness,
        difficulty: Some(Difficulty::Easy),
    },
    FallbackEntry {
        text: "Listen to someone who needs to talk",
        author: None,
        theme: Theme::Kindness,
        difficulty: Some(Difficulty::Easy),
    },
];

impl FallbackEntry {
    fn to_item(self) -> Option<Item> {
        let mut item = Item::new(self.text, self.theme).ok()?;
        if let Some(author) = self.author {
            item = item.with_author(author);
        }
        if let Some(difficulty) = self.difficulty {
            item = item.with_difficulty(difficulty);
        }
        Some(item)
    }
}

/// Static entries for a kind
pub fn entries(kind: ContentKind) -> &'static [FallbackEntry] {
    match kind {
        ContentKind::Quotes => &FALLBACK_QUOTES,
        ContentKind::GoodDeeds => &FALLBACK_DEEDS,
    }
}

/// Returns the fallback bucket for a kind, in catalog order
pub fn fallback(kind: ContentKind) -> CategoryBucket {
    entries(kind)
        .iter()
        .filter_map(|entry| entry.to_item())
        .collect::<Vec<_>>()
        .into()
}
