//! Core content model
//!
//! Items are the unit of content served by the API: a quote or a good-deed
//! suggestion. Items are grouped into one [`CategoryBucket`] per [`ContentKind`].

pub mod fallback;
pub mod selector;

use std::fmt;
use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use fallback::fallback;
pub use selector::select_index;

/// Errors raised by the content model and the service reading it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// An item was created with blank text
    #[error("Item text must not be empty")]
    EmptyText,

    /// A bucket was empty where content was required
    #[error("No content available for {0}")]
    EmptyBucket(ContentKind),
}

/// Partition of the content cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Quotes,
    GoodDeeds,
}

impl ContentKind {
    /// Every kind the cache tracks, in refresh order
    pub const ALL: [ContentKind; 2] = [ContentKind::Quotes, ContentKind::GoodDeeds];

    /// Day offset applied by daily selection so the kinds don't advance in lockstep
    pub fn daily_offset(self) -> u32 {
        match self {
            ContentKind::Quotes => 0,
            ContentKind::GoodDeeds => 7,
        }
    }

    /// Stable name used in logs and cache keys
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Quotes => "quotes",
            ContentKind::GoodDeeds => "good-deeds",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Theme an individual item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Spiritual,
    Motivational,
    Wisdom,
    Kindness,
    Environment,
    Community,
    Family,
}

/// How much effort a good deed takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One piece of content
///
/// Fields are private so every `Item` in the system has passed validation,
/// including ones read back from the disk cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawItem")]
pub struct Item {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    category: Theme,
    #[serde(skip_serializing_if = "Option::is_none")]
    difficulty: Option<Difficulty>,
}

/// Unvalidated wire form of an [`Item`]
#[derive(Deserialize)]
struct RawItem {
    text: String,
    author: Option<String>,
    category: Theme,
    difficulty: Option<Difficulty>,
}

impl TryFrom<RawItem> for Item {
    type Error = ContentError;

    fn try_from(raw: RawItem) -> Result<Self, Self::Error> {
        let mut item = Item::new(raw.text, raw.category)?;
        if let Some(author) = raw.author {
            item = item.with_author(author);
        }
        if let Some(difficulty) = raw.difficulty {
            item = item.with_difficulty(difficulty);
        }
        Ok(item)
    }
}

impl Item {
    /// Creates an item, trimming the text
    ///
    /// # Returns
    /// * `Err(ContentError::EmptyText)` if the text is blank
    pub fn new(text: impl Into<String>, category: Theme) -> Result<Self, ContentError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(ContentError::EmptyText);
        }
        Ok(Self {
            text,
            author: None,
            category,
            difficulty: None,
        })
    }

    /// Attaches an author; blank authors are ignored
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        let author = author.into().trim().to_string();
        self.author = (!author.is_empty()).then_some(author);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn category(&self) -> Theme {
        self.category
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }
}

/// Ordered, immutable snapshot of the items for one kind
///
/// Cloning is cheap; readers hold their own snapshot while the cache swaps
/// in a replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBucket {
    items: Arc<[Item]>,
}

impl Default for CategoryBucket {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CategoryBucket {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: items.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Picks an item uniformly at random, `None` when empty
    pub fn choose_random(&self) -> Option<&Item> {
        self.items.choose(&mut rand::thread_rng())
    }
}

impl From<Vec<Item>> for CategoryBucket {
    fn from(items: Vec<Item>) -> Self {
        Self::new(items)
    }
}
