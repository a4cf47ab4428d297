//! Photo records and the closed category set they are filed under.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ParseCategoryError;

/// Opaque identifier of a photo, unique within a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(String);

impl PhotoId {
    pub fn new(id: impl Into<String>) -> Self {
        PhotoId(id.into())
    }

    /// Fresh time-ordered identifier for a newly uploaded photo.
    pub fn generate() -> Self {
        PhotoId(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the user that owns a photo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        OwnerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Puppy,
    Adult,
    Action,
    Portrait,
    #[default]
    Uncategorized,
}

impl Category {
    /// Every category, in the order the tabs and the upload selector show them.
    pub const ALL: [Category; 5] = [
        Category::Puppy,
        Category::Adult,
        Category::Action,
        Category::Portrait,
        Category::Uncategorized,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Puppy => "puppy",
            Category::Adult => "adult",
            Category::Action => "action",
            Category::Portrait => "portrait",
            Category::Uncategorized => "uncategorized",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Puppy => "Puppy",
            Category::Adult => "Adult",
            Category::Action => "Action",
            Category::Portrait => "Portrait",
            Category::Uncategorized => "Uncategorized",
        }
    }

    pub fn cycle_next(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn cycle_prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.key() == s)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Category tab selection: everything, favorites, or one exact category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Favorites,
    Category(Category),
}

impl CategoryFilter {
    /// The fixed tab order.
    pub const ALL_TABS: [CategoryFilter; 7] = [
        CategoryFilter::All,
        CategoryFilter::Favorites,
        CategoryFilter::Category(Category::Puppy),
        CategoryFilter::Category(Category::Adult),
        CategoryFilter::Category(Category::Action),
        CategoryFilter::Category(Category::Portrait),
        CategoryFilter::Category(Category::Uncategorized),
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Favorites => "favorites",
            CategoryFilter::Category(c) => c.key(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "All Photos",
            CategoryFilter::Favorites => "Favorites",
            CategoryFilter::Category(c) => c.label(),
        }
    }

    pub fn tab_index(&self) -> usize {
        Self::ALL_TABS.iter().position(|t| t == self).unwrap_or(0)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CategoryFilter {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(CategoryFilter::All),
            "favorites" => Ok(CategoryFilter::Favorites),
            other => other.parse().map(CategoryFilter::Category),
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        CategoryFilter::Category(category)
    }
}

/// A single gallery record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: PhotoId,
    pub owner_id: OwnerId,
    pub title: String,
    pub description: Option<String>,
    /// Remote URL, `file://` path or `data:` URL. Opaque to the core.
    pub image_url: String,
    pub category: Category,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields of a photo about to be added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhoto {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub category: Category,
    pub is_favorite: bool,
}
