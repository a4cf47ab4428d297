//! Visible-set derivation and per-tab counts.

use serde::{Deserialize, Serialize};

use crate::photo::{Category, CategoryFilter, Photo};

/// Grid layout flavour. Purely presentational; derivation ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    Masonry,
}

impl ViewMode {
    pub fn toggle(&self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::Masonry,
            ViewMode::Masonry => ViewMode::Grid,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Grid => "Grid",
            ViewMode::Masonry => "Masonry",
        }
    }
}

/// Transient, session-scoped filter inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search_query: String,
    pub selected_category: CategoryFilter,
    pub show_favorites_only: bool,
    pub view_mode: ViewMode,
}

impl FilterState {
    /// True when any pass would narrow the collection.
    pub fn is_active(&self) -> bool {
        !self.search_query.trim().is_empty()
            || self.selected_category != CategoryFilter::All
            || self.show_favorites_only
    }

    /// Step to the neighbouring category tab, wrapping at both ends.
    pub fn cycle_category(&mut self, forward: bool) {
        let tabs = CategoryFilter::ALL_TABS;
        let idx = self.selected_category.tab_index();
        let next = if forward {
            (idx + 1) % tabs.len()
        } else {
            (idx + tabs.len() - 1) % tabs.len()
        };
        self.selected_category = tabs[next];
    }

    pub fn toggle_favorites_only(&mut self) {
        self.show_favorites_only = !self.show_favorites_only;
    }

    pub fn toggle_view_mode(&mut self) {
        self.view_mode = self.view_mode.toggle();
    }

    /// Reset every narrowing filter; the view mode is kept.
    pub fn clear(&mut self) {
        self.search_query.clear();
        self.selected_category = CategoryFilter::All;
        self.show_favorites_only = false;
    }
}

/// Compute the photos to show for `state`, preserving collection order.
pub fn derive_visible<'a>(photos: &'a [Photo], state: &FilterState) -> Vec<&'a Photo> {
    let mut visible: Vec<&Photo> = photos.iter().collect();

    let query = state.search_query.trim().to_lowercase();
    if !query.is_empty() {
        visible.retain(|photo| matches_query(photo, &query));
    }

    match state.selected_category {
        CategoryFilter::All => {}
        CategoryFilter::Favorites => visible.retain(|photo| photo.is_favorite),
        CategoryFilter::Category(category) => visible.retain(|photo| photo.category == category),
    }

    if state.show_favorites_only {
        visible.retain(|photo| photo.is_favorite);
    }

    visible
}

/// `query` must already be lowercased.
fn matches_query(photo: &Photo, query: &str) -> bool {
    photo.title.to_lowercase().contains(query)
        || photo
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(query))
}

/// Photo counts for every category tab, taken over the full collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub all: usize,
    pub favorites: usize,
    pub puppy: usize,
    pub adult: usize,
    pub action: usize,
    pub portrait: usize,
    pub uncategorized: usize,
}

impl CategoryCounts {
    pub fn get(&self, tab: CategoryFilter) -> usize {
        match tab {
            CategoryFilter::All => self.all,
            CategoryFilter::Favorites => self.favorites,
            CategoryFilter::Category(Category::Puppy) => self.puppy,
            CategoryFilter::Category(Category::Adult) => self.adult,
            CategoryFilter::Category(Category::Action) => self.action,
            CategoryFilter::Category(Category::Portrait) => self.portrait,
            CategoryFilter::Category(Category::Uncategorized) => self.uncategorized,
        }
    }

    /// `(tab, count)` pairs in tab order.
    pub fn iter(&self) -> impl Iterator<Item = (CategoryFilter, usize)> + '_ {
        CategoryFilter::ALL_TABS
            .into_iter()
            .map(move |tab| (tab, self.get(tab)))
    }
}

pub fn compute_category_counts(photos: &[Photo]) -> CategoryCounts {
    let mut counts = CategoryCounts {
        all: photos.len(),
        ..CategoryCounts::default()
    };

    for photo in photos {
        if photo.is_favorite {
            counts.favorites += 1;
        }
        let slot = match photo.category {
            Category::Puppy => &mut counts.puppy,
            Category::Adult => &mut counts.adult,
            Category::Action => &mut counts.action,
            Category::Portrait => &mut counts.portrait,
            Category::Uncategorized => &mut counts.uncategorized,
        };
        *slot += 1;
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::OwnerId;
    use crate::seed::demo_photos;
    use chrono::Utc;

    fn seeded() -> Vec<Photo> {
        demo_photos(&OwnerId::new("owner"), Utc::now())
    }

    fn ids(photos: &[&Photo]) -> Vec<String> {
        photos.iter().map(|p| p.id.to_string()).collect()
    }

    fn state(query: &str, category: CategoryFilter, favorites_only: bool) -> FilterState {
        FilterState {
            search_query: query.to_string(),
            selected_category: category,
            show_favorites_only: favorites_only,
            view_mode: ViewMode::Grid,
        }
    }

    #[test]
    fn test_inactive_filters_are_identity() {
        let photos = seeded();
        let visible = derive_visible(&photos, &FilterState::default());
        assert_eq!(ids(&visible), ["1", "2", "3", "4"]);
        assert!(!FilterState::default().is_active());
    }

    #[test]
    fn test_favorites_tab() {
        let photos = seeded();
        let visible = derive_visible(&photos, &state("", CategoryFilter::Favorites, false));
        assert_eq!(ids(&visible), ["1", "3"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let photos = seeded();
        let visible = derive_visible(&photos, &state("border", CategoryFilter::All, false));
        assert_eq!(ids(&visible), ["2"]);

        let visible = derive_visible(&photos, &state("BORDER", CategoryFilter::All, false));
        assert_eq!(ids(&visible), ["2"]);
    }

    #[test]
    fn test_search_matches_description() {
        let photos = seeded();
        // Only photo 2's description mentions a frisbee.
        let visible = derive_visible(&photos, &state("frisbee", CategoryFilter::All, false));
        assert_eq!(ids(&visible), ["2"]);
    }

    #[test]
    fn test_search_query_is_trimmed() {
        let photos = seeded();
        let visible = derive_visible(&photos, &state("  border  ", CategoryFilter::All, false));
        assert_eq!(ids(&visible), ["2"]);

        let visible = derive_visible(&photos, &state("   ", CategoryFilter::All, false));
        assert_eq!(visible.len(), 4);
    }

    #[test]
    fn test_category_with_favorites_only() {
        let photos = seeded();
        let puppy = CategoryFilter::Category(Category::Puppy);
        let action = CategoryFilter::Category(Category::Action);

        assert_eq!(ids(&derive_visible(&photos, &state("", puppy, true))), ["1"]);
        assert!(derive_visible(&photos, &state("", action, true)).is_empty());
        assert_eq!(ids(&derive_visible(&photos, &state("", action, false))), ["2"]);
    }

    #[test]
    fn test_passes_compound() {
        let photos = seeded();
        // "retriever" hits photo 1 only, which is a favorite puppy.
        let visible = derive_visible(&photos, &state("retriever", CategoryFilter::Favorites, true));
        assert_eq!(ids(&visible), ["1"]);

        let portrait = CategoryFilter::Category(Category::Portrait);
        assert!(derive_visible(&photos, &state("retriever", portrait, false)).is_empty());
    }

    #[test]
    fn test_no_match_and_empty_collection() {
        let photos = seeded();
        assert!(derive_visible(&photos, &state("poodle", CategoryFilter::All, false)).is_empty());

        let empty: Vec<Photo> = Vec::new();
        assert!(derive_visible(&empty, &FilterState::default()).is_empty());
        assert_eq!(compute_category_counts(&empty), CategoryCounts::default());
    }

    #[test]
    fn test_result_preserves_relative_order() {
        let mut photos = seeded();
        photos.reverse();
        let visible = derive_visible(&photos, &state("", CategoryFilter::Favorites, false));
        assert_eq!(ids(&visible), ["3", "1"]);
    }

    #[test]
    fn test_counts_use_full_collection() {
        let photos = seeded();
        let counts = compute_category_counts(&photos);
        assert_eq!(counts.all, 4);
        assert_eq!(counts.favorites, 2);
        assert_eq!(counts.puppy, 1);
        assert_eq!(counts.adult, 1);
        assert_eq!(counts.action, 1);
        assert_eq!(counts.portrait, 1);
        assert_eq!(counts.uncategorized, 0);

        let listed: Vec<(CategoryFilter, usize)> = counts.iter().collect();
        assert_eq!(listed.len(), 7);
        assert_eq!(listed[1], (CategoryFilter::Favorites, 2));
    }

    #[test]
    fn test_cycle_category_wraps() {
        let mut state = FilterState::default();
        state.cycle_category(false);
        assert_eq!(
            state.selected_category,
            CategoryFilter::Category(Category::Uncategorized)
        );
        state.cycle_category(true);
        assert_eq!(state.selected_category, CategoryFilter::All);
        state.cycle_category(true);
        assert_eq!(state.selected_category, CategoryFilter::Favorites);
    }

    #[test]
    fn test_clear_keeps_view_mode() {
        let mut state = state("dog", CategoryFilter::Favorites, true);
        state.toggle_view_mode();
        assert!(state.is_active());
        state.clear();
        assert!(!state.is_active());
        assert_eq!(state.view_mode, ViewMode::Masonry);
    }
}
