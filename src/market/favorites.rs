//! Persisted favorites watchlist.
//!
//! A favorite key is the string `"<name> in <market>"`.  The list is
//! newest-first, deduplicated, and capped at 10 entries; it is loaded once
//! at construction and written back on every change.  Persistence is a JSON
//! array of strings — load failures degrade to an empty list so a corrupt
//! file never blocks the dashboard.

use std::path::PathBuf;

use crate::config::AppPaths;

/// Maximum number of favorites retained (most-recently-added first).
pub const MAX_FAVORITES: usize = 10;

// ---------------------------------------------------------------------------
// FavoriteList
// ---------------------------------------------------------------------------

/// The capped, persisted watchlist.
#[derive(Debug)]
pub struct FavoriteList {
    items: Vec<String>,
    /// `None` means in-memory only (tests, ephemeral sessions).
    path: Option<PathBuf>,
}

impl FavoriteList {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// An empty, in-memory list that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            items: Vec::new(),
            path: None,
        }
    }

    /// Load from the platform-appropriate `favorites.json`.
    pub fn load() -> Self {
        Self::load_from(AppPaths::new().favorites_file)
    }

    /// Load from an explicit path (useful for tests).  A missing file is an
    /// empty list; an unreadable or malformed file is logged and treated as
    /// empty.
    pub fn load_from(path: PathBuf) -> Self {
        let items = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<String>>(&content) {
                Ok(mut items) => {
                    items.truncate(MAX_FAVORITES);
                    items
                }
                Err(e) => {
                    log::warn!("failed to parse favorites file ({e}); starting empty");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        Self {
            items,
            path: Some(path),
        }
    }

    /// Build the canonical favorite key for a result.
    pub fn key(name: &str, market: &str) -> String {
        format!("{name} in {market}")
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Toggle `key`: remove it when present, otherwise insert it at the
    /// front and trim the list to [`MAX_FAVORITES`].  Returns `true` when
    /// the key is a favorite after the call.  Every change is written back.
    pub fn toggle(&mut self, key: &str) -> bool {
        let now_favorite = if let Some(pos) = self.items.iter().position(|f| f == key) {
            self.items.remove(pos);
            false
        } else {
            self.items.insert(0, key.to_string());
            self.items.truncate(MAX_FAVORITES);
            true
        };

        self.save();
        now_favorite
    }

    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match serde_json::to_string(&self.items) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    log::warn!("failed to save favorites: {e}");
                }
            }
            Err(e) => log::warn!("failed to serialise favorites: {e}"),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn contains(&self, key: &str) -> bool {
        self.items.iter().any(|f| f == key)
    }

    /// All favorites, most-recently-added first.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Case-insensitive substring filter for the watchlist search box.  A
    /// blank needle returns everything.
    pub fn filter(&self, needle: &str) -> Vec<&str> {
        if needle.trim().is_empty() {
            return self.items.iter().map(String::as_str).collect();
        }
        let needle = needle.to_lowercase();
        self.items
            .iter()
            .filter(|f| f.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn key_format() {
        assert_eq!(FavoriteList::key("Tomato", "Delhi"), "Tomato in Delhi");
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut favorites = FavoriteList::in_memory();

        assert!(favorites.toggle("Tomato in Delhi"));
        assert!(favorites.contains("Tomato in Delhi"));

        assert!(!favorites.toggle("Tomato in Delhi"));
        assert!(!favorites.contains("Tomato in Delhi"));
        assert!(favorites.is_empty());
    }

    #[test]
    fn newest_first_order() {
        let mut favorites = FavoriteList::in_memory();
        favorites.toggle("Tomato in Delhi");
        favorites.toggle("Onion in Lasalgaon");
        favorites.toggle("Garlic in Indore");

        assert_eq!(
            favorites.items(),
            &[
                "Garlic in Indore".to_string(),
                "Onion in Lasalgaon".to_string(),
                "Tomato in Delhi".to_string(),
            ]
        );
    }

    /// An 11th distinct favorite drops the oldest beyond 10 and keeps
    /// newest-first order.
    #[test]
    fn cap_drops_oldest_beyond_ten() {
        let mut favorites = FavoriteList::in_memory();
        for i in 0..11 {
            favorites.toggle(&format!("Crop{i} in Market{i}"));
        }

        assert_eq!(favorites.len(), MAX_FAVORITES);
        assert_eq!(favorites.items()[0], "Crop10 in Market10");
        // The oldest entry (Crop0) is gone.
        assert!(!favorites.contains("Crop0 in Market0"));
        assert!(favorites.contains("Crop1 in Market1"));
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let mut favorites = FavoriteList::in_memory();
        favorites.toggle("Tomato in Delhi");
        favorites.toggle("Onion in Lasalgaon");

        assert_eq!(favorites.filter("tomato"), vec!["Tomato in Delhi"]);
        assert_eq!(favorites.filter("LASAL"), vec!["Onion in Lasalgaon"]);
        assert_eq!(favorites.filter("  ").len(), 2);
        assert!(favorites.filter("wheat").is_empty());
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    #[test]
    fn round_trips_through_disk() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("favorites.json");

        {
            let mut favorites = FavoriteList::load_from(path.clone());
            favorites.toggle("Tomato in Delhi");
            favorites.toggle("Onion in Lasalgaon");
        }

        let reloaded = FavoriteList::load_from(path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.items()[0], "Onion in Lasalgaon");
        assert!(reloaded.contains("Tomato in Delhi"));
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().expect("temp dir");
        let favorites = FavoriteList::load_from(dir.path().join("nonexistent.json"));
        assert!(favorites.is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("favorites.json");
        std::fs::write(&path, "{not json").expect("write");

        let favorites = FavoriteList::load_from(path);
        assert!(favorites.is_empty());
    }
}
