use std::collections::VecDeque;

use serde::Serialize;

pub const RECENT_CAPACITY: usize = 5;

/// Most-recent-first list of searched locations, held in memory only
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct RecentLocations {
    entries: VecDeque<String>,
}

impl RecentLocations {
    /// Seed entries are given most recent first
    pub fn new<I: IntoIterator<Item = String>>(seed: I) -> Self {
        let mut recent = Self {
            entries: VecDeque::with_capacity(RECENT_CAPACITY),
        };
        let seed: Vec<String> = seed.into_iter().collect();
        for name in seed.into_iter().rev() {
            recent.record(&name);
        }
        recent
    }

    /// Move `name` to the front, dropping any case-insensitive duplicate
    pub fn record(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        self.entries.retain(|e| !e.eq_ignore_ascii_case(name));
        self.entries.push_front(name.to_string());
        self.entries.truncate(RECENT_CAPACITY);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> RecentLocations {
        RecentLocations::new(
            ["Mumbai, India", "Pune, India", "Nagpur, India"]
                .iter()
                .map(|s| s.to_string()),
        )
    }

    #[test]
    fn seed_order_is_kept() {
        let recent = seeded();
        let names: Vec<_> = recent.iter().collect();
        assert_eq!(names, vec!["Mumbai, India", "Pune, India", "Nagpur, India"]);
    }

    #[test]
    fn record_moves_duplicate_to_front() {
        let mut recent = seeded();
        recent.record("nagpur, india");
        let names: Vec<_> = recent.iter().collect();
        assert_eq!(names, vec!["nagpur, india", "Mumbai, India", "Pune, India"]);
    }

    #[test]
    fn capacity_is_bounded() {
        let mut recent = seeded();
        for name in ["London", "Seattle", "Paris", "Oslo"] {
            recent.record(name);
        }
        assert_eq!(recent.len(), RECENT_CAPACITY);
        assert_eq!(recent.iter().next(), Some("Oslo"));
        assert!(!recent.iter().any(|n| n == "Nagpur, India"));
    }

    #[test]
    fn blank_names_ignored() {
        let mut recent = RecentLocations::new(Vec::new());
        recent.record("   ");
        assert!(recent.is_empty());
    }
}
