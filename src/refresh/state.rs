use std::collections::{HashMap, HashSet};

/// Per-endpoint memory carried between refreshes.
///
/// Not synchronised: the orchestrator only mutates it after every fetch of
/// an invocation has been joined, on the calling thread.  Whoever owns the
/// value decides its lifetime (the poller keeps one for the whole process).
#[derive(Debug, Default, Clone)]
pub struct RefreshState {
    hashes: HashMap<String, String>,
    loaded: HashSet<String>,
}

impl RefreshState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last stored content hash for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.hashes.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: &str, hash: impl Into<String>) {
        self.hashes.insert(name.to_string(), hash.into());
    }

    /// Whether a selective refresh of `name` has succeeded at least once.
    pub fn has_loaded_once(&self, name: &str) -> bool {
        self.loaded.contains(name)
    }

    pub fn mark_loaded(&mut self, name: &str) {
        self.loaded.insert(name.to_string());
    }

    /// Drop everything known about `name`, so its next selective refresh
    /// counts as a first load.
    pub fn forget(&mut self, name: &str) {
        self.hashes.remove(name);
        self.loaded.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let state = RefreshState::new();
        assert_eq!(state.get("Schedule"), None);
        assert!(!state.has_loaded_once("Schedule"));
    }

    #[test]
    fn set_overwrites_previous_hash() {
        let mut state = RefreshState::new();
        state.set("Schedule", "h1");
        state.set("Schedule", "h2");
        assert_eq!(state.get("Schedule"), Some("h2"));
        assert_eq!(state.get("Upcoming"), None);
    }

    #[test]
    fn loaded_flag_is_independent_of_hash() {
        let mut state = RefreshState::new();
        state.set("Upcoming", "h1");
        assert!(!state.has_loaded_once("Upcoming"));

        state.mark_loaded("Upcoming");
        state.mark_loaded("Upcoming");
        assert!(state.has_loaded_once("Upcoming"));
        assert!(!state.has_loaded_once("Schedule"));
    }

    #[test]
    fn forget_clears_hash_and_loaded_flag() {
        let mut state = RefreshState::new();
        state.set("Schedule", "h1");
        state.mark_loaded("Schedule");
        state.set("Upcoming", "h2");

        state.forget("Schedule");

        assert_eq!(state.get("Schedule"), None);
        assert!(!state.has_loaded_once("Schedule"));
        assert_eq!(state.get("Upcoming"), Some("h2"));
    }
}
