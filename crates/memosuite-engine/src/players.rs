//! Registry of mounted video players.
//!
//! At most one player is active at a time; starting a video elsewhere makes
//! the previous one inactive. The registry is owned by the application
//! context and handed to views that mount players.

use std::collections::HashMap;

#[derive(Debug)]
pub struct PlayerRegistry<P> {
    players: HashMap<String, P>,
    active: Option<String>,
}

impl<P> Default for PlayerRegistry<P> {
    fn default() -> Self {
        Self {
            players: HashMap::new(),
            active: None,
        }
    }
}

impl<P> PlayerRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player, replacing any previous one under the same id.
    pub fn mount(&mut self, id: impl Into<String>, player: P) -> Option<P> {
        self.players.insert(id.into(), player)
    }

    /// Remove a player, clearing the active id if it pointed here.
    pub fn unmount(&mut self, id: &str) -> Option<P> {
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        self.players.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&P> {
        self.players.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut P> {
        self.players.get_mut(id)
    }

    /// Make `id` the active player. Returns the previously active id when it
    /// changed, so the caller can pause it. Unknown ids are ignored.
    pub fn activate(&mut self, id: &str) -> Option<String> {
        if !self.players.contains_key(id) {
            log::debug!("Ignoring activation of unmounted player {id}");
            return None;
        }
        match self.active.replace(id.to_string()) {
            Some(previous) if previous != id => Some(previous),
            _ => None,
        }
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_player(&self) -> Option<&P> {
        self.active.as_deref().and_then(|id| self.players.get(id))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
