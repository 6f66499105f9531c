//! Ordered list of tracks with a current-index cursor.
//!
//! Insertion order is significant and duplicates are allowed. The cursor is
//! only meaningful while the list is non-empty; every accessor returns `None`
//! on an empty playlist instead of dereferencing it.

use crate::library::Track;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Debug, Default, Clone)]
pub struct Playlist {
    tracks: Vec<Track>,
    current: usize,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, track: Track) {
        self.tracks.push(track);
    }

    pub fn extend(&mut self, tracks: impl IntoIterator<Item = Track>) {
        self.tracks.extend(tracks);
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_index(&self) -> Option<usize> {
        if self.tracks.is_empty() {
            None
        } else {
            Some(self.current)
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index().and_then(|i| self.tracks.get(i))
    }

    /// Move the cursor one step, wrapping around at either end.
    /// Returns the new index, or `None` (and does nothing) when empty.
    pub fn advance(&mut self, direction: Direction) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        self.current = match direction {
            Direction::Next => (self.current + 1) % len,
            Direction::Previous => (self.current + len - 1) % len,
        };
        Some(self.current)
    }

    /// Point the cursor at `index`. Out-of-range indices are rejected.
    pub fn select_index(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Display names in playlist order.
    pub fn names(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.display.clone()).collect()
    }
}
