//! Play queue store
//!
//! Ordered items plus a cursor, independent of what the transport has loaded.
//! Invariant: the cursor is always in range or None, and never references a
//! removed item. Which entry plays next is not decided here — see
//! [`crate::playback::modes`].

use crate::error::{Error, Result};
use playcast_common::model::{ItemKey, PlayableItem};

/// Ordered play queue with a cursor.
#[derive(Debug, Default)]
pub struct QueueStore {
    items: Vec<PlayableItem>,
    /// Cursor into `items`; None when the queue is empty or nothing has been
    /// explicitly queued for playback.
    index: Option<usize>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wholesale replace: the only bulk-mutation entry point. Replaces all
    /// prior contents, never merges. An empty `items` clears the queue and
    /// the cursor.
    pub fn replace(&mut self, items: Vec<PlayableItem>, start_index: usize) -> Result<()> {
        if items.is_empty() {
            self.items = items;
            self.index = None;
            return Ok(());
        }
        if start_index >= items.len() {
            return Err(Error::BadRequest(format!(
                "start index {} out of range for queue of {}",
                start_index,
                items.len()
            )));
        }
        self.items = items;
        self.index = Some(start_index);
        Ok(())
    }

    /// Resolve an item's identity to its current position, or None if absent.
    /// Used to re-sync the cursor after external add/remove without
    /// restarting playback.
    pub fn index_of(&self, key: &ItemKey) -> Option<usize> {
        self.items.iter().position(|item| &item.key() == key)
    }

    /// Move the cursor to an existing position, returning the item there.
    pub fn advance_to(&mut self, index: usize) -> Result<&PlayableItem> {
        if index >= self.items.len() {
            return Err(Error::Queue(format!(
                "index {} out of range for queue of {}",
                index,
                self.items.len()
            )));
        }
        self.index = Some(index);
        Ok(&self.items[index])
    }

    /// Append an item at the tail. The cursor does not move; appending to an
    /// empty queue leaves it None until something is explicitly played.
    pub fn enqueue(&mut self, item: PlayableItem) {
        self.items.push(item);
    }

    /// Remove the first item matching `key`, re-syncing the cursor so it
    /// keeps referencing the same current item when possible. Removing the
    /// cursor item clamps the cursor in place (or to the new tail, or to None
    /// when the queue empties). Returns false when no item matched.
    pub fn remove(&mut self, key: &ItemKey) -> bool {
        let Some(position) = self.index_of(key) else {
            return false;
        };
        self.items.remove(position);
        self.index = match self.index {
            None => None,
            Some(cursor) if position < cursor => Some(cursor - 1),
            Some(cursor) if position == cursor => {
                if self.items.is_empty() {
                    None
                } else {
                    Some(cursor.min(self.items.len() - 1))
                }
            }
            unchanged => unchanged,
        };
        true
    }

    /// Item under the cursor, if any.
    pub fn current(&self) -> Option<&PlayableItem> {
        self.index.map(|i| &self.items[i])
    }

    pub fn items(&self) -> &[PlayableItem] {
        &self.items
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str) -> PlayableItem {
        PlayableItem::Song {
            song_id: id.to_string(),
            song_name: format!("Song {}", id),
            creator_name: "Artist".to_string(),
            signed_audio: Some(format!("https://cdn.example/{}.mp3", id)),
            signed_cover: None,
            duration: 120.0,
        }
    }

    fn key(id: &str) -> ItemKey {
        song(id).key()
    }

    #[test]
    fn replace_sets_cursor_to_start_index() {
        let mut queue = QueueStore::new();
        queue
            .replace(vec![song("a"), song("b"), song("c")], 1)
            .unwrap();

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.index(), Some(1));
        assert_eq!(queue.current().unwrap().key(), key("b"));
    }

    #[test]
    fn replace_rejects_out_of_range_start() {
        let mut queue = QueueStore::new();
        let result = queue.replace(vec![song("a"), song("b")], 2);
        assert!(matches!(result, Err(Error::BadRequest(_))));
        // Failed replace leaves the store untouched.
        assert!(queue.is_empty());
        assert_eq!(queue.index(), None);
    }

    #[test]
    fn replace_with_empty_items_clears() {
        let mut queue = QueueStore::new();
        queue.replace(vec![song("a")], 0).unwrap();
        queue.replace(Vec::new(), 0).unwrap();
        assert!(queue.is_empty());
        assert_eq!(queue.index(), None);
        assert!(queue.current().is_none());
    }

    #[test]
    fn replace_is_wholesale_not_merge() {
        let mut queue = QueueStore::new();
        queue.replace(vec![song("a"), song("b")], 0).unwrap();
        queue.replace(vec![song("x")], 0).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.current().unwrap().key(), key("x"));
    }

    #[test]
    fn index_of_matches_by_value_identity() {
        let mut queue = QueueStore::new();
        queue.replace(vec![song("a"), song("b")], 0).unwrap();

        // Re-fetched copy with a different signed URL still resolves.
        let copy = PlayableItem::Song {
            song_id: "b".to_string(),
            song_name: "Song b".to_string(),
            creator_name: "Artist".to_string(),
            signed_audio: Some("https://cdn.example/refreshed.mp3".to_string()),
            signed_cover: None,
            duration: 120.0,
        };
        assert_eq!(queue.index_of(&copy.key()), Some(1));
        assert_eq!(queue.index_of(&key("zzz")), None);
    }

    #[test]
    fn advance_to_bounds_checked() {
        let mut queue = QueueStore::new();
        queue.replace(vec![song("a"), song("b")], 0).unwrap();

        assert_eq!(queue.advance_to(1).unwrap().key(), key("b"));
        assert_eq!(queue.index(), Some(1));

        assert!(queue.advance_to(2).is_err());
        assert_eq!(queue.index(), Some(1));
    }

    #[test]
    fn enqueue_does_not_move_cursor() {
        let mut queue = QueueStore::new();
        queue.replace(vec![song("a"), song("b")], 1).unwrap();
        queue.enqueue(song("c"));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.index(), Some(1));
        assert_eq!(queue.current().unwrap().key(), key("b"));
    }

    #[test]
    fn enqueue_into_empty_queue_leaves_cursor_none() {
        let mut queue = QueueStore::new();
        queue.enqueue(song("a"));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.index(), None);
        assert!(queue.current().is_none());
    }

    #[test]
    fn remove_before_cursor_shifts_it_down() {
        let mut queue = QueueStore::new();
        queue
            .replace(vec![song("a"), song("b"), song("c")], 2)
            .unwrap();

        assert!(queue.remove(&key("a")));
        assert_eq!(queue.index(), Some(1));
        assert_eq!(queue.current().unwrap().key(), key("c"));
    }

    #[test]
    fn remove_after_cursor_keeps_it() {
        let mut queue = QueueStore::new();
        queue
            .replace(vec![song("a"), song("b"), song("c")], 0)
            .unwrap();

        assert!(queue.remove(&key("c")));
        assert_eq!(queue.index(), Some(0));
        assert_eq!(queue.current().unwrap().key(), key("a"));
    }

    #[test]
    fn remove_cursor_item_clamps_in_place() {
        let mut queue = QueueStore::new();
        queue
            .replace(vec![song("a"), song("b"), song("c")], 1)
            .unwrap();

        assert!(queue.remove(&key("b")));
        // Cursor stays at position 1, now referencing the old successor.
        assert_eq!(queue.index(), Some(1));
        assert_eq!(queue.current().unwrap().key(), key("c"));
    }

    #[test]
    fn remove_last_item_at_cursor_clamps_to_tail() {
        let mut queue = QueueStore::new();
        queue.replace(vec![song("a"), song("b")], 1).unwrap();

        assert!(queue.remove(&key("b")));
        assert_eq!(queue.index(), Some(0));
        assert_eq!(queue.current().unwrap().key(), key("a"));
    }

    #[test]
    fn remove_only_item_empties_cursor() {
        let mut queue = QueueStore::new();
        queue.replace(vec![song("a")], 0).unwrap();

        assert!(queue.remove(&key("a")));
        assert!(queue.is_empty());
        assert_eq!(queue.index(), None);
    }

    #[test]
    fn remove_unknown_key_is_false() {
        let mut queue = QueueStore::new();
        queue.replace(vec![song("a")], 0).unwrap();
        assert!(!queue.remove(&key("nope")));
        assert_eq!(queue.len(), 1);
    }
}
