//! Next/previous resolution by playback mode
//!
//! Pure decisions over the queue slice, cursor, and mode. The engine treats a
//! None target as a defensive no-op; UIs disable controls from `has_next` /
//! `has_previous` before a request is ever made.

use playcast_common::model::{PlayableItem, PlaybackMode};
use rand::Rng;

/// Indices after `index` whose item carries a playable media URL.
fn forward_playable(items: &[PlayableItem], index: usize) -> impl Iterator<Item = usize> + '_ {
    items
        .iter()
        .enumerate()
        .skip(index + 1)
        .filter(|(_, item)| item.is_playable())
        .map(|(i, _)| i)
}

/// Which index plays next, or None when playback should stop.
///
/// - Normal: the following index; no wraparound at the end.
/// - Shuffle: uniform choice among playable items after the cursor; items
///   without a media URL are never selected.
/// - Repeat: the same index, replayed from zero.
pub fn next_index<R: Rng>(
    items: &[PlayableItem],
    index: usize,
    mode: PlaybackMode,
    rng: &mut R,
) -> Option<usize> {
    match mode {
        PlaybackMode::Normal => {
            if index + 1 < items.len() {
                Some(index + 1)
            } else {
                None
            }
        }
        PlaybackMode::Shuffle => {
            let candidates: Vec<usize> = forward_playable(items, index).collect();
            match candidates.len() {
                0 => None,
                1 => Some(candidates[0]),
                n => Some(candidates[rng.gen_range(0..n)]),
            }
        }
        PlaybackMode::Repeat => {
            if index < items.len() {
                Some(index)
            } else {
                None
            }
        }
    }
}

/// Which index plays on an explicit "previous". A plain decrement in every
/// mode: shuffle keeps no history stack, and repeat is not special-cased for
/// manual navigation.
pub fn previous_index(items: &[PlayableItem], index: usize) -> Option<usize> {
    if index == 0 || index >= items.len() {
        return None;
    }
    Some(index - 1)
}

/// Whether a "next" target exists.
///
/// Repeat always reports a next (replay current). Every other mode scans
/// forward from the cursor for any item with a playable media URL.
pub fn has_next(items: &[PlayableItem], index: Option<usize>, mode: PlaybackMode) -> bool {
    let Some(index) = index else {
        return false;
    };
    match mode {
        PlaybackMode::Repeat => index < items.len(),
        _ => forward_playable(items, index).next().is_some(),
    }
}

/// Whether a "previous" affordance should be offered: whenever an item is
/// loaded, except when the queue holds zero playable items. The engine still
/// no-ops defensively at the head of the queue.
pub fn has_previous(items: &[PlayableItem], has_current: bool) -> bool {
    has_current && items.iter().any(PlayableItem::is_playable)
}
