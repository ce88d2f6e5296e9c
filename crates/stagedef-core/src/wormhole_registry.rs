use std::collections::HashMap;

/// Maximum number of wormholes tracked in one decode session.
pub const MAX_WORMHOLES: usize = 256;

/// Session-local mapping from a wormhole record's absolute offset to a small
/// sequential index.
///
/// Indices are handed out in first-seen order, whether the offset was first
/// seen as a wormhole record or as another wormhole's destination.
#[derive(Debug, Clone, Default)]
pub struct WormholeRegistry {
    indices: HashMap<u32, usize>,
}

impl WormholeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index for `offset`, assigning the next one if unseen.
    ///
    /// Returns `None` once [`MAX_WORMHOLES`] distinct offsets are registered.
    pub fn index_of(&mut self, offset: u32) -> Option<usize> {
        if let Some(&index) = self.indices.get(&offset) {
            return Some(index);
        }
        let next = self.indices.len();
        if next >= MAX_WORMHOLES {
            log::warn!("wormhole registry full, no index for offset {offset:#x}");
            return None;
        }
        self.indices.insert(offset, next);
        Some(next)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
