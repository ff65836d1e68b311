use crate::config::TITLE_CAPACITY_HINT;
use rustc_hash::FxHashMap;

/// Bidirectional title-to-ID registry.
///
/// IDs are assigned in first-seen order starting at 0 and are never reused.
/// The two directions are private and only mutated together through the
/// methods here, so `id_to_title` stays a function of ID at all times. The
/// title direction is allowed to fan in: a redirect title may [`alias`] onto
/// its target's ID without a reverse entry of its own.
///
/// [`alias`]: TitleRegistry::alias
pub struct TitleRegistry {
    title_to_id: FxHashMap<String, u32>,
    id_to_title: FxHashMap<u32, String>,
    next_id: u32,
}

impl TitleRegistry {
    pub fn new() -> Self {
        Self {
            title_to_id: FxHashMap::with_capacity_and_hasher(
                TITLE_CAPACITY_HINT,
                Default::default(),
            ),
            id_to_title: FxHashMap::with_capacity_and_hasher(
                TITLE_CAPACITY_HINT,
                Default::default(),
            ),
            next_id: 0,
        }
    }

    /// Returns the ID registered for `title`, assigning the next sequential
    /// one (and both map directions) on first sight.
    pub fn get_or_assign(&mut self, title: &str) -> u32 {
        if let Some(&id) = self.title_to_id.get(title) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.title_to_id.insert(title.to_string(), id);
        self.id_to_title.insert(id, title.to_string());
        id
    }

    /// Maps `title` onto an existing ID, forward direction only.
    ///
    /// Used for redirect titles that were never independently registered:
    /// they never get an ID of their own, they just resolve to the target's.
    pub fn alias(&mut self, title: String, id: u32) {
        self.title_to_id.insert(title, id);
    }

    pub fn id_of(&self, title: &str) -> Option<u32> {
        self.title_to_id.get(title).copied()
    }

    pub fn title_of(&self, id: u32) -> Option<&str> {
        self.id_to_title.get(&id).map(String::as_str)
    }

    /// Purges one ID from the reverse direction, returning its title.
    /// Forward entries pointing at it are left for [`rewrite_ids`].
    ///
    /// [`rewrite_ids`]: TitleRegistry::rewrite_ids
    pub fn remove_id(&mut self, id: u32) -> Option<String> {
        self.id_to_title.remove(&id)
    }

    /// Rewrites every forward entry whose ID is a key of `map` to the mapped
    /// value.
    pub fn rewrite_ids(&mut self, map: &FxHashMap<u32, u32>) {
        for id in self.title_to_id.values_mut() {
            if let Some(&target) = map.get(id) {
                *id = target;
            }
        }
    }

    /// Iterates the reverse (ID to title) direction.
    pub fn iter_ids(&self) -> impl Iterator<Item = (u32, &str)> {
        self.id_to_title.iter().map(|(&id, title)| (id, title.as_str()))
    }

    /// Number of IDs currently held in the reverse direction.
    pub fn id_count(&self) -> usize {
        self.id_to_title.len()
    }

    /// Number of titles held in the forward direction (aliases included).
    pub fn title_count(&self) -> usize {
        self.title_to_id.len()
    }
}

impl Default for TitleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
