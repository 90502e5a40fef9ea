use crate::video::VideoId;
use std::collections::HashSet;

/// Identifiers already selected for dispatch during this process
///
/// Owned by the crawl loop alone and never shared with workers. The set
/// only grows: an id stays visited whether its processing succeeds, fails,
/// or is still running.
#[derive(Debug, Default)]
pub struct VisitedSet {
    ids: HashSet<VideoId>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &VideoId) -> bool {
        self.ids.contains(id)
    }

    /// Marks an id as visited, returning `false` if it already was
    pub fn insert(&mut self, id: VideoId) -> bool {
        self.ids.insert(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
