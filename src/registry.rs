use std::collections::HashMap;

use crate::types::{DetectedImage, ImageId};

/// Latest known record for every currently-tracked image, keyed by id.
///
/// Every operation is total: upserting always succeeds and removing or looking up
/// an unknown id is a no-op.
#[derive(Debug, Default, Clone)]
pub struct ImageRegistry {
    images: HashMap<ImageId, DetectedImage>,
}

impl ImageRegistry {
    pub fn new() -> ImageRegistry {
        ImageRegistry::default()
    }

    /// Inserts or wholesale-replaces the entry for `image.id`.
    /// Returns `true` when the id was not tracked before.
    pub fn upsert(&mut self, image: DetectedImage) -> bool {
        self.images.insert(image.id, image).is_none()
    }

    pub fn remove(&mut self, id: &ImageId) -> Option<DetectedImage> {
        self.images.remove(id)
    }

    pub fn get(&self, id: &ImageId) -> Option<&DetectedImage> {
        self.images.get(id)
    }

    /// Snapshot of the current entries, in no particular order.
    pub fn all(&self) -> Vec<DetectedImage> {
        self.images.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectedImage> {
        self.images.values()
    }

    pub fn ids(&self) -> Vec<ImageId> {
        self.images.keys().copied().collect()
    }

    pub fn contains(&self, id: &ImageId) -> bool {
        self.images.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }
}
