use crate::registry::ImageRegistry;
use crate::types::{DetectedImage, ImageId};

/// Receives lifecycle notifications from a coordinator.
///
/// Callbacks run synchronously after the registry has been mutated for the event,
/// so `registry` already reflects it.
pub trait ImageTrackingObserver: Send + Sync {
    fn image_detected(&self, image: &DetectedImage, registry: &ImageRegistry);

    fn image_updated(&self, image: &DetectedImage, registry: &ImageRegistry);

    fn image_removed(&self, id: &ImageId, registry: &ImageRegistry);
}

/// Observer that writes every notification to the `log` facade.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl ImageTrackingObserver for LoggingObserver {
    fn image_detected(&self, image: &DetectedImage, registry: &ImageRegistry) {
        let p = image.position();
        log::info!(
            "detected {} at ({:.3}, {:.3}, {:.3}), size {:.3}x{:.3} m, {} tracked",
            image.label(),
            p.x,
            p.y,
            p.z,
            image.effective_width(),
            image.effective_height(),
            registry.len()
        );
    }

    fn image_updated(&self, image: &DetectedImage, _registry: &ImageRegistry) {
        let p = image.position();
        log::debug!(
            "updated {} at ({:.3}, {:.3}, {:.3}), scale {:.3}",
            image.label(),
            p.x,
            p.y,
            p.z,
            image.scale_factor
        );
    }

    fn image_removed(&self, id: &ImageId, registry: &ImageRegistry) {
        log::info!("removed {}, {} tracked", id, registry.len());
    }
}
