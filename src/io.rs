use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;
use crate::registry::ImageRegistry;
use crate::types::{DetectedImage, LifecycleEvent, PoseMatrix};

/// Serializes an object to a JSON file.
pub fn object_to_json<T: Serialize>(output_path: &str, object: &T) -> Result<()> {
    let j = serde_json::to_string_pretty(object)?;
    std::fs::write(output_path, j)?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned>(file_path: &str) -> Result<T> {
    let contents = std::fs::read_to_string(file_path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Loads a recorded session: a JSON array of lifecycle events in delivery order.
pub fn load_event_log(file_path: &str) -> Result<Vec<LifecycleEvent>> {
    let events: Vec<LifecycleEvent> = object_from_json(file_path)?;
    log::debug!("loaded {} events from {}", events.len(), file_path);
    Ok(events)
}

pub fn save_event_log(output_path: &str, events: &[LifecycleEvent]) -> Result<()> {
    object_to_json(output_path, &events)
}

#[derive(Serialize)]
struct TrackingReport {
    tracked_count: usize,
    images: Vec<ImageReport>,
}

#[derive(Serialize)]
struct ImageReport {
    id: String,
    name: Option<String>,
    effective_width: f32,
    effective_height: f32,
    scale_factor: f32,
    position: [f32; 3],
    target_position: [f32; 3],
}

/// Writes a JSON summary of the images still tracked at the end of a session.
///
/// `target` maps each image to its placement transform so the report shows where
/// attached content would sit.
pub fn write_tracking_report<F>(
    output_path: &str,
    registry: &ImageRegistry,
    target: F,
) -> Result<()>
where
    F: Fn(&DetectedImage) -> PoseMatrix,
{
    let mut images: Vec<ImageReport> = registry
        .iter()
        .map(|image| {
            let p = image.position();
            let t = target(image);
            ImageReport {
                id: image.id.to_string(),
                name: image.name.clone(),
                effective_width: image.effective_width(),
                effective_height: image.effective_height(),
                scale_factor: image.scale_factor,
                position: [p.x, p.y, p.z],
                target_position: [t[(0, 3)], t[(1, 3)], t[(2, 3)]],
            }
        })
        .collect();
    images.sort_by(|a, b| a.id.cmp(&b.id));

    let report = TrackingReport {
        tracked_count: images.len(),
        images,
    };
    object_to_json(output_path, &report)
}
