use std::fmt;

use nalgebra as na;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 4x4 homogeneous rigid-body pose in world space.
pub type PoseMatrix = na::Matrix4<f32>;

/// Stable identity of one physical reference image within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(Uuid);

impl ImageId {
    pub fn new() -> ImageId {
        ImageId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ImageId {
    fn from(uuid: Uuid) -> Self {
        ImageId(uuid)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One recognized image at a point in time.
///
/// `physical_width` and `physical_height` are the authored size in meters and stay
/// fixed for an id; `scale_factor` is re-estimated by the tracker on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedImage {
    pub id: ImageId,
    #[serde(default)]
    pub name: Option<String>,
    pub physical_width: f32,
    pub physical_height: f32,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f32,
    pub transform: PoseMatrix,
}

fn default_scale_factor() -> f32 {
    1.0
}

impl DetectedImage {
    pub fn new(
        id: ImageId,
        physical_width: f32,
        physical_height: f32,
        transform: PoseMatrix,
    ) -> DetectedImage {
        DetectedImage {
            id,
            name: None,
            physical_width,
            physical_height,
            scale_factor: 1.0,
            transform,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_transform(mut self, transform: PoseMatrix) -> Self {
        self.transform = transform;
        self
    }

    pub fn effective_width(&self) -> f32 {
        self.physical_width * self.scale_factor
    }

    pub fn effective_height(&self) -> f32 {
        self.physical_height * self.scale_factor
    }

    /// Translation column of the pose.
    pub fn position(&self) -> na::Vector3<f32> {
        self.transform.fixed_view::<3, 1>(0, 3).into_owned()
    }

    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.id.to_string(),
        }
    }
}

/// Offset added to an image pose's translation when placing content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementOffset {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl PlacementOffset {
    pub const ZERO: PlacementOffset = PlacementOffset {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> PlacementOffset {
        PlacementOffset { x, y, z }
    }

    pub fn as_vector(&self) -> na::Vector3<f32> {
        na::Vector3::new(self.x, self.y, self.z)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Default for PlacementOffset {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Input contract between the host tracking subsystem and the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum LifecycleEvent {
    Added(DetectedImage),
    Updated(DetectedImage),
    Removed(ImageId),
}

impl LifecycleEvent {
    pub fn image_id(&self) -> ImageId {
        match self {
            LifecycleEvent::Added(image) | LifecycleEvent::Updated(image) => image.id,
            LifecycleEvent::Removed(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LifecycleEvent::Added(_) => "added",
            LifecycleEvent::Updated(_) => "updated",
            LifecycleEvent::Removed(_) => "removed",
        }
    }
}
