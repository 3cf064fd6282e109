use crate::placement::IndicatorGeometry;
use crate::types::{ImageId, PoseMatrix};

/// Externally owned scene graph root the coordinator attaches content to.
pub trait SceneRoot {
    /// Adds or replaces the indicator child for `id`.
    fn attach_indicator(
        &mut self,
        id: &ImageId,
        geometry: &IndicatorGeometry,
        color: (u8, u8, u8, u8),
    );

    fn detach_indicator(&mut self, id: &ImageId);

    /// Moves the named pre-existing entity. Returns `false` if no such entity exists.
    fn place_entity(&mut self, name: &str, transform: &PoseMatrix) -> bool;
}
