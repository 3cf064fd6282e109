use std::f32::consts::FRAC_PI_2;

use nalgebra as na;

use crate::types::{DetectedImage, PlacementOffset, PoseMatrix};

/// Copy of `transform` with `offset` added to the translation column.
///
/// Rotation rows are left untouched. A zero offset returns the input bit for bit,
/// including any `-0.0` translation components.
pub fn offset_transform(transform: &PoseMatrix, offset: &PlacementOffset) -> PoseMatrix {
    let mut out = *transform;
    if offset.is_zero() {
        return out;
    }
    out[(0, 3)] += offset.x;
    out[(1, 3)] += offset.y;
    out[(2, 3)] += offset.z;
    out
}

/// Rotation turning a forward-facing image plane into one lying flat, facing up.
pub fn lay_flat_rotation() -> na::Rotation3<f32> {
    na::Rotation3::from_axis_angle(&na::Vector3::x_axis(), -FRAC_PI_2)
}

/// Image pose with the lay-flat rotation pre-multiplied in world space.
/// Translation is kept.
pub fn indicator_pose(transform: &PoseMatrix) -> PoseMatrix {
    let rotation = transform.fixed_view::<3, 3>(0, 0).into_owned();
    let composed = lay_flat_rotation().matrix() * rotation;
    let mut pose = *transform;
    pose.fixed_view_mut::<3, 3>(0, 0).copy_from(&composed);
    pose
}

/// Flat rectangle sized to the image's effective dimensions.
///
/// The surface lies in the local XZ plane of `pose`: `width` along X, `height`
/// along Z, normal along +Y.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorGeometry {
    pub width: f32,
    pub height: f32,
    pub pose: PoseMatrix,
}

impl IndicatorGeometry {
    pub fn for_image(image: &DetectedImage) -> IndicatorGeometry {
        IndicatorGeometry {
            width: image.effective_width(),
            height: image.effective_height(),
            pose: indicator_pose(&image.transform),
        }
    }

    pub fn center(&self) -> na::Point3<f32> {
        na::Point3::new(self.pose[(0, 3)], self.pose[(1, 3)], self.pose[(2, 3)])
    }

    pub fn normal(&self) -> na::Vector3<f32> {
        self.pose.fixed_view::<3, 1>(0, 1).into_owned()
    }

    /// World-space corners, counter-clockwise seen from the normal side.
    pub fn corners(&self) -> [na::Point3<f32>; 4] {
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        [(-hw, hh), (hw, hh), (hw, -hh), (-hw, -hh)].map(|(x, z)| {
            let p = self.pose * na::Vector4::new(x, 0.0, z, 1.0);
            na::Point3::new(p.x, p.y, p.z)
        })
    }
}
