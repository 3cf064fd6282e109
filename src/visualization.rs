use std::collections::HashSet;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rerun::RecordingStream;

use crate::placement::IndicatorGeometry;
use crate::scene::SceneRoot;
use crate::types::{ImageId, PoseMatrix};

const AXIS_LENGTH: f32 = 0.05;

pub fn id_to_color(id: &ImageId) -> (u8, u8, u8, u8) {
    let (hi, lo) = id.as_uuid().as_u64_pair();
    let mut rng = ChaCha8Rng::seed_from_u64(hi ^ lo);
    let color_num = rng.random_range(0..2u32.pow(24));
    (
        ((color_num >> 16) % 256) as u8,
        ((color_num >> 8) % 256) as u8,
        (color_num % 256) as u8,
        255,
    )
}

fn to_color((r, g, b, a): (u8, u8, u8, u8)) -> rerun::Color {
    rerun::Color::from_unmultiplied_rgba(r, g, b, a)
}

/// Scene root backed by a rerun recording.
///
/// Indicators are logged as closed outlines under `anchors/<id>`; placeable
/// entities must be registered with [`RerunScene::with_entity`] first.
pub struct RerunScene {
    recording: RecordingStream,
    entities: HashSet<String>,
}

impl RerunScene {
    pub fn new(recording: RecordingStream) -> RerunScene {
        RerunScene {
            recording,
            entities: HashSet::new(),
        }
    }

    pub fn with_entity(mut self, name: impl Into<String>) -> Self {
        self.entities.insert(name.into());
        self
    }

    pub fn recording(&self) -> &RecordingStream {
        &self.recording
    }

    fn log_result(topic: &str, result: rerun::RecordingStreamResult<()>) {
        if let Err(e) = result {
            log::warn!("failed to log {}: {}", topic, e);
        }
    }
}

impl SceneRoot for RerunScene {
    fn attach_indicator(
        &mut self,
        id: &ImageId,
        geometry: &IndicatorGeometry,
        color: (u8, u8, u8, u8),
    ) {
        let corners = geometry.corners();
        let mut strip: Vec<[f32; 3]> = corners.iter().map(|p| [p.x, p.y, p.z]).collect();
        strip.push(strip[0]);

        let topic = format!("anchors/{}/indicator", id);
        Self::log_result(
            &topic,
            self.recording.log(
                topic.as_str(),
                &rerun::LineStrips3D::new([strip])
                    .with_colors([to_color(color)])
                    .with_radii([rerun::Radius::new_ui_points(2.0)]),
            ),
        );

        let center = geometry.center();
        let topic = format!("anchors/{}/center", id);
        Self::log_result(
            &topic,
            self.recording.log(
                topic.as_str(),
                &rerun::Points3D::new([[center.x, center.y, center.z]])
                    .with_colors([to_color(id_to_color(id))])
                    .with_radii([rerun::Radius::new_ui_points(5.0)]),
            ),
        );
    }

    fn detach_indicator(&mut self, id: &ImageId) {
        let topic = format!("anchors/{}", id);
        Self::log_result(
            &topic,
            self.recording.log(topic.as_str(), &rerun::Clear::recursive()),
        );
    }

    fn place_entity(&mut self, name: &str, transform: &PoseMatrix) -> bool {
        if !self.entities.contains(name) {
            return false;
        }
        let pose = glam::Mat4::from_cols_slice(transform.as_slice());
        let origin = pose.transform_point3(glam::Vec3::ZERO);
        let axes = [glam::Vec3::X, glam::Vec3::Y, glam::Vec3::Z]
            .map(|axis| pose.transform_vector3(axis * AXIS_LENGTH).to_array());

        let topic = format!("entities/{}", name);
        Self::log_result(
            &topic,
            self.recording.log(
                topic.as_str(),
                &rerun::Arrows3D::from_vectors(axes)
                    .with_origins([origin.to_array(); 3])
                    .with_colors([
                        rerun::Color::from_rgb(255, 0, 0),
                        rerun::Color::from_rgb(0, 255, 0),
                        rerun::Color::from_rgb(0, 0, 255),
                    ])
                    .with_labels([name.to_string()]),
            ),
        );
        true
    }
}
