use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackingError};
use crate::io::object_from_json;
use crate::types::PlacementOffset;

/// Cosmetic color of generated indicators, channels normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl IndicatorColor {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> IndicatorColor {
        IndicatorColor { r, g, b, a }
    }

    pub fn to_rgba8(&self) -> (u8, u8, u8, u8) {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b), q(self.a))
    }

    fn channels(&self) -> [(&'static str, f32); 4] {
        [("r", self.r), ("g", self.g), ("b", self.b), ("a", self.a)]
    }
}

impl Default for IndicatorColor {
    /// System blue highlight at 80% opacity.
    fn default() -> Self {
        Self {
            r: 0.0,
            g: 0.478,
            b: 1.0,
            a: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub placement_offset: PlacementOffset,
    pub create_indicator_entity: bool,
    pub indicator_color: IndicatorColor,
    /// Pre-existing scene entity moved onto each detected image.
    pub entity_to_place_name: Option<String>,
    /// Reference image group the session watches; read only when a session opens.
    pub reference_image_group_name: Option<String>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            placement_offset: PlacementOffset::ZERO,
            create_indicator_entity: true,
            indicator_color: IndicatorColor::default(),
            entity_to_place_name: None,
            reference_image_group_name: None,
        }
    }
}

impl TrackingConfig {
    pub fn with_placement_offset(mut self, offset: PlacementOffset) -> Self {
        self.placement_offset = offset;
        self
    }

    pub fn with_indicator(mut self, create_indicator_entity: bool) -> Self {
        self.create_indicator_entity = create_indicator_entity;
        self
    }

    pub fn with_entity_to_place(mut self, name: impl Into<String>) -> Self {
        self.entity_to_place_name = Some(name.into());
        self
    }

    pub fn with_reference_image_group(mut self, name: impl Into<String>) -> Self {
        self.reference_image_group_name = Some(name.into());
        self
    }

    /// Loads a config from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &str) -> Result<TrackingConfig> {
        let config: TrackingConfig = object_from_json(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let offset = self.placement_offset;
        if !(offset.x.is_finite() && offset.y.is_finite() && offset.z.is_finite()) {
            return Err(TrackingError::InvalidConfig {
                field: "placement_offset".to_string(),
                message: format!("components must be finite, got {:?}", offset),
            });
        }
        for (channel, value) in self.indicator_color.channels() {
            if !(0.0..=1.0).contains(&value) {
                return Err(TrackingError::InvalidConfig {
                    field: format!("indicator_color.{}", channel),
                    message: format!("{} is outside [0, 1]", value),
                });
            }
        }
        if let Some(name) = &self.entity_to_place_name {
            if name.trim().is_empty() {
                return Err(TrackingError::InvalidConfig {
                    field: "entity_to_place_name".to_string(),
                    message: "must not be blank".to_string(),
                });
            }
        }
        Ok(())
    }
}
