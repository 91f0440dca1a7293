//! Tuning constants for the particle field
//!
//! Every knob has a default matching the shipped background. A partial JSON
//! object (from the canvas `data-field-config` attribute or a CLI `--config`
//! file) overrides only the fields it names.

use serde::{Deserialize, Serialize};

/// Nodes generated per batch
pub const NODE_COUNT: usize = 60;
/// Max distance for a normal edge between two nodes
pub const CONNECT_DIST: f64 = 160.0;
/// Max pointer distance for a node to count as "near"
pub const POINTER_DIST: f64 = 200.0;
/// Fraction of the container that must be on screen to keep animating
pub const VISIBILITY_THRESHOLD: f64 = 0.1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub node_count: usize,
    pub connect_dist: f64,
    pub pointer_dist: f64,
    /// Peak alpha of a normal edge (at distance 0)
    pub edge_alpha: f64,
    /// Peak alpha of a highlighted edge (at distance 0)
    pub glow_alpha: f64,
    /// Radius multiplier for near nodes
    pub glow_scale: f64,
    pub edge_width: f64,
    pub glow_width: f64,
    /// Velocity components are drawn from [-max_speed/2, max_speed/2)
    pub max_speed: f64,
    pub min_radius: f64,
    /// Radii are drawn from [min_radius, min_radius + radius_spread)
    pub radius_spread: f64,
    pub visibility_threshold: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            node_count: NODE_COUNT,
            connect_dist: CONNECT_DIST,
            pointer_dist: POINTER_DIST,
            edge_alpha: 0.18,
            glow_alpha: 0.4,
            glow_scale: 1.8,
            edge_width: 1.0,
            glow_width: 1.5,
            max_speed: 0.4,
            min_radius: 1.5,
            radius_spread: 2.0,
            visibility_threshold: VISIBILITY_THRESHOLD,
        }
    }
}

impl FieldConfig {
    /// Parse a (possibly partial) JSON override
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Alpha of a normal edge between two nodes `dist` apart
    #[inline]
    pub fn edge_alpha_at(&self, dist: f64) -> f64 {
        (1.0 - dist / self.connect_dist) * self.edge_alpha
    }

    /// Alpha of a highlighted edge between two nodes `dist` apart
    #[inline]
    pub fn glow_alpha_at(&self, dist: f64) -> f64 {
        (1.0 - dist / self.connect_dist) * self.glow_alpha
    }
}
