//! Shared configuration for meshedit
//!
//! This crate provides the single source of truth for the tunables used by
//! the mesh orchestrators (simplification, isotropic remeshing) and by the
//! interactive bevel/extrude position updaters.

use serde::{Deserialize, Serialize};

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Default fraction of faces kept by simplification
pub const DEFAULT_SIMPLIFY_TARGET_RATIO: f32 = 0.25;

/// Simplification never reduces a mesh below this many faces
pub const DEFAULT_SIMPLIFY_MIN_FACES: usize = 4;

/// Default number of split/collapse/flip/smooth passes
pub const DEFAULT_REMESH_ITERATIONS: usize = 6;

/// Edges longer than `target * ratio` are split
pub const DEFAULT_REMESH_SPLIT_RATIO: f32 = 4.0 / 3.0;

/// Edges shorter than `target * ratio` are collapsed
pub const DEFAULT_REMESH_COLLAPSE_RATIO: f32 = 4.0 / 5.0;

/// Damping applied to tangential smoothing (0 = none, 1 = full centroid)
pub const DEFAULT_REMESH_SMOOTHING: f32 = 0.2;

/// Tangent offset applied to the bevelled ring during vertex extrusion
pub const DEFAULT_EXTRUDE_TANGENT_OFFSET: f32 = 0.667;

/// Settings for quadric error simplification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct SimplifyConfig {
    /// Fraction of the current face count to keep
    pub target_ratio: f32,
    /// Lower bound on the face count
    pub min_faces: usize,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            target_ratio: DEFAULT_SIMPLIFY_TARGET_RATIO,
            min_faces: DEFAULT_SIMPLIFY_MIN_FACES,
        }
    }
}

impl SimplifyConfig {
    /// Face budget for a mesh that currently has `face_count` faces
    pub fn target_faces(&self, face_count: usize) -> usize {
        let scaled = (face_count as f32 * self.target_ratio.clamp(0.0, 1.0)).round() as usize;
        scaled.max(self.min_faces)
    }
}

/// Settings for isotropic remeshing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct RemeshConfig {
    /// Number of full passes
    pub iterations: usize,
    /// Split threshold as a multiple of the target length
    pub split_ratio: f32,
    /// Collapse threshold as a multiple of the target length
    pub collapse_ratio: f32,
    /// Tangential smoothing weight per pass
    pub smoothing: f32,
    /// Explicit target edge length. `None` uses the mean edge length
    /// measured before the first pass.
    pub target_length: Option<f32>,
}

impl Default for RemeshConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_REMESH_ITERATIONS,
            split_ratio: DEFAULT_REMESH_SPLIT_RATIO,
            collapse_ratio: DEFAULT_REMESH_COLLAPSE_RATIO,
            smoothing: DEFAULT_REMESH_SMOOTHING,
            target_length: None,
        }
    }
}

/// Interactive bevel parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct BevelConfig {
    /// Offset along the surface (vertex/edge bevel: fraction of the spoke edge)
    pub tangent_offset: f32,
    /// Offset along the face normal (face bevel only)
    pub normal_offset: f32,
    /// Negate the normal offset
    pub flip_orientation: bool,
    /// Tangent offset used by vertex extrusion
    pub extrude_tangent_offset: f32,
}

impl Default for BevelConfig {
    fn default() -> Self {
        Self {
            tangent_offset: 0.0,
            normal_offset: 0.0,
            flip_orientation: false,
            extrude_tangent_offset: DEFAULT_EXTRUDE_TANGENT_OFFSET,
        }
    }
}

/// All editor settings in one document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct EditConfig {
    pub simplify: SimplifyConfig,
    pub remesh: RemeshConfig,
    pub bevel: BevelConfig,
}

impl EditConfig {
    /// Parse settings from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize settings to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
