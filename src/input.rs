/// The visualization-set input schema: the external description this crate
/// consumes but does not own.
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::display::DisplayMode;
use crate::error::{Error, Result};
use crate::field::{DataTypeTag, RangeBounds};
use crate::geometry::Entity;

/// How a value array maps onto the geometry it decorates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchingMethod {
    /// One value per original entity. Not supported by the archive format.
    Geometry,
    /// One value per face/cell.
    Faces,
    /// One value per vertex/point.
    Vertices,
}

/// A named scalar array with optional legend and type information.
#[derive(Debug, Clone, Deserialize)]
pub struct VisualizationData {
    pub values: Vec<Value>,
    #[serde(default)]
    pub legend_parameters: Option<RangeBounds>,
    #[serde(default)]
    pub data_type: Option<DataTypeTag>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl VisualizationData {
    /// The field name for this data set, from its data type when named.
    pub fn name(&self) -> String {
        match &self.data_type {
            Some(tag) if !tag.name.is_empty() => tag.name.clone(),
            _ => "untitled".to_string(),
        }
    }
}

/// Geometry decorated with zero or more value arrays and a declared active
/// data set.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisGeometry {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub geometry: Vec<Entity>,
    #[serde(default)]
    pub data_sets: Vec<VisualizationData>,
    #[serde(default)]
    pub active_data: usize,
    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default)]
    pub hidden: bool,
    /// Explicit matching convention; derived from value counts when absent.
    #[serde(default)]
    pub matching_method: Option<MatchingMethod>,
}

impl AnalysisGeometry {
    pub fn display_name(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| self.identifier.clone())
    }

    /// The matching convention in effect: the declared one, or the one
    /// derived by comparing the first data set's length against the entity
    /// count, total face count and total vertex count, in that order.
    pub fn matching_method(&self) -> Result<MatchingMethod> {
        if let Some(declared) = self.matching_method {
            return Ok(declared);
        }

        let Some(first) = self.data_sets.first() else {
            return Ok(MatchingMethod::Faces);
        };
        let count = first.values.len();

        if count == self.geometry.len() {
            return Ok(MatchingMethod::Geometry);
        }
        let faces: usize = self.geometry.iter().map(|e| e.shape.face_count()).sum();
        if count == faces {
            return Ok(MatchingMethod::Faces);
        }
        let vertices: usize = self.geometry.iter().map(|e| e.shape.vertex_count()).sum();
        if count == vertices {
            return Ok(MatchingMethod::Vertices);
        }
        Err(Error::InvalidInput(format!(
            "length of data set \"{}\" ({}) matches neither the entity count ({}), \
             the face count ({}) nor the vertex count ({})",
            first.name(),
            count,
            self.geometry.len(),
            faces,
            vertices,
        )))
    }
}

/// Geometry with no value arrays, displayed with flat attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextGeometry {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub geometry: Vec<Entity>,
    #[serde(default)]
    pub hidden: bool,
}

impl ContextGeometry {
    pub fn display_name(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| self.identifier.clone())
    }
}

/// One named section of a visualization set.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum GeometrySection {
    AnalysisGeometry(AnalysisGeometry),
    ContextGeometry(ContextGeometry),
}

/// The top-level visualization description.
#[derive(Debug, Clone, Deserialize)]
pub struct VisualizationSet {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub geometry: Vec<GeometrySection>,
}

impl VisualizationSet {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
