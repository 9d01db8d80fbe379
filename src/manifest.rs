/// Scene manifest (`index.json`) schema for the vtkjs archive.
///
/// Field names and defaults follow the viewer's expected wire format, so
/// most structs rename to camelCase explicitly.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::field::{DataTypeTag, LegendRange};

/// Initial camera in the viewer.
#[derive(Debug, Clone, Serialize)]
pub struct Camera {
    #[serde(rename = "focalPoint")]
    pub focal_point: [f64; 3],
    pub position: [f64; 3],
    #[serde(rename = "viewUp")]
    pub view_up: [f64; 3],
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            focal_point: [2.5, 5.0, 1.5],
            position: [19.3843, -6.75305, 10.2683],
            view_up: [-0.303079, 0.250543, 0.919441],
        }
    }
}

/// Relative path to a data-set folder inside the archive.
#[derive(Debug, Clone, Serialize)]
pub struct DataSetResource {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataSetActor {
    pub origin: [f64; 3],
    pub scale: [f64; 3],
    pub position: [f64; 3],
}

impl Default for DataSetActor {
    fn default() -> Self {
        Self {
            origin: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
            position: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DataSetMapper {
    #[serde(rename = "colorByArrayName")]
    pub color_by_array_name: String,
    #[serde(rename = "colorMode")]
    pub color_mode: i32,
    #[serde(rename = "scalarMode")]
    pub scalar_mode: i32,
}

impl Default for DataSetMapper {
    fn default() -> Self {
        Self {
            color_by_array_name: String::new(),
            color_mode: 0,
            scalar_mode: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DataSetProperty {
    pub representation: u8,
    #[serde(rename = "edgeVisibility")]
    pub edge_visibility: u8,
    #[serde(rename = "diffuseColor")]
    pub diffuse_color: [f64; 3],
    #[serde(rename = "pointSize")]
    pub point_size: i32,
    pub opacity: f64,
}

impl Default for DataSetProperty {
    fn default() -> Self {
        Self {
            representation: 2,
            edge_visibility: 0,
            diffuse_color: [0.8, 0.8, 0.8],
            point_size: 5,
            opacity: 1.0,
        }
    }
}

/// Per-field legend and type information carried alongside a data set.
#[derive(Debug, Clone, Serialize)]
pub struct DataSetMetaData {
    pub legend_parameters: LegendRange,
    pub unit: String,
    pub data_type: DataTypeTag,
}

/// One scene entry: a data set read from a sub-folder of the archive.
#[derive(Debug, Clone, Serialize)]
pub struct DataSetEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "httpDataSetReader")]
    pub http_data_set_reader: DataSetResource,
    pub actor: DataSetActor,
    #[serde(rename = "actorRotation")]
    pub actor_rotation: [f64; 4],
    pub mapper: DataSetMapper,
    pub property: DataSetProperty,
    pub metadata: Vec<DataSetMetaData>,
    pub hidden: bool,
}

impl DataSetEntry {
    pub fn new(
        name: &str,
        url: &str,
        property: DataSetProperty,
        mapper: DataSetMapper,
        metadata: Vec<DataSetMetaData>,
        hidden: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind: "httpDataSetReader".to_string(),
            http_data_set_reader: DataSetResource {
                url: url.to_string(),
            },
            actor: DataSetActor::default(),
            actor_rotation: [0.0, 0.0, 0.0, 1.0],
            mapper,
            property,
            metadata,
            hidden,
        }
    }
}

/// The top-level scene manifest written as `index.json`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexJson {
    pub version: i32,
    pub background: [f64; 3],
    pub camera: Camera,
    #[serde(rename = "centerOfRotation")]
    pub center_of_rotation: [f64; 3],
    pub scene: Vec<DataSetEntry>,
    #[serde(rename = "lookupTables")]
    pub lookup_tables: BTreeMap<String, Value>,
}

impl Default for IndexJson {
    fn default() -> Self {
        Self {
            version: 1,
            background: [1.0, 1.0, 1.0],
            camera: Camera::default(),
            center_of_rotation: [2.5, 5.0, 1.5],
            scene: Vec::new(),
            lookup_tables: BTreeMap::new(),
        }
    }
}

impl IndexJson {
    /// Write the manifest as `index.json` inside `folder`, creating the
    /// folder when needed.
    pub fn to_json(&self, folder: &Path) -> Result<PathBuf> {
        fs::create_dir_all(folder)?;
        let path = folder.join("index.json");
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }
}
