/// Display groups: primitive buffers sharing one rendering mode, color and
/// color-by field. One group becomes one manifest entry and one on-disk
/// data set.
use log::info;
use uuid::Uuid;

use crate::buffer::PrimitiveBuffer;
use crate::color::Color;
use crate::error::{Error, Result};
use crate::field::{FieldValues, Placement};
use crate::input::{AnalysisGeometry, ContextGeometry, GeometrySection, MatchingMethod};
use crate::manifest::{DataSetEntry, DataSetMapper, DataSetMetaData, DataSetProperty};

/// Rendering mode for a display group.
///
/// The numeric values follow the viewer's representation encoding. The
/// archive format only understands representations 0-2, so
/// `SurfaceWithEdges` is clamped down at export time while edge visibility
/// is derived from the original mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
pub enum DisplayMode {
    Points = 0,
    Wireframe = 1,
    #[default]
    Surface = 2,
    SurfaceWithEdges = 3,
}

impl DisplayMode {
    /// The representation code written to the manifest, clamped to 0-2.
    pub fn representation(self) -> u8 {
        (self as u8).min(2)
    }

    /// Edges are visible in Wireframe and SurfaceWithEdges modes. Derived
    /// from the pre-clamp mode.
    pub fn edge_visibility(self) -> bool {
        matches!(self, DisplayMode::Wireframe | DisplayMode::SurfaceWithEdges)
    }
}

/// A collection of primitive buffers with shared display attributes.
///
/// All buffers in one group carry identically-named fields; the color-by
/// name must exist in at least the first buffer and setting it cascades to
/// every owned buffer.
#[derive(Debug, Clone)]
pub struct DisplayGroup {
    pub name: String,
    /// Stable identifier used as the on-disk sub-folder name. Generated
    /// when the input does not provide one.
    pub identifier: String,
    buffers: Vec<PrimitiveBuffer>,
    /// Flat color used when the group is not colored by a field.
    pub color: Option<Color>,
    pub display_mode: DisplayMode,
    pub hidden: bool,
}

impl DisplayGroup {
    pub fn new(name: impl Into<String>, identifier: Option<String>) -> Self {
        let identifier = match identifier {
            Some(id) if !id.is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };
        Self {
            name: name.into(),
            identifier,
            buffers: Vec::new(),
            color: None,
            display_mode: DisplayMode::Surface,
            hidden: false,
        }
    }

    pub fn push_buffer(&mut self, buffer: PrimitiveBuffer) {
        self.buffers.push(buffer);
    }

    pub fn buffers(&self) -> &[PrimitiveBuffer] {
        &self.buffers
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// The active color-by field, read from the first buffer.
    pub fn color_by(&self) -> Option<&str> {
        self.buffers.first().and_then(PrimitiveBuffer::active_field)
    }

    /// Set the field used for color mapping, cascading to every buffer.
    pub fn set_color_by(&mut self, name: &str) -> Result<()> {
        for buffer in &mut self.buffers {
            buffer.set_active_field(name)?;
        }
        Ok(())
    }

    /// Build a display group from an analysis geometry section, reconciling
    /// the declared value-matching convention with the converted buffers.
    pub fn from_analysis_geometry(geometry: &AnalysisGeometry) -> Result<Self> {
        let (mut buffers, forced_vertices) = convert_entities(&geometry.geometry)?;

        let matching = if forced_vertices {
            MatchingMethod::Vertices
        } else {
            geometry.matching_method()?
        };

        let mut color_by = None;
        for (count, data_set) in geometry.data_sets.iter().enumerate() {
            let name = data_set.name();
            let values = FieldValues::from_json(&name, &data_set.values)?;
            attach_data_set(&mut buffers, &name, values, matching, data_set)?;
            if count == geometry.active_data {
                color_by = Some(name);
            }
        }

        let mut group = Self::new(
            geometry.display_name(),
            Some(geometry.identifier.clone()),
        );
        group.buffers = buffers;
        group.display_mode = geometry.display_mode;
        group.hidden = geometry.hidden;
        if let Some(name) = color_by {
            group.set_color_by(&name)?;
        }
        Ok(group)
    }

    /// Build a display group from a context geometry section. Context
    /// entities carry no value arrays; display attributes come from the
    /// first entity's payload when present, assuming the group is visually
    /// homogeneous.
    pub fn from_context_geometry(geometry: &ContextGeometry) -> Result<Self> {
        let (buffers, _) = convert_entities(&geometry.geometry)?;

        let display = geometry
            .geometry
            .first()
            .and_then(|entity| entity.display)
            .unwrap_or_default();

        let mut group = Self::new(
            geometry.display_name(),
            Some(geometry.identifier.clone()),
        );
        group.buffers = buffers;
        group.display_mode = display.display_mode.unwrap_or_default();
        group.color = display.color;
        group.hidden = geometry.hidden;
        Ok(group)
    }

    pub fn from_section(section: &GeometrySection) -> Result<Self> {
        match section {
            GeometrySection::AnalysisGeometry(geometry) => Self::from_analysis_geometry(geometry),
            GeometrySection::ContextGeometry(geometry) => Self::from_context_geometry(geometry),
        }
    }

    /// The single buffer this group exports: the only owned buffer, or all
    /// owned buffers merged into one.
    pub fn export_buffer(&self) -> Option<PrimitiveBuffer> {
        match self.buffers.len() {
            0 => None,
            1 => Some(self.buffers[0].clone()),
            _ => Some(PrimitiveBuffer::join(&self.buffers)),
        }
    }

    /// The manifest entry for this group, using `fallback_color` when no
    /// override color is set.
    pub fn to_manifest_entry(&self, fallback_color: Color) -> DataSetEntry {
        let color = self.color.unwrap_or(fallback_color);
        let property = DataSetProperty {
            representation: self.display_mode.representation(),
            edge_visibility: u8::from(self.display_mode.edge_visibility()),
            diffuse_color: color.to_decimal_rgb(),
            opacity: color.opacity(),
            ..DataSetProperty::default()
        };

        let mapper = DataSetMapper {
            color_by_array_name: self.color_by().unwrap_or_default().to_string(),
            ..DataSetMapper::default()
        };

        // all buffers in a group carry the same fields; read the first
        let metadata = self
            .buffers
            .first()
            .map(|buffer| {
                buffer
                    .fields()
                    .map(|(_, field)| DataSetMetaData {
                        legend_parameters: field.range,
                        unit: field.unit.clone(),
                        data_type: field.data_type.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        DataSetEntry::new(&self.name, &self.identifier, property, mapper, metadata, self.hidden)
    }
}

/// Convert an entity list into buffers, collapsing an all-points list into
/// one merged points buffer. Returns the buffers and whether the collapse
/// forced per-vertex matching.
fn convert_entities(entities: &[crate::geometry::Entity]) -> Result<(Vec<PrimitiveBuffer>, bool)> {
    if !entities.is_empty() && entities.iter().all(|e| e.shape.is_point()) {
        let points = entities
            .iter()
            .filter_map(|e| e.shape.as_point())
            .collect::<Vec<_>>();
        info!("collapsed {} point entities into a single buffer", points.len());
        return Ok((vec![PrimitiveBuffer::from_points(points)], true));
    }

    if entities.len() > 1 && entities.iter().all(|e| e.shape.is_mesh()) {
        let converted = entities
            .iter()
            .map(|e| e.shape.to_buffer())
            .collect::<Result<Vec<_>>>()?;
        return Ok((vec![PrimitiveBuffer::join(&converted)], false));
    }

    let buffers = entities
        .iter()
        .map(|e| e.shape.to_buffer())
        .collect::<Result<Vec<_>>>()?;
    Ok((buffers, false))
}

/// Attach one named value array to the buffers under the declared matching
/// convention, slicing the array across buffers when more than one survives.
fn attach_data_set(
    buffers: &mut [PrimitiveBuffer],
    name: &str,
    values: FieldValues,
    matching: MatchingMethod,
    data_set: &crate::input::VisualizationData,
) -> Result<()> {
    let placement = match matching {
        MatchingMethod::Geometry => return Err(Error::PerObjectUnsupported),
        MatchingMethod::Faces => Placement::PerFace,
        MatchingMethod::Vertices => Placement::PerPoint,
    };

    let explicit = data_set.legend_parameters;
    let unit = data_set.unit.clone();
    let data_type = data_set.data_type.clone();

    if buffers.len() == 1 {
        return buffers[0].add_field(
            name,
            values,
            placement,
            explicit,
            unit,
            data_type,
        );
    }

    // several surviving buffers: slice contiguous runs sized by each
    // buffer's own count, in original entity order
    let total: usize = buffers
        .iter()
        .map(|b| match placement {
            Placement::PerFace => b.cell_count(),
            Placement::PerPoint => b.point_count(),
        })
        .sum();
    if values.len() != total {
        return Err(Error::ArrayLengthMismatch {
            name: name.to_string(),
            expected: total,
            actual: values.len(),
            placement: placement.label(),
        });
    }

    let mut start = 0;
    for buffer in buffers.iter_mut() {
        let len = match placement {
            Placement::PerFace => buffer.cell_count(),
            Placement::PerPoint => buffer.point_count(),
        };
        buffer.add_field(
            name,
            values.slice(start, len),
            placement,
            explicit,
            unit.clone(),
            data_type.clone(),
        )?;
        start += len;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analysis_from_json(value: serde_json::Value) -> AnalysisGeometry {
        serde_json::from_value(value).unwrap()
    }

    fn point_entity(x: f64) -> serde_json::Value {
        json!({"type": "Point3D", "x": x, "y": 0.0, "z": 0.0})
    }

    fn quad_mesh_entity() -> serde_json::Value {
        json!({
            "type": "Mesh3D",
            "vertices": [
                [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0], [2.0, 0.0, 0.0], [2.0, 1.0, 0.0]
            ],
            "faces": [[0, 1, 2, 3], [1, 4, 5, 2]]
        })
    }

    #[test]
    fn representation_clamps_surface_with_edges() {
        assert_eq!(DisplayMode::SurfaceWithEdges.representation(), 2);
        assert_eq!(DisplayMode::Surface.representation(), 2);
        assert_eq!(DisplayMode::Wireframe.representation(), 1);
        assert_eq!(DisplayMode::Points.representation(), 0);
    }

    #[test]
    fn edge_visibility_tracks_the_pre_clamp_mode() {
        assert!(DisplayMode::SurfaceWithEdges.edge_visibility());
        assert!(DisplayMode::Wireframe.edge_visibility());
        assert!(!DisplayMode::Surface.edge_visibility());
        assert!(!DisplayMode::Points.edge_visibility());
    }

    #[test]
    fn per_object_matching_fails_fast() {
        let geometry = analysis_from_json(json!({
            "type": "AnalysisGeometry",
            "identifier": "ag",
            "geometry": [quad_mesh_entity(), quad_mesh_entity()],
            "data_sets": [{"values": [1.0, 2.0]}],
            "matching_method": "geometry"
        }));
        let err = DisplayGroup::from_analysis_geometry(&geometry).unwrap_err();
        assert!(matches!(err, Error::PerObjectUnsupported));
    }

    #[test]
    fn point_entities_collapse_into_one_buffer() {
        let geometry = analysis_from_json(json!({
            "type": "AnalysisGeometry",
            "identifier": "pts",
            "geometry": [point_entity(0.0), point_entity(1.0), point_entity(2.0)],
            "data_sets": [{"values": [10.0, 20.0, 30.0]}]
        }));
        let group = DisplayGroup::from_analysis_geometry(&geometry).unwrap();
        assert_eq!(group.buffers().len(), 1);
        assert_eq!(group.buffers()[0].point_count(), 3);
        // values are attached per point on the merged buffer
        let field = group.buffers()[0].field("untitled").unwrap();
        assert_eq!(field.placement, Placement::PerPoint);
    }

    #[test]
    fn sibling_meshes_merge_before_field_attachment() {
        let geometry = analysis_from_json(json!({
            "type": "AnalysisGeometry",
            "identifier": "meshes",
            "geometry": [quad_mesh_entity(), quad_mesh_entity()],
            "data_sets": [{"values": [1.0, 2.0, 3.0, 4.0]}]
        }));
        let group = DisplayGroup::from_analysis_geometry(&geometry).unwrap();
        assert_eq!(group.buffers().len(), 1);
        assert_eq!(group.buffers()[0].cell_count(), 4);
        assert_eq!(group.color_by(), Some("untitled"));
    }

    #[test]
    fn face_values_slice_across_mixed_buffers() {
        let geometry = analysis_from_json(json!({
            "type": "AnalysisGeometry",
            "identifier": "mixed",
            "geometry": [
                quad_mesh_entity(),
                {"type": "Face3D", "boundary": [
                    [0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0]
                ]}
            ],
            "data_sets": [{"values": [1.0, 2.0, 3.0]}]
        }));
        let group = DisplayGroup::from_analysis_geometry(&geometry).unwrap();
        assert_eq!(group.buffers().len(), 2);
        let first = group.buffers()[0].field("untitled").unwrap();
        let second = group.buffers()[1].field("untitled").unwrap();
        assert_eq!(first.values, FieldValues::Float(vec![1.0, 2.0]));
        assert_eq!(second.values, FieldValues::Float(vec![3.0]));
    }

    #[test]
    fn slicing_shortfall_is_a_length_mismatch() {
        let geometry = analysis_from_json(json!({
            "type": "AnalysisGeometry",
            "identifier": "mixed",
            "geometry": [
                quad_mesh_entity(),
                {"type": "Face3D", "boundary": [
                    [0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0]
                ]}
            ],
            "data_sets": [{"values": [1.0, 2.0, 3.0, 4.0]}],
            "matching_method": "faces"
        }));
        let err = DisplayGroup::from_analysis_geometry(&geometry).unwrap_err();
        assert!(matches!(err, Error::ArrayLengthMismatch { .. }));
    }

    #[test]
    fn active_data_index_selects_the_color_by_field() {
        let geometry = analysis_from_json(json!({
            "type": "AnalysisGeometry",
            "identifier": "ag",
            "geometry": [quad_mesh_entity()],
            "data_sets": [
                {"values": [1.0, 2.0], "data_type": {"name": "Temperature", "base_unit": "C"}},
                {"values": [5.0, 6.0], "data_type": {"name": "Illuminance", "base_unit": "lux"}}
            ],
            "active_data": 1
        }));
        let group = DisplayGroup::from_analysis_geometry(&geometry).unwrap();
        assert_eq!(group.color_by(), Some("Illuminance"));
    }

    #[test]
    fn context_geometry_takes_display_from_first_entity() {
        let geometry: ContextGeometry = serde_json::from_value(json!({
            "type": "ContextGeometry",
            "identifier": "ctx",
            "geometry": [
                {
                    "type": "Point3D", "x": 0.0, "y": 0.0, "z": 0.0,
                    "display": {
                        "color": {"r": 255, "g": 0, "b": 0},
                        "display_mode": "Wireframe"
                    }
                }
            ],
            "hidden": true
        }))
        .unwrap();
        let group = DisplayGroup::from_context_geometry(&geometry).unwrap();
        assert_eq!(group.display_mode, DisplayMode::Wireframe);
        assert_eq!(group.color.unwrap().r, 255);
        assert!(group.hidden);
    }

    #[test]
    fn context_geometry_without_payload_defaults_to_surface() {
        let geometry: ContextGeometry = serde_json::from_value(json!({
            "type": "ContextGeometry",
            "identifier": "ctx",
            "geometry": [point_entity(0.0), point_entity(1.0)]
        }))
        .unwrap();
        let group = DisplayGroup::from_context_geometry(&geometry).unwrap();
        assert_eq!(group.display_mode, DisplayMode::Surface);
        assert!(group.color.is_none());
        // all-point context lists collapse the same way
        assert_eq!(group.buffers().len(), 1);
    }

    #[test]
    fn empty_identifier_gets_a_generated_uuid() {
        let group = DisplayGroup::new("g", Some(String::new()));
        assert!(!group.identifier.is_empty());
        let group = DisplayGroup::new("g", None);
        assert!(!group.identifier.is_empty());
    }

    #[test]
    fn manifest_entry_reflects_display_state() {
        let geometry = analysis_from_json(json!({
            "type": "AnalysisGeometry",
            "identifier": "ag",
            "geometry": [quad_mesh_entity()],
            "data_sets": [{
                "values": [20.0, 22.5],
                "data_type": {"name": "Temperature", "base_unit": "C"}
            }],
            "display_mode": "SurfaceWithEdges"
        }));
        let mut group = DisplayGroup::from_analysis_geometry(&geometry).unwrap();
        group.name = "Data".to_string();
        let entry = group.to_manifest_entry(Color::default());
        assert_eq!(entry.property.representation, 2);
        assert_eq!(entry.property.edge_visibility, 1);
        assert_eq!(entry.mapper.color_by_array_name, "Temperature");
        assert_eq!(entry.metadata[0].unit, "C");
    }
}
