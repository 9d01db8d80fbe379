/// In-memory points + cells + fields container, the unit of exportable
/// visual data.
use crate::error::{Error, Result};
use crate::field::{resolve_range, DataTypeTag, Field, FieldValues, Placement, RangeBounds};

/// A polygonal data buffer with three kinds of cells: vertex cells, line
/// cells and polygon cells. Field arrays are kept in attachment order and at
/// most one field is active (the color-by field) at a time.
///
/// Every attached array's length must equal the number of cells (per-face
/// placement) or the number of points (per-point placement); a violation is a
/// fatal input error and leaves the buffer unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimitiveBuffer {
    points: Vec<[f64; 3]>,
    verts: Vec<Vec<u32>>,
    lines: Vec<Vec<u32>>,
    polys: Vec<Vec<u32>>,
    fields: Vec<(String, Field)>,
    active_field: Option<String>,
}

impl PrimitiveBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer holding loose points as a single vertex cell.
    pub fn from_points(points: Vec<[f64; 3]>) -> Self {
        let cell = (0..points.len() as u32).collect();
        Self {
            verts: vec![cell],
            points,
            ..Self::default()
        }
    }

    /// A buffer holding one polyline through the given points.
    pub fn from_polyline(points: Vec<[f64; 3]>) -> Self {
        let cell = (0..points.len() as u32).collect();
        Self {
            lines: vec![cell],
            points,
            ..Self::default()
        }
    }

    /// A buffer holding a face mesh: one polygon cell per face.
    pub fn from_mesh(vertices: Vec<[f64; 3]>, faces: Vec<Vec<u32>>) -> Self {
        Self {
            points: vertices,
            polys: faces,
            ..Self::default()
        }
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn cell_count(&self) -> usize {
        self.verts.len() + self.lines.len() + self.polys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    pub fn verts(&self) -> &[Vec<u32>] {
        &self.verts
    }

    pub fn lines(&self) -> &[Vec<u32>] {
        &self.lines
    }

    pub fn polys(&self) -> &[Vec<u32>] {
        &self.polys
    }

    /// Attach a named value array.
    ///
    /// Fails if a field with the same name exists, if the array length does
    /// not match the target count for its placement, or if the legend range
    /// is invalid. On failure the field set is unchanged.
    pub fn add_field(
        &mut self,
        name: &str,
        values: FieldValues,
        placement: Placement,
        explicit_range: Option<RangeBounds>,
        unit: Option<String>,
        data_type: Option<DataTypeTag>,
    ) -> Result<()> {
        if self.fields.iter().any(|(n, _)| n == name) {
            return Err(Error::DuplicateField(name.to_string()));
        }

        let expected = match placement {
            Placement::PerFace => self.cell_count(),
            Placement::PerPoint => self.point_count(),
        };
        if values.len() != expected {
            return Err(Error::ArrayLengthMismatch {
                name: name.to_string(),
                expected,
                actual: values.len(),
                placement: placement.label(),
            });
        }

        let range = resolve_range(name, &values, explicit_range)?;
        let data_type = data_type.unwrap_or_default();
        let unit = match unit {
            Some(u) if !u.is_empty() => u,
            _ => data_type.base_unit.clone(),
        };
        self.fields.push((
            name.to_string(),
            Field {
                values,
                placement,
                range,
                unit,
                data_type,
            },
        ));
        Ok(())
    }

    /// Mark a field as the one used for color mapping at export time.
    pub fn set_active_field(&mut self, name: &str) -> Result<()> {
        if !self.fields.iter().any(|(n, _)| n == name) {
            return Err(Error::UnknownField {
                name: name.to_string(),
                available: self.field_names().map(str::to_owned).collect(),
            });
        }
        self.active_field = Some(name.to_string());
        Ok(())
    }

    pub fn active_field(&self) -> Option<&str> {
        self.active_field.as_deref()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Fields in attachment order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }

    /// Merge several buffers into one. Geometry is always appended, with
    /// point indices offset past the points already present. A field survives
    /// the merge only when every input carries a field of the same name,
    /// placement and kind; others are dropped. The active field is kept when
    /// all inputs agree on it.
    pub fn join(buffers: &[PrimitiveBuffer]) -> PrimitiveBuffer {
        let mut joined = PrimitiveBuffer::new();
        for buffer in buffers {
            joined.append_geometry(buffer);
        }

        let Some(first) = buffers.first() else {
            return joined;
        };

        for (name, field) in &first.fields {
            let shared = buffers.iter().all(|b| {
                b.field(name).is_some_and(|f| {
                    f.placement == field.placement && f.values.same_kind(&field.values)
                })
            });
            if !shared {
                continue;
            }
            let mut values = field.values.clone();
            for buffer in &buffers[1..] {
                if let Some(f) = buffer.field(name) {
                    values.extend(&f.values);
                }
            }
            joined.fields.push((
                name.clone(),
                Field {
                    values,
                    placement: field.placement,
                    range: field.range,
                    unit: field.unit.clone(),
                    data_type: field.data_type.clone(),
                },
            ));
        }

        if let Some(active) = first.active_field.as_deref() {
            let agreed = buffers.iter().all(|b| b.active_field() == Some(active));
            if agreed && joined.field(active).is_some() {
                joined.active_field = Some(active.to_string());
            }
        }

        joined
    }

    fn append_geometry(&mut self, other: &PrimitiveBuffer) {
        let offset = self.points.len() as u32;
        self.points.extend_from_slice(&other.points);
        for (target, source) in [
            (&mut self.verts, &other.verts),
            (&mut self.lines, &other.lines),
            (&mut self.polys, &other.polys),
        ] {
            for cell in source {
                target.push(cell.iter().map(|i| i + offset).collect());
            }
        }
    }
}
