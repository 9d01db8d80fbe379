/// Per-group data-set folder writer.
///
/// One display group becomes one folder in the archive: a dataset
/// `index.json` describing the polydata structure, with every numeric array
/// written little-endian as a standalone binary file under `data/` and
/// referenced by id. This is the layout the viewer's HttpDataSetReader
/// consumes.
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use crate::buffer::PrimitiveBuffer;
use crate::error::{Error, Result};
use crate::field::{Field, FieldValues, Placement};

/// Write `buffer` into `target` as one viewer data set. Creates the folder
/// tree; returns the dataset folder path, or `None` for an empty buffer (an
/// empty data set has no representation in the archive).
pub fn write_dataset_folder(
    buffer: &PrimitiveBuffer,
    target: &Path,
) -> Result<Option<PathBuf>> {
    if buffer.is_empty() {
        return Ok(None);
    }

    let data_dir = target.join("data");
    fs::create_dir_all(&data_dir)?;

    let mut root = Map::new();
    root.insert("vtkClass".to_string(), json!("vtkPolyData"));

    root.insert(
        "points".to_string(),
        write_points(buffer.points(), &data_dir)?,
    );
    for (key, cells) in [
        ("verts", buffer.verts()),
        ("lines", buffer.lines()),
        ("polys", buffer.polys()),
    ] {
        if !cells.is_empty() {
            root.insert(key.to_string(), write_cell_array(key, cells, &data_dir)?);
        }
    }

    let cell_fields: Vec<_> = buffer
        .fields()
        .filter(|(_, f)| f.placement == Placement::PerFace)
        .collect();
    let point_fields: Vec<_> = buffer
        .fields()
        .filter(|(_, f)| f.placement == Placement::PerPoint)
        .collect();

    if !cell_fields.is_empty() {
        root.insert(
            "cellData".to_string(),
            write_attributes("cell", &cell_fields, buffer.active_field(), &data_dir)?,
        );
    }
    if !point_fields.is_empty() {
        root.insert(
            "pointData".to_string(),
            write_attributes("point", &point_fields, buffer.active_field(), &data_dir)?,
        );
    }

    fs::write(
        target.join("index.json"),
        serde_json::to_string(&Value::Object(root))?,
    )?;
    Ok(Some(target.to_path_buf()))
}

fn data_ref(id: &str) -> Value {
    json!({"encode": "LittleEndian", "basepath": "data", "id": id})
}

fn write_points(points: &[[f64; 3]], data_dir: &Path) -> Result<Value> {
    let mut bytes = Vec::with_capacity(points.len() * 12);
    for point in points {
        for &coordinate in point {
            bytes.extend_from_slice(&(coordinate as f32).to_le_bytes());
        }
    }
    fs::write(data_dir.join("points"), bytes)?;

    Ok(json!({
        "vtkClass": "vtkPoints",
        "name": "_points",
        "numberOfComponents": 3,
        "dataType": "Float32Array",
        "size": points.len() * 3,
        "ref": data_ref("points"),
    }))
}

/// Cells in the flat vtk layout: point count followed by point indices,
/// repeated per cell.
fn write_cell_array(id: &str, cells: &[Vec<u32>], data_dir: &Path) -> Result<Value> {
    let size: usize = cells.iter().map(|c| c.len() + 1).sum();
    let mut bytes = Vec::with_capacity(size * 4);
    for cell in cells {
        bytes.extend_from_slice(&(cell.len() as u32).to_le_bytes());
        for &index in cell {
            bytes.extend_from_slice(&index.to_le_bytes());
        }
    }
    fs::write(data_dir.join(id), bytes)?;

    Ok(json!({
        "vtkClass": "vtkCellArray",
        "name": format!("_{id}"),
        "numberOfComponents": 1,
        "dataType": "Uint32Array",
        "size": size,
        "ref": data_ref(id),
    }))
}

fn write_attributes(
    kind: &str,
    fields: &[(&str, &Field)],
    active: Option<&str>,
    data_dir: &Path,
) -> Result<Value> {
    let mut arrays = Vec::with_capacity(fields.len());
    let mut active_index: i64 = -1;

    for (position, &(name, field)) in fields.iter().enumerate() {
        if active == Some(name) {
            active_index = position as i64;
        }
        arrays.push(json!({
            "data": write_value_array(kind, position, name, &field.values, data_dir)?,
        }));
    }

    Ok(json!({
        "vtkClass": "vtkDataSetAttributes",
        "activeScalars": active_index,
        "arrays": arrays,
    }))
}

fn write_value_array(
    kind: &str,
    position: usize,
    name: &str,
    values: &FieldValues,
    data_dir: &Path,
) -> Result<Value> {
    // string arrays have no binary form and stay inline
    if let FieldValues::Str(strings) = values {
        return Ok(json!({
            "vtkClass": "vtkStringArray",
            "name": name,
            "numberOfComponents": 1,
            "size": strings.len(),
            "values": strings,
        }));
    }

    let id = array_id(kind, position, name);
    let (data_type, bytes) = match values {
        FieldValues::Float(floats) => {
            let mut bytes = Vec::with_capacity(floats.len() * 8);
            for &v in floats {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            ("Float64Array", bytes)
        }
        FieldValues::Int(ints) => {
            let mut bytes = Vec::with_capacity(ints.len() * 4);
            for &v in ints {
                let v = i32::try_from(v).map_err(|_| {
                    Error::InvalidInput(format!(
                        "value {v} in \"{name}\" exceeds the 32-bit integer \
                         range of the archive format"
                    ))
                })?;
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            ("Int32Array", bytes)
        }
        FieldValues::Str(_) => unreachable!(),
    };
    fs::write(data_dir.join(&id), bytes)?;

    Ok(json!({
        "vtkClass": "vtkDataArray",
        "name": name,
        "numberOfComponents": 1,
        "dataType": data_type,
        "size": values.len(),
        "ref": data_ref(&id),
    }))
}

/// Deterministic file id for a field array; field names may hold characters
/// that are not filesystem-safe.
fn array_id(kind: &str, position: usize, name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{kind}_{position}_{safe}")
}
