/// Typed value arrays attached to primitive buffers, with legend range
/// resolution.
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Whether values map one-per-cell or one-per-point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    PerFace,
    PerPoint,
}

impl Placement {
    pub fn label(self) -> &'static str {
        match self {
            Placement::PerFace => "cell",
            Placement::PerPoint => "point",
        }
    }
}

/// A typed array of field values. The storage kind is chosen from the input
/// values: all integers become an integer array, any other all-numeric input
/// becomes a float array, and strings become a string array.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValues {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Str(Vec<String>),
}

impl FieldValues {
    /// Choose a storage kind for raw JSON values. Mixed element types are a
    /// fatal input error. Integers beyond the archive's 32-bit array range
    /// are stored as floats.
    pub fn from_json(name: &str, values: &[Value]) -> Result<Self> {
        let fits_i32 = |v: &Value| {
            v.as_i64()
                .is_some_and(|i| i32::try_from(i).is_ok())
        };
        if values.iter().all(fits_i32) {
            let ints = values.iter().filter_map(Value::as_i64).collect();
            return Ok(FieldValues::Int(ints));
        }
        if values.iter().all(Value::is_number) {
            let floats = values.iter().filter_map(Value::as_f64).collect();
            return Ok(FieldValues::Float(floats));
        }
        if values.iter().all(Value::is_string) {
            let strings = values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect();
            return Ok(FieldValues::Str(strings));
        }
        Err(Error::UnsupportedValueType(name.to_string()))
    }

    pub fn len(&self) -> usize {
        match self {
            FieldValues::Float(v) => v.len(),
            FieldValues::Int(v) => v.len(),
            FieldValues::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_string(&self) -> bool {
        matches!(self, FieldValues::Str(_))
    }

    /// A contiguous run of values, used when one array is split across
    /// several buffers.
    pub fn slice(&self, start: usize, len: usize) -> FieldValues {
        match self {
            FieldValues::Float(v) => FieldValues::Float(v[start..start + len].to_vec()),
            FieldValues::Int(v) => FieldValues::Int(v[start..start + len].to_vec()),
            FieldValues::Str(v) => FieldValues::Str(v[start..start + len].to_vec()),
        }
    }

    /// Append the values of `other` to this array. Kinds must match; callers
    /// check compatibility before merging buffers.
    pub(crate) fn extend(&mut self, other: &FieldValues) {
        match (self, other) {
            (FieldValues::Float(a), FieldValues::Float(b)) => a.extend_from_slice(b),
            (FieldValues::Int(a), FieldValues::Int(b)) => a.extend_from_slice(b),
            (FieldValues::Str(a), FieldValues::Str(b)) => a.extend_from_slice(b),
            _ => {}
        }
    }

    pub(crate) fn same_kind(&self, other: &FieldValues) -> bool {
        matches!(
            (self, other),
            (FieldValues::Float(_), FieldValues::Float(_))
                | (FieldValues::Int(_), FieldValues::Int(_))
                | (FieldValues::Str(_), FieldValues::Str(_))
        )
    }

    fn min_max(&self) -> Option<(f64, f64)> {
        let numeric: Vec<f64> = match self {
            FieldValues::Float(v) => v.clone(),
            FieldValues::Int(v) => v.iter().map(|&i| i as f64).collect(),
            FieldValues::Str(_) => return None,
        };
        if numeric.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in numeric {
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }
}

/// User-supplied legend bounds, either side of which may be left open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct RangeBounds {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

/// The resolved (min, max) pair for a field legend. Computed once at field
/// attachment time and immutable afterward. String fields carry a hidden
/// legend and never computed bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LegendRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub hidden: bool,
}

/// Identifies the physical quantity a field represents, e.g.
/// `{ "Temperature", "C" }`. Defaults to an unnamed generic type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTypeTag {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "unit")]
    pub base_unit: String,
}

/// A named value array together with its visualization metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub values: FieldValues,
    pub placement: Placement,
    pub range: LegendRange,
    pub unit: String,
    pub data_type: DataTypeTag,
}

/// Resolve the visible legend range for a value array.
///
/// The rules, in order:
/// - string arrays get a hidden legend and any explicit bounds are carried
///   through verbatim, never computed;
/// - with no explicit bounds at all, the range is computed from the data and
///   a warning is emitted;
/// - with exactly one bound supplied, the missing side is filled from the
///   data and the fill is warned about;
/// - explicit `(0, 0)` and any `min >= max` pair are invalid.
///
/// Deterministic and side-effect-free aside from the warning diagnostics.
pub fn resolve_range(
    name: &str,
    values: &FieldValues,
    explicit: Option<RangeBounds>,
) -> Result<LegendRange> {
    if values.is_string() {
        let bounds = explicit.unwrap_or_default();
        return Ok(LegendRange {
            min: bounds.min,
            max: bounds.max,
            hidden: true,
        });
    }

    let (data_min, data_max) = values.min_max().unwrap_or((0.0, 0.0));
    let bounds = explicit.unwrap_or_default();

    let range = match (bounds.min, bounds.max) {
        (None, None) => {
            warn!(
                "legend range for \"{}\" auto-computed from data: ({}, {})",
                name, data_min, data_max
            );
            (data_min, data_max)
        }
        (Some(min), None) => {
            warn!(
                "legend maximum for \"{}\" auto-computed from data: {}",
                name, data_max
            );
            (min, data_max)
        }
        (None, Some(max)) => {
            warn!(
                "legend minimum for \"{}\" auto-computed from data: {}",
                name, data_min
            );
            (data_min, max)
        }
        (Some(min), Some(max)) => {
            if min == 0.0 && max == 0.0 {
                return Err(Error::InvalidRange(format!(
                    "min and max for \"{}\" cannot both be 0",
                    name
                )));
            }
            if min >= max {
                return Err(Error::InvalidRange(format!(
                    "min ({}) must be smaller than max ({}) for \"{}\"",
                    min, max, name
                )));
            }
            (min, max)
        }
    };

    Ok(LegendRange {
        min: Some(range.0),
        max: Some(range.1),
        hidden: false,
    })
}
