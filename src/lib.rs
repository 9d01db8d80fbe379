//! Convert visualization-set descriptions (geometry plus scalar fields,
//! legends and display attributes) into portable vtkjs scene archives, with
//! an optional self-contained HTML wrapper around the archive.

pub mod buffer;
pub mod color;
pub mod display;
pub mod error;
pub mod field;
pub mod geometry;
pub mod html;
pub mod input;
pub mod manifest;
pub mod scene;
pub mod tessellate;
pub mod writer;

pub use buffer::PrimitiveBuffer;
pub use color::Color;
pub use display::{DisplayGroup, DisplayMode};
pub use error::{Error, Result};
pub use field::{FieldValues, LegendRange, Placement, RangeBounds};
pub use input::VisualizationSet;
pub use scene::{Scene, SceneDefaults};
