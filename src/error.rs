/// Error taxonomy for the scene export pipeline.
///
/// Malformed-input errors are fatal and abort the export at the point of
/// detection. Degenerate-but-valid states (empty display groups) are not
/// errors and are skipped by the assembler instead.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A field with this name is already attached to the buffer.
    #[error("a field named \"{0}\" already exists; try a different name")]
    DuplicateField(String),

    /// The value array length does not match the target cell or point count.
    #[error(
        "length of \"{name}\" ({actual}) does not match the {placement} count \
         of the target buffer ({expected})"
    )]
    ArrayLengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
        placement: &'static str,
    },

    /// Values are not uniformly integers, numbers or strings.
    #[error(
        "unsupported value type in \"{0}\": values must all be integers, \
         numbers or strings"
    )]
    UnsupportedValueType(String),

    #[error("\"{name}\" is not a valid field for this buffer; available fields: {available:?}")]
    UnknownField {
        name: String,
        available: Vec<String>,
    },

    #[error("invalid legend range: {0}")]
    InvalidRange(String),

    /// One value per original entity cannot be expressed in the archive
    /// format, which has no way to duplicate a scalar across an unknown
    /// number of cells.
    #[error("mapping data per object is not currently supported")]
    PerObjectUnsupported,

    #[error("invalid visualization input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}
