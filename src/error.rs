use thiserror::Error;

/// Top-level error type for the Geovert editing toolkit.
#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Errors related to feature geometry handling.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("geometry has no editable ring")]
    NoRing,

    #[error("ring needs at least 3 vertices, got {0}")]
    DegenerateRing(usize),
}

/// Errors related to the vertex editing session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a vertex session is already active")]
    SessionActive,

    #[error("no vertex session is active")]
    NoSession,

    #[error("interaction mode '{required}' is not armed")]
    ModeNotArmed { required: &'static str },

    #[error("row {index} is out of range (table has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("no vertex matches coordinate ({x}, {y})")]
    NoMatchingVertex { x: f64, y: f64 },
}

/// Convenience type alias for results using [`EditError`].
pub type Result<T> = std::result::Result<T, EditError>;
