use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid box: ({x1}, {y1}, {x2}, {y2})")]
    InvalidBox { x1: f32, y1: f32, x2: f32, y2: f32 },

    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Label {label} out of range, labeler reported {count} components")]
    LabelOutOfRange { label: u32, count: usize },

    #[error("Labeler reported {count} components for {pixels} pixels")]
    ComponentCount { count: usize, pixels: usize },

    #[error("Empty frame: {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },

    #[error("Labeler Error: {0}")]
    Labeler(String),

    #[error("Config Error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("ThreadPool Error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn invalid_box(bbox: &crate::bbox::BBox) -> Self {
        Self::InvalidBox {
            x1: bbox.x1,
            y1: bbox.y1,
            x2: bbox.x2,
            y2: bbox.y2,
        }
    }

    pub(crate) fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
