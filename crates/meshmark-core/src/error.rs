//! 标注操作错误定义

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("Invalid drawing mode: {0}")]
    InvalidMode(String),

    #[error("No polygon is being drawn")]
    NotDrawingPolygon,

    #[error("Polygon needs at least {required} vertices, got {actual}")]
    TooFewVertices { required: usize, actual: usize },

    #[error("Point has non-finite coordinates")]
    NonFinitePoint,

    #[error("Annotation id {0} is out of range")]
    IdOutOfRange(u64),
}
