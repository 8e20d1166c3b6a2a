//! MeshMark 核心
//!
//! 提供在三维模型表面放置的标注图元以及它们的存储。
//!
//! # 架构设计
//!
//! - `Point3`: 世界坐标中的点
//! - `Annotation`: 已提交的标注（点、线段、闭合多边形）
//! - `AnnotationSet`: 按类型分组、按插入顺序保存的标注集合
//!
//! # 示例
//!
//! ```rust
//! use meshmark_core::prelude::*;
//!
//! let mut set = AnnotationSet::new();
//! let id = AnnotationId::next();
//! set.commit(Annotation::Point(PointAnnotation::new(id, Point3::new(0.0, 1.0, 0.0))));
//!
//! assert!(set.contains(id));
//! set.delete_by_id(id);
//! assert!(set.is_empty());
//! ```

pub mod error;
pub mod geometry;
pub mod id;
pub mod math;
pub mod model;
pub mod store;

pub use error::AnnotationError;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::error::AnnotationError;
    pub use crate::geometry::{
        Annotation, AnnotationRef, LineAnnotation, PointAnnotation, PolygonAnnotation, ShapeKind,
    };
    pub use crate::id::AnnotationId;
    pub use crate::math::{BoundingBox3, Point2, Point3, Vector3, EPSILON};
    pub use crate::model::{marker_size, ModelCatalog, ModelEntry};
    pub use crate::store::AnnotationSet;
}
