//! 标注图形构建器
//!
//! 把一系列点击累积成待提交图形，满足完成条件时产出标注。
//!
//! 状态：
//! - `Idle`: 没有待提交图形
//! - `Drawing`: 正在绘制，类型在第一次点击时确定，直到完成或取消都不变
//!
//! 完成条件：点在第一次点击后完成，线段在第二次点击后完成，
//! 多边形只能通过 [`ShapeBuilder::close_polygon`] 完成。

use meshmark_core::geometry::{
    Annotation, LineAnnotation, PointAnnotation, PolygonAnnotation, ShapeKind,
};
use meshmark_core::id::AnnotationId;
use meshmark_core::math::{is_finite, Point3};
use meshmark_core::AnnotationError;

use crate::state::DrawMode;

/// 闭合多边形所需的最少顶点数
pub const MIN_POLYGON_VERTICES: usize = 3;

/// 构建结果
#[derive(Debug, Clone, PartialEq)]
pub enum BuildResult {
    /// 图形尚未完成
    Continue,
    /// 图形完成，需要提交到标注集合
    Commit(Annotation),
}

/// 待提交图形
#[derive(Debug, Clone, PartialEq)]
pub struct PendingShape {
    /// 在开始绘制时分配，提交后沿用
    pub id: AnnotationId,
    pub kind: ShapeKind,
    /// 已确定的顶点（不含鼠标预览点）
    pub points: Vec<Point3>,
}

impl PendingShape {
    fn start(kind: ShapeKind) -> Self {
        let shape = Self {
            id: AnnotationId::next(),
            kind,
            points: Vec::new(),
        };
        tracing::debug!("Started {} {}", kind, shape.id);
        shape
    }
}

/// 构建器状态的只读视图
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuilderState<'a> {
    Idle,
    Drawing {
        kind: ShapeKind,
        points: &'a [Point3],
    },
}

/// 标注图形构建器
#[derive(Debug, Default)]
pub struct ShapeBuilder {
    pending: Option<PendingShape>,
}

impl ShapeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BuilderState<'_> {
        match &self.pending {
            None => BuilderState::Idle,
            Some(shape) => BuilderState::Drawing {
                kind: shape.kind,
                points: &shape.points,
            },
        }
    }

    pub fn pending(&self) -> Option<&PendingShape> {
        self.pending.as_ref()
    }

    pub fn is_drawing(&self) -> bool {
        self.pending.is_some()
    }

    /// 添加一个顶点
    ///
    /// 失败时构建器状态保持不变。
    pub fn add_point(
        &mut self,
        point: Point3,
        mode: DrawMode,
    ) -> Result<BuildResult, AnnotationError> {
        let requested = match mode {
            DrawMode::Disabled => return Err(AnnotationError::InvalidMode(mode.name().to_string())),
            DrawMode::Shape(kind) => kind,
        };

        if !is_finite(&point) {
            return Err(AnnotationError::NonFinitePoint);
        }

        let mut shape = self
            .pending
            .take()
            .unwrap_or_else(|| PendingShape::start(requested));

        if shape.kind != requested {
            tracing::debug!(
                "Ignoring requested {} while drawing {} {}",
                requested,
                shape.kind,
                shape.id
            );
        }

        shape.points.push(point);

        let completed: Option<Annotation> = match (shape.kind, shape.points.as_slice()) {
            (ShapeKind::Point, &[value]) => Some(PointAnnotation::new(shape.id, value).into()),
            (ShapeKind::Line, &[u, v]) => Some(LineAnnotation::new(shape.id, u, v).into()),
            _ => None,
        };

        match completed {
            Some(annotation) => Ok(BuildResult::Commit(annotation)),
            None => {
                tracing::debug!(
                    "Added vertex {} to {} {}",
                    shape.points.len(),
                    shape.kind,
                    shape.id
                );
                self.pending = Some(shape);
                Ok(BuildResult::Continue)
            }
        }
    }

    /// 闭合正在绘制的多边形
    ///
    /// 首个顶点会被追加到末尾以表示闭合。
    pub fn close_polygon(&mut self) -> Result<Annotation, AnnotationError> {
        let vertex_count = match &self.pending {
            Some(shape) if shape.kind == ShapeKind::Polygon => shape.points.len(),
            _ => return Err(AnnotationError::NotDrawingPolygon),
        };

        if vertex_count < MIN_POLYGON_VERTICES {
            return Err(AnnotationError::TooFewVertices {
                required: MIN_POLYGON_VERTICES,
                actual: vertex_count,
            });
        }

        let shape = self.pending.take().ok_or(AnnotationError::NotDrawingPolygon)?;
        Ok(PolygonAnnotation::closed(shape.id, shape.points).into())
    }

    /// 丢弃待提交图形，可重复调用
    pub fn cancel(&mut self) {
        if let Some(shape) = self.pending.take() {
            tracing::debug!("Cancelled {} {}", shape.kind, shape.id);
        }
    }

    /// 预览折线：已确定的顶点加上当前鼠标位置
    pub fn preview(&self, cursor: &Point3) -> Option<Vec<Point3>> {
        self.pending.as_ref().map(|shape| {
            let mut points = Vec::with_capacity(shape.points.len() + 1);
            points.extend_from_slice(&shape.points);
            points.push(*cursor);
            points
        })
    }

    /// 当前状态的提示文本
    pub fn prompt(&self) -> &str {
        match &self.pending {
            None => "在模型上点击以放置标注:",
            Some(shape) => match shape.kind {
                ShapeKind::Point => "指定点的位置:",
                ShapeKind::Line => "指定终点:",
                ShapeKind::Polygon if shape.points.len() >= MIN_POLYGON_VERTICES => {
                    "指定下一点 或 [双击闭合]:"
                }
                ShapeKind::Polygon => "指定下一点:",
            },
        }
    }
}
