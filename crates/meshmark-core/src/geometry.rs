//! 标注图元定义
//!
//! 支持的标注：
//! - 点 (PointAnnotation)
//! - 线段 (LineAnnotation)
//! - 闭合多边形 (PolygonAnnotation)，首尾顶点相同表示闭合

use crate::error::AnnotationError;
use crate::id::AnnotationId;
use crate::math::{distance_to_segment, BoundingBox3, Point3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 标注类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Point,
    Line,
    Polygon,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Point, ShapeKind::Line, ShapeKind::Polygon];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Point => "point",
            ShapeKind::Line => "line",
            ShapeKind::Polygon => "polygon",
        }
    }

    /// 完成该类型所需的点数，多边形需要显式闭合
    pub fn required_points(&self) -> Option<usize> {
        match self {
            ShapeKind::Point => Some(1),
            ShapeKind::Line => Some(2),
            ShapeKind::Polygon => None,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "point" => Ok(ShapeKind::Point),
            "line" => Ok(ShapeKind::Line),
            "polygon" => Ok(ShapeKind::Polygon),
            _ => Err(AnnotationError::InvalidMode(s.to_string())),
        }
    }
}

/// 点标注
#[derive(Debug, Clone, PartialEq)]
pub struct PointAnnotation {
    pub id: AnnotationId,
    pub value: Point3,
}

impl PointAnnotation {
    pub fn new(id: AnnotationId, value: Point3) -> Self {
        Self { id, value }
    }

    pub fn distance_to_point(&self, point: &Point3) -> f64 {
        (point - self.value).norm()
    }
}

/// 线段标注
#[derive(Debug, Clone, PartialEq)]
pub struct LineAnnotation {
    pub id: AnnotationId,
    pub u: Point3,
    pub v: Point3,
}

impl LineAnnotation {
    pub fn new(id: AnnotationId, u: Point3, v: Point3) -> Self {
        Self { id, u, v }
    }

    pub fn length(&self) -> f64 {
        (self.v - self.u).norm()
    }

    pub fn distance_to_point(&self, point: &Point3) -> f64 {
        distance_to_segment(point, &self.u, &self.v)
    }
}

/// 多边形标注
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonAnnotation {
    pub id: AnnotationId,
    /// 顶点列表，闭合多边形的最后一个顶点与第一个相同
    pub points: Vec<Point3>,
}

impl PolygonAnnotation {
    pub fn new(id: AnnotationId, points: Vec<Point3>) -> Self {
        Self { id, points }
    }

    /// 从未闭合的顶点序列构建闭合多边形
    pub fn closed(id: AnnotationId, mut points: Vec<Point3>) -> Self {
        if let Some(&first) = points.first() {
            points.push(first);
        }
        Self { id, points }
    }

    pub fn is_closed(&self) -> bool {
        self.points.len() >= 2 && self.points.first() == self.points.last()
    }

    /// 不含闭合重复点的顶点数
    pub fn vertex_count(&self) -> usize {
        if self.is_closed() {
            self.points.len() - 1
        } else {
            self.points.len()
        }
    }

    /// 周长（沿顶点序列逐段累加）
    pub fn perimeter(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }

    pub fn distance_to_point(&self, point: &Point3) -> f64 {
        match self.points.as_slice() {
            [] => f64::INFINITY,
            [only] => (point - only).norm(),
            pts => pts
                .windows(2)
                .map(|w| distance_to_segment(point, &w[0], &w[1]))
                .fold(f64::INFINITY, f64::min),
        }
    }
}

/// 已提交的标注
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Point(PointAnnotation),
    Line(LineAnnotation),
    Polygon(PolygonAnnotation),
}

impl Annotation {
    pub fn as_view(&self) -> AnnotationRef<'_> {
        match self {
            Annotation::Point(p) => AnnotationRef::Point(p),
            Annotation::Line(l) => AnnotationRef::Line(l),
            Annotation::Polygon(pg) => AnnotationRef::Polygon(pg),
        }
    }

    pub fn id(&self) -> AnnotationId {
        self.as_view().id()
    }

    pub fn kind(&self) -> ShapeKind {
        self.as_view().kind()
    }

    pub fn vertices(&self) -> Vec<Point3> {
        self.as_view().vertices()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox3> {
        self.as_view().bounding_box()
    }

    pub fn distance_to_point(&self, point: &Point3) -> f64 {
        self.as_view().distance_to_point(point)
    }
}

impl From<PointAnnotation> for Annotation {
    fn from(p: PointAnnotation) -> Self {
        Annotation::Point(p)
    }
}

impl From<LineAnnotation> for Annotation {
    fn from(l: LineAnnotation) -> Self {
        Annotation::Line(l)
    }
}

impl From<PolygonAnnotation> for Annotation {
    fn from(pg: PolygonAnnotation) -> Self {
        Annotation::Polygon(pg)
    }
}

/// 对存储中标注的只读引用
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnnotationRef<'a> {
    Point(&'a PointAnnotation),
    Line(&'a LineAnnotation),
    Polygon(&'a PolygonAnnotation),
}

impl<'a> AnnotationRef<'a> {
    pub fn id(&self) -> AnnotationId {
        match self {
            AnnotationRef::Point(p) => p.id,
            AnnotationRef::Line(l) => l.id,
            AnnotationRef::Polygon(pg) => pg.id,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            AnnotationRef::Point(_) => ShapeKind::Point,
            AnnotationRef::Line(_) => ShapeKind::Line,
            AnnotationRef::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// 渲染用的顶点序列
    pub fn vertices(&self) -> Vec<Point3> {
        match self {
            AnnotationRef::Point(p) => vec![p.value],
            AnnotationRef::Line(l) => vec![l.u, l.v],
            AnnotationRef::Polygon(pg) => pg.points.clone(),
        }
    }

    pub fn bounding_box(&self) -> Option<BoundingBox3> {
        BoundingBox3::from_points(self.vertices())
    }

    pub fn distance_to_point(&self, point: &Point3) -> f64 {
        match self {
            AnnotationRef::Point(p) => p.distance_to_point(point),
            AnnotationRef::Line(l) => l.distance_to_point(point),
            AnnotationRef::Polygon(pg) => pg.distance_to_point(point),
        }
    }

    pub fn to_annotation(&self) -> Annotation {
        match *self {
            AnnotationRef::Point(p) => Annotation::Point(p.clone()),
            AnnotationRef::Line(l) => Annotation::Line(l.clone()),
            AnnotationRef::Polygon(pg) => Annotation::Polygon(pg.clone()),
        }
    }
}
