//! 数学基础类型
//!
//! 基于 nalgebra 的点/向量别名，以及三维包围盒和点到线段距离。

/// 世界坐标中的三维点
pub type Point3 = nalgebra::Point3<f64>;

/// 三维向量
pub type Vector3 = nalgebra::Vector3<f64>;

/// 屏幕坐标（像素）
pub type Point2 = nalgebra::Point2<f64>;

/// 几何比较容差
pub const EPSILON: f64 = 1e-10;

/// 检查点的三个分量是否都是有限值
pub fn is_finite(p: &Point3) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

/// 计算点到线段 ab 的距离
pub fn distance_to_segment(point: &Point3, a: &Point3, b: &Point3) -> f64 {
    let v = b - a;
    let w = point - a;

    let c1 = w.dot(&v);
    if c1 <= 0.0 {
        return (point - a).norm();
    }

    let c2 = v.dot(&v);
    if c2 <= c1 {
        return (point - b).norm();
    }

    let t = c1 / c2;
    let projected = a + v * t;
    (point - projected).norm()
}

/// 轴对齐三维包围盒
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox3 {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox3 {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// 从点集构建包围盒，点集为空时返回 None
    pub fn from_points(points: impl IntoIterator<Item = Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::new(first, first);
        for p in iter {
            bbox.expand(&p);
        }
        Some(bbox)
    }

    /// 扩展包围盒以包含指定点
    pub fn expand(&mut self, p: &Point3) {
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    pub fn volume(&self) -> f64 {
        let s = self.size();
        s.x * s.y * s.z
    }

    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}
