//! 标注存储
//!
//! 已提交的标注按类型分成三组，每组保持插入顺序。
//! 任意 ID 在三组中至多出现一次。

use crate::geometry::{
    Annotation, AnnotationRef, LineAnnotation, PointAnnotation, PolygonAnnotation, ShapeKind,
};
use crate::id::AnnotationId;
use crate::math::Point3;
use std::collections::HashSet;

/// 标注集合
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationSet {
    pub points: Vec<PointAnnotation>,
    pub lines: Vec<LineAnnotation>,
    pub polygons: Vec<PolygonAnnotation>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 提交标注，追加到对应类型的分组末尾
    pub fn commit(&mut self, annotation: Annotation) {
        tracing::info!("Committed {} {}", annotation.kind(), annotation.id());
        match annotation {
            Annotation::Point(p) => self.points.push(p),
            Annotation::Line(l) => self.lines.push(l),
            Annotation::Polygon(pg) => self.polygons.push(pg),
        }
    }

    /// 按 ID 删除标注，不存在时什么也不做
    pub fn delete_by_id(&mut self, id: AnnotationId) -> Option<Annotation> {
        let removed = if let Some(i) = self.points.iter().position(|p| p.id == id) {
            Some(Annotation::Point(self.points.remove(i)))
        } else if let Some(i) = self.lines.iter().position(|l| l.id == id) {
            Some(Annotation::Line(self.lines.remove(i)))
        } else {
            self.polygons
                .iter()
                .position(|pg| pg.id == id)
                .map(|i| Annotation::Polygon(self.polygons.remove(i)))
        };

        match &removed {
            Some(annotation) => tracing::info!("Deleted {} {}", annotation.kind(), id),
            None => tracing::debug!("Delete ignored, {} not found", id),
        }

        removed
    }

    /// 清空所有分组（切换模型时使用）
    pub fn reset(&mut self) {
        self.points.clear();
        self.lines.clear();
        self.polygons.clear();
    }

    /// 遍历全部标注：先点，再线段，最后多边形
    ///
    /// 迭代器借用集合本身，每次调用都反映最新的提交状态。
    pub fn all(&self) -> Iter<'_> {
        Iter {
            set: self,
            kind: Some(ShapeKind::Point),
            index: 0,
        }
    }

    pub fn get(&self, id: AnnotationId) -> Option<AnnotationRef<'_>> {
        self.all().find(|a| a.id() == id)
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.points.len() + self.lines.len() + self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, kind: ShapeKind) -> usize {
        match kind {
            ShapeKind::Point => self.points.len(),
            ShapeKind::Line => self.lines.len(),
            ShapeKind::Polygon => self.polygons.len(),
        }
    }

    pub fn max_id(&self) -> Option<AnnotationId> {
        self.all().map(|a| a.id()).max()
    }

    /// 查找距离 `point` 最近且在容差范围内的标注
    pub fn find_nearest(&self, point: &Point3, tolerance: f64) -> Option<AnnotationId> {
        self.all()
            .map(|a| (a.id(), a.distance_to_point(point)))
            .filter(|(_, d)| *d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// 返回第一个重复出现的 ID
    pub fn find_duplicate_id(&self) -> Option<AnnotationId> {
        let mut seen = HashSet::with_capacity(self.len());
        self.all().map(|a| a.id()).find(|id| !seen.insert(*id))
    }
}

/// `AnnotationSet::all` 返回的迭代器
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    set: &'a AnnotationSet,
    kind: Option<ShapeKind>,
    index: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = AnnotationRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = match self.kind? {
                ShapeKind::Point => self.set.points.get(self.index).map(AnnotationRef::Point),
                ShapeKind::Line => self.set.lines.get(self.index).map(AnnotationRef::Line),
                ShapeKind::Polygon => self.set.polygons.get(self.index).map(AnnotationRef::Polygon),
            };

            if item.is_some() {
                self.index += 1;
                return item;
            }

            self.index = 0;
            self.kind = match self.kind {
                Some(ShapeKind::Point) => Some(ShapeKind::Line),
                Some(ShapeKind::Line) => Some(ShapeKind::Polygon),
                _ => None,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn sample_set() -> (AnnotationSet, [AnnotationId; 3]) {
        let ids = [
            AnnotationId::from_raw(1),
            AnnotationId::from_raw(2),
            AnnotationId::from_raw(3),
        ];
        let mut set = AnnotationSet::new();
        set.commit(
            PolygonAnnotation::closed(
                ids[2],
                vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
            )
            .into(),
        );
        set.commit(PointAnnotation::new(ids[0], p(5.0, 5.0, 5.0)).into());
        set.commit(LineAnnotation::new(ids[1], p(-5.0, 0.0, 0.0), p(-5.0, 2.0, 0.0)).into());
        (set, ids)
    }

    #[test]
    fn test_commit_groups_by_kind() {
        let (set, _) = sample_set();
        assert_eq!(set.points.len(), 1);
        assert_eq!(set.lines.len(), 1);
        assert_eq!(set.polygons.len(), 1);
        assert_eq!(set.len(), 3);
        assert_eq!(set.count(ShapeKind::Line), 1);
    }

    #[test]
    fn test_all_order_and_restart() {
        let (set, ids) = sample_set();
        let iter = set.all();
        let first: Vec<_> = iter.clone().map(|a| a.id()).collect();
        let second: Vec<_> = iter.map(|a| a.id()).collect();
        assert_eq!(first, vec![ids[0], ids[1], ids[2]]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_all_skips_empty_groups() {
        let mut set = AnnotationSet::new();
        assert_eq!(set.all().count(), 0);

        let id = AnnotationId::from_raw(9);
        set.commit(PolygonAnnotation::closed(id, vec![p(0.0, 0.0, 0.0)]).into());
        let kinds: Vec<_> = set.all().map(|a| a.kind()).collect();
        assert_eq!(kinds, vec![ShapeKind::Polygon]);
    }

    #[test]
    fn test_delete_by_id() {
        let (mut set, ids) = sample_set();

        let removed = set.delete_by_id(ids[1]).unwrap();
        assert_eq!(removed.kind(), ShapeKind::Line);
        assert!(!set.contains(ids[1]));
        assert_eq!(set.len(), 2);

        // 再次删除是空操作
        let before = set.clone();
        assert!(set.delete_by_id(ids[1]).is_none());
        assert_eq!(set, before);
    }

    #[test]
    fn test_delete_on_empty_store() {
        let mut set = AnnotationSet::new();
        assert!(set.delete_by_id(AnnotationId::from_raw(1)).is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn test_reset() {
        let (mut set, _) = sample_set();
        set.reset();
        assert!(set.is_empty());
    }

    #[test]
    fn test_find_nearest() {
        let (set, ids) = sample_set();

        assert_eq!(set.find_nearest(&p(5.0, 5.1, 5.0), 0.5), Some(ids[0]));
        assert_eq!(set.find_nearest(&p(-5.0, 1.0, 0.2), 0.5), Some(ids[1]));
        assert_eq!(set.find_nearest(&p(0.5, 0.5, 0.0), 0.01), Some(ids[2]));
        assert_eq!(set.find_nearest(&p(50.0, 50.0, 50.0), 0.5), None);
    }

    #[test]
    fn test_max_id_and_duplicates() {
        let (mut set, ids) = sample_set();
        assert_eq!(set.max_id(), Some(ids[2]));
        assert_eq!(set.find_duplicate_id(), None);

        set.commit(PointAnnotation::new(ids[1], p(0.0, 0.0, 0.0)).into());
        assert_eq!(set.find_duplicate_id(), Some(ids[1]));
    }
}
