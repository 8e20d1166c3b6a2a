//! 标注会话
//!
//! 持有构建器、标注集合和右键菜单，按事件顺序同步处理。
//! 标注集合只会被图形提交和菜单删除修改。

use meshmark_core::geometry::{Annotation, ShapeKind};
use meshmark_core::id::AnnotationId;
use meshmark_core::math::{BoundingBox3, Point3};
use meshmark_core::model::{marker_size, ModelEntry, DEFAULT_MARKER_SIZE};
use meshmark_core::store::AnnotationSet;
use meshmark_core::AnnotationError;

use crate::builder::{BuildResult, BuilderState, PendingShape, ShapeBuilder};
use crate::event::{EventOutcome, PointerEvent};
use crate::selection::SelectionMenu;
use crate::state::DisplayOptions;

#[derive(Debug)]
pub struct AnnotationSession {
    builder: ShapeBuilder,
    annotations: AnnotationSet,
    menu: SelectionMenu,
    cursor: Option<Point3>,
    options: DisplayOptions,
    model: Option<ModelEntry>,
    marker_size: f64,
}

impl Default for AnnotationSession {
    fn default() -> Self {
        Self::new(DisplayOptions::default())
    }
}

impl AnnotationSession {
    pub fn new(options: DisplayOptions) -> Self {
        Self {
            builder: ShapeBuilder::new(),
            annotations: AnnotationSet::new(),
            menu: SelectionMenu::new(),
            cursor: None,
            options,
            model: None,
            marker_size: DEFAULT_MARKER_SIZE,
        }
    }

    // ========== 只读视图 ==========

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    pub fn builder_state(&self) -> BuilderState<'_> {
        self.builder.state()
    }

    pub fn pending(&self) -> Option<&PendingShape> {
        self.builder.pending()
    }

    /// 待提交图形加上鼠标位置的预览折线
    pub fn preview(&self) -> Option<Vec<Point3>> {
        let cursor = self.cursor?;
        self.builder.preview(&cursor)
    }

    pub fn prompt(&self) -> &str {
        self.builder.prompt()
    }

    pub fn menu(&self) -> &SelectionMenu {
        &self.menu
    }

    pub fn options(&self) -> &DisplayOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut DisplayOptions {
        &mut self.options
    }

    pub fn model(&self) -> Option<&ModelEntry> {
        self.model.as_ref()
    }

    /// 顶点标记半径，也是右键拾取容差
    pub fn marker_size(&self) -> f64 {
        self.marker_size
    }

    // ========== 事件处理 ==========

    /// 处理一个指针事件
    ///
    /// 失败时会话状态保持不变。
    pub fn handle(&mut self, event: PointerEvent) -> Result<EventOutcome, AnnotationError> {
        match event {
            PointerEvent::Click { point, mode } => {
                // 菜单打开时，点击只用于关闭菜单
                if self.menu.is_open() {
                    self.menu.dismiss();
                    return Ok(EventOutcome::MenuDismissed);
                }
                if !mode.is_enabled() {
                    return Ok(EventOutcome::Ignored);
                }
                match self.builder.add_point(point, mode)? {
                    BuildResult::Continue => Ok(EventOutcome::Extended),
                    BuildResult::Commit(annotation) => Ok(self.commit(annotation)),
                }
            }
            PointerEvent::DoubleClick => {
                if self.menu.is_open() {
                    self.menu.dismiss();
                    return Ok(EventOutcome::MenuDismissed);
                }
                // 正在绘制的多边形总能闭合；空闲时才看会话的绘制模式
                let drawing_polygon = self
                    .builder
                    .pending()
                    .is_some_and(|shape| shape.kind == ShapeKind::Polygon);
                if !drawing_polygon && !self.options.mode.is_enabled() {
                    return Ok(EventOutcome::Ignored);
                }
                let annotation = self.builder.close_polygon()?;
                Ok(self.commit(annotation))
            }
            PointerEvent::PointerMove { point } => {
                self.cursor = Some(point);
                Ok(EventOutcome::PreviewUpdated)
            }
            PointerEvent::RightClick {
                point,
                screen_position,
            } => match self.annotations.find_nearest(&point, self.marker_size) {
                Some(id) => {
                    self.menu.select(id, screen_position);
                    tracing::debug!("Context menu opened for {}", id);
                    Ok(EventOutcome::MenuOpened(id))
                }
                None if self.menu.is_open() => {
                    self.menu.dismiss();
                    Ok(EventOutcome::MenuDismissed)
                }
                None => Ok(EventOutcome::Ignored),
            },
            PointerEvent::Cancel => {
                self.builder.cancel();
                self.menu.dismiss();
                Ok(EventOutcome::Cancelled)
            }
        }
    }

    fn commit(&mut self, annotation: Annotation) -> EventOutcome {
        let id = annotation.id();
        self.annotations.commit(annotation);
        EventOutcome::Committed(id)
    }

    /// 删除右键菜单选中的标注
    pub fn confirm_delete(&mut self) -> Option<Annotation> {
        self.menu.confirm_delete(&mut self.annotations)
    }

    pub fn dismiss_menu(&mut self) {
        self.menu.dismiss();
    }

    /// 切换模型
    ///
    /// 标注只属于一个模型，切换时清空集合并丢弃未完成的图形。
    pub fn switch_model(&mut self, model: ModelEntry, bounds: Option<BoundingBox3>) {
        self.builder.cancel();
        self.menu.dismiss();
        self.annotations.reset();
        self.cursor = None;
        self.marker_size = bounds.as_ref().map(marker_size).unwrap_or(DEFAULT_MARKER_SIZE);
        tracing::info!(
            "Switched to model '{}' (marker size {:.4})",
            model.name,
            self.marker_size
        );
        self.model = Some(model);
    }

    /// 用导入的集合替换当前标注
    ///
    /// 调用方需先完整解码集合，这里不做部分安装。
    /// 集合中有超出范围的 ID 时返回错误，会话保持不变。
    pub fn import(&mut self, annotations: AnnotationSet) -> Result<(), AnnotationError> {
        if let Some(max) = annotations.max_id() {
            AnnotationId::reserve_through(max)?;
        }
        self.builder.cancel();
        self.menu.dismiss();
        tracing::info!("Imported {} annotations", annotations.len());
        self.annotations = annotations;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshmark_core::geometry::{LineAnnotation, PointAnnotation, ShapeKind};
    use meshmark_core::math::Point2;
    use crate::state::DrawMode;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn click(point: Point3, kind: ShapeKind) -> PointerEvent {
        PointerEvent::Click {
            point,
            mode: DrawMode::Shape(kind),
        }
    }

    fn right_click(point: Point3) -> PointerEvent {
        PointerEvent::RightClick {
            point,
            screen_position: Point2::new(200.0, 150.0),
        }
    }

    fn polygon_session() -> AnnotationSession {
        let mut session = AnnotationSession::new(DisplayOptions {
            mode: DrawMode::Shape(ShapeKind::Polygon),
            ..DisplayOptions::default()
        });
        for pt in [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)] {
            session.handle(click(pt, ShapeKind::Polygon)).unwrap();
        }
        session
    }

    #[test]
    fn test_click_commits_point() {
        let mut session = AnnotationSession::default();
        let outcome = session.handle(click(p(1.0, 2.0, 3.0), ShapeKind::Point)).unwrap();

        let EventOutcome::Committed(id) = outcome else {
            panic!("expected commit, got {:?}", outcome);
        };
        assert_eq!(session.annotations().points, vec![PointAnnotation::new(id, p(1.0, 2.0, 3.0))]);
        assert_eq!(session.builder_state(), BuilderState::Idle);
    }

    #[test]
    fn test_disabled_click_ignored() {
        let mut session = AnnotationSession::default();
        let outcome = session
            .handle(PointerEvent::Click {
                point: p(0.0, 0.0, 0.0),
                mode: DrawMode::Disabled,
            })
            .unwrap();
        assert_eq!(outcome, EventOutcome::Ignored);
        assert!(session.annotations().is_empty());
    }

    #[test]
    fn test_double_click_closes_polygon() {
        let mut session = polygon_session();
        let outcome = session.handle(PointerEvent::DoubleClick).unwrap();

        assert!(matches!(outcome, EventOutcome::Committed(_)));
        let polygon = &session.annotations().polygons[0];
        assert_eq!(polygon.points.len(), 4);
        assert_eq!(polygon.points[0], polygon.points[3]);
    }

    #[test]
    fn test_double_click_without_polygon_fails() {
        let mut session = AnnotationSession::new(DisplayOptions {
            mode: DrawMode::Shape(ShapeKind::Line),
            ..DisplayOptions::default()
        });
        session.handle(click(p(0.0, 0.0, 0.0), ShapeKind::Line)).unwrap();

        assert_eq!(
            session.handle(PointerEvent::DoubleClick),
            Err(AnnotationError::NotDrawingPolygon)
        );
        assert!(session.annotations().is_empty());
        assert!(session.pending().is_some());
    }

    #[test]
    fn test_preview_follows_cursor() {
        let mut session = AnnotationSession::default();
        session.handle(click(p(0.0, 0.0, 0.0), ShapeKind::Line)).unwrap();
        assert_eq!(session.preview(), None);

        session
            .handle(PointerEvent::PointerMove {
                point: p(5.0, 0.0, 0.0),
            })
            .unwrap();
        assert_eq!(session.preview(), Some(vec![p(0.0, 0.0, 0.0), p(5.0, 0.0, 0.0)]));
        assert!(session.annotations().is_empty());
    }

    #[test]
    fn test_right_click_then_delete() {
        let mut session = AnnotationSession::default();
        session.handle(click(p(0.0, 0.0, 0.0), ShapeKind::Point)).unwrap();
        session.handle(click(p(3.0, 0.0, 0.0), ShapeKind::Line)).unwrap();
        let EventOutcome::Committed(line_id) =
            session.handle(click(p(3.0, 3.0, 0.0), ShapeKind::Line)).unwrap()
        else {
            panic!("expected line commit");
        };

        let outcome = session.handle(right_click(p(3.0, 1.5, 0.0))).unwrap();
        assert_eq!(outcome, EventOutcome::MenuOpened(line_id));
        assert_eq!(session.menu().screen_position(), Point2::new(200.0, 150.0));

        let removed = session.confirm_delete().unwrap();
        assert_eq!(removed.id(), line_id);
        assert!(session.annotations().lines.is_empty());
        assert_eq!(session.annotations().points.len(), 1);
        assert!(!session.menu().is_open());

        // 菜单已关闭
        let before = session.annotations().clone();
        assert!(session.confirm_delete().is_none());
        assert_eq!(session.annotations(), &before);
    }

    #[test]
    fn test_click_with_open_menu_only_dismisses() {
        let mut session = AnnotationSession::default();
        session.handle(click(p(0.0, 0.0, 0.0), ShapeKind::Point)).unwrap();
        session.handle(right_click(p(0.0, 0.0, 0.0))).unwrap();
        assert!(session.menu().is_open());

        let outcome = session.handle(click(p(7.0, 7.0, 7.0), ShapeKind::Point)).unwrap();
        assert_eq!(outcome, EventOutcome::MenuDismissed);
        assert!(!session.menu().is_open());
        assert_eq!(session.annotations().len(), 1);
        assert!(session.pending().is_none());

        // 下一次点击正常绘制
        let outcome = session.handle(click(p(7.0, 7.0, 7.0), ShapeKind::Point)).unwrap();
        assert!(matches!(outcome, EventOutcome::Committed(_)));
    }

    #[test]
    fn test_right_click_miss() {
        let mut session = AnnotationSession::default();
        assert_eq!(session.handle(right_click(p(0.0, 0.0, 0.0))).unwrap(), EventOutcome::Ignored);

        session.handle(click(p(0.0, 0.0, 0.0), ShapeKind::Point)).unwrap();
        session.handle(right_click(p(0.0, 0.0, 0.0))).unwrap();
        assert_eq!(
            session.handle(right_click(p(10.0, 0.0, 0.0))).unwrap(),
            EventOutcome::MenuDismissed
        );
    }

    #[test]
    fn test_cancel_event() {
        let mut session = polygon_session();
        assert_eq!(session.handle(PointerEvent::Cancel).unwrap(), EventOutcome::Cancelled);
        assert!(session.pending().is_none());
        assert!(session.annotations().is_empty());
    }

    #[test]
    fn test_switch_model_resets() {
        let mut session = AnnotationSession::default();
        session.handle(click(p(0.0, 0.0, 0.0), ShapeKind::Point)).unwrap();
        session.handle(click(p(1.0, 0.0, 0.0), ShapeKind::Line)).unwrap();

        let bounds = BoundingBox3::new(Point3::origin(), p(10.0, 10.0, 10.0));
        let drone = ModelEntry::new("drone", "/models/drone/scene.gltf", 0.1);
        session.switch_model(drone, Some(bounds));

        assert!(session.annotations().is_empty());
        assert!(session.pending().is_none());
        assert_eq!(session.model().unwrap().name, "drone");
        assert!((session.marker_size() - marker_size(&bounds)).abs() < 1e-12);
    }

    #[test]
    fn test_import_replaces_and_reserves_ids() {
        let mut session = polygon_session();

        let imported_id = AnnotationId::from_raw(AnnotationId::next().raw() + 500);
        let mut set = AnnotationSet::new();
        set.commit(
            LineAnnotation::new(imported_id, p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).into(),
        );
        session.import(set.clone()).unwrap();

        assert_eq!(session.annotations(), &set);
        assert!(session.pending().is_none());

        let outcome = session.handle(click(p(2.0, 2.0, 2.0), ShapeKind::Point)).unwrap();
        let EventOutcome::Committed(id) = outcome else {
            panic!("expected commit, got {:?}", outcome);
        };
        assert!(id > imported_id);
        assert_eq!(session.annotations().find_duplicate_id(), None);
    }

    #[test]
    fn test_import_rejects_id_at_counter_limit() {
        let mut session = polygon_session();
        let pending = session.pending().cloned();

        let mut set = AnnotationSet::new();
        set.commit(PointAnnotation::new(AnnotationId::from_raw(u64::MAX), p(0.0, 0.0, 0.0)).into());
        assert_eq!(session.import(set), Err(AnnotationError::IdOutOfRange(u64::MAX)));

        // 会话未变，之后的 ID 仍然唯一
        assert!(session.annotations().is_empty());
        assert_eq!(session.pending().cloned(), pending);
        let EventOutcome::Committed(id) = session.handle(PointerEvent::DoubleClick).unwrap() else {
            panic!("expected polygon commit");
        };
        assert_ne!(id.raw(), u64::MAX);
        assert!(id.in_range());
    }

    #[test]
    fn test_double_click_closes_polygon_started_by_click_mode() {
        // 会话模式为 none，点击自带多边形模式
        let mut session = AnnotationSession::default();
        assert_eq!(session.options().mode, DrawMode::Disabled);
        for pt in [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)] {
            session.handle(click(pt, ShapeKind::Polygon)).unwrap();
        }

        let outcome = session.handle(PointerEvent::DoubleClick).unwrap();
        assert!(matches!(outcome, EventOutcome::Committed(_)));
        assert!(session.pending().is_none());
        assert_eq!(session.annotations().polygons.len(), 1);
        assert_eq!(session.annotations().polygons[0].points.len(), 4);
    }

    #[test]
    fn test_double_click_idle_with_disabled_mode_ignored() {
        let mut session = AnnotationSession::default();
        session.handle(click(p(0.0, 0.0, 0.0), ShapeKind::Line)).unwrap();

        // 未在绘制多边形且会话模式为 none
        assert_eq!(session.handle(PointerEvent::DoubleClick).unwrap(), EventOutcome::Ignored);
        assert!(session.pending().is_some());
    }

    #[test]
    fn test_failed_add_leaves_state() {
        let mut session = polygon_session();
        let before = session.pending().cloned();
        let result = session.handle(click(p(f64::INFINITY, 0.0, 0.0), ShapeKind::Polygon));
        assert_eq!(result, Err(AnnotationError::NonFinitePoint));
        assert_eq!(session.pending().cloned(), before);
    }
}
