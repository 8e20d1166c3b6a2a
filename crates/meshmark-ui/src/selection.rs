//! 右键菜单状态
//!
//! 记录右键选中的标注和菜单的屏幕位置，菜单提供删除操作。

use meshmark_core::geometry::Annotation;
use meshmark_core::id::AnnotationId;
use meshmark_core::math::Point2;
use meshmark_core::store::AnnotationSet;

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionMenu {
    open: bool,
    selected: Option<AnnotationId>,
    screen_position: Point2,
}

impl Default for SelectionMenu {
    fn default() -> Self {
        Self {
            open: false,
            selected: None,
            screen_position: Point2::origin(),
        }
    }
}

impl SelectionMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected(&self) -> Option<AnnotationId> {
        self.selected
    }

    pub fn screen_position(&self) -> Point2 {
        self.screen_position
    }

    /// 在屏幕位置打开菜单并选中标注
    pub fn select(&mut self, id: AnnotationId, screen_position: Point2) {
        self.open = true;
        self.selected = Some(id);
        self.screen_position = screen_position;
    }

    pub fn dismiss(&mut self) {
        self.open = false;
        self.selected = None;
    }

    /// 删除选中的标注并关闭菜单
    ///
    /// 菜单未打开时什么也不做。
    pub fn confirm_delete(&mut self, annotations: &mut AnnotationSet) -> Option<Annotation> {
        if !self.open {
            return None;
        }
        let removed = self.selected.and_then(|id| annotations.delete_by_id(id));
        self.dismiss();
        removed
    }
}
