//! 视口指针事件
//!
//! 渲染层只在指针位于模型表面时发出这些事件，坐标为世界坐标。

use meshmark_core::id::AnnotationId;
use meshmark_core::math::{Point2, Point3};

use crate::state::DrawMode;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// 左键点击
    Click { point: Point3, mode: DrawMode },
    /// 双击，闭合多边形
    DoubleClick,
    /// 指针移动，更新预览
    PointerMove { point: Point3 },
    /// 右键点击，打开删除菜单
    RightClick { point: Point3, screen_position: Point2 },
    /// 取消当前图形（Esc）
    Cancel,
}

/// 事件处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// 事件被忽略（例如绘制被禁用）
    Ignored,
    /// 点击只用于关闭菜单
    MenuDismissed,
    /// 顶点已加入待提交图形
    Extended,
    /// 图形完成并已提交
    Committed(AnnotationId),
    /// 预览位置已更新
    PreviewUpdated,
    /// 右键选中了标注
    MenuOpened(AnnotationId),
    /// 待提交图形已丢弃
    Cancelled,
}
