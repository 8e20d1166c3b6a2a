//! 指针事件脚本
//!
//! 一个 JSON 数组，每个元素是一个带 `type` 标签的步骤：
//!
//! ```json
//! [
//!   { "type": "click", "point": [0, 0, 0], "mode": "polygon" },
//!   { "type": "move", "point": [1, 0, 0] },
//!   { "type": "double_click" },
//!   { "type": "right_click", "point": [0, 0, 0], "screen": [320, 240] },
//!   { "type": "confirm_delete" }
//! ]
//! ```

use meshmark_core::math::{BoundingBox3, Point2, Point3};
use meshmark_core::model::ModelCatalog;
use meshmark_ui::{AnnotationSession, DrawMode, EventOutcome, PointerEvent};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptStep {
    Click {
        point: [f64; 3],
        /// 省略时使用会话当前的绘制模式
        #[serde(default)]
        mode: Option<String>,
    },
    DoubleClick,
    Move {
        point: [f64; 3],
    },
    RightClick {
        point: [f64; 3],
        #[serde(default)]
        screen: [f64; 2],
    },
    ConfirmDelete,
    Dismiss,
    Cancel,
    SetMode {
        mode: String,
    },
    SwitchModel {
        name: String,
        /// 模型包围盒 `[min, max]`
        #[serde(default)]
        bounds: Option<[[f64; 3]; 2]>,
    },
}

/// 回放统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub committed: usize,
    pub deleted: usize,
    pub failed: usize,
}

pub fn parse(text: &str) -> serde_json::Result<Vec<ScriptStep>> {
    serde_json::from_str(text)
}

fn point3(p: [f64; 3]) -> Point3 {
    Point3::new(p[0], p[1], p[2])
}

/// 按顺序回放脚本
///
/// 单个步骤失败只记录警告，后续步骤继续执行。
pub fn replay(
    session: &mut AnnotationSession,
    catalog: &ModelCatalog,
    steps: &[ScriptStep],
) -> ReplaySummary {
    let mut summary = ReplaySummary::default();

    for (i, step) in steps.iter().enumerate() {
        match apply(session, catalog, step) {
            Ok(StepResult::Committed) => summary.committed += 1,
            Ok(StepResult::Deleted) => summary.deleted += 1,
            Ok(StepResult::Other) => {}
            Err(e) => {
                tracing::warn!("Step {} ({:?}) failed: {}", i, step, e);
                summary.failed += 1;
                continue;
            }
        }
        summary.applied += 1;
    }

    summary
}

enum StepResult {
    Committed,
    Deleted,
    Other,
}

fn apply(
    session: &mut AnnotationSession,
    catalog: &ModelCatalog,
    step: &ScriptStep,
) -> anyhow::Result<StepResult> {
    let event = match step {
        ScriptStep::Click { point, mode } => {
            let mode = match mode {
                Some(m) => m.parse::<DrawMode>()?,
                None => session.options().mode,
            };
            PointerEvent::Click {
                point: point3(*point),
                mode,
            }
        }
        ScriptStep::DoubleClick => PointerEvent::DoubleClick,
        ScriptStep::Move { point } => PointerEvent::PointerMove {
            point: point3(*point),
        },
        ScriptStep::RightClick { point, screen } => PointerEvent::RightClick {
            point: point3(*point),
            screen_position: Point2::new(screen[0], screen[1]),
        },
        ScriptStep::Cancel => PointerEvent::Cancel,
        ScriptStep::ConfirmDelete => {
            return Ok(match session.confirm_delete() {
                Some(_) => StepResult::Deleted,
                None => StepResult::Other,
            });
        }
        ScriptStep::Dismiss => {
            session.dismiss_menu();
            return Ok(StepResult::Other);
        }
        ScriptStep::SetMode { mode } => {
            session.options_mut().mode = mode.parse()?;
            return Ok(StepResult::Other);
        }
        ScriptStep::SwitchModel { name, bounds } => {
            let entry = catalog
                .get(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown model '{}'", name))?;
            let bounds = bounds.map(|[min, max]| BoundingBox3::new(point3(min), point3(max)));
            session.switch_model(entry.clone(), bounds);
            return Ok(StepResult::Other);
        }
    };

    Ok(match session.handle(event)? {
        EventOutcome::Committed(_) => StepResult::Committed,
        _ => StepResult::Other,
    })
}
