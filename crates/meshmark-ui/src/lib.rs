//! MeshMark 交互层
//!
//! 把视口传来的指针事件转换为已提交的标注。
//! 不包含任何渲染代码，渲染层只读取这里暴露的状态。

pub mod actor;
pub mod builder;
pub mod event;
pub mod selection;
pub mod session;
pub mod state;

pub use actor::{ActorError, SessionActor, SessionHandle};
pub use builder::{BuildResult, BuilderState, PendingShape, ShapeBuilder};
pub use event::{EventOutcome, PointerEvent};
pub use selection::SelectionMenu;
pub use session::AnnotationSession;
pub use state::{Color, DisplayOptions, DrawMode, PREVIEW_COLOR};
