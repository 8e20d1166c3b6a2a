//! 标注标识符
//!
//! 标识符由进程级单调计数器分配，同一进程内不会重复。

use crate::error::AnnotationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// 标注 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(u64);

impl AnnotationId {
    /// 可用 ID 的最大原始值
    ///
    /// 取 JSON 数字能精确表示的最大整数，
    /// 导出的文件在任何读取端都不会丢失精度。
    pub const MAX_RAW: u64 = (1 << 53) - 1;

    /// 分配一个新的 ID
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// 使用已有的原始值（例如从文件读取）
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn in_range(self) -> bool {
        self.0 <= Self::MAX_RAW
    }

    /// 确保之后分配的 ID 都大于 `id`
    ///
    /// 导入文件后调用，避免新标注与导入的标注冲突。
    /// 超出 [`AnnotationId::MAX_RAW`] 的 ID 会被拒绝，计数器保持不变。
    pub fn reserve_through(id: AnnotationId) -> Result<(), AnnotationError> {
        if !id.in_range() {
            return Err(AnnotationError::IdOutOfRange(id.0));
        }
        NEXT_ID.fetch_max(id.0 + 1, Ordering::Relaxed);
        Ok(())
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
