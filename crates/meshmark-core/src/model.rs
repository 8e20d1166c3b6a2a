//! 可标注模型目录
//!
//! 标注只属于当前加载的模型，切换模型时标注集合会被清空。

use crate::math::BoundingBox3;

/// 未加载模型或包围盒退化时使用的标记尺寸
pub const DEFAULT_MARKER_SIZE: f64 = 0.01;

/// 默认打开的模型
pub const DEFAULT_MODEL: &str = "chair";

/// 模型条目
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEntry {
    pub name: String,
    /// 资源路径（glTF）
    pub url: String,
    /// 显示缩放
    pub scale: f64,
}

impl ModelEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>, scale: f64) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            scale,
        }
    }
}

/// 模型目录
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    entries: Vec<ModelEntry>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置模型
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(ModelEntry::new("drone", "/models/drone/scene.gltf", 0.1));
        catalog.register(ModelEntry::new("chair", "/models/office_chair/scene.gltf", 2.0));
        catalog.register(ModelEntry::new("robot", "/models/robot_a.l.e.x/scene.gltf", 1.5));
        catalog
    }

    /// 注册模型，同名条目会被替换
    pub fn register(&mut self, entry: ModelEntry) {
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModelEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 根据模型包围盒计算顶点标记球的半径
///
/// 同时作为右键拾取的容差。
pub fn marker_size(bbox: &BoundingBox3) -> f64 {
    let volume = bbox.volume();
    if !(volume.is_finite() && volume > 0.0) {
        return DEFAULT_MARKER_SIZE;
    }
    let size = volume.ln().abs() * 0.01;
    if size > 0.0 {
        size
    } else {
        DEFAULT_MARKER_SIZE
    }
}
