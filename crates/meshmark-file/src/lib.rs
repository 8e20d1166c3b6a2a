//! MeshMark 文件格式处理
//!
//! 标注集合以 JSON 保存：
//! - `json`: 文本编码/解码（纯内存转换）
//! - `native`: 读写 `.json` 标注文件

pub mod error;
pub mod json;
pub mod native;

pub use error::FileError;
pub use json::{deserialize, serialize, serialize_pretty};
pub use native::{load, save, save_pretty, DEFAULT_FILE_NAME};
