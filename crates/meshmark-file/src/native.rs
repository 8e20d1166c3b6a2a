//! 标注文件（.json）读写

use crate::error::FileError;
use crate::json;
use meshmark_core::store::AnnotationSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 导出时的默认文件名
pub const DEFAULT_FILE_NAME: &str = "annotations.json";

/// 保存标注集合到文件
pub fn save(set: &AnnotationSet, path: &Path) -> Result<(), FileError> {
    write(set, path, json::serialize(set)?)
}

/// 保存为带缩进的 JSON，便于人工查看
pub fn save_pretty(set: &AnnotationSet, path: &Path) -> Result<(), FileError> {
    write(set, path, json::serialize_pretty(set)?)
}

fn write(set: &AnnotationSet, path: &Path, text: String) -> Result<(), FileError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;

    tracing::info!(
        "Saved {} points, {} lines, {} polygons to {} ({} bytes)",
        set.points.len(),
        set.lines.len(),
        set.polygons.len(),
        path.display(),
        text.len()
    );

    Ok(())
}

/// 从文件加载标注集合
///
/// 解码失败时不返回任何部分结果。
pub fn load(path: &Path) -> Result<AnnotationSet, FileError> {
    let text = std::fs::read_to_string(path)?;
    let set = json::deserialize(&text)?;

    tracing::info!("Loaded {} annotations from {}", set.len(), path.display());

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshmark_core::geometry::{LineAnnotation, PolygonAnnotation};
    use meshmark_core::id::AnnotationId;
    use meshmark_core::math::Point3;

    #[test]
    fn test_save_load_roundtrip() {
        let file_path = std::env::temp_dir().join("meshmark_test_roundtrip.json");

        let mut set = AnnotationSet::new();
        set.commit(
            LineAnnotation::new(
                AnnotationId::from_raw(1),
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.25, 0.5, 0.75),
            )
            .into(),
        );
        set.commit(
            PolygonAnnotation::closed(
                AnnotationId::from_raw(2),
                vec![
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(1.0, 0.0, 0.0),
                    Point3::new(1.0, 1.0, 0.0),
                ],
            )
            .into(),
        );

        save(&set, &file_path).expect("Failed to save");
        let loaded = load(&file_path).expect("Failed to load");
        assert_eq!(loaded, set);

        std::fs::remove_file(&file_path).ok();
    }

    #[test]
    fn test_save_pretty_roundtrip() {
        let file_path = std::env::temp_dir().join("meshmark_test_pretty.json");

        let mut set = AnnotationSet::new();
        set.commit(
            LineAnnotation::new(
                AnnotationId::from_raw(7),
                Point3::new(1.5, -2.0, 0.125),
                Point3::new(3.0, 4.0, 5.0),
            )
            .into(),
        );

        save_pretty(&set, &file_path).expect("Failed to save");
        let text = std::fs::read_to_string(&file_path).expect("Failed to read");
        assert!(text.contains('\n'));
        assert_eq!(load(&file_path).expect("Failed to load"), set);

        std::fs::remove_file(&file_path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let file_path = std::env::temp_dir().join("meshmark_test_does_not_exist.json");
        assert!(matches!(load(&file_path), Err(FileError::Io(_))));
    }

    #[test]
    fn test_load_malformed() {
        let file_path = std::env::temp_dir().join("meshmark_test_malformed.json");
        std::fs::write(
            &file_path,
            r#"{"points": [{"id": 1, "value": {"x": "0", "y": 0, "z": 0}}]}"#,
        )
        .expect("Failed to write");

        assert!(matches!(load(&file_path), Err(FileError::MalformedAnnotation(_))));

        std::fs::remove_file(&file_path).ok();
    }
}
