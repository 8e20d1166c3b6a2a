//! 标注集合的 JSON 编码
//!
//! 格式：
//!
//! ```json
//! {
//!   "points":   [{ "id": 1, "value": { "x": 0.0, "y": 0.0, "z": 0.0 } }],
//!   "lines":    [{ "id": 2, "u": { ... }, "v": { ... } }],
//!   "polygons": [{ "id": 3, "points": [{ ... }, { ... }] }]
//! }
//! ```
//!
//! 解码时缺失或不是数组的分组按空分组处理；
//! 分组内的条目格式错误则整个解码失败。
//!
//! 旧版导出器用 `[0, 1)` 内的随机小数作为 ID，读取这类文件时
//! 为这些条目重新分配 ID，其余整数 ID 原样保留。

use crate::error::FileError;
use meshmark_core::geometry::{LineAnnotation, PointAnnotation, PolygonAnnotation};
use meshmark_core::id::AnnotationId;
use meshmark_core::math::{is_finite, Point3};
use meshmark_core::store::AnnotationSet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// 坐标 `{x, y, z}`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Vec3 {
    x: f64,
    y: f64,
    z: f64,
}

impl From<&Point3> for Vec3 {
    fn from(p: &Point3) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

impl From<Vec3> for Point3 {
    fn from(v: Vec3) -> Self {
        Point3::new(v.x, v.y, v.z)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PointRecord {
    id: Number,
    value: Vec3,
}

#[derive(Debug, Serialize, Deserialize)]
struct LineRecord {
    id: Number,
    u: Vec3,
    v: Vec3,
}

#[derive(Debug, Serialize, Deserialize)]
struct PolygonRecord {
    id: Number,
    points: Vec<Vec3>,
}

/// 可序列化的文件内容
#[derive(Debug, Serialize)]
struct FileContent {
    points: Vec<PointRecord>,
    lines: Vec<LineRecord>,
    polygons: Vec<PolygonRecord>,
}

impl FileContent {
    fn from_set(set: &AnnotationSet) -> Result<Self, FileError> {
        if let Some(bad) = set.all().find(|a| !a.vertices().iter().all(is_finite)) {
            return Err(FileError::MalformedAnnotation(format!(
                "{} {} has non-finite coordinates",
                bad.kind(),
                bad.id()
            )));
        }

        Ok(Self {
            points: set
                .points
                .iter()
                .map(|p| PointRecord {
                    id: p.id.raw().into(),
                    value: (&p.value).into(),
                })
                .collect(),
            lines: set
                .lines
                .iter()
                .map(|l| LineRecord {
                    id: l.id.raw().into(),
                    u: (&l.u).into(),
                    v: (&l.v).into(),
                })
                .collect(),
            polygons: set
                .polygons
                .iter()
                .map(|pg| PolygonRecord {
                    id: pg.id.raw().into(),
                    points: pg.points.iter().map(Vec3::from).collect(),
                })
                .collect(),
        })
    }
}

/// 编码为紧凑 JSON
pub fn serialize(set: &AnnotationSet) -> Result<String, FileError> {
    Ok(serde_json::to_string(&FileContent::from_set(set)?)?)
}

/// 编码为带缩进的 JSON
pub fn serialize_pretty(set: &AnnotationSet) -> Result<String, FileError> {
    Ok(serde_json::to_string_pretty(&FileContent::from_set(set)?)?)
}

/// 读取一个分组，缺失或不是数组时返回空
fn decode_group<T: DeserializeOwned>(root: &Value, name: &str) -> Result<Vec<T>, FileError> {
    let entries = match root.get(name) {
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            tracing::warn!(
                "Ignoring '{}' group: expected an array, found {}",
                name,
                kind_of(other)
            );
            return Ok(Vec::new());
        }
        None => return Ok(Vec::new()),
    };

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            T::deserialize(entry)
                .map_err(|e| FileError::MalformedAnnotation(format!("{}[{}]: {}", name, i, e)))
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// 文件中记录的 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileId {
    Kept(AnnotationId),
    /// 旧版导出器写入的小数 ID，需要重新分配
    Legacy,
}

fn file_id(number: &Number) -> Result<FileId, String> {
    if let Some(raw) = number.as_u64() {
        let id = AnnotationId::from_raw(raw);
        if !id.in_range() {
            return Err(format!("id {} exceeds {}", raw, AnnotationId::MAX_RAW));
        }
        return Ok(FileId::Kept(id));
    }
    match number.as_f64() {
        Some(v) if number.is_f64() && v.is_finite() && v >= 0.0 => Ok(FileId::Legacy),
        _ => Err(format!("invalid id {}", number)),
    }
}

fn resolve_ids<'a>(
    name: &str,
    ids: impl Iterator<Item = &'a Number>,
) -> Result<Vec<FileId>, FileError> {
    ids.enumerate()
        .map(|(i, number)| {
            file_id(number)
                .map_err(|e| FileError::MalformedAnnotation(format!("{}[{}]: {}", name, i, e)))
        })
        .collect()
}

/// 从 JSON 解码标注集合
///
/// 任一条目出错时返回错误，不会产生部分结果。
pub fn deserialize(text: &str) -> Result<AnnotationSet, FileError> {
    let root: Value = serde_json::from_str(text)?;

    let points = decode_group::<PointRecord>(&root, "points")?;
    let lines = decode_group::<LineRecord>(&root, "lines")?;
    let polygons = decode_group::<PolygonRecord>(&root, "polygons")?;

    let point_ids = resolve_ids("points", points.iter().map(|r| &r.id))?;
    let line_ids = resolve_ids("lines", lines.iter().map(|r| &r.id))?;
    let polygon_ids = resolve_ids("polygons", polygons.iter().map(|r| &r.id))?;

    let all_ids = || point_ids.iter().chain(&line_ids).chain(&polygon_ids);
    let legacy = all_ids().filter(|id| **id == FileId::Legacy).count();
    if legacy > 0 {
        // 新分配的 ID 必须大于文件中保留的整数 ID
        let kept_max = all_ids()
            .filter_map(|id| match id {
                FileId::Kept(id) => Some(*id),
                FileId::Legacy => None,
            })
            .max();
        if let Some(max) = kept_max {
            AnnotationId::reserve_through(max)
                .map_err(|e| FileError::MalformedAnnotation(e.to_string()))?;
        }
        tracing::warn!("Reassigned {} non-integer annotation ids", legacy);
    }

    let assign = |id: FileId| match id {
        FileId::Kept(id) => id,
        FileId::Legacy => AnnotationId::next(),
    };

    let set = AnnotationSet {
        points: points
            .into_iter()
            .zip(point_ids)
            .map(|(r, id)| PointAnnotation::new(assign(id), r.value.into()))
            .collect(),
        lines: lines
            .into_iter()
            .zip(line_ids)
            .map(|(r, id)| LineAnnotation::new(assign(id), r.u.into(), r.v.into()))
            .collect(),
        polygons: polygons
            .into_iter()
            .zip(polygon_ids)
            .map(|(r, id)| {
                PolygonAnnotation::new(assign(id), r.points.into_iter().map(Point3::from).collect())
            })
            .collect(),
    };

    if let Some(id) = set.find_duplicate_id() {
        return Err(FileError::MalformedAnnotation(format!("duplicate id {}", id.raw())));
    }

    Ok(set)
}
