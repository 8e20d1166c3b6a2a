//! 标注显示选项与绘制模式

use meshmark_core::geometry::ShapeKind;
use meshmark_core::AnnotationError;
use std::fmt;
use std::str::FromStr;

/// 当前绘制模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// 禁止绘制（"none"）
    #[default]
    Disabled,
    Shape(ShapeKind),
}

impl DrawMode {
    pub fn name(&self) -> &'static str {
        match self {
            DrawMode::Disabled => "none",
            DrawMode::Shape(kind) => kind.name(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, DrawMode::Shape(_))
    }
}

impl From<ShapeKind> for DrawMode {
    fn from(kind: ShapeKind) -> Self {
        DrawMode::Shape(kind)
    }
}

impl fmt::Display for DrawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DrawMode {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("none") {
            return Ok(DrawMode::Disabled);
        }
        s.parse::<ShapeKind>().map(DrawMode::Shape)
    }
}

/// RGB 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// 解析 `#rrggbb`
    pub fn from_hex(hex: &str) -> Result<Self, String> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Invalid color: {}", hex));
        }
        let channel =
            |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// 绘制中图形的预览颜色
pub const PREVIEW_COLOR: Color = Color::rgb(0xf1, 0xff, 0x2c);

/// 标注显示选项（由宿主界面的控制面板设置）
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayOptions {
    pub mode: DrawMode,
    /// 已提交标注的颜色
    pub color: Color,
    /// 是否显示已提交的标注
    pub show: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            mode: DrawMode::Disabled,
            color: Color::rgb(0xff, 0x00, 0x00),
            show: true,
        }
    }
}
