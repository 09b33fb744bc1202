use crate::config::OutputFormat;
use crate::layout::{DrawInstruction, Layout, Point, TextAlign};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Drawing capability the layout is replayed onto.
pub trait DrawingSurface {
    fn draw_circle(&mut self, center: Point, radius: f32, style: &ShapeStyle);
    fn draw_line(&mut self, from: Point, to: Point, dash: &[f32], style: &ShapeStyle);
    fn draw_bezier(&mut self, points: &[Point; 4], style: &ShapeStyle);
    fn draw_text(&mut self, position: Point, text: &str, font_size: f32, color: &str, align: TextAlign);
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    pub fill: Option<String>,
    pub fill_opacity: f32,
    pub stroke: String,
    pub stroke_width: f32,
    pub stroke_opacity: f32,
}

/// Sends every instruction of `layout` to `surface`, in order.
pub fn replay(layout: &Layout, surface: &mut dyn DrawingSurface) {
    for instruction in &layout.instructions {
        match instruction {
            DrawInstruction::Circle {
                center,
                radius_point,
                fill,
                stroke,
                stroke_width,
                stroke_opacity,
            } => {
                let radius = (radius_point.x - center.x).hypot(radius_point.y - center.y);
                surface.draw_circle(
                    *center,
                    radius,
                    &ShapeStyle {
                        fill: Some(fill.clone()),
                        fill_opacity: 1.0,
                        stroke: stroke.clone(),
                        stroke_width: *stroke_width,
                        stroke_opacity: *stroke_opacity,
                    },
                );
            }
            DrawInstruction::Line {
                from,
                to,
                stroke,
                dash,
                stroke_width,
                stroke_opacity,
            } => surface.draw_line(
                *from,
                *to,
                dash,
                &ShapeStyle {
                    fill: None,
                    fill_opacity: 0.0,
                    stroke: stroke.clone(),
                    stroke_width: *stroke_width,
                    stroke_opacity: *stroke_opacity,
                },
            ),
            DrawInstruction::Bezier {
                points,
                stroke,
                stroke_width,
                stroke_opacity,
                fill,
                fill_opacity,
                ..
            } => surface.draw_bezier(
                points,
                &ShapeStyle {
                    fill: Some(fill.clone()),
                    fill_opacity: *fill_opacity,
                    stroke: stroke.clone(),
                    stroke_width: *stroke_width,
                    stroke_opacity: *stroke_opacity,
                },
            ),
            DrawInstruction::Text {
                position,
                text,
                font_size,
                color,
                align,
            } => surface.draw_text(*position, text, *font_size, color, *align),
        }
    }
}

/// Accumulates an SVG document.
pub struct SvgSurface {
    body: String,
    width: f32,
    height: f32,
    background: String,
    font_family: String,
}

impl SvgSurface {
    pub fn new(width: f32, height: f32, background: &str, font_family: &str) -> Self {
        Self {
            body: String::new(),
            width,
            height,
            background: background.to_string(),
            font_family: font_family.to_string(),
        }
    }

    pub fn finish(self) -> String {
        let width = self.width;
        let height = self.height;
        let mut svg = String::with_capacity(self.body.len() + 256);
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        ));
        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(&self.background)
        ));
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        svg
    }
}

fn fill_attrs(style: &ShapeStyle) -> String {
    match &style.fill {
        Some(fill) => format!(
            "fill=\"{}\" fill-opacity=\"{}\"",
            escape_xml(fill),
            style.fill_opacity
        ),
        None => "fill=\"none\"".to_string(),
    }
}

fn stroke_attrs(style: &ShapeStyle) -> String {
    format!(
        "stroke=\"{}\" stroke-width=\"{}\" stroke-opacity=\"{}\"",
        escape_xml(&style.stroke),
        style.stroke_width,
        style.stroke_opacity
    )
}

impl DrawingSurface for SvgSurface {
    fn draw_circle(&mut self, center: Point, radius: f32, style: &ShapeStyle) {
        let _ = write!(
            self.body,
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" {} {}/>",
            center.x,
            center.y,
            radius,
            fill_attrs(style),
            stroke_attrs(style)
        );
    }

    fn draw_line(&mut self, from: Point, to: Point, dash: &[f32], style: &ShapeStyle) {
        let dash_attr = if dash.is_empty() {
            String::new()
        } else {
            let values: Vec<String> = dash.iter().map(|value| value.to_string()).collect();
            format!(" stroke-dasharray=\"{}\"", values.join(" "))
        };
        let _ = write!(
            self.body,
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" {}{dash_attr}/>",
            from.x,
            from.y,
            to.x,
            to.y,
            stroke_attrs(style)
        );
    }

    fn draw_bezier(&mut self, points: &[Point; 4], style: &ShapeStyle) {
        let [start, c1, c2, end] = points;
        let _ = write!(
            self.body,
            "<path d=\"M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}\" {} {}/>",
            start.x,
            start.y,
            c1.x,
            c1.y,
            c2.x,
            c2.y,
            end.x,
            end.y,
            fill_attrs(style),
            stroke_attrs(style)
        );
    }

    fn draw_text(&mut self, position: Point, text: &str, font_size: f32, color: &str, align: TextAlign) {
        let anchor = match align {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
            TextAlign::Right => "end",
        };
        let _ = write!(
            self.body,
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{font_size}\" fill=\"{}\">{}</text>",
            position.x,
            position.y,
            escape_xml(&self.font_family),
            escape_xml(color),
            escape_xml(text)
        );
    }
}

pub fn render_svg(layout: &Layout) -> String {
    let mut surface = SvgSurface::new(
        layout.width,
        layout.height,
        &layout.background,
        &layout.font_family,
    );
    replay(layout, &mut surface);
    surface.finish()
}

#[cfg(feature = "png")]
pub fn render_png(layout: &Layout) -> Result<Vec<u8>> {
    let svg = render_svg(layout);
    let mut opt = usvg::Options::default();
    opt.font_family = layout
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().to_string())
        .unwrap_or_else(|| "DejaVu Sans".to_string());
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(&svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("failed to allocate a {}x{} pixmap", size.width(), size.height()))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    Ok(pixmap.encode_png()?)
}

#[cfg(not(feature = "png"))]
pub fn render_png(_layout: &Layout) -> Result<Vec<u8>> {
    anyhow::bail!("PNG output requires the `png` feature")
}

pub fn render(layout: &Layout, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Svg => Ok(render_svg(layout).into_bytes()),
        OutputFormat::Png => render_png(layout),
    }
}

/// Writes `bytes` to `path` through a temporary file in the same directory
/// that is renamed into place. On failure `path` is left as it was.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    persist_atomically(path, bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "image written");
    Ok(())
}

fn persist_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    if let Ok(existing) = std::fs::metadata(path)
        && existing.is_file()
    {
        tmp.as_file().set_permissions(existing.permissions())?;
    } else {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))?;
        }
    }
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// `input` with its extension replaced by the one for `format`.
pub fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    input.with_extension(format.extension())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
