use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Why a connector was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    Checkout,
    Commit,
    Merge,
    /// Same-branch continuation drawn into the target of a merge.
    Continuation,
}

/// One primitive for the rendering surface, in absolute canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawInstruction {
    Circle {
        center: Point,
        /// A point on the circle's perimeter.
        radius_point: Point,
        fill: String,
        stroke: String,
        stroke_width: f32,
        stroke_opacity: f32,
    },
    Line {
        from: Point,
        to: Point,
        stroke: String,
        dash: Vec<f32>,
        stroke_width: f32,
        stroke_opacity: f32,
    },
    Bezier {
        kind: ConnectorKind,
        points: [Point; 4],
        stroke: String,
        stroke_width: f32,
        stroke_opacity: f32,
        fill: String,
        fill_opacity: f32,
    },
    Text {
        position: Point,
        text: String,
        font_size: f32,
        color: String,
        align: TextAlign,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub font_family: String,
    /// Paint order: title, branch backgrounds, then steps.
    pub instructions: Vec<DrawInstruction>,
}

impl Layout {
    pub fn connectors(&self) -> impl Iterator<Item = (ConnectorKind, &[Point; 4])> {
        self.instructions.iter().filter_map(|instruction| match instruction {
            DrawInstruction::Bezier { kind, points, .. } => Some((*kind, points)),
            _ => None,
        })
    }

    pub fn markers(&self) -> impl Iterator<Item = Point> + '_ {
        self.instructions.iter().filter_map(|instruction| match instruction {
            DrawInstruction::Circle { center, .. } => Some(*center),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.instructions.iter().filter_map(|instruction| match instruction {
            DrawInstruction::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}
