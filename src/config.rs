use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_WIDTH: f32 = 2500.0;

/// Fixed geometry of the diagram. All distances are in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Width of the branch label column left of the first step.
    pub left_margin: f32,
    /// Band above the first row; the title is centered inside it.
    pub top_margin: f32,
    pub right_margin: f32,
    pub bottom_margin: f32,
    pub row_height: f32,
    pub step_width: f32,
    pub first_step_offset: f32,
    pub marker_radius: f32,
    /// Gap between a marker's edge and the end of a connector.
    pub connection_gap: f32,
    pub label_padding: f32,
    pub system_label_offset: f32,
    pub title_font_size: f32,
    pub connector_stroke_width: f32,
    pub connector_stroke_opacity: f32,
    pub connector_fill_opacity: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            left_margin: 220.0,
            top_margin: 150.0,
            right_margin: 50.0,
            bottom_margin: 50.0,
            row_height: 80.0,
            step_width: 80.0,
            first_step_offset: 20.0,
            marker_radius: 15.0,
            connection_gap: 8.0,
            label_padding: 20.0,
            system_label_offset: 20.0,
            title_font_size: 40.0,
            connector_stroke_width: 3.0,
            connector_stroke_opacity: 1.0,
            connector_fill_opacity: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub format: OutputFormat,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    width: Option<f32>,
    format: Option<OutputFormat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    background: Option<String>,
    title_color: Option<String>,
    connection_stroke_color: Option<String>,
    connection_fill_color: Option<String>,
    checkout_color: Option<String>,
    commit_color: Option<String>,
    merge_color: Option<String>,
    branch_fill_color: Option<String>,
    branch_stroke_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    left_margin: Option<f32>,
    top_margin: Option<f32>,
    right_margin: Option<f32>,
    bottom_margin: Option<f32>,
    row_height: Option<f32>,
    step_width: Option<f32>,
    first_step_offset: Option<f32>,
    marker_radius: Option<f32>,
    connection_gap: Option<f32>,
    label_padding: Option<f32>,
    system_label_offset: Option<f32>,
    title_font_size: Option<f32>,
    connector_stroke_width: Option<f32>,
    connector_stroke_opacity: Option<f32>,
    connector_fill_opacity: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Applies a JSON config document on top of the defaults. Keys that are
/// absent keep their default value.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme \"{theme_name}\""))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.title_color {
            config.theme.title_color = v;
        }
        if let Some(v) = vars.connection_stroke_color {
            config.theme.connection_stroke_color = v;
        }
        if let Some(v) = vars.connection_fill_color {
            config.theme.connection_fill_color = v;
        }
        if let Some(v) = vars.checkout_color {
            config.theme.checkout_color = v;
        }
        if let Some(v) = vars.commit_color {
            config.theme.commit_color = v;
        }
        if let Some(v) = vars.merge_color {
            config.theme.merge_color = v;
        }
        if let Some(v) = vars.branch_fill_color {
            config.theme.branch_fill_color = v;
        }
        if let Some(v) = vars.branch_stroke_color {
            config.theme.branch_stroke_color = v;
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        let overrides = [
            (layout.left_margin, &mut target.left_margin),
            (layout.top_margin, &mut target.top_margin),
            (layout.right_margin, &mut target.right_margin),
            (layout.bottom_margin, &mut target.bottom_margin),
            (layout.row_height, &mut target.row_height),
            (layout.step_width, &mut target.step_width),
            (layout.first_step_offset, &mut target.first_step_offset),
            (layout.marker_radius, &mut target.marker_radius),
            (layout.connection_gap, &mut target.connection_gap),
            (layout.label_padding, &mut target.label_padding),
            (layout.system_label_offset, &mut target.system_label_offset),
            (layout.title_font_size, &mut target.title_font_size),
            (layout.connector_stroke_width, &mut target.connector_stroke_width),
            (layout.connector_stroke_opacity, &mut target.connector_stroke_opacity),
            (layout.connector_fill_opacity, &mut target.connector_fill_opacity),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }

    if let Some(width) = parsed.width {
        config.render.width = width;
    }
    if let Some(format) = parsed.format {
        config.render.format = format;
    }

    Ok(config)
}
