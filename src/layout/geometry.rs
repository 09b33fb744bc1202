use crate::config::LayoutConfig;

use super::Point;

/// Horizontal reference point on a step marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XAnchor {
    Center,
    /// Start of an outgoing connector: just past the marker's right edge.
    Left,
    /// End of an incoming connector: just before the marker's left edge.
    Right,
}

/// Vertical reference point on a step marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YAnchor {
    Center,
    Top,
    Bottom,
}

pub fn step_x(config: &LayoutConfig, step: usize, anchor: XAnchor) -> f32 {
    let reach = config.marker_radius + config.connection_gap;
    let correction = match anchor {
        XAnchor::Center => 0.0,
        XAnchor::Left => reach,
        XAnchor::Right => -reach,
    };
    config.left_margin + step as f32 * config.step_width + config.first_step_offset + correction
}

pub fn row_y(config: &LayoutConfig, row: usize, anchor: YAnchor) -> f32 {
    let correction = match anchor {
        YAnchor::Center => 0.0,
        YAnchor::Top => config.marker_radius,
        YAnchor::Bottom => -config.marker_radius,
    };
    config.top_margin + row as f32 * config.row_height + correction
}

/// Depends only on the number of branches, never on the number of steps.
pub fn canvas_height(config: &LayoutConfig, branch_count: usize) -> f32 {
    config.top_margin + branch_count as f32 * config.row_height + config.bottom_margin
}

/// Cubic S-curve between two rows: the control points swap the endpoint
/// coordinates so the curve leaves and arrives horizontally.
pub fn connector_points(from: Point, to: Point) -> [Point; 4] {
    [
        from,
        Point::new(to.x, from.y),
        Point::new(from.x, to.y),
        to,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_sits_after_the_label_column() {
        let config = LayoutConfig::default();
        assert_eq!(
            step_x(&config, 0, XAnchor::Center),
            config.left_margin + config.first_step_offset
        );
        assert_eq!(step_x(&config, 3, XAnchor::Center), 220.0 + 240.0 + 20.0);
    }

    #[test]
    fn anchors_straddle_the_marker() {
        let config = LayoutConfig::default();
        for step in [0, 1, 7, 42] {
            let left = step_x(&config, step, XAnchor::Left);
            let right = step_x(&config, step, XAnchor::Right);
            assert_eq!(left - right, 2.0 * (config.marker_radius + config.connection_gap));
        }
        assert_eq!(row_y(&config, 2, YAnchor::Top) - row_y(&config, 2, YAnchor::Bottom), 30.0);
    }

    #[test]
    fn rows_start_at_the_top_margin() {
        let config = LayoutConfig::default();
        assert_eq!(row_y(&config, 0, YAnchor::Center), config.top_margin);
        assert_eq!(row_y(&config, 2, YAnchor::Center), 150.0 + 160.0);
    }

    #[test]
    fn height_follows_branch_count() {
        let config = LayoutConfig::default();
        assert_eq!(canvas_height(&config, 0), 200.0);
        assert_eq!(canvas_height(&config, 4), 150.0 + 320.0 + 50.0);
    }

    #[test]
    fn alternate_geometry() {
        let config = LayoutConfig {
            left_margin: 10.0,
            first_step_offset: 5.0,
            step_width: 30.0,
            ..LayoutConfig::default()
        };
        assert_eq!(step_x(&config, 2, XAnchor::Center), 75.0);
    }

    #[test]
    fn connector_control_points_swap_coordinates() {
        let points = connector_points(Point::new(10.0, 20.0), Point::new(90.0, 100.0));
        assert_eq!(points[1], Point::new(90.0, 20.0));
        assert_eq!(points[2], Point::new(10.0, 100.0));
        assert_eq!(points[3], Point::new(90.0, 100.0));
    }
}
