mod branches;
mod geometry;
mod steps;
pub(crate) mod types;
pub use geometry::{XAnchor, YAnchor, canvas_height, connector_points, row_y, step_x};
pub use types::*;
use branches::*;
use steps::*;

use crate::config::{DEFAULT_WIDTH, LayoutConfig};
use crate::error::DiagramResult;
use crate::ir::{BranchRegistry, Diagram};
use crate::text_metrics::TextMeasure;
use crate::theme::Theme;

/// Turns a diagram into draw instructions.
///
/// Steps are visited in sequence order and each one advances the cursor of
/// its target branch, so `diagram` is left with every branch pointing at the
/// last step that touched it. Cursors are cleared first, which makes the
/// call repeatable on the same diagram.
pub fn compute_layout(
    diagram: &mut Diagram,
    theme: &Theme,
    config: &LayoutConfig,
    metrics: &dyn TextMeasure,
) -> DiagramResult<Layout> {
    let width = diagram
        .width
        .filter(|width| width.is_finite() && *width > 0.0)
        .unwrap_or(DEFAULT_WIDTH);
    let height = canvas_height(config, diagram.branches.count());
    diagram.branches.reset_cursors();

    let mut instructions = Vec::with_capacity(
        1 + diagram.branches.count() * 3 + diagram.steps.count() * 3,
    );
    instructions.push(title_instruction(
        &diagram.title,
        width,
        theme,
        config,
        metrics,
    ));
    branch_instructions(&diagram.branches, width, config, metrics, &mut instructions);
    step_instructions(diagram, theme, config, &mut instructions)?;

    tracing::debug!(
        width,
        height,
        branches = diagram.branches.count(),
        steps = diagram.steps.count(),
        instructions = instructions.len(),
        "layout computed"
    );

    Ok(Layout {
        width,
        height,
        background: theme.background.clone(),
        font_family: theme.font_family.clone(),
        instructions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Branch, Step};
    use crate::text_metrics::EstimatedMetrics;

    fn sample() -> Diagram {
        let mut diagram = Diagram::new("Release flow");
        diagram.add_branch("master", Branch::new("#fcc", "#b30000")).unwrap();
        diagram.add_branch("develop", Branch::new("#cfc", "#00b368")).unwrap();
        diagram.add_branch(["feature", "a"], Branch::new("#ccf", "#0083b3")).unwrap();
        diagram.add_step(Step::init("master").unwrap());
        diagram.add_step(Step::checkout("master", "develop").unwrap());
        diagram.add_step(Step::checkout("develop", "feature/a").unwrap());
        diagram.add_step(Step::commit("feature/a").unwrap());
        diagram.add_step(Step::merge("feature/a", "develop").unwrap());
        diagram.add_step(Step::merge("develop", "master").unwrap());
        diagram
    }

    fn layout(diagram: &mut Diagram) -> Layout {
        compute_layout(
            diagram,
            &Theme::classic(),
            &LayoutConfig::default(),
            &EstimatedMetrics,
        )
        .unwrap()
    }

    #[test]
    fn canvas_size_ignores_step_count() {
        let mut diagram = sample();
        let first = layout(&mut diagram);
        assert_eq!(first.width, DEFAULT_WIDTH);
        assert_eq!(first.height, 150.0 + 3.0 * 80.0 + 50.0);

        diagram.add_step(Step::commit("master").unwrap());
        let second = layout(&mut diagram);
        assert_eq!(second.height, first.height);
    }

    #[test]
    fn caller_width_is_used_when_positive() {
        let mut diagram = sample();
        diagram.width = Some(1200.0);
        assert_eq!(layout(&mut diagram).width, 1200.0);
        diagram.width = Some(0.0);
        assert_eq!(layout(&mut diagram).width, DEFAULT_WIDTH);
    }

    #[test]
    fn paint_order_is_title_branches_steps() {
        let mut diagram = sample();
        let layout = layout(&mut diagram);
        let texts: Vec<_> = layout.texts().collect();
        assert_eq!(texts, vec!["Release flow", "master", "develop", "feature/a"]);
        assert!(matches!(layout.instructions[0], DrawInstruction::Text { .. }));

        let first_marker = layout
            .instructions
            .iter()
            .position(|instruction| matches!(instruction, DrawInstruction::Circle { .. }))
            .unwrap();
        let last_line = layout
            .instructions
            .iter()
            .rposition(|instruction| matches!(instruction, DrawInstruction::Line { .. }))
            .unwrap();
        assert!(last_line < first_marker);
    }

    #[test]
    fn layout_can_be_recomputed() {
        let mut diagram = sample();
        let first = layout(&mut diagram);
        let second = layout(&mut diagram);
        assert_eq!(first.instructions, second.instructions);
        assert_eq!(
            diagram.branches.get("develop").unwrap().last_step_position(),
            Some(4)
        );
    }

    #[test]
    fn markers_follow_step_positions() {
        let mut diagram = sample();
        let layout = layout(&mut diagram);
        let config = LayoutConfig::default();
        let xs: Vec<f32> = layout.markers().map(|point| point.x).collect();
        let expected: Vec<f32> = (0..6)
            .map(|step| step_x(&config, step, XAnchor::Center))
            .collect();
        assert_eq!(xs, expected);
        assert_eq!(layout.connectors().count(), 7);
    }
}
