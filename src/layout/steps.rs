use super::geometry::{XAnchor, YAnchor, connector_points, row_y, step_x};
use super::*;
use crate::error::DiagramError;
use crate::ir::{Step, StepKind};

/// Marker and connectors for every step, in sequence order, advancing the
/// target branch cursor after each one.
pub(super) fn step_instructions(
    diagram: &mut Diagram,
    theme: &Theme,
    config: &LayoutConfig,
    out: &mut Vec<DrawInstruction>,
) -> DiagramResult<()> {
    let Diagram {
        branches, steps, ..
    } = diagram;
    let mut pass = StepPass {
        branches,
        theme,
        config,
        out,
    };

    for (position, step) in steps.positioned() {
        tracing::debug!(
            position,
            kind = %step.kind(),
            source = step.source().unwrap_or("-"),
            target = step.target(),
            "laying out step"
        );
        pass.step(step, position)?;
    }
    Ok(())
}

struct StepPass<'a> {
    branches: &'a mut BranchRegistry,
    theme: &'a Theme,
    config: &'a LayoutConfig,
    out: &'a mut Vec<DrawInstruction>,
}

impl StepPass<'_> {
    fn step(&mut self, step: &Step, position: usize) -> DiagramResult<()> {
        let marker = self.marker(step, position)?;
        self.out.push(marker);

        let source = step.source();
        let target = Some(step.target());
        match step.kind() {
            StepKind::Init => {}
            StepKind::Checkout => self.connect(source, target, position, ConnectorKind::Checkout)?,
            StepKind::Commit => self.connect(source, target, position, ConnectorKind::Commit)?,
            StepKind::Merge => {
                self.connect(source, target, position, ConnectorKind::Merge)?;
                self.connect(target, target, position, ConnectorKind::Continuation)?;
            }
        }

        self.branches
            .lookup_mut(step.target())?
            .set_last_step_position(position)
    }

    fn marker(&self, step: &Step, position: usize) -> DiagramResult<DrawInstruction> {
        let config = self.config;
        let target = self.branches.lookup(step.target())?;
        let x = step_x(config, position, XAnchor::Center);
        let y = row_y(config, target.row(), YAnchor::Center);
        Ok(DrawInstruction::Circle {
            center: Point::new(x, y),
            radius_point: Point::new(x + config.marker_radius, y),
            fill: target.fill_color().to_string(),
            stroke: self.theme.connection_stroke_color.clone(),
            stroke_width: config.connector_stroke_width,
            stroke_opacity: target.stroke_opacity(),
        })
    }

    /// Bezier from the source branch's last step to `position` on the target
    /// row. Nothing is drawn while the source has no prior step.
    fn connect(
        &mut self,
        source: Option<&str>,
        target: Option<&str>,
        position: usize,
        kind: ConnectorKind,
    ) -> DiagramResult<()> {
        let source = source.ok_or(DiagramError::NullConnectorEndpoint("source"))?;
        let target = target.ok_or(DiagramError::NullConnectorEndpoint("target"))?;
        let source = self.branches.lookup(source)?;
        let target = self.branches.lookup(target)?;

        let Some(last) = source.last_step_position() else {
            tracing::debug!(
                source = source.name(),
                target = target.name(),
                position,
                "source branch has no prior step; connector skipped"
            );
            return Ok(());
        };

        let config = self.config;
        let from = Point::new(
            step_x(config, last, XAnchor::Left),
            row_y(config, source.row(), YAnchor::Center),
        );
        let to = Point::new(
            step_x(config, position, XAnchor::Right),
            row_y(config, target.row(), YAnchor::Center),
        );
        self.out.push(DrawInstruction::Bezier {
            kind,
            points: connector_points(from, to),
            stroke: self.theme.connector_color(kind).to_string(),
            stroke_width: config.connector_stroke_width,
            stroke_opacity: config.connector_stroke_opacity,
            fill: self.theme.connection_fill_color.clone(),
            fill_opacity: config.connector_fill_opacity,
        });
        Ok(())
    }
}
