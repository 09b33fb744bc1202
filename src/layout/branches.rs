use super::geometry::{YAnchor, row_y};
use super::*;

pub(super) fn title_instruction(
    title: &str,
    width: f32,
    theme: &Theme,
    config: &LayoutConfig,
    metrics: &dyn TextMeasure,
) -> DrawInstruction {
    let text = metrics.measure_text(title, config.title_font_size);
    let x = (width / 2.0).round();
    let y = (config.top_margin / 2.0).round() - (text.height / 3.0).round();
    DrawInstruction::Text {
        position: Point::new(x, y),
        text: title.to_string(),
        font_size: config.title_font_size,
        color: theme.title_color.clone(),
        align: TextAlign::Center,
    }
}

/// Label column and dashed guide line for every branch, in row order.
pub(super) fn branch_instructions(
    branches: &BranchRegistry,
    width: f32,
    config: &LayoutConfig,
    metrics: &dyn TextMeasure,
    out: &mut Vec<DrawInstruction>,
) {
    for branch in branches.all() {
        let line_y = row_y(config, branch.row(), YAnchor::Center);
        let text = metrics.measure_text(branch.title(), branch.text_size());
        let third = (text.height / 3.0).round();
        let label_x = config.left_margin - config.label_padding;

        // With a target system the name moves above the line and the system
        // label takes the slot below it.
        let name_y = match branch.target_system() {
            Some(_) => line_y - third,
            None => line_y + third,
        };
        out.push(DrawInstruction::Text {
            position: Point::new(label_x, name_y),
            text: branch.title().to_string(),
            font_size: branch.text_size(),
            color: branch.text_color().to_string(),
            align: TextAlign::Right,
        });
        if let Some(system) = branch.target_system() {
            out.push(DrawInstruction::Text {
                position: Point::new(label_x, line_y + third + config.system_label_offset),
                text: system.to_string(),
                font_size: branch.text_size(),
                color: branch.text_color().to_string(),
                align: TextAlign::Right,
            });
        }

        out.push(DrawInstruction::Line {
            from: Point::new(config.left_margin, line_y),
            to: Point::new(width - config.right_margin, line_y),
            stroke: branch.stroke_color().to_string(),
            dash: branch.stroke_dash().to_vec(),
            stroke_width: branch.stroke_width(),
            stroke_opacity: branch.stroke_opacity(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Branch;
    use crate::text_metrics::EstimatedMetrics;

    fn registry() -> BranchRegistry {
        let mut branches = BranchRegistry::new();
        branches.add("master", Branch::new("#fcc", "#b30000")).unwrap();
        let mut develop = Branch::new("#cfc", "#00b368");
        develop.set_target_system(Some("staging".to_string()));
        develop.set_title("Develop");
        branches.add("develop", develop).unwrap();
        branches
    }

    #[test]
    fn title_is_centered_in_the_top_band() {
        let config = LayoutConfig::default();
        let instruction =
            title_instruction("Flow", 2500.0, &Theme::classic(), &config, &EstimatedMetrics);
        let DrawInstruction::Text {
            position, align, ..
        } = instruction
        else {
            panic!("expected text");
        };
        assert_eq!(position.x, 1250.0);
        // 40px estimate is 48px tall: 75 - 16
        assert_eq!(position.y, 59.0);
        assert_eq!(align, TextAlign::Center);
    }

    #[test]
    fn guide_line_spans_the_canvas() {
        let config = LayoutConfig::default();
        let mut out = Vec::new();
        branch_instructions(&registry(), 1000.0, &config, &EstimatedMetrics, &mut out);
        let lines: Vec<_> = out
            .iter()
            .filter_map(|instruction| match instruction {
                DrawInstruction::Line { from, to, dash, .. } => Some((*from, *to, dash.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, Point::new(220.0, 150.0));
        assert_eq!(lines[0].1, Point::new(950.0, 150.0));
        assert_eq!(lines[1].0.y, 230.0);
        assert_eq!(lines[1].2, vec![5.0, 5.0]);
    }

    #[test]
    fn target_system_label_goes_below_the_line() {
        let config = LayoutConfig::default();
        let mut out = Vec::new();
        branch_instructions(&registry(), 1000.0, &config, &EstimatedMetrics, &mut out);
        let texts: Vec<_> = out
            .iter()
            .filter_map(|instruction| match instruction {
                DrawInstruction::Text {
                    text,
                    position,
                    align,
                    ..
                } => Some((text.as_str(), *position, *align)),
                _ => None,
            })
            .collect();
        assert_eq!(texts.len(), 3);
        // 20px estimate is 24px tall, a third of that is 8.
        assert_eq!(texts[0], ("master", Point::new(200.0, 158.0), TextAlign::Right));
        assert_eq!(texts[1], ("Develop", Point::new(200.0, 222.0), TextAlign::Right));
        assert_eq!(texts[2], ("staging", Point::new(200.0, 258.0), TextAlign::Right));
    }
}
