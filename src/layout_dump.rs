use crate::ir::Diagram;
use crate::layout::{DrawInstruction, Layout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump<'a> {
    pub title: &'a str,
    pub width: f32,
    pub height: f32,
    pub branches: Vec<BranchDump<'a>>,
    pub steps: Vec<StepDump<'a>>,
    pub instructions: &'a [DrawInstruction],
}

#[derive(Debug, Serialize)]
pub struct BranchDump<'a> {
    pub name: &'a str,
    pub title: &'a str,
    pub row: usize,
    pub target_system: Option<&'a str>,
    pub last_step_position: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct StepDump<'a> {
    pub position: Option<usize>,
    pub kind: &'static str,
    pub source: Option<&'a str>,
    pub target: &'a str,
}

impl<'a> LayoutDump<'a> {
    /// Snapshot of a laid-out diagram; cursors reflect the finished pass.
    pub fn from_layout(layout: &'a Layout, diagram: &'a Diagram) -> Self {
        let branches = diagram
            .branches
            .all()
            .iter()
            .map(|branch| BranchDump {
                name: branch.name(),
                title: branch.title(),
                row: branch.row(),
                target_system: branch.target_system(),
                last_step_position: branch.last_step_position(),
            })
            .collect();
        let steps = diagram
            .steps
            .iter()
            .map(|step| StepDump {
                position: step.position(),
                kind: step.kind().as_str(),
                source: step.source(),
                target: step.target(),
            })
            .collect();

        LayoutDump {
            title: &diagram.title,
            width: layout.width,
            height: layout.height,
            branches,
            steps,
            instructions: &layout.instructions,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout, diagram: &Diagram) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, diagram);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
