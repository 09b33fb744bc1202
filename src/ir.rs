use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

use crate::error::{DiagramError, DiagramResult};

pub const DEFAULT_TITLE: &str = "BranchDiagramBuilder";

pub const DEFAULT_BRANCH_DASH: [f32; 2] = [5.0, 5.0];
pub const DEFAULT_BRANCH_STROKE_WIDTH: f32 = 1.0;
pub const DEFAULT_BRANCH_STROKE_OPACITY: f32 = 1.0;
pub const DEFAULT_BRANCH_TEXT_SIZE: f32 = 20.0;

/// A branch name as written by the user: either a plain string or a list of
/// scalar path segments (`[release, 2024]` becomes `release/2024`).
#[derive(Debug, Clone, PartialEq)]
pub enum BranchName {
    Text(String),
    Segments(Vec<String>),
    /// Any other shape; rejected on normalization.
    Other(Value),
}

impl BranchName {
    pub fn normalize(&self) -> DiagramResult<String> {
        match self {
            Self::Text(name) => Ok(name.clone()),
            Self::Segments(segments) => Ok(segments.join("/")),
            Self::Other(value) => Err(DiagramError::InvalidName(describe(value))),
        }
    }

    fn from_value(value: Value) -> Self {
        match value {
            Value::String(name) => Self::Text(name),
            Value::Sequence(items) => {
                let segments: Option<Vec<String>> = items.iter().map(segment_text).collect();
                match segments {
                    Some(segments) => Self::Segments(segments),
                    None => Self::Other(Value::Sequence(items)),
                }
            }
            other => Self::Other(other),
        }
    }
}

/// Text form of one list item; `true` joins as `1` and `false` as nothing.
fn segment_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        _ => None,
    }
}

fn describe(value: &Value) -> String {
    match serde_yaml::to_string(value) {
        Ok(text) => text.trim_end().replace('\n', " "),
        Err(_) => format!("{value:?}"),
    }
}

impl<'de> Deserialize<'de> for BranchName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl From<&str> for BranchName {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for BranchName {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for BranchName {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<Vec<String>> for BranchName {
    fn from(value: Vec<String>) -> Self {
        Self::Segments(value)
    }
}

impl From<Vec<&str>> for BranchName {
    fn from(value: Vec<&str>) -> Self {
        Self::Segments(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for BranchName {
    fn from(value: [&str; N]) -> Self {
        Self::Segments(value.iter().map(|s| s.to_string()).collect())
    }
}

fn normalize_optional(name: Option<BranchName>) -> DiagramResult<Option<String>> {
    name.map(|name| name.normalize()).transpose()
}

/// One horizontal track of the diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    name: String,
    title: Option<String>,
    target_system: Option<String>,
    row: usize,
    fill_color: String,
    stroke_color: String,
    text_color: Option<String>,
    stroke_dash: Vec<f32>,
    stroke_width: f32,
    stroke_opacity: f32,
    text_size: f32,
    last_step_position: Option<usize>,
}

impl Branch {
    pub fn new(fill_color: impl Into<String>, stroke_color: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            title: None,
            target_system: None,
            row: 0,
            fill_color: fill_color.into(),
            stroke_color: stroke_color.into(),
            text_color: None,
            stroke_dash: DEFAULT_BRANCH_DASH.to_vec(),
            stroke_width: DEFAULT_BRANCH_STROKE_WIDTH,
            stroke_opacity: DEFAULT_BRANCH_STROKE_OPACITY,
            text_size: DEFAULT_BRANCH_TEXT_SIZE,
            last_step_position: None,
        }
    }

    pub fn with_text_color(mut self, color: impl Into<String>) -> Self {
        self.text_color = Some(color.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display title; falls back to the name when unset.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn target_system(&self) -> Option<&str> {
        self.target_system.as_deref()
    }

    pub fn set_target_system(&mut self, system: Option<String>) {
        self.target_system = system;
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn fill_color(&self) -> &str {
        &self.fill_color
    }

    pub fn stroke_color(&self) -> &str {
        &self.stroke_color
    }

    pub fn text_color(&self) -> &str {
        self.text_color.as_deref().unwrap_or(&self.stroke_color)
    }

    pub fn stroke_dash(&self) -> &[f32] {
        &self.stroke_dash
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn stroke_opacity(&self) -> f32 {
        self.stroke_opacity
    }

    pub fn text_size(&self) -> f32 {
        self.text_size
    }

    pub fn last_step_position(&self) -> Option<usize> {
        self.last_step_position
    }

    /// Moves the cursor forward. Equal values are accepted because a merge
    /// touches its target twice.
    pub fn set_last_step_position(&mut self, position: usize) -> DiagramResult<()> {
        if let Some(current) = self.last_step_position
            && position < current
        {
            return Err(DiagramError::CursorRegression {
                branch: self.name.clone(),
                current,
                attempted: position,
            });
        }
        self.last_step_position = Some(position);
        Ok(())
    }

    fn reset_cursor(&mut self) {
        self.last_step_position = None;
    }
}

/// Insertion-ordered set of uniquely named branches. The row of a branch is
/// its insertion index.
#[derive(Debug, Clone, Default)]
pub struct BranchRegistry {
    branches: Vec<Branch>,
    index: HashMap<String, usize>,
}

impl BranchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `branch` under the normalized `name` and returns its row.
    pub fn add(&mut self, name: impl Into<BranchName>, mut branch: Branch) -> DiagramResult<usize> {
        let name = name.into().normalize()?;
        if self.index.contains_key(&name) {
            return Err(DiagramError::DuplicateBranch(name));
        }
        let row = self.branches.len();
        branch.name = name.clone();
        branch.row = row;
        self.index.insert(name, row);
        self.branches.push(branch);
        Ok(row)
    }

    pub fn get(&self, name: impl Into<BranchName>) -> DiagramResult<&Branch> {
        let name = name.into().normalize()?;
        self.lookup(&name)
    }

    pub fn get_mut(&mut self, name: impl Into<BranchName>) -> DiagramResult<&mut Branch> {
        let name = name.into().normalize()?;
        self.lookup_mut(&name)
    }

    pub(crate) fn lookup(&self, name: &str) -> DiagramResult<&Branch> {
        self.index
            .get(name)
            .map(|&row| &self.branches[row])
            .ok_or_else(|| DiagramError::UnknownBranch(name.to_string()))
    }

    pub(crate) fn lookup_mut(&mut self, name: &str) -> DiagramResult<&mut Branch> {
        match self.index.get(name) {
            Some(&row) => Ok(&mut self.branches[row]),
            None => Err(DiagramError::UnknownBranch(name.to_string())),
        }
    }

    pub fn all(&self) -> &[Branch] {
        &self.branches
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.branches.iter().map(|branch| branch.name.as_str())
    }

    pub fn count(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub(crate) fn reset_cursors(&mut self) {
        for branch in &mut self.branches {
            branch.reset_cursor();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Init,
    Checkout,
    Commit,
    Merge,
}

impl StepKind {
    pub const ALL: [StepKind; 4] = [Self::Init, Self::Checkout, Self::Commit, Self::Merge];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Checkout => "checkout",
            Self::Commit => "commit",
            Self::Merge => "merge",
        }
    }

    /// Checks the presence and equality rules for this kind, in order:
    /// source presence, target presence, then source/target equality.
    fn validate(self, source: Option<&str>, target: Option<&str>) -> DiagramResult<()> {
        let kind = self.as_str();
        match (self, source) {
            (Self::Init, Some(_)) => return Err(DiagramError::UnnecessarySource(kind)),
            (Self::Checkout | Self::Commit | Self::Merge, None) => {
                return Err(DiagramError::MissingSource(kind));
            }
            _ => {}
        }
        let Some(target) = target else {
            return Err(DiagramError::MissingTarget(kind));
        };
        match (self, source) {
            (Self::Commit, Some(source)) if source != target => {
                Err(DiagramError::NotEqualSourceAndTarget {
                    kind,
                    source_name: source.to_string(),
                    target: target.to_string(),
                })
            }
            (Self::Checkout | Self::Merge, Some(source)) if source == target => {
                Err(DiagramError::EqualSourceAndTarget {
                    kind,
                    name: target.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for StepKind {
    type Err = DiagramError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| DiagramError::UnknownStepType(raw.to_string()))
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validated workflow event. The position is assigned when the step is
/// appended to a [`StepSequence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    kind: StepKind,
    source: Option<String>,
    target: String,
    position: Option<usize>,
}

impl Step {
    /// Parses `kind` and validates the source/target pair for it.
    pub fn new(
        kind: &str,
        source: Option<BranchName>,
        target: Option<BranchName>,
    ) -> DiagramResult<Self> {
        let kind: StepKind = kind.parse()?;
        Self::with_kind(kind, source, target)
    }

    pub fn with_kind(
        kind: StepKind,
        source: Option<BranchName>,
        target: Option<BranchName>,
    ) -> DiagramResult<Self> {
        let source = normalize_optional(source)?;
        let mut target = normalize_optional(target)?;
        if kind == StepKind::Commit && target.is_none() {
            target = source.clone();
        }
        kind.validate(source.as_deref(), target.as_deref())?;
        let Some(target) = target else {
            return Err(DiagramError::MissingTarget(kind.as_str()));
        };
        Ok(Self {
            kind,
            source,
            target,
            position: None,
        })
    }

    pub fn init(target: impl Into<BranchName>) -> DiagramResult<Self> {
        Self::with_kind(StepKind::Init, None, Some(target.into()))
    }

    pub fn checkout(
        source: impl Into<BranchName>,
        target: impl Into<BranchName>,
    ) -> DiagramResult<Self> {
        Self::with_kind(StepKind::Checkout, Some(source.into()), Some(target.into()))
    }

    pub fn commit(branch: impl Into<BranchName>) -> DiagramResult<Self> {
        Self::with_kind(StepKind::Commit, Some(branch.into()), None)
    }

    pub fn merge(
        source: impl Into<BranchName>,
        target: impl Into<BranchName>,
    ) -> DiagramResult<Self> {
        Self::with_kind(StepKind::Merge, Some(source.into()), Some(target.into()))
    }

    pub fn kind(&self) -> StepKind {
        self.kind
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }
}

/// Append-only list of steps; each step's position is its insertion index.
#[derive(Debug, Clone, Default)]
pub struct StepSequence {
    steps: Vec<Step>,
}

impl StepSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mut step: Step) -> usize {
        let position = self.steps.len();
        step.position = Some(position);
        self.steps.push(step);
        position
    }

    pub fn all(&self) -> &[Step] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// Steps paired with their positions. [`StepSequence::push`] is the only
    /// way in, so a step's position always equals its index.
    pub fn positioned(&self) -> impl Iterator<Item = (usize, &Step)> {
        self.steps.iter().enumerate()
    }

    pub fn count(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// A fully specified diagram: title, optional canvas width, branches and
/// steps in their final order.
#[derive(Debug, Clone)]
pub struct Diagram {
    pub title: String,
    pub width: Option<f32>,
    pub branches: BranchRegistry,
    pub steps: StepSequence,
}

impl Diagram {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: None,
            branches: BranchRegistry::new(),
            steps: StepSequence::new(),
        }
    }

    pub fn add_branch(&mut self, name: impl Into<BranchName>, branch: Branch) -> DiagramResult<usize> {
        self.branches.add(name, branch)
    }

    pub fn add_step(&mut self, step: Step) -> usize {
        self.steps.push(step)
    }
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(value: &str) -> Option<BranchName> {
        Some(BranchName::from(value))
    }

    #[test]
    fn unknown_type_wins_over_everything_else() {
        for (source, target) in [(None, None), (name("master"), None), (None, name("master"))] {
            let err = Step::new("unknown", source, target).unwrap_err();
            assert!(matches!(err, DiagramError::UnknownStepType(_)));
        }
    }

    #[test]
    fn init_rules() {
        let err = Step::new("init", name("master"), name("master")).unwrap_err();
        assert_eq!(err, DiagramError::UnnecessarySource("init"));

        let step = Step::new("init", None, name("master")).unwrap();
        assert_eq!(step.kind(), StepKind::Init);
        assert_eq!(step.source(), None);
        assert_eq!(step.target(), "master");
        assert_eq!(step.position(), None);

        let err = Step::new("init", None, None).unwrap_err();
        assert_eq!(err, DiagramError::MissingTarget("init"));
    }

    #[test]
    fn checkout_and_merge_rules() {
        for kind in ["checkout", "merge"] {
            let err = Step::new(kind, None, name("master")).unwrap_err();
            assert!(matches!(err, DiagramError::MissingSource(_)), "{kind}");

            let err = Step::new(kind, name("master"), None).unwrap_err();
            assert!(matches!(err, DiagramError::MissingTarget(_)), "{kind}");

            let err = Step::new(kind, name("develop"), name("develop")).unwrap_err();
            assert!(matches!(err, DiagramError::EqualSourceAndTarget { .. }), "{kind}");

            let step = Step::new(kind, name("develop"), name("master")).unwrap();
            assert_eq!(step.source(), Some("develop"));
            assert_eq!(step.target(), "master");
        }
    }

    #[test]
    fn commit_rules() {
        let err = Step::new("commit", None, name("master")).unwrap_err();
        assert_eq!(err, DiagramError::MissingSource("commit"));

        let step = Step::new("commit", name("master"), None).unwrap();
        assert_eq!(step.target(), "master");
        assert_eq!(step.source(), Some("master"));

        assert!(Step::new("commit", name("master"), name("master")).is_ok());

        let err = Step::new("commit", name("master"), name("develop")).unwrap_err();
        assert!(matches!(err, DiagramError::NotEqualSourceAndTarget { .. }));
    }

    #[test]
    fn step_type_is_normalized() {
        let step = Step::new(" Merge ", name("develop"), name("master")).unwrap();
        assert_eq!(step.kind(), StepKind::Merge);
    }

    #[test]
    fn segmented_names_are_joined() {
        let step = Step::checkout("develop", ["feature", "login"]).unwrap();
        assert_eq!(step.target(), "feature/login");

        let err = Step::new(
            "checkout",
            Some(BranchName::Other(Value::Number(42.into()))),
            name("master"),
        )
        .unwrap_err();
        assert!(matches!(err, DiagramError::InvalidName(_)));
    }

    fn parse_name(yaml: &str) -> BranchName {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn scalar_list_items_are_joined() {
        assert_eq!(
            parse_name("[release, 2024]").normalize().unwrap(),
            "release/2024"
        );
        assert_eq!(parse_name("[hotfix, 1.5]").normalize().unwrap(), "hotfix/1.5");
        assert_eq!(parse_name("[flag, true]").normalize().unwrap(), "flag/1");
        assert_eq!(parse_name("develop").normalize().unwrap(), "develop");
    }

    #[test]
    fn nested_shapes_are_invalid_names() {
        for yaml in ["{1: 2}", "{a: b}", "[a, [b]]", "42", "[a, null]"] {
            let err = parse_name(yaml).normalize().unwrap_err();
            assert!(matches!(err, DiagramError::InvalidName(_)), "{yaml}");
        }
    }

    #[test]
    fn registry_assigns_dense_rows() {
        let mut registry = BranchRegistry::new();
        for (idx, branch) in ["master", "develop", "feature"].iter().enumerate() {
            let row = registry.add(*branch, Branch::new("#fff", "#000")).unwrap();
            assert_eq!(row, idx);
        }
        assert_eq!(registry.count(), 3);
        assert_eq!(registry.get("develop").unwrap().row(), 1);
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["master", "develop", "feature"]
        );
    }

    #[test]
    fn registry_rejects_duplicates_and_unknown_names() {
        let mut registry = BranchRegistry::new();
        registry.add(["feature", "a"], Branch::new("#fff", "#000")).unwrap();
        let err = registry.add("feature/a", Branch::new("#fff", "#000")).unwrap_err();
        assert_eq!(err, DiagramError::DuplicateBranch("feature/a".into()));
        assert_eq!(registry.count(), 1);

        let err = registry.get("hotfix").unwrap_err();
        assert_eq!(err, DiagramError::UnknownBranch("hotfix".into()));
    }

    #[test]
    fn branch_defaults() {
        let mut registry = BranchRegistry::new();
        registry.add("master", Branch::new("#eee", "#333")).unwrap();
        let branch = registry.get_mut("master").unwrap();
        assert_eq!(branch.title(), "master");
        assert_eq!(branch.text_color(), "#333");
        branch.set_title("Production");
        assert_eq!(branch.title(), "Production");
        assert_eq!(branch.stroke_dash(), &[5.0, 5.0]);
        assert_eq!(branch.text_size(), 20.0);

        let styled = Branch::new("#eee", "#333").with_text_color("#111");
        assert_eq!(styled.text_color(), "#111");
    }

    #[test]
    fn cursor_never_moves_backwards() {
        let mut branch = Branch::new("#fff", "#000");
        assert_eq!(branch.last_step_position(), None);
        branch.set_last_step_position(3).unwrap();
        branch.set_last_step_position(3).unwrap();
        branch.set_last_step_position(5).unwrap();
        let err = branch.set_last_step_position(4).unwrap_err();
        assert!(matches!(
            err,
            DiagramError::CursorRegression {
                current: 5,
                attempted: 4,
                ..
            }
        ));
        assert_eq!(branch.last_step_position(), Some(5));
    }

    #[test]
    fn sequence_assigns_positions() {
        let mut steps = StepSequence::new();
        steps.push(Step::init("master").unwrap());
        steps.push(Step::checkout("master", "develop").unwrap());
        steps.push(Step::commit("develop").unwrap());
        let positions: Vec<_> = steps.iter().map(Step::position).collect();
        assert_eq!(positions, vec![Some(0), Some(1), Some(2)]);
        assert_eq!(steps.count(), 3);
        for (position, step) in steps.positioned() {
            assert_eq!(step.position(), Some(position));
        }
    }
}
