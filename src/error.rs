use thiserror::Error;

/// Validation failures raised while building or laying out a diagram.
///
/// None of these are transient: a failed entity is never partially built,
/// and a failure during layout aborts the whole render.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    #[error("branch \"{0}\" already exists")]
    DuplicateBranch(String),
    #[error("branch \"{0}\" does not exist")]
    UnknownBranch(String),
    #[error("unsupported name value: {0}")]
    InvalidName(String),

    #[error("the step type \"{0}\" is unknown")]
    UnknownStepType(String),
    #[error("a {0} step must not have a source branch")]
    UnnecessarySource(&'static str),
    #[error("a {0} step requires a source branch")]
    MissingSource(&'static str),
    #[error("a {0} step requires a target branch")]
    MissingTarget(&'static str),
    #[error("a {kind} step must use different source and target branches (got \"{name}\")")]
    EqualSourceAndTarget { kind: &'static str, name: String },
    #[error("a {kind} step must use the same source and target branch (got \"{source_name}\" and \"{target}\")")]
    NotEqualSourceAndTarget {
        kind: &'static str,
        source_name: String,
        target: String,
    },

    #[error(
        "the new last step position {attempted} of branch \"{branch}\" must be greater or equal than the current one {current}"
    )]
    CursorRegression {
        branch: String,
        current: usize,
        attempted: usize,
    },
    #[error("connector requested without a {0} branch")]
    NullConnectorEndpoint(&'static str),
}

impl DiagramError {
    /// Process exit code reported by the command line for this error.
    pub fn return_code(&self) -> i32 {
        match self {
            Self::UnknownStepType(_) => 101,
            Self::MissingSource(_) => 102,
            Self::UnnecessarySource(_) => 103,
            Self::MissingTarget(_) => 104,
            Self::EqualSourceAndTarget { .. } => 105,
            Self::NotEqualSourceAndTarget { .. } => 106,
            Self::DuplicateBranch(_) => 110,
            Self::UnknownBranch(_) => 111,
            Self::InvalidName(_) => 112,
            Self::CursorRegression { .. } => 113,
            Self::NullConnectorEndpoint(_) => 114,
        }
    }
}

pub type DiagramResult<T> = Result<T, DiagramError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_codes_are_stable() {
        assert_eq!(DiagramError::UnknownStepType("x".into()).return_code(), 101);
        assert_eq!(DiagramError::MissingSource("merge").return_code(), 102);
        assert_eq!(DiagramError::UnnecessarySource("init").return_code(), 103);
        assert_eq!(DiagramError::MissingTarget("checkout").return_code(), 104);
    }

    #[test]
    fn messages_name_the_branch() {
        let err = DiagramError::CursorRegression {
            branch: "develop".into(),
            current: 4,
            attempted: 2,
        };
        let text = err.to_string();
        assert!(text.contains("develop"));
        assert!(text.contains('4'));
        assert!(text.contains('2'));
    }
}
