use thiserror::Error;

/// Misuse of the selection API. Chemistry failures never show up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("atom {0} is not selected")]
    NotSelected(usize),
    #[error("selected atoms must be a list of non-negative integers, got {0}")]
    SelectionType(String),
    #[error("atom {0} appears more than once in the selection")]
    DuplicateAtom(usize),
}
