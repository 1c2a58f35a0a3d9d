use thiserror::Error;

use crate::sanitize::SanitizeError;

/// Errors produced when reading a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    /// An unexpected character was encountered at the given position.
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    /// Input ended inside a construct that needs more characters.
    #[error("unexpected end of SMILES at position {pos}")]
    UnexpectedEnd { pos: usize },
    /// An unrecognized element symbol was found.
    #[error("invalid element '{text}' at position {pos}")]
    InvalidElement { pos: usize, text: String },
    /// A bracket atom `[` was opened but never closed with `]`.
    #[error("unclosed bracket atom starting at position {pos}")]
    UnclosedBracket { pos: usize },
    /// A charge specifier inside a bracket atom could not be parsed.
    #[error("invalid charge at position {pos}")]
    InvalidCharge { pos: usize },
    /// An isotope, hydrogen count or atom class overflowed.
    #[error("number out of range at position {pos}")]
    NumberOverflow { pos: usize },
    /// A ring-opening digit was never matched by a ring-closing digit.
    #[error("unclosed ring {digit}")]
    UnclosedRing { digit: u16 },
    /// A parenthesis was opened without a matching close, or vice versa.
    #[error("unmatched parenthesis at position {pos}")]
    UnmatchedParen { pos: usize },
    /// A bond symbol is not followed by an atom or ring closure.
    #[error("dangling bond at position {pos}")]
    DanglingBond { pos: usize },
    /// A ring-closure digit appears before any atom.
    #[error("ring closure {digit} at position {pos} has no atom")]
    RingWithoutAtom { digit: u16, pos: usize },
    /// A ring closure would bond an atom to itself or duplicate a bond.
    #[error("ring closure {digit} at position {pos} duplicates a bond")]
    InvalidRingBond { digit: u16, pos: usize },
    /// Two ring-closure bonds on the same digit specify conflicting bond types.
    #[error("conflicting bond types on ring closure {digit}")]
    RingBondConflict { digit: u16 },
    /// The parsed molecule failed sanitization.
    #[error("sanitization failed: {0}")]
    Sanitize(#[from] SanitizeError),
}
