//! SMILES reader.
//!
//! [`parse_smiles`] returns the molecule exactly as written: aromatic bonds
//! stay aromatic and the implicit-hydrogen cache is empty. [`from_smiles`]
//! additionally runs [`sanitize`](crate::sanitize::sanitize), which is what
//! callers normally want.

pub mod error;
mod parser;
mod tokenizer;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
use crate::sanitize::sanitize;
pub use error::SmilesError;
pub(crate) use parser::permutation_is_odd;

/// Parses without sanitizing. An empty string yields an empty molecule.
pub fn parse_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let tokens = tokenizer::tokenize(s.trim())?;
    parser::build_mol(&tokens)
}

/// Parses and sanitizes.
pub fn from_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let mut mol = parse_smiles(s)?;
    sanitize(&mut mol)?;
    Ok(mol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::ChiralTag;
    use crate::bond::BondOrder;
    use petgraph::graph::NodeIndex;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn hs(mol: &Mol<Atom, Bond>) -> Vec<u8> {
        mol.atoms().map(|i| mol.atom(i).total_h()).collect()
    }

    #[test]
    fn empty_input_gives_empty_molecule() {
        let mol = from_smiles("").unwrap();
        assert!(mol.is_empty());
        let mol = parse_smiles("   ").unwrap();
        assert!(mol.is_empty());
    }

    #[test]
    fn raw_parse_leaves_cache_empty() {
        let mol = parse_smiles("CCO").unwrap();
        assert!(mol.atoms().all(|i| mol.atom(i).implicit_h.is_none()));
    }

    #[test]
    fn simple_hydrogen_counts() {
        assert_eq!(hs(&from_smiles("C").unwrap()), vec![4]);
        assert_eq!(hs(&from_smiles("CC(=O)O").unwrap()), vec![3, 0, 0, 1]);
        assert_eq!(hs(&from_smiles("C#N").unwrap()), vec![1, 0]);
        assert_eq!(hs(&from_smiles("Cl").unwrap()), vec![1]);
    }

    #[test]
    fn bracket_atoms_have_no_implicit_h() {
        let mol = from_smiles("[CH3]C").unwrap();
        assert_eq!(hs(&mol), vec![3, 3]);
        let mol = from_smiles("[C]").unwrap();
        assert_eq!(hs(&mol), vec![0]);
    }

    #[test]
    fn charged_atoms() {
        let mol = from_smiles("C[N+](C)(C)C").unwrap();
        assert_eq!(mol.atom(n(1)).formal_charge, 1);
        assert_eq!(mol.atom(n(1)).total_h(), 0);
        let mol = from_smiles("CC(=O)[O-]").unwrap();
        assert_eq!(mol.atom(n(3)).formal_charge, -1);
    }

    #[test]
    fn benzene_is_aromatic_after_sanitize() {
        let mol = from_smiles("C1=CC=CC=C1").unwrap();
        for idx in mol.atoms() {
            assert!(mol.atom(idx).is_aromatic);
            assert_eq!(mol.atom(idx).total_h(), 1);
        }
        for e in mol.bonds() {
            assert_eq!(mol.bond(e).order, BondOrder::Aromatic);
        }
    }

    #[test]
    fn pyrrole_needs_explicit_nh() {
        assert!(from_smiles("c1cc[nH]c1").is_ok());
        assert!(matches!(
            from_smiles("c1ccnc1"),
            Err(SmilesError::Sanitize(_))
        ));
    }

    #[test]
    fn chirality_survives_sanitize() {
        let mol = from_smiles("N[C@@H](C)C(=O)O").unwrap();
        assert_ne!(mol.atom(n(1)).chiral_tag, ChiralTag::None);
        let mol = from_smiles("C[C@H](C)C").unwrap();
        assert_eq!(mol.atom(n(1)).chiral_tag, ChiralTag::None);
    }

    #[test]
    fn syntax_errors_propagate() {
        assert!(matches!(
            from_smiles("C1CC"),
            Err(SmilesError::UnclosedRing { digit: 1 })
        ));
        assert!(matches!(
            from_smiles("C[Xx]"),
            Err(SmilesError::InvalidElement { .. })
        ));
    }
}
