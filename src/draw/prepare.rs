use thiserror::Error;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::depict::compute_2d_coords;
use crate::kekulize::{kekulize, KekulizeError};
use crate::mol::Mol;
use crate::valence::{update_property_cache, PropertyCacheError};

use super::wedges::assign_wedges;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrepareError {
    #[error("kekulize: {0}")]
    Kekulize(#[from] KekulizeError),
    #[error("property cache: {0}")]
    PropertyCache(#[from] PropertyCacheError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareOptions {
    /// Draw aromatic systems as alternating single and double bonds.
    pub kekulize: bool,
    /// Compute 2D coordinates when the molecule has none.
    pub layout: bool,
    /// Mark stereocentres with wedged or hashed bonds.
    pub wedge_bonds: bool,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            kekulize: true,
            layout: true,
            wedge_bonds: true,
        }
    }
}

/// Returns a copy of `mol` ready to be drawn.
///
/// Fills the property cache if any atom lacks it (lenient), kekulizes when
/// asked, computes 2D coordinates when there are none and assigns wedges.
/// Wedges need coordinates; without any they are skipped. The input is
/// never modified.
pub fn prepare_for_drawing(
    mol: &Mol<Atom, Bond>,
    options: PrepareOptions,
) -> Result<Mol<Atom, Bond>, PrepareError> {
    let mut out = mol.clone();
    if out.atoms().any(|idx| out.atom(idx).implicit_h.is_none()) {
        update_property_cache(&mut out, false)?;
    }
    if options.kekulize {
        kekulize(&mut out)?;
    }
    if options.layout && out.num_conformers() == 0 {
        compute_2d_coords(&mut out);
    }
    if options.wedge_bonds {
        assign_wedges(&mut out);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::BondOrder;
    use crate::conformer::Conformer;
    use crate::smiles::{from_smiles, parse_smiles};

    #[test]
    fn kekulizes_and_lays_out() {
        let mol = from_smiles("c1ccccc1O").unwrap();
        let prepared = prepare_for_drawing(&mol, PrepareOptions::default()).unwrap();
        assert!(prepared
            .bonds()
            .all(|e| prepared.bond(e).order != BondOrder::Aromatic));
        assert_eq!(prepared.num_conformers(), 1);
        assert_eq!(mol.num_conformers(), 0);
    }

    #[test]
    fn keeps_aromatic_bonds_without_kekulize() {
        let mol = from_smiles("c1ccccc1").unwrap();
        let options = PrepareOptions {
            kekulize: false,
            ..PrepareOptions::default()
        };
        let prepared = prepare_for_drawing(&mol, options).unwrap();
        assert!(prepared
            .bonds()
            .all(|e| prepared.bond(e).order == BondOrder::Aromatic));
    }

    #[test]
    fn keeps_existing_coordinates() {
        let mut mol = from_smiles("CO").unwrap();
        mol.add_conformer(Conformer::new(vec![[0.0, 0.0], [5.0, 0.0]]));
        let prepared = prepare_for_drawing(&mol, PrepareOptions::default()).unwrap();
        assert_eq!(prepared.conformer(), mol.conformer());
    }

    #[test]
    fn layout_can_be_left_to_the_caller() {
        let mol = from_smiles("N[C@@H](C)C(=O)O").unwrap();
        let options = PrepareOptions {
            layout: false,
            ..PrepareOptions::default()
        };
        let prepared = prepare_for_drawing(&mol, options).unwrap();
        assert_eq!(prepared.num_conformers(), 0);
        assert!(prepared.bonds().all(|e| prepared.bond(e).wedge.is_none()));
    }

    #[test]
    fn reports_kekulize_failure() {
        let mol = parse_smiles("c1cccc1").unwrap();
        let err = prepare_for_drawing(&mol, PrepareOptions::default()).unwrap_err();
        assert!(matches!(err, PrepareError::Kekulize(_)));

        let options = PrepareOptions {
            kekulize: false,
            ..PrepareOptions::default()
        };
        assert!(prepare_for_drawing(&mol, options).is_ok());
    }

    #[test]
    fn fills_missing_property_cache() {
        let mol = parse_smiles("CCO").unwrap();
        let prepared = prepare_for_drawing(&mol, PrepareOptions::default()).unwrap();
        assert!(prepared
            .atoms()
            .all(|idx| prepared.atom(idx).implicit_h.is_some()));
    }
}
