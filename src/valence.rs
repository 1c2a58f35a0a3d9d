//! Property cache: implicit hydrogen counts and valence checks.

use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::BondOrder;
use crate::element::Element;
use crate::mol::Mol;
use crate::traits::HasBondOrder;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyCacheError {
    #[error("atom {atom}: unknown element with atomic number {atomic_num}")]
    UnknownElement { atom: usize, atomic_num: u8 },
    #[error("atom {atom} ({symbol}): explicit valence {valence} is greater than permitted ({max})")]
    ExceedsValence {
        atom: usize,
        symbol: &'static str,
        valence: u8,
        max: u8,
    },
}

/// Sum of bond contributions plus explicit hydrogens. Aromatic bonds count
/// as one.
pub fn explicit_valence<B: HasBondOrder>(mol: &Mol<Atom, B>, idx: NodeIndex) -> u8 {
    let bonds: u8 = mol
        .bonds_of(idx)
        .map(|e| mol.bond(e).bond_order().valence_contrib())
        .sum();
    bonds + mol.atom(idx).explicit_h
}

/// Valences permitted for the atom, taking its charge into account.
///
/// Charged atoms use the valences of the isoelectronic neutral element, so
/// `N+` follows carbon and `O-` follows fluorine. An empty slice means the
/// atom is not valence-checked.
pub fn allowed_valences(atom: &Atom) -> Option<&'static [u8]> {
    let element = atom.element()?;
    if atom.formal_charge == 0 {
        return Some(element.default_valences());
    }
    Some(
        element
            .isoelectronic(atom.formal_charge)
            .map(Element::default_valences)
            .unwrap_or(&[]),
    )
}

/// Recomputes every atom's implicit hydrogen count.
///
/// In strict mode an explicit valence above the largest permitted one is an
/// error. In lenient mode such atoms simply get no implicit hydrogens.
/// Atoms with an atomic number outside the periodic table fail in both
/// modes. On error the cache of earlier atoms is already updated.
pub fn update_property_cache<B: HasBondOrder>(
    mol: &mut Mol<Atom, B>,
    strict: bool,
) -> Result<(), PropertyCacheError> {
    let indices: Vec<NodeIndex> = mol.atoms().collect();
    for idx in indices {
        let implicit = implicit_h_count(mol, idx, strict)?;
        mol.atom_mut(idx).implicit_h = Some(implicit);
    }
    Ok(())
}

fn implicit_h_count<B: HasBondOrder>(
    mol: &Mol<Atom, B>,
    idx: NodeIndex,
    strict: bool,
) -> Result<u8, PropertyCacheError> {
    let atom = mol.atom(idx);
    let valences = allowed_valences(atom).ok_or(PropertyCacheError::UnknownElement {
        atom: idx.index(),
        atomic_num: atom.atomic_num,
    })?;
    let Some(&max) = valences.last() else {
        return Ok(0);
    };
    let explicit = explicit_valence(mol, idx);
    if explicit > max {
        if strict {
            return Err(PropertyCacheError::ExceedsValence {
                atom: idx.index(),
                symbol: atom.symbol(),
                valence: explicit,
                max,
            });
        }
        return Ok(0);
    }
    if atom.no_implicit {
        return Ok(0);
    }
    let target = valences
        .iter()
        .copied()
        .find(|&v| v >= explicit)
        .unwrap_or(max);
    let mut implicit = target - explicit;
    let has_aromatic_bond = mol
        .bonds_of(idx)
        .any(|e| mol.bond(e).bond_order() == BondOrder::Aromatic);
    if has_aromatic_bond {
        implicit = implicit.saturating_sub(1);
    }
    Ok(implicit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::Bond;
    use crate::smiles::parse_smiles;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn cached(smiles: &str) -> Vec<u8> {
        let mut mol = parse_smiles(smiles).unwrap();
        update_property_cache(&mut mol, true).unwrap();
        mol.atoms().map(|i| mol.atom(i).implicit_h.unwrap()).collect()
    }

    #[test]
    fn organic_molecules() {
        assert_eq!(cached("CCO"), vec![3, 2, 1]);
        assert_eq!(cached("C=C"), vec![2, 2]);
        assert_eq!(cached("N#N"), vec![0, 0]);
        assert_eq!(cached("CS(=O)C"), vec![3, 0, 0, 3]);
    }

    #[test]
    fn aromatic_bonds_take_one_hydrogen() {
        assert_eq!(cached("c1ccccc1"), vec![1; 6]);
        assert_eq!(cached("c1ccncc1"), vec![1, 1, 1, 0, 1, 1]);
        assert_eq!(cached("Cc1ccccc1")[1], 0);
    }

    #[test]
    fn charged_atoms_follow_isoelectronic_element() {
        assert_eq!(cached("C[N+](C)(C)C")[1], 0);
        assert_eq!(cached("CC(=O)[O-]")[3], 0);
        let mol = parse_smiles("[NH4+]").unwrap();
        let atom = mol.atom(n(0));
        assert_eq!(allowed_valences(atom), Some(&[4u8][..]));
    }

    #[test]
    fn strict_rejects_hypervalent_atoms() {
        let mut mol = parse_smiles("CN(=O)=O").unwrap();
        let err = update_property_cache(&mut mol, true).unwrap_err();
        assert!(matches!(
            err,
            PropertyCacheError::ExceedsValence { atom: 1, valence: 5, max: 3, .. }
        ));
    }

    #[test]
    fn lenient_clamps() {
        let mut mol = parse_smiles("CN(=O)=O").unwrap();
        update_property_cache(&mut mol, false).unwrap();
        assert_eq!(mol.atom(n(1)).implicit_h, Some(0));
    }

    #[test]
    fn unknown_element_fails_both_modes() {
        let mut mol = Mol::<Atom, Bond>::new();
        mol.add_atom(Atom::new(200));
        for strict in [true, false] {
            assert_eq!(
                update_property_cache(&mut mol, strict),
                Err(PropertyCacheError::UnknownElement {
                    atom: 0,
                    atomic_num: 200
                })
            );
        }
    }

    #[test]
    fn metals_and_dummies_get_no_hydrogens() {
        assert_eq!(cached("[Na+].[Cl-]"), vec![0, 0]);
        assert_eq!(cached("*C"), vec![0, 3]);
    }

    #[test]
    fn explicit_valence_counts_bracket_hydrogens() {
        let mol = parse_smiles("C[NH2+]C").unwrap();
        assert_eq!(explicit_valence(&mol, n(1)), 4);
    }
}
