//! Tetrahedral stereocentres: tag cleanup and CIP labels.
//!
//! Substituents are ranked by comparing their hierarchical digraphs one
//! sphere at a time: at each distance from the centre the atomic numbers of
//! every atom in the branch, sorted high to low, are compared. Multiple
//! bonds and ring closures add duplicate atoms, hydrogens count as 1 and a
//! lone pair as 0.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use petgraph::graph::NodeIndex;

use crate::atom::{Atom, ChiralTag};
use crate::bond::{Bond, BondOrder};
use crate::kekulize::kekulize;
use crate::mol::{Mol, StereoRef};
use crate::smiles::permutation_is_odd;

/// Spheres explored before giving up on separating two branches.
const MAX_SPHERES: usize = 16;
/// Frontier size at which exploration stops; keeps fused cages tractable.
const MAX_FRONTIER: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipLabel {
    R,
    S,
}

impl fmt::Display for CipLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::R => f.write_str("R"),
            Self::S => f.write_str("S"),
        }
    }
}

/// Removes chiral tags from atoms that cannot be stereocentres.
///
/// A centre needs four substituents, or three plus a lone pair on P, As,
/// S, Se or Te, and all of them must have distinct CIP priorities.
pub fn cleanup_chirality(mol: &mut Mol<Atom, Bond>) {
    let tagged: Vec<NodeIndex> = mol
        .atoms()
        .filter(|&idx| mol.atom(idx).chiral_tag != ChiralTag::None)
        .collect();
    if tagged.is_empty() {
        return;
    }
    let clear: Vec<NodeIndex> = {
        let ranked = kekulized(mol);
        tagged
            .into_iter()
            .filter(|&idx| {
                let atom = mol.atom(idx);
                let substituents = mol.degree(idx) + usize::from(atom.total_h());
                let possible = match substituents {
                    4 => atom.total_h() <= 1,
                    3 => has_lone_pair_stereo(atom.atomic_num) && atom.total_h() == 0,
                    _ => false,
                };
                !possible || rank(&ranked, idx).is_none()
            })
            .collect()
    };
    for idx in clear {
        mol.atom_mut(idx).chiral_tag = ChiralTag::None;
    }
}

fn has_lone_pair_stereo(atomic_num: u8) -> bool {
    matches!(atomic_num, 15 | 16 | 33 | 34 | 52)
}

/// Substituents of `center` from highest to lowest CIP priority, or `None`
/// if two of them tie. Aromatic rings are ranked in their Kekulé form.
pub fn cip_order(mol: &Mol<Atom, Bond>, center: NodeIndex) -> Option<Vec<StereoRef>> {
    rank(&kekulized(mol), center)
}

/// [`cip_order`] over a molecule that is already free of aromatic bonds.
fn rank(mol: &Mol<Atom, Bond>, center: NodeIndex) -> Option<Vec<StereoRef>> {
    let refs = mol.reference_order(center);
    let mut frontiers: Vec<Vec<Node>> = refs
        .iter()
        .map(|&r| vec![Node::root(mol, center, r)])
        .collect();
    let mut spheres: Vec<Vec<Vec<u8>>> = vec![Vec::new(); refs.len()];

    for _ in 0..MAX_SPHERES {
        for (frontier, acc) in frontiers.iter().zip(spheres.iter_mut()) {
            let mut zs: Vec<u8> = frontier.iter().map(|n| n.z).collect();
            zs.sort_unstable_by(|a, b| b.cmp(a));
            acc.push(zs);
        }
        if all_distinct(&spheres) {
            break;
        }
        frontiers = frontiers
            .iter()
            .map(|frontier| frontier.iter().flat_map(|n| n.expand(mol)).collect())
            .collect();
        if frontiers.iter().all(Vec::is_empty)
            || frontiers.iter().any(|f| f.len() > MAX_FRONTIER)
        {
            break;
        }
    }

    if !all_distinct(&spheres) {
        return None;
    }
    let mut order: Vec<usize> = (0..refs.len()).collect();
    order.sort_by(|&a, &b| compare_branches(&spheres[b], &spheres[a]));
    Some(order.into_iter().map(|i| refs[i]).collect())
}

/// CIP label of a tagged centre, or `None` when it is untagged or its
/// substituents cannot be ranked.
pub fn assign_cip(mol: &Mol<Atom, Bond>, center: NodeIndex) -> Option<CipLabel> {
    let ranked = kekulized(mol);
    label_with(mol, &ranked, center)
}

/// Tagged centres with four distinct priorities and their labels, in atom
/// order.
pub fn find_chiral_centers(mol: &Mol<Atom, Bond>) -> Vec<(usize, CipLabel)> {
    if mol.atoms().all(|i| mol.atom(i).chiral_tag == ChiralTag::None) {
        return Vec::new();
    }
    let ranked = kekulized(mol);
    mol.atoms()
        .filter_map(|idx| label_with(mol, &ranked, idx).map(|l| (idx.index(), l)))
        .collect()
}

fn label_with(
    mol: &Mol<Atom, Bond>,
    ranked: &Mol<Atom, Bond>,
    center: NodeIndex,
) -> Option<CipLabel> {
    let tag = mol.atom(center).chiral_tag;
    if tag == ChiralTag::None {
        return None;
    }
    let order = rank(ranked, center)?;
    if order.len() < 4 {
        return None;
    }
    let odd = permutation_is_odd(&mol.reference_order(center), &order)?;
    let effective = if odd { tag.inverted() } else { tag };
    match effective {
        ChiralTag::Ccw => Some(CipLabel::S),
        ChiralTag::Cw => Some(CipLabel::R),
        ChiralTag::None => None,
    }
}

/// Kekulé form for ranking, so that aromatic rings contribute one duplicate
/// per atom. Falls back to the molecule as given.
fn kekulized(mol: &Mol<Atom, Bond>) -> Cow<'_, Mol<Atom, Bond>> {
    if mol.bonds().all(|e| mol.bond(e).order != BondOrder::Aromatic) {
        return Cow::Borrowed(mol);
    }
    let mut copy = mol.clone();
    match kekulize(&mut copy) {
        Ok(()) => Cow::Owned(copy),
        Err(_) => Cow::Borrowed(mol),
    }
}

fn all_distinct(spheres: &[Vec<Vec<u8>>]) -> bool {
    (0..spheres.len()).all(|i| {
        ((i + 1)..spheres.len())
            .all(|j| compare_branches(&spheres[i], &spheres[j]) != Ordering::Equal)
    })
}

fn compare_branches(a: &[Vec<u8>], b: &[Vec<u8>]) -> Ordering {
    for k in 0..a.len().max(b.len()) {
        let sa = a.get(k).map(Vec::as_slice).unwrap_or(&[]);
        let sb = b.get(k).map(Vec::as_slice).unwrap_or(&[]);
        for i in 0..sa.len().max(sb.len()) {
            let za = sa.get(i).copied().unwrap_or(0);
            let zb = sb.get(i).copied().unwrap_or(0);
            match za.cmp(&zb) {
                Ordering::Equal => {}
                other => return other,
            }
        }
    }
    Ordering::Equal
}

/// A vertex of the hierarchical digraph.
#[derive(Debug, Clone)]
struct Node {
    z: u8,
    /// `None` for hydrogens, lone pairs and duplicate atoms, which are
    /// never expanded.
    atom: Option<NodeIndex>,
    path: Vec<NodeIndex>,
}

impl Node {
    fn root(mol: &Mol<Atom, Bond>, center: NodeIndex, r: StereoRef) -> Self {
        match r {
            StereoRef::Implicit => Self {
                z: u8::from(mol.atom(center).total_h() > 0),
                atom: None,
                path: Vec::new(),
            },
            StereoRef::Atom(n) => Self {
                z: mol.atom(n).atomic_num,
                atom: Some(n),
                path: vec![center, n],
            },
        }
    }

    fn leaf(z: u8) -> Self {
        Self {
            z,
            atom: None,
            path: Vec::new(),
        }
    }

    fn expand(&self, mol: &Mol<Atom, Bond>) -> Vec<Node> {
        let Some(a) = self.atom else {
            return Vec::new();
        };
        let parent = self.path.len().checked_sub(2).map(|i| self.path[i]);
        let mut children = Vec::new();
        for e in mol.bonds_of(a) {
            let Some(b) = mol.other_atom(e, a) else {
                continue;
            };
            let z = mol.atom(b).atomic_num;
            let duplicates = match mol.bond(e).order {
                BondOrder::Double => 1,
                BondOrder::Triple => 2,
                _ => 0,
            };
            children.extend((0..duplicates).map(|_| Node::leaf(z)));
            if Some(b) == parent {
                continue;
            }
            if self.path.contains(&b) {
                children.push(Node::leaf(z));
            } else {
                let mut path = self.path.clone();
                path.push(b);
                children.push(Node {
                    z,
                    atom: Some(b),
                    path,
                });
            }
        }
        children.extend((0..mol.atom(a).total_h()).map(|_| Node::leaf(1)));
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn labels(smiles: &str) -> Vec<(usize, CipLabel)> {
        find_chiral_centers(&from_smiles(smiles).unwrap())
    }

    #[test]
    fn amino_acids() {
        assert_eq!(labels("N[C@@H](C)C(=O)O"), vec![(1, CipLabel::S)]);
        assert_eq!(labels("N[C@H](C)C(=O)O"), vec![(1, CipLabel::R)]);
        assert_eq!(labels("N[C@@H](CS)C(=O)O"), vec![(1, CipLabel::R)]);
    }

    #[test]
    fn halomethane_and_butanol() {
        assert_eq!(labels("F[C@](Cl)(Br)I"), vec![(1, CipLabel::S)]);
        assert_eq!(labels("F[C@@](Cl)(Br)I"), vec![(1, CipLabel::R)]);
        assert_eq!(labels("CC[C@H](C)O"), vec![(2, CipLabel::S)]);
    }

    #[test]
    fn writing_order_does_not_change_label() {
        // Same enantiomer of bromochlorofluoromethane written two ways.
        let a = labels("F[C@H](Cl)Br");
        let b = labels("[C@@H](F)(Cl)Br");
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].1, b[0].1);
    }

    #[test]
    fn priorities() {
        let mol = from_smiles("N[C@@H](C)C(=O)O").unwrap();
        let order = cip_order(&mol, n(1)).unwrap();
        assert_eq!(
            order,
            vec![
                StereoRef::Atom(n(0)),
                StereoRef::Atom(n(3)),
                StereoRef::Atom(n(2)),
                StereoRef::Implicit,
            ]
        );
    }

    #[test]
    fn phenyl_outranks_vinyl() {
        let mol = from_smiles("C=C[C@H](O)c1ccccc1").unwrap();
        let order = cip_order(&mol, n(2)).unwrap();
        assert_eq!(order[0], StereoRef::Atom(n(3)));
        assert_eq!(order[1], StereoRef::Atom(n(4)));
        assert_eq!(order[2], StereoRef::Atom(n(1)));
    }

    #[test]
    fn cleanup_drops_impossible_tags() {
        for smiles in ["C[C@H](C)C", "[C@H]([H])(F)Cl", "F[C@H]=C", "C[N@](F)Cl"] {
            let mol = from_smiles(smiles).unwrap();
            assert!(
                mol.atoms().all(|i| mol.atom(i).chiral_tag == ChiralTag::None),
                "{smiles}"
            );
        }
    }

    #[test]
    fn cleanup_keeps_real_centres() {
        let mol = from_smiles("F[C@H](Cl)Br").unwrap();
        assert_ne!(mol.atom(n(1)).chiral_tag, ChiralTag::None);
        let mol = from_smiles("C[S@](=O)CC").unwrap();
        assert_ne!(mol.atom(n(1)).chiral_tag, ChiralTag::None);
    }

    #[test]
    fn ring_centre_is_ranked_through_closures() {
        let centers = labels("C[C@H]1CCCC(C)C1");
        assert_eq!(centers.len(), 1);
        assert_eq!(centers[0].0, 1);
    }

    #[test]
    fn label_display() {
        assert_eq!(CipLabel::R.to_string(), "R");
        assert_eq!(format!("C:{}", CipLabel::S), "C:S");
    }
}
