use nalgebra::{Matrix3, Vector3};
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::{Atom, ChiralTag};
use crate::bond::{Bond, BondOrder, Wedge, WedgeKind};
use crate::mol::{Mol, StereoRef};
use crate::rings::RingInfo;

/// Marks one single bond per tagged stereocentre as a wedge or a hash so
/// the drawing shows the configuration of the chiral tag.
///
/// Uses the first conformer; does nothing without one. Existing wedges are
/// cleared first.
pub fn assign_wedges(mol: &mut Mol<Atom, Bond>) {
    let edges: Vec<EdgeIndex> = mol.bonds().collect();
    for &e in &edges {
        mol.bond_mut(e).wedge = None;
    }
    if mol.conformer().is_none() {
        return;
    }
    let ring_info = RingInfo::sssr(mol);
    let centers: Vec<NodeIndex> = mol
        .atoms()
        .filter(|&idx| mol.atom(idx).chiral_tag != ChiralTag::None)
        .collect();
    for center in centers {
        let Some((bond, neighbor)) = pick_bond(mol, &ring_info, center) else {
            continue;
        };
        let Some(kind) = wedge_kind(mol, center, neighbor) else {
            continue;
        };
        mol.bond_mut(bond).wedge = Some(Wedge {
            kind,
            start: center,
        });
    }
}

/// The bond to mark: a single, not yet wedged bond, preferring chain bonds,
/// neighbours that are not stereocentres themselves and low degree.
fn pick_bond(
    mol: &Mol<Atom, Bond>,
    ring_info: &RingInfo,
    center: NodeIndex,
) -> Option<(EdgeIndex, NodeIndex)> {
    mol.bonds_of(center)
        .filter(|&e| {
            let bond = mol.bond(e);
            bond.order == BondOrder::Single && bond.wedge.is_none()
        })
        .filter_map(|e| mol.other_atom(e, center).map(|nb| (e, nb)))
        .min_by_key(|&(e, nb)| {
            (
                ring_info.is_ring_bond(center, nb),
                mol.atom(nb).chiral_tag != ChiralTag::None,
                mol.degree(nb),
                e.index(),
            )
        })
}

/// Wedge or hash for `neighbor` so that the drawn geometry matches the
/// centre's tag. `None` when the 2D arrangement is degenerate.
fn wedge_kind(mol: &Mol<Atom, Bond>, center: NodeIndex, neighbor: NodeIndex) -> Option<WedgeKind> {
    let conf = mol.conformer()?;
    let [cx, cy] = conf.position(center.index());
    let points: Vec<Vector3<f64>> = mol
        .reference_order(center)
        .into_iter()
        .map(|r| match r {
            StereoRef::Implicit => Vector3::new(0.0, 0.0, -1.0),
            StereoRef::Atom(a) => {
                let [x, y] = conf.position(a.index());
                let z = if a == neighbor { 1.0 } else { 0.0 };
                Vector3::new(x - cx, y - cy, z)
            }
        })
        .collect();
    if points.len() != 4 {
        return None;
    }
    let volume = Matrix3::from_rows(&[
        (points[1] - points[0]).transpose(),
        (points[2] - points[0]).transpose(),
        (points[3] - points[0]).transpose(),
    ])
    .determinant();
    if volume.abs() < 1e-6 {
        return None;
    }
    // With the neighbour lifted towards the viewer a negative volume reads
    // as counterclockwise.
    let lifted = if volume < 0.0 {
        ChiralTag::Ccw
    } else {
        ChiralTag::Cw
    };
    Some(if lifted == mol.atom(center).chiral_tag {
        WedgeKind::Wedge
    } else {
        WedgeKind::Hash
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformer::Conformer;
    use crate::draw::prepare::{prepare_for_drawing, PrepareOptions};
    use crate::smiles::from_smiles;

    /// Halomethane with implicit H, F at 90 degrees, Cl at 210, Br at 330.
    fn halomethane(tag: ChiralTag) -> Mol<Atom, Bond> {
        let mut mol = Mol::new();
        let f = mol.add_atom(Atom::new(9));
        let mut carbon = Atom::new(6);
        carbon.implicit_h = Some(1);
        carbon.chiral_tag = tag;
        let c = mol.add_atom(carbon);
        let cl = mol.add_atom(Atom::new(17));
        let br = mol.add_atom(Atom::new(35));
        mol.add_bond(c, f, Bond::new(BondOrder::Single));
        mol.add_bond(c, cl, Bond::new(BondOrder::Single));
        mol.add_bond(c, br, Bond::new(BondOrder::Single));
        let s = 3f64.sqrt() / 2.0;
        mol.add_conformer(Conformer::new(vec![
            [0.0, 1.0],
            [0.0, 0.0],
            [-s, -0.5],
            [s, -0.5],
        ]));
        mol
    }

    fn wedges(mol: &Mol<Atom, Bond>) -> Vec<(usize, Wedge)> {
        mol.bonds()
            .filter_map(|e| mol.bond(e).wedge.map(|w| (e.index(), w)))
            .collect()
    }

    #[test]
    fn wedge_follows_tag() {
        let mut mol = halomethane(ChiralTag::Cw);
        assign_wedges(&mut mol);
        assert_eq!(
            wedges(&mol),
            vec![(
                0,
                Wedge {
                    kind: WedgeKind::Wedge,
                    start: NodeIndex::new(1)
                }
            )]
        );

        let mut mol = halomethane(ChiralTag::Ccw);
        assign_wedges(&mut mol);
        assert_eq!(wedges(&mol)[0].1.kind, WedgeKind::Hash);
    }

    #[test]
    fn untagged_molecules_have_no_wedges() {
        let mut mol = halomethane(ChiralTag::None);
        assign_wedges(&mut mol);
        assert!(wedges(&mol).is_empty());
    }

    #[test]
    fn needs_coordinates() {
        let mut mol = halomethane(ChiralTag::Cw);
        mol.clear_conformers();
        assign_wedges(&mut mol);
        assert!(wedges(&mol).is_empty());
    }

    #[test]
    fn prefers_chain_bonds() {
        let mol = from_smiles("C[C@H]1CCCC(C)C1").unwrap();
        let prepared = prepare_for_drawing(&mol, PrepareOptions::default()).unwrap();
        let marked = wedges(&prepared);
        assert_eq!(marked.len(), 1);
        let e = petgraph::graph::EdgeIndex::new(marked[0].0);
        let (a, b) = prepared.bond_endpoints(e).unwrap();
        assert_eq!((a.index(), b.index()), (0, 1));
        assert_eq!(marked[0].1.start, NodeIndex::new(1));
    }

    #[test]
    fn mirror_images_get_opposite_marks() {
        let left = from_smiles("N[C@@H](C)C(=O)O").unwrap();
        let right = from_smiles("N[C@H](C)C(=O)O").unwrap();
        let left = prepare_for_drawing(&left, PrepareOptions::default()).unwrap();
        let right = prepare_for_drawing(&right, PrepareOptions::default()).unwrap();
        let (l, r) = (wedges(&left), wedges(&right));
        assert_eq!(l.len(), 1);
        assert_eq!(l[0].0, r[0].0);
        assert_ne!(l[0].1.kind, r[0].1.kind);
    }
}
