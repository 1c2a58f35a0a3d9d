use crate::*;
use petgraph::graph::NodeIndex;

fn n(i: usize) -> NodeIndex {
    NodeIndex::new(i)
}

#[test]
fn mol_add_atoms_and_bonds() {
    let mut mol = Molecule::new();
    let c = mol.add_atom(Atom::new(6));
    let o = mol.add_atom(Atom::new(8));
    let bond_idx = mol.add_bond(c, o, Bond::new(BondOrder::Double));

    assert_eq!(mol.atom_count(), 2);
    assert_eq!(mol.bond_count(), 1);
    assert_eq!(mol.atom(c).atomic_num, 6);
    assert_eq!(mol.atom(o).atomic_num, 8);
    assert_eq!(mol.bond(bond_idx).order, BondOrder::Double);
}

#[test]
fn mol_neighbors_and_bonds_of() {
    let mut mol = Molecule::new();
    let a = mol.add_atom(Atom::default());
    let b = mol.add_atom(Atom::default());
    let c = mol.add_atom(Atom::default());
    mol.add_bond(a, b, Bond::default());
    mol.add_bond(a, c, Bond::default());

    assert_eq!(mol.neighbors(a).count(), 2);
    assert_eq!(mol.bonds_of(a).count(), 2);
    assert_eq!(mol.neighbors_by_bond(a), vec![b, c]);
    assert_eq!(mol.degree(b), 1);
}

#[test]
fn mol_bond_between_and_endpoints() {
    let mut mol = Molecule::new();
    let a = mol.add_atom(Atom::default());
    let b = mol.add_atom(Atom::default());
    let c = mol.add_atom(Atom::default());
    let e = mol.add_bond(a, b, Bond::default());

    assert_eq!(mol.bond_between(a, b), Some(e));
    assert_eq!(mol.bond_between(a, c), None);
    assert_eq!(mol.other_atom(e, a), Some(b));
    assert_eq!(mol.other_atom(e, c), None);

    let (src, dst) = mol.bond_endpoints(e).unwrap();
    assert!((src == a && dst == b) || (src == b && dst == a));
}

#[test]
fn mol_atom_mut() {
    let mut mol = Molecule::new();
    let idx = mol.add_atom(Atom::default());
    mol.atom_mut(idx).atomic_num = 7;
    assert_eq!(mol.atom(idx).atomic_num, 7);
}

#[test]
fn atom_trait_impls() {
    let atom = Atom {
        formal_charge: -1,
        explicit_h: 1,
        implicit_h: Some(2),
        is_aromatic: true,
        ..Atom::new(6)
    };

    assert_eq!(HasAtomicNum::atomic_num(&atom), 6);
    assert_eq!(HasFormalCharge::formal_charge(&atom), -1);
    assert_eq!(HasHydrogenCount::hydrogen_count(&atom), 3);
    assert!(HasAromaticity::is_aromatic(&atom));
}

#[test]
fn bond_trait_impls() {
    let bond = Bond::new(BondOrder::Triple);
    assert_eq!(HasBondOrder::bond_order(&bond), BondOrder::Triple);
    assert_eq!(bond.wedge, None);
}

#[test]
fn defaults() {
    assert_eq!(ChiralTag::default(), ChiralTag::None);
    assert_eq!(BondOrder::default(), BondOrder::Single);
    let atom = Atom::default();
    assert_eq!(atom.atomic_num, 0);
    assert_eq!(atom.implicit_h, None);
    assert!(!atom.no_implicit);
    let mol = Molecule::default();
    assert!(mol.is_empty());
    assert_eq!(mol.num_conformers(), 0);
}

#[test]
fn conformers_replace_and_clear() {
    let mut mol = from_smiles("CC").unwrap();
    mol.add_conformer(Conformer::new(vec![[0.0, 0.0], [1.5, 0.0]]));
    mol.set_conformer(Conformer::new(vec![[0.0, 0.0], [0.0, 1.5]]));
    assert_eq!(mol.num_conformers(), 1);
    assert_eq!(mol.conformer().unwrap().position(1), [0.0, 1.5]);
    mol.clear_conformers();
    assert!(mol.conformer().is_none());
}

#[test]
#[should_panic(expected = "conformer size")]
fn conformer_must_cover_every_atom() {
    let mut mol = from_smiles("CCO").unwrap();
    mol.add_conformer(Conformer::new(vec![[0.0, 0.0]]));
}

#[test]
fn reference_order_puts_hydrogen_first() {
    let mol = from_smiles("N[C@@H](C)C(=O)O").unwrap();
    assert_eq!(
        mol.reference_order(n(1)),
        vec![
            StereoRef::Implicit,
            StereoRef::Atom(n(0)),
            StereoRef::Atom(n(2)),
            StereoRef::Atom(n(3)),
        ]
    );
    // a plain chain carbon has no implicit position once degree is 4
    let mol = from_smiles("CC(C)(C)C").unwrap();
    assert_eq!(mol.reference_order(n(1)).len(), 4);
    assert!(!mol.reference_order(n(1)).contains(&StereoRef::Implicit));
}

#[test]
fn clone_and_equality() {
    let mol = from_smiles("c1ccccc1O").unwrap();
    let mut copy = mol.clone();
    assert_eq!(copy, mol);
    copy.atom_mut(n(6)).formal_charge = -1;
    assert_ne!(copy, mol);
}

#[derive(Clone)]
struct Plain(BondOrder);

impl HasBondOrder for Plain {
    fn bond_order(&self) -> BondOrder {
        self.0
    }
}

#[test]
fn layout_runs_on_any_payload() {
    let mut mol = Mol::<&str, Plain>::new();
    let a = mol.add_atom("a");
    let b = mol.add_atom("b");
    let c = mol.add_atom("c");
    mol.add_bond(a, b, Plain(BondOrder::Single));
    mol.add_bond(b, c, Plain(BondOrder::Double));
    compute_2d_coords(&mut mol);

    let conf = mol.conformer().unwrap();
    assert_eq!(conf.len(), 3);
    assert!((conf.distance(0, 1) - depict::BOND_LENGTH).abs() < 1e-6);
    assert!((conf.distance(1, 2) - depict::BOND_LENGTH).abs() < 1e-6);
}
