//! Hückel aromaticity perception over the smallest set of smallest rings.
//!
//! Each SSSR ring is tested on its own; pairs of fused rings that are not
//! both aromatic are then tested as one system, which picks up azulene-like
//! cases. Atoms in an aromatic ring get `is_aromatic`, its bonds get
//! [`BondOrder::Aromatic`].

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;

const SP2_CAPABLE: [u8; 9] = [
    5,  // B
    6,  // C
    7,  // N
    8,  // O
    15, // P
    16, // S
    33, // As
    34, // Se
    52, // Te
];

/// Perceives aromaticity on a kekulized molecule and marks it.
///
/// Existing flags are only ever set, never cleared.
pub fn set_aromaticity(mol: &mut Mol<Atom, Bond>) {
    let ring_info = RingInfo::sssr(mol);
    let rings = ring_info.rings();
    let mut aromatic_rings: Vec<bool> = rings
        .iter()
        .map(|ring| is_aromatic_system(mol, ring))
        .collect();

    for i in 0..rings.len() {
        for j in (i + 1)..rings.len() {
            if aromatic_rings[i] && aromatic_rings[j] {
                continue;
            }
            if !rings_fused(&rings[i], &rings[j]) {
                continue;
            }
            let mut union = rings[i].clone();
            union.extend(rings[j].iter().filter(|a| !rings[i].contains(a)));
            if is_aromatic_system(mol, &union) {
                aromatic_rings[i] = true;
                aromatic_rings[j] = true;
            }
        }
    }

    for (ring, &aromatic) in rings.iter().zip(&aromatic_rings) {
        if !aromatic {
            continue;
        }
        for (k, &idx) in ring.iter().enumerate() {
            mol.atom_mut(idx).is_aromatic = true;
            let next = ring[(k + 1) % ring.len()];
            if let Some(e) = mol.bond_between(idx, next) {
                let bond = mol.bond_mut(e);
                bond.order = BondOrder::Aromatic;
                bond.is_aromatic = true;
            }
        }
    }
}

/// Aromatic flags per atom without modifying the molecule.
pub fn find_aromatic_atoms(mol: &Mol<Atom, Bond>) -> Vec<bool> {
    let mut copy = mol.clone();
    for idx in mol.atoms() {
        copy.atom_mut(idx).is_aromatic = false;
    }
    set_aromaticity(&mut copy);
    copy.atoms().map(|idx| copy.atom(idx).is_aromatic).collect()
}

fn rings_fused(a: &[NodeIndex], b: &[NodeIndex]) -> bool {
    a.iter().filter(|x| b.contains(x)).count() >= 2
}

fn is_aromatic_system(mol: &Mol<Atom, Bond>, atoms: &[NodeIndex]) -> bool {
    let mut total: u32 = 0;
    for &idx in atoms {
        if !SP2_CAPABLE.contains(&mol.atom(idx).atomic_num) {
            return false;
        }
        let triple = mol.bonds_of(idx).any(|e| {
            mol.bond(e).order == BondOrder::Triple
                && mol.other_atom(e, idx).is_some_and(|o| atoms.contains(&o))
        });
        if triple {
            return false;
        }
        match pi_electrons(mol, idx, atoms) {
            Some(e) => total += u32::from(e),
            None => return false,
        }
    }
    is_huckel(total)
}

/// π electrons an atom donates to the ring system `atoms`, or `None` if it
/// cannot take part.
fn pi_electrons(mol: &Mol<Atom, Bond>, idx: NodeIndex, atoms: &[NodeIndex]) -> Option<u8> {
    let atom = mol.atom(idx);
    let mut double_in_ring = false;
    let mut exo_double_to_hetero = false;
    let mut exo_double = false;
    for e in mol.bonds_of(idx) {
        if !matches!(mol.bond(e).order, BondOrder::Double | BondOrder::Aromatic) {
            continue;
        }
        let other = mol.other_atom(e, idx)?;
        if atoms.contains(&other) {
            double_in_ring = true;
        } else {
            exo_double = true;
            if matches!(mol.atom(other).atomic_num, 7 | 8 | 16) {
                exo_double_to_hetero = true;
            }
        }
    }
    let coordination = mol.degree(idx) + usize::from(atom.total_h());

    match (atom.atomic_num, atom.formal_charge) {
        (6, 0) if double_in_ring => Some(1),
        (6, 0) if exo_double_to_hetero => Some(0),
        (6, 0) if exo_double => Some(1),
        (6, -1) if !double_in_ring => Some(2),
        (6, _) if double_in_ring => Some(1),
        (6, 1) => Some(0),
        (7 | 15 | 33, 0) if double_in_ring => Some(1),
        (7 | 15 | 33, 0) if coordination == 3 && !exo_double => Some(2),
        (7 | 15 | 33, 1) if double_in_ring => Some(1),
        (7 | 15 | 33, -1) if coordination == 2 => Some(2),
        (8 | 16 | 34 | 52, 0) if coordination == 2 => Some(2),
        (8 | 16 | 34 | 52, 1) if double_in_ring => Some(1),
        (5, 0) if double_in_ring => Some(1),
        (5, 0) if coordination == 3 => Some(0),
        _ => None,
    }
}

fn is_huckel(pi_electrons: u32) -> bool {
    pi_electrons >= 2 && (pi_electrons - 2) % 4 == 0
}
