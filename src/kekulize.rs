//! Kekulization assigns alternating single and double bonds to aromatic
//! systems.
//!
//! Every `Aromatic` bond becomes `Single` or `Double` such that each atom
//! that needs a double bond receives exactly one, found by augmenting-path
//! matching. Aromatic flags on atoms and bonds are kept, so a kekulized
//! molecule still knows which parts were aromatic.

use std::collections::{HashSet, VecDeque};

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::valence::allowed_valences;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KekulizeError {
    /// The given atoms could not be assigned a double bond.
    #[error("can't kekulize mol, unkekulized atoms: {}", join(.0))]
    Unkekulizable(Vec<usize>),
    /// An atom outside any ring is marked aromatic.
    #[error("non-ring atom {0} marked aromatic")]
    NonRingAromatic(usize),
}

fn join(atoms: &[usize]) -> String {
    atoms
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Kekulizes in place. On error the molecule is left untouched.
///
/// Hydrogen counts are read from the property cache, so it should be up to
/// date (see [`update_property_cache`](crate::valence::update_property_cache)).
pub fn kekulize(mol: &mut Mol<Atom, Bond>) -> Result<(), KekulizeError> {
    let ring_info = RingInfo::sssr(mol);
    if let Some(idx) = mol
        .atoms()
        .find(|&idx| mol.atom(idx).is_aromatic && !ring_info.is_ring_atom(idx))
    {
        return Err(KekulizeError::NonRingAromatic(idx.index()));
    }

    let n = mol.atom_count();
    let mut adjacency: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![vec![]; n];
    let mut aromatic_edges = Vec::new();
    for e in mol.bonds() {
        if mol.bond(e).order != BondOrder::Aromatic {
            continue;
        }
        if let Some((a, b)) = mol.bond_endpoints(e) {
            adjacency[a.index()].push((b, e));
            adjacency[b.index()].push((a, e));
            aromatic_edges.push(e);
        }
    }
    if aromatic_edges.is_empty() {
        return Ok(());
    }

    let needs_double: Vec<bool> = mol
        .atoms()
        .map(|idx| !adjacency[idx.index()].is_empty() && needs_double_bond(mol, idx))
        .collect();

    let mut mate: Vec<Option<EdgeIndex>> = vec![None; n];
    let candidates: Vec<NodeIndex> = mol
        .atoms()
        .filter(|idx| needs_double[idx.index()])
        .collect();
    for &start in &candidates {
        if mate[start.index()].is_none() {
            augment(mol, &adjacency, &needs_double, &mut mate, start);
        }
    }

    let unmatched: Vec<usize> = candidates
        .iter()
        .filter(|idx| mate[idx.index()].is_none())
        .map(|idx| idx.index())
        .collect();
    if !unmatched.is_empty() {
        return Err(KekulizeError::Unkekulizable(unmatched));
    }

    let doubles: HashSet<EdgeIndex> = mate.iter().flatten().copied().collect();
    for e in aromatic_edges {
        mol.bond_mut(e).order = if doubles.contains(&e) {
            BondOrder::Double
        } else {
            BondOrder::Single
        };
    }
    Ok(())
}

/// Drops aromatic flags on atoms and bonds that no longer carry an
/// aromatic bond order.
pub fn clear_aromatic_flags(mol: &mut Mol<Atom, Bond>) {
    let bonds: Vec<EdgeIndex> = mol.bonds().collect();
    for e in bonds {
        let bond = mol.bond_mut(e);
        bond.is_aromatic = bond.order == BondOrder::Aromatic;
    }
    let atoms: Vec<NodeIndex> = mol.atoms().collect();
    for idx in atoms {
        let aromatic = mol
            .bonds_of(idx)
            .any(|e| mol.bond(e).order == BondOrder::Aromatic);
        mol.atom_mut(idx).is_aromatic = aromatic;
    }
}

/// An aromatic atom needs a double bond when its valence, counting
/// aromatic bonds as one, falls exactly one short of a permitted valence.
fn needs_double_bond(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> bool {
    let atom = mol.atom(idx);
    let Some(valences) = allowed_valences(atom) else {
        return false;
    };
    let used: u8 = mol
        .bonds_of(idx)
        .map(|e| mol.bond(e).order.valence_contrib())
        .sum::<u8>()
        + atom.total_h();
    valences
        .iter()
        .find(|&&v| v >= used)
        .is_some_and(|&v| v - used == 1)
}

fn augment(
    mol: &Mol<Atom, Bond>,
    adjacency: &[Vec<(NodeIndex, EdgeIndex)>],
    needs_double: &[bool],
    mate: &mut [Option<EdgeIndex>],
    start: NodeIndex,
) -> bool {
    let n = mol.atom_count();
    let mut prev: Vec<Option<(NodeIndex, EdgeIndex)>> = vec![None; n];
    let mut visited = vec![false; n];
    visited[start.index()] = true;
    let mut queue = VecDeque::from([start]);

    while let Some(u) = queue.pop_front() {
        for &(v, e) in &adjacency[u.index()] {
            if !needs_double[v.index()] || visited[v.index()] || mate[u.index()] == Some(e) {
                continue;
            }
            visited[v.index()] = true;
            prev[v.index()] = Some((u, e));

            let Some(matched) = mate[v.index()] else {
                flip_path(mate, &prev, start, v);
                return true;
            };
            let Some(w) = mol.other_atom(matched, v) else {
                continue;
            };
            if !visited[w.index()] {
                visited[w.index()] = true;
                prev[w.index()] = Some((v, matched));
                queue.push_back(w);
            }
        }
    }
    false
}

fn flip_path(
    mate: &mut [Option<EdgeIndex>],
    prev: &[Option<(NodeIndex, EdgeIndex)>],
    start: NodeIndex,
    end: NodeIndex,
) {
    let mut cur = end;
    let mut take = true;
    while cur != start {
        let Some((p, e)) = prev[cur.index()] else {
            return;
        };
        if take {
            mate[cur.index()] = Some(e);
            mate[p.index()] = Some(e);
        }
        take = !take;
        cur = p;
    }
}
