use std::collections::VecDeque;

use petgraph::algo::connected_components;
use petgraph::graph::NodeIndex;

use crate::mol::Mol;

/// Smallest set of smallest rings.
///
/// Rings are stored as atom cycles, rotated to start at their lowest atom
/// index, and sorted by size.
#[derive(Debug, Clone, Default)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
}

impl RingInfo {
    pub fn sssr<A, B>(mol: &Mol<A, B>) -> Self {
        let expected = Self::expected_ring_count(mol);
        if expected == 0 {
            return Self::default();
        }
        let words = mol.bond_count().div_ceil(64);
        let mut basis: Vec<Vec<u64>> = Vec::with_capacity(expected);
        let mut rings = Vec::with_capacity(expected);
        for ring in candidate_cycles(mol) {
            if rings.len() == expected {
                break;
            }
            let bits = edge_bits(mol, &ring, words);
            if reduce_into_basis(&mut basis, bits) {
                rings.push(normalize_ring(ring));
            }
        }
        rings.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        Self { rings }
    }

    /// Cyclomatic number `E - V + C`.
    pub fn expected_ring_count<A, B>(mol: &Mol<A, B>) -> usize {
        let c = connected_components(mol.graph());
        (mol.bond_count() + c).saturating_sub(mol.atom_count())
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn rings(&self) -> &[Vec<NodeIndex>] {
        &self.rings
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.rings.iter().any(|ring| ring.contains(&atom))
    }

    pub fn is_ring_bond(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.rings.iter().any(|ring| ring_has_bond(ring, a, b))
    }

    /// Number of rings the atom belongs to.
    pub fn num_atom_rings(&self, atom: NodeIndex) -> usize {
        self.rings.iter().filter(|ring| ring.contains(&atom)).count()
    }

    pub fn atom_rings(&self, atom: NodeIndex) -> Vec<&Vec<NodeIndex>> {
        self.rings
            .iter()
            .filter(|ring| ring.contains(&atom))
            .collect()
    }

    pub fn smallest_ring_size(&self, atom: NodeIndex) -> Option<usize> {
        self.rings
            .iter()
            .filter(|ring| ring.contains(&atom))
            .map(Vec::len)
            .min()
    }

    /// Smallest ring containing the bond `a`-`b`.
    pub fn smallest_bond_ring(&self, a: NodeIndex, b: NodeIndex) -> Option<&[NodeIndex]> {
        self.rings
            .iter()
            .find(|ring| ring_has_bond(ring, a, b))
            .map(Vec::as_slice)
    }

    /// Groups of ring indices whose rings are fused, i.e. connected through
    /// shared bonds. Spiro rings, which share a single atom, end up in
    /// different groups.
    pub fn ring_systems(&self) -> Vec<Vec<usize>> {
        let n = self.rings.len();
        let mut parent: Vec<usize> = (0..n).collect();
        fn find(parent: &mut [usize], mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if shares_bond(&self.rings[i], &self.rings[j]) {
                    let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                    if ri != rj {
                        parent[rj] = ri;
                    }
                }
            }
        }
        let mut systems: Vec<Vec<usize>> = Vec::new();
        let mut root_slot: Vec<Option<usize>> = vec![None; n];
        for i in 0..n {
            let root = find(&mut parent, i);
            match root_slot[root] {
                Some(slot) => systems[slot].push(i),
                None => {
                    root_slot[root] = Some(systems.len());
                    systems.push(vec![i]);
                }
            }
        }
        systems
    }
}

fn ring_has_bond(ring: &[NodeIndex], a: NodeIndex, b: NodeIndex) -> bool {
    let len = ring.len();
    (0..len).any(|i| {
        let (x, y) = (ring[i], ring[(i + 1) % len]);
        (x == a && y == b) || (x == b && y == a)
    })
}

fn shares_bond(r1: &[NodeIndex], r2: &[NodeIndex]) -> bool {
    let len = r1.len();
    (0..len).any(|i| ring_has_bond(r2, r1[i], r1[(i + 1) % len]))
}

/// Horton-style candidates: for every atom `w` and bond `u-v`, the cycle
/// made of the shortest paths `w..u` and `w..v` plus the bond, when the two
/// paths only meet at `w`. Sorted by size so a greedy independent pick
/// yields a minimum cycle basis.
fn candidate_cycles<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let trees: Vec<Vec<Option<NodeIndex>>> = (0..n)
        .map(|w| bfs_parents(mol, NodeIndex::new(w)))
        .collect();
    let mut out = Vec::new();
    for edge in mol.bonds() {
        let Some((u, v)) = mol.bond_endpoints(edge) else {
            continue;
        };
        for (w, parents) in trees.iter().enumerate() {
            let root = NodeIndex::new(w);
            let (Some(pu), Some(pv)) = (path_to(parents, root, u), path_to(parents, root, v))
            else {
                continue;
            };
            if pu.len() + pv.len() < 4 {
                continue;
            }
            if pu[1..].iter().any(|x| pv[1..].contains(x)) {
                continue;
            }
            let mut ring = pu;
            ring.extend(pv[1..].iter().rev());
            out.push(ring);
        }
    }
    out.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    out.dedup();
    out
}

fn bfs_parents<A, B>(mol: &Mol<A, B>, root: NodeIndex) -> Vec<Option<NodeIndex>> {
    let mut parent = vec![None; mol.atom_count()];
    let mut seen = vec![false; mol.atom_count()];
    seen[root.index()] = true;
    let mut queue = VecDeque::from([root]);
    while let Some(cur) = queue.pop_front() {
        for nb in mol.neighbors_by_bond(cur) {
            if !seen[nb.index()] {
                seen[nb.index()] = true;
                parent[nb.index()] = Some(cur);
                queue.push_back(nb);
            }
        }
    }
    parent
}

/// Path `root..=target` along the BFS tree, or `None` if unreachable.
fn path_to(
    parents: &[Option<NodeIndex>],
    root: NodeIndex,
    target: NodeIndex,
) -> Option<Vec<NodeIndex>> {
    let mut path = vec![target];
    let mut cur = target;
    while cur != root {
        cur = parents[cur.index()]?;
        path.push(cur);
    }
    path.reverse();
    Some(path)
}

fn edge_bits<A, B>(mol: &Mol<A, B>, ring: &[NodeIndex], words: usize) -> Vec<u64> {
    let mut bits = vec![0u64; words];
    let len = ring.len();
    for i in 0..len {
        if let Some(e) = mol.bond_between(ring[i], ring[(i + 1) % len]) {
            bits[e.index() / 64] ^= 1 << (e.index() % 64);
        }
    }
    bits
}

/// Gaussian elimination over GF(2). Returns `false` when `bits` is a
/// combination of rows already in `basis`.
fn reduce_into_basis(basis: &mut Vec<Vec<u64>>, mut bits: Vec<u64>) -> bool {
    for row in basis.iter() {
        if let Some(p) = lowest_bit(row) {
            if bits[p / 64] & (1 << (p % 64)) != 0 {
                for (x, y) in bits.iter_mut().zip(row) {
                    *x ^= *y;
                }
            }
        }
    }
    let Some(pivot) = lowest_bit(&bits) else {
        return false;
    };
    // Keep pivots unique so later reductions stay valid.
    for row in basis.iter_mut() {
        if row[pivot / 64] & (1 << (pivot % 64)) != 0 {
            for (x, y) in row.iter_mut().zip(&bits) {
                *x ^= *y;
            }
        }
    }
    basis.push(bits);
    true
}

fn lowest_bit(bits: &[u64]) -> Option<usize> {
    bits.iter()
        .enumerate()
        .find(|(_, w)| **w != 0)
        .map(|(i, w)| i * 64 + w.trailing_zeros() as usize)
}

fn normalize_ring(mut ring: Vec<NodeIndex>) -> Vec<NodeIndex> {
    let Some(start) = ring
        .iter()
        .enumerate()
        .min_by_key(|&(_, idx)| *idx)
        .map(|(i, _)| i)
    else {
        return ring;
    };
    ring.rotate_left(start);
    let len = ring.len();
    if len > 2 && ring[1] > ring[len - 1] {
        ring[1..].reverse();
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn sizes(smiles: &str) -> Vec<usize> {
        let mol = from_smiles(smiles).unwrap();
        RingInfo::sssr(&mol).rings().iter().map(Vec::len).collect()
    }

    #[test]
    fn simple_rings() {
        assert_eq!(sizes("C1CC1"), vec![3]);
        assert_eq!(sizes("C1CCCCC1"), vec![6]);
        assert_eq!(sizes("c1ccccc1"), vec![6]);
        assert!(sizes("CCCC").is_empty());
    }

    #[test]
    fn fused_and_bridged() {
        assert_eq!(sizes("c1ccc2ccccc2c1"), vec![6, 6]);
        assert_eq!(sizes("C1CCC2CCCCC2C1"), vec![6, 6]);
        assert_eq!(sizes("C1CC2CC1CC2"), vec![5, 5]);
        assert_eq!(sizes("c1ccc2cc3ccccc3cc2c1"), vec![6, 6, 6]);
    }

    #[test]
    fn cubane_has_five_faces() {
        let mol = from_smiles("C12C3C4C1C5C2C3C45").unwrap();
        assert_eq!(RingInfo::expected_ring_count(&mol), 5);
        assert_eq!(sizes("C12C3C4C1C5C2C3C45"), vec![4, 4, 4, 4, 4]);
    }

    #[test]
    fn ring_membership() {
        let mol = from_smiles("Oc1ccccc1").unwrap();
        let ri = RingInfo::sssr(&mol);
        assert!(!ri.is_ring_atom(n(0)));
        assert!(ri.is_ring_atom(n(1)));
        assert!(ri.is_ring_bond(n(1), n(6)));
        assert!(!ri.is_ring_bond(n(0), n(1)));
        assert_eq!(ri.smallest_ring_size(n(3)), Some(6));
        assert_eq!(ri.smallest_ring_size(n(0)), None);
    }

    #[test]
    fn smallest_ring_of_a_bond() {
        // Indane: the fusion bond 3-7 lies in both rings.
        let mol = from_smiles("c1ccc2CCCc2c1").unwrap();
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.smallest_bond_ring(n(3), n(7)).map(<[_]>::len), Some(5));
        assert_eq!(ri.smallest_bond_ring(n(0), n(1)).map(<[_]>::len), Some(6));
        assert_eq!(ri.smallest_bond_ring(n(0), n(2)), None);
    }

    #[test]
    fn fusion_atoms_belong_to_two_rings() {
        let mol = from_smiles("c1ccc2ccccc2c1").unwrap();
        let ri = RingInfo::sssr(&mol);
        let shared = mol.atoms().filter(|&a| ri.num_atom_rings(a) == 2).count();
        assert_eq!(shared, 2);
    }

    #[test]
    fn ring_systems_split_spiro() {
        let mol = from_smiles("C1CCC2(CC1)CCC2").unwrap();
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.num_rings(), 2);
        assert_eq!(ri.ring_systems().len(), 2);

        let mol = from_smiles("c1ccc2ccccc2c1").unwrap();
        assert_eq!(RingInfo::sssr(&mol).ring_systems(), vec![vec![0, 1]]);
    }

    #[test]
    fn separate_rings_in_biphenyl() {
        let mol = from_smiles("c1ccccc1-c1ccccc1").unwrap();
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.ring_systems().len(), 2);
        assert!(!ri.is_ring_bond(n(5), n(6)));
    }
}
