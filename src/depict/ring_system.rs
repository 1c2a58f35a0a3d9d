//! Coordinates for one fused ring system in its own frame.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use super::geometry::{arc_points, centroid, regular_polygon, Point};

/// A rigid ring system: local coordinates in placement order.
#[derive(Debug, Clone)]
pub(crate) struct RingSystem {
    pub atoms: Vec<(NodeIndex, Point)>,
    pub centroid: Point,
}

impl RingSystem {
    /// Lays out `rings` (already known to be fused through shared bonds).
    ///
    /// The largest ring becomes a regular polygon; every further ring is
    /// grown from the atoms already placed, each run of new atoms on an arc
    /// between its placed neighbours. Atoms that cannot be reached this way
    /// are left out and treated as chain atoms by the caller.
    pub fn layout(rings: &[&[NodeIndex]], bond_length: f64) -> Self {
        let mut pos: HashMap<NodeIndex, Point> = HashMap::new();
        let mut order: Vec<NodeIndex> = Vec::new();
        let mut done = vec![false; rings.len()];

        let first = (0..rings.len())
            .max_by(|&a, &b| rings[a].len().cmp(&rings[b].len()).then(b.cmp(&a)));
        if let Some(first) = first {
            for (&atom, p) in rings[first]
                .iter()
                .zip(regular_polygon(rings[first].len(), bond_length))
            {
                pos.insert(atom, p);
                order.push(atom);
            }
            done[first] = true;
        }

        loop {
            let next = (0..rings.len())
                .filter(|&r| !done[r])
                .map(|r| (r, rings[r].iter().filter(|a| pos.contains_key(a)).count()))
                .filter(|&(_, placed)| placed >= 2)
                .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)));
            let Some((r, _)) = next else {
                break;
            };
            let ring = rings[r];
            let Some(anchor) = ring.iter().position(|a| pos.contains_key(a)) else {
                break;
            };
            let len = ring.len();
            let mut run: Vec<NodeIndex> = Vec::new();
            let mut prev = ring[anchor];
            for step in 1..=len {
                let atom = ring[(anchor + step) % len];
                let Some(&to) = pos.get(&atom) else {
                    run.push(atom);
                    continue;
                };
                if !run.is_empty() {
                    let from = pos[&prev];
                    let away = away_point(rings, &done, &pos, prev, atom);
                    for (&a, p) in run.iter().zip(arc_points(from, to, run.len(), bond_length, away)) {
                        pos.insert(a, p);
                        order.push(a);
                    }
                    run.clear();
                }
                prev = atom;
            }
            done[r] = true;
        }

        let atoms: Vec<(NodeIndex, Point)> = order.iter().map(|a| (*a, pos[a])).collect();
        let points: Vec<Point> = atoms.iter().map(|(_, p)| *p).collect();
        Self {
            centroid: centroid(&points),
            atoms,
        }
    }

    pub fn local(&self, atom: NodeIndex) -> Option<Point> {
        self.atoms.iter().find(|(a, _)| *a == atom).map(|(_, p)| *p)
    }
}

/// Point the new atoms between `x` and `y` should bulge away from: the
/// centre of an already placed ring holding both, or else the centre of
/// everything placed so far.
fn away_point(
    rings: &[&[NodeIndex]],
    done: &[bool],
    pos: &HashMap<NodeIndex, Point>,
    x: NodeIndex,
    y: NodeIndex,
) -> Point {
    let holder = rings
        .iter()
        .zip(done)
        .find(|(ring, &d)| d && ring.contains(&x) && ring.contains(&y));
    let points: Vec<Point> = match holder {
        Some((ring, _)) => ring.iter().filter_map(|a| pos.get(a).copied()).collect(),
        None => pos.values().copied().collect(),
    };
    centroid(&points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn ring(ids: &[usize]) -> Vec<NodeIndex> {
        ids.iter().map(|&i| n(i)).collect()
    }

    #[test]
    fn single_ring_is_regular() {
        let r = ring(&[0, 1, 2, 3, 4]);
        let sys = RingSystem::layout(&[&r], 1.5);
        assert_eq!(sys.atoms.len(), 5);
        for k in 0..5 {
            let a = sys.local(r[k]).unwrap();
            let b = sys.local(r[(k + 1) % 5]).unwrap();
            assert!(((a - b).norm() - 1.5).abs() < 1e-9);
        }
    }

    #[test]
    fn fused_rings_share_an_edge_without_overlap() {
        // Naphthalene numbering: rings share atoms 3 and 8.
        let a = ring(&[0, 1, 2, 3, 8, 9]);
        let b = ring(&[3, 4, 5, 6, 7, 8]);
        let sys = RingSystem::layout(&[&a, &b], 1.5);
        assert_eq!(sys.atoms.len(), 10);
        for r in [&a, &b] {
            for k in 0..6 {
                let p = sys.local(r[k]).unwrap();
                let q = sys.local(r[(k + 1) % 6]).unwrap();
                assert!(((p - q).norm() - 1.5).abs() < 1e-9);
            }
        }
        let ca = centroid(&a.iter().map(|x| sys.local(*x).unwrap()).collect::<Vec<_>>());
        let cb = centroid(&b.iter().map(|x| sys.local(*x).unwrap()).collect::<Vec<_>>());
        assert!((ca - cb).norm() > 2.0);
    }

    #[test]
    fn bridged_system_places_every_atom() {
        // Norbornane SSSR: two five-membered rings sharing three atoms.
        let a = ring(&[0, 1, 2, 3, 4]);
        let b = ring(&[2, 3, 4, 5, 6]);
        let sys = RingSystem::layout(&[&a, &b], 1.5);
        assert_eq!(sys.atoms.len(), 7);
        assert!(sys.local(n(6)).is_some());
    }
}
