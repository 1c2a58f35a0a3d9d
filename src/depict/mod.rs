//! 2D coordinate generation.
//!
//! The layout is deterministic and template free. Ring systems are built as
//! fused regular polygons in their own frame and then attached as rigid
//! bodies; chains grow breadth-first from the first atom of each fragment,
//! zig-zagging at 120 degrees and staying straight through triple bonds and
//! cumulated double bonds. A short relaxation pushes apart non-bonded atoms
//! that ended up on top of each other, each fragment is turned so its long
//! axis runs along x, and fragments are packed side by side.

mod geometry;
mod ring_system;

use std::collections::VecDeque;
use std::f64::consts::{FRAC_PI_3, TAU};

use nalgebra::Rotation2;
use petgraph::graph::NodeIndex;

use crate::bond::BondOrder;
use crate::conformer::Conformer;
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::traits::HasBondOrder;

use geometry::{angle_of, centroid, direction, principal_axis_rotation, spread_in_gap, Point};
use ring_system::RingSystem;

/// Bond length of generated coordinates.
pub const BOND_LENGTH: f64 = 1.5;

/// Non-bonded atoms closer than this are pushed apart.
const MIN_SEPARATION: f64 = 0.6 * BOND_LENGTH;
const RELAX_ITERATIONS: usize = 50;
/// Horizontal space between packed fragments.
const FRAGMENT_GAP: f64 = 2.0 * BOND_LENGTH;

/// Computes a fresh 2D layout and makes it the molecule's only conformer.
pub fn compute_2d_coords<A, B: HasBondOrder>(mol: &mut Mol<A, B>) {
    let positions = layout(mol);
    mol.set_conformer(Conformer::new(
        positions.iter().map(|p| [p.x, p.y]).collect(),
    ));
}

fn layout<A, B: HasBondOrder>(mol: &Mol<A, B>) -> Vec<Point> {
    let ring_info = RingInfo::sssr(mol);
    let systems: Vec<RingSystem> = ring_info
        .ring_systems()
        .iter()
        .map(|group| {
            let rings: Vec<&[NodeIndex]> = group
                .iter()
                .map(|&r| ring_info.rings()[r].as_slice())
                .collect();
            RingSystem::layout(&rings, BOND_LENGTH)
        })
        .collect();
    let mut system_of: Vec<Vec<usize>> = vec![Vec::new(); mol.atom_count()];
    for (s, system) in systems.iter().enumerate() {
        for (atom, _) in &system.atoms {
            system_of[atom.index()].push(s);
        }
    }

    let mut placer = Placer {
        mol,
        systems: &systems,
        system_of: &system_of,
        pos: vec![None; mol.atom_count()],
        turn: vec![1.0; mol.atom_count()],
        system_placed: vec![false; systems.len()],
    };

    let mut fragments: Vec<Vec<NodeIndex>> = Vec::new();
    for seed in mol.atoms() {
        if placer.pos[seed.index()].is_none() {
            fragments.push(placer.place_fragment(seed));
        }
    }

    let pinned: Vec<bool> = mol
        .atoms()
        .map(|idx| !system_of[idx.index()].is_empty())
        .collect();
    let mut pos: Vec<Point> = placer
        .pos
        .iter()
        .map(|p| p.unwrap_or_else(Point::zeros))
        .collect();

    for fragment in &fragments {
        relax(mol, fragment, &pinned, &mut pos);
        orient(fragment, &mut pos);
    }
    pack(&fragments, &mut pos);
    pos
}

struct Placer<'a, A, B> {
    mol: &'a Mol<A, B>,
    systems: &'a [RingSystem],
    system_of: &'a [Vec<usize>],
    pos: Vec<Option<Point>>,
    /// Side the next chain bond bends to, alternated along a chain.
    turn: Vec<f64>,
    system_placed: Vec<bool>,
}

impl<A, B: HasBondOrder> Placer<'_, A, B> {
    /// Places every atom connected to `seed`, returning them in placement
    /// order.
    fn place_fragment(&mut self, seed: NodeIndex) -> Vec<NodeIndex> {
        let mut queue = VecDeque::new();
        let mut placed = Vec::new();
        match self.unplaced_system(seed) {
            Some(s) => {
                let systems = self.systems;
                let system = &systems[s];
                for &(atom, local) in &system.atoms {
                    self.pos[atom.index()] = Some(local - system.centroid);
                    queue.push_back(atom);
                }
                self.system_placed[s] = true;
            }
            None => {
                self.pos[seed.index()] = Some(Point::zeros());
                queue.push_back(seed);
            }
        }
        while let Some(atom) = queue.pop_front() {
            placed.push(atom);
            self.expand(atom, &mut queue);
        }
        placed
    }

    fn unplaced_system(&self, atom: NodeIndex) -> Option<usize> {
        self.system_of[atom.index()]
            .iter()
            .copied()
            .find(|&s| !self.system_placed[s])
    }

    fn occupied_angles(&self, atom: NodeIndex, at: Point) -> Vec<f64> {
        self.mol
            .neighbors_by_bond(atom)
            .into_iter()
            .filter_map(|nb| self.pos[nb.index()])
            .map(|p| angle_of(&(p - at)))
            .collect()
    }

    fn expand(&mut self, atom: NodeIndex, queue: &mut VecDeque<NodeIndex>) {
        let Some(at) = self.pos[atom.index()] else {
            return;
        };

        // Spiro: further ring systems through this very atom.
        while let Some(s) = self.unplaced_system(atom) {
            let occupied = self.occupied_angles(atom, at);
            let theta = spread_in_gap(&occupied, 1)[0];
            self.attach_system(s, atom, at, theta, queue);
        }

        let unplaced: Vec<NodeIndex> = self
            .mol
            .neighbors_by_bond(atom)
            .into_iter()
            .filter(|nb| self.pos[nb.index()].is_none())
            .collect();
        if unplaced.is_empty() {
            return;
        }
        let occupied = self.occupied_angles(atom, at);
        let angles: Vec<f64> = match (occupied.as_slice(), unplaced.len()) {
            ([], k) => (0..k).map(|i| TAU * i as f64 / k as f64).collect(),
            ([incoming], 1) => {
                let straight = incoming + std::f64::consts::PI;
                if self.is_linear(atom) {
                    vec![straight]
                } else {
                    vec![straight + self.turn[atom.index()] * FRAC_PI_3]
                }
            }
            (_, k) => spread_in_gap(&occupied, k),
        };

        for (nb, theta) in unplaced.into_iter().zip(angles) {
            // A sibling's ring system may already have claimed this atom.
            if self.pos[nb.index()].is_some() {
                continue;
            }
            self.turn[nb.index()] = -self.turn[atom.index()];
            let p = at + direction(theta) * BOND_LENGTH;
            match self.unplaced_system(nb) {
                Some(s) => self.attach_system(s, nb, p, theta, queue),
                None => {
                    self.pos[nb.index()] = Some(p);
                    queue.push_back(nb);
                }
            }
        }
    }

    /// Places ring system `s` rigidly so that `anchor` lands on `anchor_pos`
    /// and the system's centre lies in direction `theta` from it.
    fn attach_system(
        &mut self,
        s: usize,
        anchor: NodeIndex,
        anchor_pos: Point,
        theta: f64,
        queue: &mut VecDeque<NodeIndex>,
    ) {
        let systems = self.systems;
        let system = &systems[s];
        self.system_placed[s] = true;
        let Some(local_anchor) = system.local(anchor) else {
            return;
        };
        let outward = system.centroid - local_anchor;
        let rotation = if outward.norm() < 1e-9 {
            Rotation2::identity()
        } else {
            Rotation2::new(theta - angle_of(&outward))
        };
        for &(atom, local) in &system.atoms {
            if self.pos[atom.index()].is_some() {
                continue;
            }
            self.pos[atom.index()] = Some(anchor_pos + rotation * (local - local_anchor));
            queue.push_back(atom);
        }
    }

    /// Triple bonds and cumulated double bonds keep their neighbours
    /// collinear.
    fn is_linear(&self, atom: NodeIndex) -> bool {
        let orders: Vec<BondOrder> = self
            .mol
            .bonds_of(atom)
            .map(|e| self.mol.bond(e).bond_order())
            .collect();
        orders.contains(&BondOrder::Triple)
            || orders.iter().filter(|&&o| o == BondOrder::Double).count() >= 2
    }
}

/// Pushes apart non-bonded atoms that sit too close. Ring atoms stay put
/// unless both atoms of a clash are ring atoms.
fn relax<A, B>(mol: &Mol<A, B>, fragment: &[NodeIndex], pinned: &[bool], pos: &mut [Point]) {
    for _ in 0..RELAX_ITERATIONS {
        let mut moved = false;
        for (k, &a) in fragment.iter().enumerate() {
            for &b in &fragment[k + 1..] {
                if mol.bond_between(a, b).is_some() {
                    continue;
                }
                let (i, j) = (a.index(), b.index());
                let delta = pos[i] - pos[j];
                let d = delta.norm();
                if d >= MIN_SEPARATION {
                    continue;
                }
                let push = if d < 1e-6 {
                    direction(i as f64 + j as f64)
                } else {
                    delta / d
                };
                let gap = MIN_SEPARATION - d;
                match (pinned[i], pinned[j]) {
                    (false, true) => pos[i] += push * gap,
                    (true, false) => pos[j] -= push * gap,
                    _ => {
                        pos[i] += push * (gap / 2.0);
                        pos[j] -= push * (gap / 2.0);
                    }
                }
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
}

/// Rotates a fragment about its centre so its principal axis lies along x.
fn orient(fragment: &[NodeIndex], pos: &mut [Point]) {
    let points: Vec<Point> = fragment.iter().map(|a| pos[a.index()]).collect();
    let center = centroid(&points);
    let rotation = principal_axis_rotation(&points);
    for a in fragment {
        pos[a.index()] = center + rotation * (pos[a.index()] - center);
    }
}

/// Lays fragments out left to right, vertically centred, and centres the
/// whole drawing on the origin.
fn pack(fragments: &[Vec<NodeIndex>], pos: &mut [Point]) {
    let mut cursor = 0.0;
    for fragment in fragments {
        let (lo, hi) = bounds(fragment.iter().map(|a| pos[a.index()]));
        let shift = Point::new(cursor - lo.x, -(lo.y + hi.y) / 2.0);
        for a in fragment {
            pos[a.index()] += shift;
        }
        cursor += hi.x - lo.x + FRAGMENT_GAP;
    }
    if pos.is_empty() {
        return;
    }
    let (lo, hi) = bounds(pos.iter().copied());
    let center = (lo + hi) / 2.0;
    for p in pos.iter_mut() {
        *p -= center;
    }
}

fn bounds(points: impl Iterator<Item = Point>) -> (Point, Point) {
    points.fold(
        (Point::repeat(f64::INFINITY), Point::repeat(f64::NEG_INFINITY)),
        |(lo, hi), p| (lo.inf(&p), hi.sup(&p)),
    )
}
