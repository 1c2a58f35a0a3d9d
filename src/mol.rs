use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::conformer::Conformer;
use crate::smiles::SmilesError;

/// A substituent position around a stereocentre.
///
/// `Implicit` stands for the centre's hydrogen when it has one, or for its
/// lone pair when it has exactly three neighbours and no hydrogen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StereoRef {
    Implicit,
    Atom(NodeIndex),
}

/// Molecular graph with optional 2D conformers.
pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
    conformers: Vec<Conformer>,
}

/// A molecule with the crate's own atom and bond types.
pub type Molecule = Mol<Atom, Bond>;

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            conformers: Vec::new(),
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    /// Adds an atom. Existing conformers become stale and are dropped.
    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.conformers.clear();
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    /// Neighbours ordered by the insertion order of the connecting bonds.
    pub fn neighbors_by_bond(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges(idx)
            .map(|e| {
                let other = if e.source() == idx { e.target() } else { e.source() };
                (e.id(), other)
            })
            .collect();
        edges.sort_by_key(|&(e, _)| e);
        edges.into_iter().map(|(_, n)| n).collect()
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    /// The atom at the far end of `bond` as seen from `from`.
    pub fn other_atom(&self, bond: EdgeIndex, from: NodeIndex) -> Option<NodeIndex> {
        let (a, b) = self.bond_endpoints(bond)?;
        if a == from {
            Some(b)
        } else if b == from {
            Some(a)
        } else {
            None
        }
    }

    pub fn conformers(&self) -> &[Conformer] {
        &self.conformers
    }

    pub fn num_conformers(&self) -> usize {
        self.conformers.len()
    }

    /// The first conformer, which is the one used for drawing.
    pub fn conformer(&self) -> Option<&Conformer> {
        self.conformers.first()
    }

    /// Attaches a conformer. Panics if it does not cover every atom.
    pub fn add_conformer(&mut self, conformer: Conformer) {
        assert_eq!(
            conformer.len(),
            self.atom_count(),
            "conformer size does not match atom count"
        );
        self.conformers.push(conformer);
    }

    /// Replaces all conformers with `conformer`.
    pub fn set_conformer(&mut self, conformer: Conformer) {
        self.conformers.clear();
        self.add_conformer(conformer);
    }

    pub fn clear_conformers(&mut self) {
        self.conformers.clear();
    }
}

impl Mol<Atom, Bond> {
    /// Parses and sanitizes a SMILES string.
    pub fn from_smiles(s: &str) -> Result<Self, SmilesError> {
        crate::smiles::from_smiles(s)
    }

    /// The order chiral tags are expressed against: the implicit position
    /// (hydrogen or lone pair) first when present, then neighbours in bond
    /// insertion order.
    pub fn reference_order(&self, idx: NodeIndex) -> Vec<StereoRef> {
        let neighbors = self.neighbors_by_bond(idx);
        let mut order = Vec::with_capacity(neighbors.len() + 1);
        if has_implicit_position(self.atom(idx).total_h(), neighbors.len()) {
            order.push(StereoRef::Implicit);
        }
        order.extend(neighbors.into_iter().map(StereoRef::Atom));
        order
    }
}

/// Whether a centre's reference order starts with an implicit position.
pub(crate) fn has_implicit_position(h_count: u8, degree: usize) -> bool {
    h_count > 0 || degree == 3
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            conformers: self.conformers.clone(),
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        let atoms_match = self.atoms().all(|idx| self.atom(idx) == other.atom(idx));
        let bonds_match = self.bonds().all(|idx| {
            self.bond(idx) == other.bond(idx)
                && self.bond_endpoints(idx) == other.bond_endpoints(idx)
        });
        atoms_match && bonds_match && self.conformers == other.conformers
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("conformers", &self.conformers.len())
            .finish()
    }
}
