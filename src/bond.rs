use petgraph::graph::NodeIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Contribution to an atom's valence. Aromatic bonds count as one; the
    /// valence model compensates by removing one hydrogen.
    pub fn valence_contrib(self) -> u8 {
        match self {
            Self::Single | Self::Aromatic => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }
}

/// Directional single-bond marker written as `/` or `\` in SMILES.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondDir {
    #[default]
    None,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WedgeKind {
    /// Solid wedge: the far atom points towards the viewer.
    Wedge,
    /// Hashed wedge: the far atom points away from the viewer.
    Hash,
}

/// Stereo wedge for drawing, anchored at the stereocentre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Wedge {
    pub kind: WedgeKind,
    /// The narrow end of the wedge.
    pub start: NodeIndex,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bond {
    pub order: BondOrder,
    pub is_aromatic: bool,
    pub dir: BondDir,
    pub wedge: Option<Wedge>,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            is_aromatic: order == BondOrder::Aromatic,
            ..Self::default()
        }
    }
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aromatic_constructor_sets_flag() {
        assert!(Bond::new(BondOrder::Aromatic).is_aromatic);
        assert!(!Bond::new(BondOrder::Double).is_aromatic);
    }

    #[test]
    fn valence_contributions() {
        assert_eq!(BondOrder::Aromatic.valence_contrib(), 1);
        assert_eq!(BondOrder::Triple.valence_contrib(), 3);
    }
}
