use crate::element::Element;

/// Tetrahedral chiral tag.
///
/// The tag is expressed against the atom's *reference order*: its implicit
/// hydrogen or lone pair first (when it has one), then its neighbours in
/// bond insertion order (see [`Mol::reference_order`](crate::Mol::reference_order)).
/// Looking from the first reference neighbour, `Ccw` means the remaining
/// ones run counterclockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChiralTag {
    #[default]
    None,
    /// Counterclockwise (`@`).
    Ccw,
    /// Clockwise (`@@`).
    Cw,
}

impl ChiralTag {
    pub fn inverted(self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Ccw => Self::Cw,
            Self::Cw => Self::Ccw,
        }
    }
}

/// Default atom type for a molecular graph node.
///
/// Hydrogens are normally not graph nodes. `explicit_h` counts hydrogens
/// written inside brackets (`[NH4+]`); `implicit_h` is the property cache
/// filled in by [`update_property_cache`](crate::valence::update_property_cache)
/// and stays `None` until then.
///
/// # Examples
///
/// ```
/// use molview::Atom;
///
/// let carbon = Atom::new(6);
/// assert_eq!(carbon.atomic_num, 6);
/// assert_eq!(carbon.implicit_h, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    pub atomic_num: u8,
    pub formal_charge: i8,
    /// Mass number. `0` means natural abundance.
    pub isotope: u16,
    pub explicit_h: u8,
    /// Cached implicit hydrogen count.
    pub implicit_h: Option<u8>,
    /// Bracket atoms never receive implicit hydrogens.
    pub no_implicit: bool,
    pub is_aromatic: bool,
    pub chiral_tag: ChiralTag,
}

impl Atom {
    pub fn new(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }

    pub fn element(&self) -> Option<Element> {
        Element::from_atomic_num(self.atomic_num)
    }

    pub fn symbol(&self) -> &'static str {
        self.element().map(Element::symbol).unwrap_or("?")
    }

    /// Explicit plus cached implicit hydrogens. Uncached implicit
    /// hydrogens count as zero.
    pub fn total_h(&self) -> u8 {
        self.explicit_h + self.implicit_h.unwrap_or(0)
    }
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.total_h()
    }
}

impl crate::traits::HasAromaticity for Atom {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}
