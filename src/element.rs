//! Periodic table lookups used by the reader, the valence model and the drawer.

use std::fmt;

/// A chemical element identified by atomic number.
///
/// Atomic number `0` is the dummy atom written `*` in SMILES; it has no
/// valence rules and is drawn as a plain `*` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(u8);

impl Element {
    pub const DUMMY: Element = Element(0);
    pub const H: Element = Element(1);
    pub const B: Element = Element(5);
    pub const C: Element = Element(6);
    pub const N: Element = Element(7);
    pub const O: Element = Element(8);
    pub const F: Element = Element(9);
    pub const P: Element = Element(15);
    pub const S: Element = Element(16);
    pub const CL: Element = Element(17);
    pub const AS: Element = Element(33);
    pub const SE: Element = Element(34);
    pub const BR: Element = Element(35);
    pub const TE: Element = Element(52);
    pub const I: Element = Element(53);

    pub const MAX_ATOMIC_NUM: u8 = 118;

    pub fn from_atomic_num(n: u8) -> Option<Element> {
        (n <= Self::MAX_ATOMIC_NUM).then_some(Element(n))
    }

    pub fn from_symbol(s: &str) -> Option<Element> {
        if s == "*" {
            return Some(Self::DUMMY);
        }
        SYMBOLS
            .iter()
            .position(|&sym| sym == s)
            .map(|i| Element(i as u8 + 1))
    }

    pub fn atomic_num(self) -> u8 {
        self.0
    }

    pub fn symbol(self) -> &'static str {
        match self.0 {
            0 => "*",
            n => SYMBOLS[n as usize - 1],
        }
    }

    /// Valences an uncharged atom of this element may take, lowest first.
    ///
    /// Empty for metals, noble gases and the dummy atom: those never receive
    /// implicit hydrogens and are not valence-checked.
    pub fn default_valences(self) -> &'static [u8] {
        match self.0 {
            1 => &[1],
            5 | 13 => &[3],
            6 | 14 | 32 => &[4],
            7 => &[3],
            15 | 33 => &[3, 5],
            8 => &[2],
            16 | 34 | 52 => &[2, 4, 6],
            9 | 17 | 35 | 85 => &[1],
            53 => &[1, 3, 5],
            _ => &[],
        }
    }

    /// Whether the element may be written without brackets in SMILES.
    pub fn is_organic_subset(self) -> bool {
        matches!(self.0, 5 | 6 | 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53)
    }

    /// The element isoelectronic with an ion of this element.
    ///
    /// `N+` behaves like `C`, `O-` like `F`; used to pick valences for
    /// charged atoms.
    pub fn isoelectronic(self, formal_charge: i8) -> Option<Element> {
        let n = self.0 as i16 - formal_charge as i16;
        u8::try_from(n).ok().and_then(|n| {
            if n == 0 {
                None
            } else {
                Element::from_atomic_num(n)
            }
        })
    }

    /// Default drawing colour as `[r, g, b]` in `0.0..=1.0`.
    pub fn color(self) -> [f64; 3] {
        match self.0 {
            7 => [0.0, 0.0, 1.0],
            8 => [1.0, 0.0, 0.0],
            9 => [0.2, 0.8, 0.8],
            15 => [1.0, 0.5, 0.0],
            16 => [0.8, 0.8, 0.0],
            17 => [0.0, 0.8, 0.0],
            35 => [0.5, 0.3, 0.1],
            53 => [0.63, 0.12, 0.94],
            1 => [0.33, 0.33, 0.33],
            _ => [0.0, 0.0, 0.0],
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

static SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];
