use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An RGB colour with components in `0.0..=1.0`, serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub f64, pub f64, pub f64);

impl Rgb {
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);

    /// `#RRGGBB`, components clamped to the unit range.
    pub fn to_hex(self) -> String {
        let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}",
            channel(self.0),
            channel(self.1),
            channel(self.2)
        )
    }
}

impl From<[f64; 3]> for Rgb {
    fn from([r, g, b]: [f64; 3]) -> Self {
        Rgb(r, g, b)
    }
}

/// Options of an [`SvgDrawer`](super::SvgDrawer).
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOptions {
    /// Text drawn in place of the default label of an atom.
    pub atom_labels: HashMap<usize, String>,
    /// Colour of highlighted atoms without an explicit colour and of bonds
    /// between highlighted atoms.
    pub highlight_color: Rgb,
    pub background: Rgb,
    /// Margin around the molecule as a fraction of the canvas size.
    pub padding: f64,
    pub font_size: f64,
    pub bond_line_width: f64,
    /// Emit elements as `svg:rect`, `svg:path` and so on.
    pub prefixed_elements: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            atom_labels: HashMap::new(),
            highlight_color: Rgb(1.0, 0.5, 0.5),
            background: Rgb::WHITE,
            padding: 0.05,
            font_size: 14.0,
            bond_line_width: 2.0,
            prefixed_elements: true,
        }
    }
}
