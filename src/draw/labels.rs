//! Text shown at atom positions.

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Normal(String),
    Sub(String),
    Sup(String),
}

/// Default label: carbons stay bare unless isolated, charged or isotope
/// labelled; everything else shows its symbol, hydrogens and charge.
pub(crate) fn default_label(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> Option<Vec<Segment>> {
    let atom = mol.atom(idx);
    let bare_carbon = atom.atomic_num == 6
        && mol.degree(idx) > 0
        && atom.formal_charge == 0
        && atom.isotope == 0;
    if bare_carbon {
        return None;
    }
    let mut segments = Vec::new();
    if atom.isotope != 0 {
        segments.push(Segment::Sup(atom.isotope.to_string()));
    }
    let symbol = if atom.atomic_num == 0 { "*" } else { atom.symbol() };
    segments.push(Segment::Normal(symbol.to_string()));
    match atom.total_h() {
        0 => {}
        1 => segments.push(Segment::Normal("H".to_string())),
        n => {
            segments.push(Segment::Normal("H".to_string()));
            segments.push(Segment::Sub(n.to_string()));
        }
    }
    if let Some(charge) = charge_text(atom.formal_charge) {
        segments.push(Segment::Sup(charge));
    }
    Some(segments)
}

fn charge_text(charge: i8) -> Option<String> {
    let sign = if charge > 0 { '+' } else { '-' };
    match charge.unsigned_abs() {
        0 => None,
        1 => Some(sign.to_string()),
        n => Some(format!("{n}{sign}")),
    }
}
