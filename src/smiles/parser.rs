use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::atom::{Atom, ChiralTag};
use crate::bond::{Bond, BondDir, BondOrder};
use crate::mol::{has_implicit_position, Mol, StereoRef};
use crate::smiles::error::SmilesError;
use crate::smiles::tokenizer::{AtomToken, BondToken, Token};

/// A position in an atom's SMILES neighbour list. Ring bonds occupy their
/// slot from the opening digit onwards, before the partner is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Atom(NodeIndex),
    Implicit,
    Ring(u16),
}

#[derive(Debug, Default)]
struct AtomOrder {
    slots: Vec<Slot>,
    has_preceding: bool,
}

#[derive(Debug, Clone, Copy)]
struct RingOpen {
    atom: NodeIndex,
    bond: Option<BondToken>,
}

#[derive(Default)]
struct Builder {
    mol: Mol<Atom, Bond>,
    orders: Vec<AtomOrder>,
    aromatic_symbol: Vec<bool>,
    current: Option<NodeIndex>,
    branches: Vec<(NodeIndex, usize)>,
    pending_bond: Option<(BondToken, usize)>,
    rings: HashMap<u16, RingOpen>,
}

pub fn build_mol(tokens: &[Token]) -> Result<Mol<Atom, Bond>, SmilesError> {
    let mut builder = Builder::default();
    for token in tokens {
        match token {
            Token::Atom(tok) => builder.atom(tok)?,
            Token::Bond { bond, pos } => {
                if builder.pending_bond.is_some() || builder.current.is_none() {
                    return Err(SmilesError::DanglingBond { pos: *pos });
                }
                builder.pending_bond = Some((*bond, *pos));
            }
            Token::RingClosure { digit, pos } => builder.ring_closure(*digit, *pos)?,
            Token::OpenParen(pos) => {
                let cur = builder
                    .current
                    .ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                if let Some((_, bond_pos)) = builder.pending_bond {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                builder.branches.push((cur, *pos));
            }
            Token::CloseParen(pos) => {
                if let Some((_, bond_pos)) = builder.pending_bond {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                let (atom, _) = builder
                    .branches
                    .pop()
                    .ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                builder.current = Some(atom);
            }
            Token::Dot(pos) => {
                if builder.pending_bond.is_some() || !builder.branches.is_empty() {
                    return Err(SmilesError::UnexpectedChar { pos: *pos, ch: '.' });
                }
                builder.current = None;
            }
        }
    }
    builder.finish()
}

impl Builder {
    fn atom(&mut self, tok: &AtomToken) -> Result<(), SmilesError> {
        let atom = Atom {
            atomic_num: tok.element.atomic_num(),
            formal_charge: tok.charge,
            isotope: tok.isotope,
            explicit_h: tok.hcount,
            implicit_h: None,
            no_implicit: tok.is_bracket,
            is_aromatic: tok.is_aromatic,
            chiral_tag: tok.chirality,
        };
        let idx = self.mol.add_atom(atom);
        self.orders.push(AtomOrder::default());
        self.aromatic_symbol.push(tok.is_aromatic);

        if let Some(prev) = self.current {
            let bond = self.pending_bond.take().map(|(b, _)| b);
            self.connect(prev, idx, bond);
            self.orders[prev.index()].slots.push(Slot::Atom(idx));
            self.orders[idx.index()].slots.push(Slot::Atom(prev));
            self.orders[idx.index()].has_preceding = true;
        }
        if tok.hcount > 0 {
            self.orders[idx.index()].slots.push(Slot::Implicit);
        }
        self.current = Some(idx);
        Ok(())
    }

    fn ring_closure(&mut self, digit: u16, pos: usize) -> Result<(), SmilesError> {
        let cur = self
            .current
            .ok_or(SmilesError::RingWithoutAtom { digit, pos })?;
        let bond = self.pending_bond.take().map(|(b, _)| b);

        let Some(open) = self.rings.remove(&digit) else {
            self.rings.insert(digit, RingOpen { atom: cur, bond });
            self.orders[cur.index()].slots.push(Slot::Ring(digit));
            return Ok(());
        };

        if open.atom == cur || self.mol.bond_between(open.atom, cur).is_some() {
            return Err(SmilesError::InvalidRingBond { digit, pos });
        }
        let bond = match (open.bond, bond) {
            (Some(a), Some(b)) if !same_ring_bond(a, b) => {
                return Err(SmilesError::RingBondConflict { digit });
            }
            (Some(a), _) => Some(a),
            (None, b) => b,
        };
        self.connect(open.atom, cur, bond);

        let open_slots = &mut self.orders[open.atom.index()].slots;
        if let Some(slot) = open_slots.iter_mut().find(|s| **s == Slot::Ring(digit)) {
            *slot = Slot::Atom(cur);
        }
        self.orders[cur.index()].slots.push(Slot::Atom(open.atom));
        Ok(())
    }

    fn connect(&mut self, a: NodeIndex, b: NodeIndex, token: Option<BondToken>) {
        let both_aromatic = self.aromatic_symbol[a.index()] && self.aromatic_symbol[b.index()];
        let (order, dir) = match token {
            Some(BondToken::Single) => (BondOrder::Single, BondDir::None),
            Some(BondToken::Double) => (BondOrder::Double, BondDir::None),
            Some(BondToken::Triple) => (BondOrder::Triple, BondDir::None),
            Some(BondToken::Aromatic) => (BondOrder::Aromatic, BondDir::None),
            Some(BondToken::Up) => (BondOrder::Single, BondDir::Up),
            Some(BondToken::Down) => (BondOrder::Single, BondDir::Down),
            None if both_aromatic => (BondOrder::Aromatic, BondDir::None),
            None => (BondOrder::Single, BondDir::None),
        };
        let bond = Bond {
            dir,
            ..Bond::new(order)
        };
        self.mol.add_bond(a, b, bond);
    }

    fn finish(mut self) -> Result<Mol<Atom, Bond>, SmilesError> {
        if let Some(&(_, pos)) = self.branches.last() {
            return Err(SmilesError::UnmatchedParen { pos });
        }
        if let Some((_, pos)) = self.pending_bond {
            return Err(SmilesError::DanglingBond { pos });
        }
        if let Some(&digit) = self.rings.keys().min() {
            return Err(SmilesError::UnclosedRing { digit });
        }

        let chiral: Vec<NodeIndex> = self
            .mol
            .atoms()
            .filter(|&idx| self.mol.atom(idx).chiral_tag != ChiralTag::None)
            .collect();
        for idx in chiral {
            let order = &self.orders[idx.index()];
            let mut smiles_order: Vec<StereoRef> = order
                .slots
                .iter()
                .filter_map(|slot| match *slot {
                    Slot::Atom(n) => Some(StereoRef::Atom(n)),
                    Slot::Implicit => Some(StereoRef::Implicit),
                    Slot::Ring(_) => None,
                })
                .collect();
            let atom = self.mol.atom(idx);
            let lone_pair = atom.explicit_h == 0
                && has_implicit_position(0, self.mol.degree(idx));
            if lone_pair {
                let at = usize::from(order.has_preceding).min(smiles_order.len());
                smiles_order.insert(at, StereoRef::Implicit);
            }
            let reference = self.mol.reference_order(idx);
            if let Some(odd) = permutation_is_odd(&smiles_order, &reference) {
                if odd {
                    let atom = self.mol.atom_mut(idx);
                    atom.chiral_tag = atom.chiral_tag.inverted();
                }
            }
        }
        Ok(self.mol)
    }
}

fn same_ring_bond(a: BondToken, b: BondToken) -> bool {
    // `/` on one end and `\` on the other describe the same bond.
    match (a, b) {
        (BondToken::Up, BondToken::Down) | (BondToken::Down, BondToken::Up) => true,
        _ => a == b,
    }
}

/// Parity of the permutation taking `from` to `to`; `None` if the two lists
/// do not hold the same items.
pub(crate) fn permutation_is_odd<T: PartialEq>(from: &[T], to: &[T]) -> Option<bool> {
    if from.len() != to.len() {
        return None;
    }
    let mut perm = Vec::with_capacity(from.len());
    for item in from {
        perm.push(to.iter().position(|t| t == item)?);
    }
    let mut visited = vec![false; perm.len()];
    let mut swaps = 0;
    for start in 0..perm.len() {
        let mut j = start;
        let mut cycle_len = 0;
        while !visited[j] {
            visited[j] = true;
            j = perm[j];
            cycle_len += 1;
        }
        if cycle_len > 0 {
            swaps += cycle_len - 1;
        }
    }
    Some(swaps % 2 == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::tokenizer::tokenize;

    fn parse(s: &str) -> Mol<Atom, Bond> {
        build_mol(&tokenize(s).unwrap()).unwrap()
    }

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    #[test]
    fn branch_and_chain() {
        let mol = parse("CC(C)C");
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.bond_count(), 3);
        assert_eq!(mol.degree(n(1)), 3);
    }

    #[test]
    fn ring_closure_bond() {
        let mol = parse("C1CCCCC1");
        assert_eq!(mol.bond_count(), 6);
        assert!(mol.bond_between(n(0), n(5)).is_some());
    }

    #[test]
    fn aromatic_bonds_between_aromatic_atoms() {
        let mol = parse("c1ccccc1-c1ccccc1");
        let link = mol.bond_between(n(5), n(6)).unwrap();
        assert_eq!(mol.bond(link).order, BondOrder::Single);
        let ring = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(ring).order, BondOrder::Aromatic);
    }

    #[test]
    fn disconnected_fragments() {
        let mol = parse("[Na+].[Cl-]");
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
    }

    #[test]
    fn directional_bonds() {
        let mol = parse("F/C=C/F");
        let e = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(e).dir, BondDir::Up);
    }

    #[test]
    fn parse_errors() {
        let err = |s: &str| build_mol(&tokenize(s).unwrap()).unwrap_err();
        assert_eq!(err("C1CC"), SmilesError::UnclosedRing { digit: 1 });
        assert_eq!(err("C(C"), SmilesError::UnmatchedParen { pos: 1 });
        assert_eq!(err("CC)"), SmilesError::UnmatchedParen { pos: 2 });
        assert_eq!(err("C="), SmilesError::DanglingBond { pos: 1 });
        assert_eq!(err("C11"), SmilesError::InvalidRingBond { digit: 1, pos: 2 });
        assert_eq!(err("C=1CC#1"), SmilesError::RingBondConflict { digit: 1 });
    }

    #[test]
    fn chiral_tag_with_hydrogen_keeps_sense() {
        // SMILES order [N, H, C, C] vs reference [H, N, C, C]: one swap.
        let mol = parse("N[C@@H](C)C(=O)O");
        assert_eq!(mol.atom(n(1)).chiral_tag, ChiralTag::Ccw);
    }

    #[test]
    fn chiral_tag_ring_closure_order() {
        // The ring bond comes first in SMILES order but last by insertion.
        let mol = parse("[C@]1(F)(Cl)CC1");
        assert_eq!(mol.atom(n(0)).chiral_tag, ChiralTag::Cw);
        let mol = parse("F[C@]1(Cl)CC1");
        assert_eq!(mol.atom(n(1)).chiral_tag, ChiralTag::Ccw);
    }

    #[test]
    fn permutation_parity() {
        assert_eq!(permutation_is_odd(&[1, 2, 3], &[1, 2, 3]), Some(false));
        assert_eq!(permutation_is_odd(&[1, 2, 3], &[2, 1, 3]), Some(true));
        assert_eq!(permutation_is_odd(&[1, 2, 3], &[2, 3, 1]), Some(false));
        assert_eq!(permutation_is_odd(&[1, 2], &[1, 3]), None);
    }
}
