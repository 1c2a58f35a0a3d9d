use crate::atom::ChiralTag;
use crate::element::Element;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond { bond: BondToken, pos: usize },
    RingClosure { digit: u16, pos: usize },
    OpenParen(usize),
    CloseParen(usize),
    Dot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: u16,
    /// Tag relative to the SMILES neighbour order, not yet normalized.
    pub chirality: ChiralTag,
    pub hcount: u8,
    pub charge: i8,
    pub atom_class: u16,
    pub is_bracket: bool,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Aromatic,
    Up,
    Down,
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    let mut lexer = Lexer {
        chars: input.chars().collect(),
        pos: 0,
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn next_token(&mut self) -> Result<Option<Token>, SmilesError> {
        while matches!(self.peek(), Some(' ' | '\t' | '\r' | '\n')) {
            self.pos += 1;
        }
        let start = self.pos;
        let Some(ch) = self.bump() else {
            return Ok(None);
        };
        let token = match ch {
            '[' => Token::Atom(self.bracket_atom(start)?),
            '(' => Token::OpenParen(start),
            ')' => Token::CloseParen(start),
            '.' => Token::Dot(start),
            '-' => self.bond(BondToken::Single, start),
            '=' => self.bond(BondToken::Double, start),
            '#' => self.bond(BondToken::Triple, start),
            ':' => self.bond(BondToken::Aromatic, start),
            '/' => self.bond(BondToken::Up, start),
            '\\' => self.bond(BondToken::Down, start),
            '%' => {
                let d1 = self.digit().ok_or(SmilesError::UnexpectedEnd { pos: self.pos })?;
                let d2 = self.digit().ok_or(SmilesError::UnexpectedEnd { pos: self.pos })?;
                Token::RingClosure {
                    digit: d1 * 10 + d2,
                    pos: start,
                }
            }
            d @ '0'..='9' => Token::RingClosure {
                digit: d as u16 - '0' as u16,
                pos: start,
            },
            '*' => Token::Atom(organic_atom(Element::DUMMY, false, start)),
            'B' if self.peek() == Some('r') => {
                self.pos += 1;
                Token::Atom(organic_atom(Element::BR, false, start))
            }
            'C' if self.peek() == Some('l') => {
                self.pos += 1;
                Token::Atom(organic_atom(Element::CL, false, start))
            }
            'B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I' => {
                let element = Element::from_symbol(&ch.to_string())
                    .ok_or(SmilesError::UnexpectedChar { pos: start, ch })?;
                Token::Atom(organic_atom(element, false, start))
            }
            'b' | 'c' | 'n' | 'o' | 'p' | 's' => {
                let element = Element::from_symbol(&ch.to_ascii_uppercase().to_string())
                    .ok_or(SmilesError::UnexpectedChar { pos: start, ch })?;
                Token::Atom(organic_atom(element, true, start))
            }
            ch => return Err(SmilesError::UnexpectedChar { pos: start, ch }),
        };
        Ok(Some(token))
    }

    fn bond(&self, bond: BondToken, pos: usize) -> Token {
        Token::Bond { bond, pos }
    }

    fn digit(&mut self) -> Option<u16> {
        let d = self.peek()?.to_digit(10)?;
        self.pos += 1;
        Some(d as u16)
    }

    fn number(&mut self) -> Result<Option<u16>, SmilesError> {
        let start = self.pos;
        let mut value: Option<u16> = None;
        while let Some(d) = self.digit() {
            value = Some(
                value
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(d))
                    .ok_or(SmilesError::NumberOverflow { pos: start })?,
            );
        }
        Ok(value)
    }

    fn bracket_atom(&mut self, start: usize) -> Result<AtomToken, SmilesError> {
        let isotope = self.number()?.unwrap_or(0);
        let (element, is_aromatic) = self.bracket_element(start)?;

        let mut chirality = ChiralTag::None;
        if self.peek() == Some('@') {
            self.pos += 1;
            chirality = ChiralTag::Ccw;
            if self.peek() == Some('@') {
                self.pos += 1;
                chirality = ChiralTag::Cw;
            }
        }

        let mut hcount = 0u8;
        if self.peek() == Some('H') {
            self.pos += 1;
            hcount = self.digit().map(|d| d as u8).unwrap_or(1);
        }

        let charge = self.charge()?;

        let mut atom_class = 0;
        if self.peek() == Some(':') {
            self.pos += 1;
            atom_class = self
                .number()?
                .ok_or(SmilesError::UnexpectedEnd { pos: self.pos })?;
        }

        match self.bump() {
            Some(']') => Ok(AtomToken {
                element,
                is_aromatic,
                isotope,
                chirality,
                hcount,
                charge,
                atom_class,
                is_bracket: true,
                pos: start,
            }),
            _ => Err(SmilesError::UnclosedBracket { pos: start }),
        }
    }

    fn bracket_element(&mut self, start: usize) -> Result<(Element, bool), SmilesError> {
        let first = self.peek().ok_or(SmilesError::UnclosedBracket { pos: start })?;
        let second = self.peek_at(1);

        if first == '*' {
            self.pos += 1;
            return Ok((Element::DUMMY, false));
        }

        if first.is_ascii_lowercase() {
            for sym in ["se", "as", "te"] {
                let mut it = sym.chars();
                if it.next() == Some(first) && it.next() == second {
                    self.pos += 2;
                    let element = Element::from_symbol(&capitalize(sym))
                        .ok_or(SmilesError::InvalidElement {
                            pos: start,
                            text: sym.to_string(),
                        })?;
                    return Ok((element, true));
                }
            }
            if matches!(first, 'b' | 'c' | 'n' | 'o' | 'p' | 's') {
                self.pos += 1;
                let element = Element::from_symbol(&first.to_ascii_uppercase().to_string())
                    .ok_or(SmilesError::InvalidElement {
                        pos: start,
                        text: first.to_string(),
                    })?;
                return Ok((element, true));
            }
            return Err(SmilesError::InvalidElement {
                pos: self.pos,
                text: first.to_string(),
            });
        }

        if let Some(second) = second.filter(char::is_ascii_lowercase) {
            let sym: String = [first, second].iter().collect();
            if let Some(element) = Element::from_symbol(&sym) {
                self.pos += 2;
                return Ok((element, false));
            }
        }
        if let Some(element) = Element::from_symbol(&first.to_string()) {
            self.pos += 1;
            return Ok((element, false));
        }
        Err(SmilesError::InvalidElement {
            pos: self.pos,
            text: first.to_string(),
        })
    }

    fn charge(&mut self) -> Result<i8, SmilesError> {
        let sign: i8 = match self.peek() {
            Some('+') => 1,
            Some('-') => -1,
            _ => return Ok(0),
        };
        let start = self.pos;
        let symbol = self.bump();
        if let Some(magnitude) = self.number()? {
            let magnitude =
                i8::try_from(magnitude).map_err(|_| SmilesError::InvalidCharge { pos: start })?;
            return Ok(sign * magnitude);
        }
        let mut count: i8 = 1;
        while self.peek() == symbol {
            self.pos += 1;
            count = count
                .checked_add(1)
                .ok_or(SmilesError::InvalidCharge { pos: start })?;
        }
        Ok(sign * count)
    }
}

fn organic_atom(element: Element, is_aromatic: bool, pos: usize) -> AtomToken {
    AtomToken {
        element,
        is_aromatic,
        isotope: 0,
        chirality: ChiralTag::None,
        hcount: 0,
        charge: 0,
        atom_class: 0,
        is_bracket: false,
        pos,
    }
}

fn capitalize(sym: &str) -> String {
    let mut chars = sym.chars();
    match chars.next() {
        Some(c) => c.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
