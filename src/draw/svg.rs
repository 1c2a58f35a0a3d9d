use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use nalgebra::Vector2;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder, WedgeKind};
use crate::conformer::Conformer;
use crate::depict::BOND_LENGTH;
use crate::mol::Mol;
use crate::rings::RingInfo;

use super::labels::{default_label, Segment};
use super::options::{DrawOptions, Rgb};

type Point = Vector2<f64>;

/// Largest drawn bond as a fraction of the smaller canvas side.
const MAX_BOND_FRACTION: f64 = 0.25;
/// Distance between the lines of a multiple bond, relative to bond length.
const MULTIPLE_BOND_OFFSET: f64 = 0.15;
const HASH_LINES: usize = 6;

/// Renders molecules into an SVG document of a fixed size.
///
/// Drawing happens in three steps: [`draw_molecule`](Self::draw_molecule)
/// (any number of times), [`finish_drawing`](Self::finish_drawing) and
/// [`drawing_text`](Self::drawing_text).
#[derive(Debug, Clone)]
pub struct SvgDrawer {
    width: u32,
    height: u32,
    options: DrawOptions,
    body: String,
    finished: bool,
}

impl SvgDrawer {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_options(width, height, DrawOptions::default())
    }

    pub fn with_options(width: u32, height: u32, options: DrawOptions) -> Self {
        Self {
            width,
            height,
            options,
            body: String::new(),
            finished: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn options(&self) -> &DrawOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut DrawOptions {
        &mut self.options
    }

    /// Draws `mol` using its first conformer, scaled to fit the canvas.
    ///
    /// Atoms in `highlight_atoms` get a filled ellipse underneath, coloured
    /// from `highlight_colors` or the default highlight colour; bonds
    /// between two highlighted atoms are highlighted as well. Indices past
    /// the last atom are ignored. A molecule without coordinates draws
    /// nothing.
    pub fn draw_molecule(
        &mut self,
        mol: &Mol<Atom, Bond>,
        highlight_atoms: &[usize],
        highlight_colors: &HashMap<usize, Rgb>,
    ) {
        let Some(conf) = mol.conformer() else {
            return;
        };
        if mol.is_empty() || conf.len() != mol.atom_count() {
            return;
        }
        let transform = Transform::fit(mol, conf, self.width, self.height, &self.options);
        let points: Vec<Point> = conf
            .positions()
            .iter()
            .map(|&p| transform.apply(p))
            .collect();
        let labels: Vec<Option<Vec<Segment>>> = mol
            .atoms()
            .map(|idx| match self.options.atom_labels.get(&idx.index()) {
                Some(text) => Some(vec![Segment::Normal(text.clone())]),
                None => default_label(mol, idx),
            })
            .collect();
        let highlighted: HashSet<usize> = highlight_atoms
            .iter()
            .copied()
            .filter(|&i| i < mol.atom_count())
            .collect();

        let mut painter = Painter {
            prefix: if self.options.prefixed_elements { "svg:" } else { "" },
            out: String::new(),
            line_width: self.options.bond_line_width,
        };
        let bond_px = transform.bond_px;

        for e in mol.bonds() {
            let Some((a, b)) = mol.bond_endpoints(e) else {
                continue;
            };
            if highlighted.contains(&a.index()) && highlighted.contains(&b.index()) {
                painter.highlight_line(
                    e,
                    points[a.index()],
                    points[b.index()],
                    self.options.highlight_color,
                    bond_px * 0.25,
                );
            }
        }
        // Highlights are drawn in the given order so the last one ends up
        // on top.
        let mut seen = HashSet::new();
        for &i in highlight_atoms {
            if !highlighted.contains(&i) || !seen.insert(i) {
                continue;
            }
            let color = highlight_colors
                .get(&i)
                .copied()
                .unwrap_or(self.options.highlight_color);
            painter.ellipse(i, points[i], bond_px * 0.3, color);
        }

        let ring_info = RingInfo::sssr(mol);
        for e in mol.bonds() {
            let Some((a, b)) = mol.bond_endpoints(e) else {
                continue;
            };
            let geometry = BondGeometry {
                edge: e,
                a,
                b,
                from: trimmed(points[a.index()], points[b.index()], labels[a.index()].is_some(), &self.options),
                to: trimmed(points[b.index()], points[a.index()], labels[b.index()].is_some(), &self.options),
                color_a: atom_color(mol.atom(a)),
                color_b: atom_color(mol.atom(b)),
                inner_side: ring_side(&ring_info, &points, a, b),
                offset: bond_px * MULTIPLE_BOND_OFFSET,
            };
            painter.bond(mol.bond(e), &geometry);
        }

        for idx in mol.atoms() {
            if let Some(segments) = &labels[idx.index()] {
                painter.label(
                    idx.index(),
                    points[idx.index()],
                    segments,
                    atom_color(mol.atom(idx)),
                    self.options.font_size,
                );
            }
        }
        self.body.push_str(&painter.out);
    }

    /// Closes the document.
    pub fn finish_drawing(&mut self) {
        self.finished = true;
    }

    /// The SVG document; without the closing tag until the drawing is
    /// finished.
    pub fn drawing_text(&self) -> String {
        let p = if self.options.prefixed_elements { "svg:" } else { "" };
        let (w, h) = (self.width, self.height);
        let mut svg = String::new();
        svg.push_str("<?xml version='1.0' encoding='iso-8859-1'?>\n");
        let _ = write!(
            svg,
            "<{p}svg version='1.1' baseProfile='full' xmlns='http://www.w3.org/2000/svg'"
        );
        if self.options.prefixed_elements {
            svg.push_str(" xmlns:svg='http://www.w3.org/2000/svg'");
        }
        let _ = writeln!(
            svg,
            " xml:space='preserve' width='{w}px' height='{h}px' viewBox='0 0 {w} {h}'>"
        );
        svg.push_str("<!-- END OF HEADER -->\n");
        let _ = writeln!(
            svg,
            "<{p}rect style='opacity:1.0;fill:{};stroke:none' width='{w}' height='{h}' x='0' y='0'> </{p}rect>",
            self.options.background.to_hex()
        );
        svg.push_str(&self.body);
        if self.finished {
            let _ = writeln!(svg, "</{p}svg>");
        }
        svg
    }
}

/// Maps molecule coordinates (y up) onto the canvas (y down).
struct Transform {
    scale: f64,
    center: Point,
    canvas_center: Point,
    bond_px: f64,
}

impl Transform {
    fn fit(mol: &Mol<Atom, Bond>, conf: &Conformer, width: u32, height: u32, options: &DrawOptions) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        let (lo, hi) = conf.bounds().unwrap_or(([0.0, 0.0], [0.0, 0.0]));
        let margin = options.padding * w.min(h) + options.font_size;
        let range_x = (hi[0] - lo[0]).max(1e-6);
        let range_y = (hi[1] - lo[1]).max(1e-6);

        let lengths: Vec<f64> = mol
            .bonds()
            .filter_map(|e| mol.bond_endpoints(e))
            .map(|(a, b)| conf.distance(a.index(), b.index()))
            .collect();
        let mean_bond = if lengths.is_empty() {
            BOND_LENGTH
        } else {
            (lengths.iter().sum::<f64>() / lengths.len() as f64).max(1e-6)
        };

        let scale = ((w - 2.0 * margin) / range_x)
            .min((h - 2.0 * margin) / range_y)
            .min(MAX_BOND_FRACTION * w.min(h) / mean_bond)
            .max(1e-6);
        Self {
            scale,
            center: Point::new((lo[0] + hi[0]) / 2.0, (lo[1] + hi[1]) / 2.0),
            canvas_center: Point::new(w / 2.0, h / 2.0),
            bond_px: mean_bond * scale,
        }
    }

    fn apply(&self, [x, y]: [f64; 2]) -> Point {
        Point::new(
            self.canvas_center.x + (x - self.center.x) * self.scale,
            self.canvas_center.y - (y - self.center.y) * self.scale,
        )
    }
}

struct BondGeometry {
    edge: EdgeIndex,
    a: NodeIndex,
    b: NodeIndex,
    from: Point,
    to: Point,
    color_a: Rgb,
    color_b: Rgb,
    /// Unit normal towards the ring the bond belongs to.
    inner_side: Option<Point>,
    offset: f64,
}

impl BondGeometry {
    fn class(&self) -> String {
        format!(
            "bond-{} atom-{} atom-{}",
            self.edge.index(),
            self.a.index(),
            self.b.index()
        )
    }

    fn normal(&self) -> Point {
        let d = self.to - self.from;
        let len = d.norm();
        if len < 1e-9 {
            return Point::new(0.0, 1.0);
        }
        Point::new(-d.y, d.x) / len
    }
}

struct Painter {
    prefix: &'static str,
    out: String,
    line_width: f64,
}

impl Painter {
    fn bond(&mut self, bond: &Bond, g: &BondGeometry) {
        if let (BondOrder::Single, Some(wedge)) = (bond.order, bond.wedge) {
            let (narrow, wide) = if wedge.start == g.b {
                (g.to, g.from)
            } else {
                (g.from, g.to)
            };
            let color = if wedge.start == g.b { g.color_b } else { g.color_a };
            match wedge.kind {
                WedgeKind::Wedge => self.wedge(g, narrow, wide, color),
                WedgeKind::Hash => self.hash(g, narrow, wide, color),
            }
            return;
        }

        let class = g.class();
        match bond.order {
            BondOrder::Single => self.two_tone(&class, g.from, g.to, g.color_a, g.color_b, false),
            BondOrder::Double | BondOrder::Aromatic => {
                let dashed = bond.order == BondOrder::Aromatic;
                match g.inner_side {
                    Some(side) => {
                        self.two_tone(&class, g.from, g.to, g.color_a, g.color_b, false);
                        let (s, t) = shortened(g.from + side * g.offset, g.to + side * g.offset);
                        self.two_tone(&class, s, t, g.color_a, g.color_b, dashed);
                    }
                    None => {
                        let n = g.normal() * (g.offset / 2.0);
                        self.two_tone(&class, g.from + n, g.to + n, g.color_a, g.color_b, false);
                        self.two_tone(&class, g.from - n, g.to - n, g.color_a, g.color_b, dashed);
                    }
                }
            }
            BondOrder::Triple => {
                let n = g.normal() * g.offset;
                self.two_tone(&class, g.from, g.to, g.color_a, g.color_b, false);
                self.two_tone(&class, g.from + n, g.to + n, g.color_a, g.color_b, false);
                self.two_tone(&class, g.from - n, g.to - n, g.color_a, g.color_b, false);
            }
        }
    }

    /// A line coloured after each end atom, split in the middle when the
    /// colours differ.
    fn two_tone(&mut self, class: &str, from: Point, to: Point, ca: Rgb, cb: Rgb, dashed: bool) {
        if ca == cb {
            self.line(class, from, to, ca, dashed);
        } else {
            let mid = (from + to) / 2.0;
            self.line(class, from, mid, ca, dashed);
            self.line(class, mid, to, cb, dashed);
        }
    }

    fn line(&mut self, class: &str, from: Point, to: Point, color: Rgb, dashed: bool) {
        let dash = if dashed { ";stroke-dasharray:6,4" } else { "" };
        let _ = writeln!(
            self.out,
            "<{p}path class='{class}' d='M {:.1},{:.1} L {:.1},{:.1}' style='fill:none;fill-rule:evenodd;stroke:{};stroke-width:{:.1}px;stroke-linecap:butt;stroke-linejoin:miter;stroke-opacity:1{dash}' />",
            from.x,
            from.y,
            to.x,
            to.y,
            color.to_hex(),
            self.line_width,
            p = self.prefix,
        );
    }

    fn wedge(&mut self, g: &BondGeometry, narrow: Point, wide: Point, color: Rgb) {
        let n = g.normal() * g.offset;
        let (l, r) = (wide + n, wide - n);
        let hex = color.to_hex();
        let _ = writeln!(
            self.out,
            "<{p}path class='{} wedge' d='M {:.1},{:.1} L {:.1},{:.1} L {:.1},{:.1} Z' style='fill:{hex};fill-rule:evenodd;stroke:{hex};stroke-width:1.0px;stroke-opacity:1' />",
            g.class(),
            narrow.x,
            narrow.y,
            l.x,
            l.y,
            r.x,
            r.y,
            p = self.prefix,
        );
    }

    fn hash(&mut self, g: &BondGeometry, narrow: Point, wide: Point, color: Rgb) {
        let n = g.normal() * g.offset;
        let mut d = String::new();
        for k in 1..=HASH_LINES {
            let t = k as f64 / HASH_LINES as f64;
            let c = narrow + (wide - narrow) * t;
            let (s, e) = (c + n * t, c - n * t);
            let _ = write!(d, "M {:.1},{:.1} L {:.1},{:.1} ", s.x, s.y, e.x, e.y);
        }
        let _ = writeln!(
            self.out,
            "<{p}path class='{} hash' d='{}' style='fill:none;stroke:{};stroke-width:1.0px;stroke-linecap:butt;stroke-opacity:1' />",
            g.class(),
            d.trim_end(),
            color.to_hex(),
            p = self.prefix,
        );
    }

    fn highlight_line(&mut self, e: EdgeIndex, from: Point, to: Point, color: Rgb, width: f64) {
        let _ = writeln!(
            self.out,
            "<{p}path class='bond-{} highlight' d='M {:.1},{:.1} L {:.1},{:.1}' style='fill:none;stroke:{};stroke-width:{:.1}px;stroke-linecap:round;stroke-opacity:1' />",
            e.index(),
            from.x,
            from.y,
            to.x,
            to.y,
            color.to_hex(),
            width,
            p = self.prefix,
        );
    }

    fn ellipse(&mut self, atom: usize, at: Point, radius: f64, color: Rgb) {
        let _ = writeln!(
            self.out,
            "<{p}ellipse class='atom-{atom} highlight' cx='{:.1}' cy='{:.1}' rx='{radius:.1}' ry='{radius:.1}' style='fill:{};fill-rule:evenodd;stroke:none' />",
            at.x,
            at.y,
            color.to_hex(),
            p = self.prefix,
        );
    }

    fn label(&mut self, atom: usize, at: Point, segments: &[Segment], color: Rgb, font_size: f64) {
        let p = self.prefix;
        let mut text = String::new();
        for segment in segments {
            match segment {
                Segment::Normal(t) => text.push_str(&escape_xml(t)),
                Segment::Sub(t) => {
                    let _ = write!(
                        text,
                        "<{p}tspan baseline-shift='sub' font-size='70%'>{}</{p}tspan>",
                        escape_xml(t)
                    );
                }
                Segment::Sup(t) => {
                    let _ = write!(
                        text,
                        "<{p}tspan baseline-shift='super' font-size='70%'>{}</{p}tspan>",
                        escape_xml(t)
                    );
                }
            }
        }
        let _ = writeln!(
            self.out,
            "<{p}text class='atom-{atom}' x='{:.1}' y='{:.1}' text-anchor='middle' dominant-baseline='central' font-family='sans-serif' font-size='{font_size:.0}px' fill='{}'>{text}</{p}text>",
            at.x,
            at.y,
            color.to_hex(),
        );
    }
}

/// Moves `from` towards `to` to leave room for a label at `from`.
fn trimmed(from: Point, to: Point, labelled: bool, options: &DrawOptions) -> Point {
    if !labelled {
        return from;
    }
    let d = to - from;
    let len = d.norm();
    if len < 1e-9 {
        return from;
    }
    let clearance = (options.font_size * 0.6).min(len * 0.4);
    from + d * (clearance / len)
}

/// Both ends pulled in by 15% for the inner line of a ring bond.
fn shortened(from: Point, to: Point) -> (Point, Point) {
    let d = (to - from) * 0.15;
    (from + d, to - d)
}

/// Unit normal of the bond pointing into its smallest ring, if any.
fn ring_side(ring_info: &RingInfo, points: &[Point], a: NodeIndex, b: NodeIndex) -> Option<Point> {
    let ring = ring_info.smallest_bond_ring(a, b)?;
    let center = ring.iter().map(|i| points[i.index()]).sum::<Point>() / ring.len() as f64;
    let (pa, pb) = (points[a.index()], points[b.index()]);
    let d = pb - pa;
    let len = d.norm();
    if len < 1e-9 {
        return None;
    }
    let n = Point::new(-d.y, d.x) / len;
    let mid = (pa + pb) / 2.0;
    Some(if (center - mid).dot(&n) >= 0.0 { n } else { -n })
}

fn atom_color(atom: &Atom) -> Rgb {
    atom.element()
        .map(|e| Rgb::from(e.color()))
        .unwrap_or(Rgb::BLACK)
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::prepare::{prepare_for_drawing, PrepareOptions};
    use crate::smiles::from_smiles;

    fn prepared(smiles: &str) -> Mol<Atom, Bond> {
        prepare_for_drawing(&from_smiles(smiles).unwrap(), PrepareOptions::default()).unwrap()
    }

    fn render(mol: &Mol<Atom, Bond>, highlights: &[usize], colors: &HashMap<usize, Rgb>) -> String {
        let mut drawer = SvgDrawer::new(300, 300);
        drawer.draw_molecule(mol, highlights, colors);
        drawer.finish_drawing();
        drawer.drawing_text()
    }

    #[test]
    fn empty_drawing_has_frame() {
        let mut drawer = SvgDrawer::new(300, 300);
        assert!(!drawer.drawing_text().contains("</svg:svg>"));
        drawer.finish_drawing();
        let svg = drawer.drawing_text();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("<svg:svg "));
        assert!(svg.contains("width='300px' height='300px' viewBox='0 0 300 300'"));
        assert!(svg.contains("<svg:rect style='opacity:1.0;fill:#FFFFFF"));
        assert!(svg.ends_with("</svg:svg>\n"));
        assert!(!svg.contains("<svg:path"));
    }

    #[test]
    fn bonds_and_heteroatom_labels() {
        let svg = render(&prepared("CCO"), &[], &HashMap::new());
        assert!(svg.contains("class='bond-0 atom-0 atom-1'"));
        assert!(svg.contains("class='bond-1 atom-1 atom-2'"));
        assert!(svg.contains(">OH</svg:text>"));
        assert!(!svg.contains("<svg:ellipse"));
    }

    #[test]
    fn multiple_bonds_have_several_lines() {
        let svg = render(&prepared("C=C"), &[], &HashMap::new());
        assert_eq!(svg.matches("class='bond-0 ").count(), 2);
        let svg = render(&prepared("CC#C"), &[], &HashMap::new());
        assert_eq!(svg.matches("class='bond-1 ").count(), 3);
    }

    #[test]
    fn custom_labels_replace_defaults() {
        let mut drawer = SvgDrawer::new(300, 300);
        drawer.options_mut().atom_labels.insert(1, "C:S".to_string());
        drawer.options_mut().atom_labels.insert(2, "a<b".to_string());
        drawer.draw_molecule(&prepared("CCO"), &[], &HashMap::new());
        let svg = drawer.drawing_text();
        assert!(svg.contains(">C:S</svg:text>"));
        assert!(svg.contains(">a&lt;b</svg:text>"));
        assert!(!svg.contains(">OH<"));
    }

    #[test]
    fn highlights_use_given_colours() {
        let mol = prepared("CCN(C)c1ccccc1S");
        let colors = HashMap::from([(3, Rgb(1.0, 0.2, 0.2))]);
        let svg = render(&mol, &[1, 2, 3], &colors);
        assert_eq!(svg.matches("<svg:ellipse").count(), 3);
        assert_eq!(svg.matches("#FF3333").count(), 1);
        assert_eq!(svg.matches("#FF8080").count(), 4);
        let last = svg.rfind("<svg:ellipse").unwrap();
        assert!(svg[last..].starts_with("<svg:ellipse class='atom-3 highlight'"));
    }

    #[test]
    fn out_of_range_highlights_are_ignored() {
        let svg = render(&prepared("CCO"), &[1, 99], &HashMap::new());
        assert_eq!(svg.matches("<svg:ellipse").count(), 1);
    }

    #[test]
    fn wedge_is_drawn_for_stereocentre() {
        let svg = render(&prepared("F[C@H](Cl)Br"), &[], &HashMap::new());
        assert!(svg.contains(" wedge'") || svg.contains(" hash'"));
    }

    #[test]
    fn unprefixed_output() {
        let mut drawer = SvgDrawer::new(200, 100);
        drawer.options_mut().prefixed_elements = false;
        drawer.draw_molecule(&prepared("CO"), &[], &HashMap::new());
        drawer.finish_drawing();
        let svg = drawer.drawing_text();
        assert!(!svg.contains("svg:"));
        assert!(svg.contains("<svg version='1.1'"));
        assert!(svg.contains("viewBox='0 0 200 100'"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn drawing_stays_on_canvas() {
        let mol = prepared("CCCCCCCCCCCCCCCCCCCC");
        let conf = mol.conformer().unwrap();
        let options = DrawOptions::default();
        let t = Transform::fit(&mol, conf, 300, 300, &options);
        for &p in conf.positions() {
            let q = t.apply(p);
            assert!((0.0..=300.0).contains(&q.x));
            assert!((0.0..=300.0).contains(&q.y));
        }
    }

    #[test]
    fn molecule_without_coordinates_draws_nothing() {
        let mol = from_smiles("CCO").unwrap();
        let svg = render(&mol, &[0], &HashMap::new());
        assert!(!svg.contains("<svg:path"));
        assert!(!svg.contains("<svg:ellipse"));
    }
}
