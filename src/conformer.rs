//! 2D coordinate sets attached to a molecule.

/// One 2D position per atom, indexed like the molecule's atoms.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Conformer {
    positions: Vec<[f64; 2]>,
}

impl Conformer {
    pub fn new(positions: Vec<[f64; 2]>) -> Self {
        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, i: usize) -> [f64; 2] {
        self.positions[i]
    }

    pub fn set_position(&mut self, i: usize, pos: [f64; 2]) {
        self.positions[i] = pos;
    }

    pub fn positions(&self) -> &[[f64; 2]] {
        &self.positions
    }

    pub fn distance(&self, i: usize, j: usize) -> f64 {
        let [xi, yi] = self.positions[i];
        let [xj, yj] = self.positions[j];
        ((xi - xj).powi(2) + (yi - yj).powi(2)).sqrt()
    }

    /// Mean position; the origin for an empty conformer.
    pub fn centroid(&self) -> [f64; 2] {
        if self.positions.is_empty() {
            return [0.0, 0.0];
        }
        let n = self.positions.len() as f64;
        let (sx, sy) = self
            .positions
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
        [sx / n, sy / n]
    }

    /// Axis-aligned bounds as `(min, max)`, `None` when empty.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(lo, hi), p| {
            (
                [lo[0].min(p[0]), lo[1].min(p[1])],
                [hi[0].max(p[0]), hi[1].max(p[1])],
            )
        }))
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.positions {
            p[0] += dx;
            p[1] += dy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_and_bounds() {
        let conf = Conformer::new(vec![[0.0, 0.0], [2.0, 0.0], [1.0, 3.0]]);
        assert_eq!(conf.centroid(), [1.0, 1.0]);
        assert_eq!(conf.bounds(), Some(([0.0, 0.0], [2.0, 3.0])));
    }

    #[test]
    fn empty_conformer() {
        let conf = Conformer::default();
        assert!(conf.is_empty());
        assert_eq!(conf.bounds(), None);
        assert_eq!(conf.centroid(), [0.0, 0.0]);
    }

    #[test]
    fn distance_between_atoms() {
        let conf = Conformer::new(vec![[0.0, 0.0], [3.0, 4.0]]);
        assert!((conf.distance(0, 1) - 5.0).abs() < 1e-12);
    }
}
