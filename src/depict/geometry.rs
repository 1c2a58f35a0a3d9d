use std::f64::consts::{PI, TAU};

use nalgebra::{Matrix2, Rotation2, Vector2};

pub(crate) type Point = Vector2<f64>;

pub(crate) fn direction(angle: f64) -> Point {
    Point::new(angle.cos(), angle.sin())
}

pub(crate) fn angle_of(v: &Point) -> f64 {
    v.y.atan2(v.x)
}

fn normalize_angle(a: f64) -> f64 {
    a.rem_euclid(TAU)
}

/// Widest empty sector between the given bond directions, as
/// `(start angle, width)`.
pub(crate) fn largest_gap(angles: &[f64]) -> (f64, f64) {
    let mut sorted: Vec<f64> = angles.iter().map(|&a| normalize_angle(a)).collect();
    sorted.sort_by(f64::total_cmp);
    let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) else {
        return (0.0, TAU);
    };
    let mut best = (last, first + TAU - last);
    for w in sorted.windows(2) {
        let width = w[1] - w[0];
        if width > best.1 + 1e-9 {
            best = (w[0], width);
        }
    }
    best
}

/// `count` directions spread evenly inside the largest gap.
pub(crate) fn spread_in_gap(angles: &[f64], count: usize) -> Vec<f64> {
    let (start, width) = largest_gap(angles);
    let step = width / (count + 1) as f64;
    (1..=count).map(|i| start + step * i as f64).collect()
}

/// Vertices of a regular polygon with the given edge length, centred on the
/// origin.
pub(crate) fn regular_polygon(n: usize, edge: f64) -> Vec<Point> {
    let radius = edge / (2.0 * (PI / n as f64).sin());
    let offset = PI / 2.0 + PI / n as f64;
    (0..n)
        .map(|k| direction(offset + TAU * k as f64 / n as f64) * radius)
        .collect()
}

/// `count` points between `from` and `to` on a circular arc made of
/// `count + 1` equal chords of length `edge`, bulging away from
/// `away_from`.
///
/// With `count = n - 2` and `|to - from| = edge` this is the rest of a
/// regular n-gon built on that edge. If the chords cannot reach, the points
/// fall on the straight segment.
pub(crate) fn arc_points(from: Point, to: Point, count: usize, edge: f64, away_from: Point) -> Vec<Point> {
    if count == 0 {
        return Vec::new();
    }
    let segments = (count + 1) as f64;
    let chord = to - from;
    let c = chord.norm();
    let ratio = c / edge;
    if c < 1e-9 || ratio >= segments * 0.999 {
        return (1..=count)
            .map(|i| from + chord * (i as f64 / segments))
            .collect();
    }

    // sin(a) / sin(a / segments) falls monotonically from `segments` to 0
    // on (0, pi).
    let f = |a: f64| a.sin() / (a / segments).sin();
    let (mut lo, mut hi) = (1e-9, PI - 1e-9);
    for _ in 0..80 {
        let mid = 0.5 * (lo + hi);
        if f(mid) > ratio {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let half = 0.5 * (lo + hi);
    let radius = edge / (2.0 * (half / segments).sin());

    let mid = (from + to) * 0.5;
    let unit = chord / c;
    let mut normal = Point::new(-unit.y, unit.x);
    if (mid - away_from).dot(&normal) < 0.0 {
        normal = -normal;
    }
    let center = mid - normal * (radius * half.cos());

    // The middle of the arc sits at `center + normal * radius`.
    let start = angle_of(&(from - center));
    let forward = (direction(start + half) - normal).norm();
    let backward = (direction(start - half) - normal).norm();
    let sign = if forward <= backward { 1.0 } else { -1.0 };
    let step = sign * 2.0 * half / segments;
    (1..=count)
        .map(|i| center + direction(start + step * i as f64) * radius)
        .collect()
}

pub(crate) fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::zeros();
    }
    points.iter().sum::<Point>() / points.len() as f64
}

/// Rotation that brings the principal axis of the point cloud onto x.
pub(crate) fn principal_axis_rotation(points: &[Point]) -> Rotation2<f64> {
    if points.len() < 2 {
        return Rotation2::identity();
    }
    let c = centroid(points);
    let cov = points
        .iter()
        .map(|p| {
            let d = p - c;
            d * d.transpose()
        })
        .fold(Matrix2::zeros(), |acc, m| acc + m);
    let eig = cov.symmetric_eigen();
    let major = if eig.eigenvalues[0] >= eig.eigenvalues[1] { 0 } else { 1 };
    let axis = eig.eigenvectors.column(major).into_owned();
    if axis.norm() < 1e-12 {
        return Rotation2::identity();
    }
    Rotation2::new(-angle_of(&axis))
}
