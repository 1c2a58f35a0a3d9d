//! Turning a molecule into a picture: preparation, stereo wedges and the
//! SVG drawer.

mod labels;
mod options;
mod prepare;
mod svg;
mod wedges;

pub use options::{DrawOptions, Rgb};
pub use prepare::{prepare_for_drawing, PrepareError, PrepareOptions};
pub use svg::SvgDrawer;
pub use wedges::assign_wedges;
