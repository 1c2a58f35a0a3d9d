pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod chirality;
pub mod config;
pub mod conformer;
pub mod depict;
pub mod draw;
pub mod element;
pub mod kekulize;
pub mod logger;
pub mod mol;
pub mod rings;
pub mod sanitize;
pub mod smiles;
pub mod traits;
pub mod valence;
pub mod view;

pub use atom::{Atom, ChiralTag};
pub use bond::{Bond, BondDir, BondOrder, Wedge, WedgeKind};
pub use chirality::{assign_cip, find_chiral_centers, CipLabel};
pub use config::{ConfigError, ViewConfig};
pub use conformer::Conformer;
pub use depict::compute_2d_coords;
pub use draw::{assign_wedges, prepare_for_drawing, DrawOptions, PrepareError, PrepareOptions, Rgb, SvgDrawer};
pub use element::Element;
pub use kekulize::{kekulize, KekulizeError};
pub use logger::ViewLogger;
pub use mol::{Mol, Molecule, StereoRef};
pub use rings::RingInfo;
pub use sanitize::{sanitize, SanitizeError};
pub use smiles::{from_smiles, parse_smiles, SmilesError};
pub use traits::{HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};
pub use valence::{update_property_cache, PropertyCacheError};
pub use view::{
    DisplaySurface, Invalidation, ListenerId, MolView, MolViewBuilder, SanitizeStatus, ViewError,
    ViewEvent, ViewListener,
};

#[cfg(test)]
mod tests;
