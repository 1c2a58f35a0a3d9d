use thiserror::Error;

use crate::aromaticity::set_aromaticity;
use crate::atom::Atom;
use crate::bond::Bond;
use crate::chirality::cleanup_chirality;
use crate::kekulize::{clear_aromatic_flags, kekulize, KekulizeError};
use crate::mol::Mol;
use crate::valence::{update_property_cache, PropertyCacheError};

/// The sanitization step that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error("property cache: {0}")]
    PropertyCache(#[from] PropertyCacheError),
    #[error("kekulize: {0}")]
    Kekulize(#[from] KekulizeError),
}

/// Brings a freshly parsed molecule into a consistent state.
///
/// Steps, in order: strict property cache, kekulization, aromaticity
/// perception (written aromaticity is discarded and perceived again),
/// chirality cleanup and a final strict property cache. The molecule may be
/// partially modified when an error is returned.
pub fn sanitize(mol: &mut Mol<Atom, Bond>) -> Result<(), SanitizeError> {
    update_property_cache(mol, true)?;
    kekulize(mol)?;
    clear_aromatic_flags(mol);
    set_aromaticity(mol);
    cleanup_chirality(mol);
    update_property_cache(mol, true)?;
    Ok(())
}
