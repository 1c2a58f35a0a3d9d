//! The molecule view: a molecule, a selection and the SVG picture of both.
//!
//! ```
//! use std::sync::Arc;
//! use molview::{Molecule, MolView};
//!
//! let mol = Arc::new(Molecule::from_smiles("CCN(C)c1ccccc1S").unwrap());
//! let mut view = MolView::new(Some(mol));
//! view.select_atom(1);
//! view.set_selected_atoms(vec![1, 2, 3]).unwrap();
//! assert_eq!(view.selected_atoms(), &[1, 2, 3]);
//! assert!(view.svg().contains("<svg "));
//! ```

mod error;
mod events;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use log::LevelFilter;
use petgraph::graph::NodeIndex;

use crate::chirality::find_chiral_centers;
use crate::config::ViewConfig;
use crate::depict::compute_2d_coords;
use crate::draw::{assign_wedges, prepare_for_drawing, PrepareError, PrepareOptions, SvgDrawer};
use crate::kekulize::kekulize;
use crate::logger::ViewLogger;
use crate::mol::Molecule;
use crate::sanitize::sanitize;
use crate::valence::update_property_cache;

pub use error::ViewError;
pub use events::{Invalidation, ListenerId, SanitizeStatus, ViewEvent, ViewListener};

use events::Listeners;

/// Whatever shows the rendered markup, e.g. an image widget of a host UI.
pub trait DisplaySurface {
    fn load_svg(&mut self, svg: &str);
}

/// Headless molecule view.
///
/// Replacing the molecule sanitizes, prepares and lays out a private copy
/// for drawing and redraws; changing the selection only redraws. Every
/// change is announced to the listeners before the view reacts to it.
pub struct MolView {
    mol: Arc<Molecule>,
    previous: Option<Molecule>,
    draw_mol: Option<Arc<Molecule>>,
    selected: Vec<usize>,
    svg: String,
    logger: ViewLogger,
    config: ViewConfig,
    listeners: Listeners,
    surface: Option<Box<dyn DisplaySurface>>,
}

impl MolView {
    /// A view with default configuration. `None` shows an empty molecule.
    pub fn new(mol: Option<Arc<Molecule>>) -> Self {
        Self::builder().molecule(mol).build()
    }

    pub fn builder() -> MolViewBuilder {
        MolViewBuilder::default()
    }

    pub fn molecule(&self) -> &Arc<Molecule> {
        &self.mol
    }

    /// Copy of the molecule that was replaced last.
    pub fn previous_molecule(&self) -> Option<&Molecule> {
        self.previous.as_ref()
    }

    /// The prepared copy that is actually drawn.
    pub fn draw_molecule(&self) -> Option<&Arc<Molecule>> {
        self.draw_mol.as_ref()
    }

    pub fn selected_atoms(&self) -> &[usize] {
        &self.selected
    }

    /// Markup of the latest redraw.
    pub fn svg(&self) -> &str {
        &self.svg
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn log_level(&self) -> LevelFilter {
        self.logger.level()
    }

    pub fn set_log_level(&mut self, level: LevelFilter) {
        self.logger.set_level(level);
    }

    pub fn subscribe<L: ViewListener + 'static>(&mut self, listener: L) -> ListenerId {
        self.listeners.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Installs the surface and shows the current picture on it.
    pub fn set_display_surface(&mut self, mut surface: Box<dyn DisplaySurface>) {
        surface.load_svg(&self.svg);
        self.surface = Some(surface);
    }

    /// Replaces the molecule. `None` substitutes a fresh empty molecule.
    /// Setting the handle that is already shown does nothing.
    pub fn set_molecule(&mut self, mol: Option<Arc<Molecule>>) {
        let mol = mol.unwrap_or_else(|| Arc::new(Molecule::new()));
        if Arc::ptr_eq(&mol, &self.mol) {
            return;
        }
        self.previous = Some(Molecule::clone(&self.mol));
        self.mol = mol;
        self.invalidate(Invalidation::Molecule);
    }

    /// Makes `atom` the only selected atom.
    pub fn select_atom(&mut self, atom: usize) {
        self.selected = vec![atom];
        self.invalidate(Invalidation::Selection);
    }

    pub fn add_to_selection(&mut self, atom: usize) {
        if !self.selected.contains(&atom) {
            self.selected.push(atom);
            self.invalidate(Invalidation::Selection);
        }
    }

    pub fn remove_from_selection(&mut self, atom: usize) -> Result<(), ViewError> {
        let pos = self
            .selected
            .iter()
            .position(|&a| a == atom)
            .ok_or(ViewError::NotSelected(atom))?;
        self.selected.remove(pos);
        self.invalidate(Invalidation::Selection);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.invalidate(Invalidation::Selection);
        }
    }

    /// Replaces the whole selection; the last atom counts as the most
    /// recently selected one.
    pub fn set_selected_atoms(&mut self, atoms: Vec<usize>) -> Result<(), ViewError> {
        let mut seen = HashSet::new();
        if let Some(&dup) = atoms.iter().find(|&&a| !seen.insert(a)) {
            return Err(ViewError::DuplicateAtom(dup));
        }
        if atoms != self.selected {
            self.selected = atoms;
            self.invalidate(Invalidation::Selection);
        }
        Ok(())
    }

    /// [`set_selected_atoms`](Self::set_selected_atoms) for dynamically
    /// typed callers: `value` must be a JSON array of non-negative integers.
    pub fn set_selected_atoms_value(&mut self, value: &serde_json::Value) -> Result<(), ViewError> {
        let items = value
            .as_array()
            .ok_or_else(|| ViewError::SelectionType(value.to_string()))?;
        let atoms = items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|a| usize::try_from(a).ok())
                    .ok_or_else(|| ViewError::SelectionType(item.to_string()))
            })
            .collect::<Result<Vec<usize>, _>>()?;
        self.set_selected_atoms(atoms)
    }

    /// Announces the change, then rebuilds what it invalidates.
    fn invalidate(&mut self, what: Invalidation) {
        self.listeners.notify(&what.event());
        if what.needs_prepare() {
            self.sanitize_and_prepare();
        }
        self.redraw();
    }

    fn emit(&mut self, event: ViewEvent) {
        self.listeners.notify(&event);
    }

    /// Rebuilds the draw molecule from the current molecule.
    ///
    /// Chemistry failures are logged and reported as
    /// [`ViewEvent::SanitizeStatus`]; the view always ends up with a draw
    /// molecule.
    pub fn sanitize_and_prepare(&mut self) {
        let mut draw = Molecule::clone(&self.mol);
        match sanitize(&mut draw) {
            Ok(()) => self.emit(ViewEvent::SanitizeStatus(SanitizeStatus::Sanitizable)),
            Err(err) => {
                self.emit(ViewEvent::SanitizeStatus(SanitizeStatus::Unsanitizable));
                self.logger.warn(format_args!("unsanitizable molecule: {err}"));
                if let Err(err) = update_property_cache(&mut draw, false) {
                    self.emit(ViewEvent::SanitizeStatus(SanitizeStatus::CacheFailed));
                    self.logger.error(format_args!("property cache update failed: {err}"));
                }
            }
        }

        if self.config.kekulize {
            if let Err(err) = kekulize(&mut draw) {
                self.logger.warn(format_args!("unkekulizable molecule: {err}"));
            }
        }

        // Layout and wedges run once below, after prepare.
        let options = PrepareOptions {
            kekulize: self.config.kekulize,
            layout: false,
            wedge_bonds: false,
        };
        let mut prepared = match prepare_for_drawing(&draw, options) {
            Ok(prepared) => prepared,
            Err(PrepareError::Kekulize(err)) => {
                self.logger
                    .debug(format_args!("preparing without kekulization: {err}"));
                let options = PrepareOptions {
                    kekulize: false,
                    ..options
                };
                match prepare_for_drawing(&draw, options) {
                    Ok(prepared) => prepared,
                    Err(err) => {
                        self.logger.warn(format_args!("prepare for drawing failed: {err}"));
                        draw
                    }
                }
            }
            Err(err) => {
                self.logger.warn(format_args!("prepare for drawing failed: {err}"));
                draw
            }
        };

        match prepared.num_conformers() {
            0 => self
                .logger
                .debug(format_args!("no conformers found, computing 2D coords")),
            n => self.logger.debug(format_args!("{n} conformers in molecule")),
        }
        // Layouts are always regenerated; earlier ones are not reused.
        compute_2d_coords(&mut prepared);
        assign_wedges(&mut prepared);
        self.draw_mol = Some(Arc::new(prepared));
    }

    /// Renders the draw molecule with chirality labels and the selection.
    pub fn render_to_image(&mut self) -> String {
        let mut drawer = SvgDrawer::with_options(
            self.config.width,
            self.config.height,
            self.config.draw_options(),
        );
        if let Some(draw) = self.draw_mol.clone() {
            if self.config.annotate_chirality {
                for (idx, label) in find_chiral_centers(&draw) {
                    let symbol = draw.atom(NodeIndex::new(idx)).symbol();
                    drawer
                        .options_mut()
                        .atom_labels
                        .insert(idx, format!("{symbol}:{label}"));
                }
            }
            let out_of_range: Vec<usize> = self
                .selected
                .iter()
                .copied()
                .filter(|&a| a >= draw.atom_count())
                .collect();
            if !out_of_range.is_empty() {
                self.logger.warn(format_args!(
                    "selected atoms {out_of_range:?} do not exist in a molecule of {} atoms",
                    draw.atom_count()
                ));
            }
            let mut colors = HashMap::new();
            if let Some(&last) = self.selected.last() {
                colors.insert(last, self.config.last_selected_color);
            }
            drawer.draw_molecule(&draw, &self.selected, &colors);
        }
        drawer.finish_drawing();
        self.emit(ViewEvent::DrawingFinished);

        let svg = drawer.drawing_text();
        if self.config.strip_svg_prefix {
            strip_namespace_prefix(&svg)
        } else {
            svg
        }
    }

    /// Renders and pushes the markup to the display surface.
    pub fn redraw(&mut self) {
        let svg = self.render_to_image();
        if let Some(surface) = &mut self.surface {
            surface.load_svg(&svg);
        }
        self.svg = svg;
    }
}

impl fmt::Debug for MolView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MolView")
            .field("mol", &self.mol)
            .field("selected", &self.selected)
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .field("surface", &self.surface.is_some())
            .finish()
    }
}

/// Removes the `svg:` element prefix from drawer output.
pub fn strip_namespace_prefix(svg: &str) -> String {
    svg.replace("</svg:", "</").replace("<svg:", "<")
}

#[derive(Default)]
pub struct MolViewBuilder {
    mol: Option<Arc<Molecule>>,
    config: Option<ViewConfig>,
    logger: Option<ViewLogger>,
    surface: Option<Box<dyn DisplaySurface>>,
    listeners: Vec<Box<dyn ViewListener>>,
}

impl MolViewBuilder {
    pub fn molecule(mut self, mol: Option<Arc<Molecule>>) -> Self {
        self.mol = mol;
        self
    }

    pub fn config(mut self, config: ViewConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Defaults to target `molview` at the configured level.
    pub fn logger(mut self, logger: ViewLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn surface(mut self, surface: Box<dyn DisplaySurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Subscribes before the first molecule is set, so the listener also
    /// sees the events of construction.
    pub fn listener<L: ViewListener + 'static>(mut self, listener: L) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn build(self) -> MolView {
        let config = self.config.unwrap_or_default();
        let logger = self
            .logger
            .unwrap_or_else(|| ViewLogger::new("molview", config.log_level));
        let mut listeners = Listeners::default();
        for listener in self.listeners {
            listeners.subscribe(listener);
        }
        let mut view = MolView {
            mol: self.mol.unwrap_or_else(|| Arc::new(Molecule::new())),
            previous: None,
            draw_mol: None,
            selected: Vec::new(),
            svg: String::new(),
            logger,
            config,
            listeners,
            surface: self.surface,
        };
        view.invalidate(Invalidation::Molecule);
        view
    }
}
