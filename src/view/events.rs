use std::fmt;

/// Outcome of sanitizing the molecule for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SanitizeStatus {
    Sanitizable,
    /// Sanitization failed; the drawing uses a leniently cached copy.
    Unsanitizable,
    /// Even the lenient property cache update failed.
    CacheFailed,
}

impl fmt::Display for SanitizeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sanitizable => "Sanitizable",
            Self::Unsanitizable => "UNSANITIZABLE",
            Self::CacheFailed => "UpdatePropertyCache FAIL",
        })
    }
}

/// Notifications a [`MolView`](super::MolView) sends to its listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewEvent {
    MoleculeChanged,
    SelectionChanged,
    SanitizeStatus(SanitizeStatus),
    DrawingFinished,
}

/// Receives [`ViewEvent`]s. Implemented for every `FnMut(&ViewEvent)`.
pub trait ViewListener {
    fn on_event(&mut self, event: &ViewEvent);
}

impl<F: FnMut(&ViewEvent)> ViewListener for F {
    fn on_event(&mut self, event: &ViewEvent) {
        self(event)
    }
}

/// Handle returned by [`MolView::subscribe`](super::MolView::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Box<dyn ViewListener>)>,
}

impl Listeners {
    pub fn subscribe(&mut self, listener: Box<dyn ViewListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(other, _)| *other != id);
        self.entries.len() != before
    }

    /// Delivers `event` to every listener in subscription order.
    pub fn notify(&mut self, event: &ViewEvent) {
        for (_, listener) in &mut self.entries {
            listener.on_event(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// What changed, and therefore how much of the view must be rebuilt.
///
/// A new molecule is sanitized, prepared and laid out again before it is
/// redrawn. A new selection is only redrawn; the prepared molecule is
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    Molecule,
    Selection,
}

impl Invalidation {
    pub fn event(self) -> ViewEvent {
        match self {
            Self::Molecule => ViewEvent::MoleculeChanged,
            Self::Selection => ViewEvent::SelectionChanged,
        }
    }

    pub fn needs_prepare(self) -> bool {
        matches!(self, Self::Molecule)
    }
}
