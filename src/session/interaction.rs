use crate::math::{Point2, Vector2};

/// The gesture mode armed on the map surface.
///
/// Exactly one mode is armed at a time; switching is a radio-style
/// exclusive choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// No gesture armed.
    #[default]
    Inert,
    /// Dragging moves the whole feature rigidly.
    Translate,
    /// Per-vertex dragging with mid-segment insert.
    ModifyWithInsert,
}

/// Rigid-body drag over the whole feature.
///
/// The table is left stale while the drag is in flight: ordinals cannot
/// change under translation, so a single refresh at drag-end suffices.
#[derive(Debug, Default)]
pub struct TranslateInteraction {
    active: bool,
    drag_origin: Option<Point2>,
}

impl TranslateInteraction {
    /// Arms or disarms the interaction. Disarming drops any in-flight
    /// drag.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.drag_origin = None;
        }
    }

    /// Whether the interaction is currently armed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Starts a drag at `origin`.
    pub fn begin(&mut self, origin: Point2) {
        self.drag_origin = Some(origin);
    }

    /// Ends the drag at `dest`, yielding the uniform displacement.
    /// Returns `None` when no drag was in flight.
    pub fn end(&mut self, dest: Point2) -> Option<Vector2> {
        let origin = self.drag_origin.take()?;
        Some(dest - origin)
    }
}

/// Whether the gesture provider may delete vertices.
///
/// Vertex removal is only reachable through the table's delete path, so
/// the modify interaction is always built with `Never`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteCondition {
    Never,
}

/// Per-vertex drag with mid-segment insert.
#[derive(Debug)]
pub struct ModifyInteraction {
    active: bool,
    delete_condition: DeleteCondition,
    drag_row: Option<usize>,
}

impl ModifyInteraction {
    /// Creates the interaction with vertex deletion suppressed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: false,
            delete_condition: DeleteCondition::Never,
            drag_row: None,
        }
    }

    /// Arms or disarms the interaction. Disarming drops any in-flight
    /// drag.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.drag_row = None;
        }
    }

    /// Whether the interaction is currently armed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The deletion policy this interaction was built with.
    #[must_use]
    pub fn delete_condition(&self) -> DeleteCondition {
        self.delete_condition
    }

    /// Records the row being dragged.
    pub fn begin_drag(&mut self, row: usize) {
        self.drag_row = Some(row);
    }

    /// Takes the row of the in-flight drag, ending it.
    pub fn take_drag(&mut self) -> Option<usize> {
        self.drag_row.take()
    }
}

impl Default for ModifyInteraction {
    fn default() -> Self {
        Self::new()
    }
}

/// The three mutually exclusive gesture modes layered on the map.
///
/// Interaction objects are built lazily on first arm and reused for the
/// rest of the controller's life; arming a mode always disarms the
/// previous one first, so two are never armed at once.
#[derive(Debug, Default)]
pub struct SpatialInteractionSet {
    mode: InteractionMode,
    translate: Option<TranslateInteraction>,
    modify: Option<ModifyInteraction>,
}

impl SpatialInteractionSet {
    /// The currently armed mode.
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Arms `mode`, deactivating whichever interaction was armed.
    pub fn arm(&mut self, mode: InteractionMode) {
        self.disarm_current();
        match mode {
            InteractionMode::Inert => {}
            InteractionMode::Translate => {
                self.translate
                    .get_or_insert_with(TranslateInteraction::default)
                    .set_active(true);
            }
            InteractionMode::ModifyWithInsert => {
                self.modify
                    .get_or_insert_with(ModifyInteraction::new)
                    .set_active(true);
            }
        }
        self.mode = mode;
    }

    fn disarm_current(&mut self) {
        match self.mode {
            InteractionMode::Inert => {}
            InteractionMode::Translate => {
                if let Some(translate) = self.translate.as_mut() {
                    translate.set_active(false);
                }
            }
            InteractionMode::ModifyWithInsert => {
                if let Some(modify) = self.modify.as_mut() {
                    modify.set_active(false);
                }
            }
        }
    }

    /// The translate interaction, when armed.
    pub fn translate_mut(&mut self) -> Option<&mut TranslateInteraction> {
        if self.mode == InteractionMode::Translate {
            self.translate.as_mut()
        } else {
            None
        }
    }

    /// The modify interaction, when armed.
    pub fn modify_mut(&mut self) -> Option<&mut ModifyInteraction> {
        if self.mode == InteractionMode::ModifyWithInsert {
            self.modify.as_mut()
        } else {
            None
        }
    }

    /// Whether the translate interaction has been built.
    #[must_use]
    pub fn has_translate(&self) -> bool {
        self.translate.is_some()
    }

    /// Whether the modify interaction has been built.
    #[must_use]
    pub fn has_modify(&self) -> bool {
        self.modify.is_some()
    }
}
