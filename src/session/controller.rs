use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::error::{Result, SessionError};
use crate::geometry::{CoordinateRing, Feature, Geometry};
use crate::math::Point2;
use crate::session::interaction::{InteractionMode, SpatialInteractionSet};
use crate::session::table::{trim_coord, FieldEdit, NavDirection, VertexTable};
use crate::view::marker::MarkerOverlay;
use crate::view::surface::RenderSurface;

/// Lifecycle event emitted to the hosting application.
///
/// Dispatch is synchronous and fire-and-forget: events are queued
/// during an operation and drained by the host afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A vertex session opened for the named feature.
    BeginSession { feature: String },
    /// The session committed; `changed` is `false` when no mutation
    /// ever occurred.
    Validate { feature: String, changed: bool },
    /// The session reverted to the original geometry.
    Cancel { feature: String },
}

/// Keyboard input routed to the vertex table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Delete,
}

/// Start of a drag in [`InteractionMode::ModifyWithInsert`], as
/// reported by the gesture provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModifyDragStart {
    /// Coordinate under the pointer when the drag began.
    pub coord: Point2,
    /// `true` when the drag began exactly on an existing vertex.
    pub snapped: bool,
    /// First vertex of the segment the drag began on.
    pub segment_start: Point2,
}

/// One open vertex editing session.
struct Session {
    feature: Feature,
    /// Deep copy of the geometry at load time, for rollback.
    original: Geometry,
    ring: CoordinateRing,
    table: VertexTable,
    changed: bool,
    /// 1-based ordinal mirrored into the jump-to-vertex input on focus.
    jump_ordinal: Option<usize>,
}

impl Session {
    /// Writes the open ring back into the feature geometry, closing
    /// point re-appended, and marks the session changed.
    fn sync_geometry(&mut self) -> Result<()> {
        self.changed = true;
        self.feature.geometry_mut().set_first_ring(self.ring.to_closed())
    }
}

/// Orchestrates one vertex editing session over an injected rendering
/// surface.
///
/// At most one session is open per controller. [`load_feature`] begins
/// it; [`save`] and [`cancel`] terminate it and return the feature,
/// either with the edited ring committed or with the original geometry
/// restored verbatim. Edits arrive from two producers, the table and
/// the spatial gestures, and every mutation runs to completion through
/// this controller before the next one starts.
///
/// [`load_feature`]: VertexSessionController::load_feature
/// [`save`]: VertexSessionController::save
/// [`cancel`]: VertexSessionController::cancel
pub struct VertexSessionController<S: RenderSurface> {
    surface: S,
    interactions: SpatialInteractionSet,
    overlay: Option<MarkerOverlay>,
    session: Option<Session>,
    events: VecDeque<SessionEvent>,
}

impl<S: RenderSurface> VertexSessionController<S> {
    /// Creates a controller bound to `surface`.
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            interactions: SpatialInteractionSet::default(),
            overlay: None,
            session: None,
            events: VecDeque::new(),
        }
    }

    /// Whether a session is currently open.
    #[must_use]
    pub fn session_active(&self) -> bool {
        self.session.is_some()
    }

    /// The injected rendering surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the rendering surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The live vertex table, while a session is open.
    #[must_use]
    pub fn table(&self) -> Option<&VertexTable> {
        self.session.as_ref().map(|s| &s.table)
    }

    /// The live coordinate ring, while a session is open.
    #[must_use]
    pub fn ring(&self) -> Option<&CoordinateRing> {
        self.session.as_ref().map(|s| &s.ring)
    }

    /// Whether any mutation occurred since the session opened.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.changed)
    }

    /// The currently armed gesture mode.
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.interactions.mode()
    }

    /// Current value of the jump-to-vertex input (1-based ordinal).
    #[must_use]
    pub fn jump_ordinal(&self) -> Option<usize> {
        self.session.as_ref().and_then(|s| s.jump_ordinal)
    }

    /// Drains the queued lifecycle events in emission order.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    /// Begins a vertex session for `feature`.
    ///
    /// Captures the original geometry for rollback, opens the editable
    /// ring (first ring of the first part, closing point stripped),
    /// builds table rows `1..=N`, binds the marker layer for the
    /// feature, and emits [`SessionEvent::BeginSession`].
    ///
    /// # Errors
    ///
    /// [`SessionError::SessionActive`] when a session is already open;
    /// a geometry error when the feature has no usable ring.
    pub fn load_feature(&mut self, feature: Feature) -> Result<()> {
        if self.session.is_some() {
            return Err(SessionError::SessionActive.into());
        }

        let original = feature.geometry().clone();
        let ring = CoordinateRing::from_closed(feature.geometry().first_ring()?)?;
        let table = VertexTable::from_ring(&ring);

        self.overlay = Some(MarkerOverlay::attach(&mut self.surface, feature.id()));

        debug!(feature = feature.id(), vertices = table.len(), "vertex session opened");
        self.events.push_back(SessionEvent::BeginSession {
            feature: feature.id().to_string(),
        });

        self.session = Some(Session {
            original,
            ring,
            table,
            changed: false,
            jump_ordinal: None,
            feature,
        });
        Ok(())
    }

    /// Commits the session, returning the feature.
    ///
    /// The committed geometry is whatever the ring currently holds,
    /// closing point re-appended. Emits [`SessionEvent::Validate`] with
    /// the changed flag.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoSession`] when no session is open.
    pub fn save(&mut self) -> Result<Feature> {
        let Some(mut session) = self.session.take() else {
            return Err(SessionError::NoSession.into());
        };
        self.teardown();

        session
            .feature
            .geometry_mut()
            .set_first_ring(session.ring.to_closed())?;

        debug!(
            feature = session.feature.id(),
            changed = session.changed,
            "vertex session committed"
        );
        self.events.push_back(SessionEvent::Validate {
            feature: session.feature.id().to_string(),
            changed: session.changed,
        });
        Ok(session.feature)
    }

    /// Discards the session, restoring the original geometry verbatim,
    /// and returns the feature. Emits [`SessionEvent::Cancel`].
    ///
    /// # Errors
    ///
    /// [`SessionError::NoSession`] when no session is open.
    pub fn cancel(&mut self) -> Result<Feature> {
        let Some(mut session) = self.session.take() else {
            return Err(SessionError::NoSession.into());
        };
        self.teardown();

        session.feature.set_geometry(session.original);

        debug!(feature = session.feature.id(), "vertex session cancelled");
        self.events.push_back(SessionEvent::Cancel {
            feature: session.feature.id().to_string(),
        });
        Ok(session.feature)
    }

    /// Releases the marker overlay's backing layer from the surface.
    ///
    /// For tearing down the hosting editor panel; independent of
    /// [`save`]/[`cancel`], which keep the layer for reuse.
    ///
    /// [`save`]: VertexSessionController::save
    /// [`cancel`]: VertexSessionController::cancel
    pub fn close(&mut self) {
        if let Some(overlay) = self.overlay.take() {
            overlay.detach(&mut self.surface);
        }
    }

    /// Focuses a table row: selects it, shows its marker (recentering
    /// when off-screen), and mirrors the ordinal into the
    /// jump-to-vertex input.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoSession`] or [`SessionError::RowOutOfRange`].
    pub fn select_row(&mut self, index: usize) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(SessionError::NoSession.into());
        };
        let len = session.table.len();
        if session.table.select(index).is_none() {
            return Err(SessionError::RowOutOfRange { index, len }.into());
        }
        self.show_marker(index);
        Ok(())
    }

    /// Commits a single-field coordinate edit on a row.
    ///
    /// Only single-field edits reach the ring through this path;
    /// combined double-field writes (as a gesture drop produces) go
    /// through the gesture path, so the two producers cannot feed back
    /// into each other.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoSession`] or [`SessionError::RowOutOfRange`].
    pub fn edit_row_field(&mut self, index: usize, edit: FieldEdit) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(SessionError::NoSession.into());
        };
        let len = session.table.len();
        let Some(row) = session.table.row(index) else {
            return Err(SessionError::RowOutOfRange { index, len }.into());
        };
        let (x, y) = match edit {
            FieldEdit::X(x) => (x, row.y),
            FieldEdit::Y(y) => (row.x, y),
        };
        session.table.set_row_coord(index, x, y);
        session.ring.set_point(index, Point2::new(x, y));
        session.sync_geometry()?;
        self.show_marker(index);
        Ok(())
    }

    /// Inserts a new vertex at the 1-based position `ordinal`.
    ///
    /// Out-of-range positions clamp to the last valid one. The new
    /// point is the midpoint of the point currently at that position
    /// and the one preceding it, wrapping to the last point when
    /// inserting at the top. The new row is focused.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoSession`], or [`SessionError::RowOutOfRange`]
    /// when the table is empty.
    pub fn add_vertex(&mut self, ordinal: usize) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(SessionError::NoSession.into());
        };
        if session.table.is_empty() {
            return Err(SessionError::RowOutOfRange { index: 0, len: 0 }.into());
        }
        let last = session.table.len() - 1;
        let index = ordinal.saturating_sub(1).min(last);

        let mid = session.ring.midpoint_before(index);
        let (x, y) = (trim_coord(mid.x), trim_coord(mid.y));
        session.table.insert_row(index, x, y);
        session.ring.insert(index, Point2::new(x, y));
        session.sync_geometry()?;

        self.focus_row(index);
        Ok(())
    }

    /// Inserts at the position held by the jump-to-vertex input.
    /// Does nothing when the input is empty.
    ///
    /// # Errors
    ///
    /// Same as [`VertexSessionController::add_vertex`].
    pub fn add_vertex_at_hint(&mut self) -> Result<()> {
        let Some(session) = self.session.as_ref() else {
            return Err(SessionError::NoSession.into());
        };
        match session.jump_ordinal {
            Some(ordinal) => self.add_vertex(ordinal),
            None => Ok(()),
        }
    }

    /// Deletes the row at `index` and its ring entry.
    ///
    /// The selection moves to the row now occupying the same offset, or
    /// to the new last row when the deleted row was last, and that row
    /// is focused.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoSession`] or [`SessionError::RowOutOfRange`].
    pub fn delete_vertex(&mut self, index: usize) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(SessionError::NoSession.into());
        };
        let len = session.table.len();
        if index >= len {
            return Err(SessionError::RowOutOfRange { index, len }.into());
        }

        let next = session.table.remove_row(index);
        session.ring.remove(index);
        session.sync_geometry()?;

        if let Some(next) = next {
            self.focus_row(next);
        }
        Ok(())
    }

    /// Routes keyboard input for the selected row: Delete removes it,
    /// Up and Down step the selection with wraparound at either end.
    /// Without a selection the input is ignored.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoSession`].
    pub fn key_input(&mut self, key: Key) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(SessionError::NoSession.into());
        };
        match key {
            Key::Delete => match session.table.selected() {
                Some(index) => self.delete_vertex(index),
                None => Ok(()),
            },
            Key::Up | Key::Down => {
                let direction = if key == Key::Up {
                    NavDirection::Up
                } else {
                    NavDirection::Down
                };
                if let Some(next) = session.table.step_selection(direction) {
                    self.show_marker(next);
                }
                Ok(())
            }
        }
    }

    /// Arms a gesture mode, disarming the previous one.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoSession`].
    pub fn set_mode(&mut self, mode: InteractionMode) -> Result<()> {
        if self.session.is_none() {
            return Err(SessionError::NoSession.into());
        }
        self.interactions.arm(mode);
        Ok(())
    }

    /// Starts a whole-feature drag at `origin`.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoSession`], or [`SessionError::ModeNotArmed`]
    /// unless [`InteractionMode::Translate`] is armed.
    pub fn translate_begin(&mut self, origin: Point2) -> Result<()> {
        if self.session.is_none() {
            return Err(SessionError::NoSession.into());
        }
        let Some(translate) = self.interactions.translate_mut() else {
            return Err(SessionError::ModeNotArmed {
                required: "translate",
            }
            .into());
        };
        translate.begin(origin);
        Ok(())
    }

    /// Ends the whole-feature drag at `dest`, shifting every vertex by
    /// the drag displacement and refreshing the table against the moved
    /// geometry. A drop with no drag in flight is ignored.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoSession`], or [`SessionError::ModeNotArmed`]
    /// unless [`InteractionMode::Translate`] is armed.
    pub fn translate_end(&mut self, dest: Point2) -> Result<()> {
        if self.session.is_none() {
            return Err(SessionError::NoSession.into());
        }
        let Some(translate) = self.interactions.translate_mut() else {
            return Err(SessionError::ModeNotArmed {
                required: "translate",
            }
            .into());
        };
        let Some(delta) = translate.end(dest) else {
            return Ok(());
        };

        if let Some(session) = self.session.as_mut() {
            session.ring.translate(delta);
            session.table = VertexTable::from_ring(&session.ring);
            session.sync_geometry()?;
            debug!(dx = delta.x, dy = delta.y, "feature translated");
        }
        Ok(())
    }

    /// Handles the start of a vertex drag in
    /// [`InteractionMode::ModifyWithInsert`].
    ///
    /// A snapped drag focuses the row whose stored coordinate exactly
    /// equals the drag origin. An unsnapped drag inserts a new vertex
    /// at the pointer coordinate, in the position following the vertex
    /// that starts the drag segment, then focuses it.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoSession`]; [`SessionError::ModeNotArmed`]
    /// unless modify is armed; [`SessionError::NoMatchingVertex`] when
    /// the exact-equality scan finds no row for a snapped origin or for
    /// the segment start.
    pub fn modify_begin(&mut self, start: ModifyDragStart) -> Result<()> {
        if self.interactions.modify_mut().is_none() {
            return Err(SessionError::ModeNotArmed { required: "modify" }.into());
        }
        let Some(session) = self.session.as_mut() else {
            return Err(SessionError::NoSession.into());
        };

        let index = if start.snapped {
            let Some(index) = session.ring.index_of(start.coord) else {
                warn!(
                    x = start.coord.x,
                    y = start.coord.y,
                    "snapped drag matched no vertex"
                );
                return Err(SessionError::NoMatchingVertex {
                    x: start.coord.x,
                    y: start.coord.y,
                }
                .into());
            };
            index
        } else {
            let Some(segment) = session.ring.index_of(start.segment_start) else {
                warn!(
                    x = start.segment_start.x,
                    y = start.segment_start.y,
                    "drag segment start matched no vertex"
                );
                return Err(SessionError::NoMatchingVertex {
                    x: start.segment_start.x,
                    y: start.segment_start.y,
                }
                .into());
            };
            let index = segment + 1;
            let (x, y) = (trim_coord(start.coord.x), trim_coord(start.coord.y));
            session.table.insert_row(index, x, y);
            session.ring.insert(index, Point2::new(x, y));
            session.sync_geometry()?;
            index
        };

        self.focus_row(index);
        if let Some(modify) = self.interactions.modify_mut() {
            modify.begin_drag(index);
        }
        Ok(())
    }

    /// Handles the end of a vertex drag: writes the final coordinate
    /// into the focused row and the ring when it differs from the
    /// stored value, and refreshes the marker. A drop at the unchanged
    /// coordinate is a no-op, so the changed flag never flips
    /// spuriously.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoSession`], or [`SessionError::ModeNotArmed`]
    /// unless modify is armed.
    #[allow(clippy::float_cmp)]
    pub fn modify_end(&mut self, coord: Point2) -> Result<()> {
        let Some(modify) = self.interactions.modify_mut() else {
            return Err(SessionError::ModeNotArmed { required: "modify" }.into());
        };
        let Some(index) = modify.take_drag() else {
            return Ok(());
        };
        let Some(session) = self.session.as_mut() else {
            return Err(SessionError::NoSession.into());
        };
        let Some(current) = session.ring.point(index) else {
            return Ok(());
        };
        if current == coord {
            return Ok(());
        }

        // Drop coordinates are written back raw; trimming only applies
        // where a value enters the table from the ring.
        session.ring.set_point(index, coord);
        session.table.set_row_coord(index, coord.x, coord.y);
        session.sync_geometry()?;
        self.show_marker(index);
        Ok(())
    }

    /// Selects `index` and refreshes its marker and jump input.
    fn focus_row(&mut self, index: usize) {
        if let Some(session) = self.session.as_mut() {
            if session.table.select(index).is_none() {
                return;
            }
        }
        self.show_marker(index);
    }

    /// Shows the marker for the ring point at `index` and mirrors the
    /// ordinal into the jump input. Selection is left untouched.
    fn show_marker(&mut self, index: usize) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.jump_ordinal = Some(index + 1);
        if let (Some(overlay), Some(point)) = (self.overlay, session.ring.point(index)) {
            overlay.show(&mut self.surface, point);
        }
    }

    /// Common teardown for both termination paths: markers cleared,
    /// gestures back to inert. The marker layer itself stays attached
    /// for the next session on the same feature.
    fn teardown(&mut self) {
        if let Some(overlay) = self.overlay {
            overlay.clear(&mut self.surface);
        }
        self.interactions.arm(InteractionMode::Inert);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::EditError;
    use crate::view::surface::MapSurface;
    use approx::assert_relative_eq;

    fn square_ring() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(0.0, 0.0),
        ]
    }

    fn square_feature(id: &str) -> Feature {
        Feature::new(id, Geometry::Polygon(vec![square_ring()]))
    }

    fn controller() -> VertexSessionController<MapSurface> {
        VertexSessionController::new(MapSurface::new(Point2::new(5.0, 5.0), 100.0, 100.0))
    }

    fn loaded() -> VertexSessionController<MapSurface> {
        let mut ctl = controller();
        ctl.load_feature(square_feature("parcel-1")).unwrap();
        ctl
    }

    #[test]
    fn load_strips_closing_point_and_numbers_rows() {
        let mut ctl = loaded();
        let table = ctl.table().unwrap();
        assert_eq!(table.len(), 4);
        let ordinals: Vec<usize> = table.rows().iter().map(|r| r.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4]);
        assert_eq!(ctl.ring().unwrap().len(), 4);
        assert!(!ctl.changed());

        assert_eq!(
            ctl.drain_events(),
            vec![SessionEvent::BeginSession {
                feature: "parcel-1".into()
            }]
        );
    }

    #[test]
    fn load_while_active_is_rejected() {
        let mut ctl = loaded();
        let err = ctl.load_feature(square_feature("parcel-2")).unwrap_err();
        assert!(matches!(
            err,
            EditError::Session(SessionError::SessionActive)
        ));
        // The open session is untouched.
        assert!(ctl.session_active());
    }

    #[test]
    fn cancel_restores_geometry_bit_for_bit() {
        let mut ctl = loaded();
        ctl.add_vertex(2).unwrap();
        ctl.edit_row_field(0, FieldEdit::X(-4.0)).unwrap();
        ctl.delete_vertex(3).unwrap();
        assert!(ctl.changed());

        let feature = ctl.cancel().unwrap();
        assert_eq!(feature.geometry(), &Geometry::Polygon(vec![square_ring()]));
        assert!(!ctl.session_active());

        let events = ctl.drain_events();
        assert_eq!(
            events.last(),
            Some(&SessionEvent::Cancel {
                feature: "parcel-1".into()
            })
        );
    }

    #[test]
    fn save_unmodified_reports_unchanged() {
        let mut ctl = loaded();
        let feature = ctl.save().unwrap();

        let ring = feature.geometry().first_ring().unwrap();
        assert_eq!(ring.first(), ring.last());
        assert_eq!(ring.len(), 5);

        let events = ctl.drain_events();
        assert_eq!(
            events.last(),
            Some(&SessionEvent::Validate {
                feature: "parcel-1".into(),
                changed: false
            })
        );
    }

    #[test]
    fn save_commits_current_ring() {
        let mut ctl = loaded();
        ctl.edit_row_field(1, FieldEdit::Y(2.5)).unwrap();
        let feature = ctl.save().unwrap();

        let ring = feature.geometry().first_ring().unwrap();
        assert_eq!(ring[1], Point2::new(10.0, 2.5));
        assert_eq!(ring.first(), ring.last());

        let events = ctl.drain_events();
        assert_eq!(
            events.last(),
            Some(&SessionEvent::Validate {
                feature: "parcel-1".into(),
                changed: true
            })
        );
    }

    #[test]
    fn add_vertex_inserts_midpoint_and_focuses() {
        let mut ctl = loaded();
        ctl.add_vertex(2).unwrap();

        let table = ctl.table().unwrap();
        assert_eq!(table.len(), 5);
        let row = table.row(1).unwrap();
        assert_relative_eq!(row.x, 5.0);
        assert_relative_eq!(row.y, 0.0);
        assert_eq!(table.selected(), Some(1));
        assert_eq!(ctl.jump_ordinal(), Some(2));

        let ordinals: Vec<usize> = table.rows().iter().map(|r| r.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5]);
        assert!(ctl.changed());
    }

    #[test]
    fn add_vertex_at_top_wraps_to_last_point() {
        let mut ctl = loaded();
        ctl.add_vertex(1).unwrap();

        // Midpoint of the last point (0,10) and the first (0,0).
        let row = ctl.table().unwrap().row(0).unwrap();
        assert_relative_eq!(row.x, 0.0);
        assert_relative_eq!(row.y, 5.0);
    }

    #[test]
    fn add_vertex_out_of_range_clamps_to_last() {
        let mut ctl = loaded();
        ctl.add_vertex(99).unwrap();

        let table = ctl.table().unwrap();
        assert_eq!(table.len(), 5);
        // Clamped to the last position: midpoint of (10,10) and (0,10).
        let row = table.row(3).unwrap();
        assert_relative_eq!(row.x, 5.0);
        assert_relative_eq!(row.y, 10.0);
    }

    #[test]
    fn delete_moves_selection_to_same_offset() {
        let mut ctl = loaded();
        ctl.add_vertex(2).unwrap();
        assert_eq!(ctl.table().unwrap().len(), 5);

        ctl.delete_vertex(2).unwrap();
        let table = ctl.table().unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.selected(), Some(2));
        assert_eq!(table.row(2).unwrap().ordinal, 3);
        assert_eq!(ctl.ring().unwrap().len(), 4);
    }

    #[test]
    fn delete_last_row_selects_new_last() {
        let mut ctl = loaded();
        ctl.delete_vertex(3).unwrap();
        assert_eq!(ctl.table().unwrap().selected(), Some(2));
    }

    #[test]
    fn keyboard_navigation_wraps_and_deletes() {
        let mut ctl = loaded();
        ctl.select_row(3).unwrap();
        ctl.key_input(Key::Down).unwrap();
        assert_eq!(ctl.table().unwrap().selected(), Some(0));

        ctl.key_input(Key::Up).unwrap();
        assert_eq!(ctl.table().unwrap().selected(), Some(3));

        ctl.key_input(Key::Delete).unwrap();
        assert_eq!(ctl.table().unwrap().len(), 3);
        assert!(ctl.changed());
    }

    #[test]
    fn key_input_without_selection_is_ignored() {
        let mut ctl = loaded();
        ctl.key_input(Key::Delete).unwrap();
        ctl.key_input(Key::Down).unwrap();
        assert_eq!(ctl.table().unwrap().len(), 4);
        assert!(!ctl.changed());
    }

    #[test]
    fn field_edit_updates_ring_and_feature() {
        let mut ctl = loaded();
        ctl.edit_row_field(2, FieldEdit::X(12.0)).unwrap();

        assert_eq!(ctl.ring().unwrap().point(2), Some(Point2::new(12.0, 10.0)));
        assert_eq!(ctl.table().unwrap().row(2).unwrap().x, 12.0);
        assert!(ctl.changed());
        assert_eq!(ctl.jump_ordinal(), Some(3));
    }

    #[test]
    fn select_row_places_marker_and_recenters_when_off_screen() {
        let mut surface = MapSurface::new(Point2::new(500.0, 500.0), 20.0, 20.0);
        let layer_probe = surface.find_layer("parcel-1_vertex-marker");
        assert!(layer_probe.is_none());

        let mut ctl = VertexSessionController::new(surface);
        ctl.load_feature(square_feature("parcel-1")).unwrap();
        ctl.select_row(1).unwrap();

        let layer = ctl
            .surface()
            .find_layer("parcel-1_vertex-marker")
            .unwrap();
        assert_eq!(ctl.surface().markers(layer), &[Point2::new(10.0, 0.0)]);
        // (10,0) was far outside the 20x20 view around (500,500).
        assert_eq!(ctl.surface().center(), Point2::new(10.0, 0.0));
        assert_eq!(ctl.jump_ordinal(), Some(2));
    }

    #[test]
    fn gestures_require_their_mode() {
        let mut ctl = loaded();
        assert!(matches!(
            ctl.translate_begin(Point2::new(0.0, 0.0)).unwrap_err(),
            EditError::Session(SessionError::ModeNotArmed { .. })
        ));
        assert!(matches!(
            ctl.modify_end(Point2::new(0.0, 0.0)).unwrap_err(),
            EditError::Session(SessionError::ModeNotArmed { .. })
        ));

        ctl.set_mode(InteractionMode::Translate).unwrap();
        assert!(ctl
            .modify_begin(ModifyDragStart {
                coord: Point2::new(0.0, 0.0),
                snapped: true,
                segment_start: Point2::new(0.0, 0.0),
            })
            .is_err());
    }

    #[test]
    fn translate_shifts_every_vertex_and_refreshes_table() {
        let mut ctl = loaded();
        ctl.set_mode(InteractionMode::Translate).unwrap();
        ctl.translate_begin(Point2::new(1.0, 1.0)).unwrap();
        ctl.translate_end(Point2::new(4.0, 2.0)).unwrap();

        let ring = ctl.ring().unwrap();
        assert_eq!(ring.point(0), Some(Point2::new(3.0, 1.0)));
        assert_eq!(ring.point(2), Some(Point2::new(13.0, 11.0)));

        let table = ctl.table().unwrap();
        assert_eq!(table.len(), 4);
        assert_relative_eq!(table.row(0).unwrap().x, 3.0);
        assert!(ctl.changed());
    }

    #[test]
    fn translate_drop_without_drag_is_ignored() {
        let mut ctl = loaded();
        ctl.set_mode(InteractionMode::Translate).unwrap();
        ctl.translate_end(Point2::new(4.0, 2.0)).unwrap();
        assert!(!ctl.changed());
    }

    #[test]
    fn snapped_drag_focuses_matching_row() {
        let mut ctl = loaded();
        ctl.set_mode(InteractionMode::ModifyWithInsert).unwrap();
        ctl.modify_begin(ModifyDragStart {
            coord: Point2::new(10.0, 10.0),
            snapped: true,
            segment_start: Point2::new(10.0, 0.0),
        })
        .unwrap();

        assert_eq!(ctl.table().unwrap().selected(), Some(2));
        assert_eq!(ctl.table().unwrap().len(), 4);
        assert!(!ctl.changed());
    }

    #[test]
    fn snapped_drag_with_no_match_is_an_explicit_outcome() {
        let mut ctl = loaded();
        ctl.set_mode(InteractionMode::ModifyWithInsert).unwrap();
        let err = ctl
            .modify_begin(ModifyDragStart {
                coord: Point2::new(3.0, 3.0),
                snapped: true,
                segment_start: Point2::new(0.0, 0.0),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            EditError::Session(SessionError::NoMatchingVertex { .. })
        ));
        assert_eq!(ctl.table().unwrap().len(), 4);
    }

    #[test]
    fn unsnapped_drag_inserts_after_segment_start() {
        let mut ctl = loaded();
        ctl.set_mode(InteractionMode::ModifyWithInsert).unwrap();
        ctl.modify_begin(ModifyDragStart {
            coord: Point2::new(10.0, 4.0),
            snapped: false,
            segment_start: Point2::new(10.0, 0.0),
        })
        .unwrap();

        let table = ctl.table().unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.selected(), Some(2));
        assert_eq!(table.row(2).unwrap().x, 10.0);
        assert_eq!(table.row(2).unwrap().y, 4.0);
        let ordinals: Vec<usize> = table.rows().iter().map(|r| r.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn drag_end_writes_back_only_on_change() {
        let mut ctl = loaded();
        ctl.set_mode(InteractionMode::ModifyWithInsert).unwrap();
        ctl.modify_begin(ModifyDragStart {
            coord: Point2::new(10.0, 0.0),
            snapped: true,
            segment_start: Point2::new(0.0, 0.0),
        })
        .unwrap();

        // Dropped in place: nothing changes.
        ctl.modify_end(Point2::new(10.0, 0.0)).unwrap();
        assert!(!ctl.changed());

        ctl.modify_begin(ModifyDragStart {
            coord: Point2::new(10.0, 0.0),
            snapped: true,
            segment_start: Point2::new(0.0, 0.0),
        })
        .unwrap();
        ctl.modify_end(Point2::new(11.0, 0.5)).unwrap();
        assert_eq!(ctl.ring().unwrap().point(1), Some(Point2::new(11.0, 0.5)));
        assert_eq!(ctl.table().unwrap().row(1).unwrap().y, 0.5);
        assert!(ctl.changed());
    }

    #[test]
    fn teardown_clears_markers_and_disarms_but_keeps_layer() {
        let mut ctl = loaded();
        ctl.select_row(0).unwrap();
        ctl.set_mode(InteractionMode::Translate).unwrap();
        ctl.save().unwrap();

        assert_eq!(ctl.mode(), InteractionMode::Inert);
        let layer = ctl
            .surface()
            .find_layer("parcel-1_vertex-marker")
            .unwrap();
        assert!(ctl.surface().markers(layer).is_empty());

        // A new session on the same feature reuses the layer.
        ctl.load_feature(square_feature("parcel-1")).unwrap();
        assert_eq!(ctl.surface().layer_count(), 1);
    }

    #[test]
    fn close_detaches_the_layer() {
        let mut ctl = loaded();
        ctl.save().unwrap();
        ctl.close();
        assert_eq!(ctl.surface().layer_count(), 0);
    }

    #[test]
    fn multi_part_feature_edits_first_ring_of_first_part() {
        let other = vec![
            Point2::new(50.0, 50.0),
            Point2::new(60.0, 50.0),
            Point2::new(55.0, 60.0),
            Point2::new(50.0, 50.0),
        ];
        let geometry = Geometry::MultiPolygon(vec![vec![square_ring()], vec![other.clone()]]);
        let mut ctl = controller();
        ctl.load_feature(Feature::new("multi", geometry)).unwrap();
        assert_eq!(ctl.table().unwrap().len(), 4);

        ctl.edit_row_field(0, FieldEdit::Y(-1.0)).unwrap();
        let feature = ctl.save().unwrap();
        match feature.geometry() {
            Geometry::MultiPolygon(parts) => {
                assert_eq!(parts[0][0][0], Point2::new(0.0, -1.0));
                // The second part is untouched.
                assert_eq!(parts[1][0], other);
            }
            Geometry::Polygon(_) => unreachable!(),
        }
    }

    #[test]
    fn add_vertex_at_hint_uses_focused_ordinal() {
        let mut ctl = loaded();
        // No focus yet: the hint is empty and the call does nothing.
        ctl.add_vertex_at_hint().unwrap();
        assert_eq!(ctl.table().unwrap().len(), 4);

        ctl.select_row(1).unwrap();
        ctl.add_vertex_at_hint().unwrap();
        let row = ctl.table().unwrap().row(1).unwrap();
        assert_relative_eq!(row.x, 5.0);
        assert_relative_eq!(row.y, 0.0);
    }

    #[test]
    fn degenerate_feature_is_rejected_at_load() {
        let segment = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 0.0),
        ];
        let mut ctl = controller();
        let err = ctl
            .load_feature(Feature::new("thin", Geometry::Polygon(vec![segment])))
            .unwrap_err();
        assert!(matches!(err, EditError::Geometry(_)));
        assert!(!ctl.session_active());
    }
}

