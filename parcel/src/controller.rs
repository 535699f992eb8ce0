//! Click routing and edit lifecycle.
//!
//! The controller is either idle or editing exactly one graphic. A click is
//! split into [`EditController::begin_click`], which issues the hit-test, and
//! [`EditController::finish_click`], which filters the candidates once the
//! engine answers. No borrow is held across the await in between, so tool
//! events may still be delivered while a hit-test is in flight.

use crate::engine::{GesturePhase, HitResult, SketchEvent, SketchState, SketchTool, ToolMode, UpdateOptions, View};
use crate::model::{marker_set, GraphicId, ScreenPoint};
use crate::scene::SceneBinder;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditSession {
    pub graphic: GraphicId,
    pub mode: ToolMode,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Editing(EditSession),
}

impl EditState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditState::Idle => "idle",
            EditState::Editing(_) => "editing",
        }
    }
}

/// Identifies the hit-test a click issued.
///
/// Dropping a ticket before it reaches `finish_click` (an abandoned
/// [`PendingClick`] or a cancelled `click` future) releases the debounce.
#[derive(Debug)]
pub struct ClickTicket {
    id: u64,
    outstanding: Rc<Cell<Option<u64>>>,
}

impl ClickTicket {
    fn is_current(&self, outstanding: &Rc<Cell<Option<u64>>>) -> bool {
        Rc::ptr_eq(&self.outstanding, outstanding) && outstanding.get() == Some(self.id)
    }
}

impl Drop for ClickTicket {
    fn drop(&mut self) {
        if self.outstanding.get() == Some(self.id) {
            self.outstanding.set(None);
        }
    }
}

#[must_use = "the hit-test must be awaited and handed to finish_click"]
pub struct PendingClick<F> {
    ticket: ClickTicket,
    hit_test: F,
}

impl<F> PendingClick<F> {
    pub fn ticket(&self) -> &ClickTicket {
        &self.ticket
    }

    pub fn into_parts(self) -> (ClickTicket, F) {
        (self.ticket, self.hit_test)
    }
}

pub enum ClickStart<F> {
    Pending(PendingClick<F>),
    /// The tool is mid-edit; no hit-test was issued.
    Ignored,
    /// Another click's hit-test is still outstanding.
    Debounced,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored,
    Debounced,
    Stale,
    Missed,
    Started(GraphicId),
    AlreadyEditing(GraphicId),
    Failed(String),
}

impl ClickOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClickOutcome::Ignored => "ignored",
            ClickOutcome::Debounced => "debounced",
            ClickOutcome::Stale => "stale",
            ClickOutcome::Missed => "missed",
            ClickOutcome::Started(_) => "started",
            ClickOutcome::AlreadyEditing(_) => "already-editing",
            ClickOutcome::Failed(_) => "failed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored,
    /// A terminal gesture phase forced the tool to complete.
    Completed,
    /// The tool reported the session over on its own.
    Ended,
    /// The tool began editing without a click from us.
    Tracked(GraphicId),
}

pub struct EditController<V, T> {
    binder: SceneBinder<V>,
    tool: T,
    state: EditState,
    next_ticket: u64,
    outstanding: Rc<Cell<Option<u64>>>,
}

impl<V: View, T: SketchTool> EditController<V, T> {
    pub fn new(binder: SceneBinder<V>, tool: T) -> Self {
        EditController { binder, tool, state: EditState::Idle, next_ticket: 0, outstanding: Rc::default() }
    }

    pub fn begin_click(&mut self, point: ScreenPoint) -> ClickStart<V::HitTest> {
        if self.tool.is_active() {
            debug!(x = point.x, y = point.y, "click ignored, tool is active");
            return ClickStart::Ignored;
        }
        if self.outstanding.get().is_some() {
            debug!(x = point.x, y = point.y, "click debounced, hit-test outstanding");
            return ClickStart::Debounced;
        }
        let ticket = ClickTicket { id: self.next_ticket, outstanding: Rc::clone(&self.outstanding) };
        self.next_ticket += 1;
        self.outstanding.set(Some(ticket.id));
        ClickStart::Pending(PendingClick { ticket, hit_test: self.binder.hit_test(point) })
    }

    pub fn finish_click(
        &mut self,
        ticket: ClickTicket,
        result: Result<Vec<HitResult>, V::Error>,
    ) -> ClickOutcome {
        if !ticket.is_current(&self.outstanding) {
            return ClickOutcome::Stale;
        }
        drop(ticket);

        let hits = match result {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "hit-test failed");
                return ClickOutcome::Failed(e.to_string());
            }
        };

        // Every candidate is considered, not just the topmost.
        let mut outcome = ClickOutcome::Missed;
        for hit in &hits {
            if self.qualifies(hit) {
                outcome = self.start_session(hit.graphic_id);
            }
        }
        outcome
    }

    /// Run a whole click: guard, hit-test, filter, start.
    pub async fn click(&mut self, point: ScreenPoint) -> ClickOutcome {
        let (ticket, hit_test) = match self.begin_click(point) {
            ClickStart::Pending(p) => p.into_parts(),
            ClickStart::Ignored => return ClickOutcome::Ignored,
            ClickStart::Debounced => return ClickOutcome::Debounced,
        };
        let result = hit_test.await;
        self.finish_click(ticket, result)
    }

    /// Combined listener for update, undo and redo notifications.
    pub fn handle_event(&mut self, event: &SketchEvent) -> EventOutcome {
        if matches!(event.state, SketchState::Complete | SketchState::Cancel) {
            if event.state == SketchState::Complete {
                if let Some(geometry) = &event.geometry {
                    for &g in &event.graphics {
                        if self.binder.contains(self.binder.editable_layer(), g) {
                            self.binder.replace_geometry(g, geometry.clone());
                        }
                    }
                }
            }
            let was_editing = self.is_editing();
            self.state = EditState::Idle;
            return if was_editing { EventOutcome::Ended } else { EventOutcome::Ignored };
        }

        if event.phase.as_ref().is_some_and(GesturePhase::is_terminal) {
            debug!(kind = ?event.kind, phase = ?event.phase, "gesture stopped, completing edit");
            self.tool.complete();
            self.state = EditState::Idle;
            return EventOutcome::Completed;
        }

        if event.state == SketchState::Start && self.state == EditState::Idle {
            if let Some(&g) = event.graphics.first() {
                if self.is_edit_target(g) {
                    self.state = EditState::Editing(EditSession { graphic: g, mode: ToolMode::Reshape });
                    return EventOutcome::Tracked(g);
                }
            }
        }
        EventOutcome::Ignored
    }

    fn qualifies(&self, hit: &HitResult) -> bool {
        let editable = self.binder.editable_layer();
        hit.layer_id == Some(editable)
            && self.tool.layer() == Some(editable)
            && self.binder.contains(editable, hit.graphic_id)
            && marker_set(hit.attributes.as_ref(), self.binder.marker_key())
    }

    fn is_edit_target(&self, graphic: GraphicId) -> bool {
        let editable = self.binder.editable_layer();
        self.binder.contains(editable, graphic)
            && self.binder.graphic(graphic).is_some_and(|g| g.has_marker(self.binder.marker_key()))
    }

    fn start_session(&mut self, graphic: GraphicId) -> ClickOutcome {
        if let EditState::Editing(s) = self.state {
            if s.graphic == graphic && self.tool.is_active() {
                return ClickOutcome::AlreadyEditing(graphic);
            }
        }
        self.tool.update(&[graphic], &UpdateOptions::RESHAPE);
        self.state = EditState::Editing(EditSession { graphic, mode: ToolMode::Reshape });
        debug!(graphic, "reshape started");
        ClickOutcome::Started(graphic)
    }
}

impl<V, T> EditController<V, T> {
    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn session(&self) -> Option<EditSession> {
        match self.state {
            EditState::Editing(s) => Some(s),
            EditState::Idle => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.session().is_some()
    }

    pub fn has_outstanding_click(&self) -> bool {
        self.outstanding.get().is_some()
    }

    pub fn binder(&self) -> &SceneBinder<V> {
        &self.binder
    }

    pub fn binder_mut(&mut self) -> &mut SceneBinder<V> {
        &mut self.binder
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    pub fn tool_mut(&mut self) -> &mut T {
        &mut self.tool
    }
}
