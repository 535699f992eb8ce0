//! Headless engine: an in-memory view and sketch tool.
//!
//! Screen points are taken to be map coordinates. Hit-testing is even-odd
//! ray casting over every ring of every visible graphic, topmost layer first.

use crate::engine::{HitResult, SketchEvent, SketchState, SketchTool, UpdateOptions, View};
use crate::layers::Layer;
use crate::model::{Graphic, GraphicId, LayerId, Ring, ScreenPoint, SpatialReference};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::{ready, Ready};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("hit-test rejected: {0}")]
pub struct HitTestError(pub String);

type HitTestResult = Result<Vec<HitResult>, HitTestError>;

#[derive(Debug, Default)]
pub struct MemoryView {
    spatial_reference: SpatialReference,
    layers: Vec<Layer>,
    graphics: Vec<(LayerId, Graphic)>,
    hit_tests: Cell<usize>,
    scripted: RefCell<VecDeque<HitTestResult>>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn graphics_in(&self, layer: LayerId) -> impl Iterator<Item = &Graphic> {
        self.graphics.iter().filter(move |(l, _)| *l == layer).map(|(_, g)| g)
    }

    /// Number of hit-tests issued so far.
    pub fn hit_test_count(&self) -> usize {
        self.hit_tests.get()
    }

    /// Answer the next hit-test with `result` instead of the geometry query.
    pub fn script(&self, result: HitTestResult) {
        self.scripted.borrow_mut().push_back(result);
    }

    fn query(&self, point: ScreenPoint) -> Vec<HitResult> {
        let mut out = Vec::new();
        for layer in self.layers.iter().rev().filter(|l| l.visible) {
            for g in self.graphics_in(layer.id).collect::<Vec<_>>().into_iter().rev() {
                if g.geometry.rings.iter().any(|r| contains(r, point)) {
                    out.push(HitResult {
                        graphic_id: g.id,
                        layer_id: Some(layer.id),
                        attributes: Some(g.attributes.clone()),
                    });
                }
            }
        }
        out
    }
}

impl View for MemoryView {
    type Error = HitTestError;
    type HitTest = Ready<HitTestResult>;

    fn spatial_reference(&self) -> SpatialReference {
        self.spatial_reference
    }

    fn add_layer(&mut self, layer: &Layer) {
        let mut layer = layer.clone();
        layer.graphics.clear();
        self.layers.push(layer);
    }

    fn add_graphics(&mut self, layer: LayerId, graphics: &[Graphic]) {
        for g in graphics {
            if let Some(l) = self.layers.iter_mut().find(|l| l.id == layer) {
                l.graphics.push(g.id);
            }
            self.graphics.push((layer, g.clone()));
        }
    }

    fn hit_test(&self, point: ScreenPoint) -> Self::HitTest {
        self.hit_tests.set(self.hit_tests.get() + 1);
        let scripted = self.scripted.borrow_mut().pop_front();
        ready(scripted.unwrap_or_else(|| Ok(self.query(point))))
    }
}

/// Even-odd crossing test.
fn contains(ring: &Ring, p: ScreenPoint) -> bool {
    let v = ring.vertices();
    if v.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = v.len() - 1;
    for i in 0..v.len() {
        let (a, b) = (v[i], v[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Sketch tool that records every call made on it.
///
/// `update` on the graphics already being edited does not open a second
/// session. Events the tool would emit are queued in an outbox.
#[derive(Debug, Default)]
pub struct MemorySketch {
    layer: Option<LayerId>,
    session: Option<Vec<GraphicId>>,
    sessions_started: usize,
    update_calls: Vec<(Vec<GraphicId>, UpdateOptions)>,
    complete_calls: usize,
    outbox: Vec<SketchEvent>,
}

impl MemorySketch {
    pub fn new(layer: Option<LayerId>) -> Self {
        MemorySketch { layer, ..Self::default() }
    }

    pub fn active_sessions(&self) -> usize {
        usize::from(self.session.is_some())
    }

    pub fn sessions_started(&self) -> usize {
        self.sessions_started
    }

    pub fn update_calls(&self) -> &[(Vec<GraphicId>, UpdateOptions)] {
        &self.update_calls
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls
    }

    pub fn editing(&self) -> Option<&[GraphicId]> {
        self.session.as_deref()
    }

    /// Abandon the session the way a user pressing escape would.
    pub fn cancel(&mut self) {
        if let Some(graphics) = self.session.take() {
            self.emit(SketchState::Cancel, graphics);
        }
    }

    pub fn drain_events(&mut self) -> Vec<SketchEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn emit(&mut self, state: SketchState, graphics: Vec<GraphicId>) {
        self.outbox.push(
            SketchEvent::update(None).with_state(state).with_graphics(graphics),
        );
    }
}

impl SketchTool for MemorySketch {
    fn is_active(&self) -> bool {
        self.session.is_some()
    }

    fn layer(&self) -> Option<LayerId> {
        self.layer
    }

    fn update(&mut self, graphics: &[GraphicId], options: &UpdateOptions) {
        self.update_calls.push((graphics.to_vec(), *options));
        if self.session.as_deref() == Some(graphics) {
            return;
        }
        if let Some(previous) = self.session.take() {
            self.emit(SketchState::Complete, previous);
        }
        self.session = Some(graphics.to_vec());
        self.sessions_started += 1;
        self.emit(SketchState::Start, graphics.to_vec());
    }

    fn complete(&mut self) {
        self.complete_calls += 1;
        if let Some(graphics) = self.session.take() {
            self.emit(SketchState::Complete, graphics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn even_odd_square() {
        let sq = Ring::from_coords(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]);
        assert!(contains(&sq, ScreenPoint::new(5.0, 5.0)));
        assert!(!contains(&sq, ScreenPoint::new(15.0, 5.0)));
        assert!(!contains(&sq, ScreenPoint::new(5.0, -1.0)));
    }

    #[test]
    fn sketch_update_is_idempotent() {
        let mut s = MemorySketch::new(Some(0));
        s.update(&[3], &UpdateOptions::RESHAPE);
        s.update(&[3], &UpdateOptions::RESHAPE);
        assert_eq!(s.active_sessions(), 1);
        assert_eq!(s.sessions_started(), 1);
        assert_eq!(s.update_calls().len(), 2);
        s.complete();
        assert_eq!(s.active_sessions(), 0);
        let states: Vec<_> = s.drain_events().into_iter().map(|e| e.state).collect();
        assert_eq!(states, vec![SketchState::Start, SketchState::Complete]);
    }

    #[test]
    fn scripted_failure_is_returned_once() {
        let v = MemoryView::new();
        v.script(Err(HitTestError("offline".into())));
        let first = block_on(v.hit_test(ScreenPoint::new(0.0, 0.0)));
        assert!(first.is_err());
        let second = block_on(v.hit_test(ScreenPoint::new(0.0, 0.0)));
        assert_eq!(second, Ok(Vec::new()));
        assert_eq!(v.hit_test_count(), 2);
    }
}
