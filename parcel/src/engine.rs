//! Boundary with the rendering/geometry engine.
//!
//! Everything drawn on screen, every coordinate conversion and every
//! point-in-shape query is owned by the engine. The controller only sees the
//! two traits below and the events the sketch tool emits.

use crate::error::ParcelError;
use crate::layers::Layer;
use crate::model::{Attributes, Graphic, GraphicId, LayerId, Polygon, ScreenPoint, SpatialReference};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::str::FromStr;

/// One candidate returned by a hit-test, topmost first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitResult {
    pub graphic_id: GraphicId,
    #[serde(default)]
    pub layer_id: Option<LayerId>,
    #[serde(default)]
    pub attributes: Option<Attributes>,
}

impl HitResult {
    /// Read one host candidate leniently.
    ///
    /// Entries without a usable `graphicId` yield `None`; a `layerId` or
    /// `attributes` of the wrong type reads as absent, which later filtering
    /// treats as a non-match.
    pub fn from_value(value: &Value) -> Option<HitResult> {
        let obj = value.as_object()?;
        let graphic_id = obj.get("graphicId").and_then(as_id)?;
        let layer_id = obj.get("layerId").and_then(as_id);
        let attributes = obj
            .get("attributes")
            .and_then(Value::as_object)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect());
        Some(HitResult { graphic_id, layer_id, attributes })
    }

    /// Keep every well-formed candidate, in order.
    pub fn parse_candidates<'a>(values: impl IntoIterator<Item = &'a Value>) -> Vec<HitResult> {
        values.into_iter().filter_map(HitResult::from_value).collect()
    }
}

// JS hosts hand ids over as doubles.
fn as_id(v: &Value) -> Option<u32> {
    if let Some(n) = v.as_u64() {
        return u32::try_from(n).ok();
    }
    let f = v.as_f64()?;
    (f.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&f)).then_some(f as u32)
}

/// The map view as seen by the scene binder.
pub trait View {
    type Error: fmt::Display;
    type HitTest: Future<Output = Result<Vec<HitResult>, Self::Error>>;

    fn spatial_reference(&self) -> SpatialReference;
    /// Append a layer to the view's layer stack.
    fn add_layer(&mut self, layer: &Layer);
    fn add_graphics(&mut self, layer: LayerId, graphics: &[Graphic]);
    /// Graphics under `point` from any visible layer. Must not block.
    fn hit_test(&self, point: ScreenPoint) -> Self::HitTest;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    #[default]
    Reshape,
}

impl ToolMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolMode::Reshape => "reshape",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOptions {
    pub tool: ToolMode,
    pub toggle_tool_on_click: bool,
}

impl UpdateOptions {
    pub const RESHAPE: UpdateOptions = UpdateOptions { tool: ToolMode::Reshape, toggle_tool_on_click: false };
}

/// Direct-manipulation editing tool bound to one layer.
pub trait SketchTool {
    /// True while the tool is mid-edit.
    fn is_active(&self) -> bool;
    /// Layer the tool edits, if configured.
    fn layer(&self) -> Option<LayerId>;
    /// Start or retarget an edit on `graphics`.
    fn update(&mut self, graphics: &[GraphicId], options: &UpdateOptions);
    /// Finish the active edit, committing the current geometry.
    fn complete(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SketchEventKind {
    Update,
    Undo,
    Redo,
}

impl FromStr for SketchEventKind {
    type Err = ParcelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "update" => Ok(SketchEventKind::Update),
            "undo" => Ok(SketchEventKind::Undo),
            "redo" => Ok(SketchEventKind::Redo),
            other => Err(ParcelError::UnknownEventKind(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SketchState {
    Start,
    #[default]
    Active,
    Complete,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    Move,
    Reshape,
    Rotate,
    Scale,
    Vertex,
}

/// Progress marker carried by tool events (`toolEventInfo.type`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    Start(Gesture),
    Progress(Gesture),
    Stop(Gesture),
    Other(String),
}

impl GesturePhase {
    pub fn parse(raw: &str) -> Self {
        let (head, tail) = raw.split_once('-').unwrap_or((raw, ""));
        let gesture = match head {
            "move" => Gesture::Move,
            "reshape" => Gesture::Reshape,
            "rotate" => Gesture::Rotate,
            "scale" => Gesture::Scale,
            "vertex" => Gesture::Vertex,
            _ => return GesturePhase::Other(raw.to_string()),
        };
        match tail {
            "start" => GesturePhase::Start(gesture),
            "stop" => GesturePhase::Stop(gesture),
            _ => GesturePhase::Progress(gesture),
        }
    }

    /// Only the end of a drag or a reshape forces completion.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GesturePhase::Stop(Gesture::Move | Gesture::Reshape))
    }
}

/// Update, undo and redo notifications share this shape.
#[derive(Clone, Debug, PartialEq)]
pub struct SketchEvent {
    pub kind: SketchEventKind,
    pub state: SketchState,
    pub graphics: Vec<GraphicId>,
    pub phase: Option<GesturePhase>,
    /// Geometry the tool committed, on complete events.
    pub geometry: Option<Polygon>,
}

impl SketchEvent {
    pub fn update(phase: Option<&str>) -> Self {
        SketchEvent {
            kind: SketchEventKind::Update,
            state: SketchState::Active,
            graphics: Vec::new(),
            phase: phase.map(GesturePhase::parse),
            geometry: None,
        }
    }

    pub fn with_kind(mut self, kind: SketchEventKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_state(mut self, state: SketchState) -> Self {
        self.state = state;
        self
    }

    pub fn with_graphics(mut self, graphics: Vec<GraphicId>) -> Self {
        self.graphics = graphics;
        self
    }

    pub fn with_geometry(mut self, geometry: Polygon) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Build from the host's event payload.
    pub fn from_raw(kind: SketchEventKind, raw: RawSketchEvent) -> Self {
        SketchEvent {
            kind,
            state: raw.state,
            graphics: raw.graphics,
            phase: raw.tool_event_info.and_then(|i| i.kind).map(|t| GesturePhase::parse(&t)),
            geometry: raw.geometry,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ToolEventInfo {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Event payload as the host delivers it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSketchEvent {
    pub state: SketchState,
    pub graphics: Vec<GraphicId>,
    pub tool_event_info: Option<ToolEventInfo>,
    pub geometry: Option<Polygon>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn phases_parse() {
        assert_eq!(GesturePhase::parse("reshape-stop"), GesturePhase::Stop(Gesture::Reshape));
        assert_eq!(GesturePhase::parse("move-start"), GesturePhase::Start(Gesture::Move));
        assert_eq!(GesturePhase::parse("move"), GesturePhase::Progress(Gesture::Move));
        assert_eq!(GesturePhase::parse("reshape-move"), GesturePhase::Progress(Gesture::Reshape));
        assert_eq!(GesturePhase::parse("vertex-add"), GesturePhase::Progress(Gesture::Vertex));
        assert_eq!(GesturePhase::parse("bogus"), GesturePhase::Other("bogus".into()));
    }

    #[test]
    fn only_move_and_reshape_stop_are_terminal() {
        assert!(GesturePhase::parse("move-stop").is_terminal());
        assert!(GesturePhase::parse("reshape-stop").is_terminal());
        assert!(!GesturePhase::parse("rotate-stop").is_terminal());
        assert!(!GesturePhase::parse("scale-stop").is_terminal());
        assert!(!GesturePhase::parse("reshape").is_terminal());
        assert!(!GesturePhase::parse("stop").is_terminal());
    }

    #[test]
    fn raw_event_without_info() {
        let raw: RawSketchEvent = serde_json::from_value(json!({ "state": "active" })).unwrap();
        let ev = SketchEvent::from_raw(SketchEventKind::Undo, raw);
        assert_eq!(ev.phase, None);
        assert_eq!(ev.kind, SketchEventKind::Undo);

        let raw: RawSketchEvent = serde_json::from_value(json!({
            "state": "active",
            "graphics": [0],
            "toolEventInfo": { "type": "move-stop" }
        }))
        .unwrap();
        let ev = SketchEvent::from_raw(SketchEventKind::Update, raw);
        assert!(ev.phase.unwrap().is_terminal());
        assert_eq!(ev.graphics, vec![0]);
    }

    #[test]
    fn malformed_candidates_are_skipped() {
        let raw = json!([
            { "graphicId": 7, "layerId": 1, "attributes": "oops" },
            { "layerId": 1 },
            "not a candidate",
            { "graphicId": -1, "layerId": 0 },
            { "graphicId": 0.0, "layerId": 0, "attributes": { "newDevelopment": "new store" } }
        ]);
        let hits = HitResult::parse_candidates(raw.as_array().unwrap());
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0], HitResult { graphic_id: 7, layer_id: Some(1), attributes: None });
        assert_eq!(hits[1].graphic_id, 0);
        assert_eq!(hits[1].layer_id, Some(0));
        assert_eq!(hits[1].attributes.as_ref().unwrap()["newDevelopment"], json!("new store"));
    }

    #[test]
    fn layer_of_wrong_type_reads_as_absent() {
        let hit = HitResult::from_value(&json!({ "graphicId": 3, "layerId": "0" })).unwrap();
        assert_eq!(hit.layer_id, None);
        assert_eq!(hit.attributes, None);
    }

    #[test]
    fn event_kinds() {
        assert_eq!("redo".parse::<SketchEventKind>().unwrap(), SketchEventKind::Redo);
        assert!("create".parse::<SketchEventKind>().is_err());
    }
}
