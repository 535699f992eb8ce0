//! Reshape controller for a map's editable region.
//!
//! A [`GeometryStore`] supplies two polygons: the editable region and a
//! display-only boundary. [`SceneBinder`] puts them on a [`View`] in two
//! layers, and [`EditController`] decides from clicks and sketch tool events
//! when a reshape edit starts and when it is forced to finish.

pub mod controller;
pub mod engine;
pub mod error;
pub mod layers;
pub mod memory;
pub mod model;
pub mod scene;
pub mod store;

pub use controller::{ClickOutcome, ClickStart, EditController, EditSession, EditState, EventOutcome};
pub use engine::{GesturePhase, HitResult, SketchEvent, SketchEventKind, SketchTool, UpdateOptions, View};
pub use error::ParcelError;
pub use scene::SceneBinder;
pub use store::GeometryStore;
