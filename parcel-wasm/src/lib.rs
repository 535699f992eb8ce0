//! Browser bindings for the parcel reshape controller.
//!
//! The host page owns the real map view and sketch tool and hands them over
//! as one object; see [`host::EngineHost`] for the methods it must provide.

mod api;
mod error;
pub mod host;
mod interop;

pub use api::{set_panic_hook, MapEditor};
