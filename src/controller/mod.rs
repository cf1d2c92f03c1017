//! Input core: the per-tick translation pipeline
//!
//! 1. [`aggregator`] - folds polled snapshots into pad state
//! 2. [`analog`] - circle pad accumulation and radial deadzone
//! 3. [`digital`] - edge-triggered button bits
//! 4. [`detection`] - interactive input detection
//! 5. [`input_core`] - lifecycle, locking and the public API
//!
//! # Architecture
//!
//! ```text
//! Devices ──► poll ──► analog pass ──► CirclePad ──┐
//!                  └─► digital pass ─► PadState ───┴──► HidConsumer
//! ```

pub mod aggregator;
pub mod analog;
pub mod detection;
pub mod digital;
pub mod input_core;
pub mod state;

pub use aggregator::TickAggregator;
pub use analog::apply_deadzone;
pub use detection::DetectionSession;
pub use digital::{Edge, EdgeDetector};
pub use input_core::InputCore;
pub use state::{CirclePad, PadUpdate, TickParams, TouchState};
