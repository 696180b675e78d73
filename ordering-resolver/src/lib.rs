//! Fixed-point constraint propagation over an action graph.
//!
//! Consumes the action/edge/resource model defined by
//! [`ordering_model`] and drives it to a fixed point: action expansion
//! (C4), per-kind edge evaluation (C5), and the queue-based convergence
//! driver (C6), backed by the four resource-variant behaviors (C3) in
//! [`dispatch`].
//!
//! The crate does not initialize a `tracing` subscriber; it only emits
//! events against whatever the host installed (§10.1 of the design doc).

pub mod dispatch;
mod evaluate;
mod expansion;
mod transforms;

mod driver;

pub use dispatch::default_variant_table;
pub use driver::update;
pub use expansion::{parse_uuid, ExpansionError, ParsedUuid};
pub use transforms::order_actions;
