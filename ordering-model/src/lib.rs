//! Data model for the action-graph ordering resolver: actions, edges,
//! resources and the composite-tree variants they come in, and the
//! [`Scheduler`] arena that owns them.
//!
//! This crate defines the seams (`ResourceBehavior`, `ColocationSink`) that
//! [`ordering-resolver`](https://docs.rs/ordering-resolver) implements and
//! drives to a fixed point; it has no propagation logic of its own.

pub mod action;
pub mod flags;
pub mod ids;
pub mod kind;
pub mod resource;
pub mod scheduler;

pub use action::{effective_flags, Action, Edge, TaskName};
pub use flags::{ActionFlags, ChangeFlags, ResourceFlags};
pub use ids::{ActionKey, NodeId, ResourceKey};
pub use kind::OrderKind;
pub use resource::{Resource, ResourceBehavior, Variant, VariantTable};
pub use scheduler::{ColocationSink, NullColocationSink, ResolverLimits, Scheduler};
