use slotmap::SlotMap;

use crate::{
    action::Action,
    ids::{ActionKey, NodeId, ResourceKey},
    resource::Resource,
};

/// Sanity bounds on the fixed-point pass (§10.4 of the expanded spec). These
/// exist to turn a propagation bug into a panic with a useful message instead
/// of a hang; they are not meant to be tuned per deployment, but the host can
/// raise them for exceptionally large clusters.
#[derive(Debug, Clone, Copy)]
pub struct ResolverLimits {
    /// Upper bound on work-queue pops during one `update()` call. The spec's
    /// own termination argument (§7) bounds this at a small multiple of the
    /// edge count; this is a generous multiple of that bound, not the bound
    /// itself.
    pub max_queue_iterations: usize,
}

impl Default for ResolverLimits {
    fn default() -> Self {
        Self {
            max_queue_iterations: 1_000_000,
        }
    }
}

/// Out-of-core hook for the colocation-notify side channel (§4.6 postamble):
/// when the driver discovers that two resources must never run on the same
/// node as a side effect of ordering propagation, it reports the pair here
/// rather than growing its own colocation-constraint machinery.
pub trait ColocationSink {
    fn colocate_to_avoid(&mut self, a: ResourceKey, b: ResourceKey);
}

/// A sink that discards every notification; the default when the host has no
/// use for the hook.
#[derive(Debug, Default)]
pub struct NullColocationSink;

impl ColocationSink for NullColocationSink {
    fn colocate_to_avoid(&mut self, _a: ResourceKey, _b: ResourceKey) {}
}

/// The arena and ambient context every resolver operation is threaded
/// through explicitly, never read from a global. Owns the actions and
/// resources by slotmap key, the cluster's node set, and the resolver's
/// sanity limits.
///
/// The variant dispatch table is deliberately *not* a field here: C3's
/// behaviors are looked up and invoked by callers that already hold a
/// `&mut Scheduler`, and a behavior reference borrowed out of `self` would
/// alias the very reference its own `update_actions` needs. Keeping the
/// table a sibling parameter threaded alongside `&mut Scheduler` (as the
/// driver does) avoids the conflict and keeps both explicit collaborators
/// rather than one bundled into the other.
pub struct Scheduler {
    actions: SlotMap<ActionKey, Action>,
    resources: SlotMap<ResourceKey, Resource>,
    nodes: SlotMap<NodeId, ()>,
    pub limits: ResolverLimits,
    pub colocation: Box<dyn ColocationSink>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            actions: SlotMap::with_key(),
            resources: SlotMap::with_key(),
            nodes: SlotMap::with_key(),
            limits: ResolverLimits::default(),
            colocation: Box::new(NullColocationSink),
        }
    }

    pub fn with_colocation_sink(mut self, sink: Box<dyn ColocationSink>) -> Self {
        self.colocation = sink;
        self
    }

    pub fn with_limits(mut self, limits: ResolverLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn add_node(&mut self) -> NodeId {
        self.nodes.insert(())
    }

    pub fn add_action(&mut self, action: Action) -> ActionKey {
        self.actions.insert(action)
    }

    pub fn add_resource(&mut self, resource: Resource) -> ResourceKey {
        self.resources.insert(resource)
    }

    pub fn action(&self, key: ActionKey) -> &Action {
        &self.actions[key]
    }

    pub fn action_mut(&mut self, key: ActionKey) -> &mut Action {
        &mut self.actions[key]
    }

    pub fn resource(&self, key: ResourceKey) -> &Resource {
        &self.resources[key]
    }

    pub fn resource_mut(&mut self, key: ResourceKey) -> &mut Resource {
        &mut self.resources[key]
    }

    pub fn action_keys(&self) -> impl Iterator<Item = ActionKey> + '_ {
        self.actions.keys()
    }

    pub fn resource_keys(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.resources.keys()
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Links `then` to depend on `first` via `edge`, on both sides: pushes
    /// the predecessor edge onto `then` and records `then` in `first`'s
    /// successor list, so the driver can walk either direction in O(1).
    pub fn link(&mut self, first: ActionKey, then: ActionKey, edge: crate::action::Edge) {
        self.actions[then].predecessors.push(edge);
        self.actions[first].successors.push(then);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
