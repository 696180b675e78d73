use crate::{
    action::Action,
    flags::{ActionFlags, ChangeFlags, ResourceFlags},
    ids::{ActionKey, NodeId, ResourceKey},
    kind::OrderKind,
    scheduler::Scheduler,
};

/// The composite-tree kind of a [`Resource`], ordered exactly as §3 requires:
/// `PRIMITIVE < GROUP < CLONE < BUNDLE`. The ordering itself is meaningful:
/// C4 uses `variant < Variant::Group` to decide whether an action needs
/// expansion at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Variant {
    Primitive = 0,
    Group = 1,
    Clone = 2,
    Bundle = 3,
}

impl Variant {
    pub const ALL: [Self; 4] = [Self::Primitive, Self::Group, Self::Clone, Self::Bundle];

    pub fn is_clone_like(self) -> bool {
        matches!(self, Self::Clone)
    }
}

/// A node in the composite resource tree (§3). The resolver only ever reads
/// a `Resource` through its variant's [`ResourceBehavior`]; this struct is
/// the storage the behaviors operate on, not a public API in its own right.
#[derive(Debug, Clone)]
pub struct Resource {
    pub variant: Variant,
    flags: ResourceFlags,
    /// This resource's own actions (not its members').
    pub actions: Vec<ActionKey>,
    /// Child resources, in order, for `Group`/`Clone`/`Bundle` (a clone's or
    /// bundle's per-node instances, or a group's ordered members).
    pub members: Vec<ResourceKey>,
    pub parent: Option<ResourceKey>,
    /// The node this resource (or, for a primitive, its single instance) is
    /// currently assigned to, if any.
    pub node: Option<NodeId>,
    /// Whether the primitive behind this resource is presently running
    /// somewhere, consulted by the `PROBE` kind (§4.2).
    pub currently_running: bool,
}

impl Resource {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            flags: ResourceFlags::MANAGED,
            actions: Vec::new(),
            members: Vec::new(),
            parent: None,
            node: None,
            currently_running: false,
        }
    }

    pub fn flags(&self) -> ResourceFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: ResourceFlags) {
        self.flags = flags;
    }

    pub fn set_flag(&mut self, flag: ResourceFlags) -> bool {
        let changed = !self.flags.contains(flag);
        self.flags.insert(flag);
        changed
    }

    pub fn clear_flag(&mut self, flag: ResourceFlags) -> bool {
        let changed = self.flags.contains(flag);
        self.flags.remove(flag);
        changed
    }

    pub fn is_unmanaged_and_blocked(&self) -> bool {
        !self.flags.contains(ResourceFlags::MANAGED) && self.flags.contains(ResourceFlags::BLOCKED)
    }
}

/// The per-variant operation surface (§6.2, "Resource-variant contract").
/// Implemented once per [`Variant`] in `ordering-resolver`; the model crate
/// only defines the seam so [`crate::action::effective_flags`] and the driver
/// can call through it without knowing about concrete variants.
pub trait ResourceBehavior {
    /// Variant-aware effective flags (§4.3.1). A clone may report "runnable
    /// somewhere" without a node and "not runnable here" with one.
    fn action_flags(&self, ctx: &Scheduler, action: &Action, node: Option<NodeId>) -> ActionFlags;

    /// Variant-aware propagation refinement (§4.3.2), invoked when
    /// `then.resource` is non-nil. `then_flags_mask` carries the flags the
    /// generic evaluator would have set or cleared on `then`, so a variant
    /// can refine (not reinvent) rather than duplicate that decision.
    #[allow(clippy::too_many_arguments)]
    fn update_actions(
        &self,
        ctx: &mut Scheduler,
        first: ActionKey,
        then: ActionKey,
        node: Option<NodeId>,
        first_flags: ActionFlags,
        then_flags_mask: ActionFlags,
        kind: OrderKind,
    ) -> ChangeFlags;

    /// Where this resource is (or would be) assigned. `current` distinguishes
    /// "where it is running right now" from "where the allocator has decided
    /// it should go next" (relevant mid-migration).
    fn location(
        &self,
        ctx: &Scheduler,
        resource: ResourceKey,
        node: Option<NodeId>,
        current: bool,
    ) -> Option<NodeId>;

    /// Whether `maybe_parent` is an ancestor of `resource` in the composite
    /// tree (`resource` itself is not included; ancestry is strict).
    /// Ancestry doesn't depend on either resource's variant, so every variant
    /// shares this default: walk `parent` links in `ctx`.
    fn is_ancestor(&self, ctx: &Scheduler, maybe_parent: ResourceKey, resource: ResourceKey) -> bool {
        let mut current = ctx.resource(resource).parent;
        while let Some(key) = current {
            if key == maybe_parent {
                return true;
            }
            current = ctx.resource(key).parent;
        }
        false
    }
}

/// The four canonical [`ResourceBehavior`] implementations, indexed by
/// [`Variant`]. `ordering-resolver` builds this once (`default_variant_table`)
/// and hands it to the [`Scheduler`](crate::scheduler::Scheduler); the model
/// crate never constructs one itself, keeping it free of any concrete variant
/// logic.
pub struct VariantTable {
    behaviors: [Box<dyn ResourceBehavior>; 4],
}

impl VariantTable {
    pub fn new(
        primitive: Box<dyn ResourceBehavior>,
        group: Box<dyn ResourceBehavior>,
        clone: Box<dyn ResourceBehavior>,
        bundle: Box<dyn ResourceBehavior>,
    ) -> Self {
        Self {
            behaviors: [primitive, group, clone, bundle],
        }
    }

    pub fn get(&self, variant: Variant) -> &dyn ResourceBehavior {
        self.behaviors[variant as usize].as_ref()
    }
}
