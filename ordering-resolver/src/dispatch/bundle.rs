use ordering_model::{
    effective_flags, Action, ActionFlags, ActionKey, ChangeFlags, NodeId, OrderKind,
    ResourceBehavior, ResourceKey, Scheduler,
};

use crate::{evaluate::generic_rule, transforms::find_task};

/// The `BUNDLE` variant: delegates to its contained primitive/replica the
/// way [`Group`](super::Group) delegates to members, but never re-derives a
/// node: a bundle's instances are already node-bound by the time ordering
/// runs (§4.3).
pub struct Bundle;

impl ResourceBehavior for Bundle {
    fn action_flags(&self, ctx: &Scheduler, action: &Action, node: Option<NodeId>) -> ActionFlags {
        let Some(resource) = action.resource else {
            return action.flags();
        };
        let Some(&replica) = ctx.resource(resource).members.first() else {
            return action.flags();
        };
        let Some(replica_action) = find_task(ctx, replica, &action.task) else {
            return action.flags();
        };
        let replica_variant = ctx.resource(replica).variant;
        let behavior = crate::dispatch::variant_behavior(replica_variant);
        effective_flags(ctx, ctx.action(replica_action), node, false, behavior)
    }

    fn update_actions(
        &self,
        ctx: &mut Scheduler,
        first: ActionKey,
        then: ActionKey,
        _node: Option<NodeId>,
        first_flags: ActionFlags,
        then_flags: ActionFlags,
        kind: OrderKind,
    ) -> ChangeFlags {
        generic_rule(ctx, first, then, kind, first_flags, then_flags)
    }

    fn location(&self, ctx: &Scheduler, resource: ResourceKey, node: Option<NodeId>, _current: bool) -> Option<NodeId> {
        // Bundle instances are already node-bound; the resource's own
        // `node` field is authoritative and never re-derived from a peer.
        node.or(ctx.resource(resource).node)
    }
}
