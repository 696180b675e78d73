use ordering_model::{
    Action, ActionFlags, ActionKey, ChangeFlags, NodeId, OrderKind, ResourceBehavior, ResourceKey,
    Scheduler,
};

use crate::evaluate::generic_rule;

/// The `PRIMITIVE` variant: no composite behaviour of its own. Both
/// callbacks are pass-throughs to the vocabulary-level rule (§4.3).
pub struct Primitive;

impl ResourceBehavior for Primitive {
    fn action_flags(&self, _ctx: &Scheduler, action: &Action, _node: Option<NodeId>) -> ActionFlags {
        action.flags()
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
        node.or(ctx.resource(resource).node)
    }
}
