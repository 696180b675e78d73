use ordering_model::{
    effective_flags, Action, ActionFlags, ActionKey, ChangeFlags, NodeId, OrderKind,
    ResourceBehavior, ResourceKey, Scheduler, TaskName,
};

use crate::{evaluate::generic_rule, transforms::find_task};

/// The `GROUP` variant: delegates `start`/`stop` flags to its first/last
/// member respectively (§4.3). A group can only start once its first
/// member can, and can only be considered stopped once its last member is.
pub struct Group;

impl ResourceBehavior for Group {
    fn action_flags(&self, ctx: &Scheduler, action: &Action, node: Option<NodeId>) -> ActionFlags {
        let Some(resource) = action.resource else {
            return action.flags();
        };
        let members = &ctx.resource(resource).members;
        let delegate = match action.task {
            TaskName::Start => members.first(),
            TaskName::Stop => members.last(),
            _ => None,
        };
        let Some(&member) = delegate else {
            return action.flags();
        };
        let Some(member_action) = find_task(ctx, member, &action.task) else {
            return action.flags();
        };

        let member_variant = ctx.resource(member).variant;
        let behavior = crate::dispatch::variant_behavior(member_variant);
        effective_flags(ctx, ctx.action(member_action), node, false, behavior)
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
        // The group-start node substitution used to compute `first_flags`/
        // `then_flags` already happened in the driver's edge loop (§4.6 step
        // 1); by the time the evaluator reaches here there is nothing left
        // for the group to refine beyond the generic rule.
        generic_rule(ctx, first, then, kind, first_flags, then_flags)
    }

    fn location(&self, ctx: &Scheduler, resource: ResourceKey, node: Option<NodeId>, current: bool) -> Option<NodeId> {
        if let Some(node) = node {
            return Some(node);
        }
        let members = &ctx.resource(resource).members;
        let first = *members.first()?;
        if current {
            ctx.resource(first).node
        } else {
            ctx.resource(first).node.or(ctx.resource(resource).node)
        }
    }
}
