use ordering_model::{
    Action, ActionFlags, ActionKey, ChangeFlags, NodeId, OrderKind, ResourceBehavior, ResourceKey,
    Scheduler,
};

use crate::{
    evaluate::generic_rule,
    transforms::{can_migrate, find_task},
};

/// The `CLONE` variant: implements the "runnable somewhere vs. runnable
/// here" asymmetry `effective_flags` (§4.1) depends on, and refines
/// `IMPLIES_FIRST_MIGRATABLE` per the migration open question (§9,
/// recorded in DESIGN.md).
pub struct CloneBehavior;

impl ResourceBehavior for CloneBehavior {
    fn action_flags(&self, ctx: &Scheduler, action: &Action, node: Option<NodeId>) -> ActionFlags {
        let Some(resource) = action.resource else {
            return action.flags();
        };
        let instances = &ctx.resource(resource).members;

        match node {
            None => {
                // "Runnable somewhere": optional only if every instance is
                // optional, runnable if any instance is.
                let mut any_runnable = false;
                let mut all_optional = true;
                for &instance in instances {
                    let Some(inst_action) = find_task(ctx, instance, &action.task) else {
                        continue;
                    };
                    let f = ctx.action(inst_action).flags();
                    any_runnable |= f.contains(ActionFlags::RUNNABLE);
                    all_optional &= f.contains(ActionFlags::OPTIONAL);
                }
                let mut flags = action.flags();
                flags.set(ActionFlags::RUNNABLE, any_runnable);
                flags.set(ActionFlags::OPTIONAL, all_optional);
                flags
            }
            Some(node) => {
                let instance_here = instances
                    .iter()
                    .copied()
                    .find(|&instance| ctx.resource(instance).node == Some(node));
                match instance_here.and_then(|instance| find_task(ctx, instance, &action.task)) {
                    Some(inst_action) => ctx.action(inst_action).flags(),
                    None => {
                        let mut flags = action.flags();
                        flags.remove(ActionFlags::RUNNABLE);
                        flags
                    }
                }
            }
        }
    }

    fn update_actions(
        &self,
        ctx: &mut Scheduler,
        first: ActionKey,
        then: ActionKey,
        _node: Option<NodeId>,
        first_flags: ActionFlags,
        then_flags: ActionFlags,
        mut kind: OrderKind,
    ) -> ChangeFlags {
        if kind.contains(OrderKind::IMPLIES_FIRST_MIGRATABLE) {
            let migratable = can_migrate(ctx, ctx.action(first), ctx.action(then));
            kind.remove(OrderKind::IMPLIES_FIRST_MIGRATABLE);
            kind.insert(if migratable {
                OrderKind::ASYMMETRICAL
            } else {
                OrderKind::IMPLIES_FIRST
            });
        }
        generic_rule(ctx, first, then, kind, first_flags, then_flags)
    }

    fn location(&self, ctx: &Scheduler, resource: ResourceKey, node: Option<NodeId>, current: bool) -> Option<NodeId> {
        if let Some(node) = node {
            return Some(node);
        }
        let instances = &ctx.resource(resource).members;
        instances.iter().find_map(|&instance| {
            let inst = ctx.resource(instance);
            if current {
                inst.currently_running.then_some(inst.node).flatten()
            } else {
                inst.node
            }
        })
    }
}
