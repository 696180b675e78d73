//! Auxiliary transforms (C7): idempotent edge attachment during expansion,
//! and the migration refinement helper clones and bundles share.

use ordering_model::{Action, ActionKey, Edge, OrderKind, ResourceKey, Scheduler, TaskName};

/// Attaches a predecessor edge on `then` referencing `first` with `kind`,
/// unless one already exists (idempotent per §4.7). Returns whether a new
/// edge was actually created.
///
/// If an edge to `first` already exists with a strict superset of `kind`,
/// that is an invariant violation (§7): the assertion only ever tightens
/// what an edge guarantees, never loosens it by silently dropping bits.
pub fn order_actions(ctx: &mut Scheduler, first: ActionKey, then: ActionKey, kind: OrderKind) -> bool {
    if let Some(existing) = ctx.action(then).predecessor_edge(first) {
        debug_assert!(
            !existing.kind.contains(kind) || existing.kind == kind,
            "order_actions would have weakened an existing edge from {:?} to {:?}",
            existing.kind,
            kind,
        );
        return false;
    }
    ctx.link(first, then, Edge::new(first, kind));
    true
}

/// Finds `resource`'s action for `task`, if it has one.
pub(crate) fn find_task(ctx: &Scheduler, resource: ResourceKey, task: &TaskName) -> Option<ActionKey> {
    ctx.resource(resource)
        .actions
        .iter()
        .copied()
        .find(|&key| ctx.action(key).task == *task)
}

/// Whether the clone/bundle instance pair behind `first` and `then` can
/// migrate in place rather than requiring a full stop-then-start (§4.7's
/// migration refinement, resolving the `IMPLIES_FIRST_MIGRATABLE` open
/// question per DESIGN.md). A pair can migrate when they are distinct
/// instances under the same composite parent and neither instance's
/// resource is blocked.
pub(crate) fn can_migrate(ctx: &Scheduler, first: &Action, then: &Action) -> bool {
    let (Some(first_resource), Some(then_resource)) = (first.resource, then.resource) else {
        return false;
    };
    if first_resource == then_resource {
        return false;
    }
    let first_parent = ctx.resource(first_resource).parent;
    let then_parent = ctx.resource(then_resource).parent;
    if first_parent.is_none() || first_parent != then_parent {
        return false;
    }
    !ctx.resource(first_resource).is_unmanaged_and_blocked() && !ctx.resource(then_resource).is_unmanaged_and_blocked()
}
