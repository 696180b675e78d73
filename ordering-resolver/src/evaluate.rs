//! Edge evaluator (C5): applies every ordering kind an edge carries against
//! the pair's already-computed effective flags.

use ordering_model::{ActionFlags, ActionKey, ChangeFlags, NodeId, OrderKind, Scheduler, VariantTable};

/// Runs every rule a composite `kind` carries against `(first, then)`,
/// returning the aggregate change bits (§4.5).
///
/// `first_flags`/`then_flags` are the *effective* flags already computed by
/// the caller (§4.1's `effective_flags`, variant-aware); this function never
/// recomputes them.
#[allow(clippy::too_many_arguments)]
pub fn evaluate(
    ctx: &mut Scheduler,
    variants: &VariantTable,
    first: ActionKey,
    then: ActionKey,
    node: Option<NodeId>,
    kind: OrderKind,
    first_flags: ActionFlags,
    then_flags: ActionFlags,
) -> ChangeFlags {
    let mut kind = kind;
    if kind.contains(OrderKind::IMPLIES_THEN_ON_NODE) {
        kind.remove(OrderKind::IMPLIES_THEN_ON_NODE);
        kind.insert(OrderKind::IMPLIES_THEN);
    }

    let mut bits = ChangeFlags::empty();

    mark_print_always(ctx, first, then, kind, first_flags, then_flags);

    if kind.intersects(OrderKind::BLOCKED_STOP_KINDS) && is_blocked_unmanaged_stop(ctx, first) {
        let then_action = ctx.action_mut(then);
        if then_action.flags().contains(ActionFlags::RUNNABLE) && then_action.clear_flag(ActionFlags::RUNNABLE) {
            bits |= ChangeFlags::UPDATED_THEN;
        }
    }

    if let Some(resource) = ctx.action(then).resource {
        let variant = ctx.resource(resource).variant;
        let behavior = variants.get(variant);
        bits |= behavior.update_actions(ctx, first, then, node, first_flags, then_flags, kind);
    } else {
        bits |= generic_rule(ctx, first, then, kind, first_flags, then_flags);
    }

    bits
}

/// The resource-agnostic propagation rule for one edge (§4.2). Used directly
/// when `then` has no owning resource, and reused verbatim by
/// [`crate::dispatch::Primitive`] (which, per §4.3, has nothing to add on
/// top of it), and as the base case the other three variants refine.
pub(crate) fn generic_rule(
    ctx: &mut Scheduler,
    first: ActionKey,
    then: ActionKey,
    kind: OrderKind,
    first_flags: ActionFlags,
    then_flags: ActionFlags,
) -> ChangeFlags {
    let mut bits = ChangeFlags::empty();

    if kind.intersects(OrderKind::IMPLIES_THEN)
        && !first_flags.contains(ActionFlags::OPTIONAL)
        && then_flags.contains(ActionFlags::OPTIONAL)
        && ctx.action_mut(then).clear_flag(ActionFlags::OPTIONAL)
    {
        bits |= ChangeFlags::UPDATED_THEN;
    }

    if kind.intersects(OrderKind::RESTART) && !first_flags.contains(ActionFlags::OPTIONAL) {
        let then_action = ctx.action_mut(then);
        let a = then_action.clear_flag(ActionFlags::OPTIONAL);
        let b = then_action.clear_flag(ActionFlags::RUNNABLE);
        if a || b {
            bits |= ChangeFlags::UPDATED_THEN;
        }
    }

    if kind.intersects(OrderKind::IMPLIES_FIRST | OrderKind::PROMOTED_IMPLIES_FIRST | OrderKind::IMPLIES_FIRST_MIGRATABLE)
        && !then_flags.contains(ActionFlags::OPTIONAL)
        && first_flags.contains(ActionFlags::RUNNABLE)
        && ctx.action_mut(first).clear_flag(ActionFlags::RUNNABLE)
    {
        bits |= ChangeFlags::UPDATED_FIRST;
    }

    if kind.intersects(OrderKind::ONE_OR_MORE) && first_flags.contains(ActionFlags::RUNNABLE) {
        let then_action = ctx.action_mut(then);
        then_action.runnable_before += 1;
        if then_action.required_runnable_before == 0 {
            then_action.required_runnable_before = 1;
        }
        if then_action.runnable_before >= then_action.required_runnable_before
            && then_action.set_flag(ActionFlags::RUNNABLE)
        {
            bits |= ChangeFlags::UPDATED_THEN;
        }
    }

    if kind.intersects(OrderKind::PROBE) {
        let first_running = ctx
            .action(first)
            .resource
            .map(|r| ctx.resource(r).currently_running)
            .unwrap_or(false);
        if !first_flags.contains(ActionFlags::RUNNABLE) && first_running {
            bits |= ChangeFlags::DISABLE;
        } else if first_flags.contains(ActionFlags::RUNNABLE) && ctx.action_mut(then).set_flag(ActionFlags::RUNNABLE) {
            bits |= ChangeFlags::UPDATED_THEN;
        }
    }

    if kind.intersects(OrderKind::RUNNABLE_LEFT)
        && !first_flags.contains(ActionFlags::RUNNABLE)
        && ctx.action_mut(then).clear_flag(ActionFlags::RUNNABLE)
    {
        bits |= ChangeFlags::UPDATED_THEN;
    }

    if kind.intersects(OrderKind::PSEUDO_LEFT)
        && first_flags.contains(ActionFlags::PSEUDO)
        && !first_flags.contains(ActionFlags::RUNNABLE)
        && ctx.action_mut(then).clear_flag(ActionFlags::RUNNABLE)
    {
        bits |= ChangeFlags::UPDATED_THEN;
    }

    if kind.intersects(OrderKind::ASYMMETRICAL)
        && first_flags.contains(ActionFlags::RUNNABLE)
        && ctx.action_mut(then).set_flag(ActionFlags::RUNNABLE)
    {
        bits |= ChangeFlags::UPDATED_THEN;
    }

    bits
}

fn mark_print_always(
    ctx: &mut Scheduler,
    first: ActionKey,
    then: ActionKey,
    kind: OrderKind,
    first_flags: ActionFlags,
    then_flags: ActionFlags,
) {
    if kind.contains(OrderKind::IMPLIES_THEN_PRINTED)
        && first_flags.contains(ActionFlags::RUNNABLE)
        && !first_flags.contains(ActionFlags::OPTIONAL)
    {
        ctx.action_mut(then).set_flag(ActionFlags::PRINT_ALWAYS);
    }
    if kind.contains(OrderKind::IMPLIES_FIRST_PRINTED) && !then_flags.contains(ActionFlags::OPTIONAL) {
        ctx.action_mut(first).set_flag(ActionFlags::PRINT_ALWAYS);
    }
}

/// "first is a stop, on an unmanaged, blocked, currently-unrunnable resource"
/// (§4.5's blocked-unmanaged-stop special case).
fn is_blocked_unmanaged_stop(ctx: &Scheduler, first: ActionKey) -> bool {
    use ordering_model::TaskName;

    let action = ctx.action(first);
    if action.task != TaskName::Stop {
        return false;
    }
    if action.flags().contains(ActionFlags::RUNNABLE) {
        return false;
    }
    action
        .resource
        .map(|r| ctx.resource(r).is_unmanaged_and_blocked())
        .unwrap_or(false)
}
