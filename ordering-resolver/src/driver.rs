//! Fixed-point driver (C6): the `update()` entry point and the explicit
//! work-queue that replaces the naive recursive formulation (§9).

use std::collections::{HashSet, VecDeque};

use ordering_model::{
    effective_flags, ActionFlags, ActionKey, ChangeFlags, NodeId, OrderKind, ResourceBehavior,
    Scheduler, TaskName, Variant, VariantTable,
};

use crate::{evaluate::evaluate, expansion::expand, transforms::order_actions};

/// Runs the fixed-point pass starting from `then`: processes it, and keeps
/// processing whatever its processing schedules, until the queue drains.
/// Returns once no action is left that needs recomputation (§6, operation 1).
///
/// Implemented as an explicit work queue rather than recursion (§9 design
/// note, §5 concurrency model): the graph may have thousands of actions
/// and Rust does not guarantee tail-call elimination.
#[tracing::instrument(level = "debug", skip(ctx, variants))]
pub fn update(ctx: &mut Scheduler, variants: &VariantTable, then: ActionKey) -> bool {
    let mut queue = VecDeque::new();
    let mut queued = HashSet::new();
    enqueue(&mut queue, &mut queued, then);

    let mut iterations = 0usize;
    while let Some(action) = queue.pop_front() {
        queued.remove(&action);
        iterations += 1;
        if iterations > ctx.limits.max_queue_iterations {
            panic!(
                "ordering resolver exceeded its sanity bound of {} work-queue iterations; \
                 this indicates a non-monotone propagation rule, not a large cluster",
                ctx.limits.max_queue_iterations,
            );
        }
        process(ctx, variants, action, &mut queue, &mut queued);
    }

    true
}

fn enqueue(queue: &mut VecDeque<ActionKey>, queued: &mut HashSet<ActionKey>, action: ActionKey) {
    if queued.insert(action) {
        queue.push_back(action);
    }
}

fn enqueue_successors(
    ctx: &Scheduler,
    queue: &mut VecDeque<ActionKey>,
    queued: &mut HashSet<ActionKey>,
    action: ActionKey,
) {
    for &successor in ctx.action(action).successors() {
        enqueue(queue, queued, successor);
    }
}

/// One full pass over `then`'s predecessor edges: preamble, edge loop,
/// postamble (§4.6). Schedules `first`/`then` and their successors on
/// `queue` instead of recursing into them directly.
fn process(
    ctx: &mut Scheduler,
    variants: &VariantTable,
    then: ActionKey,
    queue: &mut VecDeque<ActionKey>,
    queued: &mut HashSet<ActionKey>,
) {
    // Snapshot taken before the REQUIRES_ANY reset below, not after: the
    // postamble uses it to detect whether this pass actually changed
    // anything externally visible. Comparing against the post-reset state
    // instead would make every `ONE_OR_MORE` action re-trigger its own
    // postamble forever, since the reset always looks like a "change" from
    // blank back to steady-state, which would contradict the termination
    // argument in §4.6.
    let flags_at_entry = ctx.action(then).flags();
    let had_runnable_at_entry = flags_at_entry.contains(ActionFlags::RUNNABLE);
    let requires_any = flags_at_entry.contains(ActionFlags::REQUIRES_ANY);
    if requires_any {
        let a = ctx.action_mut(then);
        a.runnable_before = 0;
        if a.required_runnable_before == 0 {
            a.required_runnable_before = 1;
        }
        a.clear_flag(ActionFlags::RUNNABLE);
    }

    let mut then_updated = false;
    let edge_count = ctx.action(then).predecessors().len();

    for i in 0..edge_count {
        let edge = ctx.action(then).predecessors()[i];
        if !edge.is_enabled() {
            continue;
        }
        let first_raw = edge.peer;
        let kind = edge.kind;

        // Step 1: group-start node fix-up.
        let first_node = effective_node(ctx, variants, first_raw);
        let then_node = effective_node(ctx, variants, then);

        // Step 2: same-node filter (§3 invariant 5).
        if kind.contains(OrderKind::SAME_NODE) {
            if let (Some(fnode), Some(tnode)) = (first_node, then_node) {
                if fnode != tnode {
                    ctx.action_mut(then).predecessors[i].kind = OrderKind::NONE;
                    continue;
                }
            }
        }

        // Step 3: cancellation.
        if kind.contains(OrderKind::THEN_CANCELS_FIRST) && !ctx.action(then).flags().contains(ActionFlags::OPTIONAL) {
            let became_optional = ctx.action_mut(first_raw).set_flag(ActionFlags::OPTIONAL);
            if ctx.action(first_raw).task == TaskName::Reload {
                if let Some(resource) = ctx.action(first_raw).resource {
                    ctx.resource_mut(resource).clear_flag(ordering_model::ResourceFlags::RELOAD);
                }
            }
            if became_optional {
                enqueue(queue, queued, first_raw);
                enqueue_successors(ctx, queue, queued, first_raw);
            }
        }

        // Step 4: expansion.
        let mut first = first_raw;
        let first_resource = ctx.action(first_raw).resource;
        let then_resource = ctx.action(then).resource;
        let distinct_non_ancestor = match (first_resource, then_resource) {
            (Some(fr), Some(tr)) if fr != tr => {
                let then_variant = ctx.resource(tr).variant;
                !variants.get(then_variant).is_ancestor(ctx, tr, fr)
            }
            _ => false,
        };
        if distinct_non_ancestor {
            let expanded = expand(ctx, first_raw);
            if expanded != first_raw {
                first = expanded;
                if order_actions(ctx, first, then, kind) {
                    ctx.action_mut(then).predecessors[i].kind = OrderKind::NONE;
                    then_updated = true;
                    continue;
                }
            }
        }

        // Step 5: effective flags.
        let first_flags = effective_flags(
            ctx,
            ctx.action(first),
            then_node,
            is_clone(ctx, first),
            behavior_for(ctx, variants, first),
        );
        let then_flags = effective_flags(
            ctx,
            ctx.action(then),
            first_node,
            is_clone(ctx, then),
            behavior_for(ctx, variants, then),
        );

        // Step 6: evaluate.
        let bits = evaluate(ctx, variants, first, then, first_node, kind, first_flags, then_flags);

        // Step 7: apply change bits.
        if bits.contains(ChangeFlags::DISABLE) {
            ctx.action_mut(then).predecessors[i].kind = OrderKind::NONE;
        }
        if bits.contains(ChangeFlags::UPDATED_FIRST) {
            enqueue(queue, queued, first);
            enqueue_successors(ctx, queue, queued, first);
        }
        if bits.contains(ChangeFlags::UPDATED_THEN) {
            then_updated = true;
        }
    }

    // Postamble.
    if requires_any && ctx.action(then).flags() != flags_at_entry {
        then_updated = true;
    }

    if then_updated {
        let lost_runnable = had_runnable_at_entry && !ctx.action(then).flags().contains(ActionFlags::RUNNABLE);
        if lost_runnable {
            notify_colocation(ctx, then);
        }
        enqueue(queue, queued, then);
        enqueue_successors(ctx, queue, queued, then);
    }
}

/// Resolves the node used for ordering computations for `action`, applying
/// the group-start fix-up (§4.6 step 1): an unbound group `start` is
/// substituted with the group's current effective location.
fn effective_node(ctx: &Scheduler, variants: &VariantTable, action: ActionKey) -> Option<NodeId> {
    let a = ctx.action(action);
    if let Some(node) = a.node {
        return Some(node);
    }
    let Some(resource) = a.resource else {
        return None;
    };
    if a.task != TaskName::Start {
        return None;
    }
    let variant = ctx.resource(resource).variant;
    if variant != Variant::Group {
        return None;
    }
    variants.get(variant).location(ctx, resource, None, true)
}

fn is_clone(ctx: &Scheduler, action: ActionKey) -> bool {
    ctx.action(action)
        .resource
        .map(|r| ctx.resource(r).variant == Variant::Clone)
        .unwrap_or(false)
}

fn behavior_for<'a>(ctx: &Scheduler, variants: &'a VariantTable, action: ActionKey) -> &'a dyn ResourceBehavior {
    let variant = ctx
        .action(action)
        .resource
        .map(|r| ctx.resource(r).variant)
        .unwrap_or(Variant::Primitive);
    variants.get(variant)
}

/// §4.6 postamble: `then` lost `RUNNABLE` this pass, so report every
/// predecessor's resource paired with `then`'s to the colocation side
/// channel: starting either one on the same node is now unsafe to allow.
fn notify_colocation(ctx: &mut Scheduler, then: ActionKey) {
    let Some(then_resource) = ctx.action(then).resource else {
        return;
    };
    let predecessor_resources: Vec<_> = ctx
        .action(then)
        .predecessors()
        .iter()
        .filter(|e| e.is_enabled())
        .filter_map(|e| ctx.action(e.peer).resource)
        .collect();
    for first_resource in predecessor_resources {
        ctx.colocation.colocate_to_avoid(first_resource, then_resource);
    }
}
