//! End-to-end fixed-point scenarios, one per row of the scenario table.

use ordering_model::{
    effective_flags, Action, ActionFlags, Edge, NodeId, OrderKind, Resource, ResourceFlags,
    Scheduler, TaskName, Variant,
};
use ordering_resolver::{default_variant_table, dispatch::CloneBehavior, update};

/// Routes `tracing` events emitted by `update`/`expand` to the test harness's
/// captured output instead of discarding them; safe to call from every test
/// since `try_init` only installs the first subscriber it sees.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn simple_required_propagation() {
    init_tracing();
    let mut ctx = Scheduler::new();
    let variants = default_variant_table();

    let a = ctx.add_action(Action::new("a_start_0", TaskName::Start, 0));
    let b = ctx.add_action(Action::new("b_start_0", TaskName::Start, 0));
    ctx.link(a, b, Edge::new(a, OrderKind::IMPLIES_THEN));

    ctx.action_mut(a).clear_flag(ActionFlags::OPTIONAL);

    update(&mut ctx, &variants, b);

    assert!(!ctx.action(b).flags().contains(ActionFlags::OPTIONAL));
    assert!(ctx.action(a).flags().contains(ActionFlags::RUNNABLE));
    assert!(ctx.action(b).flags().contains(ActionFlags::RUNNABLE));
}

#[test]
fn blocked_unmanaged_stop_blocks_dependent_start() {
    init_tracing();
    let mut ctx = Scheduler::new();
    let variants = default_variant_table();

    let resource_a = ctx.add_resource(Resource::new(Variant::Primitive));
    ctx.resource_mut(resource_a).set_flags(ResourceFlags::BLOCKED);
    let a_stop = ctx.add_action(Action::new("a_stop_0", TaskName::Stop, 0).with_resource(resource_a));
    ctx.action_mut(a_stop).clear_flag(ActionFlags::RUNNABLE);
    ctx.resource_mut(resource_a).actions.push(a_stop);

    let resource_b = ctx.add_resource(Resource::new(Variant::Primitive));
    let b_start = ctx.add_action(Action::new("b_start_0", TaskName::Start, 0).with_resource(resource_b));
    ctx.resource_mut(resource_b).actions.push(b_start);

    ctx.link(a_stop, b_start, Edge::new(a_stop, OrderKind::RESTART));

    update(&mut ctx, &variants, b_start);

    assert!(!ctx.action(b_start).flags().contains(ActionFlags::RUNNABLE));
}

#[test]
fn one_or_more_threshold_reached() {
    init_tracing();
    let mut ctx = Scheduler::new();
    let variants = default_variant_table();

    let then = ctx.add_action(
        Action::new("then_start_0", TaskName::Start, 0)
            .with_flags(ActionFlags::OPTIONAL | ActionFlags::REQUIRES_ANY),
    );
    ctx.action_mut(then).required_runnable_before = 2;

    let f1 = ctx.add_action(Action::new("f1_start_0", TaskName::Start, 0));
    let f2 = ctx.add_action(Action::new("f2_start_0", TaskName::Start, 0));
    let f3 = ctx.add_action(Action::new("f3_start_0", TaskName::Start, 0));
    ctx.action_mut(f3).clear_flag(ActionFlags::RUNNABLE);

    ctx.link(f1, then, Edge::new(f1, OrderKind::ONE_OR_MORE));
    ctx.link(f2, then, Edge::new(f2, OrderKind::ONE_OR_MORE));
    ctx.link(f3, then, Edge::new(f3, OrderKind::ONE_OR_MORE));

    update(&mut ctx, &variants, then);

    assert_eq!(ctx.action(then).runnable_before, 2);
    assert!(ctx.action(then).flags().contains(ActionFlags::RUNNABLE));
}

#[test]
fn probe_disables_edge_without_touching_then() {
    init_tracing();
    let mut ctx = Scheduler::new();
    let variants = default_variant_table();

    let resource_first = ctx.add_resource(Resource::new(Variant::Primitive));
    ctx.resource_mut(resource_first).currently_running = true;
    let first = ctx.add_action(Action::new("r_stop_0", TaskName::Stop, 0).with_resource(resource_first));
    ctx.action_mut(first).clear_flag(ActionFlags::RUNNABLE);
    ctx.resource_mut(resource_first).actions.push(first);

    let resource_then = ctx.add_resource(Resource::new(Variant::Primitive));
    let then = ctx.add_action(Action::new("t_start_0", TaskName::Start, 0).with_resource(resource_then));
    ctx.resource_mut(resource_then).actions.push(then);

    ctx.link(first, then, Edge::new(first, OrderKind::PROBE));

    update(&mut ctx, &variants, then);

    assert_eq!(ctx.action(then).predecessor_edge(first).unwrap().kind, OrderKind::NONE);
    assert!(ctx.action(then).flags().contains(ActionFlags::RUNNABLE));
}

#[test]
fn clone_reports_runnable_anywhere() {
    init_tracing();
    let mut ctx = Scheduler::new();

    let n_here: NodeId = ctx.add_node();
    let n_elsewhere: NodeId = ctx.add_node();

    let clone_resource = ctx.add_resource(Resource::new(Variant::Clone));
    let inst_here = ctx.add_resource(Resource::new(Variant::Primitive));
    let inst_elsewhere = ctx.add_resource(Resource::new(Variant::Primitive));
    ctx.resource_mut(inst_here).node = Some(n_here);
    ctx.resource_mut(inst_elsewhere).node = Some(n_elsewhere);

    let inst_here_start = ctx.add_action(Action::new("h_start_0", TaskName::Start, 0).with_resource(inst_here));
    ctx.action_mut(inst_here_start).clear_flag(ActionFlags::RUNNABLE);
    ctx.resource_mut(inst_here).actions.push(inst_here_start);

    let inst_elsewhere_start =
        ctx.add_action(Action::new("e_start_0", TaskName::Start, 0).with_resource(inst_elsewhere));
    ctx.resource_mut(inst_elsewhere).actions.push(inst_elsewhere_start);

    ctx.resource_mut(clone_resource).members = vec![inst_here, inst_elsewhere];
    let clone_start = ctx.add_action(Action::new("c_start_0", TaskName::Start, 0).with_resource(clone_resource));

    let behavior = CloneBehavior;
    let effective = effective_flags(&ctx, ctx.action(clone_start), Some(n_here), true, &behavior);

    assert!(effective.contains(ActionFlags::RUNNABLE));
}

#[test]
fn group_start_node_fixup_keeps_same_node_edge_alive() {
    init_tracing();
    let mut ctx = Scheduler::new();
    let variants = default_variant_table();

    let n: NodeId = ctx.add_node();

    let group_resource = ctx.add_resource(Resource::new(Variant::Group));
    let member_resource = ctx.add_resource(Resource::new(Variant::Primitive));
    ctx.resource_mut(member_resource).node = Some(n);
    ctx.resource_mut(group_resource).members = vec![member_resource];

    let group_start = ctx.add_action(Action::new("g_start_0", TaskName::Start, 0).with_resource(group_resource));

    let t = ctx.add_action(Action::new("t_start_0", TaskName::Start, 0).with_node(n));
    ctx.link(group_start, t, Edge::new(group_start, OrderKind::SAME_NODE));

    update(&mut ctx, &variants, t);

    assert_eq!(
        ctx.action(t).predecessor_edge(group_start).unwrap().kind,
        OrderKind::SAME_NODE
    );
}

#[test]
fn update_is_idempotent_at_the_fixed_point() {
    init_tracing();
    let mut ctx = Scheduler::new();
    let variants = default_variant_table();

    let a = ctx.add_action(Action::new("a_start_0", TaskName::Start, 0));
    let b = ctx.add_action(Action::new("b_start_0", TaskName::Start, 0));
    ctx.link(a, b, Edge::new(a, OrderKind::IMPLIES_THEN));
    ctx.action_mut(a).clear_flag(ActionFlags::OPTIONAL);

    update(&mut ctx, &variants, b);
    let snapshot_a = ctx.action(a).flags();
    let snapshot_b = ctx.action(b).flags();

    update(&mut ctx, &variants, b);

    assert_eq!(ctx.action(a).flags(), snapshot_a);
    assert_eq!(ctx.action(b).flags(), snapshot_b);
}

#[test]
fn disabled_edge_is_a_no_op() {
    init_tracing();
    let mut ctx = Scheduler::new();
    let variants = default_variant_table();

    let a = ctx.add_action(Action::new("a_start_0", TaskName::Start, 0));
    let b = ctx.add_action(Action::new("b_start_0", TaskName::Start, 0));
    ctx.link(a, b, Edge::new(a, OrderKind::NONE));
    ctx.action_mut(a).clear_flag(ActionFlags::OPTIONAL);

    let before = ctx.action(b).flags();
    update(&mut ctx, &variants, b);

    assert_eq!(ctx.action(b).flags(), before);
    assert_eq!(ctx.action(b).runnable_before, 0);
}

#[test]
fn same_node_edge_disabled_across_distinct_nodes() {
    init_tracing();
    let mut ctx = Scheduler::new();
    let variants = default_variant_table();

    let n1: NodeId = ctx.add_node();
    let n2: NodeId = ctx.add_node();

    let a = ctx.add_action(Action::new("a_start_0", TaskName::Start, 0).with_node(n1));
    let b = ctx.add_action(Action::new("b_start_0", TaskName::Start, 0).with_node(n2));
    ctx.link(a, b, Edge::new(a, OrderKind::SAME_NODE));

    update(&mut ctx, &variants, b);

    assert_eq!(ctx.action(b).predecessor_edge(a).unwrap().kind, OrderKind::NONE);
}

#[test]
fn print_always_marking_does_not_reopen_fixed_point() {
    init_tracing();
    let mut ctx = Scheduler::new();
    let variants = default_variant_table();

    let a = ctx.add_action(Action::new("a_start_0", TaskName::Start, 0));
    let b = ctx.add_action(Action::new("b_start_0", TaskName::Start, 0));
    ctx.action_mut(a).clear_flag(ActionFlags::OPTIONAL);
    ctx.action_mut(b).clear_flag(ActionFlags::OPTIONAL);
    ctx.link(
        a,
        b,
        Edge::new(a, OrderKind::IMPLIES_THEN_PRINTED | OrderKind::IMPLIES_FIRST_PRINTED),
    );

    update(&mut ctx, &variants, b);

    assert!(ctx.action(a).flags().contains(ActionFlags::PRINT_ALWAYS));
    assert!(ctx.action(b).flags().contains(ActionFlags::PRINT_ALWAYS));

    let snapshot_a = ctx.action(a).flags();
    let snapshot_b = ctx.action(b).flags();

    update(&mut ctx, &variants, b);

    assert_eq!(ctx.action(a).flags(), snapshot_a);
    assert_eq!(ctx.action(b).flags(), snapshot_b);
}

#[test]
fn migratable_clone_pair_propagates_asymmetrically() {
    init_tracing();
    let mut ctx = Scheduler::new();
    let variants = default_variant_table();

    let parent = ctx.add_resource(Resource::new(Variant::Bundle));

    let first_resource = ctx.add_resource(Resource::new(Variant::Primitive));
    ctx.resource_mut(first_resource).parent = Some(parent);
    let first = ctx.add_action(Action::new("first_start_0", TaskName::Start, 0).with_resource(first_resource));
    ctx.action_mut(first).clear_flag(ActionFlags::OPTIONAL);

    let then_resource = ctx.add_resource(Resource::new(Variant::Clone));
    ctx.resource_mut(then_resource).parent = Some(parent);
    let then = ctx.add_action(Action::new("then_start_0", TaskName::Start, 0).with_resource(then_resource));
    ctx.action_mut(then).clear_flag(ActionFlags::RUNNABLE);

    ctx.link(first, then, Edge::new(first, OrderKind::IMPLIES_FIRST_MIGRATABLE));

    update(&mut ctx, &variants, then);

    assert!(ctx.action(then).flags().contains(ActionFlags::RUNNABLE));
    assert!(ctx.action(first).flags().contains(ActionFlags::RUNNABLE));
}

#[test]
fn blocked_clone_pair_falls_back_to_implies_first() {
    init_tracing();
    let mut ctx = Scheduler::new();
    let variants = default_variant_table();

    let parent = ctx.add_resource(Resource::new(Variant::Bundle));

    let first_resource = ctx.add_resource(Resource::new(Variant::Primitive));
    ctx.resource_mut(first_resource).parent = Some(parent);
    let first = ctx.add_action(Action::new("first_start_0", TaskName::Start, 0).with_resource(first_resource));
    ctx.action_mut(first).clear_flag(ActionFlags::OPTIONAL);

    let then_resource = ctx.add_resource(Resource::new(Variant::Clone));
    ctx.resource_mut(then_resource).parent = Some(parent);
    ctx.resource_mut(then_resource).set_flags(ResourceFlags::BLOCKED);

    let member_resource = ctx.add_resource(Resource::new(Variant::Primitive));
    let member_start = ctx.add_action(Action::new("member_start_0", TaskName::Start, 0).with_resource(member_resource));
    ctx.action_mut(member_start).clear_flag(ActionFlags::OPTIONAL);
    ctx.action_mut(member_start).clear_flag(ActionFlags::RUNNABLE);
    ctx.resource_mut(member_resource).actions.push(member_start);
    ctx.resource_mut(then_resource).members.push(member_resource);

    let then = ctx.add_action(Action::new("then_start_0", TaskName::Start, 0).with_resource(then_resource));
    ctx.action_mut(then).clear_flag(ActionFlags::RUNNABLE);

    ctx.link(first, then, Edge::new(first, OrderKind::IMPLIES_FIRST_MIGRATABLE));

    update(&mut ctx, &variants, then);

    assert!(!ctx.action(first).flags().contains(ActionFlags::RUNNABLE));
    assert!(!ctx.action(then).flags().contains(ActionFlags::RUNNABLE));
}
