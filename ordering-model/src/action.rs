use std::fmt;

use crate::{
    flags::ActionFlags,
    ids::{ActionKey, NodeId, ResourceKey},
    kind::OrderKind,
    resource::ResourceBehavior,
    scheduler::Scheduler,
};

/// The task an [`Action`] performs, already classified by the host at
/// construction time. The raw `uuid` (§6.3) is kept around purely as a label;
/// classification doesn't round-trip through string parsing except inside
/// expansion (`ordering-resolver`'s C4), which genuinely needs the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskName {
    Start,
    Stop,
    Monitor,
    Notify,
    Promote,
    Demote,
    Reload,
    Shutdown,
    Fence,
    Running,
    Stopped,
    Notified,
    Promoted,
    Demoted,
    /// Anything else, most commonly a pseudo-action's event name.
    Other(Box<str>),
}

impl TaskName {
    /// Whether this task is already one of the post-completion forms C4 maps
    /// composite `start`/`stop`/… actions onto.
    pub fn is_already_expanded(&self) -> bool {
        matches!(
            self,
            Self::Running | Self::Stopped | Self::Notified | Self::Promoted | Self::Demoted
        )
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Monitor => "monitor",
            Self::Notify => "notify",
            Self::Promote => "promote",
            Self::Demote => "demote",
            Self::Reload => "reload",
            Self::Shutdown => "shutdown",
            Self::Fence => "fence",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Notified => "notified",
            Self::Promoted => "promoted",
            Self::Demoted => "demoted",
            Self::Other(s) => s,
        };
        f.write_str(s)
    }
}

/// A directed predecessor reference: "`peer` is ordered before the action
/// that owns this edge", tagged with the (possibly composite) [`OrderKind`].
///
/// A `kind` of [`OrderKind::NONE`] marks a permanently disabled edge (§3
/// invariant 5); disabled edges are skipped by the evaluator but never
/// removed from the list, so indices and external references stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub peer: ActionKey,
    pub kind: OrderKind,
}

impl Edge {
    pub fn new(peer: ActionKey, kind: OrderKind) -> Self {
        Self { peer, kind }
    }

    /// Whether this edge still participates in propagation.
    pub fn is_enabled(&self) -> bool {
        !self.kind.is_empty()
    }
}

/// A unit of work the cluster may perform: `start`, `stop`, `running`,
/// `promoted`, `notify`, … (§3).
#[derive(Debug, Clone)]
pub struct Action {
    /// The `<resource-id>_<task>_<interval-ms>` label (§6.3). Kept verbatim;
    /// only C4's expansion parses it.
    pub uuid: Box<str>,
    pub task: TaskName,
    pub interval_ms: u32,
    pub resource: Option<ResourceKey>,
    pub node: Option<NodeId>,
    flags: ActionFlags,
    pub predecessors: Vec<Edge>,
    /// Targets that name this action as a predecessor; maintained purely so
    /// the fixed-point driver can re-enqueue "every successor of X" without a
    /// full graph scan. Carries no kind of its own; the authoritative edge
    /// (with its `OrderKind`) lives in the successor's `predecessors` list.
    pub successors: Vec<ActionKey>,
    /// Count of runnable predecessors observed so far on `ONE_OR_MORE` edges.
    pub runnable_before: u32,
    /// Threshold `runnable_before` must reach for `REQUIRES_ANY` actions to
    /// become runnable. Zero means "not yet configured"; the driver defaults
    /// it to 1 the first time it processes such an action (§4.6 preamble).
    pub required_runnable_before: u32,
}

impl Action {
    pub fn new(uuid: impl Into<Box<str>>, task: TaskName, interval_ms: u32) -> Self {
        Self {
            uuid: uuid.into(),
            task,
            interval_ms,
            resource: None,
            node: None,
            flags: ActionFlags::fresh(),
            predecessors: Vec::new(),
            successors: Vec::new(),
            runnable_before: 0,
            required_runnable_before: 0,
        }
    }

    pub fn with_resource(mut self, resource: ResourceKey) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    pub fn with_flags(mut self, flags: ActionFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn flags(&self) -> ActionFlags {
        self.flags
    }

    /// Sets `flag`, returning whether it was actually newly set. Callers rely
    /// on this to decide whether to reschedule (§4.1).
    pub fn set_flag(&mut self, flag: ActionFlags) -> bool {
        let changed = !self.flags.contains(flag);
        self.flags.insert(flag);
        changed
    }

    /// Clears `flag`, returning whether it was actually set beforehand.
    pub fn clear_flag(&mut self, flag: ActionFlags) -> bool {
        let changed = self.flags.contains(flag);
        self.flags.remove(flag);
        changed
    }

    pub fn predecessors(&self) -> &[Edge] {
        &self.predecessors
    }

    pub fn successors(&self) -> &[ActionKey] {
        &self.successors
    }

    /// Looks up an existing predecessor edge naming `peer`, regardless of kind.
    pub fn predecessor_edge(&self, peer: ActionKey) -> Option<&Edge> {
        self.predecessors.iter().find(|e| e.peer == peer)
    }

    pub fn predecessor_edge_mut(&mut self, peer: ActionKey) -> Option<&mut Edge> {
        self.predecessors.iter_mut().find(|e| e.peer == peer)
    }
}

/// `effective_flags(a, peer_node)` (§4.1): the flags relevant to *ordering*,
/// as opposed to `a.flags()` which is the raw bitset. Resource-bearing
/// actions delegate to the variant's [`ResourceBehavior::action_flags`]; the
/// clone asymmetry ("runnable somewhere" vs. "runnable here") is restored
/// here because it is specific to ordering, not to assignment or colocation.
pub fn effective_flags(
    ctx: &Scheduler,
    action: &Action,
    peer_node: Option<NodeId>,
    is_clone: bool,
    behavior: &dyn ResourceBehavior,
) -> ActionFlags {
    if action.resource.is_none() {
        return action.flags();
    }

    let f0 = behavior.action_flags(ctx, action, None);

    let Some(peer_node) = peer_node else {
        return f0;
    };
    if !is_clone {
        return f0;
    }

    let mut f1 = behavior.action_flags(ctx, action, Some(peer_node));
    if f0.contains(ActionFlags::RUNNABLE) && !f1.contains(ActionFlags::RUNNABLE) {
        f1.insert(ActionFlags::RUNNABLE);
    }
    f1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;

    struct Passthrough;
    impl ResourceBehavior for Passthrough {
        fn action_flags(&self, _ctx: &Scheduler, action: &Action, _node: Option<NodeId>) -> ActionFlags {
            action.flags()
        }
        fn update_actions(
            &self,
            _ctx: &mut Scheduler,
            _first: ActionKey,
            _then: ActionKey,
            _node: Option<NodeId>,
            _first_flags: ActionFlags,
            _then_flags_mask: ActionFlags,
            _kind: OrderKind,
        ) -> crate::flags::ChangeFlags {
            crate::flags::ChangeFlags::empty()
        }
        fn location(&self, _ctx: &Scheduler, _resource: ResourceKey, node: Option<NodeId>, _current: bool) -> Option<NodeId> {
            node
        }
    }

    #[test]
    fn set_flag_reports_whether_it_changed() {
        let mut a = Action::new("r_start_0", TaskName::Start, 0);
        a = a.with_flags(ActionFlags::empty());
        assert!(a.set_flag(ActionFlags::RUNNABLE));
        assert!(!a.set_flag(ActionFlags::RUNNABLE));
    }

    #[test]
    fn effective_flags_without_resource_is_raw_flags() {
        let ctx = Scheduler::new();
        let a = Action::new("r_start_0", TaskName::Start, 0);
        let behavior = Passthrough;
        assert_eq!(effective_flags(&ctx, &a, None, false, &behavior), a.flags());
    }

    #[test]
    fn task_display_matches_uuid_grammar_tokens() {
        assert_eq!(TaskName::Start.to_string(), "start");
        assert_eq!(TaskName::Other("custom-event".into()).to_string(), "custom-event");
    }
}
