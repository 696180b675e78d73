use bitflags::bitflags;

bitflags! {
    /// Flags carried by an [`Action`](crate::action::Action).
    ///
    /// `OPTIONAL` and `RUNNABLE` are the two properties the resolver propagates
    /// to a fixed point; the rest are along for the ride but still flow through
    /// the same bitset so that `set_flag`/`clear_flag` have one implementation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ActionFlags: u16 {
        /// The cluster is allowed to skip this action.
        const OPTIONAL = 1 << 0;
        /// The cluster can currently execute this action.
        const RUNNABLE = 1 << 1;
        /// Represents a logical event without a real operation.
        const PSEUDO = 1 << 2;
        /// Always show this action in graph output, even if it ends up optional.
        const PRINT_ALWAYS = 1 << 3;
        /// This action needs at least `required_runnable_before` runnable
        /// predecessors (via `ONE_OR_MORE` edges) before it can be runnable.
        const REQUIRES_ANY = 1 << 4;
    }
}

bitflags! {
    /// Flags carried by a [`Resource`](crate::resource::Resource).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResourceFlags: u16 {
        /// The cluster is allowed to manage (start/stop) this resource.
        const MANAGED = 1 << 0;
        /// The cluster refuses to act on this resource (operator intervention pending).
        const BLOCKED = 1 << 1;
        /// This resource requires ordered notification of its peers on change.
        const NOTIFY = 1 << 2;
        /// A reload is pending for this resource.
        const RELOAD = 1 << 3;
    }
}

bitflags! {
    /// The result of applying one or more [`OrderKind`](crate::kind::OrderKind)
    /// rules to an edge: what the evaluator mutated, aggregated across kinds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeFlags: u8 {
        /// `first`'s flags were mutated; `first` and its successors need re-processing.
        const UPDATED_FIRST = 1 << 0;
        /// `then`'s flags were mutated; `then` and its successors need re-processing.
        const UPDATED_THEN = 1 << 1;
        /// The edge should be disabled (`kind = NONE`) and never evaluated again.
        const DISABLE = 1 << 2;
    }
}

impl ActionFlags {
    /// The flags a freshly parsed action carries before the resolver has had
    /// any input: skippable and runnable until proven otherwise.
    pub const fn fresh() -> Self {
        Self::OPTIONAL.union(Self::RUNNABLE)
    }
}
