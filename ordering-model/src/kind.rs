use bitflags::bitflags;

bitflags! {
    /// The closed vocabulary of ordering-constraint kinds an [`Edge`](crate::action::Edge)
    /// can carry. An edge may carry more than one kind at once (bitwise composition);
    /// the evaluator applies every set bit.
    ///
    /// `NONE` (the empty set) marks a disabled edge: §3 invariant 5 and the
    /// probe/same-node rules disable edges by clearing this to empty, never by
    /// removing the edge from its action's list.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OrderKind: u16 {
        const IMPLIES_THEN = 1 << 0;
        const IMPLIES_THEN_ON_NODE = 1 << 1;
        const IMPLIES_FIRST = 1 << 2;
        const PROMOTED_IMPLIES_FIRST = 1 << 3;
        const RESTART = 1 << 4;
        const ONE_OR_MORE = 1 << 5;
        const PROBE = 1 << 6;
        const RUNNABLE_LEFT = 1 << 7;
        const IMPLIES_FIRST_MIGRATABLE = 1 << 8;
        const PSEUDO_LEFT = 1 << 9;
        const OPTIONAL = 1 << 10;
        const ASYMMETRICAL = 1 << 11;
        const IMPLIES_THEN_PRINTED = 1 << 12;
        const IMPLIES_FIRST_PRINTED = 1 << 13;
        const THEN_CANCELS_FIRST = 1 << 14;
        const SAME_NODE = 1 << 15;
    }
}

impl OrderKind {
    /// A disabled edge: the empty set. Named for readability at call sites
    /// instead of spelling out `OrderKind::empty()`.
    pub const NONE: Self = Self::empty();

    /// Kinds whose rule consults whether `first.resource` is currently
    /// unmanaged, blocked and unrunnable (the "blocked unmanaged stop" special
    /// case in §4.5). `RESTART` is the common case (`stop` ordered before a
    /// restart's `start`), but `IMPLIES_THEN`/`IMPLIES_FIRST` carry the same
    /// rule whenever their `first` happens to be a `stop`.
    pub const BLOCKED_STOP_KINDS: Self = Self::IMPLIES_THEN
        .union(Self::IMPLIES_FIRST)
        .union(Self::RESTART);
}
