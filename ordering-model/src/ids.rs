use slotmap::new_key_type;

new_key_type! {
    /// A handle to an [`Action`](crate::action::Action) inside a [`Scheduler`](crate::scheduler::Scheduler).
    pub struct ActionKey;

    /// A handle to a [`Resource`](crate::resource::Resource) inside a [`Scheduler`](crate::scheduler::Scheduler).
    pub struct ResourceKey;

    /// An opaque cluster member identity.
    ///
    /// `NodeId`s are compared by which slot they occupy, never by any label a
    /// host might attach to them (two nodes that happen to share a name are
    /// still distinct `NodeId`s), and there is deliberately no `FromStr`.
    pub struct NodeId;
}
