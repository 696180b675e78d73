//! Concrete per-variant resource behaviors (C3). Each submodule implements
//! [`ResourceBehavior`](ordering_model::ResourceBehavior) for one entry of
//! the composite-tree's ordered variant set.

mod bundle;
mod clone_;
mod group;
mod primitive;

pub use bundle::Bundle;
pub use clone_::CloneBehavior;
pub use group::Group;
pub use primitive::Primitive;

use ordering_model::{ResourceBehavior, Variant, VariantTable};

/// Builds the table used by every `Scheduler` constructed by this crate:
/// one boxed behavior per variant, in the canonical `PRIMITIVE < GROUP <
/// CLONE < BUNDLE` order.
pub fn default_variant_table() -> VariantTable {
    VariantTable::new(
        Box::new(Primitive),
        Box::new(Group),
        Box::new(CloneBehavior),
        Box::new(Bundle),
    )
}

static PRIMITIVE: Primitive = Primitive;
static GROUP: Group = Group;
static CLONE: CloneBehavior = CloneBehavior;
static BUNDLE: Bundle = Bundle;

/// A `'static` behavior reference for `variant`, for the rare spot (group
/// and bundle delegating to a member's flags) where a variant needs another
/// variant's callback without threading the whole [`VariantTable`] down
/// through recursive calls. Every behavior here is a zero-sized type, so
/// this is just a match, not an allocation.
pub(crate) fn variant_behavior(variant: Variant) -> &'static dyn ResourceBehavior {
    match variant {
        Variant::Primitive => &PRIMITIVE,
        Variant::Group => &GROUP,
        Variant::Clone => &CLONE,
        Variant::Bundle => &BUNDLE,
    }
}
