//! Pure constraint resolution.

use wtf_schema::{Constraint, Version};

/// The greatest candidate accepted by `constraint`, if any.
///
/// The result does not depend on the order of `candidates`: [`Version`]'s
/// ordering is total and consistent with equality.
pub fn select_latest<'a, I>(candidates: I, constraint: &Constraint) -> Option<&'a Version>
where
    I: IntoIterator<Item = &'a Version>,
{
    candidates
        .into_iter()
        .filter(|candidate| constraint.matches(candidate))
        .max()
}
