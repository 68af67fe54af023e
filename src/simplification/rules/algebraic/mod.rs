use crate::simplification::rules::Rule;
use std::sync::Arc;

pub(crate) mod canonicalization;
pub(crate) mod combination;
/// Power and absolute-value identities
pub(crate) mod powers;

/// Get all algebraic rules
pub(crate) fn get_algebraic_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        // Power rules
        Arc::new(powers::PowerZeroRule),
        Arc::new(powers::PowerOneRule),
        Arc::new(powers::OneBaseRule),
        Arc::new(powers::PowerPowerRule),
        Arc::new(powers::PowerOfProductRule),
        Arc::new(powers::EvenPowerOfRootRule),
        Arc::new(powers::AbsIdempotentRule),
        // Combination rules
        Arc::new(combination::CollectLikeFactorsRule),
        Arc::new(combination::CollectLikeTermsRule),
        // Canonical ordering runs last
        Arc::new(canonicalization::CanonicalOrderRule),
    ]
}
