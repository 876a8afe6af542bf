//! Deterministic reason-code builder
//!
//! Every mapping result explains itself through an ordered code array:
//! exactly one primary classification at index 0, followed by flags. Two
//! calls with the same flag set in any order produce identical arrays, so
//! results can be compared structurally and cached safely.

use crate::types::ReasonCode;

/// Build the ordered reason-code array for a mapping result
///
/// The primary code always comes first. Flags are deduplicated and sorted
/// by token text; a flag equal to the primary collapses into it.
pub fn build_reason_codes(primary: ReasonCode, flags: &[ReasonCode]) -> Vec<ReasonCode> {
    let mut sorted: Vec<ReasonCode> = flags.iter().copied().filter(|f| *f != primary).collect();
    sorted.sort_by_key(|f| f.as_str());
    sorted.dedup();

    let mut codes = Vec::with_capacity(1 + sorted.len());
    codes.push(primary);
    codes.extend(sorted);
    codes
}
