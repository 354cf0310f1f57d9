//! Deciding whether a source file satisfies an edit.

use crate::model::{Edit, SourceCandidate};

/// Pure match predicate.
///
/// The time-range test is a hard gate: both the edit's source in and out
/// instants must lie inside the candidate's covered range, ends inclusive,
/// in edit-rate frames. Name correlation is only consulted once the range
/// holds — a file with the right name but the wrong timespan is never a
/// match. Every candidate passing both tests is a match; there is no
/// best-match scoring, and an edit may legitimately match several files
/// (a polyphonic master and its split mono mirrors cover the same range).
pub fn is_match(edit: &Edit, candidate: &SourceCandidate) -> bool {
    let (start, end) = candidate.time_range;
    let covered = |frame: i64| start <= frame && frame <= end;
    if !covered(edit.source_in) || !covered(edit.source_out) {
        return false;
    }
    candidate.correlation_keys.contains(&edit.source_identity)
}

/// All matching candidates for one edit, in catalog order.
pub fn matches_for_edit<'a>(
    edit: &Edit,
    candidates: &'a [SourceCandidate],
) -> Vec<&'a SourceCandidate> {
    candidates.iter().filter(|c| is_match(edit, c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn edit(identity: &str, source_in: i64, source_out: i64) -> Edit {
        Edit::new(
            identity,
            source_in,
            source_out,
            0,
            source_out - source_in,
            [1u32].into_iter().collect(),
            None,
        )
        .unwrap()
    }

    fn candidate(identity: &str, range: (i64, i64), keys: &[&str]) -> SourceCandidate {
        SourceCandidate {
            identity: identity.to_string(),
            time_range: range,
            recommended_lane_label: None,
            correlation_keys: keys.iter().map(|k| k.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn containment_boundaries_are_inclusive() {
        let e = edit("a.wav", 10, 100);

        // Range ending exactly at source_out is accepted.
        let exact = candidate("/x/a.wav", (10, 100), &["a.wav"]);
        assert!(is_match(&e, &exact));

        // One frame short on either end is rejected.
        let short_end = candidate("/x/a.wav", (10, 99), &["a.wav"]);
        assert!(!is_match(&e, &short_end));
        let late_start = candidate("/x/a.wav", (11, 100), &["a.wav"]);
        assert!(!is_match(&e, &late_start));
    }

    #[test]
    fn name_correlation_never_overrides_the_time_gate() {
        let e = edit("a.wav", 10, 100);
        let wrong_span = candidate("/x/a.wav", (200, 400), &["a.wav"]);
        assert!(!is_match(&e, &wrong_span));
    }

    #[test]
    fn any_correlation_key_suffices() {
        let by_name = edit("a.wav", 0, 50);
        let by_tape = edit("TAPE1", 0, 50);
        let by_nothing = edit("other.wav", 0, 50);
        let c = candidate("/x/a.wav", (0, 100), &["a.wav", "TAPE1"]);

        assert!(is_match(&by_name, &c));
        assert!(is_match(&by_tape, &c));
        assert!(!is_match(&by_nothing, &c));
    }

    #[test]
    fn matches_keep_catalog_order() {
        let e = edit("a.wav", 0, 50);
        let pool = vec![
            candidate("/x/z.wav", (0, 100), &["a.wav"]),
            candidate("/x/m.wav", (60, 100), &["a.wav"]),
            candidate("/x/a.wav", (0, 100), &["a.wav"]),
        ];
        let found = matches_for_edit(&e, &pool);
        let ids: Vec<&str> = found.iter().map(|c| c.identity.as_str()).collect();
        assert_eq!(ids, vec!["/x/z.wav", "/x/a.wav"]);
    }
}
