//! Deterministic conflict resolution among overlapping passes.
//!
//! The antenna can follow one satellite at a time. When candidate windows
//! overlap, a single winner is chosen: a user-selected pass beats an
//! automatic pick, higher peak elevation beats lower, and an earlier rise
//! breaks elevation ties. The decision is a pure function of the pass
//! index and the selection set at decision time.

use crate::PassIndex;
use std::collections::HashSet;

/// Outcome for one candidate pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Execute,
    Skip { winner: String, reason: SkipReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The user selected another pass in the overlap group.
    UserSelected,
    /// Another pass wins automatically on (max elevation, earlier rise).
    HigherElevation,
}

impl Decision {
    pub fn is_execute(&self) -> bool {
        matches!(self, Decision::Execute)
    }
}

/// All passes whose window intersects the window of `pass_id`, including
/// itself. An id missing from the index forms its own singleton group.
pub fn overlappers(pass_id: &str, index: &PassIndex) -> Vec<String> {
    let Some(own) = index.get(pass_id) else {
        return vec![pass_id.to_string()];
    };

    let mut out: Vec<String> = index
        .iter()
        .filter(|(_, s)| s.st_unix < own.en_unix && s.en_unix > own.st_unix)
        .map(|(pid, _)| pid.clone())
        .collect();
    out.sort();
    out
}

/// Winner among `candidates`: highest max elevation, earlier rise on ties.
pub fn choose_best<'a, I>(candidates: I, index: &PassIndex) -> Option<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut best: Option<(&str, f64, f64)> = None;
    for pid in candidates {
        let (max_elev, st_unix) = index
            .get(pid)
            .map(|s| (s.max_elev, s.st_unix))
            .unwrap_or((0.0, 0.0));

        let better = match best {
            None => true,
            Some((_, best_elev, best_st)) => {
                max_elev > best_elev || (max_elev == best_elev && st_unix < best_st)
            }
        };
        if better {
            best = Some((pid.as_str(), max_elev, st_unix));
        }
    }
    best.map(|(pid, _, _)| pid.to_string())
}

/// Decide whether `pass_id` should be executed.
///
/// Recomputed per pass rather than per overlap group, so selection changes
/// made during one pass cannot retroactively undo an earlier decision.
pub fn decide(pass_id: &str, index: &PassIndex, selection: &HashSet<String>) -> Decision {
    let group = overlappers(pass_id, index);
    if group.len() <= 1 {
        return Decision::Execute;
    }

    let selected_in_group: Vec<String> = group
        .iter()
        .filter(|pid| selection.contains(*pid))
        .cloned()
        .collect();

    let (winner, reason) = if selected_in_group.is_empty() {
        (choose_best(&group, index), SkipReason::HigherElevation)
    } else {
        (choose_best(&selected_in_group, index), SkipReason::UserSelected)
    };

    match winner {
        Some(w) if w != pass_id => Decision::Skip { winner: w, reason },
        _ => Decision::Execute,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PassStats;

    fn index(entries: &[(&str, f64, f64, f64)]) -> PassIndex {
        entries
            .iter()
            .map(|(id, st, en, max)| {
                (
                    id.to_string(),
                    PassStats {
                        st_unix: *st,
                        en_unix: *en,
                        max_elev: *max,
                    },
                )
            })
            .collect()
    }

    fn selection(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_singleton_executes() {
        let idx = index(&[("A", 0.0, 900.0, 40.0), ("B", 3600.0, 4500.0, 25.0)]);
        assert_eq!(decide("A", &idx, &selection(&[])), Decision::Execute);
        assert_eq!(decide("B", &idx, &selection(&[])), Decision::Execute);
    }

    #[test]
    fn test_unknown_id_executes() {
        let idx = index(&[("A", 0.0, 900.0, 40.0)]);
        assert_eq!(decide("GONE", &idx, &selection(&[])), Decision::Execute);
    }

    // Scenario: A 40deg 10:00-10:15, B 25deg 10:10-10:20, no selection.
    #[test]
    fn test_overlap_prefers_max_elevation() {
        let idx = index(&[("A", 36000.0, 36900.0, 40.0), ("B", 36600.0, 37200.0, 25.0)]);
        let none = selection(&[]);

        assert_eq!(decide("A", &idx, &none), Decision::Execute);
        assert_eq!(
            decide("B", &idx, &none),
            Decision::Skip {
                winner: "A".to_string(),
                reason: SkipReason::HigherElevation
            }
        );
    }

    // Same windows, B selected: the user choice wins.
    #[test]
    fn test_selection_overrides_elevation() {
        let idx = index(&[("A", 36000.0, 36900.0, 40.0), ("B", 36600.0, 37200.0, 25.0)]);
        let sel = selection(&["B"]);

        assert_eq!(
            decide("A", &idx, &sel),
            Decision::Skip {
                winner: "B".to_string(),
                reason: SkipReason::UserSelected
            }
        );
        assert_eq!(decide("B", &idx, &sel), Decision::Execute);
    }

    // A 35, B 30, C 50, all overlapping; selection {A, B} -> A wins.
    #[test]
    fn test_selected_subset_beats_higher_unselected() {
        let idx = index(&[
            ("A", 0.0, 1200.0, 35.0),
            ("B", 300.0, 1500.0, 30.0),
            ("C", 600.0, 1800.0, 50.0),
        ]);
        let sel = selection(&["A", "B"]);

        assert_eq!(decide("A", &idx, &sel), Decision::Execute);
        assert_eq!(
            decide("B", &idx, &sel),
            Decision::Skip {
                winner: "A".to_string(),
                reason: SkipReason::UserSelected
            }
        );
        assert_eq!(
            decide("C", &idx, &sel),
            Decision::Skip {
                winner: "A".to_string(),
                reason: SkipReason::UserSelected
            }
        );
    }

    // Equal max elevation: earlier rise wins.
    #[test]
    fn test_elevation_tie_earlier_rise_wins() {
        let idx = index(&[("EARLY", 0.0, 900.0, 30.0), ("LATE", 600.0, 1500.0, 30.0)]);
        let none = selection(&[]);

        assert_eq!(decide("EARLY", &idx, &none), Decision::Execute);
        assert_eq!(
            decide("LATE", &idx, &none),
            Decision::Skip {
                winner: "EARLY".to_string(),
                reason: SkipReason::HigherElevation
            }
        );
    }

    #[test]
    fn test_stale_selection_ids_ignored() {
        let idx = index(&[("A", 0.0, 900.0, 40.0), ("B", 600.0, 1500.0, 25.0)]);
        // Selection refers to a pass that no longer exists in the plan.
        let sel = selection(&["20200101_0000_GONE"]);

        assert_eq!(decide("A", &idx, &sel), Decision::Execute);
        assert!(!decide("B", &idx, &sel).is_execute());
    }

    #[test]
    fn test_touching_windows_do_not_overlap() {
        // en == st is adjacency, not overlap.
        let idx = index(&[("A", 0.0, 900.0, 40.0), ("B", 900.0, 1800.0, 25.0)]);
        let none = selection(&[]);
        assert_eq!(decide("A", &idx, &none), Decision::Execute);
        assert_eq!(decide("B", &idx, &none), Decision::Execute);
    }

    #[test]
    fn test_decide_is_pure() {
        let idx = index(&[
            ("A", 0.0, 1200.0, 35.0),
            ("B", 300.0, 1500.0, 30.0),
            ("C", 600.0, 1800.0, 50.0),
        ]);
        let sel = selection(&["B"]);
        let first = decide("C", &idx, &sel);
        for _ in 0..10 {
            assert_eq!(decide("C", &idx, &sel), first);
        }
    }
}
