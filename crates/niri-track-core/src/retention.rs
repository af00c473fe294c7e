//! Dominance pruning of historical boot snapshots.
//!
//! A snapshot is only worth keeping while it knows something the current
//! boot does not: an application combination the current boot has not seen
//! yet. Once the current boot covers all of its apps and is newer, the old
//! snapshot is dropped.

use tracing::debug;

use crate::model::BootSnapshot;
use crate::model::StoreState;

/// `a` dominates `b` iff `a` saw every app `b` saw and was written later.
pub fn dominates(a: &BootSnapshot, b: &BootSnapshot) -> bool {
    a.updated_at > b.updated_at && a.apps.is_superset(&b.apps)
}

/// Removes every snapshot dominated by `current_boot_id`'s snapshot.
///
/// Returns the removed boot ids. The current boot itself is never removed.
pub fn prune(state: &mut StoreState, current_boot_id: &str) -> Vec<String> {
    let Some(current) = state.boots.get(current_boot_id).cloned() else {
        return Vec::new();
    };

    let removed: Vec<String> = state
        .boots
        .iter()
        .filter(|(id, snapshot)| id.as_str() != current_boot_id && dominates(&current, snapshot))
        .map(|(id, _)| id.clone())
        .collect();

    for id in &removed {
        state.boots.remove(id);
        debug!(boot_id = %id, current = %current_boot_id, "pruned dominated boot");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use chrono::Duration;
    use chrono::TimeZone;
    use chrono::Utc;
    use proptest::prelude::*;

    use crate::model::App;
    use crate::model::PositionEntry;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn snapshot(apps: &[App], at: i64) -> BootSnapshot {
        let mut s = BootSnapshot::new(t(at));
        for app in apps {
            s.apps.insert(app.as_str().to_string());
        }
        s
    }

    fn state_with(boots: Vec<(&str, BootSnapshot)>) -> StoreState {
        let mut state = StoreState::empty();
        for (id, s) in boots {
            state.boots.insert(id.to_string(), s);
        }
        state
    }

    #[test]
    fn test_dominance_requires_superset_and_newer() {
        let newer_both = snapshot(&[App::Tmux, App::Librewolf], 10);
        let older_tmux = snapshot(&[App::Tmux], 5);
        let newer_tmux = snapshot(&[App::Tmux], 20);

        assert!(dominates(&newer_both, &older_tmux));
        assert!(!dominates(&older_tmux, &newer_both));
        assert!(!dominates(&newer_tmux, &newer_both), "not a superset");
        assert!(!dominates(&older_tmux, &older_tmux), "irreflexive");
    }

    #[test]
    fn test_equal_timestamps_do_not_dominate() {
        let a = snapshot(&[App::Tmux, App::Mosh], 10);
        let b = snapshot(&[App::Tmux], 10);
        assert!(!dominates(&a, &b));
    }

    #[test]
    fn test_prune_removes_chain_but_keeps_current() {
        let mut state = state_with(vec![
            ("a", snapshot(&[App::Tmux, App::Mosh, App::Librewolf], 30)),
            ("b", snapshot(&[App::Tmux, App::Mosh], 20)),
            ("c", snapshot(&[App::Tmux], 10)),
        ]);

        let mut removed = prune(&mut state, "a");
        removed.sort();

        assert_eq!(removed, vec!["b", "c"]);
        assert_eq!(state.boots.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_prune_keeps_snapshots_with_unseen_apps() {
        let mut state = state_with(vec![
            ("current", snapshot(&[App::Tmux], 30)),
            ("old-browser", snapshot(&[App::Tmux, App::Librewolf], 10)),
            ("old-tmux", snapshot(&[App::Tmux], 5)),
        ]);

        let removed = prune(&mut state, "current");

        assert_eq!(removed, vec!["old-tmux"]);
        assert!(state.boots.contains_key("old-browser"));
        assert!(state.boots.contains_key("current"));
    }

    #[test]
    fn test_prune_keeps_newer_snapshots() {
        let mut state = state_with(vec![
            ("current", snapshot(&[App::Tmux, App::Mosh], 10)),
            ("later", snapshot(&[App::Tmux], 20)),
        ]);
        assert!(prune(&mut state, "current").is_empty());
        assert_eq!(state.boots.len(), 2);
    }

    #[test]
    fn test_empty_workspaces_still_dominate() {
        let current = snapshot(&[App::Mosh, App::Tmux], 50);
        assert!(current.workspaces.is_empty());
        let mut old = snapshot(&[App::Mosh], 1);
        old.workspaces
            .insert(1, vec![PositionEntry::new("mosh:h:main", 1, 3, 50)]);

        let mut state = state_with(vec![("current", current), ("old", old)]);
        assert_eq!(prune(&mut state, "current"), vec!["old"]);
    }

    #[test]
    fn test_prune_without_current_boot_is_noop() {
        let mut state = state_with(vec![("old", snapshot(&[App::Tmux], 1))]);
        assert!(prune(&mut state, "missing").is_empty());
        assert_eq!(state.boots.len(), 1);
    }

    fn arb_snapshot() -> impl Strategy<Value = BootSnapshot> {
        (prop::collection::vec(0usize..3, 0..3), 0i64..50).prop_map(|(apps, at)| {
            let apps: Vec<App> = apps.into_iter().map(|i| App::ALL[i]).collect();
            snapshot(&apps, at)
        })
    }

    proptest! {
        #[test]
        fn prop_dominance_is_transitive(a in arb_snapshot(), b in arb_snapshot(), c in arb_snapshot()) {
            if dominates(&a, &b) && dominates(&b, &c) {
                prop_assert!(dominates(&a, &c));
            }
        }

        #[test]
        fn prop_prune_never_removes_current(current in arb_snapshot(), others in prop::collection::vec(arb_snapshot(), 0..6)) {
            let mut state = StoreState::empty();
            state.boots.insert("current".into(), current.clone());
            for (i, s) in others.into_iter().enumerate() {
                state.boots.insert(format!("other-{i}"), s);
            }
            let removed = prune(&mut state, "current");
            prop_assert!(!removed.iter().any(|id| id == "current"));
            prop_assert!(state.boots.contains_key("current"));
            for s in state.boots.iter().filter(|(id, _)| id.as_str() != "current").map(|(_, s)| s) {
                prop_assert!(!dominates(&current, s));
            }
        }
    }
}
