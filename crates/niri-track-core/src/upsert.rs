//! Merging one application's observation into the current boot.

use std::collections::HashMap;
use std::collections::HashSet;

use chrono::DateTime;
use chrono::Utc;

use crate::model::App;
use crate::model::BootSnapshot;
use crate::model::PositionEntry;
use crate::model::StoreState;
use crate::window::WindowId;
use crate::window::WorkspaceId;

/// Records `entries` for `app` in `workspace_id` of the `boot_id` snapshot.
///
/// Any entry already holding one of the incoming stable ids is removed from
/// every workspace first, so repeating a call is a no-op and a window that
/// changed workspace disappears from its old list. Entries of other stable
/// ids, including other apps' entries, are left alone.
pub fn upsert(
    state: &mut StoreState,
    boot_id: &str,
    app: App,
    workspace_id: WorkspaceId,
    entries: Vec<PositionEntry>,
    now: DateTime<Utc>,
) {
    let boot = state
        .boots
        .entry(boot_id.to_string())
        .or_insert_with(|| BootSnapshot::new(now));

    boot.apps.insert(app.as_str().to_string());

    let entries = dedup_last_wins(entries);
    let incoming: HashSet<&str> = entries.iter().map(|e| e.stable_id.as_str()).collect();
    for list in boot.workspaces.values_mut() {
        list.retain(|e| !incoming.contains(e.stable_id.as_str()));
    }
    drop(incoming);

    boot.workspaces
        .entry(workspace_id)
        .or_default()
        .extend(entries);
    boot.workspaces.retain(|_, list| !list.is_empty());

    boot.updated_at = now;
}

/// Rewrites the indices of the current boot's entries in `workspace_id`
/// from live `columns`, keyed by window handle.
///
/// Used after windows were moved, so later predecessor lookups in this boot
/// read the order as it is now. Entries whose window is gone keep their old
/// index. Returns the number of entries changed.
pub fn reindex(
    state: &mut StoreState,
    boot_id: &str,
    workspace_id: WorkspaceId,
    columns: &HashMap<WindowId, u32>,
    now: DateTime<Utc>,
) -> usize {
    let Some(boot) = state.boots.get_mut(boot_id) else {
        return 0;
    };
    let Some(list) = boot.workspaces.get_mut(&workspace_id) else {
        return 0;
    };

    let mut changed = 0;
    for entry in list.iter_mut() {
        if let Some(column) = columns.get(&entry.window_id) {
            let index = i64::from(*column);
            if entry.index != index {
                entry.index = index;
                changed += 1;
            }
        }
    }
    if changed > 0 {
        boot.updated_at = now;
    }
    changed
}

fn dedup_last_wins(entries: Vec<PositionEntry>) -> Vec<PositionEntry> {
    let mut seen = HashSet::new();
    let mut kept: Vec<PositionEntry> = entries
        .into_iter()
        .rev()
        .filter(|e| seen.insert(e.stable_id.clone()))
        .collect();
    kept.reverse();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use chrono::TimeZone;
    use proptest::prelude::*;

    const BOOT: &str = "boot-current";

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn entry(id: &str, index: i64) -> PositionEntry {
        PositionEntry::new(id, index, index as u64 + 100, 50)
    }

    fn ids(state: &StoreState, ws: WorkspaceId) -> Vec<String> {
        state.boots[BOOT]
            .workspaces
            .get(&ws)
            .map(|l| l.iter().map(|e| e.stable_id.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_creates_boot_lazily_and_records_app() {
        let mut state = StoreState::empty();
        upsert(&mut state, BOOT, App::Tmux, 1, vec![entry("tmux:a", 1)], t(0));

        let boot = &state.boots[BOOT];
        assert!(boot.has_app(App::Tmux));
        assert_eq!(boot.updated_at, t(0));
        assert_eq!(ids(&state, 1), vec!["tmux:a"]);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let entries = vec![entry("tmux:a", 1), entry("tmux:b", 2)];
        let mut once = StoreState::empty();
        upsert(&mut once, BOOT, App::Tmux, 1, entries.clone(), t(0));

        let mut twice = once.clone();
        upsert(&mut twice, BOOT, App::Tmux, 1, entries, t(0));

        assert_eq!(once, twice);
    }

    #[test]
    fn test_does_not_clobber_other_apps() {
        let mut state = StoreState::empty();
        upsert(
            &mut state,
            BOOT,
            App::Tmux,
            1,
            vec![entry("tmux:a", 1), entry("tmux:b", 3)],
            t(0),
        );
        upsert(
            &mut state,
            BOOT,
            App::Librewolf,
            1,
            vec![entry("librewolf:x", 2)],
            t(1),
        );

        assert_eq!(ids(&state, 1), vec!["tmux:a", "tmux:b", "librewolf:x"]);
        let apps: Vec<&str> = state.boots[BOOT].apps.iter().map(String::as_str).collect();
        assert_eq!(apps, vec!["librewolf", "tmux"]);
    }

    #[test]
    fn test_moving_workspace_removes_old_entry() {
        let mut state = StoreState::empty();
        upsert(&mut state, BOOT, App::Tmux, 1, vec![entry("tmux:a", 1)], t(0));
        upsert(&mut state, BOOT, App::Tmux, 2, vec![entry("tmux:a", 1)], t(1));

        assert!(!state.boots[BOOT].workspaces.contains_key(&1));
        assert_eq!(ids(&state, 2), vec!["tmux:a"]);
    }

    #[test]
    fn test_updates_index_in_place_of_old_entry() {
        let mut state = StoreState::empty();
        upsert(
            &mut state,
            BOOT,
            App::Tmux,
            1,
            vec![entry("tmux:a", 1), entry("tmux:b", 2)],
            t(0),
        );
        upsert(&mut state, BOOT, App::Tmux, 1, vec![entry("tmux:a", 5)], t(1));

        let list = &state.boots[BOOT].workspaces[&1];
        assert_eq!(list.len(), 2);
        assert_eq!(list.iter().find(|e| e.stable_id == "tmux:a").unwrap().index, 5);
        assert_eq!(state.boots[BOOT].updated_at, t(1));
    }

    #[test]
    fn test_empty_entries_still_record_app() {
        let mut state = StoreState::empty();
        upsert(&mut state, BOOT, App::Mosh, 4, Vec::new(), t(0));

        let boot = &state.boots[BOOT];
        assert!(boot.has_app(App::Mosh));
        assert!(boot.workspaces.is_empty());
    }

    #[test]
    fn test_duplicate_incoming_ids_keep_last() {
        let mut state = StoreState::empty();
        upsert(
            &mut state,
            BOOT,
            App::Tmux,
            1,
            vec![entry("tmux:a", 1), entry("tmux:a", 4)],
            t(0),
        );

        let list = &state.boots[BOOT].workspaces[&1];
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].index, 4);
    }

    #[test]
    fn test_reindex_follows_live_columns() {
        let mut state = StoreState::empty();
        let entries = vec![
            PositionEntry::new("tmux:a", 1, 10, 50),
            PositionEntry::new("tmux:b", 1, 11, 50),
            PositionEntry::new("tmux:gone", 3, 12, 50),
        ];
        upsert(&mut state, BOOT, App::Tmux, 1, entries, t(0));

        let columns = HashMap::from([(10, 1), (11, 2)]);
        assert_eq!(reindex(&mut state, BOOT, 1, &columns, t(5)), 1);

        let list = &state.boots[BOOT].workspaces[&1];
        assert_eq!(list.iter().map(|e| e.index).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(state.boots[BOOT].updated_at, t(5));

        assert_eq!(reindex(&mut state, BOOT, 1, &columns, t(6)), 0);
        assert_eq!(state.boots[BOOT].updated_at, t(5));
        assert_eq!(reindex(&mut state, "other", 1, &columns, t(6)), 0);
    }

    fn arb_batch() -> impl Strategy<Value = (u64, Vec<(u8, i64)>)> {
        (1u64..4, prop::collection::vec((0u8..6, 0i64..10), 0..6))
    }

    proptest! {
        #[test]
        fn prop_stable_id_appears_at_most_once(batches in prop::collection::vec(arb_batch(), 1..8)) {
            let mut state = StoreState::empty();
            for (i, (ws, raw)) in batches.into_iter().enumerate() {
                let entries = raw
                    .into_iter()
                    .map(|(n, idx)| entry(&format!("tmux:{n}"), idx))
                    .collect();
                upsert(&mut state, BOOT, App::Tmux, ws, entries, t(i as i64));
            }

            let mut seen = HashSet::new();
            if let Some(boot) = state.boots.get(BOOT) {
                for list in boot.workspaces.values() {
                    prop_assert!(!list.is_empty());
                    for e in list {
                        prop_assert!(seen.insert(e.stable_id.clone()), "duplicate {}", e.stable_id);
                    }
                }
            }
        }

        #[test]
        fn prop_repeat_is_noop((ws, raw) in arb_batch()) {
            let entries: Vec<PositionEntry> = raw
                .into_iter()
                .map(|(n, idx)| entry(&format!("mosh:{n}"), idx))
                .collect();
            let mut once = StoreState::empty();
            upsert(&mut once, BOOT, App::Mosh, ws, entries.clone(), t(0));
            let mut twice = once.clone();
            upsert(&mut twice, BOOT, App::Mosh, ws, entries, t(0));
            prop_assert_eq!(once, twice);
        }
    }
}
