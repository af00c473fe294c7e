//! Reconstructing left-right order across boots and applications.
//!
//! A single boot only orders the windows of the apps it observed. To place
//! an app X window relative to an app Y window we look for the newest boot
//! that observed both X and Y in the same workspace, and read the order
//! from there.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::model::App;
use crate::model::BootSnapshot;
use crate::model::SavedPosition;
use crate::model::StoreState;
use crate::window::WindowId;
use crate::window::WorkspaceId;

/// Stable ids that should sit left of `stable_id` in `workspace_id`.
///
/// For every known app (including `this_app` itself) the newest snapshot
/// that observed both apps and has `stable_id` in `workspace_id` contributes
/// the ids with a smaller index. Results are unioned in first-seen order.
pub fn find_predecessors(
    state: &StoreState,
    stable_id: &str,
    this_app: App,
    workspace_id: WorkspaceId,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut predecessors = Vec::new();

    for other_app in App::ALL {
        let Some(snapshot) = newest_covering(state, stable_id, this_app, other_app, workspace_id)
        else {
            continue;
        };
        let Some(list) = snapshot.workspaces.get(&workspace_id) else {
            continue;
        };
        let Some(own) = list.iter().find(|e| e.stable_id == stable_id) else {
            continue;
        };

        let mut before: Vec<_> = list
            .iter()
            .filter(|e| e.stable_id != stable_id && e.index < own.index)
            .collect();
        before.sort_by_key(|e| e.index);
        for entry in before {
            if seen.insert(entry.stable_id.clone()) {
                predecessors.push(entry.stable_id.clone());
            }
        }
    }

    predecessors
}

fn newest_covering<'a>(
    state: &'a StoreState,
    stable_id: &str,
    this_app: App,
    other_app: App,
    workspace_id: WorkspaceId,
) -> Option<&'a BootSnapshot> {
    state
        .boots
        .values()
        .filter(|s| s.has_app(this_app) && s.has_app(other_app))
        .filter(|s| {
            s.workspaces
                .get(&workspace_id)
                .is_some_and(|list| list.iter().any(|e| e.stable_id == stable_id))
        })
        .max_by_key(|s| s.updated_at)
}

/// Workspace and width from the newest snapshot that recorded `stable_id`.
pub fn lookup_latest_position(state: &StoreState, stable_id: &str) -> Option<SavedPosition> {
    state
        .boots
        .values()
        .filter_map(|s| s.find(stable_id).map(|(ws, e)| (s.updated_at, ws, e)))
        .max_by_key(|(at, _, _)| *at)
        .map(|(_, workspace_id, entry)| SavedPosition {
            workspace_id,
            width: entry.width,
            index: entry.index,
        })
}

/// Window handles recorded by the current boot, keyed by stable id.
pub fn current_handles(state: &StoreState, boot_id: &str) -> HashMap<String, WindowId> {
    state
        .boot(boot_id)
        .map(|s| {
            s.workspaces
                .values()
                .flatten()
                .map(|e| (e.stable_id.clone(), e.window_id))
                .collect()
        })
        .unwrap_or_default()
}
