//! Rightmost-present-predecessor column placement.
//!
//! A window is moved to sit immediately right of the rightmost of its saved
//! predecessors that is currently visible in the workspace, or to the first
//! column when none is. Because the target is relative to whatever is on
//! screen right now, windows can be placed in any spawn order and repeated
//! passes converge to the saved order. Windows with no saved order are never
//! moved by this module.

use std::collections::HashMap;

use tracing::debug;
use tracing::warn;

use crate::error::AdapterError;
use crate::ports::WindowManager;
use crate::window::Window;
use crate::window::WindowId;
use crate::window::WorkspaceId;
use crate::window::column_of;

/// Reserved predecessor id of every tracked window: the spacer placeholder.
pub const SPACER_ID: &str = "spacer";
pub const DEFAULT_SPACER_APP_ID: &str = "niri-spacer";

#[derive(Debug, Clone, Copy)]
pub struct PlacementRequest<'a> {
    pub window_id: WindowId,
    pub workspace_id: WorkspaceId,
    /// Saved predecessors, as returned by
    /// [`find_predecessors`](crate::find_predecessors).
    pub predecessors: &'a [String],
    /// Live handles of tracked windows, keyed by stable id.
    pub handles: &'a HashMap<String, WindowId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    AlreadyPlaced { column: u32 },
    Moved { from: u32, to: u32 },
    /// The compositor stopped moving the window before it reached `target`.
    Stuck { column: u32, target: u32 },
    /// The window is not tiled in the requested workspace.
    NotVisible,
}

impl PlacementOutcome {
    pub fn column(&self) -> Option<u32> {
        match self {
            PlacementOutcome::AlreadyPlaced { column } => Some(*column),
            PlacementOutcome::Moved { to, .. } => Some(*to),
            PlacementOutcome::Stuck { column, .. } => Some(*column),
            PlacementOutcome::NotVisible => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Placer {
    spacer_app_id: String,
}

impl Default for Placer {
    fn default() -> Self {
        Self::new(DEFAULT_SPACER_APP_ID)
    }
}

impl Placer {
    pub fn new(spacer_app_id: impl Into<String>) -> Self {
        Self {
            spacer_app_id: spacer_app_id.into(),
        }
    }

    /// Current and target column of the request's window, given `windows`.
    ///
    /// Predecessor columns are measured with the window itself taken out of
    /// the row, so the target is where it ends up after the moves.
    pub fn target_column(
        &self,
        windows: &[Window],
        request: &PlacementRequest<'_>,
    ) -> Option<(u32, u32)> {
        let current = column_of(windows, request.window_id, request.workspace_id)?;

        let in_workspace = |id: WindowId| -> Option<u32> {
            if id == request.window_id {
                return None;
            }
            column_of(windows, id, request.workspace_id)
        };

        let spacer = windows
            .iter()
            .filter(|w| w.app_id.starts_with(&self.spacer_app_id))
            .filter_map(|w| in_workspace(w.id))
            .min();

        let columns: Vec<u32> = request
            .predecessors
            .iter()
            .filter(|id| id.as_str() != SPACER_ID)
            .filter_map(|id| request.handles.get(id))
            .filter_map(|id| in_workspace(*id))
            .chain(spacer)
            .collect();

        // Column moves carry stacked windows along, so a predecessor in the
        // window's own column can never end up on its left.
        if columns.contains(&current) {
            return Some((current, current));
        }

        let rightmost = columns
            .into_iter()
            .map(|col| if col > current { col - 1 } else { col })
            .max();

        let target = rightmost.map_or(1, |col| col + 1);
        Some((current, target))
    }

    /// Moves the window one column at a time until it reaches its target.
    pub fn place<W: WindowManager + ?Sized>(
        &self,
        wm: &W,
        request: &PlacementRequest<'_>,
    ) -> Result<PlacementOutcome, AdapterError> {
        let windows = wm.list_windows()?;
        let Some((start, target)) = self.target_column(&windows, request) else {
            debug!(window_id = request.window_id, "window not tiled in workspace");
            return Ok(PlacementOutcome::NotVisible);
        };
        if start == target {
            return Ok(PlacementOutcome::AlreadyPlaced { column: start });
        }

        let max_steps = windows
            .iter()
            .filter(|w| w.is_in(request.workspace_id))
            .filter_map(|w| w.column)
            .max()
            .unwrap_or(start);

        debug!(
            window_id = request.window_id,
            from = start,
            to = target,
            "moving window"
        );
        wm.focus(request.window_id)?;

        let mut current = start;
        for _ in 0..max_steps {
            if current == target {
                break;
            }
            if current > target {
                wm.move_column_left()?;
            } else {
                wm.move_column_right()?;
            }
            let windows = wm.list_windows()?;
            let Some(next) = column_of(&windows, request.window_id, request.workspace_id) else {
                return Ok(PlacementOutcome::NotVisible);
            };
            if next == current {
                warn!(
                    window_id = request.window_id,
                    column = current,
                    target,
                    "column move had no effect"
                );
                return Ok(PlacementOutcome::Stuck {
                    column: current,
                    target,
                });
            }
            current = next;
        }

        if current == target {
            Ok(PlacementOutcome::Moved {
                from: start,
                to: target,
            })
        } else {
            Ok(PlacementOutcome::Stuck {
                column: current,
                target,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_wm::MockWindowManager;

    const WS: WorkspaceId = 1;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    /// Saved order is the order of `saved`; predecessors are the prefix.
    fn preds_of(saved: &[&str], name: &str) -> Vec<String> {
        let pos = saved.iter().position(|n| *n == name).unwrap();
        ids(&saved[..pos])
    }

    fn place(
        wm: &MockWindowManager,
        handles: &HashMap<String, WindowId>,
        saved: &[&str],
        name: &str,
    ) -> PlacementOutcome {
        let preds = preds_of(saved, name);
        let request = PlacementRequest {
            window_id: handles[name],
            workspace_id: WS,
            predecessors: &preds,
            handles,
        };
        Placer::default().place(wm, &request).unwrap()
    }

    fn order(wm: &MockWindowManager, handles: &HashMap<String, WindowId>) -> Vec<String> {
        let by_id: HashMap<WindowId, &String> = handles.iter().map(|(k, v)| (*v, k)).collect();
        wm.columns(WS)
            .into_iter()
            .filter_map(|id| by_id.get(&id).map(|s| s.to_string()))
            .collect()
    }

    #[test]
    fn test_no_visible_predecessors_targets_first_column() {
        let wm = MockWindowManager::new();
        let other = wm.add_window(WS, "other", None, "x");
        let mut handles = HashMap::new();
        handles.insert("b".to_string(), wm.add_window(WS, "b", None, "x"));

        let outcome = place(&wm, &handles, &["a", "b"], "b");

        assert_eq!(outcome, PlacementOutcome::Moved { from: 2, to: 1 });
        assert_eq!(wm.columns(WS)[0], handles["b"]);
        assert_eq!(wm.columns(WS)[1], other);
    }

    #[test]
    fn test_places_right_of_rightmost_visible_predecessor() {
        let wm = MockWindowManager::new();
        let mut handles = HashMap::new();
        handles.insert("c".to_string(), wm.add_window(WS, "c", None, "x"));
        handles.insert("a".to_string(), wm.add_window(WS, "a", None, "x"));
        let unknown = wm.add_window(WS, "manual", None, "x");
        handles.insert("b".to_string(), wm.add_window(WS, "b", None, "x"));

        // b is the rightmost predecessor; the unknown window is skipped over.
        let outcome = place(&wm, &handles, &["a", "b", "c"], "c");
        assert_eq!(outcome, PlacementOutcome::Moved { from: 1, to: 4 });
        assert_eq!(
            wm.columns(WS),
            vec![handles["a"], unknown, handles["b"], handles["c"]]
        );
    }

    #[test]
    fn test_moving_right_past_predecessor_accounts_for_shift() {
        let wm = MockWindowManager::new();
        let mut handles = HashMap::new();
        handles.insert("b".to_string(), wm.add_window(WS, "b", None, "x"));
        handles.insert("a".to_string(), wm.add_window(WS, "a", None, "x"));

        let outcome = place(&wm, &handles, &["a", "b"], "b");

        assert_eq!(outcome, PlacementOutcome::Moved { from: 1, to: 2 });
        assert_eq!(order(&wm, &handles), vec!["a", "b"]);
        assert_eq!(wm.move_count(), 1);
    }

    #[test]
    fn test_already_placed_issues_no_commands() {
        let wm = MockWindowManager::new();
        let mut handles = HashMap::new();
        handles.insert("a".to_string(), wm.add_window(WS, "a", None, "x"));
        handles.insert("b".to_string(), wm.add_window(WS, "b", None, "x"));
        wm.clear_calls();

        let outcome = place(&wm, &handles, &["a", "b"], "b");

        assert_eq!(outcome, PlacementOutcome::AlreadyPlaced { column: 2 });
        assert!(wm.calls().is_empty());
    }

    fn tiled(id: WindowId, column: u32) -> Window {
        Window {
            id,
            title: format!("w{id}"),
            app_id: "x".to_string(),
            pid: None,
            workspace_id: Some(WS),
            column: Some(column),
            tile_width: 1000.0,
        }
    }

    #[test]
    fn test_predecessor_stacked_in_same_column_counts_as_placed() {
        // a and b share column 2; c sits in column 1.
        let windows = vec![tiled(1, 1), tiled(2, 2), tiled(3, 2)];
        let handles = HashMap::from([
            ("c".to_string(), 1),
            ("a".to_string(), 2),
            ("b".to_string(), 3),
        ]);
        let preds = ids(&["c", "a"]);
        let request = PlacementRequest {
            window_id: 3,
            workspace_id: WS,
            predecessors: &preds,
            handles: &handles,
        };

        assert_eq!(Placer::default().target_column(&windows, &request), Some((2, 2)));
    }

    #[test]
    fn test_spacer_precedes_every_tracked_window() {
        let wm = MockWindowManager::new();
        let spacer = wm.add_window(WS, "spacer", None, "niri-spacer");
        let mut handles = HashMap::new();
        handles.insert("a".to_string(), wm.add_window(WS, "a", None, "x"));

        let outcome = place(&wm, &handles, &["a"], "a");

        assert_eq!(outcome, PlacementOutcome::AlreadyPlaced { column: 2 });
        assert_eq!(wm.columns(WS), vec![spacer, handles["a"]]);
    }

    #[test]
    fn test_window_left_of_spacer_moves_to_second_column() {
        let wm = MockWindowManager::new();
        let mut handles = HashMap::new();
        handles.insert("a".to_string(), wm.add_window(WS, "a", None, "x"));
        let spacer = wm.add_window(WS, "spacer", None, "niri-spacer-native");

        let outcome = place(&wm, &handles, &["a"], "a");

        assert_eq!(outcome, PlacementOutcome::Moved { from: 1, to: 2 });
        assert_eq!(wm.columns(WS), vec![spacer, handles["a"]]);
    }

    #[test]
    fn test_spacer_in_other_workspace_is_ignored() {
        let wm = MockWindowManager::new();
        wm.add_window(2, "spacer", None, "niri-spacer");
        let mut handles = HashMap::new();
        handles.insert("x".to_string(), wm.add_window(WS, "x", None, "x"));
        handles.insert("a".to_string(), wm.add_window(WS, "a", None, "x"));

        let outcome = place(&wm, &handles, &["a"], "a");
        assert_eq!(outcome, PlacementOutcome::Moved { from: 2, to: 1 });
    }

    #[test]
    fn test_predecessor_in_other_workspace_is_not_visible() {
        let wm = MockWindowManager::new();
        let mut handles = HashMap::new();
        handles.insert("a".to_string(), wm.add_window(2, "a", None, "x"));
        wm.add_window(WS, "filler", None, "x");
        handles.insert("b".to_string(), wm.add_window(WS, "b", None, "x"));

        let outcome = place(&wm, &handles, &["a", "b"], "b");
        assert_eq!(outcome, PlacementOutcome::Moved { from: 2, to: 1 });
    }

    #[test]
    fn test_window_outside_workspace_is_not_visible() {
        let wm = MockWindowManager::new();
        let mut handles = HashMap::new();
        handles.insert("a".to_string(), wm.add_window(2, "a", None, "x"));

        let outcome = place(&wm, &handles, &["a"], "a");
        assert_eq!(outcome, PlacementOutcome::NotVisible);
        assert_eq!(outcome.column(), None);
    }

    #[test]
    fn test_spawn_order_c_b_a_converges() {
        let saved = ["a", "b", "c"];
        let wm = MockWindowManager::new();
        let mut handles = HashMap::new();

        for name in ["c", "b", "a"] {
            handles.insert(name.to_string(), wm.add_window(WS, name, None, "x"));
            place(&wm, &handles, &saved, name);
        }
        assert_eq!(order(&wm, &handles), vec!["a", "b", "c"]);

        wm.clear_calls();
        for name in ["c", "b", "a"] {
            let outcome = place(&wm, &handles, &saved, name);
            assert!(matches!(outcome, PlacementOutcome::AlreadyPlaced { .. }));
        }
        assert_eq!(wm.move_count(), 0);
    }

    fn permutations(items: &[&'static str]) -> Vec<Vec<&'static str>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut out = Vec::new();
        for (i, head) in items.iter().enumerate() {
            let mut rest = items.to_vec();
            rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, *head);
                out.push(tail);
            }
        }
        out
    }

    #[test]
    fn test_any_layout_converges_within_one_pass_per_window() {
        let saved = ["a", "b", "c", "d"];
        for layout in permutations(&saved) {
            let wm = MockWindowManager::new();
            let mut handles = HashMap::new();
            for name in &layout {
                handles.insert(name.to_string(), wm.add_window(WS, name, None, "x"));
            }

            // Worst case: every pass visits windows in reverse saved order.
            for _ in 0..saved.len() {
                for name in saved.iter().rev() {
                    place(&wm, &handles, &saved, name);
                }
            }

            assert_eq!(order(&wm, &handles), saved.to_vec(), "from layout {layout:?}");
        }
    }
}
