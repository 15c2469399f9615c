use serde::Serialize;

use super::WindowId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskbarEntry {
    pub window: WindowId,
    pub title: String,
    pub active: bool,
}

/// One entry per open window, in opening order.
#[derive(Debug, Default)]
pub struct Taskbar {
    entries: Vec<TaskbarEntry>,
}

impl Taskbar {
    pub fn entries(&self) -> &[TaskbarEntry] {
        &self.entries
    }

    pub fn contains(&self, window: WindowId) -> bool {
        self.entries.iter().any(|e| e.window == window)
    }

    pub(crate) fn add(&mut self, window: WindowId, title: &str) {
        self.entries.push(TaskbarEntry {
            window,
            title: title.to_string(),
            active: false,
        });
    }

    pub(crate) fn remove(&mut self, window: WindowId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.window != window);
        self.entries.len() != before
    }

    /// Highlights `window` and clears every other entry.
    pub(crate) fn set_active(&mut self, window: WindowId) {
        for entry in self.entries.iter_mut() {
            entry.active = entry.window == window;
        }
    }

    pub(crate) fn deactivate(&mut self, window: WindowId) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.window == window) {
            entry.active = false;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_entry_is_active() {
        let mut taskbar = Taskbar::default();
        taskbar.add(WindowId(1), "notes");
        taskbar.add(WindowId(2), "terminal");
        taskbar.set_active(WindowId(1));
        taskbar.set_active(WindowId(2));
        let active: Vec<_> = taskbar.entries().iter().map(|e| e.active).collect();
        assert_eq!(active, vec![false, true]);

        taskbar.deactivate(WindowId(2));
        assert!(taskbar.entries().iter().all(|e| !e.active));
    }

    #[test]
    fn remove_reports_whether_an_entry_went_away() {
        let mut taskbar = Taskbar::default();
        taskbar.add(WindowId(1), "notes");
        assert!(taskbar.remove(WindowId(1)));
        assert!(!taskbar.remove(WindowId(1)));
        assert!(!taskbar.contains(WindowId(1)));
    }
}
