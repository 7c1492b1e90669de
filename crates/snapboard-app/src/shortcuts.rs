//! Keyboard shortcut registry and documentation.

/// What a shortcut does to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    SelectAll,
    Group,
    Ungroup,
    Duplicate,
    Delete,
    BringToFront,
    SendToBack,
    Cancel,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: ShortcutAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+G").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    fn matches(&self, key: &str, ctrl: bool, shift: bool) -> bool {
        self.key.eq_ignore_ascii_case(key) && self.ctrl == ctrl && self.shift == shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        use ShortcutAction::*;
        vec![
            Shortcut::new("A", true, false, SelectAll, "Select all elements"),
            Shortcut::new("G", true, false, Group, "Group selected elements"),
            Shortcut::new("G", true, true, Ungroup, "Ungroup selected elements"),
            Shortcut::new("D", true, false, Duplicate, "Duplicate selected elements"),
            Shortcut::new("Delete", false, false, Delete, "Delete selected elements"),
            Shortcut::new("Backspace", false, false, Delete, "Delete selected elements"),
            Shortcut::new("]", true, false, BringToFront, "Bring selection to front"),
            Shortcut::new("[", true, false, SendToBack, "Send selection to back"),
            Shortcut::new("Escape", false, false, Cancel, "Cancel current interaction"),
        ]
    }

    /// Look up the action bound to a key combination.
    pub fn find(key: &str, ctrl: bool, shift: bool) -> Option<ShortcutAction> {
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(key, ctrl, shift))
            .map(|shortcut| shortcut.action)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}
