//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s, each of which
//! names a dispatcher command. The map lives in Rust so every host shares
//! the same bindings.
//!
//! Uses platform-aware modifier detection: on macOS `meta` is ⌘, on other
//! platforms `ctrl` serves the same role.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Create ──
    AddCard,
    AddSticky,
    AddWeb,

    // ── Edit ──
    Undo,
    Redo,
    Delete,
    Duplicate,
    SelectAll,
    Deselect,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomToFit,
    ToggleSnap,

    // ── Board ──
    Save,
    LayoutVertical,
    LayoutHorizontal,
    ImportLibrary,
}

impl ShortcutAction {
    pub const ALL: [ShortcutAction; 17] = [
        Self::AddCard,
        Self::AddSticky,
        Self::AddWeb,
        Self::Undo,
        Self::Redo,
        Self::Delete,
        Self::Duplicate,
        Self::SelectAll,
        Self::Deselect,
        Self::ZoomIn,
        Self::ZoomOut,
        Self::ZoomToFit,
        Self::ToggleSnap,
        Self::Save,
        Self::LayoutVertical,
        Self::LayoutHorizontal,
        Self::ImportLibrary,
    ];

    /// Dispatcher command this action runs.
    pub fn command_name(self) -> &'static str {
        match self {
            Self::AddCard => "add-card",
            Self::AddSticky => "add-sticky",
            Self::AddWeb => "add-web",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Delete => "delete-selection",
            Self::Duplicate => "duplicate-selection",
            Self::SelectAll => "select-all",
            Self::Deselect => "deselect",
            Self::ZoomIn => "zoom-in",
            Self::ZoomOut => "zoom-out",
            Self::ZoomToFit => "zoom-to-fit",
            Self::ToggleSnap => "toggle-snap",
            Self::Save => "save",
            Self::LayoutVertical => "layout-vertical",
            Self::LayoutHorizontal => "layout-horizontal",
            Self::ImportLibrary => "import-library",
        }
    }
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action. Returns `None` if the combo has no
    /// binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let cmd = modifiers.command();

        // ── Modifier combos first (most specific) ──
        if cmd && modifiers.shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                "l" | "L" => Some(ShortcutAction::LayoutHorizontal),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "s" | "S" => Some(ShortcutAction::Save),
                "l" | "L" => Some(ShortcutAction::LayoutVertical),
                "i" | "I" => Some(ShortcutAction::ImportLibrary),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomToFit),
                _ => None,
            };
        }

        if modifiers.shift {
            return match key {
                "!" | "1" => Some(ShortcutAction::ZoomToFit),
                _ => None,
            };
        }

        // ── Single keys (no modifiers) ──
        match key {
            "n" | "N" => Some(ShortcutAction::AddCard),
            "s" | "S" => Some(ShortcutAction::AddSticky),
            "w" | "W" => Some(ShortcutAction::AddWeb),
            "g" | "G" => Some(ShortcutAction::ToggleSnap),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}
