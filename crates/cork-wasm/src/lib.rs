//! WASM bridge for Corkboard: exposes the board engine to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host owns the DOM and
//! drawing; each frame it asks for `scene_json()` and paints that.

mod storage;

use cork_core::{Snapshot, Theme};
use cork_editor::{
    Board, CommandDispatcher, InputEvent, LibraryEntity, MemoryLibrary, Modifiers, Overlay, PointerButton,
};
use storage::{LocalStorageSettings, LocalStorageSnapshots};
use wasm_bindgen::prelude::*;

/// The main WASM-facing board controller.
///
/// All interaction from JS goes through this struct.
#[wasm_bindgen]
pub struct CorkCanvas {
    board: Board,
    dispatcher: CommandDispatcher,
    /// `false` = light (default), `true` = dark.
    dark_mode: bool,
}

#[wasm_bindgen]
impl CorkCanvas {
    /// Create a board controller for a canvas of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        console_log_setup();

        let mut board = match LocalStorageSettings::open() {
            Some(settings) => Board::with_settings(&settings),
            None => Board::default(),
        };
        board.set_screen_size(width, height);
        Self {
            board,
            dispatcher: CommandDispatcher::new(),
            dark_mode: false,
        }
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.board.set_screen_size(width, height);
    }

    /// Persist saves under `key` in `localStorage`. Returns `false` when
    /// storage is unavailable.
    pub fn use_local_storage(&mut self, key: &str) -> bool {
        match LocalStorageSnapshots::open(key) {
            Some(store) => {
                self.board.attach_snapshots(Box::new(store));
                true
            }
            None => false,
        }
    }

    // ─── Pointer & wheel ─────────────────────────────────────────────────

    /// Returns true if anything visible changed.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let modifiers = mods(shift, ctrl, alt, meta);
        self.feed(InputEvent::PointerDown {
            x,
            y,
            button: PointerButton::from_dom(button),
            modifiers,
        })
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = mods(shift, ctrl, alt, meta);
        let changed = self.feed(InputEvent::PointerMove { x, y, modifiers });
        // Marquee and connection previews redraw without touching the store.
        changed || !self.board.controller().is_idle()
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = mods(shift, ctrl, alt, meta);
        let was_busy = !self.board.controller().is_idle();
        self.feed(InputEvent::PointerUp { x, y, modifiers }) || was_busy
    }

    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64, ctrl: bool, meta: bool) -> bool {
        let modifiers = mods(false, ctrl, false, meta);
        self.feed(InputEvent::Wheel {
            x,
            y,
            delta_y,
            modifiers,
        })
    }

    // ─── Keyboard & commands ─────────────────────────────────────────────

    /// Handle a keyboard event. Returns JSON:
    /// `{"changed":bool,"action":"<command or none>"}`
    pub fn handle_key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> String {
        let before = self.board.store.revision();
        let event = InputEvent::key(key, mods(shift, ctrl, alt, meta));
        let action = match self.dispatcher.handle_input(&mut self.board, &event) {
            Ok(action) => action,
            Err(err) => {
                log::warn!("shortcut {key:?} failed: {err}");
                None
            }
        };
        let changed = before != self.board.store.revision();
        format!(
            r#"{{"changed":{changed},"action":"{}"}}"#,
            action.unwrap_or("none")
        )
    }

    /// Run a named command. Returns JSON `{"ok":true}` or
    /// `{"ok":false,"error":"..."}`.
    pub fn run_command(&mut self, name: &str) -> String {
        match self.dispatcher.dispatch(&mut self.board, name) {
            Ok(()) => r#"{"ok":true}"#.to_string(),
            Err(e) => error_json(&e.to_string()),
        }
    }

    pub fn command_names(&self) -> String {
        let names: Vec<&str> = self.dispatcher.names().collect();
        serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn can_undo(&self) -> bool {
        self.board.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.board.history.can_redo()
    }

    // ─── Scene ───────────────────────────────────────────────────────────

    /// The current frame as JSON (see `SceneView`).
    pub fn scene_json(&self) -> String {
        let theme = if self.dark_mode { Theme::dark() } else { Theme::light() };
        match serde_json::to_string(&self.board.scene(&theme)) {
            Ok(json) => json,
            Err(e) => error_json(&format!("Serialization error: {e}")),
        }
    }

    /// Gesture preview in canvas space, or `null`.
    pub fn overlay_json(&self) -> String {
        let value = match self.board.overlay() {
            Some(Overlay::Marquee(r)) => serde_json::json!({
                "kind": "marquee",
                "x": r.x0,
                "y": r.y0,
                "width": r.width(),
                "height": r.height(),
            }),
            Some(Overlay::Connection { from, to }) => serde_json::json!({
                "kind": "connection",
                "from": [from.x, from.y],
                "to": [to.x, to.y],
            }),
            None => serde_json::Value::Null,
        };
        value.to_string()
    }

    /// Drain pending notices as a JSON array of strings.
    pub fn take_notices_json(&mut self) -> String {
        let messages: Vec<String> = self.board.take_notices().into_iter().map(|n| n.message).collect();
        serde_json::to_string(&messages).unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Persistence & import ────────────────────────────────────────────

    pub fn export_json(&self) -> String {
        match self.board.serialize().to_json() {
            Ok(json) => json,
            Err(e) => error_json(&e.to_string()),
        }
    }

    /// Replace the board with a snapshot. Returns `false` (board untouched)
    /// if the JSON does not describe a valid board.
    pub fn import_json(&mut self, json: &str) -> bool {
        match Snapshot::from_json(json) {
            Ok(snapshot) => self.board.deserialize(snapshot).is_ok(),
            Err(e) => {
                log::warn!("rejected snapshot: {e}");
                false
            }
        }
    }

    /// Hand over the host's media library as a JSON array of
    /// `{referenceId,title,posterUrl?,releaseYear?}`.
    pub fn set_library_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<Vec<LibraryEntity>>(json) {
            Ok(entities) => {
                self.board.attach_library(Box::new(MemoryLibrary::new(entities)));
                true
            }
            Err(e) => {
                log::warn!("rejected library payload: {e}");
                false
            }
        }
    }
}

impl CorkCanvas {
    fn feed(&mut self, event: InputEvent) -> bool {
        let before = self.board.store.revision();
        if let Some(name) = self.board.handle_input(&event) {
            if let Err(err) = self.dispatcher.dispatch(&mut self.board, name) {
                log::warn!("{name} failed: {err}");
            }
        }
        before != self.board.store.revision()
    }
}

fn mods(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "ok": false, "error": message }).to_string()
}

// ─── Console plumbing for WASM debugging ─────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Corkboard WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

/// Routes `log` records to the browser console.
#[cfg(target_arch = "wasm32")]
struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Info
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = format!("[{}] {}", record.target(), record.args()).into();
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            _ => web_sys::console::log_1(&msg),
        }
    }

    fn flush(&self) {}
}

fn console_log_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        static LOGGER: ConsoleLogger = ConsoleLogger;
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Info);
        }
    }
}
