pub mod board;
pub mod dispatch;
pub mod history;
pub mod hit;
pub mod import;
pub mod input;
pub mod interaction;
pub mod library;
pub mod mutation;
pub mod shortcuts;

pub use board::{Board, Notice};
pub use dispatch::CommandDispatcher;
pub use history::{Command, History};
pub use input::{InputEvent, Modifiers, PointerButton};
pub use interaction::{InteractionController, InteractionState, Overlay};
pub use library::{Library, LibraryEntity, MemoryLibrary, MemorySettings, MemorySnapshots, SettingsStore, SnapshotStore};
pub use mutation::Mutation;
