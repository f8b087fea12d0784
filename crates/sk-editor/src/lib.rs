//! Editing layer over `sk-core`: pointer and keyboard interaction, the
//! canvas/code sync controller, configuration and the project file service.

pub mod config;
pub mod debounce;
pub mod editor;
pub mod input;
pub mod machine;
pub mod project;
pub mod shortcuts;
pub mod sync;

pub use config::{ConfigError, EditorConfig};
pub use editor::Editor;
pub use input::{InputEvent, Modifiers};
pub use machine::{InteractionMachine, InteractionState};
pub use project::{
    FileError, FileStore, FsFileStore, MemoryFileStore, load_scene, save_scene, try_load_scene,
};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use sync::{SyncController, SyncEvent, SyncEvents};
