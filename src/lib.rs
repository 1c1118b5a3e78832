//! zcode-workspace: the editor workspace session core.
//!
//! Module layout:
//! - kernel: buffers, panes, lazy engine activation, autosave, search session
//! - kernel::services::ports: boundary contracts (files, engine, prompt, observers)
//! - kernel::services::adapters: local filesystem, search walker, settings store

pub mod kernel;
