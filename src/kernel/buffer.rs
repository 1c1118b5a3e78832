//! Buffer store: one in-memory text buffer per document path.
//!
//! Tabs never own text. They hold a `DocPath` and the store hands out the
//! single `Buffer` behind it, so every pane sees the same content.

use ropey::Rope;
use rustc_hash::FxHashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::language::LanguageId;

/// Identity of a document: a file on disk or a synthetic untitled name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocPath {
    File(PathBuf),
    Untitled(String),
}

impl DocPath {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn as_file(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Untitled(_) => None,
        }
    }

    pub fn is_untitled(&self) -> bool {
        matches!(self, Self::Untitled(_))
    }

    /// Basename for files, the placeholder name for untitled documents.
    pub fn title(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| path.to_string_lossy().to_string()),
            Self::Untitled(name) => name.clone(),
        }
    }

    pub fn language(&self) -> LanguageId {
        match self {
            Self::File(path) => LanguageId::from_path(path),
            Self::Untitled(_) => LanguageId::PlainText,
        }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Untitled(name) => f.write_str(name),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(u64);

impl BufferId {
    pub const fn raw(self) -> u64 {
        self.0
    }
}

pub struct Buffer {
    id: BufferId,
    path: DocPath,
    text: Rope,
    loaded: bool,
    language: LanguageId,
    version: u64,
    holders: usize,
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("loaded", &self.loaded)
            .field("language", &self.language)
            .field("version", &self.version)
            .field("holders", &self.holders)
            .field("chars", &self.text.len_chars())
            .finish()
    }
}

impl Buffer {
    fn new(id: BufferId, path: DocPath, initial: Option<&str>) -> Self {
        let language = path.language();
        Self {
            id,
            path,
            text: initial.map(Rope::from_str).unwrap_or_default(),
            loaded: initial.is_some(),
            language,
            version: 0,
            holders: 0,
        }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn path(&self) -> &DocPath {
        &self.path
    }

    pub fn rope(&self) -> &Rope {
        &self.text
    }

    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// Whether the buffer was ever explicitly loaded or created with content.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn language(&self) -> LanguageId {
        self.language
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of tabs currently showing this buffer.
    pub fn holders(&self) -> usize {
        self.holders
    }

    fn replace(&mut self, content: &str) {
        self.text = Rope::from_str(content);
        self.loaded = true;
        self.version = self.version.saturating_add(1);
    }
}

/// What `get_or_create` did to produce the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    Created,
    Existing,
    /// An existing buffer had its content replaced by the supplied text.
    Reloaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferEvent<'a> {
    Created { path: &'a DocPath, id: BufferId },
    Changed { path: &'a DocPath, version: u64 },
    Reloaded { path: &'a DocPath, version: u64 },
    Released { path: &'a DocPath },
}

pub type BufferListener = Box<dyn Fn(&BufferEvent<'_>) + Send + Sync>;

#[derive(Default)]
pub struct BufferStore {
    buffers: FxHashMap<DocPath, Buffer>,
    next_id: u64,
    listeners: Vec<BufferListener>,
}

impl fmt::Debug for BufferStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferStore")
            .field("buffers", &self.buffers.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl BufferStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: BufferListener) {
        self.listeners.push(listener);
    }

    fn emit(listeners: &[BufferListener], event: BufferEvent<'_>) {
        for listener in listeners {
            listener(&event);
        }
    }

    /// Returns the buffer for `path`, creating it on first use.
    ///
    /// `initial` only touches an existing buffer when it differs from the
    /// current content; callers that merely re-focus a document pass `None`.
    pub fn get_or_create(&mut self, path: &DocPath, initial: Option<&str>) -> (&Buffer, Acquire) {
        let acquire = match self.buffers.get_mut(path) {
            Some(buffer) => match initial {
                Some(content) if buffer.text != content => {
                    buffer.replace(content);
                    Acquire::Reloaded
                }
                Some(_) => {
                    buffer.loaded = true;
                    Acquire::Existing
                }
                None => Acquire::Existing,
            },
            None => {
                self.next_id = self.next_id.saturating_add(1);
                let buffer = Buffer::new(BufferId(self.next_id), path.clone(), initial);
                self.buffers.insert(path.clone(), buffer);
                Acquire::Created
            }
        };

        let buffer = &self.buffers[path];
        match acquire {
            Acquire::Created => {
                tracing::debug!(path = %path, id = buffer.id.raw(), "buffer created");
                Self::emit(
                    &self.listeners,
                    BufferEvent::Created {
                        path: &buffer.path,
                        id: buffer.id,
                    },
                );
            }
            Acquire::Reloaded => {
                tracing::debug!(path = %path, version = buffer.version, "buffer reloaded");
                Self::emit(
                    &self.listeners,
                    BufferEvent::Reloaded {
                        path: &buffer.path,
                        version: buffer.version,
                    },
                );
            }
            Acquire::Existing => {}
        }
        (buffer, acquire)
    }

    /// Replaces the content of an existing buffer.
    ///
    /// Returns `None` for an unknown path and `Some(changed)` otherwise.
    pub fn write(&mut self, path: &DocPath, content: &str) -> Option<bool> {
        let buffer = self.buffers.get_mut(path)?;
        if buffer.text == content {
            return Some(false);
        }
        buffer.replace(content);
        Self::emit(
            &self.listeners,
            BufferEvent::Changed {
                path: &buffer.path,
                version: buffer.version,
            },
        );
        Some(true)
    }

    pub fn get(&self, path: &DocPath) -> Option<&Buffer> {
        self.buffers.get(path)
    }

    pub fn contains(&self, path: &DocPath) -> bool {
        self.buffers.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &DocPath> {
        self.buffers.keys()
    }

    pub fn set_language(&mut self, path: &DocPath, language: LanguageId) -> bool {
        let Some(buffer) = self.buffers.get_mut(path) else {
            return false;
        };
        if buffer.language == language {
            return false;
        }
        buffer.language = language;
        true
    }

    /// Records that a tab now shows `path`.
    pub(crate) fn attach(&mut self, path: &DocPath) -> bool {
        let Some(buffer) = self.buffers.get_mut(path) else {
            return false;
        };
        buffer.holders = buffer.holders.saturating_add(1);
        true
    }

    /// Records that a tab showing `path` went away. Returns the remaining holder count.
    pub(crate) fn detach(&mut self, path: &DocPath) -> Option<usize> {
        let buffer = self.buffers.get_mut(path)?;
        buffer.holders = buffer.holders.saturating_sub(1);
        Some(buffer.holders)
    }

    /// Disposes the buffer. A no-op while any tab still shows it.
    pub fn release(&mut self, path: &DocPath) -> bool {
        match self.buffers.get(path) {
            Some(buffer) if buffer.holders == 0 => {}
            Some(buffer) => {
                tracing::warn!(path = %path, holders = buffer.holders, "release of a referenced buffer ignored");
                return false;
            }
            None => return false,
        }
        self.buffers.remove(path);
        tracing::debug!(path = %path, "buffer released");
        Self::emit(&self.listeners, BufferEvent::Released { path });
        true
    }

    /// Moves a buffer to a new identity (save-as). Fails if `to` is taken.
    pub(crate) fn rekey(&mut self, from: &DocPath, to: &DocPath) -> bool {
        if self.buffers.contains_key(to) {
            return false;
        }
        let Some(mut buffer) = self.buffers.remove(from) else {
            return false;
        };
        buffer.path = to.clone();
        buffer.language = to.language();
        buffer.loaded = true;
        self.buffers.insert(to.clone(), buffer);
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/buffer.rs"]
mod tests;
