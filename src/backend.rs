//! Pluggable markup parser/builder and the thread-scoped selection of the active one.
//!
//! Every decode and encode call asks [`backend()`] for the implementation to use. The
//! answer is the calling thread's innermost [`with_backend`] override, or the process-wide
//! default when the thread has none. Overrides of one thread are never visible to another.

use std::cell::RefCell;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use smallvec::SmallVec;

use crate::budget::BudgetEnforcer;
use crate::error::Error;
use crate::quick::QuickXml;

/// One element of a parsed document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Node {
    /// Element name as written.
    pub name: String,
    /// Attributes in document order with entities expanded.
    pub attributes: SmallVec<[(String, String); 4]>,
    /// Element children in document order.
    pub children: Vec<Node>,
    /// Direct character data. `Some` iff the element holds a CDATA section or
    /// non-whitespace text; an explicit empty `<![CDATA[]]>` gives `Some("")`.
    pub text: Option<String>,
    /// Whitespace-only character data, kept apart from `text` so that `type="string"`
    /// leaves can return it verbatim. `None` whenever `text` is `Some`.
    pub whitespace: Option<String>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Value of the attribute called `name`, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Emits markup. Implementations escape text and attribute values themselves, so
/// callers always pass raw strings.
pub trait MarkupBuilder {
    /// `<?xml version="1.0" encoding="UTF-8"?>`
    fn declaration(&mut self) -> Result<(), Error>;

    fn open_tag(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), Error>;

    /// Self-closing element.
    fn empty_tag(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), Error>;

    fn write_text(&mut self, text: &str) -> Result<(), Error>;

    fn close_tag(&mut self, name: &str) -> Result<(), Error>;

    /// Consume the builder and return the document.
    fn finish(self: Box<Self>) -> Result<String, Error>;

    /// Element with text content and no attributes.
    fn element(&mut self, name: &str, text: &str) -> Result<(), Error> {
        self.open_tag(name, &[])?;
        self.write_text(text)?;
        self.close_tag(name)
    }
}

/// A markup parser/builder pair.
pub trait XmlBackend: Send + Sync {
    /// Identifies the backend; handles compare equal by name.
    fn name(&self) -> &str;

    /// Parse a whole document. Every element and entity expansion is charged to
    /// `budget`. Returns `None` for an empty or whitespace-only document.
    fn parse(&self, text: &str, budget: &mut BudgetEnforcer) -> Result<Option<Node>, Error>;

    /// Fresh builder; `indent` spaces per nesting level, `0` for compact output.
    fn builder(&self, indent: usize) -> Box<dyn MarkupBuilder>;
}

/// Cheap, clonable handle to a backend.
#[derive(Clone)]
pub struct Backend(Arc<dyn XmlBackend>);

impl Backend {
    pub fn new<B: XmlBackend + 'static>(backend: B) -> Self {
        Backend(Arc::new(backend))
    }

    /// The built-in quick-xml backend.
    pub fn quick_xml() -> Self {
        Backend::new(QuickXml)
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn parse(&self, text: &str, budget: &mut BudgetEnforcer) -> Result<Option<Node>, Error> {
        self.0.parse(text, budget)
    }

    pub fn builder(&self, indent: usize) -> Box<dyn MarkupBuilder> {
        self.0.builder(indent)
    }
}

impl PartialEq for Backend {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Backend {}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Backend").field(&self.name()).finish()
    }
}

static DEFAULT: RwLock<Option<Backend>> = RwLock::new(None);

thread_local! {
    static OVERRIDES: RefCell<Vec<Backend>> = const { RefCell::new(Vec::new()) };
}

/// The backend decode and encode calls on this thread will use.
pub fn backend() -> Backend {
    OVERRIDES
        .with(|stack| stack.borrow().last().cloned())
        .unwrap_or_else(default_backend)
}

/// The process-wide default, ignoring any override on this thread.
pub fn default_backend() -> Backend {
    DEFAULT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_else(Backend::quick_xml)
}

/// Replace the process-wide default backend.
pub fn set_default_backend(backend: Backend) {
    log::debug!("default backend set to {}", backend.name());
    *DEFAULT.write().unwrap_or_else(PoisonError::into_inner) = Some(backend);
}

/// Non-scoped setter.
///
/// Inside a [`with_backend`] body this replaces the innermost override for the rest of
/// that scope; the previous backend is still restored when the scope ends. Outside any
/// scope it replaces the process-wide default.
pub fn set_backend(backend: Backend) {
    let replaced = OVERRIDES.with(|stack| match stack.borrow_mut().last_mut() {
        Some(top) => {
            log::trace!("backend override {} replaced by {}", top.name(), backend.name());
            *top = backend.clone();
            true
        }
        None => false,
    });
    if !replaced {
        set_default_backend(backend);
    }
}

/// Run `body` with `backend` active on the calling thread.
///
/// The override is removed on every exit path, including unwinding panics, and nested
/// calls restore the enclosing override.
///
/// ```rust
/// use xml_mini::{Backend, backend, with_backend};
///
/// let outer = backend();
/// let name = with_backend(Backend::quick_xml(), || backend().name().to_owned());
/// assert_eq!(name, "quick-xml");
/// assert_eq!(backend(), outer);
/// ```
pub fn with_backend<R>(backend: Backend, body: impl FnOnce() -> R) -> R {
    let depth = OVERRIDES.with(|stack| {
        let mut stack = stack.borrow_mut();
        log::trace!("backend override {} pushed", backend.name());
        stack.push(backend);
        stack.len() - 1
    });
    let guard = Guard { depth };
    let result = body();
    drop(guard);
    result
}

struct Guard {
    depth: usize,
}

impl Drop for Guard {
    fn drop(&mut self) {
        OVERRIDES.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(top) = stack.get(self.depth) {
                log::trace!("backend override {} popped", top.name());
            }
            stack.truncate(self.depth);
        });
    }
}
