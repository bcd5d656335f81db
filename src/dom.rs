//! # Page Elements
//!
//! The submission handler never looks elements up on its own. It is handed
//! explicit references through [`FormBindings`]: two [`InputField`]s to read and
//! one [`OutputRegion`] to write. Anything that can produce those can host the
//! handler.
//!
//! [`Document`] is the in-memory page used by the CLI and the tests. It stores
//! forms, text inputs and HTML regions by element id and hands out shared handles,
//! so a value set on a [`TextInput`] after binding is what the handler reads at
//! submit time.
//!
//! ```rust
//! use farmwise::dom::{Document, FormBindings, ADVISOR_FORM_ID, SOIL_INPUT_ID};
//!
//! let page = Document::advisor_page();
//! page.input(SOIL_INPUT_ID).unwrap().set_value("Loamy");
//! let bindings = FormBindings::from_document(&page).unwrap();
//! let event = page.submit(ADVISOR_FORM_ID).unwrap();
//! assert!(!event.default_prevented());
//! # drop(bindings);
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Id of the form whose submission is intercepted
pub const ADVISOR_FORM_ID: &str = "advisor-form";
/// Id of the soil type input
pub const SOIL_INPUT_ID: &str = "soil";
/// Id of the region input
pub const REGION_INPUT_ID: &str = "region";
/// Id of the region that receives rendered fragments
pub const RESULT_REGION_ID: &str = "result";

/// A text input the handler reads at submit time
pub trait InputField: Send + Sync {
    /// Current text of the input, possibly empty
    fn value(&self) -> String;
}

/// The region whose contents are replaced by each render
pub trait OutputRegion: Send + Sync {
    /// Replace the whole contents with `html`
    fn replace_html(&self, html: &str);
}

/// Shared handle to a text input's value
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: Arc<RwLock<String>>,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Arc::new(RwLock::new(value.into())),
        }
    }

    pub fn set_value(&self, value: impl Into<String>) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = value.into();
    }
}

impl InputField for TextInput {
    fn value(&self) -> String {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Debug, Default)]
struct RegionState {
    html: String,
    writes: u64,
}

/// Shared handle to an HTML region
#[derive(Debug, Clone, Default)]
pub struct HtmlRegion {
    state: Arc<RwLock<RegionState>>,
}

impl HtmlRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents
    pub fn inner_html(&self) -> String {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .html
            .clone()
    }

    /// Number of times the contents were replaced
    pub fn write_count(&self) -> u64 {
        self.state.read().unwrap_or_else(PoisonError::into_inner).writes
    }
}

impl OutputRegion for HtmlRegion {
    fn replace_html(&self, html: &str) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.html.clear();
        state.html.push_str(html);
        state.writes += 1;
    }
}

/// A submit event dispatched on a form
#[derive(Debug)]
pub struct SubmitEvent {
    form_id: String,
    default_prevented: AtomicBool,
}

impl SubmitEvent {
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            default_prevented: AtomicBool::new(false),
        }
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    /// Suppress the default action (page navigation)
    pub fn prevent_default(&self) {
        self.default_prevented.store(true, Ordering::SeqCst);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::SeqCst)
    }
}

/// Kind of element a lookup expected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Form,
    Input,
    Region,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Form => f.write_str("form"),
            ElementKind::Input => f.write_str("input"),
            ElementKind::Region => f.write_str("region"),
        }
    }
}

/// Element lookup failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// No element of the expected kind carries this id
    MissingElement {
        /// The id that was looked up
        id: String,
        /// What kind of element was expected
        kind: ElementKind,
    },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::MissingElement { id, kind } => {
                write!(f, "no {kind} element with id '{id}' on the page")
            }
        }
    }
}

impl std::error::Error for BindError {}

/// In-memory page: forms, inputs and regions keyed by element id
#[derive(Debug, Default)]
pub struct Document {
    forms: HashSet<String>,
    inputs: HashMap<String, TextInput>,
    regions: HashMap<String, HtmlRegion>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// The advisor page: `advisor-form`, empty `soil` and `region` inputs, empty `result`.
    pub fn advisor_page() -> Self {
        let mut doc = Self::new();
        doc.add_form(ADVISOR_FORM_ID);
        doc.add_input(SOIL_INPUT_ID, TextInput::default());
        doc.add_input(REGION_INPUT_ID, TextInput::default());
        doc.add_region(RESULT_REGION_ID, HtmlRegion::new());
        doc
    }

    pub fn add_form(&mut self, id: impl Into<String>) {
        self.forms.insert(id.into());
    }

    pub fn add_input(&mut self, id: impl Into<String>, input: TextInput) {
        self.inputs.insert(id.into(), input);
    }

    pub fn add_region(&mut self, id: impl Into<String>, region: HtmlRegion) {
        self.regions.insert(id.into(), region);
    }

    /// # Errors
    ///
    /// Returns [`BindError::MissingElement`] if no input has this id.
    pub fn input(&self, id: &str) -> Result<TextInput, BindError> {
        self.inputs
            .get(id)
            .cloned()
            .ok_or_else(|| missing(id, ElementKind::Input))
    }

    /// # Errors
    ///
    /// Returns [`BindError::MissingElement`] if no region has this id.
    pub fn region(&self, id: &str) -> Result<HtmlRegion, BindError> {
        self.regions
            .get(id)
            .cloned()
            .ok_or_else(|| missing(id, ElementKind::Region))
    }

    /// Create a submit event targeting the form `form_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingElement`] if no form has this id.
    pub fn submit(&self, form_id: &str) -> Result<SubmitEvent, BindError> {
        if self.forms.contains(form_id) {
            Ok(SubmitEvent::new(form_id))
        } else {
            Err(missing(form_id, ElementKind::Form))
        }
    }
}

fn missing(id: &str, kind: ElementKind) -> BindError {
    BindError::MissingElement {
        id: id.to_string(),
        kind,
    }
}

/// Explicit element references handed to the submission handler
#[derive(Clone)]
pub struct FormBindings {
    pub soil: Arc<dyn InputField>,
    pub region: Arc<dyn InputField>,
    pub output: Arc<dyn OutputRegion>,
}

impl FormBindings {
    pub fn new(
        soil: Arc<dyn InputField>,
        region: Arc<dyn InputField>,
        output: Arc<dyn OutputRegion>,
    ) -> Self {
        Self {
            soil,
            region,
            output,
        }
    }

    /// Resolve the `soil`, `region` and `result` elements of `doc`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingElement`] naming the first element not found.
    pub fn from_document(doc: &Document) -> Result<Self, BindError> {
        Ok(Self {
            soil: Arc::new(doc.input(SOIL_INPUT_ID)?),
            region: Arc::new(doc.input(REGION_INPUT_ID)?),
            output: Arc::new(doc.region(RESULT_REGION_ID)?),
        })
    }
}

impl fmt::Debug for FormBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormBindings")
            .field("soil", &self.soil.value())
            .field("region", &self.region.value())
            .finish_non_exhaustive()
    }
}
