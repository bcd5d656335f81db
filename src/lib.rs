//! # FarmWise
//!
//! Client for the FarmWise crop advisor. A submission of the advisor form is
//! intercepted, its `soil` and `region` values are posted as JSON to the advisor
//! endpoint, and the JSON reply is rendered as an HTML fragment into the page's
//! result region.
//!
//! ## Architecture
//!
//! - **[`dom`]** - Element seams ([`dom::InputField`], [`dom::OutputRegion`]) and the in-memory [`dom::Document`]
//! - **[`handler`]** - The form submission handler and its response policy
//! - **[`transport`]** - The single JSON-over-HTTP exchange, backed by `reqwest`
//! - **[`payload`]** - The request body
//! - **[`report`]** - The reply as a tagged union of report and error
//! - **[`render`]** - Askama templates for the fragments and the full page
//! - **[`config`]** - Environment configuration
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `farmwise` command line
//!
//! ### Submission Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant Page as Document
//!     participant Handler as SubmissionHandler
//!     participant Advisor as Advisor API
//!
//!     User->>Page: fill soil + region, submit
//!     Page->>Handler: SubmitEvent
//!     Handler->>Handler: prevent_default()
//!     Handler->>Advisor: POST /api/advisor<br/>{"soil_type", "region"}
//!     alt advisor_report
//!         Advisor-->>Handler: {"advisor_report": {...}}
//!         Handler->>Page: report fragment into #result
//!     else error
//!         Advisor-->>Handler: {"error": "..."}
//!         Handler->>Page: error fragment into #result
//!     else unreachable / not JSON
//!         Handler->>Page: "Failed to connect to API" into #result
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use farmwise::dom::{Document, FormBindings, ADVISOR_FORM_ID, REGION_INPUT_ID, RESULT_REGION_ID, SOIL_INPUT_ID};
//! use farmwise::handler::SubmissionHandler;
//! use farmwise::transport::HttpTransport;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let page = Document::advisor_page();
//! page.input(SOIL_INPUT_ID)?.set_value("Loamy");
//! page.input(REGION_INPUT_ID)?.set_value("North");
//!
//! let transport = HttpTransport::new("http://127.0.0.1:5000/api/advisor")?;
//! let handler = SubmissionHandler::new(transport, FormBindings::from_document(&page)?);
//!
//! handler.on_submit(&page.submit(ADVISOR_FORM_ID)?).await;
//! println!("{}", page.region(RESULT_REGION_ID)?.inner_html());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod dom;
pub mod handler;
pub mod ids;
pub mod logging;
pub mod payload;
pub mod render;
pub mod report;
pub mod transport;

pub use config::AdvisorConfig;
pub use dom::{Document, FormBindings, SubmitEvent};
pub use handler::{Outcome, ResponsePolicy, SubmissionHandler, SubmissionOutcome};
pub use payload::AdvisorRequest;
pub use report::{AdvisorReply, AdvisorReport, ReportedError};
pub use transport::{AdvisorTransport, HttpTransport, TransportError};
