//! # Form Submission Handler
//!
//! Reacts to a submit event on the advisor form:
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Page
//!     participant Handler as SubmissionHandler
//!     participant Transport as AdvisorTransport
//!     participant Output as OutputRegion
//!
//!     Page->>Handler: on_submit(event)
//!     Handler->>Handler: event.prevent_default()
//!     Handler->>Handler: read soil + region
//!     Handler->>Transport: exchange({soil_type, region})
//!     Note over Handler: AwaitingResponse
//!     alt JSON body with advisor_report
//!         Transport-->>Handler: body
//!         Handler->>Output: report fragment
//!     else JSON body without advisor_report
//!         Transport-->>Handler: body
//!         Handler->>Output: error fragment
//!     else transport or parse failure
//!         Transport-->>Handler: TransportError
//!         Handler->>Output: "Failed to connect to API"
//!     end
//!     Note over Handler: Idle
//! ```
//!
//! The handler never returns an error: every submission ends with exactly one
//! fragment in the output region, unless a newer submission superseded it under
//! [`ResponsePolicy::LatestSubmissionWins`].

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info, info_span, Instrument};

use crate::dom::{FormBindings, SubmitEvent};
use crate::ids::SubmissionId;
use crate::payload::AdvisorRequest;
use crate::render::{render_reply, CONNECT_FAILURE_HTML};
use crate::report::AdvisorReply;
use crate::transport::AdvisorTransport;

/// How overlapping submissions are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponsePolicy {
    /// Only the most recent submission may render; older responses are dropped
    #[default]
    LatestSubmissionWins,
    /// Every response renders; whichever resolves last stays on screen
    LastResolvedWins,
}

impl ResponsePolicy {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "last-resolved" | "last_resolved" => ResponsePolicy::LastResolvedWins,
            _ => ResponsePolicy::LatestSubmissionWins,
        }
    }
}

/// Handler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    Idle,
    /// At least one exchange is in flight
    AwaitingResponse,
}

/// What a submission ended up rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The advisor report fragment
    Report,
    /// The fragment showing the endpoint's `error` value
    ReportedError,
    /// The fixed connection failure fragment
    ConnectFailure,
    /// Nothing; a newer submission owns the output region
    Superseded,
}

/// Result of one submission
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub id: SubmissionId,
    /// Payload that was sent
    pub request: AdvisorRequest,
    pub outcome: Outcome,
    /// Fragment written to the output region, `None` when superseded
    pub html: Option<String>,
}

/// Handles submissions of the advisor form.
///
/// Generic over the transport so tests can script responses. Shared across
/// tasks behind an `Arc`; concurrent submissions are allowed.
pub struct SubmissionHandler<T> {
    transport: T,
    bindings: FormBindings,
    policy: ResponsePolicy,
    generation: AtomicU64,
    in_flight: AtomicUsize,
    render_lock: Mutex<()>,
}

impl<T: AdvisorTransport> SubmissionHandler<T> {
    pub fn new(transport: T, bindings: FormBindings) -> Self {
        Self {
            transport,
            bindings,
            policy: ResponsePolicy::default(),
            generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            render_lock: Mutex::new(()),
        }
    }

    /// Configure how overlapping submissions are resolved
    ///
    /// Default: [`ResponsePolicy::LatestSubmissionWins`]
    pub fn with_policy(mut self, policy: ResponsePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ResponsePolicy {
        self.policy
    }

    pub fn state(&self) -> HandlerState {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            HandlerState::AwaitingResponse
        } else {
            HandlerState::Idle
        }
    }

    /// Handle one submit event.
    ///
    /// Suppresses the event's default action, reads both inputs, performs one
    /// exchange and renders the result into the output region.
    pub async fn on_submit(&self, event: &SubmitEvent) -> SubmissionOutcome {
        event.prevent_default();

        let request = AdvisorRequest::new(self.bindings.soil.value(), self.bindings.region.value());
        let id = SubmissionId::new();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let span = info_span!("submission", submission_id = %id, form = event.form_id());
        self.run(id, generation, request).instrument(span).await
    }

    async fn run(&self, id: SubmissionId, generation: u64, request: AdvisorRequest) -> SubmissionOutcome {
        let _in_flight = InFlight::enter(&self.in_flight);
        info!(soil_type = %request.soil_type, region = %request.region, "submitting advisor form");

        let exchanged = self.transport.exchange(&request).await;
        let (outcome, html) = match exchanged {
            Ok(body) => {
                info!(response = %body, "API response");
                resolve_body(&body)
            }
            Err(e) => {
                error!(error = %e, "error fetching advisor");
                (Outcome::ConnectFailure, CONNECT_FAILURE_HTML.to_string())
            }
        };

        let _render = self.render_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.policy == ResponsePolicy::LatestSubmissionWins
            && self.generation.load(Ordering::SeqCst) != generation
        {
            debug!(?outcome, "newer submission pending, discarding response");
            return SubmissionOutcome {
                id,
                request,
                outcome: Outcome::Superseded,
                html: None,
            };
        }
        self.bindings.output.replace_html(&html);
        debug!(?outcome, "rendered");

        SubmissionOutcome {
            id,
            request,
            outcome,
            html: Some(html),
        }
    }
}

/// Decide the fragment for a JSON body.
fn resolve_body(body: &serde_json::Value) -> (Outcome, String) {
    let reply = match AdvisorReply::from_value(body) {
        Ok(reply) => reply,
        Err(e) => {
            error!(error = %e, "error fetching advisor");
            return (Outcome::ConnectFailure, CONNECT_FAILURE_HTML.to_string());
        }
    };
    let outcome = match reply {
        AdvisorReply::Report(_) => Outcome::Report,
        AdvisorReply::Error(_) => Outcome::ReportedError,
    };
    match render_reply(&reply) {
        Ok(html) => (outcome, html),
        Err(e) => {
            error!(error = %e, "failed to render advisor reply");
            (Outcome::ConnectFailure, CONNECT_FAILURE_HTML.to_string())
        }
    }
}

/// Keeps the in-flight counter raised for the duration of one exchange
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
