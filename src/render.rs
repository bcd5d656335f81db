//! # Fragment Rendering
//!
//! Turns an [`AdvisorReply`] into the HTML fragment written into the output region,
//! using Askama templates from `templates/`. Values are HTML-escaped.
//!
//! The transport fallback is a fixed string rather than a template so the last
//! resort of a submission can never fail to render.

use askama::Template;

use crate::dom::{ADVISOR_FORM_ID, REGION_INPUT_ID, RESULT_REGION_ID, SOIL_INPUT_ID};
use crate::report::{AdvisorReply, AdvisorReport, ReportedError};

/// Message shown when the exchange with the advisor could not complete
pub const CONNECT_FAILURE_MESSAGE: &str = "⚠️ Failed to connect to API";

/// Fragment rendered for any transport or parse failure
pub const CONNECT_FAILURE_HTML: &str = "<p style=\"color:red;\">⚠️ Failed to connect to API</p>";

/// Template data for the advisor report fragment
#[derive(Template)]
#[template(path = "advisor_report.html")]
pub struct ReportFragment<'a> {
    /// The report being displayed
    pub report: &'a AdvisorReport,
}

/// Template data for the application error fragment
#[derive(Template)]
#[template(path = "advisor_error.html")]
pub struct ErrorFragment<'a> {
    /// The error returned by the endpoint
    pub error: &'a ReportedError,
}

/// Template data for a full advisor page: the form plus the output region
#[derive(Template)]
#[template(path = "advisor_page.html")]
pub struct AdvisorPage<'a> {
    pub title: &'a str,
    pub form_id: &'a str,
    pub soil_id: &'a str,
    pub region_id: &'a str,
    pub result_id: &'a str,
    /// Current `soil` input value
    pub soil: &'a str,
    /// Current `region` input value
    pub region: &'a str,
    /// Already rendered fragment, inserted unescaped
    pub result_html: &'a str,
}

impl<'a> AdvisorPage<'a> {
    /// Page with the standard element ids.
    pub fn new(soil: &'a str, region: &'a str, result_html: &'a str) -> Self {
        Self {
            title: "FarmWise Advisor",
            form_id: ADVISOR_FORM_ID,
            soil_id: SOIL_INPUT_ID,
            region_id: REGION_INPUT_ID,
            result_id: RESULT_REGION_ID,
            soil,
            region,
            result_html,
        }
    }
}

/// Render the fragment for a decoded reply.
///
/// # Errors
///
/// Returns an error if the Askama template fails to render.
pub fn render_reply(reply: &AdvisorReply) -> askama::Result<String> {
    match reply {
        AdvisorReply::Report(report) => ReportFragment { report }.render(),
        AdvisorReply::Error(error) => ErrorFragment { error }.render(),
    }
}
