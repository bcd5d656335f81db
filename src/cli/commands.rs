use anyhow::{Context, Result};
use askama::Template;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::info;

use crate::config::AdvisorConfig;
use crate::dom::{
    Document, FormBindings, ADVISOR_FORM_ID, REGION_INPUT_ID, RESULT_REGION_ID, SOIL_INPUT_ID,
};
use crate::handler::{ResponsePolicy, SubmissionHandler};
use crate::render::AdvisorPage;
use crate::transport::HttpTransport;

/// Command-line interface for the FarmWise advisor client
#[derive(Parser, Debug)]
#[command(name = "farmwise")]
#[command(about = "FarmWise crop advisor client", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit the advisor form once and print the rendered fragment
    Submit {
        #[command(flatten)]
        form: FormArgs,

        #[command(flatten)]
        endpoint: EndpointArgs,

        /// Write the fragment to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Submit the advisor form once and print the whole page around the result
    Page {
        #[command(flatten)]
        form: FormArgs,

        #[command(flatten)]
        endpoint: EndpointArgs,

        /// Write the page to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Read `soil,region` lines from stdin and submit each one
    ///
    /// Every submission replaces the previous render. With `--output` the file
    /// always holds the latest fragment.
    Interactive {
        #[command(flatten)]
        endpoint: EndpointArgs,

        /// Keep the latest fragment in this file instead of printing each one
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Values typed into the form
#[derive(Args, Debug, Clone)]
pub struct FormArgs {
    /// Soil type (sent as `soil_type`)
    #[arg(long, default_value = "")]
    pub soil: String,

    /// Region (sent as `region`)
    #[arg(long, default_value = "")]
    pub region: String,
}

/// Overrides for the environment configuration
#[derive(Args, Debug, Clone, Default)]
pub struct EndpointArgs {
    /// Advisor URL (overrides FARMWISE_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Request timeout in milliseconds (overrides FARMWISE_TIMEOUT_MS)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Resolution of overlapping submissions (overrides FARMWISE_RESPONSE_POLICY)
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
}

impl EndpointArgs {
    /// Layer the flags given on the command line over `config`
    pub fn apply(&self, mut config: AdvisorConfig) -> AdvisorConfig {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout_ms = (ms > 0).then_some(ms);
        }
        if let Some(policy) = self.policy {
            config.response_policy = policy.into();
        }
        config
    }
}

/// Command-line spelling of [`ResponsePolicy`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Drop responses that belong to superseded submissions
    LatestSubmission,
    /// Render every response; the last one to resolve stays
    LastResolved,
}

impl From<PolicyArg> for ResponsePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::LatestSubmission => ResponsePolicy::LatestSubmissionWins,
            PolicyArg::LastResolved => ResponsePolicy::LastResolvedWins,
        }
    }
}

/// Execute the CLI command provided by the user
///
/// # Errors
///
/// Returns an error if:
/// - The async runtime or HTTP client cannot be created
/// - The output file cannot be written
/// - stdin cannot be read in interactive mode
///
/// An unreachable advisor is not an error: the fallback fragment is printed.
pub fn run_cli() -> Result<()> {
    run(Cli::parse())
}

/// Execute an already parsed command line
///
/// # Errors
///
/// See [`run_cli`].
pub fn run(cli: Cli) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match cli.command {
        Commands::Submit {
            form,
            endpoint,
            output,
        } => {
            let session = Session::open(endpoint.apply(AdvisorConfig::from_env()))?;
            let html = session.submit(&runtime, &form.soil, &form.region)?;
            write_output(output.as_deref(), &html)
        }
        Commands::Page {
            form,
            endpoint,
            output,
        } => {
            let session = Session::open(endpoint.apply(AdvisorConfig::from_env()))?;
            let html = session.submit(&runtime, &form.soil, &form.region)?;
            let page = AdvisorPage::new(&form.soil, &form.region, &html)
                .render()
                .context("Failed to render advisor page")?;
            write_output(output.as_deref(), &page)
        }
        Commands::Interactive { endpoint, output } => {
            let session = Session::open(endpoint.apply(AdvisorConfig::from_env()))?;
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = line.context("Failed to read stdin")?;
                if line.trim().is_empty() {
                    continue;
                }
                let (soil, region) = parse_form_line(&line);
                let html = session.submit(&runtime, &soil, &region)?;
                write_output(output.as_deref(), &html)?;
            }
            Ok(())
        }
    }
}

/// Split a `soil,region` line at its first comma, trimming both halves.
///
/// A line without a comma is all soil and an empty region.
pub fn parse_form_line(line: &str) -> (String, String) {
    match line.split_once(',') {
        Some((soil, region)) => (soil.trim().to_string(), region.trim().to_string()),
        None => (line.trim().to_string(), String::new()),
    }
}

/// One advisor page wired to a handler
struct Session {
    page: Document,
    handler: SubmissionHandler<HttpTransport>,
}

impl Session {
    fn open(config: AdvisorConfig) -> Result<Self> {
        let page = Document::advisor_page();
        let bindings = FormBindings::from_document(&page)?;
        let transport = HttpTransport::from_config(&config)?;
        info!(endpoint = %config.endpoint, policy = ?config.response_policy, "advisor client ready");
        let handler = SubmissionHandler::new(transport, bindings).with_policy(config.response_policy);
        Ok(Self { page, handler })
    }

    /// Type `soil` and `region` into the form, submit it and return the output region's contents.
    fn submit(&self, runtime: &Runtime, soil: &str, region: &str) -> Result<String> {
        self.page.input(SOIL_INPUT_ID)?.set_value(soil);
        self.page.input(REGION_INPUT_ID)?.set_value(region);
        let event = self.page.submit(ADVISOR_FORM_ID)?;

        let result = runtime.block_on(self.handler.on_submit(&event));
        info!(submission_id = %result.id, outcome = ?result.outcome, "submission finished");
        Ok(self.page.region(RESULT_REGION_ID)?.inner_html())
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{content}").context("Failed to write to stdout")?;
            stdout.flush().context("Failed to flush stdout")
        }
    }
}
