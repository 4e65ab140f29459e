//! testflow - command-line client for the TestFlow API.
//!
//! Results are printed as JSON on stdout; logs and errors go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use testflow_client::api::ProjectListParams;
use testflow_client::task::{PollerConfig, TaskType};
use testflow_client::{ClientConfig, Poller, TestFlowClient};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "testflow")]
#[command(author, version, about = "TestFlow API client", long_about = None)]
struct Cli {
    /// API base URL (overrides TESTFLOW_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token (overrides TESTFLOW_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the issued tokens
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Inspect or control an async task
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Submit an async AI task from a JSON payload file
    Submit {
        kind: SubmitKind,

        /// Path to the JSON request body
        #[arg(long)]
        payload: PathBuf,

        /// Poll until the task finishes and print its result
        #[arg(long)]
        wait: bool,
    },

    /// Run one-click generation for an uploaded requirement file
    GenerateAll {
        #[arg(long)]
        project: i64,

        #[arg(long)]
        module: i64,

        /// Requirement file id
        #[arg(long)]
        file: i64,

        /// Poll until the task finishes and print its result
        #[arg(long)]
        wait: bool,
    },

    /// Project operations
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Print the current status snapshot
    Status { task_id: String },

    /// Request cancellation
    Cancel { task_id: String },

    /// Poll until the task finishes and print its result
    Wait {
        task_id: String,

        /// Delay between status checks
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// List visible projects
    List {
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SubmitKind {
    TestPoints,
    TestCases,
    Optimize,
}

impl SubmitKind {
    fn task_type(self) -> TaskType {
        match self {
            SubmitKind::TestPoints => TaskType::TestPointGeneration,
            SubmitKind::TestCases => TaskType::TestCaseDesign,
            SubmitKind::Optimize => TaskType::TestCaseOptimization,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "testflow_client=info,testflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(token) = cli.token {
        config.token = Some(token);
    }
    let client = TestFlowClient::new(config)?;

    match cli.command {
        Commands::Login { username, password } => {
            let response = client.auth().login(&username, &password).await?;
            print_json(&response)
        }
        Commands::Task { action } => match action {
            TaskAction::Status { task_id } => {
                let snapshot = client.tasks().get_status(&task_id).await?;
                print_json(&snapshot)
            }
            TaskAction::Cancel { task_id } => {
                let outcome = client.tasks().cancel(&task_id).await?;
                print_json(&outcome)
            }
            TaskAction::Wait {
                task_id,
                interval_ms,
                timeout_secs,
            } => {
                let mut poller_config = client.poller().config().clone();
                if let Some(ms) = interval_ms {
                    poller_config.interval = Duration::from_millis(ms);
                }
                poller_config.timeout = timeout_secs.map(Duration::from_secs);
                let result = wait(&client, &Poller::new(poller_config), &task_id).await?;
                print_json(&result)
            }
        },
        Commands::Submit {
            kind,
            payload,
            wait: should_wait,
        } => {
            let raw = tokio::fs::read_to_string(&payload)
                .await
                .with_context(|| format!("failed to read {}", payload.display()))?;
            let body: Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", payload.display()))?;

            let accepted = client.tasks().submit(&kind.task_type(), &body).await?;
            if !should_wait {
                return print_json(&accepted);
            }
            let poller = Poller::new(PollerConfig::from_client_config(client.config()));
            let result = wait(&client, &poller, &accepted.task_id).await?;
            print_json(&result)
        }
        Commands::GenerateAll {
            project,
            module,
            file,
            wait: should_wait,
        } => {
            let accepted = client
                .tasks()
                .submit_one_click_generation(project, module, file)
                .await?;
            if !should_wait {
                return print_json(&accepted);
            }
            let result = wait(&client, &client.poller(), &accepted.task_id).await?;
            print_json(&result)
        }
        Commands::Projects { action } => match action {
            ProjectAction::List { search } => {
                let params = ProjectListParams {
                    search,
                    ..Default::default()
                };
                let page = client.projects().list(&params).await?;
                print_json(&page)
            }
        },
    }
}

/// Poll a task to completion; Ctrl-C stops polling without cancelling the task.
async fn wait(client: &TestFlowClient, poller: &Poller, task_id: &str) -> anyhow::Result<Value> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; no longer waiting for the task");
            on_interrupt.cancel();
        }
    });

    let tasks = client.tasks();
    let snapshot = poller
        .poll_until_terminal(&tasks, task_id, &cancel, |s| {
            info!(
                task_id = %s.task_id,
                status = %s.status,
                progress = s.progress_percent(),
                batches = %format!("{}/{}", s.completed_batches, s.total_batches),
                "Task progress"
            );
        })
        .await?;
    Ok(snapshot.into_result()?)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
