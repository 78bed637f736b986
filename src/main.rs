use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::error;

use data_updater::env;
use data_updater::storage::DownloadStore;
use data_updater::updater::{self, UpdateRequest, UpdateStatus};
use data_updater::version::AppVersion;

#[derive(Parser, Debug)]
#[command(
    name = "data-updater",
    author,
    version,
    about = "Decides which data file revisions a client should download next"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the manifest against this client and print the files to fetch.
    Plan(PlanArgs),
    /// Record a completed download.
    Record {
        file_name: String,
        version_number: u32,
        #[command(flatten)]
        state: StateArgs,
    },
    /// Clear the download record for a file.
    Forget {
        file_name: String,
        #[command(flatten)]
        state: StateArgs,
    },
    /// List recorded downloads.
    Status {
        #[command(flatten)]
        state: StateArgs,
    },
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Manifest document: a local path or an http(s) URL.
    #[arg(long)]
    manifest: String,
    /// Version of the running application, e.g. 1.4.0.
    #[arg(long)]
    app_version: AppVersion,
    /// Allow revisions restricted to the test channel.
    #[arg(long)]
    test_client: bool,
    /// JSON object of versions embedded in the build.
    #[arg(long)]
    build_versions: Option<PathBuf>,
    #[command(flatten)]
    state: StateArgs,
    /// Print the plan as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct StateArgs {
    /// Download state file (defaults to the data directory).
    #[arg(long)]
    state: Option<PathBuf>,
}

impl StateArgs {
    fn store(&self) -> DownloadStore {
        match &self.state {
            Some(path) => DownloadStore::at(path),
            None => DownloadStore::new(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Plan(args) => plan(args).await,
        Command::Record {
            file_name,
            version_number,
            state,
        } => state.store().record(&file_name, version_number).await,
        Command::Forget { file_name, state } => forget(&file_name, &state.store()).await,
        Command::Status { state } => status(&state.store()).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn plan(args: PlanArgs) -> Result<(), String> {
    let request = UpdateRequest {
        manifest_source: args.manifest,
        app_version: args.app_version,
        is_test_client: args.test_client,
        build_versions: args.build_versions.unwrap_or_else(env::build_versions_file),
        download_state: args.state.store().path().to_path_buf(),
    };

    match updater::check_for_updates(&request).await {
        UpdateStatus::CheckFailed(err) => Err(err),
        UpdateStatus::UpToDate if args.json => {
            println!("[]");
            Ok(())
        }
        UpdateStatus::UpToDate => Ok(()),
        UpdateStatus::DownloadsPending(plan) if args.json => {
            let json = serde_json::to_string_pretty(&plan)
                .map_err(|e| format!("failed to serialize plan: {e}"))?;
            println!("{json}");
            Ok(())
        }
        UpdateStatus::DownloadsPending(plan) => {
            for download in &plan {
                println!("{}\t{}", download.file_name, download.version_number);
            }
            Ok(())
        }
    }
}

async fn forget(file_name: &str, store: &DownloadStore) -> Result<(), String> {
    if store.forget(file_name).await? {
        Ok(())
    } else {
        Err(format!("no download recorded for {file_name}"))
    }
}

async fn status(store: &DownloadStore) -> Result<(), String> {
    let entries = store.entries().await?;
    if entries.is_empty() {
        println!("no downloads recorded in {}", store.path().display());
    }
    for (file_name, record) in entries {
        println!("{file_name}\t{}\t{}", record.version, record.downloaded_at);
    }
    Ok(())
}
