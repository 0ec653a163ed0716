///
/// This module implements the CLI interface of the `kendra-loader` binary: command
/// parsing, argument validation and the async entrypoint used by `main` and tests.
///
/// All pass logic (normalizing, uploading, cleaning) lives in the
/// [`kendra-loader-core`] crate. This module only builds the config, picks the
/// concrete S3 client and turns reports into log lines and an exit status.
///
/// ## How To Use
/// - From a shell: `kendra-loader prepare`, `kendra-loader upload --target BUCKET`,
///   `kendra-loader clean`, each relative to the current directory.
/// - Programmatically: call [`run`] with a constructed [`Cli`].
///
/// [`kendra-loader-core`]: ../../kendra-loader-core/
use crate::aws::{AwsSession, S3Client};
use crate::load_config::load_or_default;
use anyhow::Result;
use clap::{Parser, Subcommand};
use kendra_loader_core::clean::clean;
use kendra_loader_core::config::BucketTarget;
use kendra_loader_core::prepare::prepare;
use kendra_loader_core::upload::upload;
use kendra_loader_core::FileFailure;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_REGION: &str = "us-east-1";

/// CLI for kendra-loader: turn crawled documents into a Kendra-ready bucket.
#[derive(Parser)]
#[clap(
    name = "kendra-loader",
    version,
    about = "Prepare crawled JSON documents for Kendra and load them into S3",
    after_help = "Actions:\n  prepare  raw/*.json -> content/X.txt + content/X.txt.metadata.json\n  upload   content/* -> s3://TARGET/<file name>\n  clean    delete every file in content/"
)]
pub struct Cli {
    /// Optional YAML file overriding directories, worker settings and metadata defaults
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize every raw document into a text body plus metadata sidecar
    Prepare,
    /// Upload the prepared files to an S3 bucket
    Upload {
        /// Target bucket name
        #[clap(long, short = 't')]
        target: String,
        /// Bucket region
        #[clap(long, short = 'r', default_value = DEFAULT_REGION)]
        region: String,
        /// Credential profile; without it AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY are used, then the default profile
        #[clap(long, short = 'p')]
        profile: Option<String>,
    },
    /// Remove all prepared files
    Clean,
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let config = load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Prepare => {
            tracing::info!(command = "prepare", "Starting prepare pass");
            let report = prepare(&config.source_dir, &config.content_dir, &config.metadata)?;
            tracing::info!(
                command = "prepare",
                found = report.found,
                written = report.written.len(),
                failed = report.failures.len(),
                "Prepare complete"
            );
            fail_on_failures("prepare", &report.failures)
        }
        Commands::Upload {
            target,
            region,
            profile,
        } => {
            let target = BucketTarget {
                bucket: target,
                region,
                profile,
            };
            target.trace_loaded();
            let session = AwsSession::new(target.profile.as_deref(), &target.region)?;
            let store = Arc::new(S3Client::new(session));
            let report = upload(store, &config.content_dir, &target, &config.upload).await?;
            tracing::info!(
                command = "upload",
                uploaded = report.uploaded(),
                total = report.outcomes.len(),
                "Upload complete"
            );
            let failures: Vec<FileFailure> = report
                .outcomes
                .into_iter()
                .filter_map(|o| match o.result {
                    Ok(()) => None,
                    Err(error) => Some(FileFailure {
                        file: o.file,
                        error,
                    }),
                })
                .collect();
            fail_on_failures("upload", &failures)
        }
        Commands::Clean => {
            let report = clean(&config.content_dir)?;
            tracing::info!(
                command = "clean",
                found = report.found,
                removed = report.removed,
                "Clean complete"
            );
            fail_on_failures("clean", &report.failures)
        }
    }
}

fn fail_on_failures(command: &str, failures: &[FileFailure]) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    for failure in failures {
        tracing::error!(command, file = %failure.file, error = %failure.error, "File failed");
    }
    Err(anyhow::anyhow!(
        "{command}: {} file(s) failed, first: {}: {}",
        failures.len(),
        failures[0].file,
        failures[0].error
    ))
}
