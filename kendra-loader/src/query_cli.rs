/// CLI interface of the `kendra-query` binary.
///
/// Two subcommands: `send-simple-query` prints the raw response of one query,
/// `run-test-case` replays a CSV of questions and writes a results table.
/// Both log the resolved caller identity before talking to the index.
use crate::aws::{AwsSession, KendraClient, S3Client, StsClient};
use crate::cli::DEFAULT_REGION;
use crate::intent::HttpIntentClient;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kendra_loader_core::contract::ObjectStore;
use kendra_loader_core::query::{send_simple_query, QueryTarget};
use kendra_loader_core::test_case::{read_test_cases, run_test_cases, write_results, Operation};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(
    name = "kendra-query",
    version,
    about = "Query a Kendra index and replay CSV test cases against it"
)]
pub struct QueryCli {
    #[clap(subcommand)]
    pub command: QueryCommands,
}

#[derive(Subcommand)]
pub enum QueryCommands {
    /// Run one query and print the response as JSON
    SendSimpleQuery {
        /// Query text
        #[clap(long, short = 's')]
        search: String,
        /// Credential profile; without it AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY are used, then the default profile
        #[clap(long, short = 'p')]
        profile: Option<String>,
        #[clap(long, default_value = DEFAULT_REGION)]
        region: String,
        #[clap(long, env = "KENDRA_INDEX_ID")]
        index_id: String,
    },
    /// Run every question of a `persona:question` CSV file
    RunTestCase {
        /// Test-case file, `:`-delimited with a header row
        #[clap(long, short = 'f')]
        file: PathBuf,
        /// Credential profile; without it AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY are used, then the default profile
        #[clap(long, short = 'p')]
        profile: Option<String>,
        #[clap(long, default_value = DEFAULT_REGION)]
        region: String,
        #[clap(long, env = "KENDRA_INDEX_ID")]
        index_id: String,
        /// `direct` (index only) or `eve` (index plus intent endpoint)
        #[clap(long, short = 'o', default_value = "DIRECT", value_parser = parse_operation)]
        operation: Operation,
        /// Intent endpoint URL, required by `eve`
        #[clap(long, short = 'e')]
        endpoint: Option<String>,
        /// Where to write the results CSV
        #[clap(long, default_value = "test-results.csv")]
        output: PathBuf,
        /// Also upload the results CSV to this bucket
        #[clap(long, short = 't')]
        target: Option<String>,
    },
}

fn parse_operation(value: &str) -> Result<Operation, String> {
    value.parse::<Operation>().map_err(|e| e.to_string())
}

pub async fn run(cli: QueryCli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        QueryCommands::SendSimpleQuery {
            search,
            profile,
            region,
            index_id,
        } => {
            let target = QueryTarget {
                index_id,
                region,
                profile,
            };
            let session = open_session(&target).await?;
            let client = KendraClient::new(session);
            let response = send_simple_query(&client, &target.index_id, &search).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        QueryCommands::RunTestCase {
            file,
            profile,
            region,
            index_id,
            operation,
            endpoint,
            output,
            target: bucket,
        } => {
            if operation == Operation::Eve && endpoint.is_none() {
                anyhow::bail!("--endpoint is required when --operation is eve");
            }
            let reader = File::open(&file)
                .with_context(|| format!("Failed to open test-case file {}", file.display()))?;
            let cases = read_test_cases(reader)?;

            let target = QueryTarget {
                index_id,
                region,
                profile,
            };
            let session = open_session(&target).await?;
            let search = KendraClient::new(session.clone());
            let intent = endpoint.map(HttpIntentClient::new);

            let rows =
                run_test_cases(&cases, operation, &target.index_id, &search, intent.as_ref())
                    .await?;
            let failed = rows.iter().filter(|r| !r.error.is_empty()).count();

            let out = File::create(&output)
                .with_context(|| format!("Failed to create results file {}", output.display()))?;
            write_results(&rows, out)?;
            tracing::info!(
                rows = rows.len(),
                failed,
                output = %output.display(),
                "Test cases written"
            );

            if let Some(bucket) = bucket {
                let key = output
                    .file_name()
                    .and_then(|n| n.to_str())
                    .context("results path has no file name")?
                    .to_string();
                S3Client::new(session)
                    .upload_file(&output, &bucket, &key)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to upload {key} to {bucket}: {e}"))?;
                tracing::info!(bucket = %bucket, key = %key, "Results uploaded");
            }
            Ok(())
        }
    }
}

async fn open_session(target: &QueryTarget) -> Result<AwsSession> {
    let session = AwsSession::new(target.profile.as_deref(), &target.region)?;
    match StsClient::new(session.clone()).get_caller_identity().await {
        Ok(identity) => tracing::info!(
            account = %identity.account,
            arn = %identity.arn,
            user_id = %identity.user_id,
            "Caller identity"
        ),
        Err(e) => tracing::warn!(error = %e, "Could not resolve caller identity"),
    }
    Ok(session)
}
