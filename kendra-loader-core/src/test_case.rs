//! CSV-driven search test harness.
//!
//! Input is a `:`-delimited file with a `persona:question` header row. Every
//! question is sent to the search index and, in [`Operation::Eve`] mode, also
//! to an external intent endpoint. The answers are collected into one
//! [`TestCaseResult`] row per question and exported as a CSV table.

use std::io::{Read, Write};
use std::str::FromStr;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::contract::{IntentClient, SearchClient};
use crate::error::LoaderError;
use crate::query::{send_simple_query, top_results};

/// Number of answers kept per source in a result row.
pub const RESULTS_PER_SOURCE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub persona: String,
    pub question: String,
}

/// How each question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    /// Search index only.
    #[default]
    Direct,
    /// Search index plus the external intent endpoint.
    Eve,
}

impl FromStr for Operation {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DIRECT" => Ok(Operation::Direct),
            "EVE" => Ok(Operation::Eve),
            other => Err(LoaderError::Config(format!("unknown operation '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TestCaseResult {
    pub persona: String,
    pub question: String,
    pub eve_result_1: String,
    pub eve_result_2: String,
    pub eve_result_3: String,
    pub kendra_result_1: String,
    pub kendra_result_2: String,
    pub kendra_result_3: String,
    pub error: String,
}

impl TestCaseResult {
    fn new(case: &TestCase) -> Self {
        Self {
            persona: case.persona.clone(),
            question: case.question.clone(),
            ..Default::default()
        }
    }

    // Extra answers beyond the three slots are dropped.
    fn set_eve(&mut self, results: &[String]) {
        let slots = [
            &mut self.eve_result_1,
            &mut self.eve_result_2,
            &mut self.eve_result_3,
        ];
        for (slot, value) in slots.into_iter().zip(results) {
            *slot = value.clone();
        }
    }

    fn set_kendra(&mut self, results: &[String]) {
        let slots = [
            &mut self.kendra_result_1,
            &mut self.kendra_result_2,
            &mut self.kendra_result_3,
        ];
        for (slot, value) in slots.into_iter().zip(results) {
            *slot = value.clone();
        }
    }

    fn push_error(&mut self, message: String) {
        if !self.error.is_empty() {
            self.error.push_str("; ");
        }
        self.error.push_str(&message);
    }
}

/// Parse test cases from a `:`-delimited reader with a header row.
///
/// Only the first `:` separates persona from question; any later ones belong
/// to the question. Rows without a question are skipped with a warning.
pub fn read_test_cases<R: Read>(reader: R) -> Result<Vec<TestCase>, LoaderError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b':')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut cases = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let persona = record.get(0).unwrap_or_default().trim().to_string();
        let question = record
            .iter()
            .skip(1)
            .collect::<Vec<_>>()
            .join(":")
            .trim()
            .to_string();
        if question.is_empty() {
            warn!(row = row + 1, persona = %persona, "Skipping test case without a question");
            continue;
        }
        cases.push(TestCase { persona, question });
    }
    info!(count = cases.len(), "Loaded test cases");
    Ok(cases)
}

/// Run every test case sequentially. Per-case failures land in the row's
/// `error` column; only a missing intent client in `Eve` mode aborts.
pub async fn run_test_cases<S, I>(
    cases: &[TestCase],
    operation: Operation,
    index_id: &str,
    search: &S,
    intent: Option<&I>,
) -> Result<Vec<TestCaseResult>, LoaderError>
where
    S: SearchClient + ?Sized,
    I: IntentClient + ?Sized,
{
    if operation == Operation::Eve && intent.is_none() {
        return Err(LoaderError::Config(
            "the eve operation needs an intent endpoint".to_string(),
        ));
    }

    let mut rows = Vec::with_capacity(cases.len());
    for (index, case) in cases.iter().enumerate() {
        info!(index, persona = %case.persona, "Running test case");
        let mut row = TestCaseResult::new(case);

        if let (Operation::Eve, Some(intent)) = (operation, intent) {
            match intent.classify(&case.question).await {
                Ok(answers) => row.set_eve(&answers),
                Err(e) => {
                    warn!(index, error = %e, "Intent endpoint failed");
                    row.push_error(format!("intent: {e}"));
                }
            }
        }

        match send_simple_query(search, index_id, &case.question).await {
            Ok(response) => row.set_kendra(&top_results(&response, RESULTS_PER_SOURCE)),
            Err(e) => {
                error!(index, error = %e, "Search query failed");
                row.push_error(format!("search: {e}"));
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Column names of the exported results table.
pub const RESULT_COLUMNS: [&str; 9] = [
    "persona",
    "question",
    "eve_result_1",
    "eve_result_2",
    "eve_result_3",
    "kendra_result_1",
    "kendra_result_2",
    "kendra_result_3",
    "error",
];

/// Export result rows as a comma-separated table with a header row. The
/// header is written even when there are no rows.
pub fn write_results<W: Write>(rows: &[TestCaseResult], writer: W) -> Result<(), LoaderError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(RESULT_COLUMNS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer
        .flush()
        .map_err(|e| LoaderError::fs("<results>", e))?;
    Ok(())
}
