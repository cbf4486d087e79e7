//! Fixed-interval polling loops. Each iteration awaits the previous one; there
//! is no backoff and no attempt cap. Dropping the future stops the loop.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use screening_spec::{QuestionBatch, ResultItem, results_from_raw};

use crate::api::ApiClient;
use crate::error::ClientError;

pub const DATA_COLLECTED: &str = "data_collected";
pub const DONE: &str = "done";
pub const ERROR: &str = "error";

pub const COLLECTION_FAILED: &str = "An error occurred.";
pub const ANALYSIS_FAILED: &str = "An error occurred during analysis.";

/// Terminal outcome of waiting for the next question batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchPoll {
    Batch(QuestionBatch),
    DataCollected,
    /// Server-reported failure, already resolved to a display message.
    Failed(String),
}

/// Terminal outcome of waiting for eligibility analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisPoll {
    Done(Vec<ResultItem>),
    Failed(String),
}

/// Poll `/api/questions` until a batch arrives, collection finishes or the
/// server reports an error. Transport failures end the loop.
pub async fn poll_for_batch(
    api: &ApiClient,
    session_id: &str,
    interval: Duration,
) -> Result<BatchPoll, ClientError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let response = api.questions(session_id).await?;
        if let Some(questions) = response.questions {
            debug!(attempt, count = questions.len(), "question batch ready");
            return Ok(BatchPoll::Batch(QuestionBatch {
                questions,
                filenames: response.filenames.unwrap_or_default(),
            }));
        }
        match response.status.as_deref() {
            Some(DATA_COLLECTED) => {
                debug!(attempt, "data collection finished");
                return Ok(BatchPoll::DataCollected);
            }
            Some(ERROR) => {
                let message = non_empty(response.error).unwrap_or_else(|| COLLECTION_FAILED.into());
                warn!(attempt, %message, "server reported a collection error");
                return Ok(BatchPoll::Failed(message));
            }
            status => debug!(attempt, ?status, "questions not ready"),
        }
        sleep(interval).await;
    }
}

/// Poll `/api/status` until analysis is done, then fetch `/api/results`.
pub async fn poll_for_results(
    api: &ApiClient,
    session_id: &str,
    interval: Duration,
) -> Result<AnalysisPoll, ClientError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let status = api.status(session_id).await?;
        match status.status.as_str() {
            DONE => {
                let results = api.results(session_id).await?;
                let items = results_from_raw(results.results.unwrap_or_default());
                debug!(attempt, count = items.len(), "analysis finished");
                return Ok(AnalysisPoll::Done(items));
            }
            ERROR => {
                let message = non_empty(status.error).unwrap_or_else(|| ANALYSIS_FAILED.into());
                warn!(attempt, %message, "server reported an analysis error");
                return Ok(AnalysisPoll::Failed(message));
            }
            other => debug!(attempt, status = other, "analysis pending"),
        }
        sleep(interval).await;
    }
}

fn non_empty(message: Option<String>) -> Option<String> {
    message.filter(|text| !text.is_empty())
}
