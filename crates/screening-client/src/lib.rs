//! HTTP client, session storage and page controllers for the screening wizard.

pub mod api;
pub mod config;
pub mod error;
pub mod flow;
pub mod poll;
pub mod session;

pub use api::{ApiClient, QuestionsResponse, ResultsResponse, StartResponse, StatusResponse};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
pub use error::{ClientError, FlowError, SessionError};
pub use flow::{AnalysisView, ErrorDisplay, Navigation, QuestionPage, Wizard};
pub use poll::{AnalysisPoll, BatchPoll, poll_for_batch, poll_for_results};
pub use session::{FileStore, MemoryStore, SessionContext, SessionStore};
