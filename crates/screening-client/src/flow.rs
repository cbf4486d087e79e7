//! Page controllers for the wizard. Every action catches its own failures and
//! writes them into the shared [`ErrorDisplay`]; callers only see where to go
//! next.

use tracing::{info, warn};

use screening_spec::{
    FormState, Page, QuestionDescriptor, RawDescriptor, ResultItem, collect_answers, next_page,
};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, FlowError};
use crate::poll::{AnalysisPoll, BatchPoll, poll_for_batch, poll_for_results};
use crate::session::{SessionContext, SessionStore};

/// Where the user ends up after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Go(Page),
}

/// The single error line shared by every page. An empty message clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDisplay {
    message: Option<String>,
}

impl ErrorDisplay {
    pub fn show(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.message = (!message.is_empty()).then_some(message);
    }

    pub fn clear(&mut self) {
        self.message = None;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// A batch loaded from session storage, ready to be answered.
#[derive(Debug, Clone)]
pub struct QuestionPage {
    /// Page the batch routes to; `None` when its filenames are unrecognised.
    pub page: Option<Page>,
    pub descriptors: Vec<QuestionDescriptor>,
    pub form: FormState,
}

/// What the results page shows after an analysis attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisView {
    /// Back to the "start analysis" section; the error display says why.
    Ready,
    Results(Vec<ResultItem>),
    Redirect(Page),
}

/// Drives the start -> questions -> submit -> poll -> analyze flow.
#[derive(Debug)]
pub struct Wizard<S> {
    api: ApiClient,
    config: ClientConfig,
    session: SessionContext<S>,
    error: ErrorDisplay,
}

impl<S: SessionStore> Wizard<S> {
    pub fn new(config: ClientConfig, store: S) -> Result<Self, ClientError> {
        Ok(Self {
            api: ApiClient::new(&config)?,
            config,
            session: SessionContext::init(store),
            error: ErrorDisplay::default(),
        })
    }

    pub fn error(&self) -> &ErrorDisplay {
        &self.error
    }

    pub fn session(&self) -> &SessionContext<S> {
        &self.session
    }

    /// Landing page load: any stale session is discarded.
    pub fn enter_landing(&mut self) -> Navigation {
        let cleared = self.session.clear().map_err(FlowError::from);
        self.settle(cleared.map(|_| Navigation::Stay))
    }

    /// Start a new screening session.
    pub async fn start(&mut self) -> Navigation {
        self.error.clear();
        let outcome = self.try_start().await;
        self.settle(outcome)
    }

    async fn try_start(&mut self) -> Result<Navigation, FlowError> {
        let started = self.api.start().await?;
        info!(session_id = %started.session_id, "session started");
        self.session.set_session_id(&started.session_id)?;
        match (started.questions, started.filenames) {
            (Some(questions), Some(filenames)) => self.store_and_navigate(&questions, &filenames),
            _ => self.try_poll_and_navigate().await,
        }
    }

    /// Wait for the next batch and route to the page that renders it.
    pub async fn poll_and_navigate(&mut self) -> Navigation {
        let outcome = self.try_poll_and_navigate().await;
        self.settle(outcome)
    }

    async fn try_poll_and_navigate(&mut self) -> Result<Navigation, FlowError> {
        let Some(session_id) = self.session.session_id()? else {
            return Ok(Navigation::Go(Page::Landing));
        };
        match poll_for_batch(&self.api, &session_id, self.config.poll_interval).await? {
            BatchPoll::Batch(batch) => self.store_and_navigate(&batch.questions, &batch.filenames),
            BatchPoll::DataCollected => Ok(Navigation::Go(Page::Results)),
            BatchPoll::Failed(message) => {
                self.error.show(message);
                Ok(Navigation::Stay)
            }
        }
    }

    fn store_and_navigate(
        &mut self,
        questions: &[RawDescriptor],
        filenames: &[String],
    ) -> Result<Navigation, FlowError> {
        self.session.store_batch(questions, filenames)?;
        match next_page(filenames) {
            Some(page) => Ok(Navigation::Go(page)),
            None => {
                warn!(?filenames, "no page for question batch");
                Ok(Navigation::Stay)
            }
        }
    }

    /// Question page load. `Err` carries the redirect when nothing is pending.
    pub fn load_questions(&mut self) -> Result<QuestionPage, Navigation> {
        match self.try_load_questions() {
            Ok(Some(page)) => Ok(page),
            Ok(None) => Err(Navigation::Go(Page::Landing)),
            Err(err) => {
                self.settle(Err(err));
                Err(Navigation::Go(Page::Landing))
            }
        }
    }

    fn try_load_questions(&self) -> Result<Option<QuestionPage>, FlowError> {
        let Some(batch) = self.session.pending_batch()? else {
            return Ok(None);
        };
        let descriptors = batch.descriptors()?;
        let form = FormState::from_descriptors(&descriptors);
        Ok(Some(QuestionPage {
            page: next_page(&batch.filenames),
            descriptors,
            form,
        }))
    }

    /// Collect the page's answers, submit them and move on to the next batch.
    pub async fn submit_and_navigate(&mut self, page: &QuestionPage) -> Navigation {
        self.error.clear();
        let outcome = self.try_submit(page).await;
        self.settle(outcome)
    }

    async fn try_submit(&mut self, page: &QuestionPage) -> Result<Navigation, FlowError> {
        let answers =
            collect_answers(&page.descriptors, &page.form).map_err(FlowError::Incomplete)?;
        let Some(session_id) = self.session.session_id()? else {
            return Ok(Navigation::Go(Page::Landing));
        };
        self.api.submit_answers(&session_id, &answers).await?;
        info!(count = answers.len(), "answers submitted");
        self.session.clear_batch()?;
        self.try_poll_and_navigate().await
    }

    /// Results page load.
    pub fn enter_results(&mut self) -> Navigation {
        match self.session.session_id() {
            Ok(Some(_)) => Navigation::Stay,
            Ok(None) => Navigation::Go(Page::Landing),
            Err(err) => self.settle(Err(err.into())),
        }
    }

    /// Ask the server to analyse the collected data and wait for the verdicts.
    pub async fn start_analysis(&mut self) -> AnalysisView {
        self.error.clear();
        match self.try_analysis().await {
            Ok(view) => view,
            Err(err) => {
                warn!(error = %err, "analysis failed");
                self.error.show(err.to_string());
                AnalysisView::Ready
            }
        }
    }

    async fn try_analysis(&mut self) -> Result<AnalysisView, FlowError> {
        let Some(session_id) = self.session.session_id()? else {
            return Ok(AnalysisView::Redirect(Page::Landing));
        };
        self.api.analyze(&session_id).await?;
        info!("analysis started");
        match poll_for_results(&self.api, &session_id, self.config.poll_interval).await? {
            AnalysisPoll::Done(items) => Ok(AnalysisView::Results(items)),
            AnalysisPoll::Failed(message) => {
                self.error.show(message);
                Ok(AnalysisView::Ready)
            }
        }
    }

    /// Forget the session and go back to the landing page.
    pub fn restart(&mut self) -> Navigation {
        if let Err(err) = self.session.clear() {
            self.error.show(err.to_string());
        }
        info!("session cleared");
        Navigation::Go(Page::Landing)
    }

    fn settle(&mut self, outcome: Result<Navigation, FlowError>) -> Navigation {
        match outcome {
            Ok(navigation) => {
                if let Navigation::Go(page) = navigation {
                    info!(%page, "navigating");
                }
                navigation
            }
            Err(err) => {
                warn!(error = %err, "action failed");
                self.error.show(err.to_string());
                Navigation::Stay
            }
        }
    }
}
