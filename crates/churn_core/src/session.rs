//! Submit lifecycle
//!
//! A session owns the form, the current prediction and the history, and runs
//! the `Idle -> Submitting -> Idle` cycle. Only one submission may be in flight;
//! a second `begin_submit` while submitting is refused rather than queued.

use crate::encoder::{EncodedVector, FeatureEncoder};
use crate::errors::{PredictionFailed, Result, SessionError};
use crate::form::{FormEvent, FormObserver, FormSnapshot, FormState};
use crate::history::{HistoryEntry, HistoryLog};
use crate::prediction::Prediction;
use crate::schema::FeatureSchema;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Remote model that turns an encoded vector into a prediction
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(
        &self,
        features: &EncodedVector,
    ) -> std::result::Result<Prediction, PredictionFailed>;
}

/// Ticket source shared by every session, so a pending submission can only
/// ever match the session and cycle that issued it.
static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Where a session is in the submit cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
}

/// A submission that has been encoded but not yet answered
#[derive(Debug)]
pub struct PendingSubmission {
    ticket: u64,
    snapshot: FormSnapshot,
    features: EncodedVector,
}

impl PendingSubmission {
    pub fn snapshot(&self) -> &FormSnapshot {
        &self.snapshot
    }

    pub fn features(&self) -> &EncodedVector {
        &self.features
    }
}

/// Form, current prediction and history for one user session
pub struct PredictionSession {
    schema: Arc<FeatureSchema>,
    encoder: FeatureEncoder,
    form: FormState,
    prediction: Option<Prediction>,
    history: HistoryLog,
    in_flight: Option<u64>,
    observer: Option<Box<dyn FormObserver>>,
}

impl PredictionSession {
    /// Create a session with an empty form and unbounded history
    pub fn new(schema: Arc<FeatureSchema>) -> Self {
        Self::with_history(schema, HistoryLog::unbounded())
    }

    pub fn with_history(schema: Arc<FeatureSchema>, history: HistoryLog) -> Self {
        let encoder = FeatureEncoder::new(&schema);
        let form = FormState::empty(&schema);
        Self {
            schema,
            encoder,
            form,
            prediction: None,
            history,
            in_flight: None,
            observer: None,
        }
    }

    /// Install the redraw hook
    pub fn set_observer(&mut self, observer: impl FormObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn state(&self) -> SubmitState {
        match self.in_flight {
            Some(_) => SubmitState::Submitting,
            None => SubmitState::Idle,
        }
    }

    /// Encode the form as it stands, without submitting
    pub fn encoded(&self) -> EncodedVector {
        self.encoder.encode(&self.form)
    }

    pub fn set_field(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        self.form.set_field(index, value)?;
        if let Some(value) = self.form.get(index) {
            Self::emit(&mut self.observer, FormEvent::FieldChanged { index, value });
        }
        Ok(())
    }

    /// Set a field looked up by its (case-insensitive) name
    pub fn set_field_by_name(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let index = self
            .schema
            .index_of(name)
            .ok_or_else(|| SessionError::UnknownField {
                name: name.to_string(),
            })?;
        self.set_field(index, value)
    }

    /// Clear every field and the current prediction
    pub fn reset(&mut self) {
        self.form.reset();
        self.prediction = None;
        Self::emit(&mut self.observer, FormEvent::Reset);
    }

    /// Replace the form with `example` and clear the current prediction
    pub fn prefill<S: AsRef<str>>(&mut self, example: &[S]) -> Result<()> {
        self.form.prefill(example)?;
        self.prediction = None;
        Self::emit(&mut self.observer, FormEvent::Prefilled);
        Ok(())
    }

    /// Prefill with the documented telco example customer
    pub fn prefill_sample(&mut self) -> Result<()> {
        self.prefill(&FeatureSchema::telco_sample())
    }

    /// Snapshot and encode the form, and enter `Submitting`
    pub fn begin_submit(&mut self) -> Result<PendingSubmission> {
        if self.in_flight.is_some() {
            return Err(SessionError::SubmissionInFlight);
        }

        let pending = PendingSubmission {
            ticket: NEXT_TICKET.fetch_add(1, Ordering::Relaxed),
            snapshot: self.form.snapshot(),
            features: self.encoder.encode(&self.form),
        };
        self.in_flight = Some(pending.ticket);

        info!(
            features = pending.features.len(),
            anomalies = self.encoder.anomaly_count(&pending.features),
            "submitting prediction request"
        );
        Self::emit(
            &mut self.observer,
            FormEvent::SubmitStarted {
                features: &pending.features,
            },
        );

        Ok(pending)
    }

    /// Apply the service's answer and return to `Idle`. A failure leaves the
    /// form, the current prediction and the history exactly as they were.
    ///
    /// `pending` must be the submission this session currently has in flight;
    /// anything else is refused with [`SessionError::UnmatchedSubmission`] and
    /// changes nothing.
    pub fn complete_submit(
        &mut self,
        pending: PendingSubmission,
        outcome: std::result::Result<Prediction, PredictionFailed>,
    ) -> Result<Prediction> {
        if self.in_flight != Some(pending.ticket) {
            warn!(ticket = pending.ticket, "ignoring answer for a submission not in flight");
            return Err(SessionError::UnmatchedSubmission);
        }
        self.in_flight = None;

        match outcome {
            Ok(prediction) => {
                info!(prediction = prediction.label(), "prediction received");
                self.prediction = Some(prediction.clone());
                self.history
                    .record(HistoryEntry::new(pending.snapshot, prediction.clone()));
                Self::emit(
                    &mut self.observer,
                    FormEvent::PredictionUpdated {
                        prediction: &prediction,
                        history_len: self.history.len(),
                    },
                );
                Ok(prediction)
            }
            Err(error) => {
                warn!(%error, "prediction request failed");
                Self::emit(&mut self.observer, FormEvent::SubmitFailed { error: &error });
                Err(SessionError::PredictionFailed(error))
            }
        }
    }

    /// Give up on the submission in flight and return to `Idle`. The form,
    /// the current prediction and the history are untouched, and a late
    /// answer for the abandoned submission is refused. Returns whether there
    /// was anything to abandon.
    pub fn abort_submit(&mut self) -> bool {
        match self.in_flight.take() {
            Some(ticket) => {
                warn!(ticket, "submission abandoned before an answer arrived");
                true
            }
            None => false,
        }
    }

    /// Run one full submission against `service`. Dropping the returned
    /// future before it resolves abandons the submission and leaves the
    /// session `Idle`.
    pub async fn submit<S>(&mut self, service: &S) -> Result<Prediction>
    where
        S: PredictionService + ?Sized,
    {
        let pending = self.begin_submit()?;
        let guard = InFlightGuard {
            session: self,
            armed: true,
        };
        let outcome = service.predict(pending.features()).await;
        guard.complete(pending, outcome)
    }

    fn emit(observer: &mut Option<Box<dyn FormObserver>>, event: FormEvent<'_>) {
        if let Some(observer) = observer.as_mut() {
            observer.notify(event);
        }
    }
}

/// Aborts the submission in flight unless it was completed
struct InFlightGuard<'a> {
    session: &'a mut PredictionSession,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn complete(
        mut self,
        pending: PendingSubmission,
        outcome: std::result::Result<Prediction, PredictionFailed>,
    ) -> Result<Prediction> {
        self.armed = false;
        self.session.complete_submit(pending, outcome)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.session.abort_submit();
        }
    }
}

impl std::fmt::Debug for PredictionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionSession")
            .field("fields", &self.schema.len())
            .field("form", &self.form)
            .field("prediction", &self.prediction)
            .field("history", &self.history.len())
            .field("state", &self.state())
            .finish()
    }
}
