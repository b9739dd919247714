//! Submit lifecycle against an in-process prediction service

use async_trait::async_trait;
use churn_core::{
    EncodedVector, FeatureSchema, Prediction, PredictionFailed, PredictionService,
    PredictionSession, SessionError, SubmitState, UNKNOWN_CATEGORY,
};
use std::sync::Mutex;
use std::time::Duration;

/// Replies with a fixed outcome and records every vector it receives
struct ScriptedService {
    reply: Result<Prediction, PredictionFailed>,
    received: Mutex<Vec<Vec<f64>>>,
}

impl ScriptedService {
    fn answering(reply: Result<Prediction, PredictionFailed>) -> Self {
        Self {
            reply,
            received: Mutex::new(Vec::new()),
        }
    }

    fn received(&self) -> Vec<Vec<f64>> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl PredictionService for ScriptedService {
    async fn predict(&self, features: &EncodedVector) -> Result<Prediction, PredictionFailed> {
        self.received
            .lock()
            .unwrap()
            .push(features.as_slice().to_vec());
        self.reply.clone()
    }
}

/// Never answers within a test's patience
struct StalledService;

#[async_trait]
impl PredictionService for StalledService {
    async fn predict(&self, _features: &EncodedVector) -> Result<Prediction, PredictionFailed> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Prediction::Churn)
    }
}

#[tokio::test]
async fn test_sample_submission_records_churn() {
    let service = ScriptedService::answering(Ok(Prediction::Churn));
    let mut session = PredictionSession::new(FeatureSchema::telco());
    session.prefill_sample().unwrap();

    let prediction = session.submit(&service).await.unwrap();

    assert_eq!(prediction, Prediction::Churn);
    assert_eq!(session.prediction(), Some(&Prediction::Churn));
    assert_eq!(session.state(), SubmitState::Idle);

    let latest = session.history().latest().unwrap();
    assert_eq!(latest.output, Prediction::Churn);
    assert_eq!(latest.input.values(), FeatureSchema::telco_sample().as_slice());

    let sent = service.received();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0][4], 5.0);
    assert_eq!(sent[0][17], 70.35);
}

#[tokio::test]
async fn test_history_snapshot_survives_later_edits() {
    let service = ScriptedService::answering(Ok(Prediction::Stay));
    let mut session = PredictionSession::new(FeatureSchema::telco());
    session.set_field(0, "Male").unwrap();

    session.submit(&service).await.unwrap();
    session.set_field(0, "Female").unwrap();
    session.reset();

    let entry = session.history().latest().unwrap();
    assert_eq!(entry.input[0], "Male");
    assert_eq!(entry.input[1], "");
}

#[tokio::test]
async fn test_failure_leaves_state_untouched() {
    let ok = ScriptedService::answering(Ok(Prediction::Stay));
    let failing =
        ScriptedService::answering(Err(PredictionFailed::status(500, "internal error")));
    let mut session = PredictionSession::new(FeatureSchema::telco());
    session.prefill_sample().unwrap();
    session.submit(&ok).await.unwrap();

    session.set_field(0, "Male").unwrap();
    let before_form = session.form().clone();

    let err = session.submit(&failing).await.unwrap_err();

    assert!(matches!(err, SessionError::PredictionFailed(_)));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.prediction(), Some(&Prediction::Stay));
    assert_eq!(session.form(), &before_form);
    assert_eq!(session.state(), SubmitState::Idle);
}

#[tokio::test]
async fn test_unset_fields_are_still_submitted() {
    let service = ScriptedService::answering(Ok(Prediction::Stay));
    let mut session = PredictionSession::new(FeatureSchema::telco());

    session.submit(&service).await.unwrap();

    let sent = service.received();
    assert_eq!(sent[0].len(), 19);
    assert_eq!(sent[0][0], UNKNOWN_CATEGORY);
    assert!(sent[0][4].is_nan());
}

#[tokio::test]
async fn test_history_is_newest_first() {
    let churn = ScriptedService::answering(Ok(Prediction::Churn));
    let stay = ScriptedService::answering(Ok(Prediction::Stay));
    let mut session = PredictionSession::new(FeatureSchema::telco());

    session.submit(&churn).await.unwrap();
    session.submit(&stay).await.unwrap();

    let outputs: Vec<&Prediction> = session.history().iter().map(|e| &e.output).collect();
    assert_eq!(outputs, vec![&Prediction::Stay, &Prediction::Churn]);
    assert_eq!(session.prediction(), Some(&Prediction::Stay));
}

#[tokio::test]
async fn test_dropped_submit_returns_session_to_idle() {
    let ok = ScriptedService::answering(Ok(Prediction::Stay));
    let mut session = PredictionSession::new(FeatureSchema::telco());
    session.prefill_sample().unwrap();
    session.submit(&ok).await.unwrap();

    let timed_out =
        tokio::time::timeout(Duration::from_millis(20), session.submit(&StalledService)).await;
    assert!(timed_out.is_err());

    assert_eq!(session.state(), SubmitState::Idle);
    assert_eq!(session.prediction(), Some(&Prediction::Stay));
    assert_eq!(session.history().len(), 1);

    let churn = ScriptedService::answering(Ok(Prediction::Churn));
    assert_eq!(session.submit(&churn).await.unwrap(), Prediction::Churn);
    assert_eq!(session.history().len(), 2);
}
