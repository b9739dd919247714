//! Churn Prediction Core
//!
//! Schema-driven form handling for the churn predictor. Everything here is
//! network-free; the remote model is reached through the [`PredictionService`]
//! trait implemented by `churn-client`.
//!
//! Modules:
//! - `schema`: Ordered feature descriptors and the built-in telco schema
//! - `form`: Raw string form state and the redraw observer hook
//! - `encoder`: Type-directed encoding of form values into a numeric vector
//! - `prediction`: Binary classification result as returned by the service
//! - `history`: Newest-first log of submitted inputs and their predictions
//! - `session`: Submit lifecycle tying the pieces together
//! - `errors`: Error types shared by the modules above

pub mod encoder;
pub mod errors;
pub mod form;
pub mod history;
pub mod prediction;
pub mod schema;
pub mod session;

pub use encoder::{encode, parse_decimal, EncodedVector, FeatureEncoder, NOT_A_NUMBER, UNKNOWN_CATEGORY};
pub use errors::{FailureCause, FormError, PredictionFailed, SchemaError, SessionError, USER_NOTICE};
pub use form::{FormEvent, FormObserver, FormSnapshot, FormState};
pub use history::{HistoryEntry, HistoryLog};
pub use prediction::Prediction;
pub use schema::{FeatureSchema, FieldDescriptor, FieldKind, TELCO_SAMPLE};
pub use session::{PendingSubmission, PredictionService, PredictionSession, SubmitState};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
