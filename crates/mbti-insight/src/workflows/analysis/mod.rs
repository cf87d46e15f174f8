//! Analysis pipeline: builds the chat request for a scored type, sends it through the
//! configured provider, and substitutes canned content whenever the remote call fails.

mod error;
mod fallback;
mod pipeline;
mod provider;
pub mod request;

pub use error::{AnalysisError, RemoteErrorKind};
pub use fallback::{canned_analysis, CannedAnalysisProvider, REJECTION_TEXT, UNAVAILABLE_NOTICE};
pub use pipeline::{
    AnalysisOptions, AnalysisOrigin, AnalysisOutcome, AnalysisPipeline, FallbackReason,
    RetryPolicy,
};
pub use provider::{AnalysisProvider, GeneratedAnalysis, ProxyAnalysisProvider};
pub use request::{AnalysisProfile, AnalysisRequest, ChatCompletionRequest, ChatMessage};
