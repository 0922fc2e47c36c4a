//! amlrank-core — batch AML risk scoring for account triage.
//!
//! PIPELINE (fixed, documented, never reordered):
//!   1. Entity records are materialized into an immutable `AnalysisDataset`.
//!   2. Ten per-account feature detectors run independently per account.
//!   3. The multiplicity detector runs once over the whole dataset and its
//!      per-account results are fanned out.
//!   4. The aggregator folds the eleven assessments into one
//!      `OverallAssessment` per account.
//!   5. The ranker sorts all accounts for investigator triage.
//!
//! RULES:
//!   - Detectors are pure: identical inputs always produce identical output.
//!   - Detectors read the dataset, never mutate it.
//!   - All tunable values flow through `AnalysisConfig`; nothing is ambient.
//!   - A detector that cannot compute degrades its assessment with an
//!     explicit reason; it never aborts the run.

pub mod aggregator;
pub mod assessment;
pub mod config;
pub mod dataset;
pub mod detector;
pub mod detectors;
pub mod error;
pub mod export;
pub mod model;
pub mod ranker;
pub mod types;

mod stats;

pub use assessment::{OverallAssessment, RiskAssessment, RiskLevel};
pub use config::AnalysisConfig;
pub use dataset::AnalysisDataset;
pub use error::{AnalysisError, AnalysisResult};
pub use model::{Account, Direction, Partner, RiskCategory, Transaction};
pub use ranker::{mass_analysis, MassAnalysisReport};
