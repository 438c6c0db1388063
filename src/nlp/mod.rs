//! Natural language processing layer: segmentation, classifiers and the analysis pipeline.

pub mod label;
pub mod linear;
pub mod pipeline;
pub mod remote;
pub mod segment;
pub mod statistical;
pub mod tfidf;
pub mod train;

pub use label::{ClassificationResult, Label};
pub use pipeline::{AnalysisMetadata, AnalysisResult, Analyzer, Flag, CONFIDENCE_THRESHOLD};
pub use segment::{Sentence, SegmenterKind};
pub use statistical::{ModelArtifacts, ModelStore};
