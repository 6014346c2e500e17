pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod stages;

pub use error::RefineError;
pub use io::{parse_request_file, parse_request_json, render_segments, write_result_json, HumanTranscript};
pub use llm::{
    build_engine, CompletionEngine, CompletionPayload, CompletionRequest, EngineConfig, EngineKind,
    LlmError, ResponseFormat, DEFAULT_MODEL,
};
pub use models::{Category, PipelineResult, Segment};
pub use pipeline::{PipelineConfig, RefinePipeline, RefineRequest};
pub use stages::{
    correct_conversation, extract_record, group_segments, prune_record, prune_value,
    CorrectionConfig, ExtractionConfig,
};
