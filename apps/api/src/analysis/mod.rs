// Candidate analysis: résumé parsing, deterministic scoring, report assembly,
// and the optional generation enrichment that runs on top of the report.
// All model calls go through llm_client; nothing here spawns processes itself.

pub mod handlers;
pub mod matcher;
pub mod pipeline;
pub mod prompts;
pub mod reporter;
pub mod resume_parser;
