// Output-delimiter contract shared by every generation request.
// Task prompts live next to the code that builds them (analysis::prompts).

pub const ANALYSIS_START: &str = "===BEGIN ANALYSIS===";
pub const ANALYSIS_END: &str = "===END ANALYSIS===";
pub const QUESTIONS_START: &str = "===BEGIN QUESTIONS===";
pub const QUESTIONS_END: &str = "===END QUESTIONS===";

/// Appended to every task prompt. Replace `{start_marker}` and `{end_marker}`.
pub const MARKER_INSTRUCTION_TEMPLATE: &str = "SYSTEM INSTRUCTION:\n\
    - Your entire response MUST be enclosed between:\n\
    {start_marker}\n\
    {end_marker}\n\
    - Do not include anything outside these markers.";

/// Wraps a task prompt with the delimiter instruction for the given markers.
pub fn wrap_prompt(base_prompt: &str, start_marker: &str, end_marker: &str) -> String {
    let instruction = MARKER_INSTRUCTION_TEMPLATE
        .replace("{start_marker}", start_marker)
        .replace("{end_marker}", end_marker);
    format!("{base_prompt}\n\n{instruction}")
}
