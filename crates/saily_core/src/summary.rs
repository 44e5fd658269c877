//! crates/saily_core/src/summary.rs
//!
//! The fixed prompt and generation settings used to summarize logged tasks.

/// Model chat template with `{system_prompt}` and `{prompt}` slots.
pub const PROMPT_TEMPLATE: &str = "<|begin_of_text|><|start_header_id|>system<|end_header_id|>\n\n{system_prompt}<|eot_id|><|start_header_id|>user<|end_header_id|>\n\n{prompt}<|eot_id|><|start_header_id|>assistant<|end_header_id|>\n\n";

pub const SYSTEM_PROMPT: &str = "Concise, professional summary with a focus on key achievements throughout a specified time period.";

const INSTRUCTIONS: &str = "Summarize the following tasks into a concise paragraph, focusing on key progress and important actions. Eliminate repetitive or redundant information. The tasks are organized by task group. For each group in the summary include the group name, how many tasks for the group and how much time (hrs and mins) was spent on the group in brackets. Make sure this is in paragraph form:";

/// Sampling parameters sent with every summary request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u16,
    pub temperature: f32,
    pub top_p: f32,
    pub presence_penalty: f32,
    pub stop_sequences: Vec<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 312,
            temperature: 0.5,
            top_p: 0.95,
            presence_penalty: 0.0,
            stop_sequences: vec!["<|end_of_text|>".to_string(), "<|eot_id|>".to_string()],
        }
    }
}

/// The user prompt: fixed instructions followed by one bullet per task.
pub fn build_prompt(tasks: &[String]) -> String {
    let task_list = tasks
        .iter()
        .map(|task| format!("- {}", task))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n\n{}", INSTRUCTIONS, task_list)
}

/// The full model input with the system prompt and user prompt slotted into the template.
pub fn render_prompt(tasks: &[String]) -> String {
    PROMPT_TEMPLATE
        .replace("{system_prompt}", SYSTEM_PROMPT)
        .replace("{prompt}", &build_prompt(tasks))
}

/// Joins the segments returned by the model into a single summary.
pub fn join_segments<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .fold(String::new(), |mut acc, s| {
            acc.push_str(s.as_ref());
            acc
        })
        .trim()
        .to_string()
}
