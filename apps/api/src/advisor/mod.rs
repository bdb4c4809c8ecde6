// Career advisor features: freeform chat, assessment, skills gap, resume tips,
// market insights and learning resources.
// All generation goes through llm_client — no direct Gemini calls here.

pub mod handlers;
pub mod prompts;
pub mod queries;
