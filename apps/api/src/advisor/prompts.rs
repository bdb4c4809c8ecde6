// Advisor prompt templates.
// All prompts sent to the generation service are defined here.
// Placeholders are `{name}` and are filled by `render` in one pass over the
// template, so a value containing `{...}` is never substituted again.

pub const CHAT_PROMPT: &str = "As a career advisor, answer: {message}";

pub const ASSESSMENT_PROMPT: &str = "Career assessment:
1. Work environment: {q1}
2. Work style: {q2}
3. Task preference: {q3}
4. Work-life balance: {q4}
5. Routine preference: {q5}

Suggest 3 career paths with explanations.";

pub const SKILLS_PROMPT: &str =
    "Skills: {current_skills}, Target: {target_role}. Identify gaps and learning path.";

pub const RESUME_PROMPT: &str =
    "Resume tips for {job_role} at {experience_level} level. Give 5 specific tips.";

pub const MARKET_PROMPT: &str =
    "Job market insights for {field} in {location}. Include salary and trends.";

pub const LEARNING_PROMPT: &str =
    "Learning resources for {skill} with {learning_style} learning style.";

/// Fills each `{key}` placeholder in `template` with its value in a single pass,
/// so values are never expanded again. Unknown placeholders are kept literally.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            rest = "";
            break;
        };

        let key = &after[..close];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}
