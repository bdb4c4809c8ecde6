//! Typed request bodies for every advisor feature.
//!
//! Each feature owns its required fields, the message shown when one is missing,
//! its prompt, and the label recorded as the turn's input in the transcript.

use serde::Deserialize;

use crate::advisor::prompts::{
    render, ASSESSMENT_PROMPT, CHAT_PROMPT, LEARNING_PROMPT, MARKET_PROMPT, RESUME_PROMPT,
    SKILLS_PROMPT,
};
use crate::errors::AppError;

const FILL_BOTH_FIELDS: &str = "Please fill both fields";

/// A single advisor request: validate, then turn into a prompt and a transcript label.
pub trait AdvisorQuery {
    fn validate(&self) -> Result<(), AppError>;

    fn prompt(&self) -> String;

    /// What gets stored as the `input` half of the transcript turn.
    fn transcript_input(&self) -> String;
}

fn require_all(fields: &[&str], message: &str) -> Result<(), AppError> {
    if fields.iter().any(|f| f.is_empty()) {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    #[serde(default)]
    pub message: String,
}

impl AdvisorQuery for ChatQuery {
    fn validate(&self) -> Result<(), AppError> {
        if self.message.trim().is_empty() {
            return Err(AppError::Validation("Message cannot be empty".to_string()));
        }
        Ok(())
    }

    fn prompt(&self) -> String {
        render(CHAT_PROMPT, &[("message", self.message.as_str())])
    }

    fn transcript_input(&self) -> String {
        self.message.clone()
    }
}

#[derive(Debug, Deserialize)]
pub struct AssessmentQuery {
    #[serde(default)]
    pub q1: String,
    #[serde(default)]
    pub q2: String,
    #[serde(default)]
    pub q3: String,
    #[serde(default)]
    pub q4: String,
    #[serde(default)]
    pub q5: String,
}

impl AdvisorQuery for AssessmentQuery {
    fn validate(&self) -> Result<(), AppError> {
        require_all(
            &[
                self.q1.as_str(),
                self.q2.as_str(),
                self.q3.as_str(),
                self.q4.as_str(),
                self.q5.as_str(),
            ],
            "Please answer all questions",
        )
    }

    fn prompt(&self) -> String {
        render(
            ASSESSMENT_PROMPT,
            &[
                ("q1", self.q1.as_str()),
                ("q2", self.q2.as_str()),
                ("q3", self.q3.as_str()),
                ("q4", self.q4.as_str()),
                ("q5", self.q5.as_str()),
            ],
        )
    }

    fn transcript_input(&self) -> String {
        format!(
            "Career Assessment: {}, {}, {}, {}, {}",
            self.q1, self.q2, self.q3, self.q4, self.q5
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SkillsQuery {
    #[serde(default)]
    pub current_skills: String,
    #[serde(default)]
    pub target_role: String,
}

impl AdvisorQuery for SkillsQuery {
    fn validate(&self) -> Result<(), AppError> {
        require_all(&[self.current_skills.as_str(), self.target_role.as_str()], FILL_BOTH_FIELDS)
    }

    fn prompt(&self) -> String {
        render(
            SKILLS_PROMPT,
            &[
                ("current_skills", self.current_skills.as_str()),
                ("target_role", self.target_role.as_str()),
            ],
        )
    }

    fn transcript_input(&self) -> String {
        format!(
            "Skills Analysis: {} -> {}",
            self.current_skills, self.target_role
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct ResumeQuery {
    #[serde(default)]
    pub job_role: String,
    #[serde(default)]
    pub experience_level: String,
}

impl AdvisorQuery for ResumeQuery {
    fn validate(&self) -> Result<(), AppError> {
        require_all(&[self.job_role.as_str(), self.experience_level.as_str()], FILL_BOTH_FIELDS)
    }

    fn prompt(&self) -> String {
        render(
            RESUME_PROMPT,
            &[
                ("job_role", self.job_role.as_str()),
                ("experience_level", self.experience_level.as_str()),
            ],
        )
    }

    fn transcript_input(&self) -> String {
        format!("Resume Tips: {} ({})", self.job_role, self.experience_level)
    }
}

#[derive(Debug, Deserialize)]
pub struct MarketQuery {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub location: String,
}

impl AdvisorQuery for MarketQuery {
    fn validate(&self) -> Result<(), AppError> {
        require_all(&[self.field.as_str(), self.location.as_str()], FILL_BOTH_FIELDS)
    }

    fn prompt(&self) -> String {
        render(
            MARKET_PROMPT,
            &[("field", self.field.as_str()), ("location", self.location.as_str())],
        )
    }

    fn transcript_input(&self) -> String {
        format!("Market Insights: {} in {}", self.field, self.location)
    }
}

#[derive(Debug, Deserialize)]
pub struct LearningQuery {
    #[serde(default)]
    pub skill: String,
    #[serde(default)]
    pub learning_style: String,
}

impl AdvisorQuery for LearningQuery {
    fn validate(&self) -> Result<(), AppError> {
        require_all(&[self.skill.as_str(), self.learning_style.as_str()], FILL_BOTH_FIELDS)
    }

    fn prompt(&self) -> String {
        render(
            LEARNING_PROMPT,
            &[
                ("skill", self.skill.as_str()),
                ("learning_style", self.learning_style.as_str()),
            ],
        )
    }

    fn transcript_input(&self) -> String {
        format!("Learning Resources: {} ({})", self.skill, self.learning_style)
    }
}
