use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five input kinds a survey question can be rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    Textarea,
    Select,
    Radio,
    Checkbox,
}

impl QuestionType {
    pub const ALL: [QuestionType; 5] = [
        QuestionType::Text,
        QuestionType::Textarea,
        QuestionType::Select,
        QuestionType::Radio,
        QuestionType::Checkbox,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Textarea => "textarea",
            QuestionType::Select => "select",
            QuestionType::Radio => "radio",
            QuestionType::Checkbox => "checkbox",
        }
    }

    /// Free-text questions are never grouped when results are tallied.
    pub fn is_free_text(&self) -> bool {
        matches!(self, QuestionType::Text | QuestionType::Textarea)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownQuestionType(pub String);

impl fmt::Display for UnknownQuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown question type '{}'", self.0)
    }
}

impl std::error::Error for UnknownQuestionType {}

impl FromStr for QuestionType {
    type Err = UnknownQuestionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownQuestionType(s.to_string()))
    }
}

/// One selectable choice of a `select`, `radio` or `checkbox` question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Client-generated identifier, stable across edits of the option text.
    pub uuid: String,
    pub text: String,
}

/// Type-specific part of a question.
///
/// Choice questions carry their ordered options; free-text questions carry
/// nothing, so a text question with options cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionKind {
    Text,
    Textarea,
    Select { options: Vec<QuestionOption> },
    Radio { options: Vec<QuestionOption> },
    Checkbox { options: Vec<QuestionOption> },
}

impl QuestionKind {
    /// Builds the kind for `question_type`. Options are dropped for free-text types.
    pub fn new(question_type: QuestionType, options: Vec<QuestionOption>) -> Self {
        match question_type {
            QuestionType::Text => QuestionKind::Text,
            QuestionType::Textarea => QuestionKind::Textarea,
            QuestionType::Select => QuestionKind::Select { options },
            QuestionType::Radio => QuestionKind::Radio { options },
            QuestionType::Checkbox => QuestionKind::Checkbox { options },
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::Text => QuestionType::Text,
            QuestionKind::Textarea => QuestionType::Textarea,
            QuestionKind::Select { .. } => QuestionType::Select,
            QuestionKind::Radio { .. } => QuestionType::Radio,
            QuestionKind::Checkbox { .. } => QuestionType::Checkbox,
        }
    }

    pub fn options(&self) -> &[QuestionOption] {
        match self {
            QuestionKind::Text | QuestionKind::Textarea => &[],
            QuestionKind::Select { options }
            | QuestionKind::Radio { options }
            | QuestionKind::Checkbox { options } => options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub survey_id: i64,
    pub question: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }
}
