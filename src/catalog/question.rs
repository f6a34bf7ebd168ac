use crate::store::schema::{FieldError, Record, Row};

pub const CHOICE_LABELS: [&str; 4] = ["A", "B", "C", "D"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerKind {
    FreeForm,
    MultipleChoice,
}

impl AnswerKind {
    pub fn code(self) -> &'static str {
        match self {
            AnswerKind::FreeForm => "f",
            AnswerKind::MultipleChoice => "m",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "f" => Some(AnswerKind::FreeForm),
            "m" => Some(AnswerKind::MultipleChoice),
            _ => None,
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            AnswerKind::FreeForm => "Free",
            AnswerKind::MultipleChoice => "Mult",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AnswerKind::FreeForm => "free",
            AnswerKind::MultipleChoice => "multiple choice",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub kind: AnswerKind,
    pub text: String,
    pub choices: [String; 4],
    pub correct: String,
    pub enabled: bool,
    pub times_asked: u32,
    pub times_correct: u32,
}

impl Question {
    pub fn new(kind: AnswerKind, text: &str, choices: [String; 4], correct: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            choices,
            correct: correct.to_string(),
            enabled: true,
            times_asked: 0,
            times_correct: 0,
        }
    }

    pub fn free_form(text: &str, correct: &str) -> Self {
        Self::new(AnswerKind::FreeForm, text, Default::default(), correct)
    }

    /// `None` until the question has been asked at least once.
    pub fn success_ratio(&self) -> Option<f64> {
        if self.times_asked == 0 {
            return None;
        }
        Some(f64::from(self.times_correct) / f64::from(self.times_asked))
    }

    /// Adaptive weight: never-asked questions weigh 1, a perfect record weighs 0.
    pub fn weight(&self) -> f64 {
        match self.success_ratio() {
            Some(ratio) => (1.0 - ratio).clamp(0.0, 1.0),
            None => 1.0,
        }
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        answer.trim().eq_ignore_ascii_case(self.correct.trim())
    }

    pub fn record_answer(&mut self, correct: bool) {
        self.times_asked += 1;
        if correct {
            self.times_correct += 1;
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.enabled { "enabled" } else { "disabled" }
    }
}

impl Record for Question {
    const FIELDS: &'static [&'static str] = &[
        "Type", "Question", "Answer_A", "Answer_B", "Answer_C", "Answer_D", "Correct", "Flag",
        "Asked", "Answered",
    ];

    fn from_row(row: &Row<'_>) -> Result<Self, FieldError> {
        let raw_kind = row.require("Type")?;
        let kind = AnswerKind::from_code(raw_kind).ok_or_else(|| FieldError::Invalid {
            field: "Type",
            value: raw_kind.to_string(),
        })?;
        let choice = |name: &str| row.get(name).unwrap_or("").to_string();
        let times_asked = row.counter("Asked");

        Ok(Self {
            kind,
            text: row.require("Question")?.to_string(),
            choices: [
                choice("Answer_A"),
                choice("Answer_B"),
                choice("Answer_C"),
                choice("Answer_D"),
            ],
            correct: row.get("Correct").unwrap_or("").trim().to_string(),
            enabled: row.counter("Flag") != 0,
            times_asked,
            times_correct: row.counter("Answered").min(times_asked),
        })
    }

    fn to_row(&self) -> Vec<String> {
        let [a, b, c, d] = self.choices.clone();
        vec![
            self.kind.code().to_string(),
            self.text.clone(),
            a,
            b,
            c,
            d,
            self.correct.clone(),
            if self.enabled { "1" } else { "0" }.to_string(),
            self.times_asked.to_string(),
            self.times_correct.to_string(),
        ]
    }
}
