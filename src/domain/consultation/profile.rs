//! Interview profile: the fixed prompts, signals and shortcut catalog that
//! shape a consultation.
//!
//! The default profile is a wellness consultation in the style of
//! traditional Chinese medicine. The report structure it asks for begins
//! with the "Pattern Differentiation" heading, which is what
//! [`HeadingReportDetector`](super::HeadingReportDetector) looks for.

use std::sync::Arc;

use once_cell::sync::Lazy;

use super::shortcuts::CannedPrompt;

/// Text of the synthetic "finished describing" user turn.
pub const TERMINATION_SIGNAL: &str = "I have finished describing my situation. Following the \
required Markdown format and citing the classics, please write a detailed, full-length \
consultation report, including concrete dietary recipes and acupoint locations.";

const SYSTEM_PROMPT: &str = r#"You are an experienced senior physician of traditional Chinese medicine, versed in the Huangdi Neijing, the Shanghan Zabing Lun and the Jingui Yaolue, skilled in constitution assessment and daily wellness care.

[Interview strategy]
1. Be warm and courteous at all times.
2. Follow the logic of inspection, listening, inquiry and palpation. Ask about the core symptoms one by one (cold and heat, sweating, head and body, digestion and elimination, appetite, sleep, emotions).
3. Ask exactly ONE short closed or semi-closed question per turn. Never ask several questions at once.
4. Smart wrap-up: once you have enough information to determine the mechanism, deficiency or excess, and the organs involved, start the report directly without waiting for the user.
5. If the user says they are done describing or asks for the report, stop asking and write the report from what you know.

[Report format]
When you write the report, use exactly these Markdown sections, none omitted:

### 🩺 Pattern Differentiation
(mechanism, yin-yang, deficiency or excess, constitution)

### 📜 Classical Sources
(quote the classics and explain them plainly)

### 🍵 Dietary Remedies
(two recipes: name, ingredients, method, effect, contraindications)

### 🧘 Acupressure
(two acupoints: location, technique, frequency)

### 🌞 Daily Routine and Taboos
(schedule advice and foods to avoid)

### 😊 Emotional Care
(simple emotional advice)

### ⚠️ Notes
(disclaimer and when to see a doctor)

[Additional requirements]
1. Do not use Western medical terminology.
2. Keep the tone professional, gentle and rigorous."#;

const GREETING: &str = "Hello, I am your traditional Chinese medicine wellness assistant 🌿. \
I can help with constitution assessment, dietary remedies, acupressure and emotional care. \
Tell me how you have been feeling lately and I will put together a wellness plan for you.";

static WELLNESS_PROFILE: Lazy<Arc<InterviewProfile>> = Lazy::new(|| {
    Arc::new(InterviewProfile {
        system_prompt: SYSTEM_PROMPT.to_string(),
        greeting: GREETING.to_string(),
        termination_signal: TERMINATION_SIGNAL.to_string(),
        finish_phrases: [
            "done describing",
            "finished describing",
            "generate the report",
            "generate report",
            "write the report",
            "描述完",
            "生成报告",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        report_headings: [
            "Pattern Differentiation",
            "Syndrome Differentiation",
            "深度辨证",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        finish_label: "✅ Done describing, show my results".to_string(),
        intake_prompts: vec![
            CannedPrompt::new("sleep", "😴 Can't sleep", "I have not been able to sleep well lately"),
            CannedPrompt::new("hair", "💇 Hair loss", "I have been losing a lot of hair recently"),
            CannedPrompt::new("cold", "❄️ Cold hands and feet", "My hands and feet are always cold"),
            CannedPrompt::new("bloating", "🤢 Bloating", "My stomach often feels bloated"),
        ],
        follow_up_prompts: vec![
            CannedPrompt::new(
                "menu",
                "🍲 Seven-day menu",
                "Please recommend a seven-day menu that suits me, with concrete cooking steps.",
            ),
            CannedPrompt::new(
                "avoid",
                "🚫 Foods to avoid",
                "Please list the foods I should absolutely avoid.",
            ),
            CannedPrompt::new("tea", "🍵 Tea remedies", "Which teas are good for me to drink every day?"),
            CannedPrompt::new(
                "acupoints",
                "💆 More acupoints",
                "Which acupoints can I massage daily for my symptoms?",
            ),
        ],
    })
});

/// Everything that is fixed for a kind of interview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewProfile {
    /// Configuration prompt; first transcript entry.
    pub system_prompt: String,
    /// Canned opening assistant message.
    pub greeting: String,
    /// Text of the synthetic finish turn.
    pub termination_signal: String,
    /// Lower-case phrases in free text that count as asking for the report.
    pub finish_phrases: Vec<String>,
    /// Accepted titles of the report's first heading.
    pub report_headings: Vec<String>,
    /// Label of the finish button.
    pub finish_label: String,
    /// Shortcuts on the intake screen.
    pub intake_prompts: Vec<CannedPrompt>,
    /// Shortcuts on the report screen.
    pub follow_up_prompts: Vec<CannedPrompt>,
}

impl InterviewProfile {
    /// Shared wellness consultation profile.
    pub fn wellness() -> Arc<Self> {
        Arc::clone(&WELLNESS_PROFILE)
    }

    /// Adds extra accepted report headings, skipping blanks and duplicates.
    pub fn with_extra_headings<I, S>(mut self, headings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for heading in headings {
            let heading = heading.as_ref().trim();
            if !heading.is_empty() && !self.report_headings.iter().any(|h| h == heading) {
                self.report_headings.push(heading.to_string());
            }
        }
        self
    }

    /// Returns true if free text asks for the report.
    pub fn requests_report(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.finish_phrases
            .iter()
            .any(|phrase| lowered.contains(phrase.as_str()))
    }
}
