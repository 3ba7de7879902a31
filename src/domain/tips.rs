//! Daily wellness tips shown beside the consultation.

use serde::{Deserialize, Serialize};

/// Tips used when the gateway cannot produce one. The board starts on the first.
pub const FALLBACK_TIPS: [&str; 3] = [
    "🥤 A cup of warm water on waking rouses the stomach and lifts yang qi.",
    "🦶 Soak your feet for 20 minutes before bed until you sweat lightly; it beats any tonic.",
    "😴 Be asleep between 11pm and 1am, when the gallbladder meridian rules and liver blood is nourished.",
];

/// Subject of a generated tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipTopic {
    Diet,
    Sleep,
    Exercise,
    Emotions,
    Seasons,
    Acupoints,
    Tea,
}

impl TipTopic {
    pub const ALL: [TipTopic; 7] = [
        TipTopic::Diet,
        TipTopic::Sleep,
        TipTopic::Exercise,
        TipTopic::Emotions,
        TipTopic::Seasons,
        TipTopic::Acupoints,
        TipTopic::Tea,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Diet => "diet",
            Self::Sleep => "sleep",
            Self::Exercise => "exercise",
            Self::Emotions => "emotions",
            Self::Seasons => "the four seasons",
            Self::Acupoints => "acupoints",
            Self::Tea => "tea drinking",
        }
    }

    /// Instruction asking for one short tip on this topic.
    pub fn prompt(&self) -> String {
        format!(
            "Write one traditional Chinese medicine wellness tip about \"{}\". Requirements:\n\
             1. Follow classical TCM theory only, in the spirit of the Huangdi Neijing, with no Western medical terms.\n\
             2. Keep it short (under 30 words), plain and friendly, and include exactly one fitting emoji.\n\
             3. Make it concrete and actionable (say \"sleep before 11pm to nourish liver blood\", not \"don't stay up late\").\n\
             4. Output only the tip itself, with no explanation.\n\
             5. Do not exaggerate; never promise a cure.",
            self.label()
        )
    }
}

/// The tip currently on display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthTip {
    pub text: String,
    /// `None` for a fallback tip.
    pub topic: Option<TipTopic>,
}

impl HealthTip {
    pub fn generated(topic: TipTopic, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            topic: Some(topic),
        }
    }

    pub fn fallback(index: usize) -> Self {
        Self {
            text: FALLBACK_TIPS[index % FALLBACK_TIPS.len()].to_string(),
            topic: None,
        }
    }
}

impl Default for HealthTip {
    fn default() -> Self {
        Self::fallback(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tip_is_first_fallback() {
        assert_eq!(HealthTip::default().text, FALLBACK_TIPS[0]);
        assert_eq!(HealthTip::default().topic, None);
    }

    #[test]
    fn fallback_index_wraps() {
        assert_eq!(HealthTip::fallback(4).text, FALLBACK_TIPS[1]);
    }

    #[test]
    fn prompt_names_topic() {
        assert!(TipTopic::Tea.prompt().contains("tea drinking"));
    }

    #[test]
    fn every_topic_is_listed_once() {
        let mut labels: Vec<_> = TipTopic::ALL.iter().map(|t| t.label()).collect();
        labels.dedup();
        assert_eq!(labels.len(), 7);
    }
}
