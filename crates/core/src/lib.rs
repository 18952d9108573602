use serde::{Deserialize, Serialize};

/// Subscription level governing quota enforcement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Premium,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Premium => "premium",
        }
    }

    pub fn parse(value: &str) -> Option<Tier> {
        match value {
            "free" => Some(Tier::Free),
            "premium" => Some(Tier::Premium),
            _ => None,
        }
    }
}

/// Where an analyzed image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Upload,
    Camera,
    Url,
}

impl SourceKind {
    /// Provenance for a file input. The capture UI names camera shots with a
    /// `camera_` prefix; everything else is a gallery upload.
    pub fn for_file_name(name: &str) -> SourceKind {
        if name.starts_with("camera_") {
            SourceKind::Camera
        } else {
            SourceKind::Upload
        }
    }
}

/// Verdict as the classification service reports it, before coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVerdict {
    pub is_ai_generated: bool,
    pub confidence_score: f64,
    pub is_ai_improved: bool,
    pub improvement_confidence: f64,
    pub explanation: String,
}

impl RawVerdict {
    /// Coerce the external shape into the domain invariant: a fully generated
    /// image cannot also be an enhanced real photo, and confidences stay in
    /// [0, 1] regardless of what the service returned.
    pub fn into_verdict(self) -> Verdict {
        let (is_ai_enhanced, enhancement_confidence) = if self.is_ai_generated {
            (false, 0.0)
        } else {
            (self.is_ai_improved, clamp_unit(self.improvement_confidence))
        };
        Verdict {
            is_ai_generated: self.is_ai_generated,
            confidence: clamp_unit(self.confidence_score),
            is_ai_enhanced,
            enhancement_confidence,
            explanation: self.explanation,
        }
    }
}

/// Classification verdict after boundary coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub is_ai_generated: bool,
    pub confidence: f64,
    pub is_ai_enhanced: bool,
    pub enhancement_confidence: f64,
    pub explanation: String,
}

/// One completed scan, immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub id: String,
    pub verdict: Verdict,
    pub source_kind: SourceKind,
    pub original_reference: String,
    pub preview_payload: String,
    pub created_at: String,
}

/// Lossy projection of a scan used for insight generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageHistoryEntry {
    pub is_ai_generated: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorCategory {
    ServiceBusy,
    ContentBlocked,
    Other,
}

const BUSY_PHRASES: &[&str] = &[
    "quota",
    "rate limit",
    "too many requests",
    "resource exhausted",
    "overloaded",
    "429",
];

const BLOCKED_PHRASES: &[&str] = &["safety", "blocked", "policy", "prohibited"];

/// Bucket a classification-provider error message. Quota/limit phrases win
/// when a message matches both buckets: provider rate-limit boilerplate often
/// quotes policy wording, while real safety blocks rarely mention quotas.
pub fn categorize_provider_error(message: &str) -> ProviderErrorCategory {
    let message = message.to_ascii_lowercase();
    if BUSY_PHRASES.iter().any(|phrase| message.contains(phrase)) {
        return ProviderErrorCategory::ServiceBusy;
    }
    if BLOCKED_PHRASES.iter().any(|phrase| message.contains(phrase)) {
        return ProviderErrorCategory::ContentBlocked;
    }
    ProviderErrorCategory::Other
}

/// User-facing line for a failed classification.
pub fn friendly_classification_message(message: &str) -> String {
    match categorize_provider_error(message) {
        ProviderErrorCategory::ServiceBusy => {
            "The analysis service is busy right now. Please try again in a moment.".to_string()
        }
        ProviderErrorCategory::ContentBlocked => {
            "The analysis service declined this image under its content policy.".to_string()
        }
        ProviderErrorCategory::Other => format!("Image analysis failed: {}", message),
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_verdict_forces_enhancement_fields_to_zero() {
        let raw = RawVerdict {
            is_ai_generated: true,
            confidence_score: 0.92,
            is_ai_improved: true,
            improvement_confidence: 0.7,
            explanation: "synthetic texture artifacts".to_string(),
        };

        let verdict = raw.into_verdict();

        assert!(verdict.is_ai_generated);
        assert!(!verdict.is_ai_enhanced);
        assert_eq!(verdict.enhancement_confidence, 0.0);
        assert_eq!(verdict.confidence, 0.92);
    }

    #[test]
    fn real_photo_keeps_enhancement_fields() {
        let raw = RawVerdict {
            is_ai_generated: false,
            confidence_score: 0.4,
            is_ai_improved: true,
            improvement_confidence: 0.8,
            explanation: "generative fill near the horizon".to_string(),
        };

        let verdict = raw.into_verdict();

        assert!(verdict.is_ai_enhanced);
        assert_eq!(verdict.enhancement_confidence, 0.8);
    }

    #[test]
    fn confidences_are_clamped_to_unit_range() {
        let raw = RawVerdict {
            is_ai_generated: false,
            confidence_score: 1.7,
            is_ai_improved: true,
            improvement_confidence: -0.2,
            explanation: String::new(),
        };

        let verdict = raw.into_verdict();

        assert_eq!(verdict.confidence, 1.0);
        assert_eq!(verdict.enhancement_confidence, 0.0);
    }

    #[test]
    fn camera_prefix_marks_camera_provenance() {
        assert_eq!(
            SourceKind::for_file_name("camera_image.jpg"),
            SourceKind::Camera
        );
        assert_eq!(SourceKind::for_file_name("holiday.png"), SourceKind::Upload);
    }

    #[test]
    fn quota_phrases_map_to_service_busy() {
        assert_eq!(
            categorize_provider_error("Resource exhausted: quota exceeded for model"),
            ProviderErrorCategory::ServiceBusy
        );
    }

    #[test]
    fn safety_phrases_map_to_content_blocked() {
        assert_eq!(
            categorize_provider_error("Request blocked by safety settings"),
            ProviderErrorCategory::ContentBlocked
        );
    }

    #[test]
    fn quota_wins_when_both_buckets_match() {
        assert_eq!(
            categorize_provider_error("quota policy violation"),
            ProviderErrorCategory::ServiceBusy
        );
    }

    #[test]
    fn unknown_messages_fall_through_to_generic() {
        let message = "connection reset by peer";
        assert_eq!(
            categorize_provider_error(message),
            ProviderErrorCategory::Other
        );
        assert_eq!(
            friendly_classification_message(message),
            "Image analysis failed: connection reset by peer"
        );
    }

    #[test]
    fn tier_round_trips_through_strings() {
        assert_eq!(Tier::parse("premium"), Some(Tier::Premium));
        assert_eq!(Tier::parse(Tier::Free.as_str()), Some(Tier::Free));
        assert_eq!(Tier::parse("gold"), None);
    }
}
