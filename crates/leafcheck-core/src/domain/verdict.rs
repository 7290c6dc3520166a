//! Quality verdicts and the advisory shown for them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::crop::Language;

/// Outcome of the image quality check.
///
/// Exactly one verdict is produced per analysis. Darkness and brightness
/// take precedence over blur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Nothing to warn about (also the fail-open result).
    Acceptable,
    /// Mean brightness below the dark threshold.
    TooDark,
    /// Mean brightness above the bright threshold.
    TooBright,
    /// Mean horizontal edge score below the blur threshold.
    TooBlurry,
}

impl Verdict {
    /// Returns true when no warning should be raised.
    #[must_use]
    pub const fn is_acceptable(self) -> bool {
        matches!(self, Self::Acceptable)
    }

    /// Human-readable reason for a warning, if any.
    #[must_use]
    pub const fn reason(self) -> Option<&'static str> {
        match self {
            Self::Acceptable => None,
            Self::TooDark => Some("The image is too dark. Please use better lighting."),
            Self::TooBright => Some("The image is too bright (overexposed). Avoid direct glare."),
            Self::TooBlurry => {
                Some("The image appears blurry. The AI may not see the disease clearly.")
            }
        }
    }

    /// Reason for a warning in the given language, if any.
    #[must_use]
    pub const fn reason_in(self, language: Language) -> Option<&'static str> {
        match (self, language) {
            (_, Language::En) => self.reason(),
            (Self::Acceptable, Language::Bn) => None,
            (Self::TooDark, Language::Bn) => {
                Some("ছবিটি খুব অন্ধকার। দয়া করে ভালো আলোতে ছবি তুলুন।")
            }
            (Self::TooBright, Language::Bn) => {
                Some("ছবিটি খুব উজ্জ্বল। সরাসরি রোদ বা ফ্ল্যাশ এড়িয়ে চলুন।")
            }
            (Self::TooBlurry, Language::Bn) => {
                Some("ছবিটি ঝাপসা মনে হচ্ছে। এআই রোগটি স্পষ্টভাবে নাও বুঝতে পারে।")
            }
        }
    }

    /// Stable snake_case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Acceptable => "acceptable",
            Self::TooDark => "too_dark",
            Self::TooBright => "too_bright",
            Self::TooBlurry => "too_blurry",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dismissible, non-blocking warning rendered for a non-acceptable verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    /// The verdict that raised this advisory.
    pub verdict: Verdict,
    /// Banner title.
    pub title: &'static str,
    /// Why the photo was flagged.
    pub reason: &'static str,
    /// What the user may do about it.
    pub suggestion: &'static str,
}

impl Advisory {
    /// Banner title for every quality advisory.
    pub const TITLE: &'static str = "Image Quality Warning";
    /// Retake suggestion appended to every quality advisory.
    pub const SUGGESTION: &'static str = "We recommend taking a clearer photo for best results.";

    /// Builds the advisory for a verdict; `None` for `Acceptable`.
    #[must_use]
    pub fn for_verdict(verdict: Verdict) -> Option<Self> {
        Self::for_verdict_in(verdict, Language::En)
    }

    /// Builds the advisory for a verdict in the given language.
    #[must_use]
    pub fn for_verdict_in(verdict: Verdict, language: Language) -> Option<Self> {
        let (title, suggestion) = match language {
            Language::En => (Self::TITLE, Self::SUGGESTION),
            Language::Bn => (
                "ছবির মান সতর্কতা",
                "সঠিক ফলাফলের জন্য আমরা একটি পরিষ্কার ছবি তোলার পরামর্শ দিচ্ছি।",
            ),
        };
        verdict.reason_in(language).map(|reason| Self {
            verdict,
            title,
            reason,
            suggestion,
        })
    }

    /// The same advisory with its texts in `language`.
    #[must_use]
    pub fn in_language(&self, language: Language) -> Self {
        Self::for_verdict_in(self.verdict, language).unwrap_or_else(|| self.clone())
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.title, self.reason, self.suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptable_has_no_advisory() {
        assert!(Verdict::Acceptable.is_acceptable());
        assert!(Advisory::for_verdict(Verdict::Acceptable).is_none());
    }

    #[test]
    fn test_each_warning_has_distinct_reason() {
        let reasons: Vec<_> = [Verdict::TooDark, Verdict::TooBright, Verdict::TooBlurry]
            .into_iter()
            .filter_map(Verdict::reason)
            .collect();
        assert_eq!(reasons.len(), 3);
        assert_ne!(reasons[0], reasons[1]);
        assert_ne!(reasons[1], reasons[2]);
    }

    #[test]
    fn test_bangla_advisory_text() {
        let Some(advisory) = Advisory::for_verdict_in(Verdict::TooBright, Language::Bn) else {
            panic!("too bright should produce an advisory");
        };
        assert_eq!(advisory.verdict, Verdict::TooBright);
        assert_eq!(advisory.title, "ছবির মান সতর্কতা");
        assert!(advisory.reason.starts_with("ছবিটি খুব উজ্জ্বল"));
        assert!(Advisory::for_verdict_in(Verdict::Acceptable, Language::Bn).is_none());
    }

    #[test]
    fn test_in_language_round_trips_verdict() {
        let english = Advisory::for_verdict(Verdict::TooBlurry).map(|a| a.in_language(Language::Bn));
        let bangla = Advisory::for_verdict_in(Verdict::TooBlurry, Language::Bn);
        assert_eq!(english, bangla);
        assert_eq!(
            bangla.map(|a| a.in_language(Language::En)),
            Advisory::for_verdict(Verdict::TooBlurry)
        );
    }

    #[test]
    fn test_advisory_text() {
        let Some(advisory) = Advisory::for_verdict(Verdict::TooDark) else {
            panic!("too dark should produce an advisory");
        };
        assert_eq!(advisory.title, "Image Quality Warning");
        assert!(advisory.reason.contains("too dark"));
        assert!(advisory.to_string().ends_with(Advisory::SUGGESTION));
    }

    #[test]
    fn test_display_matches_serde_name() {
        assert_eq!(Verdict::TooBlurry.to_string(), "too_blurry");
        assert_eq!(Verdict::TooBright.as_str(), "too_bright");
    }
}
