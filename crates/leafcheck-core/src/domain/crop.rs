//! Crop catalog and response language.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A selectable crop type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Crop {
    /// Stable identifier, e.g. `rice`.
    pub id: &'static str,
    /// English display name.
    pub name: &'static str,
    /// Bangla display name.
    pub local_name: &'static str,
}

impl Crop {
    /// Whether the user asked the classifier to identify the crop itself.
    #[must_use]
    pub fn is_auto_detect(&self) -> bool {
        let name = self.name.to_lowercase();
        name.contains("other") || name.contains("auto")
    }

    /// Display name in the given language.
    #[must_use]
    pub const fn display_name(&self, language: Language) -> &'static str {
        match language {
            Language::En => self.name,
            Language::Bn => self.local_name,
        }
    }
}

/// Every crop offered to the user, in display order.
pub const CROPS: &[Crop] = &[
    Crop { id: "rice", name: "Rice", local_name: "ধান" },
    Crop { id: "wheat", name: "Wheat", local_name: "গম" },
    Crop { id: "potato", name: "Potato", local_name: "আলু" },
    Crop { id: "jute", name: "Jute", local_name: "পাট" },
    Crop { id: "tomato", name: "Tomato", local_name: "টমেটো" },
    Crop { id: "brinjal", name: "Brinjal", local_name: "বেগুন" },
    Crop { id: "mango", name: "Mango", local_name: "আম" },
    Crop { id: "banana", name: "Banana", local_name: "কলা" },
    Crop { id: "papaya", name: "Papaya", local_name: "পেঁপে" },
    Crop { id: "chili", name: "Chili", local_name: "মরিচ" },
    Crop { id: "onion", name: "Onion", local_name: "পেঁয়াজ" },
    Crop { id: "garlic", name: "Garlic", local_name: "রসুন" },
    Crop { id: "tea", name: "Tea", local_name: "চা" },
    Crop {
        id: "other",
        name: "Other / Auto-detect",
        local_name: "অন্যান্য / স্বয়ংক্রিয় সনাক্তকরণ",
    },
];

/// Look up a crop by id (case-insensitive).
#[must_use]
pub fn find_crop(id: &str) -> Option<&'static Crop> {
    CROPS.iter().find(|c| c.id.eq_ignore_ascii_case(id.trim()))
}

/// Language the classifier should answer in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Bengali (Bangla).
    Bn,
}

impl Language {
    /// Two-letter language code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Bn => "bn",
        }
    }

    /// English name of the language, as used in prompts.
    #[must_use]
    pub const fn english_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Bn => "Bengali",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "bn" => Ok(Self::Bn),
            other => Err(format!("unsupported language '{other}' (expected 'en' or 'bn')")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_size_and_ids_unique() {
        assert_eq!(CROPS.len(), 14);
        let mut ids: Vec<_> = CROPS.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), CROPS.len());
    }

    #[test]
    fn test_find_crop_case_insensitive() {
        assert_eq!(find_crop("RICE").map(|c| c.name), Some("Rice"));
        assert_eq!(find_crop(" tea ").map(|c| c.id), Some("tea"));
        assert!(find_crop("durian").is_none());
    }

    #[test]
    fn test_auto_detect_only_for_other() {
        let auto: Vec<_> = CROPS.iter().filter(|c| c.is_auto_detect()).collect();
        assert_eq!(auto.len(), 1);
        assert_eq!(auto[0].id, "other");
    }

    #[test]
    fn test_display_name_by_language() {
        let Some(potato) = find_crop("potato") else {
            panic!("potato is in the catalog");
        };
        assert_eq!(potato.display_name(Language::En), "Potato");
        assert_eq!(potato.display_name(Language::Bn), "আলু");
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("en".parse::<Language>(), Ok(Language::En));
        assert_eq!("BN".parse::<Language>(), Ok(Language::Bn));
        assert!("fr".parse::<Language>().is_err());
        assert_eq!(Language::default(), Language::En);
    }
}
