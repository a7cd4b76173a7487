//! Input language detection.
//!
//! A message is treated as Arabic if it contains any character in the
//! Arabic Unicode block, else English. Every user-facing string the
//! pipeline produces follows the detected language.

use serde::{Deserialize, Serialize};

/// The two languages the factory's operators use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Arabic,
    English,
}

impl Language {
    /// Detect the language of a message.
    pub fn detect(text: &str) -> Self {
        if text.chars().any(is_arabic_char) {
            Self::Arabic
        } else {
            Self::English
        }
    }

    pub fn is_arabic(self) -> bool {
        self == Self::Arabic
    }
}

/// Arabic Unicode block, U+0600..=U+06FF.
fn is_arabic_char(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_arabic_script() {
        assert_eq!(Language::detect("سجل عميل جديد"), Language::Arabic);
        assert_eq!(Language::detect("اعمل طلب جديد"), Language::Arabic);
    }

    #[test]
    fn detects_english_by_default() {
        assert_eq!(Language::detect("create a new order"), Language::English);
        assert_eq!(Language::detect("12345"), Language::English);
        assert_eq!(Language::detect(""), Language::English);
    }

    #[test]
    fn mixed_text_counts_as_arabic() {
        // One Arabic character is enough.
        assert_eq!(
            Language::detect("order for شركة النور please"),
            Language::Arabic
        );
    }
}
