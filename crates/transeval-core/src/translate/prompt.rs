use crate::errors::ConfigError;
use std::collections::BTreeMap;
use std::path::Path;

const SYSTEM_PROMPT: &str = "You are a professional translation expert specializing in Thai-to-English translation.\n\n\
Your task is to translate Thai queries into clear, natural, and grammatically correct English, \
while fully preserving the original meaning, tone, and intent.\n\
Maintain the original format, especially if the input is a question, and ensure contextual accuracy.";

const GLOSSARY_PREAMBLE: &str =
    "You must strictly preserve the following fixed Thai terms by translating them exactly as shown:";

/// Fixed Thai → English terms that must be translated verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glossary {
    terms: BTreeMap<String, String>,
}

impl Glossary {
    pub fn new(terms: BTreeMap<String, String>) -> Self {
        Self { terms }
    }

    /// Load a JSON object of `"thai term": "English term"` pairs.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Glossary {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let terms: BTreeMap<String, String> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Glossary {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self { terms })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn render(&self) -> String {
        serde_json::to_string_pretty(&self.terms).unwrap_or_default()
    }
}

/// The fixed instructions sent with every translation request.
#[derive(Debug, Clone, Default)]
pub struct TranslationPrompt {
    glossary: Glossary,
}

impl TranslationPrompt {
    pub fn new(glossary: Glossary) -> Self {
        Self { glossary }
    }

    pub fn system(&self) -> String {
        if self.glossary.is_empty() {
            return SYSTEM_PROMPT.to_string();
        }
        format!(
            "{}\n\n{}\n\n{}",
            SYSTEM_PROMPT,
            GLOSSARY_PREAMBLE,
            self.glossary.render()
        )
    }

    pub fn user(&self, source_text: &str) -> String {
        format!(
            "Translate the following Thai query to English:\n{}\n\
             Provide an accurate English translation that preserves the original meaning and intent.\n\
             Return the translation in text.",
            source_text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn system_prompt_without_glossary_has_no_term_table() {
        let p = TranslationPrompt::default();
        assert!(!p.system().contains(GLOSSARY_PREAMBLE));
        assert!(p.user("สวัสดี").contains("สวัสดี"));
    }

    #[test]
    fn glossary_is_rendered_sorted_and_unescaped() {
        let mut terms = BTreeMap::new();
        terms.insert("โรคราดำ".to_string(), "Sooty mold".to_string());
        terms.insert("ดอกบาน".to_string(), "blooming".to_string());
        let system = TranslationPrompt::new(Glossary::new(terms)).system();

        assert!(system.contains(GLOSSARY_PREAMBLE));
        let a = system.find("\"ดอกบาน\": \"blooming\"").unwrap();
        let b = system.find("\"โรคราดำ\": \"Sooty mold\"").unwrap();
        assert!(a < b);
    }

    #[test]
    fn bundled_durian_glossary_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/durian-glossary.json");
        let g = Glossary::load(&path).unwrap();
        assert_eq!(g.len(), 35);
        assert!(TranslationPrompt::new(g)
            .system()
            .contains("\"ระยะดอกบาน\": \"Flowering Stage (Anthesis)\""));
    }

    #[test]
    fn glossary_must_be_object_of_strings() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "[\"not\", \"an\", \"object\"]").unwrap();
        let err = Glossary::load(f.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Glossary { .. }));
    }
}
