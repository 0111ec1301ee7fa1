//! `<languages>`: locales offered on the login page.

use roxmltree::Node;
use serde::Serialize;

use crate::element::TypedElement;
use crate::error::Result;
use crate::merge::{Combine, FieldRule, MergeKind, MergeStrategy};
use crate::reader::ReadElement;
use crate::xml::{expect_element, find_children, get_text, required_attribute};

/// One selectable locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Language {
    pub locale: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanguagesConfigElement {
    languages: Vec<Language>,
}

impl LanguagesConfigElement {
    /// Add a language. A locale that is already present has its label replaced
    /// in place.
    pub fn add_language(&mut self, locale: impl Into<String>, label: impl Into<String>) {
        let locale = locale.into();
        let label = label.into();
        match self.languages.iter_mut().find(|l| l.locale == locale) {
            Some(existing) => existing.label = label,
            None => self.languages.push(Language { locale, label }),
        }
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Locale codes in declaration order.
    pub fn locales(&self) -> Vec<&str> {
        self.languages.iter().map(|l| l.locale.as_str()).collect()
    }

    pub fn label_for_language(&self, locale: &str) -> Option<&str> {
        self.languages
            .iter()
            .find(|l| l.locale == locale)
            .map(|l| l.label.as_str())
    }
}

impl ReadElement for LanguagesConfigElement {
    fn read(node: Node<'_, '_>) -> Result<Self> {
        expect_element(node, Self::ELEMENT)?;
        let mut element = Self::default();
        for language in find_children(node, "language") {
            let locale = required_attribute(language, "locale")?;
            let label = get_text(language).unwrap_or_else(|| locale.clone());
            element.add_language(locale, label);
        }
        Ok(element)
    }
}

const LANGUAGES_RULES: &[FieldRule] = &[FieldRule::new("language", MergeKind::AppendIfAbsent)];

impl Combine for LanguagesConfigElement {
    const STRATEGY: MergeStrategy = MergeStrategy {
        element: Self::ELEMENT,
        rules: LANGUAGES_RULES,
    };

    fn combine(&self, other: &Self) -> Self {
        Self {
            languages: Self::STRATEGY.list(
                "language",
                &self.languages,
                &other.languages,
                |l| l.locale.clone(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use pretty_assertions::assert_eq;
    use roxmltree::Document;

    fn parse(xml: &str) -> LanguagesConfigElement {
        let doc = Document::parse(xml).unwrap();
        LanguagesConfigElement::read(doc.root_element()).unwrap()
    }

    #[test]
    fn test_read_languages() {
        let languages = parse(
            r#"<languages>
                <language locale="en_US">English</language>
                <language locale="fr_FR">French</language>
            </languages>"#,
        );
        assert_eq!(languages.locales(), vec!["en_US", "fr_FR"]);
        assert_eq!(languages.label_for_language("fr_FR"), Some("French"));
        assert_eq!(languages.label_for_language("de_DE"), None);
    }

    #[test]
    fn test_missing_locale_fails() {
        let doc = Document::parse("<languages><language>English</language></languages>").unwrap();
        assert!(matches!(
            LanguagesConfigElement::read(doc.root_element()),
            Err(ConfigError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_combine_appends_absent_locales() {
        let base = parse(
            r#"<languages><language locale="en_US">English</language><language locale="fr_FR">French</language></languages>"#,
        );
        let other = parse(
            r#"<languages><language locale="fr_FR">Francais</language><language locale="de_DE">German</language></languages>"#,
        );

        let (base_before, other_before) = (base.clone(), other.clone());
        let combined = base.combine(&other);
        assert_eq!(base, base_before);
        assert_eq!(other, other_before);
        assert_eq!(combined.locales(), vec!["en_US", "fr_FR", "de_DE"]);
        assert_eq!(combined.label_for_language("fr_FR"), Some("French"));
        assert_eq!(base.locales(), vec!["en_US", "fr_FR"]);
    }
}
