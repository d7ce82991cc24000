use anyhow::{Context, Result};

use super::{BundleGenerator, GenerateRequest};
use crate::core::{
    allocator::KeyOrigin,
    bundle::{Bundle, TranslationEntry},
    xtb::read_bundle,
};

/// In-process XTB merge.
///
/// Starts from the locale's existing bundle, keeping record order, and
/// applies the run's messages:
///
/// - primary locale: the record text is the source text;
/// - other locales: a reused key keeps its existing translation, a freshly
///   allocated key gets the source text until someone translates it.
///
/// Records for keys not seen this run are left alone; pruning decides
/// whether they survive.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeGenerator;

impl BundleGenerator for NativeGenerator {
    fn generate(&self, request: &GenerateRequest<'_>) -> Result<Bundle> {
        let existing = read_bundle(request.bundle_path).with_context(|| {
            format!(
                "Failed to read translation bundle: {}",
                request.bundle_path.display()
            )
        })?;

        let mut bundle = existing.unwrap_or_else(|| Bundle::new(request.locale));
        if bundle.lang.is_empty() {
            bundle.lang = request.locale.to_string();
        }

        for message in request.messages {
            let translation = match bundle.get(&message.key) {
                Some(current) if !request.is_primary && message.origin == KeyOrigin::Reused => {
                    current.text.clone()
                }
                _ => message.text.clone(),
            };

            let mut entry = TranslationEntry::new(&message.key, translation, &message.description);
            if let Some(current) = bundle.get(&message.key) {
                entry.id = current.id.clone();
                entry.source = current.source.clone();
            }
            bundle.upsert(entry);
        }

        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::core::{template::Message, xtb::write_bundle};

    fn message(key: &str, text: &str, origin: KeyOrigin) -> Message {
        Message {
            key: key.to_string(),
            text: text.to_string(),
            description: "desc".to_string(),
            origin,
        }
    }

    fn request<'a>(
        locale: &'a str,
        is_primary: bool,
        messages: &'a [Message],
        bundle_path: &'a Path,
    ) -> GenerateRequest<'a> {
        GenerateRequest {
            locale,
            is_primary,
            messages,
            bundle_path,
            messages_dir: Path::new("."),
        }
    }

    #[test]
    fn test_first_run_creates_bundle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("messages-en.xtb");
        let messages = [
            message("MSG_FOO_0", "Hello", KeyOrigin::Allocated),
            message("MSG_FOO_1", "Bye", KeyOrigin::Allocated),
        ];

        let bundle = NativeGenerator
            .generate(&request("en", true, &messages, &path))
            .unwrap();

        assert_eq!(bundle.lang, "en");
        let texts: Vec<&str> = bundle.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "Bye"]);
        assert!(!path.exists());
    }

    #[test]
    fn test_translations_survive_for_reused_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("messages-de.xtb");
        let mut existing = Bundle::new("de");
        existing.upsert(TranslationEntry::new("MSG_FOO_0", "Hallo", "desc"));
        existing.upsert(TranslationEntry::new("MSG_FOO_1", "Veraltet", "desc"));
        existing.upsert(TranslationEntry::new("MSG_OTHER_0", "Andere", "desc"));
        write_bundle(&path, &existing).unwrap();

        let messages = [
            message("MSG_FOO_0", "Hello", KeyOrigin::Reused),
            message("MSG_FOO_1", "Changed", KeyOrigin::Allocated),
            message("MSG_FOO_2", "Brand new", KeyOrigin::Allocated),
        ];

        let bundle = NativeGenerator
            .generate(&request("de", false, &messages, &path))
            .unwrap();

        let records: Vec<(&str, &str)> = bundle
            .entries()
            .iter()
            .map(|e| (e.key.as_str(), e.text.as_str()))
            .collect();
        assert_eq!(
            records,
            vec![
                ("MSG_FOO_0", "Hallo"),
                ("MSG_FOO_1", "Changed"),
                ("MSG_OTHER_0", "Andere"),
                ("MSG_FOO_2", "Brand new"),
            ]
        );
    }

    #[test]
    fn test_primary_locale_uses_source_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("messages-en.xtb");
        let mut existing = Bundle::new("en");
        let mut stored = TranslationEntry::new("MSG_FOO_0", "Hello", "old desc");
        stored.id = Some("42".to_string());
        existing.upsert(stored);
        write_bundle(&path, &existing).unwrap();

        let messages = [message("MSG_FOO_0", "Hello", KeyOrigin::Reused)];
        let bundle = NativeGenerator
            .generate(&request("en", true, &messages, &path))
            .unwrap();

        let entry = bundle.get("MSG_FOO_0").unwrap();
        assert_eq!(entry.text, "Hello");
        assert_eq!(entry.description, "desc");
        assert_eq!(entry.id.as_deref(), Some("42"));
    }

    #[test]
    fn test_corrupt_bundle_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("messages-fr.xtb");
        std::fs::write(&path, "<translationbundle><translation>").unwrap();

        let err = NativeGenerator
            .generate(&request("fr", false, &[], &path))
            .unwrap_err();
        assert!(err.to_string().contains("messages-fr.xtb"));
    }
}
