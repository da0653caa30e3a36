//! Per-language generation policy.
//!
//! Everything that differs between targets lives in one [`Capabilities`]
//! record per [`Language`]; the rest of the engine asks the record instead of
//! branching on the language itself.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::{
    error::CodegenError,
    type_map::{TypeTable, DART_TYPES, KOTLIN_TYPES, SWIFT_TYPES},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Kotlin,
    Swift,
    /// Dart is the default when no `lang` option is given.
    #[default]
    Dart,
}

/// How many output files one schema file produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    PerFile,
    /// One file per service, named `<base>_<snake service><ext>`.
    PerService,
}

#[derive(Debug)]
pub struct Capabilities {
    /// Compound extension appended to the schema path without `.proto`.
    pub extension:          &'static str,
    /// Package used when the schema declares none. `None` means the target
    /// accepts an empty namespace.
    pub namespace_fallback: Option<&'static str>,
    /// Target has no package-scoped type resolution, so message references
    /// get a package-derived prefix.
    pub flat_namespace:     bool,
    /// Whether enums and messages are emitted, or only services.
    pub emits_types:        bool,
    /// Name of the runtime support file bundled once per run.
    pub runtime_asset:      Option<&'static str>,
    pub granularity:        Granularity,
    pub types:              &'static TypeTable,
}

static KOTLIN: Capabilities = Capabilities {
    extension:          ".klm.kt",
    namespace_fallback: Some("generated"),
    flat_namespace:     false,
    emits_types:        true,
    runtime_asset:      None,
    granularity:        Granularity::PerFile,
    types:              &KOTLIN_TYPES,
};

static SWIFT: Capabilities = Capabilities {
    extension:          ".klm.swift",
    namespace_fallback: None,
    flat_namespace:     true,
    emits_types:        false,
    runtime_asset:      Some("kalam.swift"),
    granularity:        Granularity::PerFile,
    types:              &SWIFT_TYPES,
};

static DART: Capabilities = Capabilities {
    extension:          ".klm.dart",
    namespace_fallback: None,
    flat_namespace:     false,
    emits_types:        false,
    runtime_asset:      Some("kalam.dart"),
    granularity:        Granularity::PerService,
    types:              &DART_TYPES,
};

impl Language {
    pub const ALL: [Language; 3] = [Language::Kotlin, Language::Swift, Language::Dart];

    pub fn name(self) -> &'static str {
        match self {
            Language::Kotlin => "kotlin",
            Language::Swift => "swift",
            Language::Dart => "dart",
        }
    }

    pub fn capabilities(self) -> &'static Capabilities {
        match self {
            Language::Kotlin => &KOTLIN,
            Language::Swift => &SWIFT,
            Language::Dart => &DART,
        }
    }
}

impl FromStr for Language {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.name() == s)
            .ok_or_else(|| CodegenError::UnknownLanguage(s.to_string()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!("kotlin".parse::<Language>().unwrap(), Language::Kotlin);
        assert_eq!("swift".parse::<Language>().unwrap(), Language::Swift);
        assert_eq!("dart".parse::<Language>().unwrap(), Language::Dart);
        let err = "cobol".parse::<Language>().unwrap_err();
        assert!(matches!(err, CodegenError::UnknownLanguage(ref l) if l == "cobol"));
    }

    #[test]
    fn test_default_is_dart() {
        assert_eq!(Language::default(), Language::Dart);
    }

    #[test]
    fn test_only_flat_namespace_targets_skip_fallback() {
        for lang in Language::ALL {
            let caps = lang.capabilities();
            assert!(!(caps.flat_namespace && caps.namespace_fallback.is_some()), "{}", lang);
        }
        assert_eq!(Language::Kotlin.capabilities().namespace_fallback, Some("generated"));
        assert!(Language::Kotlin.capabilities().runtime_asset.is_none());
    }

    #[test]
    fn test_per_service_targets_never_emit_types() {
        for lang in Language::ALL {
            let caps = lang.capabilities();
            assert!(!(caps.granularity == Granularity::PerService && caps.emits_types), "{}", lang);
        }
    }
}
