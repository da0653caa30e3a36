//! Runtime support files bundled into the output next to generated stubs.
//!
//! The files are embedded at build time and copied byte for byte, once per
//! run, for languages whose capabilities name one.

use tracing::debug;

use crate::{driver::GeneratedFile, error::CodegenError, language::Language};

#[derive(Debug)]
pub struct RuntimeAsset {
    pub name:  &'static str,
    pub bytes: &'static [u8],
}

static ASSETS: &[RuntimeAsset] = &[
    RuntimeAsset { name: "kalam.dart", bytes: include_bytes!("../runtime/kalam.dart") },
    RuntimeAsset { name: "kalam.swift", bytes: include_bytes!("../runtime/kalam.swift") },
];

pub fn asset(name: &str) -> Result<&'static RuntimeAsset, CodegenError> {
    ASSETS
        .iter()
        .find(|a| a.name == name)
        .ok_or_else(|| CodegenError::RuntimeAsset {
            name: name.to_string(),
            msg:  "no such embedded asset".to_string(),
        })
}

/// The runtime file for `language`, or `None` when it needs none.
pub fn bundle(language: Language) -> Result<Option<GeneratedFile>, CodegenError> {
    let Some(name) = language.capabilities().runtime_asset else {
        return Ok(None);
    };
    let asset = asset(name)?;
    if asset.bytes.is_empty() {
        return Err(CodegenError::RuntimeAsset {
            name: name.to_string(),
            msg:  "embedded asset is empty".to_string(),
        });
    }
    debug!(asset = name, bytes = asset.bytes.len(), "bundling runtime");
    Ok(Some(GeneratedFile {
        name:    asset.name.to_string(),
        content: asset.bytes.to_vec(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_per_language() {
        assert!(bundle(Language::Kotlin).unwrap().is_none());

        let dart = bundle(Language::Dart).unwrap().unwrap();
        assert_eq!(dart.name, "kalam.dart");
        assert_eq!(dart.content, include_bytes!("../runtime/kalam.dart"));

        let swift = bundle(Language::Swift).unwrap().unwrap();
        assert_eq!(swift.name, "kalam.swift");
    }

    #[test]
    fn test_missing_asset() {
        assert!(matches!(asset("kalam.kt"), Err(CodegenError::RuntimeAsset { .. })));
    }
}
