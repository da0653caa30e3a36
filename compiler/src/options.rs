use std::str::FromStr;

use tracing::warn;

use crate::{error::CodegenError, language::Language};

/// Options protoc passes through `--kalam_opt=key=value,...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub language:       Language,
    /// Copy the runtime support file into the output (`runtime=false` skips it).
    pub bundle_runtime: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            language:       Language::default(),
            bundle_runtime: true,
        }
    }
}

impl GeneratorOptions {
    pub fn parse(param: &str) -> Result<Self, CodegenError> {
        let mut opts = GeneratorOptions::default();

        for part in param.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((key, value)) = part.split_once('=') else {
                return Err(CodegenError::InvalidParameter(part.to_string()));
            };
            match key.trim() {
                "lang" => opts.language = value.trim().parse()?,
                "runtime" => {
                    opts.bundle_runtime = match value.trim() {
                        "true" => true,
                        "false" => false,
                        _ => return Err(CodegenError::InvalidParameter(part.to_string())),
                    }
                }
                other => warn!(key = other, "ignoring unknown generator option"),
            }
        }

        Ok(opts)
    }
}

impl FromStr for GeneratorOptions {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeneratorOptions::parse(s)
    }
}
