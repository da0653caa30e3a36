//! Runs one generation pass: IR → template for every file marked for
//! generation, then the runtime bundle once.
//!
//! Output is collected locally and only returned when every step succeeded,
//! so a failure never leaves a partial set of files behind.

use kalam_schema::DescriptorGraph;
use prost_types::compiler::{
    code_generator_response::{Feature, File},
    CodeGeneratorResponse,
};
use tracing::{debug, info};

use crate::{
    error::CodegenError,
    ir::{build_file_data, FileData},
    language::{Capabilities, Granularity},
    naming::to_snake_case,
    options::GeneratorOptions,
    runtime,
    templates::{template_for, Template},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name:    String,
    pub content: Vec<u8>,
}

#[tracing::instrument(skip_all, fields(lang = %options.language))]
pub fn generate(graph: &DescriptorGraph, options: &GeneratorOptions) -> Result<Vec<GeneratedFile>, CodegenError> {
    let template = template_for(options.language);
    let caps = options.language.capabilities();
    let mut output = Vec::new();

    for file in graph.files_to_generate() {
        let data = build_file_data(file, options.language);
        output.extend(render_file(template, &data, caps)?);
    }

    if options.bundle_runtime {
        output.extend(runtime::bundle(options.language)?);
    }

    info!(files = output.len(), "generation finished");
    Ok(output)
}

/// Renders one file's IR using the language's file granularity.
pub fn render_file(
    template: &dyn Template,
    data: &FileData,
    caps: &Capabilities,
) -> Result<Vec<GeneratedFile>, CodegenError> {
    match caps.granularity {
        Granularity::PerFile => {
            debug!(file = %data.file_name, "rendering");
            Ok(vec![GeneratedFile {
                name:    output_name(&data.base_name, None, caps),
                content: template.render(data)?.into_bytes(),
            }])
        }
        Granularity::PerService => data
            .services
            .iter()
            .enumerate()
            .map(|(i, service)| {
                debug!(file = %data.file_name, service = %service.name, "rendering");
                let content = template
                    .render(&data.service_projection(i))
                    .map_err(|e| with_service(e, &service.name))?;
                Ok(GeneratedFile {
                    name:    output_name(&data.base_name, Some(&service.name), caps),
                    content: content.into_bytes(),
                })
            })
            .collect(),
    }
}

/// `pkg/thing` + `.klm.kt` → `pkg/thing.klm.kt`; per-service output adds the
/// snake-cased service name: `pkg/thing_user_service.klm.dart`.
pub fn output_name(base_name: &str, service: Option<&str>, caps: &Capabilities) -> String {
    match service {
        Some(service) => format!("{}_{}{}", base_name, to_snake_case(service), caps.extension),
        None => format!("{}{}", base_name, caps.extension),
    }
}

fn with_service(err: CodegenError, service: &str) -> CodegenError {
    match err {
        CodegenError::Render { file, service: None, msg } => CodegenError::Render {
            file,
            service: Some(service.to_string()),
            msg,
        },
        other => other,
    }
}

pub fn to_response(files: Vec<GeneratedFile>) -> Result<CodeGeneratorResponse, CodegenError> {
    let file = files
        .into_iter()
        .map(|f| {
            let content = String::from_utf8(f.content)
                .map_err(|_| CodegenError::render(&f.name, None, "output is not valid UTF-8"))?;
            Ok(File {
                name: Some(f.name),
                content: Some(content),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>, CodegenError>>()?;

    Ok(CodeGeneratorResponse {
        supported_features: Some(Feature::Proto3Optional as u64),
        file,
        ..Default::default()
    })
}

/// A response that reports `err` to protoc and carries no files.
pub fn error_response(err: &CodegenError) -> CodeGeneratorResponse {
    CodeGeneratorResponse {
        error: Some(err.to_string()),
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    }
}
