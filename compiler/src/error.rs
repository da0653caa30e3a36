use kalam_schema::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No template for language \"{0}\" (expected kotlin, swift or dart)")]
    UnknownLanguage(String),

    #[error("Invalid generator parameter \"{0}\"")]
    InvalidParameter(String),

    #[error("Render error in {file}{}: {msg}", service_suffix(.service))]
    Render {
        file:    String,
        service: Option<String>,
        msg:     String,
    },

    #[error("Runtime asset {name}: {msg}")]
    RuntimeAsset {
        name: String,
        msg:  String,
    },
}

impl CodegenError {
    pub fn render(file: &str, service: Option<&str>, msg: impl Into<String>) -> Self {
        CodegenError::Render {
            file:    file.to_string(),
            service: service.map(str::to_string),
            msg:     msg.into(),
        }
    }
}

fn service_suffix(service: &Option<String>) -> String {
    match service {
        Some(name) => format!(" (service {})", name),
        None => String::new(),
    }
}
