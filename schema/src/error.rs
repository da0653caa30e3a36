use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Descriptor decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Type \"{type_name}\" referenced from {file} is not declared in the request")]
    UnresolvedType {
        type_name: String,
        file:      String,
    },

    #[error("File \"{file}\" was requested but is not in the descriptor set")]
    UnknownFile { file: String },
}
