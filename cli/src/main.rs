use clap::Parser;
use prost::Message;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kalam_codegen::{
    driver::{error_response, generate, to_response, GeneratedFile},
    error::CodegenError,
    ir::build_file_data,
    options::GeneratorOptions,
};
use kalam_schema::{request::decode_request, DescriptorGraph};
use prost_types::compiler::CodeGeneratorResponse;

#[derive(Parser)]
#[command(name = "protoc-gen-kalam")]
#[command(
    about = "Generate Kotlin, Swift or Dart RPC clients from protobuf services",
    long_about = "Run without arguments as a protoc plugin (request on stdin, response on stdout), \
                  or pass --descriptor-set to generate from a serialized FileDescriptorSet."
)]
struct Cli {
    /// Serialized `FileDescriptorSet` (`protoc --descriptor_set_out --include_imports`)
    #[arg(long)]
    descriptor_set: Option<PathBuf>,

    /// Output directory for generated files
    #[arg(short, long, default_value = ".", requires = "descriptor_set")]
    out: PathBuf,

    /// Generator options, e.g. `lang=kotlin,runtime=false`
    #[arg(long, default_value = "", requires = "descriptor_set")]
    opt: String,

    /// Schema files in the set to generate (defaults to all of them)
    #[arg(long, num_args = 1.., requires = "descriptor_set")]
    files: Vec<String>,

    /// Print the intermediate representation as JSON instead of rendering
    #[arg(long, requires = "descriptor_set")]
    dump_ir: bool,
}

fn main() -> Result<(), CodegenError> {
    // stdout carries the plugin response, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.descriptor_set {
        None => run_plugin(),
        Some(path) => {
            let bytes = fs::read(path)?;
            let graph = DescriptorGraph::from_descriptor_set(&bytes, &cli.files)?;
            let options = GeneratorOptions::parse(&cli.opt)?;

            if cli.dump_ir {
                let ir: Vec<_> = graph
                    .files_to_generate()
                    .map(|f| build_file_data(f, options.language))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&ir)?);
                return Ok(());
            }

            let files = generate(&graph, &options)?;
            write_files(&cli.out, &files)?;
            println!("Generated {} file(s) in {}", files.len(), cli.out.display());
            Ok(())
        }
    }
}

/// protoc plugin protocol: generation failures are reported in the response,
/// only I/O failures on stdin/stdout abort the process.
fn run_plugin() -> Result<(), CodegenError> {
    let mut input = Vec::new();
    io::stdin().read_to_end(&mut input)?;

    let response = plugin_response(&input).unwrap_or_else(|e| {
        error!("{}", e);
        error_response(&e)
    });

    let mut stdout = io::stdout().lock();
    stdout.write_all(&response.encode_to_vec())?;
    stdout.flush()?;
    Ok(())
}

fn plugin_response(input: &[u8]) -> Result<CodeGeneratorResponse, CodegenError> {
    let request = decode_request(input)?;
    let options = GeneratorOptions::parse(request.parameter())?;
    info!(files = request.file_to_generate.len(), lang = %options.language, "plugin request");

    let graph = DescriptorGraph::from_request(&request)?;
    to_response(generate(&graph, &options)?)
}

/// Writes every file or none of them: contents go to `.kalam-tmp` siblings
/// first and are renamed into place only once all writes succeeded.
fn write_files(out: &Path, files: &[GeneratedFile]) -> Result<(), CodegenError> {
    let targets: Vec<PathBuf> = files.iter().map(|f| out.join(&f.name)).collect();
    for path in &targets {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut staged = Vec::with_capacity(targets.len());
    for (file, path) in files.iter().zip(&targets) {
        let tmp = staging_path(path);
        if let Err(e) = fs::write(&tmp, &file.content) {
            let _ = fs::remove_file(&tmp);
            discard(&staged);
            return Err(e.into());
        }
        staged.push((tmp, path));
    }

    for (tmp, path) in &staged {
        fs::rename(tmp, path)?;
        info!(path = %path.display(), "wrote");
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".kalam-tmp");
    PathBuf::from(name)
}

fn discard(staged: &[(PathBuf, &PathBuf)]) {
    for (tmp, _) in staged {
        let _ = fs::remove_file(tmp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("kalam-cli-{}-{}", std::process::id(), name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn file(name: &str, content: &str) -> GeneratedFile {
        GeneratedFile { name: name.into(), content: content.as_bytes().to_vec() }
    }

    #[test]
    fn test_write_files_creates_nested_dirs() {
        let out = scratch_dir("nested");
        write_files(&out, &[file("pkg/a.klm.kt", "a"), file("kalam.dart", "rt")]).unwrap();

        assert_eq!(fs::read_to_string(out.join("pkg/a.klm.kt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(out.join("kalam.dart")).unwrap(), "rt");
        assert!(!out.join("pkg/a.klm.kt.kalam-tmp").exists());
        fs::remove_dir_all(&out).unwrap();
    }

    #[test]
    fn test_failed_write_leaves_no_files() {
        let out = scratch_dir("partial");
        // A directory where the second file should go makes its write fail.
        fs::create_dir_all(out.join("b.klm.kt.kalam-tmp")).unwrap();

        let err = write_files(&out, &[file("a.klm.kt", "a"), file("b.klm.kt", "b")]);
        assert!(matches!(err, Err(CodegenError::Io(_))));
        assert!(!out.join("a.klm.kt").exists());
        assert!(!out.join("a.klm.kt.kalam-tmp").exists());
        assert!(!out.join("b.klm.kt").exists());
        fs::remove_dir_all(&out).unwrap();
    }
}
