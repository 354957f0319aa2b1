//! File-level operations behind the `arkc` subcommands.

use std::fs;
use std::path::{Path, PathBuf};

use ark_language::{BytecodeReader, CompiledProgram, Compiler, CompilerConfig, disassemble};
use tracing::info;

use crate::error::{CliError, Result};

/// Extension given to compiled images.
pub const IMAGE_EXTENSION: &str = "arkc";

/// Returns the default output path for a source file: the same path with
/// its extension replaced by `.arkc`.
#[must_use]
pub fn default_output(input: &Path) -> PathBuf {
    input.with_extension(IMAGE_EXTENSION)
}

/// Builds a compiler configuration that reports errors against `input`.
#[must_use]
pub fn config_for(input: &Path, max_depth: Option<usize>) -> CompilerConfig {
    let config = CompilerConfig::default().with_source_name(input.display().to_string());
    match max_depth {
        Some(depth) => config.with_max_depth(depth),
        None => config,
    }
}

/// Compiles `input` and writes the image to `output` (or the default path).
///
/// Returns the path written.
///
/// # Errors
///
/// Returns an error if the source cannot be read, does not compile, or the
/// image cannot be written.
pub fn compile_file(input: &Path, output: Option<&Path>, config: CompilerConfig) -> Result<PathBuf> {
    let bytes = compile_source(input, config)?;
    let output = output.map_or_else(|| default_output(input), Path::to_path_buf);
    fs::write(&output, &bytes).map_err(|e| CliError::io(&output, e))?;
    info!(input = %input.display(), output = %output.display(), bytes = bytes.len(), "wrote image");
    Ok(output)
}

/// Parses and generates code for `input` without writing anything.
///
/// # Errors
///
/// Returns an error if the source cannot be read or does not compile.
pub fn check_file(input: &Path, config: CompilerConfig) -> Result<CompiledProgram> {
    let source = read_source(input)?;
    let mut compiler = Compiler::with_config(config);
    compiler.feed(&source)?;
    Ok(compiler.generate()?)
}

/// Reads an image and returns its disassembly.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid image.
pub fn disasm_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| CliError::io(path, e))?;
    let image = BytecodeReader::read(&bytes)?;
    Ok(disassemble(&image))
}

fn compile_source(input: &Path, config: CompilerConfig) -> Result<Vec<u8>> {
    let source = read_source(input)?;
    let mut compiler = Compiler::with_config(config);
    compiler.feed(&source)?;
    Ok(compiler.compile()?)
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| CliError::io(path, e))
}
