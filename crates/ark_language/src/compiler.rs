//! The compiler facade: source in, bytecode image out.
//!
//! ```
//! use ark_language::Compiler;
//!
//! let mut compiler = Compiler::new();
//! compiler.feed("(def x 10)").unwrap();
//! let bytes = compiler.compile().unwrap();
//! assert_eq!(&bytes[..3], b"ark");
//! ```

use ark_foundation::{Error, ErrorContext, ErrorKind, Result};
use tracing::debug;

use crate::ast::Ast;
use crate::codegen::{CodeGenerator, CompiledProgram};
use crate::parser::{DEFAULT_MAX_DEPTH, Parser};
use crate::serialize::Serializer;

/// Compiler settings.
#[derive(Clone, Debug)]
pub struct CompilerConfig {
    /// Maximum list nesting, enforced by both the parser and code generator.
    pub max_depth: usize,
    /// Name of the source (usually a file path) attached to errors.
    pub source_name: Option<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            source_name: None,
        }
    }
}

impl CompilerConfig {
    /// Sets the nesting bound.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the source name reported in errors.
    #[must_use]
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }
}

/// Holds one fed program and turns it into bytecode.
#[derive(Clone, Debug, Default)]
pub struct Compiler {
    config: CompilerConfig,
    program: Vec<Ast>,
}

impl Compiler {
    /// Creates a compiler with default settings and no program.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compiler with the given settings.
    #[must_use]
    pub fn with_config(config: CompilerConfig) -> Self {
        Self {
            config,
            program: Vec::new(),
        }
    }

    /// Returns the settings.
    #[must_use]
    pub const fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Returns the currently fed program.
    #[must_use]
    pub fn program(&self) -> &[Ast] {
        &self.program
    }

    /// Parses `source` and makes it the program to compile.
    ///
    /// Any previously fed program is replaced, even on error.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` for malformed source, or `LimitExceeded` if
    /// lists nest deeper than the configured bound.
    pub fn feed(&mut self, source: &str) -> Result<()> {
        self.program.clear();
        let forms = Parser::with_max_depth(source, self.config.max_depth)
            .parse_all()
            .map_err(|e| self.attach_context(e))?;
        debug!(forms = forms.len(), "parsed program");
        self.program = forms;
        Ok(())
    }

    /// Uses an already-built AST as the program to compile.
    pub fn feed_ast(&mut self, forms: Vec<Ast>) {
        self.program = forms;
    }

    /// Lowers the fed program into pools and code pages.
    ///
    /// # Errors
    ///
    /// Returns `MalformedExpression` or `LimitExceeded`; see
    /// [`CodeGenerator::generate`].
    pub fn generate(&self) -> Result<CompiledProgram> {
        CodeGenerator::with_max_depth(self.config.max_depth)
            .generate(&self.program)
            .map_err(|e| self.attach_context(e))
    }

    /// Compiles the fed program into a bytecode image.
    ///
    /// Compiling the same program twice yields identical bytes.
    ///
    /// # Errors
    ///
    /// Returns any code generation or serialization error.
    pub fn compile(&self) -> Result<Vec<u8>> {
        let program = self.generate()?;
        Serializer::serialize(&program).map_err(|e| self.attach_context(e))
    }

    fn attach_context(&self, mut error: Error) -> Error {
        let position = match &error.kind {
            ErrorKind::ParseError { line, column, .. }
            | ErrorKind::MalformedExpression { line, column, .. } => Some((*line, *column)),
            _ => None,
        };
        if let Some((line, column)) = position {
            error = error.located(line, column);
        }
        if let Some(name) = &self.config.source_name {
            let context = error.context.get_or_insert_with(ErrorContext::new);
            if context.source.is_none() {
                context.source = Some(name.clone());
            }
        }
        error
    }
}

/// Compiles source text with default settings.
///
/// # Errors
///
/// Returns any parse, code generation, or serialization error.
pub fn compile(source: &str) -> Result<Vec<u8>> {
    let mut compiler = Compiler::new();
    compiler.feed(source)?;
    compiler.compile()
}

/// Compiles an already-parsed program with default settings.
///
/// # Errors
///
/// Returns any code generation or serialization error.
pub fn compile_ast(forms: &[Ast]) -> Result<Vec<u8>> {
    let mut compiler = Compiler::new();
    compiler.feed_ast(forms.to_vec());
    compiler.compile()
}
