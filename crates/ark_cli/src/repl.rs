//! The interactive REPL.
//!
//! Each complete input is compiled as a standalone program and its bytecode
//! is printed, either as a disassembly listing or as a hex dump.

use std::io::{self, Write};

use ark_language::{BytecodeReader, Compiler, CompilerConfig, disassemble};

use crate::editor::{LineEditor, ReadResult, RustylineEditor, is_complete};
use crate::error::{CliError, Result};

/// REPL meta-commands and their help text.
pub const COMMANDS: [(&str, &str); 4] = [
    (":help", "show this help"),
    (":hex", "toggle hex dump output"),
    (":depth", "show or set the nesting limit, e.g. `:depth 64`"),
    (":quit", "exit the REPL"),
];

/// How compiled input is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Disassembly listing.
    Listing,
    /// Raw image bytes in hex.
    Hex,
}

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// Settings applied to every compilation.
    config: CompilerConfig,

    /// How output is rendered.
    mode: OutputMode,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,

    /// Continuation prompt (for multi-line input).
    continuation_prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new() -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(editor: E) -> Self {
        Self {
            editor,
            config: CompilerConfig::default().with_source_name("<repl>"),
            mode: OutputMode::Listing,
            show_banner: true,
            prompt: "ark> ".to_string(),
            continuation_prompt: "...  ".to_string(),
        }
    }

    /// Sets the compiler configuration.
    #[must_use]
    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Returns the current output mode.
    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Runs the REPL loop.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        loop {
            match self.read_eval_print() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e @ (CliError::Editor(_) | CliError::UnexpectedEof)) => return Err(e),
                Err(e) => self.print_error(&e),
            }
        }

        println!();
        Ok(())
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let Some(input) = self.read_input()? else {
            return Ok(false); // EOF
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(true);
        }
        self.editor.add_history(&input);

        if trimmed.starts_with(':') {
            return self.command(trimmed);
        }

        let output = self.eval(&input)?;
        print!("{output}");
        let _ = io::stdout().flush();
        Ok(true)
    }

    /// Reads a potentially multi-line input.
    fn read_input(&mut self) -> Result<Option<String>> {
        let mut input = String::new();
        let mut first_line = true;

        loop {
            let prompt = if first_line {
                &self.prompt
            } else {
                &self.continuation_prompt
            };

            match self.editor.read_line(prompt)? {
                ReadResult::Line(line) => {
                    if !first_line {
                        input.push('\n');
                    }
                    input.push_str(&line);

                    if is_complete(&input) {
                        return Ok(Some(input));
                    }
                    first_line = false;
                }
                ReadResult::Interrupted => {
                    if !first_line {
                        println!("\nInput cancelled.");
                    }
                    return Ok(Some(String::new()));
                }
                ReadResult::Eof => {
                    if first_line {
                        return Ok(None);
                    }
                    return Err(CliError::UnexpectedEof);
                }
            }
        }
    }

    /// Compiles `input` and renders it in the current output mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not compile.
    pub fn eval(&self, input: &str) -> Result<String> {
        let mut compiler = Compiler::with_config(self.config.clone());
        compiler.feed(input)?;
        let bytes = compiler.compile()?;

        Ok(match self.mode {
            OutputMode::Listing => disassemble(&BytecodeReader::read(&bytes)?),
            OutputMode::Hex => hex_dump(&bytes),
        })
    }

    /// Handles a `:command` line.
    fn command(&mut self, line: &str) -> Result<bool> {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        match name {
            ":quit" | ":q" => return Ok(false),
            ":help" => {
                for (name, help) in COMMANDS {
                    println!("  {name:<8} {help}");
                }
            }
            ":hex" => {
                self.mode = match self.mode {
                    OutputMode::Listing => OutputMode::Hex,
                    OutputMode::Hex => OutputMode::Listing,
                };
                println!("output: {:?}", self.mode);
            }
            ":depth" => match arg.map(str::parse::<usize>) {
                None => println!("max depth: {}", self.config.max_depth),
                Some(Ok(depth)) if depth > 0 => {
                    self.config.max_depth = depth;
                    println!("max depth: {depth}");
                }
                Some(_) => eprintln!("\x1b[31m:depth expects a positive integer\x1b[0m"),
            },
            other => eprintln!("\x1b[31munknown command {other}; try :help\x1b[0m"),
        }
        Ok(true)
    }

    /// Prints an error to stderr.
    #[allow(clippy::unused_self)]
    fn print_error(&self, error: &CliError) {
        eprintln!("\x1b[31mError: {error}\x1b[0m");
    }

    /// Prints the welcome banner.
    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        println!("\x1b[1;36mArk bytecode compiler v{}\x1b[0m", env!("CARGO_PKG_VERSION"));
        println!("Type expressions to see their bytecode. :help for commands, Ctrl+D to exit.\n");
        let _ = io::stdout().flush();
    }
}

/// Formats bytes as 16 hex pairs per line, prefixed by the offset.
#[must_use]
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let pairs: String = chunk.iter().map(|byte| format!(" {byte:02x}")).collect();
            format!("{:04x} {pairs}\n", row * 16)
        })
        .collect()
}
