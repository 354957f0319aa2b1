//! Code generation: lowering the AST into code pages.
//!
//! Page 0 holds the top-level program. Each `fun` form allocates a fresh page
//! for its body; the enclosing page only receives a `MAKE_CLOSURE` naming it.
//! Pages are numbered in allocation order, so a closure nested inside another
//! closure's body always gets a higher index than its parent.

use std::collections::HashSet;

use ark_foundation::{CompileLimit, Constant, Error, ErrorKind, Pool, Result};
use tracing::{debug, trace};

use crate::ast::{Ast, Keyword};
use crate::opcode::{CodePage, Instruction};
use crate::parser::DEFAULT_MAX_DEPTH;
use crate::span::Span;

/// Maximum number of code pages (page indices are 16-bit).
pub const MAX_PAGES: usize = u16::MAX as usize + 1;

/// Maximum number of instructions in a page (the segment count is 16-bit).
pub const MAX_INSTRUCTIONS: usize = u16::MAX as usize;

/// Maximum arguments to a call or parameters to a closure.
pub const MAX_ARGUMENTS: usize = u16::MAX as usize;

/// The in-memory result of code generation.
#[derive(Clone, Debug)]
pub struct CompiledProgram {
    /// Interned symbol names.
    pub symbols: Pool<String>,
    /// Interned literal constants.
    pub constants: Pool<Constant>,
    /// Code pages; empty for an empty program.
    pub pages: Vec<CodePage>,
}

impl CompiledProgram {
    /// Returns a page by index.
    #[must_use]
    pub fn page(&self, idx: usize) -> Option<&CodePage> {
        self.pages.get(idx)
    }

    /// Returns the total number of instructions over all pages.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.pages.iter().map(CodePage::len).sum()
    }
}

/// Lowers a program's forms into pools and code pages.
///
/// A generator is single-use: [`CodeGenerator::generate`] consumes it.
pub struct CodeGenerator {
    /// Symbol pool.
    symbols: Pool<String>,
    /// Constant pool.
    constants: Pool<Constant>,
    /// Pages in allocation order.
    pages: Vec<CodePage>,
    /// Current list nesting depth.
    depth: usize,
    /// Maximum list nesting depth.
    max_depth: usize,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator {
    /// Creates a generator with the default nesting bound.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Creates a generator with a custom nesting bound.
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            symbols: Pool::new("symbol"),
            constants: Pool::new("constant"),
            pages: Vec::new(),
            depth: 0,
            max_depth,
        }
    }

    /// Generates code for a whole program.
    ///
    /// Top-level forms are compiled into page 0, separated by `POP`. The
    /// value of the last form is left on the stack. An empty program
    /// allocates no pages.
    ///
    /// # Errors
    ///
    /// Returns `MalformedExpression` for shapes that cannot be lowered, or
    /// `LimitExceeded` when a format or nesting bound is hit.
    pub fn generate(mut self, forms: &[Ast]) -> Result<CompiledProgram> {
        if !forms.is_empty() {
            let main = self.alloc_page()?;
            for (i, form) in forms.iter().enumerate() {
                self.compile_expr(form, main)?;
                if i + 1 < forms.len() {
                    self.emit(main, Instruction::Pop)?;
                }
            }
        }

        debug!(
            symbols = self.symbols.len(),
            constants = self.constants.len(),
            pages = self.pages.len(),
            "generated program"
        );

        Ok(CompiledProgram {
            symbols: self.symbols,
            constants: self.constants,
            pages: self.pages,
        })
    }

    // === Expressions ===

    fn compile_expr(&mut self, ast: &Ast, page: u16) -> Result<()> {
        let span = ast.span();
        self.compile_node(ast, page).map_err(|e| {
            if matches!(e.kind, ErrorKind::LimitExceeded(_)) {
                e.located(span.line, span.column)
            } else {
                e
            }
        })
    }

    fn compile_node(&mut self, ast: &Ast, page: u16) -> Result<()> {
        match ast {
            Ast::Symbol(name, _) => {
                let idx = self.symbols.intern(name.clone())?;
                self.emit(page, Instruction::LoadSymbol(idx))?;
            }
            Ast::Number(n, _) => {
                let idx = self.constants.intern(Constant::Number(n.clone()))?;
                self.emit(page, Instruction::LoadConst(idx))?;
            }
            Ast::String(s, _) => {
                let idx = self.constants.intern(Constant::string(s.as_str()))?;
                self.emit(page, Instruction::LoadConst(idx))?;
            }
            Ast::Keyword(k, span) => {
                return Err(malformed(*span, format!("keyword `{k}` cannot be used as a value")));
            }
            Ast::List(elements, span) => {
                if self.depth >= self.max_depth {
                    return Err(Error::limit_exceeded(CompileLimit::MaxDepth {
                        limit: self.max_depth,
                    }));
                }
                self.depth += 1;
                let result = self.compile_list(elements, *span, page);
                self.depth -= 1;
                result?;
            }
        }
        Ok(())
    }

    fn compile_list(&mut self, elements: &[Ast], span: Span, page: u16) -> Result<()> {
        let Some((head, args)) = elements.split_first() else {
            return Err(malformed(span, "empty list cannot be evaluated"));
        };

        match head {
            Ast::Keyword(k, _) => match k {
                Keyword::If => self.compile_if(args, span, page),
                Keyword::Set | Keyword::Def => self.compile_binding(*k, args, span, page),
                Keyword::Fun => self.compile_fun(args, span, page),
                Keyword::Begin => self.compile_begin(args, span, page),
                Keyword::While => self.compile_while(args, span, page),
            },
            Ast::Symbol(..) | Ast::List(..) => self.compile_call(head, args, page),
            other => Err(malformed(
                other.span(),
                format!("cannot call a {}", other.type_name()),
            )),
        }
    }

    /// `(if c t e)`
    fn compile_if(&mut self, args: &[Ast], span: Span, page: u16) -> Result<()> {
        let [cond, then, otherwise] = args else {
            return Err(malformed(
                span,
                "if requires exactly 3 arguments (cond then else)",
            ));
        };

        self.compile_expr(cond, page)?;
        let to_else = self.emit(page, Instruction::PopJumpIfFalse(0))?;
        self.compile_expr(then, page)?;
        let to_end = self.emit(page, Instruction::Jump(0))?;

        let else_target = self.page(page).byte_len();
        self.patch(page, to_else, else_target)?;
        self.compile_expr(otherwise, page)?;

        let end_target = self.page(page).byte_len();
        self.patch(page, to_end, end_target)
    }

    /// `(def name e)` and `(set name e)`
    fn compile_binding(
        &mut self,
        keyword: Keyword,
        args: &[Ast],
        span: Span,
        page: u16,
    ) -> Result<()> {
        let [target, value] = args else {
            return Err(malformed(
                span,
                format!("{keyword} requires exactly 2 arguments (name value)"),
            ));
        };
        let Ast::Symbol(name, _) = target else {
            return Err(malformed(
                target.span(),
                format!("{keyword} name must be a symbol, found {}", target.type_name()),
            ));
        };

        self.compile_expr(value, page)?;
        let idx = self.symbols.intern(name.clone())?;
        let instruction = if keyword == Keyword::Def {
            Instruction::Let(idx)
        } else {
            Instruction::Store(idx)
        };
        self.emit(page, instruction)?;
        Ok(())
    }

    /// `(fun (p...) body)`
    fn compile_fun(&mut self, args: &[Ast], span: Span, page: u16) -> Result<()> {
        let [params, body] = args else {
            return Err(malformed(
                span,
                "fun requires a parameter list and exactly one body expression",
            ));
        };
        let Ast::List(params, _) = params else {
            return Err(malformed(
                params.span(),
                format!("fun parameters must be a list, found {}", params.type_name()),
            ));
        };
        if params.len() > MAX_ARGUMENTS {
            return Err(Error::limit_exceeded(CompileLimit::TooManyArguments {
                count: params.len(),
                limit: MAX_ARGUMENTS,
            }));
        }

        let mut param_indices = Vec::with_capacity(params.len());
        let mut seen = HashSet::with_capacity(params.len());
        for param in params {
            let Ast::Symbol(name, _) = param else {
                return Err(malformed(
                    param.span(),
                    format!("fun parameter must be a symbol, found {}", param.type_name()),
                ));
            };
            let idx = self.symbols.intern(name.clone())?;
            if !seen.insert(idx) {
                return Err(malformed(
                    param.span(),
                    format!("duplicate fun parameter `{name}`"),
                ));
            }
            param_indices.push(idx);
        }

        let body_page = self.alloc_page()?;
        self.compile_expr(body, body_page)?;
        self.emit(body_page, Instruction::Ret)?;

        self.emit(
            page,
            Instruction::MakeClosure {
                page: body_page,
                params: param_indices,
            },
        )?;
        Ok(())
    }

    /// `(begin e1 ... en)`
    fn compile_begin(&mut self, args: &[Ast], span: Span, page: u16) -> Result<()> {
        if args.is_empty() {
            return Err(malformed(span, "begin requires at least one expression"));
        }
        for (i, expr) in args.iter().enumerate() {
            self.compile_expr(expr, page)?;
            if i + 1 < args.len() {
                self.emit(page, Instruction::Pop)?;
            }
        }
        Ok(())
    }

    /// `(while c body)`
    fn compile_while(&mut self, args: &[Ast], span: Span, page: u16) -> Result<()> {
        let [cond, body] = args else {
            return Err(malformed(
                span,
                "while requires exactly 2 arguments (cond body)",
            ));
        };

        let top = self.page(page).byte_len();
        self.compile_expr(cond, page)?;
        let to_exit = self.emit(page, Instruction::PopJumpIfFalse(0))?;
        self.compile_expr(body, page)?;
        self.emit(page, Instruction::Pop)?;
        let to_top = self.emit(page, Instruction::Jump(0))?;
        self.patch(page, to_top, top)?;

        let exit = self.page(page).byte_len();
        self.patch(page, to_exit, exit)?;
        self.emit(page, Instruction::PushNil)?;
        Ok(())
    }

    /// `(f a1 ... an)`
    fn compile_call(&mut self, callee: &Ast, args: &[Ast], page: u16) -> Result<()> {
        let argc = u16::try_from(args.len()).map_err(|_| {
            Error::limit_exceeded(CompileLimit::TooManyArguments {
                count: args.len(),
                limit: MAX_ARGUMENTS,
            })
        })?;

        self.compile_expr(callee, page)?;
        for arg in args {
            self.compile_expr(arg, page)?;
        }
        self.emit(page, Instruction::Call(argc))?;
        Ok(())
    }

    // === Pages ===

    fn alloc_page(&mut self) -> Result<u16> {
        let idx = u16::try_from(self.pages.len())
            .map_err(|_| Error::limit_exceeded(CompileLimit::TooManyPages { limit: MAX_PAGES }))?;
        self.pages.push(CodePage::new());
        trace!(page = idx, "allocated code page");
        Ok(idx)
    }

    fn page(&self, page: u16) -> &CodePage {
        &self.pages[usize::from(page)]
    }

    fn emit(&mut self, page: u16, instruction: Instruction) -> Result<usize> {
        let code = &mut self.pages[usize::from(page)];
        if code.len() >= MAX_INSTRUCTIONS {
            return Err(Error::limit_exceeded(CompileLimit::TooManyInstructions {
                page,
                limit: MAX_INSTRUCTIONS,
            }));
        }
        Ok(code.emit(instruction))
    }

    fn patch(&mut self, page: u16, instruction: usize, target: usize) -> Result<()> {
        self.pages[usize::from(page)].patch_branch(page, instruction, target)?;
        trace!(page, instruction, target, "patched branch");
        Ok(())
    }
}

fn malformed(span: Span, message: impl Into<String>) -> Error {
    Error::malformed(message, span.line, span.column)
}

/// Generates code for a sequence of top-level forms with default settings.
///
/// # Errors
///
/// See [`CodeGenerator::generate`].
pub fn generate(forms: &[Ast]) -> Result<CompiledProgram> {
    CodeGenerator::new().generate(forms)
}
