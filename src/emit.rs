use crate::ast::{Node, Sexp};
use crate::diagnostic::Diagnostic;
use crate::rules::{self, Context, Handler};
use crate::span::Pos;

/// C emitter — walks the parsed forest and accumulates output lines.
/// Dispatch goes through the rule table; the ambient context decides
/// which rules are eligible and whether a bridging `;` is owed.
pub struct Emitter {
    output: Vec<String>,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self { output: Vec::new() }
    }

    /// Transpile a whole forest. Top-level forms are statement sites.
    /// Aborts on the first generation error, with the offending node's
    /// position attached.
    pub fn emit_forest(mut self, forest: &[Node]) -> Result<Vec<String>, Diagnostic> {
        for node in forest {
            self.stmt(node)?;
        }
        Ok(self.output)
    }

    fn raw(&mut self, line: &str) {
        self.output.push(line.to_string());
    }

    /// `#line` marker tying the next emitted line to its original row,
    /// so downstream C compiler diagnostics point at the .sic source.
    fn line_marker(&mut self, pos: Pos) {
        self.raw(&format!("#line {}", pos.line()));
    }

    /// Generate a node at a statement (effect-only) site.
    pub fn stmt(&mut self, node: &Node) -> Result<(), Diagnostic> {
        match &node.node {
            Sexp::Atom(text) => {
                self.line_marker(node.span.begin);
                self.raw(&format!("{};", text));
                Ok(())
            }
            Sexp::List(_) => {
                let rule = self.select_rule(node, Context::Statement)?;
                match rule.handler {
                    Handler::Stmt(handler) => handler(self, node),
                    Handler::Expr(handler) => {
                        // An expression rule landed in a statement
                        // site: bridge with exactly one terminator.
                        let text = handler(self, node)?;
                        self.line_marker(node.span.begin);
                        self.raw(&format!("{};", text));
                        Ok(())
                    }
                }
            }
        }
    }

    /// Generate a node at an expression (value-producing) site,
    /// returning the emitted fragment.
    pub fn expr(&mut self, node: &Node) -> Result<String, Diagnostic> {
        match &node.node {
            Sexp::Atom(text) => Ok(text.clone()),
            Sexp::List(_) => {
                let rule = self.select_rule(node, Context::Expression)?;
                match rule.handler {
                    Handler::Expr(handler) => handler(self, node),
                    Handler::Stmt(_) => Err(Diagnostic::error(
                        format!(
                            "`{}` is a statement form and cannot produce a value",
                            key(node)
                        ),
                        node.span,
                    )),
                }
            }
        }
    }

    fn select_rule(&self, node: &Node, ctx: Context) -> Result<&'static rules::Rule, Diagnostic> {
        let key = node.node.dispatch_key().ok_or_else(|| {
            Diagnostic::error(
                "malformed form: the first element of a list must be an atom".to_string(),
                node.span,
            )
        })?;

        rules::lookup(key, ctx).ok_or_else(|| {
            Diagnostic::error(
                format!("no matching rule for `{}` in {} context", key, ctx),
                node.span,
            )
            .with_note(format!("dispatch considers only {}-eligible rules", ctx))
        })
    }
}

/// The dispatch key. Handlers are only ever invoked on lists whose
/// first child is an atom; dispatch established that.
fn key(node: &Node) -> &str {
    node.node.dispatch_key().unwrap_or_default()
}

fn children(node: &Node) -> &[Node] {
    node.node.as_list().unwrap_or(&[])
}

fn malformed(node: &Node, detail: String) -> Diagnostic {
    Diagnostic::error(format!("malformed `{}` form: {}", key(node), detail), node.span)
}

fn expect_arity(node: &Node, min: usize) -> Result<&[Node], Diagnostic> {
    let kids = children(node);
    if kids.len() < min {
        return Err(malformed(
            node,
            format!("expected at least {} elements, found {}", min, kids.len()),
        ));
    }
    Ok(kids)
}

fn expect_exact_arity(node: &Node, count: usize) -> Result<&[Node], Diagnostic> {
    let kids = children(node);
    if kids.len() != count {
        return Err(malformed(
            node,
            format!("expected exactly {} elements, found {}", count, kids.len()),
        ));
    }
    Ok(kids)
}

fn expect_atom<'n>(parent: &Node, child: &'n Node, what: &str) -> Result<&'n str, Diagnostic> {
    child
        .node
        .as_atom()
        .ok_or_else(|| malformed(parent, format!("expected an atom for {}", what)))
}

/// A type atom carries a leading `:` sigil; strip exactly one.
fn expect_type<'n>(parent: &Node, child: &'n Node) -> Result<&'n str, Diagnostic> {
    let text = expect_atom(parent, child, "a type")?;
    text.strip_prefix(':').ok_or_else(|| {
        malformed(
            parent,
            format!("`{}` does not name a type (types start with `:`)", text),
        )
    })
}

// ── Rule handlers ──
// Statement handlers push finished lines; expression handlers return
// a fragment for the enclosing site to place.

/// `(#include A...)` → one `#include <A>` per trailing atom.
pub(crate) fn rule_include(em: &mut Emitter, node: &Node) -> Result<(), Diagnostic> {
    let kids = expect_arity(node, 2)?;
    for header in &kids[1..] {
        let name = expect_atom(node, header, "a header name")?;
        em.line_marker(header.span.begin);
        em.raw(&format!("#include <{}>", name));
    }
    Ok(())
}

/// `(fn NAME :TYPE (ARG :TY ...) BODY...)` → a C function definition.
pub(crate) fn rule_fn(em: &mut Emitter, node: &Node) -> Result<(), Diagnostic> {
    let kids = expect_arity(node, 5)?;
    let name = expect_atom(node, &kids[1], "the function name")?;
    let ret_ty = expect_type(node, &kids[2])?;
    let params = kids[3]
        .node
        .as_list()
        .ok_or_else(|| malformed(node, "expected a parameter list".to_string()))?;

    if params.len() % 2 != 0 {
        return Err(malformed(
            node,
            "parameter list expects name/type pairs".to_string(),
        ));
    }

    let mut rendered = Vec::new();
    for pair in params.chunks(2) {
        let arg_name = expect_atom(node, &pair[0], "a parameter name")?;
        let arg_ty = expect_type(node, &pair[1])?;
        rendered.push(format!("{} {}", arg_ty, arg_name));
    }

    em.line_marker(kids[1].span.begin);
    em.raw(&format!("{} {}({}) {{", ret_ty, name, rendered.join(", ")));
    for body in &kids[4..] {
        em.stmt(body)?;
    }
    em.raw("}");
    Ok(())
}

/// `(return EXPR)` → `return EXPR;` for an atom, `return ( ... );`
/// for a compound expression.
pub(crate) fn rule_return(em: &mut Emitter, node: &Node) -> Result<(), Diagnostic> {
    let kids = expect_exact_arity(node, 2)?;
    let value = &kids[1];
    match value.node.as_atom() {
        Some(text) => {
            em.line_marker(value.span.begin);
            em.raw(&format!("return {};", text));
        }
        None => {
            let text = em.expr(value)?;
            em.line_marker(value.span.begin);
            em.raw(&format!("return ( {} );", text));
        }
    }
    Ok(())
}

/// `(deref EXPR)` → `*( ... )`.
pub(crate) fn rule_deref(em: &mut Emitter, node: &Node) -> Result<String, Diagnostic> {
    let kids = expect_exact_arity(node, 2)?;
    let inner = em.expr(&kids[1])?;
    Ok(format!("*( {} )", inner))
}

/// `(decl NAME :TYPE [INIT])` → `TYPE NAME;` or `TYPE NAME = ( ... );`.
pub(crate) fn rule_decl(em: &mut Emitter, node: &Node) -> Result<(), Diagnostic> {
    let kids = children(node);
    if kids.len() != 3 && kids.len() != 4 {
        return Err(malformed(
            node,
            format!("expected 3 or 4 elements, found {}", kids.len()),
        ));
    }
    let name = expect_atom(node, &kids[1], "the variable name")?;
    let ty = expect_type(node, &kids[2])?;
    match kids.get(3) {
        None => {
            em.line_marker(node.span.begin);
            em.raw(&format!("{} {};", ty, name));
        }
        Some(init) => {
            let init = em.expr(init)?;
            em.line_marker(node.span.begin);
            em.raw(&format!("{} {} = ( {} );", ty, name, init));
        }
    }
    Ok(())
}

/// `(set NAME EXPR)` → `NAME = ( ... );`.
pub(crate) fn rule_set(em: &mut Emitter, node: &Node) -> Result<(), Diagnostic> {
    let kids = expect_exact_arity(node, 3)?;
    let name = expect_atom(node, &kids[1], "the assignment target")?;
    let value = em.expr(&kids[2])?;
    em.line_marker(node.span.begin);
    em.raw(&format!("{} = ( {} );", name, value));
    Ok(())
}

/// `(while COND BODY...)` → `while ( ... ) { ... }`.
pub(crate) fn rule_while(em: &mut Emitter, node: &Node) -> Result<(), Diagnostic> {
    let kids = expect_arity(node, 2)?;
    let cond = em.expr(&kids[1])?;
    em.line_marker(node.span.begin);
    em.raw(&format!("while ( {} ) {{", cond));
    for body in &kids[2..] {
        em.stmt(body)?;
    }
    em.raw("}");
    Ok(())
}

/// `(for INIT COND STEP BODY...)` → `for ( ...; ...; ... ) { ... }`.
/// The body starts at the fourth element and may be empty.
pub(crate) fn rule_for(em: &mut Emitter, node: &Node) -> Result<(), Diagnostic> {
    let kids = expect_arity(node, 4)?;
    let init = em.expr(&kids[1])?;
    let cond = em.expr(&kids[2])?;
    let step = em.expr(&kids[3])?;
    em.line_marker(node.span.begin);
    em.raw(&format!("for ( {}; {}; {} ) {{", init, cond, step));
    for body in &kids[4..] {
        em.stmt(body)?;
    }
    em.raw("}");
    Ok(())
}

/// `(:TYPE EXPR)` → `( (TYPE) ... )`.
pub(crate) fn rule_cast(em: &mut Emitter, node: &Node) -> Result<String, Diagnostic> {
    let kids = expect_exact_arity(node, 2)?;
    let ty = expect_type(node, &kids[0])?;
    let inner = em.expr(&kids[1])?;
    Ok(format!("( ({}) {} )", ty, inner))
}

/// `(OP A B ...)` → a left-to-right parenthesized infix chain.
pub(crate) fn rule_infix(em: &mut Emitter, node: &Node) -> Result<String, Diagnostic> {
    let kids = expect_arity(node, 3)?;
    let op = key(node).to_string();
    let mut operands = Vec::new();
    for operand in &kids[1..] {
        operands.push(em.expr(operand)?);
    }
    Ok(format!("( {} )", operands.join(&format!(" {} ", op))))
}

/// Compound assignment is recognized but not yet translated; surface
/// that instead of dropping the statement.
pub(crate) fn rule_compound_assign(_em: &mut Emitter, node: &Node) -> Result<(), Diagnostic> {
    Err(Diagnostic::error(
        format!("compound assignment `{}` is not yet supported", key(node)),
        node.span,
    )
    .with_help(format!(
        "write `(set X ({} X VALUE))` instead",
        key(node).trim_end_matches('=')
    )))
}

/// `(NAME ARG...)` fallback → `NAME(ARG, ...)`.
pub(crate) fn rule_call(em: &mut Emitter, node: &Node) -> Result<String, Diagnostic> {
    let kids = expect_arity(node, 1)?;
    let name = key(node).to_string();
    let mut args = Vec::new();
    for arg in &kids[1..] {
        args.push(em.expr(arg)?);
    }
    Ok(format!("{}({})", name, args.join(", ")))
}
