use crate::ast::Node;
use crate::diagnostic::Diagnostic;
use crate::emit::{self, Emitter};

/// Classification of a generation site: value-producing (expression)
/// or effect-only (statement).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Context {
    Expression,
    Statement,
}

impl std::fmt::Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Context::Expression => write!(f, "expression"),
            Context::Statement => write!(f, "statement"),
        }
    }
}

/// Bitmask of contexts in which a rule is eligible for selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextMask(u8);

impl ContextMask {
    pub const EXPRESSION: ContextMask = ContextMask(0b01);
    pub const STATEMENT: ContextMask = ContextMask(0b10);
    pub const BOTH: ContextMask = ContextMask(0b11);

    pub fn allows(self, ctx: Context) -> bool {
        match ctx {
            Context::Expression => self.0 & Self::EXPRESSION.0 != 0,
            Context::Statement => self.0 & Self::STATEMENT.0 != 0,
        }
    }
}

/// Structural matcher over dispatch-key text. Replaces the regex
/// dispatch of the original rule table; semantics are unchanged:
/// first matching, context-eligible rule wins, table order decides.
#[derive(Clone, Copy, Debug)]
pub enum Matcher {
    /// The key equals this text.
    Exact(&'static str),
    /// The key is one of these texts.
    OneOf(&'static [&'static str]),
    /// The key names a type: a leading `:` sigil.
    TypeSigil,
    /// The key is a C-identifier-shaped name (the call fallback).
    Ident,
}

impl Matcher {
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Matcher::Exact(text) => key == *text,
            Matcher::OneOf(set) => set.iter().any(|text| *text == key),
            Matcher::TypeSigil => key.starts_with(':'),
            Matcher::Ident => is_ident(key),
        }
    }
}

fn is_ident(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// A rule handler. The variant is the rule's declared context: a
/// statement handler emits finished lines through the emitter, an
/// expression handler returns a value-producing text fragment.
#[derive(Clone, Copy)]
pub enum Handler {
    Stmt(fn(&mut Emitter, &Node) -> Result<(), Diagnostic>),
    Expr(fn(&mut Emitter, &Node) -> Result<String, Diagnostic>),
}

pub struct Rule {
    pub matcher: Matcher,
    pub applies_in: ContextMask,
    pub handler: Handler,
}

pub const INFIX_OPS: &[&str] = &["+", "-", "*", "/", "<", ">", "<=", ">=", "=="];

pub const COMPOUND_ASSIGN_OPS: &[&str] = &[
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=",
];

/// The transpilation rule table, built once and never mutated. Order
/// is significant: `<=` must be claimed by the infix rule before the
/// compound-assignment rule could see it, and the call fallback comes
/// last.
pub const RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::Exact("#include"),
        applies_in: ContextMask::STATEMENT,
        handler: Handler::Stmt(emit::rule_include),
    },
    Rule {
        matcher: Matcher::Exact("fn"),
        applies_in: ContextMask::STATEMENT,
        handler: Handler::Stmt(emit::rule_fn),
    },
    Rule {
        matcher: Matcher::Exact("return"),
        applies_in: ContextMask::STATEMENT,
        handler: Handler::Stmt(emit::rule_return),
    },
    Rule {
        matcher: Matcher::Exact("deref"),
        applies_in: ContextMask::BOTH,
        handler: Handler::Expr(emit::rule_deref),
    },
    Rule {
        matcher: Matcher::Exact("decl"),
        applies_in: ContextMask::STATEMENT,
        handler: Handler::Stmt(emit::rule_decl),
    },
    Rule {
        matcher: Matcher::Exact("set"),
        applies_in: ContextMask::STATEMENT,
        handler: Handler::Stmt(emit::rule_set),
    },
    Rule {
        matcher: Matcher::Exact("while"),
        applies_in: ContextMask::STATEMENT,
        handler: Handler::Stmt(emit::rule_while),
    },
    Rule {
        matcher: Matcher::Exact("for"),
        applies_in: ContextMask::STATEMENT,
        handler: Handler::Stmt(emit::rule_for),
    },
    Rule {
        matcher: Matcher::TypeSigil,
        applies_in: ContextMask::BOTH,
        handler: Handler::Expr(emit::rule_cast),
    },
    Rule {
        matcher: Matcher::OneOf(INFIX_OPS),
        applies_in: ContextMask::BOTH,
        handler: Handler::Expr(emit::rule_infix),
    },
    Rule {
        matcher: Matcher::OneOf(COMPOUND_ASSIGN_OPS),
        applies_in: ContextMask::STATEMENT,
        handler: Handler::Stmt(emit::rule_compound_assign),
    },
    Rule {
        matcher: Matcher::Ident,
        applies_in: ContextMask::BOTH,
        handler: Handler::Expr(emit::rule_call),
    },
];

/// First context-eligible rule whose matcher accepts the key. Entries
/// declaring an incompatible context are skipped even when they would
/// otherwise be the first textual match.
pub fn lookup(key: &str, ctx: Context) -> Option<&'static Rule> {
    RULES
        .iter()
        .find(|rule| rule.applies_in.allows(ctx) && rule.matcher.matches(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_allows() {
        assert!(ContextMask::BOTH.allows(Context::Expression));
        assert!(ContextMask::BOTH.allows(Context::Statement));
        assert!(!ContextMask::STATEMENT.allows(Context::Expression));
        assert!(!ContextMask::EXPRESSION.allows(Context::Statement));
    }

    #[test]
    fn test_exact_rules_resolve_in_statement_context() {
        for key in ["#include", "fn", "return", "decl", "set", "while", "for"] {
            let rule = lookup(key, Context::Statement).unwrap();
            assert!(matches!(rule.handler, Handler::Stmt(_)), "key {}", key);
        }
    }

    #[test]
    fn test_statement_rules_skipped_in_expression_context() {
        // `return` is statement-only; in expression context the call
        // fallback claims it instead.
        let rule = lookup("return", Context::Expression).unwrap();
        assert!(matches!(rule.handler, Handler::Expr(_)));
        assert!(matches!(rule.matcher, Matcher::Ident));
    }

    #[test]
    fn test_infix_claims_relational_ops_before_compound_assign() {
        for key in ["<=", ">=", "=="] {
            let rule = lookup(key, Context::Statement).unwrap();
            assert!(matches!(rule.matcher, Matcher::OneOf(ops) if ops == INFIX_OPS));
        }
        let rule = lookup("+=", Context::Statement).unwrap();
        assert!(matches!(rule.matcher, Matcher::OneOf(ops) if ops == COMPOUND_ASSIGN_OPS));
    }

    #[test]
    fn test_type_sigil_dispatch() {
        let rule = lookup(":int", Context::Expression).unwrap();
        assert!(matches!(rule.matcher, Matcher::TypeSigil));
    }

    #[test]
    fn test_unknown_key_matches_nothing() {
        assert!(lookup("@foo", Context::Statement).is_none());
        assert!(lookup("123", Context::Expression).is_none());
        assert!(lookup("", Context::Statement).is_none());
    }

    #[test]
    fn test_ident_fallback() {
        assert!(is_ident("printf"));
        assert!(is_ident("_tmp2"));
        assert!(!is_ident("2fast"));
        assert!(!is_ident("#include"));
        let rule = lookup("printf", Context::Expression).unwrap();
        assert!(matches!(rule.matcher, Matcher::Ident));
    }
}
