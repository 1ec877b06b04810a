use proptest::prelude::*;
use sicc::ast::{Node, Sexp};
use sicc::parser::Parser;
use sicc::transpile_source_silent;

/// Helper: transpile a program, panicking with its diagnostics on
/// failure.
fn transpile(source: &str) -> String {
    transpile_source_silent(source)
        .unwrap_or_else(|errs| {
            panic!(
                "program should transpile, got {} errors: {:?}",
                errs.len(),
                errs.iter().map(|e| &e.message).collect::<Vec<_>>()
            );
        })
        .join("\n")
}

// ── Whole programs ──

#[test]
fn test_hello_style_program() {
    let output = transpile(
        "(#include stdio.h)\n\n(fn main :int ()\n  (decl i :int 0)\n  (while (< i 3)\n    (printf \"%d\\n\" i)\n    (set i (+ i 1)))\n  (return 0))",
    );
    insta::assert_snapshot!(output, @r#"
#line 1
#include <stdio.h>
#line 3
int main() {
#line 4
int i = ( 0 );
#line 5
while ( ( i < 3 ) ) {
#line 6
printf("%d\n", i);
#line 7
i = ( ( i + 1 ) );
}
#line 8
return 0;
}
"#);
}

#[test]
fn test_add_function_per_contract() {
    let output = transpile("(fn add :int (a :int b :int) (return (+ a b)))");
    assert!(output.contains("int add(int a, int b) {"));
    assert!(output.contains("return ( ( a + b ) );"));
}

#[test]
fn test_pointer_and_cast_program() {
    let output = transpile(
        "(fn read_first :long (p :int*)\n  (decl v :int (deref p))\n  (return (:long v)))",
    );
    assert!(output.contains("long read_first(int* p) {"));
    assert!(output.contains("int v = ( *( p ) );"));
    assert!(output.contains("return ( ( (long) v ) );"));
}

#[test]
fn test_for_loop_program() {
    let output = transpile(
        "(fn sum_to :int (n :int)\n  (decl acc :int 0)\n  (for (set_zero i) (< i n) (bump i)\n    (set acc (+ acc i)))\n  (return acc))",
    );
    assert!(output.contains("for ( set_zero(i); ( i < n ); bump(i) ) {"));
    assert!(output.contains("acc = ( ( acc + i ) );"));
}

// ── Error paths: no output when anything failed ──

#[test]
fn test_unbalanced_paren_fails() {
    let errs = transpile_source_silent("(fn f :int () (return 0)))").unwrap_err();
    assert!(errs[0].message.contains("unbalanced"));
}

#[test]
fn test_unterminated_list_fails() {
    let errs = transpile_source_silent("(fn f :int () (return 0)").unwrap_err();
    assert!(errs[0].message.contains("unterminated"));
}

#[test]
fn test_unterminated_quote_fails() {
    let errs = transpile_source_silent("(puts \"hello)").unwrap_err();
    assert!(errs[0].message.contains("unterminated"));
}

#[test]
fn test_unknown_form_fails() {
    let errs = transpile_source_silent("(fn f :int () (@@ 1 2))").unwrap_err();
    assert!(errs[0].message.contains("no matching rule"));
}

#[test]
fn test_compound_assignment_is_reported() {
    let errs = transpile_source_silent("(fn f :int (x :int) (+= x 1) (return x))").unwrap_err();
    assert!(errs[0].message.contains("not yet supported"));
}

// ── File-level plumbing ──

#[test]
fn test_transpile_file_roundtrip() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let input = dir.path().join("hello.sic");
    let output = dir.path().join("hello.c");

    std::fs::write(&input, "(#include stdio.h)\n(fn main :int () (return 0))\n")
        .expect("write input");

    let source = std::fs::read_to_string(&input).expect("read input");
    let lines = transpile_source_silent(&source).expect("transpile");
    std::fs::write(&output, lines.join("\n") + "\n").expect("write output");

    let c_text = std::fs::read_to_string(&output).expect("read output");
    assert!(c_text.contains("#include <stdio.h>"));
    assert!(c_text.contains("int main() {"));
    assert!(c_text.ends_with("}\n"));
}

// ── Parser property: balanced, quote-free inputs ──

#[derive(Clone, Debug)]
enum Tree {
    Atom(String),
    List(Vec<Tree>),
}

fn tree_strategy() -> impl Strategy<Value = Tree> {
    let atom = "[a-z][a-z0-9_]{0,5}".prop_map(Tree::Atom);
    atom.prop_recursive(4, 24, 5, |inner| {
        prop::collection::vec(inner, 0..5).prop_map(Tree::List)
    })
}

fn render(tree: &Tree, out: &mut String) {
    match tree {
        Tree::Atom(text) => out.push_str(text),
        Tree::List(children) => {
            out.push('(');
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                render(child, out);
            }
            out.push(')');
        }
    }
}

fn expected_count(tree: &Tree) -> usize {
    match tree {
        Tree::Atom(_) => 1,
        Tree::List(children) => 1 + children.iter().map(expected_count).sum::<usize>(),
    }
}

fn parsed_count(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|node| match &node.node {
            Sexp::Atom(_) => 1,
            Sexp::List(children) => 1 + parsed_count(children),
        })
        .sum()
}

fn assert_spans_ordered(nodes: &[Node]) {
    for node in nodes {
        assert!(node.span.begin <= node.span.end);
        if let Sexp::List(children) = &node.node {
            assert_spans_ordered(children);
        }
    }
}

proptest! {
    #[test]
    fn parse_terminates_and_counts_nodes(forest in prop::collection::vec(tree_strategy(), 0..5)) {
        let mut source = String::new();
        for tree in &forest {
            render(tree, &mut source);
            source.push('\n');
        }

        let parsed = Parser::new(&source).parse_forest().unwrap();
        let expected: usize = forest.iter().map(expected_count).sum();
        prop_assert_eq!(parsed_count(&parsed), expected);
        assert_spans_ordered(&parsed);
    }
}
