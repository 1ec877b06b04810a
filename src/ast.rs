use crate::span::Spanned;

/// A parsed tree node: either a leaf atom or an ordered list of
/// children. Lists own their children exclusively; the tree is never
/// mutated after parsing.
#[derive(Clone, Debug, PartialEq)]
pub enum Sexp {
    Atom(String),
    List(Vec<Node>),
}

pub type Node = Spanned<Sexp>;

impl Sexp {
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Sexp::Atom(text) => Some(text),
            Sexp::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Sexp::Atom(_) => None,
            Sexp::List(children) => Some(children),
        }
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Sexp::Atom(_))
    }

    /// The dispatch key of a list: its first child, when that child is
    /// an atom.
    pub fn dispatch_key(&self) -> Option<&str> {
        self.as_list()?.first()?.node.as_atom()
    }
}

/// Render a parsed forest with spans, one node per line, children
/// indented. Used by `sicc --dump-tree`.
pub fn dump_forest(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        dump_node(node, 0, &mut out);
    }
    out
}

fn dump_node(node: &Node, indent: usize, out: &mut String) {
    let b = node.span.begin;
    let e = node.span.end;
    match &node.node {
        Sexp::Atom(text) => {
            out.push_str(&format!(
                "{:indent$}{} [{}, {}] -> [{}, {}]\n",
                "", text, b.row, b.col, e.row, e.col
            ));
        }
        Sexp::List(children) => {
            out.push_str(&format!(
                "{:indent$}( [{}, {}] -> [{}, {}]\n",
                "", b.row, b.col, e.row, e.col
            ));
            for child in children {
                dump_node(child, indent + 2, out);
            }
            out.push_str(&format!("{:indent$})\n", ""));
        }
    }
}
