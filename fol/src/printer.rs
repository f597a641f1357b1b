//! Rendering formulas as text.
//!
//! Two renderings share one recursion: a human-readable form using logical
//! glyphs, and an ASCII form accepted by the external decision procedures.
//! The human-readable form doubles as a formula's identity everywhere
//! duplicates are filtered, so it must stay deterministic.

use crate::rewrite::eliminate_unique;
use crate::syntax::{FormulaNode, FormulaTree, Operator, Quantifier, QuantifierKind};

/// The human-readable rendering. Outermost parentheses are dropped, and a
/// single space separates the quantifier block from the matrix.
pub fn display_text(tree: &FormulaTree) -> String {
    recurse(tree, true, false)
}

/// The rendering consumed by the decision procedures. Uniqueness
/// quantifiers have no ASCII form, so they are rewritten away first.
pub fn oracle_text(tree: &FormulaTree) -> String {
    if tree.has_unique() {
        recurse(&eliminate_unique(tree), false, true)
    } else {
        recurse(tree, false, true)
    }
}

fn quantifier_name(q: &Quantifier, oracle: bool) -> String {
    if oracle {
        let keyword = match q.kind {
            QuantifierKind::Universal => "all",
            QuantifierKind::Existential => "exists",
            QuantifierKind::Unique => {
                unreachable!("uniqueness is rewritten away before oracle rendering")
            }
        };
        format!("{keyword} {} ", q.var)
    } else {
        let glyph = match q.kind {
            QuantifierKind::Universal => "∀",
            QuantifierKind::Unique => "∃!",
            QuantifierKind::Existential => "∃",
        };
        match &q.ty {
            Some(ty) => format!("{glyph}{ty} {}", q.var),
            None => format!("{glyph}{}", q.var),
        }
    }
}

fn operator_name(op: &Operator, oracle: bool) -> String {
    match (op, oracle) {
        (Operator::And, _) => "&".to_string(),
        (Operator::Or, false) => "v".to_string(),
        (Operator::Or, true) => "|".to_string(),
        (Operator::Implies, false) => "⊃".to_string(),
        (Operator::Implies, true) => "->".to_string(),
        (Operator::Iff, false) => "≡".to_string(),
        (Operator::Iff, true) => "<->".to_string(),
        (Operator::Not, false) => "¬".to_string(),
        (Operator::Not, true) => "-".to_string(),
        (Operator::Equals(a, b), _) => format!("({a} = {b})"),
    }
}

fn predicate_name(node: &FormulaTree) -> String {
    match &node.node {
        FormulaNode::Predicate(p) => {
            let vars: Vec<String> = p.vars.iter().map(|v| v.to_string()).collect();
            format!("{}({})", p.relation.name, vars.join(","))
        }
        _ => unreachable!(),
    }
}

fn recurse(tree: &FormulaTree, skip_parens: bool, oracle: bool) -> String {
    let mut out = String::new();

    // the quantifier block prints as a preorder chain with no separators
    let mut current = tree;
    let mut quantified = false;
    while let FormulaNode::Quantifier(q) = &current.node {
        out.push_str(&quantifier_name(q, oracle));
        quantified = true;
        match current.left.as_deref() {
            Some(scope) => current = scope,
            // a bare prefix with no matrix still prints, for debugging
            None => return out,
        }
    }
    if skip_parens && quantified && !oracle {
        out.push(' ');
    }

    let binary = match &current.node {
        FormulaNode::Operator(op) => op.is_binary(),
        _ => false,
    };

    if binary && !skip_parens {
        out.push('(');
    }
    if let Some(left) = current.left.as_deref() {
        out.push_str(&recurse(left, false, oracle));
    }
    if binary {
        out.push(' ');
    }
    match &current.node {
        FormulaNode::Operator(op) => out.push_str(&operator_name(op, oracle)),
        FormulaNode::Predicate(_) => out.push_str(&predicate_name(current)),
        FormulaNode::Quantifier(_) => unreachable!(),
    }
    if binary {
        out.push(' ');
    }
    if let Some(right) = current.right.as_deref() {
        out.push_str(&recurse(right, false, oracle));
    }
    if binary && !skip_parens {
        out.push(')');
    }

    out
}
