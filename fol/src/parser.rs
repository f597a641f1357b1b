//! Parsing domain specification files.
//!
//! The format is line-oriented. Colons, parentheses, commas, and spaces all
//! separate tokens, so `R(a,b)` and `R a b` read the same. Lines starting
//! with `%` are comments. Scalar settings are single lines (`varlimit: 2`);
//! the `Types`, `Relations`, and `Facts` keywords open sections that run to
//! the next section keyword, with `end` closing the file. `Elements` lists
//! its elements on the keyword's own line.

use crate::spec::{DomainSpec, Relation, SpecError, TypeDecl, TypeRef};
use std::sync::Arc;

peg::parser! {
    grammar line_grammar() for str {
        rule sep() = quiet!{[':' | '(' | ',' | ' ' | ')' | '\t' | '\r']+}

        rule token() -> String
            = s:$([^ ':' | '(' | ',' | ' ' | ')' | '\t' | '\r' | '\n']+) { s.to_string() }

        pub rule line() -> Vec<String>
            = sep()? ts:(token() ** sep()) sep()? { ts }
    }
}

/// Parse a specification from its text. `filename` is remembered so the
/// session can derive an output filename from it. The returned spec has
/// already passed [`DomainSpec::validate`].
pub fn parse_spec(text: &str, filename: Option<&str>) -> Result<DomainSpec, SpecError> {
    let lines = tokenize(text)?;

    let mut var_limit = None;
    let mut size_limit = None;
    let mut chunk_size = 0;
    // matching the external provers' own floor for quick runs
    let mut timeout = 3;
    let mut elements: Vec<String> = vec![];
    let mut types: Vec<TypeDecl> = vec![];
    let mut raw_relations: Vec<(String, Option<Vec<String>>)> = vec![];
    let mut raw_facts: Vec<Vec<String>> = vec![];

    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        match line[0].as_str() {
            "varlimit" => var_limit = Some(scalar(line)?),
            "sizelimit" => size_limit = Some(scalar(line)?),
            "chunksize" => chunk_size = scalar(line)?,
            "timeout" => timeout = scalar(line)? as u64,
            "Elements" => elements = line[1..].to_vec(),
            "Types" => {
                while i + 1 < lines.len() && lines[i + 1][0] != "Relations" {
                    i += 1;
                    let line = &lines[i];
                    types.push(TypeDecl {
                        name: line[0].clone(),
                        elements: line[1..].to_vec(),
                    });
                }
            }
            "Relations" => {
                while i + 1 < lines.len() && lines[i + 1][0] != "Facts" {
                    i += 1;
                    let line = &lines[i];
                    let constraint = if line.len() > 1 {
                        Some(line[1..].to_vec())
                    } else {
                        None
                    };
                    raw_relations.push((line[0].clone(), constraint));
                }
            }
            "Facts" => {
                while i + 1 < lines.len() && lines[i + 1][0] != "end" {
                    i += 1;
                    raw_facts.push(lines[i].clone());
                }
            }
            "end" => break,
            other => return Err(SpecError::Parse(format!("unexpected token {other}"))),
        }
        i += 1;
    }

    // the canonical element table of a typed domain concatenates its
    // types' elements in declaration order
    let table: Vec<String> = if types.is_empty() {
        elements.clone()
    } else {
        types.iter().flat_map(|t| t.elements.clone()).collect()
    };

    let mut relations = vec![];
    for (name, constraint) in raw_relations {
        let constraint = match constraint {
            None => None,
            Some(names) => {
                let mut refs = vec![];
                for n in names {
                    if n == "_" {
                        refs.push(TypeRef::Wild);
                    } else if types.iter().any(|t| t.name == n) {
                        refs.push(TypeRef::Named(n));
                    } else {
                        return Err(SpecError::BadConstraint(name.clone(), n));
                    }
                }
                Some(refs)
            }
        };
        relations.push(Relation {
            name,
            arity: 0,
            facts: vec![],
            constraint,
        });
    }

    for line in raw_facts {
        let relation = relations
            .iter_mut()
            .find(|r| r.name == line[0])
            .ok_or_else(|| SpecError::UnknownRelation(line[0].clone()))?;
        let mut fact = vec![];
        for name in &line[1..] {
            let element = table.iter().position(|e| e == name).ok_or_else(|| {
                SpecError::UnknownElement {
                    relation: relation.name.clone(),
                    element: name.clone(),
                }
            })?;
            fact.push(element);
        }
        if relation.facts.is_empty() {
            relation.arity = fact.len();
        }
        relation.facts.push(fact);
    }

    let spec = DomainSpec {
        elements,
        types,
        relations: relations.into_iter().map(Arc::new).collect(),
        var_limit: var_limit.ok_or_else(|| SpecError::Parse("missing varlimit".to_string()))?,
        size_limit: size_limit.ok_or_else(|| SpecError::Parse("missing sizelimit".to_string()))?,
        chunk_size,
        timeout,
        filename: filename.map(str::to_string),
    };
    spec.validate()?;
    log::debug!(
        "parsed spec: {} elements, {} relations, varlimit {}, sizelimit {}",
        spec.universe(),
        spec.relations.len(),
        spec.var_limit,
        spec.size_limit
    );
    Ok(spec)
}

// Tokenize, dropping blank lines and comments.
fn tokenize(text: &str) -> Result<Vec<Vec<String>>, SpecError> {
    let mut lines = vec![];
    for raw in text.lines() {
        let tokens = line_grammar::line(raw)
            .map_err(|err| SpecError::Parse(format!("bad line {raw:?}: {err}")))?;
        if tokens.is_empty() || tokens[0].starts_with('%') {
            continue;
        }
        lines.push(tokens);
    }
    Ok(lines)
}

fn scalar(line: &[String]) -> Result<usize, SpecError> {
    let value = line
        .get(1)
        .ok_or_else(|| SpecError::Parse(format!("{} needs a value", line[0])))?;
    value
        .parse()
        .map_err(|_| SpecError::Parse(format!("bad value for {}: {value}", line[0])))
}
