//! Writing the shared oracle input file.
//!
//! Both programs read the same artifact. Prover-specific options sit in an
//! `if(Prover9)` block the model finder skips; the shared `max_seconds`
//! budget applies to both. The premises go in the `sos` list and the
//! candidate under test in the `goals` list.

use std::io::{self, Write};

/// Write a complete input artifact: the option preamble, the premise list,
/// and the goal. Formula strings are expected in oracle syntax without a
/// trailing period.
pub fn write_artifact<W: Write, S: AsRef<str>>(
    w: &mut W,
    timeout: u64,
    premises: impl IntoIterator<Item = S>,
    goal: &str,
) -> io::Result<()> {
    w.write_all(b"if(Prover9).\n")?;
    // one proof is enough (the counter starts at zero)
    w.write_all(b"assign(max_proofs, 0).\n")?;
    w.write_all(b"set(quiet).\n")?;
    w.write_all(b"clear(echo_input).\n")?;
    w.write_all(b"clear(print_initial_clauses).\n")?;
    w.write_all(b"clear(print_given).\n")?;
    w.write_all(b"clear(print_proofs).\n")?;
    w.write_all(b"end_if.\n")?;
    writeln!(w, "assign(max_seconds, {timeout}).\n")?;

    w.write_all(b"formulas(sos).\n\n")?;
    for premise in premises {
        writeln!(w, "{}.", premise.as_ref())?;
    }
    w.write_all(b"\nend_of_list.\n\n")?;

    writeln!(w, "formulas(goals).\n\n{goal}.\n")?;
    w.write_all(b"end_of_list.\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_layout() {
        let mut buf = vec![];
        write_artifact(
            &mut buf,
            3,
            ["all x all y (R(x,y) -> R(y,x))", "all x exists y R(x,y)"],
            "exists x exists y R(x,y)",
        )
        .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "if(Prover9).\n\
             assign(max_proofs, 0).\n\
             set(quiet).\n\
             clear(echo_input).\n\
             clear(print_initial_clauses).\n\
             clear(print_given).\n\
             clear(print_proofs).\n\
             end_if.\n\
             assign(max_seconds, 3).\n\
             \n\
             formulas(sos).\n\
             \n\
             all x all y (R(x,y) -> R(y,x)).\n\
             all x exists y R(x,y).\n\
             \n\
             end_of_list.\n\
             \n\
             formulas(goals).\n\
             \n\
             exists x exists y R(x,y).\n\
             \n\
             end_of_list.\n"
        );
    }

    #[test]
    fn test_empty_premise_list() {
        let mut buf = vec![];
        write_artifact(&mut buf, 10, Vec::<String>::new(), "all x R(x,x)").unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("formulas(sos).\n\n\nend_of_list.\n"));
        assert!(text.contains("assign(max_seconds, 10).\n"));
    }
}
