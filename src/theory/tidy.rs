//! Canonical formatting of a theory block.

use crate::domain::TheoryLine;
use crate::models::{KernelKind, search};

/// Column at which the parameter comment starts.
const COMMENT_COLUMN: usize = 35;

/// Rewrite every kernel line to its canonical form.
///
/// Kernel lines become the full kernel name padded to 10 columns, each
/// parameter right-aligned in 6 columns and the parameter comment from column
/// 35. Polynomials and user functions get their own layouts. Separators,
/// blank lines and lines that would not build are returned unchanged.
pub fn tidy_theory_block(lines: &[TheoryLine]) -> Vec<TheoryLine> {
    lines
        .iter()
        .map(|line| match tidy_line(line) {
            Some(text) => TheoryLine::new(line.line_no, text),
            None => line.clone(),
        })
        .collect()
}

fn tidy_line(line: &TheoryLine) -> Option<String> {
    let mut tokens = line.content().split_whitespace();
    let first = tokens.next()?;
    if first == "+" {
        return None;
    }
    let info = search(first)?;
    let params: Vec<&str> = tokens.collect();

    match info.kind {
        KernelKind::Polynom => {
            let mut tidy = String::from("polynom ");
            push_params(&mut tidy, &params);
            tidy.push(' ');
            tidy.push_str(info.comment);
            Some(tidy)
        }
        KernelKind::UserFcn => {
            let mut tidy = String::from(info.name);
            for token in &params {
                tidy.push(' ');
                tidy.push_str(token);
            }
            Some(tidy)
        }
        _ => {
            if !info.arity.accepts(params.len()) {
                return None;
            }
            let mut tidy = format!("{:<10}", info.name);
            push_params(&mut tidy, &params);
            while tidy.len() < COMMENT_COLUMN {
                tidy.push(' ');
            }
            if params.len() == info.arity.min() {
                tidy.push_str(info.comment);
            } else {
                tidy.push_str(&info.comment_with_tshift());
            }
            Some(tidy)
        }
    }
}

fn push_params(out: &mut String, params: &[&str]) {
    for token in params {
        out.push_str(&format!("{token:>6}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tidy(lines: &[&str]) -> Vec<String> {
        let lines = TheoryLine::numbered(1, lines.iter().copied());
        tidy_theory_block(&lines).into_iter().map(|l| l.text).collect()
    }

    #[test]
    fn kernel_lines_are_aligned() {
        let out = tidy(&["a 1", "se   4 (old comment)", "ge 2 3 map1"]);
        assert_eq!(out[0], format!("{:<35}(asymmetry)", "asymmetry      1"));
        assert_eq!(out[1], format!("{:<35}(rate)", "simplExpo      4"));
        assert_eq!(
            out[2],
            format!("{:<35}(rate exponent tshift)", "generExpo      2     3  map1")
        );
        assert_eq!(out[1].find('('), Some(COMMENT_COLUMN));
    }

    #[test]
    fn separators_and_unknown_lines_are_untouched() {
        let out = tidy(&["+", "bogus 1 2", "se", ""]);
        assert_eq!(out, vec!["+", "bogus 1 2", "se", ""]);
    }

    #[test]
    fn polynom_and_user_function_layouts() {
        let out = tidy(&["p 1 2 3", "u   libFoo   TFoo 1  fun2"]);
        assert_eq!(out[0], "polynom      1     2     3 (tshift p0 p1 ... pn)");
        assert_eq!(out[1], "userFcn libFoo TFoo 1 fun2");
    }

    #[test]
    fn keeps_line_numbers() {
        let lines = TheoryLine::numbered(12, ["se 1", "+", "sg 2"]);
        let out = tidy_theory_block(&lines);
        let numbers: Vec<usize> = out.iter().map(|l| l.line_no).collect();
        assert_eq!(numbers, vec![12, 13, 14]);
    }
}
