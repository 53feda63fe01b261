//! LaTeX fragments for typesetting results.
//!
//! Fragments are returned without math delimiters.

/// Converts a polynomial from the service's `**` power notation to LaTeX.
///
/// `x**3` becomes `x^{3}`, and every remaining `*` is dropped together with
/// at most one whitespace character on each side.
///
/// ```
/// use numera_render::latex;
///
/// assert_eq!(latex::polynomial("2.0*x**3 - 1.5*x + 4"), "2.0x^{3} - 1.5x + 4");
/// ```
#[must_use]
pub fn polynomial(expression: &str) -> String {
    strip_products(&superscripts(expression))
}

fn superscripts(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len());
    let mut rest = expression;

    while let Some(at) = rest.find("**") {
        let after = &rest[at + 2..];
        let digits = after.len() - after.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        out.push_str(&rest[..at]);
        if digits == 0 {
            out.push_str("**");
        } else {
            out.push_str("^{");
            out.push_str(&after[..digits]);
            out.push('}');
        }
        rest = &after[digits..];
    }

    out.push_str(rest);
    out
}

fn strip_products(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len());
    let mut chars = expression.chars().peekable();

    while let Some(c) = chars.next() {
        let star = if c == '*' {
            true
        } else if c.is_whitespace() && chars.peek() == Some(&'*') {
            chars.next();
            true
        } else {
            false
        };

        if star {
            chars.next_if(|next| next.is_whitespace());
        } else {
            out.push(c);
        }
    }

    out
}

/// Typesets a user-entered function such as `sqrt(x) * sin(2*x)`.
///
/// Known function names become LaTeX commands, `**` and `^` become
/// superscripts, `*` becomes `\cdot`, `sqrt(..)` becomes a radical and
/// `abs(..)` becomes bars. Everything else passes through unchanged.
///
/// ```
/// use numera_render::latex;
///
/// assert_eq!(latex::expression("sqrt(x) * sin(2*x)"), r"\sqrt{x} \cdot \sin(2 \cdot x)");
/// ```
#[must_use]
pub fn expression(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() * 2);
    let mut rest = raw;

    while let Some(c) = rest.chars().next() {
        if c.is_ascii_alphabetic() {
            let len = rest.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(rest.len());
            let (name, after) = rest.split_at(len);
            rest = after;

            match (name, group(after)) {
                ("sqrt", Some((inner, after))) => {
                    out.push_str(&format!(r"\sqrt{{{}}}", expression(inner)));
                    rest = after;
                }
                ("abs", Some((inner, after))) => {
                    out.push_str(&format!(r"\left|{}\right|", expression(inner)));
                    rest = after;
                }
                _ => match command(name) {
                    Some(command) => {
                        out.push_str(command);
                        let joins = command.ends_with(|c: char| c.is_ascii_alphabetic())
                            && after.starts_with(|c: char| c.is_ascii_alphanumeric());
                        if joins {
                            out.push(' ');
                        }
                    }
                    None => out.push_str(name),
                },
            }
        } else if rest.starts_with("**") || c == '^' {
            let after = &rest[if c == '^' { 1 } else { 2 }..];
            if let Some((inner, after)) = group(after) {
                out.push_str(&format!("^{{{}}}", expression(inner)));
                rest = after;
            } else {
                let len = exponent_len(after);
                out.push_str(&format!("^{{{}}}", expression(&after[..len])));
                rest = &after[len..];
            }
        } else if c == '*' {
            out.truncate(out.trim_end().len());
            out.push_str(r" \cdot ");
            rest = rest[1..].trim_start();
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    out
}

fn command(name: &str) -> Option<&'static str> {
    Some(match name {
        "sin" => r"\sin",
        "cos" => r"\cos",
        "tan" => r"\tan",
        "cot" => r"\cot",
        "sec" => r"\sec",
        "csc" => r"\csc",
        "asin" => r"\arcsin",
        "acos" => r"\arccos",
        "atan" => r"\arctan",
        "acot" => r"\operatorname{arccot}",
        "asec" => r"\operatorname{arcsec}",
        "acsc" => r"\operatorname{arccsc}",
        "log" => r"\log",
        "ln" => r"\ln",
        "exp" => r"\exp",
        "sqrt" => r"\sqrt",
        "pi" => r"\pi",
        "Sum" => r"\sum",
        _ => return None,
    })
}

/// Splits `(inner)rest` at the matching parenthesis.
fn group(text: &str) -> Option<(&str, &str)> {
    if !text.starts_with('(') {
        return None;
    }
    let mut depth = 0_usize;
    for (at, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&text[1..at], &text[at + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Length of an unparenthesized exponent: an optional sign and one operand.
fn exponent_len(text: &str) -> usize {
    let sign = usize::from(text.starts_with('-'));
    let operand = text[sign..]
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '.'))
        .unwrap_or(text.len() - sign);
    if operand == 0 { 0 } else { sign + operand }
}

/// Joins matrix rows as `a & b \\ c & d`.
#[must_use]
pub fn matrix_body<R: AsRef<[String]>>(rows: &[R]) -> String {
    rows.iter()
        .map(|row| row.as_ref().join(" & "))
        .collect::<Vec<_>>()
        .join(r" \\ ")
}

/// A named column vector, `x = \begin{pmatrix} a \\ b \end{pmatrix}`.
#[must_use]
pub fn column(name: &str, values: &[String]) -> String {
    format!(r"{name} = \begin{{pmatrix}} {} \end{{pmatrix}}", values.join(r" \\ "))
}

/// A named matrix in a `pmatrix` environment.
#[must_use]
pub fn matrix<R: AsRef<[String]>>(name: &str, rows: &[R]) -> String {
    format!(r"{name} = \begin{{pmatrix}} {} \end{{pmatrix}}", matrix_body(rows))
}

/// A bracketed matrix, used for coefficients.
#[must_use]
pub fn bmatrix<R: AsRef<[String]>>(rows: &[R]) -> String {
    format!(r"\begin{{bmatrix}} {} \end{{bmatrix}}", matrix_body(rows))
}

/// A ruled `array` with a header row.
#[must_use]
pub fn array<R: AsRef<[String]>>(headers: &[String], rows: &[R]) -> String {
    let columns = vec!["c"; headers.len()].join("|");
    format!(
        r"\begin{{array}}{{{columns}}} {} \\ \hline {} \end{{array}}",
        headers.join(" & "),
        matrix_body(rows)
    )
}

/// Rewrites `lo <= x <= hi` with `\leq`.
#[must_use]
pub fn interval(text: &str) -> String {
    text.replace("<=", r"\leq")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|&value| value.to_owned()).collect()
    }

    #[test]
    fn powers_become_superscripts() {
        assert_eq!(polynomial("x**2 - 4"), "x^{2} - 4");
        assert_eq!(polynomial("-0.5*x**10+x"), "-0.5x^{10}+x");
    }

    #[test]
    fn products_lose_their_star_and_one_space() {
        assert_eq!(polynomial("3 * x"), "3x");
        assert_eq!(polynomial("3  *  x"), "3  x");
        assert_eq!(polynomial("x**y"), "xy");
    }

    #[test]
    fn functions_become_commands() {
        assert_eq!(expression("asin(x) + pi"), r"\arcsin(x) + \pi");
        assert_eq!(expression("acot(x)"), r"\operatorname{arccot}(x)");
        assert_eq!(expression("sin2x"), r"\sin 2x");
        assert_eq!(expression("Sum(k)"), r"\sum(k)");
        assert_eq!(expression("abs(x - 1)"), r"\left|x - 1\right|");
        assert_eq!(expression("sqrt(x**2 + 1)"), r"\sqrt{x^{2} + 1}");
    }

    #[test]
    fn powers_and_products_are_typeset() {
        assert_eq!(expression("x**2 - 4"), "x^{2} - 4");
        assert_eq!(expression("x^(n+1)"), "x^{n+1}");
        assert_eq!(expression("e**-x"), "e^{-x}");
        assert_eq!(expression("2 * x"), r"2 \cdot x");
        assert_eq!(expression("x^"), "x^{}");
    }

    #[test]
    fn unbalanced_parentheses_pass_through() {
        assert_eq!(expression("sqrt(x"), r"\sqrt(x");
    }

    #[test]
    fn column_vector_stacks_entries() {
        assert_eq!(
            column("x", &strings(&["1.0", "2.5"])),
            r"x = \begin{pmatrix} 1.0 \\ 2.5 \end{pmatrix}"
        );
    }

    #[test]
    fn matrices_join_cells_and_rows() {
        let rows = vec![strings(&["1", "0"]), strings(&["0", "1"])];
        assert_eq!(matrix("L", &rows), r"L = \begin{pmatrix} 1 & 0 \\ 0 & 1 \end{pmatrix}");
        assert_eq!(bmatrix(&rows), r"\begin{bmatrix} 1 & 0 \\ 0 & 1 \end{bmatrix}");
    }

    #[test]
    fn array_rules_the_header() {
        let headers = strings(&["n", "x_i"]);
        let rows = vec![strings(&["0", "-1"])];
        assert_eq!(
            array(&headers, &rows),
            r"\begin{array}{c|c} n & x_i \\ \hline 0 & -1 \end{array}"
        );
    }

    #[test]
    fn interval_uses_leq() {
        assert_eq!(interval("-1 <= x <= 2"), r"-1 \leq x \leq 2");
    }
}
