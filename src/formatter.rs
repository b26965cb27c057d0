//! LaTeX rendering of `Value`s, grounded on `Value::to_string` /
//! `dimension_to_String` / `getDimension_in_frac` / `double_to_String` in the
//! original `Value.h`, reimplemented idiomatically rather than translated.

use crate::core::dimension::{Dim, AXIS_NAMES};
use crate::core::value::{MatrixValue, NumberValue, Value};

/// Renders a `Value` as LaTeX per the bit-exact rules of §6: integral
/// Numbers without a decimal point, otherwise 5-decimal fixed point;
/// `\cdot`-joined positive-power units with `\frac{...}{...}` when any
/// negative power is present; Matrices as `\begin{pmatrix}...\end{pmatrix}`.
pub fn render(value: &Value) -> String {
    match value {
        Value::Number(n) => render_number(n),
        Value::Matrix(m) => render_matrix(m),
        Value::Function(_) => "\\text{function}".to_string(),
    }
}

fn render_number(n: &NumberValue) -> String {
    let magnitude = render_magnitude(n.value);
    let dim = render_dim(&n.dim);
    if dim.is_empty() {
        magnitude
    } else {
        format!("{magnitude} \\cdot {dim}")
    }
}

fn render_magnitude(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.5}", value)
    }
}

/// `\cdot`-joined positive-power factors over `\frac{...}{...}` when any axis
/// has a negative exponent; a single unit at power 1 omits the exponent.
fn render_dim(dim: &Dim) -> String {
    let mut numerator = Vec::new();
    let mut denominator = Vec::new();
    for (axis, &exp) in dim.0.iter().enumerate() {
        if exp == 0 {
            continue;
        }
        let name = AXIS_NAMES[axis];
        if exp > 0 {
            numerator.push(render_factor(name, exp));
        } else {
            denominator.push(render_factor(name, -exp));
        }
    }
    if numerator.is_empty() && denominator.is_empty() {
        return String::new();
    }
    if denominator.is_empty() {
        return numerator.join(" \\cdot ");
    }
    let num = if numerator.is_empty() { "1".to_string() } else { numerator.join(" \\cdot ") };
    let den = denominator.join(" \\cdot ");
    format!("\\frac{{{num}}}{{{den}}}")
}

fn render_factor(name: &str, exp: i32) -> String {
    if exp == 1 {
        name.to_string()
    } else {
        format!("{name}^{{{exp}}}")
    }
}

fn render_matrix(m: &MatrixValue) -> String {
    let rows: Vec<String> = m.rows.iter().map(|row| row.iter().map(render).collect::<Vec<_>>().join(" & ")).collect();
    format!("\\begin{{pmatrix}}{}\\end{{pmatrix}}", rows.join(" \\\\ "))
}
