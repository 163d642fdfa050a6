//! Parser for the text the benchmark executable prints.
//!
//! Each measured case is reported on one line:
//!
//! ```text
//! <name> [iters=5, n=200000]: min=100 ns (0.0005 ns/op), median=110 ns (0.00055 ns/op), mean=112 ns (0.00056 ns/op), max=130 ns (0.00065 ns/op)
//! ```
//!
//! Anything else on stdout (progress, warnings from the library under test) is skipped.

use crate::schema::Sample;

/// Separates the case name from the counters. Case names may not contain it.
const ITERS_MARKER: &str = " [iters=";

/// Parse every matching line of `output`, in order.
pub fn parse_output(output: &str) -> Vec<Sample> {
    output.lines().filter_map(parse_line).collect()
}

/// Parse a single line, returning `None` if it does not follow the grammar.
pub fn parse_line(line: &str) -> Option<Sample> {
    let line = line.trim();

    let (name, rest) = line.split_once(ITERS_MARKER)?;
    if name.is_empty() {
        return None;
    }

    let (iters, rest) = rest.split_once(", n=")?;
    let (n, rest) = rest.split_once("]: ")?;
    let iters = parse_uint(iters).filter(|&v| v >= 1)?;
    let n = parse_uint(n).filter(|&v| v >= 1)?;

    let (min_ns, min_ns_per_op, rest) = parse_stat(rest, "min=")?;
    let (median_ns, median_ns_per_op, rest) = parse_stat(rest.strip_prefix(", ")?, "median=")?;
    let (mean_ns, mean_ns_per_op, rest) = parse_stat(rest.strip_prefix(", ")?, "mean=")?;
    let (max_ns, max_ns_per_op, rest) = parse_stat(rest.strip_prefix(", ")?, "max=")?;
    if !rest.is_empty() {
        return None;
    }

    Some(Sample {
        name: name.to_string(),
        iters,
        n,
        min_ns,
        median_ns,
        mean_ns,
        max_ns,
        min_ns_per_op,
        median_ns_per_op,
        mean_ns_per_op,
        max_ns_per_op,
    })
}

/// `<label><uint> ns (<float> ns/op)`, returning the unconsumed tail.
fn parse_stat<'a>(s: &'a str, label: &str) -> Option<(u64, f64, &'a str)> {
    let s = s.strip_prefix(label)?;
    let (total, s) = s.split_once(" ns (")?;
    let (per_op, s) = s.split_once(" ns/op)")?;
    Some((parse_uint(total)?, parse_float(per_op)?, s))
}

fn parse_uint(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_float(s: &str) -> Option<f64> {
    let charset_ok = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'e' | b'E' | b'.' | b'+' | b'-'));
    if s.is_empty() || !charset_ok {
        return None;
    }
    let v: f64 = s.parse().ok()?;
    (v.is_finite() && v >= 0.0).then_some(v)
}
