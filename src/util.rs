// Numeric helpers shared by the loader and the aggregation engine.
//
// Cell parsing, the group statistics (median, mean, max-mode, Pearson) and
// number formatting for console output all live here so the rest of the
// crate can work with `Option<f64>` cells and plain slices.
use num_format::{Locale, ToFormattedString};
use std::cmp::Ordering;

/// Tokens that a CSV export uses for "no value".
const MISSING_TOKENS: [&str; 6] = ["", "NA", "N/A", "NaN", "nan", "null"];

/// Whether a raw cell should be treated as a missing value.
pub fn is_missing_token(s: &str) -> bool {
    MISSING_TOKENS.contains(&s.trim())
}

/// Parse a cell that is expected to already be a plain number.
///
/// Used when typing columns at load time: thousands separators are *not*
/// accepted here, so a column like `"48,0"` stays textual and is handled by
/// the coercion pass instead.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Strip every comma and parse what remains as `f64`.
pub fn parse_f64_stripped(s: &str) -> Option<f64> {
    let s = s.trim().replace(',', "");
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

fn cmp_f64(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Arithmetic mean; NaN for an empty slice.
pub fn average(v: &[f64]) -> f64 {
    if v.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Median of a list of numbers, `None` when there is nothing to take it of.
///
/// Takes `Vec<f64>` by value so it can sort in place.
pub fn median(mut v: Vec<f64>) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    v.sort_by(cmp_f64);
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        Some(v[mid])
    } else {
        Some((v[mid - 1] + v[mid]) / 2.0)
    }
}

/// Most frequent value; when several values tie, the largest one wins.
pub fn max_mode(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(cmp_f64);

    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let mut j = i;
        while j < sorted.len() && sorted[j] == value {
            j += 1;
        }
        // Ascending order plus `>=` makes the larger value win a tie.
        let count = j - i;
        if best.map_or(true, |(_, c)| count >= c) {
            best = Some((value, count));
        }
        i = j.max(i + 1);
    }
    best.map(|(value, _)| value)
}

/// Pearson correlation over the rows where both cells are present.
///
/// NaN when fewer than two rows overlap or either side has zero variance.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

pub fn round_to(v: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (v * factor).round() / factor
}

/// Render a cell the way it reads when a float is turned into a string:
/// integral values keep a `.0` suffix and missing cells become `nan`.
pub fn display_cell(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:?}", v),
        None => "nan".to_string(),
    }
}

/// Insert `,` every three digits of an unsigned digit string.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus thousands separators, e.g. `1,234,567.89`.
    if !n.is_finite() {
        return "NaN".to_string();
    }
    let s = format!("{:.*}", decimals, n.abs());
    // The sign only shows when something non-zero survives rounding.
    let neg = n < 0.0 && s.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = group_thousands(int_part);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// `format_number` for optional cells; missing renders as `-`.
pub fn format_opt(v: &Option<f64>) -> String {
    match v {
        Some(v) => format_number(*v, 2),
        None => "-".to_string(),
    }
}

pub fn format_f64(v: &f64) -> String {
    format_number(*v, 2)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_odd_and_even_lengths() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(Vec::new()), None);
    }

    #[test]
    fn max_mode_breaks_ties_upwards() {
        assert_eq!(max_mode(&[1.0, 1.0, 2.0, 2.0]), Some(2.0));
        assert_eq!(max_mode(&[3.0, 1.0, 1.0, 2.0]), Some(1.0));
        assert_eq!(max_mode(&[5.0]), Some(5.0));
        assert_eq!(max_mode(&[]), None);
    }

    #[test]
    fn stripped_parse_removes_thousands_separators() {
        assert_eq!(parse_f64_stripped("1,234,567"), Some(1_234_567.0));
        assert_eq!(parse_f64_stripped(" 48,0 "), Some(480.0));
        assert_eq!(parse_f64_stripped("abc"), None);
        assert_eq!(parse_f64_safe(Some("1,5")), None);
        assert_eq!(parse_f64_safe(Some(" 2.5 ")), Some(2.5));
    }

    #[test]
    fn missing_tokens() {
        assert!(is_missing_token(""));
        assert!(is_missing_token("  "));
        assert!(is_missing_token("NA"));
        assert!(!is_missing_token("0"));
    }

    #[test]
    fn pearson_of_linear_series() {
        let xs = [Some(1.0), Some(2.0), Some(3.0), None];
        let ys = [Some(2.0), Some(4.0), Some(6.0), Some(100.0)];
        assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-12);
        let flat = [Some(1.0), Some(1.0), Some(1.0), Some(1.0)];
        assert!(pearson(&flat, &ys).is_nan());
    }

    #[test]
    fn formats_numbers_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 0), "-1,500");
        assert_eq!(format_number(f64::NAN, 2), "NaN");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(999.999, 2), "1,000.00");
        assert_eq!(format_number(1e19, 0), "10,000,000,000,000,000,000");
        assert_eq!(display_cell(Some(2.0)), "2.0");
        assert_eq!(display_cell(None), "nan");
    }
}
