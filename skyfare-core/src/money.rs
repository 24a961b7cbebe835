//! Monetary amounts are plain `i64` cents throughout the workspace. Rounding
//! happens in exactly one place so identical pricing inputs always produce
//! identical amounts.

/// Round a fractional cent amount to whole cents, half-up.
///
/// Only meaningful for non-negative inputs; fare math never produces a
/// negative intermediate value.
pub fn round_half_up_cents(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Format cents as a decimal string, e.g. `62400` -> `"624.00"`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_half_up_cents(62400.0), 62400);
        assert_eq!(round_half_up_cents(100.4), 100);
        assert_eq!(round_half_up_cents(100.5), 101);
        assert_eq!(round_half_up_cents(100.6), 101);
        assert_eq!(round_half_up_cents(0.0), 0);
    }

    #[test]
    fn formats_cents() {
        assert_eq!(format_cents(62400), "624.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(-7550), "-75.50");
    }
}
