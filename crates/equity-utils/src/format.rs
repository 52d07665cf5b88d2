//! Number formatting helpers shared by the report renderer and the CLI

/// Format a dollar amount with a B/M/K suffix.
pub fn format_money(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("${:.1}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("${:.1}K", value / 1e3)
    } else {
        format!("${value:.2}")
    }
}

/// Format a value already expressed in percent.
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Format a plain multiple such as P/E or debt/equity.
pub fn format_ratio(value: f64) -> String {
    format!("{value:.2}")
}

/// Apply `f` when present, `"n/a"` otherwise.
pub fn format_optional(value: Option<f64>, f: impl Fn(f64) -> String) -> String {
    value.map_or_else(|| "n/a".to_string(), f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(2_950_000_000_000.0), "$2.95T");
        assert_eq!(format_money(12_500_000_000.0), "$12.50B");
        assert_eq!(format_money(-3_400_000.0), "$-3.4M");
        assert_eq!(format_money(950.0), "$950.00");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some(12.345), format_percent), "12.3%");
        assert_eq!(format_optional(None, format_ratio), "n/a");
    }
}
