//! Display formatting for server-rendered values

/// Group the integer part of a non-negative number with commas
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn money_body(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    match fixed.split_once('.') {
        Some((int, frac)) => format!("${}.{frac}", group_thousands(int)),
        None => format!("${fixed}"),
    }
}

/// `$1,234.56`, `-$12.00`, `$--` for non-finite values
pub fn format_money(value: f64) -> String {
    if !value.is_finite() {
        return "$--".to_string();
    }
    // -0.004 rounds to 0.00 and must not render as "-$0.00"
    if value < 0.0 && format!("{:.2}", value.abs()) != "0.00" {
        format!("-{}", money_body(value))
    } else {
        money_body(value)
    }
}

/// Like [`format_money`] but always signed: `+$4.10`, `-$2.00`
pub fn format_signed_money(value: f64) -> String {
    let plain = format_money(value);
    if plain.starts_with('-') || plain == "$--" {
        plain
    } else {
        format!("+{plain}")
    }
}

/// Units as a grouped integer, keeping the sign: `-1,500`
pub fn format_units(units: f64) -> String {
    if !units.is_finite() {
        return "--".to_string();
    }
    let rounded = format!("{:.0}", units.abs());
    // -0.5 rounds to "0" and must not render as "-0"
    let sign = if units < 0.0 && rounded != "0" { "-" } else { "" };
    format!("{sign}{}", group_thousands(&rounded))
}

/// CSS class for a P/L value
pub fn pnl_class(value: f64) -> &'static str {
    if value > 0.0 {
        "positive"
    } else if value < 0.0 {
        "negative"
    } else {
        "neutral"
    }
}

/// Escape text for HTML element and attribute content
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(999.999), "$1,000.00");
        assert_eq!(format_money(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_money(-12.0), "-$12.00");
        assert_eq!(format_money(-0.004), "$0.00");
        assert_eq!(format_money(f64::NAN), "$--");
    }

    #[test]
    fn test_format_signed_money() {
        assert_eq!(format_signed_money(4.1), "+$4.10");
        assert_eq!(format_signed_money(-2.0), "-$2.00");
        assert_eq!(format_signed_money(f64::INFINITY), "$--");
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(1500.0), "1,500");
        assert_eq!(format_units(-100_000.0), "-100,000");
        assert_eq!(format_units(12.0), "12");
        assert_eq!(format_units(-0.2), "0");
        assert_eq!(format_units(-0.5), "0");
        assert_eq!(format_units(-0.6), "-1");
    }

    #[test]
    fn test_pnl_class() {
        assert_eq!(pnl_class(0.01), "positive");
        assert_eq!(pnl_class(-3.0), "negative");
        assert_eq!(pnl_class(0.0), "neutral");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b onclick="x('1')">&</b>"#),
            "&lt;b onclick=&quot;x(&#39;1&#39;)&quot;&gt;&amp;&lt;/b&gt;"
        );
    }
}
