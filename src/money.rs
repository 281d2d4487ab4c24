use regex::Regex;
use std::sync::OnceLock;

static AMOUNT_REGEX: OnceLock<Regex> = OnceLock::new();

const FRACTION_DIGITS: usize = 3;

/// Parses user-entered money such as `350`, `$1,200.50` or `-$20`.
///
/// Grouping commas must sit on thousands boundaries. Exponents and
/// non-finite spellings (`inf`, `NaN`) are rejected.
pub fn parse_amount(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    // Sign goes either side of a single `$`: `-$20` or `$-20`.
    let (mut negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let s = s.strip_prefix('$').map(str::trim_start).unwrap_or(s);
    let s = match s.strip_prefix('-') {
        Some(rest) if !negative => {
            negative = true;
            rest
        }
        _ => s,
    };

    let re = AMOUNT_REGEX.get_or_init(|| {
        Regex::new(r"^(\d{1,3}(?:,\d{3})+|\d+)(\.\d*)?$").unwrap()
    });

    let caps = re.captures(s)?;
    let mut digits = caps[1].replace(',', "");
    if let Some(frac) = caps.get(2) {
        digits.push_str(frac.as_str());
    }

    let val = digits.parse::<f64>().ok()?;
    if !val.is_finite() {
        return None;
    }
    Some(if negative { -val } else { val })
}

/// Formats a number the way an en-US locale groups it: `1,234.5`.
pub fn format_amount(val: f64) -> String {
    if val.is_nan() {
        return "NaN".to_string();
    }
    if val.is_infinite() {
        return if val < 0.0 { "-∞" } else { "∞" }.to_string();
    }

    let (int_part, frac_part) = round_half_expand(&val.abs().to_string(), FRACTION_DIGITS);
    join_grouped(val < 0.0, &int_part, &frac_part)
}

/// Grouped like [`format_amount`] but with every digit kept, so the text
/// parses back to the same value: `1,234.5678`.
pub fn format_amount_exact(val: f64) -> String {
    if !val.is_finite() {
        return format_amount(val);
    }
    let digits = val.abs().to_string();
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), ""));
    join_grouped(val < 0.0, int_part, frac_part)
}

/// Rounds a plain decimal string to `places` fraction digits, ties away from
/// zero. Trailing fraction zeros are dropped.
fn round_half_expand(decimal: &str, places: usize) -> (String, String) {
    let (int_part, frac_part) = decimal.split_once('.').unwrap_or((decimal, ""));
    if frac_part.len() <= places {
        return (int_part.to_string(), frac_part.trim_end_matches('0').to_string());
    }

    let mut digits: Vec<u8> = int_part.bytes().chain(frac_part[..places].bytes()).collect();
    if frac_part.as_bytes()[places] >= b'5' {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - places;
    let int: String = digits[..split].iter().map(|&b| b as char).collect();
    let frac: String = digits[split..].iter().map(|&b| b as char).collect();
    (int, frac.trim_end_matches('0').to_string())
}

fn join_grouped(negative: bool, int_part: &str, frac_part: &str) -> String {
    // -0 and values that round to zero print without a sign.
    let negative =
        negative && (!int_part.trim_start_matches('0').is_empty() || !frac_part.is_empty());

    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3 + frac_part.len() + 2);
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

pub fn format_money(val: f64) -> String {
    format!("${}", format_amount(val))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(350.0), "350");
        assert_eq!(format_amount(1200.0), "1,200");
        assert_eq!(format_amount(1_234_567.0), "1,234,567");
        assert_eq!(format_amount(100_000.0), "100,000");
    }

    #[test]
    fn trims_fraction_to_three_digits() {
        assert_eq!(format_amount(12.5), "12.5");
        assert_eq!(format_amount(1234.25), "1,234.25");
        assert_eq!(format_amount(0.1 + 0.2), "0.3");
        assert_eq!(format_amount(2.0004), "2");
    }

    #[test]
    fn ties_round_away_from_zero() {
        assert_eq!(format_amount(1.0625), "1.063");
        assert_eq!(format_amount(0.0625), "0.063");
        assert_eq!(format_amount(1234.5625), "1,234.563");
        assert_eq!(format_amount(-1.0625), "-1.063");
        assert_eq!(format_amount(999.9995), "1,000");
    }

    #[test]
    fn exact_format_keeps_every_digit() {
        assert_eq!(format_amount_exact(12.3456), "12.3456");
        assert_eq!(format_amount_exact(1234.5678), "1,234.5678");
        assert_eq!(format_amount_exact(1000.0), "1,000");
        assert_eq!(format_amount_exact(-0.0), "0");
        assert_eq!(parse_amount(&format_amount_exact(0.1 + 0.2)), Some(0.1 + 0.2));
    }

    #[test]
    fn negatives_and_zero() {
        assert_eq!(format_amount(-200.0), "-200");
        assert_eq!(format_amount(-1500.75), "-1,500.75");
        assert_eq!(format_amount(-0.0), "0");
        assert_eq!(format_amount(-0.0001), "0");
    }

    #[test]
    fn non_finite_values_do_not_panic() {
        assert_eq!(format_amount(f64::NAN), "NaN");
        assert_eq!(format_amount(f64::INFINITY), "∞");
        assert_eq!(format_amount(f64::NEG_INFINITY), "-∞");
    }

    #[test]
    fn money_prefix() {
        assert_eq!(format_money(1000.0), "$1,000");
        assert_eq!(format_money(0.0), "$0");
    }

    #[test]
    fn parses_plain_and_grouped_amounts() {
        assert_eq!(parse_amount("350"), Some(350.0));
        assert_eq!(parse_amount(" $1,200.50 "), Some(1200.5));
        assert_eq!(parse_amount("$ 75"), Some(75.0));
        assert_eq!(parse_amount("-20"), Some(-20.0));
        assert_eq!(parse_amount("-$20"), Some(-20.0));
        assert_eq!(parse_amount("$-20"), Some(-20.0));
        assert_eq!(parse_amount("12."), Some(12.0));
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("1,20"), None);
        assert_eq!(parse_amount("12,34,567"), None);
        assert_eq!(parse_amount("1e3"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount(".5"), None);
        assert_eq!(parse_amount("$$5"), None);
        assert_eq!(parse_amount("-$-5"), None);
        assert_eq!(parse_amount("--5"), None);
    }

    proptest! {
        #[test]
        fn formatted_integers_parse_back(n in 0u64..1_000_000_000_000) {
            let text = format_money(n as f64);
            prop_assert_eq!(parse_amount(&text), Some(n as f64));
        }

        #[test]
        fn grouping_never_leaves_more_than_three_digits_between_commas(n in 0u64..u64::MAX / 2) {
            let text = format_amount(n as f64);
            let groups: Vec<&str> = text.split(',').collect();
            prop_assert!(groups[0].len() <= 3 && !groups[0].is_empty());
            for g in &groups[1..] {
                prop_assert_eq!(g.len(), 3);
            }
        }
    }
}
