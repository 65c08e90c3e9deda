//! Display formatting fixed to Mexican Spanish conventions (MXN)
//!
//! Digits are grouped with `,` in threes and `.` separates decimals. Rounding
//! is half away from zero. Negative values carry a leading `-` (before the
//! currency sign); values that round to zero never show a sign. Non-finite
//! inputs render as `NaN`, `∞` or `-∞` with the same decoration as a number.

/// Decimals used by [`format_currency`] callers that want whole pesos
pub const DEFAULT_CURRENCY_DECIMALS: usize = 0;

/// Decimals used for percentages when none are requested
pub const DEFAULT_PERCENT_DECIMALS: usize = 1;

/// Fraction digits shown by [`format_number`]
const MAX_NUMBER_DECIMALS: usize = 3;

/// Sign and rounded digits of a finite value
///
/// Rounding works on the shortest decimal representation of the value, so
/// `1.005` rounds to `1.01` as written rather than as stored in binary.
struct Fixed {
    negative: bool,
    int_digits: String,
    frac_digits: String,
}

impl Fixed {
    fn new(value: f64, decimals: usize) -> Self {
        // Display for f64 never switches to exponent notation
        let repr = value.abs().to_string();
        let (int_str, frac_str) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

        let mut digits: Vec<u8> = int_str
            .bytes()
            .chain(frac_str.bytes().chain(std::iter::repeat(b'0')).take(decimals))
            .map(|b| b - b'0')
            .collect();

        let round_up = frac_str.as_bytes().get(decimals).is_some_and(|&b| b >= b'5');
        if round_up {
            let mut carry = true;
            for d in digits.iter_mut().rev() {
                if *d == 9 {
                    *d = 0;
                } else {
                    *d += 1;
                    carry = false;
                    break;
                }
            }
            if carry {
                digits.insert(0, 1);
            }
        }

        let split = digits.len() - decimals;
        let render = |ds: &[u8]| ds.iter().map(|&d| char::from(b'0' + d)).collect::<String>();
        let int_digits = render(&digits[..split]);
        let int_digits = match int_digits.trim_start_matches('0') {
            "" => "0".to_string(),
            trimmed => trimmed.to_string(),
        };

        Self {
            negative: value < 0.0 && digits.iter().any(|&d| d != 0),
            int_digits,
            frac_digits: render(&digits[split..]),
        }
    }

    fn sign(&self) -> &'static str {
        if self.negative {
            "-"
        } else {
            ""
        }
    }

    fn fraction(&self) -> String {
        if self.frac_digits.is_empty() {
            String::new()
        } else {
            format!(".{}", self.frac_digits)
        }
    }
}

fn non_finite(value: f64) -> Option<(&'static str, &'static str)> {
    if value.is_nan() {
        Some(("", "NaN"))
    } else if value.is_infinite() {
        Some((if value < 0.0 { "-" } else { "" }, "∞"))
    } else {
        None
    }
}

/// Insert `,` every three digits from the right
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Mexican peso amount, e.g. `$5,447.50`
pub fn format_currency(value: f64, decimals: usize) -> String {
    if let Some((sign, text)) = non_finite(value) {
        return format!("{sign}${text}");
    }
    let fixed = Fixed::new(value, decimals);
    format!("{}${}{}", fixed.sign(), group_digits(&fixed.int_digits), fixed.fraction())
}

/// Grouped number with up to three decimals, trailing zeros dropped
pub fn format_number(value: f64) -> String {
    if let Some((sign, text)) = non_finite(value) {
        return format!("{sign}{text}");
    }
    let fixed = Fixed::new(value, MAX_NUMBER_DECIMALS);
    let fraction = fixed.fraction();
    let fraction = fraction.trim_end_matches('0').trim_end_matches('.');
    format!("{}{}{}", fixed.sign(), group_digits(&fixed.int_digits), fraction)
}

/// Ratio shown as a percentage: `0.15` becomes `15.0%`
pub fn format_percentage(value: f64, decimals: usize) -> String {
    let scaled = value * 100.0;
    if let Some((sign, text)) = non_finite(scaled) {
        return format!("{sign}{text}%");
    }
    let fixed = Fixed::new(scaled, decimals);
    format!("{}{}{}%", fixed.sign(), group_digits(&fixed.int_digits), fixed.fraction())
}

/// Claim frequency as a percentage with two decimals: `0.0147` becomes `1.47%`
pub fn format_frequency(value: f64) -> String {
    format_percentage(value, 2)
}

/// Shorten large magnitudes: `1.5M`, `2.3B`, `12.0K`; smaller values unchanged
pub fn abbreviate(value: f64) -> String {
    if let Some((sign, text)) = non_finite(value) {
        return format!("{sign}{text}");
    }
    let magnitude = value.abs();
    let (divisor, suffix) = if magnitude >= 1e9 {
        (1e9, "B")
    } else if magnitude >= 1e6 {
        (1e6, "M")
    } else if magnitude >= 1e3 {
        (1e3, "K")
    } else if value == 0.0 {
        return "0".to_string();
    } else {
        return value.to_string();
    };
    let fixed = Fixed::new(value / divisor, 1);
    format!("{}{}{}{}", fixed.sign(), fixed.int_digits, fixed.fraction(), suffix)
}
