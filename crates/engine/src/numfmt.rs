//! printf-style rendering for Number cells.
//!
//! Supports `%[flags][width][.precision]conv` with flags `- + space 0 #`,
//! conversions `f F e E g G d i`, and `%%`. Length modifiers (`l`, `h`, ...)
//! are accepted and ignored. Unknown conversions are copied through verbatim.
//! Every conversion consumes the same value.

/// Format used when a Number cell carries none.
pub const DEFAULT_FORMAT: &str = "%f";

const MAX_FIELD: usize = 512;

#[derive(Debug, Default)]
struct Conversion {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alt: bool,
    width: usize,
    precision: Option<usize>,
    conv: char,
}

pub fn format_number(format: &str, value: f64) -> String {
    let mut out = String::with_capacity(format.len() + 16);
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }

        let mut raw = String::from("%");
        let mut spec = Conversion::default();

        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.left = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                '0' => spec.zero = true,
                '#' => spec.alt = true,
                _ => break,
            }
            raw.push(flag);
            chars.next();
        }

        spec.width = take_digits(&mut chars, &mut raw);
        if chars.peek() == Some(&'.') {
            raw.push('.');
            chars.next();
            spec.precision = Some(take_digits(&mut chars, &mut raw));
        }

        while let Some(&m) = chars.peek() {
            if !matches!(m, 'l' | 'h' | 'L' | 'q' | 'j' | 'z' | 't') {
                break;
            }
            raw.push(m);
            chars.next();
        }

        match chars.next() {
            Some(conv @ ('f' | 'F' | 'e' | 'E' | 'g' | 'G' | 'd' | 'i')) => {
                spec.conv = conv;
                out.push_str(&render(&spec, value));
            }
            Some(other) => {
                raw.push(other);
                out.push_str(&raw);
            }
            None => out.push_str(&raw),
        }
    }

    out
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, raw: &mut String) -> usize {
    let mut n: usize = 0;
    while let Some(&d) = chars.peek() {
        let Some(v) = d.to_digit(10) else { break };
        n = (n * 10 + v as usize).min(MAX_FIELD);
        raw.push(d);
        chars.next();
    }
    n
}

fn render(spec: &Conversion, value: f64) -> String {
    let upper = spec.conv.is_ascii_uppercase();
    let integer = matches!(spec.conv, 'd' | 'i');

    let negative = if integer {
        value.trunc() < 0.0
    } else {
        value.is_sign_negative() && !value.is_nan()
    };
    let magnitude = value.abs();

    let (body, finite) = if !magnitude.is_finite() {
        let word = if magnitude.is_nan() { "nan" } else { "inf" };
        let word = if upper { word.to_ascii_uppercase() } else { word.to_string() };
        (word, false)
    } else {
        let body = match spec.conv.to_ascii_lowercase() {
            'f' => fixed(magnitude, spec.precision.unwrap_or(6), spec.alt),
            'e' => exponential(magnitude, spec.precision.unwrap_or(6), spec.alt, upper),
            'g' => general(magnitude, spec.precision.unwrap_or(6), spec.alt, upper),
            _ => whole(magnitude, spec.precision),
        };
        (body, true)
    };

    let sign = if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    };

    let zero_pad = spec.zero && finite && !(integer && spec.precision.is_some());
    pad(sign, &body, spec.width, spec.left, zero_pad)
}

fn pad(sign: &str, body: &str, width: usize, left: bool, zero: bool) -> String {
    let len = sign.len() + body.len();
    if len >= width {
        return format!("{sign}{body}");
    }
    let fill = width - len;
    if left {
        format!("{sign}{body}{}", " ".repeat(fill))
    } else if zero {
        format!("{sign}{}{body}", "0".repeat(fill))
    } else {
        format!("{}{sign}{body}", " ".repeat(fill))
    }
}

fn fixed(magnitude: f64, precision: usize, alt: bool) -> String {
    let mut s = format!("{:.*}", precision, magnitude);
    if alt && precision == 0 {
        s.push('.');
    }
    s
}

fn decimal_exponent(magnitude: f64, precision: usize) -> i32 {
    if magnitude == 0.0 {
        return 0;
    }
    let s = format!("{:.*e}", precision, magnitude);
    s.split_once('e').and_then(|(_, e)| e.parse().ok()).unwrap_or(0)
}

fn exponential(magnitude: f64, precision: usize, alt: bool, upper: bool) -> String {
    let s = format!("{:.*e}", precision, magnitude);
    let (mantissa, exp) = match s.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => (s.clone(), 0),
    };
    let mut mantissa = mantissa;
    if alt && precision == 0 {
        mantissa.push('.');
    }
    format!(
        "{}{}{}{:02}",
        mantissa,
        if upper { 'E' } else { 'e' },
        if exp < 0 { '-' } else { '+' },
        exp.unsigned_abs()
    )
}

fn general(magnitude: f64, precision: usize, alt: bool, upper: bool) -> String {
    let p = precision.max(1);
    let exp = decimal_exponent(magnitude, p - 1);

    let s = if exp < -4 || exp >= p as i32 {
        exponential(magnitude, p - 1, alt, upper)
    } else {
        fixed(magnitude, (p as i32 - 1 - exp) as usize, alt)
    };
    if alt {
        return s;
    }

    match s.find(['e', 'E']) {
        Some(pos) => {
            let (mantissa, exp) = s.split_at(pos);
            format!("{}{}", strip_fraction_zeros(mantissa), exp)
        }
        None => strip_fraction_zeros(&s).to_string(),
    }
}

fn strip_fraction_zeros(s: &str) -> &str {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.')
}

fn whole(magnitude: f64, precision: Option<usize>) -> String {
    let n = magnitude.trunc();
    let digits = if n >= u64::MAX as f64 { u64::MAX.to_string() } else { (n as u64).to_string() };
    match precision {
        Some(0) if n == 0.0 => String::new(),
        Some(p) if digits.len() < p => format!("{}{}", "0".repeat(p - digits.len()), digits),
        _ => digits,
    }
}

/// Parse the longest numeric prefix of `text`, `atof` style.
///
/// Leading whitespace is skipped; text without a numeric prefix yields 0.0.
/// `inf`/`nan` prefixes are recognized so callers can reject them.
pub fn parse_leading_f64(text: &str) -> f64 {
    let t = text.trim_start();
    let bytes = t.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let sign_len = end;

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        let frac_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        mantissa_digits += end - frac_start;
    }

    if mantissa_digits == 0 {
        let rest = t[sign_len..].to_ascii_lowercase();
        let negative = t.starts_with('-');
        return if rest.starts_with("inf") {
            if negative { f64::NEG_INFINITY } else { f64::INFINITY }
        } else if rest.starts_with("nan") {
            f64::NAN
        } else {
            0.0
        };
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        if exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
                exp_end += 1;
            }
            end = exp_end;
        }
    }

    t[..end].parse::<f64>().unwrap_or(0.0)
}
