//! List marker text: counter formatting, `%N` pattern expansion and the font
//! shorthand used to measure the marker.
//!
//! Nothing here fails. A value that cannot be shown (NaN, infinity, zero or
//! negative for letters and numerals) formats to an empty string.

use crate::model::{NumberFormat, NumberingProperties, RunProperties};

pub const DEFAULT_BULLET: &str = "\u{2022}";
pub const DEFAULT_FONT_FAMILY: &str = "Times New Roman";
pub const DEFAULT_FONT_SIZE: f64 = 12.0;
const MAX_FONT_SIZE: f64 = 999.0;
/// Largest value written as Roman numerals (Word's `w:start` ceiling).
/// Larger values are written in decimal.
pub const MAX_ROMAN: f64 = 32767.0;

// `+ 0.0` folds -0.0 into 0.0 so it never prints as "-0".
fn whole(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.floor() + 0.0)
}

pub fn format_decimal(value: f64) -> String {
    match whole(value) {
        Some(v) => format!("{v:.0}"),
        None => String::new(),
    }
}

/// Bijective base-26: 1 → a, 26 → z, 27 → aa.
pub fn to_alpha(value: f64, uppercase: bool) -> String {
    let Some(v) = whole(value).filter(|v| *v >= 1.0) else {
        return String::new();
    };
    let base = if uppercase { b'A' } else { b'a' };
    let mut n = v as u64 - 1;
    let mut result = Vec::new();
    loop {
        result.push(base + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result.reverse();
    String::from_utf8(result).unwrap_or_default()
}

pub fn to_roman(value: f64, uppercase: bool) -> String {
    const TABLE: &[(u64, &str)] = &[
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let Some(v) = whole(value).filter(|v| *v >= 1.0) else {
        return String::new();
    };
    if v > MAX_ROMAN {
        return format_decimal(v);
    }
    let mut n = v as u64;
    let mut result = String::new();
    for &(value, numeral) in TABLE {
        while n >= value {
            result.push_str(numeral);
            n -= value;
        }
    }
    if uppercase {
        result
    } else {
        result.to_lowercase()
    }
}

pub fn apply_format(value: f64, format: NumberFormat) -> String {
    match format {
        NumberFormat::Decimal | NumberFormat::Bullet => format_decimal(value),
        NumberFormat::DecimalZero => match whole(value) {
            Some(v) if (0.0..10.0).contains(&v) => format!("0{v:.0}"),
            _ => format_decimal(value),
        },
        NumberFormat::LowerLetter => to_alpha(value, false),
        NumberFormat::UpperLetter => to_alpha(value, true),
        NumberFormat::LowerRoman => to_roman(value, false),
        NumberFormat::UpperRoman => to_roman(value, true),
        NumberFormat::None => String::new(),
    }
}

/// Marker text for a list paragraph: the bullet glyph, or `lvl_text` with
/// each `%1`..`%9` replaced by the matching entry of the counter path.
pub fn format_marker_text(numbering: &NumberingProperties) -> String {
    if numbering.format == NumberFormat::Bullet {
        let text = normalize_bullet_text(&numbering.lvl_text);
        return if text.is_empty() {
            DEFAULT_BULLET.to_string()
        } else {
            text
        };
    }

    let fallback = [numbering.start.unwrap_or(1)];
    let path: &[i64] = match numbering.path.as_deref() {
        Some(p) if !p.is_empty() => p,
        _ => &fallback,
    };

    let mut out = String::with_capacity(numbering.lvl_text.len() + 4);
    let mut chars = numbering.lvl_text.chars().peekable();
    while let Some(c) = chars.next() {
        let level = match (c, chars.peek().and_then(|d| d.to_digit(10))) {
            ('%', Some(d @ 1..=9)) => d as usize,
            _ => {
                out.push(c);
                continue;
            }
        };
        chars.next();
        let value = path.get(level - 1).or(path.last()).copied().unwrap_or(1);
        out.push_str(&apply_format(value as f64, numbering.format));
    }
    out
}

/// Symbol and Wingdings bullets are stored as private-use code points
/// (U+F0xx). Map the common ones to their Unicode equivalents.
pub fn normalize_bullet_text(text: &str) -> String {
    text.chars()
        .map(|c| {
            let cp = c as u32;
            if (0xF000..=0xF0FF).contains(&cp) {
                symbol_pua_to_unicode(cp).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

fn symbol_pua_to_unicode(cp: u32) -> Option<char> {
    let sym = cp - 0xF000;
    let mapped = match sym {
        0xB7 => '\u{2022}', // bullet •
        0xA7 => '\u{25A0}', // black square ■ (Wingdings §)
        0xA8 => '\u{25CB}', // white circle ○
        0xD8 => '\u{2666}', // diamond ◆
        0x76 => '\u{221A}', // check mark √
        0x6F => '\u{25A1}', // white square □ (Wingdings o)
        0xFC => '\u{2713}', // check mark ✓ (Wingdings ü)
        _ => return char::from_u32(sym),
    };
    Some(mapped)
}

/// `"[italic ][bold ]<size>px <family>"`, the form [`crate::fonts::FontSpec`]
/// parses back.
pub fn build_font_css(run: &RunProperties) -> String {
    let size = run
        .font_size
        .filter(|s| s.is_finite())
        .unwrap_or(DEFAULT_FONT_SIZE)
        .floor()
        .clamp(1.0, MAX_FONT_SIZE);
    let family = run
        .font_family
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_FONT_FAMILY);

    let mut css = String::new();
    if run.italic == Some(true) {
        css.push_str("italic ");
    }
    if run.bold == Some(true) {
        css.push_str("bold ");
    }
    css.push_str(&format!("{size:.0}px {family}"));
    css
}
