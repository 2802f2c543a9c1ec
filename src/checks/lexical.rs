//! Lexical spaces of the XSD datatypes the datatype checker understands.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use oxigraph::model::NamedNodeRef;
use regex::Regex;

use crate::vocab::xsd;

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("valid regex"));
static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)$").expect("valid regex"));
static DOUBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?|[+-]?INF|NaN)$")
        .expect("valid regex")
});
static G_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?([1-9][0-9]{3,}|0[0-9]{3})(Z|[+-][0-9]{2}:[0-9]{2})?$").expect("valid regex")
});
static TIMEZONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(Z|[+-][0-9]{2}:[0-9]{2})$").expect("valid regex"));
static LANGUAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*$").expect("valid regex"));

/// Direct base type of each derived XSD type this module knows.
const DERIVED_FROM: &[(NamedNodeRef<'static>, NamedNodeRef<'static>)] = &[
    (xsd::INTEGER, xsd::DECIMAL),
    (xsd::NON_NEGATIVE_INTEGER, xsd::INTEGER),
    (xsd::NON_POSITIVE_INTEGER, xsd::INTEGER),
    (xsd::LONG, xsd::INTEGER),
    (xsd::POSITIVE_INTEGER, xsd::NON_NEGATIVE_INTEGER),
    (xsd::UNSIGNED_LONG, xsd::NON_NEGATIVE_INTEGER),
    (xsd::NEGATIVE_INTEGER, xsd::NON_POSITIVE_INTEGER),
    (xsd::INT, xsd::LONG),
    (xsd::SHORT, xsd::INT),
    (xsd::BYTE, xsd::SHORT),
    (xsd::UNSIGNED_INT, xsd::UNSIGNED_LONG),
    (xsd::UNSIGNED_SHORT, xsd::UNSIGNED_INT),
    (xsd::UNSIGNED_BYTE, xsd::UNSIGNED_SHORT),
    (xsd::NORMALIZED_STRING, xsd::STRING),
    (xsd::TOKEN, xsd::NORMALIZED_STRING),
    (xsd::LANGUAGE, xsd::TOKEN),
];

/// Inclusive bounds of the integer-derived types.
const INTEGER_BOUNDS: &[(NamedNodeRef<'static>, i128, i128)] = &[
    (xsd::INTEGER, i128::MIN, i128::MAX),
    (xsd::NON_NEGATIVE_INTEGER, 0, i128::MAX),
    (xsd::POSITIVE_INTEGER, 1, i128::MAX),
    (xsd::NON_POSITIVE_INTEGER, i128::MIN, 0),
    (xsd::NEGATIVE_INTEGER, i128::MIN, -1),
    (xsd::LONG, i64::MIN as i128, i64::MAX as i128),
    (xsd::INT, i32::MIN as i128, i32::MAX as i128),
    (xsd::SHORT, i16::MIN as i128, i16::MAX as i128),
    (xsd::BYTE, i8::MIN as i128, i8::MAX as i128),
    (xsd::UNSIGNED_LONG, 0, u64::MAX as i128),
    (xsd::UNSIGNED_INT, 0, u32::MAX as i128),
    (xsd::UNSIGNED_SHORT, 0, u16::MAX as i128),
    (xsd::UNSIGNED_BYTE, 0, u8::MAX as i128),
];

/// Whether `datatype` is `base` or derived from it by restriction.
pub fn is_derived_from(datatype: NamedNodeRef<'_>, base: NamedNodeRef<'_>) -> bool {
    let mut current = datatype;
    loop {
        if current == base {
            return true;
        }
        match DERIVED_FROM.iter().find(|(derived, _)| *derived == current) {
            Some((_, parent)) => current = *parent,
            None => return false,
        }
    }
}

fn integer_bounds(datatype: NamedNodeRef<'_>) -> Option<(i128, i128)> {
    INTEGER_BOUNDS
        .iter()
        .find(|(integer, _, _)| *integer == datatype)
        .map(|(_, min, max)| (*min, *max))
}

fn valid_integer(lexical: &str, (min, max): (i128, i128)) -> bool {
    if !INTEGER.is_match(lexical) {
        return false;
    }
    match lexical.parse::<i128>() {
        Ok(value) => (min..=max).contains(&value),
        // Beyond i128: only the unbounded types can hold it, and only on
        // the side they are unbounded.
        Err(_) => {
            let negative = lexical.starts_with('-');
            (negative && min == i128::MIN) || (!negative && max == i128::MAX)
        }
    }
}

fn strip_timezone(lexical: &str) -> &str {
    match TIMEZONE.find(lexical) {
        Some(tz) => &lexical[..tz.start()],
        None => lexical,
    }
}

fn valid_date(lexical: &str) -> bool {
    NaiveDate::parse_from_str(strip_timezone(lexical), "%Y-%m-%d").is_ok()
}

fn valid_date_time(lexical: &str) -> bool {
    NaiveDateTime::parse_from_str(strip_timezone(lexical), "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

fn valid_time(lexical: &str) -> bool {
    NaiveTime::parse_from_str(strip_timezone(lexical), "%H:%M:%S%.f").is_ok()
}

/// Checks `lexical` against the lexical space of `datatype`.
///
/// Returns `None` for datatypes this module does not know.
pub fn in_lexical_space(lexical: &str, datatype: NamedNodeRef<'_>) -> Option<bool> {
    if let Some(bounds) = integer_bounds(datatype) {
        return Some(valid_integer(lexical, bounds));
    }
    let valid = if datatype == xsd::STRING {
        true
    } else if datatype == xsd::NORMALIZED_STRING {
        !lexical.contains(['\n', '\r', '\t'])
    } else if datatype == xsd::TOKEN {
        !lexical.contains(['\n', '\r', '\t'])
            && !lexical.starts_with(' ')
            && !lexical.ends_with(' ')
            && !lexical.contains("  ")
    } else if datatype == xsd::LANGUAGE {
        LANGUAGE.is_match(lexical)
    } else if datatype == xsd::BOOLEAN {
        matches!(lexical, "true" | "false" | "1" | "0")
    } else if datatype == xsd::DECIMAL {
        DECIMAL.is_match(lexical)
    } else if datatype == xsd::DOUBLE || datatype == xsd::FLOAT {
        DOUBLE.is_match(lexical)
    } else if datatype == xsd::DATE {
        valid_date(lexical)
    } else if datatype == xsd::DATE_TIME {
        valid_date_time(lexical)
    } else if datatype == xsd::TIME {
        valid_time(lexical)
    } else if datatype == xsd::G_YEAR {
        G_YEAR.is_match(lexical)
    } else if datatype == xsd::ANY_URI {
        !lexical.chars().any(char::is_whitespace)
    } else {
        return None;
    };
    Some(valid)
}
