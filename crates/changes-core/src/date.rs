//! Release date recognition.
//!
//! Dates sit between `(...)` or `[...]` after the version. The text inside
//! is classified, in order, as a full numeric date, a month/year pair, a
//! day/month/year triple with a long month name, or a free-form label.
//! This module is pure: document-wide separator consistency is enforced by
//! the parser when it commits to a header.

use std::borrow::Cow;

use memchr::memchr;

use crate::ast::{DateDelimiter, DateFormat, MonthStyle, ReleaseDate};
use crate::error::ParseError;
use crate::lexer::{trim_blanks, BLANKS};
use crate::span::Span;

pub const SHORT_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub const LONG_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Look up a month name in either table, case-insensitively.
///
/// `May` matches both tables and is reported as short.
pub fn month_number(name: &str) -> Option<(u8, MonthStyle)> {
    if let Some(i) = SHORT_MONTHS.iter().position(|m| m.eq_ignore_ascii_case(name)) {
        return Some((i as u8 + 1, MonthStyle::Short));
    }
    long_month_number(name).map(|m| (m, MonthStyle::Long))
}

/// Look up a long month name, case-insensitively.
pub fn long_month_number(name: &str) -> Option<u8> {
    LONG_MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u8 + 1)
}

/// Parse a delimited date at the start of `text`.
///
/// `text` must start with `(` or `[`; `base` is its byte offset in the
/// whole input, used for error spans. Returns the date and the number of
/// bytes consumed, closing delimiter included.
pub(crate) fn parse_date(text: &str, base: usize) -> Result<(ReleaseDate<'_>, usize), ParseError> {
    let delimiter = match text.as_bytes().first() {
        Some(b'(') => DateDelimiter::Parens,
        Some(b'[') => DateDelimiter::Brackets,
        _ => {
            return Err(ParseError::invalid_date(
                text,
                Span::from_range(base, base + text.len()),
            ))
        }
    };
    let (open, close) = delimiter.chars();

    let close_pos = match memchr(close as u8, &text.as_bytes()[1..]) {
        Some(pos) => pos + 1,
        None => {
            return Err(ParseError::unclosed_delimiter(
                open,
                close,
                Span::from_range(base, base + 1),
            ))
        }
    };

    let inner = trim_blanks(&text[1..close_pos]);
    match classify(inner) {
        Some(format) => Ok((ReleaseDate { format, delimiter }, close_pos + 1)),
        None => Err(ParseError::invalid_date(
            inner,
            Span::from_range(base + 1, base + close_pos),
        )),
    }
}

fn classify(text: &str) -> Option<DateFormat<'_>> {
    if text.is_empty() {
        return None;
    }

    // Text made only of digits and separators must be a well-formed full date.
    let numeric = text
        .bytes()
        .all(|b| b.is_ascii_digit() || b == b'-' || b == b'/');
    if numeric && text.bytes().any(|b| b == b'-' || b == b'/') {
        return full_date(text);
    }

    let mut words = text.split(BLANKS).filter(|word| !word.is_empty());
    match (words.next(), words.next(), words.next(), words.next()) {
        (Some(month), Some(year), None, None) if is_digits(year) => {
            if let Some((month, style)) = month_number(month) {
                return Some(DateFormat::MonthYear {
                    month,
                    year: Cow::Borrowed(year),
                    style,
                });
            }
        }
        (Some(day), Some(month), Some(year), None)
            if is_digits(day) && is_digits(year) && long_month_number(month).is_some() =>
        {
            return Some(DateFormat::DayMonthYear {
                day: Cow::Borrowed(day),
                month: Cow::Borrowed(month),
                year: Cow::Borrowed(year),
            });
        }
        _ => {}
    }

    if text.chars().all(|c| c.is_alphanumeric() || c == ' ') {
        Some(DateFormat::Custom(Cow::Borrowed(text)))
    } else {
        None
    }
}

fn full_date(text: &str) -> Option<DateFormat<'_>> {
    let separator = text.bytes().find(|&b| b == b'-' || b == b'/')? as char;
    let mut parts = text.split(separator);
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || ![year, month, day].iter().all(|p| is_digits(p)) {
        return None;
    }
    Some(DateFormat::Full {
        year: Cow::Borrowed(year),
        month: Cow::Borrowed(month),
        day: Cow::Borrowed(day),
        separator,
    })
}

#[inline]
fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    fn date(text: &str) -> DateFormat<'_> {
        parse_date(text, 0).unwrap().0.format
    }

    #[test]
    fn test_month_tables() {
        assert_eq!(month_number("jan"), Some((1, MonthStyle::Short)));
        assert_eq!(month_number("December"), Some((12, MonthStyle::Long)));
        assert_eq!(month_number("May"), Some((5, MonthStyle::Short)));
        assert_eq!(month_number("Janvier"), None);
        assert_eq!(long_month_number("Sep"), None);
        assert_eq!(long_month_number("september"), Some(9));
    }

    #[test]
    fn test_full_date_keeps_padding() {
        assert_eq!(
            date("(2018-07-10)"),
            DateFormat::Full {
                year: "2018".into(),
                month: "07".into(),
                day: "10".into(),
                separator: '-',
            }
        );
        assert!(matches!(
            date("[2018/7/1]"),
            DateFormat::Full { separator: '/', .. }
        ));
    }

    #[test]
    fn test_month_year_and_day_month_year() {
        assert_eq!(
            date("[Mar 2019]"),
            DateFormat::MonthYear {
                month: 3,
                year: "2019".into(),
                style: MonthStyle::Short,
            }
        );
        assert_eq!(
            date("(12 March 2019)"),
            DateFormat::DayMonthYear {
                day: "12".into(),
                month: "March".into(),
                year: "2019".into(),
            }
        );
        // Short names are not accepted in the three-part form.
        assert_eq!(date("(12 Mar 2019)"), DateFormat::Custom("12 Mar 2019".into()));
    }

    #[test]
    fn test_custom_label() {
        assert_eq!(date("( unreleased )"), DateFormat::Custom("unreleased".into()));
        assert_eq!(date("(not yet)"), DateFormat::Custom("not yet".into()));
    }

    #[test]
    fn test_consumed_length() {
        let (_, used) = parse_date("(2020-01-01): rest", 0).unwrap();
        assert_eq!(used, "(2020-01-01)".len());
    }

    #[test]
    fn test_malformed_dates() {
        for text in ["(2020-01)", "(2020-01/02)", "(2020--01)", "()", "(soon!)"] {
            let err = parse_date(text, 0).unwrap_err();
            assert_eq!(err.kind, ParseErrorKind::InvalidDate, "{}", text);
        }
        let err = parse_date("(2020-01-01", 10).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnclosedDelimiter);
        assert_eq!(err.span, Span::new(10, 11));
    }
}
