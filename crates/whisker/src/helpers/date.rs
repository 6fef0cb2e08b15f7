//! The `dateFormat` helper.
//!
//! `{{dateFormat date [pattern] [locale]}}` writes `date` using either a
//! named style (`full`, `long`, `medium`, `short`) or a pattern written with
//! the usual date-pattern letters (`yyyy-MM-dd`, `EEEE d MMMM`, ...). The
//! pattern defaults to `medium` and the locale to the engine's default.
//!
//! Named styles follow the conventions of the locale's language: `medium` is
//! `Jun 19, 2012` in English, `19 juin 2012` in French and `19.06.2012` in
//! German. Languages without their own entry use the English layouts.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDateTime, TimeZone, Utc};

use crate::error::{Result, WhiskerError};
use crate::helpers::{HelperResult, Output};
use crate::locale::Locale;
use crate::options::Options;
use crate::value::Value;

const DEFAULT_STYLE: &str = "medium";

/// Date patterns for the `full`, `long`, `medium` and `short` styles.
struct Styles {
    full: &'static str,
    long: &'static str,
    medium: &'static str,
    short: &'static str,
}

const ENGLISH: Styles = Styles {
    full: "EEEE, MMMM d, yyyy",
    long: "MMMM d, yyyy",
    medium: "MMM d, yyyy",
    short: "M/d/yy",
};

static STYLES: &[(&str, Styles)] = &[
    ("en", ENGLISH),
    (
        "de",
        Styles {
            full: "EEEE, d. MMMM yyyy",
            long: "d. MMMM yyyy",
            medium: "dd.MM.yyyy",
            short: "dd.MM.yy",
        },
    ),
    (
        "es",
        Styles {
            full: "EEEE d' de 'MMMM' de 'yyyy",
            long: "d' de 'MMMM' de 'yyyy",
            medium: "d MMM yyyy",
            short: "d/MM/yy",
        },
    ),
    (
        "fr",
        Styles {
            full: "EEEE d MMMM yyyy",
            long: "d MMMM yyyy",
            medium: "d MMM yyyy",
            short: "dd/MM/yy",
        },
    ),
    (
        "it",
        Styles {
            full: "EEEE d MMMM yyyy",
            long: "d MMMM yyyy",
            medium: "d-MMM-yyyy",
            short: "dd/MM/yy",
        },
    ),
    (
        "ja",
        Styles {
            full: "yyyy'年'M'月'd'日' EEEE",
            long: "yyyy/MM/dd",
            medium: "yyyy/MM/dd",
            short: "yy/MM/dd",
        },
    ),
    (
        "nl",
        Styles {
            full: "EEEE d MMMM yyyy",
            long: "d MMMM yyyy",
            medium: "d MMM yyyy",
            short: "d-M-yy",
        },
    ),
    (
        "pt",
        Styles {
            full: "EEEE, d' de 'MMMM' de 'yyyy",
            long: "d' de 'MMMM' de 'yyyy",
            medium: "dd/MM/yyyy",
            short: "dd/MM/yy",
        },
    ),
    (
        "zh",
        Styles {
            full: "yyyy'年'M'月'd'日' EEEE",
            long: "yyyy'年'M'月'd'日'",
            medium: "yyyy-M-d",
            short: "yy-M-d",
        },
    ),
];

/// The pattern behind a named style in `locale`, or `None` if `name` is not
/// a style.
fn style_pattern(name: &str, locale: &Locale) -> Option<&'static str> {
    let styles = STYLES
        .iter()
        .find(|(language, _)| *language == locale.language())
        .map_or(&ENGLISH, |(_, styles)| styles);
    match name {
        "full" => Some(styles.full),
        "long" => Some(styles.long),
        "medium" => Some(styles.medium),
        "short" => Some(styles.short),
        _ => None,
    }
}

pub(super) fn date_format(value: &Value, options: &mut Options<'_>) -> HelperResult {
    let Some(date) = value.as_date() else {
        return Ok(None);
    };
    let pattern = match options.param(0) {
        None | Some(Value::Null) => DEFAULT_STYLE.to_string(),
        Some(pattern) => pattern.to_string(),
    };
    let locale = match options.param(1) {
        None | Some(Value::Null) => options.engine().default_locale().clone(),
        Some(locale) => Locale::parse(&locale.to_string())?,
    };

    let style = style_pattern(&pattern, &locale);
    let format = translate_pattern(style.unwrap_or(pattern.as_str()))?;
    format_date(date, &format, &locale).map(|text| Some(Output::Text(text)))
}

fn format_date(date: &NaiveDateTime, format: &str, locale: &Locale) -> Result<String> {
    let chrono_locale = locale.to_chrono();
    let items: Vec<Item<'_>> = StrftimeItems::new_with_locale(format, chrono_locale).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(WhiskerError::argument_type(format, "a valid date pattern"));
    }

    let mut text = String::new();
    write!(
        text,
        "{}",
        Utc.from_utc_datetime(date)
            .format_localized_with_items(items.into_iter(), chrono_locale)
    )
    .map_err(|_| WhiskerError::argument_type(format, "a valid date pattern"))?;
    Ok(text)
}

/// Translates a date pattern into strftime syntax.
///
/// Letters repeat to choose a width (`M` 6, `MM` 06, `MMM` Jun, `MMMM` June).
/// Text in single quotes is literal and `''` is a quote.
fn translate_pattern(pattern: &str) -> Result<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            loop {
                match chars.get(i) {
                    None => {
                        return Err(WhiskerError::argument_type(
                            pattern,
                            "a date pattern with closed quotes",
                        ))
                    }
                    Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                        out.push('\'');
                        i += 2;
                    }
                    Some('\'') => {
                        i += 1;
                        break;
                    }
                    Some(&ch) => {
                        push_literal(&mut out, ch);
                        i += 1;
                    }
                }
            }
            continue;
        }
        if !c.is_ascii_alphabetic() {
            push_literal(&mut out, c);
            i += 1;
            continue;
        }

        let mut run = 1;
        while chars.get(i + run) == Some(&c) {
            run += 1;
        }
        let field = field(c, run).ok_or_else(|| {
            WhiskerError::argument_type(pattern, format!("a date pattern ('{}' is unknown)", c))
        })?;
        out.push_str(field);
        i += run;
    }
    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

fn field(letter: char, count: usize) -> Option<&'static str> {
    Some(match (letter, count) {
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        ('M', 1) => "%-m",
        ('M', 2) => "%m",
        ('M', 3) => "%b",
        ('M', _) => "%B",
        ('d', 1) => "%-d",
        ('d', _) => "%d",
        ('D', _) => "%j",
        ('E', 1..=3) => "%a",
        ('E', _) => "%A",
        ('u', _) => "%u",
        ('a', _) => "%p",
        ('H', 1) => "%-H",
        ('H', _) => "%H",
        ('h', 1) => "%-I",
        ('h', _) => "%I",
        ('m', 1) => "%-M",
        ('m', _) => "%M",
        ('s', 1) => "%-S",
        ('s', _) => "%S",
        ('S', _) => "%3f",
        ('z', _) => "%Z",
        ('Z', _) => "%z",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn june_19() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2012, 6, 19)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap()
    }

    #[test]
    fn test_translate_pattern() {
        assert_eq!(translate_pattern("yyyy-MM-dd").unwrap(), "%Y-%m-%d");
        assert_eq!(translate_pattern("EEEE, d MMMM yy").unwrap(), "%A, %-d %B %y");
        assert_eq!(translate_pattern("h:mm a").unwrap(), "%-I:%M %p");
        assert_eq!(translate_pattern("yyyy 'at' HH").unwrap(), "%Y at %H");
        assert_eq!(translate_pattern("d'' 100%").unwrap(), "%-d' 100%%");
    }

    #[test]
    fn test_translate_pattern_rejects_unknown_letters() {
        let err = translate_pattern("yyyy q").unwrap_err();
        assert!(matches!(err, WhiskerError::ArgumentType { .. }));
        assert!(translate_pattern("'open").is_err());
    }

    #[test]
    fn test_format_styles_en_us() {
        let locale = Locale::en_us();
        assert_eq!(
            format_date(&june_19(), "%A, %B %-d, %Y", &locale).unwrap(),
            "Tuesday, June 19, 2012"
        );
        assert_eq!(format_date(&june_19(), "%b %-d, %Y", &locale).unwrap(), "Jun 19, 2012");
    }

    #[test]
    fn test_styles_follow_language() {
        let german = Locale::parse("de_DE").unwrap();
        let french = Locale::parse("fr_FR").unwrap();
        let render = |style: &str, locale: &Locale| {
            let format = translate_pattern(style_pattern(style, locale).unwrap()).unwrap();
            format_date(&june_19(), &format, locale).unwrap()
        };

        assert_eq!(render("full", &german), "Dienstag, 19. Juni 2012");
        assert_eq!(render("long", &german), "19. Juni 2012");
        assert_eq!(render("medium", &german), "19.06.2012");
        assert_eq!(render("short", &german), "19.06.12");

        assert_eq!(render("full", &french), "mardi 19 juin 2012");
        assert_eq!(render("long", &french), "19 juin 2012");
        assert_eq!(render("medium", &french), "19 juin 2012");
        assert_eq!(render("short", &french), "19/06/12");
    }

    #[test]
    fn test_unknown_language_uses_english_layout() {
        let locale = Locale::parse("fi_FI").unwrap();
        assert_eq!(style_pattern("medium", &locale), Some(ENGLISH.medium));
        assert_eq!(style_pattern("yyyy", &locale), None);
    }

    #[test]
    fn test_format_pattern() {
        let locale = Locale::en_us();
        let format = translate_pattern("dd/MM/yyyy HH:mm:ss").unwrap();
        assert_eq!(format_date(&june_19(), &format, &locale).unwrap(), "19/06/2012 14:05:09");
    }

    #[test]
    fn test_format_localized_month() {
        let locale = Locale::parse("es_ES").unwrap();
        let format = translate_pattern("EEEE d MMMM").unwrap();
        assert_eq!(format_date(&june_19(), &format, &locale).unwrap(), "martes 19 junio");
    }
}
