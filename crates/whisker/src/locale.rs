//! Locale identifiers for date formatting.
//!
//! Locales are written `ll`, `ll_CC` or `ll_CC_variant`: a lowercase
//! two-letter language, an optional uppercase two-letter country and an
//! optional free-form variant. `ll__variant` (no country) is also accepted.
//!
//! The platform default comes from `LC_ALL`, `LC_TIME` or `LANG`, in that
//! order, with any `.encoding` or `@modifier` suffix dropped. It falls back to
//! `en_US`.

use std::fmt;

use once_cell::sync::Lazy;

use crate::error::{Result, WhiskerError};

const EXPECTED_FORMAT: &str = "locale of the form ll, ll_CC or ll_CC_variant";

static PLATFORM_LOCALE: Lazy<Locale> = Lazy::new(|| {
    ["LC_ALL", "LC_TIME", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|raw| {
            let name = raw.split(['.', '@']).next().unwrap_or_default();
            Locale::parse(name).ok()
        })
        .unwrap_or_else(Locale::en_us)
});

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    country: Option<String>,
    variant: Option<String>,
}

impl Locale {
    /// Parses a locale string, rejecting anything outside the accepted grammar.
    pub fn parse(input: &str) -> Result<Locale> {
        let invalid = || WhiskerError::argument_type(input, EXPECTED_FORMAT);
        if !input.is_ascii() {
            return Err(invalid());
        }
        let bytes = input.as_bytes();
        let len = bytes.len();
        if len != 2 && len != 5 && len < 7 {
            return Err(invalid());
        }
        if !bytes[0].is_ascii_lowercase() || !bytes[1].is_ascii_lowercase() {
            return Err(invalid());
        }
        let language = input[..2].to_string();
        if len == 2 {
            return Ok(Locale {
                language,
                country: None,
                variant: None,
            });
        }
        if bytes[2] != b'_' {
            return Err(invalid());
        }
        if bytes[3] == b'_' {
            return Ok(Locale {
                language,
                country: None,
                variant: Some(input[4..].to_string()),
            });
        }
        if !bytes[3].is_ascii_uppercase() || !bytes[4].is_ascii_uppercase() {
            return Err(invalid());
        }
        let country = Some(input[3..5].to_string());
        if len == 5 {
            return Ok(Locale {
                language,
                country,
                variant: None,
            });
        }
        if bytes[5] != b'_' {
            return Err(invalid());
        }
        Ok(Locale {
            language,
            country,
            variant: Some(input[6..].to_string()),
        })
    }

    pub fn en_us() -> Locale {
        Locale {
            language: "en".into(),
            country: Some("US".into()),
            variant: None,
        }
    }

    /// The locale configured for this process.
    pub fn platform() -> Locale {
        PLATFORM_LOCALE.clone()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// The closest locale chrono has data for.
    ///
    /// Tries `ll_CC@variant`, `ll_CC`, then `ll_LL` (so `fr` finds `fr_FR`),
    /// and finally the POSIX locale.
    pub(crate) fn to_chrono(&self) -> chrono::Locale {
        let mut candidates = Vec::with_capacity(3);
        if let Some(country) = &self.country {
            if let Some(variant) = &self.variant {
                candidates.push(format!("{}_{}@{}", self.language, country, variant));
            }
            candidates.push(format!("{}_{}", self.language, country));
        }
        candidates.push(format!("{}_{}", self.language, self.language.to_ascii_uppercase()));

        candidates
            .iter()
            .find_map(|name| chrono::Locale::try_from(name.as_str()).ok())
            .unwrap_or_else(|| {
                log::trace!("no date data for locale {}, using POSIX", self);
                chrono::Locale::POSIX
            })
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        match (&self.country, &self.variant) {
            (Some(country), Some(variant)) => write!(f, "_{}_{}", country, variant),
            (Some(country), None) => write!(f, "_{}", country),
            (None, Some(variant)) => write!(f, "__{}", variant),
            (None, None) => Ok(()),
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = WhiskerError;

    fn from_str(s: &str) -> Result<Self> {
        Locale::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language_only() {
        let locale = Locale::parse("es").unwrap();
        assert_eq!(locale.language(), "es");
        assert_eq!(locale.country(), None);
    }

    #[test]
    fn test_parse_with_country_and_variant() {
        let locale = Locale::parse("ca_ES_valencia").unwrap();
        assert_eq!(locale.country(), Some("ES"));
        assert_eq!(locale.variant(), Some("valencia"));
        assert_eq!(locale.to_string(), "ca_ES_valencia");
    }

    #[test]
    fn test_parse_variant_without_country() {
        let locale = Locale::parse("en__POSIX").unwrap();
        assert_eq!(locale.country(), None);
        assert_eq!(locale.variant(), Some("POSIX"));
        assert_eq!(locale.to_string(), "en__POSIX");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["", "e", "EN", "en-US", "en_us", "en_USx", "eng", "en_U", "ñe"] {
            let err = Locale::parse(input).unwrap_err();
            assert!(
                matches!(err, WhiskerError::ArgumentType { .. }),
                "{} gave {:?}",
                input,
                err
            );
        }
    }

    #[test]
    fn test_to_chrono_fallbacks() {
        assert!(matches!(Locale::en_us().to_chrono(), chrono::Locale::en_US));
        assert!(matches!(
            Locale::parse("fr").unwrap().to_chrono(),
            chrono::Locale::fr_FR
        ));
        assert!(matches!(
            Locale::parse("zz").unwrap().to_chrono(),
            chrono::Locale::POSIX
        ));
    }
}
