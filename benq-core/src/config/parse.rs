//! Minimal TOML reader for the bridge configuration
//!
//! Handles only the subset the configuration needs:
//! - `[projector]` and `[power]` section headers
//! - `key = integer` pairs, with optional `_` digit separators
//! - Comments (`# ...`), whole-line or trailing
//!
//! Keys not listed below are rejected so typos do not silently fall back to
//! defaults.
//!
//! ```toml
//! [projector]
//! poll_interval_ms = 1000
//! send_interval_ms = 100
//! power_off_settle_ms = 120_000
//!
//! [power]
//! minimum_on_s = 300
//! maximum_on_s = 0        # 0 disables the limit
//! minimum_off_s = 120
//! virtual_off_grace_s = 60
//! skip_grace_after_s = 600
//! ```

use super::types::BridgeConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Section header names an unknown section
    InvalidSection { line: usize },
    /// Line is neither a header, a comment nor `key = value`
    MalformedLine { line: usize },
    /// Key before any section header
    KeyOutsideSection { line: usize },
    /// Key not known in its section
    UnknownKey { line: usize },
    /// Value is not an integer in range
    InvalidValue { line: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Projector,
    Power,
}

/// Parse TOML text into a [`BridgeConfig`]
///
/// Missing keys keep their defaults. Line numbers in errors start at 1.
pub fn parse_config(input: &str) -> Result<BridgeConfig, ParseError> {
    let mut config = BridgeConfig::default();
    let mut section = Section::Root;

    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(ParseError::MalformedLine { line: line_no })?;
            section = match name.trim() {
                "projector" => Section::Projector,
                "power" => Section::Power,
                _ => return Err(ParseError::InvalidSection { line: line_no }),
            };
            continue;
        }

        let (key, value) =
            parse_key_value(line).ok_or(ParseError::MalformedLine { line: line_no })?;
        let value = parse_int(value).ok_or(ParseError::InvalidValue { line: line_no })?;
        apply_value(&mut config, section, key, value, line_no)?;
    }

    Ok(config)
}

fn apply_value(
    config: &mut BridgeConfig,
    section: Section,
    key: &str,
    value: u32,
    line: usize,
) -> Result<(), ParseError> {
    let field = match section {
        Section::Root => return Err(ParseError::KeyOutsideSection { line }),
        Section::Projector => {
            let projector = &mut config.projector;
            match key {
                "poll_interval_ms" => &mut projector.poll_interval_ms,
                "send_interval_ms" => &mut projector.send_interval_ms,
                "power_off_settle_ms" => &mut projector.power_off_settle_ms,
                _ => return Err(ParseError::UnknownKey { line }),
            }
        }
        Section::Power => {
            let power = &mut config.power;
            match key {
                "minimum_on_s" => &mut power.minimum_on_s,
                "maximum_on_s" => &mut power.maximum_on_s,
                "minimum_off_s" => &mut power.minimum_off_s,
                "virtual_off_grace_s" => &mut power.virtual_off_grace_s,
                "skip_grace_after_s" => &mut power.skip_grace_after_s,
                _ => return Err(ParseError::UnknownKey { line }),
            }
        }
    };

    // Intervals of zero would let the engine spin on the link
    let must_be_positive = matches!(key, "poll_interval_ms" | "send_interval_ms");
    if must_be_positive && value == 0 {
        return Err(ParseError::InvalidValue { line });
    }

    *field = value;
    Ok(())
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a decimal integer that may contain `_` separators
fn parse_int(value: &str) -> Option<u32> {
    if value.starts_with('_') || value.ends_with('_') {
        return None;
    }

    let mut result: u32 = 0;
    let mut digits = 0;
    for c in value.chars() {
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(10)?;
        result = result.checked_mul(10)?.checked_add(digit)?;
        digits += 1;
    }

    (digits > 0).then_some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PowerPolicy;

    #[test]
    fn test_parse_full_config() {
        let input = r#"
# Bridge configuration
[projector]
poll_interval_ms = 2000
send_interval_ms = 150   # slow link
power_off_settle_ms = 90_000

[power]
minimum_on_s = 600
maximum_on_s = 14_400
minimum_off_s = 180
virtual_off_grace_s = 30
skip_grace_after_s = 900
"#;
        let config = parse_config(input).unwrap();
        assert_eq!(config.projector.poll_interval_ms, 2_000);
        assert_eq!(config.projector.send_interval_ms, 150);
        assert_eq!(config.projector.power_off_settle_ms, 90_000);
        assert_eq!(
            config.power,
            PowerPolicy {
                minimum_on_s: 600,
                maximum_on_s: 14_400,
                minimum_off_s: 180,
                virtual_off_grace_s: 30,
                skip_grace_after_s: 900,
            }
        );
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let config = parse_config("[power]\nmaximum_on_s = 3600\n").unwrap();
        assert_eq!(config.power.maximum_on_s, 3_600);
        assert_eq!(config.power.minimum_on_s, 300);
        assert_eq!(config.projector, Default::default());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_config(""), Ok(BridgeConfig::default()));
    }

    #[test]
    fn test_errors_carry_line() {
        assert_eq!(
            parse_config("[projector]\n\nbaud = 9600"),
            Err(ParseError::UnknownKey { line: 3 })
        );
        assert_eq!(
            parse_config("[display]"),
            Err(ParseError::InvalidSection { line: 1 })
        );
        assert_eq!(
            parse_config("poll_interval_ms = 1000"),
            Err(ParseError::KeyOutsideSection { line: 1 })
        );
        assert_eq!(
            parse_config("[power]\nminimum_on_s"),
            Err(ParseError::MalformedLine { line: 2 })
        );
        assert_eq!(
            parse_config("[power\n"),
            Err(ParseError::MalformedLine { line: 1 })
        );
    }

    #[test]
    fn test_invalid_values() {
        for value in ["-5", "ten", "1__", "_1", "99999999999", "\"300\""] {
            let input = format!("[power]\nminimum_on_s = {}", value);
            assert_eq!(
                parse_config(&input),
                Err(ParseError::InvalidValue { line: 2 }),
                "value {:?}",
                value
            );
        }
    }

    #[test]
    fn test_zero_send_interval_rejected() {
        assert_eq!(
            parse_config("[projector]\nsend_interval_ms = 0"),
            Err(ParseError::InvalidValue { line: 2 })
        );
        // Zero is meaningful for the on-time limit
        assert!(parse_config("[power]\nmaximum_on_s = 0").is_ok());
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("120_000"), Some(120_000));
        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("_"), None);
    }
}
