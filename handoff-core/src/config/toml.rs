//! Simple TOML parser for the demo configuration
//!
//! This is a minimal line-based parser for the subset the demo config
//! uses. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - `[transfer]`, `[flags]` and `[spi]` section headers
//! - Comments (# ...)
//!
//! Keys that are left out keep their default values.

use super::hardware::Mode;
use super::types::{DemoConfig, Role, MAX_TRANSFER_SIZE};
use crate::traits::ChipSelect;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or unknown section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Key not known in the current section
    UnknownKey,
    /// Numeric value outside its allowed range
    OutOfRange,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Transfer,
    Flags,
    Spi,
}

/// Parse TOML configuration into a `DemoConfig`
///
/// Keys that are left out keep [`DemoConfig::default`] values.
pub fn parse_config(input: &str) -> Result<DemoConfig, ParseError> {
    parse_config_onto(DemoConfig::default(), input)
}

/// Parse TOML configuration on top of `base`
///
/// Boards whose defaults differ from the generic ones start from their
/// own, so a sparse file still yields a configuration they can run.
pub fn parse_config_onto(base: DemoConfig, input: &str) -> Result<DemoConfig, ParseError> {
    let mut config = base;
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let header = header.strip_suffix(']').ok_or(ParseError::InvalidSection)?;
            section = parse_section_header(header)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        apply_value(section, key, value, &mut config)?;
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "transfer" => Ok(Section::Transfer),
        "flags" => Ok(Section::Flags),
        "spi" => Ok(Section::Spi),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut DemoConfig,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Transfer, "size") => {
            let size: usize = parse_int(value)?;
            if size > MAX_TRANSFER_SIZE {
                return Err(ParseError::OutOfRange);
            }
            config.cycle.transfer_size = size;
        }
        (Section::Transfer, "role") => {
            config.cycle.role = match parse_string(value)? {
                "master" => Role::Master,
                "slave" => Role::Slave,
                _ => return Err(ParseError::InvalidValue),
            };
        }
        (Section::Transfer, "timeout_ms") => {
            // 0 waits forever
            let ms: u32 = parse_int(value)?;
            config.cycle.timeout_ms = if ms == 0 { None } else { Some(ms) };
        }
        (Section::Flags, "chip_select") => {
            let index: u8 = parse_int(value)?;
            config.cycle.flags.chip_select =
                ChipSelect::from_index(index).ok_or(ParseError::OutOfRange)?;
        }
        (Section::Flags, "byte_swap") => {
            config.cycle.flags.byte_swap = parse_bool(value)?;
        }
        (Section::Spi, "frequency") => {
            let hz: u32 = parse_int(value)?;
            if hz == 0 {
                return Err(ParseError::OutOfRange);
            }
            config.spi.frequency = hz;
        }
        (Section::Spi, "mode") => {
            let index: u8 = parse_int(value)?;
            let mode = Mode::from_index(index).ok_or(ParseError::OutOfRange)?;
            config.spi = config.spi.with_mode(mode);
        }
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Cut a trailing `#` comment that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Split a comment-free "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let (key, value) = (key.trim(), value.trim());
    (!key.is_empty() && !value.is_empty()).then_some((key, value))
}

/// String value, quoted or bare
fn parse_string(value: &str) -> Result<&str, ParseError> {
    match value.strip_prefix('"') {
        Some(rest) => rest.strip_suffix('"').ok_or(ParseError::InvalidValue),
        None => Ok(value),
    }
}

/// Parse an integer value, allowing `_` separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits = heapless::String::<24>::new();
    for ch in value.chars().filter(|&c| c != '_') {
        digits.push(ch).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClockPhase, Polarity};

    const FULL: &str = r#"
# Board-to-board demo, this board drives the clock
[transfer]
size = 256
role = "master"   # peer runs the slave side
timeout_ms = 1_000

[flags]
chip_select = 1
byte_swap = false

[spi]
frequency = 2_000_000
mode = 3
"#;

    #[test]
    fn test_empty_input_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), DemoConfig::default());
        assert_eq!(parse_config("# only a comment\n").unwrap(), DemoConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config = parse_config(FULL).unwrap();
        assert_eq!(config.cycle.transfer_size, 256);
        assert_eq!(config.cycle.role, Role::Master);
        assert_eq!(config.cycle.timeout_ms, Some(1000));
        assert_eq!(config.cycle.flags.chip_select, ChipSelect::Pcs1);
        assert!(!config.cycle.flags.byte_swap);
        assert_eq!(config.spi.frequency, 2_000_000);
        assert_eq!(config.spi.polarity, Polarity::IdleHigh);
        assert_eq!(config.spi.phase, ClockPhase::CaptureOnSecondTransition);
    }

    #[test]
    fn test_zero_timeout_waits_forever() {
        let config = parse_config("[transfer]\ntimeout_ms = 0\n").unwrap();
        assert_eq!(config.cycle.timeout_ms, None);
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(parse_config("[display]\n"), Err(ParseError::InvalidSection));
    }

    #[test]
    fn test_key_outside_section() {
        assert_eq!(parse_config("size = 4\n"), Err(ParseError::UnknownKey));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_config("[transfer]\nrole = \"observer\"\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[flags]\nbyte_swap = yes\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[transfer]\nsize = -1\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(parse_config("[transfer]\nsize\n"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            parse_config("[transfer]\nsize = 100000\n"),
            Err(ParseError::OutOfRange)
        );
        assert_eq!(
            parse_config("[flags]\nchip_select = 4\n"),
            Err(ParseError::OutOfRange)
        );
        assert_eq!(parse_config("[spi]\nmode = 7\n"), Err(ParseError::OutOfRange));
        assert_eq!(parse_config("[spi]\nfrequency = 0\n"), Err(ParseError::OutOfRange));
    }

    #[test]
    fn test_comments_are_stripped_before_values() {
        let config = parse_config(
            "[transfer] # sizes\nsize = 8# bytes\nrole = \"master\"#peer is slave\n",
        )
        .unwrap();
        assert_eq!(config.cycle.transfer_size, 8);
        assert_eq!(config.cycle.role, Role::Master);
    }

    #[test]
    fn test_hash_inside_string_is_not_a_comment() {
        assert_eq!(
            parse_config("[transfer]\nrole = \"mas#ter\"\n"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_unterminated_values_and_headers() {
        assert_eq!(
            parse_config("[transfer]\nrole = \"master\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(parse_config("[transfer\n"), Err(ParseError::InvalidSection));
    }

    #[test]
    fn test_sparse_file_keeps_base_values() {
        let mut base = DemoConfig::default();
        base.cycle.role = Role::Master;
        base.cycle.flags.byte_swap = false;

        let config = parse_config_onto(base, "[transfer]\nsize = 64\n").unwrap();
        assert_eq!(config.cycle.transfer_size, 64);
        assert_eq!(config.cycle.role, Role::Master);
        assert!(!config.cycle.flags.byte_swap);
    }
}
