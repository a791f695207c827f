//! Build script for handoff-firmware
//!
//! - Sets up linker search paths and scripts for memory.x
//! - Validates demo.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Largest transfer the firmware has buffers for
const MAX_TRANSFER_SIZE: i64 = 4096;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate demo.toml at compile time
///
/// The firmware's own parser falls back to defaults on bad input; this
/// catches the mistake before it ever reaches the board.
fn validate_config() {
    println!("cargo:rerun-if-changed=demo.toml");

    let config_path = Path::new("demo.toml");
    if !config_path.exists() {
        fail(
            "demo.toml not found",
            &["The firmware embeds demo.toml from the crate directory.".to_string()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read demo.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in demo.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    check_sections(&config, &mut errors);
    check_transfer(&config, &mut errors);
    check_flags(&config, &mut errors);
    check_spi(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in demo.toml", &errors);
    }

    println!("cargo:warning=demo.toml validated successfully");
}

/// Print a boxed error and stop the build
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let truncated = if line.chars().count() > 62 {
                format!("{}...", line.chars().take(59).collect::<String>())
            } else {
                line.clone()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}

fn table<'a>(config: &'a toml::Value, name: &str) -> Option<&'a toml::value::Table> {
    config.get(name).and_then(|v| v.as_table())
}

/// Only the known sections, and each must be a table
fn check_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let root = match config.as_table() {
        Some(t) => t,
        None => return,
    };

    for (name, value) in root {
        if !["transfer", "flags", "spi"].contains(&name.as_str()) {
            errors.push(format!("unknown section or key '{}'", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

fn check_keys(section: &str, table: &toml::value::Table, known: &[&str], errors: &mut Vec<String>) {
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            errors.push(format!("[{}] unknown key '{}'", section, key));
        }
    }
}

fn check_transfer(config: &toml::Value, errors: &mut Vec<String>) {
    let transfer = match table(config, "transfer") {
        Some(t) => t,
        None => return,
    };
    check_keys("transfer", transfer, &["size", "role", "timeout_ms"], errors);

    match transfer.get("size") {
        Some(toml::Value::Integer(size)) if (0..=MAX_TRANSFER_SIZE).contains(size) => {}
        Some(_) => errors.push(format!(
            "[transfer] size must be an integer 0-{}",
            MAX_TRANSFER_SIZE
        )),
        None => {}
    }

    // The RP2040 bus only drives the clock; the slave side runs on the peer
    match transfer.get("role") {
        Some(toml::Value::String(role)) if role == "master" => {}
        Some(toml::Value::String(role)) if role == "slave" => {
            errors.push("[transfer] role 'slave' is not supported on RP2040, use 'master'".to_string())
        }
        Some(_) => errors.push("[transfer] role must be 'master'".to_string()),
        None => {}
    }

    match transfer.get("timeout_ms") {
        Some(toml::Value::Integer(ms)) if (0..=u32::MAX as i64).contains(ms) => {}
        Some(_) => errors.push("[transfer] timeout_ms must be a non-negative integer".to_string()),
        None => {}
    }
}

fn check_flags(config: &toml::Value, errors: &mut Vec<String>) {
    let flags = match table(config, "flags") {
        Some(t) => t,
        None => return,
    };
    check_keys("flags", flags, &["chip_select", "byte_swap"], errors);

    match flags.get("chip_select") {
        Some(toml::Value::Integer(cs)) if (0..=3).contains(cs) => {}
        Some(_) => errors.push("[flags] chip_select must be 0-3".to_string()),
        None => {}
    }

    match flags.get("byte_swap") {
        Some(toml::Value::Boolean(false)) | None => {}
        Some(toml::Value::Boolean(true)) => {
            errors.push("[flags] byte_swap is not supported on RP2040, set it to false".to_string())
        }
        Some(_) => errors.push("[flags] byte_swap must be true or false".to_string()),
    }
}

fn check_spi(config: &toml::Value, errors: &mut Vec<String>) {
    let spi = match table(config, "spi") {
        Some(t) => t,
        None => return,
    };
    check_keys("spi", spi, &["frequency", "mode"], errors);

    match spi.get("frequency") {
        Some(toml::Value::Integer(hz)) if (1..=u32::MAX as i64).contains(hz) => {}
        Some(_) => errors.push("[spi] frequency must be a positive integer".to_string()),
        None => {}
    }

    match spi.get("mode") {
        Some(toml::Value::Integer(mode)) if (0..=3).contains(mode) => {}
        Some(_) => errors.push("[spi] mode must be 0-3".to_string()),
        None => {}
    }
}
