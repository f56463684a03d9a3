//! Line-based console prompts.
//!
//! Every prompt is a parse function wrapped in a loop: empty input yields the
//! default (when there is one), unparseable input prints a hint and asks again.

use anyhow::{bail, Result};
use std::fmt::Display;
use std::io::{BufRead, Write};

/// Ask until `parse` accepts the answer or an empty line selects `default`.
pub fn ask<T, R, W, F>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    default: Option<T>,
    hint: &str,
    parse: F,
) -> Result<T>
where
    T: Display,
    R: BufRead,
    W: Write,
    F: Fn(&str) -> Option<T>,
{
    let suffix = match &default {
        Some(d) => format!(" [default: {}]", d),
        None => String::new(),
    };
    ask_with_suffix(input, output, prompt, &suffix, default, hint, parse)
}

fn ask_with_suffix<T, R, W, F>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    suffix: &str,
    mut default: Option<T>,
    hint: &str,
    parse: F,
) -> Result<T>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> Option<T>,
{
    loop {
        write!(output, "{}{}: ", prompt, suffix)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("unexpected end of input while waiting for: {}", prompt);
        }
        let answer = line.trim();

        if answer.is_empty() {
            if let Some(value) = default.take() {
                return Ok(value);
            }
        }
        if let Some(value) = parse(answer) {
            return Ok(value);
        }
        writeln!(output, "{}", hint)?;
    }
}

pub fn ask_int<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    default: Option<i32>,
) -> Result<i32> {
    ask(
        input,
        output,
        prompt,
        default,
        "Please enter a valid integer.",
        |s| s.parse().ok(),
    )
}

pub fn ask_float<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    default: Option<f64>,
) -> Result<f64> {
    ask(
        input,
        output,
        prompt,
        default,
        "Please enter a valid number.",
        |s| s.parse().ok(),
    )
}

fn parse_bool(answer: &str) -> Option<bool> {
    match answer.to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

pub fn ask_bool<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    default: bool,
) -> Result<bool> {
    let suffix = format!(" [y/n, default: {}]", if default { "y" } else { "n" });
    ask_with_suffix(
        input,
        output,
        prompt,
        &suffix,
        Some(default),
        "Please answer y or n.",
        parse_bool,
    )
}

/// Free-form text; an empty answer yields `default`.
pub fn ask_text<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    default: &str,
) -> Result<String> {
    let suffix = if default.is_empty() {
        String::new()
    } else {
        format!(" [default: {}]", default)
    };
    ask_with_suffix(
        input,
        output,
        prompt,
        &suffix,
        Some(default.to_string()),
        "",
        |s| Some(s.to_string()),
    )
}
