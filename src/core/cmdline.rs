//! Rendering typed inputs into dcm2niix argv tokens, and reading them back.
use tracing::debug;

use crate::core::fields::{FieldKind, FieldValue, Token, field_for_flag, field_spec};
use crate::core::params::Dcm2NiixInputs;
use crate::error::{Error, Result};

/// Name of the wrapped executable.
pub const EXECUTABLE: &str = "dcm2niix";

/// Build the argument list (without the program name).
///
/// Inputs are validated first. Flagged fields follow table order and the
/// input directory is always the final token.
pub fn build_args(inputs: &Dcm2NiixInputs) -> Result<Vec<String>> {
    inputs.validate()?;

    let mut args = Vec::new();
    let mut positional = Vec::new();

    for (spec, value) in inputs.values() {
        match (spec.token, value) {
            (Token::Selector, _) => {}
            (Token::Positional, value) => positional.push(value.to_string()),
            (Token::Switch(flag), FieldValue::Switch(true)) => args.push(flag.to_string()),
            (Token::Switch(_), _) => {}
            (Token::Flag(flag), FieldValue::List(items)) => {
                for item in items {
                    args.push(flag.to_string());
                    args.push(item.to_string());
                }
            }
            (Token::Flag(flag), value) => {
                args.push(flag.to_string());
                args.push(value.to_string());
            }
            (Token::Inline(prefix), value) => args.push(format!("{prefix}{value}")),
        }
    }

    args.extend(positional);
    debug!("Built {} dcm2niix arguments", args.len());
    Ok(args)
}

/// Join a program and its arguments into a copy-pasteable shell line.
pub fn render_cmdline(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(shell_quote)
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(token: &str) -> String {
    let plain = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', r"'\''"))
    }
}

/// Parse a dcm2niix argument list back into inputs.
///
/// Accepts exactly the token shapes `build_args` produces; the last bare token
/// is the input directory.
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Dcm2NiixInputs> {
    let mut inputs = Dcm2NiixInputs::default();
    let mut iter = args.iter().map(AsRef::as_ref).peekable();

    while let Some(token) = iter.next() {
        if let Some(spec) = field_for_flag(token) {
            match spec.token {
                Token::Switch(_) => inputs.set(spec.name, "true")?,
                _ => {
                    let value = iter
                        .next()
                        .ok_or(Error::MissingArgument { field: spec.name })?;
                    inputs.set(spec.name, value)?;
                }
            }
        } else if let Some(level) = inline_level(token) {
            inputs.set("compression_level", level)?;
        } else if !token.starts_with('-') && iter.peek().is_none() {
            inputs.set("in_dir", token)?;
        } else {
            return Err(Error::UnexpectedToken {
                token: token.to_string(),
            });
        }
    }

    Ok(inputs)
}

/// `-1` .. `-9`: gz compression level.
fn inline_level(token: &str) -> Option<&str> {
    let spec = field_spec("compression_level")?;
    let Token::Inline(prefix) = spec.token else {
        return None;
    };
    let rest = token.strip_prefix(prefix)?;
    match spec.kind {
        FieldKind::Integer { .. }
            if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) =>
        {
            Some(rest)
        }
        _ => None,
    }
}
