//! Static description of every dcm2niix input field.
//!
//! The table is the single source of truth for the order in which flags are
//! rendered, the token each field maps to, and how raw string values are
//! checked before they reach the typed inputs. Rendering (`cmdline`), dynamic
//! assignment (`Dcm2NiixInputs::set`) and argv parsing all consult it.
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::{
    Bids, ByteOrder, Compress, Crop3d, GenerateDefaults, LosslessScale, Merge2d, NameConflicts,
    Postfix, Verbosity, YesNo,
};

/// Maximum number of `-n` series filters dcm2niix accepts.
pub const MAX_SERIES_FILTERS: usize = 16;

/// Value domain of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Path,
    Text,
    Integer { min: i64, max: i64 },
    Switch,
    Choice(&'static [&'static str]),
    /// Integer that may be given several times, each rendered as its own flag
    Repeated { min: i64, max: i64 },
}

/// How a field appears on the dcm2niix command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Trailing positional argument
    Positional,
    /// `<flag> <value>`
    Flag(&'static str),
    /// Value glued to a prefix, e.g. `-6`
    Inline(&'static str),
    /// Present or absent, no value
    Switch(&'static str),
    /// Selects among outputs; never rendered
    Selector,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub token: Token,
    pub default: Option<&'static str>,
    pub mandatory: bool,
    pub help: &'static str,
}

/// A validated field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Switch(bool),
    Choice(&'static str),
    List(Vec<i64>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Integer(n) => write!(f, "{n}"),
            FieldValue::Switch(b) => write!(f, "{b}"),
            FieldValue::Choice(c) => write!(f, "{c}"),
            FieldValue::List(items) => {
                let joined: Vec<String> = items.iter().map(|n| n.to_string()).collect();
                write!(f, "{}", joined.join(","))
            }
        }
    }
}

const fn field(
    name: &'static str,
    kind: FieldKind,
    token: Token,
    help: &'static str,
) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        token,
        default: None,
        mandatory: false,
        help,
    }
}

const fn choice(
    name: &'static str,
    flag: &'static str,
    allowed: &'static [&'static str],
    help: &'static str,
) -> FieldSpec {
    field(name, FieldKind::Choice(allowed), Token::Flag(flag), help)
}

const fn switch(name: &'static str, flag: &'static str, help: &'static str) -> FieldSpec {
    field(name, FieldKind::Switch, Token::Switch(flag), help)
}

/// Every input field, in rendering order.
pub static FIELDS: &[FieldSpec] = &[
    FieldSpec {
        mandatory: true,
        ..field(
            "in_dir",
            FieldKind::Path,
            Token::Positional,
            "The directory containing the DICOMs to be converted",
        )
    },
    FieldSpec {
        mandatory: true,
        ..field("out_dir", FieldKind::Path, Token::Flag("-o"), "output directory")
    },
    FieldSpec {
        default: Some("out_file"),
        ..field("filename", FieldKind::Text, Token::Flag("-f"), "The output name for the file")
    },
    field(
        "echo",
        FieldKind::Integer { min: 1, max: i32::MAX as i64 },
        Token::Selector,
        "The echo number to select when the dataset holds several echoes (files suffixed '_e<echo>')",
    ),
    field(
        "suffix",
        FieldKind::Choice(Postfix::ALLOWED),
        Token::Selector,
        "Post-fix selecting which of the disambiguated outputs to return",
    ),
    choice(
        "compress",
        "-z",
        Compress::ALLOWED,
        "gz compress images [y=pigz, o=optimal pigz, i=internal:miniz, n=no, 3=no,3D]",
    ),
    field(
        "compression_level",
        FieldKind::Integer { min: 1, max: 9 },
        Token::Inline("-"),
        "gz compression level",
    ),
    choice("adjacent", "-a", YesNo::ALLOWED, "adjacent DICOMs"),
    choice("bids", "-b", Bids::ALLOWED, "BIDS sidecar [o=only: no NIfTI]"),
    choice("anonymize_bids", "-ba", YesNo::ALLOWED, "anonymize BIDS"),
    switch("store_comments", "-c", "comment stored in NIfTI aux_file"),
    field(
        "search_depth",
        FieldKind::Integer { min: 0, max: 9 },
        Token::Flag("-d"),
        "directory search depth, convert DICOMs in sub-folders of in_dir",
    ),
    choice("export_nrrd", "-e", YesNo::ALLOWED, "export as NRRD instead of NIfTI"),
    choice(
        "generate_defaults",
        "-g",
        GenerateDefaults::ALLOWED,
        "generate defaults file [o=only: reset and write defaults; i=ignore: reset defaults]",
    ),
    choice("ignore_derived", "-i", YesNo::ALLOWED, "ignore derived, localizer and 2D images"),
    choice(
        "losslessly_scale",
        "-l",
        LosslessScale::ALLOWED,
        "losslessly scale 16-bit integers to use dynamic range [y=scale, n=no, but uint16->int16, o=original]",
    ),
    choice(
        "merge_2d",
        "-m",
        Merge2d::ALLOWED,
        "merge 2D slices from same series regardless of echo, exposure, etc. [no, yes, auto]",
    ),
    field(
        "only",
        FieldKind::Repeated { min: 0, max: u32::MAX as i64 },
        Token::Flag("-n"),
        "only convert this series CRC number, can be used up to 16 times",
    ),
    choice("philips_scaling", "-p", YesNo::ALLOWED, "Philips precise float (not display) scaling"),
    choice("rename_instead", "-r", YesNo::ALLOWED, "rename instead of convert DICOMs"),
    choice(
        "single_file_mode",
        "-s",
        YesNo::ALLOWED,
        "single file mode, do not convert other images in folder",
    ),
    choice("private_text_notes", "-t", YesNo::ALLOWED, "text notes includes private patient details"),
    switch("up_to_date_check", "-u", "up-to-date check"),
    choice("verbose", "-v", Verbosity::ALLOWED, "verbose [no, yes, logorrheic]"),
    choice(
        "name_conflicts",
        "-w",
        NameConflicts::ALLOWED,
        "write behavior for name conflicts [0=skip duplicates, 1=overwrite, 2=add suffix]",
    ),
    choice(
        "crop_3d",
        "-x",
        Crop3d::ALLOWED,
        "crop 3D acquisitions (use ignore to neither crop nor rotate 3D acquisitions)",
    ),
    choice(
        "big_endian",
        "--big-endian",
        ByteOrder::ALLOWED,
        "byte order [y=big-end, n=little-end, o=optimal/native]",
    ),
    choice("progress", "--progress", YesNo::ALLOWED, "Slicer format progress information"),
    switch("terse", "--terse", "omit filename post-fixes"),
    switch("version", "--version", "report version"),
    switch("xml", "--xml", "Slicer format features"),
];

/// Look up a field by name.
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.name == name)
}

/// Look up the field rendered with `flag` (`-o`, `--terse`, ...).
pub fn field_for_flag(flag: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| match spec.token {
        Token::Flag(f) | Token::Switch(f) => f == flag,
        _ => false,
    })
}

/// Check a raw string against a field's value domain.
///
/// For `Repeated` fields a single element is validated and returned as an
/// `Integer`; callers accumulate the list.
pub fn validate_value(spec: &FieldSpec, raw: &str) -> Result<FieldValue> {
    match spec.kind {
        FieldKind::Path | FieldKind::Text => {
            if raw.is_empty() {
                return Err(Error::invalid_argument(spec.name, raw, "must not be empty"));
            }
            Ok(FieldValue::Text(raw.to_string()))
        }
        FieldKind::Integer { min, max } | FieldKind::Repeated { min, max } => {
            let n: i64 = raw
                .trim()
                .parse()
                .map_err(|_| Error::invalid_argument(spec.name, raw, "expected an integer"))?;
            check_range(spec.name, n, min, max)?;
            Ok(FieldValue::Integer(n))
        }
        FieldKind::Switch => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(FieldValue::Switch(true)),
            "false" | "0" | "no" => Ok(FieldValue::Switch(false)),
            _ => Err(Error::invalid_argument(spec.name, raw, "expected true or false")),
        },
        FieldKind::Choice(allowed) => allowed
            .iter()
            .copied()
            .find(|token| *token == raw)
            .map(FieldValue::Choice)
            .ok_or_else(|| Error::InvalidChoice {
                field: spec.name,
                value: raw.to_string(),
                allowed: allowed.join(", "),
            }),
    }
}

pub(crate) fn check_range(field: &'static str, n: i64, min: i64, max: i64) -> Result<()> {
    if n < min || n > max {
        return Err(Error::invalid_argument(
            field,
            n,
            format!("must be between {min} and {max}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_are_unique() {
        let mut names: Vec<_> = FIELDS.iter().map(|f| f.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), FIELDS.len());
    }

    #[test]
    fn only_in_dir_is_positional() {
        let positional: Vec<_> = FIELDS
            .iter()
            .filter(|f| f.token == Token::Positional)
            .map(|f| f.name)
            .collect();
        assert_eq!(positional, vec!["in_dir"]);
    }

    #[test]
    fn flags_resolve_back_to_fields() {
        assert_eq!(field_for_flag("-ba").unwrap().name, "anonymize_bids");
        assert_eq!(field_for_flag("--big-endian").unwrap().name, "big_endian");
        assert_eq!(field_for_flag("-c").unwrap().name, "store_comments");
        assert!(field_for_flag("-q").is_none());
    }

    #[test]
    fn choice_outside_set_is_rejected() {
        let spec = field_spec("bids").unwrap();
        assert_eq!(validate_value(spec, "o").unwrap(), FieldValue::Choice("o"));
        let err = validate_value(spec, "maybe").unwrap_err();
        assert!(matches!(err, Error::InvalidChoice { field: "bids", .. }));
    }

    #[test]
    fn integers_are_range_checked() {
        let spec = field_spec("compression_level").unwrap();
        assert_eq!(validate_value(spec, "6").unwrap(), FieldValue::Integer(6));
        assert!(validate_value(spec, "0").is_err());
        assert!(validate_value(spec, "10").is_err());
        assert!(validate_value(spec, "six").is_err());
    }

    #[test]
    fn switches_accept_booleans() {
        let spec = field_spec("terse").unwrap();
        assert_eq!(validate_value(spec, "true").unwrap(), FieldValue::Switch(true));
        assert_eq!(validate_value(spec, "false").unwrap(), FieldValue::Switch(false));
        assert!(validate_value(spec, "y").is_err());
    }
}
