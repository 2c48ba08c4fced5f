use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::fields::{
    FIELDS, FieldSpec, FieldValue, MAX_SERIES_FILTERS, check_range, field_spec, validate_value,
};
use crate::error::{Error, Result};
use crate::types::{
    Bids, ByteOrder, Compress, Crop3d, GenerateDefaults, LosslessScale, Merge2d, NameConflicts,
    Postfix, Verbosity, YesNo,
};

/// Base name dcm2niix is asked to write when none is given.
pub const DEFAULT_FILENAME: &str = "out_file";

/// Typed dcm2niix inputs, suitable for JSON config files and CLI presets.
///
/// `None` means "not passed", leaving dcm2niix's own default in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dcm2NiixInputs {
    pub in_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub filename: String,
    /// Echo to select among `_e<n>` outputs; exclusive with `suffix`
    pub echo: Option<u32>,
    /// Post-fix to select among disambiguated outputs; exclusive with `echo`
    pub suffix: Option<Postfix>,
    pub compress: Option<Compress>,
    pub compression_level: Option<u8>,
    pub adjacent: Option<YesNo>,
    pub bids: Option<Bids>,
    pub anonymize_bids: Option<YesNo>,
    pub store_comments: bool,
    pub search_depth: Option<u8>,
    pub export_nrrd: Option<YesNo>,
    pub generate_defaults: Option<GenerateDefaults>,
    pub ignore_derived: Option<YesNo>,
    pub losslessly_scale: Option<LosslessScale>,
    pub merge_2d: Option<Merge2d>,
    /// Series CRC numbers to restrict conversion to
    pub only: Vec<u32>,
    pub philips_scaling: Option<YesNo>,
    pub rename_instead: Option<YesNo>,
    pub single_file_mode: Option<YesNo>,
    pub private_text_notes: Option<YesNo>,
    pub up_to_date_check: bool,
    pub verbose: Option<Verbosity>,
    pub name_conflicts: Option<NameConflicts>,
    pub crop_3d: Option<Crop3d>,
    pub big_endian: Option<ByteOrder>,
    pub progress: Option<YesNo>,
    pub terse: bool,
    pub version: bool,
    pub xml: bool,
}

impl Default for Dcm2NiixInputs {
    fn default() -> Self {
        Self {
            in_dir: None,
            out_dir: None,
            filename: DEFAULT_FILENAME.to_string(),
            echo: None,
            suffix: None,
            compress: None,
            compression_level: None,
            adjacent: None,
            bids: None,
            anonymize_bids: None,
            store_comments: false,
            search_depth: None,
            export_nrrd: None,
            generate_defaults: None,
            ignore_derived: None,
            losslessly_scale: None,
            merge_2d: None,
            only: Vec::new(),
            philips_scaling: None,
            rename_instead: None,
            single_file_mode: None,
            private_text_notes: None,
            up_to_date_check: false,
            verbose: None,
            name_conflicts: None,
            crop_3d: None,
            big_endian: None,
            progress: None,
            terse: false,
            version: false,
            xml: false,
        }
    }
}

fn integer(field: &'static str, value: &FieldValue) -> Result<i64> {
    match value {
        FieldValue::Integer(n) => Ok(*n),
        other => Err(Error::invalid_argument(field, other, "expected an integer")),
    }
}

fn switch(field: &'static str, value: &FieldValue) -> Result<bool> {
    match value {
        FieldValue::Switch(b) => Ok(*b),
        other => Err(Error::invalid_argument(field, other, "expected true or false")),
    }
}

fn narrow<T: TryFrom<i64>>(field: &'static str, n: i64) -> Result<T> {
    T::try_from(n).map_err(|_| Error::invalid_argument(field, n, "out of range"))
}

impl Dcm2NiixInputs {
    pub fn new(in_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            in_dir: Some(in_dir.into()),
            out_dir: Some(out_dir.into()),
            ..Self::default()
        }
    }

    /// Load inputs from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let inputs: Self = serde_json::from_str(&text)?;
        debug!("Loaded inputs from {:?}", path);
        Ok(inputs)
    }

    /// Assign a field by name from its textual form.
    ///
    /// The value is checked against the field table before it is stored, so an
    /// out-of-set choice or out-of-range integer never reaches the typed inputs.
    /// Switches take `true`/`false`; `only` appends one series number per call.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<()> {
        let spec = field_spec(name).ok_or_else(|| Error::UnknownField {
            name: name.to_string(),
        })?;
        let value = validate_value(spec, raw)?;
        let field = spec.name;

        match field {
            "in_dir" => self.in_dir = Some(PathBuf::from(raw)),
            "out_dir" => self.out_dir = Some(PathBuf::from(raw)),
            "filename" => self.filename = raw.to_string(),
            "echo" => self.echo = Some(narrow(field, integer(field, &value)?)?),
            "suffix" => self.suffix = Some(Postfix::parse_for(field, raw)?),
            "compress" => self.compress = Some(Compress::parse_for(field, raw)?),
            "compression_level" => {
                self.compression_level = Some(narrow(field, integer(field, &value)?)?)
            }
            "adjacent" => self.adjacent = Some(YesNo::parse_for(field, raw)?),
            "bids" => self.bids = Some(Bids::parse_for(field, raw)?),
            "anonymize_bids" => self.anonymize_bids = Some(YesNo::parse_for(field, raw)?),
            "store_comments" => self.store_comments = switch(field, &value)?,
            "search_depth" => self.search_depth = Some(narrow(field, integer(field, &value)?)?),
            "export_nrrd" => self.export_nrrd = Some(YesNo::parse_for(field, raw)?),
            "generate_defaults" => {
                self.generate_defaults = Some(GenerateDefaults::parse_for(field, raw)?)
            }
            "ignore_derived" => self.ignore_derived = Some(YesNo::parse_for(field, raw)?),
            "losslessly_scale" => {
                self.losslessly_scale = Some(LosslessScale::parse_for(field, raw)?)
            }
            "merge_2d" => self.merge_2d = Some(Merge2d::parse_for(field, raw)?),
            "only" => {
                if self.only.len() >= MAX_SERIES_FILTERS {
                    return Err(Error::invalid_argument(
                        field,
                        raw,
                        format!("at most {MAX_SERIES_FILTERS} series may be selected"),
                    ));
                }
                self.only.push(narrow(field, integer(field, &value)?)?);
            }
            "philips_scaling" => self.philips_scaling = Some(YesNo::parse_for(field, raw)?),
            "rename_instead" => self.rename_instead = Some(YesNo::parse_for(field, raw)?),
            "single_file_mode" => self.single_file_mode = Some(YesNo::parse_for(field, raw)?),
            "private_text_notes" => self.private_text_notes = Some(YesNo::parse_for(field, raw)?),
            "up_to_date_check" => self.up_to_date_check = switch(field, &value)?,
            "verbose" => self.verbose = Some(Verbosity::parse_for(field, raw)?),
            "name_conflicts" => self.name_conflicts = Some(NameConflicts::parse_for(field, raw)?),
            "crop_3d" => self.crop_3d = Some(Crop3d::parse_for(field, raw)?),
            "big_endian" => self.big_endian = Some(ByteOrder::parse_for(field, raw)?),
            "progress" => self.progress = Some(YesNo::parse_for(field, raw)?),
            "terse" => self.terse = switch(field, &value)?,
            "version" => self.version = switch(field, &value)?,
            "xml" => self.xml = switch(field, &value)?,
            _ => {
                return Err(Error::UnknownField {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Current value of a field, `None` when it is unset (or a switch that is off).
    pub fn value_of(&self, name: &str) -> Option<FieldValue> {
        fn path(p: &Option<PathBuf>) -> Option<FieldValue> {
            p.as_ref().map(|p| FieldValue::Text(p.display().to_string()))
        }
        fn int<T: Into<i64> + Copy>(n: &Option<T>) -> Option<FieldValue> {
            n.map(|n| FieldValue::Integer(n.into()))
        }
        fn on(flag: bool) -> Option<FieldValue> {
            flag.then_some(FieldValue::Switch(true))
        }
        let yes_no = |v: &Option<YesNo>| v.map(|v| FieldValue::Choice(v.as_arg()));

        match name {
            "in_dir" => path(&self.in_dir),
            "out_dir" => path(&self.out_dir),
            "filename" => Some(FieldValue::Text(self.filename.clone())),
            "echo" => int(&self.echo),
            "suffix" => self.suffix.map(|v| FieldValue::Choice(v.as_arg())),
            "compress" => self.compress.map(|v| FieldValue::Choice(v.as_arg())),
            "compression_level" => int(&self.compression_level),
            "adjacent" => yes_no(&self.adjacent),
            "bids" => self.bids.map(|v| FieldValue::Choice(v.as_arg())),
            "anonymize_bids" => yes_no(&self.anonymize_bids),
            "store_comments" => on(self.store_comments),
            "search_depth" => int(&self.search_depth),
            "export_nrrd" => yes_no(&self.export_nrrd),
            "generate_defaults" => self.generate_defaults.map(|v| FieldValue::Choice(v.as_arg())),
            "ignore_derived" => yes_no(&self.ignore_derived),
            "losslessly_scale" => self.losslessly_scale.map(|v| FieldValue::Choice(v.as_arg())),
            "merge_2d" => self.merge_2d.map(|v| FieldValue::Choice(v.as_arg())),
            "only" => (!self.only.is_empty())
                .then(|| FieldValue::List(self.only.iter().map(|n| i64::from(*n)).collect())),
            "philips_scaling" => yes_no(&self.philips_scaling),
            "rename_instead" => yes_no(&self.rename_instead),
            "single_file_mode" => yes_no(&self.single_file_mode),
            "private_text_notes" => yes_no(&self.private_text_notes),
            "up_to_date_check" => on(self.up_to_date_check),
            "verbose" => self.verbose.map(|v| FieldValue::Choice(v.as_arg())),
            "name_conflicts" => self.name_conflicts.map(|v| FieldValue::Choice(v.as_arg())),
            "crop_3d" => self.crop_3d.map(|v| FieldValue::Choice(v.as_arg())),
            "big_endian" => self.big_endian.map(|v| FieldValue::Choice(v.as_arg())),
            "progress" => yes_no(&self.progress),
            "terse" => on(self.terse),
            "version" => on(self.version),
            "xml" => on(self.xml),
            _ => None,
        }
    }

    /// Set fields paired with their table entry, in table order.
    pub fn values(&self) -> Vec<(&'static FieldSpec, FieldValue)> {
        FIELDS
            .iter()
            .filter_map(|spec| self.value_of(spec.name).map(|value| (spec, value)))
            .collect()
    }

    /// Cross-field checks run before any command line is built.
    pub fn validate(&self) -> Result<()> {
        let in_dir = self
            .in_dir
            .as_deref()
            .ok_or(Error::MissingArgument { field: "in_dir" })?;
        let out_dir = self
            .out_dir
            .as_deref()
            .ok_or(Error::MissingArgument { field: "out_dir" })?;
        let in_dir = utf8_path("in_dir", in_dir)?;
        utf8_path("out_dir", out_dir)?;
        // dcm2niix would read these as options
        not_a_flag("in_dir", in_dir)?;
        if self.filename.is_empty() {
            return Err(Error::invalid_argument("filename", "", "must not be empty"));
        }
        not_a_flag("filename", &self.filename)?;
        if self.echo.is_some() && self.suffix.is_some() {
            return Err(Error::MutuallyExclusive {
                first: "echo",
                second: "suffix",
            });
        }
        if let Some(echo) = self.echo {
            check_range("echo", echo.into(), 1, i32::MAX as i64)?;
        }
        if let Some(level) = self.compression_level {
            check_range("compression_level", level.into(), 1, 9)?;
        }
        if let Some(depth) = self.search_depth {
            check_range("search_depth", depth.into(), 0, 9)?;
        }
        if self.only.len() > MAX_SERIES_FILTERS {
            return Err(Error::invalid_argument(
                "only",
                self.only.len(),
                format!("at most {MAX_SERIES_FILTERS} series may be selected"),
            ));
        }
        Ok(())
    }

    /// Post-fix that selects the wanted output: `_<suffix>`, `_e<echo>` or nothing.
    pub fn selected_postfix(&self) -> String {
        match (self.suffix, self.echo) {
            (Some(suffix), _) => format!("_{}", suffix.as_arg()),
            (None, Some(echo)) => format!("_e{echo}"),
            (None, None) => String::new(),
        }
    }

    /// Extension of the written image, depending on `export_nrrd` and `compress`.
    ///
    /// Compressed NRRD is written with a detached `.nhdr` header next to the
    /// gzipped `.raw.gz` data.
    pub fn image_extension(&self) -> &'static str {
        let gzipped = self.compress.is_some_and(|c| c.is_gzipped());
        match (self.export_nrrd, gzipped) {
            (Some(YesNo::Yes), true) => ".nhdr",
            (Some(YesNo::Yes), false) => ".nrrd",
            (_, true) => ".nii.gz",
            (_, false) => ".nii",
        }
    }

    /// Other extension the image may carry when the primary one is missing.
    ///
    /// Only NRRD has one: dcm2niix may embed the data (`.nrrd`) or detach it (`.nhdr`).
    pub fn alternate_image_extension(&self) -> Option<&'static str> {
        match self.image_extension() {
            ".nhdr" => Some(".nrrd"),
            ".nrrd" => Some(".nhdr"),
            _ => None,
        }
    }
}

fn utf8_path<'a>(field: &'static str, path: &'a Path) -> Result<&'a str> {
    path.to_str()
        .ok_or_else(|| Error::invalid_argument(field, path.display(), "must be valid UTF-8"))
}

fn not_a_flag(field: &'static str, value: &str) -> Result<()> {
    if value.starts_with('-') {
        return Err(Error::invalid_argument(field, value, "must not start with '-'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filename_is_out_file() {
        let inputs = Dcm2NiixInputs::default();
        assert_eq!(inputs.filename, "out_file");
        assert_eq!(
            inputs.value_of("filename"),
            Some(FieldValue::Text("out_file".into()))
        );
    }

    #[test]
    fn set_by_name_validates() {
        let mut inputs = Dcm2NiixInputs::new("dicoms", "out");
        inputs.set("compress", "y").unwrap();
        inputs.set("merge_2d", "2").unwrap();
        inputs.set("terse", "true").unwrap();
        assert_eq!(inputs.compress, Some(Compress::Pigz));
        assert_eq!(inputs.merge_2d, Some(Merge2d::Auto));
        assert!(inputs.terse);

        let err = inputs.set("compress", "gzip").unwrap_err();
        assert!(matches!(err, Error::InvalidChoice { field: "compress", .. }));
        assert_eq!(inputs.compress, Some(Compress::Pigz));

        assert!(matches!(
            inputs.set("colour", "y").unwrap_err(),
            Error::UnknownField { .. }
        ));
    }

    #[test]
    fn every_choice_field_rejects_unknown_tokens() {
        use crate::core::fields::FieldKind;

        let mut inputs = Dcm2NiixInputs::new("dicoms", "out");
        for spec in FIELDS {
            if let FieldKind::Choice(allowed) = spec.kind {
                for token in allowed {
                    inputs.set(spec.name, token).unwrap();
                }
                assert!(inputs.set(spec.name, "?").is_err(), "{}", spec.name);
                assert!(inputs.value_of(spec.name).is_some(), "{}", spec.name);
            }
        }
    }

    #[test]
    fn echo_and_suffix_are_exclusive() {
        let mut inputs = Dcm2NiixInputs::new("dicoms", "out");
        inputs.echo = Some(2);
        inputs.suffix = Some(Postfix::Phase);
        assert!(matches!(
            inputs.validate().unwrap_err(),
            Error::MutuallyExclusive { .. }
        ));
    }

    #[test]
    fn missing_directories_are_reported() {
        let inputs = Dcm2NiixInputs::default();
        assert!(matches!(
            inputs.validate().unwrap_err(),
            Error::MissingArgument { field: "in_dir" }
        ));
        let mut inputs = Dcm2NiixInputs::default();
        inputs.in_dir = Some("dicoms".into());
        assert!(matches!(
            inputs.validate().unwrap_err(),
            Error::MissingArgument { field: "out_dir" }
        ));
    }

    #[test]
    fn series_filter_is_capped() {
        let mut inputs = Dcm2NiixInputs::new("dicoms", "out");
        for n in 0..MAX_SERIES_FILTERS {
            inputs.set("only", &n.to_string()).unwrap();
        }
        assert!(inputs.set("only", "99").is_err());
        assert_eq!(inputs.only.len(), MAX_SERIES_FILTERS);
    }

    #[test]
    fn postfix_and_extension() {
        let mut inputs = Dcm2NiixInputs::new("dicoms", "out");
        assert_eq!(inputs.selected_postfix(), "");
        assert_eq!(inputs.image_extension(), ".nii");

        inputs.echo = Some(3);
        inputs.compress = Some(Compress::Internal);
        assert_eq!(inputs.selected_postfix(), "_e3");
        assert_eq!(inputs.image_extension(), ".nii.gz");

        inputs.echo = None;
        inputs.suffix = Some(Postfix::Real);
        inputs.compress = Some(Compress::No3d);
        assert_eq!(inputs.selected_postfix(), "_real");
        assert_eq!(inputs.image_extension(), ".nii");
    }

    #[test]
    fn nrrd_export_changes_image_extension() {
        let mut inputs = Dcm2NiixInputs::new("dicoms", "out");
        inputs.export_nrrd = Some(YesNo::Yes);
        assert_eq!(inputs.image_extension(), ".nrrd");
        assert_eq!(inputs.alternate_image_extension(), Some(".nhdr"));

        inputs.compress = Some(Compress::Pigz);
        assert_eq!(inputs.image_extension(), ".nhdr");
        assert_eq!(inputs.alternate_image_extension(), Some(".nrrd"));

        inputs.export_nrrd = Some(YesNo::No);
        assert_eq!(inputs.image_extension(), ".nii.gz");
        assert_eq!(inputs.alternate_image_extension(), None);
    }

    #[test]
    fn input_directory_must_not_look_like_a_flag() {
        let inputs = Dcm2NiixInputs::new("-9", "out");
        assert!(matches!(
            inputs.validate().unwrap_err(),
            Error::InvalidArgument { field: "in_dir", .. }
        ));
        assert!(Dcm2NiixInputs::new("./-9", "out").validate().is_ok());
    }

    #[test]
    fn filename_must_not_look_like_a_flag() {
        let mut inputs = Dcm2NiixInputs::new("dicoms", "out");
        inputs.filename = "-z".into();
        assert!(matches!(
            inputs.validate().unwrap_err(),
            Error::InvalidArgument { field: "filename", .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_directories_are_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let bad = PathBuf::from(OsStr::from_bytes(b"/data/dic\xffoms"));
        let inputs = Dcm2NiixInputs::new(bad.clone(), "out");
        assert!(matches!(
            inputs.validate().unwrap_err(),
            Error::InvalidArgument { field: "in_dir", .. }
        ));
        let inputs = Dcm2NiixInputs::new("dicoms", bad);
        assert!(matches!(
            inputs.validate().unwrap_err(),
            Error::InvalidArgument { field: "out_dir", .. }
        ));
    }

    #[test]
    fn json_config_keeps_defaults_for_missing_keys() {
        let inputs: Dcm2NiixInputs = serde_json::from_str(
            r#"{"in_dir": "dicoms", "out_dir": "out", "compress": "y", "name_conflicts": "1"}"#,
        )
        .unwrap();
        assert_eq!(inputs.filename, "out_file");
        assert_eq!(inputs.compress, Some(Compress::Pigz));
        assert_eq!(inputs.name_conflicts, Some(NameConflicts::Overwrite));
        assert!(!inputs.terse);
    }

    #[test]
    fn json_config_rejects_unknown_choice() {
        let result: std::result::Result<Dcm2NiixInputs, _> =
            serde_json::from_str(r#"{"bids": "maybe"}"#);
        assert!(result.is_err());
    }
}
