//! Output resolution: deciding which files dcm2niix produced for each declared output.
//!
//! dcm2niix appends post-fixes such as `_e2`, `_ph` or `_real` when one series
//! yields several images, so the file named by `{filename}{ext}` may not exist.
//! The policy implemented by [`resolve_in_listing`]:
//!
//! 1. `{filename}{postfix}{ext}` exists: return it.
//! 2. No post-fix was requested: look for files starting with `{filename}` and
//!    ending with `{ext}`. A single candidate is accepted (with a warning).
//!    None or several is an error for required outputs and `Absent` otherwise.
//! 3. A post-fix was requested but its file is missing: error for required
//!    outputs, `Absent` otherwise.
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::params::Dcm2NiixInputs;
use crate::error::{Error, Result};
use crate::io::listing::list_files;
use crate::types::Bids;

/// Outputs dcm2niix can produce for a conversion
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub enum OutputKind {
    /// NIfTI image
    Image,
    /// BIDS side-car JSON
    BidsJson,
    /// dMRI b-values in FSL format
    Bval,
    /// dMRI b-vectors in FSL format
    Bvec,
}

impl OutputKind {
    pub fn field_name(&self) -> &'static str {
        match self {
            OutputKind::Image => "out_file",
            OutputKind::BidsJson => "out_json",
            OutputKind::Bval => "out_bval",
            OutputKind::Bvec => "out_bvec",
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// What to look for in the output directory
#[derive(Debug, Clone, Copy)]
pub struct OutputRequest<'a> {
    pub kind: OutputKind,
    pub filename: &'a str,
    /// `_e2`, `_ph`, ... or empty
    pub postfix: &'a str,
    /// Including the leading dot, e.g. `.nii.gz`
    pub extension: &'a str,
    pub required: bool,
}

impl OutputRequest<'_> {
    pub fn expected_name(&self) -> String {
        format!("{}{}{}", self.filename, self.postfix, self.extension)
    }

    fn is_candidate(&self, name: &str) -> bool {
        name.len() >= self.filename.len() + self.extension.len()
            && name.starts_with(self.filename)
            && name.ends_with(self.extension)
    }
}

/// Outcome of resolving one output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Resolution {
    Found(PathBuf),
    Absent,
}

impl Resolution {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Resolution::Found(path) => Some(path),
            Resolution::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Resolution::Absent)
    }
}

/// Resolve `request` against the file names in `listing` (names relative to `dir`).
///
/// Pure: never touches the filesystem, so it can be driven by any listing.
pub fn resolve_in_listing<S: AsRef<str>>(
    dir: &Path,
    listing: &[S],
    request: &OutputRequest<'_>,
) -> Result<Resolution> {
    let expected = request.expected_name();
    if listing.iter().any(|name| name.as_ref() == expected) {
        return Ok(Resolution::Found(dir.join(expected)));
    }

    let mut candidates: Vec<&str> = listing
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| request.is_candidate(name))
        .collect();
    candidates.sort_unstable();
    let candidate_paths = || -> Vec<String> {
        candidates
            .iter()
            .map(|name| dir.join(name).display().to_string())
            .collect()
    };

    if !request.postfix.is_empty() {
        return missing_or_absent(dir, request, &expected, candidate_paths());
    }

    match candidates.as_slice() {
        [single] => {
            warn!(
                "{} not found as {}, using the only candidate {}",
                request.kind, expected, single
            );
            Ok(Resolution::Found(dir.join(single)))
        }
        [] => missing_or_absent(dir, request, &expected, Vec::new()),
        _ if request.required => Err(Error::AmbiguousOutput {
            output: request.kind.field_name(),
            dir: dir.to_path_buf(),
            candidates: candidate_paths(),
        }),
        _ => {
            debug!(
                "{} is ambiguous ({} candidates), treating as absent",
                request.kind,
                candidates.len()
            );
            Ok(Resolution::Absent)
        }
    }
}

fn missing_or_absent(
    dir: &Path,
    request: &OutputRequest<'_>,
    expected: &str,
    candidates: Vec<String>,
) -> Result<Resolution> {
    if request.required {
        Err(Error::MissingOutput {
            output: request.kind.field_name(),
            expected: dir.join(expected),
            candidates,
        })
    } else {
        debug!("{} not produced, treating as absent", request.kind);
        Ok(Resolution::Absent)
    }
}

/// Resolve `request` against the current contents of `dir`.
pub fn resolve(dir: &Path, request: &OutputRequest<'_>) -> Result<Resolution> {
    let listing = list_files(dir)?;
    resolve_in_listing(dir, &listing, request)
}

/// Resolved outputs of one dcm2niix run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dcm2NiixOutputs {
    pub out_file: Resolution,
    pub out_json: Resolution,
    pub out_bval: Resolution,
    pub out_bvec: Resolution,
}

/// Resolve every declared output of `inputs` against a directory listing.
///
/// `bids=n` rules out the side-car JSON and the FSL b-value/b-vector files,
/// which then resolve to `Absent` without probing; `bids=o` rules out the image.
/// An NRRD image missing under its expected extension is looked up under the
/// alternate one before giving up.
pub fn collect_from_listing<S: AsRef<str>>(
    dir: &Path,
    listing: &[S],
    inputs: &Dcm2NiixInputs,
) -> Result<Dcm2NiixOutputs> {
    let postfix = inputs.selected_postfix();
    let postfix = postfix.as_str();
    let filename = inputs.filename.as_str();
    // dcm2niix writes sidecars unless told otherwise
    let bids = inputs.bids.unwrap_or(Bids::Yes);

    let request = |kind: OutputKind, extension: &'static str, required: bool| OutputRequest {
        kind,
        filename,
        postfix,
        extension,
        required,
    };
    let sidecar = |kind: OutputKind, extension: &'static str| -> Result<Resolution> {
        if bids == Bids::No {
            return Ok(Resolution::Absent);
        }
        resolve_in_listing(dir, listing, &request(kind, extension, false))
    };

    let out_file = if bids == Bids::Only {
        debug!("BIDS-only export requested, no image expected");
        Resolution::Absent
    } else {
        let image = |extension| {
            resolve_in_listing(dir, listing, &request(OutputKind::Image, extension, true))
        };
        let resolved = image(inputs.image_extension());
        match inputs.alternate_image_extension() {
            Some(alternate) if matches!(resolved, Err(Error::MissingOutput { .. })) => {
                image(alternate).or(resolved)?
            }
            _ => resolved?,
        }
    };

    Ok(Dcm2NiixOutputs {
        out_file,
        out_json: sidecar(OutputKind::BidsJson, ".json")?,
        out_bval: sidecar(OutputKind::Bval, ".bval")?,
        out_bvec: sidecar(OutputKind::Bvec, ".bvec")?,
    })
}

/// Resolve every declared output of `inputs` against the contents of `out_dir`.
pub fn collect_outputs(inputs: &Dcm2NiixInputs) -> Result<Dcm2NiixOutputs> {
    let dir = inputs
        .out_dir
        .as_deref()
        .ok_or(Error::MissingArgument { field: "out_dir" })?;
    let listing = list_files(dir)?;
    collect_from_listing(dir, &listing, inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Compress, Postfix, YesNo};

    fn dir() -> PathBuf {
        PathBuf::from("/data/out")
    }

    fn image(postfix: &'static str, required: bool) -> OutputRequest<'static> {
        OutputRequest {
            kind: OutputKind::Image,
            filename: "out_file",
            postfix,
            extension: ".nii.gz",
            required,
        }
    }

    #[test]
    fn exact_match_wins() {
        let listing = ["out_file.nii.gz", "out_file_e2.nii.gz", "out_file.json"];
        let resolved = resolve_in_listing(&dir(), &listing, &image("", true)).unwrap();
        assert_eq!(resolved, Resolution::Found(dir().join("out_file.nii.gz")));
    }

    #[test]
    fn single_neighbour_is_accepted() {
        let listing = ["out_file_real.nii.gz", "out_file_real.json"];
        let resolved = resolve_in_listing(&dir(), &listing, &image("", true)).unwrap();
        assert_eq!(resolved, Resolution::Found(dir().join("out_file_real.nii.gz")));
    }

    #[test]
    fn several_neighbours_are_ambiguous() {
        let listing = ["out_file_e2.nii.gz", "out_file_e1.nii.gz"];
        let err = resolve_in_listing(&dir(), &listing, &image("", true)).unwrap_err();
        match &err {
            Error::AmbiguousOutput { output, candidates, .. } => {
                assert_eq!(*output, "out_file");
                assert_eq!(candidates.len(), 2);
                assert!(candidates[0].ends_with("out_file_e1.nii.gz"));
                assert!(candidates[1].ends_with("out_file_e2.nii.gz"));
            }
            other => panic!("unexpected error: {other}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("FILENAMING.md"), "{msg}");
    }

    #[test]
    fn ambiguous_optional_output_is_absent() {
        let listing = ["out_file_e1.nii.gz", "out_file_e2.nii.gz"];
        let resolved = resolve_in_listing(&dir(), &listing, &image("", false)).unwrap();
        assert!(resolved.is_absent());
    }

    #[test]
    fn requested_postfix_selects_file() {
        let listing = ["out_file_e1.nii.gz", "out_file_e2.nii.gz"];
        let resolved = resolve_in_listing(&dir(), &listing, &image("_e2", true)).unwrap();
        assert_eq!(resolved.path(), Some(dir().join("out_file_e2.nii.gz").as_path()));
    }

    #[test]
    fn missing_postfix_is_an_error_even_with_one_neighbour() {
        let listing = ["out_file_e1.nii.gz"];
        let err = resolve_in_listing(&dir(), &listing, &image("_e3", true)).unwrap_err();
        match err {
            Error::MissingOutput { expected, candidates, .. } => {
                assert_eq!(expected, dir().join("out_file_e3.nii.gz"));
                assert_eq!(candidates.len(), 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nothing_produced() {
        let listing: [&str; 0] = [];
        assert!(matches!(
            resolve_in_listing(&dir(), &listing, &image("", true)).unwrap_err(),
            Error::MissingOutput { .. }
        ));
        assert!(resolve_in_listing(&dir(), &listing, &image("", false))
            .unwrap()
            .is_absent());
    }

    #[test]
    fn extension_must_match_exactly() {
        let request = OutputRequest {
            extension: ".nii",
            ..image("", true)
        };
        let listing = ["out_file.nii.gz"];
        assert!(resolve_in_listing(&dir(), &listing, &request).is_err());
    }

    #[test]
    fn resolve_reads_the_directory() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("out_file.nii.gz"), b"").unwrap();
        std::fs::create_dir(tmp.path().join("out_file_e2.nii.gz")).unwrap();

        let resolved = resolve(tmp.path(), &image("", true)).unwrap();
        assert_eq!(resolved, Resolution::Found(tmp.path().join("out_file.nii.gz")));
    }

    #[test]
    fn bids_disabled_leaves_sidecars_absent() {
        let mut inputs = Dcm2NiixInputs::new("dicoms", dir());
        inputs.bids = Some(Bids::No);
        let listing = ["out_file.nii", "out_file.json", "out_file.bval", "out_file.bvec"];
        let outputs = collect_from_listing(&dir(), &listing, &inputs).unwrap();
        assert_eq!(outputs.out_file, Resolution::Found(dir().join("out_file.nii")));
        assert!(outputs.out_json.is_absent());
        assert!(outputs.out_bval.is_absent());
        assert!(outputs.out_bvec.is_absent());
    }

    #[test]
    fn bids_only_has_no_image() {
        let mut inputs = Dcm2NiixInputs::new("dicoms", dir());
        inputs.bids = Some(Bids::Only);
        let listing = ["out_file.json"];
        let outputs = collect_from_listing(&dir(), &listing, &inputs).unwrap();
        assert!(outputs.out_file.is_absent());
        assert_eq!(outputs.out_json, Resolution::Found(dir().join("out_file.json")));
    }

    #[test]
    fn echo_selects_every_output() {
        let mut inputs = Dcm2NiixInputs::new("dicoms", dir());
        inputs.compress = Some(Compress::Pigz);
        inputs.echo = Some(2);
        let listing = [
            "out_file_e1.nii.gz",
            "out_file_e1.json",
            "out_file_e2.nii.gz",
            "out_file_e2.json",
        ];
        let outputs = collect_from_listing(&dir(), &listing, &inputs).unwrap();
        assert_eq!(outputs.out_file, Resolution::Found(dir().join("out_file_e2.nii.gz")));
        assert_eq!(outputs.out_json, Resolution::Found(dir().join("out_file_e2.json")));
        assert!(outputs.out_bval.is_absent());
    }

    #[test]
    fn suffix_selects_phase_image() {
        let mut inputs = Dcm2NiixInputs::new("dicoms", dir());
        inputs.suffix = Some(Postfix::Phase);
        let listing = ["out_file.nii", "out_file_ph.nii"];
        let outputs = collect_from_listing(&dir(), &listing, &inputs).unwrap();
        assert_eq!(outputs.out_file, Resolution::Found(dir().join("out_file_ph.nii")));
    }

    #[test]
    fn nrrd_export_resolves_nrrd_image() {
        let mut inputs = Dcm2NiixInputs::new("dicoms", dir());
        inputs.export_nrrd = Some(YesNo::Yes);
        let listing = ["out_file.json", "out_file.nrrd"];
        let outputs = collect_from_listing(&dir(), &listing, &inputs).unwrap();
        assert_eq!(outputs.out_file, Resolution::Found(dir().join("out_file.nrrd")));
        assert_eq!(outputs.out_json, Resolution::Found(dir().join("out_file.json")));
    }

    #[test]
    fn compressed_nrrd_uses_detached_header() {
        let mut inputs = Dcm2NiixInputs::new("dicoms", dir());
        inputs.export_nrrd = Some(YesNo::Yes);
        inputs.compress = Some(Compress::Pigz);
        let listing = ["out_file.json", "out_file.nhdr", "out_file.raw.gz"];
        let outputs = collect_from_listing(&dir(), &listing, &inputs).unwrap();
        assert_eq!(outputs.out_file, Resolution::Found(dir().join("out_file.nhdr")));

        let listing = ["out_file.nrrd"];
        let outputs = collect_from_listing(&dir(), &listing, &inputs).unwrap();
        assert_eq!(outputs.out_file, Resolution::Found(dir().join("out_file.nrrd")));
    }

    #[test]
    fn missing_nrrd_reports_the_expected_extension() {
        let mut inputs = Dcm2NiixInputs::new("dicoms", dir());
        inputs.export_nrrd = Some(YesNo::Yes);
        let listing = ["out_file.nii"];
        match collect_from_listing(&dir(), &listing, &inputs).unwrap_err() {
            Error::MissingOutput { expected, .. } => {
                assert_eq!(expected, dir().join("out_file.nrrd"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn outputs_serialize_absent_as_null() {
        let outputs = Dcm2NiixOutputs {
            out_file: Resolution::Found(PathBuf::from("/data/out/out_file.nii")),
            out_json: Resolution::Absent,
            out_bval: Resolution::Absent,
            out_bvec: Resolution::Absent,
        };
        let json = serde_json::to_value(&outputs).unwrap();
        assert_eq!(json["out_file"], "/data/out/out_file.nii");
        assert!(json["out_json"].is_null());
    }
}
