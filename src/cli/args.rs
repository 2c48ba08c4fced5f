use clap::Parser;
use std::path::PathBuf;

use dcm2niix_task::{
    Bids, ByteOrder, Compress, Crop3d, GenerateDefaults, LosslessScale, Merge2d, NameConflicts,
    Postfix, Verbosity, YesNo,
};

#[derive(Parser)]
#[command(name = "dcm2niix-task", version, about = "Typed dcm2niix runner")]
pub struct CliArgs {
    /// Directory containing the DICOMs to convert
    pub in_dir: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Output base name (default: out_file)
    #[arg(short, long)]
    pub filename: Option<String>,

    /// Inputs as JSON; options given on the command line take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// dcm2niix binary to run
    #[arg(long)]
    pub executable: Option<PathBuf>,

    /// Print the command line and exit without running it
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Print the run record as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Echo number to select when several echoes are written (_e<echo>)
    #[arg(long, conflicts_with = "suffix")]
    pub echo: Option<u32>,

    /// Post-fix to select among disambiguated outputs
    #[arg(long, value_enum)]
    pub suffix: Option<Postfix>,

    /// gz compress images [y=pigz, o=optimal pigz, i=internal:miniz, n=no, 3=no,3D]
    #[arg(long, value_enum)]
    pub compress: Option<Compress>,

    /// gz compression level (1-9)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: Option<u8>,

    /// Adjacent DICOMs
    #[arg(long, value_enum)]
    pub adjacent: Option<YesNo>,

    /// BIDS sidecar [o=only: no NIfTI]
    #[arg(long, value_enum)]
    pub bids: Option<Bids>,

    /// Anonymize BIDS
    #[arg(long, value_enum)]
    pub anonymize_bids: Option<YesNo>,

    /// Comment stored in NIfTI aux_file
    #[arg(long, default_value_t = false)]
    pub store_comments: bool,

    /// Directory search depth (0-9)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=9))]
    pub search_depth: Option<u8>,

    /// Export as NRRD instead of NIfTI
    #[arg(long, value_enum)]
    pub export_nrrd: Option<YesNo>,

    /// Generate defaults file [o=only: reset and write defaults; i=ignore: reset defaults]
    #[arg(long, value_enum)]
    pub generate_defaults: Option<GenerateDefaults>,

    /// Ignore derived, localizer and 2D images
    #[arg(long, value_enum)]
    pub ignore_derived: Option<YesNo>,

    /// Losslessly scale 16-bit integers to use dynamic range
    #[arg(long, value_enum)]
    pub losslessly_scale: Option<LosslessScale>,

    /// Merge 2D slices from same series regardless of echo, exposure, etc.
    #[arg(long = "merge-2d", value_enum)]
    pub merge_2d: Option<Merge2d>,

    /// Only convert this series CRC number (repeatable, up to 16 times)
    #[arg(long)]
    pub only: Vec<u32>,

    /// Philips precise float (not display) scaling
    #[arg(long, value_enum)]
    pub philips_scaling: Option<YesNo>,

    /// Rename instead of convert DICOMs
    #[arg(long, value_enum)]
    pub rename_instead: Option<YesNo>,

    /// Single file mode, do not convert other images in folder
    #[arg(long, value_enum)]
    pub single_file_mode: Option<YesNo>,

    /// Text notes include private patient details
    #[arg(long, value_enum)]
    pub private_text_notes: Option<YesNo>,

    /// Up-to-date check
    #[arg(long, default_value_t = false)]
    pub up_to_date_check: bool,

    /// dcm2niix verbosity [no, yes, logorrheic]
    #[arg(long, value_enum)]
    pub verbose: Option<Verbosity>,

    /// Write behavior for name conflicts [0=skip duplicates, 1=overwrite, 2=add suffix]
    #[arg(long, value_enum)]
    pub name_conflicts: Option<NameConflicts>,

    /// Crop 3D acquisitions (i: neither crop nor rotate)
    #[arg(long = "crop-3d", value_enum)]
    pub crop_3d: Option<Crop3d>,

    /// Byte order [y=big-end, n=little-end, o=optimal/native]
    #[arg(long, value_enum)]
    pub big_endian: Option<ByteOrder>,

    /// Slicer format progress information
    #[arg(long, value_enum)]
    pub progress: Option<YesNo>,

    /// Omit filename post-fixes
    #[arg(long, default_value_t = false)]
    pub terse: bool,

    /// Ask dcm2niix to report its version
    #[arg(long, default_value_t = false)]
    pub report_version: bool,

    /// Slicer format features
    #[arg(long, default_value_t = false)]
    pub xml: bool,
}
