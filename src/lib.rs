#![doc = r#"
dcm2niix-task — a typed task wrapper around the `dcm2niix` DICOM to NIfTI converter.

This crate declares dcm2niix's command-line flags as typed, validated inputs,
renders the invocation from them, runs the external binary and works out which
of the files it wrote correspond to each declared output. It powers the
`dcm2niix-task` CLI and can be embedded in your own pipelines.

Requirements
------------
- `dcm2niix` available on `PATH` (or passed explicitly via `with_executable`).
- Rust 2024 edition toolchain.

Quick start: convert a DICOM directory
--------------------------------------
```rust,no_run
use dcm2niix_task::{Compress, Dcm2Niix, Dcm2NiixInputs};

fn main() -> dcm2niix_task::Result<()> {
    let mut inputs = Dcm2NiixInputs::new("/data/dicoms", "/data/nifti");
    inputs.compress = Some(Compress::Pigz);

    let result = Dcm2Niix::new(inputs).run()?;
    if let Some(outputs) = result.outputs {
        println!("image: {:?}", outputs.out_file.path());
        println!("sidecar: {:?}", outputs.out_json.path());
    }
    Ok(())
}
```

Render the command line only
----------------------------
```rust
use dcm2niix_task::{Compress, Dcm2Niix, Dcm2NiixInputs};

let mut inputs = Dcm2NiixInputs::new("test-data/test_dicoms", "test-data");
inputs.compress = Some(Compress::Pigz);
assert_eq!(
    Dcm2Niix::new(inputs).cmdline().unwrap(),
    "dcm2niix -o test-data -f out_file -z y test-data/test_dicoms"
);
```

Assign fields by name
---------------------
Values set by name are checked against the field table, so an out-of-set
choice is rejected before anything runs.

```rust
use dcm2niix_task::{Dcm2NiixInputs, Error};

let mut inputs = Dcm2NiixInputs::new("dicoms", "out");
inputs.set("crop_3d", "i").unwrap();
assert!(matches!(
    inputs.set("crop_3d", "sideways"),
    Err(Error::InvalidChoice { field: "crop_3d", .. })
));
```

Multi-echo data
---------------
When one series yields several images dcm2niix appends post-fixes (`_e1`,
`_e2`, `_ph`, ...). Select one with `echo` or `suffix`; without a selection an
ambiguous image output is reported as `Error::AmbiguousOutput` listing the
candidates.

```rust
use std::path::Path;
use dcm2niix_task::{resolve_in_listing, OutputKind, OutputRequest, Resolution};

let listing = ["out_file_e1.nii.gz", "out_file_e2.nii.gz"];
let request = OutputRequest {
    kind: OutputKind::Image,
    filename: "out_file",
    postfix: "_e2",
    extension: ".nii.gz",
    required: true,
};
let resolved = resolve_in_listing(Path::new("/data/nifti"), &listing, &request).unwrap();
assert!(matches!(resolved, Resolution::Found(_)));
```

Useful modules
--------------
- [`api`] — the `Dcm2Niix` task.
- [`core`] — field table, typed inputs, command-line builder, output resolver.
- [`types`] — choice enums (`Compress`, `Bids`, `Postfix`, ...).
- [`io`] — process runner and directory listing.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use crate::core::fields::{FIELDS, FieldKind, FieldSpec, FieldValue, Token};
pub use crate::core::params::Dcm2NiixInputs;
pub use error::{Error, Result};
pub use types::{
    Bids, ByteOrder, Compress, Crop3d, GenerateDefaults, LosslessScale, Merge2d, NameConflicts,
    Postfix, Verbosity, YesNo,
};

// Command line and outputs
pub use crate::core::cmdline::{EXECUTABLE, build_args, parse_args, render_cmdline};
pub use crate::core::outputs::{
    Dcm2NiixOutputs, OutputKind, OutputRequest, Resolution, collect_from_listing,
    collect_outputs, resolve, resolve_in_listing,
};

// Process execution
pub use io::process::{CommandRunner, ProcessOutput, SystemRunner};

// High-level API re-exports
pub use api::{Dcm2Niix, TaskResult};
