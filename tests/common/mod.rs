use std::fs;
use std::path::Path;

use dcm2niix_task::{CommandRunner, ProcessOutput, parse_args};

/// Stands in for dcm2niix: writes the given file names into the requested
/// output directory, substituting `{f}` with the requested base name.
pub struct FakeDcm2Niix {
    pub files: Vec<&'static str>,
    pub code: i32,
}

impl FakeDcm2Niix {
    pub fn writing(files: &[&'static str]) -> Self {
        Self {
            files: files.to_vec(),
            code: 0,
        }
    }

    pub fn failing(code: i32) -> Self {
        Self {
            files: Vec::new(),
            code,
        }
    }
}

impl CommandRunner for FakeDcm2Niix {
    fn run(&self, _program: &Path, args: &[String]) -> dcm2niix_task::Result<ProcessOutput> {
        let inputs = parse_args(args)?;
        let out_dir = inputs.out_dir.expect("out_dir is always rendered");
        for name in &self.files {
            let name = name.replace("{f}", &inputs.filename);
            fs::write(out_dir.join(name), b"")?;
        }
        Ok(ProcessOutput {
            code: self.code,
            stdout: "Conversion required 0.1 seconds\n".to_string(),
            stderr: if self.code == 0 {
                String::new()
            } else {
                "Error: Unable to find any DICOM images\n".to_string()
            },
        })
    }
}
