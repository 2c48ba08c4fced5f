use std::path::Path;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dcm2niix_task::{Dcm2Niix, Dcm2NiixInputs, Dcm2NiixOutputs, Resolution};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dcm2niix_task=debug,info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_base(config: Option<&Path>) -> Result<Dcm2NiixInputs, AppError> {
    match config {
        Some(path) => Dcm2NiixInputs::from_json_file(path).map_err(|source| AppError::Config {
            path: path.display().to_string(),
            source,
        }),
        None => Ok(Dcm2NiixInputs::default()),
    }
}

/// Layer command-line options over the config file (or defaults).
pub fn build_inputs(args: &CliArgs) -> Result<Dcm2NiixInputs, AppError> {
    let mut inputs = load_base(args.config.as_deref())?;

    macro_rules! take {
        ($($field:ident),+ $(,)?) => {
            $(
                if let Some(value) = args.$field.clone() {
                    inputs.$field = Some(value);
                }
            )+
        };
    }

    take!(
        in_dir,
        out_dir,
        echo,
        suffix,
        compress,
        compression_level,
        adjacent,
        bids,
        anonymize_bids,
        search_depth,
        export_nrrd,
        generate_defaults,
        ignore_derived,
        losslessly_scale,
        merge_2d,
        philips_scaling,
        rename_instead,
        single_file_mode,
        private_text_notes,
        verbose,
        name_conflicts,
        crop_3d,
        big_endian,
        progress,
    );

    if let Some(filename) = &args.filename {
        inputs.filename = filename.clone();
    }
    // echo and suffix select the same thing; the most specific source wins
    if args.echo.is_some() {
        inputs.suffix = None;
    } else if args.suffix.is_some() {
        inputs.echo = None;
    }
    if !args.only.is_empty() {
        inputs.only = args.only.clone();
    }
    inputs.store_comments |= args.store_comments;
    inputs.up_to_date_check |= args.up_to_date_check;
    inputs.terse |= args.terse;
    inputs.version |= args.report_version;
    inputs.xml |= args.xml;

    debug!("Resolved inputs: {:?}", inputs);
    Ok(inputs)
}

fn describe(resolution: &Resolution) -> String {
    match resolution.path() {
        Some(path) => path.display().to_string(),
        None => "<absent>".to_string(),
    }
}

fn print_outputs(outputs: &Dcm2NiixOutputs) {
    println!("out_file: {}", describe(&outputs.out_file));
    println!("out_json: {}", describe(&outputs.out_json));
    println!("out_bval: {}", describe(&outputs.out_bval));
    println!("out_bvec: {}", describe(&outputs.out_bvec));
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        init_logging();
    }

    let inputs = build_inputs(&args)?;
    let mut task = Dcm2Niix::new(inputs);
    if let Some(executable) = &args.executable {
        task = task.with_executable(executable);
    }

    if args.dry_run {
        println!("{}", task.cmdline().map_err(AppError::from)?);
        return Ok(());
    }

    let result = task.run().map_err(AppError::from)?;
    info!("Conversion complete: {}", result.cmdline);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result).map_err(AppError::from)?);
    } else {
        if !result.stdout.is_empty() {
            print!("{}", result.stdout);
        }
        if let Some(outputs) = &result.outputs {
            print_outputs(outputs);
        }
    }

    Ok(())
}
