//! Shared choice enums used across the crate.
//! Each enum maps one-to-one onto the tokens dcm2niix accepts for a flag, so the
//! same values work on the command line (`clap::ValueEnum`), in JSON config
//! files (`serde`) and when rendering the tool's argv (`as_arg`).
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $token:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, ValueEnum, Serialize, Deserialize,
        )]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[value(name = $token)]
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            /// Tokens accepted by dcm2niix, in declaration order.
            pub const ALLOWED: &'static [&'static str] = &[$($token),+];

            pub fn as_arg(&self) -> &'static str {
                match self {
                    $( $name::$variant => $token, )+
                }
            }

            /// Parse a token, reporting failures against `field`.
            pub fn parse_for(field: &'static str, value: &str) -> Result<Self> {
                match value {
                    $( $token => Ok($name::$variant), )+
                    _ => Err(Error::InvalidChoice {
                        field,
                        value: value.to_string(),
                        allowed: Self::ALLOWED.join(", "),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_arg())
            }
        }

        /// Failures name the type (e.g. `Compress`) as the field; use `parse_for`
        /// to report against the input field instead.
        impl std::str::FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_for(stringify!($name), s)
            }
        }
    };
}

choice_enum! {
    /// gz compression of written images (`-z`)
    pub enum Compress {
        /// pigz
        Pigz => "y",
        /// optimal pigz
        Optimal => "o",
        /// internal miniz
        Internal => "i",
        No => "n",
        /// no compression, 3D volumes
        No3d => "3",
    }
}

impl Compress {
    /// True when dcm2niix writes `.nii.gz` instead of `.nii`.
    pub fn is_gzipped(&self) -> bool {
        matches!(self, Compress::Pigz | Compress::Optimal | Compress::Internal)
    }
}

choice_enum! {
    /// BIDS sidecar export (`-b`); `o` writes only the sidecar and no NIfTI
    pub enum Bids {
        Yes => "y",
        No => "n",
        Only => "o",
    }
}

choice_enum! {
    pub enum YesNo {
        Yes => "y",
        No => "n",
    }
}

choice_enum! {
    /// Defaults file handling (`-g`)
    pub enum GenerateDefaults {
        Yes => "y",
        No => "n",
        /// reset and write defaults
        Only => "o",
        /// reset defaults
        Ignore => "i",
    }
}

choice_enum! {
    /// Lossless scaling of 16-bit integers (`-l`)
    pub enum LosslessScale {
        Yes => "y",
        /// no, but uint16 -> int16
        No => "n",
        Original => "o",
    }
}

choice_enum! {
    /// Merge 2D slices from the same series regardless of echo, exposure etc. (`-m`)
    pub enum Merge2d {
        Yes => "y",
        No => "n",
        Off => "0",
        On => "1",
        Auto => "2",
    }
}

choice_enum! {
    /// Console verbosity (`-v`): no, yes, logorrheic
    pub enum Verbosity {
        Yes => "y",
        No => "n",
        Quiet => "0",
        Verbose => "1",
        Logorrheic => "2",
    }
}

choice_enum! {
    /// Write behaviour on name conflicts (`-w`)
    pub enum NameConflicts {
        SkipDuplicates => "0",
        Overwrite => "1",
        AddSuffix => "2",
    }
}

choice_enum! {
    /// Crop 3D acquisitions (`-x`); `i` neither crops nor rotates
    pub enum Crop3d {
        Yes => "y",
        No => "n",
        Ignore => "i",
    }
}

choice_enum! {
    /// Output byte order (`--big-endian`)
    pub enum ByteOrder {
        Big => "y",
        Little => "n",
        Native => "o",
    }
}

choice_enum! {
    /// Filename post-fixes dcm2niix appends when one series yields several images.
    /// Used only to select among produced outputs; never passed to the tool.
    pub enum Postfix {
        Equalized => "Eq",
        Phase => "ph",
        Imaginary => "imaginary",
        MoCo => "MoCo",
        Real => "real",
        PhaseMagnitude => "phMag",
    }
}
