//! SqPack command-line library
//!
//! Argument types and command handlers for the `sqpack` binary.

pub mod commands;

pub use crate::commands::archive::handle;

use clap::Subcommand;
use std::path::PathBuf;

/// Output format options for the CLI
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON output
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

/// Built-in candidate generators
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Generator {
    /// `ui/icon/NNN000[/hq]/NNNNNN.tex`
    Icons,
    /// `ui/loadingimage/-nowloading_baseNN.tex`
    LoadingImages,
    /// Region maps and 4-character map codes under `ui/map/`
    Maps,
}

/// Alphabets for fixed-length name enumeration
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alphabet {
    /// a-z
    Lowercase,
    /// a-z, 0-9 and `_`
    Extended,
}

/// Directories shared by every archive command
#[derive(clap::Args, Clone, Debug)]
pub struct ArchiveArgs {
    /// Path to the `.index` file
    pub index: PathBuf,

    /// Directory for snapshots, confirmed paths and SQL exports
    #[arg(long, env = "SQPACK_WORK_DIR", default_value = "data")]
    pub work_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify the index checksums and print a summary
    Verify {
        #[command(flatten)]
        archive: ArchiveArgs,
    },

    /// Show the hashes and location of a path
    Lookup {
        #[command(flatten)]
        archive: ArchiveArgs,

        /// Full archive path (e.g. ui/icon/000000/000001.tex)
        path: String,
    },

    /// Test candidate paths against unresolved entries
    BruteForce {
        #[command(flatten)]
        archive: ArchiveArgs,

        /// Built-in generator to run
        #[arg(short, long, value_enum, conflicts_with_all = ["candidates", "alphabet"])]
        generator: Option<Generator>,

        /// File with one candidate per line (`-` for stdin)
        #[arg(short, long, conflicts_with = "alphabet")]
        candidates: Option<PathBuf>,

        /// Enumerate every name of `--length` characters from this alphabet
        #[arg(short, long, value_enum, requires = "template")]
        alphabet: Option<Alphabet>,

        /// Name length for `--alphabet`
        #[arg(long, default_value = "3")]
        length: usize,

        /// Path template for `--alphabet`; `{}` is replaced by each name
        #[arg(short, long)]
        template: Option<String>,
    },

    /// Extract a path, or every confirmed path when none is given
    Extract {
        #[command(flatten)]
        archive: ArchiveArgs,

        /// Full archive path to extract
        path: Option<String>,

        /// Output directory
        #[arg(short, long, env = "SQPACK_EXTRACT_DIR", default_value = "extract")]
        output: PathBuf,
    },

    /// Export confirmed paths as SQL
    Sql {
        #[command(flatten)]
        archive: ArchiveArgs,
    },
}
