//! Candidate sources for brute-force runs

use crate::{Alphabet, Generator};
use anyhow::{Context, bail};
use sqpack_storage::candidates;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing::{error, warn};

/// Placeholder replaced by each generated name in a template
pub const TEMPLATE_PLACEHOLDER: &str = "{}";

/// Where candidates come from
///
/// Sources are opened on the thread that consumes them; stdin cannot be
/// handed between threads once locked.
#[derive(Debug, Clone)]
pub enum CandidateSource {
    /// Built-in generator
    Generator(Generator),
    /// Line-oriented file
    File(PathBuf),
    /// Line-oriented standard input
    Stdin,
    /// Fixed-length names substituted into a template
    Alphabet {
        /// Character set
        alphabet: Alphabet,
        /// Name length
        length: usize,
        /// Path with a `{}` placeholder
        template: String,
    },
}

impl CandidateSource {
    /// Pick a source from command-line arguments
    pub fn from_args(
        generator: Option<Generator>,
        candidates: Option<PathBuf>,
        alphabet: Option<Alphabet>,
        length: usize,
        template: Option<String>,
    ) -> anyhow::Result<Self> {
        match (generator, candidates, alphabet) {
            (Some(generator), None, None) => Ok(Self::Generator(generator)),
            (None, Some(path), None) if path.as_os_str() == "-" => Ok(Self::Stdin),
            (None, Some(path), None) => Ok(Self::File(path)),
            (None, None, Some(alphabet)) => {
                let template = template.context("--alphabet requires --template")?;
                if !template.contains(TEMPLATE_PLACEHOLDER) {
                    bail!("template {template:?} has no {TEMPLATE_PLACEHOLDER} placeholder");
                }
                Ok(Self::Alphabet {
                    alphabet,
                    length,
                    template,
                })
            }
            (None, None, None) => bail!("one of --generator, --candidates or --alphabet is required"),
            _ => bail!("--generator, --candidates and --alphabet are mutually exclusive"),
        }
    }

    /// Open the candidate sequence
    pub fn open(self) -> anyhow::Result<Box<dyn Iterator<Item = String>>> {
        let iter: Box<dyn Iterator<Item = String>> = match self {
            Self::Generator(Generator::Icons) => Box::new(candidates::ui_icons()),
            Self::Generator(Generator::LoadingImages) => Box::new(candidates::loading_images()),
            Self::Generator(Generator::Maps) => Box::new(candidates::map_textures()),
            Self::File(path) => {
                let file = File::open(&path)
                    .with_context(|| format!("opening candidates {}", path.display()))?;
                Box::new(lines(BufReader::new(file)))
            }
            Self::Stdin => Box::new(lines(std::io::stdin().lock())),
            Self::Alphabet {
                alphabet,
                length,
                template,
            } => {
                let chars = match alphabet {
                    Alphabet::Lowercase => candidates::LOWERCASE,
                    Alphabet::Extended => candidates::LOWERCASE_DIGITS_UNDERSCORE,
                };
                Box::new(
                    candidates::alphabet_names(chars, length)
                        .map(move |name| template.replace(TEMPLATE_PLACEHOLDER, &name)),
                )
            }
        };
        Ok(iter)
    }
}

/// Non-empty trimmed lines; lines that are not UTF-8 are skipped
fn lines<R: BufRead + 'static>(reader: R) -> impl Iterator<Item = String> {
    reader
        .split(b'\n')
        .enumerate()
        .map_while(|(number, line)| match line {
            Ok(bytes) => Some((number, bytes)),
            Err(e) => {
                error!("Stopped reading candidates at line {}: {}", number + 1, e);
                None
            }
        })
        .filter_map(|(number, bytes)| match String::from_utf8(bytes) {
            Ok(line) => Some(line),
            Err(_) => {
                warn!("Skipping candidate line {}: not valid UTF-8", number + 1);
                None
            }
        })
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
}
