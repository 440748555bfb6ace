use crate::commands::candidates::CandidateSource;
use crate::commands::emit;
use crate::{ArchiveArgs, Commands, OutputFormat};
use serde::Serialize;
use sqpack_storage::{Archive, ArchiveConfig, BruteForceResolver};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

pub async fn handle(cmd: Commands, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        Commands::Verify { archive } => handle_verify(&archive, format).await,
        Commands::Lookup { archive, path } => handle_lookup(&archive, &path, format).await,
        Commands::BruteForce {
            archive,
            generator,
            candidates,
            alphabet,
            length,
            template,
        } => {
            let source =
                CandidateSource::from_args(generator, candidates, alphabet, length, template)?;
            handle_brute_force(&archive, source, format).await
        }
        Commands::Extract {
            archive,
            path,
            output,
        } => handle_extract(&archive, path, &output, format).await,
        Commands::Sql { archive } => handle_sql(&archive, format).await,
    }
}

fn open_archive(args: &ArchiveArgs, extract_dir: Option<&Path>) -> anyhow::Result<Archive> {
    let mut config = ArchiveConfig::new(&args.index).with_work_dir(&args.work_dir);
    if let Some(dir) = extract_dir {
        config = config.with_extract_dir(dir);
    }
    debug!("Archive config: {:?}", config);
    Ok(Archive::open(config)?)
}

#[derive(Serialize)]
struct SegmentSummary {
    number: u8,
    index: u32,
    offset: u32,
    size: u32,
    sha1: String,
}

#[derive(Serialize)]
struct VerifySummary {
    index: PathBuf,
    header_hash: String,
    segments: Vec<SegmentSummary>,
    files: usize,
    directories: usize,
    duplicates: usize,
}

async fn handle_verify(args: &ArchiveArgs, format: OutputFormat) -> anyhow::Result<()> {
    let archive = open_archive(args, None)?;
    let index = archive.parse_index().await?;

    let summary = VerifySummary {
        index: args.index.clone(),
        header_hash: index.header.header_hash.to_hex(),
        segments: index
            .segments
            .iter()
            .map(|s| SegmentSummary {
                number: s.number,
                index: s.index,
                offset: s.offset,
                size: s.size,
                sha1: s.expected_hash.to_hex(),
            })
            .collect(),
        files: index.lookup.len(),
        directories: index.lookup.directory_count(),
        duplicates: index.duplicate_records,
    };

    emit(format, &summary, |s| {
        println!("Index: {}", s.index.display());
        println!("Header SHA-1: {} (not verified)", s.header_hash);
        for segment in &s.segments {
            println!(
                "Segment {}: offset={:#x} size={} sha1={} OK",
                segment.number, segment.offset, segment.size, segment.sha1
            );
        }
        println!(
            "{} files in {} directories ({} duplicate records)",
            s.files, s.directories, s.duplicates
        );
    })
}

#[derive(Serialize)]
struct LookupSummary {
    path: String,
    path_hash: u32,
    file_hash: u32,
    data_file: Option<u32>,
    offset: Option<u64>,
}

async fn handle_lookup(args: &ArchiveArgs, path: &str, format: OutputFormat) -> anyhow::Result<()> {
    let archive = open_archive(args, None)?;
    let found = archive.lookup(path).await?;

    let summary = LookupSummary {
        path: found.path,
        path_hash: found.path_hash,
        file_hash: found.file_hash,
        data_file: found.location.map(|l| l.data_file),
        offset: found.location.map(|l| l.offset),
    };

    emit(format, &summary, |s| {
        println!("{}: {:08x}/{:08x}", s.path, s.path_hash, s.file_hash);
        match (s.data_file, s.offset) {
            (Some(data_file), Some(offset)) => {
                println!("  dat{data_file} @ {offset:#x}");
            }
            _ => println!("  not in index"),
        }
    })
}

#[derive(Serialize)]
struct BruteForceSummary {
    found: Vec<String>,
    invalid: usize,
    tested: u64,
    interrupted: bool,
    remaining: usize,
    confirmed: usize,
}

async fn handle_brute_force(
    args: &ArchiveArgs,
    source: CandidateSource,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let archive = open_archive(args, None)?;
    let store = archive.load_lookup().await?;
    info!("{} unresolved entries", store.len());

    let stop = Arc::new(AtomicBool::new(false));
    let signal_stop = Arc::clone(&stop);
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, saving progress");
            signal_stop.store(true, Ordering::Relaxed);
        }
    });

    let run_stop = Arc::clone(&stop);
    let (store, resolution) = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let candidates = source.open()?;
        let mut resolver = BruteForceResolver::new(store);
        let resolution = resolver.resolve_until(candidates, &run_stop);
        Ok((resolver.into_store(), resolution))
    })
    .await??;
    signal.abort();

    let report = archive.persist(store, resolution).await?;
    let summary = BruteForceSummary {
        invalid: report.invalid.len(),
        tested: report.tested,
        interrupted: report.interrupted,
        remaining: report.remaining,
        confirmed: report.confirmed,
        found: report.found,
    };

    emit(format, &summary, |s| {
        for path in &s.found {
            println!("{path}");
        }
        if s.found.is_empty() {
            println!("Nothing found");
        }
        println!(
            "Tested {} candidates, {} new, {} confirmed, {} unresolved{}",
            s.tested,
            s.found.len(),
            s.confirmed,
            s.remaining,
            if s.interrupted { " (interrupted)" } else { "" }
        );
    })
}

#[derive(Serialize)]
struct ExtractSummary {
    extracted: Vec<PathBuf>,
    failed: Vec<ExtractFailure>,
}

#[derive(Serialize)]
struct ExtractFailure {
    path: String,
    error: String,
}

async fn handle_extract(
    args: &ArchiveArgs,
    path: Option<String>,
    output: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let archive = open_archive(args, Some(output))?;

    let summary = match path {
        Some(path) => ExtractSummary {
            extracted: vec![archive.extract(&path).await?],
            failed: Vec::new(),
        },
        None => {
            let report = archive.extract_confirmed().await?;
            ExtractSummary {
                extracted: report.extracted,
                failed: report
                    .failed
                    .into_iter()
                    .map(|(path, e)| ExtractFailure {
                        path,
                        error: e.to_string(),
                    })
                    .collect(),
            }
        }
    };

    emit(format, &summary, |s| {
        for written in &s.extracted {
            println!("{}", written.display());
        }
        for failure in &s.failed {
            println!("FAILED {}: {}", failure.path, failure.error);
        }
    })
}

#[derive(Serialize)]
struct SqlSummary {
    output: PathBuf,
}

async fn handle_sql(args: &ArchiveArgs, format: OutputFormat) -> anyhow::Result<()> {
    let archive = open_archive(args, None)?;
    let output = archive.export_sql().await?;

    emit(format, &SqlSummary { output }, |s| {
        println!("Wrote {}", s.output.display());
    })
}
