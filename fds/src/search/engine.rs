use crossbeam_channel::unbounded;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use tracing::{debug, info};

use crate::config::FdsConfig;
use crate::errors::{FdsError, FdsResult};
use crate::filters::{compile_globs, should_ignore};
use crate::input::{Prompt, SharedPrompt};
use crate::replace::confirm::ConfirmAnswer;
use crate::replace::file::replace_in_file;
use crate::replace::Replacement;
use crate::results::{FanOutReport, FileOutcome};

/// Lists the regular files under `root`, sorted by name, minus the ignored ones
pub fn collect_files(root: &Path, ignore_globs: &[String]) -> FdsResult<Vec<PathBuf>> {
    debug!("Ignoring glob patterns {:?}", ignore_globs);
    let patterns = compile_globs(ignore_globs);

    let mut walker = WalkBuilder::new(root);
    walker
        .standard_filters(false)
        .hidden(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    let mut files = Vec::new();
    for entry in walker.build() {
        let entry = entry.map_err(|e| FdsError::directory_read(root, e.to_string()))?;
        let path = entry.path();

        if should_ignore(path, root, &patterns) {
            debug!("Pattern matched path {}", path.display());
            continue;
        }
        // Symlinks to files are kept; symlinked directories are not descended into
        let is_file = entry
            .file_type()
            .is_some_and(|ft| ft.is_file() || (ft.is_symlink() && path.is_file()));
        if is_file {
            files.push(entry.into_path());
        }
    }

    debug!("Found {} files in {}", files.len(), root.display());
    Ok(files)
}

/// Replaces the matches of `replacement` in every file of `files`.
///
/// With confirmation enabled, files are processed one after the other in order, the
/// first error ends the run and a `quit` answer stops before the next file.
/// Otherwise a pool of `options.workers` threads drains a queue of the files and
/// per-file errors are collected into the report.
pub fn replace_in_files<P: Prompt + Send>(
    files: &[PathBuf],
    replacement: &Replacement,
    options: &FdsConfig,
    prompt: &Mutex<P>,
    answer: &mut ConfirmAnswer,
) -> FdsResult<FanOutReport> {
    if options.flags.confirm {
        debug!("Find/replace won't be performed concurrently as flag confirm was supplied");
        return replace_sequentially(files, replacement, options, prompt, answer);
    }

    Ok(replace_concurrently(files, replacement, options, prompt))
}

fn replace_sequentially<P: Prompt + Send>(
    files: &[PathBuf],
    replacement: &Replacement,
    options: &FdsConfig,
    prompt: &Mutex<P>,
    answer: &mut ConfirmAnswer,
) -> FdsResult<FanOutReport> {
    let mut report = FanOutReport::new();
    let mut prompt = SharedPrompt(prompt);

    for path in files {
        let changed = replace_in_file(path, replacement, options, &mut prompt, answer)?;
        let outcome = FileOutcome {
            path: path.clone(),
            changed,
        };
        debug!("Processed {} (changed: {})", outcome.path.display(), outcome.changed);
        report.add_outcome(&outcome);

        if *answer == ConfirmAnswer::Quit {
            info!("Quit requested, remaining files are left untouched");
            break;
        }
    }

    Ok(report)
}

fn replace_concurrently<P: Prompt + Send>(
    files: &[PathBuf],
    replacement: &Replacement,
    options: &FdsConfig,
    prompt: &Mutex<P>,
) -> FanOutReport {
    let mut report = FanOutReport::new();
    if files.is_empty() {
        return report;
    }

    let workers = options.workers.get().min(files.len());
    debug!("Number of workers set for operation: {}", workers);

    let (job_tx, job_rx) = unbounded::<&PathBuf>();
    for path in files {
        // The receiver is alive for the whole function
        let _ = job_tx.send(path);
    }
    drop(job_tx);

    let (outcome_tx, outcome_rx) = unbounded::<FileOutcome>();
    let (error_tx, error_rx) = unbounded::<FdsError>();

    thread::scope(|scope| {
        for id in 0..workers {
            let job_rx = job_rx.clone();
            let outcome_tx = outcome_tx.clone();
            let error_tx = error_tx.clone();

            scope.spawn(move || {
                debug!("Worker {} initialized", id);
                let mut prompt = SharedPrompt(prompt);
                // Workers never confirm, so the answer is local to each of them
                let mut answer = ConfirmAnswer::default();

                for path in job_rx.iter() {
                    match replace_in_file(path, replacement, options, &mut prompt, &mut answer) {
                        Ok(changed) => {
                            let _ = outcome_tx.send(FileOutcome {
                                path: path.clone(),
                                changed,
                            });
                        }
                        Err(e) => {
                            let _ = error_tx.send(e);
                        }
                    }
                }
            });
        }
    });

    // Every worker has finished; dropping the last senders closes the channels
    drop(outcome_tx);
    drop(error_tx);

    for outcome in outcome_rx.iter() {
        debug!("Processed {} (changed: {})", outcome.path.display(), outcome.changed);
        report.add_outcome(&outcome);
    }
    report.errors.extend(error_rx.iter());

    info!(
        "Replace complete. Changed {} of {} files, {} errors",
        report.files_changed,
        report.files_processed,
        report.errors.len()
    );

    report
}
