//! Dependency-counter compile scheduler.
//!
//! Compiles the stale subset of a resolved design on a pool of worker
//! threads. Each not-yet-compiled file carries the count of its unsatisfied
//! stale dependencies; a file is dispatched only when that count reaches
//! zero, so two files compile concurrently only when neither is an ancestor
//! of the other. Completion decrements the counters of dependents and may
//! unblock them. A failed compile never aborts the run: it poisons its
//! transitive dependents (recorded as skipped) while independent files
//! proceed.
//!
//! Writes into a library's artifact directory are serialized by a
//! per-library lock, since backends treat the directory as one mutable
//! index. The cache entry for a file is rewritten, and the manifest
//! persisted, only after its compile succeeds.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::time::Duration;

use hdlrun_cache::CompileManifest;
use hdlrun_diagnostics::{classify_output, DiagnosticSink};
use hdlrun_project::{FileId, ResolvedDesign};
use hdlrun_sim::{AbortSignal, CompileOutcome, LibraryMapping, Simulator};

/// Knobs for a compile pass.
pub struct CompileSettings<'a> {
    /// Maximum concurrent compile workers (0 = auto-detect).
    pub workers: usize,
    /// VHDL standard revision passed to the backend.
    pub standard: &'a str,
    /// Directory holding the compile state cache.
    pub cache_dir: &'a Path,
}

/// How a single file fared in the compile pass.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CompileStatus {
    /// The cache showed the file unchanged; nothing was done.
    UpToDate,
    /// The backend compiled the file successfully.
    Compiled,
    /// The backend reported a failure (or the compile was aborted).
    Failed,
    /// A transitive dependency failed, so this file was never attempted.
    Skipped,
}

/// Per-file record of the compile pass.
#[derive(Clone, Debug)]
pub struct FileCompileResult {
    /// The file.
    pub file: FileId,
    /// Its path, for reporting.
    pub path: PathBuf,
    /// What happened.
    pub status: CompileStatus,
    /// Captured tool output (or the skip/abort reason).
    pub output: String,
    /// Wall-clock time of the backend invocation(s).
    pub elapsed: Duration,
}

impl FileCompileResult {
    /// `true` if the file is usable by downstream work.
    pub fn is_ok(&self) -> bool {
        matches!(self.status, CompileStatus::UpToDate | CompileStatus::Compiled)
    }
}

/// The full outcome of a compile pass, in compile order.
pub struct CompileReport {
    /// Per-file results, ordered by compile order.
    pub results: Vec<FileCompileResult>,
    ok: Vec<bool>,
}

impl CompileReport {
    fn new(results: Vec<FileCompileResult>, file_count: usize) -> Self {
        let mut ok = vec![false; file_count];
        for r in &results {
            ok[r.file.index()] = r.is_ok();
        }
        Self { results, ok }
    }

    /// `true` if `file` is compiled and current after this pass.
    pub fn compiled_ok(&self, file: FileId) -> bool {
        self.ok[file.index()]
    }

    /// `true` if every file is compiled and current.
    pub fn all_ok(&self) -> bool {
        self.ok.iter().all(|&b| b)
    }

    /// Number of files that failed or were skipped.
    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_ok()).count()
    }

    /// Number of files actually recompiled.
    pub fn compiled_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == CompileStatus::Compiled)
            .count()
    }
}

/// Compiles every stale file of `design`, in dependency order, on up to
/// `settings.workers` concurrent workers.
///
/// Returns a per-file report covering the whole compile order; the cache
/// manifest is updated and persisted after each successful compile.
/// Diagnostics classified from the captured tool output are emitted into
/// `sink` as workers finish.
pub fn compile_project(
    design: &ResolvedDesign<'_>,
    manifest: &mut CompileManifest,
    simulator: &dyn Simulator,
    libraries: &[LibraryMapping],
    settings: &CompileSettings<'_>,
    sink: &DiagnosticSink,
    abort: &AbortSignal,
) -> CompileReport {
    let project = design.project();
    let file_count = project.files().len();
    let mut results: Vec<Option<FileCompileResult>> = vec![None; file_count];

    // Staleness in one forward pass over the compile order.
    let plan = design.stale_files(manifest);
    let mut stale = vec![false; file_count];
    for entry in &plan {
        if entry.needs_compile {
            stale[entry.file.index()] = true;
        } else {
            results[entry.file.index()] = Some(FileCompileResult {
                file: entry.file,
                path: project.file(entry.file).path.clone(),
                status: CompileStatus::UpToDate,
                output: String::new(),
                elapsed: Duration::ZERO,
            });
        }
    }

    let stale_files: Vec<FileId> = plan
        .iter()
        .filter(|e| e.needs_compile)
        .map(|e| e.file)
        .collect();
    let mut pending = stale_files.len();

    if pending == 0 {
        return finish(results, design);
    }

    // Library artifact directories are created lazily, before the first
    // compile that would write into them.
    let mut dir_errors: HashMap<String, String> = HashMap::new();
    for lib in project.libraries() {
        let has_stale = lib.files.iter().any(|f| stale[f.index()]);
        if has_stale {
            if let Err(e) = lib.ensure_directory() {
                dir_errors.insert(lib.name.to_ascii_lowercase(), e.to_string());
            }
        }
    }

    // Unsatisfied-dependency counters, restricted to the stale subset:
    // up-to-date dependencies are already satisfied.
    let mut in_degree = vec![0usize; file_count];
    for &f in &stale_files {
        in_degree[f.index()] = design
            .graph()
            .direct_deps(f)
            .iter()
            .filter(|d| stale[d.index()])
            .count();
    }
    let mut ready: VecDeque<FileId> = stale_files
        .iter()
        .copied()
        .filter(|f| in_degree[f.index()] == 0)
        .collect();

    // One exclusive writer per library artifact directory. Keyed off the
    // project so every registered file's library has a lock.
    let lib_locks: HashMap<String, Mutex<()>> = project
        .libraries()
        .iter()
        .map(|l| (l.name.to_ascii_lowercase(), Mutex::new(())))
        .collect();

    let workers = effective_workers(settings.workers);
    let (job_tx, job_rx) = mpsc::channel::<FileId>();
    let (res_tx, res_rx) = mpsc::channel::<(FileId, CompileOutcome)>();
    let job_rx = Mutex::new(job_rx);
    let job_rx = &job_rx;
    let lib_locks = &lib_locks;

    std::thread::scope(|s| {
        for _ in 0..workers {
            let res_tx = res_tx.clone();
            s.spawn(move || loop {
                let file = match job_rx.lock().unwrap().recv() {
                    Ok(f) => f,
                    Err(_) => break,
                };
                let source = design.project().file(file);
                let lock = &lib_locks[&source.library.to_ascii_lowercase()];
                let outcome = {
                    let _guard = lock.lock().unwrap();
                    simulator.compile_file(source, libraries, settings.standard, abort)
                };
                sink.emit_all(classify_output(&outcome.output, simulator.name()));
                if res_tx.send((file, outcome)).is_err() {
                    break;
                }
            });
        }
        drop(res_tx);

        let mut in_flight = 0usize;
        while pending > 0 {
            while let Some(file) = ready.pop_front() {
                if results[file.index()].is_some() {
                    continue;
                }
                let lib_key = project.file(file).library.to_ascii_lowercase();
                if abort.is_aborted() {
                    record(
                        &mut results,
                        &mut pending,
                        design,
                        file,
                        CompileStatus::Failed,
                        "compile aborted".to_string(),
                        Duration::ZERO,
                    );
                    poison_dependents(design, file, &stale, &mut results, &mut pending);
                } else if let Some(err) = dir_errors.get(&lib_key) {
                    record(
                        &mut results,
                        &mut pending,
                        design,
                        file,
                        CompileStatus::Failed,
                        format!("failed to create library directory: {err}"),
                        Duration::ZERO,
                    );
                    poison_dependents(design, file, &stale, &mut results, &mut pending);
                } else {
                    // Worker threads outlive this send; ignore a closed
                    // channel, the in-flight accounting drains regardless.
                    if job_tx.send(file).is_ok() {
                        in_flight += 1;
                    }
                }
            }

            if pending == 0 || in_flight == 0 {
                break;
            }

            let Ok((file, outcome)) = res_rx.recv() else {
                break;
            };
            in_flight -= 1;

            if outcome.success {
                design.mark_compiled(manifest, file);
                let _ = manifest.save(settings.cache_dir);
                record(
                    &mut results,
                    &mut pending,
                    design,
                    file,
                    CompileStatus::Compiled,
                    outcome.output,
                    outcome.elapsed,
                );
                for dep in design.graph().dependents(file) {
                    let i = dep.index();
                    if stale[i] && results[i].is_none() {
                        in_degree[i] -= 1;
                        if in_degree[i] == 0 {
                            ready.push_back(dep);
                        }
                    }
                }
            } else {
                record(
                    &mut results,
                    &mut pending,
                    design,
                    file,
                    CompileStatus::Failed,
                    outcome.output,
                    outcome.elapsed,
                );
                poison_dependents(design, file, &stale, &mut results, &mut pending);
            }
        }

        drop(job_tx);
    });

    finish(results, design)
}

/// Records a terminal state for one stale file.
#[allow(clippy::too_many_arguments)]
fn record(
    results: &mut [Option<FileCompileResult>],
    pending: &mut usize,
    design: &ResolvedDesign<'_>,
    file: FileId,
    status: CompileStatus,
    output: String,
    elapsed: Duration,
) {
    debug_assert!(results[file.index()].is_none());
    results[file.index()] = Some(FileCompileResult {
        file,
        path: design.project().file(file).path.clone(),
        status,
        output,
        elapsed,
    });
    *pending -= 1;
}

/// Marks every stale transitive dependent of `failed` as skipped.
fn poison_dependents(
    design: &ResolvedDesign<'_>,
    failed: FileId,
    stale: &[bool],
    results: &mut [Option<FileCompileResult>],
    pending: &mut usize,
) {
    let failed_path = design.project().file(failed).path.clone();
    let mut stack = vec![failed];
    while let Some(file) = stack.pop() {
        for dep in design.graph().dependents(file) {
            let i = dep.index();
            if stale[i] && results[i].is_none() {
                results[i] = Some(FileCompileResult {
                    file: dep,
                    path: design.project().file(dep).path.clone(),
                    status: CompileStatus::Skipped,
                    output: format!(
                        "skipped: dependency {} failed to compile",
                        failed_path.display()
                    ),
                    elapsed: Duration::ZERO,
                });
                *pending -= 1;
                stack.push(dep);
            }
        }
    }
}

/// Orders the per-file results by compile order and derives the ok set.
fn finish(
    results: Vec<Option<FileCompileResult>>,
    design: &ResolvedDesign<'_>,
) -> CompileReport {
    let file_count = results.len();
    let ordered: Vec<FileCompileResult> = design
        .compile_order()
        .iter()
        .filter_map(|&f| results[f.index()].clone())
        .collect();
    CompileReport::new(ordered, file_count)
}

fn effective_workers(configured: usize) -> usize {
    if configured > 0 {
        configured
    } else {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }
}
