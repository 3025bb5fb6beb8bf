use anyhow::{Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::markdown_writer::write_markdown_output;
use crate::pipeline::translate_segments_parallel;
use crate::providers::Translator;
use crate::providers::ollama::{OllamaTranslator, OllamaTranslatorConfig};
use crate::resume::should_skip_file;
use crate::tei_processor::TeiDocument;
use crate::tei_writer::write_tei_note_output;

// @module: Application controller for batch TEI translation

/// Weight of one file on the overall progress bar
const PROGRESS_TICKS_PER_FILE: u64 = 100;

/// Aggregate counters for one batch run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Files considered
    pub files: usize,
    /// Files completed or skipped as already complete
    pub ok: usize,
    /// Files that errored
    pub failed: usize,
    /// Segments translated across all files
    pub total_segments: usize,
    /// Translation wall time summed across files
    pub total_time: Duration,
}

impl RunSummary {
    /// Overall throughput in segments per second
    pub fn segments_per_second(&self) -> f64 {
        let seconds = self.total_time.as_secs_f64();
        if seconds > 0.0 {
            self.total_segments as f64 / seconds
        } else {
            0.0
        }
    }

    /// The `[summary]` status line
    pub fn status_line(&self) -> String {
        format!(
            "[summary] files={} ok={} failed={} total_segments={} total_time_ms={} seg_per_sec={:.2}",
            self.files,
            self.ok,
            self.failed,
            self.total_segments,
            self.total_time.as_millis(),
            self.segments_per_second()
        )
    }
}

/// Main application controller for TEI translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Run the batch over a file or directory, constructing the engine from
    /// the configuration. Engine construction failure is fatal to the run.
    pub fn run(&self, input_path: &Path, output_path: &Path) -> Result<RunSummary> {
        let translator = OllamaTranslator::new(OllamaTranslatorConfig {
            endpoint: self.config.translation.endpoint.clone(),
            model: self.config.translation.model.clone(),
            max_tokens: self.config.translation.max_tokens,
            temperature: self.config.translation.temperature,
            timeout_secs: self.config.translation.timeout_secs,
        })
        .map_err(|e| anyhow!("Failed to initialize translator: {}", e))?;

        self.run_with_translator(input_path, output_path, &translator)
    }

    /// Run the batch with an already-constructed engine prototype.
    ///
    /// Per-file errors are reported on the status streams and counted, then
    /// processing continues; only setup problems return `Err`.
    pub fn run_with_translator(
        &self,
        input_path: &Path,
        output_path: &Path,
        translator: &dyn Translator,
    ) -> Result<RunSummary> {
        let input_is_dir = input_path.is_dir();
        let input_files = self.collect_input_files(input_path, output_path)?;

        let output_is_single_xml_file = !input_is_dir && output_path_looks_like_xml_file(output_path);
        if input_is_dir && output_path_looks_like_xml_file(output_path) {
            return Err(anyhow!("For directory input, the output must be a directory path"));
        }

        if output_is_single_xml_file {
            if let Some(parent) = output_path.parent() {
                FileManager::ensure_dir(parent)?;
            }
        } else {
            FileManager::ensure_dir(output_path)?;
        }

        info!(
            "Translating {} file(s) with {} worker(s)",
            input_files.len(),
            self.config.processing.effective_workers()
        );

        let progress_bar = self.create_progress_bar(input_files.len() as u64);

        let mut summary = RunSummary {
            files: input_files.len(),
            ..Default::default()
        };

        for (file_idx, xml_file) in input_files.iter().enumerate() {
            let completed_ticks = file_idx as u64 * PROGRESS_TICKS_PER_FILE;
            if let Some(pb) = &progress_bar {
                pb.set_position(completed_ticks);
                pb.set_message(display_name(xml_file));
            }

            let mut doc = match TeiDocument::from_file(xml_file) {
                Ok(doc) => doc,
                Err(e) => {
                    eprintln!("[skip] {}", e);
                    summary.failed += 1;
                    continue;
                }
            };

            let (tei_path, out_parent) = if output_is_single_xml_file {
                let parent = output_path.parent().unwrap_or(Path::new(".")).to_path_buf();
                (output_path.to_path_buf(), parent)
            } else {
                let rel_path = output_relative_for(input_path, input_is_dir, xml_file);
                let out_parent = match rel_path.parent() {
                    Some(parent) if parent != Path::new("") => output_path.join(parent),
                    _ => output_path.to_path_buf(),
                };
                (output_path.join(&rel_path), out_parent)
            };

            match should_skip_file(
                xml_file,
                &tei_path,
                doc.segments.len(),
                self.config.processing.resume,
            ) {
                Ok(decision) if decision.skip => {
                    summary.ok += 1;
                    if let Some(pb) = &progress_bar {
                        pb.set_position(completed_ticks + PROGRESS_TICKS_PER_FILE);
                    }
                    println!("[skip] {} {}", display_name(xml_file), decision.reason);
                    continue;
                }
                Ok(decision) => {
                    debug!("Processing {:?}: {}", xml_file, decision.reason);
                }
                Err(e) => {
                    eprintln!("[error] resume check failed for {:?}: {:#}", xml_file, e);
                    summary.failed += 1;
                    continue;
                }
            }

            let pb_for_callback = progress_bar.clone();
            let progress_callback = move |done: usize, total: usize| {
                if let Some(pb) = &pb_for_callback {
                    let fraction = done as u64 * PROGRESS_TICKS_PER_FILE / total.max(1) as u64;
                    pb.set_position(completed_ticks + fraction.min(PROGRESS_TICKS_PER_FILE));
                }
            };

            let (translations, stats) = match translate_segments_parallel(
                &doc.segments,
                translator,
                self.config.processing.effective_workers(),
                Some(&progress_callback),
            ) {
                Ok(outcome) => outcome,
                Err(e) => {
                    eprintln!("[error] translation failed for {:?}: {}", xml_file, e);
                    summary.failed += 1;
                    continue;
                }
            };

            if let Err(e) = FileManager::ensure_dir(&out_parent) {
                eprintln!("[error] cannot create output directory for {:?}: {}", xml_file, e);
                summary.failed += 1;
                continue;
            }

            if self.config.processing.emit_markdown {
                let md_path = markdown_path_for(&tei_path);
                if let Err(e) =
                    write_markdown_output(&md_path, &doc, &translations, &self.config.source_language)
                {
                    eprintln!("[error] markdown write failed for {:?}: {}", xml_file, e);
                    summary.failed += 1;
                    continue;
                }
            }

            if let Err(e) = write_tei_note_output(
                &tei_path,
                &mut doc,
                &translations,
                self.config.processing.overwrite_existing_translations,
            ) {
                eprintln!("[error] TEI write failed for {:?}: {}", xml_file, e);
                summary.failed += 1;
                continue;
            }

            summary.total_segments += stats.segments_total;
            summary.total_time += stats.wall_time;
            summary.ok += 1;

            if let Some(pb) = &progress_bar {
                pb.set_position(completed_ticks + PROGRESS_TICKS_PER_FILE);
            }

            println!(
                "[ok] {} segments={} workers={} time_ms={} ms_per_segment={:.2} seg_per_sec={:.2}",
                display_name(xml_file),
                stats.segments_total,
                stats.workers_used,
                stats.wall_time.as_millis(),
                stats.ms_per_segment,
                stats.segments_per_second
            );
        }

        if let Some(pb) = &progress_bar {
            pb.finish_and_clear();
        }

        println!("{}", summary.status_line());

        Ok(summary)
    }

    /// Resolve the input into a sorted list of XML files
    fn collect_input_files(&self, input_path: &Path, output_path: &Path) -> Result<Vec<PathBuf>> {
        if !input_path.exists() {
            return Err(anyhow!("Input path does not exist: {:?}", input_path));
        }

        if input_path.is_file() {
            if !FileManager::has_xml_extension(input_path) {
                return Err(anyhow!("Input file is not XML: {:?}", input_path));
            }
            return Ok(vec![input_path.to_path_buf()]);
        }

        if !input_path.is_dir() {
            return Err(anyhow!("Input path is neither file nor directory: {:?}", input_path));
        }

        let files = FileManager::find_xml_files(input_path, Some(output_path))?;
        if files.is_empty() {
            return Err(anyhow!("No XML files found under: {:?}", input_path));
        }

        Ok(files)
    }

    fn create_progress_bar(&self, total_files: u64) -> Option<ProgressBar> {
        if !self.config.processing.show_progress || total_files == 0 {
            return None;
        }

        let pb = ProgressBar::new(total_files * PROGRESS_TICKS_PER_FILE);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style.progress_chars("=> "));
        Some(pb)
    }
}

/// True when the path should be treated as a single XML output file
fn output_path_looks_like_xml_file(path: &Path) -> bool {
    if path.as_os_str().is_empty() {
        return false;
    }
    if path.exists() {
        return path.is_file();
    }
    FileManager::has_xml_extension(path)
}

/// Output path of a file relative to the input root
fn output_relative_for(input_root: &Path, root_is_dir: bool, xml_file: &Path) -> PathBuf {
    if root_is_dir {
        if let Ok(rel) = xml_file.strip_prefix(input_root) {
            return rel.to_path_buf();
        }
    }
    PathBuf::from(xml_file.file_name().unwrap_or_default())
}

/// Sidecar Markdown path next to a TEI output file
fn markdown_path_for(tei_path: &Path) -> PathBuf {
    tei_path.with_extension("en.md")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
