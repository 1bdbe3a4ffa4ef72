//! Processing strategies for turning a dump into relation records.
//!
//! - Sequential (baseline)
//! - Batch-parallel (scoped threads over batches of pages)
//! - Channel-pipeline (reader thread, worker threads, writer on the caller's thread)
//!
//! Every strategy writes records in page order, so their output is identical.

use clap::ValueEnum;
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::io::{BufRead, BufWriter, Write};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::dump::{parse_page, scan_pages};
use crate::error::Result;
use crate::extract::{extract_relations, RelationRecord};
use crate::languages::LanguageTable;
use crate::output::{write_record, OutputFormat, Stats};

/// Processing strategy for a dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Sequential processing (baseline)
    Sequential,
    /// Batch-parallel processing with scoped threads
    BatchParallel,
    /// Channel-based pipeline processing
    ChannelPipeline,
}

/// Configuration for parallel processing
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of threads to use
    pub num_threads: usize,
    /// Batch size for batch-parallel processing
    pub batch_size: usize,
    /// Channel buffer size for pipeline processing
    pub channel_buffer: usize,
    /// Number of worker threads for pipeline
    pub num_workers: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        let cpus = thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4);
        Self {
            num_threads: cpus,
            batch_size: 1000,
            channel_buffer: 10000,
            num_workers: cpus.saturating_sub(1).max(1),
        }
    }
}

impl ParallelConfig {
    /// Use `threads` threads, or auto-detect when zero.
    pub fn with_threads(threads: usize) -> Self {
        let mut config = Self::default();
        if threads > 0 {
            config.num_threads = threads;
            config.num_workers = threads.saturating_sub(1).max(1);
        }
        config
    }
}

/// What to write and how much input to read.
#[derive(Debug, Clone, Default)]
pub struct ExtractConfig {
    pub format: OutputFormat,
    /// Stop after this many pages
    pub page_limit: Option<usize>,
}

/// Relations found on one page
#[derive(Debug)]
pub struct ProcessedPage {
    pub page_id: usize,
    pub records: Vec<RelationRecord>,
}

/// Parse one page block and extract its relations. Pages without a title or
/// text produce an empty result so page ids stay contiguous.
pub fn process_page(page_xml: &str, page_id: usize, languages: &LanguageTable) -> ProcessedPage {
    let records = match parse_page(page_xml, page_id) {
        Some(raw) => extract_relations(&raw.title, &raw.text, languages),
        None => Vec::new(),
    };
    ProcessedPage { page_id, records }
}

/// Run `strategy` over `reader`, writing records to `writer`.
pub fn run<W: Write + Send + 'static>(
    strategy: Strategy,
    reader: Box<dyn BufRead + Send>,
    writer: W,
    languages: Arc<LanguageTable>,
    parallel: &ParallelConfig,
    config: &ExtractConfig,
    progress: &ProgressBar,
) -> Result<Stats> {
    match strategy {
        Strategy::Sequential => {
            let mut writer = BufWriter::with_capacity(256 * 1024, writer);
            process_sequential(reader, &mut writer, &languages, config, progress)
        }
        Strategy::BatchParallel => {
            let mut writer = BufWriter::with_capacity(256 * 1024, writer);
            process_batch_parallel(reader, &mut writer, &languages, parallel, config, progress)
        }
        Strategy::ChannelPipeline => process_channel_pipeline(reader, writer, languages, parallel, config, progress),
    }
}

/// Scan pages, numbering them and honouring the page limit.
fn scan_numbered(
    reader: impl BufRead,
    page_limit: Option<usize>,
    mut callback: impl FnMut(usize, String) -> bool,
) -> std::io::Result<usize> {
    let mut page_id = 0;
    scan_pages(reader, |page_xml| {
        if page_limit.is_some_and(|limit| page_id >= limit) {
            return false;
        }
        let keep_going = callback(page_id, page_xml);
        page_id += 1;
        keep_going
    })?;
    Ok(page_id)
}

/// Write one processed page and update stats.
fn write_page<W: Write>(
    result: ProcessedPage,
    stats: &mut Stats,
    writer: &mut W,
    format: OutputFormat,
    progress: &ProgressBar,
    start_time: Instant,
) -> Result<()> {
    stats.pages_processed += 1;
    if !result.records.is_empty() {
        stats.pages_with_relations += 1;
    }

    for record in &result.records {
        write_record(writer, record, format)?;
        stats.records_written += 1;
    }

    if stats.pages_processed % 1000 == 0 {
        let rate = stats.pages_processed as f64 / start_time.elapsed().as_secs_f64().max(f64::EPSILON);
        progress.set_message(format!(
            "Pages: {} | Relations: {} | Rate: {:.0} pg/s",
            stats.pages_processed, stats.records_written, rate
        ));
    }
    Ok(())
}

/// Strategy 1: one page at a time on the calling thread
pub fn process_sequential<W: Write>(
    reader: impl BufRead,
    writer: &mut BufWriter<W>,
    languages: &LanguageTable,
    config: &ExtractConfig,
    progress: &ProgressBar,
) -> Result<Stats> {
    let start_time = Instant::now();
    let mut stats = Stats::default();
    let mut write_error = None;

    scan_numbered(reader, config.page_limit, |page_id, page_xml| {
        let result = process_page(&page_xml, page_id, languages);
        match write_page(result, &mut stats, writer, config.format, progress, start_time) {
            Ok(()) => true,
            Err(e) => {
                write_error = Some(e);
                false
            }
        }
    })?;

    if let Some(e) = write_error {
        return Err(e);
    }

    writer.flush()?;
    stats.elapsed = start_time.elapsed();
    Ok(stats)
}

/// Strategy 2: Batch-Parallel Processing
/// Collects pages into batches, then processes each batch across scoped threads
pub fn process_batch_parallel<W: Write>(
    reader: impl BufRead,
    writer: &mut BufWriter<W>,
    languages: &LanguageTable,
    parallel: &ParallelConfig,
    config: &ExtractConfig,
    progress: &ProgressBar,
) -> Result<Stats> {
    let start_time = Instant::now();
    let mut stats = Stats::default();
    let mut batch: Vec<(usize, String)> = Vec::with_capacity(parallel.batch_size);
    let mut write_error = None;

    scan_numbered(reader, config.page_limit, |page_id, page_xml| {
        batch.push((page_id, page_xml));
        if batch.len() < parallel.batch_size {
            return true;
        }

        let results = process_batch_threaded(&batch, languages, parallel.num_threads);
        batch.clear();
        for result in results {
            if let Err(e) = write_page(result, &mut stats, writer, config.format, progress, start_time) {
                write_error = Some(e);
                return false;
            }
        }
        true
    })?;

    if let Some(e) = write_error {
        return Err(e);
    }

    // Process remaining batch
    for result in process_batch_threaded(&batch, languages, parallel.num_threads) {
        write_page(result, &mut stats, writer, config.format, progress, start_time)?;
    }

    writer.flush()?;
    stats.elapsed = start_time.elapsed();
    Ok(stats)
}

/// Process a batch of pages using multiple threads, preserving batch order
fn process_batch_threaded(batch: &[(usize, String)], languages: &LanguageTable, num_threads: usize) -> Vec<ProcessedPage> {
    if batch.is_empty() {
        return vec![];
    }

    let num_threads = num_threads.min(batch.len()).max(1);
    let chunk_size = batch.len().div_ceil(num_threads);

    thread::scope(|scope| {
        let handles: Vec<_> = batch
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|(page_id, xml)| process_page(xml, *page_id, languages))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut results = Vec::with_capacity(batch.len());
        for handle in handles {
            match handle.join() {
                Ok(chunk_results) => results.extend(chunk_results),
                Err(_) => tracing::error!("batch worker panicked; its pages are dropped"),
            }
        }
        results
    })
}

/// Strategy 3: Channel-Pipeline Processing using std::sync::mpsc
/// Producer thread reads XML, worker threads process pages, writer collects results
/// Results are buffered and sorted by page_id to ensure deterministic output order
pub fn process_channel_pipeline<W: Write + Send + 'static>(
    reader: impl BufRead + Send + 'static,
    writer: W,
    languages: Arc<LanguageTable>,
    parallel: &ParallelConfig,
    config: &ExtractConfig,
    progress: &ProgressBar,
) -> Result<Stats> {
    let (page_tx, page_rx): (SyncSender<(usize, String)>, Receiver<(usize, String)>) =
        sync_channel(parallel.channel_buffer);
    let (result_tx, result_rx): (SyncSender<ProcessedPage>, Receiver<ProcessedPage>) =
        sync_channel(parallel.channel_buffer);

    let start_time = Instant::now();

    // Spawn reader thread
    let page_limit = config.page_limit;
    let reader_handle = thread::spawn(move || {
        scan_numbered(reader, page_limit, |page_id, page_xml| page_tx.send((page_id, page_xml)).is_ok())
    });

    // Spawn worker threads
    let page_rx = Arc::new(Mutex::new(page_rx));
    let worker_handles: Vec<JoinHandle<()>> = (0..parallel.num_workers)
        .map(|_| {
            let rx = Arc::clone(&page_rx);
            let tx = result_tx.clone();
            let languages = Arc::clone(&languages);
            thread::spawn(move || process_pages_worker(rx, tx, &languages))
        })
        .collect();

    // Drop extra sender so channel closes when workers finish
    drop(result_tx);

    let mut stats = write_results_sorted(result_rx, writer, config.format, progress, start_time)?;

    for handle in worker_handles {
        handle.join().ok();
    }
    match reader_handle.join() {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => tracing::error!("page reader thread panicked"),
    }

    stats.elapsed = start_time.elapsed();
    Ok(stats)
}

fn process_pages_worker(
    rx: Arc<Mutex<Receiver<(usize, String)>>>,
    tx: SyncSender<ProcessedPage>,
    languages: &LanguageTable,
) {
    loop {
        // Try to get next page from shared receiver
        let item = {
            let lock = rx.lock().ok();
            lock.and_then(|guard| guard.recv().ok())
        };

        match item {
            Some((page_id, xml)) => {
                let result = process_page(&xml, page_id, languages);
                if tx.send(result).is_err() {
                    break;
                }
            }
            None => break,
        }
    }
}

/// Write results in page order using a streaming reorder buffer.
///
/// Results that arrive before their predecessors wait in a BTreeMap; in-order
/// results are written immediately.
fn write_results_sorted<W: Write>(
    rx: Receiver<ProcessedPage>,
    writer: W,
    format: OutputFormat,
    progress: &ProgressBar,
    start_time: Instant,
) -> Result<Stats> {
    let mut writer = BufWriter::with_capacity(256 * 1024, writer);
    let mut stats = Stats::default();

    let mut pending: BTreeMap<usize, ProcessedPage> = BTreeMap::new();
    let mut next_expected: usize = 0;

    for result in rx {
        if result.page_id != next_expected {
            pending.insert(result.page_id, result);
            continue;
        }

        write_page(result, &mut stats, &mut writer, format, progress, start_time)?;
        next_expected += 1;

        while let Some(buffered) = pending.remove(&next_expected) {
            write_page(buffered, &mut stats, &mut writer, format, progress, start_time)?;
            next_expected += 1;
        }
    }

    // Only reachable with gaps, e.g. after a worker panic
    for (_, result) in std::mem::take(&mut pending) {
        write_page(result, &mut stats, &mut writer, format, progress, start_time)?;
    }

    writer.flush()?;
    Ok(stats)
}
