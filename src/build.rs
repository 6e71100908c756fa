//! Build the cache directory.

pub mod batch;
pub mod clear;
pub mod handler;
pub mod image;
pub mod input;
pub mod minify_css;
pub mod minify_html;
pub mod minify_js;
pub mod output;
pub mod render_html;

use std::{
    collections::{hash_map::Entry, BTreeMap, HashMap},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use thiserror::Error;
use tracing::{debug, info};

use self::{
    batch::{BatchError, TaskBatch},
    clear::clear_dir,
    handler::{process, Handler, HandlerContext, HandlerError, Processed},
    input::{walk_input, InputFile, RelativePath},
};
use crate::config::Config;

/// List of build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Error while recreating the output directory.
    #[error("failed to clear the output directory {0:?}")]
    Clear(std::path::PathBuf, #[source] std::io::Error),
    /// Error while walking input files.
    #[error("failed to walk input files")]
    Input(#[source] self::input::InputError),
    /// Error while processing a file.
    #[error("failed to process files")]
    Batch(#[source] BatchError<HandlerError>),
    /// Two input files are written to the same output file.
    #[error("`{first}` and `{second}` would both be written to {output_path:?}")]
    OutputConflict {
        /// Output file path, relative to the output directory.
        output_path: PathBuf,
        /// Input file found first.
        first: RelativePath,
        /// Input file found second.
        second: RelativePath,
    },
}

/// Summary of a successful build.
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Processed files, in completion order.
    pub files: Vec<Processed>,

    /// Time spent building.
    pub duration: Duration,
}

impl BuildSummary {
    /// Number of written files.
    pub fn num_files(&self) -> usize {
        self.files.len()
    }

    /// Number of written files per handler.
    pub fn count_by_handler(&self) -> BTreeMap<Handler, usize> {
        let mut counts = BTreeMap::new();
        for file in &self.files {
            *counts.entry(file.handler).or_default() += 1;
        }
        counts
    }
}

/// Build the cache directory with given configuration.
///
/// The output directory is removed and recreated, then every input file is
/// processed and written to the same relative path in the output directory.
/// Files are processed concurrently in batches of `config.batch_size`; a
/// batch must complete before the next one starts. The first error aborts
/// the build, leaving the files written so far. Two input files with the
/// same output path are an error.
pub async fn build(config: &Config) -> Result<BuildSummary, BuildError> {
    debug_assert!(config.input_dir.is_absolute());
    debug_assert!(config.output_dir.is_absolute());

    let start_time = std::time::Instant::now();

    info!("Clearing {:?}", config.output_dir);

    clear_dir(&config.output_dir)
        .await
        .map_err(|error| BuildError::Clear(config.output_dir.clone(), error))?;

    let context = Arc::new(HandlerContext::new(config));
    let mut batch = TaskBatch::new(config.batch_size);
    let mut files = Vec::new();
    let mut output_paths = HashMap::new();

    for input in walk_input(config) {
        let result = input
            .map_err(BuildError::Input)
            .and_then(|input| claim_output_path(&mut output_paths, input));

        let input = match result {
            Ok(input) => input,
            Err(error) => {
                // Let running tasks settle before reporting
                batch.flush().await.map_err(BuildError::Batch)?;
                return Err(error);
            },
        };

        if batch.is_full() {
            debug!("Waiting for a batch of {} files", batch.len());
            files.extend(batch.flush().await.map_err(BuildError::Batch)?);
        }

        batch.push(process(context.clone(), input));
    }

    debug!("Waiting for the last batch of {} files", batch.len());
    files.extend(batch.flush().await.map_err(BuildError::Batch)?);

    let duration = start_time.elapsed();

    Ok(BuildSummary { files, duration })
}

/// Reserve the output path of an input file.
///
/// Fails if another input file has the same output path, such as
/// `photo.png` and `photo.jpg` both transcoded to `photo.webp`.
fn claim_output_path(
    output_paths: &mut HashMap<PathBuf, RelativePath>,
    input: InputFile,
) -> Result<InputFile, BuildError> {
    let output_path = Handler::for_path(&input.relative_path).output_path(&input.relative_path);

    match output_paths.entry(output_path) {
        Entry::Vacant(entry) => {
            entry.insert(input.relative_path.clone());
            Ok(input)
        },
        Entry::Occupied(entry) => Err(BuildError::OutputConflict {
            output_path: entry.key().clone(),
            first: entry.get().clone(),
            second: input.relative_path,
        }),
    }
}
