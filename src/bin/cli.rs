//! Shelf Import CLI
//!
//! Runs one catalog import from the command line and writes the records as
//! JSON lines.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use shelf_import::{
    error::{AppError, Result},
    importer::{Importer, ImporterInputs},
    models::{BookRecord, CatalogKind, Config},
    sources::RecordSink,
    utils::http::HttpTransport,
};

const PENGUIN_BEARER_ENV: &str = "PENGUIN_BEARER";
const AMAZON_BEARER_ENV: &str = "AMAZON_BEARER";

/// shelf-import - Author bibliography importer
#[derive(Parser, Debug)]
#[command(
    name = "shelf-import",
    version,
    about = "Import an author's bibliography from external catalogs"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import records from one catalog
    Import {
        /// Catalog to import from (google, open_library, penguin, amazon)
        source: CatalogKind,

        /// Author name used by keyword searches
        #[arg(short, long, default_value = "")]
        author: String,

        /// Catalog author key; repeat for several
        #[arg(short, long = "key")]
        keys: Vec<String>,

        /// Write records here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,

    /// Show which catalogs can be imported with the given inputs
    Sources {
        #[arg(short, long, default_value = "")]
        author: String,

        /// Open Library author key; repeat for several
        #[arg(long = "open-library-key")]
        open_library_keys: Vec<String>,

        /// Penguin Random House author id; repeat for several
        #[arg(long = "penguin-key")]
        penguin_keys: Vec<String>,
    },
}

/// Writes each record as one JSON line.
struct JsonLinesSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonLinesSink {
    fn new(output: Option<&PathBuf>) -> Result<Self> {
        let writer: Box<dyn Write + Send> = match output {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(BufWriter::new(io::stdout())),
        };
        Ok(Self {
            writer: Mutex::new(writer),
        })
    }

    fn flush(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| AppError::config("Output writer poisoned"))?;
        writer.flush()?;
        Ok(())
    }
}

impl RecordSink for JsonLinesSink {
    fn emit(&self, record: BookRecord) {
        let Ok(mut writer) = self.writer.lock() else {
            log::error!("Output writer poisoned, dropping record {}", record.id);
            return;
        };
        let written = serde_json::to_writer(&mut *writer, &record)
            .map_err(AppError::from)
            .and_then(|_| writer.write_all(b"\n").map_err(AppError::from));
        if let Err(e) = written {
            log::error!("Failed to write record {}: {}", record.id, e);
        }
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Environment credentials take precedence over the file.
fn apply_env_credentials(config: &mut Config) {
    if let Ok(token) = std::env::var(PENGUIN_BEARER_ENV) {
        config.penguin.bearer = Some(token);
    }
    if let Ok(token) = std::env::var(AMAZON_BEARER_ENV) {
        config.amazon.bearer = Some(token);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    apply_env_credentials(&mut config);

    match cli.command {
        Command::Import {
            source,
            author,
            keys,
            output,
        } => {
            config.validate()?;

            let sink = Arc::new(JsonLinesSink::new(output.as_ref())?);
            let mut inputs = ImporterInputs {
                author_name: author,
                sink: Some(sink.clone()),
                ..ImporterInputs::default()
            };
            match source {
                CatalogKind::OpenLibrary => inputs.open_library_keys = keys,
                CatalogKind::Penguin => inputs.penguin_keys = keys,
                CatalogKind::Google | CatalogKind::Amazon => {
                    if !keys.is_empty() {
                        log::warn!("{} searches by author name, ignoring --key", source);
                    }
                }
            }

            let transport = Arc::new(HttpTransport::new(&config.http)?);
            let importer = Importer::new(&config, transport, inputs);

            let Some(report) = importer.run(source).await else {
                log::warn!(
                    "{} import is disabled for these inputs. Check --author and --key.",
                    source
                );
                return Err(AppError::validation(format!(
                    "{} import preconditions not met",
                    source
                )));
            };
            sink.flush()?;

            let elapsed = report.finished_at - report.started_at;
            log::info!(
                "{}: {} records from {} pages in {}ms",
                report.source,
                report.records_emitted,
                report.pages_fetched,
                elapsed.num_milliseconds()
            );
            if let Some(failure) = report.failure {
                return Err(AppError::fetch(report.source.as_str(), failure));
            }
            if let Some(path) = output {
                log::info!("Records saved to {}", path.display());
            }
        }

        Command::Validate => {
            log::info!("Validating {}...", cli.config.display());

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            for (kind, bearer) in [
                (CatalogKind::Penguin, &config.penguin.bearer),
                (CatalogKind::Amazon, &config.amazon.bearer),
            ] {
                if bearer.is_none() {
                    log::warn!("No bearer credential configured for {}", kind);
                }
            }
            log::info!("Config OK");
        }

        Command::Sources {
            author,
            open_library_keys,
            penguin_keys,
        } => {
            let sink: Arc<dyn RecordSink> = Arc::new(|_record: BookRecord| {});
            let transport = Arc::new(HttpTransport::new(&config.http)?);
            let importer = Importer::new(
                &config,
                transport,
                ImporterInputs {
                    author_name: author,
                    sink: Some(sink),
                    open_library_keys,
                    penguin_keys,
                    actions: None,
                },
            );

            for kind in CatalogKind::ALL {
                let status = if importer.is_disabled(kind) {
                    "disabled"
                } else {
                    "ready"
                };
                println!("{:<14}{}", kind.as_str(), status);
            }
        }
    }

    Ok(())
}
