// ==========================================
// NCIP Registry Import - command line entry
// ==========================================
// Usage: ncip-import <FILE> --owner <ID> [--mode append|replace|new-partition]
//        [--partition NAME] [--ongoing] [--db PATH]
// ==========================================

use anyhow::Context;
use clap::{Parser, ValueEnum};
use ncip_import::api::{ApiError, ImportApi};
use ncip_import::engine::ReconcileOptions;
use ncip_import::{db, logging, ImportMode};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Update records with a known survey/control number, create the rest
    Append,
    /// Delete the owner's records, then create every incoming record
    Replace,
    /// Write into a new named partition
    NewPartition,
}

impl From<ModeArg> for ImportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Append => ImportMode::Append,
            ModeArg::Replace => ImportMode::Replace,
            ModeArg::NewPartition => ImportMode::NewPartition,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "ncip-import",
    version,
    about = "Import NCIP registry spreadsheets (Excel/CSV) into the record store"
)]
struct Cli {
    /// Spreadsheet to import (.xlsx, .xls, .xlsm, .ods or .csv)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Owner the imported records belong to
    #[arg(long, value_name = "ID")]
    owner: String,

    #[arg(long, value_enum, default_value = "append")]
    mode: ModeArg,

    /// Partition label for new-partition runs (generated when omitted)
    #[arg(long, value_name = "NAME")]
    partition: Option<String>,

    /// Tag every imported record as part of the ongoing working set
    #[arg(long)]
    ongoing: bool,

    /// Database file (default: platform data dir, or NCIP_IMPORT_DB_PATH)
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(message) => {
            println!("{}", message);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<String> {
    let db_path = match &cli.db {
        Some(path) => path.to_string_lossy().to_string(),
        None => db::default_db_path(),
    };
    tracing::info!(db_path = %db_path, version = ncip_import::VERSION, "{}", ncip_import::APP_NAME);

    let api = ImportApi::open(&db_path)
        .await
        .with_context(|| format!("cannot open database {}", db_path))?;

    let options = ReconcileOptions {
        owner_id: cli.owner,
        partition_name: cli.partition,
        mark_ongoing: cli.ongoing,
        ..Default::default()
    };

    let mut last_reported = 0u8;
    let mut progress = |pct: u8| {
        if pct >= last_reported.saturating_add(10) || pct == 100 {
            tracing::info!(progress = pct, "import progress");
            last_reported = pct;
        }
    };

    match api
        .import_file(&cli.file, cli.mode.into(), &options, &mut progress)
        .await
    {
        Ok(response) => {
            for sheet in &response.sheets {
                tracing::info!(
                    sheet = %sheet.sheet_name,
                    records = sheet.records,
                    skipped_rows = sheet.skipped_rows,
                    "sheet normalized"
                );
            }
            Ok(response.run.message)
        }
        // the summary message is the whole story for a failed run
        Err(ApiError::ImportFailed { message, .. }) => Err(anyhow::anyhow!(message)),
        Err(err) => Err(err).with_context(|| format!("cannot import {}", cli.file.display())),
    }
}
