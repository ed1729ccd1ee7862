//! cfdix - Extract CFDI 4.0 XML invoices into a spreadsheet-ready table.
//!
//! Walks a directory tree of Mexican CFDI invoice documents, labels each
//! invoice with an expense type taken from its folder name, prints a
//! sorted grid and copies a tab-separated payload to the clipboard for
//! pasting into a spreadsheet.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use cfdi_extract::config::{Args, CfdixConfig, Config};
use cfdi_extract::diagnostics::{FileDiagnostics, LOG_FILE_NAME};
use cfdi_extract::record::ParseOutcome;
use cfdi_extract::{collect, output, print_error, print_warning, record};

fn main() -> ExitCode {
    let args = Args::parse();
    let mut diagnostics = match FileDiagnostics::create(Path::new(LOG_FILE_NAME)) {
        Ok(log) => log,
        Err(error) => {
            print_error!("{error:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args, &mut diagnostics) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            diagnostics.note(&format!("Unexpected error: {error:#}"));
            print_error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, diagnostics: &mut FileDiagnostics) -> Result<()> {
    let config = Config::from_args(args)?;

    if config.save {
        CfdixConfig::save_working_directory(&config.input_dir)?;
        println!("Saved default directory to the config file");
    }

    println!(
        "{}",
        format!("Parsing invoices from: {}", config.input_dir.display())
            .bold()
            .magenta()
    );

    let mut records = collect::collect_records(&config.input_dir, diagnostics);
    if records.is_empty() {
        anyhow::bail!("No XML files to parse");
    }
    record::sort_records(&mut records);

    let unparsable = records
        .iter()
        .filter(|record| record.outcome == ParseOutcome::Unparsable)
        .count();
    println!(
        "Found {} invoices from {}",
        records.len(),
        config.input_dir.display()
    );
    if unparsable > 0 {
        print_warning!("{unparsable} files failed to parse, see {LOG_FILE_NAME}");
    }
    if config.verbose {
        for record in &records {
            println!("  {record}");
        }
    }

    println!("{}", output::render_table(&records));

    if !config.print {
        let payload = output::clipboard_payload(&records);
        match output::copy_to_clipboard(&payload) {
            Ok(()) => println!(
                "{}",
                format!("Copied {} rows to clipboard", records.len()).green()
            ),
            Err(error) => {
                diagnostics.note(&format!("Failed to copy to clipboard: {error:#}"));
                print_warning!("Failed to copy to clipboard, see {LOG_FILE_NAME}");
            }
        }
        if config.excel {
            output::write_to_excel(&records, &config.output_path)?;
        }
    }

    Ok(())
}
