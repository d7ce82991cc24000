//! Report formatting and printing.
//!
//! Kept apart from the engine so the library can be used without a terminal.

use std::io::{self, Write};

use colored::Colorize;

use super::commands::{CommandResult, CommandSummary, InitSummary};
use crate::config::CONFIG_FILE_NAME;
use crate::core::{ExtractionReport, KeyOrigin, LocaleOutcome, LocaleReport};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

pub fn print(result: &CommandResult, verbose: bool) {
    match &result.summary {
        CommandSummary::Extract(report) => {
            print_extraction_to(report, verbose, &mut io::stdout().lock());
        }
        CommandSummary::Init(summary) => print_init(summary),
    }
}

fn print_init(summary: &InitSummary) {
    if let Some(error) = &summary.error {
        eprintln!("{} {}", "error:".bold().red(), error);
    } else if summary.created {
        println!(
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    }
}

pub fn print_extraction_to<W: Write>(report: &ExtractionReport, verbose: bool, writer: &mut W) {
    let _ = writeln!(
        writer,
        "Extracted {} message(s) from {} template(s): {} reused, {} new",
        report.message_count(),
        report.templates.len(),
        report.count_origin(KeyOrigin::Reused),
        report.count_origin(KeyOrigin::Allocated),
    );
    let _ = writeln!(
        writer,
        "Scanned {} source file(s), {} key(s) referenced directly",
        report.source_file_count, report.referenced_key_count
    );

    if verbose {
        for template in &report.templates {
            let _ = writeln!(
                writer,
                "  {} {} ({} message(s))",
                template.relative_path,
                template.namespace.as_str().dimmed(),
                template.messages.len()
            );
        }
    }

    for outcome in &report.locales {
        match &outcome.result {
            Ok(locale_report) => print_locale(outcome, locale_report, report.apply, verbose, writer),
            Err(err) => {
                let _ = writeln!(
                    writer,
                    "{} {} {}",
                    FAILURE_MARK.red(),
                    outcome.locale.bold(),
                    outcome.bundle_path.display()
                );
                let _ = writeln!(writer, "  {} {:#}", "error:".bold().red(), err);
            }
        }
    }

    let failed = report.failed_locales().count();
    if failed > 0 {
        let _ = writeln!(
            writer,
            "{} {} locale(s) failed; their bundles were left untouched",
            FAILURE_MARK.red(),
            failed
        );
    }

    let pending = report
        .locales
        .iter()
        .filter(|l| l.result.as_ref().is_ok_and(|r| r.changed))
        .count();
    if !report.apply && pending > 0 {
        let _ = writeln!(
            writer,
            "Run with {} to write {} bundle(s).",
            "--apply".cyan(),
            pending
        );
    }
}

fn print_locale<W: Write>(
    outcome: &LocaleOutcome,
    locale_report: &LocaleReport,
    apply: bool,
    verbose: bool,
    writer: &mut W,
) {
    let status = if locale_report.written {
        "written".green()
    } else if !locale_report.changed {
        "unchanged".dimmed()
    } else if apply {
        "not written".yellow()
    } else {
        "would update".yellow()
    };

    let _ = writeln!(
        writer,
        "{} {} {} {} record(s): {} added, {} kept, {} removed ({})",
        SUCCESS_MARK.green(),
        outcome.locale.bold(),
        outcome.bundle_path.display(),
        locale_report.total,
        locale_report.added.len(),
        locale_report.total.saturating_sub(locale_report.added.len()),
        locale_report.removed.len(),
        status
    );

    if verbose {
        for key in &locale_report.added {
            let _ = writeln!(writer, "  {} {}", "+".green(), key);
        }
    }

    for entry in &locale_report.removed {
        let _ = writeln!(writer, "  {} {} \"{}\"", "-".red(), entry.key, entry.text);
    }
}
