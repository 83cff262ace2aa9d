// src/bin/het.rs

//! Driver program _het_ for the _hs_err triage_ library.
//!
//! Reads one JVM fatal error log (`hs_err_pid*.log`), assembles the
//! crash model, runs analysis, and prints the triage report to stdout
//! or to a file.

#![allow(non_camel_case_types)]

use std::fs::File;
use std::process::ExitCode;

use ::anyhow::Context;
use ::clap::{Parser, ValueEnum};
use ::const_format::concatcp;
use ::si_trace_print::{defn, defo, defx};
use ::termcolor::{ColorChoice, NoColor, StandardStream};

use ::hetlib::analysis::{run_analysis, Finding};
use ::hetlib::common::FPath;
use ::hetlib::data::model::CrashModel;
use ::hetlib::printer::report::write_report;
use ::hetlib::readers::crashreader::{CrashReader, ReadSummary};

/// CLI enum that maps to [`termcolor::ColorChoice`].
///
/// [`termcolor::ColorChoice`]: https://docs.rs/termcolor/1.1.3/termcolor/enum.ColorChoice.html
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, ValueEnum)]
enum CLI_Color_Choice {
    always,
    auto,
    never,
}

// * the `about` is taken from `Cargo.toml:[package]:description`.
#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    name = "het",
    // write expanded information for the `--version` output
    version = concatcp!(
        "(hs_err triage)\n",
        "Version: ",
        env!("CARGO_PKG_VERSION_MAJOR"), ".",
        env!("CARGO_PKG_VERSION_MINOR"), ".",
        env!("CARGO_PKG_VERSION_PATCH"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "Author: ", env!("CARGO_PKG_AUTHORS"),
    ),
    verbatim_doc_comment
)]
struct CLI_Args {
    /// Path of a JVM fatal error log, e.g. hs_err_pid1234.log.
    #[clap(required = true)]
    path: String,

    /// Write the report to this file instead of stdout.
    /// The file is created or truncated. Color is never used.
    #[clap(short = 'o', long, verbatim_doc_comment)]
    report: Option<String>,

    /// Choose to print to terminal using colors.
    #[clap(
        short = 'c',
        long = "color",
        verbatim_doc_comment,
        value_enum,
        default_value_t = CLI_Color_Choice::auto
    )]
    color_choice: CLI_Color_Choice,

    /// After the report, print a summary of lines read and events
    /// recognized.
    #[clap(short, long, verbatim_doc_comment)]
    summary: bool,
}

fn process(args: &CLI_Args) -> ::anyhow::Result<()> {
    defn!("({:?})", args.path);
    let path: FPath = args.path.clone();
    let mut reader: CrashReader = CrashReader::new(path);
    let model: CrashModel = reader
        .process()
        .with_context(|| format!("Failed to read {:?}", args.path))?;
    let findings: Vec<Finding> = run_analysis(&model);
    defo!("{} findings", findings.len());

    match args.report.as_deref() {
        Some(report_path) => {
            let file: File = File::create(report_path)
                .with_context(|| format!("Failed to create {:?}", report_path))?;
            let mut out: NoColor<File> = NoColor::new(file);
            write_report(&mut out, &model, &findings)
                .with_context(|| format!("Failed to write {:?}", report_path))?;
        }
        None => {
            // map `CLI_Color_Choice` to `ColorChoice`
            let color_choice: ColorChoice = match args.color_choice {
                CLI_Color_Choice::always => ColorChoice::Always,
                CLI_Color_Choice::auto => {
                    if atty_stdout() {
                        ColorChoice::Auto
                    } else {
                        ColorChoice::Never
                    }
                }
                CLI_Color_Choice::never => ColorChoice::Never,
            };
            let mut out: StandardStream = StandardStream::stdout(color_choice);
            write_report(&mut out, &model, &findings).context("Failed to write report")?;
        }
    }

    if args.summary {
        let summary: ReadSummary = reader.summary();
        eprintln!();
        eprintln!("Lines read        : {}", summary.lines_read);
        eprintln!("Events recognized : {}", summary.events_recognized);
        eprintln!("Unidentified lines: {}", summary.lines_unidentified);
        eprintln!("Duplicate events  : {}", model.duplicate_singleton_events);
    }
    defx!();
    Ok(())
}

/// Is stdout a terminal?
fn atty_stdout() -> bool {
    use std::io::IsTerminal;

    std::io::stdout().is_terminal()
}

pub fn main() -> ExitCode {
    let args: CLI_Args = CLI_Args::parse();
    match process(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
