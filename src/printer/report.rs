// src/printer/report.rs

//! Render the triage report: a fixed sequence of banner-delimited
//! sections written to any [`WriteColor`] sink.
//!
//! Section order is fixed and every banner always prints, so reports
//! from different logs diff cleanly against each other. Values the log
//! did not provide print as `(unknown)` rather than being omitted.
//!
//! [`WriteColor`]: termcolor::WriteColor

use ::si_trace_print::{defn, defx};
use ::termcolor::{Color, ColorSpec, WriteColor};

use crate::analysis::{Finding, Severity};
use crate::data::model::CrashModel;
use crate::data::size::{bytes_to_display, percent_of};

/// Stack frames shown before eliding the rest.
pub const STACK_FRAMES_SHOWN_MAX: usize = 10;

/// Marker printed when stack frames were elided.
pub const STACK_ELLIPSIS: &str = "...";

const BANNER_RULE: &str =
    "────────────────────────────────────────────────────────────";

const UNKNOWN: &str = "(unknown)";

/// Section banners, in print order.
const SECTION_HOST: &str = "HOST";
const SECTION_CONTAINER: &str = "CONTAINER";
const SECTION_JVM: &str = "JVM";
const SECTION_APPLICATION: &str = "APPLICATION";
const SECTION_THREADS: &str = "THREADS";
const SECTION_ERRORS: &str = "ERRORS";
const SECTION_STACK: &str = "STACK";
const SECTION_ANALYSIS: &str = "ANALYSIS";
const SECTION_UNIDENTIFIED: &str = "UNIDENTIFIED LOG LINES";

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        Severity::Info => Color::Cyan,
    }
}

fn write_banner(
    out: &mut dyn WriteColor,
    title: &str,
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", BANNER_RULE)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", BANNER_RULE)
}

fn write_field(
    out: &mut dyn WriteColor,
    label: &str,
    value: Option<&str>,
) -> std::io::Result<()> {
    writeln!(out, "{:<18} {}", label, value.unwrap_or(UNKNOWN))
}

/// `"410M of 512M (80%)"`, the percentage rounded half to even.
fn usage_display(
    used: u64,
    total: u64,
) -> String {
    match percent_of(used, total) {
        Some(percent) => format!(
            "{} of {} ({}%)",
            bytes_to_display(used),
            bytes_to_display(total),
            percent
        ),
        None => format!("{} of {}", bytes_to_display(used), bytes_to_display(total)),
    }
}

/// Write the whole report.
pub fn write_report(
    out: &mut dyn WriteColor,
    model: &CrashModel,
    findings: &[Finding],
) -> std::io::Result<()> {
    defn!();
    write_host(out, model)?;
    write_container(out, model)?;
    write_jvm(out, model)?;
    write_application(out, model)?;
    write_threads(out, model)?;
    write_errors(out, model)?;
    write_stack(out, model)?;
    write_analysis(out, findings)?;
    write_unidentified(out, model)?;
    out.flush()?;
    defx!();
    Ok(())
}

fn write_host(
    out: &mut dyn WriteColor,
    model: &CrashModel,
) -> std::io::Result<()> {
    write_banner(out, SECTION_HOST)?;
    write_field(out, "host:", model.host.as_deref())?;
    write_field(out, "os:", model.os.as_deref())?;
    write_field(out, "uname:", model.uname.as_deref())?;
    write_field(out, "uptime:", model.os_uptime.as_deref())?;
    match model.cpu_count {
        Some(total) => write_field(out, "cpus:", Some(total.to_string().as_str()))?,
        None => write_field(out, "cpus:", None)?,
    }
    match model.memory.as_ref() {
        Some(memory) => {
            let used: u64 = memory.physical_bytes.saturating_sub(memory.physical_free_bytes);
            write_field(
                out,
                "physical memory:",
                Some(usage_display(used, memory.physical_bytes).as_str()),
            )?;
            match (memory.swap_bytes, memory.swap_free_bytes) {
                (Some(swap), Some(free)) if swap > 0 => {
                    write_field(
                        out,
                        "swap:",
                        Some(usage_display(swap.saturating_sub(free), swap).as_str()),
                    )?;
                }
                (Some(0), _) => write_field(out, "swap:", Some("disabled"))?,
                _ => write_field(out, "swap:", None)?,
            }
        }
        None => {
            write_field(out, "physical memory:", None)?;
            write_field(out, "swap:", None)?;
        }
    }
    Ok(())
}

fn write_container(
    out: &mut dyn WriteColor,
    model: &CrashModel,
) -> std::io::Result<()> {
    write_banner(out, SECTION_CONTAINER)?;
    if model.container_info.is_empty() {
        writeln!(out, "(no container information)")?;
        return Ok(());
    }
    for (key, value) in model.container_info.iter() {
        write_field(out, format!("{}:", key).as_str(), Some(value.as_str()))?;
    }
    if model.container_memory_constrained() {
        if let Some(limit) = model.container_memory_limit_bytes() {
            write_field(
                out,
                "memory limit:",
                Some(format!("{} (below host physical memory)", bytes_to_display(limit)).as_str()),
            )?;
        }
    }
    Ok(())
}

fn write_jvm(
    out: &mut dyn WriteColor,
    model: &CrashModel,
) -> std::io::Result<()> {
    write_banner(out, SECTION_JVM)?;
    write_field(out, "version:", model.jdk_release())?;
    let build_date: Option<String> = model
        .vm_info
        .as_ref()
        .and_then(|vi| vi.build_date)
        .map(|dt| dt.format("%b %-d %Y %H:%M:%S").to_string());
    write_field(out, "built:", build_date.as_deref())?;
    write_field(out, "vendor:", Some(format!("{:?}", model.java_vendor()).as_str()))?;
    write_field(out, "install:", Some(format!("{:?}", model.jdk_install_type()).as_str()))?;
    write_field(out, "rpm directory:", model.jvm_rpm_directory().as_deref())?;
    write_field(out, "jvm args:", model.jvm_args.as_deref())?;
    let heap_total: u64 = model.heap_total_bytes();
    if heap_total > 0 {
        write_field(
            out,
            "heap:",
            Some(usage_display(model.heap_used_bytes(), heap_total).as_str()),
        )?;
    } else {
        write_field(out, "heap:", None)?;
    }
    match model.metaspace.as_ref() {
        Some(metaspace) => write_field(
            out,
            "metaspace:",
            Some(usage_display(metaspace.used_bytes, metaspace.committed_bytes).as_str()),
        )?,
        None => write_field(out, "metaspace:", None)?,
    }
    Ok(())
}

fn write_application(
    out: &mut dyn WriteColor,
    model: &CrashModel,
) -> std::io::Result<()> {
    write_banner(out, SECTION_APPLICATION)?;
    write_field(out, "java command:", model.java_command.as_deref())?;
    for (name, value) in model.environment_variables.iter() {
        write_field(out, format!("{}:", name).as_str(), Some(value.as_str()))?;
    }
    Ok(())
}

fn write_threads(
    out: &mut dyn WriteColor,
    model: &CrashModel,
) -> std::io::Result<()> {
    write_banner(out, SECTION_THREADS)?;
    write_field(out, "crashed thread:", model.current_thread.as_deref())?;
    write_field(out, "threads listed:", Some(model.threads.len().to_string().as_str()))?;
    for (label, count) in model.exception_counts.iter() {
        write_field(out, format!("{}:", label).as_str(), Some(count.to_string().as_str()))?;
    }
    Ok(())
}

fn write_errors(
    out: &mut dyn WriteColor,
    model: &CrashModel,
) -> std::io::Result<()> {
    write_banner(out, SECTION_ERRORS)?;
    write_field(out, "error:", model.error_summary())?;
    let siginfo_display: Option<String> = model.siginfo.as_ref().map(|si| {
        format!("{} ({}) code {}", si.signal_name, si.signal_number, si.code_name)
    });
    write_field(out, "siginfo:", siginfo_display.as_deref())?;
    write_field(out, "vm state:", model.vm_state.as_deref())?;
    write_field(out, "vm operation:", model.vm_operation.as_deref())?;
    let crash_time: Option<String> =
        model.crash_time.map(|dt| dt.format("%a %b %-d %H:%M:%S %Y").to_string());
    write_field(out, "time:", crash_time.as_deref())?;
    let elapsed: Option<String> = model.elapsed_seconds.map(|secs| {
        if model.is_startup_crash() {
            format!("{} seconds (startup crash)", secs)
        } else {
            format!("{} seconds", secs)
        }
    });
    write_field(out, "elapsed:", elapsed.as_deref())?;
    Ok(())
}

fn write_stack(
    out: &mut dyn WriteColor,
    model: &CrashModel,
) -> std::io::Result<()> {
    write_banner(out, SECTION_STACK)?;
    if model.stack_frames.is_empty() {
        writeln!(out, "(no stack frames)")?;
        return Ok(());
    }
    for frame in model.stack_frames.iter().take(STACK_FRAMES_SHOWN_MAX) {
        writeln!(out, "{}  {}", frame.frame_type, frame.frame)?;
    }
    if model.stack_frames.len() > STACK_FRAMES_SHOWN_MAX {
        writeln!(out, "{}", STACK_ELLIPSIS)?;
    }
    Ok(())
}

fn write_analysis(
    out: &mut dyn WriteColor,
    findings: &[Finding],
) -> std::io::Result<()> {
    write_banner(out, SECTION_ANALYSIS)?;
    if findings.is_empty() {
        writeln!(out, "(no findings)")?;
        return Ok(());
    }
    for finding in findings.iter() {
        out.set_color(ColorSpec::new().set_fg(Some(severity_color(finding.severity))))?;
        write!(out, "{:<5}", finding.severity.as_str())?;
        out.reset()?;
        writeln!(out, " [{}] {}", finding.code.as_str(), finding.message)?;
    }
    Ok(())
}

fn write_unidentified(
    out: &mut dyn WriteColor,
    model: &CrashModel,
) -> std::io::Result<()> {
    write_banner(out, SECTION_UNIDENTIFIED)?;
    if model.unidentified_log_lines.is_empty() {
        writeln!(out, "(none)")?;
        return Ok(());
    }
    for line in model.unidentified_log_lines.iter() {
        writeln!(out, "{}", line)?;
    }
    if model.unidentified_log_lines_dropped > 0 {
        writeln!(out, "({} more not shown)", model.unidentified_log_lines_dropped)?;
    }
    Ok(())
}
