// src/analysis/mod.rs

//! The analysis engine: a single deterministic pass of independent
//! predicate rules over a sealed [`CrashModel`], producing an ordered
//! list of [`Finding`]s.
//!
//! Rules are pure and evaluated in a fixed order. A rule whose inputs
//! are absent does not fire; absence of data is "not applicable", not
//! an error. The engine itself cannot fail. The unidentified-lines
//! rule is evaluated first and its finding stays at the front of the
//! list so a reader sees the completeness caveat before anything
//! derived from possibly-incomplete data.
//!
//! [`CrashModel`]: crate::data::model::CrashModel

pub mod messages;

use ::chrono::NaiveDateTime;
use ::si_trace_print::{defn, defo, defx};

use crate::catalog::{select_catalog, staleness, Catalog, ReleaseEntry, Staleness};
use crate::data::model::{CrashModel, JavaVendor, JdkInstallType, OsFlavor};
use crate::data::size::bytes_to_display;

/// Days after which a build counts as old even without a catalog.
const OLD_RELEASE_DAYS: i64 = 365;

/// Newest end-of-life RHEL major version.
const RHEL_EOL_MAJOR: u16 = 6;

/// Severity of a finding, derived from the first segment of its code.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    Error,
    Warn,
    Info,
}

impl Severity {
    /// Derive severity from a finding code's leading segment.
    pub fn from_code(code: &str) -> Severity {
        match code.split('.').next() {
            Some("error") => Severity::Error,
            Some("warn") => Severity::Warn,
            _ => Severity::Info,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warn => "WARN",
            Severity::Info => "INFO",
        }
    }
}

/// Closed taxonomy of finding codes. The string form is
/// `severity.category.detail` and keys the message template resource.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FindingCode {
    UnidentifiedLines,
    HeapPlusMetaspaceGtPhysical,
    OomStartupNprocLimit,
    BufferBlobFlushIcache,
    LibzipDeflate,
    DirectByteBufferUnsafe,
    Swapping,
    SwapDisabled,
    SegvMaperr,
    SegvAccerr,
    BusAdrerr,
    BusAdraln,
    JdkNotLatest,
    JdkOldRelease,
    JdkNotLts,
    OsEol,
    RhBuildRpm,
    RhBuildZip,
    RhBuildWindowsZip,
    AdoptOpenJdkPossible,
    VendorUnknown,
}

impl FindingCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FindingCode::UnidentifiedLines => "warn.log.unidentified-lines",
            FindingCode::HeapPlusMetaspaceGtPhysical => {
                "error.memory.heap-plus-metaspace-gt-physical"
            }
            FindingCode::OomStartupNprocLimit => "error.memory.oom-startup-nproc-limit",
            FindingCode::BufferBlobFlushIcache => "error.bug.bufferblob-flush-icache",
            FindingCode::LibzipDeflate => "error.bug.libzip-deflate",
            FindingCode::DirectByteBufferUnsafe => "error.bug.directbytebuffer-unsafe",
            FindingCode::Swapping => "info.memory.swapping",
            FindingCode::SwapDisabled => "info.memory.swap-disabled",
            FindingCode::SegvMaperr => "error.signal.segv-maperr",
            FindingCode::SegvAccerr => "error.signal.segv-accerr",
            FindingCode::BusAdrerr => "error.signal.bus-adrerr",
            FindingCode::BusAdraln => "error.signal.bus-adraln",
            FindingCode::JdkNotLatest => "warn.jdk.not-latest",
            FindingCode::JdkOldRelease => "info.jdk.old-release",
            FindingCode::JdkNotLts => "warn.jdk.not-lts",
            FindingCode::OsEol => "warn.os.eol",
            FindingCode::RhBuildRpm => "info.jdk.rh-build-rpm",
            FindingCode::RhBuildZip => "info.jdk.rh-build-zip",
            FindingCode::RhBuildWindowsZip => "info.jdk.rh-build-windows-zip",
            FindingCode::AdoptOpenJdkPossible => "info.jdk.adoptopenjdk-possible",
            FindingCode::VendorUnknown => "info.jdk.vendor-unknown",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::from_code(self.as_str())
    }
}

/// One analysis result: a code, its derived severity, and the rendered
/// message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Finding {
    pub code: FindingCode,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    fn new(
        code: FindingCode,
        args: &[&str],
    ) -> Finding {
        Finding {
            code,
            severity: code.severity(),
            message: messages::render(code.as_str(), args),
        }
    }
}

/// Run every rule against the sealed model, in fixed order.
pub fn run_analysis(model: &CrashModel) -> Vec<Finding> {
    defn!();
    let mut findings: Vec<Finding> = Vec::new();

    rule_unidentified_lines(model, &mut findings);
    rule_heap_plus_metaspace(model, &mut findings);
    rule_oom_startup_nproc(model, &mut findings);
    rule_known_bugs(model, &mut findings);
    rule_swap(model, &mut findings);
    rule_signal(model, &mut findings);
    rule_jdk_currency(model, &mut findings);
    rule_jdk_lts(model, &mut findings);
    rule_os_eol(model, &mut findings);
    rule_provenance(model, &mut findings);

    defx!("{} findings", findings.len());
    findings
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// rules, in evaluation order
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Always evaluated first; the finding leads the list.
fn rule_unidentified_lines(
    model: &CrashModel,
    findings: &mut Vec<Finding>,
) {
    let total: u64 = model.unidentified_log_lines.len() as u64 + model.unidentified_log_lines_dropped;
    if total == 0 {
        return;
    }
    findings.push(Finding::new(
        FindingCode::UnidentifiedLines,
        &[total.to_string().as_str()],
    ));
}

/// Heap plus committed metaspace exceeding physical memory.
fn rule_heap_plus_metaspace(
    model: &CrashModel,
    findings: &mut Vec<Finding>,
) {
    let physical: u64 = match model.physical_memory_bytes() {
        Some(physical) => physical,
        None => return,
    };
    let heap: u64 = model.heap_total_bytes();
    let metaspace: u64 = model.metaspace_committed_bytes();
    if heap == 0 {
        return;
    }
    let committed: u64 = heap.saturating_add(metaspace);
    if committed > physical {
        defo!("heap+metaspace {} > physical {}", committed, physical);
        findings.push(Finding::new(
            FindingCode::HeapPlusMetaspaceGtPhysical,
            &[
                bytes_to_display(committed).as_str(),
                bytes_to_display(physical).as_str(),
            ],
        ));
    }
}

/// Out of memory within the first minute with the `NPROC` limit at
/// its ceiling. A finite `NPROC` alone is not evidence; the `rlimit:`
/// line prints one on every Linux host. Require the thread count to
/// press against the limit, or a thread-creation failure in the
/// header.
fn rule_oom_startup_nproc(
    model: &CrashModel,
    findings: &mut Vec<Finding>,
) {
    if !model.is_out_of_memory() || !model.is_startup_crash() {
        return;
    }
    let nproc: u64 = match model.rlimit.as_ref().and_then(|r| r.nproc) {
        Some(nproc) => nproc,
        None => return,
    };
    if model.is_thread_creation_failure() || model.thread_count_near(nproc) {
        defo!("nproc {} at ceiling with {} threads", nproc, model.threads.len());
        findings.push(Finding::new(FindingCode::OomStartupNprocLimit, &[]));
    }
}

/// Known problematic native symbols in the frame sequence or header.
fn rule_known_bugs(
    model: &CrashModel,
    findings: &mut Vec<Finding>,
) {
    if model.stack_contains("BufferBlob::flush_icache_stub") {
        findings.push(Finding::new(FindingCode::BufferBlobFlushIcache, &[]));
    }
    if model.stack_contains("Java_java_util_zip_Deflater_deflateBytes")
        || (model.stack_contains("libzip.so") && model.stack_contains("deflate"))
    {
        findings.push(Finding::new(FindingCode::LibzipDeflate, &[]));
    }
    if model.stack_contains("Unsafe_") && model.stack_contains("DirectByteBuffer") {
        findings.push(Finding::new(FindingCode::DirectByteBufferUnsafe, &[]));
    }
}

/// Swap in active use, or swap disabled entirely.
fn rule_swap(
    model: &CrashModel,
    findings: &mut Vec<Finding>,
) {
    let swap: u64 = match model.swap_bytes() {
        Some(swap) => swap,
        None => return,
    };
    if swap == 0 {
        findings.push(Finding::new(FindingCode::SwapDisabled, &[]));
        return;
    }
    let free: u64 = match model.swap_free_bytes() {
        Some(free) => free,
        None => return,
    };
    let used: u64 = swap.saturating_sub(free);
    if used > 0 {
        findings.push(Finding::new(
            FindingCode::Swapping,
            &[bytes_to_display(used).as_str()],
        ));
    }
}

/// Signal number/code combinations mapped to likely causes.
fn rule_signal(
    model: &CrashModel,
    findings: &mut Vec<Finding>,
) {
    let siginfo = match model.siginfo.as_ref() {
        Some(siginfo) => siginfo,
        None => return,
    };
    let code: Option<FindingCode> = match (siginfo.signal_name.as_str(), siginfo.code_name.as_str())
    {
        ("SIGSEGV", "SEGV_MAPERR") => Some(FindingCode::SegvMaperr),
        ("SIGSEGV", "SEGV_ACCERR") => Some(FindingCode::SegvAccerr),
        ("SIGBUS", "BUS_ADRERR") => Some(FindingCode::BusAdrerr),
        ("SIGBUS", "BUS_ADRALN") => Some(FindingCode::BusAdraln),
        _ => None,
    };
    if let Some(code) = code {
        findings.push(Finding::new(code, &[]));
    }
}

/// Version currency against the release catalog, and build age.
fn rule_jdk_currency(
    model: &CrashModel,
    findings: &mut Vec<Finding>,
) {
    // currency catalogs exist only for Red Hat builds
    if model.java_vendor() == JavaVendor::RedHat {
        if let Some((installed, latest)) = catalog_lookup(model) {
            if installed.version != latest.version {
                let mut finding = Finding::new(
                    FindingCode::JdkNotLatest,
                    &[installed.version.as_str(), latest.version.as_str()],
                );
                // magnitude only when both diffs are positive; some
                // catalog dates are estimates
                if let Some(Staleness { ordinal_diff, day_diff }) = staleness(installed, latest) {
                    if ordinal_diff > 0 && day_diff > 0 {
                        let behind: String = messages::render(
                            "warn.jdk.not-latest.behind",
                            &[ordinal_diff.to_string().as_str(), day_diff.to_string().as_str()],
                        );
                        finding.message.push(' ');
                        finding.message.push_str(behind.as_str());
                    }
                }
                findings.push(finding);
            }
        }
    }

    // build age needs no catalog, only the vm_info build date and the
    // crash time from the log itself
    if let (Some(build_date), Some(crash_time)) = (vm_info_build_date(model), model.crash_time) {
        let age_days: i64 =
            crate::data::datetime::days_between(&build_date, &crash_time);
        if age_days > OLD_RELEASE_DAYS {
            findings.push(Finding::new(
                FindingCode::JdkOldRelease,
                &[build_date.format("%b %-d %Y").to_string().as_str()],
            ));
        }
    }
}

/// Non-LTS JDK major version.
fn rule_jdk_lts(
    model: &CrashModel,
    findings: &mut Vec<Finding>,
) {
    if let Some(major) = model.jdk_major_version() {
        if !crate::catalog::is_lts_major(major) {
            findings.push(Finding::new(
                FindingCode::JdkNotLts,
                &[major.to_string().as_str()],
            ));
        }
    }
}

/// End-of-life operating system major version.
fn rule_os_eol(
    model: &CrashModel,
    findings: &mut Vec<Finding>,
) {
    match model.os_flavor() {
        OsFlavor::Rhel | OsFlavor::CentOs | OsFlavor::OracleLinux => {}
        _ => return,
    }
    if let Some(major) = model.os_major_version() {
        if major <= RHEL_EOL_MAJOR {
            let os: &str = model.os.as_deref().unwrap_or("unknown");
            findings.push(Finding::new(FindingCode::OsEol, &[os]));
        }
    }
}

/// Build provenance classification, always producing one finding when
/// any JVM information is present.
fn rule_provenance(
    model: &CrashModel,
    findings: &mut Vec<Finding>,
) {
    if model.vm_info.is_none() && model.dynamic_libraries.is_empty() {
        // no JVM information at all, not even a vendor-unknown claim
        return;
    }
    let detail: String = model
        .jvm_rpm_directory()
        .or_else(|| model.jdk_release().map(str::to_string))
        .unwrap_or_else(|| "unknown build".to_string());
    let code: FindingCode = match model.java_vendor() {
        JavaVendor::RedHat => match model.jdk_install_type() {
            JdkInstallType::Rpm => FindingCode::RhBuildRpm,
            JdkInstallType::WindowsZip => FindingCode::RhBuildWindowsZip,
            _ => FindingCode::RhBuildZip,
        },
        JavaVendor::AdoptOpenJdkPossible => FindingCode::AdoptOpenJdkPossible,
        JavaVendor::Unknown => FindingCode::VendorUnknown,
    };
    match code {
        FindingCode::AdoptOpenJdkPossible | FindingCode::VendorUnknown => {
            findings.push(Finding::new(code, &[]))
        }
        _ => findings.push(Finding::new(code, &[detail.as_str()])),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Select the channel catalog and look up the installed release plus
/// the channel's newest. `None` on any catalog miss.
fn catalog_lookup(model: &CrashModel) -> Option<(&'static ReleaseEntry, &'static ReleaseEntry)> {
    let major: u16 = model.jdk_major_version()?;
    let install: JdkInstallType = model.jdk_install_type();
    let catalog: &'static Catalog = select_catalog(
        major,
        install,
        model.os_flavor(),
        model.os_major_version(),
        model.arch(),
    )?;
    let installed: &ReleaseEntry = match install {
        JdkInstallType::Rpm => {
            let rpmdir: String = model.jvm_rpm_directory()?;
            catalog.lookup(rpmdir.as_str())?
        }
        _ => {
            let release: &str = model.jdk_release()?;
            catalog
                .lookup(release)
                .or_else(|| catalog.lookup_by_version(release))?
        }
    };
    let latest: &ReleaseEntry = catalog.latest()?;
    Some((installed, latest))
}

fn vm_info_build_date(model: &CrashModel) -> Option<NaiveDateTime> {
    model.vm_info.as_ref().and_then(|vi| vi.build_date)
}
