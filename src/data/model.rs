// src/data/model.rs

//! The [`CrashModel`]: a single mutable aggregate built incrementally,
//! one [`Event`] at a time, in file order.
//!
//! Absorption never fails. Singleton fields are first-write-wins; a
//! conflicting duplicate is counted and traced, never applied (crash
//! logs should not legitimately contain duplicate singleton sections).
//! Cumulative fields append in file order. Unidentified lines are
//! capped at [`UNIDENTIFIED_LOG_LINES_MAX`] and silently dropped past
//! the cap.
//!
//! Derived quantities (percentages, vendor classification, startup
//! predicate) are computed on demand from stored fields, never stored
//! redundantly.
//!
//! [`Event`]: crate::data::event::Event
//! [`UNIDENTIFIED_LOG_LINES_MAX`]: crate::common::UNIDENTIFIED_LOG_LINES_MAX

use ::chrono::NaiveDateTime;
use ::lazy_static::lazy_static;
use ::regex::Regex;
use ::si_trace_print::defo;

use crate::common::{ByteSz, Count, LogLine, UNIDENTIFIED_LOG_LINES_MAX};
use crate::data::event::{
    Event,
    HeapAddressData,
    HeapRegionData,
    MemoryData,
    MetaspaceData,
    NativeMemoryData,
    RlimitData,
    SigInfoData,
    StackFrameData,
    VmInfoData,
};
use crate::data::patterns::{CGN_RPMDIR, CGP_RPMDIR};

/// Seconds of JVM uptime below which a crash counts as a startup
/// crash.
const STARTUP_CRASH_SECONDS: f64 = 60.0;

/// JDK build provenance, derived from install paths and the `vm_info:`
/// builder field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JavaVendor {
    /// A Red Hat build of OpenJDK.
    RedHat,
    /// Version/path shape consistent with an AdoptOpenJDK build.
    AdoptOpenJdkPossible,
    Unknown,
}

/// How the JDK was installed, derived from the `libjvm` path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JdkInstallType {
    Rpm,
    LinuxZip,
    WindowsZip,
    Unknown,
}

/// Operating system flavor, derived from the `OS:` line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OsFlavor {
    Rhel,
    CentOs,
    OracleLinux,
    Fedora,
    Windows,
    Unknown,
}

lazy_static! {
    static ref RPMDIR_REGEX: Regex = Regex::new(CGP_RPMDIR).unwrap();
    static ref OS_RELEASE_REGEX: Regex = Regex::new(r" release (?P<major>\d+)\.?").unwrap();
}

/// The structured model of one crash log.
///
/// One writer, written during the single parse pass; read only after
/// the last line is absorbed.
#[derive(Debug, Default)]
pub struct CrashModel {
    /// All `#` header lines, in file order.
    pub header_lines: Vec<String>,
    pub current_thread: Option<String>,
    pub siginfo: Option<SigInfoData>,
    pub stack_free_space_bytes: Option<ByteSz>,
    /// Native and Java stack frames, in file order.
    pub stack_frames: Vec<StackFrameData>,
    /// Thread list lines, in file order.
    pub threads: Vec<String>,
    pub vm_state: Option<String>,
    pub vm_operation: Option<String>,
    pub heap_address: Option<HeapAddressData>,
    /// Heap generation/space lines, in file order.
    pub heap_regions: Vec<HeapRegionData>,
    pub metaspace: Option<MetaspaceData>,
    /// Dynamic library paths, in file order.
    pub dynamic_libraries: Vec<String>,
    pub jvm_args: Option<String>,
    pub java_command: Option<String>,
    pub environment_variables: Vec<(String, String)>,
    pub os: Option<String>,
    pub os_uptime: Option<String>,
    pub uname: Option<String>,
    pub rlimit: Option<RlimitData>,
    pub cpu_count: Option<u64>,
    /// cgroup key/value lines, in file order.
    pub container_info: Vec<(String, String)>,
    pub memory: Option<MemoryData>,
    /// `/proc/meminfo` entries, in file order.
    pub meminfo: Vec<(String, ByteSz)>,
    pub vm_info: Option<VmInfoData>,
    pub crash_time: Option<NaiveDateTime>,
    pub elapsed_seconds: Option<f64>,
    pub host: Option<String>,
    /// Exception-count lines, in file order.
    pub exception_counts: Vec<(String, u64)>,
    /// Native Memory Tracking lines, in file order.
    pub native_memory: Vec<NativeMemoryData>,
    /// Unidentified lines, in file order, capped.
    pub unidentified_log_lines: Vec<LogLine>,
    /// Unidentified lines dropped past the cap.
    pub unidentified_log_lines_dropped: Count,
    /// Conflicting duplicate singleton events, counted not applied.
    pub duplicate_singleton_events: Count,
    /// VM event-table lines seen (compilation, deoptimization,
    /// internal exceptions, generic).
    pub vm_events: Count,
    /// GC heap history lines seen.
    pub gc_heap_history_events: Count,
}

/// Set a singleton field first-write-wins; count and trace a
/// conflicting duplicate.
macro_rules! set_singleton {
    ($self:ident, $field:ident, $value:expr) => {
        match $self.$field {
            None => $self.$field = Some($value),
            Some(_) => {
                defo!("duplicate singleton event for field {:?} ignored", stringify!($field));
                $self.duplicate_singleton_events += 1;
            }
        }
    };
}

impl CrashModel {
    pub fn new() -> CrashModel {
        CrashModel::default()
    }

    /// Absorb one classified event, in file order. Never fails.
    pub fn absorb(
        &mut self,
        event: Event,
    ) {
        match event {
            Event::Header { text } => self.header_lines.push(text),
            Event::SectionMarker => {}
            Event::CurrentThread { thread } => set_singleton!(self, current_thread, thread),
            Event::SigInfo(data) => set_singleton!(self, siginfo, data),
            Event::Register => {}
            Event::Instructions => {}
            Event::Stack { free_space_bytes } => {
                if let Some(bytes) = free_space_bytes {
                    set_singleton!(self, stack_free_space_bytes, bytes);
                }
            }
            Event::StackFrame(data) => self.stack_frames.push(data),
            Event::Thread { line } => self.threads.push(line),
            Event::VmState { state } => set_singleton!(self, vm_state, state),
            Event::VmOperation { operation } => set_singleton!(self, vm_operation, operation),
            Event::HeapAddress(data) => set_singleton!(self, heap_address, data),
            Event::Heap => {}
            Event::HeapRegion(data) => self.heap_regions.push(data),
            Event::Metaspace(data) => set_singleton!(self, metaspace, data),
            Event::GcHeapHistory => self.gc_heap_history_events += 1,
            Event::CompilationEvent
            | Event::DeoptimizationEvent
            | Event::InternalExceptionEvent => self.vm_events += 1,
            Event::VmEvent { .. } => self.vm_events += 1,
            Event::DynamicLibrary { path } => {
                if let Some(path) = path {
                    self.dynamic_libraries.push(path);
                }
            }
            Event::VmArguments { key, value } => match key.as_str() {
                "jvm_args" => set_singleton!(self, jvm_args, value),
                "java_command" => set_singleton!(self, java_command, value),
                _ => {}
            },
            Event::EnvironmentVariable { name, value } => {
                self.environment_variables.push((name, value))
            }
            Event::OsInfo { os } => set_singleton!(self, os, os),
            Event::OsUptime { uptime } => set_singleton!(self, os_uptime, uptime),
            Event::Uname { uname } => set_singleton!(self, uname, uname),
            Event::Rlimit(data) => set_singleton!(self, rlimit, data),
            Event::CpuInfo { total } => set_singleton!(self, cpu_count, total),
            Event::ContainerInfo { key, value } => self.container_info.push((key, value)),
            Event::Memory(data) => set_singleton!(self, memory, data),
            Event::MemInfo { key, bytes } => self.meminfo.push((key, bytes)),
            Event::VmInfo(data) => set_singleton!(self, vm_info, data),
            Event::CrashTime { time } => {
                if let Some(time) = time {
                    set_singleton!(self, crash_time, time);
                }
            }
            Event::TimeElapsedTime { time, elapsed_seconds } => {
                if let Some(time) = time {
                    set_singleton!(self, crash_time, time);
                }
                set_singleton!(self, elapsed_seconds, elapsed_seconds);
            }
            Event::ElapsedTime { elapsed_seconds } => {
                set_singleton!(self, elapsed_seconds, elapsed_seconds)
            }
            Event::Host { host } => set_singleton!(self, host, host),
            Event::ExceptionCounts { label, count } => {
                if let Some(count) = count {
                    self.exception_counts.push((label, count));
                }
            }
            Event::NativeMemoryTracking(data) => self.native_memory.push(data),
            Event::BlankLine => {}
            Event::Unknown { text } => {
                if self.unidentified_log_lines.len() < UNIDENTIFIED_LOG_LINES_MAX {
                    self.unidentified_log_lines.push(text);
                } else {
                    self.unidentified_log_lines_dropped += 1;
                }
            }
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // derived quantities, computed on demand
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// The error summary header line: the signal or error line after
    /// "A fatal error has been detected".
    pub fn error_summary(&self) -> Option<&str> {
        self.header_lines
            .iter()
            .map(|l| l.trim_start_matches('#').trim())
            .find(|l| {
                l.starts_with("SIG")
                    || l.starts_with("EXCEPTION_")
                    || l.starts_with("Internal Error")
                    || l.starts_with("Out of Memory Error")
                    || l.starts_with("fatal error")
                    || l.starts_with("There is insufficient memory")
            })
    }

    /// Did the JVM report an out-of-memory condition in the header?
    pub fn is_out_of_memory(&self) -> bool {
        self.header_lines.iter().any(|l| {
            l.contains("Out of Memory Error")
                || l.contains("There is insufficient memory")
                || l.contains("Native memory allocation")
        })
    }

    /// Did the header report a failure to spawn a native thread? The
    /// JVM prints one of these when `pthread_create` is refused, which
    /// on Linux usually means the `NPROC` rlimit has been reached.
    pub fn is_thread_creation_failure(&self) -> bool {
        self.header_lines.iter().any(|l| {
            l.contains("unable to create new native thread")
                || l.contains("pthread_create failed")
                || l.contains("Cannot create GC thread")
                || l.contains("Failed to start thread")
        })
    }

    /// Is the recorded thread count at or near (>= 90% of) `limit`?
    pub fn thread_count_near(
        &self,
        limit: u64,
    ) -> bool {
        let count: u64 = self.threads.len() as u64;
        count.saturating_mul(10) >= limit.saturating_mul(9)
    }

    /// Did the crash occur within the first minute of JVM uptime?
    pub fn is_startup_crash(&self) -> bool {
        match self.elapsed_seconds {
            Some(secs) => secs < STARTUP_CRASH_SECONDS,
            None => false,
        }
    }

    /// The JRE release string, e.g. `1.8.0_222-b10`.
    pub fn jdk_release(&self) -> Option<&str> {
        self.vm_info
            .as_ref()
            .and_then(|vi| vi.release.as_deref())
    }

    /// The JDK major version (8, 11, ...), from the release string or
    /// the rpm directory name.
    pub fn jdk_major_version(&self) -> Option<u16> {
        if let Some(release) = self.jdk_release() {
            if release.starts_with("1.") {
                // legacy shape `1.8.0_...`
                return release
                    .split('.')
                    .nth(1)
                    .and_then(|s| s.parse::<u16>().ok());
            }
            return release
                .split('.')
                .next()
                .and_then(|s| s.parse::<u16>().ok());
        }
        match self.jvm_rpm_directory() {
            Some(rpmdir) if rpmdir.starts_with("java-1.8.0-openjdk") => Some(8),
            Some(rpmdir) if rpmdir.starts_with("java-11-openjdk") => Some(11),
            _ => None,
        }
    }

    /// The Red Hat rpm directory the JVM ran from, extracted from the
    /// dynamic library paths, e.g.
    /// `java-1.8.0-openjdk-1.8.0.222.b10-0.el7_6.x86_64`.
    pub fn jvm_rpm_directory(&self) -> Option<String> {
        self.dynamic_libraries
            .iter()
            .filter(|path| path.contains("libjvm.so") || path.ends_with("/bin/java"))
            .find_map(|path| {
                RPMDIR_REGEX
                    .captures(path)
                    .and_then(|c| c.name(CGN_RPMDIR))
                    .map(|m| m.as_str().to_string())
            })
            .or_else(|| {
                self.environment_variables
                    .iter()
                    .filter(|(name, _)| name == "JAVA_HOME")
                    .find_map(|(_, value)| {
                        RPMDIR_REGEX
                            .captures(value)
                            .and_then(|c| c.name(CGN_RPMDIR))
                            .map(|m| m.as_str().to_string())
                    })
            })
    }

    /// Path of the `libjvm.so`/`jvm.dll` actually loaded, if listed.
    pub fn jvm_library_path(&self) -> Option<&str> {
        self.dynamic_libraries
            .iter()
            .map(|s| s.as_str())
            .find(|path| path.contains("libjvm.so") || path.to_lowercase().contains("jvm.dll"))
    }

    /// How the JDK was installed, from the `libjvm` path shape.
    pub fn jdk_install_type(&self) -> JdkInstallType {
        match self.jvm_library_path() {
            Some(path) if path.to_lowercase().contains("jvm.dll") => JdkInstallType::WindowsZip,
            Some(path) if RPMDIR_REGEX.is_match(path) => JdkInstallType::Rpm,
            Some(_) => JdkInstallType::LinuxZip,
            None => JdkInstallType::Unknown,
        }
    }

    /// JDK build provenance classification.
    ///
    /// An rpm directory matching the Red Hat naming shape, or a
    /// `mockbuild` builder, is a Red Hat build. A `jenkins` builder or
    /// an AdoptOpenJDK install path possibly is an AdoptOpenJDK build.
    pub fn java_vendor(&self) -> JavaVendor {
        if self.jvm_rpm_directory().is_some() {
            return JavaVendor::RedHat;
        }
        let built_by: Option<&str> = self
            .vm_info
            .as_ref()
            .and_then(|vi| vi.built_by.as_deref());
        match built_by {
            Some("mockbuild") => JavaVendor::RedHat,
            Some("jenkins") => JavaVendor::AdoptOpenJdkPossible,
            _ => {
                let adopt_path: bool = self
                    .jvm_library_path()
                    .map(|p| p.to_lowercase().contains("adoptopenjdk"))
                    .unwrap_or(false);
                if adopt_path {
                    JavaVendor::AdoptOpenJdkPossible
                } else {
                    JavaVendor::Unknown
                }
            }
        }
    }

    /// Operating system flavor and major version from the `OS:` line.
    pub fn os_flavor(&self) -> OsFlavor {
        match self.os.as_deref() {
            Some(os) if os.starts_with("Red Hat Enterprise Linux") => OsFlavor::Rhel,
            Some(os) if os.starts_with("CentOS") => OsFlavor::CentOs,
            Some(os) if os.starts_with("Oracle Linux") => OsFlavor::OracleLinux,
            Some(os) if os.starts_with("Fedora") => OsFlavor::Fedora,
            Some(os) if os.contains("Windows") => OsFlavor::Windows,
            _ => OsFlavor::Unknown,
        }
    }

    /// OS major version number, e.g. 7 for RHEL 7.7.
    pub fn os_major_version(&self) -> Option<u16> {
        let os: &str = self.os.as_deref()?;
        OS_RELEASE_REGEX
            .captures(os)
            .and_then(|c| c.name("major"))
            .and_then(|m| m.as_str().parse::<u16>().ok())
    }

    /// CPU architecture from the `uname:` line.
    pub fn arch(&self) -> Option<&str> {
        let uname: &str = self.uname.as_deref()?;
        for arch in ["x86_64", "ppc64le", "ppc64", "s390x", "aarch64", "i686"] {
            if uname.contains(arch) {
                return Some(arch);
            }
        }
        None
    }

    /// Maximum heap: sum of the top-level generation totals.
    /// Subordinate spaces (eden, survivors, class space) are excluded.
    pub fn heap_total_bytes(&self) -> ByteSz {
        self.heap_regions
            .iter()
            .filter(|r| !r.subordinate)
            .map(|r| r.total_bytes)
            .sum()
    }

    /// Heap in use: sum of the top-level generation used values.
    pub fn heap_used_bytes(&self) -> ByteSz {
        self.heap_regions
            .iter()
            .filter(|r| !r.subordinate)
            .map(|r| r.used_bytes)
            .sum()
    }

    pub fn metaspace_committed_bytes(&self) -> ByteSz {
        self.metaspace
            .as_ref()
            .map(|m| m.committed_bytes)
            .unwrap_or(0)
    }

    pub fn physical_memory_bytes(&self) -> Option<ByteSz> {
        self.memory.as_ref().map(|m| m.physical_bytes)
    }

    pub fn swap_bytes(&self) -> Option<ByteSz> {
        self.memory.as_ref().and_then(|m| m.swap_bytes)
    }

    pub fn swap_free_bytes(&self) -> Option<ByteSz> {
        self.memory.as_ref().and_then(|m| m.swap_free_bytes)
    }

    /// cgroup memory limit, when the JVM ran in a container.
    pub fn container_memory_limit_bytes(&self) -> Option<ByteSz> {
        self.container_info
            .iter()
            .find(|(key, _)| key == "memory_limit_in_bytes")
            .and_then(|(_, value)| value.parse::<ByteSz>().ok())
    }

    /// Is the container memory limit below host physical memory?
    pub fn container_memory_constrained(&self) -> bool {
        match (self.container_memory_limit_bytes(), self.physical_memory_bytes()) {
            (Some(limit), Some(physical)) => limit < physical,
            _ => false,
        }
    }

    /// Total exception count for a label prefix, e.g.
    /// `"OutOfMemoryError"`.
    pub fn exception_count(
        &self,
        label_prefix: &str,
    ) -> u64 {
        self.exception_counts
            .iter()
            .filter(|(label, _)| label.starts_with(label_prefix))
            .map(|(_, count)| count)
            .sum()
    }

    /// Does any stack frame or header line contain `needle`?
    pub fn stack_contains(
        &self,
        needle: &str,
    ) -> bool {
        self.stack_frames
            .iter()
            .any(|f| f.frame.contains(needle))
            || self.header_lines.iter().any(|l| l.contains(needle))
    }
}
