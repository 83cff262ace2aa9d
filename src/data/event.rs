// src/data/event.rs

//! The typed event model: one [`Event`] per classified log line.
//!
//! An `Event` is immutable once constructed and carries only the fields
//! its line format supplies. The [`CrashModel`] absorbs events with an
//! exhaustive `match`, so adding a variant here is a compile-time
//! checked exercise.
//!
//! [`CrashModel`]: crate::data::model::CrashModel

use ::chrono::NaiveDateTime;

use crate::common::{ByteSz, LogLine};

/// Fieldless tag for each recognized line shape.
///
/// Parallel to [`Event`]; used by the classifier table and for
/// per-kind statistics without constructing a payload.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EventKind {
    /// A `#`-prefixed header line, including the error summary and the
    /// problematic frame.
    Header,
    /// A recognized structural line that carries no modeled data:
    /// section banners, subsection headers, `libc:`, `load average:`,
    /// and similar.
    SectionMarker,
    CurrentThread,
    SigInfo,
    Register,
    Instructions,
    /// The `Stack: [0x..,0x..], sp=.., free space=..` summary line.
    Stack,
    /// One native or Java stack frame.
    StackFrame,
    Thread,
    VmState,
    VmOperation,
    HeapAddress,
    /// The `Heap:` section header.
    Heap,
    /// One generation or space line under `Heap:`.
    HeapRegion,
    Metaspace,
    GcHeapHistory,
    CompilationEvent,
    DeoptimizationEvent,
    InternalExceptionEvent,
    /// An `Event: ...` detail line from one of the VM event tables.
    VmEvent,
    DynamicLibrary,
    VmArguments,
    EnvironmentVariable,
    OsInfo,
    OsUptime,
    Uname,
    Rlimit,
    CpuInfo,
    ContainerInfo,
    Memory,
    MemInfo,
    VmInfo,
    CrashTime,
    /// The combined JDK 11 `Time: ... elapsed time: ...` line.
    TimeElapsedTime,
    ElapsedTime,
    Host,
    ExceptionCounts,
    NativeMemoryTracking,
    BlankLine,
    Unknown,
}

/// `siginfo:` line fields.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SigInfoData {
    pub signal_number: u8,
    pub signal_name: String,
    pub code: i32,
    pub code_name: String,
    pub address: Option<String>,
}

/// One stack frame from the `Native frames:` or `Java frames:` lists.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StackFrameData {
    /// Frame type marker: `C` native, `J` compiled Java, `j`
    /// interpreted Java, `V`/`v` VM.
    pub frame_type: char,
    /// The remainder of the frame line.
    pub frame: String,
}

/// `heap address:` line fields.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HeapAddressData {
    pub address: String,
    pub size_bytes: ByteSz,
    pub compressed_oops_mode: Option<String>,
}

/// One generation/space line under `Heap:`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HeapRegionData {
    pub space: String,
    pub total_bytes: ByteSz,
    pub used_bytes: ByteSz,
    /// Subordinate spaces (eden, survivor, class space) are indented
    /// under a generation and excluded from heap totals.
    pub subordinate: bool,
}

/// `Metaspace used .., capacity .., committed .., reserved ..` fields.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MetaspaceData {
    pub used_bytes: ByteSz,
    pub capacity_bytes: ByteSz,
    pub committed_bytes: ByteSz,
    pub reserved_bytes: ByteSz,
}

/// `rlimit:` line fields. `None` means the limit printed `infinity`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RlimitData {
    pub stack_bytes: Option<ByteSz>,
    pub core_bytes: Option<ByteSz>,
    pub nproc: Option<u64>,
    pub nofile: Option<u64>,
}

/// `Memory:` line fields, all converted to bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemoryData {
    pub page_bytes: ByteSz,
    pub physical_bytes: ByteSz,
    pub physical_free_bytes: ByteSz,
    pub swap_bytes: Option<ByteSz>,
    pub swap_free_bytes: Option<ByteSz>,
}

/// `vm_info:` line fields.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VmInfoData {
    /// The entire line after `vm_info: `.
    pub text: String,
    /// The JRE release string, e.g. `1.8.0_222-b10` or `11.0.4+11-LTS`.
    pub release: Option<String>,
    /// The `built on` timestamp.
    pub build_date: Option<NaiveDateTime>,
    /// The `by "user"` builder name, e.g. `mockbuild`.
    pub built_by: Option<String>,
}

/// One `Total:` or category line under `Native Memory Tracking:`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NativeMemoryData {
    /// `None` for the `Total:` line.
    pub category: Option<String>,
    pub reserved_bytes: ByteSz,
    pub committed_bytes: ByteSz,
}

/// The typed result of classifying one raw log line.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Header { text: String },
    SectionMarker,
    CurrentThread { thread: String },
    SigInfo(SigInfoData),
    Register,
    Instructions,
    Stack { free_space_bytes: Option<ByteSz> },
    StackFrame(StackFrameData),
    Thread { line: String },
    VmState { state: String },
    VmOperation { operation: String },
    HeapAddress(HeapAddressData),
    Heap,
    HeapRegion(HeapRegionData),
    Metaspace(MetaspaceData),
    GcHeapHistory,
    CompilationEvent,
    DeoptimizationEvent,
    InternalExceptionEvent,
    VmEvent { text: String },
    DynamicLibrary { path: Option<String> },
    VmArguments { key: String, value: String },
    EnvironmentVariable { name: String, value: String },
    OsInfo { os: String },
    OsUptime { uptime: String },
    Uname { uname: String },
    Rlimit(RlimitData),
    CpuInfo { total: u64 },
    ContainerInfo { key: String, value: String },
    Memory(MemoryData),
    MemInfo { key: String, bytes: ByteSz },
    VmInfo(VmInfoData),
    CrashTime { time: Option<NaiveDateTime> },
    TimeElapsedTime { time: Option<NaiveDateTime>, elapsed_seconds: f64 },
    ElapsedTime { elapsed_seconds: f64 },
    Host { host: String },
    ExceptionCounts { label: String, count: Option<u64> },
    NativeMemoryTracking(NativeMemoryData),
    BlankLine,
    Unknown { text: LogLine },
}

impl Event {
    /// The [`EventKind`] tag of this event.
    pub const fn kind(&self) -> EventKind {
        match self {
            Event::Header { .. } => EventKind::Header,
            Event::SectionMarker => EventKind::SectionMarker,
            Event::CurrentThread { .. } => EventKind::CurrentThread,
            Event::SigInfo(_) => EventKind::SigInfo,
            Event::Register => EventKind::Register,
            Event::Instructions => EventKind::Instructions,
            Event::Stack { .. } => EventKind::Stack,
            Event::StackFrame(_) => EventKind::StackFrame,
            Event::Thread { .. } => EventKind::Thread,
            Event::VmState { .. } => EventKind::VmState,
            Event::VmOperation { .. } => EventKind::VmOperation,
            Event::HeapAddress(_) => EventKind::HeapAddress,
            Event::Heap => EventKind::Heap,
            Event::HeapRegion(_) => EventKind::HeapRegion,
            Event::Metaspace(_) => EventKind::Metaspace,
            Event::GcHeapHistory => EventKind::GcHeapHistory,
            Event::CompilationEvent => EventKind::CompilationEvent,
            Event::DeoptimizationEvent => EventKind::DeoptimizationEvent,
            Event::InternalExceptionEvent => EventKind::InternalExceptionEvent,
            Event::VmEvent { .. } => EventKind::VmEvent,
            Event::DynamicLibrary { .. } => EventKind::DynamicLibrary,
            Event::VmArguments { .. } => EventKind::VmArguments,
            Event::EnvironmentVariable { .. } => EventKind::EnvironmentVariable,
            Event::OsInfo { .. } => EventKind::OsInfo,
            Event::OsUptime { .. } => EventKind::OsUptime,
            Event::Uname { .. } => EventKind::Uname,
            Event::Rlimit(_) => EventKind::Rlimit,
            Event::CpuInfo { .. } => EventKind::CpuInfo,
            Event::ContainerInfo { .. } => EventKind::ContainerInfo,
            Event::Memory(_) => EventKind::Memory,
            Event::MemInfo { .. } => EventKind::MemInfo,
            Event::VmInfo(_) => EventKind::VmInfo,
            Event::CrashTime { .. } => EventKind::CrashTime,
            Event::TimeElapsedTime { .. } => EventKind::TimeElapsedTime,
            Event::ElapsedTime { .. } => EventKind::ElapsedTime,
            Event::Host { .. } => EventKind::Host,
            Event::ExceptionCounts { .. } => EventKind::ExceptionCounts,
            Event::NativeMemoryTracking(_) => EventKind::NativeMemoryTracking,
            Event::BlankLine => EventKind::BlankLine,
            Event::Unknown { .. } => EventKind::Unknown,
        }
    }
}
