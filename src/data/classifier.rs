// src/data/classifier.rs

//! The line classifier: a fixed, priority-ordered table of regular
//! expression matchers, each paired with a parse routine that extracts
//! typed fields from a matching line into an [`Event`].
//!
//! The most relevant constant is [`EVENT_PARSE_DATAS`]. Entries are
//! tried in declaration order and the first match wins, so a
//! more-specific shape (a `heap address:` line) must be declared before
//! any more-general shape that would also accept it (a bare memory
//! region). **The declaration order is part of the contract**; changing
//! it silently reclassifies ambiguous lines. A table-driven test
//! asserts that every entry's embedded sample lines classify to that
//! entry and no earlier one.
//!
//! Classification is total: a line matching no entry is an
//! [`Event::Unknown`], never an error.
//!
//! [`EVENT_PARSE_DATAS`]: self::EVENT_PARSE_DATAS
//! [`Event`]: crate::data::event::Event
//! [`Event::Unknown`]: crate::data::event::Event#variant.Unknown

use ::const_format::concatcp;
use ::lazy_static::lazy_static;
use ::regex::{Captures, Regex};
use ::si_trace_print::defñ;

use crate::common::ByteSz;
use crate::data::datetime::{datetime_from_build_timestamp, datetime_from_crash_time};
use crate::data::event::{
    Event,
    EventKind,
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
use crate::data::patterns::{
    CGN_ADDRESS,
    CGN_PATH,
    CGN_RELEASE,
    CGN_TIMESTAMP,
    CGP_ADDRESS,
    CGP_CRASHTIME,
    CGP_PATH,
    CGP_RELEASE,
    CGP_SIZE,
    CGP_TIMESTAMP,
    RegexPattern,
    RP_ADDRESS,
    RP_HEAP_GENERATION,
    RP_HEAP_SPACE,
    RP_REGION,
    RP_SIGNAME,
};
use crate::data::size::{size_to_bytes, BYTES_PER_KIB};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EventParseInstr
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Extract a typed [`Event`] from the [`Captures`] of a matched line.
///
/// Only ever invoked with captures produced by the same entry's regex,
/// so the matched-precondition holds by construction.
pub type EventParseFn = fn(&Captures, &str) -> Event;

/// Instructions for classifying and parsing one line shape.
pub struct EventParseInstr {
    /// The [`EventKind`] lines matching this entry classify as.
    pub kind: EventKind,
    /// Regex pattern tested against the whole line.
    pub regex_pattern: &'static RegexPattern,
    /// Capture-group extraction routine.
    pub parse: EventParseFn,
    /// Hardcoded self-test lines; every one must classify to this
    /// entry and no earlier one (see `classifier_tests`).
    #[cfg(any(debug_assertions, test))]
    pub _test_lines: &'static [&'static str],
    /// Source code line number of declaration, to aid debugging.
    pub _line_num: u32,
}

/// Declare an [`EventParseInstr`] more easily.
#[macro_export]
macro_rules! EPD {
    (
        $kind:expr,
        $pattern:expr,
        $parse:expr,
        $test_lines:expr,
        $line_num:expr,
    ) => {
        EventParseInstr {
            kind: $kind,
            regex_pattern: $pattern,
            parse: $parse,
            #[cfg(any(debug_assertions, test))]
            _test_lines: $test_lines,
            _line_num: $line_num,
        }
    };
}
pub use EPD;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// capture helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A named capture as `&str`; the group must be present in the pattern
/// and non-optional.
fn cap_str<'c>(
    caps: &'c Captures,
    name: &str,
) -> &'c str {
    caps.name(name)
        .map(|m| m.as_str())
        .unwrap_or("")
}

fn cap_string(
    caps: &Captures,
    name: &str,
) -> String {
    cap_str(caps, name).to_string()
}

fn cap_opt_string(
    caps: &Captures,
    name: &str,
) -> Option<String> {
    caps.name(name)
        .map(|m| m.as_str().to_string())
}

/// A named numeric capture. The classifier regexes only capture digit
/// runs here so parse failures reduce to overflow, treated as `0`.
fn cap_u64(
    caps: &Captures,
    name: &str,
) -> u64 {
    cap_str(caps, name)
        .parse::<u64>()
        .unwrap_or(0)
}

fn cap_opt_u64(
    caps: &Captures,
    name: &str,
) -> Option<u64> {
    caps.name(name)
        .and_then(|m| m.as_str().parse::<u64>().ok())
}

/// A `(value, unit-suffix)` capture pair converted to bytes.
fn cap_size(
    caps: &Captures,
    value_name: &str,
    unit_name: &str,
) -> ByteSz {
    size_to_bytes(cap_u64(caps, value_name), cap_str(caps, unit_name)).unwrap_or(0)
}

fn cap_opt_size(
    caps: &Captures,
    value_name: &str,
    unit_name: &str,
) -> Option<ByteSz> {
    caps.name(value_name)?;
    Some(cap_size(caps, value_name, unit_name))
}

/// An rlimit field: a `k`-suffixed size, a bare count, or `infinity`
/// (`None`).
fn cap_rlimit(
    caps: &Captures,
    name: &str,
    kib: bool,
) -> Option<u64> {
    let value: &str = cap_str(caps, name);
    if value == "infinity" {
        return None;
    }
    let digits: &str = value.trim_end_matches('k');
    let n: u64 = digits.parse::<u64>().ok()?;
    if kib && value.ends_with('k') {
        Some(n * BYTES_PER_KIB)
    } else {
        Some(n)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// per-entry parse routines
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn parse_header(
    _caps: &Captures,
    line: &str,
) -> Event {
    Event::Header {
        text: line.to_string(),
    }
}

fn parse_section_marker(
    _caps: &Captures,
    _line: &str,
) -> Event {
    Event::SectionMarker
}

fn parse_current_thread(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::CurrentThread {
        thread: cap_string(caps, "thread"),
    }
}

fn parse_siginfo(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::SigInfo(SigInfoData {
        signal_number: cap_u64(caps, "signo") as u8,
        signal_name: cap_string(caps, "signame"),
        code: cap_str(caps, "sicode").parse::<i32>().unwrap_or(0),
        code_name: cap_string(caps, "codename"),
        address: cap_opt_string(caps, "address"),
    })
}

fn parse_siginfo_windows(
    caps: &Captures,
    _line: &str,
) -> Event {
    let code_hex: &str = cap_str(caps, "codehex");
    let signal_name: &str = match code_hex {
        "0xc0000005" => "EXCEPTION_ACCESS_VIOLATION",
        "0xc00000fd" => "EXCEPTION_STACK_OVERFLOW",
        _ => code_hex,
    };
    Event::SigInfo(SigInfoData {
        signal_number: 0,
        signal_name: signal_name.to_string(),
        code: 0,
        code_name: code_hex.to_string(),
        address: cap_opt_string(caps, "address"),
    })
}

fn parse_register(
    _caps: &Captures,
    _line: &str,
) -> Event {
    Event::Register
}

fn parse_instructions(
    _caps: &Captures,
    _line: &str,
) -> Event {
    Event::Instructions
}

fn parse_stack(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::Stack {
        free_space_bytes: cap_opt_size(caps, "size", "unit"),
    }
}

fn parse_stack_frame(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::StackFrame(StackFrameData {
        frame_type: cap_str(caps, "frametype")
            .chars()
            .next()
            .unwrap_or('?'),
        frame: cap_string(caps, "frame"),
    })
}

fn parse_thread(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::Thread {
        line: cap_string(caps, "line"),
    }
}

fn parse_vm_state(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::VmState {
        state: cap_string(caps, "state"),
    }
}

fn parse_vm_operation(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::VmOperation {
        operation: cap_string(caps, "operation"),
    }
}

fn parse_heap_address(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::HeapAddress(HeapAddressData {
        address: cap_string(caps, CGN_ADDRESS),
        size_bytes: cap_size(caps, "size", "unit"),
        compressed_oops_mode: cap_opt_string(caps, "mode"),
    })
}

fn parse_heap_header(
    _caps: &Captures,
    _line: &str,
) -> Event {
    Event::Heap
}

fn parse_heap_region(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::HeapRegion(HeapRegionData {
        space: cap_string(caps, "space"),
        total_bytes: cap_size(caps, "size", "unit"),
        used_bytes: cap_size(caps, "used", "usedunit"),
        subordinate: false,
    })
}

fn parse_heap_subregion(
    caps: &Captures,
    _line: &str,
) -> Event {
    let size: ByteSz = cap_size(caps, "size", "unit");
    Event::HeapRegion(HeapRegionData {
        space: cap_string(caps, "space"),
        total_bytes: size,
        used_bytes: size,
        subordinate: true,
    })
}

fn parse_metaspace(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::Metaspace(MetaspaceData {
        used_bytes: cap_size(caps, "used", "usedunit"),
        capacity_bytes: cap_opt_size(caps, "capacity", "capacityunit").unwrap_or(0),
        committed_bytes: cap_size(caps, "committed", "committedunit"),
        reserved_bytes: cap_size(caps, "reserved", "reservedunit"),
    })
}

fn parse_gc_heap_history(
    _caps: &Captures,
    _line: &str,
) -> Event {
    Event::GcHeapHistory
}

fn parse_compilation_events(
    _caps: &Captures,
    _line: &str,
) -> Event {
    Event::CompilationEvent
}

fn parse_deoptimization_events(
    _caps: &Captures,
    _line: &str,
) -> Event {
    Event::DeoptimizationEvent
}

fn parse_internal_exceptions(
    _caps: &Captures,
    _line: &str,
) -> Event {
    Event::InternalExceptionEvent
}

fn parse_vm_event(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::VmEvent {
        text: cap_string(caps, "text"),
    }
}

fn parse_dynamic_library(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::DynamicLibrary {
        path: cap_opt_string(caps, CGN_PATH),
    }
}

fn parse_vm_arguments(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::VmArguments {
        key: cap_string(caps, "key"),
        value: cap_string(caps, "value"),
    }
}

fn parse_environment_variable(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::EnvironmentVariable {
        name: cap_string(caps, "name"),
        value: cap_string(caps, "value"),
    }
}

fn parse_os_info(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::OsInfo {
        os: cap_str(caps, "os").trim().to_string(),
    }
}

fn parse_os_uptime(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::OsUptime {
        uptime: cap_string(caps, "uptime"),
    }
}

fn parse_uname(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::Uname {
        uname: cap_str(caps, "uname").trim().to_string(),
    }
}

fn parse_rlimit(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::Rlimit(RlimitData {
        stack_bytes: cap_rlimit(caps, "stack", true),
        core_bytes: cap_rlimit(caps, "core", true),
        nproc: cap_rlimit(caps, "nproc", false),
        nofile: cap_rlimit(caps, "nofile", false),
    })
}

fn parse_cpu_info(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::CpuInfo {
        total: cap_u64(caps, "total"),
    }
}

fn parse_container_info(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::ContainerInfo {
        key: cap_string(caps, "key"),
        value: cap_str(caps, "value").trim().to_string(),
    }
}

fn parse_memory(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::Memory(MemoryData {
        page_bytes: cap_size(caps, "page", "pageunit"),
        physical_bytes: cap_size(caps, "physical", "physicalunit"),
        physical_free_bytes: cap_size(caps, "free", "freeunit"),
        swap_bytes: cap_opt_size(caps, "swap", "swapunit"),
        swap_free_bytes: cap_opt_size(caps, "swapfree", "swapfreeunit"),
    })
}

fn parse_meminfo(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::MemInfo {
        key: cap_string(caps, "key"),
        bytes: cap_u64(caps, "size") * BYTES_PER_KIB,
    }
}

lazy_static! {
    /// Second-stage extraction from a matched `vm_info:` line.
    static ref VM_INFO_RELEASE_REGEX: Regex =
        Regex::new(concatcp!(r"JRE \(", CGP_RELEASE)).unwrap();
    static ref VM_INFO_BUILT_REGEX: Regex =
        Regex::new(concatcp!(r"built on ", CGP_TIMESTAMP, r#"( by "(?P<builder>[^"]+)")?"#)).unwrap();
}

fn parse_vm_info(
    caps: &Captures,
    _line: &str,
) -> Event {
    let text: String = cap_string(caps, "text");
    let release: Option<String> = VM_INFO_RELEASE_REGEX
        .captures(text.as_str())
        .map(|c| cap_string(&c, CGN_RELEASE));
    let (build_date, built_by) = match VM_INFO_BUILT_REGEX.captures(text.as_str()) {
        Some(c) => (
            datetime_from_build_timestamp(cap_str(&c, CGN_TIMESTAMP)),
            cap_opt_string(&c, "builder"),
        ),
        None => (None, None),
    };
    Event::VmInfo(VmInfoData {
        text,
        release,
        build_date,
        built_by,
    })
}

fn parse_crash_time(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::CrashTime {
        time: datetime_from_crash_time(cap_str(caps, CGN_TIMESTAMP)),
    }
}

fn parse_time_elapsed(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::TimeElapsedTime {
        time: datetime_from_crash_time(cap_str(caps, CGN_TIMESTAMP)),
        elapsed_seconds: cap_str(caps, "elapsed").parse::<f64>().unwrap_or(0.0),
    }
}

fn parse_elapsed_time(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::ElapsedTime {
        elapsed_seconds: cap_str(caps, "elapsed").parse::<f64>().unwrap_or(0.0),
    }
}

fn parse_host(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::Host {
        host: cap_str(caps, "host").trim().to_string(),
    }
}

fn parse_exception_counts_header(
    _caps: &Captures,
    line: &str,
) -> Event {
    Event::ExceptionCounts {
        label: line.trim_end_matches(':').to_string(),
        count: None,
    }
}

fn parse_exception_count(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::ExceptionCounts {
        label: cap_string(caps, "label"),
        count: cap_opt_u64(caps, "count"),
    }
}

fn parse_nmt_total(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::NativeMemoryTracking(NativeMemoryData {
        category: None,
        reserved_bytes: cap_u64(caps, "reserved") * BYTES_PER_KIB,
        committed_bytes: cap_u64(caps, "committed") * BYTES_PER_KIB,
    })
}

fn parse_nmt_category(
    caps: &Captures,
    _line: &str,
) -> Event {
    Event::NativeMemoryTracking(NativeMemoryData {
        category: Some(cap_str(caps, "category").trim().to_string()),
        reserved_bytes: cap_u64(caps, "reserved") * BYTES_PER_KIB,
        committed_bytes: cap_u64(caps, "committed") * BYTES_PER_KIB,
    })
}

fn parse_blank(
    _caps: &Captures,
    _line: &str,
) -> Event {
    Event::BlankLine
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EVENT_PARSE_DATAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Number of entries in [`EVENT_PARSE_DATAS`].
pub const EVENT_PARSE_DATAS_LEN: usize = 48;

/// The classifier dispatch table, in match-priority order.
///
/// Ordering rules (must be preserved):
/// 1. specific `#` header shapes before the generic `^#` catch-all;
/// 2. `heap address:` and heap generation lines before any general
///    region/size shapes;
/// 3. the GC-heap-history `Event:` shape before the generic `Event:`
///    shape;
/// 4. the bare-letter stack-frame shape last among word-anchored
///    entries (it is the most general);
/// 5. `BlankLine` last.
pub const EVENT_PARSE_DATAS: [EventParseInstr; EVENT_PARSE_DATAS_LEN] = [
    // ---------------------------------------------------------------------------------------------
    // `#` header block
    // ---------------------------------------------------------------------------------------------
    EPD!(
        EventKind::Header,
        concatcp!(r"^# +", RP_SIGNAME, r" \(0x[0-9a-f]+\) at pc=", RP_ADDRESS, r", pid=\d+, tid="),
        parse_header,
        &["#  SIGSEGV (0xb) at pc=0x00007f68383b9f54, pid=1013, tid=0x00007f683d1d8700"],
        line!(),
    ),
    EPD!(
        EventKind::Header,
        r"^# +(Internal Error|Out of Memory Error|fatal error) \(",
        parse_header,
        &[
            "#  Out of Memory Error (os_linux.cpp:2756), pid=2274, tid=0x00007f4d9a1ed700",
            "#  Internal Error (sharedRuntime.cpp:834), pid=5689, tid=0x00007ff28d43d700",
        ],
        line!(),
    ),
    EPD!(
        EventKind::Header,
        r"^# (There is insufficient memory for the Java Runtime Environment to continue\.|Native memory allocation \((mmap|malloc)\) failed)",
        parse_header,
        &[
            "# There is insufficient memory for the Java Runtime Environment to continue.",
            "# Native memory allocation (mmap) failed to map 12288 bytes for committing reserved memory.",
        ],
        line!(),
    ),
    // catch-all for remaining header lines; must follow the specific
    // `#` entries
    EPD!(
        EventKind::Header,
        r"^#",
        parse_header,
        &[
            "# A fatal error has been detected by the Java Runtime Environment:",
            "# JRE version: OpenJDK Runtime Environment (8.0_222-b10) (build 1.8.0_222-b10)",
            "# Java VM: OpenJDK 64-Bit Server VM (25.222-b10 mixed mode linux-amd64 compressed oops)",
            "# Problematic frame:",
            "# C  [libzip.so+0x4f54]",
            "#",
        ],
        line!(),
    ),
    // ---------------------------------------------------------------------------------------------
    // section banners and structural markers
    // ---------------------------------------------------------------------------------------------
    EPD!(
        EventKind::SectionMarker,
        r"^---------------  (T H R E A D|P R O C E S S|S Y S T E M)  ---------------$",
        parse_section_marker,
        &[
            "---------------  T H R E A D  ---------------",
            "---------------  P R O C E S S  ---------------",
            "---------------  S Y S T E M  ---------------",
        ],
        line!(),
    ),
    EPD!(
        EventKind::CurrentThread,
        r"^Current thread \(0x[0-9a-f]+\): +(?P<thread>.*)$",
        parse_current_thread,
        &["Current thread (0x00007f68380cb000):  JavaThread \"main\" [_thread_in_native, id=1014, stack(0x00007f683d0d8000,0x00007f683d1d9000)]"],
        line!(),
    ),
    EPD!(
        EventKind::SigInfo,
        r"^siginfo: ?si_signo: ?(?P<signo>\d+) \((?P<signame>SIG[A-Z0-9]+)\), si_code: ?(?P<sicode>-?\d+) \((?P<codename>[A-Z_0-9]+)\)(, si_addr: ?(?P<address>0x[0-9a-f]+))?",
        parse_siginfo,
        &[
            "siginfo: si_signo: 11 (SIGSEGV), si_code: 1 (SEGV_MAPERR), si_addr: 0x0000000000000000",
            "siginfo: si_signo: 7 (SIGBUS), si_code: 2 (BUS_ADRERR), si_addr: 0x00007f1874edb000",
        ],
        line!(),
    ),
    EPD!(
        EventKind::SigInfo,
        r"^siginfo: ExceptionCode=(?P<codehex>0x[0-9a-f]+)(, reading address (?P<address>0x[0-9a-f]+))?",
        parse_siginfo_windows,
        &["siginfo: ExceptionCode=0xc0000005, reading address 0x0000000000000000"],
        line!(),
    ),
    EPD!(
        EventKind::Register,
        r"^(RAX|RBX|RCX|RDX|RSP|RBP|RSI|RDI|R8 ?|R9 ?|R1[0-5]|RIP|EAX|EBX|ECX|EDX|ESP|EBP|ESI|EDI|EIP|EFLAGS|CSGSFS|ERR|TRAPNO)=",
        parse_register,
        &[
            "RAX=0x0000000000000000, RBX=0x00007f683d1d6c50, RCX=0x000000000000000a, RDX=0x0000000000000000",
            "RIP=0x00007f68383b9f54, EFLAGS=0x0000000000010246, CSGSFS=0x0000000000000033, ERR=0x0000000000000004",
        ],
        line!(),
    ),
    EPD!(
        EventKind::Instructions,
        r"^Instructions: \(pc=0x[0-9a-f]+\)$",
        parse_instructions,
        &["Instructions: (pc=0x00007f68383b9f54)"],
        line!(),
    ),
    // hex dump lines under `Instructions:`
    EPD!(
        EventKind::Instructions,
        r"^0x[0-9a-f]+: +[0-9a-f]{2}( +[0-9a-f]{2})* *$",
        parse_instructions,
        &["0x00007f68383b9f34:   48 8b 45 e8 48 8b 40 08 48 85 c0 74 21 48 8b 45 "],
        line!(),
    ),
    EPD!(
        EventKind::Stack,
        concatcp!(r"^Stack: \[0x[0-9a-f]+,0x[0-9a-f]+\], +sp=0x[0-9a-f]+, +free space=", CGP_SIZE, r"$"),
        parse_stack,
        &["Stack: [0x00007f683d0d8000,0x00007f683d1d9000],  sp=0x00007f683d1d6b50,  free space=1018k"],
        line!(),
    ),
    EPD!(
        EventKind::SectionMarker,
        r"^(Native|Java) frames: \(.*\)$",
        parse_section_marker,
        &[
            "Native frames: (J=compiled Java code, j=interpreted, Vv=VM code, C=native code)",
            "Java frames: (J=compiled Java code, j=interpreted, Vv=VM code)",
        ],
        line!(),
    ),
    EPD!(
        EventKind::Thread,
        r"^(  |=>)0x[0-9a-f]+ (?P<line>(JavaThread|VMThread|WatcherThread|ConcurrentGCThread|WorkerThread|GCTaskThread).*)$",
        parse_thread,
        &[
            "  0x00007f6838283800 JavaThread \"Service Thread\" daemon [_thread_blocked, id=1031, stack(0x00007f6822cd3000,0x00007f6822dd4000)]",
            "=>0x00007f68380cb000 JavaThread \"main\" [_thread_in_native, id=1014, stack(0x00007f683d0d8000,0x00007f683d1d9000)]",
            "  0x00007f6838279800 VMThread [stack: 0x00007f68230d8000,0x00007f68231d8000] [id=1028]",
        ],
        line!(),
    ),
    EPD!(
        EventKind::SectionMarker,
        r"^(Java Threads: \( => current thread \)|Other Threads:|Threads class SMR info:|=>None)$",
        parse_section_marker,
        &["Java Threads: ( => current thread )", "Other Threads:"],
        line!(),
    ),
    EPD!(
        EventKind::VmState,
        r"^VM state: ?(?P<state>.*)$",
        parse_vm_state,
        &["VM state:not at safepoint (normal execution)"],
        line!(),
    ),
    EPD!(
        EventKind::VmOperation,
        r"^VM_Operation \(0x[0-9a-f]+\): (?P<operation>.*)$",
        parse_vm_operation,
        &["VM_Operation (0x00007f93f1e45e90): G1IncCollectionPause, mode: safepoint, requested by thread 0x00007f93ec022800"],
        line!(),
    ),
    // more specific than the general region shapes below it; must stay
    // ahead of the heap generation entries
    EPD!(
        EventKind::HeapAddress,
        concatcp!(r"^heap address: ", CGP_ADDRESS, r", size: ", CGP_SIZE, r"B(, Compressed Oops mode: (?P<mode>.+))?$"),
        parse_heap_address,
        &[
            "heap address: 0x00000006c0000000, size: 4096 MB, Compressed Oops mode: Zero based, Oop shift amount: 3",
            "heap address: 0x00000003c0000000, size: 17408 MB",
        ],
        line!(),
    ),
    EPD!(
        EventKind::Heap,
        r"^Heap:$",
        parse_heap_header,
        &["Heap:"],
        line!(),
    ),
    EPD!(
        EventKind::Metaspace,
        r"^ {1,2}Metaspace +used (?P<used>\d+)(?P<usedunit>[bBkKmMgG]), (capacity (?P<capacity>\d+)(?P<capacityunit>[bBkKmMgG]), )?committed (?P<committed>\d+)(?P<committedunit>[bBkKmMgG]), reserved (?P<reserved>\d+)(?P<reservedunit>[bBkKmMgG])$",
        parse_metaspace,
        &[" Metaspace       used 20674K, capacity 21248K, committed 21424K, reserved 1069056K"],
        line!(),
    ),
    EPD!(
        EventKind::HeapRegion,
        concatcp!(r"^ {1,2}(?P<space>", RP_HEAP_GENERATION, r") +total (?P<size>\d+)(?P<unit>[bBkKmMgG]), used (?P<used>\d+)(?P<usedunit>[bBkKmMgG]) ", RP_REGION),
        parse_heap_region,
        &[
            " PSYoungGen      total 76288K, used 10158K [0x000000076b580000, 0x0000000770a80000, 0x00000007c0000000)",
            " ParOldGen       total 175104K, used 0K [0x00000006c0000000, 0x00000006cab00000, 0x000000076b580000)",
            " garbage-first heap   total 2097152K, used 103460K [0x0000000080000000, 0x0000000100000000)",
            " par new generation   total 153344K, used 4674K [0x00000006c0000000, 0x00000006ca660000, 0x00000006ca660000)",
            " concurrent mark-sweep generation total 8189952K, used 614051K [0x00000006ca660000, 0x00000008bc550000, 0x00000008bc550000)",
        ],
        line!(),
    ),
    EPD!(
        EventKind::HeapRegion,
        concatcp!(r"^ {2,3}(?P<space>", RP_HEAP_SPACE, r") +(used )?(?P<size>\d+)(?P<unit>[bBkKmMgG])[, ]"),
        parse_heap_subregion,
        &[
            "  eden space 65536K, 15% used [0x000000076b580000,0x000000076bf6b9e8,0x000000076f580000)",
            "  object space 175104K, 0% used [0x00000006c0000000,0x00000006c0000000,0x00000006cab00000)",
            "  class space    used 2283K, capacity 2422K, committed 2560K, reserved 1048576K",
            "  region size 1024K, 57 young (58368K), 4 survivors (4096K)",
        ],
        line!(),
    ),
    // the GC-heap-history `Event:` shape must precede the generic
    // `Event:` entry below
    EPD!(
        EventKind::GcHeapHistory,
        r"^(GC Heap History \(\d+ events?\):|Event: [\d.]+ GC heap (before|after)|\{?Heap (before|after) GC invocations=\d+.*)$",
        parse_gc_heap_history,
        &[
            "GC Heap History (2 events):",
            "Event: 0.317 GC heap before",
            "{Heap before GC invocations=1 (full 0):",
            "Heap after GC invocations=1 (full 0):",
        ],
        line!(),
    ),
    EPD!(
        EventKind::CompilationEvent,
        r"^Compilation events \(\d+ events?\):$",
        parse_compilation_events,
        &["Compilation events (10 events):"],
        line!(),
    ),
    EPD!(
        EventKind::DeoptimizationEvent,
        r"^Deoptimization events \(\d+ events?\):$",
        parse_deoptimization_events,
        &["Deoptimization events (0 events):"],
        line!(),
    ),
    EPD!(
        EventKind::InternalExceptionEvent,
        r"^Internal exceptions \(\d+ events?\):$",
        parse_internal_exceptions,
        &["Internal exceptions (10 events):"],
        line!(),
    ),
    EPD!(
        EventKind::VmEvent,
        r"^Event: (?P<text>[\d.]+ .*)$",
        parse_vm_event,
        &[
            "Event: 0.420 Thread 0x00007f6838283800 164   3       java.lang.String::lastIndexOf (52 bytes)",
            "Event: 0.100 Thread 0x00007f68380cb000 Exception <a 'java/lang/NoSuchMethodError'> (0x000000076bf2b8d8) thrown at [sharedRuntime.cpp, line 834]",
        ],
        line!(),
    ),
    EPD!(
        EventKind::SectionMarker,
        r"^((Events|Classes unloaded|Classes redefined|Memory protections) \(\d+ events?\):|No events|\})$",
        parse_section_marker,
        &["Events (10 events):", "No events", "}"],
        line!(),
    ),
    EPD!(
        EventKind::DynamicLibrary,
        concatcp!(r"^[0-9a-f]{8,16}-[0-9a-f]{8,16} [rwxps-]{4} [0-9a-f]{8} [0-9a-f:]+ \d+( +", CGP_PATH, r")?$"),
        parse_dynamic_library,
        &[
            "7f68383b5000-7f68383c4000 r-xp 00000000 fd:00 135128578                  /usr/lib/jvm/java-1.8.0-openjdk-1.8.0.222.b10-0.el7_6.x86_64/jre/lib/amd64/libzip.so",
            "00400000-00401000 r-xp 00000000 fd:00 135656021                          /usr/lib/jvm/java-1.8.0-openjdk-1.8.0.222.b10-0.el7_6.x86_64/jre/bin/java",
            "7ffd1d1ff000-7ffd1d201000 r-xp 00000000 00:00 0",
        ],
        line!(),
    ),
    EPD!(
        EventKind::DynamicLibrary,
        r"^0x[0-9a-f]+ - 0x[0-9a-f]+ \t(?P<path>[A-Za-z]:\\.*)$",
        parse_dynamic_library,
        &["0x00007ff77b650000 - 0x00007ff77b65d000 \tC:\\Program Files\\Java\\jdk-11.0.4\\bin\\java.exe"],
        line!(),
    ),
    EPD!(
        EventKind::VmArguments,
        r"^(?P<key>jvm_args|java_command|java_class_path \(initial\)|Launcher Type): ?(?P<value>.*)$",
        parse_vm_arguments,
        &[
            "jvm_args: -Xmx4096m -Xms4096m -XX:+UseG1GC",
            "java_command: org.example.Main --config /etc/example.yml",
            "java_class_path (initial): .",
            "Launcher Type: SUN_STANDARD",
        ],
        line!(),
    ),
    EPD!(
        EventKind::EnvironmentVariable,
        r"^(?P<name>PATH|LD_LIBRARY_PATH|JAVA_HOME|JRE_HOME|CLASSPATH|JAVA_TOOL_OPTIONS|_JAVA_OPTIONS|SHELL|DISPLAY|HOSTTYPE|OSTYPE|ARCH|MACHTYPE|LANG|TZ|TMPDIR|USERNAME)=(?P<value>.*)$",
        parse_environment_variable,
        &[
            "PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin",
            "JAVA_HOME=/usr/lib/jvm/java-1.8.0-openjdk-1.8.0.222.b10-0.el7_6.x86_64",
            "LANG=en_US.UTF-8",
        ],
        line!(),
    ),
    EPD!(
        EventKind::OsInfo,
        r"^OS: ?(?P<os>.+)$",
        parse_os_info,
        &[
            "OS:Red Hat Enterprise Linux Server release 7.7 (Maipo)",
            "OS: Windows Server 2016 , 64 bit Build 14393 (10.0.14393.3204)",
        ],
        line!(),
    ),
    // distro release printed on its own line under a bare `OS:`
    EPD!(
        EventKind::OsInfo,
        r"^(?P<os>(Red Hat Enterprise Linux|CentOS|Oracle Linux|Fedora).* release .*)$",
        parse_os_info,
        &["Red Hat Enterprise Linux Server release 6.10 (Santiago)"],
        line!(),
    ),
    EPD!(
        EventKind::OsUptime,
        r"^OS uptime: ?(?P<uptime>.*)$",
        parse_os_uptime,
        &["OS uptime: 5 days 2:57 hours"],
        line!(),
    ),
    EPD!(
        EventKind::Uname,
        r"^uname: ?(?P<uname>.*)$",
        parse_uname,
        &["uname:Linux 3.10.0-1062.el7.x86_64 #1 SMP Wed Aug 7 18:08:02 UTC 2019 x86_64"],
        line!(),
    ),
    EPD!(
        EventKind::Rlimit,
        r"^rlimit( \(soft/hard\))?: STACK +(?P<stack>\d+k|infinity)(/\S+)?, CORE (?P<core>\d+k|infinity)(/\S+)?, NPROC (?P<nproc>\d+|infinity)(/\S+)?, NOFILE (?P<nofile>\d+|infinity)(/\S+)?, AS (\d+k?|infinity)(/\S+)?.*$",
        parse_rlimit,
        &[
            "rlimit: STACK 8192k, CORE 0k, NPROC 30000, NOFILE 4096, AS infinity",
            "rlimit (soft/hard): STACK 8192k/infinity, CORE 0k/infinity, NPROC 4096/30593, NOFILE 1024/262144, AS infinity/infinity",
        ],
        line!(),
    ),
    EPD!(
        EventKind::CpuInfo,
        r"^CPU: ?total (?P<total>\d+) .*$",
        parse_cpu_info,
        &["CPU:total 4 (initial active 4) (4 cores per cpu, 1 threads per core) family 6 model 85 stepping 4, cmov, cx8, fxsr, mmx, sse, sse2, sse3, ssse3, sse4.1, sse4.2, popcnt, avx, avx2, aes, clmul, erms, rtm, 3dnowpref, lzcnt, ht, tsc, bmi1, bmi2, adx"],
        line!(),
    ),
    EPD!(
        EventKind::ContainerInfo,
        r"^(?P<key>container_type|cpu_cpuset_cpus|cpu_memory_nodes|active_processor_count|cpu_quota|cpu_period|cpu_shares|memory_limit_in_bytes|memory_and_swap_limit_in_bytes|memory_soft_limit_in_bytes|memory_usage_in_bytes|memory_max_usage_in_bytes|maximum number of tasks|current number of tasks): ?(?P<value>.*)$",
        parse_container_info,
        &[
            "container_type: cgroupv1",
            "memory_limit_in_bytes: 2147483648",
            "active_processor_count: 4",
        ],
        line!(),
    ),
    EPD!(
        EventKind::Memory,
        r"^Memory: (?P<page>\d+)(?P<pageunit>[bBkKmMgG]) page, physical (?P<physical>\d+)(?P<physicalunit>[bBkKmMgG])\((?P<free>\d+)(?P<freeunit>[bBkKmMgG]) free\)(, swap (?P<swap>\d+)(?P<swapunit>[bBkKmMgG])\((?P<swapfree>\d+)(?P<swapfreeunit>[bBkKmMgG]) free\))?$",
        parse_memory,
        &[
            "Memory: 4k page, physical 16266940k(14849760k free), swap 8257532k(8257532k free)",
            "Memory: 4k page, physical 16058700k(1456096k free)",
        ],
        line!(),
    ),
    EPD!(
        EventKind::MemInfo,
        r"^(?P<key>MemTotal|MemFree|MemAvailable|Buffers|Cached|SwapCached|SwapTotal|SwapFree|Dirty|AnonPages|Mapped|Shmem|Slab|CommitLimit|Committed_AS|VmallocTotal|VmallocUsed|HugePages_Total|HugePages_Free|Hugepagesize): +(?P<size>\d+) kB$",
        parse_meminfo,
        &[
            "MemTotal:       16266940 kB",
            "SwapFree:        8257532 kB",
        ],
        line!(),
    ),
    EPD!(
        EventKind::VmInfo,
        r"^vm_info: (?P<text>.+)$",
        parse_vm_info,
        &[
            "vm_info: OpenJDK 64-Bit Server VM (25.222-b10) for linux-amd64 JRE (1.8.0_222-b10), built on Jul 11 2019 03:35:33 by \"mockbuild\" with gcc 4.8.5 20150623 (Red Hat 4.8.5-36)",
            "vm_info: OpenJDK 64-Bit Server VM (11.0.4+11-LTS) for linux-amd64 JRE (11.0.4+11-LTS), built on Jul  9 2019 10:18:43 by \"mockbuild\" with gcc 4.8.5 20150623 (Red Hat 4.8.5-39)",
        ],
        line!(),
    ),
    EPD!(
        EventKind::CrashTime,
        concatcp!(r"^time: ", CGP_CRASHTIME, r"$"),
        parse_crash_time,
        &["time: Tue Aug  6 07:06:40 2019"],
        line!(),
    ),
    EPD!(
        EventKind::TimeElapsedTime,
        concatcp!(r"^Time: ", CGP_CRASHTIME, r"( [A-Z]{1,5})? elapsed time: (?P<elapsed>[\d.]+) seconds.*$"),
        parse_time_elapsed,
        &["Time: Mon Sep  2 14:34:34 2019 CEST elapsed time: 89.192546 seconds (0d 0h 1m 29s)"],
        line!(),
    ),
    EPD!(
        EventKind::ElapsedTime,
        r"^elapsed time: (?P<elapsed>[\d.]+) seconds.*$",
        parse_elapsed_time,
        &["elapsed time: 0.926444 seconds (0d 0h 0m 0s)"],
        line!(),
    ),
    EPD!(
        EventKind::ExceptionCounts,
        r"^OutOfMemory and StackOverflow Exception counts:$",
        parse_exception_counts_header,
        &["OutOfMemory and StackOverflow Exception counts:"],
        line!(),
    ),
    EPD!(
        EventKind::ExceptionCounts,
        r"^(?P<label>OutOfMemoryError \w+|StackOverflowErrors|LinkageErrors)=(?P<count>\d+)$",
        parse_exception_count,
        &[
            "OutOfMemoryError java_heap_errors=13",
            "StackOverflowErrors=267",
        ],
        line!(),
    ),
    EPD!(
        EventKind::Host,
        r"^Host: ?(?P<host>.*)$",
        parse_host,
        &["Host: Intel(R) Xeon(R) CPU E5-2680 v4 @ 2.40GHz, 8 cores, 31G, Red Hat Enterprise Linux Server release 7.7 (Maipo)"],
        line!(),
    ),
];

/// Number of entries in [`EVENT_PARSE_DATAS_TAIL`].
pub const EVENT_PARSE_DATAS_TAIL_LEN: usize = 8;

/// General shapes tried only after every entry in
/// [`EVENT_PARSE_DATAS`] has failed: NMT lines, the most-general
/// structural markers, the bare-letter stack frame, and blank lines.
pub const EVENT_PARSE_DATAS_TAIL: [EventParseInstr; EVENT_PARSE_DATAS_TAIL_LEN] = [
    EPD!(
        EventKind::NativeMemoryTracking,
        r"^Total: reserved=(?P<reserved>\d+)KB, committed=(?P<committed>\d+)KB$",
        parse_nmt_total,
        &["Total: reserved=18691491KB, committed=17114771KB"],
        line!(),
    ),
    EPD!(
        EventKind::NativeMemoryTracking,
        r"^- +(?P<category>[A-Za-z][A-Za-z ]*?) \(reserved=(?P<reserved>\d+)KB, committed=(?P<committed>\d+)KB\)$",
        parse_nmt_category,
        &[
            "-                 Java Heap (reserved=16777216KB, committed=16777216KB)",
            "-                    Thread (reserved=21020KB, committed=21020KB)",
        ],
        line!(),
    ),
    EPD!(
        EventKind::SectionMarker,
        r"^(Native Memory Tracking:|Dynamic libraries:|VM Arguments:|Environment Variables:|Signal Handlers:|SIG[A-Z0-9]+: \[.*|Top of Stack: \(sp=0x[0-9a-f]+\)|Register to memory mapping:|Stack slot to memory mapping:|Polling page: 0x[0-9a-f]+|Card table byte_map: .*|Marking Bits: .*|Narrow klass base: .*|CodeCache: .*|VM Mutex/Monitor currently owned by a thread:.*|container \(cgroup\) information:|/proc/meminfo:|/proc/cpuinfo:|libc: ?.*|load average: ?.*|timezone: ?.*|CPU Model and flags from /proc/cpuinfo:|Logging:|Log output configuration:|END\.)$",
        parse_section_marker,
        &[
            "Native Memory Tracking:",
            "Dynamic libraries:",
            "VM Arguments:",
            "Environment Variables:",
            "Signal Handlers:",
            "SIGSEGV: [libjvm.so+0xacd9a0], sa_mask[0]=11111111011111111101111111111110, sa_flags=SA_RESTART|SA_SIGINFO",
            "Top of Stack: (sp=0x00007f683d1d6b50)",
            "Register to memory mapping:",
            "Polling page: 0x00007f683d20a000",
            "CodeCache: size=245760Kb used=4002Kb max_used=4011Kb free=241757Kb",
            "VM Mutex/Monitor currently owned by a thread: None",
            "container (cgroup) information:",
            "/proc/meminfo:",
            "libc:glibc 2.17 NPTL 2.17",
            "load average:0.38 0.35 0.54",
            "timezone: UTC",
            "END.",
        ],
        line!(),
    ),
    // cpuinfo detail lines; recognized so they do not pollute the
    // unidentified list
    EPD!(
        EventKind::SectionMarker,
        r"^(processor|vendor_id|cpu family|model name|model|stepping|microcode|cpu MHz|cache size|flags|bogomips|address sizes)\s*:.*$",
        parse_section_marker,
        &[
            "model name	: Intel(R) Xeon(R) CPU E5-2680 v4 @ 2.40GHz",
            "cpu MHz		: 2397.222",
        ],
        line!(),
    ),
    // a stack frame is the most general word-anchored shape; it must
    // stay behind everything above
    EPD!(
        EventKind::StackFrame,
        r"^(?P<frametype>[CJjVv]) {1,2}(?P<frame>[^ ].*)$",
        parse_stack_frame,
        &[
            "C  [libzip.so+0x4f54]",
            "V  [libjvm.so+0x68d466]",
            "J 1234 C2 java.util.zip.ZipFile.getEntry(J[BZ)J (0 bytes) @ 0x00007f68251fb9a3 [0x00007f68251fb940+0x63]",
            "j  java.util.zip.ZipFile.getEntry(Ljava/lang/String;)Ljava/util/zip/ZipEntry;+31",
            "v  ~StubRoutines::call_stub",
        ],
        line!(),
    ),
    // JDK 11 prints `Current thread is native thread` with no pointer
    EPD!(
        EventKind::CurrentThread,
        r"^Current thread is (?P<thread>.*)$",
        parse_current_thread,
        &["Current thread is native thread"],
        line!(),
    ),
    EPD!(
        EventKind::SectionMarker,
        r"^(Heap address: .*|Compressed class space .*|Narrow klass range: .*|GC Precious Log:|CDS archive\(s\) .*)$",
        parse_section_marker,
        &["Compressed class space size: 1073741824 Address: 0x00000007c0000000"],
        line!(),
    ),
    EPD!(
        EventKind::BlankLine,
        r"^\s*$",
        parse_blank,
        &["", "   "],
        line!(),
    ),
];

lazy_static! {
    /// Run-time compiled regexes for [`EVENT_PARSE_DATAS`] followed by
    /// [`EVENT_PARSE_DATAS_TAIL`], in classification order.
    pub(crate) static ref EVENT_PARSE_DATAS_REGEX_VEC: Vec<Regex> = EVENT_PARSE_DATAS
        .iter()
        .chain(EVENT_PARSE_DATAS_TAIL.iter())
        .map(|x| Regex::new(x.regex_pattern).unwrap())
        .collect();
}

/// Entry at classification-order `index` across the primary table and
/// the tail table.
pub fn instr_at(index: usize) -> &'static EventParseInstr {
    if index < EVENT_PARSE_DATAS_LEN {
        &EVENT_PARSE_DATAS[index]
    } else {
        &EVENT_PARSE_DATAS_TAIL[index - EVENT_PARSE_DATAS_LEN]
    }
}

/// Total number of classifier entries.
pub const EVENT_PARSE_DATAS_TOTAL_LEN: usize = EVENT_PARSE_DATAS_LEN + EVENT_PARSE_DATAS_TAIL_LEN;

/// Index of the first entry whose regex matches `line`, in
/// classification order. `None` means the line is unidentified.
pub fn classify_index(line: &str) -> Option<usize> {
    for (index, regex) in EVENT_PARSE_DATAS_REGEX_VEC.iter().enumerate() {
        if regex.is_match(line) {
            return Some(index);
        }
    }
    None
}

/// Classify one raw line. Unmatched input is a normal, expected
/// outcome (`EventKind::Unknown`), not a failure.
pub fn classify(line: &str) -> EventKind {
    match classify_index(line) {
        Some(index) => instr_at(index).kind,
        None => EventKind::Unknown,
    }
}

/// Classify and parse one raw line into a typed [`Event`].
pub fn parse_line(line: &str) -> Event {
    for (index, regex) in EVENT_PARSE_DATAS_REGEX_VEC.iter().enumerate() {
        if let Some(caps) = regex.captures(line) {
            let instr: &EventParseInstr = instr_at(index);
            let event: Event = (instr.parse)(&caps, line);
            defñ!("({:?}) index {} kind {:?}", line, index, instr.kind);
            debug_assert_eq!(event.kind(), instr.kind, "entry at line {} produced a mismatched event kind", instr._line_num);
            return event;
        }
    }
    defñ!("({:?}) Unknown", line);
    Event::Unknown {
        text: line.to_string(),
    }
}
