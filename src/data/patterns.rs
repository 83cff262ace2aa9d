// src/data/patterns.rs

//! Named capture-group regular expression fragments shared by the
//! line classifier table in [`classifier`] and ad hoc matching in the
//! [`CrashModel`] derive functions.
//!
//! These are pure data. Fragments are composed into full line patterns
//! with [`const_format::concatcp!`].
//!
//! [`classifier`]: crate::data::classifier
//! [`CrashModel`]: crate::data::model::CrashModel

/// Regular expression capture group name, for later retrieval via
/// [`regex::Captures::name`].
pub type CaptureGroupName = str;

/// Regular expression capture group pattern, composed into a
/// [`RegexPattern`].
pub type CaptureGroupPattern = str;

/// A full regular expression, passed to [`regex::Regex::new`].
pub type RegexPattern = str;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// capture group names
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const CGN_ADDRESS: &CaptureGroupName = "address";
pub const CGN_PATH: &CaptureGroupName = "path";
pub const CGN_RELEASE: &CaptureGroupName = "release";
pub const CGN_TIMESTAMP: &CaptureGroupName = "timestamp";
pub const CGN_RPMDIR: &CaptureGroupName = "rpmdir";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// capture group patterns
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A hexadecimal memory address as printed by the JVM,
/// e.g. `0x00007f68383b9f54`.
pub const CGP_ADDRESS: &CaptureGroupPattern = r"(?P<address>0x[0-9a-f]+)";

/// A memory address without the capture group, for patterns that carry
/// several addresses on one line.
pub const RP_ADDRESS: &RegexPattern = r"0x[0-9a-f]+";

/// A half-open or closed memory region, e.g.
/// `[0x00000006c0000000, 0x00000006cab00000, 0x000000076b580000)`.
pub const RP_REGION: &RegexPattern = r"\[0x[0-9a-f]+, ?0x[0-9a-f]+(, ?0x[0-9a-f]+)?[\)\]]";

/// A byte quantity with unit suffix, e.g. `8192k`, `512K`, `4096 MB`.
/// The unit steps by 1024, never 1000; see [`size`].
///
/// [`size`]: crate::data::size
pub const CGP_SIZE: &CaptureGroupPattern = r"(?P<size>\d+) ?(?P<unit>[bBkKmMgG])";

/// An absolute POSIX file path.
pub const CGP_PATH: &CaptureGroupPattern = r"(?P<path>/[^\s]+)";

/// A JDK release version string; both the JDK 8 shape `1.8.0_222-b10`
/// and the JDK 9+ shape `11.0.4+11-LTS` are accepted.
pub const CGP_RELEASE: &CaptureGroupPattern =
    r"(?P<release>(1\.\d\.0_\d+-b\d+|\d\d?\.\d+\.\d+(\.\d+)?\+\d+(-LTS)?(-ea)?))";

/// A JVM build timestamp, e.g. `Jul 11 2019 03:35:33`.
/// The day may be one or two digits and single-digit days are often
/// padded with a second space (`Jul  9 2019 ...`).
pub const CGP_TIMESTAMP: &CaptureGroupPattern =
    r"(?P<timestamp>(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec) {1,2}\d{1,2} \d{4} \d{2}:\d{2}:\d{2})";

/// A crash timestamp from the `time:` line,
/// e.g. `Tue Aug  6 07:06:40 2019`.
pub const CGP_CRASHTIME: &CaptureGroupPattern =
    r"(?P<timestamp>(Mon|Tue|Wed|Thu|Fri|Sat|Sun) (Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec) {1,2}\d{1,2} \d{2}:\d{2}:\d{2} \d{4})";

/// A Red Hat build of OpenJDK rpm directory name, e.g.
/// `java-1.8.0-openjdk-1.8.0.222.b10-0.el7_6.x86_64` or
/// `java-11-openjdk-11.0.4.11-0.el7_6.x86_64`.
pub const CGP_RPMDIR: &CaptureGroupPattern =
    r"(?P<rpmdir>java-(1\.8\.0|11)-openjdk-[^/]+\.el\d(_\d+)?\.(x86_64|ppc64|ppc64le|s390x|aarch64))";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// non-capturing fragments
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The fatal error signal names the JVM prints in the header.
pub const RP_SIGNAME: &RegexPattern = r"(SIGSEGV|SIGBUS|SIGILL|SIGFPE|EXCEPTION_ACCESS_VIOLATION|EXCEPTION_STACK_OVERFLOW)";

/// Top-level heap generation names across the collectors modeled here
/// (Parallel, CMS, G1, Serial, Shenandoah).
pub const RP_HEAP_GENERATION: &RegexPattern = "(PSYoungGen|ParOldGen|par new generation|concurrent mark-sweep generation|garbage-first heap|def new generation|tenured generation|Shenandoah heap)";

/// Subordinate heap space names that appear indented under a generation.
pub const RP_HEAP_SPACE: &RegexPattern =
    "(eden space|from space|to space|object space|the space|class space|region size)";
