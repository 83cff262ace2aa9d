// src/tests/analysis_tests.rs

//! Tests for `analysis/mod.rs`.

use crate::analysis::{run_analysis, Finding, FindingCode, Severity};
use crate::data::classifier::parse_line;
use crate::data::event::Event;
use crate::data::model::CrashModel;

fn model_from_lines(lines: &[&str]) -> CrashModel {
    let mut model: CrashModel = CrashModel::new();
    for line in lines.iter() {
        model.absorb(parse_line(line));
    }
    model
}

fn codes(findings: &[Finding]) -> Vec<FindingCode> {
    findings.iter().map(|f| f.code).collect()
}

fn has_code(
    findings: &[Finding],
    code: FindingCode,
) -> bool {
    findings.iter().any(|f| f.code == code)
}

#[test]
fn test_empty_model_yields_no_findings() {
    let model: CrashModel = CrashModel::new();
    assert!(run_analysis(&model).is_empty());
}

#[test]
fn test_severity_from_code_first_segment() {
    assert_eq!(Severity::Warn, Severity::from_code("warn.log.unidentified-lines"));
    assert_eq!(Severity::Error, Severity::from_code("error.signal.segv-maperr"));
    assert_eq!(Severity::Info, Severity::from_code("info.memory.swapping"));
    assert_eq!(Severity::Info, Severity::from_code("nonsense"));
}

#[test]
fn test_unidentified_lines_finding_is_first() {
    let mut model: CrashModel = model_from_lines(&[
        "siginfo: si_signo: 11 (SIGSEGV), si_code: 1 (SEGV_MAPERR), si_addr: 0x0000000000000000",
    ]);
    model.absorb(Event::Unknown {
        text: "???".to_string(),
    });
    let findings: Vec<Finding> = run_analysis(&model);
    assert_eq!(FindingCode::UnidentifiedLines, findings[0].code);
    assert_eq!(Severity::Warn, findings[0].severity);
    assert!(findings[0].message.contains('1'));
}

#[test]
fn test_signal_rules() {
    for (line, expect) in [
        (
            "siginfo: si_signo: 11 (SIGSEGV), si_code: 1 (SEGV_MAPERR), si_addr: 0x0000000000000000",
            FindingCode::SegvMaperr,
        ),
        (
            "siginfo: si_signo: 11 (SIGSEGV), si_code: 2 (SEGV_ACCERR), si_addr: 0x00007f1874edb000",
            FindingCode::SegvAccerr,
        ),
        (
            "siginfo: si_signo: 7 (SIGBUS), si_code: 2 (BUS_ADRERR), si_addr: 0x00007f1874edb000",
            FindingCode::BusAdrerr,
        ),
        (
            "siginfo: si_signo: 7 (SIGBUS), si_code: 1 (BUS_ADRALN), si_addr: 0x00007f1874edb001",
            FindingCode::BusAdraln,
        ),
    ] {
        let model: CrashModel = model_from_lines(&[line]);
        let findings: Vec<Finding> = run_analysis(&model);
        assert!(has_code(&findings, expect), "line {:?} expected {:?}, got {:?}", line, expect, codes(&findings));
    }
}

#[test]
fn test_heap_plus_metaspace_exceeds_physical() {
    let model: CrashModel = model_from_lines(&[
        "Memory: 4k page, physical 2097152k(131072k free)",
        " PSYoungGen      total 1048576K, used 1000000K [0x000000076b580000, 0x0000000770a80000, 0x00000007c0000000)",
        " ParOldGen       total 1048576K, used 900000K [0x00000006c0000000, 0x00000006cab00000, 0x000000076b580000)",
        " Metaspace       used 20674K, capacity 21248K, committed 102400K, reserved 1069056K",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(has_code(&findings, FindingCode::HeapPlusMetaspaceGtPhysical), "got {:?}", codes(&findings));
}

#[test]
fn test_heap_within_physical_no_finding() {
    let model: CrashModel = model_from_lines(&[
        "Memory: 4k page, physical 16266940k(14849760k free)",
        " PSYoungGen      total 76288K, used 10158K [0x000000076b580000, 0x0000000770a80000, 0x00000007c0000000)",
        " Metaspace       used 20674K, capacity 21248K, committed 21424K, reserved 1069056K",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(!has_code(&findings, FindingCode::HeapPlusMetaspaceGtPhysical));
}

#[test]
fn test_oom_startup_with_nproc_at_ceiling() {
    let model: CrashModel = model_from_lines(&[
        "# There is insufficient memory for the Java Runtime Environment to continue.",
        "# Cannot create GC thread. Out of system resources.",
        "rlimit: STACK 8192k, CORE 0k, NPROC 4096, NOFILE 4096, AS infinity",
        "elapsed time: 2.134 seconds (0d 0h 0m 2s)",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(has_code(&findings, FindingCode::OomStartupNprocLimit), "got {:?}", codes(&findings));
}

/// A finite `NPROC` is printed on every Linux `rlimit:` line; without
/// thread pressure or a thread-creation failure it is not a finding.
#[test]
fn test_oom_startup_nproc_not_binding() {
    let model: CrashModel = model_from_lines(&[
        "# There is insufficient memory for the Java Runtime Environment to continue.",
        "rlimit: STACK 8192k, CORE 0k, NPROC 30000, NOFILE 4096, AS infinity",
        "elapsed time: 2.134 seconds (0d 0h 0m 2s)",
        "  0x00007f68380cb000 JavaThread \"main\" [_thread_in_native, id=1014, stack(0x00007f683d0d8000,0x00007f683d1d9000)]",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(!has_code(&findings, FindingCode::OomStartupNprocLimit), "got {:?}", codes(&findings));
}

/// Thread count at the `NPROC` ceiling fires the rule even when the
/// header lacks an explicit thread-creation failure line.
#[test]
fn test_oom_startup_thread_count_at_nproc_ceiling() {
    let mut model: CrashModel = model_from_lines(&[
        "# There is insufficient memory for the Java Runtime Environment to continue.",
        "rlimit: STACK 8192k, CORE 0k, NPROC 10, NOFILE 4096, AS infinity",
        "elapsed time: 2.134 seconds (0d 0h 0m 2s)",
    ]);
    for n in 0..9 {
        model.absorb(Event::Thread {
            line: format!("JavaThread \"worker-{}\" daemon [_thread_blocked, id={}]", n, 1000 + n),
        });
    }
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(has_code(&findings, FindingCode::OomStartupNprocLimit), "got {:?}", codes(&findings));
}

#[test]
fn test_known_bug_bufferblob() {
    let model: CrashModel = model_from_lines(&[
        "v  ~BufferBlob::flush_icache_stub",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(has_code(&findings, FindingCode::BufferBlobFlushIcache));
}

#[test]
fn test_known_bug_libzip_deflate() {
    let model: CrashModel = model_from_lines(&[
        "C  [libzip.so+0x4f54]  deflate+0x64",
        "J 1234 java.util.zip.Deflater.deflateBytes(J[BIII)I (0 bytes)",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(has_code(&findings, FindingCode::LibzipDeflate));
}

#[test]
fn test_swap_findings() {
    // swap present and in use
    let model: CrashModel = model_from_lines(&[
        "Memory: 4k page, physical 16266940k(14849760k free), swap 8257532k(4128766k free)",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(has_code(&findings, FindingCode::Swapping));

    // swap disabled
    let model: CrashModel = model_from_lines(&[
        "Memory: 4k page, physical 16266940k(14849760k free), swap 0k(0k free)",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(has_code(&findings, FindingCode::SwapDisabled));

    // swap present, unused: neither finding
    let model: CrashModel = model_from_lines(&[
        "Memory: 4k page, physical 16266940k(14849760k free), swap 8257532k(8257532k free)",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(!has_code(&findings, FindingCode::Swapping));
    assert!(!has_code(&findings, FindingCode::SwapDisabled));
}

#[test]
fn test_jdk_not_latest_with_staleness_magnitude() {
    let model: CrashModel = model_from_lines(&[
        "OS:Red Hat Enterprise Linux Server release 7.7 (Maipo)",
        "uname:Linux 3.10.0-1062.el7.x86_64 #1 SMP Wed Aug 7 18:08:02 UTC 2019 x86_64",
        "7f68370c8000-7f6837d66000 r-xp 00000000 fd:00 135128576                  /usr/lib/jvm/java-1.8.0-openjdk-1.8.0.222.b10-0.el7_6.x86_64/jre/lib/amd64/server/libjvm.so",
        "vm_info: OpenJDK 64-Bit Server VM (25.222-b10) for linux-amd64 JRE (1.8.0_222-b10), built on Jul 11 2019 03:35:33 by \"mockbuild\" with gcc 4.8.5 20150623 (Red Hat 4.8.5-36)",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    let not_latest: Vec<&Finding> = findings
        .iter()
        .filter(|f| f.code == FindingCode::JdkNotLatest)
        .collect();
    assert_eq!(1, not_latest.len(), "got {:?}", codes(&findings));
    // 8u222 is one release behind 8u232 in the el7 channel
    assert!(not_latest[0].message.contains("1.8.0_222-b10"));
    assert!(not_latest[0].message.contains("1.8.0_232-b09"));
    assert!(not_latest[0].message.contains("1 release(s)"));
}

#[test]
fn test_jdk_latest_no_finding() {
    let model: CrashModel = model_from_lines(&[
        "OS:Red Hat Enterprise Linux Server release 7.7 (Maipo)",
        "uname:Linux 3.10.0-1062.el7.x86_64 #1 SMP Wed Aug 7 18:08:02 UTC 2019 x86_64",
        "7f68370c8000-7f6837d66000 r-xp 00000000 fd:00 135128576                  /usr/lib/jvm/java-1.8.0-openjdk-1.8.0.232.b09-0.el7_7.x86_64/jre/lib/amd64/server/libjvm.so",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(!has_code(&findings, FindingCode::JdkNotLatest), "got {:?}", codes(&findings));
}

#[test]
fn test_jdk_old_release() {
    let model: CrashModel = model_from_lines(&[
        "vm_info: OpenJDK 64-Bit Server VM (25.111-b15) for linux-amd64 JRE (1.8.0_111-b15), built on Oct 21 2016 08:21:41 by \"mockbuild\" with gcc 4.8.5",
        "time: Tue Aug  6 07:06:40 2019",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(has_code(&findings, FindingCode::JdkOldRelease), "got {:?}", codes(&findings));
}

#[test]
fn test_jdk_not_lts() {
    let model: CrashModel = model_from_lines(&[
        "vm_info: OpenJDK 64-Bit Server VM (13+33) for linux-amd64 JRE (13.0.1+9), built on Oct 16 2019 10:00:00 by \"builder\" with gcc 9.2",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(has_code(&findings, FindingCode::JdkNotLts), "got {:?}", codes(&findings));
}

#[test]
fn test_os_eol() {
    let model: CrashModel = model_from_lines(&[
        "Red Hat Enterprise Linux Server release 6.10 (Santiago)",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(has_code(&findings, FindingCode::OsEol));

    let model: CrashModel = model_from_lines(&[
        "OS:Red Hat Enterprise Linux Server release 7.7 (Maipo)",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(!has_code(&findings, FindingCode::OsEol));
}

#[test]
fn test_provenance_rh_rpm() {
    let model: CrashModel = model_from_lines(&[
        "7f68370c8000-7f6837d66000 r-xp 00000000 fd:00 135128576                  /usr/lib/jvm/java-1.8.0-openjdk-1.8.0.222.b10-0.el7_6.x86_64/jre/lib/amd64/server/libjvm.so",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(has_code(&findings, FindingCode::RhBuildRpm));
}

#[test]
fn test_provenance_vendor_unknown() {
    let model: CrashModel = model_from_lines(&[
        "7f68370c8000-7f6837d66000 r-xp 00000000 fd:00 135128576                  /opt/some-jdk/lib/server/libjvm.so",
    ]);
    let findings: Vec<Finding> = run_analysis(&model);
    assert!(has_code(&findings, FindingCode::VendorUnknown));
}

/// The engine is deterministic: repeated runs over the same sealed
/// model produce identical findings.
#[test]
fn test_run_analysis_idempotent() {
    let model: CrashModel = model_from_lines(&[
        "siginfo: si_signo: 11 (SIGSEGV), si_code: 1 (SEGV_MAPERR), si_addr: 0x0000000000000000",
        "Memory: 4k page, physical 16266940k(14849760k free), swap 0k(0k free)",
        "7f68370c8000-7f6837d66000 r-xp 00000000 fd:00 135128576                  /usr/lib/jvm/java-1.8.0-openjdk-1.8.0.222.b10-0.el7_6.x86_64/jre/lib/amd64/server/libjvm.so",
    ]);
    let first: Vec<Finding> = run_analysis(&model);
    let second: Vec<Finding> = run_analysis(&model);
    assert_eq!(first, second);
}
