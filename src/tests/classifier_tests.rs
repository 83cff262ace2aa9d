// src/tests/classifier_tests.rs

//! Tests for `data/classifier.rs`.
//!
//! The first test is the load-bearing one: every entry's hardcoded
//! test lines must classify to that entry and no earlier one, which
//! pins the priority order of the whole dispatch table.

use ::more_asserts::assert_lt;
use ::test_case::test_case;

use crate::data::classifier::{
    classify,
    classify_index,
    instr_at,
    parse_line,
    EVENT_PARSE_DATAS_TOTAL_LEN,
};
use crate::data::event::{Event, EventKind};
use crate::data::size::BYTES_PER_KIB;

/// Every entry's `_test_lines` must classify back to that same entry.
/// A failure here means an earlier, more general entry shadows a later
/// one, i.e. the priority order is broken.
#[test]
fn test_event_parse_datas_test_lines_classify_to_own_entry() {
    for index in 0..EVENT_PARSE_DATAS_TOTAL_LEN {
        let instr = instr_at(index);
        assert!(
            !instr._test_lines.is_empty(),
            "entry {} (declared line {}) has no test lines",
            index,
            instr._line_num,
        );
        for test_line in instr._test_lines.iter() {
            let classified: Option<usize> = classify_index(test_line);
            assert_eq!(
                Some(index),
                classified,
                "test line of entry {} (kind {:?}, declared line {}) classified to entry {:?}; line {:?}",
                index,
                instr.kind,
                instr._line_num,
                classified,
                test_line,
            );
        }
    }
}

/// `parse_line` must produce an event of the entry's declared kind for
/// every test line.
#[test]
fn test_event_parse_datas_test_lines_parse_to_declared_kind() {
    for index in 0..EVENT_PARSE_DATAS_TOTAL_LEN {
        let instr = instr_at(index);
        for test_line in instr._test_lines.iter() {
            let event: Event = parse_line(test_line);
            assert_eq!(
                instr.kind,
                event.kind(),
                "entry {} (declared line {}) test line {:?}",
                index,
                instr._line_num,
                test_line,
            );
        }
    }
}

#[test_case(""; "empty")]
#[test_case("complete garbage"; "prose")]
#[test_case("   leading blanks then garbage"; "indented prose")]
#[test_case("0xNOTHEX: zz zz"; "bad hexdump")]
fn test_classify_unknown(line: &str) {
    // an entirely blank line is BlankLine, not Unknown
    if line.is_empty() {
        assert_eq!(EventKind::BlankLine, classify(line));
        return;
    }
    assert_eq!(EventKind::Unknown, classify(line));
}

#[test]
fn test_parse_siginfo_fields() {
    let event: Event = parse_line(
        "siginfo: si_signo: 11 (SIGSEGV), si_code: 1 (SEGV_MAPERR), si_addr: 0x0000000000000000",
    );
    match event {
        Event::SigInfo(data) => {
            assert_eq!(11, data.signal_number);
            assert_eq!("SIGSEGV", data.signal_name.as_str());
            assert_eq!(1, data.code);
            assert_eq!("SEGV_MAPERR", data.code_name.as_str());
            assert_eq!(Some("0x0000000000000000".to_string()), data.address);
        }
        other => panic!("expected SigInfo, got {:?}", other),
    }
}

#[test]
fn test_parse_stack_free_space() {
    let event: Event = parse_line(
        "Stack: [0x00007f683d0d8000,0x00007f683d1d9000],  sp=0x00007f683d1d6b50,  free space=1018k",
    );
    match event {
        Event::Stack { free_space_bytes } => {
            assert_eq!(Some(1018 * BYTES_PER_KIB), free_space_bytes);
        }
        other => panic!("expected Stack, got {:?}", other),
    }
}

#[test]
fn test_parse_stack_frame_types() {
    for (line, expect_type) in [
        ("C  [libzip.so+0x4f54]  newEntry+0x64", 'C'),
        ("J 1234 C2 java.lang.String.indexOf(I)I (7 bytes)", 'J'),
        ("j  java.util.zip.ZipFile.getEntry(J[BZ)J+0", 'j'),
        ("V  [libjvm.so+0x5c1234]", 'V'),
        ("v  ~StubRoutines::call_stub", 'v'),
    ] {
        let event: Event = parse_line(line);
        match event {
            Event::StackFrame(data) => assert_eq!(expect_type, data.frame_type, "line {:?}", line),
            other => panic!("expected StackFrame for {:?}, got {:?}", line, other),
        }
    }
}

#[test]
fn test_parse_heap_region_sizes() {
    let event: Event = parse_line(
        " PSYoungGen      total 76288K, used 10158K [0x000000076b580000, 0x0000000770a80000, 0x00000007c0000000)",
    );
    match event {
        Event::HeapRegion(data) => {
            assert_eq!("PSYoungGen", data.space.as_str());
            assert_eq!(76288 * BYTES_PER_KIB, data.total_bytes);
            assert_eq!(10158 * BYTES_PER_KIB, data.used_bytes);
            assert!(!data.subordinate);
        }
        other => panic!("expected HeapRegion, got {:?}", other),
    }
}

#[test]
fn test_parse_heap_subregion_is_subordinate() {
    let event: Event = parse_line(
        "  eden space 65536K, 15% used [0x000000076b580000,0x000000076bf6b9e8,0x000000076f580000)",
    );
    match event {
        Event::HeapRegion(data) => {
            assert_eq!("eden space", data.space.as_str());
            assert!(data.subordinate);
        }
        other => panic!("expected HeapRegion, got {:?}", other),
    }
}

#[test]
fn test_parse_memory_with_swap() {
    let event: Event =
        parse_line("Memory: 4k page, physical 16266940k(14849760k free), swap 8257532k(8257532k free)");
    match event {
        Event::Memory(data) => {
            assert_eq!(4 * BYTES_PER_KIB, data.page_bytes);
            assert_eq!(16266940 * BYTES_PER_KIB, data.physical_bytes);
            assert_eq!(14849760 * BYTES_PER_KIB, data.physical_free_bytes);
            assert_eq!(Some(8257532 * BYTES_PER_KIB), data.swap_bytes);
            assert_eq!(Some(8257532 * BYTES_PER_KIB), data.swap_free_bytes);
        }
        other => panic!("expected Memory, got {:?}", other),
    }
}

#[test]
fn test_parse_memory_without_swap() {
    let event: Event = parse_line("Memory: 4k page, physical 16058700k(1456096k free)");
    match event {
        Event::Memory(data) => {
            assert_eq!(None, data.swap_bytes);
            assert_eq!(None, data.swap_free_bytes);
        }
        other => panic!("expected Memory, got {:?}", other),
    }
}

#[test]
fn test_parse_vm_info_release_and_build() {
    let event: Event = parse_line(
        "vm_info: OpenJDK 64-Bit Server VM (25.222-b10) for linux-amd64 JRE (1.8.0_222-b10), built on Jul 11 2019 03:35:33 by \"mockbuild\" with gcc 4.8.5 20150623 (Red Hat 4.8.5-36)",
    );
    match event {
        Event::VmInfo(data) => {
            assert_eq!(Some("1.8.0_222-b10".to_string()), data.release);
            assert!(data.build_date.is_some());
            assert_eq!(Some("mockbuild".to_string()), data.built_by);
        }
        other => panic!("expected VmInfo, got {:?}", other),
    }
}

/// JDK 11 shape, with double-space day padding in the build date.
#[test]
fn test_parse_vm_info_jdk11() {
    let event: Event = parse_line(
        "vm_info: OpenJDK 64-Bit Server VM (11.0.4+11-LTS) for linux-amd64 JRE (11.0.4+11-LTS), built on Jul  9 2019 10:18:43 by \"mockbuild\" with gcc 4.8.5 20150623 (Red Hat 4.8.5-39)",
    );
    match event {
        Event::VmInfo(data) => {
            assert_eq!(Some("11.0.4+11-LTS".to_string()), data.release);
            let build_date = data.build_date.expect("build date must parse");
            assert_eq!("2019-07-09 10:18:43", build_date.format("%Y-%m-%d %H:%M:%S").to_string());
        }
        other => panic!("expected VmInfo, got {:?}", other),
    }
}

#[test]
fn test_parse_rlimit_soft_hard() {
    let event: Event = parse_line(
        "rlimit (soft/hard): STACK 8192k/infinity, CORE 0k/infinity, NPROC 4096/30593, NOFILE 1024/262144, AS infinity/infinity",
    );
    match event {
        Event::Rlimit(data) => {
            assert_eq!(Some(8192 * BYTES_PER_KIB), data.stack_bytes);
            assert_eq!(Some(0), data.core_bytes);
            assert_eq!(Some(4096), data.nproc);
            assert_eq!(Some(1024), data.nofile);
        }
        other => panic!("expected Rlimit, got {:?}", other),
    }
}

#[test]
fn test_parse_rlimit_infinity() {
    let event: Event =
        parse_line("rlimit: STACK 8192k, CORE 0k, NPROC 30000, NOFILE 4096, AS infinity");
    match event {
        Event::Rlimit(data) => {
            assert_eq!(Some(30000), data.nproc);
        }
        other => panic!("expected Rlimit, got {:?}", other),
    }
}

#[test]
fn test_parse_time_elapsed_combined() {
    let event: Event =
        parse_line("Time: Mon Sep  2 14:34:34 2019 CEST elapsed time: 89.192546 seconds (0d 0h 1m 29s)");
    match event {
        Event::TimeElapsedTime { time, elapsed_seconds } => {
            assert!(time.is_some());
            assert!((elapsed_seconds - 89.192546).abs() < 1e-9);
        }
        other => panic!("expected TimeElapsedTime, got {:?}", other),
    }
}

#[test]
fn test_parse_dynamic_library_path() {
    let event: Event = parse_line(
        "7f68383b5000-7f68383c4000 r-xp 00000000 fd:00 135128578                  /usr/lib/jvm/java-1.8.0-openjdk-1.8.0.222.b10-0.el7_6.x86_64/jre/lib/amd64/libzip.so",
    );
    match event {
        Event::DynamicLibrary { path } => {
            assert_eq!(
                Some(
                    "/usr/lib/jvm/java-1.8.0-openjdk-1.8.0.222.b10-0.el7_6.x86_64/jre/lib/amd64/libzip.so"
                        .to_string()
                ),
                path,
            );
        }
        other => panic!("expected DynamicLibrary, got {:?}", other),
    }
}

/// An anonymous mapping has no path; the event still classifies.
#[test]
fn test_parse_dynamic_library_anonymous() {
    let event: Event = parse_line("7ffd1d1ff000-7ffd1d201000 r-xp 00000000 00:00 0");
    match event {
        Event::DynamicLibrary { path } => assert_eq!(None, path),
        other => panic!("expected DynamicLibrary, got {:?}", other),
    }
}

/// The GC-heap-history `Event:` shape must win over the generic
/// `Event:` shape, so its entry must sit strictly earlier in the
/// table.
#[test]
fn test_gc_heap_history_event_beats_generic_event() {
    assert_eq!(EventKind::GcHeapHistory, classify("Event: 0.317 GC heap before"));
    assert_eq!(
        EventKind::VmEvent,
        classify("Event: 0.420 Thread 0x00007f6838283800 164   3       java.lang.String::lastIndexOf (52 bytes)"),
    );
    let gc_index: usize = classify_index("Event: 0.317 GC heap before").unwrap();
    let generic_index: usize = classify_index(
        "Event: 0.420 Thread 0x00007f6838283800 164   3       java.lang.String::lastIndexOf (52 bytes)",
    )
    .unwrap();
    assert_lt!(gc_index, generic_index);
}

/// `heap address:` must win over any general region shape.
#[test]
fn test_heap_address_beats_region_shapes() {
    assert_eq!(
        EventKind::HeapAddress,
        classify("heap address: 0x00000006c0000000, size: 4096 MB, Compressed Oops mode: Zero based, Oop shift amount: 3"),
    );
}

/// Classification is a pure function: repeated calls agree.
#[test]
fn test_classify_idempotent() {
    let line: &str = "# A fatal error has been detected by the Java Runtime Environment:";
    let first: Option<usize> = classify_index(line);
    for _ in 0..3 {
        assert_eq!(first, classify_index(line));
        assert_eq!(parse_line(line), parse_line(line));
    }
}
