// src/tests/catalog_tests.rs

//! Tests for `catalog/mod.rs`.

use std::collections::BTreeMap;

use crate::catalog::{
    catalogs,
    is_lts_major,
    select_catalog,
    staleness,
    Catalog,
    ReleaseEntry,
    Staleness,
    LATEST_KEY,
};
use crate::data::model::{JdkInstallType, OsFlavor};

fn entry(
    version: &str,
    date: &str,
    ordinal: u32,
) -> ReleaseEntry {
    ReleaseEntry {
        version: version.to_string(),
        date: date.to_string(),
        ordinal,
    }
}

/// A minimal synthetic channel for staleness arithmetic.
fn synthetic_catalog() -> Catalog {
    let mut releases: BTreeMap<String, ReleaseEntry> = BTreeMap::new();
    releases.insert(
        "build-x".to_string(),
        entry("1.8.0_212-b04", "Mar 5 2019 00:00:00", 21),
    );
    releases.insert(
        "build-y".to_string(),
        entry("1.8.0_222-b10", "May 22 2019 00:00:00", 22),
    );
    releases.insert(
        LATEST_KEY.to_string(),
        entry("1.8.0_222-b10", "May 22 2019 00:00:00", 22),
    );
    Catalog {
        id: "synthetic".to_string(),
        install: "rpm".to_string(),
        os: "rhel".to_string(),
        os_major: Some(7),
        arch: Some("x86_64".to_string()),
        jdk_major: 8,
        releases,
    }
}

#[test]
fn test_staleness_ordinal_and_day_diff() {
    let catalog: Catalog = synthetic_catalog();
    let installed: &ReleaseEntry = catalog.lookup("build-x").unwrap();
    let latest: &ReleaseEntry = catalog.latest().unwrap();
    let staleness: Staleness = staleness(installed, latest).unwrap();
    assert_eq!(1, staleness.ordinal_diff);
    assert_eq!(78, staleness.day_diff);
}

#[test]
fn test_staleness_of_latest_is_zero() {
    let catalog: Catalog = synthetic_catalog();
    let installed: &ReleaseEntry = catalog.lookup("build-y").unwrap();
    let latest: &ReleaseEntry = catalog.latest().unwrap();
    let staleness: Staleness = staleness(installed, latest).unwrap();
    assert_eq!(0, staleness.ordinal_diff);
    assert_eq!(0, staleness.day_diff);
}

/// Sub-day date differences truncate to zero whole days.
#[test]
fn test_staleness_day_diff_truncates() {
    let installed: ReleaseEntry = entry("a", "Mar 5 2019 00:01:00", 1);
    let latest: ReleaseEntry = entry("b", "Mar 6 2019 00:00:00", 2);
    let staleness: Staleness = staleness(&installed, &latest).unwrap();
    assert_eq!(0, staleness.day_diff);
    assert_eq!(1, staleness.ordinal_diff);
}

#[test]
fn test_staleness_malformed_date_is_none() {
    let installed: ReleaseEntry = entry("a", "not a date", 1);
    let latest: ReleaseEntry = entry("b", "Mar 6 2019 00:00:00", 2);
    assert!(staleness(&installed, &latest).is_none());
}

#[test]
fn test_lookup_by_version_ignores_sentinel() {
    let catalog: Catalog = synthetic_catalog();
    let found: &ReleaseEntry = catalog.lookup_by_version("1.8.0_222-b10").unwrap();
    assert_eq!(22, found.ordinal);
    assert!(catalog.lookup_by_version("9.9.9").is_none());
}

#[test]
fn test_select_catalog_rpm_rhel7_jdk8() {
    let catalog = select_catalog(
        8,
        JdkInstallType::Rpm,
        OsFlavor::Rhel,
        Some(7),
        Some("x86_64"),
    )
    .expect("rpm rhel7 jdk8 channel must exist");
    assert_eq!("rpm-rhel7-jdk8", catalog.id.as_str());
}

#[test]
fn test_select_catalog_centos_uses_rhel_channel() {
    let catalog = select_catalog(
        11,
        JdkInstallType::Rpm,
        OsFlavor::CentOs,
        Some(7),
        Some("x86_64"),
    )
    .expect("CentOS maps to the RHEL rpm channel");
    assert_eq!("rpm-rhel7-jdk11", catalog.id.as_str());
}

#[test]
fn test_select_catalog_zip_ignores_os_major() {
    let catalog = select_catalog(11, JdkInstallType::LinuxZip, OsFlavor::Fedora, Some(30), None)
        .expect("zip channel is os-major independent");
    assert_eq!("zip-linux-jdk11", catalog.id.as_str());
}

#[test]
fn test_select_catalog_misses() {
    // no catalog for an unmodeled JDK major
    assert!(select_catalog(13, JdkInstallType::Rpm, OsFlavor::Rhel, Some(7), Some("x86_64")).is_none());
    // rpm install on a non-RHEL-family OS
    assert!(select_catalog(8, JdkInstallType::Rpm, OsFlavor::Fedora, Some(30), Some("x86_64")).is_none());
    // unknown install layout
    assert!(select_catalog(8, JdkInstallType::Unknown, OsFlavor::Rhel, Some(7), Some("x86_64")).is_none());
}

#[test]
fn test_embedded_catalogs_lookup_by_rpm_directory() {
    let catalog = select_catalog(
        8,
        JdkInstallType::Rpm,
        OsFlavor::Rhel,
        Some(7),
        Some("x86_64"),
    )
    .unwrap();
    let installed = catalog
        .lookup("java-1.8.0-openjdk-1.8.0.222.b10-0.el7_6.x86_64")
        .expect("8u222 el7 rpm directory must be cataloged");
    assert_eq!("1.8.0_222-b10", installed.version.as_str());
    let latest = catalog.latest().unwrap();
    assert_ne!(installed.version, latest.version);
}

#[test]
fn test_is_lts_major() {
    assert!(is_lts_major(8));
    assert!(is_lts_major(11));
    assert!(!is_lts_major(9));
    assert!(!is_lts_major(13));
}

#[test]
fn test_every_embedded_catalog_is_selectable_by_its_own_key() {
    for catalog in catalogs().iter() {
        assert!(!catalog.releases.is_empty(), "catalog {} empty", catalog.id);
        assert!(catalog.releases.contains_key(LATEST_KEY), "catalog {} missing LATEST", catalog.id);
    }
}
