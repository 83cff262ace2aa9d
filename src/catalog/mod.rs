// src/catalog/mod.rs

//! The release catalog: known Red Hat builds of OpenJDK, keyed by
//! distribution channel.
//!
//! The catalog data lives in [`releases.json`], embedded at compile
//! time and deserialized once on first use. Each catalog covers one
//! channel (rpm per RHEL major, Linux zip, Windows zip) for one JDK
//! major version, and maps a build key to a release record. Rpm
//! catalogs key by rpm directory name (the name under
//! `/usr/lib/jvm/`); zip catalogs key by release version string.
//!
//! Every catalog also carries the sentinel key [`LATEST_KEY`] whose
//! record duplicates the most recent release in that channel. Staleness
//! of an installed build is measured against that sentinel, both as an
//! ordinal distance (releases behind) and as whole days between build
//! timestamps.
//!
//! [`releases.json`]: https://access.redhat.com/articles/1299013

use std::collections::BTreeMap;

use ::chrono::NaiveDateTime;
use ::lazy_static::lazy_static;
use ::serde::Deserialize;
use ::si_trace_print::{defn, defx, defñ};

use crate::data::datetime::{datetime_from_build_timestamp, days_between};
use crate::data::model::{JdkInstallType, OsFlavor};

/// Sentinel build key; its record duplicates the newest release in the
/// catalog.
pub const LATEST_KEY: &str = "LATEST";

/// One known release of a Red Hat build of OpenJDK within a channel.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ReleaseEntry {
    /// The JRE release string as `vm_info:` prints it,
    /// e.g. `1.8.0_222-b10` or `11.0.4+11-LTS`.
    pub version: String,
    /// Build timestamp, `MMM d yyyy HH:mm:ss`.
    pub date: String,
    /// Position in the channel's release sequence. Monotonic within a
    /// catalog; newest release has the largest ordinal.
    pub ordinal: u32,
}

impl ReleaseEntry {
    /// The parsed build timestamp. `None` only for malformed data.
    pub fn build_date(&self) -> Option<NaiveDateTime> {
        datetime_from_build_timestamp(self.date.as_str())
    }
}

/// One distribution channel for one JDK major version.
#[derive(Clone, Debug, Deserialize)]
pub struct Catalog {
    pub id: String,
    /// `rpm`, `zip`, or `windows-zip`.
    pub install: String,
    /// `rhel`, `linux`, or `windows`.
    pub os: String,
    /// RHEL major version for rpm channels; `null` for zip channels.
    pub os_major: Option<u16>,
    /// CPU architecture for rpm channels; `null` when the channel's
    /// build keys are architecture-independent version strings.
    pub arch: Option<String>,
    pub jdk_major: u16,
    /// Build key to release record, plus the [`LATEST_KEY`] sentinel.
    pub releases: BTreeMap<String, ReleaseEntry>,
}

impl Catalog {
    /// The newest release in this channel, via the sentinel.
    pub fn latest(&self) -> Option<&ReleaseEntry> {
        self.releases.get(LATEST_KEY)
    }

    /// Look up a release by exact build key.
    pub fn lookup(
        &self,
        build_key: &str,
    ) -> Option<&ReleaseEntry> {
        self.releases.get(build_key)
    }

    /// Look up a release by its version string, ignoring the sentinel.
    pub fn lookup_by_version(
        &self,
        version: &str,
    ) -> Option<&ReleaseEntry> {
        self.releases
            .iter()
            .filter(|(key, _)| key.as_str() != LATEST_KEY)
            .map(|(_, entry)| entry)
            .find(|entry| entry.version == version)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    catalogs: Vec<Catalog>,
}

lazy_static! {
    static ref CATALOG_FILE: CatalogFile =
        serde_json::from_str(include_str!("releases.json")).unwrap();
}

/// All known catalogs.
pub fn catalogs() -> &'static [Catalog] {
    CATALOG_FILE.catalogs.as_slice()
}

/// Select the catalog matching the install channel and platform of a
/// crashed JVM. `None` when no channel is modeled for the combination,
/// e.g. a Fedora host or an unrecognized install layout.
pub fn select_catalog(
    jdk_major: u16,
    install: JdkInstallType,
    os_flavor: OsFlavor,
    os_major: Option<u16>,
    arch: Option<&str>,
) -> Option<&'static Catalog> {
    defn!(
        "({:?}, {:?}, {:?}, {:?}, {:?})",
        jdk_major,
        install,
        os_flavor,
        os_major,
        arch
    );
    let (install_want, os_want): (&str, &str) = match install {
        JdkInstallType::Rpm => ("rpm", "rhel"),
        JdkInstallType::LinuxZip => ("zip", "linux"),
        JdkInstallType::WindowsZip => ("windows-zip", "windows"),
        JdkInstallType::Unknown => {
            defx!("unknown install type");
            return None;
        }
    };
    // rpm channels exist only for the RHEL family
    if install_want == "rpm" {
        match os_flavor {
            OsFlavor::Rhel | OsFlavor::CentOs | OsFlavor::OracleLinux => {}
            _ => {
                defx!("rpm install on non-RHEL-family OS {:?}", os_flavor);
                return None;
            }
        }
    }
    let found: Option<&'static Catalog> = catalogs().iter().find(|c| {
        c.jdk_major == jdk_major
            && c.install == install_want
            && c.os == os_want
            && (c.os_major.is_none() || c.os_major == os_major)
            && (c.arch.is_none() || c.arch.as_deref() == arch)
    });
    defx!("{:?}", found.map(|c| c.id.as_str()));
    found
}

/// How far behind the channel's newest release an installed build is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Staleness {
    /// Releases behind the newest; 0 means up to date.
    pub ordinal_diff: i64,
    /// Whole days between build timestamps, truncating.
    pub day_diff: i64,
}

/// Measure an installed release against the channel's newest.
///
/// `None` when either build timestamp fails to parse. A release that
/// is the newest yields zero diffs.
pub fn staleness(
    installed: &ReleaseEntry,
    latest: &ReleaseEntry,
) -> Option<Staleness> {
    let installed_date: NaiveDateTime = installed.build_date()?;
    let latest_date: NaiveDateTime = latest.build_date()?;
    let staleness = Staleness {
        ordinal_diff: latest.ordinal as i64 - installed.ordinal as i64,
        day_diff: days_between(&installed_date, &latest_date),
    };
    defñ!("installed {:?} latest {:?} {:?}", installed.version, latest.version, staleness);
    Some(staleness)
}

/// Is `major` a long-term-support JDK version?
pub fn is_lts_major(major: u16) -> bool {
    matches!(major, 8 | 11)
}
