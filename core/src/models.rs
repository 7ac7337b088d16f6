use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Controls what [`crate::Apk::open`] does beyond parsing the manifest.
///
/// `skip_analysis` skips parsing `resources.arsc` entirely, useful when a
/// caller only wants raw manifest attributes and doesn't need resource
/// resolution (icon lookup, reference resolution all become no-ops).
/// `test_integrity` runs a CRC32 check over every archive entry before
/// returning, surfacing a corrupted zip as an error up front rather than
/// failing later on whichever entry happens to get read.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    pub skip_analysis: bool,
    pub test_integrity: bool,
}

/// Minimal projection of a XAPK bundle's `manifest.json`, just enough to
/// locate the inner base APK.
///
/// See: <https://www.apkmirror.com/xapks/>
#[derive(Deserialize, Debug)]
pub struct XAPKManifest {
    pub package_name: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub version_code: Option<String>,

    #[serde(default)]
    pub version_name: Option<String>,
}

/// Projection of a `<service>` entry declared in the manifest.
///
/// See: <https://developer.android.com/guide/topics/manifest/service-element>
#[derive(Debug)]
pub struct Service<'a> {
    pub description: Option<&'a str>,
    pub direct_boot_aware: Option<&'a str>,
    pub enabled: Option<&'a str>,
    pub exported: Option<&'a str>,
    pub foreground_service_type: Option<&'a str>,
    pub isolated_process: Option<&'a str>,
    pub name: Option<&'a str>,
    pub permission: Option<&'a str>,
    pub process: Option<&'a str>,
    pub stop_with_task: Option<&'a str>,
}

/// Projection of a `<receiver>` entry declared in the manifest.
///
/// See: <https://developer.android.com/guide/topics/manifest/receiver-element>
#[derive(Debug)]
pub struct Receiver<'a> {
    pub direct_boot_aware: Option<&'a str>,
    pub enabled: Option<&'a str>,
    pub exported: Option<&'a str>,
    pub icon: Option<&'a str>,
    pub label: Option<&'a str>,
    pub name: Option<&'a str>,
    pub permission: Option<&'a str>,
    pub process: Option<&'a str>,
}

/// Projection of a `<provider>` entry declared in the manifest.
///
/// See: <https://developer.android.com/guide/topics/manifest/provider-element>
#[derive(Debug)]
pub struct Provider<'a> {
    pub authorities: Option<&'a str>,
    pub direct_boot_aware: Option<&'a str>,
    pub enabled: Option<&'a str>,
    pub exported: Option<&'a str>,
    pub grant_uri_permissions: Option<&'a str>,
    pub multiprocess: Option<&'a str>,
    pub name: Option<&'a str>,
    pub permission: Option<&'a str>,
    pub process: Option<&'a str>,
    pub read_permission: Option<&'a str>,
    pub write_permission: Option<&'a str>,
}

#[derive(Serialize, Debug)]
pub struct ApkJson {
    pub package_name: Option<String>,

    pub min_sdk_version: Option<String>,

    pub target_sdk_version: Option<String>,

    pub max_sdk_version: Option<String>,

    #[serde(serialize_with = "sorted_set")]
    pub declared_permissions: HashSet<String>,

    pub shared_user_id: Option<String>,

    pub shared_user_label: Option<String>,

    pub shared_user_max_sdk_version: Option<String>,

    pub version_code: Option<String>,

    pub version_name: Option<String>,

    pub install_location: Option<String>,

    #[serde(serialize_with = "sorted_set")]
    pub features: HashSet<String>,

    #[serde(serialize_with = "sorted_set")]
    pub permissions: HashSet<String>,

    #[serde(serialize_with = "sorted_set")]
    pub permissions_sdk23: HashSet<String>,
}

fn sorted_set<S>(set: &HashSet<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let mut vec: Vec<_> = set.iter().collect();
    vec.sort();
    vec.serialize(serializer)
}
