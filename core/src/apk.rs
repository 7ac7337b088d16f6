use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use apk_info_axml::ARSC;
use apk_info_axml::VectorXform;
use apk_info_axml::axml::AXML;
use apk_info_zip::{FileCompressionType, Signature, ZipEntry, ZipError};

use crate::errors::APKError;
use crate::models::{ApkJson, OpenOptions, Provider, Receiver, Service, XAPKManifest};

const ANDROID_MANIFEST_PATH: &str = "AndroidManifest.xml";
const RESOURCE_TABLE_PATH: &str = "resources.arsc";

// maybe in the future
#[allow(unused)]
const PROTO_RESOURCE_TABLE_PATH: &str = "resources.pb";

/// Main structure that represents APK file
pub struct Apk {
    zip: ZipEntry,
    axml: AXML,
    arsc: Option<ARSC>,
}

/// Implementation of internal methods
impl Apk {
    /// Helper function for reading apk files
    fn init(p: &Path, options: &OpenOptions) -> Result<(ZipEntry, AXML, Option<ARSC>), APKError> {
        let file = File::open(p).map_err(APKError::IoError)?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file);
        let mut input = Vec::new();
        reader.read_to_end(&mut input).map_err(APKError::IoError)?;

        if input.is_empty() {
            return Err(APKError::InvalidInput("got empty file"));
        }

        let zip = ZipEntry::new(input).map_err(APKError::ZipError)?;

        if options.test_integrity {
            zip.test_integrity().map_err(APKError::ZipError)?;
        }

        match zip.read(ANDROID_MANIFEST_PATH) {
            Ok((manifest, _)) => {
                if manifest.is_empty() {
                    return Err(APKError::InvalidInput(
                        "AndroidManifest.xml is empty, not a valid apk",
                    ));
                }

                // d5b7d025712f0f22562b3d511d7603f5c8a0c477675c6578083fa7709ca41ba8 - sample without resourcers, but in theory we can show information, need research
                let arsc = if options.skip_analysis {
                    None
                } else {
                    match zip.read(RESOURCE_TABLE_PATH) {
                        Ok((resource_data, _)) => Some(
                            ARSC::new(&mut &resource_data[..]).map_err(APKError::ResourceError)?,
                        ),
                        Err(_) => None,
                    }
                };

                let axml = AXML::new(&mut &manifest[..], arsc.as_ref())
                    .map_err(APKError::ManifestError)?;

                Ok((zip, axml, arsc))
            }
            Err(_) => {
                // maybe this is xapk?
                let (manifest_json_data, _) = zip.read("manifest.json").map_err(|_| {
                    APKError::InvalidInput(
                        "can't find AndroidManifest.xml or manifest.json, is it apk/xapk?",
                    )
                })?;

                let manifest_json: XAPKManifest = serde_json::from_slice(&manifest_json_data)
                    .map_err(APKError::XAPKManifestError)?;

                let package_name = format!("{}.apk", manifest_json.package_name);
                let (inner_apk_data, _) = zip.read(&package_name).map_err(APKError::ZipError)?;

                let inner_apk = ZipEntry::new(inner_apk_data).map_err(APKError::ZipError)?;

                // try again read AndroidManifest.xml from inner apk
                let (inner_manifest, _) = inner_apk
                    .read(ANDROID_MANIFEST_PATH)
                    .map_err(APKError::ZipError)?;

                if inner_manifest.is_empty() {
                    return Err(APKError::InvalidInput(
                        "AndroidManifest.xml in inner apk is empty, not a valid xapk",
                    ));
                }

                // d5b7d025712f0f22562b3d511d7603f5c8a0c477675c6578083fa7709ca41ba8 - sample without resourcers, but in theory we can show information, need research
                // 3474625e63d0893fc8f83034e835472d95195254e1e4bdf99153b7c74eb44d86 - same
                let arsc = if options.skip_analysis {
                    None
                } else {
                    match zip.read(RESOURCE_TABLE_PATH) {
                        Ok((resource_data, _)) => Some(
                            ARSC::new(&mut &resource_data[..]).map_err(APKError::ResourceError)?,
                        ),
                        Err(_) => None,
                    }
                };

                let axml = AXML::new(&mut &inner_manifest[..], arsc.as_ref())
                    .map_err(APKError::ManifestError)?;

                Ok((zip, axml, arsc))
            }
        }
    }
}

impl Apk {
    /// Opens an APK (or XAPK bundle) at `path` with default options: full
    /// resource-table analysis, no upfront integrity scan.
    pub fn new(path: &Path) -> Result<Apk, APKError> {
        Self::open(path, OpenOptions::default())
    }

    /// Opens an APK (or XAPK bundle) at `path`. See [`OpenOptions`] for what
    /// `skip_analysis`/`test_integrity` change about the process.
    pub fn open(path: &Path, options: OpenOptions) -> Result<Apk, APKError> {
        // basic sanity check
        if !path.exists() {
            return Err(APKError::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                "file not found",
            )));
        }

        let (zip, axml, arsc) = Self::init(path, &options)?;

        Ok(Apk { zip, axml, arsc })
    }

    /// Read data from zip by filename
    #[inline]
    pub fn read(&self, filename: &str) -> Result<(Vec<u8>, FileCompressionType), ZipError> {
        self.zip.read(filename)
    }

    /// List of the filenames included in the central directory
    #[inline]
    pub fn namelist(&self) -> impl Iterator<Item = &str> + '_ {
        self.zip.namelist().map(String::as_str)
    }

    /// Returns nice representation of `AndroidManifest.xml`
    pub fn get_xml_string(&self) -> String {
        self.axml.get_xml_string()
    }

    /// Check if the APK has multiple dex files or not
    pub fn is_multidex(&self) -> bool {
        self.zip
            .namelist()
            .filter(|name| {
                // don't use regexes, i think it's overengineering for this task
                if !name.starts_with("classes") || !name.ends_with(".dex") {
                    return false;
                }

                let middle = &name["classes".len()..name.len() - ".dex".len()];

                middle.is_empty() || middle.chars().all(|c| c.is_ascii_digit())
            })
            .count()
            > 1
    }

    #[inline]
    pub fn get_attribute_value(&self, tag: &str, name: &str) -> Option<String> {
        self.axml.get_attribute_value(tag, name, self.arsc.as_ref())
    }

    #[inline]
    pub fn get_all_attribute_values<'a>(
        &'a self,
        tag: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a str> {
        self.axml.get_all_attribute_values(tag, name)
    }

    /// Retrieves the package name defined in the `<manifest>` tag
    ///
    /// Example:
    /// ```xml
    /// <manifest package="com.example.app" />
    /// ```
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/manifest-element#package>
    #[inline]
    pub fn get_package_name(&self) -> Option<String> {
        self.axml
            .get_attribute_value("manifest", "package", self.arsc.as_ref())
    }

    /// Retrieves the `sharedUserId` defined in the `<manifest>` tag.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/manifest-element#uid>
    #[inline]
    pub fn get_shared_user_id(&self) -> Option<String> {
        self.axml
            .get_attribute_value("manifest", "sharedUserId", self.arsc.as_ref())
    }

    /// Retrieves the `sharedUserLabel` defined in the `<manifest>` tag.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/manifest-element#uidlabel>
    #[inline]
    pub fn get_shared_user_label(&self) -> Option<String> {
        self.axml
            .get_attribute_value("manifest", "sharedUserLabel", self.arsc.as_ref())
    }

    /// Retrieves the `sharedUserMaxSdkVersion` defined in the `<manifest>` tag.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/manifest-element#uidmaxsdk>
    #[inline]
    pub fn get_shared_user_max_sdk_version(&self) -> Option<String> {
        self.axml
            .get_attribute_value("manifest", "sharedUserMaxSdkVersion", self.arsc.as_ref())
    }

    /// Retrieves the application version code.
    ///
    /// Example:
    /// ```xml
    /// <manifest android:versionCode="42" />
    /// ```
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/manifest-element#vcode>
    #[inline]
    pub fn get_version_code(&self) -> Option<String> {
        self.axml
            .get_attribute_value("manifest", "versionCode", self.arsc.as_ref())
    }

    /// Retrieves the application version name.
    ///
    /// Example:
    /// ```xml
    /// <manifest android:versionName="1.2.3" />
    /// ```
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/manifest-element#vname>
    #[inline]
    pub fn get_version_name(&self) -> Option<String> {
        self.axml
            .get_attribute_value("manifest", "versionName", self.arsc.as_ref())
    }

    /// Retrieves the preferred installation location.
    ///
    /// Possible values: `"auto"`, `"internalOnly"`, `"preferExternal"`.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/manifest-element#install>
    #[inline]
    pub fn get_install_location(&self) -> Option<String> {
        self.axml
            .get_attribute_value("manifest", "installLocation", self.arsc.as_ref())
    }

    /// Extract information from `<application android:allowTaskReparenting="true | false">`
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/application-element#reparent>
    #[inline]
    pub fn get_application_task_reparenting(&self) -> Option<String> {
        self.axml
            .get_attribute_value("application", "allowTaskReparenting", self.arsc.as_ref())
    }

    /// Extract information from `<application android:allowBackup="true | false"`
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/application-element#allowbackup>
    #[inline]
    pub fn get_application_allow_backup(&self) -> Option<String> {
        self.axml
            .get_attribute_value("application", "allowBackup", self.arsc.as_ref())
    }

    /// Extracts the `android:appCategory` attribute from `<application>`.
    ///
    /// Possible values include: `"accessibility"`, `"audio"`, `"game"`, `"image"`,
    /// `"maps"`, `"news"`, `"productivity"`, `"social"`, `"video"`.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/application-element#appCategory>
    #[inline]
    pub fn get_application_category(&self) -> Option<String> {
        self.axml
            .get_attribute_value("application", "appCategory", self.arsc.as_ref())
    }

    /// Extracts the `android:backupAgent` attribute from `<application>`.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/application-element#agent>
    #[inline]
    pub fn get_application_backup_agent(&self) -> Option<String> {
        self.axml
            .get_attribute_value("application", "backupAgent", self.arsc.as_ref())
    }

    /// Extracts the `android:debuggable` attribute from `<application>`.
    ///
    /// Example:
    /// ```xml
    /// <application android:debuggable="true" />
    /// ```
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/application-element#debug>
    #[inline]
    pub fn get_application_debuggable(&self) -> Option<String> {
        self.axml
            .get_attribute_value("application", "debuggable", self.arsc.as_ref())
    }

    /// Extracts the `android:description` attribute from `<application>`.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/application-element#desc>
    #[inline]
    pub fn get_application_description(&self) -> Option<String> {
        // TODO: resolve with resources
        self.axml
            .get_attribute_value("application", "description", self.arsc.as_ref())
    }

    /// Extracts the `android:icon` attribute from `<application>`.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/application-element#icon>
    #[inline]
    pub fn get_application_icon(&self) -> Option<String> {
        self.axml
            .get_attribute_value("application", "icon", self.arsc.as_ref())
    }

    /// Resolves the application icon to the variant whose density is the
    /// closest match at or below `max_dpi`, falling back to the launcher
    /// activity's own `android:icon` when `<application>` doesn't declare one.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/application-element#icon>
    pub fn icon_path(&self, max_dpi: u16) -> Option<String> {
        let raw = self
            .axml
            .get_raw_attribute_value("application", "icon")
            .or_else(|| {
                let main = self.axml.get_main_activities().next()?;
                self.axml
                    .root
                    .children()
                    .find(|c| c.name() == "application")?
                    .children()
                    .find(|c| {
                        matches!(c.name(), "activity" | "activity-alias") && c.attr("name") == Some(main)
                    })?
                    .attr("icon")
            })?;

        match self.arsc.as_ref() {
            Some(arsc) => arsc
                .resolve_icon_reference(raw, max_dpi)
                .or_else(|| Some(raw.to_owned())),
            None => Some(raw.to_owned()),
        }
    }

    /// Resolves the application icon via [`Apk::icon_path`] and, if the
    /// resolved entry is a Vector Drawable (a binary-XML `<vector>` document
    /// rather than a raster image), converts it to SVG. Returns `Ok(None)`
    /// when there's no icon, the entry isn't in the archive, or it isn't a
    /// vector drawable - callers wanting the raw bytes of a raster icon
    /// should read `icon_path(max_dpi)` through [`Apk::read`] directly.
    pub fn icon_svg(&self, max_dpi: u16) -> Result<Option<String>, APKError> {
        let Some(path) = self.icon_path(max_dpi) else {
            return Ok(None);
        };

        let Ok((data, _)) = self.zip.read(&path) else {
            return Ok(None);
        };

        // RES_XML_TYPE chunk header starts with 0x0003
        if data.len() < 8 || data[0] != 0x03 || data[1] != 0x00 {
            return Ok(None);
        }

        let drawable = AXML::new(&mut &data[..], None).map_err(APKError::ManifestError)?;
        if drawable.root.name() != "vector" {
            return Ok(None);
        }

        let svg = VectorXform::new().transform(&drawable.root);

        let mut buf = Vec::new();
        svg.write_to(&mut buf)
            .map_err(|_| APKError::InvalidInput("failed to serialize icon as svg"))?;

        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Extracts the `android:label` attribute from `<application>`.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/application-element#label>
    #[inline]
    pub fn get_application_label(&self) -> Option<String> {
        self.axml
            .get_attribute_value("application", "label", self.arsc.as_ref())
    }

    /// Extracts the `android:name` attribute from `<application>`.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/application-element#nm>
    #[inline]
    pub fn get_application_name(&self) -> Option<String> {
        // TODO: probably not so easy
        self.axml
            .get_attribute_value("application", "name", self.arsc.as_ref())
    }

    /// Retrieves all declared permissions from `<uses-permission android:name="...">`.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/uses-permission-element>
    #[inline]
    pub fn get_permissions(&self) -> impl Iterator<Item = &str> {
        self.axml
            .get_all_attribute_values("uses-permission", "name")
    }

    /// Retrieves all declared permissions for API 23+ from `<uses-permission-sdk-23>`.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/uses-permission-sdk-23-element>
    #[inline]
    pub fn get_permissions_sdk23(&self) -> impl Iterator<Item = &str> {
        self.axml
            .get_all_attribute_values("uses-permission-sdk-23", "name")
    }

    /// Retrieves the minimum SDK version required by the app.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/uses-sdk-element#min>
    #[inline]
    pub fn get_min_sdk_version(&self) -> Option<String> {
        self.axml
            .get_attribute_value("uses-sdk", "minSdkVersion", self.arsc.as_ref())
    }

    /// Retrieves the target SDK version requested by the app.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/uses-sdk-element#target>
    #[inline]
    pub fn get_target_sdk_version(&self) -> Option<String> {
        self.axml
            .get_attribute_value("uses-sdk", "targetSdkVersion", self.arsc.as_ref())
    }

    /// Retrieves the maximum SDK version supported by the app.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/uses-sdk-element#max>
    #[inline]
    pub fn get_max_sdk_version(&self) -> Option<String> {
        self.axml
            .get_attribute_value("uses-sdk", "maxSdkVersion", self.arsc.as_ref())
    }

    /// Retrieves all libraries declared by `<uses-library android:name="...">`.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/uses-library-element>
    #[inline]
    pub fn get_libraries(&self) -> impl Iterator<Item = &str> {
        self.axml
            .get_all_attribute_values("uses-library", "name")
            .chain(
                self.axml
                    .get_all_attribute_values("uses-native-library", "name"),
            )
    }

    /// Retrieves all hardware or software features declared by `<uses-feature>`.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/uses-feature-element>
    #[inline]
    pub fn get_features(&self) -> impl Iterator<Item = &str> {
        self.axml.get_all_attribute_values("uses-feature", "name")
    }

    /// The app is designed to show its UI on a set of screens inside a vehicle
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/uses-feature-element#device-ui-hw-features>
    pub fn is_automotive(&self) -> bool {
        self.get_features()
            .any(|x| x == "android.hardware.type.automotive")
    }

    /// The app is designed to show its UI on a television
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/uses-feature-element#device-ui-hw-features>
    pub fn is_leanback(&self) -> bool {
        self.get_features()
            .any(|x| x == "android.hardware.type.television" || x == "android.software.leanback")
    }

    /// The app is designed to show its UI on a watch.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/uses-feature-element#device-ui-hw-features>
    pub fn is_wearable(&self) -> bool {
        self.get_features()
            .any(|x| x == "android.hardware.type.watch")
    }

    /// The app is designed to show its UI on Chromebooks.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/uses-feature-element#device-ui-hw-features>
    pub fn is_chromebook(&self) -> bool {
        self.get_features().any(|x| x == "android.hardware.type.pc")
    }

    /// Retrieves all declared permissions defined by `<permission android:name="...">`.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/permission-element>
    #[inline]
    pub fn get_declared_permissions(&self) -> impl Iterator<Item = &str> {
        // TODO: maybe create some kind of structure, idk
        self.axml.get_all_attribute_values("permission", "name")
    }

    /// Get first found main activity (with intent filters `MAIN` + `LAUNCHER`)
    #[inline]
    pub fn get_main_activity(&self) -> Option<&str> {
        self.axml.get_main_activities().next()
    }

    /// Retrieves all **main activities** (with intent filters `MAIN` + `LAUNCHER`).
    #[inline]
    pub fn get_main_activities(&self) -> impl Iterator<Item = &str> {
        self.axml.get_main_activities()
    }

    /// Qualifies a manifest-declared component/label value against the package
    /// name, the same shorthand `aapt` accepts: a leading `.` is expanded to a
    /// package-relative suffix, a bare name with no `.` at all is treated as
    /// living directly under the package, anything else is already qualified.
    fn qualify(&self, value: &str) -> String {
        match self.get_package_name() {
            Some(package) => qualify_name(&package, value),
            None => value.to_owned(),
        }
    }

    /// [`Apk::get_main_activity`], with its name qualified against the package.
    pub fn main_activity(&self) -> Option<String> {
        self.get_main_activity().map(|name| self.qualify(name))
    }

    /// [`Apk::get_application_label`], qualified against the package the same
    /// way a component name is.
    pub fn label(&self) -> Option<String> {
        self.get_application_label()
            .map(|label| self.qualify(&label))
    }

    /// `targetSdkVersion` if present and parseable, else `minSdkVersion` if
    /// parseable, else `1` - Android's own fallback chain for API behavior
    /// gating when a manifest omits `<uses-sdk>` attributes.
    pub fn effective_target_sdk(&self) -> u32 {
        self.get_target_sdk_version()
            .and_then(|v| v.parse().ok())
            .or_else(|| self.get_min_sdk_version().and_then(|v| v.parse().ok()))
            .unwrap_or(1)
    }

    /// Permissions the platform grants implicitly based on `effective_target_sdk()`,
    /// mirroring `PackageParser.grantImplicitPermissions`: pre-Android 1.6 (target
    /// < 4) apps implicitly get storage and phone-state access, storage access
    /// implies read access, and pre-Jelly-Bean (target < 16) contacts access
    /// implies the call-log equivalents. `maxSdkVersion`, if the originating
    /// `uses-permission` carried one, is preserved on the implied grant.
    pub fn implied_permissions(&self) -> Vec<(String, Option<String>)> {
        let declared: Vec<(&str, Option<&str>)> = self
            .axml
            .root
            .children()
            .filter(|c| c.name() == "uses-permission")
            .map(|c| (c.attr("name").unwrap_or_default(), c.attr("maxSdkVersion")))
            .collect();

        implied_permissions_from(self.effective_target_sdk(), &declared)
    }

    /// Retrieves all activities declared in the manifest.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/activity-element>
    #[inline]
    pub fn get_activities(&self) -> impl Iterator<Item = &str> {
        self.axml.get_all_attribute_values("activity", "name")
    }

    /// Retrieves all services declared in the manifest.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/service-element>
    pub fn get_services<'a>(&'a self) -> impl Iterator<Item = Service<'a>> {
        self.axml
            .root
            .descendants()
            .filter(|&el| el.name() == "service")
            .map(|el| Service {
                description: el.attr("description"),
                direct_boot_aware: el.attr("directBootAware"),
                enabled: el.attr("enabled"),
                exported: el.attr("exported"),
                foreground_service_type: el.attr("foregroundServiceType"),
                isolated_process: el.attr("isolatedProcess"),
                name: el.attr("name"),
                permission: el.attr("permission"),
                process: el.attr("process"),
                stop_with_task: el.attr("stopWithTask"),
            })
    }

    /// Retrieves all receivers declared in the manifest.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/receiver-element>
    pub fn get_receivers<'a>(&'a self) -> impl Iterator<Item = Receiver<'a>> {
        self.axml
            .root
            .descendants()
            .filter(|&el| el.name() == "receiver")
            .map(|el| Receiver {
                direct_boot_aware: el.attr("directBootAware"),
                enabled: el.attr("enabled"),
                exported: el.attr("exported"),
                icon: el.attr("icon"),
                label: el.attr("label"),
                name: el.attr("name"),
                permission: el.attr("permission"),
                process: el.attr("process"),
            })
    }

    /// Retrieves all providers declared in the manifest.
    ///
    /// See: <https://developer.android.com/guide/topics/manifest/provider-element>
    pub fn get_providers<'a>(&'a self) -> impl Iterator<Item = Provider<'a>> {
        self.axml
            .root
            .descendants()
            .filter(|&el| el.name() == "provider")
            .map(|el| Provider {
                authorities: el.attr("authorities"),
                direct_boot_aware: el.attr("directBootAware"),
                enabled: el.attr("enabled"),
                exported: el.attr("exported"),
                grant_uri_permissions: el.attr("grantUriPermissions"),
                multiprocess: el.attr("multiprocess"),
                name: el.attr("name"),
                permission: el.attr("permission"),
                process: el.attr("process"),
                read_permission: el.attr("readPermission"),
                write_permission: el.attr("writePermission"),
            })
    }

    /// Retrieves all APK signing signatures (v1, v2, v3 and v3.1).
    ///
    /// Combines results from multiple signature blocks within the APK file.
    pub fn get_signatures(&self) -> Result<Vec<Signature>, APKError> {
        let mut signatures = self
            .zip
            .get_certificates_v1()
            .map_err(APKError::CertificateError)?;

        signatures.extend(
            self.zip
                .get_certificates_v2()
                .map_err(APKError::CertificateError)?,
        );

        Ok(signatures)
    }

    /// Whether the archive carries a v1 (JAR-style) signature, i.e. at least
    /// one `META-INF/*.{RSA,EC,DSA}` entry. Cheap: only scans entry names,
    /// doesn't decode any PKCS#7 envelope.
    #[inline]
    pub fn is_signed_v1(&self) -> bool {
        self.zip.has_v1_signature()
    }

    /// Whether the archive carries an APK Signing Block v2 entry. Cheap: only
    /// scans the signing block's pair ids, doesn't decode any certificate.
    #[inline]
    pub fn is_signed_v2(&self) -> bool {
        self.zip.has_v2_signature()
    }

    /// Raw DER bytes of every v1 (JAR-style) signing certificate, independent
    /// of the richer [`Signature`]/[`CertificateInfo`](apk_info_zip::signature::CertificateInfo)
    /// projection [`Apk::get_signatures`] builds on top.
    pub fn certificates_v1(&self) -> Result<Vec<Vec<u8>>, APKError> {
        self.zip
            .get_certificates_der_v1()
            .map_err(APKError::CertificateError)
    }

    /// Raw DER bytes of every v2 signing certificate, independent of the
    /// richer [`Signature`]/[`CertificateInfo`](apk_info_zip::signature::CertificateInfo)
    /// projection [`Apk::get_signatures`] builds on top.
    pub fn certificates_v2(&self) -> Result<Vec<Vec<u8>>, APKError> {
        self.zip
            .get_certificates_der_v2()
            .map_err(APKError::CertificateError)
    }

    /// Projects the manifest-derived fields into a flat, serializable summary.
    pub fn to_json(&self) -> ApkJson {
        ApkJson {
            package_name: self.get_package_name(),
            min_sdk_version: self.get_min_sdk_version(),
            target_sdk_version: self.get_target_sdk_version(),
            max_sdk_version: self.get_max_sdk_version(),
            declared_permissions: self.get_declared_permissions().map(str::to_owned).collect(),
            shared_user_id: self.get_shared_user_id(),
            shared_user_label: self.get_shared_user_label(),
            shared_user_max_sdk_version: self.get_shared_user_max_sdk_version(),
            version_code: self.get_version_code(),
            version_name: self.get_version_name(),
            install_location: self.get_install_location(),
            features: self.get_features().map(str::to_owned).collect(),
            permissions: self.get_permissions().map(str::to_owned).collect(),
            permissions_sdk23: self.get_permissions_sdk23().map(str::to_owned).collect(),
        }
    }
}

/// See [`Apk::main_activity`]/[`Apk::label`]: a leading `.` is expanded to a
/// package-relative suffix, a bare name with no `.` at all is treated as
/// living directly under the package, anything else is already qualified.
fn qualify_name(package: &str, value: &str) -> String {
    if let Some(suffix) = value.strip_prefix('.') {
        format!("{package}.{suffix}")
    } else if !value.contains('.') {
        format!("{package}.{value}")
    } else {
        value.to_owned()
    }
}

/// See [`Apk::implied_permissions`]. `declared` is every `<uses-permission>`
/// entry as `(name, maxSdkVersion)`; `target` is [`Apk::effective_target_sdk`].
///
/// See: <https://cs.android.com/android/platform/superproject/+/android-latest-release:frameworks/base/services/core/java/com/android/server/pm/permission/PermissionManagerServiceImpl.java>
fn implied_permissions_from(
    target: u32,
    declared: &[(&str, Option<&str>)],
) -> Vec<(String, Option<String>)> {
    let max_sdk_for = |name: &str| {
        declared
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, max)| *max)
            .map(str::to_owned)
    };

    let mut implied = Vec::new();

    if target < 4 {
        implied.push((
            "android.permission.WRITE_EXTERNAL_STORAGE".to_owned(),
            max_sdk_for("android.permission.WRITE_EXTERNAL_STORAGE"),
        ));
        implied.push((
            "android.permission.READ_PHONE_STATE".to_owned(),
            max_sdk_for("android.permission.READ_PHONE_STATE"),
        ));
    }

    if declared
        .iter()
        .any(|(name, _)| *name == "android.permission.WRITE_EXTERNAL_STORAGE")
        || implied
            .iter()
            .any(|(name, _)| name == "android.permission.WRITE_EXTERNAL_STORAGE")
    {
        implied.push((
            "android.permission.READ_EXTERNAL_STORAGE".to_owned(),
            max_sdk_for("android.permission.WRITE_EXTERNAL_STORAGE"),
        ));
    }

    if target < 16 {
        for (contacts, call_log) in [
            (
                "android.permission.READ_CONTACTS",
                "android.permission.READ_CALL_LOG",
            ),
            (
                "android.permission.WRITE_CONTACTS",
                "android.permission.WRITE_CALL_LOG",
            ),
        ] {
            if declared.iter().any(|(name, _)| *name == contacts) {
                implied.push((call_log.to_owned(), max_sdk_for(contacts)));
            }
        }
    }

    implied
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualify_name_expands_leading_dot() {
        assert_eq!(qualify_name("com.ex", ".MainAct"), "com.ex.MainAct");
    }

    #[test]
    fn qualify_name_prefixes_bare_names() {
        assert_eq!(qualify_name("com.ex", "MyApp"), "com.ex.MyApp");
    }

    #[test]
    fn qualify_name_leaves_fully_qualified_names_unchanged() {
        assert_eq!(qualify_name("com.ex", "com.x.Y"), "com.x.Y");
    }

    #[test]
    fn implied_permissions_empty_for_modern_target_with_nothing_declared() {
        assert_eq!(implied_permissions_from(30, &[]), Vec::new());
    }

    #[test]
    fn implied_permissions_below_api_4_grants_storage_and_phone_state() {
        let implied = implied_permissions_from(3, &[]);
        assert!(
            implied
                .iter()
                .any(|(n, _)| n == "android.permission.WRITE_EXTERNAL_STORAGE")
        );
        assert!(
            implied
                .iter()
                .any(|(n, _)| n == "android.permission.READ_PHONE_STATE")
        );
        assert!(
            implied
                .iter()
                .any(|(n, _)| n == "android.permission.READ_EXTERNAL_STORAGE")
        );
    }

    #[test]
    fn implied_permissions_declared_write_storage_implies_read_storage() {
        let declared = [("android.permission.WRITE_EXTERNAL_STORAGE", Some("22"))];
        let implied = implied_permissions_from(30, &declared);
        assert_eq!(
            implied,
            vec![(
                "android.permission.READ_EXTERNAL_STORAGE".to_owned(),
                Some("22".to_owned())
            )]
        );
    }

    #[test]
    fn implied_permissions_below_api_16_propagates_contacts_to_call_log() {
        let declared = [
            ("android.permission.READ_CONTACTS", None),
            ("android.permission.WRITE_CONTACTS", Some("15")),
        ];
        let implied = implied_permissions_from(15, &declared);
        assert_eq!(
            implied,
            vec![
                ("android.permission.READ_CALL_LOG".to_owned(), None),
                (
                    "android.permission.WRITE_CALL_LOG".to_owned(),
                    Some("15".to_owned())
                ),
            ]
        );
    }

    #[test]
    fn implied_permissions_at_api_16_does_not_propagate_contacts() {
        let declared = [("android.permission.READ_CONTACTS", None)];
        assert_eq!(implied_permissions_from(16, &declared), Vec::new());
    }
}
