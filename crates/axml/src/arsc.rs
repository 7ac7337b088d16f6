use log::warn;
use winnow::prelude::*;

use crate::ARCSError;
use crate::structs::{
    ResTableConfig, ResTableEntry, ResTableHeader, ResTablePackage, ResourceType, ResourceValue,
    ResourceValueType, StringPool,
};

/// Parsed `resources.arsc` resource table.
///
/// A table is made of a single global value string pool (referenced by
/// [`ResourceValueType::String`] entries) followed by one [`ResTablePackage`]
/// per declared package.
pub struct ARSC {
    pub is_tampered: bool,

    header: ResTableHeader,
    string_pool: StringPool,
    packages: Vec<ResTablePackage>,
}

impl ARSC {
    /// References can chain (a reference pointing at another reference), observed
    /// in the wild with obfuscated/protected apps - bail out instead of looping forever.
    const MAX_REFERENCE_DEPTH: u8 = 10;

    pub fn new(input: &mut &[u8]) -> Result<ARSC, ARCSError> {
        if input.len() < 12 {
            return Err(ARCSError::TooSmallError);
        }

        let header = ResTableHeader::parse(input).map_err(|_| ARCSError::HeaderError)?;

        let mut is_tampered = false;

        // don't drop error, maybe another shit malware technique
        if header.header.type_ != ResourceType::Table {
            is_tampered = true;
        }

        if header.package_count < 1 {
            warn!(
                "expected at least one resource package, but got {}",
                header.package_count
            );
        }

        let string_pool = StringPool::parse(input).map_err(|_| ARCSError::StringPoolError)?;

        let mut packages = Vec::with_capacity(header.package_count as usize);
        for _ in 0..header.package_count {
            match ResTablePackage::parse(input) {
                Ok(package) => packages.push(package),
                Err(_) => {
                    warn!("failed to parse a resource table package, stopping early");
                    break;
                }
            }
        }

        if packages.is_empty() {
            return Err(ARCSError::ResourceTableError);
        }

        Ok(ARSC {
            is_tampered,
            header,
            string_pool,
            packages,
        })
    }

    /// Resolve a resource id (as found in a [`ResourceValueType::Reference`] or
    /// [`ResourceValueType::Attribute`] value) down to a human readable string,
    /// picking the entry whose config best matches `config` and chasing
    /// references-to-references until a concrete value is reached.
    pub(crate) fn resolve(&self, mut res_id: u32, config: &ResTableConfig) -> Option<String> {
        for _ in 0..Self::MAX_REFERENCE_DEPTH {
            let package_id = res_id >> 24;
            let type_id = ((res_id >> 16) & 0xff) as u8;
            let entry_id = (res_id & 0xffff) as u16;

            let package = self.packages.iter().find(|p| p.header.id == package_id)?;
            let entry = package.get_entry(config, type_id, entry_id)?;

            let value = match entry {
                ResTableEntry::Default(e) => &e.value,
                // style maps and compact entries aren't plain values, nothing sane to resolve to
                ResTableEntry::Complex(_) | ResTableEntry::Compact(_) | ResTableEntry::NoEntry => {
                    return None;
                }
            };

            if value.data_type == ResourceValueType::Reference {
                res_id = value.data;
                continue;
            }

            return Some(value.to_string(&self.string_pool));
        }

        None
    }

    /// Resolve a resource id to the value carried by whichever config has the
    /// highest density at or below `max_dpi` (falling back to the lowest
    /// density above it when nothing fits) - used for picking an icon variant
    /// suited to a target screen rather than a single device configuration.
    pub fn resolve_best_density(&self, res_id: u32, max_dpi: u16) -> Option<String> {
        let package_id = res_id >> 24;
        let type_id = ((res_id >> 16) & 0xff) as u8;
        let entry_id = (res_id & 0xffff) as u16;

        let package = self.packages.iter().find(|p| p.header.id == package_id)?;

        let mut best: Option<(u16, &ResTableEntry)> = None;
        for (config, entry) in package.entries_for(type_id, entry_id) {
            if matches!(entry, ResTableEntry::NoEntry) {
                continue;
            }

            let (_, _, density) = config.get_orientation_touchscreen_density();
            let fits = density == 0 || density <= max_dpi;

            best = match best {
                Some((best_density, _)) => {
                    let better = if fits && best_density <= max_dpi {
                        density > best_density
                    } else if fits {
                        true
                    } else {
                        false
                    };
                    if better { Some((density, entry)) } else { best }
                }
                None => Some((density, entry)),
            };
        }

        match best? {
            (_, ResTableEntry::Default(e)) => Some(e.value.to_string(&self.string_pool)),
            _ => None,
        }
    }

    /// Direct resource id lookup.
    ///
    /// With `desired_config = None`, returns every `(config, value)` pair
    /// declared for this id across all known configs. With `Some(config)`,
    /// filters out incompatible configs and returns just the single best
    /// AOSP-ranked match (locale > screen layout > orientation > density > …,
    /// via [`ResTablePackage::get_entry`]), wrapped in a one-element list so
    /// callers don't need to special-case the two modes.
    pub fn get(
        &self,
        res_id: u32,
        desired_config: Option<&ResTableConfig>,
    ) -> Vec<(ResTableConfig, String)> {
        let package_id = res_id >> 24;
        let type_id = ((res_id >> 16) & 0xff) as u8;
        let entry_id = (res_id & 0xffff) as u16;

        let Some(package) = self.packages.iter().find(|p| p.header.id == package_id) else {
            return Vec::new();
        };

        match desired_config {
            Some(config) => package
                .get_entry(config, type_id, entry_id)
                .and_then(Self::entry_value)
                .map(|value| vec![(config.clone(), value.to_string(&self.string_pool))])
                .unwrap_or_default(),
            None => package
                .entries_for(type_id, entry_id)
                .filter_map(|(config, entry)| {
                    Self::entry_value(entry)
                        .map(|value| (config.clone(), value.to_string(&self.string_pool)))
                })
                .collect(),
        }
    }

    /// Extract the plain value out of a table entry, if it carries one -
    /// complex (style map) and compact entries have nothing a caller can
    /// treat as a single resolved value.
    fn entry_value(entry: &ResTableEntry) -> Option<&ResourceValue> {
        match entry {
            ResTableEntry::Default(e) => Some(&e.value),
            ResTableEntry::Complex(_) | ResTableEntry::Compact(_) | ResTableEntry::NoEntry => None,
        }
    }

    /// Same as [`ARSC::resolve_best_density`], but takes the raw attribute value
    /// as stored in a manifest (`@7f080001`, `?android:7f080001`) instead of a
    /// bare resource id, returning `None` if it isn't a reference.
    pub fn resolve_icon_reference(&self, raw: &str, max_dpi: u16) -> Option<String> {
        let res_id = parse_reference_id(raw)?;
        self.resolve_best_density(res_id, max_dpi)
    }

    #[inline]
    pub fn package_count(&self) -> u32 {
        self.header.package_count
    }

    /// Names of every resource package declared in this table, in declaration order.
    pub fn get_packages_names(&self) -> Vec<String> {
        self.packages.iter().map(|p| p.header.name()).collect()
    }

    /// Looks up the `string` resource named `key` (the part after
    /// `@string/`) within package `pkg`, resolving it under the default
    /// device configuration.
    ///
    /// Returns the key exactly as found in the package's key-string pool
    /// alongside its resolved value, or `None` if the package, the `string`
    /// type, or the key itself isn't declared - callers treat a miss as an
    /// empty string rather than propagating an error.
    pub fn get_string(&self, pkg: &str, key: &str) -> Option<(String, String)> {
        let package = self.packages.iter().find(|p| p.header.name() == pkg)?;
        let type_id = package.type_id_for("string")?;
        let entry = package.find_default_entry_by_key(type_id, key)?;

        let source_key = package.key_strings.get(entry.index)?.clone();
        let resolved = entry.value.to_string(&self.string_pool);

        Some((source_key, resolved))
    }
}

/// Parses a `@7f080001`/`?android:7f080001`-style manifest attribute value
/// into the bare resource id it refers to, or `None` if `raw` isn't a
/// reference at all (a literal string, color, dimension, etc).
pub(crate) fn parse_reference_id(raw: &str) -> Option<u32> {
    let rest = raw.strip_prefix('@').or_else(|| raw.strip_prefix('?'))?;
    let rest = rest.strip_prefix("android:").unwrap_or(rest);
    u32::from_str_radix(rest, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reference_id_plain() {
        assert_eq!(parse_reference_id("@7f080001"), Some(0x7f08_0001));
    }

    #[test]
    fn parse_reference_id_attribute_style() {
        assert_eq!(parse_reference_id("?7f010002"), Some(0x7f01_0002));
    }

    #[test]
    fn parse_reference_id_android_namespaced() {
        assert_eq!(parse_reference_id("@android:01010034"), Some(0x0101_0034));
    }

    #[test]
    fn parse_reference_id_rejects_non_references() {
        assert_eq!(parse_reference_id("true"), None);
        assert_eq!(parse_reference_id("Hello World"), None);
        assert_eq!(parse_reference_id("#FF00FF"), None);
    }

    #[test]
    fn parse_reference_id_rejects_malformed_hex() {
        assert_eq!(parse_reference_id("@not-hex"), None);
    }
}
