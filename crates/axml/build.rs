use std::env;
use std::fs;
use std::path::PathBuf;

use phf_codegen::Map;
use serde_json::Value;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    generate_system_types(&out_dir);
    generate_attrs_manifest(&out_dir);
}

/// Generate `SYSTEM_TYPES`: android resource id -> bare attribute/type local
/// name, used to recover readable names from packed/obfuscated manifests
/// where the string pool reference is out of range.
fn generate_system_types(out_dir: &std::path::Path) {
    let json_path = PathBuf::from("src/assets/public_attrs.json");
    let json_str = fs::read_to_string(&json_path).expect("cannot read public_attrs.json");
    let json: Value = serde_json::from_str(&json_str).expect("invalid JSON in public_attrs.json");
    let entries = json.as_object().expect("public_attrs.json must be an object");

    let mut map = Map::new();
    for (id, name) in entries {
        if let (Ok(id), Some(name)) = (id.parse::<u32>(), name.as_str()) {
            map.entry(id, format!("{name:?}"));
        }
    }

    let output = format!(
        "pub(crate) static SYSTEM_TYPES: phf::Map<u32, &'static str> = {};\n",
        map.build()
    );
    fs::write(out_dir.join("system_types_phf.rs"), output).unwrap();
    println!("cargo:rerun-if-changed={}", json_path.display());
}

/// Generate `ATTRS_MANIFEST`: attribute local name -> (kind, items), used to
/// stringify enum/flag-typed manifest attribute values such as
/// `installLocation` or `configChanges`.
fn generate_attrs_manifest(out_dir: &std::path::Path) {
    let json_path = PathBuf::from("src/assets/attrs_manifest.json");
    let json_str = fs::read_to_string(&json_path).expect("cannot read attrs_manifest.json");
    let json: Value =
        serde_json::from_str(&json_str).expect("invalid JSON in attrs_manifest.json");
    let entries = json.as_object().expect("attrs_manifest.json must be an object");

    let mut map = Map::new();
    for (name, def) in entries {
        let kind = def.get("kind").and_then(Value::as_str).unwrap_or("enum");
        let items = def
            .get("items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut rendered = String::from("&[");
        for item in &items {
            let pair = item.as_array().expect("item must be a [name, value] pair");
            let item_name = pair[0].as_str().unwrap_or_default();
            let item_value = pair[1].as_i64().unwrap_or_default();
            rendered.push_str(&format!("({item_name:?}, {item_value}),"));
        }
        rendered.push(']');

        map.entry(name.as_str(), format!("({kind:?}, {rendered})"));
    }

    let output = format!(
        "pub(crate) static ATTRS_MANIFEST: phf::Map<&'static str, (&'static str, &'static [(&'static str, i64)])> = {};\n",
        map.build()
    );
    fs::write(out_dir.join("attrs_manifest_phf.rs"), output).unwrap();
    println!("cargo:rerun-if-changed={}", json_path.display());
}
