//! Build script for generating diagnostic code tables at compile time.
//!
//! Reads `spec/diagnostics.jsonc` and writes into `OUT_DIR`:
//! - `generated_codes.rs`: one `pub const` per diagnostic code
//! - `generated_explain.rs`: id → long description
//! - `generated_severity.rs`: id → default severity
//! - `generated_source.rs`: id → producer source tag

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;
use z_toolchain_jsonc_strip::strip_jsonc;

fn main() {
    let spec_path = Path::new("spec/diagnostics.jsonc");
    println!("cargo:rerun-if-changed={}", spec_path.display());

    let raw = fs::read_to_string(spec_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", spec_path.display()));
    let spec: serde_json::Value = serde_json::from_str(&strip_jsonc(&raw))
        .expect("failed to parse diagnostics.jsonc as JSON");
    let diagnostics = spec["diagnostics"]
        .as_array()
        .expect("diagnostics.jsonc: expected `diagnostics` array");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let out_path = Path::new(&out_dir);

    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut seen_names: HashSet<&str> = HashSet::new();

    let header = "// Auto-generated from spec/diagnostics.jsonc. DO NOT EDIT.\n\n";
    let mut codes = String::from(header);
    let mut explain = String::from("match id {\n");
    let mut severity = String::from("match id {\n");
    let mut source = String::from("match id {\n");

    for (i, entry) in diagnostics.iter().enumerate() {
        let field = |key: &str| str_field(entry, i, key);
        let id = field("id");
        let const_name = field("constName");
        let summary = field("summary");
        let description = field("description");
        let sev = field("severity");
        let tag = field("source");

        assert!(
            id.len() == 5 && id.starts_with('Z') && id[1..].bytes().all(|b| b.is_ascii_digit()),
            "diagnostics[{i}]: id '{id}' must look like Z1234"
        );
        assert!(
            !const_name.is_empty()
                && const_name
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
                && const_name.as_bytes()[0].is_ascii_uppercase(),
            "diagnostics[{i}] (id={id}): constName '{const_name}' is not SCREAMING_SNAKE_CASE"
        );
        assert!(seen_ids.insert(id), "diagnostics[{i}]: duplicate id '{id}'");
        assert!(
            seen_names.insert(const_name),
            "diagnostics[{i}] (id={id}): duplicate constName '{const_name}'"
        );

        let sev_rs = match sev {
            "error" => "Severity::Error",
            "warn" => "Severity::Warn",
            other => panic!("diagnostics[{i}] (id={id}): invalid severity '{other}'"),
        };

        codes.push_str(&format!("/// {summary}\n"));
        codes.push_str(&format!("pub const {const_name}: &str = \"{id}\";\n\n"));
        explain.push_str(&format!(
            "    \"{id}\" => Some(\"{}\"),\n",
            escape_rust_string_literal(description)
        ));
        severity.push_str(&format!("    \"{id}\" => Some({sev_rs}),\n"));
        source.push_str(&format!(
            "    \"{id}\" => Some(\"{}\"),\n",
            escape_rust_string_literal(tag)
        ));
    }

    for table in [&mut explain, &mut severity, &mut source] {
        table.push_str("    _ => None,\n}\n");
    }

    write(out_path, "generated_codes.rs", &codes);
    write(out_path, "generated_explain.rs", &explain);
    write(out_path, "generated_severity.rs", &severity);
    write(out_path, "generated_source.rs", &source);
}

fn str_field<'a>(entry: &'a serde_json::Value, i: usize, key: &str) -> &'a str {
    entry[key]
        .as_str()
        .unwrap_or_else(|| panic!("diagnostics[{i}] missing `{key}`"))
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap_or_else(|e| panic!("failed to write {name}: {e}"));
}

fn escape_rust_string_literal(value: &str) -> String {
    value.chars().flat_map(char::escape_default).collect()
}
