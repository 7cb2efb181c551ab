//! Subcommand bodies, written against readers and writers so they can be
//! exercised without a terminal.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scarfconv_config::AppConfig;
use scarfconv_core::{
    AttributeLoader, AttributeSummary, EmissionBridge, FileSource, JsonLinesSource,
    JsonReportWriter, LoadedAttributes,
};
use tracing::{info, warn};

/// The tool list to read: the command line override, else the config.
pub fn tool_list_path(config: &AppConfig, override_path: Option<&Path>) -> PathBuf {
    override_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.tool_list.path))
}

pub fn load_attributes(config: &AppConfig, tool_list: &Path, tool: &str) -> Result<LoadedAttributes> {
    let loader = AttributeLoader::from_config(config);
    let loaded = loader
        .load(&FileSource::new(tool_list), tool)
        .with_context(|| format!("failed to load attributes for tool {tool:?}"))?;
    if loaded.registry.valid_entries().next().is_none() {
        warn!(
            tool,
            attribute_map = %config.tool_list.labels.attribute_map,
            "No attributes are valid for this tool; findings will be empty"
        );
    }
    Ok(loaded)
}

/// Convert between files, stdin and stdout. The tool list is loaded before
/// the output is created, so a bad tool list leaves the output untouched.
pub fn convert_paths(
    config: &AppConfig,
    tool_list: &Path,
    tool: &str,
    input: Option<&Path>,
    output: Option<&Path>,
    pretty: bool,
) -> Result<AttributeSummary> {
    let mut loaded = load_attributes(config, tool_list, tool)?;

    let reader: Box<dyn Read> = match input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    convert(&mut loaded, tool, reader, writer, pretty)
}

/// Filter findings from `input` into a report on `output`, logging how many
/// findings carried each valid attribute.
pub fn convert<R: Read, W: Write>(
    loaded: &mut LoadedAttributes,
    tool: &str,
    input: R,
    output: W,
    pretty: bool,
) -> Result<AttributeSummary> {
    let mut source = JsonLinesSource::new(input);
    let mut writer = JsonReportWriter::new(output).pretty(pretty);
    let summary = EmissionBridge::new(&mut loaded.registry)
        .run(tool, &mut source, &mut writer)
        .context("failed to convert findings")?;

    for count in &summary.attributes {
        info!(
            attribute = %count.name,
            occurrences = count.occurrences,
            total = summary.total_findings,
            "The number of {} found is {}/{}",
            count.name,
            count.occurrences,
            summary.total_findings
        );
    }
    Ok(summary)
}

/// Print a tool's classification and attribute list.
pub fn describe<W: Write>(loaded: &LoadedAttributes, all: bool, mut out: W) -> Result<()> {
    writeln!(out, "{loaded}")?;
    for entry in &loaded.registry {
        if entry.is_valid() {
            writeln!(out, "  + {}", entry.name())?;
        } else if all {
            writeln!(out, "  - {}", entry.name())?;
        }
    }
    Ok(())
}

pub fn show_config<W: Write>(config: &AppConfig, path: &Path, show: bool, mut out: W) -> Result<()> {
    if show {
        let toml_str =
            toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        writeln!(out, "{toml_str}")?;
    } else {
        writeln!(out, "Configuration at '{}' is valid.", path.display())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scarfconv_test_utils::config::TestConfigBuilder;
    use scarfconv_test_utils::fixtures::ToolListFile;
    use scarfconv_test_utils::log_capture::LogCapture;
    use serde_json::{Value, json};

    fn scenario_config(file: &ToolListFile) -> AppConfig {
        TestConfigBuilder::new()
            .tool_list_path(file.path())
            .attribute_map_label("attribute-map")
            .build()
    }

    fn lines(bytes: Vec<u8>) -> Vec<String> {
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    // ── Paths ───────────────────────────────────────────────────

    #[test]
    fn test_tool_list_override() {
        let config = AppConfig::default();
        assert_eq!(
            tool_list_path(&config, None),
            PathBuf::from("Scarf_ToolList.json")
        );
        assert_eq!(
            tool_list_path(&config, Some(Path::new("/tmp/other.json"))),
            PathBuf::from("/tmp/other.json")
        );
    }

    // ── Convert ─────────────────────────────────────────────────

    #[test_log::test]
    fn test_convert_filters_findings() {
        let file = ToolListFile::scenario();
        let mut loaded = load_attributes(&scenario_config(&file), file.path(), "ToolA").unwrap();
        let input = "{\"sev\":\"high\",\"loc\":\"x.c:3\"}\n{\"loc\":\"y.c:4\"}\n";
        let mut out = Vec::new();

        let summary = convert(&mut loaded, "ToolA", input.as_bytes(), &mut out, true).unwrap();
        assert_eq!(summary.total_findings, 2);
        assert_eq!(summary.get("sev"), Some(1));

        let report: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(report["findings"], json!([{"sev": "high"}, {}]));
    }

    #[test]
    fn test_convert_rejects_malformed_findings() {
        let file = ToolListFile::scenario();
        let mut loaded = load_attributes(&scenario_config(&file), file.path(), "ToolA").unwrap();
        let err = convert(&mut loaded, "ToolA", "{\"sev\":".as_bytes(), Vec::new(), false)
            .unwrap_err();
        assert!(format!("{err:#}").contains("failed to read finding 0"), "{err:#}");
    }

    #[test]
    fn test_convert_paths_writes_report() {
        let file = ToolListFile::scenario();
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("findings.jsonl");
        let output = dir.path().join("report.json");
        std::fs::write(&input, "{\"sev\":\"low\",\"loc\":\"z.c:1\"}\n").unwrap();

        let summary = convert_paths(
            &scenario_config(&file),
            file.path(),
            "ToolB",
            Some(&input),
            Some(&output),
            false,
        )
        .unwrap();
        assert_eq!(summary.get("loc"), Some(1));

        let report: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(report["findings"], json!([{"loc": "z.c:1"}]));
    }

    #[test]
    fn test_convert_missing_tool_list_leaves_output_alone() {
        let file = ToolListFile::scenario();
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("findings.jsonl");
        let created = dir.path().join("new.json");
        let existing = dir.path().join("old.json");
        std::fs::write(&input, "").unwrap();
        std::fs::write(&existing, "previous report").unwrap();
        let missing = file.dir().join("nope.json");

        let err = convert_paths(
            &scenario_config(&file),
            &missing,
            "ToolA",
            Some(&input),
            Some(&created),
            false,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("nope.json"), "{err:#}");
        assert!(!created.exists());

        convert_paths(
            &scenario_config(&file),
            &missing,
            "ToolA",
            Some(&input),
            Some(&existing),
            false,
        )
        .unwrap_err();
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "previous report");
    }

    // ── Attributes ──────────────────────────────────────────────

    #[test]
    fn test_describe_valid_only() {
        let file = ToolListFile::scenario();
        let loaded = load_attributes(&scenario_config(&file), file.path(), "ToolB").unwrap();
        let mut out = Vec::new();
        describe(&loaded, false, &mut out).unwrap();
        assert_eq!(
            lines(out),
            vec!["ToolB (tool-specific): 1 of 2 attributes valid", "  + loc"]
        );
    }

    #[test]
    fn test_describe_all() {
        let file = ToolListFile::scenario();
        let loaded = load_attributes(&scenario_config(&file), file.path(), "ToolA").unwrap();
        let mut out = Vec::new();
        describe(&loaded, true, &mut out).unwrap();
        assert_eq!(
            lines(out),
            vec![
                "ToolA (generic (listed)): 1 of 2 attributes valid",
                "  - loc",
                "  + sev",
            ]
        );
    }

    #[test]
    fn test_default_attribute_map_label_leaves_tool_unclassified() {
        let file = ToolListFile::scenario();
        let config = TestConfigBuilder::new().tool_list_path(file.path()).build();
        let (capture, _guard) = LogCapture::install();

        let loaded = load_attributes(&config, file.path(), "ToolB").unwrap();
        let mut out = Vec::new();
        describe(&loaded, false, &mut out).unwrap();
        assert_eq!(lines(out), vec!["ToolB (unclassified): 0 of 2 attributes valid"]);
        assert!(capture.contains_message("No attributes are valid"));
    }

    // ── Config ──────────────────────────────────────────────────

    #[test]
    fn test_show_config_round_trips() {
        let config = TestConfigBuilder::new().log_level("debug").build();
        let mut out = Vec::new();
        show_config(&config, Path::new("scarfconv.toml"), true, &mut out).unwrap();
        let parsed = AppConfig::parse(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(parsed.logging.level, "debug");
    }

    #[test]
    fn test_config_valid_message() {
        let mut out = Vec::new();
        show_config(&AppConfig::default(), Path::new("scarfconv.toml"), false, &mut out).unwrap();
        assert_eq!(lines(out), vec!["Configuration at 'scarfconv.toml' is valid."]);
    }
}
