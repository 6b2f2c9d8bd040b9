//! entry_points.txt parser

use once_cell::sync::Lazy;
use regex::Regex;

/// `module[:object[.attr]] [extra1, extra2]`
static ENTRY_POINT_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<module>[\w.]+)\s*(:\s*(?P<object>[\w.]+))?\s*(?P<extras>\[.*\])?\s*$")
        .unwrap_or_else(|e| unreachable!("entry point pattern is valid: {e}"))
});

/// The distribution that declared an entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub name: String,
    pub version: Option<String>,
}

impl Distribution {
    /// Build from a metadata directory stem such as `requests-2.31.0`
    pub fn from_name_version(name_version: &str) -> Self {
        match name_version.split_once('-') {
            Some((name, version)) => Distribution {
                name: name.to_string(),
                version: Some(version.to_string()),
            },
            None => Distribution {
                name: name_version.to_string(),
                version: None,
            },
        }
    }
}

/// A named, installable reference to an object in a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub name: String,
    pub module: String,
    pub object: Option<String>,
    pub extras: Vec<String>,
    pub distribution: Option<Distribution>,
}

impl EntryPoint {
    /// Parse an entry point value; returns `None` when the value is malformed
    pub fn parse(name: &str, value: &str, distribution: Option<Distribution>) -> Option<Self> {
        let captures = ENTRY_POINT_VALUE.captures(value.trim())?;
        let module = captures.name("module")?.as_str().to_string();
        let object = captures.name("object").map(|m| m.as_str().to_string());
        let extras = captures
            .name("extras")
            .map(|m| {
                m.as_str()
                    .trim_start_matches('[')
                    .trim_end_matches(']')
                    .split(',')
                    .map(str::trim)
                    .filter(|extra| !extra.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(EntryPoint {
            name: name.to_string(),
            module,
            object,
            extras,
            distribution,
        })
    }
}

/// One `name = value` line from an entry_points.txt section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointLine {
    pub section: String,
    pub name: String,
    pub value: String,
}

/// Parse entry_points.txt content into raw `(section, name, value)` lines.
///
/// Keys are case-sensitive and only `=` separates a key from its value.
/// Indented lines continue the previous value.
pub fn parse_entry_points_txt(content: &str) -> Vec<EntryPointLine> {
    let mut entries: Vec<EntryPointLine> = Vec::new();
    let mut current_section: Option<String> = None;

    for raw_line in content.lines() {
        let line = raw_line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            current_section = Some(line[1..line.len() - 1].trim().to_string());
            continue;
        }

        let Some(ref section) = current_section else {
            continue;
        };

        if raw_line.starts_with([' ', '\t']) {
            if let Some(last) = entries.last_mut().filter(|e| &e.section == section) {
                last.value.push('\n');
                last.value.push_str(line);
                continue;
            }
        }

        let Some((name, value)) = line.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }

        if entries
            .iter()
            .any(|e| &e.section == section && e.name == name)
        {
            tracing::warn!("Duplicate entry point '{}' in [{}]", name, section);
            continue;
        }

        entries.push(EntryPointLine {
            section: section.clone(),
            name: name.to_string(),
            value: value.trim().to_string(),
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_console_scripts() {
        let content = r"[console_scripts]
black = black:patched_main
blackd = blackd:patched_main [d]

[distutils.commands]
build = setuptools.command.build:build
";
        let lines = parse_entry_points_txt(content);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].section, "console_scripts");
        assert_eq!(lines[0].name, "black");
        assert_eq!(lines[0].value, "black:patched_main");
        assert_eq!(lines[2].section, "distutils.commands");
    }

    #[test]
    fn test_keys_are_case_sensitive_and_comments_skipped() {
        let content = "# header\n[console_scripts]\n; note\nMyTool = tool.cli:main\nmytool = tool.cli:other\n";
        let lines = parse_entry_points_txt(content);
        let names: Vec<&str> = lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["MyTool", "mytool"]);
    }

    #[test]
    fn test_lines_outside_section_ignored() {
        let lines = parse_entry_points_txt("orphan = mod:func\n[gui_scripts]\napp = app:run\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "app");
    }

    #[test]
    fn test_entry_point_value_forms() {
        let ep = EntryPoint::parse("tool", "pkg.cli:main", None);
        assert!(ep.as_ref().is_some_and(|e| e.module == "pkg.cli"
            && e.object.as_deref() == Some("main")
            && e.extras.is_empty()));

        let dotted = EntryPoint::parse("tool", "pkg.cli : App.run [color, fast]", None);
        assert!(dotted.as_ref().is_some_and(|e| e.object.as_deref() == Some("App.run")
            && e.extras == vec!["color".to_string(), "fast".to_string()]));

        let module_only = EntryPoint::parse("tool", "pkg.__main__", None);
        assert!(module_only.is_some_and(|e| e.object.is_none()));
    }

    #[test]
    fn test_malformed_entry_point_value() {
        assert!(EntryPoint::parse("tool", "not a module:main", None).is_none());
        assert!(EntryPoint::parse("tool", "", None).is_none());
        assert!(EntryPoint::parse("tool", "pkg:main-func", None).is_none());
    }

    #[test]
    fn test_distribution_from_name_version() {
        assert_eq!(
            Distribution::from_name_version("requests-2.31.0"),
            Distribution {
                name: "requests".to_string(),
                version: Some("2.31.0".to_string()),
            }
        );
        assert_eq!(
            Distribution::from_name_version("localpkg").version,
            None
        );
    }
}
