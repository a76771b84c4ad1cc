//! Machine-readable report of a resolution/evaluation run.

use std::path::Path;

use crate::exec::CountResult;
use crate::resolve::ClauseValue;

/// Per-site and whole-file results for `resolve`/`run` output.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub file: String,
    pub sites: Vec<CountResult>,
}

impl RunReport {
    pub fn new(file: String, sites: Vec<CountResult>) -> Self {
        Self { file, sites }
    }

    /// Serialize the report to a JSON string. Unspecified parameters
    /// serialize as `null` to keep the sentinel distinct from any
    /// legitimate value.
    pub fn to_json(&self) -> String {
        let mut out = String::new();
        out.push_str("{\n");
        out.push_str(&format!("  \"file\": \"{}\",\n", escape(&self.file)));
        out.push_str("  \"sites\": [\n");
        for (i, site) in self.sites.iter().enumerate() {
            out.push_str("    {\n");
            out.push_str(&format!("      \"offset\": {},\n", site.span.start));
            out.push_str(&format!("      \"extent\": {},\n", site.extent));
            out.push_str(&format!("      \"predicate\": \"{}\",\n", site.predicate));
            out.push_str(&format!(
                "      \"num_gangs\": {},\n",
                json_clause(site.shape.num_gangs)
            ));
            out.push_str(&format!(
                "      \"num_workers\": {},\n",
                json_clause(site.shape.num_workers)
            ));
            out.push_str(&format!(
                "      \"vector_length\": {},\n",
                json_clause(site.shape.vector_length)
            ));
            out.push_str(&format!("      \"matches\": {}\n", site.matches));
            out.push_str("    }");
            if i + 1 < self.sites.len() {
                out.push(',');
            }
            out.push('\n');
        }
        out.push_str("  ]\n");
        out.push_str("}\n");
        out
    }

    /// Save the report to a JSON file.
    pub fn save_json(&self, path: &Path) -> Result<(), String> {
        std::fs::write(path, self.to_json())
            .map_err(|e| format!("cannot write '{}': {}", path.display(), e))
    }
}

fn json_clause(value: ClauseValue) -> String {
    match value {
        ClauseValue::Specified(n) => n.to_string(),
        ClauseValue::Unspecified => "null".to_string(),
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Predicate;
    use crate::resolve::{ClauseValue, EffectiveShape};
    use crate::span::Span;

    fn sample_report() -> RunReport {
        RunReport::new(
            "test.acc".to_string(),
            vec![CountResult {
                span: Span::new(30, 38),
                extent: 10,
                predicate: Predicate::Diagonal,
                shape: EffectiveShape {
                    num_gangs: ClauseValue::Specified(2),
                    num_workers: ClauseValue::Unspecified,
                    vector_length: ClauseValue::Specified(16),
                },
                matches: 55,
            }],
        )
    }

    #[test]
    fn test_json_contains_site_fields() {
        let json = sample_report().to_json();
        assert!(json.contains("\"file\": \"test.acc\""));
        assert!(json.contains("\"offset\": 30"));
        assert!(json.contains("\"extent\": 10"));
        assert!(json.contains("\"predicate\": \"i == j\""));
        assert!(json.contains("\"num_gangs\": 2"));
        assert!(json.contains("\"num_workers\": null"));
        assert!(json.contains("\"vector_length\": 16"));
        assert!(json.contains("\"matches\": 55"));
    }

    #[test]
    fn test_empty_report() {
        let report = RunReport::new("empty.acc".to_string(), Vec::new());
        let json = report.to_json();
        assert!(json.contains("\"sites\": [\n  ]"));
    }

    #[test]
    fn test_save_json_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.json");
        sample_report().save_json(&path).expect("save");
        let content = std::fs::read_to_string(&path).expect("read back");
        assert!(content.contains("\"matches\": 55"));
    }

    #[test]
    fn test_save_json_reports_bad_path() {
        let err = sample_report()
            .save_json(Path::new("/nonexistent/dir/report.json"))
            .unwrap_err();
        assert!(err.contains("cannot write"));
    }
}
