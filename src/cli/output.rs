use std::fmt::Write as FmtWrite;

use console::style;

use crate::models::{CatalogEntry, OutputFormat, SeedReport};

pub trait Formatter {
    fn format_seed_report(&self, report: &SeedReport) -> String;
    fn format_catalog(&self, entries: &[CatalogEntry]) -> String;
    fn format_status(&self, status: &StatusInfo) -> String;
    fn format_message(&self, message: &str) -> String;
    fn format_error(&self, error: &str) -> String;
}

#[derive(Debug, Clone, Default)]
pub struct StatusInfo {
    pub catalog_endpoint: String,
    pub catalog_entries: Option<usize>,
    pub catalog_error: Option<String>,
    pub model_dir: Option<String>,
    pub model_present: bool,
    pub device: Option<String>,
    pub index: String,
    pub index_connected: bool,
    pub index_dimension: Option<u64>,
    pub index_vectors: u64,
    pub index_error: Option<String>,
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_seed_report(&self, report: &SeedReport) -> String {
        let mut output = String::new();

        for record in &report.succeeded {
            writeln!(
                output,
                "{} Added vector for {}",
                style("✓").green(),
                record.metadata.label
            )
            .unwrap();
        }
        for failure in &report.failed {
            writeln!(
                output,
                "{} Failed for {}: {}",
                style("✗").red(),
                failure.name,
                failure.cause
            )
            .unwrap();
        }
        writeln!(output).unwrap();

        if report.is_empty() {
            writeln!(output, "No vectors were inserted.").unwrap();
        } else {
            writeln!(
                output,
                "Upserted {} vectors into index '{}'.",
                report.upserted, report.index
            )
            .unwrap();
        }
        writeln!(
            output,
            "Embedded: {}  Failed: {}  Duration: {}ms",
            report.succeeded.len(),
            report.failed.len(),
            report.duration_ms
        )
        .unwrap();

        output
    }

    fn format_catalog(&self, entries: &[CatalogEntry]) -> String {
        if entries.is_empty() {
            return "No catalog entries.\n".to_string();
        }

        let mut output = String::new();
        for entry in entries {
            writeln!(output, "[{}] {}", entry.id, entry.name).unwrap();
            if let Some(ref description) = entry.description
                && !description.is_empty()
            {
                writeln!(output, "    {}", description).unwrap();
            }
            writeln!(
                output,
                "    {}",
                entry.image_url.as_deref().unwrap_or("(no image)")
            )
            .unwrap();
        }
        writeln!(output, "\n{} entries", entries.len()).unwrap();
        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "Status").unwrap();
        writeln!(output, "------").unwrap();

        let catalog_status = if status.catalog_entries.is_some() {
            "[REACHABLE]"
        } else {
            "[UNAVAILABLE]"
        };
        writeln!(output, "Catalog:       {}", catalog_status).unwrap();
        writeln!(output, "  Endpoint:    {}", status.catalog_endpoint).unwrap();
        if let Some(count) = status.catalog_entries {
            writeln!(output, "  Entries:     {}", count).unwrap();
        }
        if let Some(ref err) = status.catalog_error {
            writeln!(output, "  Error:       {}", err).unwrap();
        }
        writeln!(output).unwrap();

        let model_status = if status.model_present {
            "[FOUND]"
        } else {
            "[MISSING]"
        };
        writeln!(output, "Image Model:   {}", model_status).unwrap();
        if let Some(ref dir) = status.model_dir {
            writeln!(output, "  Directory:   {}", dir).unwrap();
        }
        if let Some(ref device) = status.device {
            writeln!(output, "  Device:      {}", device).unwrap();
        }
        writeln!(output).unwrap();

        let index_status = if status.index_connected {
            "[CONNECTED]"
        } else {
            "[DISCONNECTED]"
        };
        writeln!(output, "Vector Index:  {}", index_status).unwrap();
        writeln!(output, "  Index:       {}", status.index).unwrap();
        if status.index_connected {
            if let Some(dim) = status.index_dimension {
                writeln!(output, "  Dimension:   {}", dim).unwrap();
            }
            writeln!(output, "  Vectors:     {}", status.index_vectors).unwrap();
        }
        if let Some(ref err) = status.index_error {
            writeln!(output, "  Error:       {}", err).unwrap();
        }

        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("{}\n", message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}\n", error)
    }
}

pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render(&self, json: &serde_json::Value) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(json)
        } else {
            serde_json::to_string(json)
        };
        let mut out = rendered.unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e));
        out.push('\n');
        out
    }
}

impl Formatter for JsonFormatter {
    fn format_seed_report(&self, report: &SeedReport) -> String {
        let succeeded: Vec<serde_json::Value> = report
            .succeeded
            .iter()
            .map(|r| serde_json::json!({"id": r.id, "label": r.metadata.label}))
            .collect();

        let json = serde_json::json!({
            "index": report.index,
            "started_at": report.started_at,
            "duration_ms": report.duration_ms,
            "upserted": report.upserted,
            "succeeded": succeeded,
            "failed": report.failed,
        });
        self.render(&json)
    }

    fn format_catalog(&self, entries: &[CatalogEntry]) -> String {
        self.render(&serde_json::to_value(entries).unwrap_or_default())
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let json = serde_json::json!({
            "catalog": {
                "endpoint": status.catalog_endpoint,
                "reachable": status.catalog_entries.is_some(),
                "entries": status.catalog_entries,
                "error": status.catalog_error,
            },
            "model": {
                "directory": status.model_dir,
                "present": status.model_present,
                "device": status.device,
            },
            "index": {
                "name": status.index,
                "connected": status.index_connected,
                "dimension": status.index_dimension,
                "vectors": status.index_vectors,
                "error": status.index_error,
            }
        });
        self.render(&json)
    }

    fn format_message(&self, message: &str) -> String {
        self.render(&serde_json::json!({"message": message}))
    }

    fn format_error(&self, error: &str) -> String {
        self.render(&serde_json::json!({"error": error}))
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemFailure, RecordMetadata, UpsertRecord};

    fn report(succeeded: usize, failed: usize) -> SeedReport {
        SeedReport {
            index: "menus".to_string(),
            started_at: chrono::Utc::now(),
            duration_ms: 12,
            succeeded: (0..succeeded)
                .map(|i| UpsertRecord {
                    id: i.to_string(),
                    values: vec![1.0],
                    metadata: RecordMetadata {
                        label: format!("Dish {i}"),
                        description: String::new(),
                    },
                })
                .collect(),
            failed: (0..failed)
                .map(|i| ItemFailure {
                    id: format!("f{i}"),
                    name: format!("Broken {i}"),
                    cause: "image host returned status 404".to_string(),
                })
                .collect(),
            upserted: succeeded,
        }
    }

    #[test]
    fn test_text_report_lines() {
        let text = TextFormatter.format_seed_report(&report(1, 1));
        assert!(text.contains("Added vector for Dish 0"));
        assert!(text.contains("Failed for Broken 0: image host returned status 404"));
        assert!(text.contains("Upserted 1 vectors into index 'menus'."));
    }

    #[test]
    fn test_text_report_nothing_inserted() {
        let text = TextFormatter.format_seed_report(&report(0, 2));
        assert!(text.contains("No vectors were inserted."));
    }

    #[test]
    fn test_json_report_omits_vectors() {
        let json: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new(false).format_seed_report(&report(2, 1)))
                .unwrap();
        assert_eq!(json["upserted"], 2);
        assert_eq!(json["succeeded"][1]["label"], "Dish 1");
        assert!(json["succeeded"][0].get("values").is_none());
        assert_eq!(json["failed"][0]["name"], "Broken 0");
    }

    #[test]
    fn test_catalog_text() {
        let entries = vec![CatalogEntry::new(1, "Pho", "Beef noodle soup", "http://x/pho.jpg")];
        let text = TextFormatter.format_catalog(&entries);
        assert!(text.contains("[1] Pho"));
        assert!(text.contains("1 entries"));
    }
}
