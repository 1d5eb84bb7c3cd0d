//! `providers` command

use serde_json::json;

use super::{CliError, OutputFormat};
use crate::provider::ProviderKind;

/// Render the provider list, marking the selected ones with their priority
pub fn render(selected: &[ProviderKind], format: OutputFormat) -> Result<String, CliError> {
    let priority = |kind: ProviderKind| selected.iter().position(|k| *k == kind).map(|i| i + 1);

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = ProviderKind::ALL
                .iter()
                .map(|kind| {
                    json!({
                        "id": kind.to_string(),
                        "name": kind.display_name(),
                        "priority": priority(*kind),
                    })
                })
                .collect();
            Ok(serde_json::to_string_pretty(&entries)?)
        }
        OutputFormat::Human => {
            let mut lines = vec![format!("Available providers ({}):", ProviderKind::ALL.len())];
            for kind in ProviderKind::ALL {
                let marker = match priority(kind) {
                    Some(p) => format!("[{p}]"),
                    None => "[-]".to_string(),
                };
                lines.push(format!("  {marker} {:<14} {}", kind.to_string(), kind.display_name()));
            }
            Ok(lines.join("\n"))
        }
    }
}
