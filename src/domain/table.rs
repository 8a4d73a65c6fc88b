use super::filter::{FilterPolicy, FormatTable};
use super::model::FormatRecord;

const BYTES_PER_MB: f64 = 1_048_576.0;

pub fn format_size(size_bytes: Option<u64>) -> String {
    match size_bytes {
        Some(bytes) if bytes > 0 => format!("{:.1}", bytes as f64 / BYTES_PER_MB),
        _ => "N/A".to_string(),
    }
}

pub fn format_resolution(format: &FormatRecord) -> String {
    match (format.width, format.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => format!("{}x{}", w, h),
        _ => format
            .note
            .clone()
            .filter(|note| !note.is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
    }
}

/// Render the kept formats as the fixed-width listing printed by the
/// console variants.
pub fn render(table: &FormatTable, policy: FilterPolicy) -> String {
    let mut out = String::new();
    match policy {
        FilterPolicy::Progressive => {
            out.push_str("CODE | EXT | RESOLUTION | SIZE (MB)\n");
            out.push_str("-----|-----|------------|----------\n");
        }
        FilterPolicy::Permissive => {
            out.push_str("CODE | EXT | RESOLUTION | SIZE (MB)  | NOTE\n");
            out.push_str("-----|-----|------------|------------|-----\n");
        }
    }

    for format in table.rows() {
        let line = match policy {
            FilterPolicy::Progressive => format!(
                "{:<4} | {:<3} | {:<10} | {:<10}",
                format.id,
                format.ext,
                format_resolution(format),
                format_size(format.size_bytes)
            ),
            FilterPolicy::Permissive => format!(
                "{:<4} | {:<3} | {:<10} | {:<10} | {}",
                format.id,
                format.ext,
                format_resolution(format),
                format_size(format.size_bytes),
                format.note.as_deref().unwrap_or("")
            ),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
