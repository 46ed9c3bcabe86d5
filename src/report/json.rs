use super::{Report, ReportError};

/// Renders `report` as pretty-printed JSON (two-space indent, UTF-8 kept as-is).
pub fn render_json(report: &Report) -> Result<String, ReportError> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

/// Reads a report back from its JSON form.
pub fn parse_json(json: &str) -> Result<Report, ReportError> {
    Ok(serde_json::from_str(json)?)
}
