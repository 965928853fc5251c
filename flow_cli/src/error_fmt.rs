//! Human-readable error descriptions and structured JSON error formatting.

use flow_core::FlowError;

/// First `FlowError` anywhere in the report chain (context layers included).
fn flow_error(err: &eyre::Report) -> Option<&FlowError> {
    err.chain().find_map(|e| e.downcast_ref::<FlowError>())
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(fe) = flow_error(err) {
        return match fe {
            FlowError::DataOrdering { previous, current } => format!(
                "What happened: Pulse timestamps went backwards ({current} after {previous}).\nLikely causes: Rows out of order, or several captures concatenated into one file.\nHow to fix: Sort the input by time, or set reduce.ordering = \"clamp\" to count such pulses without moving the clock."
            ),
            FlowError::Collaborator { operation, status } => format!(
                "What happened: The recording tool rejected {operation} ({status}).\nLikely causes: Channel names that clash or contain spaces, or the tool is not ready.\nHow to fix: Check the [channels] section, or set upload.on_error = \"continue\" to skip failed commands."
            ),
            FlowError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range value in the TOML or on the command line.\nHow to fix: Edit the config file or the flag, then rerun. `flowmeter check-config` shows the effective settings."
            ),
            FlowError::Io(msg) => format!(
                "What happened: File access failed ({msg}).\nLikely causes: Wrong --input/--output path, missing directory, or no permission.\nHow to fix: Check the paths and rerun. Output files are only replaced after a complete write."
            ),
            FlowError::Cancelled => "What happened: Upload cancelled (Ctrl-C).\nLikely causes: Interrupted by the operator.\nHow to fix: Rerun the upload; commands already sent were kept.".to_string(),
        };
    }

    // String-based heuristics for errors coming from config loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.starts_with("read config") {
        return format!(
            "What happened: Could not read the config file ({msg}).\nLikely causes: Wrong --config path or the default etc/flowmeter.toml is missing.\nHow to fix: Pass --config <FILE>; see etc/flowmeter.toml for a sample."
        );
    }

    if lower.contains("invalid configuration") || lower.contains("must ") {
        return format!(
            "What happened: Configuration is invalid or incomplete ({msg}).\nLikely causes: Missing [reduce] cal_factor, or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes for typed failures; everything else is 1 (clap usage errors exit 2 on their own).
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match flow_error(err) {
        Some(FlowError::DataOrdering { .. }) => 3,
        Some(FlowError::Collaborator { .. }) => 4,
        Some(FlowError::Cancelled) => 5,
        _ => 1,
    }
}

pub fn reason_name(err: &eyre::Report) -> &'static str {
    match flow_error(err) {
        Some(FlowError::DataOrdering { .. }) => "DataOrdering",
        Some(FlowError::Collaborator { .. }) => "Collaborator",
        Some(FlowError::Config(_)) => "Config",
        Some(FlowError::Io(_)) => "Io",
        Some(FlowError::Cancelled) => "Cancelled",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({ "reason": reason_name(err), "message": humanize(err) });
    if let Some(FlowError::DataOrdering { previous, current }) = flow_error(err) {
        obj["details"] = json!({ "previous": previous, "current": current });
    }
    obj.to_string()
}
