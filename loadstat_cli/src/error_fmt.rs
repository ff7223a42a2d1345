//! Human-readable error descriptions and structured JSON error formatting.

use loadstat_core::StatError;
use loadstat_sim::SimError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(se) = err.downcast_ref::<StatError>() {
        return match se {
            StatError::ReadOnly(p) => format!(
                "What happened: {p} is read-only.\nLikely causes: It is an engine output or fixed at construction.\nHow to fix: Drop it from --set; read it with `loadstat params`."
            ),
            StatError::OutOfRange { param, value, max } => format!(
                "What happened: {param}={value} is out of range.\nLikely causes: The value exceeds the parameter's limit of {max}.\nHow to fix: Pass a value in [0, {max}]."
            ),
            StatError::UnknownParam(name) => format!(
                "What happened: Unknown parameter {name:?}.\nLikely causes: Typo in --set.\nHow to fix: Run `loadstat params` to list the parameter names."
            ),
            StatError::InvalidValue { param, input } => format!(
                "What happened: {input:?} is not a valid value for {param}.\nLikely causes: Non-numeric or negative input.\nHow to fix: Pass a decimal integer, e.g. --set {param}=50."
            ),
            StatError::Worker(msg) => format!(
                "What happened: The sampling thread could not be started ({msg}).\nLikely causes: Thread limit reached or resource exhaustion.\nHow to fix: Check process limits (ulimit -u) and retry."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<SimError>() {
        return match se {
            SimError::InvalidWorkload(msg) => format!(
                "What happened: Invalid workload ({msg}).\nLikely causes: Conflicting [sim] values or CLI overrides.\nHow to fix: Adjust --service-ms/--arrival-per-sec or the [sim] section."
            ),
            SimError::DrainTimeout(d) => format!(
                "What happened: The sampling loop did not go idle within {d:?}.\nLikely causes: Background congestion or a very long delay_ms.\nHow to fix: Re-run with --no-drain or a shorter stat.delay_ms."
            ),
        };
    }

    // String-based heuristics for errors coming from config loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.starts_with("read config") {
        return format!(
            "What happened: Could not read the config file.\nLikely causes: Wrong path or missing permissions.\nHow to fix: Check the --config path. Original: {msg}"
        );
    }

    if lower.starts_with("parse config") {
        return format!(
            "What happened: The config file is not valid TOML for this tool.\nLikely causes: Syntax error, unknown key, or wrong value type.\nHow to fix: Compare against the documented [stat], [alert], [logging] and [sim] keys. Original: {msg}"
        );
    }

    if lower.contains("must be") || lower.contains("unreasonably large") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file and run `loadstat check` again."
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

/// Stable exit codes: 3 for rejected parameters, 4 for workload errors, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<StatError>().is_some() {
        return 3;
    }
    if err.downcast_ref::<SimError>().is_some() {
        return 4;
    }
    1
}

/// Stable short name for the error kind, used in JSON output.
pub fn error_kind(err: &eyre::Report) -> &'static str {
    if let Some(se) = err.downcast_ref::<StatError>() {
        return match se {
            StatError::ReadOnly(_) => "ReadOnly",
            StatError::OutOfRange { .. } => "OutOfRange",
            StatError::UnknownParam(_) => "UnknownParam",
            StatError::InvalidValue { .. } => "InvalidValue",
            StatError::Worker(_) => "Worker",
        };
    }
    if err.downcast_ref::<SimError>().is_some() {
        return "Workload";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    if let Some(StatError::OutOfRange { param, value, max }) = err.downcast_ref::<StatError>() {
        return json!({
            "reason": error_kind(err),
            "details": { "param": param.name(), "value": value, "max": max },
            "message": humanize(err),
        })
        .to_string();
    }

    json!({ "reason": error_kind(err), "message": humanize(err) }).to_string()
}
