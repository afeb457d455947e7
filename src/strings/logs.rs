pub const SESSION_START: &str = "Session started";
pub const SHUTDOWN: &str = "Shutting down...";

pub fn config_loaded(source: &str) -> String {
    format!("Loaded configuration from {source}")
}

pub const CONFIG_DEFAULTS: &str = "No config file found, using defaults and environment";

pub fn sandbox_root(kind: &str, path: &str) -> String {
    format!("Sandbox root [{kind}]: {path}")
}

pub fn provider_ready(provider: &str, model: &str) -> String {
    format!("Model provider ready: {provider} ({model})")
}

pub fn tools_registered(names: &str) -> String {
    format!("Registered tools: {names}")
}

pub const DOCS_MISSING: &str = "Docs directory not found, continuing without docs";
pub const TEMPLATE_FALLBACK: &str = "Prompt template not found, using built-in template";

pub const TOOL_INVOKED: &str = "Tool call";
pub const TOOL_UNKNOWN: &str = "Model requested an unknown tool";
pub const TOOL_SUCCEEDED: &str = "Tool call succeeded";
pub const TOOL_FAILED: &str = "Tool call failed";
pub const TOOL_PANICKED: &str = "Tool panicked";

pub const MODEL_REQUEST: &str = "Sending conversation to model";
pub const CALL_IDS_REWRITTEN: &str = "Model reused or omitted tool call ids, assigned fresh ones";
pub const MODEL_ABANDONED: &str = "Model request abandoned by operator";

pub fn model_failed(err: &str) -> String {
    format!("Model call failed: {err}")
}

pub fn state_change(from: &str, to: &str) -> String {
    format!("State: {from} -> {to}")
}

pub const INPUT_CLOSED: &str = "Operator input closed";
pub const BATCH_CANCELLED: &str = "Tool batch cancelled by operator";

pub fn signal_listen_fail(err: &str) -> String {
    format!("Unable to listen for interrupt signal: {err}")
}
