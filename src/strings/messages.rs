//! # Messages
//!
//! Operator-facing text: prompts, colored speaker labels and notices.

const BLUE: &str = "\u{001b}[94m";
const YELLOW: &str = "\u{001b}[93m";
const GREEN: &str = "\u{001b}[92m";
const RED: &str = "\u{001b}[91m";
const RESET: &str = "\u{001b}[0m";

pub fn you_label() -> String {
    format!("{BLUE}You{RESET}: ")
}

pub fn model_line(text: &str) -> String {
    format!("{YELLOW}Claude{RESET}: {text}")
}

pub fn tool_line(name: &str, args: &str) -> String {
    format!("{GREEN}tool{RESET}: {name}({args})")
}

pub fn notice_line(text: &str) -> String {
    format!("{RED}!{RESET} {text}")
}

pub const INTRO: &str = "Chat with Claude (use 'ctrl-c' to interrupt, 'ctrl-d' to quit)";
pub const ASK_INPUT_PATH: &str = "Path of the media to organize: ";
pub const NO_INPUT_PATH: &str = "No input path given, exiting.";

pub fn model_error(err: &str) -> String {
    format!("Model request failed: {err}")
}

pub const MODEL_INTERRUPTED: &str = "Interrupted, the model request was abandoned.";
pub const TOOLS_INTERRUPTED: &str = "Interrupted, remaining tool calls were cancelled.";
pub const CANCELLED_RESULT: &str = "cancelled";
