//! Diagnostic ID constants.
//!
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete. The leading digit of each code matches its
//! [`Category`](crate::Category).

/// A line matches none of the recognized trail line shapes.
pub const INVALID_SYNTAX: &str = "TRL1001";

/// A `~ Command` line names a command absent from the registry.
pub const UNKNOWN_COMMAND: &str = "TRL2001";

/// A command was invoked while none of its required context tags were active.
pub const CONTEXT_VIOLATION: &str = "TRL3001";

/// An input value bound to a numeric parameter does not parse as a number.
pub const EXPECTED_NUMERIC: &str = "TRL4001";

/// A numeric input value falls outside its parameter's declared range.
pub const OUT_OF_RANGE: &str = "TRL4002";

/// Every code defined in this module, in numeric order.
pub const ALL: &[&str] = &[
    INVALID_SYNTAX,
    UNKNOWN_COMMAND,
    CONTEXT_VIOLATION,
    EXPECTED_NUMERIC,
    OUT_OF_RANGE,
];

pub(crate) fn explain_code(id: &str) -> Option<&'static str> {
    match id {
        "TRL1001" => Some(
            "Invalid syntax: every non-blank line must be `~ Command `name``, \
             `~ Activate `name``, `~ Input `value`` (optionally followed by more \
             backtick-quoted values) or a `!` comment.",
        ),
        "TRL2001" => Some(
            "Unknown command: the command name is not present in the command \
             specification registry, so the CAD host would reject it.",
        ),
        "TRL3001" => Some(
            "Context violation: the command requires one of its declared context \
             tags (for example `sketch_active`) to be active, but none of them are \
             on the current context stack.",
        ),
        "TRL4001" => Some(
            "Expected numeric: the input value is bound to a parameter declared \
             numeric, but it does not parse as a number or spells infinity or NaN.",
        ),
        "TRL4002" => Some(
            "Out of range: the numeric input value lies outside the minimum or \
             maximum declared for its parameter.",
        ),
        _ => None,
    }
}
