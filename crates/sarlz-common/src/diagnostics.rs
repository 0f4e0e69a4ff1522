//! Diagnostic types and message lookup for the sarlz compiler.
//!
//! Errors raised by the solver are reported upward as diagnostics; the
//! caller (compiler driver, IDE) decides severity presentation and wording.

use serde::Serialize;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

/// Related information for a diagnostic (e.g., the other colliding overload).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// A diagnostic tied to a declaration, with optional related information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Error,
            code,
            related_information: Vec::new(),
        }
    }

    /// Create a diagnostic whose category is looked up from its code.
    ///
    /// Unknown codes are reported as errors.
    #[must_use]
    pub fn from_code(file: String, start: u32, length: u32, code: u32, args: &[&str]) -> Self {
        let (category, message_text) = match get_diagnostic_message(code) {
            Some(msg) => (msg.category, format_message(msg.message, args)),
            None => (DiagnosticCategory::Error, args.join(" ")),
        };
        Self {
            file,
            start,
            length,
            message_text,
            category,
            code,
            related_information: Vec::new(),
        }
    }

    /// Add related information to this diagnostic.
    #[must_use]
    pub fn with_related(mut self, file: String, start: u32, length: u32, message: String) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Message,
            code: 0,
        });
        self
    }

    /// `true` for diagnostics that must stop code generation.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

// =============================================================================
// Message Table
// =============================================================================

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    pub const MULTIPLE_VARIADIC_PARAMETERS: u32 = 1001;
    pub const VARIADIC_PARAMETER_NOT_LAST: u32 = 1002;
    pub const VARIADIC_PARAMETER_WITH_DEFAULT_VALUE: u32 = 1003;
    pub const DUPLICATE_SYNTHESIZED_OVERLOAD: u32 = 2001;
    pub const TOO_MANY_DEFAULT_PARAMETERS: u32 = 2002;
    pub const UNRESOLVED_ANCESTOR: u32 = 3001;
    pub const ANCESTOR_WALK_TRUNCATED: u32 = 3002;
}

pub mod diagnostic_messages {
    pub const MULTIPLE_VARIADIC_PARAMETERS: &str =
        "Formal parameters '{0}' and '{1}' are both variadic; only the last parameter may be variadic.";
    pub const VARIADIC_PARAMETER_NOT_LAST: &str =
        "Variadic parameter '{0}' must be the last formal parameter.";
    pub const VARIADIC_PARAMETER_WITH_DEFAULT_VALUE: &str =
        "Variadic parameter '{0}' cannot have a default value.";
    pub const DUPLICATE_SYNTHESIZED_OVERLOAD: &str =
        "The default values of '{0}' produce the overload '{1}' more than once.";
    pub const TOO_MANY_DEFAULT_PARAMETERS: &str =
        "'{0}' declares {1} default-valued parameters; at most {2} are supported.";
    pub const UNRESOLVED_ANCESTOR: &str =
        "Cannot resolve the super-type '{0}' of '{1}'; members inherited through it are ignored.";
    pub const ANCESTOR_WALK_TRUNCATED: &str =
        "The ancestors of '{0}' span more than {1} super-type edges; members beyond the limit are ignored.";
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::MULTIPLE_VARIADIC_PARAMETERS,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::MULTIPLE_VARIADIC_PARAMETERS,
    },
    DiagnosticMessage {
        code: diagnostic_codes::VARIADIC_PARAMETER_NOT_LAST,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::VARIADIC_PARAMETER_NOT_LAST,
    },
    DiagnosticMessage {
        code: diagnostic_codes::VARIADIC_PARAMETER_WITH_DEFAULT_VALUE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::VARIADIC_PARAMETER_WITH_DEFAULT_VALUE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::DUPLICATE_SYNTHESIZED_OVERLOAD,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::DUPLICATE_SYNTHESIZED_OVERLOAD,
    },
    DiagnosticMessage {
        code: diagnostic_codes::TOO_MANY_DEFAULT_PARAMETERS,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::TOO_MANY_DEFAULT_PARAMETERS,
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNRESOLVED_ANCESTOR,
        category: DiagnosticCategory::Warning,
        message: diagnostic_messages::UNRESOLVED_ANCESTOR,
    },
    DiagnosticMessage {
        code: diagnostic_codes::ANCESTOR_WALK_TRUNCATED,
        category: DiagnosticCategory::Warning,
        message: diagnostic_messages::ANCESTOR_WALK_TRUNCATED,
    },
];

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}
