//! Conversions to `lsp-types`, for publishing results from a language
//! server front end.
//!
//! LSP positions are 0-based; ours are 1-based.

use lsp_types::{DiagnosticSeverity, Position, Range};

use crate::completion::CompletionItem;
use crate::diagnostics::{DiagnosticItem, Severity};

/// `source` on every published diagnostic.
pub const SOURCE: &str = "balenciaga";

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

impl From<Severity> for DiagnosticSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => DiagnosticSeverity::ERROR,
            Severity::Warning => DiagnosticSeverity::WARNING,
            Severity::Info => DiagnosticSeverity::INFORMATION,
        }
    }
}

impl From<&DiagnosticItem> for lsp_types::Diagnostic {
    /// Covers the single character at the diagnostic's position.
    fn from(item: &DiagnosticItem) -> Self {
        let line = to_u32(item.line.saturating_sub(1));
        let character = to_u32(item.column.saturating_sub(1));
        lsp_types::Diagnostic {
            range: Range::new(
                Position::new(line, character),
                Position::new(line, character.saturating_add(1)),
            ),
            severity: Some(item.severity.into()),
            source: Some(SOURCE.to_string()),
            message: item.message.clone(),
            ..Default::default()
        }
    }
}

impl From<DiagnosticItem> for lsp_types::Diagnostic {
    fn from(item: DiagnosticItem) -> Self {
        (&item).into()
    }
}

impl From<&CompletionItem> for lsp_types::CompletionItem {
    fn from(item: &CompletionItem) -> Self {
        lsp_types::CompletionItem {
            label: item.label.clone(),
            insert_text: Some(item.insert_text.clone()),
            detail: Some(item.detail.clone()),
            ..Default::default()
        }
    }
}

impl From<CompletionItem> for lsp_types::CompletionItem {
    fn from(item: CompletionItem) -> Self {
        lsp_types::CompletionItem {
            label: item.label,
            insert_text: Some(item.insert_text),
            detail: Some(item.detail),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_is_zero_based() {
        let item = DiagnosticItem::error(12, 8, "cannot find 'x' in scope");
        let diagnostic = lsp_types::Diagnostic::from(&item);
        assert_eq!(diagnostic.range.start, Position::new(11, 7));
        assert_eq!(diagnostic.range.end, Position::new(11, 8));
        assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(diagnostic.source.as_deref(), Some("balenciaga"));
        assert_eq!(diagnostic.message, "cannot find 'x' in scope");
    }

    #[test]
    fn test_severity_mapping() {
        let info: lsp_types::Diagnostic = DiagnosticItem::info(1, 1, "Trailing whitespace").into();
        assert_eq!(info.severity, Some(DiagnosticSeverity::INFORMATION));
        assert_eq!(info.range.start, Position::new(0, 0));
        assert_eq!(
            DiagnosticSeverity::from(Severity::Warning),
            DiagnosticSeverity::WARNING
        );
    }

    #[test]
    fn test_completion_item() {
        let item = CompletionItem {
            label: "totalRevenue".into(),
            insert_text: "totalRevenue".into(),
            detail: "symbol".into(),
        };
        let lsp: lsp_types::CompletionItem = (&item).into();
        assert_eq!(lsp.label, "totalRevenue");
        assert_eq!(lsp.insert_text.as_deref(), Some("totalRevenue"));
        assert_eq!(lsp.detail.as_deref(), Some("symbol"));
        assert_eq!(lsp, item.into());
    }
}
