//! Tree-sitter backed highlighting.

use balenciaga_core::Language;
use tree_sitter::{Node, Parser, Tree};

use crate::{HighlightKind, HighlightSpan, SyntaxError, SyntaxResult};

/// A syntax highlighter for one language, holding the last parsed tree.
pub struct Highlighter {
    parser: Parser,
    language: Language,
    tree: Option<Tree>,
}

impl Highlighter {
    /// Creates a new highlighter for a language.
    pub fn new(language: Language) -> SyntaxResult<Self> {
        let grammar = grammar(language)?;

        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|_| SyntaxError::ParseError)?;

        Ok(Self {
            parser,
            language,
            tree: None,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Parses source code, replacing the previous tree.
    pub fn parse(&mut self, source: &str) -> SyntaxResult<()> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(SyntaxError::ParseError)?;
        self.tree = Some(tree);
        Ok(())
    }

    /// Returns highlight spans for the last parsed source, in tree order.
    pub fn highlight(&self) -> Vec<HighlightSpan> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };

        let mut spans = Vec::new();
        collect_highlights(tree.root_node(), &mut spans);
        spans
    }
}

/// Recursively collects highlights from the syntax tree.
fn collect_highlights(node: Node, spans: &mut Vec<HighlightSpan>) {
    if let Some(kind) = highlight_kind(node) {
        spans.push(HighlightSpan {
            start: node.start_byte(),
            end: node.end_byte(),
            kind,
        });
        // Leaf-like kinds cover their children
        if matches!(
            kind,
            HighlightKind::String | HighlightKind::Comment | HighlightKind::Number
        ) {
            return;
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_highlights(child, spans);
    }
}

/// Maps a node to a highlight kind, looking at its parent where the kind
/// alone is ambiguous (identifiers, JSON keys).
fn highlight_kind(node: Node) -> Option<HighlightKind> {
    let kind = node.kind();

    if !node.is_named() {
        return is_keyword(kind).then_some(HighlightKind::Keyword);
    }

    match kind {
        "string" | "template_string" | "string_fragment" => {
            if is_field_of(node, "pair", "key") {
                Some(HighlightKind::Property)
            } else {
                Some(HighlightKind::String)
            }
        }
        "number" | "integer" | "float" => Some(HighlightKind::Number),
        "comment" => Some(HighlightKind::Comment),
        "true" | "false" | "null" | "none" | "undefined" => Some(HighlightKind::Constant),
        "type_identifier" | "predefined_type" => Some(HighlightKind::Type),
        "property_identifier" | "shorthand_property_identifier" => Some(HighlightKind::Property),
        "decorator" => Some(HighlightKind::Attribute),
        "identifier" => {
            if is_field_of(node, "function_declaration", "name")
                || is_field_of(node, "function_definition", "name")
                || is_field_of(node, "call_expression", "function")
                || is_field_of(node, "call", "function")
            {
                Some(HighlightKind::Function)
            } else if is_field_of(node, "class_definition", "name")
                || is_field_of(node, "class_declaration", "name")
            {
                Some(HighlightKind::Type)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn is_field_of(node: Node, parent_kind: &str, field: &str) -> bool {
    node.parent().is_some_and(|parent| {
        parent.kind() == parent_kind && parent.child_by_field_name(field) == Some(node)
    })
}

fn is_keyword(kind: &str) -> bool {
    matches!(
        kind,
        // JavaScript / TypeScript
        "const" | "let" | "var" | "function" | "class" | "extends" | "if" | "else" | "for"
            | "while" | "do" | "return" | "import" | "export" | "from" | "switch" | "case"
            | "default" | "break" | "continue" | "try" | "catch" | "finally" | "new"
            | "this" | "super" | "throw" | "async" | "await" | "typeof" | "instanceof"
            | "of" | "in" | "yield" | "delete" | "void" | "type" | "interface" | "enum"
            | "implements" | "public" | "private" | "protected" | "readonly" | "as"
            // Python
            | "def" | "elif" | "except" | "with" | "lambda" | "pass" | "raise" | "is"
            | "not" | "and" | "or" | "global" | "nonlocal" | "assert" | "del"
    )
}

/// Gets the tree-sitter grammar for a language.
fn grammar(language: Language) -> SyntaxResult<tree_sitter::Language> {
    match language {
        Language::JavaScript => Ok(tree_sitter_javascript::LANGUAGE.into()),
        Language::TypeScript => Ok(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        Language::Python => Ok(tree_sitter_python::LANGUAGE.into()),
        Language::Json => Ok(tree_sitter_json::LANGUAGE.into()),
        other => Err(SyntaxError::UnknownLanguage(other)),
    }
}
