use codespan_reporting::diagnostic::{Diagnostic, Label};

use super::MessageAdder;

const EXPECTED: &str = "SP00";
const EXPECTED_STATEMENT: &str = "SP01";
const EXPECTED_TYPE: &str = "SP02";
const EXPECTED_PATTERN: &str = "SP03";
const TOP_LEVEL_GARBAGE: &str = "SP04";
const MAP_KEY_NOT_PRIMITIVE: &str = "SP05";
const MISSING_FORALL: &str = "SP06";

impl<'a> MessageAdder<'a> {
    /// A generic "expected X" message. `what` already carries the
    /// identifier-shape hint when one applies.
    pub fn parse_expected(&mut self, what: &str) {
        let labels = vec![Label::primary(self.at.file, self.at)];

        self.add(
            Diagnostic::error()
                .with_code(EXPECTED)
                .with_message(format!("expected {what}"))
                .with_labels(labels),
        );
    }

    pub fn parse_expected_statement(&mut self) {
        let labels = vec![Label::primary(self.at.file, self.at)];

        self.add(
            Diagnostic::error()
                .with_code(EXPECTED_STATEMENT)
                .with_message("expected a statement")
                .with_labels(labels),
        );
    }

    pub fn parse_expected_type(&mut self) {
        let labels = vec![Label::primary(self.at.file, self.at)];

        self.add(
            Diagnostic::error()
                .with_code(EXPECTED_TYPE)
                .with_message("expected a type")
                .with_labels(labels),
        );
    }

    pub fn parse_expected_pattern(&mut self) {
        let labels = vec![Label::primary(self.at.file, self.at)];
        let notes = vec![String::from(
            "a pattern is '_', a variable, or an ADT constructor",
        )];

        self.add(
            Diagnostic::error()
                .with_code(EXPECTED_PATTERN)
                .with_message("expected a pattern")
                .with_labels(labels)
                .with_notes(notes),
        );
    }

    pub fn parse_top_level_garbage(&mut self) {
        let labels = vec![Label::primary(self.at.file, self.at)];

        self.add(
            Diagnostic::error()
                .with_code(TOP_LEVEL_GARBAGE)
                .with_message("expected a library or contract definition")
                .with_labels(labels),
        );
    }

    pub fn parse_map_key_not_primitive(&mut self) {
        let labels = vec![Label::primary(self.at.file, self.at)];
        let notes = vec![String::from(
            "only String, IntX, UintX, ByStrX, ByStr or BNum is allowed as a map key type",
        )];

        self.add(
            Diagnostic::error()
                .with_code(MAP_KEY_NOT_PRIMITIVE)
                .with_message("invalid map key type")
                .with_labels(labels)
                .with_notes(notes),
        );
    }

    pub fn parse_missing_forall(&mut self) {
        let labels = vec![Label::primary(self.at.file, self.at)];

        self.add(
            Diagnostic::error()
                .with_code(MISSING_FORALL)
                .with_message("missing 'forall' keyword")
                .with_labels(labels),
        );
    }
}
