use codespan_reporting::diagnostic::{Diagnostic, Label};

use super::MessageAdder;

const UNKNOWN_NAME: &str = "SR00";
const UNKNOWN_NAMESPACE: &str = "SR01";

impl<'a> MessageAdder<'a> {
    pub fn resolve_unknown_name(&mut self, name: &str) {
        let labels = vec![Label::primary(self.at.file, self.at)];

        self.add(
            Diagnostic::error()
                .with_code(UNKNOWN_NAME)
                .with_message(format!("cannot resolve '{name}'"))
                .with_labels(labels),
        );
    }

    pub fn resolve_unknown_namespace(&mut self, name: &str) {
        let labels = vec![Label::primary(self.at.file, self.at)];
        let notes = vec![String::from(
            "namespaces are introduced by 'import Lib as Ns'",
        )];

        self.add(
            Diagnostic::error()
                .with_code(UNKNOWN_NAMESPACE)
                .with_message(format!("'{name}' is not an imported namespace"))
                .with_labels(labels)
                .with_notes(notes),
        );
    }
}
