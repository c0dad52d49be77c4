use super::{Error, ErrorKind};

/// Soft failures collected during a calculation
///
/// Failures never abort a calculation; they are flattened once at the end.
#[derive(Debug, Default)]
pub struct ErrorList {
    errors: Vec<Error>,
}

impl ErrorList {
    pub fn new() -> Self {
        ErrorList::default()
    }

    pub fn push(&mut self, e: Error) {
        self.errors.push(e);
    }

    pub fn extend(&mut self, other: ErrorList) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Collapse into a single error
    ///
    /// None when empty, the error itself when alone, otherwise an `Aggregate`
    /// with any nested aggregates spliced in.
    pub fn flatten(mut self) -> Option<Error> {
        if self.errors.len() <= 1 {
            return self.errors.pop();
        }
        let mut msgs = vec![];
        for e in &self.errors {
            match e.kind() {
                ErrorKind::Aggregate(inner) => msgs.extend(inner.iter().cloned()),
                _ => msgs.push(e.to_string()),
            }
        }
        Some(ErrorKind::Aggregate(msgs).into())
    }
}
