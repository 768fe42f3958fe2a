#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String, // Header text after the '>' marker, verbatim.
    pub sequence: String,
}

/// Accumulates the lines of one FASTA entry until the next header shows up.
#[derive(Debug, Default)]
pub struct SequenceRecordBuilder {
    pub id: Option<String>,
    pub fragments: Vec<String>,
}

impl SequenceRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_id(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn append_sequence(&mut self, fragment: &str) {
        self.fragments.push(fragment.to_string());
    }

    /// Returns `None` when the entry had no usable identifier, in which case
    /// its sequence lines are dropped.
    pub fn build(self) -> Option<SequenceRecord> {
        if !self.has_id() {
            return None;
        }
        Some(SequenceRecord {
            id: self.id?,
            sequence: self.fragments.concat(),
        })
    }
}
