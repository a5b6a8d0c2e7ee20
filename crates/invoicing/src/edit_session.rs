use invoicepad_core::LineItemId;

/// Which line item, if any, the clerk is currently editing.
///
/// The owner keeps the target pointing at an existing item: deleting the
/// targeted item must clear the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSession {
    target: Option<LineItemId>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing `id`, replacing any previous target.
    pub fn begin(&mut self, id: LineItemId) {
        self.target = Some(id);
    }

    pub fn target(&self) -> Option<&LineItemId> {
        self.target.as_ref()
    }

    pub fn is_targeting(&self, id: &LineItemId) -> bool {
        self.target.as_ref() == Some(id)
    }

    /// Idempotent.
    pub fn clear(&mut self) {
        self.target = None;
    }
}
