//! Draft/committed value pair.

/// A value with a committed state and an editable draft.
///
/// Edits go to the draft; [`Staged::apply`] promotes the draft and
/// [`Staged::reset`] discards it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Staged<T> {
    committed: T,
    draft: T,
}

impl<T: Clone + PartialEq> Staged<T> {
    /// Creates a staged value with draft and committed both set to `value`.
    pub fn new(value: T) -> Self {
        Self {
            committed: value.clone(),
            draft: value,
        }
    }

    /// Current draft.
    pub const fn draft(&self) -> &T {
        &self.draft
    }

    /// Mutable access to the draft.
    pub fn draft_mut(&mut self) -> &mut T {
        &mut self.draft
    }

    /// Replaces the draft.
    pub fn stage(&mut self, value: T) {
        self.draft = value;
    }

    /// Last committed value.
    pub const fn committed(&self) -> &T {
        &self.committed
    }

    /// Promotes the draft to committed and returns the new committed value.
    pub fn apply(&mut self) -> &T {
        self.committed = self.draft.clone();
        &self.committed
    }

    /// Discards the draft.
    pub fn reset(&mut self) {
        self.draft = self.committed.clone();
    }

    /// Returns true if the draft differs from the committed value.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.committed
    }

    /// Sets both draft and committed to `value`.
    pub fn replace(&mut self, value: T) {
        self.committed = value.clone();
        self.draft = value;
    }
}
