use quiz_core::model::AdminListing;

/// Admin catalog cache. `None` means stale: nothing loaded yet, or a mutation
/// has happened since the last full listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminState {
    listing: Option<AdminListing>,
    error: Option<String>,
}

impl AdminState {
    #[must_use]
    pub fn listing(&self) -> Option<&AdminListing> {
        self.listing.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn apply_listing(&mut self, listing: AdminListing) {
        self.listing = Some(listing);
        self.error = None;
    }

    pub fn invalidate(&mut self) {
        self.listing = None;
    }

    pub fn failed(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
