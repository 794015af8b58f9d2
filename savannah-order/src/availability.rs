use std::sync::Arc;

use savannah_catalog::{Guide, GuideStatus};
use savannah_core::booking::BookingStatus;
use savannah_core::repository::{BookingRepository, GuideRepository};
use savannah_core::CoreResult;
use savannah_shared::{DateWindow, Page, PageRequest};

/// Answers "which guides are free in this window".
///
/// A guide is returned when it has the requested status, holds no busy booking
/// whose tour date lies in the window, and has no `available: false` override
/// inside the window. Results are ordered by descending id.
pub struct AvailabilityResolver {
    guides: Arc<dyn GuideRepository>,
    bookings: Arc<dyn BookingRepository>,
    busy_statuses: Vec<BookingStatus>,
}

impl AvailabilityResolver {
    pub fn new(
        guides: Arc<dyn GuideRepository>,
        bookings: Arc<dyn BookingRepository>,
        busy_statuses: Vec<BookingStatus>,
    ) -> Self {
        Self {
            guides,
            bookings,
            busy_statuses,
        }
    }

    pub async fn find_available_guides(
        &self,
        window: &DateWindow,
        status: GuideStatus,
        page: &PageRequest,
    ) -> CoreResult<Page<Guide>> {
        let busy = self.bookings.busy_guide_ids(window, &self.busy_statuses).await?;

        let mut candidates: Vec<Guide> = self
            .guides
            .guides_with_status(status)
            .await?
            .into_iter()
            .filter(|guide| !busy.contains(&guide.id))
            .filter(|guide| !guide.is_blocked_within(window))
            .collect();
        candidates.sort_by(|a, b| b.id.cmp(&a.id));

        tracing::debug!(
            start = %window.start(),
            end = %window.end(),
            busy = busy.len(),
            available = candidates.len(),
            "Resolved guide availability"
        );

        Ok(Page::slice(candidates, page))
    }
}
