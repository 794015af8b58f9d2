use savannah_core::booking::{Booking, BookingStatus, BookingUpdate, PaymentStatus};
use savannah_core::{CoreError, CoreResult};

/// Enforces the booking and payment state machines.
///
/// Booking: `pending -> confirmed -> completed`, `cancelled` from pending or confirmed.
/// Payment: `pending -> success | failed`, `success -> refunded`.
/// Moving to the current state is a no-op.
pub struct BookingManager;

impl BookingManager {
    pub fn can_transition_booking(from: BookingStatus, to: BookingStatus) -> bool {
        use BookingStatus::*;
        from == to
            || matches!(
                (from, to),
                (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
            )
    }

    pub fn can_transition_payment(from: PaymentStatus, to: PaymentStatus) -> bool {
        use PaymentStatus::*;
        from == to || matches!((from, to), (Pending, Success) | (Pending, Failed) | (Success, Refunded))
    }

    pub fn transition_booking(booking: &mut Booking, to: BookingStatus) -> CoreResult<()> {
        if !Self::can_transition_booking(booking.booking_status, to) {
            return Err(CoreError::InvalidTransition {
                from: booking.booking_status.to_string(),
                to: to.to_string(),
            });
        }
        booking.booking_status = to;
        Ok(())
    }

    pub fn transition_payment(booking: &mut Booking, to: PaymentStatus) -> CoreResult<()> {
        if !Self::can_transition_payment(booking.payment_status, to) {
            return Err(CoreError::InvalidTransition {
                from: booking.payment_status.to_string(),
                to: to.to_string(),
            });
        }
        booking.payment_status = to;
        Ok(())
    }

    /// Applies an admin edit. Status changes go through the state machines;
    /// `total_amount` is left untouched whatever else changes.
    pub fn apply_update(booking: &mut Booking, update: BookingUpdate) -> CoreResult<()> {
        let mut staged = booking.clone();
        if let Some(status) = update.booking_status {
            Self::transition_booking(&mut staged, status)?;
        }
        if let Some(status) = update.payment_status {
            Self::transition_payment(&mut staged, status)?;
        }
        booking.booking_status = staged.booking_status;
        booking.payment_status = staged.payment_status;
        if let Some(name) = update.guest_name {
            booking.guest_name = name;
        }
        if let Some(phone) = update.guest_phone {
            booking.guest_phone = phone;
        }
        if let Some(email) = update.guest_email {
            booking.guest_email = email.trim().to_lowercase();
        }
        if let Some(tour_date) = update.tour_date {
            booking.tour_date = tour_date;
        }
        if let Some(num_guests) = update.num_guests {
            booking.num_guests = num_guests;
        }
        if let Some(guide_id) = update.assigned_guide_id {
            booking.assigned_guide_id = Some(guide_id);
        }
        if let Some(addons) = update.addons {
            booking.addons = addons;
        }
        Ok(())
    }
}
