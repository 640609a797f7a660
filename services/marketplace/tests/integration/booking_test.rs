use roomshare_marketplace::domain::types::{Booking, BookingStatus, OfferStatus};
use roomshare_marketplace::error::MarketplaceError;
use roomshare_marketplace::usecase::booking::{
    GetBookingUseCase, ListBookingsUseCase, UpdateBookingStatusUseCase,
};

use crate::helpers::{Listing, MemoryStore, listing, test_admin, test_booking, test_offer, test_user};

fn booked(status: BookingStatus) -> (Listing, Booking) {
    let l = listing();
    let mut offer = test_offer(l.property.id, l.renter.id);
    offer.status = OfferStatus::Accepted;
    let offer = l.store.insert_offer(offer);
    let booking = l.store.insert_booking(test_booking(&offer, status));
    (l, booking)
}

fn update_uc(l: &Listing) -> UpdateBookingStatusUseCase<MemoryStore, MemoryStore> {
    UpdateBookingStatusUseCase {
        bookings: l.store.clone(),
        properties: l.store.clone(),
    }
}

#[tokio::test]
async fn should_let_renter_cancel_and_notify_owner() {
    let (l, booking) = booked(BookingStatus::Confirmed);

    let updated = update_uc(&l)
        .execute(&l.renter, booking.id, "cancelled")
        .await
        .unwrap();

    assert_eq!(updated.status, BookingStatus::Cancelled);
    assert_eq!(
        l.store.notifications_for(l.owner.id)[0].title,
        "Booking Cancelled"
    );
}

#[tokio::test]
async fn should_let_owner_complete_and_notify_renter() {
    let (l, booking) = booked(BookingStatus::Confirmed);

    let updated = update_uc(&l)
        .execute(&l.owner, booking.id, "completed")
        .await
        .unwrap();

    assert_eq!(updated.status, BookingStatus::Completed);
    assert_eq!(
        l.store.notifications_for(l.renter.id)[0].title,
        "Booking Completed"
    );
}

#[tokio::test]
async fn should_forbid_renter_completing_booking() {
    let (l, booking) = booked(BookingStatus::Confirmed);

    let result = update_uc(&l)
        .execute(&l.renter, booking.id, "completed")
        .await;

    assert!(matches!(result, Err(MarketplaceError::Forbidden)));
}

#[tokio::test]
async fn should_keep_cancelled_booking_terminal() {
    let (l, booking) = booked(BookingStatus::Cancelled);

    let result = update_uc(&l)
        .execute(&l.owner, booking.id, "completed")
        .await;

    assert!(matches!(result, Err(MarketplaceError::InvalidInput(_))));
}

#[tokio::test]
async fn should_not_cancel_completed_booking() {
    let (l, booking) = booked(BookingStatus::Completed);

    let result = update_uc(&l)
        .execute(&l.owner, booking.id, "cancelled")
        .await;

    assert!(matches!(result, Err(MarketplaceError::InvalidInput(_))));
}

#[tokio::test]
async fn should_treat_same_status_as_no_op() {
    let (l, booking) = booked(BookingStatus::Confirmed);

    let updated = update_uc(&l)
        .execute(&l.renter, booking.id, "confirmed")
        .await
        .unwrap();

    assert_eq!(updated.status, BookingStatus::Confirmed);
    assert!(l.store.world().notifications.is_empty());
}

#[tokio::test]
async fn should_reject_unknown_booking_status() {
    let (l, booking) = booked(BookingStatus::Confirmed);

    let result = update_uc(&l).execute(&l.owner, booking.id, "done").await;

    assert!(matches!(result, Err(MarketplaceError::InvalidStatus(_))));
}

#[tokio::test]
async fn should_forbid_unrelated_user() {
    let (l, booking) = booked(BookingStatus::Confirmed);
    let stranger = l.store.insert_user(test_user("Mallory"));

    let result = update_uc(&l)
        .execute(&stranger, booking.id, "cancelled")
        .await;
    assert!(matches!(result, Err(MarketplaceError::Forbidden)));

    let get = GetBookingUseCase {
        bookings: l.store.clone(),
        properties: l.store.clone(),
    };
    assert!(matches!(
        get.execute(&stranger, booking.id).await,
        Err(MarketplaceError::Forbidden)
    ));
    assert!(get.execute(&l.owner, booking.id).await.is_ok());
    let admin = l.store.insert_user(test_admin("Root"));
    assert!(get.execute(&admin, booking.id).await.is_ok());
}

#[tokio::test]
async fn should_list_bookings_by_renter_or_owner() {
    let (l, booking) = booked(BookingStatus::Confirmed);
    let uc = ListBookingsUseCase {
        bookings: l.store.clone(),
    };

    let as_renter = uc.execute(l.renter.id, false).await.unwrap();
    let as_owner = uc.execute(l.owner.id, true).await.unwrap();

    assert_eq!(as_renter.len(), 1);
    assert_eq!(as_renter[0].id, booking.id);
    assert_eq!(as_owner.len(), 1);
    assert!(uc.execute(l.owner.id, false).await.unwrap().is_empty());
}
