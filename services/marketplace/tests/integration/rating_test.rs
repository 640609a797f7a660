use chrono::Utc;

use roomshare_marketplace::domain::repository::RatingRepository;
use roomshare_marketplace::domain::types::{BookingStatus, OfferStatus};
use roomshare_marketplace::domain::workflow::plan_rating;
use roomshare_marketplace::error::MarketplaceError;
use roomshare_marketplace::usecase::rating::{
    AmendRatingInput, AmendRatingUseCase, DeleteRatingUseCase, SubmitRatingUseCase,
};

use crate::helpers::{Listing, MemoryStore, listing, test_booking, test_offer, test_user};

fn booked(status: BookingStatus) -> (Listing, uuid::Uuid) {
    let l = listing();
    let mut offer = test_offer(l.property.id, l.renter.id);
    offer.status = OfferStatus::Accepted;
    let offer = l.store.insert_offer(offer);
    let booking = l.store.insert_booking(test_booking(&offer, status));
    (l, booking.id)
}

fn submit_uc(l: &Listing) -> SubmitRatingUseCase<MemoryStore, MemoryStore, MemoryStore> {
    SubmitRatingUseCase {
        bookings: l.store.clone(),
        properties: l.store.clone(),
        ratings: l.store.clone(),
    }
}

// ── SubmitRating ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_complete_booking_and_notify_owner_on_first_rating() {
    let (l, booking_id) = booked(BookingStatus::Confirmed);

    let outcome = submit_uc(&l)
        .execute(&l.renter, booking_id, 4, Some("Great host".to_owned()))
        .await
        .unwrap();

    assert!(outcome.created);
    assert_eq!(outcome.rating.score, 4);
    assert_eq!(outcome.summary.count, 1);
    assert!((outcome.summary.average - 4.0).abs() < f64::EPSILON);
    let property = l.store.property(l.property.id);
    assert_eq!(property.rating_count, 1);
    assert!((property.rating_avg - 4.0).abs() < f64::EPSILON);
    let booking = l
        .store
        .world()
        .bookings
        .iter()
        .find(|b| b.id == booking_id)
        .cloned()
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Completed);
    assert_eq!(l.store.notifications_for(l.owner.id)[0].title, "New Rating");
}

#[tokio::test]
async fn should_update_existing_rating_and_recompute_average() {
    let (l, booking_id) = booked(BookingStatus::Confirmed);
    let uc = submit_uc(&l);
    let first = uc.execute(&l.renter, booking_id, 2, None).await.unwrap();

    let second = uc.execute(&l.renter, booking_id, 5, None).await.unwrap();

    assert!(!second.created);
    assert_eq!(second.rating.id, first.rating.id);
    assert_eq!(second.summary.count, 1);
    assert!((second.summary.average - 5.0).abs() < f64::EPSILON);
    assert_eq!(l.store.world().ratings.len(), 1);
    assert_eq!(l.store.notifications_for(l.owner.id).len(), 1);
}

#[tokio::test]
async fn should_average_ratings_across_bookings() {
    let (l, booking_id) = booked(BookingStatus::Completed);
    let other = l.store.insert_user(test_user("Ines"));
    let other_offer = l.store.insert_offer(test_offer(l.property.id, other.id));
    let other_booking = l
        .store
        .insert_booking(test_booking(&other_offer, BookingStatus::Completed));
    let uc = submit_uc(&l);

    uc.execute(&l.renter, booking_id, 5, None).await.unwrap();
    let outcome = uc.execute(&other, other_booking.id, 2, None).await.unwrap();

    assert_eq!(outcome.summary.count, 2);
    assert!((outcome.summary.average - 3.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn should_reject_score_out_of_range_before_lookup() {
    let (l, _) = booked(BookingStatus::Confirmed);

    for score in [0, 6, 7, -1] {
        let result = submit_uc(&l)
            .execute(&l.renter, uuid::Uuid::now_v7(), score, None)
            .await;
        assert!(
            matches!(result, Err(MarketplaceError::InvalidScore)),
            "score {score} should be rejected"
        );
    }
    assert!(l.store.world().ratings.is_empty());
}

#[tokio::test]
async fn should_forbid_rating_someone_elses_booking() {
    let (l, booking_id) = booked(BookingStatus::Confirmed);

    let result = submit_uc(&l).execute(&l.owner, booking_id, 3, None).await;

    assert!(matches!(result, Err(MarketplaceError::Forbidden)));
}

#[tokio::test]
async fn should_refuse_rating_cancelled_booking() {
    let (l, booking_id) = booked(BookingStatus::Cancelled);

    let result = submit_uc(&l).execute(&l.renter, booking_id, 3, None).await;

    assert!(matches!(result, Err(MarketplaceError::InvalidInput(_))));
}

#[tokio::test]
async fn should_return_not_found_for_missing_booking() {
    let (l, _) = booked(BookingStatus::Confirmed);

    let result = submit_uc(&l)
        .execute(&l.renter, uuid::Uuid::now_v7(), 3, None)
        .await;

    assert!(matches!(result, Err(MarketplaceError::BookingNotFound)));
}

#[tokio::test]
async fn should_refuse_second_first_rating_for_same_booking() {
    let (l, booking_id) = booked(BookingStatus::Confirmed);
    let booking = l
        .store
        .world()
        .bookings
        .iter()
        .find(|b| b.id == booking_id)
        .cloned()
        .unwrap();
    let first =
        plan_rating(l.renter.id, &booking, &l.property, None, 5, None, Utc::now()).unwrap();
    let second =
        plan_rating(l.renter.id, &booking, &l.property, None, 2, None, Utc::now()).unwrap();

    l.store.submit(&first).await.unwrap();
    let result = l.store.submit(&second).await;

    assert!(matches!(result, Err(MarketplaceError::DuplicateRating)));
    let property = l.store.property(l.property.id);
    assert_eq!(property.rating_count, 1);
    assert!((property.rating_avg - 5.0).abs() < f64::EPSILON);
}

// ── Admin moderation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_admin_amendment_with_invalid_score() {
    let (l, booking_id) = booked(BookingStatus::Confirmed);
    let rating = submit_uc(&l)
        .execute(&l.renter, booking_id, 4, None)
        .await
        .unwrap()
        .rating;
    let uc = AmendRatingUseCase {
        ratings: l.store.clone(),
    };

    let result = uc
        .execute(
            rating.id,
            AmendRatingInput {
                score: Some(9),
                comment: None,
            },
        )
        .await;

    assert!(matches!(result, Err(MarketplaceError::InvalidScore)));
    assert_eq!(l.store.world().ratings[0].score, 4);
}

#[tokio::test]
async fn should_recompute_summary_on_admin_amendment() {
    let (l, booking_id) = booked(BookingStatus::Confirmed);
    let rating = submit_uc(&l)
        .execute(&l.renter, booking_id, 4, Some("ok".to_owned()))
        .await
        .unwrap()
        .rating;
    let uc = AmendRatingUseCase {
        ratings: l.store.clone(),
    };

    let outcome = uc
        .execute(
            rating.id,
            AmendRatingInput {
                score: Some(1),
                comment: Some(String::new()),
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.rating.score, 1);
    assert_eq!(outcome.rating.comment, None);
    assert!((l.store.property(l.property.id).rating_avg - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn should_reset_summary_when_last_rating_deleted() {
    let (l, booking_id) = booked(BookingStatus::Confirmed);
    let rating = submit_uc(&l)
        .execute(&l.renter, booking_id, 5, None)
        .await
        .unwrap()
        .rating;
    let uc = DeleteRatingUseCase {
        ratings: l.store.clone(),
    };

    let summary = uc.execute(rating.id).await.unwrap();

    assert_eq!(summary.count, 0);
    let property = l.store.property(l.property.id);
    assert_eq!(property.rating_count, 0);
    assert_eq!(property.rating_avg, 0.0);
    let result = uc.execute(rating.id).await;
    assert!(matches!(result, Err(MarketplaceError::RatingNotFound)));
}
