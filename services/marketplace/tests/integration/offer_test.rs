use chrono::Utc;

use roomshare_marketplace::domain::repository::OfferRepository;
use roomshare_marketplace::domain::types::{
    BookingStatus, Notification, NotificationKind, OfferStatus,
};
use roomshare_marketplace::domain::workflow::plan_offer_status_change;
use roomshare_marketplace::error::MarketplaceError;
use roomshare_marketplace::usecase::offer::{
    CancelOfferUseCase, ListPropertyOffersUseCase, SubmitOfferInput, SubmitOfferUseCase,
    UpdateOfferStatusUseCase,
};

use crate::helpers::{listing, test_booking, test_offer, test_user};

fn submit_input(price: &str) -> SubmitOfferInput {
    SubmitOfferInput {
        price: price.to_owned(),
        message: Some("Can move in next month".to_owned()),
        move_in_date: None,
    }
}

// ── SubmitOffer ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_submit_pending_offer_and_notify_owner() {
    let l = listing();
    let uc = SubmitOfferUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
    };

    let offer = uc
        .execute(&l.renter, l.property.id, submit_input("500"))
        .await
        .unwrap();

    assert_eq!(offer.status, OfferStatus::Pending);
    assert_eq!(offer.price, "500");
    let notes = l.store.notifications_for(l.owner.id);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "New Offer");
}

#[tokio::test]
async fn should_forbid_offer_on_own_property() {
    let l = listing();
    let uc = SubmitOfferUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
    };

    let result = uc
        .execute(&l.owner, l.property.id, submit_input("500"))
        .await;

    assert!(matches!(result, Err(MarketplaceError::Forbidden)));
    assert!(l.store.world().offers.is_empty());
}

#[tokio::test]
async fn should_reject_duplicate_pending_offer() {
    let l = listing();
    let uc = SubmitOfferUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
    };
    uc.execute(&l.renter, l.property.id, submit_input("500"))
        .await
        .unwrap();

    let result = uc
        .execute(&l.renter, l.property.id, submit_input("550"))
        .await;

    assert!(matches!(result, Err(MarketplaceError::DuplicateOffer)));
}

#[tokio::test]
async fn should_reject_malformed_price() {
    let l = listing();
    let uc = SubmitOfferUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
    };

    let result = uc
        .execute(&l.renter, l.property.id, submit_input("five hundred"))
        .await;

    assert!(matches!(result, Err(MarketplaceError::InvalidInput(_))));
}

#[tokio::test]
async fn should_return_not_found_for_missing_property() {
    let l = listing();
    let uc = SubmitOfferUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
    };

    let result = uc
        .execute(&l.renter, uuid::Uuid::now_v7(), submit_input("500"))
        .await;

    assert!(matches!(result, Err(MarketplaceError::PropertyNotFound)));
}

// ── UpdateOfferStatus ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_accept_offer_and_reject_other_pending_offers() {
    let l = listing();
    let rival_a = l.store.insert_user(test_user("Ana"));
    let rival_b = l.store.insert_user(test_user("Bruno"));
    let chosen = l.store.insert_offer(test_offer(l.property.id, l.renter.id));
    let other_a = l.store.insert_offer(test_offer(l.property.id, rival_a.id));
    let other_b = l.store.insert_offer(test_offer(l.property.id, rival_b.id));
    let uc = UpdateOfferStatusUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
        bookings: l.store.clone(),
    };

    let offer = uc.execute(&l.owner, chosen.id, "accepted").await.unwrap();

    assert_eq!(offer.status, OfferStatus::Accepted);
    assert_eq!(l.store.offer(other_a.id).status, OfferStatus::Rejected);
    assert_eq!(l.store.offer(other_b.id).status, OfferStatus::Rejected);
    let bookings = l.store.bookings_for_offer(chosen.id);
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].status, BookingStatus::Confirmed);
    assert_eq!(bookings[0].user_id, l.renter.id);
    assert_eq!(l.store.notifications_for(rival_a.id)[0].title, "Offer Rejected");
    assert_eq!(l.store.notifications_for(rival_b.id)[0].title, "Offer Rejected");
}

#[tokio::test]
async fn should_not_create_second_booking_when_accepted_twice() {
    let l = listing();
    let offer = l.store.insert_offer(test_offer(l.property.id, l.renter.id));
    let uc = UpdateOfferStatusUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
        bookings: l.store.clone(),
    };

    uc.execute(&l.owner, offer.id, "accepted").await.unwrap();
    uc.execute(&l.owner, offer.id, "accepted").await.unwrap();

    assert_eq!(l.store.bookings_for_offer(offer.id).len(), 1);
    let accepted: Vec<_> = l
        .store
        .notifications_for(l.renter.id)
        .into_iter()
        .filter(|n| n.title == "Offer Accepted!")
        .collect();
    assert_eq!(accepted.len(), 1);
}

#[tokio::test]
async fn should_create_new_booking_after_previous_was_cancelled() {
    let l = listing();
    let mut offer = test_offer(l.property.id, l.renter.id);
    offer.status = OfferStatus::Accepted;
    let offer = l.store.insert_offer(offer);
    l.store
        .insert_booking(test_booking(&offer, BookingStatus::Cancelled));
    let uc = UpdateOfferStatusUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
        bookings: l.store.clone(),
    };

    uc.execute(&l.owner, offer.id, "accepted").await.unwrap();

    let bookings = l.store.bookings_for_offer(offer.id);
    assert_eq!(bookings.len(), 2);
    assert_eq!(
        bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .count(),
        1
    );
}

#[tokio::test]
async fn should_forbid_status_change_by_non_owner() {
    let l = listing();
    let offer = l.store.insert_offer(test_offer(l.property.id, l.renter.id));
    let uc = UpdateOfferStatusUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
        bookings: l.store.clone(),
    };

    let result = uc.execute(&l.renter, offer.id, "accepted").await;

    assert!(matches!(result, Err(MarketplaceError::Forbidden)));
    assert_eq!(l.store.offer(offer.id).status, OfferStatus::Pending);
    assert!(l.store.bookings_for_offer(offer.id).is_empty());
}

#[tokio::test]
async fn should_reject_unknown_status_without_writing() {
    let l = listing();
    let offer = l.store.insert_offer(test_offer(l.property.id, l.renter.id));
    let uc = UpdateOfferStatusUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
        bookings: l.store.clone(),
    };

    let result = uc.execute(&l.owner, offer.id, "approved").await;

    assert!(matches!(result, Err(MarketplaceError::InvalidStatus(_))));
    assert_eq!(l.store.offer(offer.id).status, OfferStatus::Pending);
    assert!(l.store.notifications_for(l.renter.id).is_empty());
}

#[tokio::test]
async fn should_return_not_found_for_missing_offer() {
    let l = listing();
    let uc = UpdateOfferStatusUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
        bookings: l.store.clone(),
    };

    let result = uc.execute(&l.owner, uuid::Uuid::now_v7(), "accepted").await;

    assert!(matches!(result, Err(MarketplaceError::OfferNotFound)));
}

#[tokio::test]
async fn should_reject_offer_submitted_after_acceptance_was_planned() {
    let l = listing();
    let latecomer = l.store.insert_user(test_user("Lina"));
    let chosen = l.store.insert_offer(test_offer(l.property.id, l.renter.id));
    let change =
        plan_offer_status_change(l.owner.id, &l.property, &chosen, "accepted", false, Utc::now())
            .unwrap();
    let late = l.store.insert_offer(test_offer(l.property.id, latecomer.id));

    let rejected = l.store.apply_status_change(&change).await.unwrap();

    assert_eq!(rejected, 1);
    assert_eq!(l.store.offer(chosen.id).status, OfferStatus::Accepted);
    assert_eq!(l.store.offer(late.id).status, OfferStatus::Rejected);
    let notes = l.store.notifications_for(latecomer.id);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Offer Rejected");
}

#[tokio::test]
async fn should_refuse_acceptance_when_offer_was_cancelled_meanwhile() {
    let l = listing();
    let offer = l.store.insert_offer(test_offer(l.property.id, l.renter.id));
    let change =
        plan_offer_status_change(l.owner.id, &l.property, &offer, "accepted", false, Utc::now())
            .unwrap();
    CancelOfferUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
    }
    .execute(&l.renter, offer.id)
    .await
    .unwrap();

    let result = l.store.apply_status_change(&change).await;

    assert!(matches!(result, Err(MarketplaceError::OfferChanged)));
    assert_eq!(l.store.offer(offer.id).status, OfferStatus::Cancelled);
    assert!(l.store.bookings_for_offer(offer.id).is_empty());
    assert!(l.store.notifications_for(l.renter.id).is_empty());
}

#[tokio::test]
async fn should_refuse_cancelling_offer_accepted_meanwhile() {
    let l = listing();
    let offer = l.store.insert_offer(test_offer(l.property.id, l.renter.id));
    UpdateOfferStatusUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
        bookings: l.store.clone(),
    }
    .execute(&l.owner, offer.id, "accepted")
    .await
    .unwrap();
    let now = Utc::now();
    let notice = Notification::new(
        l.owner.id,
        Some(l.renter.id),
        NotificationKind::Offer,
        "Offer Cancelled",
        "withdrawn",
        None,
        now,
    );

    let result = l.store.cancel(offer.id, &notice, now).await;

    assert!(matches!(result, Err(MarketplaceError::OfferChanged)));
    assert_eq!(l.store.offer(offer.id).status, OfferStatus::Accepted);
    let bookings = l.store.bookings_for_offer(offer.id);
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].status, BookingStatus::Confirmed);
    assert!(l.store.notifications_for(l.owner.id).is_empty());
}

// ── CancelOffer ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_cancel_pending_offer_and_notify_owner() {
    let l = listing();
    let offer = l.store.insert_offer(test_offer(l.property.id, l.renter.id));
    let uc = CancelOfferUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
    };

    let cancelled = uc.execute(&l.renter, offer.id).await.unwrap();

    assert_eq!(cancelled.status, OfferStatus::Cancelled);
    assert_eq!(l.store.offer(offer.id).status, OfferStatus::Cancelled);
    assert_eq!(l.store.notifications_for(l.owner.id)[0].title, "Offer Cancelled");
}

#[tokio::test]
async fn should_refuse_accepting_cancelled_offer() {
    let l = listing();
    let offer = l.store.insert_offer(test_offer(l.property.id, l.renter.id));
    CancelOfferUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
    }
    .execute(&l.renter, offer.id)
    .await
    .unwrap();
    let uc = UpdateOfferStatusUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
        bookings: l.store.clone(),
    };

    let result = uc.execute(&l.owner, offer.id, "accepted").await;

    assert!(matches!(result, Err(MarketplaceError::InvalidInput(_))));
    assert!(l.store.bookings_for_offer(offer.id).is_empty());
}

#[tokio::test]
async fn should_forbid_cancelling_someone_elses_offer() {
    let l = listing();
    let offer = l.store.insert_offer(test_offer(l.property.id, l.renter.id));
    let uc = CancelOfferUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
    };

    let result = uc.execute(&l.owner, offer.id).await;

    assert!(matches!(result, Err(MarketplaceError::Forbidden)));
}

// ── ListPropertyOffers ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_property_offers_for_owner_only() {
    let l = listing();
    l.store.insert_offer(test_offer(l.property.id, l.renter.id));
    let uc = ListPropertyOffersUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
    };

    assert_eq!(uc.execute(&l.owner, l.property.id).await.unwrap().len(), 1);
    let result = uc.execute(&l.renter, l.property.id).await;
    assert!(matches!(result, Err(MarketplaceError::Forbidden)));
}

// ── End to end ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_turn_accepted_offer_into_confirmed_booking() {
    let l = listing();
    let submitted = SubmitOfferUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
    }
    .execute(&l.renter, l.property.id, submit_input("500"))
    .await
    .unwrap();
    assert_eq!(submitted.status, OfferStatus::Pending);

    let accepted = UpdateOfferStatusUseCase {
        properties: l.store.clone(),
        offers: l.store.clone(),
        bookings: l.store.clone(),
    }
    .execute(&l.owner, submitted.id, "accepted")
    .await
    .unwrap();

    assert_eq!(accepted.status, OfferStatus::Accepted);
    let bookings = l.store.bookings_for_offer(submitted.id);
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].status, BookingStatus::Confirmed);
    assert!(
        l.store
            .notifications_for(l.renter.id)
            .iter()
            .any(|n| n.title == "Offer Accepted!")
    );
}
