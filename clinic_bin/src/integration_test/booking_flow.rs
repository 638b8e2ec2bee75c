use service::{
    availability::AvailabilityService,
    booking::{BookingService, BookingStatus},
    notification::NotificationEvent,
    queue::{QueueEntry, QueueService},
    suggestion::{SuggestionRequest, SuggestionService, TimePreference},
    ServiceError,
};
use uuid::Uuid;

use crate::integration_test::{hm, TestSetup, MONDAY};

fn queue_state(queue: &[QueueEntry]) -> Vec<(Uuid, u32, u32)> {
    queue
        .iter()
        .map(|entry| (entry.booking_id, entry.queue_position, entry.estimated_wait_minutes))
        .collect()
}

#[tokio::test]
async fn test_initial_queueing() {
    let mut test_setup = TestSetup::new().await;
    let service_id = test_setup.create_clinic_service(30, 2).await;

    let first = test_setup.book(service_id, hm(10, 0)).await.unwrap();
    let second = test_setup.book(service_id, hm(10, 0)).await.unwrap();
    let third = test_setup.book(service_id, hm(10, 0)).await.unwrap();

    assert_eq!(BookingStatus::Pending, first.status);
    assert_eq!(BookingStatus::Pending, second.status);
    assert_eq!(BookingStatus::Queued, third.status);

    let state = &test_setup.clinic_state;
    let queue = state
        .queue_service
        .get_queue(test_setup.doctor_id, MONDAY, hm(10, 0), None)
        .await
        .unwrap();
    assert_eq!(1, queue.len());
    assert_eq!(third.id, queue[0].booking_id);
    assert_eq!(1, queue[0].queue_position);
    assert_eq!(30, queue[0].estimated_wait_minutes);

    let availability = state
        .availability_service
        .check_availability(test_setup.doctor_id, MONDAY, hm(10, 0), 2, None)
        .await
        .unwrap();
    assert!(!availability.available);
    assert_eq!(2, availability.occupied);

    assert_eq!(
        vec![
            (NotificationEvent::BookingCreated, first.id),
            (NotificationEvent::BookingCreated, second.id),
            (NotificationEvent::BookingQueued, third.id),
        ],
        test_setup.drain_events()
    );
}

#[tokio::test]
async fn test_end_time_derivation() {
    let test_setup = TestSetup::new().await;
    let service_id = test_setup.create_clinic_service(45, 1).await;

    let booking = test_setup.book(service_id, hm(9, 0)).await.unwrap();

    assert_eq!(hm(9, 45), booking.end);
    let stored = test_setup
        .clinic_state
        .booking_service
        .get(booking.id, None)
        .await
        .unwrap();
    assert_eq!(hm(9, 45), stored.end);
    assert_eq!(BookingStatus::Pending, stored.status);

    test_setup.change_service_duration(service_id, 90).await;
    let stored = test_setup
        .clinic_state
        .booking_service
        .get(booking.id, None)
        .await
        .unwrap();
    assert_eq!(hm(9, 45), stored.end);
    let later = test_setup.book(service_id, hm(13, 0)).await.unwrap();
    assert_eq!(hm(14, 30), later.end);
}

#[tokio::test]
async fn test_duplicate_rejection() {
    let test_setup = TestSetup::new().await;
    let service_id = test_setup.create_clinic_service(30, 3).await;
    let booking_service = &test_setup.clinic_state.booking_service;
    let patient_id = Uuid::new_v4();

    let first = booking_service
        .create_booking(
            &test_setup.request(patient_id, service_id, hm(9, 0)),
            "patient-portal".into(),
            None,
        )
        .await
        .unwrap();
    let duplicate = booking_service
        .create_booking(
            &test_setup.request(patient_id, service_id, hm(14, 0)),
            "patient-portal".into(),
            None,
        )
        .await;
    assert!(matches!(
        duplicate,
        Err(ServiceError::DuplicateBooking { patient_id: id, .. }) if id == patient_id
    ));

    booking_service
        .transition_status(
            first.id,
            BookingStatus::Cancelled,
            "patient-portal".into(),
            Some("Changed plans".into()),
            None,
        )
        .await
        .unwrap();
    let rebooked = booking_service
        .create_booking(
            &test_setup.request(patient_id, service_id, hm(14, 0)),
            "patient-portal".into(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(BookingStatus::Pending, rebooked.status);
}

#[tokio::test]
async fn test_promotion_cascade() {
    let mut test_setup = TestSetup::new().await;
    let service_id = test_setup.create_clinic_service(30, 1).await;
    let first = test_setup.book(service_id, hm(11, 0)).await.unwrap();
    let second = test_setup.book(service_id, hm(11, 0)).await.unwrap();
    let third = test_setup.book(service_id, hm(11, 0)).await.unwrap();
    let fourth = test_setup.book(service_id, hm(11, 0)).await.unwrap();
    test_setup.drain_events();
    let state = &test_setup.clinic_state;

    let cancelled = state
        .booking_service
        .transition_status(
            first.id,
            BookingStatus::Cancelled,
            "reception".into(),
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(BookingStatus::Cancelled, cancelled.status);

    let promoted = state.booking_service.get(second.id, None).await.unwrap();
    assert_eq!(BookingStatus::Confirmed, promoted.status);
    let queue = state
        .queue_service
        .get_queue(test_setup.doctor_id, MONDAY, hm(11, 0), None)
        .await
        .unwrap();
    assert_eq!(
        vec![(third.id, 1, 30), (fourth.id, 2, 60)],
        queue_state(&queue)
    );

    let history = state
        .booking_service
        .get_status_history(second.id, None)
        .await
        .unwrap();
    assert_eq!(2, history.len());
    assert_eq!(None, history[0].old_status);
    assert_eq!(BookingStatus::Queued, history[0].new_status);
    assert_eq!(Some(BookingStatus::Queued), history[1].old_status);
    assert_eq!(BookingStatus::Confirmed, history[1].new_status);
    assert_eq!("system", history[1].changed_by.as_ref());

    assert_eq!(
        vec![
            (NotificationEvent::BookingCancelled, first.id),
            (NotificationEvent::BookingPromoted, second.id),
        ],
        test_setup.drain_events()
    );
}

#[tokio::test]
async fn test_queue_stays_contiguous_after_removal_and_promotion() {
    let test_setup = TestSetup::new().await;
    let service_id = test_setup.create_clinic_service(45, 1).await;
    let mut bookings = Vec::new();
    for _ in 0..5 {
        bookings.push(test_setup.book(service_id, hm(13, 0)).await.unwrap());
    }
    let state = &test_setup.clinic_state;
    let queue = state
        .queue_service
        .get_queue(test_setup.doctor_id, MONDAY, hm(13, 0), None)
        .await
        .unwrap();
    assert_eq!(
        vec![
            (bookings[1].id, 1, 45),
            (bookings[2].id, 2, 90),
            (bookings[3].id, 3, 135),
            (bookings[4].id, 4, 180),
        ],
        queue_state(&queue)
    );

    state
        .booking_service
        .transition_status(
            bookings[2].id,
            BookingStatus::Cancelled,
            "patient-portal".into(),
            None,
            None,
        )
        .await
        .unwrap();
    let queue = state
        .queue_service
        .get_queue(test_setup.doctor_id, MONDAY, hm(13, 0), None)
        .await
        .unwrap();
    assert_eq!(
        vec![
            (bookings[1].id, 1, 45),
            (bookings[3].id, 2, 105),
            (bookings[4].id, 3, 150),
        ],
        queue_state(&queue)
    );

    state
        .booking_service
        .transition_status(
            bookings[0].id,
            BookingStatus::Cancelled,
            "reception".into(),
            None,
            None,
        )
        .await
        .unwrap();
    let queue = state
        .queue_service
        .get_queue(test_setup.doctor_id, MONDAY, hm(13, 0), None)
        .await
        .unwrap();
    assert_eq!(
        vec![(bookings[3].id, 1, 75), (bookings[4].id, 2, 120)],
        queue_state(&queue)
    );
    assert_eq!(
        BookingStatus::Confirmed,
        state.booking_service.get(bookings[1].id, None).await.unwrap().status
    );
}

#[tokio::test]
async fn test_manual_promotion_needs_capacity() {
    let test_setup = TestSetup::new().await;
    let service_id = test_setup.create_clinic_service(30, 1).await;
    let first = test_setup.book(service_id, hm(15, 0)).await.unwrap();
    let second = test_setup.book(service_id, hm(15, 0)).await.unwrap();
    let third = test_setup.book(service_id, hm(15, 0)).await.unwrap();
    let fourth = test_setup.book(service_id, hm(15, 0)).await.unwrap();
    let booking_service = &test_setup.clinic_state.booking_service;

    let result = booking_service
        .promote_queue_entry(fourth.id, "reception".into(), None, None)
        .await;
    assert!(matches!(result, Err(ServiceError::SlotFull { .. })));

    let result = booking_service
        .promote_queue_entry(first.id, "reception".into(), None, None)
        .await;
    assert!(matches!(result, Err(ServiceError::NotQueued(id)) if id == first.id));

    booking_service
        .transition_status(third.id, BookingStatus::Cancelled, "patient-portal".into(), None, None)
        .await
        .unwrap();
    let queue = test_setup
        .clinic_state
        .queue_service
        .get_queue(test_setup.doctor_id, MONDAY, hm(15, 0), None)
        .await
        .unwrap();
    assert_eq!(
        vec![(second.id, 1), (fourth.id, 2)],
        queue
            .iter()
            .map(|entry| (entry.booking_id, entry.queue_position))
            .collect::<Vec<_>>()
    );

    for status in [
        BookingStatus::Confirmed,
        BookingStatus::CheckedIn,
        BookingStatus::InProgress,
        BookingStatus::Completed,
    ] {
        booking_service
            .transition_status(first.id, status, "doctor".into(), None, None)
            .await
            .unwrap();
    }
    assert_eq!(
        BookingStatus::Confirmed,
        booking_service.get(second.id, None).await.unwrap().status
    );
    let entry = test_setup
        .clinic_state
        .queue_service
        .get_entry(fourth.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(1, entry.queue_position);
}

#[tokio::test]
async fn test_invalid_transition_is_rejected() {
    let test_setup = TestSetup::new().await;
    let service_id = test_setup.create_clinic_service(30, 1).await;
    let booking = test_setup.book(service_id, hm(9, 30)).await.unwrap();
    let booking_service = &test_setup.clinic_state.booking_service;

    let result = booking_service
        .transition_status(booking.id, BookingStatus::Completed, "doctor".into(), None, None)
        .await;

    assert!(matches!(
        result,
        Err(ServiceError::InvalidTransition {
            from: BookingStatus::Pending,
            to: BookingStatus::Completed
        })
    ));
    let history = booking_service
        .get_status_history(booking.id, None)
        .await
        .unwrap();
    assert_eq!(1, history.len());
}

#[tokio::test]
async fn test_suggestions_prefer_free_slots() {
    let test_setup = TestSetup::new().await;
    let service_id = test_setup.create_clinic_service(30, 2).await;
    test_setup.book(service_id, hm(9, 0)).await.unwrap();

    let slots = test_setup
        .clinic_state
        .suggestion_service
        .suggest_slots(
            &SuggestionRequest {
                doctor_id: test_setup.doctor_id,
                service_id,
                from: MONDAY,
                to: MONDAY,
                preference: TimePreference::Morning,
                earliest: Some(hm(9, 0)),
                latest: Some(hm(10, 0)),
            },
            10,
            None,
        )
        .await
        .unwrap();

    assert_eq!(
        vec![(hm(9, 30), 2), (hm(9, 0), 1)],
        slots
            .iter()
            .map(|slot| (slot.start, slot.remaining))
            .collect::<Vec<_>>()
    );
    assert!(slots[0].score > slots[1].score);
}
