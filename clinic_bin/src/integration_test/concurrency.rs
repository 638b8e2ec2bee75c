use std::sync::Arc;

use service::{
    availability::AvailabilityService,
    booking::{BookingRequest, BookingService, BookingStatus},
    queue::QueueService,
};
use uuid::Uuid;

use crate::integration_test::{hm, TestSetup, MONDAY};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creation_keeps_capacity() {
    let test_setup = TestSetup::new().await;
    let service_id = test_setup.create_clinic_service(30, 2).await;
    let booking_service = test_setup.clinic_state.booking_service.clone();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let booking_service = Arc::clone(&booking_service);
        let request = BookingRequest {
            patient_id: Uuid::new_v4(),
            doctor_id: test_setup.doctor_id,
            service_id,
            date: MONDAY,
            start: hm(13, 0),
            notes: None,
        };
        handles.push(tokio::spawn(async move {
            booking_service
                .create_booking(&request, "patient-portal".into(), None)
                .await
        }));
    }
    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap().unwrap().status);
    }

    assert_eq!(
        2,
        statuses
            .iter()
            .filter(|status| **status == BookingStatus::Pending)
            .count()
    );
    assert_eq!(
        8,
        statuses
            .iter()
            .filter(|status| **status == BookingStatus::Queued)
            .count()
    );

    let state = &test_setup.clinic_state;
    let availability = state
        .availability_service
        .check_availability(test_setup.doctor_id, MONDAY, hm(13, 0), 2, None)
        .await
        .unwrap();
    assert_eq!(2, availability.occupied);
    let queue = state
        .queue_service
        .get_queue(test_setup.doctor_id, MONDAY, hm(13, 0), None)
        .await
        .unwrap();
    assert_eq!(
        (1..=8).collect::<Vec<u32>>(),
        queue
            .iter()
            .map(|entry| entry.queue_position)
            .collect::<Vec<_>>()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cancellations_promote_in_order() {
    let test_setup = TestSetup::new().await;
    let service_id = test_setup.create_clinic_service(30, 2).await;
    let mut bookings = Vec::new();
    for _ in 0..5 {
        bookings.push(test_setup.book(service_id, hm(16, 0)).await.unwrap());
    }
    let booking_service = test_setup.clinic_state.booking_service.clone();

    let handles: Vec<_> = bookings[..2]
        .iter()
        .map(|booking| {
            let booking_service = Arc::clone(&booking_service);
            let booking_id = booking.id;
            tokio::spawn(async move {
                booking_service
                    .transition_status(
                        booking_id,
                        BookingStatus::Cancelled,
                        "reception".into(),
                        None,
                        None,
                    )
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for (booking, expected) in bookings[2..].iter().zip([
        BookingStatus::Confirmed,
        BookingStatus::Confirmed,
        BookingStatus::Queued,
    ]) {
        assert_eq!(
            expected,
            booking_service.get(booking.id, None).await.unwrap().status
        );
    }
    let entry = test_setup
        .clinic_state
        .queue_service
        .get_entry(bookings[4].id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(1, entry.queue_position);
}
