use clinic_utils::DayOfWeek;
use service::{
    booking::BookingService,
    schedule::ScheduleService,
    time_grid::{ScheduleConflict, TimeGridService},
    ServiceError,
};
use uuid::Uuid;

use crate::integration_test::{hm, TestSetup, MONDAY, SATURDAY};

#[tokio::test]
async fn test_grid_follows_schedule() {
    let test_setup = TestSetup::new().await;
    let state = &test_setup.clinic_state;
    state
        .schedule_service
        .add_break(
            test_setup.doctor_id,
            MONDAY,
            hm(12, 0),
            hm(13, 0),
            Some("Lunch".into()),
            None,
        )
        .await
        .unwrap();

    let slots = state
        .time_grid_service
        .compute_slots(test_setup.doctor_id, MONDAY, 60, Some(hm(10, 0)), Some(hm(15, 0)), None)
        .await
        .unwrap();

    assert_eq!(vec![hm(10, 0), hm(10, 30), hm(11, 0), hm(13, 0), hm(13, 30), hm(14, 0)], slots.to_vec());
}

#[tokio::test]
async fn test_booking_rejects_schedule_conflicts() {
    let test_setup = TestSetup::new().await;
    let service_id = test_setup.create_clinic_service(30, 2).await;
    let state = &test_setup.clinic_state;
    state
        .schedule_service
        .add_break(test_setup.doctor_id, MONDAY, hm(12, 0), hm(13, 0), None, None)
        .await
        .unwrap();

    let result = test_setup.book(service_id, hm(12, 30)).await;
    assert!(matches!(
        result,
        Err(ServiceError::ScheduleConflict(ScheduleConflict::Break { .. }))
    ));

    let result = test_setup.book(service_id, hm(16, 45)).await;
    assert!(matches!(
        result,
        Err(ServiceError::ScheduleConflict(ScheduleConflict::OutsideWorkingHours { .. }))
    ));

    let result = test_setup.book(service_id, hm(9, 15)).await;
    assert!(matches!(
        result,
        Err(ServiceError::ScheduleConflict(ScheduleConflict::NotOnGrid(_)))
    ));

    let result = state
        .booking_service
        .create_booking(
            &service::booking::BookingRequest {
                date: SATURDAY,
                ..test_setup.request(Uuid::new_v4(), service_id, hm(9, 0))
            },
            "patient-portal".into(),
            None,
        )
        .await;
    assert!(matches!(
        result,
        Err(ServiceError::ScheduleConflict(ScheduleConflict::NotWorkingDay(DayOfWeek::Saturday)))
    ));
}

#[tokio::test]
async fn test_off_day_closes_the_day() {
    let test_setup = TestSetup::new().await;
    let service_id = test_setup.create_clinic_service(30, 2).await;
    let state = &test_setup.clinic_state;
    let off_day = state
        .schedule_service
        .add_off_day(test_setup.doctor_id, MONDAY, Some("Conference".into()), None)
        .await
        .unwrap();

    let duplicate = state
        .schedule_service
        .add_off_day(test_setup.doctor_id, MONDAY, None, None)
        .await;
    assert!(matches!(duplicate, Err(ServiceError::EntityAlreadyExists(id)) if id == off_day.id));

    let slots = state
        .time_grid_service
        .compute_slots(test_setup.doctor_id, MONDAY, 30, None, None, None)
        .await
        .unwrap();
    assert!(slots.is_empty());
    let result = test_setup.book(service_id, hm(9, 0)).await;
    assert!(matches!(
        result,
        Err(ServiceError::ScheduleConflict(ScheduleConflict::OffDay(date))) if date == MONDAY
    ));

    state
        .schedule_service
        .remove_off_day(off_day.id, None)
        .await
        .unwrap();
    assert!(test_setup.book(service_id, hm(9, 0)).await.is_ok());
}

#[tokio::test]
async fn test_working_hours_are_replaced() {
    let test_setup = TestSetup::new().await;
    let state = &test_setup.clinic_state;

    state
        .schedule_service
        .set_working_hours(test_setup.doctor_id, DayOfWeek::Monday, hm(9, 0), hm(10, 0), None)
        .await
        .unwrap();
    let working_hours = state
        .schedule_service
        .get_working_hours(test_setup.doctor_id, None)
        .await
        .unwrap();
    assert_eq!(1, working_hours.len());
    assert_eq!(hm(9, 0), working_hours[0].start);

    state
        .schedule_service
        .remove_working_hours(test_setup.doctor_id, DayOfWeek::Monday, None)
        .await
        .unwrap();
    let slots = state
        .time_grid_service
        .compute_slots(test_setup.doctor_id, MONDAY, 30, None, None, None)
        .await
        .unwrap();
    assert!(slots.is_empty());
}
