use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use payment_cell::models::PaymentError;
use payment_cell::services::payment::PaymentService;
use shared_utils::test_utils::{MockStoreResponses, TestConfig};

async fn service(store: &MockServer, gateway: &MockServer) -> PaymentService {
    let config = TestConfig::default()
        .with_store_url(&store.uri())
        .with_razorpay_base_url(&gateway.uri())
        .to_app_config();
    PaymentService::new(&config).unwrap()
}

fn order_json(order_id: &str, receipt: &str, status: &str) -> serde_json::Value {
    json!({
        "id": order_id,
        "amount": 50000,
        "currency": "INR",
        "receipt": receipt,
        "status": status
    })
}

#[tokio::test]
async fn order_amount_is_fee_in_minor_units() {
    let store = MockServer::start().await;
    let gateway = MockServer::start().await;

    let appointment_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4().to_string();
    let doctor_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_response(
                &appointment_id.to_string(),
                &patient_id,
                &doctor_id,
                "booked"
            )
        ])))
        .mount(&store)
        .await;

    // fee 500 -> 50000 minor units
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_partial_json(json!({
            "amount": 50000,
            "currency": "INR",
            "receipt": appointment_id.to_string()
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json(
            "order_test_1",
            &appointment_id.to_string(),
            "created",
        )))
        .expect(1)
        .mount(&gateway)
        .await;

    let service = service(&store, &gateway).await;
    let order = service.create_order(appointment_id).await.unwrap();

    assert_eq!(order.id, "order_test_1");
    assert_eq!(order.amount, 50000);
}

#[tokio::test]
async fn cancelled_appointment_cannot_be_paid() {
    let store = MockServer::start().await;
    let gateway = MockServer::start().await;

    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_response(
                &appointment_id.to_string(),
                &Uuid::new_v4().to_string(),
                &Uuid::new_v4().to_string(),
                "cancelled"
            )
        ])))
        .mount(&store)
        .await;

    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&gateway)
        .await;

    let service = service(&store, &gateway).await;
    let err = service.create_order(appointment_id).await.unwrap_err();

    assert!(matches!(err, PaymentError::AppointmentUnpayable));
    assert_eq!(err.to_string(), "Appointment Cancelled or not found");
}

#[tokio::test]
async fn missing_appointment_cannot_be_paid() {
    let store = MockServer::start().await;
    let gateway = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&store)
        .await;

    let service = service(&store, &gateway).await;
    let err = service.create_order(Uuid::new_v4()).await.unwrap_err();

    assert!(matches!(err, PaymentError::AppointmentUnpayable));
}

#[tokio::test]
async fn paid_order_flips_the_payment_flag() {
    let store = MockServer::start().await;
    let gateway = MockServer::start().await;

    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path_regex(r"^/orders/order_test_1$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json(
            "order_test_1",
            &appointment_id.to_string(),
            "paid",
        )))
        .mount(&gateway)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({ "payment": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_response(
                &appointment_id.to_string(),
                &Uuid::new_v4().to_string(),
                &Uuid::new_v4().to_string(),
                "booked"
            )
        ])))
        .expect(1)
        .mount(&store)
        .await;

    let service = service(&store, &gateway).await;
    let paid = service.verify_order("order_test_1").await.unwrap();

    assert!(paid);
}

#[tokio::test]
async fn unpaid_order_changes_nothing() {
    let store = MockServer::start().await;
    let gateway = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/orders/.*$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json(
            "order_test_2",
            &Uuid::new_v4().to_string(),
            "created",
        )))
        .mount(&gateway)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&store)
        .await;

    let service = service(&store, &gateway).await;
    let paid = service.verify_order("order_test_2").await.unwrap();

    assert!(!paid);
}
