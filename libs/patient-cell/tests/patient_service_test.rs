use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_cell::models::{PatientError, UpdatePatientProfileRequest};
use patient_cell::services::patient::PatientService;
use shared_utils::test_utils::{MockStoreResponses, TestConfig};

async fn service_with_store(server: &MockServer) -> PatientService {
    let config = TestConfig::default()
        .with_store_url(&server.uri())
        .to_app_config();
    PatientService::new(&config)
}

fn update_request() -> UpdatePatientProfileRequest {
    UpdatePatientProfileRequest {
        name: "Test Patient".to_string(),
        phone: "5551234567".to_string(),
        address: Some(json!({ "line1": "1 Main St", "line2": "" })),
        dob: "1990-01-20".to_string(),
        gender: "Female".to_string(),
        image: None,
    }
}

#[tokio::test]
async fn profile_view_redacts_credentials_and_tokens() {
    let server = MockServer::start().await;
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("eq.{}", patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::patient_response(
                &patient_id.to_string(),
                "patient@example.com",
                "Test Patient"
            )
        ])))
        .mount(&server)
        .await;

    let service = service_with_store(&server).await;
    let profile = service.get_profile(patient_id).await.unwrap();

    assert_eq!(profile.name, "Test Patient");

    let serialized = serde_json::to_value(&profile).unwrap();
    assert!(serialized.get("password").is_none());
    assert!(serialized.get("verification_token").is_none());
    assert!(serialized.get("reset_password_token").is_none());
}

#[tokio::test]
async fn update_requires_the_mandatory_fields() {
    let server = MockServer::start().await;
    let service = service_with_store(&server).await;

    let blank_one_field: [fn(&mut UpdatePatientProfileRequest); 4] = [
        |r| r.name = String::new(),
        |r| r.phone = String::new(),
        |r| r.dob = String::new(),
        |r| r.gender = String::new(),
    ];

    for mutate in blank_one_field {
        let mut request = update_request();
        mutate(&mut request);
        let err = service
            .update_profile(Uuid::new_v4(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, PatientError::ValidationError(msg) if msg == "Data Missing"));
    }
}

#[tokio::test]
async fn update_patches_the_stored_document() {
    let server = MockServer::start().await;
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::patient_response(
                &patient_id.to_string(),
                "patient@example.com",
                "Test Patient"
            )
        ])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("eq.{}", patient_id)))
        .and(body_partial_json(json!({
            "name": "Test Patient",
            "phone": "5551234567",
            "gender": "Female"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::patient_response(
                &patient_id.to_string(),
                "patient@example.com",
                "Test Patient"
            )
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_with_store(&server).await;
    service
        .update_profile(patient_id, update_request())
        .await
        .unwrap();
}
