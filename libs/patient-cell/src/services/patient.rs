// libs/patient-cell/src/services/patient.rs
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::StoreClient;

use crate::models::{Patient, PatientError, PatientProfile, UpdatePatientProfileRequest};

pub struct PatientService {
    store: StoreClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(PatientError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))
    }

    pub async fn get_profile(&self, patient_id: Uuid) -> Result<PatientProfile, PatientError> {
        debug!("Fetching profile for patient {}", patient_id);
        let patient = self.get_patient(patient_id).await?;
        Ok(PatientProfile::from(patient))
    }

    pub async fn update_profile(
        &self,
        patient_id: Uuid,
        request: UpdatePatientProfileRequest,
    ) -> Result<(), PatientError> {
        debug!("Updating profile for patient {}", patient_id);

        if request.name.is_empty()
            || request.phone.is_empty()
            || request.dob.is_empty()
            || request.gender.is_empty()
        {
            return Err(PatientError::ValidationError("Data Missing".to_string()));
        }

        // Confirm the patient exists before patching
        self.get_patient(patient_id).await?;

        let mut update_data = serde_json::Map::new();
        update_data.insert("name".to_string(), json!(request.name));
        update_data.insert("phone".to_string(), json!(request.phone));
        update_data.insert("dob".to_string(), json!(request.dob));
        update_data.insert("gender".to_string(), json!(request.gender));
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), address);
        }
        if let Some(image) = request.image {
            update_data.insert("image".to_string(), json!(image));
        }

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let _: Vec<Value> = self
            .store
            .write(Method::PATCH, &path, Value::Object(update_data))
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
