use crate::backend::{unique_id, Backend, CollectionRef, Query};
use crate::config::AppConfig;
use crate::models::{PatientDocumentFields, PatientRecord, PatientRegistration, UploadedDocument};

use super::{from_document, to_document, ActionError};

fn patient_collection(config: &AppConfig) -> CollectionRef {
    CollectionRef::new(&config.database_id, &config.patient_collection_id)
}

/// Register a patient, uploading the identification document first.
///
/// The upload and the record creation are two independent calls. When the
/// record creation fails after a successful upload the error carries the
/// orphaned file id; the file is not removed.
pub async fn register_patient(
    backend: &Backend,
    config: &AppConfig,
    registration: &PatientRegistration,
    document: Option<&UploadedDocument>,
) -> Result<PatientRecord, ActionError> {
    let file = match document {
        Some(document) => {
            let file_id = unique_id();
            let file = backend
                .storage
                .create_file(&config.bucket_id, &file_id, document)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Identification document upload failed");
                    e
                })?;
            tracing::info!(file_id = %file.id, "Identification document uploaded");
            Some(file)
        }
        None => None,
    };

    let fields = PatientDocumentFields {
        identification_document_id: file.as_ref().map(|f| f.id.as_str()),
        identification_document_url: file.as_ref().map(|f| config.file_view_url(&f.id)),
        registration,
    };
    let data = to_document("patient", &fields)?;

    let document_id = unique_id();
    let created = backend
        .documents
        .create_document(&patient_collection(config), &document_id, data)
        .await;

    match created {
        Ok(doc) => {
            let record: PatientRecord = from_document("patient", doc)?;
            tracing::info!(patient_id = %record.id, user_id = %record.registration.user_id, "Patient registered");
            Ok(record)
        }
        Err(e) => {
            tracing::error!(error = %e, "An error occurred while creating a new patient");
            match file {
                Some(file) => {
                    tracing::warn!(file_id = %file.id, "Uploaded identification document left without a patient record");
                    Err(ActionError::OrphanedUpload {
                        file_id: file.id,
                        source: e,
                    })
                }
                None => Err(e.into()),
            }
        }
    }
}

/// Look up the patient record created for a user.
pub async fn get_patient_by_user(
    backend: &Backend,
    config: &AppConfig,
    user_id: &str,
) -> Result<PatientRecord, ActionError> {
    let queries = [Query::equal("userId", user_id), Query::Limit(1)];
    let documents = backend
        .documents
        .list_documents(&patient_collection(config), &queries)
        .await
        .map_err(|e| {
            tracing::error!(user_id, error = %e, "An error occurred while retrieving the patient details");
            e
        })?;

    let doc = documents
        .into_iter()
        .next()
        .ok_or_else(|| ActionError::NotFound(format!("patient for user {user_id}")))?;
    from_document("patient", doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::backend::memory::Operation;
    use crate::backend::{InMemoryBackend, ServiceError};
    use crate::models::patient::sample_registration;

    fn setup() -> (Backend, Arc<InMemoryBackend>, AppConfig) {
        let memory = Arc::new(InMemoryBackend::new());
        (Backend::shared(memory.clone()), memory, AppConfig::for_tests())
    }

    fn passport() -> UploadedDocument {
        UploadedDocument {
            file_name: "passport.jpg".into(),
            bytes: vec![0xff, 0xd8, 0xff],
        }
    }

    #[tokio::test]
    async fn without_document_reference_fields_are_null() {
        let (backend, memory, config) = setup();
        let record = register_patient(&backend, &config, &sample_registration("u1"), None)
            .await
            .unwrap();

        assert!(record.identification_document_id.is_none());
        assert!(record.identification_document_url.is_none());
        assert_eq!(memory.call_count(Operation::CreateFile), 0);

        let stored = &memory.documents(&patient_collection(&config))[0];
        assert!(stored["identificationDocumentId"].is_null());
        assert!(stored["identificationDocumentUrl"].is_null());
    }

    #[tokio::test]
    async fn document_uploaded_before_record_and_url_composed() {
        let (backend, memory, config) = setup();
        let record = register_patient(
            &backend,
            &config,
            &sample_registration("u1"),
            Some(&passport()),
        )
        .await
        .unwrap();

        assert_eq!(
            memory.calls(),
            vec![Operation::CreateFile, Operation::CreateDocument]
        );
        let file_id = record.identification_document_id.clone().unwrap();
        assert_eq!(
            record.identification_document_url.as_deref(),
            Some(
                format!(
                    "https://cloud.appwrite.io/v1/storage/buckets/bucket/files/{file_id}/view?project=proj"
                )
                .as_str()
            )
        );
    }

    #[tokio::test]
    async fn failed_upload_creates_no_record() {
        let (backend, memory, config) = setup();
        memory.fail_next(Operation::CreateFile, ServiceError::Timeout);

        let err = register_patient(&backend, &config, &sample_registration("u1"), Some(&passport()))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Service(ServiceError::Timeout)));
        assert_eq!(memory.call_count(Operation::CreateDocument), 0);
    }

    #[tokio::test]
    async fn failed_record_after_upload_reports_orphan() {
        let (backend, memory, config) = setup();
        memory.fail_next(
            Operation::CreateDocument,
            ServiceError::Status {
                status: 400,
                message: "Invalid document structure".into(),
            },
        );

        let err = register_patient(&backend, &config, &sample_registration("u1"), Some(&passport()))
            .await
            .unwrap_err();
        match err {
            ActionError::OrphanedUpload { file_id, .. } => assert!(!file_id.is_empty()),
            other => panic!("expected orphaned upload, got {other:?}"),
        }
        assert_eq!(memory.file_count(), 1);
    }

    #[tokio::test]
    async fn patient_found_by_user_id() {
        let (backend, _, config) = setup();
        register_patient(&backend, &config, &sample_registration("u1"), None)
            .await
            .unwrap();
        register_patient(&backend, &config, &sample_registration("u2"), None)
            .await
            .unwrap();

        let found = get_patient_by_user(&backend, &config, "u2").await.unwrap();
        assert_eq!(found.registration.user_id, "u2");

        assert!(matches!(
            get_patient_by_user(&backend, &config, "u3").await.unwrap_err(),
            ActionError::NotFound(_)
        ));
    }
}
