use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assistant::{AssistantError, AssistantsApi};
use crate::chat::verticals::{AssistantRegistry, Vertical};
use crate::errors::AppError;
use crate::models::profile::ProfessionalRow;
use crate::profiles::professional::{
    render_profile_document, set_document_key, set_vector_store_file,
};
use crate::state::AppState;

const PROFILE_FILENAME: &str = "professional_profile.txt";

/// Where a mentor profile document ended up.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveOutcome {
    pub document_key: Option<String>,
    pub vector_store_id: Option<String>,
    pub vector_store_file_id: Option<String>,
}

impl ArchiveOutcome {
    pub fn archived(&self) -> bool {
        self.document_key.is_some()
    }
}

/// A profile document attached to a vertical's vector store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorStoreFile {
    pub vector_store_id: String,
    pub file_id: String,
}

impl VectorStoreFile {
    fn of(profile: &ProfessionalRow) -> Option<Self> {
        Some(VectorStoreFile {
            vector_store_id: profile.vector_store_id.clone()?,
            file_id: profile.vector_store_file_id.clone()?,
        })
    }
}

pub fn document_key(user_id: &str) -> String {
    format!("professionals/{user_id}/profile.txt")
}

/// Stores the rendered profile in object storage and, when the mentor's major
/// has a vector store, hands it to the vertical's assistant for retrieval.
///
/// Failures are logged and reflected in the outcome; the saved profile stands.
pub async fn archive_profile(state: &AppState, profile: &ProfessionalRow) -> ArchiveOutcome {
    let document = Bytes::from(render_profile_document(profile));
    let mut outcome = ArchiveOutcome::default();

    let key = document_key(&profile.user_id);
    match store_document(state, &key, document.clone()).await {
        Ok(()) => match set_document_key(&state.db, profile, &key).await {
            Ok(()) => outcome.document_key = Some(key),
            Err(e) => warn!("Could not record document key for {}: {e}", profile.user_id),
        },
        Err(e) => warn!("Profile archive failed for {}: {e}", profile.user_id),
    }

    let previous = VectorStoreFile::of(profile);
    let current = match sync_to_vector_store(
        state.assistants.as_ref(),
        &state.config.assistants,
        profile.major.as_deref(),
        previous.as_ref(),
        document,
    )
    .await
    {
        Ok(current) => {
            if current != previous {
                let recorded = current
                    .as_ref()
                    .map(|f| (f.vector_store_id.as_str(), f.file_id.as_str()));
                if let Err(e) = set_vector_store_file(&state.db, profile, recorded).await {
                    warn!("Could not record vector store file for {}: {e}", profile.user_id);
                }
            }
            current
        }
        Err(e) => {
            warn!("Vector store sync failed for {}: {e}", profile.user_id);
            previous
        }
    };

    if let Some(file) = current {
        outcome.vector_store_id = Some(file.vector_store_id);
        outcome.vector_store_file_id = Some(file.file_id);
    }
    outcome
}

async fn store_document(state: &AppState, key: &str, document: Bytes) -> Result<(), AppError> {
    state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(key)
        .body(ByteStream::from(document))
        .content_type("text/plain; charset=utf-8")
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

    info!(
        "Uploaded profile document to s3://{}/{}",
        state.config.s3_bucket, key
    );
    Ok(())
}

/// Uploads the document and attaches it to the vector store of the major's
/// vertical, then retires `previous` so each mentor has one current document.
/// Returns `None` when no vector store applies.
pub async fn sync_to_vector_store(
    api: &dyn AssistantsApi,
    registry: &AssistantRegistry,
    major: Option<&str>,
    previous: Option<&VectorStoreFile>,
    document: Bytes,
) -> Result<Option<VectorStoreFile>, AssistantError> {
    let vector_store_id = major
        .and_then(Vertical::for_major)
        .and_then(|vertical| registry.get(vertical))
        .and_then(|binding| binding.vector_store_id.clone());

    let current = match vector_store_id {
        Some(vector_store_id) => {
            let file = api.upload_file(PROFILE_FILENAME, document).await?;
            api.attach_file_to_vector_store(&vector_store_id, &file.id)
                .await?;
            info!("Attached {} to vector store {}", file.id, vector_store_id);
            Some(VectorStoreFile {
                vector_store_id,
                file_id: file.id,
            })
        }
        None => None,
    };

    if let Some(old) = previous {
        retire_file(api, old).await;
    }
    Ok(current)
}

/// Detaches and deletes a superseded profile document. Already-gone files are fine.
async fn retire_file(api: &dyn AssistantsApi, file: &VectorStoreFile) {
    match api
        .detach_file_from_vector_store(&file.vector_store_id, &file.file_id)
        .await
    {
        Ok(()) | Err(AssistantError::Api { status: 404, .. }) => {}
        Err(e) => warn!(
            "Could not detach {} from vector store {}: {e}",
            file.file_id, file.vector_store_id
        ),
    }
    match api.delete_file(&file.file_id).await {
        Ok(()) | Err(AssistantError::Api { status: 404, .. }) => {
            debug!("Retired profile document {}", file.file_id)
        }
        Err(e) => warn!("Could not delete file {}: {e}", file.file_id),
    }
}
