//! Appwrite REST client implementing the backend collaborator traits.
//!
//! Every request carries `X-Appwrite-Project` and `X-Appwrite-Key`.
//! Error bodies (`{"message", "code", "type"}`) are mapped onto
//! `ServiceError`, with 409 becoming `Conflict` and 404 `NotFound`.

use futures_util::FutureExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{
    BlobStorage, CollectionRef, DocumentDatabase, IdentityService, Query, ServiceError,
    ServiceFuture,
};
use crate::config::AppConfig;
use crate::models::{FileRef, Identity, NewIdentity, UploadedDocument};

pub struct AppwriteClient {
    base_url: String,
    project_id: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest<'a> {
    user_id: &'a str,
    email: &'a str,
    phone: &'a str,
    name: &'a str,
}

#[derive(Deserialize)]
struct UserList {
    users: Vec<Identity>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDocumentRequest<'a> {
    document_id: &'a str,
    data: serde_json::Value,
}

#[derive(Serialize)]
struct UpdateDocumentRequest {
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct DocumentList {
    documents: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct AppwriteErrorBody {
    #[serde(default)]
    message: String,
}

impl AppwriteClient {
    pub fn new(config: &AppConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ServiceError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
    }

    fn documents_path(collection: &CollectionRef) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            collection.database_id, collection.collection_id
        )
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                ServiceError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                ServiceError::Timeout
            } else {
                ServiceError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AppwriteErrorBody>(&raw)
                .map(|b| b.message)
                .unwrap_or(raw);
            return Err(match status {
                StatusCode::CONFLICT => ServiceError::Conflict(message),
                StatusCode::NOT_FOUND => ServiceError::NotFound(message),
                _ => ServiceError::Status {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::ResponseParsing(e.to_string()))
    }
}

fn query_params(queries: &[Query]) -> Vec<(&'static str, String)> {
    queries.iter().map(|q| ("queries[]", q.to_json())).collect()
}

impl IdentityService for AppwriteClient {
    fn create<'a>(&'a self, user_id: &'a str, new: &'a NewIdentity) -> ServiceFuture<'a, Identity> {
        async move {
            let body = CreateUserRequest {
                user_id,
                email: &new.email,
                phone: &new.phone,
                name: &new.name,
            };
            self.send(self.request(Method::POST, "/users").json(&body)).await
        }
        .boxed()
    }

    fn list<'a>(&'a self, queries: &'a [Query]) -> ServiceFuture<'a, Vec<Identity>> {
        async move {
            let list: UserList = self
                .send(self.request(Method::GET, "/users").query(&query_params(queries)))
                .await?;
            Ok(list.users)
        }
        .boxed()
    }

    fn get<'a>(&'a self, user_id: &'a str) -> ServiceFuture<'a, Identity> {
        async move {
            self.send(self.request(Method::GET, &format!("/users/{user_id}")))
                .await
        }
        .boxed()
    }
}

impl DocumentDatabase for AppwriteClient {
    fn create_document<'a>(
        &'a self,
        collection: &'a CollectionRef,
        document_id: &'a str,
        fields: serde_json::Value,
    ) -> ServiceFuture<'a, serde_json::Value> {
        async move {
            let body = CreateDocumentRequest {
                document_id,
                data: fields,
            };
            self.send(
                self.request(Method::POST, &Self::documents_path(collection))
                    .json(&body),
            )
            .await
        }
        .boxed()
    }

    fn list_documents<'a>(
        &'a self,
        collection: &'a CollectionRef,
        queries: &'a [Query],
    ) -> ServiceFuture<'a, Vec<serde_json::Value>> {
        async move {
            let list: DocumentList = self
                .send(
                    self.request(Method::GET, &Self::documents_path(collection))
                        .query(&query_params(queries)),
                )
                .await?;
            Ok(list.documents)
        }
        .boxed()
    }

    fn update_document<'a>(
        &'a self,
        collection: &'a CollectionRef,
        document_id: &'a str,
        fields: serde_json::Value,
    ) -> ServiceFuture<'a, serde_json::Value> {
        async move {
            let path = format!("{}/{}", Self::documents_path(collection), document_id);
            self.send(
                self.request(Method::PATCH, &path)
                    .json(&UpdateDocumentRequest { data: fields }),
            )
            .await
        }
        .boxed()
    }
}

impl BlobStorage for AppwriteClient {
    fn create_file<'a>(
        &'a self,
        bucket_id: &'a str,
        file_id: &'a str,
        document: &'a UploadedDocument,
    ) -> ServiceFuture<'a, FileRef> {
        async move {
            let part = Part::bytes(document.bytes.clone()).file_name(document.file_name.clone());
            let form = Form::new()
                .text("fileId", file_id.to_string())
                .part("file", part);
            self.send(
                self.request(Method::POST, &format!("/storage/buckets/{bucket_id}/files"))
                    .multipart(form),
            )
            .await
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Multipart, Path, RawQuery, State};
    use axum::http::HeaderMap;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    /// Requests seen by the fake Appwrite server, as "METHOD path".
    type Seen = Arc<Mutex<Vec<String>>>;

    fn check_headers(headers: &HeaderMap) -> bool {
        headers.get("X-Appwrite-Project").map(|v| v == "proj").unwrap_or(false)
            && headers.get("X-Appwrite-Key").map(|v| v == "local").unwrap_or(false)
    }

    async fn create_user(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> axum::response::Response {
        seen.lock().unwrap().push("POST /users".into());
        if !check_headers(&headers) {
            return axum::http::StatusCode::UNAUTHORIZED.into_response();
        }
        if body["email"] == "taken@example.com" {
            return (
                axum::http::StatusCode::CONFLICT,
                Json(serde_json::json!({
                    "message": "A user with the same id, email, or phone already exists in this project.",
                    "code": 409,
                    "type": "user_already_exists"
                })),
            )
                .into_response();
        }
        Json(serde_json::json!({
            "$id": body["userId"],
            "name": body["name"],
            "email": body["email"],
            "phone": body["phone"],
        }))
        .into_response()
    }

    async fn list_users(State(seen): State<Seen>, RawQuery(query): RawQuery) -> Json<serde_json::Value> {
        seen.lock()
            .unwrap()
            .push(format!("GET /users?{}", query.unwrap_or_default()));
        Json(serde_json::json!({
            "total": 1,
            "users": [{"$id": "existing", "name": "Ada", "email": "taken@example.com", "phone": ""}]
        }))
    }

    async fn get_user(Path(id): Path<String>) -> axum::response::Response {
        if id == "missing" {
            return (
                axum::http::StatusCode::NOT_FOUND,
                Json(serde_json::json!({"message": "User with the requested ID could not be found.", "code": 404})),
            )
                .into_response();
        }
        (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
    }

    async fn create_file(
        Path(bucket): Path<String>,
        mut multipart: Multipart,
    ) -> Json<serde_json::Value> {
        let mut file_id = String::new();
        let mut file_name = String::new();
        while let Ok(Some(field)) = multipart.next_field().await {
            match field.name().unwrap_or("") {
                "fileId" => file_id = field.text().await.unwrap_or_default(),
                "file" => file_name = field.file_name().unwrap_or("").to_string(),
                _ => {}
            }
        }
        Json(serde_json::json!({"$id": file_id, "bucketId": bucket, "name": file_name}))
    }

    async fn start_fake_appwrite() -> (SocketAddr, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/v1/users", post(create_user).get(list_users))
            .route("/v1/users/:id", get(get_user))
            .route("/v1/storage/buckets/:bucket/files", post(create_file))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (addr, seen)
    }

    fn client_for(addr: SocketAddr) -> AppwriteClient {
        let mut config = AppConfig::for_tests();
        config.endpoint = format!("http://{addr}/v1");
        config.project_id = "proj".into();
        config.api_key = "local".into();
        AppwriteClient::new(&config).unwrap()
    }

    fn new_identity(email: &str) -> NewIdentity {
        NewIdentity {
            name: "Ada".into(),
            email: email.into(),
            phone: "+15551234567".into(),
        }
    }

    #[tokio::test]
    async fn create_user_sends_headers_and_parses_identity() {
        let (addr, _) = start_fake_appwrite().await;
        let client = client_for(addr);
        let identity = IdentityService::create(&client, "abc", &new_identity("ada@example.com"))
            .await
            .unwrap();
        assert_eq!(identity.id, "abc");
        assert_eq!(identity.email, "ada@example.com");
    }

    #[tokio::test]
    async fn http_409_maps_to_conflict() {
        let (addr, _) = start_fake_appwrite().await;
        let client = client_for(addr);
        let err = IdentityService::create(&client, "abc", &new_identity("taken@example.com"))
            .await
            .unwrap_err();
        match err {
            ServiceError::Conflict(message) => assert!(message.contains("already exists")),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_sends_json_queries() {
        let (addr, seen) = start_fake_appwrite().await;
        let client = client_for(addr);
        let queries = [Query::equal("email", "taken@example.com")];
        let users = client.list(&queries).await.unwrap();
        assert_eq!(users.len(), 1);
        let seen = seen.lock().unwrap();
        assert!(seen[0].starts_with("GET /users?queries%5B%5D="));
        assert!(seen[0].contains("taken%40example.com"));
    }

    #[tokio::test]
    async fn http_404_maps_to_not_found_and_500_to_status() {
        let (addr, _) = start_fake_appwrite().await;
        let client = client_for(addr);
        assert!(matches!(
            client.get("missing").await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
        assert_eq!(
            client.get("other").await.unwrap_err(),
            ServiceError::Status {
                status: 500,
                message: "boom".into()
            }
        );
    }

    #[tokio::test]
    async fn create_file_uploads_multipart() {
        let (addr, _) = start_fake_appwrite().await;
        let client = client_for(addr);
        let document = UploadedDocument {
            file_name: "passport.png".into(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        };
        let file = client.create_file("bucket", "file-1", &document).await.unwrap();
        assert_eq!(file.id, "file-1");
    }

    #[tokio::test]
    async fn unreachable_backend_is_connection_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(addr);
        assert!(matches!(
            client.get("any").await.unwrap_err(),
            ServiceError::Connection(_)
        ));
    }
}
