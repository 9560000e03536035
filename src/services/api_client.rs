use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use reqwest_eventsource::{retry, EventSource};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::models::{
    ApiSettings, NewTask, Pet, PetAction, PetActionResult, PetPoints, PetStatus, Profile,
    ProfilePatch, Roadmap, Session, Task, TaskPage, TaskPatch, TaskQuery,
};

const TASK_SERVICE: &str = "/v1/task-service";
const PET_SERVICE: &str = "/v1/pet-service";
const USER_SERVICE: &str = "/v1/user-service";
const TRACKING_SERVICE: &str = "/v1/data-tracking-service";
const EVENTS_PATH: &str = "/v1/events";

/// Largest page the task service will hand out.
pub const MAX_PAGE_LIMIT: u32 = 100;
const MAX_SNAPSHOT_PAGES: u32 = 1_000;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TagList {
    #[serde(default)]
    items: Vec<String>,
}

/// HTTP client for the API gateway, bound to one session.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    stream_http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl GatewayClient {
    pub fn new(settings: &ApiSettings, session: Session) -> ApiResult<Self> {
        let base_url = settings.base_url.trim().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|_| ApiError::InvalidUrl(base_url.clone()))?;

        let timeout = Duration::from_secs(settings.timeout_secs.max(1));
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network {
                url: base_url.clone(),
                source: e,
            })?;
        // Event streams stay open indefinitely; only bound the connect phase.
        let stream_http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network {
                url: base_url.clone(),
                source: e,
            })?;

        Ok(Self {
            http,
            stream_http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, service: &str, path: &str) -> String {
        format!("{}{}{}", self.base_url, service, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let mut builder = builder.header("Content-Type", "application/json");
        if let Some(token) = &self.session.access_token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(user_id) = &self.session.user_id {
            builder = builder.header("X-User-Id", user_id);
        }
        builder
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.authorize(self.http.request(method, url))
    }

    async fn send(&self, builder: RequestBuilder, url: &str) -> ApiResult<Response> {
        let response = builder.send().await.map_err(|e| ApiError::Network {
            url: url.to_string(),
            source: e,
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            url: url.to_string(),
            status,
            message: error_message(&text, status),
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder, url: &str) -> ApiResult<T> {
        let response = self.send(builder, url).await?;
        let text = response.text().await.map_err(|e| ApiError::Network {
            url: url.to_string(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            source: e,
        })
    }

    // ----- task service -----

    pub async fn list_tasks(&self, query: &TaskQuery) -> ApiResult<TaskPage> {
        let url = self.url(TASK_SERVICE, "/tasks");
        let builder = self.request(Method::GET, &url).query(&task_query_pairs(query));
        self.send_json(builder, &url).await
    }

    /// Every task the user owns, trash included, across all pages.
    pub async fn fetch_snapshot(&self) -> ApiResult<Vec<Task>> {
        let mut tasks = Vec::new();
        let mut page = 1;
        loop {
            let query = TaskQuery {
                page: Some(page),
                limit: Some(MAX_PAGE_LIMIT),
                include_deleted: true,
                ..Default::default()
            };
            let batch = self.list_tasks(&query).await?;
            let received = batch.items.len();
            tasks.extend(batch.items);

            let limit = batch.limit.unwrap_or(MAX_PAGE_LIMIT) as usize;
            let reached_total = batch.total.is_some_and(|total| tasks.len() as u64 >= total);
            if received == 0 || received < limit || reached_total || page >= MAX_SNAPSHOT_PAGES {
                break;
            }
            page += 1;
        }
        log::debug!("Fetched snapshot of {} tasks", tasks.len());
        Ok(tasks)
    }

    pub async fn get_task(&self, id: i64) -> ApiResult<Task> {
        let url = self.url(TASK_SERVICE, &format!("/tasks/{}", id));
        self.send_json(self.request(Method::GET, &url), &url).await
    }

    pub async fn create_task(&self, task: &NewTask) -> ApiResult<Task> {
        let url = self.url(TASK_SERVICE, "/tasks");
        self.send_json(self.request(Method::POST, &url).json(task), &url).await
    }

    pub async fn update_task(&self, id: i64, patch: &TaskPatch) -> ApiResult<Task> {
        let url = self.url(TASK_SERVICE, &format!("/tasks/{}", id));
        self.send_json(self.request(Method::PATCH, &url).json(patch), &url).await
    }

    pub async fn start_task(&self, id: i64) -> ApiResult<Task> {
        let url = self.url(TASK_SERVICE, &format!("/tasks/{}/start", id));
        self.send_json(self.request(Method::POST, &url), &url).await
    }

    pub async fn complete_task(&self, id: i64) -> ApiResult<Task> {
        let url = self.url(TASK_SERVICE, &format!("/tasks/{}/complete", id));
        self.send_json(self.request(Method::POST, &url), &url).await
    }

    pub async fn delete_task(&self, id: i64) -> ApiResult<()> {
        let url = self.url(TASK_SERVICE, &format!("/tasks/{}", id));
        self.send(self.request(Method::DELETE, &url), &url).await?;
        Ok(())
    }

    pub async fn restore_task(&self, id: i64) -> ApiResult<Task> {
        let url = self.url(TASK_SERVICE, &format!("/tasks/{}/restore", id));
        self.send_json(self.request(Method::POST, &url), &url).await
    }

    pub async fn list_tags(&self) -> ApiResult<Vec<String>> {
        let url = self.url(TASK_SERVICE, "/tags");
        let tags: TagList = self.send_json(self.request(Method::GET, &url), &url).await?;
        Ok(tags.items)
    }

    // ----- data-tracking service -----

    pub async fn list_roadmaps(&self) -> ApiResult<Vec<Roadmap>> {
        let url = self.url(TRACKING_SERVICE, "/roadmaps");
        self.send_json(self.request(Method::GET, &url), &url).await
    }

    // ----- pet service -----

    pub async fn pet_me(&self) -> ApiResult<Pet> {
        let url = self.url(PET_SERVICE, "/pets/me");
        self.send_json(self.request(Method::GET, &url), &url).await
    }

    pub async fn pet_status(&self) -> ApiResult<PetStatus> {
        let url = self.url(PET_SERVICE, "/pets/me/status");
        self.send_json(self.request(Method::GET, &url), &url).await
    }

    pub async fn pet_points(&self) -> ApiResult<PetPoints> {
        let url = self.url(PET_SERVICE, "/pets/me/points");
        self.send_json(self.request(Method::GET, &url), &url).await
    }

    pub async fn pet_action(&self, action: PetAction) -> ApiResult<PetActionResult> {
        let url = self.url(PET_SERVICE, &format!("/pets/me/actions/{}", action.as_str()));
        self.send_json(self.request(Method::POST, &url), &url).await
    }

    // ----- user service -----

    pub async fn get_profile(&self) -> ApiResult<Profile> {
        let url = self.url(USER_SERVICE, "/users/me");
        self.send_json(self.request(Method::GET, &url), &url).await
    }

    pub async fn update_profile(&self, patch: &ProfilePatch) -> ApiResult<Profile> {
        let url = self.url(USER_SERVICE, "/users/me");
        self.send_json(self.request(Method::PATCH, &url).json(patch), &url).await
    }

    // ----- gateway events -----

    pub fn events_url(&self) -> String {
        format!("{}{}", self.base_url, EVENTS_PATH)
    }

    /// An event source that gives up on the first error instead of retrying.
    pub fn open_event_stream(&self) -> ApiResult<EventSource> {
        let url = self.events_url();
        let builder = self
            .authorize(self.stream_http.get(&url))
            .header("Accept", "text/event-stream");
        let mut source = EventSource::new(builder).map_err(|e| ApiError::EventStream {
            url: url.clone(),
            message: e.to_string(),
        })?;
        source.set_retry_policy(Box::new(retry::Never));
        Ok(source)
    }
}

pub fn task_query_pairs(query: &TaskQuery) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(status) = query.status {
        pairs.push(("status", status.as_str().to_string()));
    }
    if let Some(priority) = query.priority {
        pairs.push(("priority", priority.as_str().to_string()));
    }
    if let Some(tag) = query.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        pairs.push(("tag", tag.to_string()));
    }
    if let Some(text) = query.query.as_deref().filter(|q| !q.trim().is_empty()) {
        pairs.push(("query", text.to_string()));
    }
    if let Some(sort) = &query.sort {
        pairs.push(("sort", sort.clone()));
    }
    if let Some(page) = query.page {
        pairs.push(("page", page.max(1).to_string()));
    }
    if let Some(limit) = query.limit {
        pairs.push(("limit", limit.clamp(1, MAX_PAGE_LIMIT).to_string()));
    }
    if query.only_deleted {
        pairs.push(("only_deleted", "true".to_string()));
    } else if query.include_deleted {
        pairs.push(("include_deleted", "true".to_string()));
    }
    pairs
}

pub(crate) fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
            ..
        }) => message,
        Ok(ErrorBody {
            error: Some(error), ..
        }) => error,
        _ if !body.trim().is_empty() => body.trim().chars().take(200).collect(),
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;

    #[test]
    fn query_pairs_clamp_and_prefer_only_deleted() {
        let query = TaskQuery {
            status: Some(TaskStatus::InProgress),
            tag: Some("  feeding ".to_string()),
            query: Some("   ".to_string()),
            limit: Some(500),
            page: Some(0),
            include_deleted: true,
            only_deleted: true,
            ..Default::default()
        };
        let pairs = task_query_pairs(&query);
        assert_eq!(
            pairs,
            vec![
                ("status", "in_progress".to_string()),
                ("tag", "feeding".to_string()),
                ("page", "1".to_string()),
                ("limit", "100".to_string()),
                ("only_deleted", "true".to_string()),
            ]
        );
    }

    #[test]
    fn error_message_prefers_service_message() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        assert_eq!(
            error_message(r#"{"error": "Bad Request", "message": "title is required"}"#, status),
            "title is required"
        );
        assert_eq!(error_message(r#"{"error": "insufficient_points"}"#, status), "insufficient_points");
        assert_eq!(error_message("", status), "Bad Request");
    }

    #[test]
    fn builds_service_urls_from_trimmed_base() {
        let settings = ApiSettings {
            base_url: "http://gateway:5000/".to_string(),
            timeout_secs: 5,
        };
        let client = GatewayClient::new(&settings, Session::anonymous()).unwrap();
        assert_eq!(client.url(TASK_SERVICE, "/tasks"), "http://gateway:5000/v1/task-service/tasks");
        assert_eq!(client.events_url(), "http://gateway:5000/v1/events");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let settings = ApiSettings {
            base_url: "not a url".to_string(),
            timeout_secs: 5,
        };
        assert!(matches!(
            GatewayClient::new(&settings, Session::anonymous()),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    fn client_for(server: &mockito::Server) -> GatewayClient {
        let settings = ApiSettings {
            base_url: server.url(),
            timeout_secs: 5,
        };
        GatewayClient::new(&settings, Session::new("secret", "u-1")).unwrap()
    }

    fn page_body(ids: &[i64], limit: u32, total: u64) -> String {
        let items: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| serde_json::json!({"id": id, "title": format!("task {}", id), "status": "todo"}))
            .collect();
        serde_json::json!({"items": items, "limit": limit, "total": total}).to_string()
    }

    #[tokio::test]
    async fn snapshot_pages_until_total_and_sends_credentials() {
        use mockito::Matcher;

        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/v1/task-service/tasks")
            .match_header("authorization", "Bearer secret")
            .match_header("x-user-id", "u-1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("include_deleted".into(), "true".into()),
            ]))
            .with_body(page_body(&[1, 2], 2, 3))
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/v1/task-service/tasks")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_body(page_body(&[3], 2, 3))
            .expect(1)
            .create_async()
            .await;
        let third = server
            .mock("GET", "/v1/task-service/tasks")
            .match_query(Matcher::UrlEncoded("page".into(), "3".into()))
            .with_body(page_body(&[], 2, 3))
            .expect(0)
            .create_async()
            .await;

        let tasks = client_for(&server).fetch_snapshot().await.unwrap();
        assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;
    }

    #[tokio::test]
    async fn snapshot_stops_on_a_short_page_without_total() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/task-service/tasks")
            .match_query(mockito::Matcher::Any)
            .with_body(r#"{"items": [{"id": 7, "title": "only"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let tasks = client_for(&server).fetch_snapshot().await.unwrap();
        assert_eq!(tasks.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn anonymous_requests_carry_no_credentials() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/task-service/tags")
            .match_header("authorization", mockito::Matcher::Missing)
            .match_header("x-user-id", mockito::Matcher::Missing)
            .with_body(r#"{"items": ["feeding", "playing"]}"#)
            .create_async()
            .await;

        let settings = ApiSettings {
            base_url: server.url(),
            timeout_secs: 5,
        };
        let client = GatewayClient::new(&settings, Session::anonymous()).unwrap();
        assert_eq!(client.list_tags().await.unwrap(), vec!["feeding", "playing"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn edit_sends_only_changed_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/v1/task-service/tasks/5")
            .match_body(mockito::Matcher::Json(serde_json::json!({"title": "Brush", "status": "in_progress"})))
            .with_body(r#"{"id": 5, "title": "Brush", "status": "in-progress"}"#)
            .create_async()
            .await;

        let patch = TaskPatch {
            title: Some("Brush".into()),
            status: Some(crate::models::TaskStatus::InProgress),
            ..Default::default()
        };
        let task = client_for(&server).update_task(5, &patch).await.unwrap();
        assert_eq!(task.status, crate::models::TaskStatus::InProgress);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_task_maps_to_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/task-service/tasks/404")
            .with_status(404)
            .with_body(r#"{"error": "not_found", "message": "Task not found"}"#)
            .create_async()
            .await;

        let err = client_for(&server).get_task(404).await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
        assert!(err.to_string().ends_with("Task not found"));
    }

    #[tokio::test]
    async fn profile_round_trip() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{"id": 1, "name": "Ana", "email": "ana@example.com", "phone": null,
            "address": null, "created_at": "2026-01-02T03:04:05", "updated_at": null}"#;
        server
            .mock("GET", "/v1/user-service/users/me")
            .with_body(body)
            .create_async()
            .await;
        let update = server
            .mock("PATCH", "/v1/user-service/users/me")
            .match_body(mockito::Matcher::Json(serde_json::json!({"phone": "555"})))
            .with_body(body.replace("\"phone\": null", "\"phone\": \"555\""))
            .create_async()
            .await;

        let client = client_for(&server);
        let profile = client.get_profile().await.unwrap();
        assert_eq!(profile.name.as_deref(), Some("Ana"));
        assert!(profile.created_at.is_some());

        let patch = ProfilePatch {
            phone: Some("555".into()),
            ..Default::default()
        };
        let updated = client.update_profile(&patch).await.unwrap();
        assert_eq!(updated.phone.as_deref(), Some("555"));
        update.assert_async().await;
    }
}
