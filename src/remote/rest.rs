use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use roadmap_backend::{
    Category, CatalogRepository, CompletionRecord, CompletionRepository, Difficulty, DomainError,
    DomainResult, NewCategory, NewProblem, OrderScope, Problem,
};

const CATEGORIES: &str = "categories";
const PROBLEMS: &str = "problems";
const COMPLETIONS: &str = "user_progress";

/// PostgREST client for the `categories`, `problems` and `user_progress` tables
#[derive(Clone)]
pub struct RestRepository {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

/// Category row as the hosted store returns it; `icon` may be null
#[derive(Debug, Deserialize)]
struct CategoryRow {
    id: String,
    name: String,
    icon: Option<String>,
    order_index: i32,
    created_by: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            icon: row.icon.unwrap_or_default(),
            order_index: row.order_index,
            created_by: row.created_by,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProblemRow {
    id: String,
    category_id: String,
    title: String,
    difficulty: Difficulty,
    leetcode_number: Option<u32>,
    order_index: i32,
    created_by: Option<String>,
    is_default: Option<bool>,
}

impl From<ProblemRow> for Problem {
    fn from(row: ProblemRow) -> Self {
        Problem {
            id: row.id,
            category_id: row.category_id,
            title: row.title,
            difficulty: row.difficulty,
            leetcode_number: row.leetcode_number,
            order_index: row.order_index,
            created_by: row.created_by,
            is_default: row.is_default.unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrderRow {
    order_index: i32,
}

#[derive(Debug, Deserialize)]
struct CompletionRow {
    problem_id: String,
}

#[derive(Debug, Serialize)]
struct CategoryInsert<'a> {
    name: &'a str,
    icon: &'a str,
    order_index: i32,
    created_by: &'a str,
}

#[derive(Debug, Serialize)]
struct ProblemInsert<'a> {
    category_id: &'a str,
    title: &'a str,
    difficulty: Difficulty,
    leetcode_number: Option<u32>,
    order_index: i32,
    created_by: &'a str,
    is_default: bool,
}

fn status_error(status: StatusCode, body: String, ctx: &str) -> DomainError {
    let message = format!("{} ({}): {}", ctx, status, body);
    match status.as_u16() {
        404 => DomainError::NotFound(message),
        409 => DomainError::Conflict(message),
        400 | 422 => DomainError::InvalidInput(message),
        _ => DomainError::Internal(message),
    }
}

fn network_error(e: reqwest::Error) -> DomainError {
    DomainError::Internal(format!("network error: {}", e))
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

impl RestRepository {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            access_token: None,
        }
    }

    /// Act as a signed-in user; without a token requests use the anon key
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    async fn send(req: RequestBuilder, ctx: &str) -> DomainResult<reqwest::Response> {
        let res = req.send().await.map_err(network_error)?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await.unwrap_or_default();
        log::warn!("{} failed with {}", ctx, status);
        Err(status_error(status, body, ctx))
    }

    async fn fetch<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)], ctx: &str) -> DomainResult<Vec<T>> {
        let req = self.request(Method::GET, table).query(&[("select", "*")]).query(query);
        let res = Self::send(req, ctx).await?;
        res.json()
            .await
            .map_err(|e| DomainError::Internal(format!("{}: bad response: {}", ctx, e)))
    }

    async fn insert<B: Serialize, T: DeserializeOwned>(&self, table: &str, body: &B, ctx: &str) -> DomainResult<T> {
        let req = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(body);
        let res = Self::send(req, ctx).await?;
        let mut rows: Vec<T> = res
            .json()
            .await
            .map_err(|e| DomainError::Internal(format!("{}: bad response: {}", ctx, e)))?;
        if rows.is_empty() {
            return Err(DomainError::Internal(format!("{}: no row returned", ctx)));
        }
        Ok(rows.swap_remove(0))
    }

    async fn delete(&self, table: &str, query: &[(&str, String)], ctx: &str) -> DomainResult<()> {
        let req = self.request(Method::DELETE, table).query(query);
        Self::send(req, ctx).await.map(|_| ())
    }
}

#[async_trait]
impl CatalogRepository for RestRepository {
    async fn list_categories(&self) -> DomainResult<Vec<Category>> {
        let rows: Vec<CategoryRow> = self
            .fetch(CATEGORIES, &[("order", "order_index.asc".into())], "list categories")
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn list_problems(&self, category_id: Option<&str>) -> DomainResult<Vec<Problem>> {
        let mut query = vec![("order", "order_index.asc".to_string())];
        if let Some(cid) = category_id {
            query.push(("category_id", eq(cid)));
        }
        let rows: Vec<ProblemRow> = self.fetch(PROBLEMS, &query, "list problems").await?;
        Ok(rows.into_iter().map(Problem::from).collect())
    }

    async fn max_order_index(&self, scope: OrderScope<'_>) -> DomainResult<Option<i32>> {
        let mut query = vec![
            ("order", "order_index.desc".to_string()),
            ("limit", "1".to_string()),
        ];
        let table = match scope {
            OrderScope::Categories => CATEGORIES,
            OrderScope::Problems(cid) => {
                query.push(("category_id", eq(cid)));
                PROBLEMS
            }
        };
        let rows: Vec<OrderRow> = self.fetch(table, &query, "max order_index").await?;
        Ok(rows.first().map(|r| r.order_index))
    }

    async fn insert_category(&self, category: &NewCategory) -> DomainResult<Category> {
        let body = CategoryInsert {
            name: category.name.trim(),
            icon: category.icon.trim(),
            order_index: category.order_index,
            created_by: &category.created_by,
        };
        let row: CategoryRow = self.insert(CATEGORIES, &body, "create category").await?;
        Ok(row.into())
    }

    async fn insert_problem(&self, problem: &NewProblem) -> DomainResult<Problem> {
        let body = ProblemInsert {
            category_id: &problem.category_id,
            title: problem.title.trim(),
            difficulty: problem.difficulty,
            leetcode_number: problem.leetcode_number,
            order_index: problem.order_index,
            created_by: &problem.created_by,
            is_default: problem.is_default,
        };
        let row: ProblemRow = self.insert(PROBLEMS, &body, "create problem").await?;
        Ok(row.into())
    }

    async fn delete_category(&self, id: &str) -> DomainResult<()> {
        // Problems first, so the cascade holds even without a foreign key rule
        self.delete(PROBLEMS, &[("category_id", eq(id))], "delete category problems")
            .await?;
        self.delete(CATEGORIES, &[("id", eq(id))], "delete category")
            .await
            .map_err(|e| {
                log::error!("Category {} kept but its problems were deleted: {}", id, e);
                DomainError::Internal(format!(
                    "category {} kept but its problems were deleted; reload to resync ({})",
                    id, e
                ))
            })
    }

    async fn delete_problem(&self, id: &str) -> DomainResult<()> {
        self.delete(PROBLEMS, &[("id", eq(id))], "delete problem").await
    }
}

#[async_trait]
impl CompletionRepository for RestRepository {
    async fn list_completions(&self, user_id: &str) -> DomainResult<Vec<String>> {
        let rows: Vec<CompletionRow> = self
            .fetch(COMPLETIONS, &[("user_id", eq(user_id))], "list completions")
            .await?;
        Ok(rows.into_iter().map(|r| r.problem_id).collect())
    }

    async fn insert_completion(&self, record: &CompletionRecord) -> DomainResult<()> {
        let req = self
            .request(Method::POST, COMPLETIONS)
            .header("Prefer", "resolution=ignore-duplicates")
            .json(record);
        Self::send(req, "mark complete").await.map(|_| ())
    }

    async fn delete_completion(&self, record: &CompletionRecord) -> DomainResult<()> {
        self.delete(
            COMPLETIONS,
            &[("user_id", eq(&record.user_id)), ("problem_id", eq(&record.problem_id))],
            "mark incomplete",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_strips_trailing_slash() {
        let repo = RestRepository::new("https://db.example.com/", "anon");
        assert_eq!(repo.table_url(PROBLEMS), "https://db.example.com/rest/v1/problems");
    }

    #[test]
    fn test_bearer_prefers_access_token() {
        let repo = RestRepository::new("https://db.example.com", "anon").with_access_token("jwt");
        let req = repo.request(Method::GET, CATEGORIES).build().unwrap();

        assert_eq!(req.headers()["apikey"], "anon");
        assert_eq!(req.headers()["Authorization"], "Bearer jwt");

        let anon = RestRepository::new("https://db.example.com", "anon");
        let req = anon.request(Method::GET, CATEGORIES).build().unwrap();
        assert_eq!(req.headers()["Authorization"], "Bearer anon");
    }

    #[test]
    fn test_filters_are_encoded_in_query() {
        let repo = RestRepository::new("https://db.example.com", "anon");
        let req = repo
            .request(Method::DELETE, COMPLETIONS)
            .query(&[("user_id", eq("u1")), ("problem_id", eq("p1"))])
            .build()
            .unwrap();

        assert_eq!(
            req.url().as_str(),
            "https://db.example.com/rest/v1/user_progress?user_id=eq.u1&problem_id=eq.p1"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(status_error(StatusCode::NOT_FOUND, String::new(), "x"), DomainError::NotFound(_)));
        assert!(matches!(status_error(StatusCode::CONFLICT, String::new(), "x"), DomainError::Conflict(_)));
        assert!(matches!(
            status_error(StatusCode::UNPROCESSABLE_ENTITY, String::new(), "x"),
            DomainError::InvalidInput(_)
        ));
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, "down".into(), "list problems"),
            DomainError::Internal(m) if m.contains("list problems") && m.contains("down")
        ));
    }

    #[test]
    fn test_rows_tolerate_nulls() {
        let category: Category = serde_json::from_value::<CategoryRow>(serde_json::json!({
            "id": "c1", "name": "Stack", "icon": null, "order_index": 2, "created_by": null,
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap()
        .into();
        assert_eq!(category.icon, "");
        assert!(category.is_default());

        let problem: Problem = serde_json::from_value::<ProblemRow>(serde_json::json!({
            "id": "p1", "category_id": "c1", "title": "Min Stack", "difficulty": "Medium",
            "leetcode_number": 155, "order_index": 0, "created_by": "u1", "is_default": null
        }))
        .unwrap()
        .into();
        assert_eq!(problem.difficulty, Difficulty::Medium);
        assert_eq!(problem.leetcode_number, Some(155));
        assert!(!problem.is_default);
    }

    /// Answer each incoming request with the next status, recording request lines
    async fn serve(statuses: Vec<u16>) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            for status in statuses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let text = String::from_utf8_lossy(&request);
                seen.push(text.lines().next().unwrap_or_default().to_string());
                let response = format!(
                    "HTTP/1.1 {} X\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                    status
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
            seen
        });
        (url, handle)
    }

    #[tokio::test]
    async fn test_category_delete_reports_orphaned_problem_delete() {
        let (url, server) = serve(vec![204, 500]).await;
        let repo = RestRepository::new(url, "anon");

        let err = repo.delete_category("c1").await.unwrap_err();

        assert!(matches!(&err, DomainError::Internal(m) if m.contains("problems were deleted")));
        let seen = server.await.unwrap();
        assert!(seen[0].starts_with("DELETE /rest/v1/problems?category_id=eq.c1"));
        assert!(seen[1].starts_with("DELETE /rest/v1/categories?id=eq.c1"));
    }

    #[tokio::test]
    async fn test_category_delete_stops_when_problem_delete_fails() {
        let (url, server) = serve(vec![409]).await;
        let repo = RestRepository::new(url, "anon");

        let err = repo.delete_category("c1").await.unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(server.await.unwrap().len(), 1);
    }

    #[test]
    fn test_insert_body_shape() {
        let body = serde_json::to_value(ProblemInsert {
            category_id: "c1",
            title: "New",
            difficulty: Difficulty::Easy,
            leetcode_number: None,
            order_index: 3,
            created_by: "u1",
            is_default: false,
        })
        .unwrap();
        assert_eq!(body["difficulty"], "Easy");
        assert_eq!(body["order_index"], 3);
        assert!(body["leetcode_number"].is_null());
    }
}
