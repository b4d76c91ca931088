//! HTTP chat server with a minimal browser page.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::agent::{ChatMessage, ChatService, SessionStore};
use crate::config::Credentials;
use crate::error::{ErrorCategory, ParleyError};

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ChatService>,
    pub sessions: Arc<SessionStore>,
    pub greeting: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
}

/// Error body: `{"error": ..., "credential"?: ...}`.
pub struct ApiError(StatusCode, serde_json::Value);

impl From<ParleyError> for ApiError {
    fn from(err: ParleyError) -> Self {
        match err {
            ParleyError::MissingCredential { name, hint } => ApiError(
                StatusCode::PRECONDITION_REQUIRED,
                json!({"error": hint, "credential": name}),
            ),
            ParleyError::InvalidArgument(message) => {
                ApiError(StatusCode::BAD_REQUEST, json!({"error": message}))
            }
            other => {
                let status = match other.category() {
                    ErrorCategory::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
                    _ => StatusCode::BAD_GATEWAY,
                };
                ApiError(status, json!({"error": other.to_string()}))
            }
        }
    }
}

impl ApiError {
    /// Name the session the failed turn was recorded in.
    fn with_session(mut self, session_id: &str) -> Self {
        if let Some(body) = self.1.as_object_mut() {
            body.insert("session_id".into(), json!(session_id));
        }
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/chat", post(chat))
        .route("/api/sessions/:id/messages", get(messages))
        .with_state(state)
}

/// Bind `addr` and serve until the process ends.
pub async fn serve(state: AppState, addr: &str) -> Result<(), ParleyError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(INDEX_HTML.replace("{{GREETING}}", state.greeting))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ParleyError::InvalidArgument("message must not be empty".into()).into());
    }

    // No session for a request that cannot run.
    state
        .service
        .check_request_credentials(request.credentials.as_ref())?;

    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let handle = state.sessions.get_or_create(&session_id);
    let mut session = handle.lock().await;

    let reply = state
        .service
        .respond(&mut session, message, request.credentials.as_ref())
        .await
        .map_err(|e| {
            warn!(session = session_id.as_str(), error = %e, "Chat turn failed");
            ApiError::from(e).with_session(&session_id)
        })?;

    Ok(Json(ChatResponse { session_id, reply }))
}

async fn messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let handle = state.sessions.get(&id).ok_or_else(|| {
        ApiError(
            StatusCode::NOT_FOUND,
            json!({"error": format!("Session '{id}' not found")}),
        )
    })?;
    let messages = handle.lock().await.messages().to_vec();
    Ok(Json(MessagesResponse {
        session_id: id,
        messages,
    }))
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>parley</title>
<style>
  body { font-family: sans-serif; margin: 0; display: flex; height: 100vh; }
  aside { width: 16rem; padding: 1rem; background: #f4f4f5; }
  aside input { width: 100%; margin-bottom: .75rem; }
  main { flex: 1; display: flex; flex-direction: column; padding: 1rem; }
  #log { flex: 1; overflow-y: auto; }
  .msg { margin: .5rem 0; white-space: pre-wrap; }
  .user { font-weight: bold; }
  .notice { color: #a16207; }
  form { display: flex; gap: .5rem; }
  form input { flex: 1; }
</style>
</head>
<body>
<aside>
  <h3>Settings</h3>
  <label>OpenAI API Key<input id="openai" type="password"></label>
  <label>Google API Key<input id="google" type="password"></label>
  <label>GitHub Access Token<input id="github" type="password"></label>
</aside>
<main>
  <div id="log"><div class="msg">{{GREETING}}</div></div>
  <form id="chat"><input id="input" autocomplete="off" placeholder="Type your question..."><button>Send</button></form>
</main>
<script>
const log = document.getElementById('log');
let sessionId = sessionStorage.getItem('parley-session');
function add(text, cls) {
  const div = document.createElement('div');
  div.className = 'msg ' + (cls || '');
  div.textContent = text;
  log.appendChild(div);
  log.scrollTop = log.scrollHeight;
}
function credentials() {
  const c = {};
  const v = id => document.getElementById(id).value.trim();
  if (v('openai')) c.openai_api_key = v('openai');
  if (v('google')) c.google_api_key = v('google');
  if (v('github')) c.github_token = v('github');
  return c;
}
async function restore() {
  if (!sessionId) return;
  const res = await fetch('/api/sessions/' + encodeURIComponent(sessionId) + '/messages');
  if (!res.ok) return;
  const body = await res.json();
  body.messages.forEach(m => add(m.text, m.role));
}
document.getElementById('chat').addEventListener('submit', async (e) => {
  e.preventDefault();
  const input = document.getElementById('input');
  const message = input.value.trim();
  if (!message) return;
  input.value = '';
  add(message, 'user');
  const pending = document.createElement('div');
  pending.className = 'msg notice';
  pending.textContent = 'Working...';
  log.appendChild(pending);
  input.disabled = true;
  try {
    const res = await fetch('/api/chat', {
      method: 'POST',
      headers: {'content-type': 'application/json'},
      body: JSON.stringify({session_id: sessionId, message, credentials: credentials()}),
    });
    const body = await res.json();
    pending.remove();
    if (res.ok) {
      sessionId = body.session_id;
      sessionStorage.setItem('parley-session', sessionId);
      add(body.reply, 'assistant');
    } else {
      add(body.error, 'notice');
    }
  } finally {
    input.disabled = false;
    input.focus();
  }
});
restore();
</script>
</body>
</html>
"#;
