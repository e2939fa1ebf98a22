use crate::bio;
use crate::config::AppConfig;
use crate::filter::{self, FacetSelection};
use crate::links::{self, HostContext};
use crate::model::{Member, Roster};
use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::info;

type SharedState = Arc<AppState>;

/// Bio cards taller than this get a "show more" affordance.
const BIO_MAX_LINES: usize = 6;

/// Either the loaded directory snapshot or the retryable failure state.
pub enum ContentState {
    Ready(Roster),
    Failed(String),
}

pub struct AppState {
    pub content: ContentState,
    pub config: AppConfig,
    pub base_url: String,
}

#[derive(Clone)]
pub struct WebConfig {
    pub addr: SocketAddr,
    pub data_dir: PathBuf,
    pub base_url: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            data_dir: PathBuf::from("data"),
            base_url: "http://127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum WebError {
    Io(std::io::Error),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for WebError {}

impl From<std::io::Error> for WebError {
    fn from(value: std::io::Error) -> Self {
        WebError::Io(value)
    }
}

pub async fn serve(config: WebConfig) -> Result<(), WebError> {
    let app_config = AppConfig::load(&config.data_dir);
    let content = match Roster::load(&config.data_dir) {
        Ok(roster) => {
            info!(
                members = roster.members.len(),
                departments = roster.taxonomy.departments.len(),
                "Directory data loaded"
            );
            ContentState::Ready(roster)
        }
        Err(err) => {
            tracing::error!(%err, "Directory data failed to load; serving error state");
            ContentState::Failed(err.to_string())
        }
    };
    let state = Arc::new(AppState {
        content,
        config: app_config,
        base_url: config.base_url.clone(),
    });
    let router = build_router(state);
    info!(%config.addr, base = %config.base_url, "Binding HTTP listener");
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(directory_html))
        .route("/go", get(outbound))
        .route("/api/members", get(api_members))
        .route("/healthz", get(health))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "studio-roster" }))
}

#[derive(Debug, Deserialize)]
struct DirectoryParams {
    dept: Option<String>,
    role: Option<String>,
    tool: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoParams {
    url: Option<String>,
}

async fn directory_html(
    State(state): State<SharedState>,
    Query(params): Query<DirectoryParams>,
) -> impl IntoResponse {
    let roster = match &state.content {
        ContentState::Ready(roster) => roster,
        ContentState::Failed(_) => {
            return Html(render_error_page(
                &state.config,
                &state.config.ui.errors.load_failed,
            ));
        }
    };
    let selection = FacetSelection::from_query(
        params.dept.as_deref(),
        params.role.as_deref(),
        params.tool.as_deref(),
    );
    let payload = build_directory_payload(&selection, roster, &state.config);
    let template = DirectoryTemplate {
        payload: &payload,
        config: &state.config,
        base_url: &state.base_url,
    };
    Html(
        template
            .render()
            .unwrap_or_else(|err| render_error_page(&state.config, err.to_string())),
    )
}

async fn outbound(
    State(state): State<SharedState>,
    Query(params): Query<GoParams>,
    headers: HeaderMap,
) -> Response {
    let Some(url) = params
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    else {
        return Html(render_error_page(&state.config, "Missing `url` parameter")).into_response();
    };
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return (
            StatusCode::BAD_REQUEST,
            Html(render_error_page(
                &state.config,
                "Only http(s) links can be dispatched",
            )),
        )
            .into_response();
    }
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let context = HostContext::from_user_agent(user_agent);
    if context.is_restricted() && !links::is_trusted(url, &state.config.whitelist) {
        let template = ConfirmTemplate {
            config: &state.config,
            url,
        };
        return Html(
            template
                .render()
                .unwrap_or_else(|err| render_error_page(&state.config, err.to_string())),
        )
        .into_response();
    }
    Redirect::temporary(url).into_response()
}

async fn api_members(
    State(state): State<SharedState>,
    Query(params): Query<DirectoryParams>,
) -> Result<Json<MembersResponse>, ApiError> {
    let roster = match &state.content {
        ContentState::Ready(roster) => roster,
        ContentState::Failed(reason) => return Err(ApiError::unavailable(reason.clone())),
    };
    if params.dept.as_deref().is_some_and(|d| d.len() > 128) {
        return Err(ApiError::bad_request("Facet identifier too long"));
    }
    let selection = FacetSelection::from_query(
        params.dept.as_deref(),
        params.role.as_deref(),
        params.tool.as_deref(),
    );
    let members = filter::visible_members(&selection, &roster.members, &roster.taxonomy)
        .into_iter()
        .map(|member| MemberPayload::from_member(member, roster))
        .collect::<Vec<_>>();
    Ok(Json(MembersResponse {
        department: facet_value(params.dept),
        role: facet_value(params.role),
        tool: facet_value(params.tool),
        count: members.len(),
        members,
    }))
}

fn facet_value(raw: Option<String>) -> String {
    match raw {
        Some(v) if !v.is_empty() => v,
        _ => "all".to_string(),
    }
}

#[derive(Debug, Serialize)]
struct RoleChipPayload {
    id: String,
    name: String,
    color: String,
}

#[derive(Debug, Serialize)]
struct MemberPayload {
    id: String,
    name: String,
    avatar: Option<String>,
    is_lead: bool,
    roles: Vec<RoleChipPayload>,
    tools: Vec<String>,
    bio_html: String,
    bio_overflows: bool,
    links: Vec<LinkPayload>,
}

#[derive(Debug, Serialize)]
struct LinkPayload {
    label: String,
    url: String,
    href: String,
}

#[derive(Debug, Serialize)]
struct MembersResponse {
    department: String,
    role: String,
    tool: String,
    count: usize,
    members: Vec<MemberPayload>,
}

impl MemberPayload {
    fn from_member(member: &Member, roster: &Roster) -> Self {
        let taxonomy = &roster.taxonomy;
        let roles = member
            .role_ids()
            .iter()
            .map(|rid| RoleChipPayload {
                id: rid.to_string(),
                name: taxonomy.role_name(rid).to_string(),
                color: taxonomy.role_color(rid).to_string(),
            })
            .collect();
        let mut tools: Vec<String> = Vec::new();
        if let Some(tool) = member.tool.as_deref() {
            tools.push(taxonomy.tool_name(tool));
        }
        for tool in &member.tools {
            tools.push(taxonomy.tool_name(tool));
        }
        let links = member
            .links
            .iter()
            .map(|link| LinkPayload {
                label: link.label.clone(),
                url: link.url.clone(),
                href: outbound_path(&link.url),
            })
            .collect();
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            avatar: member.avatar.clone(),
            is_lead: member.is_lead,
            roles,
            tools,
            bio_html: bio::render(&member.bio),
            bio_overflows: bio::estimate_overflow(&member.bio, BIO_MAX_LINES),
            links,
        }
    }
}

#[derive(Debug)]
struct FacetOptionPayload {
    label: String,
    link: String,
    active: bool,
    color: Option<String>,
}

#[derive(Debug)]
struct DirectoryPayload {
    departments: Vec<FacetOptionPayload>,
    roles: Vec<FacetOptionPayload>,
    tools: Vec<FacetOptionPayload>,
    members: Vec<MemberPayload>,
}

fn build_directory_payload(
    selection: &FacetSelection,
    roster: &Roster,
    config: &AppConfig,
) -> DirectoryPayload {
    let taxonomy = &roster.taxonomy;
    let dept_id = selection.department().id();
    let role_id = selection.role().id();
    let tool_id = selection.tool().id();

    let mut departments = vec![FacetOptionPayload {
        label: config.site.navigation.all.clone(),
        link: "/".to_string(),
        active: dept_id.is_none(),
        color: None,
    }];
    departments.extend(roster.taxonomy.departments.iter().map(|dept| {
        FacetOptionPayload {
            label: dept.name.clone(),
            link: format!("/?dept={}", encode_component(&dept.id)),
            active: dept_id == Some(dept.id.as_str()),
            color: None,
        }
    }));

    let mut roles = Vec::new();
    if let Some(dept) = dept_id {
        roles.push(FacetOptionPayload {
            label: config.site.navigation.all.clone(),
            link: format!("/?dept={}", encode_component(dept)),
            active: role_id.is_none(),
            color: None,
        });
        roles.extend(
            filter::roles_for(selection, taxonomy)
                .iter()
                .map(|role| FacetOptionPayload {
                    label: role.name.clone(),
                    link: format!(
                        "/?dept={}&role={}",
                        encode_component(dept),
                        encode_component(&role.id)
                    ),
                    active: role_id == Some(role.id.as_str()),
                    color: role.color.clone(),
                }),
        );
    }

    let mut tools = Vec::new();
    if let (Some(dept), Some(role)) = (dept_id, role_id) {
        let options = filter::tools_for(selection, taxonomy);
        if !options.is_empty() {
            tools.push(FacetOptionPayload {
                label: config.site.navigation.all_tools.clone(),
                link: format!(
                    "/?dept={}&role={}",
                    encode_component(dept),
                    encode_component(role)
                ),
                active: tool_id.is_none(),
                color: None,
            });
            tools.extend(options.iter().map(|tool| FacetOptionPayload {
                label: tool.name.clone(),
                link: format!(
                    "/?dept={}&role={}&tool={}",
                    encode_component(dept),
                    encode_component(role),
                    encode_component(&tool.id)
                ),
                active: tool_id == Some(tool.id.as_str()),
                color: tool.color.clone(),
            }));
        }
    }

    let members = filter::visible_members(selection, &roster.members, taxonomy)
        .into_iter()
        .map(|member| MemberPayload::from_member(member, roster))
        .collect();

    DirectoryPayload {
        departments,
        roles,
        tools,
        members,
    }
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

fn outbound_path(url: &str) -> String {
    format!("/go?url={}", encode_component(url))
}

fn render_error_page(config: &AppConfig, message: impl Into<String>) -> String {
    let template = ErrorTemplate {
        config,
        message: message.into(),
    };
    template.render().unwrap_or_else(|err| err.to_string())
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{{ config.site.site.title }}</title>
    <link rel="canonical" href="{{ base_url }}/">
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
  </head>
  <body class="bg-slate-950 text-slate-100">
    <main class="min-h-screen max-w-5xl mx-auto py-10 px-4 space-y-8">
      <header>
        <h1 class="text-4xl font-extrabold tracking-tight">{{ config.site.site.name }}</h1>
        <p class="text-lg text-slate-400">{{ config.site.site.tagline }}</p>
      </header>

      <nav class="flex flex-wrap gap-2" aria-label="Departments">
        {% for option in payload.departments %}
        <a href="{{ option.link }}" class="px-3 py-1 rounded-full text-sm {% if option.active %}bg-slate-100 text-slate-900{% else %}bg-slate-800 text-slate-200 hover:bg-slate-700{% endif %}">{{ option.label }}</a>
        {% endfor %}
      </nav>

      {% if payload.roles.len() > 0 %}
      <nav class="flex flex-wrap gap-2" aria-label="Roles">
        {% for option in payload.roles %}
        <a href="{{ option.link }}" class="px-3 py-1 rounded-full text-sm border {% if option.active %}border-slate-100{% else %}border-slate-700 hover:border-slate-500{% endif %}"{% if option.color.is_some() %} style="color: {{ option.color.as_ref().unwrap() }}"{% endif %}>{{ option.label }}</a>
        {% endfor %}
      </nav>
      {% endif %}

      {% if payload.tools.len() > 0 %}
      <nav class="flex flex-wrap gap-2" aria-label="Tools">
        {% for option in payload.tools %}
        <a href="{{ option.link }}" class="px-2 py-1 rounded text-xs border {% if option.active %}border-slate-100{% else %}border-slate-700 hover:border-slate-500{% endif %}"{% if option.color.is_some() %} style="color: {{ option.color.as_ref().unwrap() }}"{% endif %}>{{ option.label }}</a>
        {% endfor %}
      </nav>
      {% endif %}

      {% if payload.members.len() == 0 %}
      <section class="text-center py-16">
        <p class="text-xl font-semibold">{{ config.ui.errors.empty_title }}</p>
        <p class="text-slate-400">{{ config.ui.errors.empty_subtitle }}</p>
      </section>
      {% else %}
      <section class="grid gap-4 md:grid-cols-2">
        {% for member in payload.members %}
        <article class="bg-slate-900 rounded-xl p-4 space-y-3{% if member.is_lead %} border{% endif %}"{% if member.is_lead %} style="border-color: {{ config.site.lead.border_color }}"{% endif %}>
          <div class="flex items-center gap-3">
            {% if member.avatar.is_some() %}
            <img src="{{ member.avatar.as_ref().unwrap() }}" alt="{{ member.name }}" loading="lazy" class="w-12 h-12 rounded-full object-cover" />
            {% endif %}
            <div>
              <p class="font-semibold text-lg">{{ member.name }}
                {% if member.is_lead %}
                <span class="text-xs align-middle">{{ config.site.lead.icon }} {{ config.site.lead.text }}</span>
                {% endif %}
              </p>
              <p class="text-sm space-x-1">
                {% for role in member.roles %}
                <span style="color: {{ role.color }}">{{ role.name }}</span>
                {% endfor %}
              </p>
            </div>
          </div>
          {% if member.tools.len() > 0 %}
          <p class="flex flex-wrap gap-1">
            {% for tool in member.tools %}
            <span class="px-2 py-0.5 rounded bg-slate-800 text-xs">{{ tool }}</span>
            {% endfor %}
          </p>
          {% endif %}
          {% if member.bio_html.len() > 0 %}
          <div class="text-sm text-slate-300 bio{% if member.bio_overflows %} bio-clamped{% endif %}">{{ member.bio_html|safe }}</div>
          {% if member.bio_overflows %}
          <button type="button" class="text-xs text-slate-400 hover:text-slate-200" data-expand-bio>{{ config.site.navigation.expand_bio }}</button>
          {% endif %}
          {% endif %}
          {% if member.links.len() > 0 %}
          <p class="flex flex-wrap gap-2">
            {% for link in member.links %}
            <a href="{{ link.href }}" class="text-sm text-sky-400 hover:underline">{{ link.label }}</a>
            {% endfor %}
          </p>
          {% endif %}
        </article>
        {% endfor %}
      </section>
      {% endif %}

      <footer class="text-center text-sm text-slate-500 py-6 space-y-3">
        {% if config.site.contact.len() > 0 %}
        <p class="flex flex-wrap gap-3 justify-center">
          {% for entry in config.site.contact %}
          <button type="button" data-copy-contact="{{ entry.value }}" class="px-3 py-1 rounded bg-slate-900 hover:bg-slate-800">{{ entry.label }}: {{ entry.value }}</button>
          {% endfor %}
        </p>
        {% endif %}
        <p>{{ config.site.site.copyright }}</p>
      </footer>
    </main>
  </body>
</html>"#,
    ext = "html"
)]
struct DirectoryTemplate<'a> {
    payload: &'a DirectoryPayload,
    config: &'a AppConfig,
    base_url: &'a str,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{{ config.ui.confirm.title }}</title>
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
  </head>
  <body class="bg-slate-950 text-slate-100">
    <main class="min-h-screen flex items-center justify-center px-4">
      <div class="bg-slate-900 rounded-xl p-6 max-w-md w-full space-y-4">
        <h1 class="text-xl font-semibold">{{ config.ui.confirm.title }}</h1>
        <p class="text-slate-300">{{ config.ui.confirm.message }}</p>
        <p class="text-sm text-slate-400 break-all">{{ url }}</p>
        <input type="text" readonly value="{{ url }}" data-copy-source class="w-full bg-slate-800 rounded px-2 py-1 text-sm" />
        <div class="flex gap-3 justify-end">
          <a href="/" class="px-4 py-2 rounded bg-slate-800 hover:bg-slate-700">{{ config.ui.confirm.cancel }}</a>
          <button type="button" data-copy-link class="px-4 py-2 rounded bg-slate-800 hover:bg-slate-700">{{ config.ui.confirm.copy_link }}</button>
          <a href="{{ url }}" rel="noopener noreferrer" class="px-4 py-2 rounded bg-sky-600 hover:bg-sky-500">{{ config.ui.confirm.proceed }}</a>
        </div>
      </div>
    </main>
  </body>
</html>"#,
    ext = "html"
)]
struct ConfirmTemplate<'a> {
    config: &'a AppConfig,
    url: &'a str,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{{ config.ui.errors.title }}</title>
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
  </head>
  <body class="bg-slate-950 text-slate-100">
    <main class="min-h-screen flex items-center justify-center px-4">
      <div class="text-center space-y-4">
        <h1 class="text-2xl font-semibold">{{ config.ui.errors.title }}</h1>
        <p class="text-slate-400">{{ message }}</p>
        <a href="/" class="inline-block px-4 py-2 rounded bg-sky-600 hover:bg-sky-500">{{ config.ui.errors.retry }}</a>
      </div>
    </main>
  </body>
</html>"#,
    ext = "html"
)]
struct ErrorTemplate<'a> {
    config: &'a AppConfig,
    message: String,
}
