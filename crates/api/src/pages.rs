//! HTML pages rendered through the template evaluator.
//!
//! Every page is a fragment from the layout source, rendered into the layout
//! with the user's role flags, a page flag, the organization profile and any
//! page payloads (`{{bukuKas}}`, `{{stats}}`, ...). The browser fills in the
//! rest from the JSON routes.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use orgkas_core::template::{TemplateContext, TemplateEngine, TemplateError};
use orgkas_db::repositories::{DuesFilter, db_app_error};
use orgkas_db::{
    ArcheryRepository, CashbookRepository, DashboardRepository, DuesRepository, MemberRepository,
    OrganizationRepository,
};
use orgkas_shared::AppError;
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::error::ApiError;
use crate::{AppState, middleware::AuthUser, middleware::page_auth_middleware};

/// Login form used when the views directory has no `login.html`.
pub const DEFAULT_LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html lang="id">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{title}}</title>
  <script>window.organisasi = {{organisasi}};</script>
</head>
<body>
  <form id="login">
    <input name="username" placeholder="Username" required>
    <input name="password" type="password" placeholder="Password" required>
    <button type="submit">Masuk</button>
    <p id="message"></p>
  </form>
  <script>
    document.getElementById("login").addEventListener("submit", async (event) => {
      event.preventDefault();
      const form = new FormData(event.target);
      const response = await fetch("/api/v1/auth/login", {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify(Object.fromEntries(form)),
      });
      const outcome = await response.json();
      if (outcome.success) {
        window.location.href = "/dashboard";
      } else {
        document.getElementById("message").textContent = outcome.message;
      }
    });
  </script>
</body>
</html>
"#;

/// Creates the page routes. Everything but `/` and `/login` needs a login
/// cookie; visitors without one are sent to `/login`.
#[allow(clippy::needless_pass_by_value)]
pub fn routes_with_state(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/dashboard", get(dashboard))
        .route("/buku-kas", get(buku_kas))
        .route("/arus-kas", get(arus_kas))
        .route("/iuran", get(iuran))
        .route("/anggota", get(anggota))
        .route("/tarif", get(tarif))
        .route("/tagihan", get(tagihan))
        .route("/penilaian", get(penilaian))
        .route("/penilaian-saya", get(penilaian_saya))
        .route("/jenis-penilaian", get(jenis_penilaian))
        .route("/panahan", get(panahan))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            page_auth_middleware,
        ));

    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/login", get(login))
        .merge(protected)
}

/// An error shown as a small HTML page.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl<E> From<E> for PageError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        if matches!(self.0, AppError::Database(_) | AppError::Internal(_)) {
            error!(error = %self.0, "Page failed");
        }
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = format!("<h1>{}</h1>", escape_html(&self.0.public_message()));
        (status, Html(body)).into_response()
    }
}

type PageResult = Result<Html<String>, PageError>;

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn template_error(err: TemplateError) -> PageError {
    match err {
        TemplateError::PageNotFound(name) => {
            PageError(AppError::NotFound(format!("Halaman {name} tidak ditemukan")))
        }
        other => PageError(AppError::Internal(other.to_string())),
    }
}

fn guard(check: Result<(), ApiError>) -> Result<(), PageError> {
    check.map_err(|ApiError(e)| PageError(e))
}

/// A page fragment, its title and the flag marking it active in the menu.
struct Page {
    file: &'static str,
    title: &'static str,
    flag: &'static str,
}

impl Page {
    const fn new(file: &'static str, title: &'static str, flag: &'static str) -> Self {
        Self { file, title, flag }
    }
}

async fn organisasi(state: &AppState) -> Result<Value, PageError> {
    let current = OrganizationRepository::new(state.conn())
        .current()
        .await
        .map_err(|e| db_app_error(&e))?;
    match current {
        Some(org) => serde_json::to_value(org).map_err(|e| AppError::Internal(e.to_string()).into()),
        None => Ok(json!({})),
    }
}

async fn render(
    state: &AppState,
    auth: &AuthUser,
    page: Page,
    vars: Vec<(&'static str, Value)>,
) -> PageResult {
    let mut ctx = TemplateContext::new(page.title)
        .with_user(auth.user_info())
        .with_flag(page.flag, true)
        .with_organisasi(organisasi(state).await?);
    for (name, value) in vars {
        ctx = ctx.with_var(name, value);
    }

    let layout = state.layouts.layout().map_err(template_error)?;
    let fragment = state.layouts.page(page.file).map_err(template_error)?;
    let rendered = TemplateEngine::render_page(&layout, &fragment, &ctx);
    for diagnostic in &rendered.diagnostics {
        warn!(page = page.file, %diagnostic, "Template problem");
    }
    Ok(Html(rendered.html))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, PageError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()).into())
}

/// Cashbook rows newest first with the totals the cashbook pages show.
async fn cashbook_vars(state: &AppState) -> Result<Vec<(&'static str, Value)>, PageError> {
    let repo = CashbookRepository::new(state.conn(), state.ledger_gate.clone());
    let entries = repo.list().await?;
    let totals = repo.totals().await?;
    let stats = json!({
        "totalDebet": totals.total_debit,
        "totalKredit": totals.total_credit,
        "saldo": totals.balance,
    });
    Ok(vec![("bukuKas", to_value(&entries)?), ("stats", stats)])
}

/// GET /login - Login form.
async fn login(State(state): State<AppState>) -> PageResult {
    let source = match state.layouts.page("login.html") {
        Ok(text) => text,
        Err(TemplateError::PageNotFound(_)) => DEFAULT_LOGIN_PAGE.to_string(),
        Err(e) => return Err(template_error(e)),
    };
    let ctx = TemplateContext::new("Login").with_organisasi(organisasi(&state).await?);
    Ok(Html(TemplateEngine::render(&source, &ctx).html))
}

/// GET /dashboard
async fn dashboard(State(state): State<AppState>, auth: AuthUser) -> PageResult {
    let stats = DashboardRepository::new(state.conn())
        .stats()
        .await
        .map_err(|e| db_app_error(&e))?;
    let stats = json!({
        "anggota": stats.total_members,
        "iuranLunas": stats.paid_dues,
        "totalMasuk": stats.total_debit,
        "totalKeluar": stats.total_credit,
        "saldo": stats.balance,
    });
    let page = Page::new("dashboard.html", "Dashboard", "dashboard");
    render(&state, &auth, page, vec![("stats", stats)]).await
}

/// GET /buku-kas - Cashbook editor (admin, pengurus).
async fn buku_kas(State(state): State<AppState>, auth: AuthUser) -> PageResult {
    guard(auth.require_records())?;
    let vars = cashbook_vars(&state).await?;
    let page = Page::new("bukuKas.html", "Buku Kas", "bukuKas");
    render(&state, &auth, page, vars).await
}

/// GET /arus-kas - Read-only cash flow for every role.
async fn arus_kas(State(state): State<AppState>, auth: AuthUser) -> PageResult {
    let vars = cashbook_vars(&state).await?;
    let page = Page::new("arusKas.html", "Arus Kas", "arusKas");
    render(&state, &auth, page, vars).await
}

/// GET /iuran
async fn iuran(State(state): State<AppState>, auth: AuthUser) -> PageResult {
    guard(auth.require_records())?;
    let page = Page::new("iuran.html", "Data Iuran", "iuran");
    render(&state, &auth, page, Vec::new()).await
}

/// GET /anggota
async fn anggota(State(state): State<AppState>, auth: AuthUser) -> PageResult {
    guard(auth.require_records())?;
    let page = Page::new("anggota.html", "Data Anggota", "anggota");
    render(&state, &auth, page, Vec::new()).await
}

/// GET /tarif
async fn tarif(State(state): State<AppState>, auth: AuthUser) -> PageResult {
    guard(auth.require_records())?;
    let page = Page::new("tarif.html", "Data Tarif", "tarif");
    render(&state, &auth, page, Vec::new()).await
}

/// GET /tagihan - The caller's own dues, found through the member sharing
/// their name.
async fn tagihan(State(state): State<AppState>, auth: AuthUser) -> PageResult {
    let Some(member) = MemberRepository::new(state.conn())
        .find_by_name(auth.name())
        .await?
    else {
        return Err(PageError(AppError::NotFound(
            "Anggota tidak ditemukan. Silakan hubungi administrator.".to_string(),
        )));
    };
    let filter = DuesFilter {
        member_id: Some(member.id),
        ..DuesFilter::default()
    };
    let dues = DuesRepository::new(state.conn(), state.ledger_gate.clone())
        .list(&filter)
        .await?;

    let vars = vec![("iuran", to_value(&dues)?), ("anggota", to_value(&member)?)];
    let page = Page::new("tagihan.html", "Tagihan Iuran Saya", "tagihan");
    render(&state, &auth, page, vars).await
}

/// GET /penilaian - Monthly assessments (admin, pengurus, tentor).
async fn penilaian(State(state): State<AppState>, auth: AuthUser) -> PageResult {
    guard(auth.require_scorer())?;
    let page = Page::new("penilaian.html", "Penilaian Bulanan", "penilaian");
    render(&state, &auth, page, Vec::new()).await
}

/// GET /penilaian-saya - The caller's own assessments.
async fn penilaian_saya(State(state): State<AppState>, auth: AuthUser) -> PageResult {
    let member = MemberRepository::new(state.conn())
        .find_by_name(auth.name())
        .await?;
    let vars = vec![("anggota", member.map_or(Ok(json!({})), |m| to_value(&m))?)];
    let page = Page::new("myPenilaian.html", "Penilaian Saya", "penilaianSaya");
    render(&state, &auth, page, vars).await
}

/// GET /jenis-penilaian
async fn jenis_penilaian(State(state): State<AppState>, auth: AuthUser) -> PageResult {
    guard(auth.require_scorer())?;
    let page = Page::new("jenisPenilaian.html", "Jenis Penilaian", "jenisPenilaian");
    render(&state, &auth, page, Vec::new()).await
}

/// GET /panahan - Archery games; members only see their own.
async fn panahan(State(state): State<AppState>, auth: AuthUser) -> PageResult {
    let member_id = if auth.is_member() {
        let own = MemberRepository::new(state.conn())
            .find_by_name(auth.name())
            .await?;
        // No matching member record: nothing to show.
        Some(own.map_or(0, |m| m.id))
    } else {
        None
    };
    let games = ArcheryRepository::new(state.conn())
        .list_games(member_id)
        .await?;
    let page = Page::new("panahan.html", "Scoring Panahan", "panahan");
    render(&state, &auth, page, vec![("games", to_value(&games)?)]).await
}
