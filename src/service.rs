use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info, warn};

use crate::{
    error::ConsoleError,
    helpers::{api::ApiClient, export, pdf::create_timetable_pdf},
    models::{
        attendance::{AttendanceTracker, FullAttendanceRow, TodayAttendance},
        exam::ExamReportSubmission,
        notice::{Notice, NoticeDraft},
        student::{FeeStatus, FeeStatusCounts, NewStudent, SheetStudent, Student, StudentLookup},
        timetable::{TimetableKind, UploadedTimetable},
        user::{UserCredential, UserUpdate},
    },
    notices::NoticeBoard,
    report::{GradeReport, ReportPage},
    session::{AuthSession, SessionContext, SessionUser},
    timetable::{Day, LunchRule, TimetableEntry, TimetableGrid, TimetableGridBuilder, CLASS_STANDARDS},
    validation::{self, Validate},
};

pub const LOGIN_ROUTE: &str = "/login";

/// Counts shown on the welcome dashboard. A count whose request failed is
/// shown as zero.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub student_count: u64,
    pub user_count: usize,
    pub fee_status: FeeStatusCounts,
}

/// The console: school API client, session owner and the state of the
/// views that keep data between requests.
pub struct ConsoleService {
    pub api: ApiClient,
    auth: AuthSession,
    session: SessionContext,
    report: ReportPage,
    timetables: Mutex<HashMap<String, TimetableGridBuilder>>,
    notices: Mutex<NoticeBoard>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ConsoleService {
    pub fn new(api: ApiClient, auth: AuthSession) -> Self {
        info!("Creating new ConsoleService instance for {}", api.base_url());
        let session = auth.context();
        Self {
            api,
            auth,
            session,
            report: ReportPage::new(),
            timetables: Mutex::new(HashMap::new()),
            notices: Mutex::new(NoticeBoard::new()),
        }
    }

    pub fn session(&self) -> SessionContext {
        self.session.clone()
    }

    /// Create an Axum router for the console. Everything except the
    /// sign-in routes redirects to `/login` without a session.
    pub fn router(self) -> Router {
        info!("Creating console router");
        let shared_state = Arc::new(self);

        let protected = Router::new()
            .route("/dashboard", get(dashboard))
            .route("/students", get(list_students).post(register_student))
            .route("/students/export", get(export_students))
            .route("/students/{roll}", put(update_student))
            .route("/fees/export", get(export_fees))
            .route("/fees/{roll}", put(update_fee_status))
            .route("/roster", post(save_roster_student).put(update_roster_student))
            .route("/roster/search", post(search_roster_student))
            .route("/attendance/sheets", post(create_attendance_sheet))
            .route("/attendance/{class}/today", get(today_attendance))
            .route("/attendance/{class}/tracker", get(attendance_tracker))
            .route(
                "/attendance/{class}/full",
                get(full_attendance).delete(delete_full_attendance),
            )
            .route("/attendance/{class}/export", get(export_attendance))
            .route("/report", delete(leave_report))
            .route("/report/{roll}", get(fetch_report))
            .route("/report/grades/{grade}", delete(delete_grade))
            .route("/exam-reports", post(add_exam_report))
            .route("/timetables/classes", get(timetable_classes))
            .route("/timetables/{kind}", get(timetable_availability))
            .route(
                "/timetables/{kind}/{class}",
                get(view_timetables)
                    .post(upload_timetable)
                    .delete(delete_timetable),
            )
            .route("/timetable/{class}", get(timetable_grid).delete(discard_timetable))
            .route(
                "/timetable/{class}/entries",
                post(add_timetable_entry).delete(delete_timetable_entry),
            )
            .route("/timetable/{class}/lunch", post(set_lunch_break))
            .route("/timetable/{class}/slots", delete(delete_timetable_slot))
            .route("/timetable/{class}/pdf", get(timetable_pdf))
            .route("/notices", get(list_notices).post(add_notice).delete(delete_all_notices))
            .route("/notices/{id}", put(update_notice).delete(delete_notice))
            .route("/users", get(list_users).put(update_user))
            .route_layer(middleware::from_fn_with_state(
                shared_state.clone(),
                require_session,
            ));

        Router::new()
            .route(LOGIN_ROUTE, post(login))
            .route("/logout", post(logout))
            .route("/password-reset", post(password_reset))
            .route("/session", get(current_session))
            .merge(protected)
            .with_state(shared_state)
    }

    // ---- session ----

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, ConsoleError> {
        self.auth.sign_in(email, password).await
    }

    /// Signs out and forgets every view's data.
    pub fn sign_out(&self) {
        self.auth.sign_out();
        self.report.unmount();
        lock(&self.timetables).clear();
        lock(&self.notices).clear();
    }

    /// Re-validates the session token; the session is cleared when the
    /// provider no longer accepts it.
    pub async fn refresh_session(&self) -> Result<Option<SessionUser>, ConsoleError> {
        let user = self.auth.refresh().await?;
        if user.is_none() {
            self.sign_out();
        }
        Ok(user)
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<(), ConsoleError> {
        let email = validation::password_reset_email(email)?;
        self.auth.send_password_reset(email).await
    }

    // ---- dashboard ----

    pub async fn dashboard(&self) -> DashboardSummary {
        let (students, users, fees) = tokio::join!(
            self.api.student_count(),
            self.api.list_users(),
            self.api.fee_status_counts(),
        );

        DashboardSummary {
            student_count: students.unwrap_or_else(|e| {
                error!("Error fetching student count: {}", e);
                0
            }),
            user_count: users.map(|u| u.len()).unwrap_or_else(|e| {
                error!("Error fetching user data: {}", e);
                0
            }),
            fee_status: fees.unwrap_or_else(|e| {
                error!("Error fetching payment status counts: {}", e);
                FeeStatusCounts::default()
            }),
        }
    }

    // ---- students ----

    pub async fn students(&self, roll_filter: &str) -> Result<Vec<Student>, ConsoleError> {
        let students = self.api.list_students().await?;
        Ok(students
            .into_iter()
            .filter(|s| s.matches_roll(roll_filter))
            .collect())
    }

    pub async fn register_student(&self, student: &NewStudent) -> Result<(), ConsoleError> {
        student.validate()?;
        self.api.register_student(student).await?;
        info!(
            "Registered student {} {}",
            student.first_name, student.last_name
        );
        Ok(())
    }

    /// Updates and returns the refreshed student list.
    pub async fn update_student(&self, roll: &str, student: &Student) -> Result<Vec<Student>, ConsoleError> {
        student.details.validate()?;
        self.api.update_student(roll, student).await?;
        self.api.list_students().await
    }

    pub async fn update_fee_status(&self, roll: &str, status: FeeStatus) -> Result<Vec<Student>, ConsoleError> {
        if status == FeeStatus::Unknown {
            return Err(ConsoleError::invalid(
                "feeStatus",
                "Fee status must be PAID, UNPAID or PARTIALLY PAID",
            ));
        }
        self.api.update_fee_status(roll, status).await?;
        self.api.list_students().await
    }

    // ---- attendance roster ----

    pub async fn save_roster_student(&self, student: &SheetStudent) -> Result<(), ConsoleError> {
        student.validate()?;
        let token = self.session.current().map(|user| user.id_token);
        self.api.save_sheet_student(student, token.as_deref()).await
    }

    pub async fn search_roster_student(&self, lookup: StudentLookup) -> Result<SheetStudent, ConsoleError> {
        lookup.validate()?;
        let details = self.api.search_sheet_student(&lookup).await?;
        Ok(details.into_sheet_student(lookup))
    }

    pub async fn update_roster_student(&self, student: &SheetStudent) -> Result<(), ConsoleError> {
        student.validate()?;
        self.api.update_sheet_student(student).await
    }

    // ---- exam report ----

    /// Fetches and groups the report of a roll number. `Ok(None)` when a
    /// newer request or a page exit made this response stale.
    pub async fn fetch_report(&self, roll: &str) -> Result<Option<GradeReport>, ConsoleError> {
        let roll = validation::report_roll_number(roll)?;
        let ticket = self.report.begin_fetch();
        let records = self.api.exam_report(roll).await?;
        self.report.apply(ticket, records)
    }

    /// Deletes a grade remotely, then drops it from the shown report.
    pub async fn delete_grade(&self, grade: &str) -> Result<GradeReport, ConsoleError> {
        self.api.delete_grade(grade).await?;
        Ok(self.report.remove_grade(grade))
    }

    pub fn leave_report(&self) {
        self.report.unmount();
    }

    pub async fn add_exam_report(&self, submission: &ExamReportSubmission) -> Result<(), ConsoleError> {
        submission.validate()?;
        self.api.add_exam_report(submission).await
    }

    // ---- uploaded timetables ----

    /// Which classes currently have an uploaded timetable of `kind`.
    pub async fn timetable_availability(&self, kind: TimetableKind) -> Result<IndexMap<String, bool>, ConsoleError> {
        let classes = self.api.timetable_classes().await?;
        let mut availability = IndexMap::new();
        for class in classes {
            let has_files = match self.api.view_timetables(kind, &class).await {
                Ok(urls) => !urls.is_empty(),
                Err(e) => {
                    warn!("Error fetching {} timetables for {}: {}", kind, class, e);
                    false
                }
            };
            availability.insert(class, has_files);
        }
        Ok(availability)
    }

    // ---- timetable builder ----

    fn with_builder<R>(&self, class: &str, f: impl FnOnce(&mut TimetableGridBuilder) -> R) -> Result<R, ConsoleError> {
        if !CLASS_STANDARDS.contains(&class) {
            return Err(ConsoleError::invalid(
                "studentClass",
                format!("Unknown class '{}'", class),
            ));
        }
        let mut builders = lock(&self.timetables);
        let builder = builders
            .entry(class.to_string())
            .or_insert_with(|| TimetableGridBuilder::new(class));
        Ok(f(builder))
    }

    pub fn timetable_grid(&self, class: &str) -> Result<TimetableGrid, ConsoleError> {
        self.with_builder(class, |b| b.render_week())
    }

    pub fn add_timetable_entry(&self, entry: TimetableEntry) -> Result<TimetableGrid, ConsoleError> {
        entry.validate()?;
        let class = entry.student_class.clone();
        self.with_builder(&class, |b| {
            b.add_entry(entry);
            b.render_week()
        })
    }

    pub fn set_lunch_break(&self, class: &str, rule: LunchRule) -> Result<TimetableGrid, ConsoleError> {
        rule.validate()?;
        self.with_builder(class, |b| {
            b.add_lunch(rule);
            b.render_week()
        })
    }

    pub fn delete_timetable_entry(&self, class: &str, day: Day, slot: &str) -> Result<TimetableGrid, ConsoleError> {
        self.with_builder(class, |b| {
            b.delete_entry(day, slot);
            b.render_week()
        })
    }

    pub fn delete_timetable_slot(&self, class: &str, slot: &str) -> Result<TimetableGrid, ConsoleError> {
        self.with_builder(class, |b| {
            b.delete_slot(slot);
            b.render_week()
        })
    }

    pub fn discard_timetable(&self, class: &str) {
        if lock(&self.timetables).remove(class).is_some() {
            info!("Discarded timetable draft of {}", class);
        }
    }

    pub fn timetable_pdf(&self, class: &str) -> Result<Vec<u8>, ConsoleError> {
        let grid = self.timetable_grid(class)?;
        create_timetable_pdf(&grid, class)
    }

    // ---- notices ----

    /// Reloads the board from the API and applies the title search.
    pub async fn notices(&self, query: &str) -> Result<Vec<Notice>, ConsoleError> {
        let notices = self.api.list_notices().await?;
        let mut board = lock(&self.notices);
        board.replace_all(notices);
        Ok(board.search(query))
    }

    pub async fn add_notice(&self, draft: &NoticeDraft) -> Result<Vec<Notice>, ConsoleError> {
        draft.validate()?;
        self.api.add_notice(draft).await?;
        self.notices("").await
    }

    pub async fn update_notice(&self, id: &str, draft: NoticeDraft) -> Result<Notice, ConsoleError> {
        draft.validate()?;
        self.api.update_notice(id, &draft).await?;
        {
            let mut board = lock(&self.notices);
            if board.get(id).is_some() {
                return board.update(id, draft).cloned();
            }
        }

        // Not loaded in this session; the edit is applied upstream already.
        self.notices("").await?;
        lock(&self.notices)
            .get(id)
            .cloned()
            .ok_or_else(|| ConsoleError::NotFound(format!("Notice {} not found", id)))
    }

    pub async fn delete_notice(&self, id: &str) -> Result<(), ConsoleError> {
        self.api.delete_notice(id).await?;
        lock(&self.notices).remove(id);
        Ok(())
    }

    pub async fn delete_all_notices(&self) -> Result<(), ConsoleError> {
        self.api.delete_all_notices().await?;
        lock(&self.notices).clear();
        Ok(())
    }

    // ---- console users ----

    /// Replaces the credentials of `current_username`.
    pub async fn update_user(
        &self,
        current_username: &str,
        username: &str,
        password: &str,
    ) -> Result<Vec<UserCredential>, ConsoleError> {
        validation::credentials(username, password)?;
        let users = self.api.list_users().await?;
        let current = users
            .iter()
            .find(|u| u.username() == current_username)
            .ok_or_else(|| ConsoleError::NotFound(format!("User {} not found", current_username)))?;

        self.api
            .update_user(&UserUpdate::replacing(current, username, password))
            .await?;
        self.api.list_users().await
    }
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ConsoleError::Unauthenticated => Redirect::to(LOGIN_ROUTE).into_response(),
            ConsoleError::Validation(fields) => {
                let fields: serde_json::Map<String, serde_json::Value> = fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), json!(v)))
                    .collect();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "error": message, "fields": fields })),
                )
                    .into_response()
            }
            ConsoleError::NotFound(_) => (StatusCode::NOT_FOUND, message).into_response(),
            ConsoleError::Network { .. } | ConsoleError::Api { .. } | ConsoleError::Decode { .. } => {
                (StatusCode::BAD_GATEWAY, message).into_response()
            }
            ConsoleError::Document(_) | ConsoleError::Export(_) | ConsoleError::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        }
    }
}

fn attachment(content_type: &'static str, file_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}

type Shared = State<Arc<ConsoleService>>;

async fn require_session(State(service): Shared, request: Request, next: Next) -> Response {
    if !service.session.is_signed_in() {
        info!("No session for {}, redirecting to login", request.uri().path());
        return Redirect::to(LOGIN_ROUTE).into_response();
    }
    next.run(request).await
}

// Route handlers

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct EmailForm {
    #[serde(default)]
    email: String,
}

#[derive(Deserialize, Default)]
struct RollFilter {
    #[serde(default)]
    roll: String,
}

#[derive(Deserialize, Default)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeeStatusForm {
    fee_status: FeeStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetForm {
    #[serde(default)]
    sheet_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadQuery {
    #[serde(default = "default_upload_name")]
    file_name: String,
}

fn default_upload_name() -> String {
    "timetable.pdf".to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryForm {
    day: Day,
    subject: String,
    start_time: String,
    end_time: String,
}

#[derive(Deserialize)]
struct CellQuery {
    day: String,
    slot: String,
}

#[derive(Deserialize)]
struct SlotQuery {
    slot: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserForm {
    current_username: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

async fn login(State(service): Shared, Json(form): Json<LoginForm>) -> Response {
    match service.sign_in(&form.email, &form.password).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => {
            error!("Login failed: {}", e);
            (
                StatusCode::UNAUTHORIZED,
                "Login failed. Please check your credentials.",
            )
                .into_response()
        }
    }
}

async fn logout(State(service): Shared) -> StatusCode {
    service.sign_out();
    StatusCode::NO_CONTENT
}

async fn current_session(State(service): Shared) -> Result<Json<SessionUser>, ConsoleError> {
    service
        .refresh_session()
        .await?
        .map(Json)
        .ok_or(ConsoleError::Unauthenticated)
}

async fn password_reset(State(service): Shared, Json(form): Json<EmailForm>) -> Response {
    match service.send_password_reset(&form.email).await {
        Ok(()) => "Password reset email sent! Please check your inbox.".into_response(),
        Err(e) if !e.is_upstream() => e.into_response(),
        Err(e) => {
            error!("Error sending password reset email: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                "Failed to send password reset email. Please try again.",
            )
                .into_response()
        }
    }
}

async fn dashboard(State(service): Shared) -> Json<DashboardSummary> {
    Json(service.dashboard().await)
}

async fn list_students(
    State(service): Shared,
    Query(filter): Query<RollFilter>,
) -> Result<Json<Vec<Student>>, ConsoleError> {
    Ok(Json(service.students(&filter.roll).await?))
}

async fn register_student(
    State(service): Shared,
    Json(student): Json<NewStudent>,
) -> Result<(StatusCode, Json<NewStudent>), ConsoleError> {
    service.register_student(&student).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

async fn export_students(State(service): Shared, Query(filter): Query<RollFilter>) -> Result<Response, ConsoleError> {
    let students = service.students(&filter.roll).await?;
    let csv = export::students_csv(&students)?;
    Ok(attachment("text/csv", export::students_file_name(), csv))
}

async fn update_student(
    State(service): Shared,
    Path(roll): Path<String>,
    Json(student): Json<Student>,
) -> Result<Json<Vec<Student>>, ConsoleError> {
    Ok(Json(service.update_student(&roll, &student).await?))
}

async fn export_fees(State(service): Shared, Query(filter): Query<RollFilter>) -> Result<Response, ConsoleError> {
    let students = service.students(&filter.roll).await?;
    let csv = export::fee_status_csv(&students)?;
    Ok(attachment("text/csv", export::fee_status_file_name(), csv))
}

async fn update_fee_status(
    State(service): Shared,
    Path(roll): Path<String>,
    Json(form): Json<FeeStatusForm>,
) -> Result<Json<Vec<Student>>, ConsoleError> {
    Ok(Json(service.update_fee_status(&roll, form.fee_status).await?))
}

async fn save_roster_student(
    State(service): Shared,
    Json(student): Json<SheetStudent>,
) -> Result<StatusCode, ConsoleError> {
    service.save_roster_student(&student).await?;
    Ok(StatusCode::CREATED)
}

async fn update_roster_student(
    State(service): Shared,
    Json(student): Json<SheetStudent>,
) -> Result<StatusCode, ConsoleError> {
    service.update_roster_student(&student).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn search_roster_student(
    State(service): Shared,
    Json(lookup): Json<StudentLookup>,
) -> Result<Json<SheetStudent>, ConsoleError> {
    Ok(Json(service.search_roster_student(lookup).await?))
}

async fn create_attendance_sheet(
    State(service): Shared,
    Json(form): Json<SheetForm>,
) -> Result<(StatusCode, String), ConsoleError> {
    let name = form.sheet_name.trim();
    if name.is_empty() {
        return Err(ConsoleError::invalid("sheetName", "Sheet name is required"));
    }
    service.api.create_sheet(name).await?;
    Ok((
        StatusCode::CREATED,
        format!("Sheet \"{}\" created successfully!", name),
    ))
}

async fn today_attendance(
    State(service): Shared,
    Path(class): Path<String>,
) -> Result<Json<Vec<TodayAttendance>>, ConsoleError> {
    Ok(Json(service.api.current_attendance(&class).await?))
}

async fn attendance_tracker(
    State(service): Shared,
    Path(class): Path<String>,
) -> Result<Json<AttendanceTracker>, ConsoleError> {
    Ok(Json(service.api.attendance_tracker(&class).await?))
}

async fn full_attendance(
    State(service): Shared,
    Path(class): Path<String>,
    Query(search): Query<SearchQuery>,
) -> Result<Json<Vec<FullAttendanceRow>>, ConsoleError> {
    let rows = service.api.full_attendance(&class).await?;
    Ok(Json(rows.into_iter().filter(|row| row.matches(&search.q)).collect()))
}

async fn delete_full_attendance(
    State(service): Shared,
    Path(class): Path<String>,
) -> Result<String, ConsoleError> {
    service.api.delete_full_attendance(&class).await?;
    Ok(format!(
        "Full attendance sheet for {} deleted successfully!",
        class
    ))
}

async fn export_attendance(State(service): Shared, Path(class): Path<String>) -> Result<Response, ConsoleError> {
    let rows = service.api.full_attendance(&class).await?;
    let csv = export::full_attendance_csv(&rows)?;
    Ok(attachment("text/csv", &export::attendance_file_name(&class), csv))
}

async fn fetch_report(State(service): Shared, Path(roll): Path<String>) -> Result<Response, ConsoleError> {
    match service.fetch_report(&roll).await? {
        Some(report) => Ok(Json(report).into_response()),
        None => Ok((
            StatusCode::CONFLICT,
            "A newer report request replaced this one",
        )
            .into_response()),
    }
}

async fn delete_grade(
    State(service): Shared,
    Path(grade): Path<String>,
) -> Result<Json<GradeReport>, ConsoleError> {
    Ok(Json(service.delete_grade(&grade).await?))
}

async fn leave_report(State(service): Shared) -> StatusCode {
    service.leave_report();
    StatusCode::NO_CONTENT
}

async fn add_exam_report(
    State(service): Shared,
    Json(submission): Json<ExamReportSubmission>,
) -> Result<StatusCode, ConsoleError> {
    service.add_exam_report(&submission).await?;
    Ok(StatusCode::CREATED)
}

fn parse_kind(kind: &str) -> Result<TimetableKind, ConsoleError> {
    kind.parse().map_err(|e: String| ConsoleError::invalid("kind", e))
}

async fn timetable_classes(State(service): Shared) -> Result<Json<Vec<String>>, ConsoleError> {
    Ok(Json(service.api.timetable_classes().await?))
}

async fn timetable_availability(
    State(service): Shared,
    Path(kind): Path<String>,
) -> Result<Json<IndexMap<String, bool>>, ConsoleError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(service.timetable_availability(kind).await?))
}

async fn view_timetables(
    State(service): Shared,
    Path((kind, class)): Path<(String, String)>,
) -> Result<Json<Vec<String>>, ConsoleError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(service.api.view_timetables(kind, &class).await?))
}

async fn upload_timetable(
    State(service): Shared,
    Path((kind, class)): Path<(String, String)>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<UploadedTimetable>, ConsoleError> {
    let kind = parse_kind(&kind)?;
    if body.is_empty() {
        return Err(ConsoleError::invalid("file", "Please choose a file to upload"));
    }
    let uploaded = service
        .api
        .upload_timetable(kind, &class, &query.file_name, body.to_vec())
        .await?;
    Ok(Json(uploaded))
}

async fn delete_timetable(
    State(service): Shared,
    Path((kind, class)): Path<(String, String)>,
) -> Result<StatusCode, ConsoleError> {
    let kind = parse_kind(&kind)?;
    service.api.delete_timetable(kind, &class).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn timetable_grid(
    State(service): Shared,
    Path(class): Path<String>,
) -> Result<Json<TimetableGrid>, ConsoleError> {
    Ok(Json(service.timetable_grid(&class)?))
}

async fn discard_timetable(State(service): Shared, Path(class): Path<String>) -> StatusCode {
    service.discard_timetable(&class);
    StatusCode::NO_CONTENT
}

async fn add_timetable_entry(
    State(service): Shared,
    Path(class): Path<String>,
    Json(form): Json<EntryForm>,
) -> Result<Json<TimetableGrid>, ConsoleError> {
    let entry = TimetableEntry {
        day: form.day,
        subject: form.subject,
        start_time: form.start_time,
        end_time: form.end_time,
        student_class: class,
    };
    Ok(Json(service.add_timetable_entry(entry)?))
}

async fn delete_timetable_entry(
    State(service): Shared,
    Path(class): Path<String>,
    Query(cell): Query<CellQuery>,
) -> Result<Json<TimetableGrid>, ConsoleError> {
    let day: Day = cell
        .day
        .parse()
        .map_err(|e: String| ConsoleError::invalid("day", e))?;
    Ok(Json(service.delete_timetable_entry(&class, day, &cell.slot)?))
}

async fn set_lunch_break(
    State(service): Shared,
    Path(class): Path<String>,
    Json(rule): Json<LunchRule>,
) -> Result<Json<TimetableGrid>, ConsoleError> {
    Ok(Json(service.set_lunch_break(&class, rule)?))
}

async fn delete_timetable_slot(
    State(service): Shared,
    Path(class): Path<String>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<TimetableGrid>, ConsoleError> {
    Ok(Json(service.delete_timetable_slot(&class, &query.slot)?))
}

async fn timetable_pdf(State(service): Shared, Path(class): Path<String>) -> Result<Response, ConsoleError> {
    let pdf = service.timetable_pdf(&class)?;
    Ok(attachment("application/pdf", "timetable.pdf", pdf))
}

async fn list_notices(
    State(service): Shared,
    Query(search): Query<SearchQuery>,
) -> Result<Json<Vec<Notice>>, ConsoleError> {
    Ok(Json(service.notices(&search.q).await?))
}

async fn add_notice(
    State(service): Shared,
    Json(draft): Json<NoticeDraft>,
) -> Result<(StatusCode, Json<Vec<Notice>>), ConsoleError> {
    let notices = service.add_notice(&draft).await?;
    Ok((StatusCode::CREATED, Json(notices)))
}

async fn update_notice(
    State(service): Shared,
    Path(id): Path<String>,
    Json(draft): Json<NoticeDraft>,
) -> Result<Json<Notice>, ConsoleError> {
    Ok(Json(service.update_notice(&id, draft).await?))
}

async fn delete_notice(State(service): Shared, Path(id): Path<String>) -> Result<StatusCode, ConsoleError> {
    service.delete_notice(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_all_notices(State(service): Shared) -> Result<StatusCode, ConsoleError> {
    service.delete_all_notices().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_users(State(service): Shared) -> Result<Json<Vec<UserCredential>>, ConsoleError> {
    Ok(Json(service.api.list_users().await?))
}

async fn update_user(
    State(service): Shared,
    Json(form): Json<UserForm>,
) -> Result<Json<Vec<UserCredential>>, ConsoleError> {
    let users = service
        .update_user(&form.current_username, &form.username, &form.password)
        .await?;
    Ok(Json(users))
}
