use reqwest::{header, multipart, Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info};

use crate::config::ConsoleConfig;
use crate::error::ConsoleError;
use crate::models::attendance::{
    AttendanceTracker, FullAttendance, FullAttendanceRow, SheetRequest, TodayAttendance,
    TodaySummary, TrackerRequest,
};
use crate::models::exam::{ExamRecord, ExamReportSubmission};
use crate::models::notice::{Notice, NoticeDraft};
use crate::models::student::{
    FeeStatus, FeeStatusCounts, FeeStatusUpdate, NewStudent, SheetStudent, SheetStudentDetails,
    Student, StudentCount, StudentLookup,
};
use crate::models::timetable::{TimetableKind, UploadedTimetable};
use crate::models::user::{UserCredential, UserUpdate};

pub fn api_client_init() -> Result<Client, ConsoleError> {
    info!("Initializing school API client");

    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );

    match Client::builder().default_headers(headers).build() {
        Ok(client) => {
            info!("School API client initialized successfully");
            Ok(client)
        }
        Err(e) => {
            error!("Failed to build school API client: {}", e);
            Err(ConsoleError::Config(format!("failed to build HTTP client: {}", e)))
        }
    }
}

/// Typed access to the school API. One method per endpoint.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ConsoleConfig) -> Result<Self, ConsoleError> {
        Ok(Self::with_client(api_client_init()?, &config.api_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL plus `segments`, each percent-encoded as one path segment.
    fn url(&self, segments: &[&str]) -> Result<Url, ConsoleError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ConsoleError::Config(format!("invalid API URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ConsoleError::Config(format!("API URL '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ---- students and fees ----

    pub async fn list_students(&self) -> Result<Vec<Student>, ConsoleError> {
        self.get_json(&["allstudents"]).await
    }

    pub async fn register_student(&self, student: &NewStudent) -> Result<(), ConsoleError> {
        self.send_json(Method::POST, &["register"], student).await
    }

    pub async fn update_student(&self, roll: &str, student: &Student) -> Result<(), ConsoleError> {
        self.send_json(Method::PUT, &["updateStudent", roll], student)
            .await
    }

    pub async fn update_fee_status(&self, roll: &str, status: FeeStatus) -> Result<(), ConsoleError> {
        info!("Updating fee status of {} to {}", roll, status);
        self.send_json(
            Method::PUT,
            &["updateFeeStatus", roll],
            &FeeStatusUpdate { fee_status: status },
        )
        .await
    }

    pub async fn student_count(&self) -> Result<u64, ConsoleError> {
        let count: StudentCount = self.get_json(&["studentcount"]).await?;
        Ok(count.student_count)
    }

    pub async fn fee_status_counts(&self) -> Result<FeeStatusCounts, ConsoleError> {
        self.get_json(&["feestatuscount"]).await
    }

    // ---- attendance sheet roster ----

    /// `/save` is the only endpoint that expects the signed-in user's token.
    pub async fn save_sheet_student(
        &self,
        student: &SheetStudent,
        id_token: Option<&str>,
    ) -> Result<(), ConsoleError> {
        let mut request = self.client.post(self.url(&["save"])?).json(student);
        if let Some(token) = id_token {
            request = request.bearer_auth(token);
        }
        self.execute("/save", request).await.map(|_| ())
    }

    pub async fn search_sheet_student(
        &self,
        lookup: &StudentLookup,
    ) -> Result<SheetStudentDetails, ConsoleError> {
        self.exchange_json(Method::POST, &["search-student"], lookup).await
    }

    pub async fn update_sheet_student(&self, student: &SheetStudent) -> Result<(), ConsoleError> {
        self.send_json(Method::POST, &["update-student"], student).await
    }

    // ---- attendance ----

    pub async fn current_attendance(&self, class: &str) -> Result<Vec<TodayAttendance>, ConsoleError> {
        let summary: TodaySummary = self
            .get_json(&["attendance", "current", class])
            .await?;
        Ok(summary.today_summary)
    }

    pub async fn attendance_tracker(&self, class: &str) -> Result<AttendanceTracker, ConsoleError> {
        self.exchange_json(
            Method::POST,
            &["attendance", "tracker"],
            &TrackerRequest {
                class_sheet: class.to_string(),
            },
        )
        .await
    }

    pub async fn full_attendance(&self, class: &str) -> Result<Vec<FullAttendanceRow>, ConsoleError> {
        let sheet: FullAttendance = self.get_json(&["attendance", "full", class]).await?;
        info!(
            "Fetched full attendance for {} with {} rows",
            class,
            sheet.attendance_data.len()
        );
        Ok(sheet.attendance_data)
    }

    pub async fn delete_full_attendance(&self, class: &str) -> Result<(), ConsoleError> {
        self.delete(&["attendance", "full", class]).await
    }

    pub async fn create_sheet(&self, sheet_name: &str) -> Result<(), ConsoleError> {
        self.send_json(
            Method::POST,
            &["sheet", "create"],
            &SheetRequest {
                sheet_name: sheet_name.to_string(),
            },
        )
        .await
    }

    // ---- uploaded timetables ----

    pub async fn timetable_classes(&self) -> Result<Vec<String>, ConsoleError> {
        self.get_json(&["api", "timetables", "classes"]).await
    }

    pub async fn upload_timetable(
        &self,
        kind: TimetableKind,
        class: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<UploadedTimetable, ConsoleError> {
        let segments = ["api", kind.api_segment(), "upload", class];
        let path = label(&segments);
        info!(
            "Uploading {} timetable for {} ({} bytes)",
            kind,
            class,
            content.len()
        );

        let part = multipart::Part::bytes(content).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        let request = self.client.post(self.url(&segments)?).multipart(form);

        let response = self.execute(&path, request).await?;
        decode(&path, response).await
    }

    pub async fn view_timetables(
        &self,
        kind: TimetableKind,
        class: &str,
    ) -> Result<Vec<String>, ConsoleError> {
        self.get_json(&["api", kind.api_segment(), "view", class])
            .await
    }

    pub async fn delete_timetable(&self, kind: TimetableKind, class: &str) -> Result<(), ConsoleError> {
        self.delete(&["api", kind.api_segment(), "delete", class])
            .await
    }

    // ---- exam reports ----

    pub async fn exam_report(&self, roll: &str) -> Result<Vec<ExamRecord>, ConsoleError> {
        self.get_json(&["report", roll]).await
    }

    pub async fn delete_grade(&self, grade: &str) -> Result<(), ConsoleError> {
        info!("Deleting exam records of grade {}", grade);
        self.delete(&["deletegrade", grade]).await
    }

    pub async fn add_exam_report(&self, submission: &ExamReportSubmission) -> Result<(), ConsoleError> {
        self.send_json(Method::POST, &["addexamreport"], submission).await
    }

    // ---- notices ----

    pub async fn list_notices(&self) -> Result<Vec<Notice>, ConsoleError> {
        self.get_json(&["get-posts"]).await
    }

    pub async fn add_notice(&self, draft: &NoticeDraft) -> Result<(), ConsoleError> {
        self.send_json(Method::POST, &["add-post"], draft).await
    }

    pub async fn update_notice(&self, id: &str, draft: &NoticeDraft) -> Result<(), ConsoleError> {
        self.send_json(Method::PUT, &["update-post", id], draft)
            .await
    }

    pub async fn delete_notice(&self, id: &str) -> Result<(), ConsoleError> {
        self.delete(&["delete-post", id]).await
    }

    pub async fn delete_all_notices(&self) -> Result<(), ConsoleError> {
        self.delete(&["delete-all-posts"]).await
    }

    // ---- console users ----

    pub async fn list_users(&self) -> Result<Vec<UserCredential>, ConsoleError> {
        self.get_json(&["getUsers"]).await
    }

    pub async fn update_user(&self, update: &UserUpdate) -> Result<(), ConsoleError> {
        info!("Updating console user {}", update.current_username);
        self.send_json(Method::POST, &["updateUser"], update).await
    }

    // ---- plumbing ----

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ConsoleError> {
        let path = label(segments);
        let response = self.execute(&path, self.client.get(self.url(segments)?)).await?;
        decode(&path, response).await
    }

    /// Sends a JSON body and ignores whatever comes back.
    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<(), ConsoleError> {
        let request = self.client.request(method, self.url(segments)?).json(body);
        self.execute(&label(segments), request).await.map(|_| ())
    }

    async fn exchange_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ConsoleError> {
        let path = label(segments);
        let request = self.client.request(method, self.url(segments)?).json(body);
        let response = self.execute(&path, request).await?;
        decode(&path, response).await
    }

    async fn delete(&self, segments: &[&str]) -> Result<(), ConsoleError> {
        self.execute(&label(segments), self.client.delete(self.url(segments)?))
            .await
            .map(|_| ())
    }

    async fn execute(&self, path: &str, request: RequestBuilder) -> Result<Response, ConsoleError> {
        match request.send().await {
            Ok(resp) => {
                if !resp.status().is_success() {
                    let status = resp.status();
                    let error_text = resp
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    error!("School API {} returned error status {}: {}", path, status, error_text);
                    return Err(ConsoleError::Api {
                        endpoint: path.to_string(),
                        status: status.as_u16(),
                        message: error_text,
                    });
                }
                info!("School API {} answered {}", path, resp.status());
                Ok(resp)
            }
            Err(e) => {
                error!("Failed to send request to school API {}: {}", path, e);
                Err(ConsoleError::Network {
                    endpoint: path.to_string(),
                    source: e,
                })
            }
        }
    }
}

/// Endpoint name for logs and errors, e.g. `/report/42`.
fn label(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, ConsoleError> {
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to read response body of {}: {}", path, e);
            return Err(ConsoleError::Network {
                endpoint: path.to_string(),
                source: e,
            });
        }
    };

    match serde_json::from_str::<T>(&text) {
        Ok(value) => Ok(value),
        Err(e) => {
            error!("Failed to parse response of {}: {}", path, e);
            error!("Raw response: {}", text);
            Err(ConsoleError::Decode {
                endpoint: path.to_string(),
                source: e,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_values_are_encoded_as_single_segments() {
        let api = ApiClient::with_client(Client::new(), "http://school.test/v1/");
        let url = api.url(&["deletegrade", "A#"]).unwrap();
        assert_eq!(url.as_str(), "http://school.test/v1/deletegrade/A%23");

        let url = api.url(&["report", "12?x=1/2"]).unwrap();
        assert_eq!(url.as_str(), "http://school.test/v1/report/12%3Fx=1%2F2");
    }

    #[test]
    fn bare_host_base_gets_no_double_slash() {
        let api = ApiClient::with_client(Client::new(), "http://school.test");
        let url = api.url(&["get-posts"]).unwrap();
        assert_eq!(url.as_str(), "http://school.test/get-posts");
        assert_eq!(label(&["attendance", "full", "CLASS-5"]), "/attendance/full/CLASS-5");
    }
}
