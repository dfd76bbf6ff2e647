//! Server rendered HTML for the dashboard pages.

use chrono_tz::Tz;
use domain::case_recording::format_submitted_at;
use domain::case_recordings::Model;
use domain::site_config::SiteConfig;

pub(crate) const LOGIN_PAGE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/login.html"));
pub(crate) const AUDIO_PLAYER_JS: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/audio-player.js"));

pub(crate) const LOGIN_FAILED: &str = "Login failed.";
pub(crate) const UPLOAD_SUCCEEDED: &str = "File uploaded successfully.";
pub(crate) const UPLOAD_FAILED: &str = "Upload failed.";

const NO_OBJECT: &str = "—";

/// One search result as shown in the recordings table.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordingRow {
    pub(crate) id: String,
    pub(crate) case_id: String,
    pub(crate) object_uri: String,
    pub(crate) submitted_at: String,
    pub(crate) status: String,
}

impl RecordingRow {
    pub(crate) fn new(model: &Model, tz: Tz) -> Self {
        Self {
            id: model.id.to_string(),
            case_id: model.case_id.clone(),
            object_uri: model
                .object_uri
                .clone()
                .unwrap_or_else(|| NO_OBJECT.to_string()),
            submitted_at: format_submitted_at(&model.submitted_at, tz),
            status: model.status.to_string(),
        }
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <style>
    body {{ font-family: sans-serif; margin: 2rem; }}
    nav a {{ margin-right: 1rem; }}
    table {{ border-collapse: collapse; margin-top: 1rem; }}
    th, td {{ border: 1px solid #ddd; padding: 0.4rem 0.8rem; text-align: left; }}
    tr.highlight {{ background: #fff6d5; }}
    .status {{ font-weight: bold; }}
    .chat-message.customer {{ color: #1a4d8f; }}
  </style>
</head>
<body>
  <nav><a href="/success">Upload</a><a href="/site-settings">Settings</a><a href="/logout">Sign out</a></nav>
{body}
</body>
</html>"#,
        title = html_escape(title),
    )
}

/// Upload form, search box and, when given, the recordings for the searched case.
pub(crate) fn upload_page(status_message: &str, rows: &[RecordingRow]) -> String {
    let table_rows: String = rows
        .iter()
        .map(|row| {
            format!(
                r#"<tr><td>{case_id}</td><td>{object_uri}</td><td>{submitted_at}</td><td><a class="ai-insights-link" href="/api/insights/{id}" data-record-id="{id}">View insights</a></td><td>{status}</td></tr>"#,
                case_id = html_escape(&row.case_id),
                object_uri = html_escape(&row.object_uri),
                submitted_at = html_escape(&row.submitted_at),
                id = html_escape(&row.id),
                status = html_escape(&row.status),
            )
        })
        .collect();

    let body = format!(
        r#"  <h1>Upload a call recording</h1>
  <p class="status">{status_message}</p>
  <form action="/upload" method="post" enctype="multipart/form-data">
    <label>Case id <input type="text" name="case-id" required></label>
    <input type="file" name="audio" accept="audio/*" required>
    <button type="submit">Upload</button>
  </form>
  <h2>Search recordings</h2>
  <form action="/search" method="get">
    <label>Case id <input type="text" name="case-id"></label>
    <button type="submit">Search</button>
  </form>
  <table>
    <thead><tr><th>Case id</th><th>Audio</th><th>Submitted</th><th>AI insights</th><th>Status</th></tr></thead>
    <tbody>{table_rows}</tbody>
  </table>
  <p id="insight-status"></p>
  <div id="audio-player"></div>
  <h3>Summary</h3><p id="summary"></p>
  <h3>Sentiment</h3><p><span id="sentiment-score"></span> <span id="sentiment-description"></span></p>
  <h3>Action items</h3><ul id="action-items"></ul>
  <h3>Transcript</h3><div id="transcript"></div>
  <script src="/static/audio-player.js"></script>"#,
        status_message = html_escape(status_message),
    );

    layout("Call Insights", &body)
}

/// The site settings form, filled with `config`.
pub(crate) fn settings_page(status_message: Option<&str>, config: &SiteConfig) -> String {
    let field = |label: &str, name: &str, kind: &str, value: &str| {
        format!(
            r#"    <p><label>{label}<br><input type="{kind}" name="{name}" value="{value}" size="80"></label></p>
"#,
            value = html_escape(value),
        )
    };
    let area = |label: &str, name: &str, value: &str| {
        format!(
            r#"    <p><label>{label}<br><textarea name="{name}" rows="4" cols="80">{value}</textarea></label></p>
"#,
            value = html_escape(value),
        )
    };

    let mut form = String::new();
    form.push_str(&field("OAuth client id", "clientId", "text", &config.client_id));
    form.push_str(&field(
        "OAuth client secret",
        "clientSecret",
        "password",
        &config.client_secret,
    ));
    form.push_str(&field("Callback URL", "callbackUrl", "url", &config.callback_url));
    form.push_str(&field(
        "Allowed domains (comma separated)",
        "allowedDomains",
        "text",
        &config.allowed_domains.join(", "),
    ));
    form.push_str(&field("Project id", "projectId", "text", &config.project_id));
    form.push_str(&area("Summary prompt", "promptSummary", &config.prompt_summary));
    form.push_str(&area(
        "Action items prompt",
        "promptActionItems",
        &config.prompt_action_items,
    ));

    let body = format!(
        r#"  <h1>Site settings</h1>
  <p class="status">{status_message}</p>
  <form action="/config" method="post">
{form}    <button type="submit">Save</button>
  </form>"#,
        status_message = html_escape(status_message.unwrap_or_default()),
    );

    layout("Site settings", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domain::recording_status::RecordingStatus;

    fn model(object_uri: Option<&str>) -> Model {
        let submitted_at = chrono::Utc
            .with_ymd_and_hms(2024, 3, 5, 6, 7, 9)
            .unwrap()
            .fixed_offset();
        Model {
            id: domain::Id::parse_str("0b7c0f4e-3d35-4c59-9f0c-2a0b6c1e9d11").unwrap(),
            case_id: "CASE-1".to_string(),
            submitted_at,
            status: RecordingStatus::Processing,
            object_uri: object_uri.map(str::to_string),
            insight_payload: None,
            updated_at: submitted_at,
        }
    }

    #[test]
    fn row_shows_local_time_and_dash_without_audio() {
        let row = RecordingRow::new(&model(None), chrono_tz::Asia::Singapore);

        assert_eq!(row.submitted_at, "05/03/2024, 02:07:09 PM");
        assert_eq!(row.object_uri, "—");
        assert_eq!(row.status, "processing");
    }

    #[test]
    fn upload_page_escapes_user_supplied_values() {
        let mut row = RecordingRow::new(&model(Some("gs://b/k.wav")), chrono_tz::UTC);
        row.case_id = "<script>".to_string();

        let html = upload_page(UPLOAD_SUCCEEDED, &[row]);

        assert!(html.contains("File uploaded successfully."));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(r#"data-record-id="0b7c0f4e-3d35-4c59-9f0c-2a0b6c1e9d11""#));
        assert!(!html.contains("<td><script>"));
    }

    #[test]
    fn settings_page_shows_placeholder_notice() {
        let html = settings_page(
            Some(domain::site_config::NO_CONFIG_MESSAGE),
            &SiteConfig::placeholder(),
        );

        assert!(html.contains("No config found. Please create one."));
        assert!(html.contains(r#"name="allowedDomains" value="google.com, YOUR-DOMAIN""#));
        assert!(html.contains(r#"name="projectId" value="YOUR-PROJECT""#));
    }
}
