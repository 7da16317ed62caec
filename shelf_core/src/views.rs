//! HTML pages for the listing and for error responses

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::fmt::Write;

use crate::notice::{Notice, NoticeLevel};
use crate::registry::DocumentEntry;

pub struct IndexPage<'a> {
    pub app_name: &'a str,
    pub documents: &'a [DocumentEntry],
    pub notice: Option<&'a Notice>,
    pub extension: &'a str,
    pub max_upload_bytes: u64,
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

pub fn encode_path_segment(name: &str) -> String {
    utf8_percent_encode(name, NON_ALPHANUMERIC).to_string()
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}

pub fn index_page(page: &IndexPage<'_>) -> Html<String> {
    let mut body = String::new();
    let extension = escape_html(page.extension);

    let _ = writeln!(body, "<h1>{}</h1>", escape_html(page.app_name));

    if let Some(notice) = page.notice {
        let class = match notice.level {
            NoticeLevel::Success => "notice success",
            NoticeLevel::Error => "notice error",
        };
        let _ = writeln!(body, "<p class=\"{}\">{}</p>", class, escape_html(&notice.message));
    }

    let _ = writeln!(
        body,
        "<form action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\" accept=\"{ext}\">\n\
         <button type=\"submit\">Upload</button>\n\
         <small>{ext} files only, {mb} MB max</small>\n</form>",
        ext = extension,
        mb = page.max_upload_bytes / (1024 * 1024),
    );

    if page.documents.is_empty() {
        let _ = writeln!(body, "<p class=\"empty\">No {} files yet.</p>", extension);
        return Html(layout(page.app_name, &body));
    }

    body.push_str("<table>\n<thead><tr><th>Name</th><th>Modified</th><th>Size</th><th></th></tr></thead>\n<tbody>\n");
    for document in page.documents {
        let encoded = encode_path_segment(&document.name);
        let name = escape_html(&document.name);
        let _ = writeln!(
            body,
            "<tr><td><a href=\"/download/{encoded}\">{name}</a></td><td>{modified}</td><td>{size}</td>\
             <td><form action=\"/delete/{encoded}\" method=\"post\"><button type=\"submit\">Delete</button></form></td></tr>",
            encoded = encoded,
            name = name,
            modified = document.last_modified.format("%Y-%m-%d %H:%M"),
            size = document.human_size(),
        );
    }
    body.push_str("</tbody>\n</table>\n");

    Html(layout(page.app_name, &body))
}

pub fn error_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Bad request",
        StatusCode::NOT_FOUND => "Page not found",
        StatusCode::PAYLOAD_TOO_LARGE => "File too large",
        _ => "Internal server error",
    }
}

pub fn error_page(status: StatusCode) -> Response {
    let code = status.as_u16();
    let body = format!(
        "<h1>{code}</h1>\n<p>{message}</p>\n<p><a href=\"/\">Back to the list</a></p>",
        code = code,
        message = error_message(status),
    );

    (status, Html(layout(&format!("Error {}", code), &body))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn document(name: &str) -> DocumentEntry {
        DocumentEntry {
            name: name.to_string(),
            last_modified: Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap(),
            size_bytes: 2048,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_index_page_lists_documents() {
        let documents = vec![document("My Book.mobi")];
        let notice = Notice::success("File \"My Book.mobi\" uploaded successfully!");

        let Html(html) = index_page(&IndexPage {
            app_name: "Mobi Shelf",
            documents: &documents,
            notice: Some(&notice),
            extension: ".mobi",
            max_upload_bytes: 16 * 1024 * 1024,
        });

        assert!(html.contains("href=\"/download/My%20Book%2Emobi\""));
        assert!(html.contains("action=\"/delete/My%20Book%2Emobi\""));
        assert!(html.contains("2024-03-09 14:30"));
        assert!(html.contains("2.0 KB"));
        assert!(html.contains("notice success"));
        assert!(html.contains("&quot;My Book.mobi&quot;"));
        assert!(html.contains("16 MB max"));
    }

    #[test]
    fn test_index_page_empty() {
        let Html(html) = index_page(&IndexPage {
            app_name: "Mobi Shelf",
            documents: &[],
            notice: None,
            extension: ".mobi",
            max_upload_bytes: 16 * 1024 * 1024,
        });

        assert!(html.contains("No .mobi files yet."));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(error_message(StatusCode::BAD_REQUEST), "Bad request");
        assert_eq!(error_message(StatusCode::NOT_FOUND), "Page not found");
        assert_eq!(error_message(StatusCode::INTERNAL_SERVER_ERROR), "Internal server error");
        assert_eq!(error_page(StatusCode::NOT_FOUND).status(), StatusCode::NOT_FOUND);
    }
}
