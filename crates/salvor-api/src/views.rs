//! Server-rendered pages.
//!
//! Every string that came from a client or from the recovery tool goes
//! through [`escape_html`]; path segments in links are percent-encoded.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use salvor_core::{RecoveredFile, Upload};
use std::collections::HashSet;
use std::fmt::Write;
use uuid::Uuid;

/// Everything except unreserved URL characters
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
table{border-collapse:collapse;width:100%}\
td,th{padding:.4rem;border-bottom:1px solid #ddd;text-align:left}\
form.inline{display:inline}\
.muted{color:#777}";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        title = escape_html(title),
    )
}

/// Home page: upload form plus one row per upload.
///
/// Uploads listed in `recovered` link to their results; the rest offer a
/// recovery link instead.
pub fn render_home(uploads: &[Upload], recovered: &HashSet<Uuid>) -> String {
    let mut body = String::new();
    body.push_str("<h1>Salvor</h1>\n");
    body.push_str(
        "<form action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\">\n\
<input type=\"file\" name=\"file\" required>\n\
<button type=\"submit\">Upload</button>\n</form>\n",
    );

    if uploads.is_empty() {
        body.push_str("<p class=\"muted\">No uploads yet.</p>\n");
        return page("Salvor", &body);
    }

    body.push_str("<table>\n<tr><th>File</th><th>Uploaded</th><th>Status</th><th></th></tr>\n");
    for upload in uploads {
        let id = upload.id;
        let action = if recovered.contains(&id) {
            format!("<a href=\"/results/{id}\">Recovered: view files</a>")
        } else {
            format!("<a href=\"/recover/{id}\">Recover</a>")
        };
        let _ = writeln!(
            body,
            "<tr><td>{name}</td><td>{created}</td><td>{action}</td>\
<td><form class=\"inline\" action=\"/delete/{id}\" method=\"post\">\
<button type=\"submit\">Delete</button></form></td></tr>",
            name = escape_html(&upload.original_filename),
            created = upload.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );
    }
    body.push_str("</table>\n");

    page("Salvor", &body)
}

pub fn render_results(upload_id: Uuid, files: &[RecoveredFile]) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>Recovered files</h1>\n<p class=\"muted\">Upload {upload_id}</p>");

    if files.is_empty() {
        body.push_str("<p>No files recovered.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for file in files {
            let _ = writeln!(
                body,
                "<li><a href=\"/download/{upload_id}/{href}\">{name}</a></li>",
                href = encode_segment(&file.filename),
                name = escape_html(&file.filename),
            );
        }
        body.push_str("</ul>\n");
    }
    body.push_str("<p><a href=\"/\">Back</a></p>\n");

    page("Recovered files", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn upload(name: &str) -> Upload {
        Upload {
            id: Uuid::new_v4(),
            original_filename: name.to_string(),
            file_path: "/data/uploads/x".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<a href=\"x\">'&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn home_marks_recovered_uploads() {
        let pending = upload("card.img");
        let done = upload("<script>.img");
        let recovered: HashSet<Uuid> = [done.id].into_iter().collect();

        let html = render_home(&[pending.clone(), done.clone()], &recovered);

        assert!(html.contains(&format!("/recover/{}", pending.id)));
        assert!(html.contains(&format!("/results/{}", done.id)));
        assert!(!html.contains(&format!("/recover/{}", done.id)));
        assert!(html.contains("&lt;script&gt;.img"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(&format!("action=\"/delete/{}\"", pending.id)));
    }

    #[test]
    fn home_without_uploads_still_has_form() {
        let html = render_home(&[], &HashSet::new());
        assert!(html.contains("name=\"file\""));
        assert!(html.contains("No uploads yet."));
    }

    #[test]
    fn results_links_are_percent_encoded() {
        let id = Uuid::new_v4();
        let file = RecoveredFile {
            id: Uuid::new_v4(),
            upload_id: id,
            filename: "f 1&2.jpg".to_string(),
            file_path: "/data/recovered_files/x/f 1&2.jpg".to_string(),
            created_at: Utc::now(),
        };

        let html = render_results(id, &[file]);

        assert!(html.contains(&format!("/download/{}/f%201%262.jpg", id)));
        assert!(html.contains(">f 1&amp;2.jpg</a>"));
    }
}
