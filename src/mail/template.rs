//! Plain-text and HTML rendering of a submission.

use crate::config::OriginConfig;
use crate::mail::form::ContactFormData;

/// Escape `&`, `<`, `>` and `"` for interpolation into HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn subject(origin: &OriginConfig) -> String {
    format!("New contact form submission from {}", origin.name)
}

pub fn render_text(form: &ContactFormData) -> String {
    let mut body = format!("Name: {}\nEmail: {}\n", form.name, form.email);
    if let Some(phone) = &form.phone {
        body.push_str(&format!("Phone: {phone}\n"));
    }
    body.push_str(&format!("\nMessage:\n{}\n", form.message));
    body
}

pub fn render_html(form: &ContactFormData, origin: &OriginConfig) -> String {
    let mut body = format!(
        "<h2>New contact form submission from {}</h2>\n\
         <p><strong>Name:</strong> {}</p>\n\
         <p><strong>Email:</strong> {}</p>\n",
        escape_html(&origin.name),
        escape_html(&form.name),
        escape_html(&form.email),
    );
    if let Some(phone) = &form.phone {
        body.push_str(&format!("<p><strong>Phone:</strong> {}</p>\n", escape_html(phone)));
    }
    let message = escape_html(&form.message)
        .replace("\r\n", "\n")
        .replace('\n', "<br>");
    body.push_str(&format!("<p><strong>Message:</strong></p>\n<p>{message}</p>\n"));
    body
}
