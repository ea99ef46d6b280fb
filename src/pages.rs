//! Server-rendered HTML pages. Plain string templates; everything
//! user-supplied goes through [`escape`].

use crate::model::StoredMessage;
use std::collections::BTreeMap;

pub fn escape(input: &str) -> String {
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

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"/static/style.css\">\n\
         </head>\n<body>\n<main>\n{body}\n</main>\n</body>\n</html>\n"
    )
}

/// Start page: get a new code, or enter one you were given.
pub fn start_page(error: Option<&str>) -> String {
    let error_html = match error {
        Some(msg) => format!("<p class=\"error\">{}</p>\n", escape(msg)),
        None => String::new(),
    };
    let body = format!(
        "<h1>Whisperbox</h1>\n{error_html}\
         <p><a class=\"button\" href=\"/new-code\">Get my code</a></p>\n\
         <form method=\"post\" action=\"/login\">\n\
         <label for=\"user-code\">Already have a code?</label>\n\
         <input id=\"user-code\" name=\"user-code\" maxlength=\"4\" \
         placeholder=\"AB12\" required>\n\
         <button type=\"submit\">Continue</button>\n\
         </form>"
    );
    layout("Whisperbox", &body)
}

/// Shown after issuing a code and on the submission page for a valid code.
pub fn submit_page(code: &str) -> String {
    let code = escape(code);
    let body = format!(
        "<h1>Code: <strong>{code}</strong></h1>\n\
         <p>Share this code so others can message you anonymously.</p>\n\
         <form method=\"post\" action=\"/submit-message\">\n\
         <input type=\"hidden\" name=\"user-code\" value=\"{code}\">\n\
         <textarea name=\"anon-message\" rows=\"6\" \
         placeholder=\"Write your anonymous message...\" required></textarea>\n\
         <label for=\"sensitivity\">Sensitivity</label>\n\
         <select id=\"sensitivity\" name=\"sensitivity\">\n\
         <option value=\"normal\">Normal</option>\n\
         <option value=\"low\">Low</option>\n\
         <option value=\"high\">High</option>\n\
         </select>\n\
         <label for=\"delivery\">Delivery</label>\n\
         <select id=\"delivery\" name=\"delivery\">\n\
         <option value=\"immediate\">Immediate</option>\n\
         <option value=\"team\">Team</option>\n\
         <option value=\"private\">Private</option>\n\
         </select>\n\
         <button type=\"submit\">Send anonymously</button>\n\
         </form>"
    );
    layout("Submit a message", &body)
}

/// Shown after a successful submission.
pub fn success_page(code: &str) -> String {
    let body = format!(
        "<h1>Message sent</h1>\n\
         <p>Your anonymous message for <strong>{}</strong> was delivered. \
         Thank you.</p>\n\
         <p><a href=\"/\">Back to start</a></p>",
        escape(code)
    );
    layout("Message sent", &body)
}

/// All codes with their messages; codes arrive pre-sorted from the store.
pub fn messages_page(grouped: &BTreeMap<String, Vec<StoredMessage>>) -> String {
    let mut body = String::from("<h1>All messages</h1>\n");
    if grouped.is_empty() {
        body.push_str("<p>No codes issued yet.</p>");
    }
    for (code, messages) in grouped {
        body.push_str(&format!("<section>\n<h2>{}</h2>\n", escape(code)));
        if messages.is_empty() {
            body.push_str("<p class=\"muted\">No messages yet.</p>\n");
        } else {
            body.push_str("<ul>\n");
            for m in messages {
                body.push_str(&format!(
                    "<li><p>{}</p>\
                     <p class=\"muted\">sensitivity: {} · delivery: {} · {}</p></li>\n",
                    escape(&m.message),
                    escape(&m.sensitivity),
                    escape(&m.delivery),
                    m.timestamp_utc.to_rfc3339(),
                ));
            }
            body.push_str("</ul>\n");
        }
        body.push_str("</section>\n");
    }
    layout("All messages", &body)
}

pub fn error_page() -> String {
    layout(
        "Something went wrong",
        "<h1>Something went wrong</h1>\n\
         <p>That code doesn't exist. Check it and try again, or \
         <a href=\"/new-code\">get a new one</a>.</p>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape("<script>alert(\"hi\") & 'bye'</script>"),
            "&lt;script&gt;alert(&quot;hi&quot;) &amp; &#39;bye&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn submitted_text_is_escaped_in_listing() {
        let mut grouped = BTreeMap::new();
        grouped.insert(
            "AB12".to_string(),
            vec![StoredMessage {
                message: "<b>bold</b>".to_string(),
                sensitivity: "low".to_string(),
                delivery: "immediate".to_string(),
                timestamp_utc: chrono::Utc::now(),
            }],
        );
        let html = messages_page(&grouped);
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(!html.contains("<b>bold</b>"));
    }
}
