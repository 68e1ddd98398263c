use lettre::{
    Message,
    message::{
        Mailbox, MultiPart,
        header::{Header, HeaderName, HeaderValue},
    },
};
use regex::Regex;

use std::sync::LazyLock;

use super::MailError;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is a valid regex"));

// Elements whose content is never readable text.
static HIDDEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--.*?-->|<style\b[^>]*>.*?</style\s*>|<script\b[^>]*>.*?</script\s*>")
        .expect("hidden element pattern is a valid regex")
});

// `&lt;` and `&gt;` stay encoded so the text never regains markup.
// `&amp;` goes last so `&amp;copy;` does not turn into a symbol.
const ENTITIES: [(&str, &str); 7] = [
    ("&nbsp;", " "),
    ("&copy;", "\u{a9}"),
    ("&#169;", "\u{a9}"),
    ("&quot;", "\""),
    ("&#x27;", "'"),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// A message ready for submission.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from_name: String,
    pub from_email: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone)]
struct XMailer(String);

impl Header for XMailer {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Mailer")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

#[derive(Debug, Clone)]
struct XPriority(u8);

impl Header for XPriority {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Priority")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.trim().parse()?))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.to_string())
    }
}

const NORMAL_PRIORITY: u8 = 3;

fn decode_entities(text: &str) -> String {
    ENTITIES
        .iter()
        .fold(text.to_string(), |text, (entity, plain)| text.replace(entity, plain))
}

/// Plain-text companion of an HTML body: style, script and comment content
/// dropped, tags removed, common entities decoded, blank runs collapsed.
pub fn html_to_text(html: &str) -> String {
    let visible = HIDDEN.replace_all(html, "");
    let stripped = decode_entities(&TAG.replace_all(&visible, ""));
    let mut text = String::with_capacity(stripped.len());
    let mut previous_blank = true;

    for line in stripped.lines() {
        let line = line.trim().replace(['<', '>'], "");
        if line.is_empty() {
            if !previous_blank {
                text.push('\n');
            }
            previous_blank = true;
            continue;
        }
        text.push_str(&line);
        text.push('\n');
        previous_blank = false;
    }

    text.trim_end().to_string()
}

pub fn generate_message_id(sender: &str) -> String {
    let domain = sender
        .rsplit_once('@')
        .map_or("localhost", |(_, domain)| domain.trim());
    format!("<{}@{}>", uuid::Uuid::new_v4(), domain)
}

pub fn build_message(
    email: &OutgoingEmail,
    message_id: &str,
    mailer_name: &str,
) -> Result<Message, MailError> {
    let from = Mailbox::new(
        Some(email.from_name.trim().to_string()),
        email.from_email.trim().parse()?,
    );
    let to: Mailbox = email.to.trim().parse()?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.clone())
        .message_id(Some(message_id.to_string()))
        .header(XMailer(mailer_name.to_string()))
        .header(XPriority(NORMAL_PRIORITY))
        .multipart(MultiPart::alternative_plain_html(
            html_to_text(&email.html),
            email.html.clone(),
        ))?;

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outgoing(html: &str) -> OutgoingEmail {
        OutgoingEmail {
            from_name: "Lee".to_string(),
            from_email: "lee@vidpace.com".to_string(),
            to: "ana@example.com".to_string(),
            subject: "Quick meeting".to_string(),
            html: html.to_string(),
        }
    }

    #[test]
    fn text_companion_has_no_markup() {
        let text = html_to_text(
            "<html><body><p>Hi Ana,</p>\n\n\n<p>This is <b>Lee</b>.</p><br/>3 > 2 < 4</body></html>",
        );

        assert!(!text.contains('<'));
        assert!(!text.contains('>'));
        assert!(text.contains("Hi Ana,"));
        assert!(text.contains("This is Lee."));
    }

    #[test]
    fn text_companion_of_rendered_template_is_readable() {
        let html = crate::template::render_email(&crate::dto::TemplateRequest {
            recipient_name: "Ana".to_string(),
            sender_name: "Lee".to_string(),
            message_body: "Hello".to_string(),
        })
        .unwrap();

        let text = html_to_text(&html);

        assert!(!text.contains('<') && !text.contains('>'));
        assert!(text.contains("Hi Ana,"));
        assert!(text.contains("Schedule A Quick Meeting"));
        assert!(!text.contains("\n\n\n"));
        assert!(!text.contains("font-family"));
        assert!(!text.contains("&copy;"));
        assert!(text.contains("\u{a9} "));
        assert!(text.contains("Vidpace. All rights reserved."));
    }

    #[test]
    fn text_companion_drops_hidden_content_and_decodes_entities() {
        let text = html_to_text(
            "<style>p { color: red; }</style><!-- note --><script>alert(1)</script>\
             <p>Tom &amp; Jerry&nbsp;say &quot;hi&quot; &#x27;there&#x27; 3 &lt; 4</p>",
        );

        assert_eq!(text, "Tom & Jerry say \"hi\" 'there' 3 &lt; 4");
    }

    #[test]
    fn message_id_uses_sender_domain() {
        let id = generate_message_id("lee@vidpace.com");
        assert!(id.starts_with('<'));
        assert!(id.ends_with("@vidpace.com>"));
    }

    #[test]
    fn built_message_carries_headers_and_both_bodies() {
        let message = build_message(
            &outgoing("<p>Hello Ana</p>"),
            "<abc@vidpace.com>",
            "Vidpace Email Sender v1.0",
        )
        .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("X-Mailer: Vidpace Email Sender v1.0"));
        assert!(raw.contains("X-Priority: 3"));
        assert!(raw.contains("Message-ID: <abc@vidpace.com>"));
        assert!(raw.contains("lee@vidpace.com"));
        assert!(raw.contains("ana@example.com"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn envelope_lists_the_recipient() {
        let message = build_message(&outgoing("<p>Hi</p>"), "<x@vidpace.com>", "m").unwrap();
        let recipients: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(recipients, vec!["ana@example.com".to_string()]);
    }

    #[test]
    fn malformed_recipient_is_an_address_error() {
        let mut email = outgoing("<p>Hi</p>");
        email.to = "nobody".to_string();

        let err = build_message(&email, "<x@vidpace.com>", "m").unwrap_err();
        assert!(matches!(err, MailError::AddressFormat(_)));
    }
}
