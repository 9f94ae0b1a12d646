//! Minimal TwiML replies.
//!
//! Only the `<Response><Message>` shape is needed: every webhook answer is
//! a single text message back to the sender.

use std::borrow::Cow;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

pub const TWIML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Body of every failed webhook reply.
pub const FAILURE_MESSAGE: &str = "Oops! Something went wrong";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Twiml {
    message: String,
}

impl Twiml {
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            message: text.into(),
        }
    }

    pub fn failure() -> Self {
        Self::message(FAILURE_MESSAGE)
    }

    pub fn to_xml(&self) -> String {
        format!(
            "<Response><Message>{}</Message></Response>",
            escape_xml(&self.message)
        )
    }
}

impl IntoResponse for Twiml {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TWIML_CONTENT_TYPE)],
            self.to_xml(),
        )
            .into_response()
    }
}

/// Escape the five XML special characters. Borrows when there is nothing to do.
pub fn escape_xml(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_message_is_not_rewritten() {
        let twiml = Twiml::message("Got your text and saved it!");
        assert_eq!(
            twiml.to_xml(),
            "<Response><Message>Got your text and saved it!</Message></Response>"
        );
        assert!(matches!(escape_xml("whatsapp-media/1-+1555.pdf"), Cow::Borrowed(_)));
    }

    #[test]
    fn special_characters_are_escaped() {
        assert_eq!(
            escape_xml(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &apos;Jerry&apos;&lt;/a&gt;"
        );
    }

    #[test]
    fn response_is_xml_with_200() {
        let res = Twiml::failure().into_response();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            TWIML_CONTENT_TYPE
        );
    }
}
