//! HTML rendering for printable event collateral.
//!
//! Two documents are supported: a sheet of lanyard badges (one per
//! attendee) and an A4 programme built from the event's front-page HTML.
//! The HTML is handed to a PDF renderer by the API layer.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

/// Paragraph used when an event has no front-page HTML.
pub const EMPTY_PROGRAMME_HTML: &str = "<p>No specific html programme provided.</p>";

/// Which printable document to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollateralKind {
    Lanyards,
    Programme,
}

impl fmt::Display for CollateralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollateralKind::Lanyards => write!(f, "lanyards"),
            CollateralKind::Programme => write!(f, "programme"),
        }
    }
}

/// Which optional lines to print on each badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeOptions {
    pub include_role: bool,
    pub include_company: bool,
}

impl Default for BadgeOptions {
    fn default() -> Self {
        Self {
            include_role: true,
            include_company: true,
        }
    }
}

/// Event fields printed on collateral.
#[derive(Debug, Clone, Copy)]
pub struct EventSheet<'a> {
    pub title: &'a str,
    pub date: &'a str,
    pub location: &'a str,
    /// Organizer-authored HTML, inserted verbatim into the programme.
    pub front_page_html: Option<&'a str>,
}

/// One attendee badge.
#[derive(Debug, Clone, Copy)]
pub struct Badge<'a> {
    pub name: &'a str,
    pub role: &'a str,
    pub company: &'a str,
}

/// Download file name for a rendered document, e.g. `devweek-lanyards.pdf`.
pub fn file_name(slug: &str, kind: CollateralKind) -> String {
    format!("{slug}-{kind}.pdf")
}

/// Render the HTML for `kind`.
pub fn render(
    kind: CollateralKind,
    event: &EventSheet<'_>,
    badges: &[Badge<'_>],
    options: BadgeOptions,
) -> String {
    match kind {
        CollateralKind::Lanyards => render_lanyards(event, badges, options),
        CollateralKind::Programme => render_programme(event),
    }
}

/// Render a sheet of 3.5in x 2.2in badges.
pub fn render_lanyards(event: &EventSheet<'_>, badges: &[Badge<'_>], options: BadgeOptions) -> String {
    let title = escape_html(event.title);
    let mut cards = String::new();

    for badge in badges {
        let _ = write!(
            cards,
            r#"<div style="width: 3.5in; height: 2.2in; border: 1px solid #ccc; margin: 10px; display: inline-block; text-align: center; font-family: sans-serif; box-sizing: border-box; padding: 20px;">
<h2 style="margin: 0 0 10px 0; color: #1e40af; font-size: 24px;">{}</h2>"#,
            escape_html(badge.name)
        );
        if options.include_role {
            let _ = write!(
                cards,
                r#"<p style="margin: 5px 0; color: #374151; font-size: 16px;">{}</p>"#,
                escape_html(badge.role)
            );
        }
        if options.include_company {
            let _ = write!(
                cards,
                r#"<p style="margin: 5px 0; color: #6b7280; font-size: 14px;">{}</p>"#,
                escape_html(badge.company)
            );
        }
        let _ = write!(
            cards,
            r#"<div style="margin-top: 20px; font-size: 12px; color: #9ca3af; text-transform: uppercase;">{title}</div>
</div>
"#
        );
    }

    format!(
        r#"<html>
<head><title>Lanyards</title></head>
<body style="margin: 0; padding: 20px;">
<div style="display: flex; flex-wrap: wrap;">
{cards}</div>
</body>
</html>
"#
    )
}

/// Render an A4 programme page.
pub fn render_programme(event: &EventSheet<'_>) -> String {
    let content = event
        .front_page_html
        .filter(|html| !html.trim().is_empty())
        .unwrap_or(EMPTY_PROGRAMME_HTML);

    format!(
        r#"<html>
<head>
<title>Event Programme</title>
<style>
body {{ font-family: Arial, sans-serif; padding: 40px; color: #111827; }}
h1 {{ color: #2563eb; border-bottom: 2px solid #e5e7eb; padding-bottom: 10px; }}
.info {{ margin-bottom: 30px; color: #4b5563; }}
.content {{ line-height: 1.6; }}
</style>
</head>
<body>
<h1>{title}</h1>
<div class="info">
<p><strong>Date:</strong> {date}</p>
<p><strong>Location:</strong> {location}</p>
</div>
<div class="content">
{content}
</div>
</body>
</html>
"#,
        title = escape_html(event.title),
        date = escape_html(event.date),
        location = escape_html(event.location),
    )
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
