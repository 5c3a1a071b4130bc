use crate::models::ResourceItem;
use crate::render::{ActionBindings, ItemAction, Notice, NoticeLevel, RenderAdapter};
use crate::resource::ResourceKind;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::io::Write;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
enum Format {
    Plain,
    Timestamp,
    YesNo,
}

fn detail_fields(kind: ResourceKind) -> &'static [(&'static str, &'static str, Format)] {
    match kind {
        ResourceKind::Habit => &[
            ("Description", "description", Format::Plain),
            ("Created At", "created_at", Format::Timestamp),
        ],
        ResourceKind::Goal => &[
            ("Description", "description", Format::Plain),
            ("Deadline", "deadline", Format::Timestamp),
            ("Created At", "created_at", Format::Timestamp),
        ],
        ResourceKind::Achievement => &[
            ("Description", "description", Format::Plain),
            ("Date", "date", Format::Timestamp),
        ],
        ResourceKind::Notification => &[
            ("Scheduled At", "scheduled_at", Format::Timestamp),
            ("Is Sent", "is_sent", Format::YesNo),
        ],
        ResourceKind::User => &[
            ("Email", "email", Format::Plain),
            ("Created At", "created_at", Format::Timestamp),
        ],
    }
}

fn field_text(item: &ResourceItem, field: &str, format: Format) -> String {
    match format {
        Format::Plain => item.text(field).unwrap_or_else(|| "-".to_string()),
        Format::Timestamp => item
            .text(field)
            .map(|raw| format_timestamp(&raw))
            .unwrap_or_else(|| "No Date".to_string()),
        Format::YesNo => match item.get(field) {
            Some(Value::Bool(true)) => "Yes".to_string(),
            _ => "No".to_string(),
        },
    }
}

/// Renders backend timestamps as `YYYY-MM-DD HH:MM`; unknown shapes pass through.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.naive_local().format("%Y-%m-%d %H:%M").to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, pattern) {
            return parsed.format("%Y-%m-%d %H:%M").to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.to_string();
    }
    raw.to_string()
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn render_card(kind: ResourceKind, item: &ResourceItem, bindings: ActionBindings<'_>) -> String {
    let title = item
        .text(kind.title_field())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| "No Title".to_string());

    let details: String = detail_fields(kind)
        .iter()
        .map(|(label, field, format)| {
            format!(
                "    <p><strong>{label}:</strong> {}</p>\n",
                escape_html(&field_text(item, field, *format))
            )
        })
        .collect();

    let mut actions = String::new();
    if let Some(ItemAction::Edit(id)) = bindings.on_edit(item) {
        actions.push_str(&format!(
            r#"<button class="edit" data-action="edit" data-id="{}">Edit</button>"#,
            escape_html(&id.to_string())
        ));
    }
    if let Some(ItemAction::Delete(id)) = bindings.on_delete(item) {
        actions.push_str(&format!(
            r#"<button class="delete" data-action="delete" data-id="{}">Delete</button>"#,
            escape_html(&id.to_string())
        ));
    }

    CARD_HTML
        .replace("{{KIND}}", kind.path())
        .replace("{{TITLE}}", &escape_html(&title))
        .replace("{{DETAILS}}", &details)
        .replace("{{ACTIONS}}", &actions)
}

pub fn render_list(kind: ResourceKind, items: &[ResourceItem], bindings: ActionBindings<'_>) -> String {
    if items.is_empty() {
        return format!("<p>No {} found.</p>\n", kind.path());
    }
    items
        .iter()
        .map(|item| render_card(kind, item, bindings))
        .collect()
}

const CARD_HTML: &str = r#"<div class="card" data-kind="{{KIND}}">
    <h3>{{TITLE}}</h3>
{{DETAILS}}    <div class="card-actions">{{ACTIONS}}</div>
</div>
"#;

/// Keeps the latest rendered container markup, for pages that splice it into the DOM.
#[derive(Debug)]
pub struct HtmlCardRenderer {
    kind: ResourceKind,
    html: String,
    notices: Vec<Notice>,
}

impl HtmlCardRenderer {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            html: String::new(),
            notices: Vec::new(),
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }
}

impl RenderAdapter for HtmlCardRenderer {
    fn render(&mut self, items: &[ResourceItem], bindings: ActionBindings<'_>) {
        self.html = render_list(self.kind, items, bindings);
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}

/// Line-oriented renderer for terminals.
pub struct TextRenderer<W: Write> {
    kind: ResourceKind,
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(kind: ResourceKind, out: W) -> Self {
        Self { kind, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_items(&mut self, items: &[ResourceItem], bindings: ActionBindings<'_>) -> std::io::Result<()> {
        if items.is_empty() {
            writeln!(self.out, "No {} found.", self.kind.path())?;
            return Ok(());
        }
        for item in items {
            let title = item
                .text(self.kind.title_field())
                .unwrap_or_else(|| "No Title".to_string());
            match bindings.on_edit(item) {
                Some(ItemAction::Edit(id)) => writeln!(self.out, "[{id}] {title}")?,
                _ => writeln!(self.out, "[-] {title}")?,
            }
            for (label, field, format) in detail_fields(self.kind) {
                writeln!(self.out, "    {label}: {}", field_text(item, field, *format))?;
            }
        }
        Ok(())
    }
}

impl<W: Write> RenderAdapter for TextRenderer<W> {
    fn render(&mut self, items: &[ResourceItem], bindings: ActionBindings<'_>) {
        if let Err(err) = self.write_items(items, bindings).and_then(|_| self.out.flush()) {
            warn!("failed to write list: {err}");
        }
    }

    fn notify(&mut self, notice: &Notice) {
        let prefix = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Failure => "error",
        };
        if let Err(err) = writeln!(self.out, "{prefix}: {}", notice.message) {
            warn!("failed to write notice: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> ResourceItem {
        ResourceItem::new()
            .with("id", 4)
            .with("message", "Drink <water>")
            .with("scheduled_at", "2026-01-05T08:30:00Z")
            .with("is_sent", true)
    }

    #[test]
    fn card_escapes_and_formats_fields() {
        let html = render_card(ResourceKind::Notification, &notification(), ActionBindings::new("id"));
        assert!(html.contains("<h3>Drink &lt;water&gt;</h3>"), "{html}");
        assert!(html.contains("<strong>Scheduled At:</strong> 2026-01-05 08:30"), "{html}");
        assert!(html.contains("<strong>Is Sent:</strong> Yes"), "{html}");
        assert!(html.contains(r#"data-action="delete" data-id="4""#), "{html}");
    }

    #[test]
    fn card_without_identifier_has_no_actions() {
        let item = ResourceItem::new().with("name", "Read");
        let html = render_card(ResourceKind::Habit, &item, ActionBindings::new("id"));
        assert!(html.contains(r#"<div class="card-actions"></div>"#), "{html}");
    }

    #[test]
    fn empty_list_renders_placeholder() {
        let mut renderer = HtmlCardRenderer::new(ResourceKind::Habit);
        renderer.render(&[], ActionBindings::new("id"));
        assert_eq!(renderer.html(), "<p>No habits found.</p>\n");
    }

    #[test]
    fn timestamps_in_known_shapes_are_normalized() {
        assert_eq!(format_timestamp("2026-01-05 08:30:12"), "2026-01-05 08:30");
        assert_eq!(format_timestamp("2026-01-05T08:30"), "2026-01-05 08:30");
        assert_eq!(format_timestamp("2026-01-05"), "2026-01-05");
        assert_eq!(format_timestamp("tomorrow"), "tomorrow");
    }

    #[test]
    fn text_renderer_lists_identifiers_and_notices() {
        let mut renderer = TextRenderer::new(ResourceKind::Habit, Vec::new());
        let item = ResourceItem::new()
            .with("id", 1)
            .with("name", "Read")
            .with("description", "daily");
        renderer.render(&[item], ActionBindings::new("id"));
        renderer.notify(&Notice::failure("boom"));

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(out.starts_with("[1] Read\n    Description: daily\n"), "{out}");
        assert!(out.ends_with("error: boom\n"), "{out}");
    }

    #[test]
    fn help_text_is_written_through_the_renderer() {
        let mut renderer = TextRenderer::new(ResourceKind::Goal, Vec::new());
        renderer.notify(&Notice::success(crate::console::HELP));

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(out.starts_with("ok: commands: next"), "{out}");
        assert!(out.contains("passwd OLD NEW"), "{out}");
    }
}
