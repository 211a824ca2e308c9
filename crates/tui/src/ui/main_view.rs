//! Top-level layout: the form on the left, the draft summary on the right,
//! key hints along the bottom. The focused field's suggestion list is drawn
//! last so it overlays whatever sits below the field.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
};

use crate::{
    app::App,
    form::{FormField, HorseDraft},
    ui::theme::{
        Theme,
        theme_helpers::{block, title},
    },
};

const FIELD_HEIGHT: u16 = 3;
const HINTS: &str = "Tab/Shift+Tab move · ↑/↓ choose · Enter accept · Esc revert · Ctrl+R reset · Ctrl+L lock · Ctrl+Q quit";

pub fn draw(frame: &mut Frame, app: &App) {
    let theme = app.theme.as_ref();
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme.roles().background)), area);

    let [body, hints] = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
    let [form_area, draft_area] = Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(body);

    let rows = Layout::vertical([
        Constraint::Length(FIELD_HEIGHT),
        Constraint::Length(FIELD_HEIGHT),
        Constraint::Length(FIELD_HEIGHT),
        Constraint::Length(FIELD_HEIGHT),
        Constraint::Min(0),
    ])
    .split(form_area);

    let form = &app.form;
    let focus = form.focus();
    let throbber = app.throbber_idx;
    form.owner().render(frame, rows[0], theme, focus == FormField::Owner, throbber);
    form.mother().render(frame, rows[1], theme, focus == FormField::Mother, throbber);
    form.father().render(frame, rows[2], theme, focus == FormField::Father, throbber);
    form.description().render(frame, rows[3], theme, focus == FormField::Description, throbber);

    render_draft(frame, draft_area, theme, app, &form.draft());
    frame.render_widget(Paragraph::new(Span::styled(HINTS, theme.text_muted_style())), hints);

    match focus {
        FormField::Owner => form.owner().render_suggestions(frame, rows[0], form_area, theme),
        FormField::Mother => form.mother().render_suggestions(frame, rows[1], form_area, theme),
        FormField::Father => form.father().render_suggestions(frame, rows[2], form_area, theme),
        FormField::Description => form.description().render_suggestions(frame, rows[3], form_area, theme),
    }
}

fn render_draft(frame: &mut Frame, area: Rect, theme: &dyn Theme, app: &App, draft: &HorseDraft) {
    let value_or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    let row = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<12}"), theme.text_secondary_style()),
            Span::styled(value, theme.text_primary_style()),
        ])
    };

    let touched = if draft.touched.is_empty() {
        "-".to_string()
    } else {
        draft.touched.iter().map(|field| field.label()).collect::<Vec<_>>().join(", ")
    };
    let (status, status_style) = if app.form.locked() {
        ("locked", theme.status_warning())
    } else if app.form.is_valid() {
        ("valid", theme.status_success())
    } else {
        ("unmatched input", theme.status_error())
    };

    let lines = vec![
        row("Owner", value_or_dash(draft.owner.as_ref().map(|owner| owner.full_name()))),
        row("Mother", value_or_dash(draft.mother.as_ref().map(|horse| horse.name.clone()))),
        row("Father", value_or_dash(draft.father.as_ref().map(|horse| horse.name.clone()))),
        row("Description", value_or_dash(draft.description.clone())),
        Line::default(),
        row("Touched", touched),
        row("Changes", draft.changes.to_string()),
        Line::from(vec![
            Span::styled(format!("{:<12}", "Status"), theme.text_secondary_style()),
            Span::styled(status, status_style),
        ]),
        Line::default(),
        Line::from(Span::styled(
            format!(
                "{} owners, {} horses on file",
                app.registry().owners().count(),
                app.registry().horses().count()
            ),
            theme.text_muted_style(),
        )),
    ];

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(block(theme, Line::from(title(theme, " Draft ")), false, false));
    frame.render_widget(panel, area);
}
