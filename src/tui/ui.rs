use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::app::{App, Mode, LOADING_DETAIL};
use crate::indicators::{DetailState, Status};
use crate::render::{DetailView, SectionBody, Tone, NO_DETAIL};
use crate::report::{
    CategorySection, IndicatorRow, ResultsView, SummaryBar, EMPTY_FAIL_COLUMN, EMPTY_PASS_COLUMN,
    FAIL_HEADING, PASS_HEADING, PLACEHOLDER_NOTE, SUMMARY_TITLE,
};

const FAIL_COLOR: Color = Color::LightRed;
const PASS_COLOR: Color = Color::LightGreen;

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Rose => Color::LightRed,
        Tone::Cyan => Color::Cyan,
        Tone::Amber => Color::Yellow,
        Tone::Emerald => Color::Green,
        Tone::Purple => Color::Magenta,
    }
}

fn token_color(token: &str) -> Color {
    match token {
        "blue" => Color::LightBlue,
        "cyan" => Color::Cyan,
        "purple" => Color::Magenta,
        "orange" => Color::Yellow,
        "green" => Color::Green,
        "red" => Color::Red,
        _ => Color::White,
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let view = app.view();

    draw_header(f, app, chunks[0]);
    draw_summary(f, view.as_ref().map(|v| v.summary).unwrap_or_default(), chunks[1]);

    match &app.mode {
        Mode::Results => match &view {
            Some(view) => draw_results(f, app, view, chunks[2]),
            None => draw_message(f, "ยังไม่มีผลการวิเคราะห์", chunks[2]),
        },
        Mode::Lookup => match &view {
            Some(view) => draw_results(f, app, view, chunks[2]),
            None => draw_message(f, "พิมพ์ชื่อบริษัทหรือเลขทะเบียนนิติบุคคล แล้วกด Enter", chunks[2]),
        },
        Mode::Picking { candidates, selected } => {
            let items: Vec<ListItem> = candidates
                .iter()
                .map(|c| {
                    let name = c.display_name().unwrap_or("-");
                    let reg = c.registration_id.as_deref().unwrap_or("-");
                    ListItem::new(format!("{} — {}", name, reg))
                })
                .collect();
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(" เลือกบริษัท "))
                .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
                .highlight_symbol("› ");
            let mut state = ListState::default();
            state.select(Some(*selected));
            f.render_stateful_widget(list, chunks[2], &mut state);
        }
        Mode::Loading(id) => draw_message(f, &format!("กำลังวิเคราะห์ทะเบียน {}…", id), chunks[2]),
        Mode::NoData(id) => draw_message(
            f,
            &format!("ไม่พบข้อมูลตัวชี้วัดสำหรับทะเบียน {} (กด n เพื่อค้นหาใหม่)", id),
            chunks[2],
        ),
    }

    draw_input(f, app, chunks[3]);

    let help = format!(
        " q/Esc: ออก | f: ตัวกรอง ({}) | ↑/↓: เลือก | Enter: รายละเอียด | n: ค้นหาใหม่ ",
        app.filter
    );
    f.render_widget(Paragraph::new(help).style(Style::default().fg(Color::DarkGray)), chunks[4]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.report {
        Some(report) => Line::from(vec![
            Span::styled(report.company_name().to_string(), bold().fg(Color::Cyan)),
            Span::raw(format!("  ({})", report.registration_id())),
            Span::styled(
                "  รายงานการวิเคราะห์การปฏิบัติตามกฎระเบียบ",
                Style::default().fg(Color::Gray),
            ),
        ]),
        None => Line::from(Span::styled("ClariFind", bold().fg(Color::Cyan))),
    };
    f.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

/// Two-colour proportion bar: fails from the left, passes from the right.
fn draw_summary(f: &mut Frame, summary: SummaryBar, area: Rect) {
    let width = area.width.saturating_sub(2) as usize;
    let fail_cells = (summary.fail_ratio() * width as f64).round() as usize;
    let pass_cells = if summary.displayed() == 0 {
        0
    } else {
        width.saturating_sub(fail_cells)
    };
    let bar = Line::from(vec![
        Span::styled("█".repeat(fail_cells), Style::default().fg(FAIL_COLOR)),
        Span::styled("█".repeat(pass_cells), Style::default().fg(PASS_COLOR)),
    ]);

    let mut labels = Vec::new();
    if let Some(label) = summary.fail_label() {
        labels.push(Span::styled(label, bold().fg(FAIL_COLOR)));
        labels.push(Span::raw("  "));
    }
    if let Some(label) = summary.pass_label() {
        labels.push(Span::styled(label, bold().fg(PASS_COLOR)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", SUMMARY_TITLE))
        .title_bottom(format!(" {} ", summary.description()));
    f.render_widget(Paragraph::new(vec![bar, Line::from(labels)]).block(block), area);
}

fn draw_message(f: &mut Frame, msg: &str, area: Rect) {
    f.render_widget(
        Paragraph::new(msg.to_string())
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn row_item(row: &IndicatorRow) -> ListItem<'static> {
    let color = match row.status {
        Status::Fail => FAIL_COLOR,
        Status::Pass => PASS_COLOR,
    };
    let marker = if row.has_details {
        if row.expanded { " ▲" } else { " ▼" }
    } else {
        ""
    };
    let mut title_style = bold().fg(color);
    if row.highlighted {
        title_style = title_style.add_modifier(Modifier::REVERSED);
    }

    let mut description = vec![Span::styled(
        format!("     {}", row.description),
        Style::default().fg(Color::Gray),
    )];
    if row.placeholder {
        description.push(Span::styled(
            format!(" {}", PLACEHOLDER_NOTE),
            Style::default().fg(FAIL_COLOR),
        ));
    }

    ListItem::new(vec![
        Line::from(vec![
            Span::raw(format!("{:>3}. ", row.display_no)),
            Span::styled(row.title.clone(), title_style),
            Span::raw(marker),
        ]),
        Line::from(Span::raw(format!("     {}", row.name_th))),
        Line::from(description),
    ])
}

/// List items for one section and the item index of each row in it.
fn section_items(
    section: &CategorySection,
    items: &mut Vec<ListItem<'static>>,
    row_items: &mut Vec<usize>,
) {
    let category = section.category;
    items.push(ListItem::new(Line::from(vec![
        Span::styled(
            format!("{} {}", category.icon(), category.name()),
            bold().fg(token_color(category.color())),
        ),
        Span::raw(format!("  {}  ", category.name_th())),
        Span::styled(section.badge_label(), Style::default().fg(Color::DarkGray)),
    ])));

    let columns = [
        (&section.fail_column, FAIL_HEADING, EMPTY_FAIL_COLUMN, FAIL_COLOR),
        (&section.pass_column, PASS_HEADING, EMPTY_PASS_COLUMN, PASS_COLOR),
    ];
    for (column, heading, empty, color) in columns {
        let Some(rows) = column else {
            continue;
        };
        items.push(ListItem::new(Line::from(Span::styled(
            format!("  {} ({})", heading, rows.len()),
            Style::default().fg(color),
        ))));
        if rows.is_empty() {
            items.push(ListItem::new(Line::from(Span::styled(
                format!("     {}", empty),
                Style::default().fg(Color::DarkGray),
            ))));
        }
        for row in rows {
            row_items.push(items.len());
            items.push(row_item(row));
        }
    }
}

fn draw_results(f: &mut Frame, app: &App, view: &ResultsView, area: Rect) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let mut items = Vec::new();
    let mut row_items = Vec::new();
    for section in &view.sections {
        section_items(section, &mut items, &mut row_items);
    }

    let title = if view.complete {
        " ผลการวิเคราะห์ ".to_string()
    } else {
        " กำลังวิเคราะห์… ".to_string()
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("› ");
    let mut state = ListState::default();
    state.select(row_items.get(app.selected).copied());
    f.render_stateful_widget(list, panes[0], &mut state);

    draw_detail_panel(f, app, view, panes[1]);
}

fn detail_lines(detail: &DetailView) -> Vec<Line<'static>> {
    let color = tone_color(detail.tone);
    let mut lines = vec![Line::from(Span::styled(detail.title.clone(), bold().fg(color)))];
    if detail.is_empty() {
        lines.push(Line::from(NO_DETAIL));
        return lines;
    }

    for section in &detail.sections {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(section.label.clone(), bold())));
        match &section.body {
            SectionBody::Text(text) => lines.push(Line::from(format!("  {}", text))),
            SectionBody::List(items) => {
                lines.extend(items.iter().map(|i| Line::from(format!("  • {}", i))));
            }
            SectionBody::Groups(groups) => {
                for (heading, items) in groups {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", heading),
                        Style::default().fg(color),
                    )));
                    lines.extend(items.iter().map(|i| Line::from(format!("    • {}", i))));
                }
            }
            SectionBody::Table { headers, rows } => {
                lines.push(Line::from(Span::styled(
                    format!("  {}", headers.join(" | ")),
                    Style::default().fg(Color::Gray),
                )));
                lines.extend(rows.iter().map(|r| Line::from(format!("  {}", r.join(" | ")))));
            }
        }
    }
    lines
}

fn draw_detail_panel(f: &mut Frame, app: &App, view: &ResultsView, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" รายละเอียด ");
    let Some(row) = view.rows().nth(app.selected).filter(|r| r.expanded) else {
        f.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let lines = match app.detail_state(&row.code) {
        DetailState::Idle | DetailState::Loading => vec![Line::from(LOADING_DETAIL)],
        DetailState::Failed(err) => vec![Line::from(Span::styled(
            format!("ไม่สามารถดึงรายละเอียดได้: {}", err),
            Style::default().fg(FAIL_COLOR),
        ))],
        DetailState::Loaded(resp) => match app.registry.render(&row.code, &resp) {
            Some(detail) => detail_lines(&detail),
            // No rows: the panel stays empty.
            None => Vec::new(),
        },
    };
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let (title, text, color) = match &app.mode {
        Mode::Lookup => (" ค้นหาบริษัท ", app.input.clone(), Color::Cyan),
        _ => (
            " สถานะ ",
            app.toast.clone().or_else(|| app.logs.last().cloned()).unwrap_or_default(),
            Color::Gray,
        ),
    };
    let text = match (&app.mode, &app.toast) {
        (Mode::Lookup, Some(toast)) if app.input.is_empty() => toast.clone(),
        _ => text,
    };
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(color))
            .block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}
