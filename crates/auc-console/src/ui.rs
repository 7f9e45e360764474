use crate::state::{
    App, ConnectionState, NoticeKind, Overlay, Section, UploadForm, UPLOAD_FIELDS,
};
use crate::theme;
use chrono::NaiveDateTime;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, app: &mut App) {
    let area = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(2),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    match app.active_section {
        Section::Dashboard => render_dashboard(f, app, chunks[1]),
        Section::Collectors => render_collectors(f, app, chunks[1]),
        Section::Content => render_content(f, app, chunks[1]),
        Section::Cache => render_cache(f, app, chunks[1]),
        Section::Logs => render_logs(f, app, chunks[1]),
    }
    render_footer(f, app, chunks[2]);

    match &app.overlay {
        Overlay::None => {}
        Overlay::Help => render_help(f, area),
        Overlay::ConfirmClearCache => render_confirm(f, area),
        Overlay::Upload(form) => render_upload(f, form, area),
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(" angel update console ", theme::HEADER_STYLE)];
    for (index, section) in Section::ALL.iter().enumerate() {
        let style = if *section == app.active_section {
            theme::TAB_ACTIVE_STYLE
        } else {
            theme::TAB_INACTIVE_STYLE
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} {}", index + 1, section.title()),
            style,
        ));
    }

    let color = theme::connection_color(
        app.connection == ConnectionState::Open,
        app.connection == ConnectionState::Connecting,
    );
    let status = Line::from(vec![
        Span::styled("\u{25cf} ", Style::default().fg(color)),
        Span::styled(app.connection.label(), Style::default().fg(color)),
        Span::raw(" "),
    ])
    .alignment(Alignment::Right);

    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(Line::from(spans)), inner);
    f.render_widget(Paragraph::new(status), inner);
}

fn render_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(chunks[0]);

    let hit_ratio = app
        .stats
        .cache_hit_ratio
        .map(|ratio| format!("{:.1}%", ratio * 100.0));
    render_stat_card(f, cards[0], "Active Collectors", app.stats.active_collectors.map(fmt_count));
    render_stat_card(f, cards[1], "Total Contents", app.stats.total_contents.map(fmt_count));
    render_stat_card(f, cards[2], "Cache Hit Ratio", hit_ratio);
    render_stat_card(f, cards[3], "Requests / Hour", app.stats.requests_per_hour.map(fmt_count));

    let items: Vec<ListItem> = if app.activity.is_empty() {
        vec![ListItem::new(Span::styled("No recent activity", theme::DIM_STYLE))]
    } else {
        app.activity
            .iter()
            .map(|entry| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<19} ", format_ts(&entry.timestamp)), theme::DIM_STYLE),
                    Span::styled(
                        format!("{:<10} ", entry.kind),
                        Style::default().fg(Color::Rgb(131, 165, 152)),
                    ),
                    Span::styled(
                        entry.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!("  {}", entry.description)),
                ]))
            })
            .collect()
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Recent Activity"));
    f.render_widget(list, chunks[1]);
}

fn render_stat_card(f: &mut Frame, area: Rect, title: &str, value: Option<String>) {
    let text = value.unwrap_or_else(|| "--".to_string());
    let card = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(card, area);
}

fn render_collectors(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Collectors ({})", app.collectors.len()));

    if app.collectors.is_empty() {
        let empty = Paragraph::new(Span::styled("No collectors found", theme::DIM_STYLE))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(["Name", "Type", "Status", "Enabled", "Last Run", "Message"])
        .style(theme::HEADER_STYLE);
    let rows: Vec<Row> = app
        .collectors
        .iter()
        .enumerate()
        .map(|(index, record)| {
            Row::new(vec![
                Cell::from(record.name.clone()),
                Cell::from(record.collector_type.clone()),
                Cell::from(Span::styled(
                    record.status.clone(),
                    Style::default().fg(theme::collector_status_color(&record.status)),
                )),
                Cell::from(if record.enabled { "yes" } else { "no" }),
                Cell::from(format_ts(record.last_run.as_deref().unwrap_or(""))),
                Cell::from(record.message.clone().unwrap_or_default()),
            ])
            .style(theme::zebra_row_style(index))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(20),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(19),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .highlight_style(theme::SELECTED_STYLE)
    .block(block);

    app.collectors_table.select(Some(app.selected_collector));
    f.render_stateful_widget(table, area, &mut app.collectors_table);
}

fn render_content(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Content ({})", app.contents.len()));

    if app.contents.is_empty() {
        let empty = Paragraph::new(Span::styled("No content found", theme::DIM_STYLE)).block(block);
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(["ID", "Type", "Country", "Region", "Status", "Priority", "Published"])
        .style(theme::HEADER_STYLE);
    let rows: Vec<Row> = app
        .contents
        .iter()
        .enumerate()
        .map(|(index, record)| {
            Row::new(vec![
                Cell::from(record.id.to_string()),
                Cell::from(record.content_type.clone()),
                Cell::from(record.country_code.clone()),
                Cell::from(record.region_code.clone().unwrap_or_default()),
                Cell::from(record.status.clone()),
                Cell::from(record.priority.clone().unwrap_or_default()),
                Cell::from(format_ts(record.published_at.as_deref().unwrap_or(""))),
            ])
            .style(theme::zebra_row_style(index))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Min(19),
        ],
    )
    .header(header)
    .highlight_style(theme::SELECTED_STYLE)
    .block(block);

    app.content_table.select(Some(app.selected_content));
    f.render_stateful_widget(table, area, &mut app.content_table);
}

fn render_cache(f: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let caffeine_lines = match &app.cache.caffeine {
        Some(stats) => vec![
            Line::from(format!("Entries:    {}", fmt_count(stats.entries))),
            Line::from(format!("Hit rate:   {:.1}%", stats.hit_rate * 100.0)),
            Line::from(format!("Miss rate:  {:.1}%", stats.miss_rate * 100.0)),
            Line::from(format!("Evictions:  {}", fmt_count(stats.evictions))),
        ],
        None => vec![Line::from(Span::styled("not configured", theme::DIM_STYLE))],
    };
    let redis_lines = match &app.cache.redis {
        Some(stats) => vec![
            Line::from(format!(
                "Connected:  {}",
                if stats.connected { "yes" } else { "no" }
            )),
            Line::from(format!("Keys:       {}", fmt_count(stats.keys))),
            Line::from(format!("Memory:     {}", stats.memory)),
            Line::from(format!("Hits:       {}", fmt_count(stats.hits))),
        ],
        None => vec![Line::from(Span::styled("not configured", theme::DIM_STYLE))],
    };

    let caffeine = Paragraph::new(caffeine_lines)
        .block(Block::default().borders(Borders::ALL).title("Caffeine"));
    let redis =
        Paragraph::new(redis_lines).block(Block::default().borders(Borders::ALL).title("Redis"));
    f.render_widget(caffeine, halves[0]);
    f.render_widget(redis, halves[1]);
}

fn render_logs(f: &mut Frame, app: &App, area: Rect) {
    let title = format!("Logs [{}] ({})", app.log_level, app.logs.len());
    let items: Vec<ListItem> = if app.logs.is_empty() {
        vec![ListItem::new(Span::styled("No log entries", theme::DIM_STYLE))]
    } else {
        app.logs
            .iter()
            .rev()
            .map(|entry| {
                let mut lines = vec![Line::from(vec![
                    Span::styled(format!("{:<19} ", format_ts(&entry.timestamp)), theme::DIM_STYLE),
                    Span::styled(
                        format!("{:<5} ", entry.level),
                        Style::default().fg(theme::log_level_color(&entry.level)),
                    ),
                    Span::styled(format!("{} ", entry.logger), theme::DIM_STYLE),
                    Span::raw(entry.message.clone()),
                ])];
                if let Some(exception) = &entry.exception {
                    lines.push(Line::from(Span::styled(
                        format!("    {exception}"),
                        Style::default().fg(Color::Rgb(214, 93, 14)),
                    )));
                }
                ListItem::new(lines)
            })
            .collect()
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints = match app.active_section {
        Section::Dashboard => "1-5/Tab switch  r refresh  ? help  q quit",
        Section::Collectors => "j/k select  Enter run  e enable/disable  r refresh  ? help  q quit",
        Section::Content => "j/k select  u upload  r refresh  ? help  q quit",
        Section::Cache => "c clear cache  r refresh  ? help  q quit",
        Section::Logs => "f level  r refresh  ? help  q quit",
    };
    let mut lines = vec![Line::from(Span::styled(hints, theme::DIM_STYLE))];
    if let Some(notice) = app.notices.last() {
        lines.insert(
            0,
            Line::from(Span::styled(
                notice.text.clone(),
                theme::notice_style(notice.kind == NoticeKind::Error),
            )),
        );
        lines.truncate(area.height as usize);
    }
    f.render_widget(Paragraph::new(lines), area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(56, 62, area);
    f.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help")
        .border_style(Style::default().fg(Color::Yellow));
    let text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  1-5        jump to a section"),
        Line::from("  Tab / S-Tab  next / previous section"),
        Line::from("  j/k        move selection"),
        Line::from("  r          reload the active section"),
        Line::from(""),
        Line::from("  Enter      run selected collector"),
        Line::from("  e          enable or disable selected collector"),
        Line::from("  u          upload content (Content section)"),
        Line::from("  c          clear cache (Cache section, confirmed)"),
        Line::from("  f          cycle the log level filter"),
        Line::from(""),
        Line::from("  ?          toggle this help"),
        Line::from("  q          quit"),
    ];
    f.render_widget(Paragraph::new(text).block(block), popup);
}

fn render_confirm(f: &mut Frame, area: Rect) {
    let popup = centered_rect(44, 20, area);
    f.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Clear cache")
        .border_style(Style::default().fg(Color::Rgb(214, 93, 14)));
    let text = vec![
        Line::from("Clear all cached entries on the server?"),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", theme::FIELD_FOCUS_STYLE),
            Span::raw(" confirm   "),
            Span::styled("n", theme::FIELD_FOCUS_STYLE),
            Span::raw(" cancel"),
        ]),
    ];
    f.render_widget(
        Paragraph::new(text).wrap(Wrap { trim: true }).block(block),
        popup,
    );
}

fn render_upload(f: &mut Frame, form: &UploadForm, area: Rect) {
    let popup = centered_rect(60, 58, area);
    f.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Upload content")
        .border_style(Style::default().fg(Color::Yellow));

    let mut lines = Vec::with_capacity(UPLOAD_FIELDS.len() + 2);
    for (index, label) in UPLOAD_FIELDS.iter().enumerate() {
        let focused = index == form.focus;
        let marker = if focused { "> " } else { "  " };
        let label_style = if focused {
            theme::FIELD_FOCUS_STYLE
        } else {
            theme::DIM_STYLE
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{label:<14}"), label_style),
            Span::raw(form.field(index).to_string()),
            Span::raw(if focused { "_" } else { "" }),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Tab next field   Enter submit   Esc cancel",
        theme::DIM_STYLE,
    )));
    f.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100u16.saturating_sub(percent_y)) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100u16.saturating_sub(percent_y)) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100u16.saturating_sub(percent_x)) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100u16.saturating_sub(percent_x)) / 2),
        ])
        .split(vertical[1])[1]
}

fn fmt_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 10_000 {
        format!("{:.1}k", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Render a backend timestamp for display. The server serializes Java
/// `LocalDateTime` values, with or without fractional seconds; anything
/// unparseable passes through as-is so odd payloads stay visible.
pub fn format_ts(raw: &str) -> String {
    if raw.is_empty() {
        return "-".to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, pattern) {
            return parsed.format("%Y-%m-%d %H:%M:%S").to_string();
        }
    }
    raw.to_string()
}
