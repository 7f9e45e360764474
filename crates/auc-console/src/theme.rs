use ratatui::style::{Color, Modifier, Style};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
pub const TAB_ACTIVE_STYLE: Style = Style::new()
    .fg(Color::Rgb(250, 189, 47))
    .add_modifier(Modifier::BOLD);
pub const TAB_INACTIVE_STYLE: Style = Style::new().fg(Color::Rgb(146, 131, 116));
pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(131, 165, 152))
    .fg(Color::Black)
    .add_modifier(Modifier::BOLD);
pub const DIM_STYLE: Style = Style::new().fg(Color::Rgb(146, 131, 116));
pub const FIELD_FOCUS_STYLE: Style = Style::new()
    .fg(Color::Rgb(250, 189, 47))
    .add_modifier(Modifier::BOLD);

pub fn zebra_row_style(index: usize) -> Style {
    let bg = if index % 2 == 0 {
        Color::Rgb(18, 20, 26)
    } else {
        Color::Rgb(24, 27, 34)
    };
    Style::new().bg(bg)
}

pub fn connection_color(online: bool, connecting: bool) -> Color {
    if online {
        Color::Rgb(184, 187, 38)
    } else if connecting {
        Color::Rgb(250, 189, 47)
    } else {
        Color::Rgb(214, 93, 14)
    }
}

pub fn collector_status_color(status: &str) -> Color {
    match status.to_lowercase().as_str() {
        "running" => Color::Rgb(131, 165, 152),
        "completed" | "idle" => Color::Rgb(184, 187, 38),
        "error" | "failed" => Color::Rgb(214, 93, 14),
        "disabled" => Color::Rgb(146, 131, 116),
        _ => Color::Rgb(168, 153, 132),
    }
}

pub fn log_level_color(level: &str) -> Color {
    match level.to_uppercase().as_str() {
        "ERROR" => Color::Rgb(214, 93, 14),
        "WARN" => Color::Rgb(250, 189, 47),
        "INFO" => Color::Rgb(131, 165, 152),
        "DEBUG" => Color::Rgb(146, 131, 116),
        _ => Color::Rgb(168, 153, 132),
    }
}

pub fn notice_style(is_error: bool) -> Style {
    let fg = if is_error {
        Color::Rgb(214, 93, 14)
    } else {
        Color::Rgb(184, 187, 38)
    };
    Style::new().fg(fg).add_modifier(Modifier::BOLD)
}
