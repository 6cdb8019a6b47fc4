use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::{App, ChatRole, InputMode, SUGGESTIONS};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, suggestions_area, chat_area, input_area, footer_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(6),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

    render_header(app, frame, header_area);
    render_suggestions(app, frame, suggestions_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut title = vec![
        Span::styled(
            " Botica medicines assistant ",
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Black),
        ),
    ];

    if app.loading {
        title.push(Span::styled(
            "  Waiting for response",
            Style::default().fg(Color::Yellow),
        ));
    }

    let header = Paragraph::new(Line::from(title)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_suggestions(app: &mut App, frame: &mut Frame, area: Rect) {
    let columns = Layout::horizontal([Constraint::Percentage(25); 4]).split(area);

    // Store card areas for mouse hit-testing
    app.suggestion_areas = columns.to_vec();

    for (i, (suggestion, card_area)) in SUGGESTIONS.iter().zip(columns.iter()).enumerate() {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} {} ", i + 1, suggestion.title));

        let body = Text::from(vec![
            Line::from(suggestion.icon),
            Line::from(Span::styled(
                suggestion.text,
                Style::default().fg(Color::DarkGray),
            )),
        ]);

        let card = Paragraph::new(body).block(block).wrap(Wrap { trim: true });
        frame.render_widget(card, *card_area);
    }
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store chat area and inner dimensions for mouse hit-testing and
    // scroll calculations (inner size minus borders)
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let chat_text = if app.messages.is_empty() && !app.loading {
        Text::from(Span::styled(
            "No messages yet.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for message in &app.messages {
            match message.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "Assistant:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                }
            }
            for line in message.content.lines() {
                lines.push(Line::from(line.to_string()));
            }
            lines.push(Line::default());
        }

        if app.loading {
            lines.push(Line::from(Span::styled(
                "Assistant:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Waiting for response{}", dots),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);

    if app.show_scroll_top() {
        render_scroll_top_badge(frame, area);
    }
}

/// Small overlay in the chat corner once the log is scrolled down.
fn render_scroll_top_badge(frame: &mut Frame, chat_area: Rect) {
    let label = " ↑ top (g) ";
    let width = label.chars().count() as u16;
    if chat_area.width <= width + 2 {
        return;
    }

    let badge_area = Rect::new(chat_area.right() - width - 2, chat_area.y, width, 1);
    let badge = Paragraph::new(Span::styled(
        label,
        Style::default().bg(Color::Blue).fg(Color::White),
    ));
    frame.render_widget(badge, badge_area);
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let title = if app.listening {
        " Listening... "
    } else if app.loading {
        " Waiting for response "
    } else {
        " Message (Enter to send) "
    };

    // Sends are blocked while a request is pending; a dim border mirrors
    // the disabled affordance
    let border_color = if app.loading {
        Color::DarkGray
    } else if app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor visible for long drafts.
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    if app.input_mode == InputMode::Editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" keys ", label_style),
        ],
        InputMode::Normal => {
            let mut hints = vec![
                Span::styled(" i ", key_style),
                Span::styled(" write ", label_style),
                Span::styled(" 1-4 ", key_style),
                Span::styled(" prompts ", label_style),
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" g ", key_style),
                Span::styled(" top ", label_style),
            ];
            if app.config.copy_enabled() {
                hints.extend(vec![
                    Span::styled(" c ", key_style),
                    Span::styled(" copy ", label_style),
                ]);
            }
            if app.config.voice_enabled() && app.dictation.is_available() {
                hints.extend(vec![
                    Span::styled(" v ", key_style),
                    Span::styled(" voice ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
    };

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}
