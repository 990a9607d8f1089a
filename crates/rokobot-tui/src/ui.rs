use std::collections::VecDeque;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Sparkline, Wrap},
    Frame,
};
use rokobot_core::{ChatRole, ToastKind, Tweet};

use crate::app::{App, TweetPanel};
use crate::keyboard;

const PRIMARY: Color = Color::Rgb(0x00, 0xFF, 0x9F);
const MUTED: Color = Color::Rgb(0x1E, 0x75, 0x5C);
const BACKGROUND: Color = Color::Rgb(0x03, 0x0E, 0x07);

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(BACKGROUND)), area);

    let [header_area, body_area, deck_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(8),
        Constraint::Length(7),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);

    let [system_area, terminal_area, messages_area] = Layout::horizontal([
        Constraint::Length(26),
        Constraint::Min(20),
        Constraint::Percentage(40),
    ])
    .areas(body_area);

    render_system(app, frame, system_area);
    render_terminal(app, frame, terminal_area);
    render_messages(app, frame, messages_area);

    let [folder_area, keyboard_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
            .areas(deck_area);

    render_audio_folder(app, frame, folder_area);
    render_keyboard(app, frame, keyboard_area);
    render_footer(app, frame, footer_area);
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .title(Span::styled(format!(" {title} "), Style::default().fg(PRIMARY)))
}

fn render_header(frame: &mut Frame, area: Rect) {
    let [left, middle, right] = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .areas(area);

    let style = Style::default().fg(MUTED).add_modifier(Modifier::BOLD);
    frame.render_widget(Paragraph::new(" SYSTEM").style(style), left);
    frame.render_widget(
        Paragraph::new("TERMINAL").style(style).alignment(Alignment::Center),
        middle,
    );
    frame.render_widget(
        Paragraph::new("MESSAGES ").style(style).alignment(Alignment::Right),
        right,
    );
}

fn render_system(app: &App, frame: &mut Frame, area: Rect) {
    let block = panel("SYSTEM");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [status_area, cpu_label, cpu_area, load_label, load_area] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(2),
    ])
    .areas(inner);

    let link = if app.is_loading() {
        Span::styled(
            "RECEIVING",
            Style::default().fg(PRIMARY).add_modifier(Modifier::SLOW_BLINK),
        )
    } else {
        Span::styled("IDLE", Style::default().fg(MUTED))
    };
    let now = chrono::Local::now();
    let lines = vec![
        Line::from(Span::styled(
            now.format("%H : %M : %S").to_string(),
            Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::default(),
        Line::from(vec![
            Span::styled("UPTIME: ", Style::default().fg(MUTED)),
            Span::styled(app.uptime(), Style::default().fg(PRIMARY)),
        ]),
        Line::from(vec![Span::styled("LINK:   ", Style::default().fg(MUTED)), link]),
        Line::from(vec![
            Span::styled("LOG:    ", Style::default().fg(MUTED)),
            Span::styled(
                format!("{} entries", app.store.len()),
                Style::default().fg(PRIMARY),
            ),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), status_area);

    render_chart(frame, "CPU USAGE", &app.cpu_usage, cpu_label, cpu_area);
    render_chart(frame, "SYSTEM LOAD", &app.system_load, load_label, load_area);
}

fn render_chart(
    frame: &mut Frame,
    title: &str,
    samples: &VecDeque<u64>,
    label_area: Rect,
    chart_area: Rect,
) {
    let data: Vec<u64> = samples.iter().copied().collect();
    let avg = match data.len() {
        0 => 0,
        n => data.iter().sum::<u64>() / n as u64,
    };

    let label = Line::from(vec![
        Span::styled(format!("{title}: "), Style::default().fg(PRIMARY).bold()),
        Span::styled(format!("avg {avg}%"), Style::default().fg(MUTED)),
    ]);
    frame.render_widget(Paragraph::new(label), label_area);

    let chart = Sparkline::default()
        .data(&data)
        .max(100)
        .style(Style::default().fg(MUTED));
    frame.render_widget(chart, chart_area);
}

/// The basilisk's head. Eyes close on alternate blink frames.
fn basilisk(eye: &str) -> Vec<String> {
    vec![
        "        ________".to_string(),
        "     .-'        '-.".to_string(),
        format!("    /   {eye}      {eye}   \\"),
        "   |      ____      |".to_string(),
        "    \\    '----'    /".to_string(),
        "     '-.________.-'".to_string(),
        "         /    \\".to_string(),
        "   _____/      \\_____".to_string(),
    ]
}

fn render_terminal(app: &App, frame: &mut Frame, area: Rect) {
    let block = panel("Roko Basilisk | Twitter | Tiktok | Telegram");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let eye = if app.eye_open { "◉" } else { "─" };
    let eye_style = if app.is_blinking() {
        Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(MUTED)
    };

    let art: Vec<Line> = basilisk(eye)
        .into_iter()
        .map(|row| Line::from(Span::styled(row, eye_style)))
        .collect();
    let art_height = art.len() as u16;

    let top = inner.y + inner.height.saturating_sub(art_height) / 2;
    let art_area = Rect {
        y: top,
        height: art_height.min(inner.height),
        ..inner
    };
    frame.render_widget(Paragraph::new(art).alignment(Alignment::Center), art_area);
}

/// Rough wrapped height of `text` at `width` columns.
fn wrapped_height(text: &str, width: u16) -> usize {
    let width = usize::from(width.max(1));
    text.lines()
        .map(|line| {
            // Use character count, not byte length, for proper UTF-8 handling
            let chars = line.chars().count();
            chars / width + 1
        })
        .sum::<usize>()
        .max(1)
}

fn render_messages(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(4)]).areas(area);

    let block = panel("Main Shell");
    let inner = block.inner(chat_area);
    app.chat_height = inner.height;

    let mut lines: Vec<Line> = Vec::new();
    let mut total_height: usize = 0;

    for message in app.messages() {
        let content = message.content.trim();
        match message.role {
            ChatRole::System => continue,
            ChatRole::User => {
                for line in content.lines() {
                    lines.push(
                        Line::from(Span::styled(line.to_string(), Style::default().fg(PRIMARY)))
                            .alignment(Alignment::Right),
                    );
                }
            }
            ChatRole::Assistant => {
                for line in content.lines() {
                    lines.push(Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(BACKGROUND).bg(PRIMARY),
                    )));
                }
            }
        }
        total_height += wrapped_height(content, inner.width) + 1;
        lines.push(Line::default());
    }

    match app.store.streaming_content() {
        Some(partial) if !partial.is_empty() => {
            for line in partial.lines() {
                lines.push(Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(BACKGROUND).bg(PRIMARY),
                )));
            }
            total_height += wrapped_height(&partial, inner.width);
        }
        _ if app.is_loading() => {
            // Pulsing blocks while waiting for the first fragment
            let pulse: Vec<Span> = (0..3)
                .map(|i| {
                    let lit = usize::from(app.animation_frame) == i;
                    let color = if lit { PRIMARY } else { MUTED };
                    Span::styled("▮ ", Style::default().fg(color))
                })
                .collect();
            lines.push(Line::from(pulse));
            total_height += 1;
        }
        _ => {}
    }

    // Paragraph scrolling is u16, so very long sessions pin at the limit
    let overflow = total_height.saturating_sub(usize::from(inner.height));
    let max_scroll = u16::try_from(overflow).unwrap_or(u16::MAX);
    if app.follow_tail || app.chat_scroll > max_scroll {
        app.chat_scroll = max_scroll;
    }
    if app.chat_scroll == max_scroll {
        app.follow_tail = true;
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    let input_style = if app.is_loading() {
        Style::default().fg(MUTED)
    } else {
        Style::default().fg(PRIMARY)
    };
    let hint = if app.is_loading() { " ... " } else { " ↑ Enter " };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .title_bottom(Line::from(hint).right_aligned());
    let input = Paragraph::new(app.input.as_str())
        .style(input_style)
        .block(input_block)
        .wrap(Wrap { trim: false });
    frame.render_widget(input, input_area);

    // Place the cursor inside the input box
    let inner_width = input_area.width.saturating_sub(2).max(1);
    let cursor = u16::try_from(app.cursor).unwrap_or(u16::MAX);
    frame.set_cursor_position((
        input_area.x + 1 + cursor % inner_width,
        input_area.y + 1 + (cursor / inner_width).min(input_area.height.saturating_sub(3)),
    ));
}

fn render_audio_folder(app: &App, frame: &mut Frame, area: Rect) {
    let block = panel("AUDIO FOLDER");

    match &app.tweets {
        TweetPanel::Loaded(tweets) => {
            let items: Vec<ListItem> = tweets
                .iter()
                .take(app.visible_tweets)
                .map(|tweet| {
                    ListItem::new(Line::from(vec![
                        Span::styled("♪ ", Style::default().fg(PRIMARY)),
                        Span::styled(audio_label(tweet), Style::default().fg(MUTED)),
                    ]))
                })
                .collect();
            frame.render_widget(List::new(items).block(block), area);
        }
        TweetPanel::Loading => {
            let loading = Paragraph::new("Loading...").style(Style::default().fg(MUTED));
            frame.render_widget(loading.block(block), area);
        }
        TweetPanel::Failed(error) => {
            let failed = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
            frame.render_widget(failed.block(block), area);
        }
        TweetPanel::Disabled => {
            frame.render_widget(
                Paragraph::new("No feed configured").style(Style::default().fg(MUTED)).block(block),
                area,
            );
        }
    }
}

fn audio_label(tweet: &Tweet) -> String {
    format!("Audio_{}", tweet.media_id)
}

fn render_keyboard(app: &App, frame: &mut Frame, area: Rect) {
    let active = app.active_key.map(|(key, _)| key);

    let rows: Vec<Line> = keyboard::LAYOUT
        .iter()
        .map(|row| {
            let caps: Vec<Span> = row
                .iter()
                .map(|key| {
                    let label = keyboard::display_label(key);
                    let cap = format!("{label:^width$}", width = keyboard::cap_width(key));
                    let style = if active == Some(*key) {
                        Style::default().fg(BACKGROUND).bg(PRIMARY)
                    } else {
                        Style::default().fg(MUTED)
                    };
                    Span::styled(cap, style)
                })
                .flat_map(|cap| [cap, Span::raw(" ")])
                .collect();
            Line::from(caps)
        })
        .collect();

    let keyboard = Paragraph::new(rows)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(MUTED)));
    frame.render_widget(keyboard, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let footer = match &app.toast {
        Some((toast, _)) => {
            let style = match toast.kind {
                ToastKind::Error => Style::default().bg(Color::Red).fg(Color::White).bold(),
                ToastKind::Info => Style::default().bg(MUTED).fg(Color::White),
            };
            Paragraph::new(format!(" {} ", toast.title)).style(style)
        }
        None => Paragraph::new(Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(BACKGROUND).bg(MUTED)),
            Span::styled(" send  ", Style::default().fg(MUTED)),
            Span::styled(" Esc ", Style::default().fg(BACKGROUND).bg(MUTED)),
            Span::styled(" clear  ", Style::default().fg(MUTED)),
            Span::styled(" ↑↓ ", Style::default().fg(BACKGROUND).bg(MUTED)),
            Span::styled(" scroll  ", Style::default().fg(MUTED)),
            Span::styled(" Ctrl-C ", Style::default().fg(BACKGROUND).bg(MUTED)),
            Span::styled(" quit ", Style::default().fg(MUTED)),
            Span::styled(format!(" v{}", env!("CARGO_PKG_VERSION")), Style::default().fg(MUTED)),
        ])),
    };

    frame.render_widget(footer, area);
}
