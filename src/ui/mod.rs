use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;

use crate::app::{App, ConnectionState, InputField, InputMode, StatusLevel, TxLifecycle};
use crate::domain::format::shorten_address;
use crate::domain::risk::RiskBucket;

pub fn draw(f: &mut Frame, app: &mut App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    draw_wallet_panel(f, areas.wallet, app);
    draw_allowance_panel(f, areas.allowance, app);
    draw_hygiene_panel(f, areas.hygiene, app);
    draw_status_line(f, areas.status_line, app);
    draw_hint_line(f, areas.hint_line, app);

    if app.confirm_open {
        draw_confirm_popup(f, areas.size, app);
    }
    if app.help_open {
        draw_help_popup(f, areas.size);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let title = Line::from(vec![
        Span::styled(
            "Allowance Doctor",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Network", Style::default().fg(Color::DarkGray)),
        Span::raw(" Sepolia "),
        Span::styled("RPC", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {}", app.config.rpc_url)),
    ]);

    let header = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);
    f.render_widget(header, area);
}

fn draw_wallet_panel(f: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();

    match app.connection {
        ConnectionState::Connected { address } => {
            lines.push(Line::from(vec![
                Span::styled("Connected ", Style::default().fg(Color::Green)),
                Span::styled(
                    shorten_address(&address.to_string()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled("  (d to disconnect)", Style::default().fg(Color::DarkGray)),
            ]));
        }
        ConnectionState::Connecting => {
            lines.push(Line::from(Span::styled(
                "Connecting…",
                Style::default().fg(Color::Yellow),
            )));
        }
        ConnectionState::Disconnected => {
            lines.push(Line::from(vec![
                Span::styled("Disconnected", Style::default().fg(Color::DarkGray)),
                Span::styled("  (c to connect)", Style::default().fg(Color::DarkGray)),
            ]));
        }
    }

    if let Some(chain_id) = app.chain_id {
        if app.chain_mismatch() {
            lines.push(Line::from(Span::styled(
                format!(
                    "node reports chain {}, switch it to Sepolia ({})",
                    chain_id, app.config.chain_id
                ),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                format!("chain id {}", chain_id),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    if let Some(err) = &app.connect_error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let panel = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" 1 · Wallet "))
        .wrap(Wrap { trim: true });
    f.render_widget(panel, area);
}

fn draw_allowance_panel(f: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();

    lines.push(input_line(
        "Token  ",
        &app.token_input,
        app.focus == InputField::Token,
        app.input_mode == InputMode::Editing(InputField::Token),
    ));
    if app.token_input_invalid() {
        lines.push(Line::from(Span::styled(
            "        token address must be 0x followed by 40 hex chars",
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!(
                "        symbol {} · decimals {}",
                app.display_symbol(),
                app.display_decimals()
            ),
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines.push(input_line(
        "Spender",
        &app.spender_input,
        app.focus == InputField::Spender,
        app.input_mode == InputMode::Editing(InputField::Spender),
    ));
    if app.spender_input_invalid() {
        lines.push(Line::from(Span::styled(
            "        spender address must be 0x followed by 40 hex chars",
            Style::default().fg(Color::Red),
        )));
    }

    lines.push(Line::default());

    if !app.is_connected() {
        lines.push(dim_line("connect a wallet to query the allowance"));
    } else if app.normalized_token().is_none() || app.normalized_spender().is_none() {
        lines.push(dim_line(
            "enter a valid token and spender address to query the allowance",
        ));
    } else if app.allowance_loading {
        lines.push(dim_line("querying allowance…"));
    } else if let Some(err) = &app.allowance_error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    } else if app.allowance.is_none() {
        lines.push(dim_line("allowance unavailable"));
    } else {
        lines.push(Line::from(vec![
            Span::raw("the spender can currently move "),
            Span::styled(
                format!("{} {}", app.formatted_allowance(), app.display_symbol()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" from this wallet"),
        ]));
    }

    let bucket = app.risk();
    lines.push(Line::from(vec![
        Span::styled("risk ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            bucket.label(),
            Style::default()
                .fg(risk_color(bucket))
                .add_modifier(Modifier::BOLD),
        ),
    ]));

    let panel = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" 2 · Allowance check "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(panel, area);
}

fn draw_hygiene_panel(f: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();

    match app.has_cleaned_once {
        Some(true) => lines.push(Line::from(Span::styled(
            "cleanup recorded at least once ✓",
            Style::default().fg(Color::Green),
        ))),
        Some(false) => lines.push(dim_line("no cleanup record yet")),
        None => lines.push(dim_line("cleanup record unknown")),
    }

    lines.push(Line::from(vec![
        Span::styled("last recorded ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.formatted_last_cleaned()),
    ]));

    let tx_line = match &app.tx {
        TxLifecycle::Idle => {
            if app.can_mark_cleaned() {
                Line::from(Span::raw(
                    "press m to record a completed cleanup on-chain",
                ))
            } else {
                dim_line("connect a wallet to record a cleanup")
            }
        }
        TxLifecycle::Submitting => Line::from(Span::styled(
            "submitting transaction…",
            Style::default().fg(Color::Yellow),
        )),
        TxLifecycle::Confirming { hash } => Line::from(Span::styled(
            format!("waiting for receipt {}", shorten_address(&hash.to_string())),
            Style::default().fg(Color::Yellow),
        )),
        TxLifecycle::Confirmed { hash } => Line::from(Span::styled(
            format!(
                "confirmed {}, press r to re-read on-chain state",
                shorten_address(&hash.to_string())
            ),
            Style::default().fg(Color::Green),
        )),
        TxLifecycle::Failed { message } => {
            Line::from(Span::styled(message.clone(), Style::default().fg(Color::Red)))
        }
    };
    lines.push(tx_line);

    if let Some(url) = app.explorer_tx_url() {
        lines.push(Line::from(vec![
            Span::styled(url, Style::default().fg(Color::Blue)),
            Span::styled("  (y to copy)", Style::default().fg(Color::DarkGray)),
        ]));
    }

    let panel = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" 3 · Hygiene log "),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(panel, area);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let Some((text, level)) = app.status_text() else {
        f.render_widget(Paragraph::new(""), area);
        return;
    };
    let color = match level {
        StatusLevel::Info => Color::Green,
        StatusLevel::Warn => Color::Yellow,
        StatusLevel::Error => Color::Red,
    };
    let line = Paragraph::new(Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(color),
    )));
    f.render_widget(line, area);
}

fn draw_hint_line(f: &mut Frame, area: Rect, app: &App) {
    let hints = if matches!(app.input_mode, InputMode::Editing(_)) {
        "type address · Backspace delete · Enter/Esc done"
    } else {
        "c connect · d disconnect · Tab field · Enter edit · r refresh · m mark cleaned · y copy tx · ? help · q quit"
    };
    let line = Paragraph::new(Line::from(Span::styled(
        hints,
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(line, area);
}

fn draw_confirm_popup(f: &mut Frame, area: Rect, app: &App) {
    let rect = layout::centered_rect(56, 7, area);
    f.render_widget(Clear, rect);

    let lines = vec![
        Line::from(Span::raw(format!(
            "The current allowance is {} {}, not zero.",
            app.formatted_allowance(),
            app.display_symbol()
        ))),
        Line::from(Span::raw("Record \"cleanup complete\" anyway?")),
        Line::default(),
        Line::from(vec![
            Span::styled("y", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" record  "),
            Span::styled("n", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]),
    ];

    let popup = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Confirm "))
        .wrap(Wrap { trim: true });
    f.render_widget(popup, rect);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let rect = layout::centered_rect(60, 14, area);
    f.render_widget(Clear, rect);

    let lines = vec![
        Line::from(Span::raw("c        connect the configured wallet")),
        Line::from(Span::raw("d        disconnect")),
        Line::from(Span::raw("Tab      switch between token / spender input")),
        Line::from(Span::raw("Enter    edit the focused input")),
        Line::from(Span::raw("r        re-run the enabled queries")),
        Line::from(Span::raw("m        record a completed cleanup on-chain")),
        Line::from(Span::raw("y        copy the last transaction link")),
        Line::from(Span::raw("?        toggle this help")),
        Line::from(Span::raw("q        quit")),
        Line::default(),
        Line::from(Span::styled(
            "Reduce allowances from your wallet; this tool only records that you did.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let popup = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: true });
    f.render_widget(popup, rect);
}

fn input_line<'a>(label: &'a str, value: &'a str, focused: bool, editing: bool) -> Line<'a> {
    let marker = if focused { "› " } else { "  " };
    let mut spans = vec![
        Span::styled(marker, Style::default().fg(Color::LightCyan)),
        Span::styled(label, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
    ];
    if editing {
        spans.push(Span::styled(value, Style::default().fg(Color::Yellow)));
        spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
    } else if value.is_empty() {
        spans.push(Span::styled(
            "0x… (Enter to edit)",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(value));
    }
    Line::from(spans)
}

fn dim_line(text: &str) -> Line<'_> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::DarkGray),
    ))
}

fn risk_color(bucket: RiskBucket) -> Color {
    match bucket {
        RiskBucket::Unknown => Color::DarkGray,
        RiskBucket::Safe => Color::Green,
        RiskBucket::Low => Color::Yellow,
        RiskBucket::Caution => Color::LightRed,
        RiskBucket::High => Color::Red,
    }
}
