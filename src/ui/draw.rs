use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use cyber_drill::{Badge, Outcome, Scenario, Session};

use super::{App, MenuOption, Screen, SettingField, Tone};

pub fn draw_ui(f: &mut Frame, app: &App) {
    f.render_widget(Block::default().style(app.theme.text()), f.area());

    match app.screen {
        Screen::Title => draw_title_screen(f, app),
        Screen::Playing | Screen::Feedback => draw_round(f, app),
        Screen::Summary => draw_summary(f, app),
        Screen::Settings => draw_settings(f, app),
        Screen::Badges => draw_badges(f, app),
        Screen::Help => draw_help(f, app),
    }

    if let Some(editor) = &app.report_editor {
        let area = centered(f.area(), 70, 5);
        f.render_widget(Clear, area);
        f.render_widget(editor, area);
    }
}

fn tone_style(app: &App) -> Style {
    let t = &app.theme;
    match app.tone {
        Tone::Neutral => t.fg(t.muted),
        Tone::Info => t.fg(t.info),
        Tone::Good => t.fg(t.good),
        Tone::Warn => t.fg(t.warn),
        Tone::Bad => t.fg(t.bad),
    }
}

fn outcome_style(app: &App, outcome: Outcome) -> Style {
    let t = &app.theme;
    match outcome {
        Outcome::Correct => t.fg(t.good).add_modifier(Modifier::BOLD),
        Outcome::Partial => t.fg(t.warn).add_modifier(Modifier::BOLD),
        Outcome::Unsafe | Outcome::Skipped => t.fg(t.bad).add_modifier(Modifier::BOLD),
    }
}

fn draw_round(f: &mut Frame, app: &App) {
    let (Some(session), Some(scenario)) = (
        app.session.as_ref(),
        app.session.as_ref().and_then(|s| s.current_scenario()),
    ) else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(5),
        ])
        .split(f.area());

    draw_status_bar(f, app, session, scenario, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    if app.screen == Screen::Feedback {
        draw_feedback(f, app, session, scenario, main_chunks[0]);
    } else {
        draw_question(f, app, scenario, main_chunks[0]);
    }
    draw_side_panel(f, app, scenario, main_chunks[1]);

    let message = Paragraph::new(app.message.as_str())
        .block(Block::default().borders(Borders::ALL).title(" Console "))
        .wrap(Wrap { trim: false })
        .style(tone_style(app));
    f.render_widget(message, chunks[2]);
}

fn draw_status_bar(f: &mut Frame, app: &App, session: &Session, scenario: &Scenario, area: Rect) {
    let t = &app.theme;
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(30)])
        .split(area);

    let timer = if session.countdown_enabled() {
        format!(" Timer: {}s ", session.remaining_seconds())
    } else {
        " Timer: off ".to_string()
    };
    let timer_color = match session.remaining_seconds() {
        0 if session.countdown_enabled() => t.bad,
        1..=10 => t.warn,
        _ => t.info,
    };

    let status = Line::from(vec![
        Span::styled(" CYBER DRILL ", t.highlight()),
        Span::raw("  "),
        Span::styled(format!(" {} ", scenario.category), t.fg(t.muted)),
        Span::raw("  "),
        Span::styled(format!(" Score: {} ", session.score()), t.fg(t.warn)),
        Span::raw("  "),
        Span::styled(format!(" Streak: {} ", session.streak()), t.fg(t.good)),
        Span::raw("  "),
        Span::styled(timer, t.fg(timer_color)),
    ]);
    f.render_widget(
        Paragraph::new(status).block(Block::default().borders(Borders::BOTTOM)),
        parts[0],
    );

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::BOTTOM))
        .gauge_style(t.fg(t.accent))
        .ratio(session.progress_fraction())
        .label(format!(
            "Round {}/{}",
            (session.current_index() + 1).min(session.rounds_total()),
            session.rounds_total()
        ));
    f.render_widget(gauge, parts[1]);
}

fn draw_question(f: &mut Frame, app: &App, scenario: &Scenario, area: Rect) {
    let t = &app.theme;
    let mut lines = vec![
        Line::from(Span::styled(scenario.title.as_str(), t.text().add_modifier(Modifier::BOLD))),
        Line::raw(""),
        Line::styled(scenario.narrative.as_str(), t.text()),
        Line::raw(""),
    ];
    for (i, choice) in scenario.choices.iter().enumerate() {
        let selected = app.selected_choice == Some(i);
        let marker = if selected { "(•)" } else { "( )" };
        let style = if selected { t.highlight() } else { t.text() };
        lines.push(Line::styled(format!(" {marker} {}. {}", i + 1, choice.label), style));
    }

    let title = format!(" Incident [{}] ", scenario.difficulty);
    let question = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(question, area);
}

fn draw_feedback(f: &mut Frame, app: &App, session: &Session, scenario: &Scenario, area: Rect) {
    let t = &app.theme;
    let Some(result) = session.last_result() else {
        return;
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("Result: {}", result.outcome), outcome_style(app, result.outcome)),
            Span::raw("   "),
            Span::styled(format!("Points: {:+}", result.gained), t.fg(t.warn)),
        ]),
        Line::raw(""),
    ];
    for (i, choice) in scenario.choices.iter().enumerate() {
        let tag = if scenario.is_correct(i) {
            ("✔", t.fg(t.good))
        } else if scenario.is_partial(i) {
            ("~", t.fg(t.warn))
        } else {
            ("✘", t.fg(t.bad))
        };
        let picked = if result.selected_index == Some(i) { " ← your answer" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", tag.0), tag.1),
            Span::styled(format!("{}. {}{}", i + 1, choice.label, picked), t.text()),
        ]));
    }
    lines.push(Line::raw(""));
    if !scenario.feedback_why.is_empty() {
        lines.push(Line::styled(format!("Why: {}", scenario.feedback_why), t.text()));
    }
    if !scenario.pro_tip.is_empty() {
        lines.push(Line::styled(format!("Pro tip: {}", scenario.pro_tip), t.fg(t.info)));
    }

    let feedback = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Round feedback "))
        .wrap(Wrap { trim: false });
    f.render_widget(feedback, area);
}

fn draw_side_panel(f: &mut Frame, app: &App, scenario: &Scenario, area: Rect) {
    let t = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let hint = match &app.revealed_hint {
        Some(hint) => Paragraph::new(hint.as_str()).style(t.fg(t.info)),
        None if app.settings.hints_enabled => Paragraph::new(format!(
            "Press H for a hint ({} points).",
            app.settings.hint_cost
        ))
        .style(t.fg(t.muted)),
        None => Paragraph::new("Hints are disabled.").style(t.fg(t.muted)),
    };
    f.render_widget(
        hint.block(Block::default().borders(Borders::ALL).title(" Hint "))
            .wrap(Wrap { trim: false }),
        chunks[0],
    );

    let references: Vec<Line> = if scenario.references.is_empty() {
        vec![
            Line::raw("Follow company policy."),
            Line::raw("Think before you click."),
        ]
    } else {
        scenario
            .references
            .iter()
            .map(|r| Line::raw(format!("• {r}")))
            .collect()
    };
    let keys = Line::styled(
        "1-9 pick  ENTER submit  S skip  R report  Q pause",
        t.fg(t.muted),
    );
    let mut body = references;
    body.push(Line::raw(""));
    body.push(keys);
    f.render_widget(
        Paragraph::new(body)
            .style(t.text())
            .block(Block::default().borders(Borders::ALL).title(" References "))
            .wrap(Wrap { trim: false }),
        chunks[1],
    );
}

fn draw_summary(f: &mut Frame, app: &App) {
    let t = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(10),
            Constraint::Length(7),
            Constraint::Length(3),
        ])
        .split(f.area());

    let Some(summary) = &app.summary else {
        let empty = Paragraph::new("No rounds were played.")
            .block(Block::default().borders(Borders::ALL).title(" Game Summary "))
            .style(t.text());
        f.render_widget(empty, chunks[0]);
        f.render_widget(Paragraph::new(app.message.as_str()).style(tone_style(app)), chunks[3]);
        return;
    };

    let badges = if summary.new_badges.is_empty() {
        "none this time".to_string()
    } else {
        summary
            .new_badges
            .iter()
            .map(|b| b.name())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let header = vec![
        Line::from(vec![
            Span::styled(format!("Total score: {}", summary.score), t.fg(t.warn).add_modifier(Modifier::BOLD)),
            Span::styled(
                if summary.new_best { "  NEW BEST!" } else { "" },
                t.fg(t.good).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::styled(format!("Best score: {}", app.profile.best_score), t.text()),
        Line::styled(format!("Most missed: {}", summary.most_missed), t.text()),
        Line::styled(format!("New badges: {badges}"), t.fg(t.info)),
    ];
    f.render_widget(
        Paragraph::new(header).block(Block::default().borders(Borders::ALL).title(" Game Summary ")),
        chunks[0],
    );

    let bars: Vec<Bar> = summary
        .categories
        .iter()
        .map(|(category, tally)| {
            Bar::default()
                .value(tally.percent())
                .label(Line::from(category.clone()))
                .text_value(format!("{}%", tally.percent()))
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Correct by category "))
        .bar_width(12)
        .bar_gap(3)
        .bar_style(t.fg(t.accent))
        .value_style(t.highlight())
        .label_style(t.text())
        .max(100)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, chunks[1]);

    let lessons: Vec<Line> = summary
        .lessons
        .iter()
        .map(|l| Line::styled(format!("• {l}"), t.text()))
        .collect();
    f.render_widget(
        Paragraph::new(lessons)
            .block(Block::default().borders(Borders::ALL).title(" Top lessons learned "))
            .wrap(Wrap { trim: false }),
        chunks[2],
    );

    f.render_widget(
        Paragraph::new(app.message.as_str())
            .style(tone_style(app))
            .block(Block::default().borders(Borders::TOP)),
        chunks[3],
    );
}

fn draw_settings(f: &mut Frame, app: &App) {
    let t = &app.theme;
    let mut lines = vec![Line::raw("")];
    for (i, field) in SettingField::ALL.iter().enumerate() {
        let style = if i == app.settings_cursor { t.highlight() } else { t.text() };
        lines.push(Line::styled(
            format!("  {:<20} {:>10}  ", field.label(), field.value(&app.settings)),
            style,
        ));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "↑/↓ select  •  ←/→ change  •  ESC back  (saved automatically)",
        t.fg(t.muted),
    ));
    if !app.message.is_empty() && app.tone == Tone::Bad {
        lines.push(Line::styled(app.message.as_str(), tone_style(app)));
    }

    let area = centered(f.area(), 60, 18);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Settings ")),
        area,
    );
}

fn draw_badges(f: &mut Frame, app: &App) {
    let t = &app.theme;
    let mut lines = vec![Line::raw("")];
    for badge in Badge::ALL {
        let unlocked = app.profile.unlocked_badges.contains(badge.name());
        let (mark, style) = if unlocked {
            ("★", t.fg(t.warn).add_modifier(Modifier::BOLD))
        } else {
            ("☆", t.fg(t.muted))
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {mark} {:<14}", badge.name()), style),
            Span::styled(badge.description(), t.fg(t.muted)),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled("  Press any key to return", t.fg(t.muted)));

    let title = format!(" Badges: {} ", app.profile.name);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        centered(f.area(), 80, 9),
    );
}

fn draw_help(f: &mut Frame, app: &App) {
    let t = &app.theme;
    let s = &app.settings;
    let text = vec![
        Line::raw(""),
        Line::raw(format!("  You will see up to {} randomized scenarios.", cyber_drill::ROUNDS_TOTAL)),
        Line::raw("  • Choose the safest response (keys 1-9, then ENTER)."),
        Line::raw("  • The optional timer awards a fast-answer bonus."),
        Line::raw("  • Every second correct answer in a row adds a streak bonus."),
        Line::raw(format!("  • You can Skip ({}) or ask for a Hint ({}).", s.skip_penalty, s.hint_cost)),
        Line::raw("  • Press R during a round to report an issue with a scenario."),
        Line::raw("  Learn from the feedback after each choice!"),
        Line::raw(""),
        Line::styled("  Press any key to return", t.fg(t.muted)),
    ];
    f.render_widget(
        Paragraph::new(text)
            .style(t.text())
            .block(Block::default().borders(Borders::ALL).title(" How to Play ")),
        centered(f.area(), 72, 12),
    );
}

fn draw_title_screen(f: &mut Frame, app: &App) {
    let t = &app.theme;
    let area = f.area();

    let title_art = r#"
    ╔═══════════════════════════════════════════════════════╗
    ║                                                       ║
    ║     ▄████▄ ▓██   ██▓ ▄▄▄▄   ▓█████  ██▀███            ║
    ║    ▒██▀ ▀█  ▒██  ██▒▓█████▄ ▓█   ▀ ▓██ ▒ ██▒          ║
    ║    ▒▓█    ▄  ▒██ ██░▒██▒ ▄██▒███   ▓██ ░▄█ ▒          ║
    ║    ▒▓▓▄ ▄██▒ ░ ▐██▓░▒██░█▀  ▒▓█  ▄ ▒██▀▀█▄            ║
    ║    ▒ ▓███▀ ░ ░ ██▒▓░░▓█  ▀█▓░▒████▒░██▓ ▒██▒  DRILL   ║
    ║                                                       ║
    ║        "Choose the safest action. Beat the clock."    ║
    ║                                                       ║
    ╚═══════════════════════════════════════════════════════╝
"#;

    let menu_height = MenuOption::ALL.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(14),
            Constraint::Length(menu_height + 1),
            Constraint::Min(4),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(area);

    let title = Paragraph::new(title_art)
        .style(t.fg(t.accent))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let menu: Vec<Line> = MenuOption::ALL
        .iter()
        .map(|option| {
            let style = if *option == app.menu_selection { t.highlight() } else { t.text() };
            Line::styled(format!("  {}  ", option.label()), style)
        })
        .collect();
    f.render_widget(Paragraph::new(menu).alignment(Alignment::Center), chunks[1]);

    let mut rows = vec![Line::styled(
        format!("🏆 Leaderboard (Top {})", cyber_drill::storage::LEADERBOARD_CAP),
        t.fg(t.warn).add_modifier(Modifier::BOLD),
    )];
    if app.leaderboard.is_empty() {
        rows.push(Line::styled("No scores yet. Be the first!", t.fg(t.muted)));
    } else {
        for entry in &app.leaderboard {
            let name: String = entry.name.chars().take(16).collect();
            rows.push(Line::styled(
                format!("{name:<16}  {:>5}  {}", entry.score, entry.timestamp),
                t.text(),
            ));
        }
    }
    f.render_widget(Paragraph::new(rows).alignment(Alignment::Center), chunks[2]);

    f.render_widget(
        Paragraph::new(app.message.as_str())
            .style(tone_style(app))
            .alignment(Alignment::Center),
        chunks[3],
    );

    let help = Paragraph::new(format!(
        "↑/↓ to select  •  ENTER to confirm  •  q to quit  •  {} scenarios loaded",
        app.catalog.len()
    ))
    .style(t.fg(t.muted))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[4]);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
