mod draw;
mod theme;

use std::io::{self, Write};
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::{Block, Borders};
use tracing::{error, warn};
use tui_textarea::TextArea;

use cyber_drill::game::render_report;
use cyber_drill::{
    Catalog, DataStore, GameSettings, LeaderboardEntry, Outcome, Phase, Profile, Session, SessionError,
    SessionSummary,
};

pub use draw::draw_ui;
use theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Title,
    Playing,
    Feedback,
    Summary,
    Settings,
    Badges,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    NewGame,
    Continue,
    Settings,
    Badges,
    HowToPlay,
    Quit,
}

impl MenuOption {
    pub const ALL: [MenuOption; 6] = [
        MenuOption::NewGame,
        MenuOption::Continue,
        MenuOption::Settings,
        MenuOption::Badges,
        MenuOption::HowToPlay,
        MenuOption::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuOption::NewGame => "NEW GAME",
            MenuOption::Continue => "CONTINUE",
            MenuOption::Settings => "SETTINGS",
            MenuOption::Badges => "BADGES",
            MenuOption::HowToPlay => "HOW TO PLAY",
            MenuOption::Quit => "QUIT",
        }
    }

    fn step(self, forward: bool) -> Self {
        let n = Self::ALL.len();
        let pos = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
        let next = if forward { (pos + 1) % n } else { (pos + n - 1) % n };
        Self::ALL[next]
    }
}

/// Editable rows on the settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    Difficulty,
    Timer,
    RoundSeconds,
    Penalties,
    Hints,
    Sound,
    HighContrast,
    FontScale,
    Appearance,
    Accent,
}

impl SettingField {
    pub const ALL: [SettingField; 10] = [
        SettingField::Difficulty,
        SettingField::Timer,
        SettingField::RoundSeconds,
        SettingField::Penalties,
        SettingField::Hints,
        SettingField::Sound,
        SettingField::HighContrast,
        SettingField::FontScale,
        SettingField::Appearance,
        SettingField::Accent,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingField::Difficulty => "Difficulty",
            SettingField::Timer => "Enable timer",
            SettingField::RoundSeconds => "Seconds per round",
            SettingField::Penalties => "Enable penalties",
            SettingField::Hints => "Enable hints",
            SettingField::Sound => "Sound effects",
            SettingField::HighContrast => "High contrast",
            SettingField::FontScale => "Font size %",
            SettingField::Appearance => "Appearance",
            SettingField::Accent => "Accent",
        }
    }

    pub fn value(self, s: &GameSettings) -> String {
        let on_off = |b: bool| (if b { "on" } else { "off" }).to_string();
        match self {
            SettingField::Difficulty => s.difficulty.to_string(),
            SettingField::Timer => on_off(s.timer_enabled),
            SettingField::RoundSeconds => s.round_seconds.to_string(),
            SettingField::Penalties => on_off(s.penalties_enabled),
            SettingField::Hints => on_off(s.hints_enabled),
            SettingField::Sound => on_off(s.sound_enabled),
            SettingField::HighContrast => on_off(s.high_contrast),
            SettingField::FontScale => s.font_scale.to_string(),
            SettingField::Appearance => s.appearance.clone(),
            SettingField::Accent => s.accent.clone(),
        }
    }

    fn adjust(self, s: &mut GameSettings, increase: bool) {
        match self {
            SettingField::Difficulty => s.difficulty = s.difficulty.next(),
            SettingField::Timer => s.timer_enabled = !s.timer_enabled,
            SettingField::RoundSeconds => {
                s.round_seconds = if increase {
                    s.round_seconds.saturating_add(5).min(300)
                } else {
                    s.round_seconds.saturating_sub(5).clamp(5, 300)
                }
            }
            SettingField::Penalties => s.penalties_enabled = !s.penalties_enabled,
            SettingField::Hints => s.hints_enabled = !s.hints_enabled,
            SettingField::Sound => s.sound_enabled = !s.sound_enabled,
            SettingField::HighContrast => s.high_contrast = !s.high_contrast,
            SettingField::FontScale => {
                s.font_scale = if increase {
                    s.font_scale.saturating_add(10).min(200)
                } else {
                    s.font_scale.saturating_sub(10).clamp(50, 200)
                }
            }
            SettingField::Appearance => s.cycle_appearance(),
            SettingField::Accent => s.cycle_accent(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Info,
    Good,
    Warn,
    Bad,
}

pub struct App<'a> {
    store: DataStore,
    catalog: Catalog,
    settings: GameSettings,
    profile: Profile,
    leaderboard: Vec<LeaderboardEntry>,
    session: Option<Session>,
    summary: Option<SessionSummary>,
    screen: Screen,
    menu_selection: MenuOption,
    settings_cursor: usize,
    selected_choice: Option<usize>,
    revealed_hint: Option<String>,
    message: String,
    tone: Tone,
    report_editor: Option<TextArea<'a>>,
    theme: Theme,
    should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(store: DataStore, catalog: Catalog, settings: GameSettings, profile: Profile) -> Self {
        let leaderboard = store.get_leaderboard();
        let theme = Theme::from_settings(&settings);
        App {
            store,
            catalog,
            settings,
            profile,
            leaderboard,
            session: None,
            summary: None,
            screen: Screen::Title,
            menu_selection: MenuOption::NewGame,
            settings_cursor: 0,
            selected_choice: None,
            revealed_hint: None,
            message: String::new(),
            tone: Tone::Neutral,
            report_editor: None,
            theme,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Delivers due timer ticks; true when a redraw is needed.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        match (&mut self.session, self.screen) {
            (Some(session), Screen::Playing) => session.tick(now),
            _ => false,
        }
    }

    fn say(&mut self, tone: Tone, message: impl Into<String>) {
        self.tone = tone;
        self.message = message.into();
    }

    fn beep(&self) {
        if self.settings.sound_enabled {
            let mut out = io::stdout();
            let _ = out.write_all(b"\x07");
            let _ = out.flush();
        }
    }

    fn new_game(&mut self, now: Instant) {
        let seen = self
            .session
            .as_ref()
            .map(|s| s.seen_ids().clone())
            .unwrap_or_default();
        let mut session = Session::new(seen);
        if let Err(e) = session.start(&self.settings, self.catalog.scenarios(), &mut rand::thread_rng(), now) {
            error!(error = %e, "Could not start session");
            return;
        }
        self.summary = None;
        self.selected_choice = None;
        self.revealed_hint = None;
        if session.is_finished() {
            self.session = Some(session);
            self.screen = Screen::Title;
            self.say(Tone::Bad, "No playable scenarios were found. Check the scenario catalog.");
            return;
        }
        self.session = Some(session);
        self.screen = Screen::Playing;
        self.say(Tone::Warn, "Choose the safest response. 1-9 select, ENTER submit.");
    }

    fn continue_game(&mut self, now: Instant) {
        match self.session.as_ref().map(|s| s.phase()) {
            Some(Phase::InRound(_)) => self.screen = Screen::Playing,
            Some(Phase::RoundSubmitted(_)) => self.screen = Screen::Feedback,
            _ => self.new_game(now),
        }
    }

    fn save_settings(&mut self) {
        self.theme = Theme::from_settings(&self.settings);
        if let Err(e) = self.store.save_settings(&self.settings) {
            error!(error = %e, "Saving settings failed");
            self.say(Tone::Bad, format!("Could not save settings: {e}"));
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if self.report_editor.is_some() {
            self.handle_report_key(key);
            return;
        }
        match self.screen {
            Screen::Title => self.handle_title_key(key, now),
            Screen::Playing => self.handle_round_key(key, now),
            Screen::Feedback => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    self.next_round(now);
                }
            }
            Screen::Summary => match key.code {
                KeyCode::Char('w') => self.save_report(),
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => self.screen = Screen::Title,
                _ => {}
            },
            Screen::Settings => self.handle_settings_key(key),
            Screen::Badges | Screen::Help => self.screen = Screen::Title,
        }
    }

    fn handle_title_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.menu_selection = self.menu_selection.step(false),
            KeyCode::Down | KeyCode::Char('j') => self.menu_selection = self.menu_selection.step(true),
            KeyCode::Enter => match self.menu_selection {
                MenuOption::NewGame => self.new_game(now),
                MenuOption::Continue => self.continue_game(now),
                MenuOption::Settings => self.screen = Screen::Settings,
                MenuOption::Badges => self.screen = Screen::Badges,
                MenuOption::HowToPlay => self.screen = Screen::Help,
                MenuOption::Quit => self.should_quit = true,
            },
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_round_key(&mut self, key: KeyEvent, now: Instant) {
        let choices = self
            .session
            .as_ref()
            .and_then(|s| s.current_scenario())
            .map(|s| s.choices.len())
            .unwrap_or(0);

        match (key.code, key.modifiers) {
            (KeyCode::Char(c @ '1'..='9'), _) => {
                let index = c as usize - '1' as usize;
                if index < choices {
                    self.selected_choice = Some(index);
                    self.say(Tone::Info, format!("Selected option {}", index + 1));
                }
            }
            (KeyCode::Up | KeyCode::Char('k'), _) if choices > 0 => {
                self.selected_choice = Some(self.selected_choice.map_or(choices - 1, |i| (i + choices - 1) % choices));
            }
            (KeyCode::Down | KeyCode::Char('j'), _) if choices > 0 => {
                self.selected_choice = Some(self.selected_choice.map_or(0, |i| (i + 1) % choices));
            }
            (KeyCode::Enter, _) => self.submit(now),
            (KeyCode::Char('s'), KeyModifiers::NONE) | (KeyCode::Esc, _) => self.skip(now),
            (KeyCode::Char('h'), _) => self.hint(),
            (KeyCode::Char('r'), _) => self.open_report_editor(),
            (KeyCode::Char('q'), _) => {
                self.screen = Screen::Title;
                self.say(Tone::Neutral, "Game paused. Choose CONTINUE to resume.");
            }
            _ => {}
        }
    }

    fn submit(&mut self, now: Instant) {
        let Some(index) = self.selected_choice else {
            self.say(Tone::Warn, "Please select an option.");
            return;
        };
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.submit(&self.settings, index, now) {
            Ok(result) => {
                let outcome = result.outcome;
                self.show_feedback(outcome);
            }
            Err(e) => self.say(Tone::Bad, e.to_string()),
        }
    }

    fn skip(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.skip(&self.settings, now) {
            Ok(result) => {
                let outcome = result.outcome;
                self.show_feedback(outcome);
            }
            Err(e) => self.say(Tone::Bad, e.to_string()),
        }
    }

    fn show_feedback(&mut self, outcome: Outcome) {
        self.beep();
        self.screen = Screen::Feedback;
        let tone = match outcome {
            Outcome::Correct => Tone::Good,
            Outcome::Partial => Tone::Warn,
            Outcome::Unsafe | Outcome::Skipped => Tone::Bad,
        };
        self.say(tone, "Press ENTER for the next round.");
    }

    fn hint(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.use_hint(&self.settings) {
            Ok(hint) => {
                let cost = self.settings.hint_cost;
                self.revealed_hint = Some(hint);
                self.say(Tone::Info, format!("Hint shown ({cost})"));
            }
            Err(SessionError::HintsDisabled) => self.say(Tone::Warn, "Hints are disabled. Enable them in Settings."),
            Err(e) => self.say(Tone::Bad, e.to_string()),
        }
    }

    fn next_round(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            self.screen = Screen::Title;
            return;
        };
        match session.advance(&self.settings, now) {
            Ok(Phase::Finished) => self.finish_session(),
            Ok(_) => {
                self.selected_choice = None;
                self.revealed_hint = None;
                self.screen = Screen::Playing;
                self.say(Tone::Warn, "Choose the safest response.");
            }
            Err(e) => warn!(error = %e, "Advance rejected"),
        }
    }

    fn finish_session(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.finish(&mut self.profile, &self.store) {
            Ok(summary) => {
                if let Some(summary) = summary {
                    self.summary = Some(summary);
                }
                self.leaderboard = self.store.get_leaderboard();
                self.screen = Screen::Summary;
                self.say(Tone::Neutral, "W: save report  ENTER: back to start");
            }
            Err(e) => {
                error!(error = %e, "Saving session results failed");
                self.summary = Some(session.summary());
                self.screen = Screen::Summary;
                self.say(Tone::Bad, format!("Could not save results: {e}"));
            }
        }
    }

    fn save_report(&mut self) {
        let (Some(session), Some(summary)) = (self.session.as_ref(), self.summary.as_ref()) else {
            return;
        };
        let ts = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        let markdown = render_report(session, summary, &ts);
        match self.store.save_report(&markdown) {
            Ok(path) => self.say(Tone::Good, format!("Report saved to {}", path.display())),
            Err(e) => self.say(Tone::Bad, format!("Could not save report: {e}")),
        }
    }

    fn open_report_editor(&mut self) {
        let mut editor = TextArea::default();
        editor.set_block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Report issue [ENTER: save | ESC: cancel] "),
        );
        editor.set_placeholder_text("Describe the problem (saved locally)");
        self.report_editor = Some(editor);
    }

    fn handle_report_key(&mut self, key: KeyEvent) {
        let Some(editor) = self.report_editor.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.report_editor = None,
            KeyCode::Enter => {
                let message = editor.lines().join(" ");
                self.report_editor = None;
                if message.trim().is_empty() {
                    return;
                }
                let scenario_id = self
                    .session
                    .as_ref()
                    .and_then(|s| s.current_scenario())
                    .map(|s| s.id.clone())
                    .unwrap_or_default();
                match self.store.log_feedback(&self.profile.name, &scenario_id, &message) {
                    Ok(()) => self.say(Tone::Good, "Feedback saved"),
                    Err(e) => self.say(Tone::Bad, format!("Could not save feedback: {e}")),
                }
            }
            _ => {
                editor.input(key);
            }
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        let n = SettingField::ALL.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.settings_cursor = (self.settings_cursor + n - 1) % n,
            KeyCode::Down | KeyCode::Char('j') => self.settings_cursor = (self.settings_cursor + 1) % n,
            KeyCode::Left | KeyCode::Char('-') => {
                SettingField::ALL[self.settings_cursor].adjust(&mut self.settings, false);
                self.save_settings();
            }
            KeyCode::Right | KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('+') => {
                SettingField::ALL[self.settings_cursor].adjust(&mut self.settings, true);
                self.save_settings();
            }
            KeyCode::Esc | KeyCode::Char('q') => self.screen = Screen::Title,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use cyber_drill::{Choice, Scenario};
    use tempfile::TempDir;

    use super::*;

    fn scenario(id: &str) -> Scenario {
        Scenario {
            id: id.to_string(),
            title: format!("Title {id}"),
            category: "Phishing".to_string(),
            difficulty: Default::default(),
            narrative: "A link arrives by text message.".to_string(),
            choices: vec![Choice::new("Tap it"), Choice::new("Report it"), Choice::new("Ignore it")],
            correct_indexes: BTreeSet::from([1]),
            partial_indexes: BTreeSet::from([2]),
            unsafe_penalty: None,
            hint: String::new(),
            feedback_why: String::new(),
            pro_tip: String::new(),
            references: Vec::new(),
        }
    }

    fn app(dir: &TempDir) -> App<'static> {
        let store = DataStore::new(dir.path());
        store.ensure_dirs().unwrap();
        let catalog = Catalog::from_scenarios((0..3).map(|i| scenario(&format!("phish-{i}"))));
        App::new(store, catalog, GameSettings::default(), Profile::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), Instant::now());
    }

    fn playing(dir: &TempDir) -> App<'static> {
        let mut app = app(dir);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Playing);
        app
    }

    #[test]
    fn enter_without_a_selection_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut app = playing(&dir);

        press(&mut app, KeyCode::Enter);

        let session = app.session().unwrap();
        assert!(session.results().is_empty());
        assert_eq!(session.phase(), Phase::InRound(0));
        assert_eq!(session.score(), 0);
        assert_eq!(app.screen, Screen::Playing);
        assert_eq!(app.tone, Tone::Warn);
        assert_eq!(app.message, "Please select an option.");
    }

    #[test]
    fn digit_keys_select_existing_choices_only() {
        let dir = TempDir::new().unwrap();
        let mut app = playing(&dir);

        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.selected_choice, None);
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.selected_choice, None);

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.selected_choice, Some(1));
        press(&mut app, KeyCode::Enter);

        let session = app.session().unwrap();
        assert_eq!(session.phase(), Phase::RoundSubmitted(0));
        assert_eq!(session.results()[0].selected_index, Some(1));
        assert_eq!(session.results()[0].outcome, Outcome::Correct);
        assert_eq!(app.screen, Screen::Feedback);
    }

    #[test]
    fn arrow_keys_wrap_around_choices() {
        let dir = TempDir::new().unwrap();
        let mut app = playing(&dir);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected_choice, Some(2));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_choice, Some(0));
    }

    #[test]
    fn pause_and_continue_keep_the_round() {
        let dir = TempDir::new().unwrap();
        let mut app = playing(&dir);
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.screen, Screen::Title);
        assert!(!app.should_quit());

        app.menu_selection = MenuOption::Continue;
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Playing);
        assert_eq!(app.session().unwrap().phase(), Phase::InRound(0));
    }

    #[test]
    fn menu_selection_wraps() {
        assert_eq!(MenuOption::NewGame.step(false), MenuOption::Quit);
        assert_eq!(MenuOption::Quit.step(true), MenuOption::NewGame);
        assert_eq!(MenuOption::Settings.step(true), MenuOption::Badges);

        let mut option = MenuOption::NewGame;
        for _ in 0..MenuOption::ALL.len() {
            option = option.step(true);
        }
        assert_eq!(option, MenuOption::NewGame);
    }

    #[test]
    fn numeric_settings_stay_in_range() {
        let mut s = GameSettings::default();
        s.round_seconds = 300;
        SettingField::RoundSeconds.adjust(&mut s, true);
        assert_eq!(s.round_seconds, 300);
        s.round_seconds = 5;
        SettingField::RoundSeconds.adjust(&mut s, false);
        assert_eq!(s.round_seconds, 5);
        s.round_seconds = u32::MAX;
        SettingField::RoundSeconds.adjust(&mut s, true);
        assert_eq!(s.round_seconds, 300);

        s.font_scale = 200;
        SettingField::FontScale.adjust(&mut s, true);
        assert_eq!(s.font_scale, 200);
        s.font_scale = 50;
        SettingField::FontScale.adjust(&mut s, false);
        assert_eq!(s.font_scale, 50);
    }

    #[test]
    fn settings_keys_adjust_and_save() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.screen = Screen::Settings;
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(SettingField::ALL[app.settings_cursor], SettingField::RoundSeconds);

        for _ in 0..100 {
            press(&mut app, KeyCode::Right);
        }
        assert_eq!(app.settings.round_seconds, 300);
        assert_eq!(app.store.load_settings().round_seconds, 300);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Title);
    }
}
