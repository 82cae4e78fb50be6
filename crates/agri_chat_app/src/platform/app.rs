use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use agri_chat_core::{
    update, AccountMsg, AdvisoryMsg, AppState, ChatMsg, CropField, InstanceKind, Key, Msg,
    REPLAY_COUNT,
};
use agri_logging::{agri_info, agri_warn};
use chrono::Utc;

use super::config::{AppConfig, BASE_URL_ENV, CONFIG_FILENAME};
use super::effects::EffectRunner;
use super::input::{parse_line, HostCommand, HELP_TEXT};
use super::logging;
use super::ui;

const TICK_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<()> {
    let config = AppConfig::load(Path::new(CONFIG_FILENAME))?
        .with_env_overrides(std::env::var(BASE_URL_ENV).ok());
    logging::initialize(config.log_destination);
    agri_info!("agri_chat_app starting");

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let (line_tx, line_rx) = mpsc::channel::<HostCommand>();
    let runner = EffectRunner::new(&config, msg_tx)?;

    // Blocking stdin reads stay off the event loop.
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let command = match line {
                Ok(line) => parse_line(&line),
                Err(err) => {
                    agri_warn!("stdin read failed: {}", err);
                    HostCommand::Quit
                }
            };
            if line_tx.send(command).is_err() {
                return;
            }
        }
        let _ = line_tx.send(HostCommand::Quit);
    });

    let mut host = Host::new(runner);
    println!("{HELP_TEXT}");
    host.start();

    loop {
        match msg_rx.recv_timeout(TICK_INTERVAL) {
            Ok(msg) => host.dispatch(msg),
            Err(RecvTimeoutError::Timeout) => host.dispatch(Msg::Tick),
            Err(RecvTimeoutError::Disconnected) => break,
        }
        while let Ok(command) = line_rx.try_recv() {
            if host.handle_command(command) == Flow::Quit {
                agri_info!("agri_chat_app exiting");
                return Ok(());
            }
        }
        host.runner.pump_engine_events();
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Host {
    state: AppState,
    active: InstanceKind,
    cursor: ui::render::RenderCursor,
    runner: EffectRunner,
}

impl Host {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            active: InstanceKind::Panel,
            cursor: ui::render::RenderCursor::default(),
            runner,
        }
    }

    fn start(&mut self) {
        self.dispatch(Msg::AppStarted);
        let history = self.runner.load_history().recent(REPLAY_COUNT);
        self.chat(InstanceKind::Widget, ChatMsg::RestoreHistory(history));
        self.paint();
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        if let Some(instance) = self.runner.enqueue(effects) {
            self.active = instance;
        }
        if was_dirty {
            self.paint();
        }
    }

    fn chat(&mut self, instance: InstanceKind, event: ChatMsg) {
        self.dispatch(Msg::Chat {
            instance,
            at: Utc::now(),
            event,
        });
    }

    fn advise(&mut self, event: AdvisoryMsg) {
        self.dispatch(Msg::Advisory(event));
    }

    fn ensure_widget_open(&mut self) {
        if !self.state.chat(InstanceKind::Widget).is_open() {
            self.chat(InstanceKind::Widget, ChatMsg::ToggleClicked);
        }
    }

    fn handle_command(&mut self, command: HostCommand) -> Flow {
        match command {
            HostCommand::Type { text, newline } => {
                if self.active == InstanceKind::Widget {
                    self.ensure_widget_open();
                }
                let draft = format!("{}{}", self.state.chat(self.active).input().raw_text(), text);
                self.chat(self.active, ChatMsg::InputChanged(draft));
                self.chat(
                    self.active,
                    ChatMsg::KeyPressed {
                        key: Key::Enter,
                        newline_modifier: newline,
                    },
                );
            }
            HostCommand::FocusWidget => {
                self.active = InstanceKind::Widget;
                self.ensure_widget_open();
            }
            HostCommand::FocusPanel => self.active = InstanceKind::Panel,
            HostCommand::ToggleWidget => {
                self.chat(InstanceKind::Widget, ChatMsg::ToggleClicked);
                if !self.state.chat(InstanceKind::Widget).is_open() {
                    self.active = InstanceKind::Panel;
                }
            }
            HostCommand::Chip(index) => {
                self.chat(self.active, ChatMsg::SuggestionClicked(index));
            }
            HostCommand::Sample => self.advise(AdvisoryMsg::SampleDataFilled),
            HostCommand::Crop(values) => {
                for (field, value) in CropField::ALL.into_iter().zip(values.into_iter().flatten()) {
                    self.advise(AdvisoryMsg::CropFieldChanged { field, value });
                }
                self.advise(AdvisoryMsg::CropSubmitted);
            }
            HostCommand::Fertilizer(index) => self.advise(AdvisoryMsg::FertilizerRequested(index)),
            HostCommand::Weather(city) => self.advise(AdvisoryMsg::ForecastRequested(city)),
            HostCommand::Feedback(form) => {
                self.dispatch(Msg::Account(AccountMsg::FeedbackSubmitted(form)))
            }
            HostCommand::Login(form) => self.dispatch(Msg::Account(AccountMsg::LoginSubmitted(form))),
            HostCommand::Signup(form) => {
                self.dispatch(Msg::Account(AccountMsg::SignupSubmitted(form)))
            }
            HostCommand::Logout => {
                if self.state.session().current().is_none() {
                    println!("Not signed in.");
                }
                self.dispatch(Msg::LogoutClicked);
            }
            HostCommand::Help => println!("{HELP_TEXT}"),
            HostCommand::Quit => return Flow::Quit,
            HostCommand::Unknown(line) => println!("Unknown command {line:?}; try /help"),
        }
        Flow::Continue
    }

    fn paint(&mut self) {
        let view = self.state.view();
        let lines = ui::render::render(&view, &mut self.cursor);
        if lines.is_empty() {
            return;
        }
        let mut stdout = io::stdout().lock();
        for line in lines {
            let _ = writeln!(stdout, "{line}");
        }
        let _ = write!(stdout, "{}{}", self.active.label(), ui::constants::PROMPT);
        let _ = stdout.flush();
    }
}
