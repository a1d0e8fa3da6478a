// Keyhid Translation Engine
// Live capture and log replay driven through resolve, encode and emit
//
// Every event runs tracker update, resolution, encoding and emission to
// completion before the next one is read. Stop requests are honoured only
// between events so a press report is always followed by its release.

use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::encoder::encode;
use super::resolver::{LayoutResolver, Resolution};
use crate::input::{CaptureError, KeyEvent, KeyEventSource};
use crate::key::{ControlKey, LogicalKey, ScanCodeMap};
use crate::layout::{LayoutName, LayoutTable};
use crate::output::{HidEmitter, HidError};
use crate::replay::{Token, TokenizeError};
use crate::settings::{Config, ConfigError};
use crate::state::{is_state_key, KeyTransition, ModifierState, ModifierStateTracker};

/// How long the live loop waits for an event before re-checking the stop flag
pub const LIVE_POLL_TIMEOUT: Duration = Duration::from_millis(200);

/// Engine settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub layout: LayoutName,
    /// Sleep after each press and each release report
    pub hold: Duration,
    pub initial_num_lock: bool,
    pub scan_codes: ScanCodeMap,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: LayoutName::Azerty,
            hold: Duration::from_millis(20),
            initial_num_lock: true,
            scan_codes: ScanCodeMap::default(),
        }
    }
}

impl EngineConfig {
    /// Engine settings from a validated configuration file
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            layout: config.layout.name,
            hold: config.output.hold(),
            initial_num_lock: config.capture.initial_num_lock,
            scan_codes: config.numpad.scan_code_map()?,
        })
    }
}

/// Result of processing one event or token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// This many taps were written
    Emitted(usize),
    /// Modifier, lock or key-release event; nothing to send
    Consumed,
    /// No mapping on the active layout
    Skipped,
}

/// Running totals for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Key taps written to the device
    pub taps: u64,
    /// Keys or tokens with no mapping
    pub unresolved: u64,
    /// Events absorbed by modifier tracking
    pub consumed: u64,
    /// Replay ended on an unterminated token
    pub truncated: bool,
}

/// Engine error types
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Device(#[from] HidError),

    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Translates key events and log tokens into HID reports.
pub struct TranslationEngine<W: Write> {
    resolver: LayoutResolver,
    tracker: ModifierStateTracker,
    emitter: HidEmitter<W>,
    stats: EngineStats,
}

impl<W: Write> TranslationEngine<W> {
    pub fn new(table: Arc<LayoutTable>, emitter: HidEmitter<W>) -> Self {
        Self {
            resolver: LayoutResolver::new(table),
            tracker: ModifierStateTracker::default(),
            emitter,
            stats: EngineStats::default(),
        }
    }

    pub fn with_config(config: &EngineConfig, writer: W) -> Self {
        Self::with_emitter(config, HidEmitter::new(writer, config.hold))
    }

    /// Build around an emitter that is already open; its hold time is kept
    pub fn with_emitter(config: &EngineConfig, emitter: HidEmitter<W>) -> Self {
        let table = Arc::new(LayoutTable::for_name(config.layout));
        Self {
            resolver: LayoutResolver::with_scan_codes(table, config.scan_codes.clone()),
            tracker: ModifierStateTracker::new(config.initial_num_lock),
            emitter,
            stats: EngineStats::default(),
        }
    }

    /// Build from a configuration file's contents
    pub fn from_config(config: &Config, writer: W) -> Result<Self, EngineError> {
        let engine_config = EngineConfig::from_config(config)?;
        Ok(Self::with_config(&engine_config, writer))
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn modifier_state(&self) -> ModifierState {
        self.tracker.snapshot()
    }

    pub fn layout(&self) -> &LayoutTable {
        self.resolver.table()
    }

    pub fn emitter(&self) -> &HidEmitter<W> {
        &self.emitter
    }

    /// Handle one captured key event
    pub fn process_event(&mut self, event: &KeyEvent) -> Result<EventOutcome, EngineError> {
        let transition = self.tracker.update(event);
        if is_state_key(event) {
            self.stats.consumed += 1;
            return Ok(EventOutcome::Consumed);
        }
        if matches!(transition, KeyTransition::Released | KeyTransition::Ignored) {
            return Ok(EventOutcome::Consumed);
        }

        let Some(key) = self.resolver.classify(&event.key_name, event.scan_code) else {
            log::warn!(
                "Unknown key '{}' (scan code {}), skipping",
                event.key_name,
                event.scan_code
            );
            self.stats.unresolved += 1;
            return Ok(EventOutcome::Skipped);
        };

        let state = self.tracker.snapshot();
        let resolution = self.resolver.resolve(&key, state);
        self.emit(resolution, state, &key)
    }

    /// Handle one replayed log token
    pub fn process_token(&mut self, token: &Token) -> Result<EventOutcome, EngineError> {
        let resolution = match token {
            // CRLF logs: the '\n' alone is the line break
            Token::Char('\r') => return Ok(EventOutcome::Consumed),
            Token::Char(c) => self.resolver.resolve_char(*c),
            Token::Control(name) => match token_char(name) {
                Some(c) => self.resolver.resolve_char(c),
                None => match ControlKey::from_str(name) {
                    Ok(control) => self
                        .resolver
                        .resolve(&LogicalKey::Control(control), ModifierState::new()),
                    Err(_) => Resolution::Unresolved,
                },
            },
        };
        self.emit(resolution, ModifierState::new(), token)
    }

    /// Replay a token stream until it ends or `stop` is raised.
    ///
    /// An unterminated token ends the replay with `truncated` set; other
    /// read errors are returned.
    pub fn replay<I>(&mut self, tokens: I, stop: &AtomicBool) -> Result<EngineStats, EngineError>
    where
        I: IntoIterator<Item = Result<Token, TokenizeError>>,
    {
        for item in tokens {
            match item {
                Ok(token) => {
                    self.process_token(&token)?;
                }
                Err(TokenizeError::Unterminated { partial, offset }) => {
                    log::warn!("Log ends inside token '[{}' at byte {}", partial, offset);
                    self.stats.truncated = true;
                    break;
                }
                Err(e) => return Err(e.into()),
            }
            if stop.load(Ordering::SeqCst) {
                log::info!("Replay stopped");
                break;
            }
        }
        Ok(self.stats)
    }

    /// Translate events from `source` until `stop` is raised or the source closes
    pub fn run_live<S>(
        &mut self,
        source: &mut S,
        stop: &AtomicBool,
    ) -> Result<EngineStats, EngineError>
    where
        S: KeyEventSource + ?Sized,
    {
        log::info!("Live translation started ({} layout)", self.resolver.table().name());
        while !stop.load(Ordering::SeqCst) {
            match source.next_event(LIVE_POLL_TIMEOUT) {
                Ok(Some(event)) => {
                    self.process_event(&event)?;
                }
                Ok(None) => {}
                Err(CaptureError::Closed) => {
                    log::info!("Input device closed");
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }
        log::info!(
            "Live translation stopped: {} taps, {} unresolved, {} reports written",
            self.stats.taps,
            self.stats.unresolved,
            self.emitter.reports_written()
        );
        Ok(self.stats)
    }

    fn emit(
        &mut self,
        resolution: Resolution,
        state: ModifierState,
        what: &dyn std::fmt::Display,
    ) -> Result<EventOutcome, EngineError> {
        let Some(symbol) = resolution.symbol() else {
            log::warn!(
                "No mapping for {} on {} layout, skipping",
                what,
                self.resolver.table().name()
            );
            self.stats.unresolved += 1;
            return Ok(EventOutcome::Skipped);
        };

        let strokes = encode(&symbol, state);
        if let Err(e) = self.emitter.emit_all(&strokes) {
            self.tracker.reset();
            return Err(e.into());
        }
        self.stats.taps += strokes.len() as u64;
        Ok(EventOutcome::Emitted(strokes.len()))
    }
}

/// Character denoted by a bracket token, for `[[]`, `[<]` and brace names
fn token_char(name: &str) -> Option<char> {
    match name {
        "LEFTBRACE" => return Some('['),
        "RIGHTBRACE" => return Some(']'),
        _ => {}
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
