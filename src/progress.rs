/*!
 * Progress reporting for translation passes.
 *
 * A pass moves through `Idle -> Starting -> Translating -> Completed`, or to
 * `Error` when the document itself cannot be read or written. Each move is
 * published to a `ProgressSink` as a `ProgressEvent`.
 */

use parking_lot::Mutex;
use serde::Serialize;
use log::warn;

/// Number of characters shown in unit previews
const PREVIEW_CHARS: usize = 50;

/// Stage of a translation pass as seen by a UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Starting,
    Translating,
    Completed,
    Error,
}

/// Event sent to a progress sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub stage: ProgressStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProgressEvent {
    pub fn starting(message: impl Into<String>) -> Self {
        Self { stage: ProgressStage::Starting, current: None, total: None, message: Some(message.into()) }
    }

    pub fn translating(current: usize, total: usize, message: Option<String>) -> Self {
        Self { stage: ProgressStage::Translating, current: Some(current), total: Some(total), message }
    }

    pub fn completed(message: impl Into<String>) -> Self {
        Self { stage: ProgressStage::Completed, current: None, total: None, message: Some(message.into()) }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { stage: ProgressStage::Error, current: None, total: None, message: Some(message.into()) }
    }

    /// Percentage complete for translating events
    pub fn percent(&self) -> Option<u8> {
        match (self.current, self.total) {
            (Some(current), Some(total)) if total > 0 => Some(((current.min(total) * 100) / total) as u8),
            _ => None,
        }
    }
}

/// Receiver of progress events
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Sink that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Completion notice for a single unit, produced by the batch scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitProgress {
    /// Units completed so far, starting at 1
    pub current: usize,
    pub total: usize,
    /// Start of the unit's source text
    pub text_preview: String,
}

/// Short preview of a unit for progress messages
pub fn preview(text: &str) -> String {
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", head)
}

/// State of one document pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassState {
    Idle,
    Starting,
    Translating { current: usize, total: usize },
    Completed,
    Error(String),
}

impl PassState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error(_))
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: &PassState) -> bool {
        match (self, next) {
            (Self::Idle, Self::Starting) => true,
            (Self::Starting, Self::Translating { .. }) => true,
            (Self::Starting, Self::Completed) => true,
            (Self::Translating { current, .. }, Self::Translating { current: next_current, .. }) => next_current >= current,
            (Self::Translating { .. }, Self::Completed) => true,
            (state, Self::Error(_)) => !state.is_terminal(),
            _ => false,
        }
    }
}

/// Drives the pass state machine and publishes each step
pub struct PassTracker<'a> {
    state: Mutex<PassState>,
    sink: &'a dyn ProgressSink,
}

impl<'a> PassTracker<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { state: Mutex::new(PassState::Idle), sink }
    }

    pub fn state(&self) -> PassState {
        self.state.lock().clone()
    }

    fn advance(&self, next: PassState, event: ProgressEvent) -> bool {
        {
            let mut state = self.state.lock();
            if !state.can_transition_to(&next) {
                warn!("Ignoring progress transition {:?} -> {:?}", *state, next);
                return false;
            }
            *state = next;
        }
        self.sink.emit(event);
        true
    }

    pub fn start(&self, message: impl Into<String>) -> bool {
        self.advance(PassState::Starting, ProgressEvent::starting(message))
    }

    pub fn translating(&self, current: usize, total: usize, message: Option<String>) -> bool {
        self.advance(
            PassState::Translating { current, total },
            ProgressEvent::translating(current, total, message),
        )
    }

    pub fn complete(&self, message: impl Into<String>) -> bool {
        self.advance(PassState::Completed, ProgressEvent::completed(message))
    }

    pub fn fail(&self, message: impl Into<String>) -> bool {
        let message = message.into();
        self.advance(PassState::Error(message.clone()), ProgressEvent::error(message))
    }
}
