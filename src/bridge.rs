//! Host-side adapter between editor selections, the state machine and the
//! display surface

use crate::clock::{Clock, SystemClock};
use crate::messages::{DisplayMessage, HostEvent, SelectionEvent};
use crate::state_machine::SessionStateMachine;
use crate::types::ContextMap;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

/// MTTC target, logged alongside each measurement
pub const MTTC_TARGET_MS: i64 = 30_000;

pub struct SelectionBridge {
    machine: SessionStateMachine,
    display: UnboundedSender<DisplayMessage>,
    clock: Box<dyn Clock>,
}

impl SelectionBridge {
    pub fn new(machine: SessionStateMachine, display: UnboundedSender<DisplayMessage>) -> Self {
        Self::with_clock(machine, display, Box::new(SystemClock))
    }

    pub fn with_clock(
        machine: SessionStateMachine,
        display: UnboundedSender<DisplayMessage>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self { machine, display, clock }
    }

    /// Bridge plus the receiving end of its display channel
    pub fn channel(machine: SessionStateMachine) -> (Self, UnboundedReceiver<DisplayMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(machine, tx), rx)
    }

    pub fn machine(&self) -> &SessionStateMachine {
        &self.machine
    }

    /// Run a selection through the pipeline and push the result to the display.
    /// Blank selections are ignored.
    pub fn on_selection(&mut self, event: SelectionEvent) -> Option<ContextMap> {
        if event.selected_text.trim().is_empty() {
            return None;
        }

        self.send(DisplayMessage::Loading);

        let context_map = self.machine.process_selection(
            &event.selected_text,
            &event.file_name,
            &event.file_language,
            event.line_number,
        );

        self.send(DisplayMessage::UpdateContext {
            payload: context_map.clone(),
        });

        let mttc = self.clock.now_millis() - context_map.cached_at;
        info!("[MTTC Metric] {}ms (Target: <{}ms)", mttc, MTTC_TARGET_MS);

        Some(context_map)
    }

    pub fn on_host_event(&self, event: HostEvent) {
        match event {
            HostEvent::NavigateLink { payload } => {
                info!(
                    "[Validation] User clicked: {} ({} {})",
                    payload.nugget_id, payload.source, payload.url
                );
            }
            HostEvent::LogMetric { payload } => {
                info!("[Metric] {}: {}", payload.label, payload.value);
            }
        }
    }

    /// Empty the session cache and tell the display to clear
    pub fn clear(&mut self) {
        self.machine.clear_session_cache();
        self.send(DisplayMessage::Clear);
    }

    fn send(&self, message: DisplayMessage) {
        if self.display.send(message).is_err() {
            warn!("Display channel closed; dropping message");
        }
    }
}
