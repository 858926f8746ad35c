//! Session state machine: Idle → Trigger → Retrieval → Display → Idle
//!
//! One `process_selection` call runs extraction, scoring, ranking and the
//! cache write to completion. The machine is not synchronized; callers that
//! share it across tasks must serialize access themselves.

use crate::catalog::{CatalogSource, EmptyCatalog};
use crate::clock::{Clock, SystemClock};
use crate::extractor::extract_intent_metadata;
use crate::ranking::retrieve_context_nuggets;
use crate::types::*;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct SessionStateMachine {
    current_state: State,
    state_history: Vec<StateTransition>,
    session_cache: HashMap<String, ContextMap>,
    catalog: Box<dyn CatalogSource>,
    clock: Box<dyn Clock>,
    weights: ScoreWeights,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new(Box::new(EmptyCatalog))
    }
}

impl SessionStateMachine {
    /// Machine over a catalog source, using the wall clock and default weights
    pub fn new(catalog: Box<dyn CatalogSource>) -> Self {
        Self::with_parts(catalog, Box::new(SystemClock), ScoreWeights::default())
    }

    pub fn with_parts(
        catalog: Box<dyn CatalogSource>,
        clock: Box<dyn Clock>,
        weights: ScoreWeights,
    ) -> Self {
        Self {
            current_state: State::Idle,
            state_history: Vec::new(),
            session_cache: HashMap::new(),
            catalog,
            clock,
            weights,
        }
    }

    /// Run one selection through the full state cycle and cache the result
    pub fn process_selection(
        &mut self,
        selected_text: &str,
        file_name: &str,
        file_language: &str,
        line_number: u32,
    ) -> ContextMap {
        let start = Instant::now();
        info!(
            "Processing selection: file='{}', language='{}', line={}, chars={}",
            file_name,
            file_language,
            line_number,
            selected_text.chars().count()
        );

        // Idle -> Trigger
        self.advance();
        let metadata = extract_intent_metadata(
            selected_text,
            file_name,
            file_language,
            line_number,
            self.clock.now_millis(),
        );

        // Trigger -> Retrieval
        self.advance();
        let nuggets = match self.retrieve(&metadata) {
            Ok(nuggets) => nuggets,
            Err(e) => {
                warn!("Retrieval failed: {:#}. Continuing with no context.", e);
                Vec::new()
            }
        };

        // Retrieval -> Display
        self.advance();
        let context_map = self.generate_context_map(metadata, nuggets);
        self.session_cache
            .insert(context_map.session_id.clone(), context_map.clone());

        // Display -> Idle
        self.advance();

        info!(
            "Selection processed: session={}, {} nuggets in {}ms",
            context_map.session_id,
            context_map.nuggets.len(),
            start.elapsed().as_millis()
        );

        context_map
    }

    /// Wrap a run's output into a cacheable, uniquely-identified map
    pub fn generate_context_map(
        &self,
        metadata: IntentMetadata,
        nuggets: Vec<ContextRecord>,
    ) -> ContextMap {
        let cached_at = self.clock.now_millis();

        ContextMap {
            metadata,
            nuggets,
            cached_at,
            session_id: generate_session_id(cached_at),
        }
    }

    pub fn state(&self) -> State {
        self.current_state
    }

    /// Every transition since construction, oldest first
    pub fn state_history(&self) -> &[StateTransition] {
        &self.state_history
    }

    /// Drop all cached context maps. State and history are untouched.
    pub fn clear_session_cache(&mut self) {
        let dropped = self.session_cache.len();
        self.session_cache.clear();
        debug!("Cleared session cache ({} entries)", dropped);
    }

    pub fn cached_context(&self, session_id: &str) -> Option<&ContextMap> {
        self.session_cache.get(session_id)
    }

    pub fn cache_len(&self) -> usize {
        self.session_cache.len()
    }

    /// Load the catalog, then score and rank it against the selection
    fn retrieve(&self, metadata: &IntentMetadata) -> Result<Vec<ContextRecord>> {
        let catalog = self
            .catalog
            .load()
            .with_context(|| format!("loading catalog '{}'", self.catalog.name()))?;

        let nuggets =
            retrieve_context_nuggets(metadata, &catalog, self.clock.now(), &self.weights);
        debug!(
            "Ranked {} catalog records down to {} nuggets",
            catalog.len(),
            nuggets.len()
        );

        Ok(nuggets)
    }

    /// Step to the successor of the current state and log the transition
    fn advance(&mut self) {
        let Some((to, trigger)) = self.current_state.successor() else {
            warn!("State {:?} has no successor; staying put", self.current_state);
            return;
        };

        let from = self.current_state;
        self.current_state = to;
        self.state_history.push(StateTransition {
            from,
            to,
            trigger: trigger.to_string(),
            data: TransitionData {
                timestamp: self.clock.now_millis(),
            },
        });

        debug!("State transition {:?} -> {:?} ({})", from, to, trigger);
    }
}

fn generate_session_id(now_ms: i64) -> String {
    format!("session-{}-{}", now_ms, Uuid::new_v4().simple())
}
