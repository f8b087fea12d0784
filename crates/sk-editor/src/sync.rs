//! Bidirectional sync between the scene and the active dialect's code.
//!
//! Canvas → code regenerates (or patches) the code for the active dialect.
//! Code → canvas parses the edited text and swaps the scene's entities.
//! While the user is typing, canvas changes never overwrite the code; they
//! mark it stale and regeneration waits for blur.

use crate::config::EditorConfig;
use crate::debounce::Debouncer;
use sk_core::{
    Dialect, ElementPatch, ElementPatcher, EntityId, MarkupPatcher, ParseError, Scene,
};
use smallvec::SmallVec;
use std::time::{Duration, Instant};

/// Events from one blur or tick; at most a parse and a regeneration.
pub type SyncEvents = SmallVec<[SyncEvent; 2]>;

/// What a sync step did.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The code was regenerated from the scene.
    Regenerated { dialect: Dialect },
    /// One element of the code was rewritten in place.
    Patched { dialect: Dialect, id: EntityId },
    /// The scene was replaced by parsed code.
    SceneReplaced { dialect: Dialect },
    /// The code did not parse; the scene was left untouched.
    ParseFailed { dialect: Dialect, error: ParseError },
    /// A canvas change arrived while the user was editing code.
    MarkedStale,
}

pub struct SyncController {
    active: Dialect,
    /// Current text of the code editor.
    code: String,
    user_editing: bool,
    /// The scene changed since `code` was last generated.
    stale: bool,
    regenerate: Debouncer,
    parse: Debouncer,
    /// Edited text waiting for the parse debouncer.
    pending_text: Option<String>,
    last_error: Option<ParseError>,
    patcher: Option<Box<dyn ElementPatcher>>,
}

impl std::fmt::Debug for SyncController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncController")
            .field("active", &self.active)
            .field("user_editing", &self.user_editing)
            .field("stale", &self.stale)
            .field("pending_text", &self.pending_text.is_some())
            .finish_non_exhaustive()
    }
}

impl SyncController {
    pub fn new(active: Dialect, regenerate_delay: Duration, parse_delay: Duration) -> Self {
        Self {
            active,
            code: String::new(),
            user_editing: false,
            stale: true,
            regenerate: Debouncer::new(regenerate_delay),
            parse: Debouncer::new(parse_delay),
            pending_text: None,
            last_error: None,
            patcher: Some(Box::new(MarkupPatcher)),
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(
            config.initial_dialect,
            config.regenerate_delay(),
            config.parse_delay(),
        )
    }

    /// Replace the single-element patcher; `None` always regenerates.
    pub fn with_patcher(mut self, patcher: Option<Box<dyn ElementPatcher>>) -> Self {
        self.patcher = patcher;
        self
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn active(&self) -> Dialect {
        self.active
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_editing(&self) -> bool {
        self.user_editing
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn last_error(&self) -> Option<&ParseError> {
        self.last_error.as_ref()
    }

    /// Earliest instant at which `tick` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.regenerate.due(), self.parse.due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ─── Canvas → code ───────────────────────────────────────────────────

    /// Generate the active dialect from `scene` right now.
    pub fn regenerate(&mut self, scene: &Scene) -> SyncEvent {
        self.regenerate.cancel();
        self.code = self.active.generate(scene);
        self.stale = false;
        log::debug!("regenerated {} ({} bytes)", self.active, self.code.len());
        SyncEvent::Regenerated {
            dialect: self.active,
        }
    }

    pub fn on_scene_changed(&mut self, scene: &Scene, now: Instant) -> Option<SyncEvent> {
        if self.user_editing {
            self.stale = true;
            return Some(SyncEvent::MarkedStale);
        }
        if self.regenerate.is_immediate() {
            return Some(self.regenerate(scene));
        }
        self.stale = true;
        self.regenerate.schedule(now);
        None
    }

    /// A single entity changed in a way `patch` describes. Rewrites just its
    /// element when the active dialect has a patcher and the code is in
    /// step with the scene; otherwise behaves like `on_scene_changed`.
    pub fn on_entity_patched(
        &mut self,
        scene: &Scene,
        id: EntityId,
        patch: &ElementPatch,
        now: Instant,
    ) -> Option<SyncEvent> {
        let in_step = !self.user_editing && !self.stale && !self.regenerate.is_pending();
        if let Some(patcher) = self.patcher.as_ref().filter(|p| p.dialect() == self.active)
            && in_step
        {
            match patcher.patch(&self.code, id, patch) {
                Ok(code) => {
                    self.code = code;
                    log::debug!("patched {id:?} in {}", self.active);
                    return Some(SyncEvent::Patched {
                        dialect: self.active,
                        id,
                    });
                }
                Err(e) => log::debug!("patch fell back to regeneration: {e}"),
            }
        }
        self.on_scene_changed(scene, now)
    }

    // ─── Code → canvas ───────────────────────────────────────────────────

    pub fn on_code_edited(&mut self, scene: &mut Scene, text: &str, now: Instant) -> Option<SyncEvent> {
        self.user_editing = true;
        self.code = text.to_string();
        self.pending_text = Some(text.to_string());
        if self.parse.is_immediate() {
            return self.flush_parse(scene);
        }
        self.parse.schedule(now);
        None
    }

    /// Parse the pending edit, if any.
    fn flush_parse(&mut self, scene: &mut Scene) -> Option<SyncEvent> {
        self.parse.cancel();
        let text = self.pending_text.take()?;
        match self.active.parse(&text) {
            Ok(parsed) => {
                log::debug!(
                    "parsed {}: {} shapes, {} texts",
                    self.active,
                    parsed.shapes.len(),
                    parsed.texts.len()
                );
                scene.replace_entities(parsed);
                self.last_error = None;
                // The scene now mirrors the code; keep the user's text as is.
                self.stale = false;
                self.regenerate.cancel();
                Some(SyncEvent::SceneReplaced {
                    dialect: self.active,
                })
            }
            Err(error) => {
                log::warn!("keeping last good scene: {error}");
                self.last_error = Some(error.clone());
                Some(SyncEvent::ParseFailed {
                    dialect: self.active,
                    error,
                })
            }
        }
    }

    /// The code editor lost focus.
    pub fn on_code_blur(&mut self, scene: &mut Scene) -> SyncEvents {
        self.user_editing = false;
        self.regenerate.cancel();
        let mut events: SyncEvents = self.flush_parse(scene).into_iter().collect();
        if self.stale {
            events.push(self.regenerate(scene));
        }
        events
    }

    /// Make `dialect` the active one. A pending edit in the old dialect is
    /// parsed first, then the code is regenerated in the new one.
    pub fn switch_dialect(&mut self, dialect: Dialect, scene: &mut Scene) -> SyncEvents {
        let mut events: SyncEvents = self.flush_parse(scene).into_iter().collect();
        self.user_editing = false;
        self.regenerate.cancel();
        self.active = dialect;
        events.push(self.regenerate(scene));
        events
    }

    /// Fire whichever debouncers are due.
    pub fn tick(&mut self, scene: &mut Scene, now: Instant) -> SyncEvents {
        let mut events = SyncEvents::new();
        if self.parse.fire_if_due(now)
            && let Some(event) = self.flush_parse(scene)
        {
            events.push(event);
        }
        if self.regenerate.fire_if_due(now) {
            if self.user_editing {
                self.stale = true;
                events.push(SyncEvent::MarkedStale);
            } else {
                events.push(self.regenerate(scene));
            }
        }
        events
    }
}
