//! Headless application shell: owns the engine and replays input into it.

use kurbo::{Point, Size};
use snapboard_core::{Element, ElementId, Engine, EngineConfig, EngineError, EngineEvent};
use std::cell::Cell;
use std::rc::Rc;

use crate::script::ScriptStep;
use crate::shortcuts::{ShortcutAction, ShortcutRegistry};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no shortcut bound to {0}")]
    UnknownShortcut(String),
    #[error("{0:?} needs an idle engine")]
    Busy(ShortcutAction),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Size of the workspace container elements are clamped to.
    pub container: Size,
    pub engine: EngineConfig,
    /// Number of grid-placed elements to start with.
    pub elements: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            container: Size::new(1200.0, 800.0),
            engine: EngineConfig::default(),
            elements: 0,
        }
    }
}

/// Outcome of replaying a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub steps: usize,
    pub failed: usize,
    /// Engine events emitted during the replay.
    pub events: usize,
    /// Queued moves dropped in favour of a later one in the same frame.
    pub coalesced: u64,
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    engine: Engine,
    events: Rc<Cell<usize>>,
}

impl App {
    /// Create a new application with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new application with custom configuration.
    pub fn with_config(config: AppConfig) -> Self {
        let mut engine = Engine::new(config.engine.clone());
        let events = Rc::new(Cell::new(0));
        let counter = Rc::clone(&events);
        engine.subscribe(Box::new(move |event: &EngineEvent| {
            counter.set(counter.get() + 1);
            log::debug!("{event:?}");
        }));

        if config.elements > 0 {
            engine.generate_test_elements(config.elements);
        }
        Self { config, engine, events }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Replay `steps` in order. A failing step is logged and skipped.
    pub fn run(&mut self, steps: &[ScriptStep]) -> ReplayStats {
        let before = self.events.get();
        let coalesced_before = self.engine.coalesced_moves();
        let mut stats = ReplayStats::default();
        for (index, step) in steps.iter().enumerate() {
            stats.steps += 1;
            if let Err(err) = self.apply(step) {
                log::error!("Step {index} failed: {err}");
                stats.failed += 1;
            }
        }
        // Leave no half-finished frame behind.
        if let Err(err) = self.engine.flush_frame() {
            log::error!("Final frame failed: {err}");
        }
        stats.events = self.events.get() - before;
        stats.coalesced = self.engine.coalesced_moves() - coalesced_before;
        log::info!(
            "Replayed {} steps ({} failed, {} events, {} moves coalesced)",
            stats.steps,
            stats.failed,
            stats.events,
            stats.coalesced
        );
        stats
    }

    pub fn apply(&mut self, step: &ScriptStep) -> Result<(), AppError> {
        let container = self.config.container;
        match step {
            ScriptStep::Pointer { event } => self.engine.handle_pointer(*event, container)?,
            ScriptStep::QueueMove { position } => self.engine.queue_pointer_move(*position, container),
            ScriptStep::Frame => self.engine.flush_frame()?,
            ScriptStep::Key { key, ctrl, shift } => {
                let action = ShortcutRegistry::find(key, *ctrl, *shift)
                    .ok_or_else(|| AppError::UnknownShortcut(key.clone()))?;
                self.run_shortcut(action)?;
            }
        }
        Ok(())
    }

    pub fn run_shortcut(&mut self, action: ShortcutAction) -> Result<(), AppError> {
        if action == ShortcutAction::Cancel {
            if !self.engine.cancel_interaction() {
                self.engine.clear_selection();
            }
            return Ok(());
        }
        if !self.engine.interaction().is_idle() {
            return Err(AppError::Busy(action));
        }

        let selected: Vec<ElementId> = self.engine.selection().ids().to_vec();
        match action {
            ShortcutAction::SelectAll => {
                let all: Vec<ElementId> = self.engine.elements().map(Element::id).collect();
                self.engine.select_many(&all);
            }
            ShortcutAction::Group => {
                self.engine.group_selected()?;
            }
            ShortcutAction::Ungroup => {
                self.engine.ungroup_selected()?;
            }
            ShortcutAction::Duplicate => {
                let copies: Vec<ElementId> = selected
                    .iter()
                    .filter_map(|&id| self.engine.duplicate_element(id))
                    .collect();
                self.engine.select_many(&copies);
            }
            ShortcutAction::Delete => {
                for id in selected {
                    self.engine.remove_element(id);
                }
            }
            ShortcutAction::BringToFront => {
                for id in selected {
                    self.engine.bring_to_front(id);
                }
            }
            ShortcutAction::SendToBack => {
                for id in selected.into_iter().rev() {
                    self.engine.send_to_back(id);
                }
            }
            ShortcutAction::Cancel => {}
        }
        Ok(())
    }

    /// Topmost element under `point`, for hosts doing their own hit testing.
    pub fn element_at(&self, point: Point) -> Option<ElementId> {
        self.engine.store().element_at(point)
    }

    pub fn export_json(&self) -> Result<String, AppError> {
        Ok(self.engine.export_json()?)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
