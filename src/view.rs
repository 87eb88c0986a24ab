//! The interaction controller.
//!
//! [`DiagramView`] owns the diagram, the viewport, and the gesture state. The
//! host forwards [`InputEvent`]s and gets back [`Action`]s telling it what to
//! do (redraw, change cursor, report a result). Nothing here depends on a GUI
//! toolkit, so the whole interaction model is testable headless.

use serde::Serialize;

use crate::config::DiagramConfig;
use crate::error::DiagramError;
use crate::geometry::{Point, Rect, Size};
use crate::hit::SpatialIndex;
use crate::input::{Button, Command, Cursor, InputEvent, InputState, Modifiers, WheelDelta};
use crate::layout::LayoutEngine;
use crate::model::{self, Diagram, TableId};
use crate::render::{DrawCommand, Renderer};
use crate::viewport::Viewport;

/// Margin around the content when reporting a scrollable area.
const CONTENT_MARGIN: f64 = 50.0;

/// Starter schema a host can put in its editor.
pub const SAMPLE_SCHEMA: &str = "// Sample Database Schema

Table users {
  id integer [pk]
  username varchar
  email varchar
  created_at timestamp
}

Table posts {
  id integer [pk]
  title varchar
  content text
  user_id integer
  created_at timestamp
}

Table comments {
  id integer [pk]
  post_id integer
  user_id integer
  content text
  created_at timestamp
}

// Relationships
Ref: posts.user_id > users.id
Ref: comments.post_id > posts.id
Ref: comments.user_id > users.id
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerateSummary {
    pub tables: usize,
    pub relationships: usize,
    /// Relationships with an undeclared endpoint table; never drawn.
    pub dangling: usize,
}

/// What the host should do after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    SetCursor(Cursor),
    DiagramGenerated(GenerateSummary),
    GenerateFailed(DiagramError),
}

#[derive(Debug, Clone)]
pub struct DiagramView {
    diagram: Diagram,
    viewport: Viewport,
    input: InputState,
    layout: LayoutEngine,
    renderer: Renderer,
    /// Table header under the pointer while idle.
    hovered: Option<TableId>,
    /// Last known pointer position.
    pointer: Option<Point>,
}

impl Default for DiagramView {
    fn default() -> Self {
        Self::new(DiagramConfig::default())
    }
}

impl DiagramView {
    pub fn new(config: DiagramConfig) -> Self {
        Self {
            diagram: Diagram::new(),
            viewport: Viewport::new(config.viewport),
            input: InputState::Idle,
            layout: config.layout,
            renderer: Renderer::new(config.style, config.layout.metrics),
            hovered: None,
            pointer: None,
        }
    }

    // --- Queries ---

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Mutable access for hosts that restore a saved zoom or pan.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn input_state(&self) -> InputState {
        self.input
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Fresh hit-test index for the current model and viewport.
    pub fn hit_index(&self) -> SpatialIndex {
        SpatialIndex::build(&self.diagram, &self.viewport, &self.renderer.metrics)
    }

    /// Screen-space area covered by the diagram plus a margin, for host
    /// scrollbars. `None` when there are no tables.
    pub fn content_bounds(&self) -> Option<Rect> {
        self.diagram
            .bounds()
            .map(|r| self.viewport.rect_to_screen(r).inflate(CONTENT_MARGIN))
    }

    /// Draw commands for the current frame.
    pub fn render(&self) -> Vec<DrawCommand> {
        self.renderer.render(&self.diagram, &self.viewport)
    }

    // --- Diagram lifecycle ---

    /// Parse `source`, replace the diagram, and lay it out.
    ///
    /// On error the current diagram is left untouched. The viewport is never
    /// reset here; manual table positions are.
    pub fn generate(&mut self, source: &str) -> Result<GenerateSummary, DiagramError> {
        if source.trim().is_empty() {
            return Err(DiagramError::EmptySource);
        }

        let mut diagram = model::parse(source);
        if diagram.is_empty() {
            tracing::info!("no tables found in schema");
            return Err(DiagramError::NoTables);
        }

        self.layout.layout(&mut diagram);

        let mut dangling = 0;
        for fk in diagram.dangling_references() {
            tracing::warn!(
                from = %format!("{}.{}", fk.from_table, fk.from_column),
                to = %format!("{}.{}", fk.to_table, fk.to_column),
                "reference to undeclared table will not be drawn"
            );
            dangling += 1;
        }

        let summary = GenerateSummary {
            tables: diagram.len(),
            relationships: diagram.relationships().len(),
            dangling,
        };
        tracing::info!(
            tables = summary.tables,
            relationships = summary.relationships,
            dangling = summary.dangling,
            "diagram generated"
        );

        self.diagram = diagram;
        self.input = InputState::Idle;
        self.hovered = None;
        Ok(summary)
    }

    pub fn clear(&mut self) {
        self.diagram = Diagram::new();
        self.input = InputState::Idle;
        self.hovered = None;
    }

    // --- Input ---

    pub fn handle(&mut self, event: InputEvent) -> Vec<Action> {
        match event {
            InputEvent::PointerDown {
                position,
                button,
                modifiers,
            } => self.on_pointer_down(position, button, modifiers),
            InputEvent::PointerMove { position } => self.on_pointer_move(position),
            InputEvent::PointerUp { position, .. } => self.on_pointer_up(position),
            InputEvent::Wheel { position, delta } => self.on_wheel(position, delta),
            InputEvent::Resize { size } => {
                self.viewport.set_size(size);
                vec![Action::RenderNeeded]
            }
            InputEvent::Command(command) => self.execute(command),
        }
    }

    pub fn on_pointer_down(
        &mut self,
        position: Point,
        button: Button,
        modifiers: Modifiers,
    ) -> Vec<Action> {
        self.pointer = Some(position);
        if !self.input.is_idle() {
            return Vec::new();
        }

        match button {
            Button::Middle => self.start_pan(position),
            Button::Primary if modifiers.pans() => self.start_pan(position),
            Button::Primary => {
                let Some(id) = self.hit_index().header_at(position) else {
                    return Vec::new();
                };
                let Some(table) = self.diagram.table(id) else {
                    return Vec::new();
                };
                let drag_offset = position - self.viewport.logical_to_screen(table.position);
                tracing::debug!(table = %table.name, "drag started");
                self.input = InputState::DraggingTable {
                    id,
                    drag_offset,
                    last_screen: position,
                };
                vec![Action::SetCursor(Cursor::Move)]
            }
            Button::Secondary => Vec::new(),
        }
    }

    fn start_pan(&mut self, position: Point) -> Vec<Action> {
        self.input = InputState::Panning {
            last_screen: position,
        };
        vec![Action::SetCursor(Cursor::Grabbing)]
    }

    pub fn on_pointer_move(&mut self, position: Point) -> Vec<Action> {
        self.pointer = Some(position);
        match self.input {
            InputState::Idle => self.update_hover(position),
            InputState::Panning { last_screen } => {
                self.viewport.pan_by(position - last_screen);
                self.input = InputState::Panning {
                    last_screen: position,
                };
                vec![Action::RenderNeeded]
            }
            InputState::DraggingTable { id, drag_offset, .. } => {
                // Offset was captured in screen space; the model stays logical.
                let logical = self.viewport.screen_to_logical(position - drag_offset);
                self.diagram.move_table(id, logical);
                self.input = InputState::DraggingTable {
                    id,
                    drag_offset,
                    last_screen: position,
                };
                vec![Action::RenderNeeded]
            }
        }
    }

    fn update_hover(&mut self, position: Point) -> Vec<Action> {
        let hovered = self.hit_index().header_at(position);
        if hovered == self.hovered {
            return Vec::new();
        }
        self.hovered = hovered;
        vec![Action::SetCursor(self.idle_cursor())]
    }

    fn idle_cursor(&self) -> Cursor {
        if self.hovered.is_some() {
            Cursor::Grab
        } else {
            Cursor::Default
        }
    }

    pub fn on_pointer_up(&mut self, position: Point) -> Vec<Action> {
        self.pointer = Some(position);
        if self.input.is_idle() {
            return Vec::new();
        }
        self.input = InputState::Idle;
        self.hovered = self.hit_index().header_at(position);
        vec![Action::SetCursor(self.idle_cursor())]
    }

    pub fn on_wheel(&mut self, position: Option<Point>, delta: WheelDelta) -> Vec<Action> {
        if position.is_some() {
            self.pointer = position;
        }
        let changed = if delta.dy < 0.0 {
            self.viewport.zoom_in(position)
        } else if delta.dy > 0.0 {
            self.viewport.zoom_out(position)
        } else {
            false
        };
        self.after_zoom(changed)
    }

    pub fn execute(&mut self, command: Command) -> Vec<Action> {
        match command {
            Command::Generate(source) => match self.generate(&source) {
                Ok(summary) => vec![Action::DiagramGenerated(summary), Action::RenderNeeded],
                Err(e) => vec![Action::GenerateFailed(e)],
            },
            Command::ZoomIn => {
                let changed = self.viewport.zoom_in(None);
                self.after_zoom(changed)
            }
            Command::ZoomOut => {
                let changed = self.viewport.zoom_out(None);
                self.after_zoom(changed)
            }
            Command::ResetZoom => {
                let changed = self.viewport.reset_zoom(None);
                self.after_zoom(changed)
            }
            Command::ResetView => {
                self.viewport.reset();
                self.after_zoom(true)
            }
            Command::Clear => {
                self.clear();
                vec![Action::RenderNeeded, Action::SetCursor(Cursor::Default)]
            }
        }
    }

    /// Zoom is instantaneous and does not end a gesture. A table being
    /// dragged keeps the grabbed point under the pointer; when idle, the
    /// header under a stationary pointer may have changed.
    fn after_zoom(&mut self, changed: bool) -> Vec<Action> {
        if !changed {
            return Vec::new();
        }
        let mut actions = vec![Action::RenderNeeded];
        match self.input {
            InputState::DraggingTable { id, last_screen, .. } => {
                if let Some(table) = self.diagram.table(id) {
                    let drag_offset = last_screen - self.viewport.logical_to_screen(table.position);
                    self.input = InputState::DraggingTable {
                        id,
                        drag_offset,
                        last_screen,
                    };
                }
            }
            InputState::Idle => {
                if let Some(pointer) = self.pointer {
                    actions.extend(self.update_hover(pointer));
                }
            }
            InputState::Panning { .. } => {}
        }
        actions
    }

    /// Size the viewport to the content extent (origin to bottom-right
    /// corner plus margin) and return that size. Used for one-shot exports.
    pub fn fit_to_content(&mut self) -> Size {
        let size = self.content_bounds().map_or_else(Size::default, |r| {
            Size::new(r.right().max(0.0), r.bottom().max(0.0))
        });
        self.viewport.set_size(size);
        size
    }
}

/// Convenience for hosts that only need a one-shot picture.
pub fn render_source(
    source: &str,
    config: &DiagramConfig,
) -> Result<(Vec<DrawCommand>, Size), DiagramError> {
    let mut view = DiagramView::new(*config);
    view.generate(source)?;
    let size = view.fit_to_content();
    Ok((view.render(), size))
}
