pub mod ast;
pub mod config;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod layout;
pub mod lexer;
pub mod measure;
pub mod model;
pub mod parser;
pub mod render;
pub mod style;
pub mod svg;
pub mod view;
pub mod viewport;

use wasm_bindgen::prelude::*;

pub use config::DiagramConfig;
pub use error::DiagramError;
pub use geometry::{Point, Rect, Size};
pub use input::{Button, Command, Cursor, InputEvent, Modifiers, WheelDelta};
pub use model::{Diagram, TableId, parse};
pub use render::DrawCommand;
pub use view::{Action, DiagramView, GenerateSummary, SAMPLE_SCHEMA};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Render schema source to SVG at the given zoom (default 1.0).
#[wasm_bindgen(js_name = "dbmlToSvg")]
pub fn render_dbml(source: &str, zoom: Option<f64>) -> Result<String, String> {
    let mut view = DiagramView::default();
    view.generate(source).map_err(|e| e.to_string())?;
    if let Some(zoom) = zoom {
        view.viewport_mut().zoom_to(zoom, Some(Point::default()));
    }
    Ok(canvas_svg(&mut view))
}

/// Serialize the current frame sized to its content. The host's viewport
/// size is restored afterwards.
fn canvas_svg(view: &mut DiagramView) -> String {
    let viewport_size = view.viewport().size();
    let size = view.fit_to_content();
    let svg = svg::to_svg(&view.render(), size, view.renderer().style.palette.background);
    view.viewport_mut().set_size(viewport_size);
    svg
}

/// Interactive diagram for a browser host. Pointer and command methods
/// return `true` when the host should redraw.
#[wasm_bindgen]
pub struct DiagramCanvas {
    view: DiagramView,
    cursor: Cursor,
}

#[wasm_bindgen]
impl DiagramCanvas {
    /// `config` is optional TOML overriding the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<DiagramCanvas, String> {
        let config = match config {
            Some(text) => DiagramConfig::from_toml(&text).map_err(|e| e.to_string())?,
            None => DiagramConfig::default(),
        };
        Ok(Self {
            view: DiagramView::new(config),
            cursor: Cursor::Default,
        })
    }

    #[wasm_bindgen(js_name = "sampleSchema")]
    pub fn sample_schema() -> String {
        SAMPLE_SCHEMA.to_string()
    }

    /// Returns the summary as JSON.
    pub fn generate(&mut self, source: &str) -> Result<String, String> {
        let summary = self.view.generate(source).map_err(|e| e.to_string())?;
        serde_json::to_string(&summary).map_err(|e| e.to_string())
    }

    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        self.dispatch(InputEvent::Resize {
            size: Size::new(width, height),
        })
    }

    #[wasm_bindgen(js_name = "pointerDown")]
    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16, ctrl: bool, meta: bool) -> bool {
        let Some(button) = Button::from_dom(button) else {
            return false;
        };
        self.dispatch(InputEvent::PointerDown {
            position: Point::new(x, y),
            button,
            modifiers: Modifiers { ctrl, meta },
        })
    }

    #[wasm_bindgen(js_name = "pointerMove")]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.dispatch(InputEvent::PointerMove {
            position: Point::new(x, y),
        })
    }

    #[wasm_bindgen(js_name = "pointerUp")]
    pub fn pointer_up(&mut self, x: f64, y: f64, button: i16) -> bool {
        self.dispatch(InputEvent::PointerUp {
            position: Point::new(x, y),
            button: Button::from_dom(button).unwrap_or(Button::Primary),
        })
    }

    pub fn wheel(&mut self, x: f64, y: f64, dy: f64) -> bool {
        self.dispatch(InputEvent::Wheel {
            position: Some(Point::new(x, y)),
            delta: WheelDelta { dy },
        })
    }

    #[wasm_bindgen(js_name = "zoomIn")]
    pub fn zoom_in(&mut self) -> bool {
        self.dispatch(InputEvent::Command(Command::ZoomIn))
    }

    #[wasm_bindgen(js_name = "zoomOut")]
    pub fn zoom_out(&mut self) -> bool {
        self.dispatch(InputEvent::Command(Command::ZoomOut))
    }

    #[wasm_bindgen(js_name = "resetZoom")]
    pub fn reset_zoom(&mut self) -> bool {
        self.dispatch(InputEvent::Command(Command::ResetZoom))
    }

    #[wasm_bindgen(js_name = "resetView")]
    pub fn reset_view(&mut self) -> bool {
        self.dispatch(InputEvent::Command(Command::ResetView))
    }

    pub fn clear(&mut self) -> bool {
        self.dispatch(InputEvent::Command(Command::Clear))
    }

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.view.viewport().zoom()
    }

    /// CSS cursor for the canvas element.
    #[wasm_bindgen(getter)]
    pub fn cursor(&self) -> String {
        self.cursor.css_name().to_string()
    }

    #[wasm_bindgen(js_name = "drawCommands")]
    pub fn draw_commands(&self) -> Result<String, String> {
        serde_json::to_string(&self.view.render()).map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "toSvg")]
    pub fn to_svg(&mut self) -> String {
        canvas_svg(&mut self.view)
    }

    fn dispatch(&mut self, event: InputEvent) -> bool {
        let mut redraw = false;
        for action in self.view.handle(event) {
            match action {
                Action::RenderNeeded => redraw = true,
                Action::SetCursor(cursor) => self.cursor = cursor,
                Action::DiagramGenerated(_) | Action::GenerateFailed(_) => {}
            }
        }
        redraw
    }
}
