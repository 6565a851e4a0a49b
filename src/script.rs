use std::path::Path;

use burn::prelude::Backend;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    inference::Classifier,
    labels::Prediction,
    session::Session,
    stroke::{PenColor, PenWidth},
    surface::{DrawingSurface, StrokeEvent},
};

/// One recorded input of an interactive session.
///
/// Serialized as `{"down": [x, y]}`, `{"color": "red"}`, `{"width": 5}`, `"undo"`, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptStep {
    Down([i64; 2]),
    Move([i64; 2]),
    Up([i64; 2]),
    Color(PenColor),
    Width(PenWidth),
    Undo,
    Clear,
}

impl ScriptStep {
    fn event(self) -> Option<StrokeEvent> {
        match self {
            ScriptStep::Down([x, y]) => Some(StrokeEvent::Down { x, y }),
            ScriptStep::Move([x, y]) => Some(StrokeEvent::Move { x, y }),
            ScriptStep::Up([x, y]) => Some(StrokeEvent::Up { x, y }),
            _ => None,
        }
    }
}

pub fn parse_script(json: &str) -> Result<Vec<ScriptStep>> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_script(path: &Path) -> Result<Vec<ScriptStep>> {
    parse_script(&std::fs::read_to_string(path)?)
}

/// Replays steps onto a bare surface, without classifying anything.
pub fn replay_on_surface(surface: &mut DrawingSurface, steps: &[ScriptStep]) {
    for step in steps {
        match *step {
            ScriptStep::Color(color) => surface.set_pen_color(color),
            ScriptStep::Width(width) => surface.set_pen_width(width),
            ScriptStep::Undo => {
                surface.undo();
            }
            ScriptStep::Clear => surface.clear(),
            pointer => {
                if let Some(event) = pointer.event() {
                    surface.handle(event);
                }
            }
        }
    }
}

/// Replays steps through a session, calling `on_prediction` after every completed stroke.
pub fn replay<B, C, F>(
    session: &mut Session<B, C>,
    steps: &[ScriptStep],
    mut on_prediction: F,
) -> Result<()>
where
    B: Backend,
    C: Classifier<B>,
    F: FnMut(&Session<B, C>, &Prediction),
{
    for step in steps {
        match *step {
            ScriptStep::Color(color) => session.set_pen_color(color),
            ScriptStep::Width(width) => session.set_pen_width(width.get())?,
            ScriptStep::Undo => {
                session.undo();
            }
            ScriptStep::Clear => session.clear(),
            pointer => {
                if let Some(event) = pointer.event() {
                    if let Some(prediction) = session.handle(event)? {
                        on_prediction(session, &prediction);
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::CanvasConfig;

    const SCRIPT: &str = r#"[
        {"color": "red"},
        {"width": 7},
        {"down": [10, 10]},
        {"move": [40, 10]},
        {"up": [40, 10]},
        {"down": [100, 100]},
        {"up": [100, 100]},
        "undo",
        {"color": "white"},
        "clear"
    ]"#;

    #[test]
    fn parses_every_step_kind() {
        let steps = parse_script(SCRIPT).unwrap();

        assert_eq!(steps.len(), 10);
        assert_eq!(steps[0], ScriptStep::Color(PenColor::Red));
        assert_eq!(steps[1], ScriptStep::Width(PenWidth::new(7).unwrap()));
        assert_eq!(steps[2], ScriptStep::Down([10, 10]));
        assert_eq!(steps[7], ScriptStep::Undo);
        assert_eq!(steps[9], ScriptStep::Clear);
    }

    #[test]
    fn rejects_out_of_range_width_and_unknown_color() {
        assert!(parse_script(r#"[{"width": 16}]"#).is_err());
        assert!(parse_script(r#"[{"color": "teal"}]"#).is_err());
    }

    #[test]
    fn replays_onto_surface() {
        let steps = parse_script(SCRIPT).unwrap();
        let mut surface = DrawingSurface::new(&CanvasConfig::new()).unwrap();

        replay_on_surface(&mut surface, &steps[..7]);
        assert_eq!(surface.strokes().len(), 2);
        assert_eq!(surface.strokes().strokes()[0].color, PenColor::Red);
        assert_eq!(surface.strokes().strokes()[0].width.get(), 7);

        replay_on_surface(&mut surface, &steps[7..8]);
        assert_eq!(surface.strokes().len(), 1);

        replay_on_surface(&mut surface, &steps[8..]);
        assert!(surface.strokes().is_empty());
        assert_eq!(surface.pen().color, PenColor::White);
    }
}
