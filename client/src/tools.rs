use hexmap_shared::{ControlAssignment, LocationType, MarkerAssignment, OffsetCoord};
use tracing::debug;

use crate::interaction::{InteractionDelegate, InteractionOutcome, PointerEvent};
use crate::registry::MapStores;

/// Editing tools the map view can activate.
#[derive(Debug, Clone, PartialEq)]
pub enum Tool {
    /// Clicks select cells; nothing is edited.
    Inspect,
    ControlBrush {
        owner_id: String,
        owner_name: Option<String>,
        color: Option<String>,
    },
    Eraser,
    MarkerPlacer {
        location_name: String,
        location_type: LocationType,
    },
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Inspect => "inspect",
            Self::ControlBrush { .. } => "control-brush",
            Self::Eraser => "eraser",
            Self::MarkerPlacer { .. } => "marker-placer",
        }
    }

    /// Delegate that applies this tool to `stores`.
    pub fn delegate(self, stores: &MapStores) -> Box<dyn InteractionDelegate> {
        Box::new(ToolDelegate {
            tool: self,
            stores: stores.clone(),
            painted: 0,
        })
    }
}

struct ToolDelegate {
    tool: Tool,
    stores: MapStores,
    painted: usize,
}

impl ToolDelegate {
    fn paints(&self) -> bool {
        matches!(self.tool, Tool::ControlBrush { .. } | Tool::Eraser)
    }
}

impl InteractionDelegate for ToolDelegate {
    fn on_click(&mut self, coord: OffsetCoord, _event: &PointerEvent) -> InteractionOutcome {
        match &self.tool {
            Tool::Inspect => InteractionOutcome::Default,
            Tool::ControlBrush { .. } | Tool::Eraser => InteractionOutcome::StartPaint,
            Tool::MarkerPlacer {
                location_name,
                location_type,
            } => {
                self.stores.markers.upsert(MarkerAssignment::new(
                    coord,
                    location_name,
                    location_type.clone(),
                ));
                InteractionOutcome::Handled
            }
        }
    }

    fn on_paint_step(&mut self, coord: OffsetCoord, _event: &PointerEvent) -> InteractionOutcome {
        match &self.tool {
            Tool::ControlBrush {
                owner_id,
                owner_name,
                color,
            } => {
                self.stores.control.upsert(ControlAssignment {
                    owner_name: owner_name.clone(),
                    color: color.clone(),
                    ..ControlAssignment::new(coord, owner_id)
                });
            }
            Tool::Eraser => {
                self.stores.control.remove(coord);
                self.stores.markers.remove(coord);
            }
            Tool::Inspect | Tool::MarkerPlacer { .. } => return InteractionOutcome::Default,
        }
        self.painted += 1;
        InteractionOutcome::Handled
    }

    fn on_paint_end(&mut self) -> InteractionOutcome {
        if self.paints() {
            debug!(tool = self.tool.name(), cells = self.painted, "paint finished");
        }
        self.painted = 0;
        InteractionOutcome::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::PointerPhase;

    fn event() -> PointerEvent {
        PointerEvent::new(PointerPhase::Up, 0.0, 0.0)
    }

    fn brush() -> Tool {
        Tool::ControlBrush {
            owner_id: "harpers".to_string(),
            owner_name: Some("Harpers".to_string()),
            color: None,
        }
    }

    #[test]
    fn brush_paints_control() {
        let stores = MapStores::new();
        let mut delegate = brush().delegate(&stores);
        let coord = OffsetCoord::new(1, 2);
        assert_eq!(delegate.on_click(coord, &event()), InteractionOutcome::StartPaint);
        delegate.on_paint_step(coord, &event());
        delegate.on_paint_step(OffsetCoord::new(1, 3), &event());
        delegate.on_paint_end();
        assert_eq!(stores.control.len(), 2);
        let entry = stores.control.get(coord).expect("painted cell");
        assert_eq!(entry.owner_name.as_deref(), Some("Harpers"));
    }

    #[test]
    fn eraser_removes_control_and_markers() {
        let stores = MapStores::new();
        let coord = OffsetCoord::new(0, 0);
        stores
            .control
            .set_assignments(&[ControlAssignment::new(coord, "legion")]);
        stores
            .markers
            .set_assignments(&[MarkerAssignment::new(coord, "Waterdeep", "Stadt")]);
        let mut delegate = Tool::Eraser.delegate(&stores);
        delegate.on_paint_step(coord, &event());
        assert!(stores.control.is_empty());
        assert!(stores.markers.is_empty());
    }

    #[test]
    fn marker_placer_handles_click() {
        let stores = MapStores::new();
        let mut delegate = Tool::MarkerPlacer {
            location_name: "Candlekeep".to_string(),
            location_type: LocationType::Fortress,
        }
        .delegate(&stores);
        let outcome = delegate.on_click(OffsetCoord::new(4, 4), &event());
        assert_eq!(outcome, InteractionOutcome::Handled);
        assert!(stores.markers.get_by_location_name("Candlekeep").is_some());
    }

    #[test]
    fn inspect_falls_through() {
        let stores = MapStores::new();
        let mut delegate = Tool::Inspect.delegate(&stores);
        let coord = OffsetCoord::new(0, 0);
        assert_eq!(delegate.on_click(coord, &event()), InteractionOutcome::Default);
        assert_eq!(delegate.on_paint_step(coord, &event()), InteractionOutcome::Default);
        assert!(stores.control.is_empty());
    }
}
