use hexmap_shared::OffsetCoord;
use tracing::debug;

use crate::host::{ListenerId, ListenerKind, SurfaceHost, detach_all};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Leave,
    Cancel,
}

/// A pointer sample in surface-local screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
    pub button: PointerButton,
    pub pointer_id: u32,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self {
            phase,
            x,
            y,
            button: PointerButton::Primary,
            pointer_id: 1,
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionOutcome {
    /// Let the controller run its built-in action.
    #[default]
    Default,
    /// Suppress the built-in action.
    Handled,
    /// Turn the click into a paint gesture.
    StartPaint,
}

/// Strategy for the active tool. Every callback is optional.
///
/// Only `on_click` outcomes steer the controller. Paint callbacks have no
/// built-in action to suppress, so their outcome is ignored; `StartPaint`
/// there is logged as a delegate mistake.
pub trait InteractionDelegate {
    fn on_click(&mut self, _coord: OffsetCoord, _event: &PointerEvent) -> InteractionOutcome {
        InteractionOutcome::Default
    }

    fn on_paint_step(&mut self, _coord: OffsetCoord, _event: &PointerEvent) -> InteractionOutcome {
        InteractionOutcome::Default
    }

    fn on_paint_end(&mut self) -> InteractionOutcome {
        InteractionOutcome::Default
    }
}

/// Built-in actions the controller asks its owner to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultAction {
    Select(OffsetCoord),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    Deciding {
        origin: OffsetCoord,
        start: (f64, f64),
        pointer_id: u32,
    },
    Painting {
        last: OffsetCoord,
        pointer_id: u32,
    },
}

/// Click-versus-paint state machine over primary-button pointer input.
pub struct InteractionController {
    state: State,
    delegate: Option<Box<dyn InteractionDelegate>>,
    drag_threshold_px: f64,
    listeners: Vec<ListenerId>,
    destroyed: bool,
}

impl std::fmt::Debug for InteractionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionController")
            .field("state", &self.state)
            .field("has_delegate", &self.delegate.is_some())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl InteractionController {
    pub fn new(drag_threshold_px: f64) -> Self {
        Self {
            state: State::Idle,
            delegate: None,
            drag_threshold_px,
            listeners: Vec::new(),
            destroyed: false,
        }
    }

    pub fn attach(&mut self, host: &mut dyn SurfaceHost) -> Result<(), String> {
        self.listeners.push(host.attach(ListenerKind::Pointer)?);
        Ok(())
    }

    /// Swaps the active delegate. Applies to the very next callback.
    pub fn set_delegate(&mut self, delegate: Option<Box<dyn InteractionDelegate>>) {
        self.delegate = delegate;
    }

    pub fn has_delegate(&self) -> bool {
        self.delegate.is_some()
    }

    pub fn is_painting(&self) -> bool {
        matches!(self.state, State::Painting { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    /// Feeds one pointer sample. `coord` is the cell under the pointer, if any.
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        coord: Option<OffsetCoord>,
    ) -> Option<DefaultAction> {
        if self.destroyed {
            return None;
        }
        match (self.state, event.phase) {
            (State::Idle, PointerPhase::Down) => {
                if event.button != PointerButton::Primary {
                    return None;
                }
                if let Some(origin) = coord {
                    self.state = State::Deciding {
                        origin,
                        start: (event.x, event.y),
                        pointer_id: event.pointer_id,
                    };
                }
                None
            }
            (
                State::Deciding {
                    origin,
                    start,
                    pointer_id,
                },
                PointerPhase::Move,
            ) if pointer_id == event.pointer_id => {
                let travelled = (event.x - start.0).hypot(event.y - start.1);
                match coord {
                    Some(next) if next != origin && travelled > self.drag_threshold_px => {
                        self.state = State::Painting {
                            last: next,
                            pointer_id,
                        };
                        debug!(?origin, "paint gesture started");
                        self.paint_step(origin, event);
                        self.paint_step(next, event);
                    }
                    _ => {}
                }
                None
            }
            (
                State::Deciding {
                    origin, pointer_id, ..
                },
                PointerPhase::Up,
            ) if pointer_id == event.pointer_id => {
                self.state = State::Idle;
                self.click(origin, event)
            }
            (State::Deciding { .. }, PointerPhase::Leave | PointerPhase::Cancel) => {
                self.state = State::Idle;
                None
            }
            (State::Painting { last, pointer_id }, PointerPhase::Move)
                if pointer_id == event.pointer_id =>
            {
                if let Some(next) = coord.filter(|next| *next != last) {
                    self.state = State::Painting {
                        last: next,
                        pointer_id,
                    };
                    self.paint_step(next, event);
                }
                None
            }
            (
                State::Painting { .. },
                PointerPhase::Up | PointerPhase::Leave | PointerPhase::Cancel,
            ) => {
                self.state = State::Idle;
                self.paint_end();
                None
            }
            _ => None,
        }
    }

    fn click(&mut self, origin: OffsetCoord, event: &PointerEvent) -> Option<DefaultAction> {
        let outcome = match self.delegate.as_mut() {
            Some(delegate) => delegate.on_click(origin, event),
            None => InteractionOutcome::Default,
        };
        match outcome {
            InteractionOutcome::Default => Some(DefaultAction::Select(origin)),
            InteractionOutcome::Handled => None,
            InteractionOutcome::StartPaint => {
                self.paint_step(origin, event);
                self.paint_end();
                None
            }
        }
    }

    fn paint_step(&mut self, coord: OffsetCoord, event: &PointerEvent) {
        if let Some(delegate) = self.delegate.as_mut()
            && delegate.on_paint_step(coord, event) == InteractionOutcome::StartPaint
        {
            debug!(%coord, "StartPaint from a paint step ignored");
        }
    }

    fn paint_end(&mut self) {
        if let Some(delegate) = self.delegate.as_mut()
            && delegate.on_paint_end() == InteractionOutcome::StartPaint
        {
            debug!("StartPaint from paint end ignored");
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Releases pointer listeners and the delegate. Safe to call repeatedly.
    pub fn destroy(&mut self, host: &mut dyn SurfaceHost) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.state = State::Idle;
        self.delegate = None;
        detach_all(host, &mut self.listeners, "interaction");
        debug!("interaction destroyed");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::host::HeadlessHost;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Click(OffsetCoord),
        Step(OffsetCoord),
        End,
    }

    struct Recorder {
        calls: Rc<RefCell<Vec<Call>>>,
        click_outcome: InteractionOutcome,
        paint_outcome: InteractionOutcome,
    }

    impl InteractionDelegate for Recorder {
        fn on_click(&mut self, coord: OffsetCoord, _event: &PointerEvent) -> InteractionOutcome {
            self.calls.borrow_mut().push(Call::Click(coord));
            self.click_outcome
        }

        fn on_paint_step(&mut self, coord: OffsetCoord, _event: &PointerEvent) -> InteractionOutcome {
            self.calls.borrow_mut().push(Call::Step(coord));
            self.paint_outcome
        }

        fn on_paint_end(&mut self) -> InteractionOutcome {
            self.calls.borrow_mut().push(Call::End);
            self.paint_outcome
        }
    }

    fn controller(outcome: InteractionOutcome) -> (InteractionController, Rc<RefCell<Vec<Call>>>) {
        painting_controller(outcome, InteractionOutcome::Handled)
    }

    fn painting_controller(
        click_outcome: InteractionOutcome,
        paint_outcome: InteractionOutcome,
    ) -> (InteractionController, Rc<RefCell<Vec<Call>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut controller = InteractionController::new(5.0);
        controller.set_delegate(Some(Box::new(Recorder {
            calls: Rc::clone(&calls),
            click_outcome,
            paint_outcome,
        })));
        (controller, calls)
    }

    fn at(phase: PointerPhase, x: f64) -> PointerEvent {
        PointerEvent::new(phase, x, 0.0)
    }

    const A: OffsetCoord = OffsetCoord::new(0, 0);
    const B: OffsetCoord = OffsetCoord::new(0, 1);
    const C: OffsetCoord = OffsetCoord::new(0, 2);

    #[test]
    fn release_without_movement_is_a_click() {
        let (mut ctl, calls) = controller(InteractionOutcome::Default);
        assert_eq!(ctl.handle(&at(PointerPhase::Down, 0.0), Some(A)), None);
        ctl.handle(&at(PointerPhase::Move, 2.0), Some(A));
        let action = ctl.handle(&at(PointerPhase::Up, 2.0), Some(A));
        assert_eq!(action, Some(DefaultAction::Select(A)));
        assert_eq!(*calls.borrow(), vec![Call::Click(A)]);
        assert!(ctl.is_idle());
    }

    #[test]
    fn handled_click_suppresses_default() {
        let (mut ctl, _) = controller(InteractionOutcome::Handled);
        ctl.handle(&at(PointerPhase::Down, 0.0), Some(A));
        assert_eq!(ctl.handle(&at(PointerPhase::Up, 0.0), Some(A)), None);
    }

    #[test]
    fn start_paint_click_paints_one_cell() {
        let (mut ctl, calls) = controller(InteractionOutcome::StartPaint);
        ctl.handle(&at(PointerPhase::Down, 0.0), Some(A));
        ctl.handle(&at(PointerPhase::Up, 0.0), Some(A));
        assert_eq!(*calls.borrow(), vec![Call::Click(A), Call::Step(A), Call::End]);
    }

    #[test]
    fn drag_across_cells_paints_each_once() {
        let (mut ctl, calls) = controller(InteractionOutcome::Default);
        ctl.handle(&at(PointerPhase::Down, 0.0), Some(A));
        ctl.handle(&at(PointerPhase::Move, 10.0), Some(B));
        assert!(ctl.is_painting());
        for x in [11.0, 12.0, 13.0] {
            ctl.handle(&at(PointerPhase::Move, x), Some(B));
        }
        ctl.handle(&at(PointerPhase::Move, 30.0), Some(C));
        ctl.handle(&at(PointerPhase::Move, 31.0), None);
        ctl.handle(&at(PointerPhase::Move, 32.0), Some(C));
        assert_eq!(ctl.handle(&at(PointerPhase::Up, 32.0), Some(C)), None);
        assert_eq!(
            *calls.borrow(),
            vec![Call::Step(A), Call::Step(B), Call::Step(C), Call::End]
        );
    }

    #[test]
    fn paint_outcomes_do_not_steer_the_gesture() {
        let (mut ctl, calls) =
            painting_controller(InteractionOutcome::StartPaint, InteractionOutcome::StartPaint);
        ctl.handle(&at(PointerPhase::Down, 0.0), Some(A));
        ctl.handle(&at(PointerPhase::Move, 10.0), Some(B));
        ctl.handle(&at(PointerPhase::Move, 30.0), Some(C));
        assert!(ctl.is_painting());
        assert_eq!(ctl.handle(&at(PointerPhase::Up, 30.0), Some(C)), None);
        assert!(ctl.is_idle());

        ctl.handle(&at(PointerPhase::Down, 0.0), Some(A));
        assert_eq!(ctl.handle(&at(PointerPhase::Up, 0.0), Some(A)), None);
        assert_eq!(
            *calls.borrow(),
            vec![
                Call::Step(A),
                Call::Step(B),
                Call::Step(C),
                Call::End,
                Call::Click(A),
                Call::Step(A),
                Call::End,
            ]
        );
    }

    #[test]
    fn small_jitter_into_neighbour_stays_a_click() {
        let (mut ctl, calls) = controller(InteractionOutcome::Default);
        ctl.handle(&at(PointerPhase::Down, 0.0), Some(A));
        ctl.handle(&at(PointerPhase::Move, 3.0), Some(B));
        ctl.handle(&at(PointerPhase::Up, 3.0), Some(B));
        assert_eq!(*calls.borrow(), vec![Call::Click(A)]);
    }

    #[test]
    fn leaving_mid_paint_ends_the_gesture() {
        let (mut ctl, calls) = controller(InteractionOutcome::Default);
        ctl.handle(&at(PointerPhase::Down, 0.0), Some(A));
        ctl.handle(&at(PointerPhase::Move, 10.0), Some(B));
        ctl.handle(&at(PointerPhase::Leave, 10.0), None);
        assert!(ctl.is_idle());
        assert_eq!(calls.borrow().last(), Some(&Call::End));
    }

    #[test]
    fn non_primary_or_unresolved_press_is_ignored() {
        let (mut ctl, calls) = controller(InteractionOutcome::Default);
        let middle = at(PointerPhase::Down, 0.0).with_button(PointerButton::Middle);
        ctl.handle(&middle, Some(A));
        ctl.handle(&at(PointerPhase::Down, 0.0), None);
        assert!(ctl.is_idle());
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn swapping_delegate_applies_immediately() {
        let (mut ctl, first) = controller(InteractionOutcome::Default);
        ctl.handle(&at(PointerPhase::Down, 0.0), Some(A));
        let second = Rc::new(RefCell::new(Vec::new()));
        ctl.set_delegate(Some(Box::new(Recorder {
            calls: Rc::clone(&second),
            click_outcome: InteractionOutcome::Handled,
            paint_outcome: InteractionOutcome::Handled,
        })));
        assert_eq!(ctl.handle(&at(PointerPhase::Up, 0.0), Some(A)), None);
        assert!(first.borrow().is_empty());
        assert_eq!(*second.borrow(), vec![Call::Click(A)]);
    }

    #[test]
    fn without_delegate_clicks_select() {
        let mut ctl = InteractionController::new(5.0);
        ctl.handle(&at(PointerPhase::Down, 0.0), Some(A));
        assert_eq!(
            ctl.handle(&at(PointerPhase::Up, 0.0), Some(A)),
            Some(DefaultAction::Select(A))
        );
    }

    #[test]
    fn destroy_detaches_and_is_idempotent() {
        let mut host = HeadlessHost::new(10.0, 10.0);
        let (mut ctl, calls) = controller(InteractionOutcome::Default);
        ctl.attach(&mut host).expect("attach");
        ctl.destroy(&mut host);
        ctl.destroy(&mut host);
        assert_eq!(host.listener_count(), 0);
        ctl.handle(&at(PointerPhase::Down, 0.0), Some(A));
        ctl.handle(&at(PointerPhase::Up, 0.0), Some(A));
        assert!(calls.borrow().is_empty());
    }
}
