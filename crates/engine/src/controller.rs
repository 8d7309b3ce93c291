use crate::board::Board;
use crate::commit::{commit, CommitOutcome, IdSeed};
use crate::config::EngineConfig;
use crate::drag::{DragSession, DragStart};
use crate::geometry::zoom_about;
use crate::history::PathHistory;
use crate::store::PathStore;
use crate::win::is_solved;
use flowpath_protocol::{ControllerUpdate, GestureEvent};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};

/// Pan/zoom applied to screen coordinates before they reach the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f32,
    pub pan: (f32, f32),
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan: (0.0, 0.0),
        }
    }
}

impl ViewTransform {
    pub fn to_local(&self, screen: (f32, f32)) -> (f32, f32) {
        (
            (screen.0 - self.pan.0) / self.scale,
            (screen.1 - self.pan.1) / self.scale,
        )
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan.0 += dx;
        self.pan.1 += dy;
    }

    pub fn zoom_about(&mut self, focal: (f32, f32), factor: f32, min_scale: f32, max_scale: f32) {
        let (scale, pan) = zoom_about(self.scale, self.pan, focal, factor, min_scale, max_scale);
        self.scale = scale;
        self.pan = pan;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    Idle,
    Disconnected,
}

/// Owns the committed paths for one puzzle and turns gesture phases into
/// drag-session calls and commits.
#[derive(Debug)]
pub struct PathController {
    board: Board,
    config: EngineConfig,
    paths: PathStore,
    history: PathHistory,
    session: Option<DragSession>,
    view: ViewTransform,
    seed: IdSeed,
    next_segment_id: u64,
}

impl PathController {
    pub fn new(board: Board, config: EngineConfig, seed: IdSeed) -> Self {
        Self {
            board,
            history: PathHistory::new(config.history_limit),
            config,
            paths: PathStore::new(),
            session: None,
            view: ViewTransform::default(),
            seed,
            next_segment_id: 0,
        }
    }

    pub fn with_paths(mut self, paths: PathStore) -> Self {
        self.paths = paths;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn paths(&self) -> &PathStore {
        &self.paths
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn history(&self) -> &PathHistory {
        &self.history
    }

    pub fn next_segment_id(&self) -> u64 {
        self.next_segment_id
    }

    pub fn is_solved(&self) -> bool {
        is_solved(&self.paths, &self.board)
    }

    pub fn handle(&mut self, event: GestureEvent) -> Vec<ControllerUpdate> {
        match event {
            GestureEvent::Begin { x, y } => self.begin((x, y)),
            GestureEvent::Update { x, y } => self.drag_to((x, y)),
            GestureEvent::End => self.end(),
            GestureEvent::Cancel => self.cancel(),
            GestureEvent::Pan { dx, dy } => {
                self.view.pan_by(dx, dy);
                Vec::new()
            }
            GestureEvent::Zoom {
                focal_x,
                focal_y,
                factor,
            } => {
                self.view.zoom_about(
                    (focal_x, focal_y),
                    factor,
                    self.config.min_scale,
                    self.config.max_scale,
                );
                Vec::new()
            }
            GestureEvent::Undo => self.undo(),
            GestureEvent::Redo => self.redo(),
            GestureEvent::Reset => self.reset(),
        }
    }

    /// Drains every pending event without blocking, forwarding the updates.
    pub fn pump(
        &mut self,
        events: &Receiver<GestureEvent>,
        updates: &Sender<ControllerUpdate>,
    ) -> PumpStatus {
        loop {
            match events.try_recv() {
                Ok(event) => {
                    if !self.dispatch(event, updates) {
                        self.discard_session();
                        return PumpStatus::Disconnected;
                    }
                }
                Err(TryRecvError::Empty) => return PumpStatus::Idle,
                Err(TryRecvError::Disconnected) => {
                    self.discard_session();
                    return PumpStatus::Disconnected;
                }
            }
        }
    }

    /// Blocks on `events` until the input side hangs up. A gesture still in
    /// flight at that point is discarded, not committed.
    pub fn run(&mut self, events: &Receiver<GestureEvent>, updates: &Sender<ControllerUpdate>) {
        while let Ok(event) = events.recv() {
            if !self.dispatch(event, updates) {
                break;
            }
        }
        self.discard_session();
    }

    fn dispatch(&mut self, event: GestureEvent, updates: &Sender<ControllerUpdate>) -> bool {
        for update in self.handle(event) {
            if updates.send(update).is_err() {
                tracing::debug!("update receiver dropped");
                return false;
            }
        }
        true
    }

    fn begin(&mut self, screen: (f32, f32)) -> Vec<ControllerUpdate> {
        let mut updates = Vec::new();
        if self.session.take().is_some() {
            updates.push(ControllerUpdate::PreviewCleared);
        }

        let geometry = self.config.geometry();
        let cell = geometry.cell_at(self.view.to_local(screen));
        let Some(DragStart { session, evicted }) =
            DragSession::start(cell, &self.board, &self.paths)
        else {
            return updates;
        };

        if let Some(next) = evicted {
            self.replace_paths(next);
            updates.push(self.paths_update());
        }
        let tip = geometry.snap(geometry.center(session.tip_cell()));
        updates.push(preview(&session, tip, true));
        self.session = Some(session);
        updates
    }

    fn drag_to(&mut self, screen: (f32, f32)) -> Vec<ControllerUpdate> {
        let local = self.view.to_local(screen);
        let geometry = self.config.geometry();
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        let update = session.update(local, &self.board, geometry);
        vec![preview(session, update.tip, update.path_changed)]
    }

    fn end(&mut self) -> Vec<ControllerUpdate> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        let CommitOutcome {
            paths,
            changed,
            next_segment_id,
        } = commit(
            &self.paths,
            &session,
            &self.board,
            self.seed,
            self.next_segment_id,
        );
        self.next_segment_id = next_segment_id;

        let mut updates = vec![ControllerUpdate::PreviewCleared];
        if changed {
            let next = paths.into_owned();
            self.replace_paths(next);
            updates.push(self.paths_update());
        }
        updates
    }

    fn cancel(&mut self) -> Vec<ControllerUpdate> {
        match self.session.take() {
            Some(_) => vec![ControllerUpdate::PreviewCleared],
            None => Vec::new(),
        }
    }

    fn undo(&mut self) -> Vec<ControllerUpdate> {
        let mut updates = self.cancel();
        let current = std::mem::take(&mut self.paths);
        match self.history.undo(current) {
            Ok(previous) => {
                self.paths = previous;
                updates.push(self.paths_update());
            }
            Err(current) => self.paths = current,
        }
        updates
    }

    fn redo(&mut self) -> Vec<ControllerUpdate> {
        let mut updates = self.cancel();
        let current = std::mem::take(&mut self.paths);
        match self.history.redo(current) {
            Ok(next) => {
                self.paths = next;
                updates.push(self.paths_update());
            }
            Err(current) => self.paths = current,
        }
        updates
    }

    fn reset(&mut self) -> Vec<ControllerUpdate> {
        let mut updates = self.cancel();
        if !self.paths.is_empty() {
            self.replace_paths(PathStore::new());
            updates.push(self.paths_update());
        }
        updates
    }

    fn discard_session(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!("discarded in-flight drag session");
        }
    }

    fn replace_paths(&mut self, next: PathStore) {
        let previous = std::mem::replace(&mut self.paths, next);
        self.history.record(previous);
    }

    fn paths_update(&self) -> ControllerUpdate {
        ControllerUpdate::Paths {
            payload: self.paths.to_payload(),
            solved: self.is_solved(),
        }
    }
}

fn preview(session: &DragSession, tip: (f32, f32), path_changed: bool) -> ControllerUpdate {
    ControllerUpdate::Preview {
        color: session.color().clone(),
        cells: session.path().to_vec(),
        tip: [tip.0, tip.1],
        path_changed,
    }
}
