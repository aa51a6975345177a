use crate::coords::Stage;
use crate::program::Scene;
use crate::time::FrameTime;

/// Per-frame context passed to `core::App::on_frame`.
///
/// `scene` persists between frames; the application edits what changed and
/// the program context writes only those differences.
pub struct FrameCtx<'a> {
    pub time: FrameTime,
    pub stage: Stage,
    pub scene: &'a mut Scene,
}
