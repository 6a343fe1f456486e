use crate::runtime::apply_parent_offsets;
use crate::{
    AnimationComponent, Diagnostic, DiagnosticSink, Frame, ImageHandle, TrackId, TrackKind,
    VisibilityWindow, interpolate_frame, physical_frame,
};

/// Resolved affine parameters of one draw. Skews are in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawTransform {
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub skew_x: f32,
    pub skew_y: f32,
    pub alpha: f32,
}

impl DrawTransform {
    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            x: frame.x,
            y: frame.y,
            scale_x: frame.scale_x,
            scale_y: frame.scale_y,
            skew_x: frame.skew_x,
            skew_y: frame.skew_y,
            alpha: frame.alpha,
        }
    }

    /// `[a, b, c, d, tx, ty]` mapping image-local `(u, v)` to `(a*u + c*v + tx, b*u + d*v + ty)`.
    pub fn matrix(&self) -> [f32; 6] {
        let (sin_x, cos_x) = self.skew_x.to_radians().sin_cos();
        let (sin_y, cos_y) = self.skew_y.to_radians().sin_cos();
        [
            cos_x * self.scale_x,
            sin_x * self.scale_x,
            -sin_y * self.scale_y,
            cos_y * self.scale_y,
            self.x,
            self.y,
        ]
    }

    #[cfg(feature = "glam")]
    pub fn to_affine2(&self) -> glam::Affine2 {
        let [a, b, c, d, tx, ty] = self.matrix();
        glam::Affine2::from_cols_array(&[a, b, c, d, tx, ty])
    }
}

/// One image placement for the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawInstruction {
    pub track: TrackId,
    pub track_name: String,
    /// Animation that controls this track this tick; empty for preview poses.
    pub animation: String,
    pub image: String,
    pub image_handle: Option<ImageHandle>,
    pub transform: DrawTransform,
    /// Entity-level center offset, added by the renderer on top of `transform`.
    pub offset: [f32; 2],
}

/// Resolved output of one render pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderData {
    pub draws: Vec<DrawInstruction>,
    /// Final frame of every track that produced a contribution, indexed by track id.
    pub frames: Vec<Option<Frame>>,
}

impl RenderData {
    pub fn frame(&self, track: TrackId) -> Option<&Frame> {
        self.frames.get(track.index()).and_then(Option::as_ref)
    }
}

/// Changes whenever anything that can affect the draw list changes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CacheKey {
    pub generation: u64,
    /// Sum of monotonic playback progress, quantized.
    pub progress: i64,
}

impl CacheKey {
    const PROGRESS_QUANTUM: f64 = 4096.0;

    pub fn new(generation: u64, progress: f64) -> Self {
        Self {
            generation,
            progress: (progress * Self::PROGRESS_QUANTUM).round() as i64,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RenderCache {
    key: Option<CacheKey>,
    data: RenderData,
    rebuilds: u64,
}

impl RenderCache {
    pub fn is_valid_for(&self, key: CacheKey) -> bool {
        self.key == Some(key)
    }

    pub fn data(&self) -> &RenderData {
        &self.data
    }

    /// Number of times the draw list was rebuilt.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }

    pub(crate) fn store(&mut self, key: CacheKey, data: RenderData) -> &RenderData {
        self.key = Some(key);
        self.data = data;
        self.rebuilds += 1;
        &self.data
    }
}

/// Nearest non-empty image before `physical` among the window's visible frames.
fn inherit_image(window: &VisibilityWindow, frames: &[Frame], physical: usize) -> Option<String> {
    let logical = window.physical_to_logical(physical)?;
    (0..logical)
        .rev()
        .filter_map(|l| window.logical_to_physical_checked(l))
        .filter_map(|p| frames.get(p))
        .find(|f| !f.image.is_empty())
        .map(|f| f.image.clone())
}

/// Resolve which animation owns each track and produce the ordered draw list.
///
/// For every drawable track the last active animation with a valid contribution wins. Finished
/// one-shots yield to anything still running and hold their last frame only when every
/// animation on the entity has finished.
pub fn build_render_data(
    component: &AnimationComponent,
    sink: &mut dyn DiagnosticSink,
) -> RenderData {
    let tracks = component.tracks();
    let states = component.states();
    let strategy = component.mode().strategy();
    let all_finished = !states.is_empty() && states.iter().all(|s| s.is_finished());

    let mut resolved: Vec<Option<Frame>> = vec![None; tracks.len()];
    let mut owners: Vec<Option<usize>> = vec![None; tracks.len()];

    for (id, track) in tracks.iter() {
        if track.kind == TrackKind::Definition || component.is_hidden(id) {
            continue;
        }
        let always_visible =
            !strategy.honors_track_markers() || component.is_always_visible(id);

        if states.is_empty() {
            let Some(preview) = component.preview_frame() else {
                continue;
            };
            let physical = preview.min(tracks.frame_count().saturating_sub(1));
            if let Some(frame) = track.frame(physical) {
                if (frame.is_visible() || always_visible)
                    && (track.kind != TrackKind::Visual || !frame.image.is_empty())
                {
                    resolved[id.index()] = Some(frame.clone());
                }
            }
            continue;
        }

        for (state_index, state) in states.iter().enumerate().rev() {
            'contribution: {
                if state.is_waiting() || (state.is_finished() && !all_finished) {
                    break 'contribution;
                }
                let window = state.window();
                let position = state.render_frame();
                let Some(physical) = physical_frame(window, position) else {
                    break 'contribution;
                };
                if !window.is_visible(physical) {
                    break 'contribution;
                }
                let Some(own) = track.frame(physical) else {
                    break 'contribution;
                };
                if !own.is_visible() && !always_visible {
                    break 'contribution;
                }
                let Some(mut frame) = interpolate_frame(window, &track.frames, position) else {
                    break 'contribution;
                };
                if track.kind == TrackKind::Visual && frame.image.is_empty() {
                    match inherit_image(window, &track.frames, physical) {
                        Some(image) => frame.image = image,
                        None => {
                            sink.report(Diagnostic::MissingImage {
                                track: track.name.clone(),
                                animation: state.name().to_string(),
                                frame: physical,
                            });
                            break 'contribution;
                        }
                    }
                }
                resolved[id.index()] = Some(frame);
                owners[id.index()] = Some(state_index);
            }
            if resolved[id.index()].is_some() {
                break;
            }
        }
    }

    let fallback = |parent: TrackId, child: TrackId| -> Option<Frame> {
        let state = states.get(owners.get(child.index()).copied().flatten()?)?;
        let track = tracks.get(parent)?;
        interpolate_frame(state.window(), &track.frames, state.render_frame())
    };
    apply_parent_offsets(
        component.parent_bindings(),
        tracks,
        &mut resolved,
        &fallback,
        sink,
    );

    let atlas = component.atlas();
    let offset = component.center_offset();
    let mut draws = Vec::new();
    for (id, track) in tracks.iter() {
        if track.kind != TrackKind::Visual {
            continue;
        }
        let Some(frame) = resolved[id.index()].as_ref() else {
            continue;
        };
        let image_handle = match atlas {
            Some(atlas) => match atlas.image(&frame.image) {
                Some(handle) => Some(handle),
                None => {
                    sink.report(Diagnostic::UnresolvedImage {
                        track: track.name.clone(),
                        image: frame.image.clone(),
                    });
                    continue;
                }
            },
            None => None,
        };
        let animation = owners[id.index()]
            .and_then(|i| states.get(i))
            .map(|s| s.name().to_string())
            .unwrap_or_default();
        draws.push(DrawInstruction {
            track: id,
            track_name: track.name.clone(),
            animation,
            image: frame.image.clone(),
            image_handle,
            transform: DrawTransform::from_frame(frame),
            offset,
        });
    }

    RenderData {
        draws,
        frames: resolved,
    }
}
