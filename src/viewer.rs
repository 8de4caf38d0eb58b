//! One render pass over all capture streams.
//!
//! The viewer is independent of the windowing backend: it composites into a
//! [`Canvas`], which the app then presents.

use std::time::Instant;

use tracing::trace;

use crate::canvas::{Canvas, BLACK, RED, WHITE};
use crate::clock::FrameClock;
use crate::convert::{self, Orientation};
use crate::layout::ViewportLayout;
use crate::traits::CaptureStream;

/// Border drawn around each composited feed.
pub const BORDER_THICKNESS: u32 = 3;
/// Top-left corner of the FPS readout.
pub const FPS_ORIGIN: (u32, u32) = (10, 10);
/// Font pixel size of the FPS readout.
pub const FPS_SCALE: u32 = 3;

/// What happened during one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Feeds drawn this pass.
    pub composited: usize,
    /// Feeds skipped because no usable frame arrived.
    pub skipped: usize,
    /// FPS value shown in the readout.
    pub fps: u32,
}

/// Owns the capture streams and composites them into the 2x2 grid.
pub struct Viewer<S> {
    streams: Vec<S>,
    clock: FrameClock,
    orientation: Orientation,
}

impl<S: CaptureStream> Viewer<S> {
    /// Viewer over already started streams, in grid order.
    pub fn new(streams: Vec<S>, orientation: Orientation) -> Self {
        Self {
            streams,
            clock: FrameClock::new(),
            orientation,
        }
    }

    /// Number of feeds.
    pub fn camera_count(&self) -> usize {
        self.streams.len()
    }

    /// Streams in grid order.
    pub fn streams(&self) -> &[S] {
        &self.streams
    }

    /// Pull and drop one frame from every stream, without compositing.
    ///
    /// Used while nothing is presented, so driver queues do not hold stale
    /// frames.
    pub fn discard_frames(&mut self) {
        for stream in &mut self.streams {
            if let Err(err) = stream.next_frame() {
                trace!(camera = stream.index(), %err, "no frame to discard");
            }
        }
    }

    /// Render one frame into `canvas`.
    pub fn render(&mut self, canvas: &mut Canvas) -> RenderStats {
        self.render_at(canvas, Instant::now())
    }

    /// Render one frame into `canvas`, timing the pass at `now`.
    ///
    /// A stream that fails to deliver, or delivers a frame that cannot be
    /// decoded, leaves its quadrant black for this pass only.
    pub fn render_at(&mut self, canvas: &mut Canvas, now: Instant) -> RenderStats {
        self.clock.tick_at(now);
        let layout = ViewportLayout::new(self.streams.len(), canvas.width(), canvas.height());
        canvas.clear(BLACK);

        let mut stats = RenderStats::default();
        for (slot, stream) in self.streams.iter_mut().enumerate() {
            let Some(quadrant) = layout.quadrant(slot) else {
                break;
            };

            let frame = match stream.next_frame() {
                Ok(frame) => frame,
                Err(err) => {
                    trace!(camera = stream.index(), %err, "no frame this pass");
                    stats.skipped += 1;
                    continue;
                }
            };
            if quadrant.is_empty() {
                stats.skipped += 1;
                continue;
            }

            match convert::prepare(&frame, quadrant.width, quadrant.height, self.orientation) {
                Ok(image) => {
                    canvas.blit(&image, quadrant.x, quadrant.y);
                    canvas.stroke_rect(quadrant, BORDER_THICKNESS, RED);
                    stats.composited += 1;
                }
                Err(err) => {
                    trace!(camera = stream.index(), %err, "frame dropped");
                    stats.skipped += 1;
                }
            }
        }

        stats.fps = self.clock.fps();
        let (x, y) = FPS_ORIGIN;
        canvas.draw_text(&format!("FPS: {}", stats.fps), x, y, FPS_SCALE, WHITE);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Quadrant;
    use crate::mock::{MockStream, TestPattern};
    use crate::traits::{Format, FourCC};
    use std::time::Duration;

    // Solid white in YUYV, so composited quadrants are easy to spot.
    const WHITE_YUV: TestPattern = TestPattern::Solid(255, 128, 128);

    fn stream(index: u32) -> MockStream {
        MockStream::new(index, Format::new(64, 48, FourCC::YUYV)).with_pattern(WHITE_YUV)
    }

    fn viewer(streams: Vec<MockStream>) -> Viewer<MockStream> {
        Viewer::new(streams, Orientation::Mirrored)
    }

    fn center(q: Quadrant) -> (u32, u32) {
        (q.x + q.width / 2, q.y + q.height / 2)
    }

    fn assert_bordered_feed(canvas: &Canvas, q: Quadrant) {
        let (cx, cy) = center(q);
        assert_eq!(canvas.pixel(cx, cy), Some(WHITE), "feed body at {q:?}");
        assert_eq!(canvas.pixel(q.x, cy), Some(RED), "left border at {q:?}");
        assert_eq!(canvas.pixel(q.x + 2, cy), Some(RED), "border width at {q:?}");
        assert_eq!(canvas.pixel(q.x + 3, cy), Some(WHITE), "inside border at {q:?}");
        assert_eq!(
            canvas.pixel(q.x + q.width - 1, q.y + q.height - 1),
            Some(RED),
            "bottom-right corner at {q:?}"
        );
    }

    #[test]
    fn test_four_bordered_quadrants_1024x768() {
        let mut viewer = viewer((0..4).map(stream).collect());
        let mut canvas = Canvas::new(1024, 768);

        let stats = viewer.render(&mut canvas);
        assert_eq!(stats.composited, 4);
        assert_eq!(stats.skipped, 0);

        let layout = ViewportLayout::new(4, 1024, 768);
        let quadrants: Vec<Quadrant> = layout.quadrants().collect();
        let expected = [(0, 0), (512, 0), (0, 384), (512, 384)];
        for (q, (x, y)) in quadrants.iter().zip(expected) {
            assert_eq!((q.x, q.y, q.width, q.height), (x, y, 512, 384));
            assert_bordered_feed(&canvas, *q);
        }
    }

    #[test]
    fn test_fps_readout_drawn_on_top() {
        let gray = TestPattern::Solid(16, 128, 128);
        let streams = (0..4).map(|i| stream(i).with_pattern(gray)).collect();
        let mut viewer = viewer(streams);
        let mut canvas = Canvas::new(1024, 768);
        let start = Instant::now();

        viewer.render_at(&mut canvas, start);
        let stats = viewer.render_at(&mut canvas, start + Duration::from_millis(20));
        assert_eq!(stats.fps, 50);

        let (x, y) = FPS_ORIGIN;
        // Top row of 'F' is text, over the camera feed
        assert_eq!(canvas.pixel(x, y), Some(WHITE));
        // Unset font pixel inside the 'F' cell shows the feed
        assert_eq!(canvas.pixel(x + FPS_SCALE, y + FPS_SCALE), Some(0x0010_1010));
        assert_eq!(canvas.pixel(0, 100), Some(RED));
    }

    #[test]
    fn test_resize_recomputes_quadrants() {
        let mut viewer = viewer((0..4).map(stream).collect());
        let mut canvas = Canvas::new(1024, 768);
        viewer.render(&mut canvas);

        canvas.resize(800, 600);
        let stats = viewer.render(&mut canvas);
        assert_eq!(stats.composited, 4);

        for q in ViewportLayout::new(4, 800, 600).quadrants() {
            assert_eq!((q.width, q.height), (400, 300));
            assert_bordered_feed(&canvas, q);
        }
        // Old 512x384 geometry left no border at x=512
        assert_eq!(canvas.pixel(512, 150), Some(WHITE));
    }

    #[test]
    fn test_missed_pulls_leave_quadrant_black_then_resume() {
        let misses = 3;
        let mut streams: Vec<MockStream> = (0..4).map(stream).collect();
        streams[1] = stream(1).with_misses(misses);
        let mut viewer = viewer(streams);
        let mut canvas = Canvas::new(400, 200);
        let q1 = ViewportLayout::new(4, 400, 200)
            .quadrant(1)
            .expect("quadrant 1");

        for _ in 0..misses {
            let stats = viewer.render(&mut canvas);
            assert_eq!(stats.composited, 3);
            assert_eq!(stats.skipped, 1);
            let (cx, cy) = center(q1);
            assert_eq!(canvas.pixel(cx, cy), Some(BLACK));
            assert_eq!(canvas.pixel(q1.x, cy), Some(BLACK), "no border on a miss");
        }

        let stats = viewer.render(&mut canvas);
        assert_eq!(stats.composited, 4);
        assert_bordered_feed(&canvas, q1);
    }

    #[test]
    fn test_no_stale_frame_after_success_then_miss() {
        let streams = vec![stream(0).with_script(&[true, false])];
        let mut viewer = viewer(streams);
        let mut canvas = Canvas::new(200, 200);
        let q0 = ViewportLayout::new(1, 200, 200).quadrant(0).expect("quadrant 0");

        viewer.render(&mut canvas);
        assert_bordered_feed(&canvas, q0);

        viewer.render(&mut canvas);
        let (cx, cy) = center(q0);
        assert_eq!(canvas.pixel(cx, cy), Some(BLACK));
    }

    #[test]
    fn test_each_stream_pulled_once_per_pass() {
        let mut viewer = viewer((0..4).map(stream).collect());
        let mut canvas = Canvas::new(64, 64);
        for _ in 0..5 {
            viewer.render(&mut canvas);
        }
        assert!(viewer.streams().iter().all(|s| s.pulls() == 5));
    }

    #[test]
    fn test_discard_frames_pulls_without_drawing() {
        let mut streams: Vec<MockStream> = (0..4).map(stream).collect();
        streams[2] = stream(2).with_misses(1);
        let mut viewer = viewer(streams);
        let mut canvas = Canvas::new(64, 64);

        viewer.discard_frames();
        viewer.discard_frames();
        assert!(viewer.streams().iter().all(|s| s.pulls() == 2));
        assert!(canvas.pixels().iter().all(|&p| p == BLACK));

        // The miss was consumed while hidden.
        let stats = viewer.render(&mut canvas);
        assert_eq!(stats.composited, 4);
    }

    #[test]
    fn test_tiny_surface_does_not_composite() {
        let mut viewer = viewer((0..4).map(stream).collect());
        let mut canvas = Canvas::new(1, 1);
        let stats = viewer.render(&mut canvas);
        assert_eq!(stats.composited, 0);
        assert_eq!(stats.skipped, 4);
    }

    #[test]
    fn test_undecodable_frame_is_skipped() {
        let bad = MockStream::new(0, Format::new(64, 48, FourCC::new(b"NV12")));
        let mut viewer = viewer(vec![bad, stream(1)]);
        let mut canvas = Canvas::new(128, 96);

        let stats = viewer.render(&mut canvas);
        assert_eq!(stats.composited, 1);
        assert_eq!(stats.skipped, 1);
    }
}
