//! End-to-end probe scenarios: depth session in, decisions and pixels out.

use std::sync::Arc;

use depthgate_core::{
    DepthFormat, DepthFrame, Error, OcclusionConfig, ProbePlacement, ProbeShape, SampleFilter, Viewport,
};
use depthgate_depth::resample;
use depthgate_occlusion::{is_occluded, Fragment, FragmentDecision, OcclusionEvaluator};
use depthgate_probe::{CameraUpdate, FrameOutcome, FrameSink, ProbeController, ProbeNode, SkipReason};
use depthgate_render::{ArCamera, SyntheticDepthSession, SyntheticScene};
use approx::assert_relative_eq;
use glam::Vec3;
use image::Rgba;

use crate::harness::HeadlessRenderer;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn viewport() -> Viewport {
    Viewport::new(96, 72).unwrap()
}

/// Half-meter cube whose front face is exactly 1.0 m from a camera at
/// the origin looking down -Z.
fn cube_config() -> OcclusionConfig {
    OcclusionConfig::new()
        .with_shape(ProbeShape::Box {
            width: 0.5,
            height: 0.5,
            length: 0.5,
        })
        .with_placement(ProbePlacement {
            translation: Vec3::new(0.0, 0.0, -1.25),
            euler: Vec3::ZERO,
        })
}

fn origin_session(scene: SyntheticScene) -> SyntheticDepthSession {
    SyntheticDepthSession::new(scene, viewport()).with_camera(ArCamera::for_viewport(viewport()))
}

fn render(scene: SyntheticScene) -> (usize, crate::RenderOutput) {
    let mut renderer = HeadlessRenderer::new(cube_config());
    renderer.run(&mut origin_session(scene), 1).unwrap();
    let output = renderer.render().unwrap();
    let red = output.image.pixels().filter(|p| **p == RED).count();
    (red, output)
}

fn controller() -> ProbeController<Vec<ProbeNode>> {
    ProbeController::new(cube_config(), Vec::new())
}

#[test]
fn real_geometry_behind_probe_shows_it() {
    let (red, output) = render(SyntheticScene::ConstantPlane { depth: 2.0 });
    assert!(red > 0);
    assert_eq!(output.stats.fragments.discarded, 0);
    assert_eq!(output.image.get_pixel(48, 36), &RED);
}

#[test]
fn real_geometry_in_front_hides_probe() {
    let (red, output) = render(SyntheticScene::ConstantPlane { depth: 0.5 });
    assert_eq!(red, 0);
    assert!(output.stats.fragments.total() > 0);
    assert_eq!(output.stats.fragments.kept, 0);
}

#[test]
fn equal_depth_hides_front_face() {
    let mut controller = controller();
    let update = origin_session(SyntheticScene::ConstantPlane { depth: 1.0 })
        .next_update()
        .unwrap();
    controller.on_frame(&update);
    let params = controller.draw_params().unwrap();
    let evaluator = OcclusionEvaluator::new(&params.uniforms, params.binding.surface());

    let front_face: Vec<Fragment> = params
        .probe
        .mesh()
        .vertices
        .iter()
        .filter(|v| v.position[2] > 0.0)
        .map(|v| Fragment::new(v.position(), v.texcoord()))
        .collect();
    // Front face corners plus the front edges of the four side faces.
    assert_eq!(front_face.len(), 12);
    for fragment in &front_face {
        let test = evaluator.test(fragment);
        assert_eq!(test.virtual_depth, 1.0);
        assert_eq!(test.real_depth, Some(1.0));
        assert_eq!(test.decision, FragmentDecision::Discard);
    }
}

#[test]
fn millimeter_sensor_gaps_leave_box_visible() {
    // Wall at 0.5 m hides the cube wherever the sensor has a reading.
    let mut session = origin_session(SyntheticScene::ConstantPlane { depth: 0.5 })
        .with_format(DepthFormat::Millimeters16)
        .with_missing_readings(0.5);
    let mut renderer = HeadlessRenderer::new(cube_config());
    renderer.run(&mut session, 1).unwrap();
    let output = renderer.render().unwrap();

    let red: Vec<u32> = output
        .image
        .enumerate_pixels()
        .filter(|(_, _, pixel)| **pixel == RED)
        .map(|(x, _, _)| x)
        .collect();
    assert!(!red.is_empty());
    assert!(red.iter().all(|&x| x < 48), "box hidden only where depth is known");
    assert!(output.stats.fragments.discarded > 0);
    let surface = renderer.controller().binding().unwrap().surface();
    assert!(surface.get(0, 0).unwrap().is_nan());
    assert_relative_eq!(surface.get(95, 0).unwrap(), 0.5, epsilon = 1e-6);
}

#[test]
fn step_wall_cuts_probe() {
    let (red, output) = render(SyntheticScene::StepWall {
        near: 0.5,
        far: 2.0,
        split: 0.5,
    });
    assert!(red > 0);
    assert!(output.stats.fragments.discarded > 0);
    for (x, _, pixel) in output.image.enumerate_pixels() {
        if *pixel == RED {
            assert!(x >= 48, "probe visible in front of the near wall at x={x}");
        }
    }
}

#[test]
fn ramp_hides_probe_where_wall_is_closer() {
    // Depth crosses the cube front (1.0 m) at the image center.
    let (red, output) = render(SyntheticScene::Ramp { near: 0.0, far: 2.0 });
    assert!(red > 0);
    assert!(output.stats.fragments.discarded > 0);
    for (x, _, pixel) in output.image.enumerate_pixels() {
        if *pixel == RED {
            assert!(x >= 48, "x={x}");
        }
    }
}

#[test]
fn discard_iff_real_not_beyond_virtual() {
    let values = [0.0f32, 0.25, 0.999, 1.0, 1.001, 3.0, f32::INFINITY];
    for &real in &values {
        for &virt in &values {
            assert_eq!(is_occluded(real, virt), real <= virt, "real={real} virtual={virt}");
        }
    }
}

#[test]
fn resample_output_matches_target_size() {
    let frame = DepthFrame::from_fn(7, 5, |x, y| (x + y) as f32).unwrap();
    for (w, h) in [(1, 1), (7, 5), (3, 9), (64, 48), (1920, 1)] {
        for filter in [SampleFilter::Nearest, SampleFilter::Bilinear] {
            let surface = resample(&frame, w, h, filter).unwrap();
            assert_eq!(surface.len(), (w * h) as usize);
            assert_eq!((surface.width(), surface.height()), (w, h));
        }
    }
}

#[test]
fn resample_is_deterministic() {
    let frame = DepthFrame::from_fn(16, 12, |x, y| 0.3 + 0.17 * x as f32 + 0.05 * (y * y) as f32).unwrap();
    for filter in [SampleFilter::Nearest, SampleFilter::Bilinear] {
        let a = resample(&frame, 50, 37, filter).unwrap();
        let b = resample(&frame, 50, 37, filter).unwrap();
        let bits = |s: &[f32]| s.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(a.samples()), bits(b.samples()));
    }
}

#[test]
fn upscale_4x3_to_8x6_through_controller() {
    let source = DepthFrame::from_fn(4, 3, |x, y| (y * 4 + x) as f32 + 1.0).unwrap();
    let update = CameraUpdate::new(0, Viewport::new(8, 6).unwrap()).with_smoothed_depth(source.clone());
    let mut controller = controller();
    assert_eq!(controller.on_frame(&update), FrameOutcome::Created);

    let surface = controller.binding().unwrap().surface();
    assert_eq!(surface.len(), 48);
    assert_eq!(surface.get(0, 0), source.get(0, 0));
    assert_eq!(surface.get(7, 5), source.get(3, 2));
}

#[test]
fn failed_resample_keeps_previous_surface() {
    assert!(matches!(
        resample(&DepthFrame::filled(4, 3, 1.0).unwrap(), 0, 6, SampleFilter::Nearest),
        Err(Error::Resample(_))
    ));

    let mut controller = controller();
    let first = CameraUpdate::new(0, viewport()).with_smoothed_depth(DepthFrame::filled(8, 6, 2.0).unwrap());
    controller.on_frame(&first);
    let before: Arc<_> = controller.binding().unwrap().surface_handle();

    let empty = DepthFrame::new(0, 0, Vec::new()).unwrap();
    let broken = CameraUpdate::new(1, viewport()).with_smoothed_depth(empty);
    assert_eq!(
        controller.on_frame(&broken),
        FrameOutcome::Skipped(SkipReason::ResampleFailed)
    );

    let binding = controller.binding().unwrap();
    assert!(Arc::ptr_eq(&before, &binding.surface_handle()));
    assert_eq!(binding.frame_index(), 0);
    assert_eq!(controller.staleness(), Some(1));
}

#[test]
fn rotation_rebinds_to_new_viewport() {
    let mut session = SyntheticDepthSession::new(SyntheticScene::ConstantPlane { depth: 2.0 }, viewport())
        .with_rotation(1);
    let mut renderer = HeadlessRenderer::new(OcclusionConfig::default());
    let outcomes = renderer.run(&mut session, 2).unwrap();
    assert_eq!(outcomes, [FrameOutcome::Created, FrameOutcome::Updated]);

    let binding = renderer.controller().binding().unwrap();
    assert_eq!(binding.viewport(), Viewport::new(72, 96).unwrap());
    assert_eq!(binding.frame_index(), 1);
    assert_eq!(renderer.render().unwrap().image.dimensions(), (72, 96));
}

#[test]
fn raw_stream_used_as_fallback() {
    let mut session = origin_session(SyntheticScene::ConstantPlane { depth: 2.0 }).raw_only();
    let mut renderer = HeadlessRenderer::new(cube_config());
    assert_eq!(renderer.run(&mut session, 1).unwrap(), [FrameOutcome::Created]);

    let mut session = origin_session(SyntheticScene::ConstantPlane { depth: 2.0 }).raw_only();
    let config = cube_config().with_depth_source(depthgate_core::DepthSource::Smoothed, false);
    let mut renderer = HeadlessRenderer::new(config);
    assert_eq!(
        renderer.run(&mut session, 1).unwrap(),
        [FrameOutcome::Skipped(SkipReason::NoDepth)]
    );
    assert!(renderer.controller().probe().is_none());
}

#[test]
fn probe_attached_once() {
    let mut session = SyntheticDepthSession::new(SyntheticScene::ConstantPlane { depth: 2.0 }, viewport());
    let mut renderer = HeadlessRenderer::new(OcclusionConfig::default());
    renderer.run(&mut session, 5).unwrap();
    let nodes = renderer.controller().scene();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "occlusion-probe-cylinder");
}
