use anyhow::Result;
use cgmath::{Angle, Deg, Quaternion, Rotation3, Vector3};
use hsl::HSL;
use rand::{rngs::StdRng, Rng, SeedableRng};

use mirrorprobe::camera::{Camera, CameraKind, ClearMode, Lens, Skybox};
use mirrorprobe::config::SceneConfig;
use mirrorprobe::context::{GraphicsContext, RenderBackend, WgpuBackend};
use mirrorprobe::material::{Material, BASE_MAP};
use mirrorprobe::probe::{ProbeSystem, RenderOutcome, SlotTable};
use mirrorprobe::transform::Transform;
use mirrorprobe::world::{CameraId, Shape, Spin, Surface, World};

fn random_color(rng: &mut StdRng) -> [f32; 4] {
    let (r, g, b) = HSL {
        h: rng.gen_range(0.0..360.0),
        s: 0.8,
        l: 0.5 + rng.gen::<f64>() * 0.1,
    }
    .to_rgb();
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

fn build_scene(config: &SceneConfig) -> World {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut world = World::new();

    let sky = Skybox {
        zenith: [0.2, 0.35, 0.8, 1.0],
        horizon: [0.85, 0.9, 0.95, 1.0],
        enabled: true,
    };
    let mut main = Camera::new(
        Transform::new(
            Vector3::new(0.0, 3.0, 8.0),
            Quaternion::from_angle_y(Deg(180.0))
                * Quaternion::from_angle_x(Deg(10.0)),
        ),
        Lens::Perspective { fovy_deg: 60.0 },
        (config.width, config.height),
    );
    main.clear = ClearMode::Skybox;
    main.skybox = Some(sky);
    world.add_camera(main.clone());

    // An editor view of the same scene; probes leave it alone.
    let mut editor = main;
    editor.kind = CameraKind::SceneView;
    editor.transform.position = Vector3::new(6.0, 6.0, 6.0);
    editor.transform.rotation = Quaternion::from_angle_y(Deg(225.0))
        * Quaternion::from_angle_x(Deg(30.0));
    world.add_camera(editor);

    world.add_surface(
        Surface::new(
            "floor",
            Transform::new(
                Vector3::new(0.0, 0.0, 0.0),
                Quaternion::from_angle_x(Deg(-90.0)),
            ),
            Shape::Quad {
                half_width: 10.0,
                half_height: 10.0,
            },
        )
        .with_material(Material::new("floor", [0.6, 0.6, 0.65, 1.0])),
    );

    world.add_surface(
        Surface::new(
            "mirror",
            Transform::from_position(Vector3::new(0.0, 2.5, -4.0)),
            Shape::Quad {
                half_width: 2.0,
                half_height: 2.5,
            },
        )
        .with_material(
            Material::new("mirror", [0.95, 0.95, 1.0, 1.0])
                .with_texture_property(BASE_MAP),
        )
        .with_spin(Spin {
            axis: Vector3::unit_y(),
            degrees_per_second: config.stage_spin,
        }),
    );

    for i in 0..config.cubes {
        let angle = Deg(360.0 * i as f32 / config.cubes.max(1) as f32);
        let radius: f32 = rng.gen_range(2.5..6.0);
        let (sin, cos) = angle.sin_cos();
        let half_extent: f32 = rng.gen_range(0.3..0.8);
        world.add_surface(
            Surface::new(
                format!("cube{}", i),
                Transform::new(
                    Vector3::new(radius * cos, half_extent, radius * sin),
                    Quaternion::from_angle_y(Deg(rng.gen_range(0.0f32..90.0))),
                ),
                Shape::Cube { half_extent },
            )
            .with_material(Material::new(
                format!("cube{}", i),
                random_color(&mut rng),
            ))
            .with_spin(Spin {
                axis: Vector3::unit_y(),
                degrees_per_second: rng.gen_range(-45.0f32..45.0),
            }),
        );
    }

    world
}

#[derive(Debug, Default)]
struct FrameStats {
    rendered: usize,
    skipped: usize,
    failed: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };

    let mut world = build_scene(&config);
    let mut probes = ProbeSystem::new();
    let ids = config.attach_probes(&mut world, &mut probes)?;

    let ctx = futures::executor::block_on(GraphicsContext::new_headless())?;
    let mut backend = WgpuBackend::new(ctx);
    let mut slots = SlotTable::new();
    let mut stats = FrameStats::default();

    for frame in 0..config.frames {
        world.update(config.frame_time);

        let cameras: Vec<CameraId> = world.active_cameras().collect();
        for camera in cameras {
            let outcomes = probes.before_camera_render(
                camera,
                &mut world,
                &mut backend,
                &mut slots,
            );
            for (_, outcome) in outcomes {
                match outcome {
                    Ok(RenderOutcome::Rendered { .. }) => stats.rendered += 1,
                    Ok(RenderOutcome::Skipped(_)) => stats.skipped += 1,
                    Err(_) => stats.failed += 1,
                }
            }
            backend.render_camera(&world, camera, &slots)?;
        }

        if frame % 30 == 0 {
            log::debug!("frame {}: {:?}", frame, stats);
        }
    }
    backend.context().device.poll(wgpu::Maintain::Wait);

    log::info!(
        "{} frames: {} probe renders, {} skipped, {} failed, {} live targets",
        config.frames,
        stats.rendered,
        stats.skipped,
        stats.failed,
        backend.live_targets()
    );

    for id in ids {
        probes.remove_probe(id, &mut world, &mut backend, &mut slots);
    }
    Ok(())
}
