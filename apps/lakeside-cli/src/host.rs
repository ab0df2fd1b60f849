use glam::{Quat, Vec2, Vec3};
use lakeside_assets::{AssetStore, Heightmap};
use lakeside_common::{GameObjectId, Transform};
use lakeside_components::{
    Camera, DirectionalLight, FONT_SHADER, FontType, GuiText, TERRAIN_SHADER, TerrainMesh,
    WATER_SHADER, WaterMesh,
};
use lakeside_dispatch::{DispatchHandle, Dispatcher};
use lakeside_engine::render::GraphicsBackend;
use lakeside_engine::{Engines, FrameStats, GameObject, Scene};
use lakeside_physics::{Physics, StaticMeshWorld};

use crate::scene_config::SceneConfig;

/// What deferred jobs get to touch.
pub struct HostState {
    pub scene: Scene,
    pub physics: StaticMeshWorld,
    pub engines: Engines,
}

/// Ids of the demo scene's objects.
#[derive(Debug, Clone, Copy)]
pub struct DemoObjects {
    pub camera: GameObjectId,
    pub terrain: GameObjectId,
    pub water: GameObjectId,
    pub hud: GameObjectId,
}

/// Owns the scene, the collaborators and the frame loop.
pub struct Host {
    state: HostState,
    dispatcher: Dispatcher<HostState>,
    frame: u64,
}

impl Host {
    pub fn new(backend: Box<dyn GraphicsBackend>, config: &SceneConfig) -> Self {
        Self {
            state: HostState {
                scene: Scene::new(),
                physics: StaticMeshWorld::new(),
                engines: Engines::new(backend, config.engine.clone()),
            },
            dispatcher: Dispatcher::new(),
            frame: 0,
        }
    }

    pub fn state(&self) -> &HostState {
        &self.state
    }

    /// A producer for deferred jobs, usable from any thread.
    pub fn dispatch_handle(&self) -> DispatchHandle<HostState> {
        self.dispatcher.handle()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run one frame: update, deferred work, physics, registration, render,
    /// present.
    pub fn tick(&mut self, delta_time: f32) -> FrameStats {
        let state = &mut self.state;
        state.scene.update_all(delta_time);
        let drained = self.dispatcher.drain(state);
        state.physics.step(delta_time);
        state.scene.add_to_engine(&mut state.engines);
        let stats = state.engines.render_frame(&mut state.scene, delta_time);
        state.engines.present();
        self.frame += 1;
        tracing::debug!(
            frame = self.frame,
            jobs = drained.executed,
            deferred = drained.deferred,
            "tick"
        );
        stats
    }

    /// Build the lakeside demo: camera, sun, terrain, water and a HUD label.
    pub fn build_demo(&mut self, config: &SceneConfig, assets: &mut AssetStore) -> DemoObjects {
        let HostState {
            scene,
            physics,
            engines,
        } = &mut self.state;

        let camera = scene.spawn(
            GameObject::new("main camera")
                .with_transform(Transform {
                    position: Vec3::from(config.camera_position),
                    rotation: Quat::from_rotation_x(-20f32.to_radians()),
                    scale: Vec3::ONE,
                })
                .with_component(Camera::perspective(config.camera)),
        );
        scene.spawn(
            GameObject::new("sun")
                .with_transform(Transform {
                    rotation: Quat::from_rotation_x(-65f32.to_radians()),
                    ..Transform::default()
                })
                .with_component(DirectionalLight::default()),
        );

        let terrain_mesh = TerrainMesh::new(
            config.terrain.clone(),
            assets,
            physics,
            &mut engines.rendering,
        );
        let terrain = scene.spawn(GameObject::new("terrain").with_component(terrain_mesh));

        let water_mesh = WaterMesh::new(config.water.clone(), assets, &mut engines.rendering);
        let water = scene.spawn(
            GameObject::new("lake")
                .with_transform(Transform::from_position(Vec3::new(0.0, config.water_level, 0.0)))
                .with_component(water_mesh),
        );

        let font = FontType::monospace(assets.register_texture("font_atlas.png"));
        let label = GuiText::new(
            "lakeside",
            0.05,
            font,
            Vec2::new(-0.95, 0.95),
            1.0,
            false,
            assets,
            &mut engines.rendering,
        );
        let hud = scene.spawn(GameObject::new("hud").with_component(label));

        tracing::info!(
            objects = scene.len(),
            collision_meshes = physics.mesh_count(),
            "demo scene built"
        );
        DemoObjects {
            camera,
            terrain,
            water,
            hud,
        }
    }
}

/// Asset store with the demo's shaders declared, and a generated heightmap
/// registered under `heightmap` unless files are served from a root.
pub fn demo_assets(config: &SceneConfig) -> AssetStore {
    let mut assets = match &config.asset_root {
        Some(root) => AssetStore::with_root(root),
        None => {
            let mut assets = AssetStore::new();
            assets.register_heightmap(&config.terrain.heightmap, rolling_hills(64, 64));
            assets
        }
    };
    assets.register_shader(TERRAIN_SHADER, ["default", "reflect", "refract"]);
    assets.register_shader(WATER_SHADER, ["default"]);
    assets.register_shader(FONT_SHADER, ["default"]);
    let textures = &config.terrain.textures;
    for name in [
        &textures.tex1,
        &textures.tex1_normal,
        &textures.tex2,
        &textures.tex2_normal,
        &textures.layer1,
        &textures.tex3,
        &textures.tex3_normal,
        &textures.layer2,
        &config.water.dudv_map,
        &config.water.normal_map,
    ] {
        assets.register_texture(name);
    }
    assets
}

/// A smooth procedural heightmap with samples in `[0, 255]`.
pub fn rolling_hills(width: usize, height: usize) -> Heightmap {
    let mut samples = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let (fx, fy) = (x as f32 * 0.2, y as f32 * 0.15);
            let value = 128.0 + 90.0 * fx.sin() * fy.cos() + 30.0 * (fx * 0.5 + fy).sin();
            samples.push(value.clamp(0.0, 255.0).round());
        }
    }
    Heightmap::from_samples(width, height, samples).unwrap_or_default()
}

/// Replace the terrain's heightmap from a deferred job.
pub fn apply_heightmap(state: &mut HostState, terrain: GameObjectId, heightmap: Heightmap) -> bool {
    let HostState {
        scene,
        physics,
        engines,
    } = state;
    match scene.component_mut::<TerrainMesh>(terrain) {
        Some(mesh) => {
            mesh.set_heightmap(heightmap, physics, &mut engines.rendering);
            true
        }
        None => {
            tracing::warn!(object = %terrain, "terrain gone before its heightmap arrived");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lakeside_engine::EngineConfig;
    use lakeside_engine::render::{CommandLog, RecordingBackend};
    use std::sync::{Arc, Mutex};

    fn demo() -> (Host, DemoObjects, CommandLog) {
        let config = SceneConfig {
            engine: EngineConfig {
                strict_invariants: false,
                ..EngineConfig::default()
            },
            ..SceneConfig::default()
        };
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut host = Host::new(Box::new(backend), &config);
        let mut assets = demo_assets(&config);
        let objects = host.build_demo(&config, &mut assets);
        (host, objects, log)
    }

    #[test]
    fn demo_frame_runs_every_pass() {
        let (mut host, _objects, _log) = demo();
        let stats = host.tick(0.016);
        assert_eq!(stats.nested_passes, 3);
        assert_eq!(stats.draws_in(&"reflect".into()), 1);
        assert_eq!(stats.draws_in(&"refract".into()), 2);
        // terrain and water
        assert_eq!(stats.draws_in(&"default".into()), 2);
        assert_eq!(stats.gui_draw_calls, 1);
        assert_eq!(stats.invariant_violations, 0);
        assert_eq!(host.frame(), 1);
    }

    #[test]
    fn frame_ends_with_present() {
        let (mut host, _objects, log) = demo();
        host.tick(0.016);
        assert_eq!(
            log.commands().last(),
            Some(&lakeside_engine::render::BackendCommand::Present)
        );
    }

    #[test]
    fn jobs_run_before_physics_step() {
        let (mut host, _objects, _log) = demo();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..3 {
            let seen = Arc::clone(&seen);
            host.dispatch_handle().enqueue(move |state: &mut HostState| {
                seen.lock().unwrap().push(state.physics.steps());
            });
            host.tick(0.016);
        }
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn background_heightmap_lands_on_next_tick() {
        let (mut host, objects, _log) = demo();
        let handle = host.dispatch_handle();
        let terrain = objects.terrain;
        std::thread::spawn(move || {
            let map = rolling_hills(9, 9);
            handle.enqueue(move |state: &mut HostState| {
                apply_heightmap(state, terrain, map);
            });
        })
        .join()
        .unwrap();

        host.tick(0.016);
        let state = host.state();
        let mesh = state.scene.component::<TerrainMesh>(terrain).unwrap();
        assert_eq!(mesh.geometry().triangle_count(), 2 * 8 * 8);
        assert_eq!(state.physics.mesh_count(), 1);
    }

    #[test]
    fn probe_hits_generated_terrain() {
        let (host, _objects, _log) = demo();
        let hit = host
            .state()
            .physics
            .raycast(Vec3::new(100.0, 1000.0, 137.0), Vec3::NEG_Y, 2000.0)
            .unwrap();
        assert!((hit.location.x - 100.0).abs() < 1e-3);
        assert!(hit.location.y >= 0.0 && hit.location.y <= 25.5 + 1e-3);
    }

    #[test]
    fn hills_stay_in_range() {
        let map = rolling_hills(16, 8);
        assert_eq!(map.samples().len(), 128);
        assert!(map.samples().iter().all(|s| (0.0..=255.0).contains(s)));
    }
}
