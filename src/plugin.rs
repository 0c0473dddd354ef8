//! Bevy host for the free-play loop
//!
//! The window is the container, `Update` is the display refresh, and one
//! circle entity stands in for each body.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use indexmap::IndexMap;

use crate::audio::CpalInput;
use crate::config::SimulationConfig;
use crate::core::{BodyId, ContainerBounds};
use crate::error::{FreePlayError, Result};
use crate::feedback::{DEVICE_FAILURE, IDLE_PROMPT, LISTENING_PROMPT, STOPPED_PROMPT};
use crate::math::{Point, Real};
use crate::simulation::{FrameQueue, LoopState, RenderSurface, SimulationLoop};

pub type LiveLoop = SimulationLoop<CpalInput, FrameQueue>;

const FREE_PLAY_PROMPT: &str = "Press F for free play.";

/// Holds the loop. Non-send because a live cpal stream may not leave the
/// main thread.
pub struct FreePlayRuntime {
    pub sim: LiveLoop,
}

#[derive(Clone, Copy, Debug)]
struct PublishedBody {
    position: Point,
    radius: Real,
    color: Color,
}

/// Bodies published since the last visual sync.
#[derive(Resource, Default)]
pub struct SurfaceFrame {
    bounds: ContainerBounds,
    published: IndexMap<BodyId, PublishedBody>,
    cleared: bool,
}

impl RenderSurface for SurfaceFrame {
    fn bounds(&self) -> ContainerBounds {
        self.bounds
    }

    fn publish(&mut self, id: BodyId, position: Point, radius: Real, color: Color) {
        self.published.insert(
            id,
            PublishedBody {
                position,
                radius,
                color,
            },
        );
    }

    fn clear(&mut self) {
        self.published.clear();
        self.cleared = true;
    }
}

#[derive(Resource, Default)]
struct BodyVisuals {
    entities: IndexMap<BodyId, Entity>,
}

#[derive(Component)]
struct BodyVisual;

#[derive(Component)]
struct StatusText;

#[derive(Resource)]
struct HudStatus {
    status: &'static str,
    feedback: &'static str,
    meter: Real,
}

#[derive(Resource)]
struct AutoEnter(bool);

pub struct FreePlayPlugin {
    config: SimulationConfig,
    seed: u64,
    auto_enter: bool,
}

impl FreePlayPlugin {
    /// # Errors
    ///
    /// `InvalidConfig` when `config` breaks an invariant.
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            seed,
            auto_enter: true,
        })
    }

    /// Whether to enter free play as soon as the window is laid out.
    pub fn with_auto_enter(mut self, auto_enter: bool) -> Self {
        self.auto_enter = auto_enter;
        self
    }
}

impl Plugin for FreePlayPlugin {
    fn build(&self, app: &mut App) {
        let sim = match SimulationLoop::new(
            self.config.clone(),
            CpalInput::new(),
            FrameQueue::new(),
            self.seed,
        ) {
            Ok(sim) => sim,
            Err(error) => {
                tracing::error!(%error, "free play disabled");
                return;
            }
        };

        app.insert_non_send_resource(FreePlayRuntime { sim })
            .insert_resource(SurfaceFrame::default())
            .insert_resource(BodyVisuals::default())
            .insert_resource(HudStatus {
                status: FREE_PLAY_PROMPT,
                feedback: "",
                meter: 0.0,
            })
            .insert_resource(AutoEnter(self.auto_enter))
            .add_systems(Startup, setup_hud)
            .add_systems(
                Update,
                (
                    track_window_bounds,
                    handle_triggers,
                    drive_frame,
                    sync_body_visuals,
                    update_hud,
                )
                    .chain(),
            );
    }
}

fn setup_hud(mut commands: Commands) {
    commands.spawn(Camera2d);
    commands.spawn((
        Text::new(FREE_PLAY_PROMPT),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        StatusText,
    ));
}

fn track_window_bounds(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut surface: ResMut<SurfaceFrame>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    surface.bounds = ContainerBounds::new(window.width(), window.height());
}

fn handle_triggers(
    keys: Res<ButtonInput<KeyCode>>,
    mut runtime: NonSendMut<FreePlayRuntime>,
    mut surface: ResMut<SurfaceFrame>,
    mut hud: ResMut<HudStatus>,
    mut auto_enter: ResMut<AutoEnter>,
) {
    let sim = &mut runtime.sim;
    let surface: &mut dyn RenderSurface = &mut *surface;

    if auto_enter.0 && surface.bounds().is_laid_out() {
        auto_enter.0 = false;
        sim.enter_free_play(surface);
        hud.status = IDLE_PROMPT;
    }

    if keys.just_pressed(KeyCode::KeyF) {
        if sim.is_in_free_play() {
            sim.exit_free_play(surface);
            hud.status = FREE_PLAY_PROMPT;
        } else {
            sim.enter_free_play(surface);
            hud.status = IDLE_PROMPT;
        }
        hud.feedback = "";
        hud.meter = 0.0;
    }

    if keys.just_pressed(KeyCode::Escape) && sim.is_in_free_play() {
        sim.exit_free_play(surface);
        hud.status = FREE_PLAY_PROMPT;
        hud.feedback = "";
        hud.meter = 0.0;
    }

    if keys.just_pressed(KeyCode::Space) {
        match sim.loop_state() {
            LoopState::Listening => {
                sim.stop_listening(surface);
                hud.status = STOPPED_PROMPT;
                hud.feedback = "";
                hud.meter = 0.0;
            }
            LoopState::Idle => match sim.start_listening() {
                Ok(()) => hud.status = LISTENING_PROMPT,
                Err(FreePlayError::NotInFreePlay) => hud.status = FREE_PLAY_PROMPT,
                Err(_) => hud.status = DEVICE_FAILURE,
            },
        }
    }
}

fn drive_frame(
    mut runtime: NonSendMut<FreePlayRuntime>,
    mut surface: ResMut<SurfaceFrame>,
    mut hud: ResMut<HudStatus>,
) {
    let sim = &mut runtime.sim;
    let Some(handle) = sim.scheduler_mut().take_due() else {
        return;
    };
    let surface: &mut dyn RenderSurface = &mut *surface;
    if let Some(report) = sim.on_frame(handle, surface) {
        hud.feedback = report.feedback.message(&mut rand::rng());
        hud.meter = report.meter;
    }
}

fn sim_to_world(position: Point, bounds: ContainerBounds) -> Vec3 {
    Vec3::new(
        position.x - bounds.width * 0.5,
        position.y - bounds.height * 0.5,
        0.0,
    )
}

fn sync_body_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut surface: ResMut<SurfaceFrame>,
    mut visuals: ResMut<BodyVisuals>,
    mut transforms: Query<&mut Transform, With<BodyVisual>>,
) {
    if surface.cleared {
        for (_, entity) in visuals.entities.drain(..) {
            commands.entity(entity).despawn();
        }
        surface.cleared = false;
    }

    let bounds = surface.bounds;
    for (id, body) in surface.published.drain(..) {
        let translation = sim_to_world(body.position, bounds);
        if let Some(&entity) = visuals.entities.get(&id) {
            if let Ok(mut transform) = transforms.get_mut(entity) {
                transform.translation = translation;
            }
            continue;
        }

        let entity = commands
            .spawn((
                BodyVisual,
                Mesh2d(meshes.add(Circle::new(body.radius))),
                MeshMaterial2d(materials.add(body.color)),
                Transform::from_translation(translation),
            ))
            .id();
        visuals.entities.insert(id, entity);
    }
}

fn update_hud(hud: Res<HudStatus>, mut query: Query<&mut Text, With<StatusText>>) {
    if !hud.is_changed() {
        return;
    }
    for mut text in &mut query {
        text.0 = format!(
            "{}\n{}\nVolume: {:>3.0}%",
            hud.status,
            hud.feedback,
            hud.meter * 100.0
        );
    }
}
