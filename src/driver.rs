//! Frame loop driver
//!
//! Sits between the windowing layer and the stepper. Each rendered frame it
//! takes the polled input, picks the frame delta (wall clock while running,
//! the manual step while paused), runs `substeps` fixed substeps and refreshes
//! the instance buffer for the renderer. A frame's substep batch always runs
//! to completion; quitting only takes effect between frames.

use glam::Vec2;

use crate::config::{ConfigError, Mode, SimConfig};
use crate::consts::MAX_FRAME_DT;
use crate::renderer::SeedInstance;
use crate::sim::{SimulationWorld, StepInput, step};

/// Manual time stepping while paused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepDirection {
    #[default]
    None,
    Forward,
    Backward,
}

/// Input polled from the windowing layer for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Wall-clock seconds since the previous frame
    pub elapsed: f32,
    /// Pointer in window coordinates (origin top-left, y down)
    pub pointer: Vec2,
    /// Pointer button held
    pub pointer_down: bool,
    /// Pause toggle pressed this frame
    pub toggle_pause: bool,
    /// Manual step key held (only honored while paused)
    pub step: StepDirection,
    /// Close/quit requested
    pub quit: bool,
    /// Window size, when it changed
    pub viewport: Option<(f32, f32)>,
}

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameOutput {
    /// Simulated time this frame (negative when stepping back)
    pub dt: f32,
    /// Substeps actually run
    pub substeps: u32,
    /// Stop the loop before the next frame
    pub quit: bool,
}

pub struct FrameDriver {
    config: SimConfig,
    world: SimulationWorld,
    paused: bool,
    instances: Vec<SeedInstance>,
    frames: u64,
}

impl FrameDriver {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        let world = SimulationWorld::new(&config)?;
        let mut instances = Vec::with_capacity(world.len());
        world.fill_instances(&mut instances);
        Ok(Self {
            config,
            world,
            paused: false,
            instances,
            frames: 0,
        })
    }

    pub fn world(&self) -> &SimulationWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut SimulationWorld {
        &mut self.world
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Instance buffer from the last completed frame
    pub fn instances(&self) -> &[SeedInstance] {
        &self.instances
    }

    /// Tear down the current world and spawn a new one in `mode`
    pub fn switch_mode(&mut self, mode: Mode) -> Result<(), ConfigError> {
        let mut config = self.config.clone();
        config.mode = mode;
        config.width = self.world.bounds.x;
        config.height = self.world.bounds.y;

        self.world = SimulationWorld::new(&config)?;
        self.config = config;
        self.world.fill_instances(&mut self.instances);
        Ok(())
    }

    /// Run one rendered frame
    pub fn frame(&mut self, input: &FrameInput) -> FrameOutput {
        if input.quit {
            log::info!("Quit requested after {} frames", self.frames);
            return FrameOutput {
                quit: true,
                ..Default::default()
            };
        }

        if let Some((width, height)) = input.viewport {
            self.world.set_bounds(width, height);
        }

        if input.toggle_pause {
            self.paused = !self.paused;
            log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
        }

        let dt = self.frame_dt(input);
        let step_input = StepInput {
            pointer: Vec2::new(input.pointer.x, self.world.bounds.y - input.pointer.y),
            dragging: input.pointer_down,
        };

        let mut substeps = 0;
        if dt != 0.0 {
            let sub_dt = dt / self.config.substeps as f32;
            for _ in 0..self.config.substeps {
                step(&mut self.world, &step_input, sub_dt);
                substeps += 1;
            }
        } else {
            self.world.drag.last_pointer = step_input.pointer;
        }

        self.world.fill_instances(&mut self.instances);
        self.frames += 1;
        log::trace!("Frame {}: dt={:.4} substeps={}", self.frames, dt, substeps);

        FrameOutput {
            dt,
            substeps,
            quit: false,
        }
    }

    fn frame_dt(&self, input: &FrameInput) -> f32 {
        let dt = if self.paused {
            match input.step {
                StepDirection::None => 0.0,
                StepDirection::Forward => self.config.manual_time_step,
                StepDirection::Backward => -self.config.manual_time_step,
            }
        } else {
            input.elapsed
        };

        if !dt.is_finite() {
            log::warn!("Dropping non-finite frame delta {}", dt);
            return 0.0;
        }
        if dt.abs() > MAX_FRAME_DT {
            log::warn!("Frame delta {:.3}s clamped to {}s", dt, MAX_FRAME_DT);
            return MAX_FRAME_DT.copysign(dt);
        }
        dt
    }
}
