//! SDK entry points and builder for composing the orbit explorer app.

use bevy::prelude::*;

use crate::camera::orbit_camera_plugin;
use crate::config::ExplorerConfig;
use crate::data::init_catalog_channel;
use crate::interaction::{interaction_plugin, CatalogRequest};
use crate::orbit::{Propagator, PropagatorResource, Sgp4Propagator};
use crate::pipeline::{ClosestTracker, SyncThrottle};
use crate::pointing::{pointing_plugin, Observer, PointingClient};
use crate::render::{MarkerRenderer, ObjectRenderer, RendererResource};
use crate::scene::{pipeline_plugin, render_plugin};
use crate::ui::{controls_plugin, hud_plugin, inspector_plugin, search_plugin, ui_plugin};

/// Builder for constructing an orbit explorer app with customizable plugins.
pub struct OrbitExplorerBuilder {
    config: ExplorerConfig,
    renderer: Option<Box<dyn ObjectRenderer>>,
    propagator: Option<Box<dyn Propagator>>,
    window_title: String,
    window_resolution: (f32, f32),
    clear_color: Color,
    enable_hud: bool,
    enable_controls: bool,
    enable_search: bool,
    enable_inspector: bool,
    enable_pointing: bool,
}

impl Default for OrbitExplorerBuilder {
    fn default() -> Self {
        Self {
            config: ExplorerConfig::default(),
            renderer: None,
            propagator: None,
            window_title: "Skywatch".to_string(),
            window_resolution: (1280.0, 720.0),
            clear_color: Color::srgb(0.01, 0.01, 0.03),
            enable_hud: true,
            enable_controls: true,
            enable_search: true,
            enable_inspector: true,
            enable_pointing: true,
        }
    }
}

impl OrbitExplorerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit configuration.
    pub fn config(mut self, config: ExplorerConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from environment variables.
    pub fn from_env(mut self) -> Self {
        self.config = ExplorerConfig::from_env();
        self
    }

    pub fn window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    /// Provide a custom object renderer implementation.
    pub fn renderer(mut self, renderer: impl ObjectRenderer) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Replace the SGP4 propagator.
    pub fn propagator(mut self, propagator: impl Propagator) -> Self {
        self.propagator = Some(Box::new(propagator));
        self
    }

    pub fn window_resolution(mut self, width: f32, height: f32) -> Self {
        self.window_resolution = (width, height);
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn disable_hud(mut self) -> Self {
        self.enable_hud = false;
        self
    }

    pub fn disable_controls(mut self) -> Self {
        self.enable_controls = false;
        self
    }

    pub fn disable_search(mut self) -> Self {
        self.enable_search = false;
        self
    }

    pub fn disable_inspector(mut self) -> Self {
        self.enable_inspector = false;
        self
    }

    pub fn disable_pointing(mut self) -> Self {
        self.enable_pointing = false;
        self
    }

    /// Build the Bevy app with the selected configuration and plugins.
    pub fn build(self) -> App {
        let config = self.config;
        let request = config.fetcher_config();
        let channel = init_catalog_channel(request.clone());
        let renderer = self
            .renderer
            .unwrap_or_else(|| Box::new(MarkerRenderer::default()));
        let propagator = self
            .propagator
            .unwrap_or_else(|| Box::new(Sgp4Propagator::new()));

        let mut app = App::new();
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: self.window_title,
                resolution: self.window_resolution.into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(self.clear_color))
        .insert_resource(CatalogRequest(request))
        .insert_resource(channel)
        .insert_resource(PropagatorResource(propagator))
        .insert_resource(SyncThrottle::new(config.sync_interval_frames))
        .insert_resource(ClosestTracker::new(config.closest_cadence()))
        .add_plugins((pipeline_plugin, interaction_plugin, orbit_camera_plugin, render_plugin));

        renderer.setup(&mut app);
        app.insert_resource(RendererResource(renderer));

        let any_panel =
            self.enable_hud || self.enable_controls || self.enable_search || self.enable_inspector;
        if any_panel {
            app.add_plugins(ui_plugin);
        }
        if self.enable_hud {
            app.add_plugins(hud_plugin);
        }
        if self.enable_controls {
            app.add_plugins(controls_plugin);
        }
        if self.enable_search {
            app.add_plugins(search_plugin);
        }
        if self.enable_inspector {
            app.add_plugins(inspector_plugin);
        }

        if self.enable_pointing {
            match (config.pointer_addr, config.observer()) {
                (Some(addr), Some(observer)) => {
                    app.insert_resource(PointingClient::spawn(addr))
                        .insert_resource(Observer(observer))
                        .add_plugins(pointing_plugin);
                }
                (Some(_), None) => {
                    warn!("pointing: POINTER_ADDR set without OBSERVER_LAT/OBSERVER_LON; disabled");
                }
                _ => {}
            }
        }

        app
    }
}
