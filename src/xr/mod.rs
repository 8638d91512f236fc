#![cfg(web_sys_unstable_apis)]

mod webxr;

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context;
use log::info;
use wasm_bindgen::prelude::*;

use crate::app::App;
use crate::config::Settings;
use crate::frame_hook::FrameHook;
use crate::logging::init_logging;
use crate::physics_world::GroundId;
use webxr::WebXRApp;

/// Handle returned to the page for feeding terrain and reading the rig.
#[wasm_bindgen]
pub struct Session {
    app: Rc<RefCell<App>>,
    on_frame: FrameHook<js_sys::Function>,
    #[allow(dead_code)]
    xr: WebXRApp,
}

#[wasm_bindgen]
impl Session {
    /// Adds a triangle mesh as walkable ground and returns its id.
    pub fn add_ground_mesh(&self, positions: Vec<f32>, indices: Vec<u32>) -> Result<u32, JsValue> {
        self.app
            .borrow_mut()
            .add_ground_mesh(&positions, &indices)
            .map(|id| id.0)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn remove_ground(&self, id: u32) -> bool {
        self.app.borrow_mut().remove_ground(GroundId(id))
    }

    pub fn rig_position(&self) -> Vec<f32> {
        self.app
            .borrow_mut()
            .rig_position()
            .map(|p| vec![p.x, p.y, p.z])
            .unwrap_or_default()
    }

    /// Called after every frame with `(frame, rigPosition)`.
    pub fn set_on_frame(&self, callback: Option<js_sys::Function>) {
        self.on_frame.set(callback);
    }
}

async fn start_session(settings_json: Option<String>) -> anyhow::Result<Session> {
    let settings = match settings_json {
        Some(json) => Settings::from_json(&json).context("parsing settings")?,
        None => Settings::default(),
    };
    info!("Scene variant {:?}", settings.variant);

    let xr = WebXRApp::new().await?;
    let app = Rc::new(RefCell::new(App::new(settings, true)));
    let on_frame = FrameHook::new();
    xr.start(app.clone(), on_frame.clone());

    Ok(Session { app, on_frame, xr })
}

/// Requests an immersive session and starts the locomotion loop.
#[wasm_bindgen]
pub async fn start(settings_json: Option<String>) -> Result<Session, JsValue> {
    init_logging();
    start_session(settings_json)
        .await
        .map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
