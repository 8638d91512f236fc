#[allow(unused_imports)]
use log::{debug, error, info, warn};
use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Context};
use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::*;

use crate::app::App;
use crate::frame_hook::FrameHook;
use crate::input::{GamepadSnapshot, Hand, HandSlots};
use crate::math::{Quatf, UnitQuatf, Vec3f};


fn request_animation_frame(session: &XrSession, f: &Closure<dyn FnMut(f64, XrFrame)>) -> u32 {
    // This turns the Closure into a js_sys::Function
    // See https://rustwasm.github.io/wasm-bindgen/api/wasm_bindgen/closure/struct.Closure.html#casting-a-closure-to-a-js_sysfunction
    session.request_animation_frame(f.as_ref().unchecked_ref())
}

pub(crate) fn js_err(e: JsValue) -> anyhow::Error {
    anyhow!("{:?}", e)
}

fn js_array(values: &[&str]) -> JsValue {
    JsValue::from(values.iter()
        .map(|x| JsValue::from_str(x))
        .collect::<js_sys::Array>())
}

fn handedness(source: &XrInputSource) -> Option<&'static str> {
    match source.handedness() {
        XrHandedness::Left => Some("left"),
        XrHandedness::Right => Some("right"),
        _ => None,
    }
}

fn profiles(source: &XrInputSource) -> Vec<String> {
    source.profiles().iter().filter_map(|p| p.as_string()).collect()
}

fn snapshot(gamepad: &Gamepad) -> GamepadSnapshot {
    let axes = gamepad.axes().iter()
        .map(|v| v.as_f64().unwrap_or(0.0) as f32)
        .collect();
    let buttons = gamepad.buttons().iter()
        .map(|b| b.unchecked_into::<GamepadButton>().pressed())
        .collect();
    GamepadSnapshot::new(axes, buttons)
}

fn create_webgl_context() -> anyhow::Result<WebGl2RenderingContext> {
    let canvas = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("canvas"))
        .context("no #canvas element")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| anyhow!("#canvas is not a canvas"))?;

    let gl_attribs = Object::new();
    Reflect::set(&gl_attribs, &JsValue::from_str("xrCompatible"), &JsValue::TRUE)
        .map_err(js_err)?;

    canvas
        .get_context_with_context_options("webgl2", &gl_attribs)
        .map_err(js_err)?
        .context("webgl2 unavailable")?
        .dyn_into()
        .map_err(|_| anyhow!("context is not webgl2"))
}

/// An immersive-vr session driving an [`App`] once per XR frame.
pub struct WebXRApp {
    session: XrSession,
    ref_space: Rc<XrReferenceSpace>,
    #[allow(dead_code)]
    gl: WebGl2RenderingContext,
}

impl WebXRApp {
    pub async fn new() -> anyhow::Result<Self> {
        info!("Starting WebXR...");
        let gl = create_webgl_context().context("creating WebGL2 context")?;

        let navigator: web_sys::Navigator = web_sys::window().context("no window")?.navigator();
        let xr = navigator.xr();
        let session_mode = XrSessionMode::ImmersiveVr;

        let supported = wasm_bindgen_futures::JsFuture::from(xr.is_session_supported(session_mode))
            .await
            .map_err(js_err)?;
        if supported != JsValue::TRUE {
            return Err(anyhow!("immersive-vr sessions are not supported"));
        }

        let mut session_init = XrSessionInit::new();
        session_init.optional_features(&js_array(&["local-floor"]));
        let session: XrSession = wasm_bindgen_futures::JsFuture::from(
            xr.request_session_with_options(session_mode, &session_init),
        )
        .await
        .map_err(js_err)
        .context("requesting XR session")?
        .into();

        // The session won't deliver frames without a base layer; the external
        // renderer draws into it.
        let xr_gl_layer = XrWebGlLayer::new_with_web_gl2_rendering_context(&session, &gl)
            .map_err(js_err)?;
        let mut render_state_init = XrRenderStateInit::new();
        render_state_init.base_layer(Some(&xr_gl_layer));
        session.update_render_state_with_state(&render_state_init);

        // Floor-level origin where available, so rig height is the floor
        let ref_space = match wasm_bindgen_futures::JsFuture::from(
            session.request_reference_space(XrReferenceSpaceType::LocalFloor),
        )
        .await
        {
            Ok(space) => space,
            Err(e) => {
                warn!("local-floor reference space unavailable ({:?}), using local", e);
                wasm_bindgen_futures::JsFuture::from(
                    session.request_reference_space(XrReferenceSpaceType::Local),
                )
                .await
                .map_err(js_err)
                .context("requesting reference space")?
            }
        };
        let ref_space: XrReferenceSpace = ref_space.into();

        Ok(Self { session, ref_space: Rc::new(ref_space), gl })
    }

    /// Wires controller connect/disconnect and session end to `app`.
    fn watch_session(&self, app: Rc<RefCell<App>>) {
        let on_sources = {
            let app = app.clone();
            let mut slots = HandSlots::<XrInputSource>::new();
            Closure::<dyn FnMut(XrInputSourcesChangeEvent)>::new(move |event: XrInputSourcesChangeEvent| {
                let mut app = app.borrow_mut();
                let sources = event.session().input_sources();
                for (i, source) in event.added().iter().enumerate() {
                    let source: XrInputSource = source.unchecked_into();
                    // Same slot the frame loop resolves it by
                    let slot = (0..sources.length())
                        .find(|&j| sources.get(j).as_ref() == Some(&source))
                        .map_or(i, |j| j as usize);
                    let side = handedness(&source);
                    let profiles = profiles(&source);
                    let hand = slots.connect(source, side, slot);
                    app.controller_connected(hand, profiles);
                }
                for (i, source) in event.removed().iter().enumerate() {
                    let source: XrInputSource = source.unchecked_into();
                    let hand = slots.disconnect(&source, handedness(&source), i);
                    app.controller_disconnected(hand);
                }
            })
        };
        self.session.set_oninputsourceschange(Some(on_sources.as_ref().unchecked_ref()));
        on_sources.forget();

        let on_end = Closure::<dyn FnMut(XrSessionEvent)>::new(move |_: XrSessionEvent| {
            app.borrow_mut().end_session();
        });
        self.session.set_onend(Some(on_end.as_ref().unchecked_ref()));
        on_end.forget();
    }

    pub fn start(&self, app: Rc<RefCell<App>>, on_frame: FrameHook<js_sys::Function>) {
        self.watch_session(app.clone());

        let f = Rc::new(RefCell::new(None));
        let g = f.clone();

        let ref_space = self.ref_space.clone();
        let last_frame_time = Rc::new(RefCell::new(None::<f64>));

        *g.borrow_mut() = Some(Closure::new(move |time: f64, frame: XrFrame| {
            let sess: XrSession = frame.session();

            let rig_position = {
                let mut app = app.borrow_mut();
                if !app.is_running() {
                    return;
                }

                // Gamepads, by hand
                let sources = sess.input_sources();
                let mut seen = [false; 2];
                for i in 0..sources.length() {
                    let Some(source) = sources.get(i) else { continue };
                    let hand = Hand::resolve(handedness(&source), i as usize);
                    seen[hand as usize] = true;
                    app.update_controller_input(hand, source.gamepad().map(|g| snapshot(&g)));
                }
                for hand in [Hand::Left, Hand::Right] {
                    if !seen[hand as usize] {
                        app.update_controller_input(hand, None);
                    }
                }

                if let Some(pose) = frame.get_viewer_pose(&ref_space) {
                    let transform = pose.transform();
                    let p = transform.position();
                    let r = transform.orientation();
                    app.update_camera(
                        Vec3f::new(p.x() as f32, p.y() as f32, p.z() as f32),
                        UnitQuatf::new_normalize(Quatf::new(r.w() as f32, r.x() as f32, r.y() as f32, r.z() as f32)),
                    );
                }

                let elapsed_ms = last_frame_time.borrow().map_or(0.0, |last| time - last);
                last_frame_time.replace(Some(time));
                app.update_scene(std::time::Duration::from_secs_f64(elapsed_ms.max(0.0) / 1000.0));

                app.rig_position()
            };

            // App is released here so the callback may call back into it
            if let (Some(callback), Some(pos)) = (on_frame.get(), rig_position) {
                let pos = js_sys::Float32Array::from(&[pos.x, pos.y, pos.z][..]);
                if let Err(e) = callback.call2(&JsValue::NULL, &frame, &pos) {
                    error!("on_frame callback failed: {:?}", e);
                }
            }

            // Schedule ourself for another requestAnimationFrame callback.
            if let Some(next) = f.borrow().as_ref() {
                request_animation_frame(&sess, next);
            }
        }));

        if let Some(first) = g.borrow().as_ref() {
            request_animation_frame(&self.session, first);
        }
    }
}
