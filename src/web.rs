//! Browser binding
//!
//! The page keeps its JavaScript physics engine (bodies, rendering, DOM) and
//! hands the machine a host object of callbacks:
//!
//! - `createBody(x, y, radius, restitution, friction, density) -> id`
//! - `destroyBody(id)`
//! - `bodyPosition(id) -> [x, y] | null`
//! - `movePusher(x, y)`
//! - `showSpinning()`
//! - `displayOutcome(tier, payout, reels)`
//!
//! The page calls `insertCoin()` from its button and `frame(dtMs)` from its
//! animation loop.

use glam::Vec2;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::consts::SIM_STEP_MS;
use crate::error::MachineError;
use crate::settings::{MachineConfig, VariantPreset};
use crate::sim::{
    BodyHandle, CoinMaterial, FixedStep, Machine, OutcomeDisplay, PhysicsWorld, Playfield,
    SpinOutcome, TickInput, tick,
};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Coin Pusher wasm module loaded");
}

/// Look up a callback on the host object
fn host_fn(host: &JsValue, name: &str) -> Result<Function, JsValue> {
    Reflect::get(host, &JsValue::from_str(name))?
        .dyn_into::<Function>()
        .map_err(|_| JsValue::from_str(&format!("host.{name} must be a function")))
}

fn num(v: f32) -> JsValue {
    JsValue::from_f64(f64::from(v))
}

/// Physics engine living on the JavaScript side
struct JsWorld {
    create_body: Function,
    destroy_body: Function,
    body_position: Function,
    move_pusher: Function,
}

impl PhysicsWorld for JsWorld {
    fn create_body(&mut self, pos: Vec2, material: &CoinMaterial) -> Option<BodyHandle> {
        let args: Array = [
            pos.x,
            pos.y,
            material.radius,
            material.restitution,
            material.friction,
            material.density,
        ]
        .into_iter()
        .map(num)
        .collect();
        let value = match self.create_body.apply(&JsValue::NULL, &args) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("createBody threw: {:?}", e);
                return None;
            }
        };
        let handle = value.as_f64().and_then(BodyHandle::from_host_id);
        if handle.is_none() {
            log::warn!("createBody returned {:?}, expected a whole non-negative id", value);
        }
        handle
    }

    fn destroy_body(&mut self, handle: BodyHandle) {
        if let Err(e) = self
            .destroy_body
            .call1(&JsValue::NULL, &JsValue::from(handle.0))
        {
            log::warn!("destroyBody({}) threw: {:?}", handle.0, e);
        }
    }

    fn body_position(&self, handle: BodyHandle) -> Option<Vec2> {
        let value = self
            .body_position
            .call1(&JsValue::NULL, &JsValue::from(handle.0))
            .ok()?;
        if value.is_null() || value.is_undefined() {
            return None;
        }
        let pair = value.dyn_into::<Array>().ok()?;
        let x = pair.get(0).as_f64()?;
        let y = pair.get(1).as_f64()?;
        Some(Vec2::new(x as f32, y as f32))
    }

    fn set_pusher_position(&mut self, pos: Vec2) {
        if let Err(e) = self
            .move_pusher
            .call2(&JsValue::NULL, &num(pos.x), &num(pos.y))
        {
            log::warn!("movePusher threw: {:?}", e);
        }
    }
}

/// Reels and payout text living in the DOM
struct JsDisplay {
    show_spinning: Function,
    display_outcome: Function,
}

impl OutcomeDisplay for JsDisplay {
    fn show_spinning(&mut self) {
        if let Err(e) = self.show_spinning.call0(&JsValue::NULL) {
            log::warn!("showSpinning threw: {:?}", e);
        }
    }

    fn display_outcome(&mut self, outcome: &SpinOutcome) -> Result<(), MachineError> {
        let reels: Array = outcome.reels().iter().map(|s| JsValue::from_str(s)).collect();
        self.display_outcome
            .call3(
                &JsValue::NULL,
                &JsValue::from_str(outcome.tier.as_str()),
                &JsValue::from(outcome.payout),
                &reels,
            )
            .map(|_| ())
            .map_err(|e| MachineError::Display(format!("{:?}", e)))
    }
}

/// A machine wired to a JavaScript host
#[wasm_bindgen]
pub struct WebMachine {
    machine: Machine,
    world: JsWorld,
    display: JsDisplay,
    clock: FixedStep,
    input: TickInput,
}

#[wasm_bindgen]
impl WebMachine {
    #[wasm_bindgen(constructor)]
    pub fn new(
        host: JsValue,
        window_width: f32,
        window_height: f32,
        seed: f64,
    ) -> Result<WebMachine, JsValue> {
        let world = JsWorld {
            create_body: host_fn(&host, "createBody")?,
            destroy_body: host_fn(&host, "destroyBody")?,
            body_position: host_fn(&host, "bodyPosition")?,
            move_pusher: host_fn(&host, "movePusher")?,
        };
        let display = JsDisplay {
            show_spinning: host_fn(&host, "showSpinning")?,
            display_outcome: host_fn(&host, "displayOutcome")?,
        };
        let field = Playfield::from_window(window_width, window_height);
        let machine = Machine::new(MachineConfig::load(), field, seed as u64)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        log::info!("Machine created with seed: {}", seed as u64);

        Ok(Self {
            machine,
            world,
            display,
            clock: FixedStep::new(),
            input: TickInput::default(),
        })
    }

    /// Lay out the initial pile
    pub fn start(&mut self) {
        self.machine.start(&mut self.world);
    }

    /// Insert-coin button; consumed by the next simulation step
    #[wasm_bindgen(js_name = insertCoin)]
    pub fn insert_coin(&mut self) {
        self.input.insert_coin = true;
    }

    /// Run simulation steps for `dt_ms` of wall time
    pub fn frame(&mut self, dt_ms: f64) {
        for _ in 0..self.clock.steps(dt_ms) {
            tick(
                &mut self.machine,
                &mut self.world,
                &mut self.display,
                &self.input,
                SIM_STEP_MS,
            );

            // Clear one-shot inputs after processing
            self.input.insert_coin = false;
        }
    }

    pub fn resize(&mut self, window_width: f32, window_height: f32) {
        self.machine
            .resize(Playfield::from_window(window_width, window_height));
    }

    /// Release every coin and refill with a new seed
    pub fn reset(&mut self, seed: f64) {
        self.machine.reset(&mut self.world, seed as u64);
        self.clock.reset();
        self.input = TickInput::default();
    }

    /// Switch cabinet variant and remember it; false for an unknown name
    #[wasm_bindgen(js_name = setVariant)]
    pub fn set_variant(&mut self, name: &str) -> bool {
        let Some(preset) = VariantPreset::from_str(name) else {
            return false;
        };
        self.machine.config.apply_preset(preset);
        self.machine.config.save();
        log::info!("Variant set to {}", preset.as_str());
        true
    }

    #[wasm_bindgen(getter, js_name = isSpinning)]
    pub fn is_spinning(&self) -> bool {
        self.machine.sequencer.is_spinning()
    }

    #[wasm_bindgen(getter, js_name = coinCount)]
    pub fn coin_count(&self) -> u32 {
        self.machine.coins.len() as u32
    }

    /// Side guards and pusher size as JSON, for building static bodies
    #[wasm_bindgen(js_name = layoutJson)]
    pub fn layout_json(&self) -> String {
        let field = &self.machine.field;
        serde_json::json!({
            "width": field.width,
            "height": field.height,
            "guards": field.guards(),
            "pusherSize": self.machine.pusher.size(field),
        })
        .to_string()
    }

    /// Session stats as JSON for the HUD
    #[wasm_bindgen(js_name = statsJson)]
    pub fn stats_json(&self) -> String {
        serde_json::to_string(&self.machine.stats).unwrap_or_default()
    }
}
