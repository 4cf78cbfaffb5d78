//! Bullseye entry point
//!
//! The browser shell owns the DOM side: canvas, input listeners, the
//! animation frame loop and the round-end timer. Everything it does to the
//! game goes through `bullseye::Game`.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        HtmlCanvasElement, HtmlElement, HtmlInputElement, KeyboardEvent, PageTransitionEvent,
        PointerEvent,
    };

    use bullseye::audio::{GameAudio, WebAudioBackend, game_audio};
    use bullseye::consts::*;
    use bullseye::renderer::{RenderState, build_scene};
    use bullseye::sim::{InputEvent, Key};
    use bullseye::{Game, HighScores, Settings, ShellAction, screen_to_game};

    /// Fallback frame step before the first timestamp arrives
    const FIRST_FRAME_DT: f32 = 1.0 / 60.0;

    struct Shell {
        game: Game<WebAudioBackend>,
        render_state: Option<RenderState>,
        canvas: HtmlCanvasElement,
        /// Pending animation frame request
        raf_handle: Option<i32>,
        /// Pending round-end timeout
        timer_handle: Option<i32>,
        /// Callback behind `timer_handle`, dropped when the timer is cancelled
        timer_closure: Option<Closure<dyn FnMut()>>,
        last_time: f64,
        /// Set on pagehide, cleared when the page comes back from the bfcache
        torn_down: bool,
    }

    impl Shell {
        fn new(game: Game<WebAudioBackend>, canvas: HtmlCanvasElement) -> Self {
            Self {
                game,
                render_state: None,
                canvas,
                raf_handle: None,
                timer_handle: None,
                timer_closure: None,
                last_time: 0.0,
                torn_down: false,
            }
        }

        /// Map a pointer event to game coordinates
        fn pointer_pos(&self, event: &PointerEvent) -> glam::Vec2 {
            screen_to_game(
                event.offset_x() as f32,
                event.offset_y() as f32,
                self.canvas.client_width() as f32,
                self.canvas.client_height() as f32,
                VIEW_RADIUS,
            )
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let frame = self.game.frame_info(time);
            let vertices = build_scene(&self.game.state, self.game.particles.current(), &frame);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Match the drawing buffer to the canvas' CSS size
        fn resize(&mut self) {
            let dpr = web_sys::window()
                .map(|w| w.device_pixel_ratio())
                .unwrap_or(1.0);
            let width = (self.canvas.client_width() as f64 * dpr) as u32;
            let height = (self.canvas.client_height() as f64 * dpr) as u32;
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = self.game.hud(js_sys::Date::now());

            let set_text = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    if el.text_content().as_deref() != Some(text) {
                        el.set_text_content(Some(text));
                    }
                }
            };

            set_text("#hud-score .hud-value", &hud.score.to_string());
            set_text(
                "#hud-arrows .hud-value",
                &hud.arrows_left
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "∞".to_string()),
            );
            set_text("#hud-wind .hud-value", &hud.wind);
            set_text("#hud-power .hud-value", &hud.power.to_string());
            set_text(
                "#hud-best .hud-value",
                &hud.best.map(|b| b.to_string()).unwrap_or_else(|| "-".to_string()),
            );

            // Result text fades out over the round-end delay
            if let Some(el) = document
                .get_element_by_id("message")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                match &hud.message {
                    Some((text, alpha)) => {
                        if el.text_content().as_deref() != Some(text.as_str()) {
                            el.set_text_content(Some(text));
                        }
                        let _ = el.style().set_property("opacity", &format!("{:.2}", alpha));
                    }
                    None => {
                        let _ = el.style().set_property("opacity", "0");
                    }
                }
            }

            // Show/hide match over
            if let Some(el) = document.get_element_by_id("match-over") {
                if hud.finished {
                    let _ = el.set_attribute("class", "");
                    set_text("#final-score", &hud.score.to_string());
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Bullseye starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element");
            return;
        };

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let audio: GameAudio = game_audio();
        let game = Game::new(seed, Settings::load(), HighScores::load(), audio);
        let shell = Rc::new(RefCell::new(Shell::new(game, canvas.clone())));

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("No WebGPU adapter: {}", e);
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height, VIEW_RADIUS).await {
            Ok(render_state) => shell.borrow_mut().render_state = Some(render_state),
            Err(e) => {
                log::error!("Failed to create device: {}", e);
                return;
            }
        }

        setup_input_handlers(&canvas, shell.clone());
        setup_buttons(shell.clone());
        setup_lifecycle(shell.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(shell);

        log::info!("Bullseye running!");
    }

    /// Carry out what the game asked the host to do
    fn apply_actions(shell: &Rc<RefCell<Shell>>, actions: Vec<ShellAction>) {
        for action in actions {
            match action {
                ShellAction::ScheduleRoundEnd { shot_id, delay_ms } => {
                    schedule_round_end(shell, shot_id, delay_ms);
                }
                ShellAction::CancelRoundEnd => cancel_round_end(&mut shell.borrow_mut()),
            }
        }
    }

    fn schedule_round_end(shell: &Rc<RefCell<Shell>>, shot_id: u64, delay_ms: f64) {
        let Some(window) = web_sys::window() else {
            return;
        };
        cancel_round_end(&mut shell.borrow_mut());

        let shell_cb = shell.clone();
        // A fired closure stays in the shell until the next schedule or cancel
        // replaces it; it must not be dropped while it runs.
        let closure = Closure::once(move || {
            let actions = {
                let mut s = shell_cb.borrow_mut();
                s.timer_handle = None;
                if s.torn_down {
                    return;
                }
                s.game.round_end(shot_id, js_sys::Date::now())
            };
            apply_actions(&shell_cb, actions);
        });
        let scheduled = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            delay_ms as i32,
        );
        let mut s = shell.borrow_mut();
        match scheduled {
            Ok(handle) => {
                s.timer_handle = Some(handle);
                s.timer_closure = Some(closure);
            }
            Err(e) => log::error!("setTimeout failed: {:?}", e),
        }
    }

    fn cancel_round_end(shell: &mut Shell) {
        if let Some(handle) = shell.timer_handle.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(handle);
            }
        }
        shell.timer_closure = None;
    }

    /// Feed one input event to the game and run the resulting actions
    fn send_input(shell: &Rc<RefCell<Shell>>, event: InputEvent) {
        let actions = {
            let mut s = shell.borrow_mut();
            if s.torn_down {
                return;
            }
            s.game.input(event, js_sys::Date::now())
        };
        apply_actions(shell, actions);
    }

    /// Keys typed into a form field are not game input
    fn typing_in_field(event: &KeyboardEvent) -> bool {
        event
            .target()
            .is_some_and(|t| t.dyn_ref::<HtmlInputElement>().is_some())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, shell: Rc<RefCell<Shell>>) {
        // Pointer events cover mouse, touch and pen
        for name in ["pointerdown", "pointermove"] {
            let shell = shell.clone();
            let down = name == "pointerdown";
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                if down {
                    event.prevent_default();
                }
                let pos = shell.borrow().pointer_pos(&event);
                let input = if down {
                    InputEvent::PointerDown { pos }
                } else {
                    InputEvent::PointerMove { pos }
                };
                send_input(&shell, input);
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for (name, input) in [
            ("pointerup", InputEvent::PointerUp),
            ("pointerleave", InputEvent::PointerLeave),
            ("pointercancel", InputEvent::PointerLeave),
        ] {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                send_input(&shell, input);
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        let Some(window) = web_sys::window() else {
            return;
        };
        {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if typing_in_field(&event) {
                    return;
                }
                if let Some(key) = Key::from_dom_key(&event.key()) {
                    // Keep Space/arrows from scrolling the page
                    event.prevent_default();
                    send_input(
                        &shell,
                        InputEvent::KeyDown {
                            key,
                            repeat: event.repeat(),
                        },
                    );
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if typing_in_field(&event) {
                    return;
                }
                if let Some(key) = Key::from_dom_key(&event.key()) {
                    send_input(&shell, InputEvent::KeyUp { key });
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(shell: Rc<RefCell<Shell>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        // Reset from the HUD or the match-over panel
        for id in ["reset-btn", "play-again-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let shell = shell.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    let actions = shell.borrow_mut().game.reset(js_sys::Date::now());
                    apply_actions(&shell, actions);
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        // Leaderboard name; blank or unusable names report as the default
        if let Some(input) = document
            .get_element_by_id("player-name")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(&shell.borrow().game.settings.player_name);
            let shell = shell.clone();
            let input_cb = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut s = shell.borrow_mut();
                let mut settings = s.game.settings.clone();
                settings.player_name = input_cb.value();
                s.game.apply_settings(settings);
            });
            let _ =
                input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("mute-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut s = shell.borrow_mut();
                let mut settings = s.game.settings.clone();
                settings.muted = !settings.muted;
                log::info!("Muted: {}", settings.muted);
                s.game.apply_settings(settings);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_lifecycle(shell: Rc<RefCell<Shell>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                shell.borrow_mut().resize();
            });
            let _ =
                window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Page going away: stop the frame loop and any pending timer
        {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut s = shell.borrow_mut();
                s.torn_down = true;
                if let Some(handle) = s.raf_handle.take() {
                    if let Some(window) = web_sys::window() {
                        let _ = window.cancel_animation_frame(handle);
                    }
                }
                cancel_round_end(&mut s);
                log::info!("Torn down");
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Restored from the back/forward cache: pick up where pagehide stopped
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PageTransitionEvent| {
                if !event.persisted() {
                    return;
                }
                let resume = {
                    let mut s = shell.borrow_mut();
                    if !s.torn_down {
                        return;
                    }
                    s.torn_down = false;
                    s.last_time = 0.0;
                    s.game.resume_actions()
                };
                log::info!("Resumed from bfcache");
                apply_actions(&shell, resume);
                request_animation_frame(shell.clone());
            });
            let _ = window
                .add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(shell: Rc<RefCell<Shell>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let shell_cb = shell.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(shell_cb, time);
        });
        if let Ok(handle) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            shell.borrow_mut().raf_handle = Some(handle);
        }
        closure.forget();
    }

    fn game_loop(shell: Rc<RefCell<Shell>>, time: f64) {
        {
            let mut s = shell.borrow_mut();
            s.raf_handle = None;
            if s.torn_down {
                return;
            }

            // Calculate delta time
            let dt = if s.last_time > 0.0 {
                ((time - s.last_time) / 1000.0) as f32
            } else {
                FIRST_FRAME_DT
            };
            s.last_time = time;

            s.game.tick(dt);
            s.render(time);
            s.update_hud();
        }

        request_animation_frame(shell);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bullseye (native) starting...");
    log::info!("Native mode runs a headless demo match - serve the wasm build for the real game");

    demo_match();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Shoot one scripted match and print the result
#[cfg(not(target_arch = "wasm32"))]
fn demo_match() {
    use bullseye::audio::game_audio;
    use bullseye::consts::ROUND_END_DELAY_MS;
    use bullseye::sim::{GamePhase, InputEvent};
    use bullseye::{Game, HighScores, Settings, ShellAction};
    use glam::Vec2;

    let settings = Settings::load();
    let mut game = Game::new(42, settings, HighScores::load(), game_audio());
    let mut now = 0.0;

    fn handle(actions: Vec<ShellAction>, pending: &mut Option<u64>) {
        for action in actions {
            match action {
                ShellAction::ScheduleRoundEnd { shot_id, .. } => *pending = Some(shot_id),
                ShellAction::CancelRoundEnd => *pending = None,
            }
        }
    }

    let mut pending: Option<u64> = None;
    let mut arrow = 0u32;
    while game.state.phase != GamePhase::Finished {
        // Lean into the wind and pull straight down onto the mark
        let wind = game.state.wind;
        let lead = -wind.direction.sign() * wind.speed * 0.12;
        let mark = Vec2::new(lead, 0.0);
        let draw = 6.0 + (arrow % 5) as f32 * 3.0;
        let start = mark + Vec2::new(0.0, draw);

        handle(game.input(InputEvent::PointerDown { pos: start }, now), &mut pending);
        for step in 1..=4 {
            now += 50.0;
            let pos = start - Vec2::new(0.0, draw * step as f32 / 4.0);
            handle(game.input(InputEvent::PointerMove { pos }, now), &mut pending);
        }
        handle(game.input(InputEvent::PointerUp, now), &mut pending);

        if let Some(impact) = game.state.latest_impact() {
            println!(
                "Arrow {:>2}: wind {:>4.1} {:?}, landed ({:>5.2}, {:>5.2}) -> {}",
                arrow + 1,
                wind.speed,
                wind.direction,
                impact.pos.x,
                impact.pos.y,
                impact.score
            );
        }

        for _ in 0..30 {
            game.tick(1.0 / 60.0);
        }
        now += ROUND_END_DELAY_MS;
        if let Some(shot_id) = pending.take() {
            handle(game.round_end(shot_id, now), &mut pending);
        } else {
            break;
        }
        arrow += 1;
    }

    let hud = game.hud(now);
    println!(
        "\nMatch over: {} points from {} arrows ({} perfect)",
        hud.score, hud.attempts, game.state.stats.perfects
    );
}
