//! Shape Burst entry point
//!
//! Web: DOM front end driving the session from requestAnimationFrame.
//! Native: headless autoplay demo that plays one full game and records it.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlSelectElement, MouseEvent, TouchEvent};

    use shape_burst::audio::AudioManager;
    use shape_burst::music::{MusicPlayer, Playlist};
    use shape_burst::persistence::{LocalStorage, MemoryStorage, Storage};
    use shape_burst::platform::{Camera, FramePacer};
    use shape_burst::sim::{
        Autoplay, EntityKind, GameEvent, GamePhase, PowerUpKind, SphereIntersector, TickInput,
    };
    use shape_burst::{Session, Theme, Tuning};

    /// How long floating text and constellation lines stay up (ms)
    const POPUP_MS: f64 = 1000.0;
    const OBJECTIVE_MS: f64 = 2000.0;

    /// Game instance holding all state
    struct Game {
        session: Session,
        storage: Box<dyn Storage>,
        pacer: FramePacer,
        camera: Camera,
        picker: SphereIntersector,
        audio: AudioManager,
        music: Option<MusicPlayer>,
        input: TickInput,
        autoplay: Option<Autoplay>,
        /// Transient elements and their removal time
        transients: Vec<(Element, f64)>,
        objective_until: f64,
        viewport: (f32, f32),
        now_ms: f64,
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(doc: &Document, id: &str, text: &str) {
        if let Some(el) = doc.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(doc: &Document, id: &str, hidden: bool) {
        if let Some(el) = doc.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn set_px(el: &Element, prop: &str, value: f32) {
        if let Some(el) = el.dyn_ref::<HtmlElement>() {
            let _ = el.style().set_property(prop, &format!("{:.1}px", value));
        }
    }

    fn shape_class(kind: EntityKind) -> String {
        match kind {
            EntityKind::Shape(v) => format!("shape {}", v.as_str()),
            EntityKind::Boss(v) => format!("shape boss {}", v.as_str()),
            EntityKind::PowerUp(PowerUpKind::Time) => "shape power-up time".to_string(),
            EntityKind::PowerUp(PowerUpKind::Multiplier) => "shape power-up multiplier".to_string(),
        }
    }

    fn window_size() -> (f32, f32) {
        let Some(window) = web_sys::window() else {
            return (1.0, 1.0);
        };
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
        (w.max(1.0) as f32, h.max(1.0) as f32)
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let storage: Box<dyn Storage> = match LocalStorage::open() {
                Ok(storage) => Box::new(storage),
                Err(e) => {
                    log::warn!("{}; scores will not persist", e);
                    Box::new(MemoryStorage::new())
                }
            };
            let session = Session::load(seed, Tuning::default(), storage.as_ref());
            let mut playlist = Playlist::shuffled(&mut rand::rng());
            playlist.set_volume(session.settings.music_volume);
            playlist.set_enabled(session.settings.music_enabled);
            let viewport = window_size();
            let picker = SphereIntersector::from_tuning(&session.state.tuning);
            Self {
                session,
                storage,
                pacer: FramePacer::default(),
                camera: Camera::new(viewport.0 / viewport.1),
                picker,
                audio: AudioManager::new(),
                music: MusicPlayer::new(playlist),
                input: TickInput::default(),
                autoplay: None,
                transients: Vec::new(),
                objective_until: 0.0,
                viewport,
                now_ms: 0.0,
            }
        }

        fn resize(&mut self) {
            self.viewport = window_size();
            self.camera.set_viewport(self.viewport.0, self.viewport.1);
        }

        fn start(&mut self) {
            if !self.session.start() {
                return;
            }
            self.audio.resume();
            if let Some(doc) = document() {
                set_hidden(&doc, "start-screen", true);
                set_hidden(&doc, "game-ui", false);
            }
            if let Some(music) = &mut self.music {
                if !music.playlist.is_playing() {
                    music.toggle_play();
                }
            }
            self.sync_music_ui();
        }

        fn restart(&mut self) {
            if !self.session.restart() {
                return;
            }
            self.pacer.reset();
            if let Some(doc) = document() {
                set_hidden(&doc, "game-over", true);
                if let Some(input) = doc.get_element_by_id("player-name") {
                    if let Ok(input) = input.dyn_into::<HtmlInputElement>() {
                        input.set_disabled(false);
                        input.set_value("");
                    }
                }
                set_disabled(&doc, "submit-score", false);
            }
        }

        fn toggle_pause(&mut self) {
            self.input.pause = true;
        }

        fn pointer(&mut self, x: f32, y: f32) {
            let ray = self.camera.ray_from_pointer(x, y, self.viewport.0, self.viewport.1);
            self.session.on_pointer_action(&ray, &self.picker);
        }

        fn submit_score(&mut self) {
            let Some(doc) = document() else { return };
            let name = doc
                .get_element_by_id("player-name")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| {
                    input.set_disabled(true);
                    input.value()
                })
                .unwrap_or_default();
            match self.session.submit_score(&name, self.storage.as_mut()) {
                Ok(Some(rank)) => log::info!("Ranked #{}", rank),
                Ok(None) => {}
                Err(e) => log::warn!("Failed to save leaderboard: {}", e),
            }
            set_disabled(&doc, "submit-score", true);
            self.render_leaderboard(&doc);
        }

        fn clear_leaderboard(&mut self) {
            if let Err(e) = self.session.clear_leaderboard(self.storage.as_mut()) {
                log::warn!("Failed to clear leaderboard: {}", e);
            }
            if let Some(doc) = document() {
                self.render_leaderboard(&doc);
            }
        }

        fn set_theme(&mut self, theme: Theme) {
            self.session.set_theme(theme);
            if let Err(e) = self.session.save_settings(self.storage.as_mut()) {
                log::warn!("Failed to save settings: {}", e);
            }
            apply_theme(theme);
        }

        fn close_tutorial(&mut self) {
            self.session.settings.mark_tutorial_shown();
            if let Err(e) = self.session.save_settings(self.storage.as_mut()) {
                log::warn!("Failed to save settings: {}", e);
            }
            if let Some(doc) = document() {
                set_hidden(&doc, "tutorial-screen", true);
                set_hidden(&doc, "start-screen", false);
            }
        }

        fn sync_music_ui(&self) {
            let (Some(doc), Some(music)) = (document(), &self.music) else {
                return;
            };
            let track = music.playlist.current();
            set_text(&doc, "track-name", track.name);
            if let Some(art) = doc.get_element_by_id("track-art") {
                let _ = art.set_attribute("src", track.art);
            }
            if let Some(select) = doc
                .get_element_by_id("track-select")
                .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
            {
                select.set_value(track.key);
            }
            if let Some(btn) = doc.get_element_by_id("play-pause") {
                let playing = music.playlist.is_playing();
                let _ = btn.class_list().toggle_with_force("pause", playing);
                let _ = btn.class_list().toggle_with_force("play", !playing);
            }
            if let Some(vis) = doc.get_element_by_id("visualizer") {
                let _ = vis.class_list().toggle_with_force("playing", music.playlist.is_playing());
            }
        }

        fn render_leaderboard(&self, doc: &Document) {
            let Some(list) = doc.get_element_by_id("leaderboard-list") else {
                return;
            };
            list.set_inner_html("");
            for line in self.session.leaderboard.lines() {
                if let Ok(li) = doc.create_element("li") {
                    // Names are user input; text content only
                    li.set_text_content(Some(&line));
                    let _ = list.append_child(&li);
                }
            }
        }

        /// Frame callback
        fn update(&mut self, time: f64) {
            self.now_ms = time;
            let Some(dt) = self.pacer.accept(time) else {
                return;
            };

            if let Some(bot) = &mut self.autoplay {
                if let Some(ray) = bot.next_ray(&self.session.state, dt) {
                    self.session.on_pointer_action(&ray, &self.picker);
                }
            }

            let input = std::mem::take(&mut self.input);
            let was_paused = self.session.phase() == GamePhase::Paused;
            self.session.on_tick_with(&input, dt);
            if was_paused != (self.session.phase() == GamePhase::Paused) {
                self.on_pause_changed();
            }

            let Some(doc) = document() else { return };
            for event in self.session.drain_events() {
                self.present(&doc, event);
            }
            self.layout_entities(&doc);
            self.expire_transients(&doc);
            self.update_hud(&doc);
        }

        fn on_pause_changed(&mut self) {
            let paused = self.session.phase() == GamePhase::Paused;
            if let Some(doc) = document() {
                set_text(&doc, "pause-btn", if paused { "Resume" } else { "Pause" });
            }
            if let Some(music) = &mut self.music {
                // Music follows the pause state when enabled
                if music.playlist.is_playing() == paused && music.playlist.is_enabled() {
                    music.toggle_play();
                }
            }
            self.sync_music_ui();
        }

        fn spawn_transient(&mut self, doc: &Document, class: &str, text: &str, at: (f32, f32), ttl_ms: f64) -> Option<Element> {
            let el = doc.create_element("div").ok()?;
            el.set_class_name(class);
            el.set_text_content(Some(text));
            set_px(&el, "left", at.0);
            set_px(&el, "top", at.1);
            let _ = doc.get_element_by_id("scene")?.append_child(&el);
            self.transients.push((el.clone(), self.now_ms + ttl_ms));
            Some(el)
        }

        /// Turn simulation events into DOM/audio effects
        fn present(&mut self, doc: &Document, event: GameEvent) {
            let (w, h) = self.viewport;
            match event {
                GameEvent::Spawned { id, kind, .. } => {
                    let Ok(el) = doc.create_element("div") else { return };
                    el.set_id(&format!("entity-{}", id));
                    el.set_class_name(&shape_class(kind));
                    if let Some(scene) = doc.get_element_by_id("scene") {
                        let _ = scene.append_child(&el);
                    }
                }
                GameEvent::Despawned { id, .. } => {
                    if let Some(el) = doc.get_element_by_id(&format!("entity-{}", id)) {
                        el.remove();
                    }
                }
                GameEvent::BurstSound { id, kind } => self.audio.play_burst(id, kind),
                GameEvent::Popup { pos, popup } => {
                    if let Some(at) = self.camera.project_to_screen(pos, w, h) {
                        self.spawn_transient(doc, "popup", &popup.text(), (at.x, at.y), POPUP_MS);
                    }
                }
                GameEvent::ConstellationLink { from, to } => {
                    let (Some(a), Some(b)) = (
                        self.camera.project_to_screen(from, w, h),
                        self.camera.project_to_screen(to, w, h),
                    ) else {
                        return;
                    };
                    let d = b - a;
                    if let Some(line) = self.spawn_transient(doc, "constellation-line", "", (a.x, a.y), POPUP_MS) {
                        set_px(&line, "width", d.length());
                        if let Some(line) = line.dyn_ref::<HtmlElement>() {
                            let _ = line
                                .style()
                                .set_property("transform", &format!("rotate({}rad)", d.y.atan2(d.x)));
                        }
                    }
                }
                GameEvent::Objective(message) => {
                    set_text(doc, "center-objective", &message);
                    set_hidden(doc, "center-objective", false);
                    self.objective_until = self.now_ms + OBJECTIVE_MS;
                }
                GameEvent::LevelUp { level, .. } => {
                    log::debug!("Presenting level {}", level);
                }
                GameEvent::GameOver { .. } => {
                    set_text(doc, "final-score", &self.session.final_score().unwrap_or(0).to_string());
                    set_hidden(doc, "game-over", false);
                    self.render_leaderboard(doc);
                    if let Some(music) = &mut self.music {
                        if music.playlist.is_playing() {
                            music.toggle_play();
                        }
                    }
                    self.sync_music_ui();
                }
                GameEvent::MultiplierExpired => {}
                GameEvent::SlowTime { active } => {
                    if let Some(ui) = doc.get_element_by_id("game-ui") {
                        let _ = ui.class_list().toggle_with_force("slow-time", active);
                    }
                }
            }
        }

        /// Place entity elements at their projected positions
        fn layout_entities(&self, doc: &Document) {
            let (w, h) = self.viewport;
            let half_h = (self.camera.fov_y_deg.to_radians() * 0.5).tan();
            for entity in &self.session.state.entities {
                let Some(el) = doc.get_element_by_id(&format!("entity-{}", entity.id)) else {
                    continue;
                };
                let Some(at) = self.camera.project_to_screen(entity.pos, w, h) else {
                    set_px(&el, "left", -1000.0);
                    continue;
                };
                let depth = (self.camera.eye - entity.pos).length().max(0.1);
                let px = entity.size * h / (2.0 * half_h * depth);
                set_px(&el, "left", at.x - px * 0.5);
                set_px(&el, "top", at.y - px * 0.5);
                set_px(&el, "width", px);
                set_px(&el, "height", px);
                if let Some(el) = el.dyn_ref::<HtmlElement>() {
                    let style = el.style();
                    let _ = style.set_property("opacity", &format!("{:.2}", entity.life_ratio().max(0.4)));
                    let _ = style.set_property(
                        "transform",
                        &format!("rotate({:.2}rad)", entity.age * entity.rotation_speed),
                    );
                }
            }
        }

        fn expire_transients(&mut self, doc: &Document) {
            let now = self.now_ms;
            self.transients.retain(|(el, until)| {
                if *until <= now {
                    el.remove();
                    false
                } else {
                    true
                }
            });
            if self.objective_until > 0.0 && self.objective_until <= now {
                self.objective_until = 0.0;
                set_hidden(doc, "center-objective", true);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, doc: &Document) {
            let hud = self.session.hud();
            set_text(doc, "score", &hud.score.to_string());
            set_text(doc, "combo", &hud.combo.to_string());
            set_text(doc, "multiplier", &format!("x{:.1}", hud.multiplier));
            set_text(doc, "level", &hud.level.to_string());
            set_text(doc, "target", &hud.target_score.to_string());
            set_text(doc, "timer", &hud.time_left.to_string());
            if let Some(ui) = doc.get_element_by_id("game-ui") {
                let _ = ui.class_list().toggle_with_force("glow", hud.time_low);
            }
        }
    }

    fn set_disabled(doc: &Document, id: &str, disabled: bool) {
        if let Some(btn) = doc
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<web_sys::HtmlButtonElement>().ok())
        {
            btn.set_disabled(disabled);
        }
    }

    /// Push theme colours into CSS custom properties
    fn apply_theme(theme: Theme) {
        let Some(root) = document()
            .and_then(|doc| doc.document_element())
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let palette = theme.palette();
        let style = root.style();
        let _ = style.set_property("--glow-color", &format!("{}80", palette.ui_glow));
        let _ = style.set_property("--ui-glow", palette.ui_glow);
        let _ = style.set_property("--text-shadow", palette.text_shadow);
        let _ = style.set_property("--button-color", palette.button);
        for (i, color) in palette.gradient.iter().enumerate() {
            let _ = style.set_property(&format!("--gradient-{}", i), &format!("#{:06x}", color));
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {}", e).into());
        }

        log::info!("Shape Burst starting...");

        let Some(doc) = document() else {
            log::error!("no document");
            return;
        };

        // Hide loading indicator
        set_hidden(&doc, "loading", true);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        {
            let g = game.borrow();
            apply_theme(g.session.settings.theme);
            if let Some(select) = doc
                .get_element_by_id("theme-select")
                .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
            {
                select.set_value(g.session.settings.theme.as_str());
            }
            if g.session.settings.needs_tutorial() {
                set_hidden(&doc, "tutorial-screen", false);
                set_hidden(&doc, "start-screen", true);
            }
            g.render_leaderboard(&doc);
            g.sync_music_ui();
        }

        setup_input_handlers(&doc, game.clone());
        setup_buttons(&doc, game.clone());
        setup_music_controls(&doc, game.clone());
        setup_auto_pause(&doc, game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Shape Burst running!");
    }

    fn on_click(doc: &Document, id: &str, game: &Rc<RefCell<Game>>, handler: fn(&mut Game)) {
        let Some(el) = doc.get_element_by_id(id) else {
            log::warn!("missing #{}", id);
            return;
        };
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            handler(&mut game.borrow_mut());
        });
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(doc: &Document, game: Rc<RefCell<Game>>) {
        on_click(doc, "start-btn", &game, Game::start);
        on_click(doc, "pause-btn", &game, Game::toggle_pause);
        on_click(doc, "restart-btn", &game, Game::restart);
        on_click(doc, "submit-score", &game, Game::submit_score);
        on_click(doc, "clear-leaderboard", &game, Game::clear_leaderboard);
        on_click(doc, "close-tutorial", &game, Game::close_tutorial);

        // Theme select
        if let Some(select) = doc.get_element_by_id("theme-select") {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let Some(select) = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlSelectElement>().ok())
                else {
                    return;
                };
                if let Some(theme) = Theme::from_str(&select.value()) {
                    game.borrow_mut().set_theme(theme);
                }
            });
            let _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_music_controls(doc: &Document, game: Rc<RefCell<Game>>) {
        on_click(doc, "play-pause", &game, |g| {
            if let Some(music) = &mut g.music {
                music.toggle_play();
            }
            g.sync_music_ui();
        });

        // Track select
        if let Some(select) = doc.get_element_by_id("track-select") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let Some(select) = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlSelectElement>().ok())
                else {
                    return;
                };
                let mut g = game.borrow_mut();
                if let Some(music) = &mut g.music {
                    music.select(&select.value());
                }
                g.sync_music_ui();
            });
            let _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Volume slider
        if let Some(slider) = doc.get_element_by_id("volume-control") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let Some(slider) = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                else {
                    return;
                };
                let volume = slider.value().parse::<f32>().unwrap_or(0.5);
                let mut g = game.borrow_mut();
                g.session.settings.set_music_volume(volume);
                if let Some(music) = &mut g.music {
                    music.set_volume(volume);
                }
            });
            let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Music on/off
        if let Some(toggle) = doc.get_element_by_id("music-toggle") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let Some(toggle) = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                else {
                    return;
                };
                let enabled = toggle.checked();
                let mut g = game.borrow_mut();
                g.session.settings.music_enabled = enabled;
                if let Some(music) = &mut g.music {
                    music.set_enabled(enabled);
                    if enabled && !music.playlist.is_playing() {
                        music.toggle_play();
                    }
                }
                let g = &mut *g;
                if let Err(e) = g.session.save_settings(g.storage.as_mut()) {
                    log::warn!("Failed to save settings: {}", e);
                }
                g.sync_music_ui();
            });
            let _ = toggle.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Auto-advance when a track ends
        let element = game.borrow().music.as_ref().map(|m| m.element().clone());
        if let Some(element) = element {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if let Some(music) = &mut g.music {
                    music.next();
                }
                g.sync_music_ui();
            });
            let _ = element.add_event_listener_with_callback("ended", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_input_handlers(doc: &Document, game: Rc<RefCell<Game>>) {
        let Some(scene) = doc.get_element_by_id("scene") else {
            log::warn!("missing #scene");
            return;
        };

        // Mouse click
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .pointer(event.client_x() as f32, event.client_y() as f32);
            });
            let _ = scene.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut()
                        .pointer(touch.client_x() as f32, touch.client_y() as f32);
                }
            });
            let _ = scene.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        if let Some(window) = web_sys::window() {
            let game_keys = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game_keys.borrow_mut();
                match event.key().as_str() {
                    "Escape" | "p" | "P" => g.input.pause = true,
                    "+" | "=" => g.input.skip_level = true, // Debug: skip to next level
                    "i" | "I" => {
                        g.autoplay = match g.autoplay.take() {
                            Some(_) => None,
                            None => Some(Autoplay::default()),
                        };
                        log::info!("Idle mode: {}", g.autoplay.is_some());
                    }
                    _ => {}
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();

            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().resize();
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().update(time);
        request_animation_frame(game);
    }

    fn setup_auto_pause(doc: &Document, game: Rc<RefCell<Game>>) {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = doc.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.session.phase() == GamePhase::Running {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = doc.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur (click outside)
        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.session.phase() == GamePhase::Running {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use shape_burst::consts::SIM_DT;
    use shape_burst::persistence::FileStorage;
    use shape_burst::sim::{Autoplay, GameEvent, GamePhase, SphereIntersector};
    use shape_burst::{Session, Tuning};

    env_logger::init();
    log::info!("Shape Burst (native) starting...");
    log::info!("Native mode runs the autoplay demo - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

    let mut storage = FileStorage::beside_executable();
    let mut session = Session::load(seed, Tuning::default(), &storage);
    let mut bot = Autoplay::default();
    let picker = SphereIntersector::from_tuning(&session.state.tuning);

    session.start();
    let mut bursts = 0u32;
    let mut constellations = 0u32;
    // Hard stop at one simulated hour
    for _ in 0..(60 * 60 * 60) {
        if let Some(ray) = bot.next_ray(&session.state, SIM_DT) {
            session.on_pointer_action(&ray, &picker);
        }
        session.on_tick(SIM_DT);
        for event in session.drain_events() {
            match event {
                GameEvent::BurstSound { .. } => bursts += 1,
                GameEvent::Popup {
                    popup: shape_burst::sim::Popup::Constellation(_),
                    ..
                } => constellations += 1,
                GameEvent::LevelUp { level, target_score } => {
                    println!("Level {} (target {})", level, target_score);
                }
                GameEvent::Objective(message) => println!("  {}", message),
                _ => {}
            }
        }
        if session.phase() == GamePhase::GameOver {
            break;
        }
    }

    // Out of simulated time with the bot still clearing levels
    session.end();

    let final_score = session.final_score().unwrap_or(0);
    println!(
        "\nGame over: score {} at level {} ({} bursts, {} constellations, seed {})",
        final_score, session.state.round.level, bursts, constellations, seed
    );

    match session.submit_score("Autoplay", &mut storage) {
        Ok(Some(rank)) => println!("Leaderboard rank #{}", rank),
        Ok(None) => println!("Score did not make the leaderboard"),
        Err(e) => log::warn!("Failed to save leaderboard: {}", e),
    }

    println!("\nLeaderboard:");
    for (i, line) in session.leaderboard.lines().iter().enumerate() {
        println!("{}. {}", i + 1, line);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
