// Copyright 2026 the Moorage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The platform integration facade.
//!
//! [`Integration`] is the single entry point a toolkit calls into. It owns
//! the one protocol cache, screen registry, scene handle and event
//! dispatcher of the process and hands them to the component functions.
//!
//! # Startup sequence
//!
//! ```rust,ignore
//! let mut integration = Integration::new(client, scene, PlatformConfig::from_env()?);
//! for cap in Capability::ALL {
//!     toolkit.set_capability(cap, integration.has_capability(cap));
//! }
//! integration.initialize(&mut toolkit, Some(&input_plugins));
//!
//! // Once the session knows its screens:
//! integration.screens_created(&session, &mut toolkit);
//! // On every later geometry change:
//! integration.screens_changed(&session, &mut toolkit);
//! ```

use core::cell::{Cell, OnceCell, RefCell};
use core::fmt;

use tracing::{debug, info};

use crate::backend::CompositorClient;
use crate::backing_store::{self, BackingStore};
use crate::cache::ProtocolCache;
use crate::capability::{self, Capability};
use crate::config::PlatformConfig;
use crate::error::PlatformError;
use crate::gpu::{self, ContextRequest, GraphicsContext, ScenePlatform};
use crate::input::{
    FocusObject, InputContext, InputContextFactory, InputMethodWiring, VirtualKeyboard,
    WindowActivation,
};
use crate::native::NativeInterface;
use crate::screen::{Screen, ScreenRegistry, ScreenSink, ScreenSource};
use crate::theme::{self, DesktopBackend, FontDatabase, GenericUnixDesktop, Theme};
use crate::window::{
    self, OffscreenRequest, OffscreenSurface, PlatformWindow, WindowId, WindowRequest,
};

/// Platform integration for one toolkit instance.
///
/// Confined to the event-processing thread.
pub struct Integration<B: CompositorClient, P> {
    protocols: ProtocolCache<B>,
    scene: P,
    config: PlatformConfig,
    desktop: Box<dyn DesktopBackend>,
    screens: Option<ScreenRegistry>,
    initialized: bool,
    tracking_screens: bool,
    input: InputMethodWiring,
    dispatcher: OnceCell<RefCell<B::Dispatcher>>,
    next_window: Cell<u64>,
}

impl<B: CompositorClient, P> fmt::Debug for Integration<B, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Integration")
            .field("config", &self.config)
            .field("desktop", &self.desktop)
            .field("screens", &self.screens)
            .field("initialized", &self.initialized)
            .field("tracking_screens", &self.tracking_screens)
            .field("input", &self.input)
            .field("next_window", &self.next_window.get())
            .finish_non_exhaustive()
    }
}

impl<B: CompositorClient, P: ScenePlatform> Integration<B, P> {
    /// Creates an integration over `client` and `scene`.
    ///
    /// Nothing is looked up or announced until the toolkit asks for it.
    #[must_use]
    pub fn new(client: B, scene: P, config: PlatformConfig) -> Self {
        Self {
            protocols: ProtocolCache::new(client),
            scene,
            config,
            desktop: Box::new(GenericUnixDesktop::default()),
            screens: None,
            initialized: false,
            tracking_screens: false,
            input: InputMethodWiring::default(),
            dispatcher: OnceCell::new(),
            next_window: Cell::new(1),
        }
    }

    /// Replaces the desktop backend used for fonts and themes.
    #[must_use]
    pub fn with_desktop(mut self, desktop: Box<dyn DesktopBackend>) -> Self {
        self.desktop = desktop;
        self
    }

    /// Returns whether the integration supports `cap`.
    #[must_use]
    pub fn has_capability(&self, cap: Capability) -> bool {
        capability::has_capability(cap)
    }

    /// Announces the dummy screen and installs the virtual input method.
    ///
    /// Call once, before any window is created. If the session already
    /// reported its screens, they are kept and no dummy is announced.
    pub fn initialize(
        &mut self,
        toolkit: &mut dyn ScreenSink,
        input_contexts: Option<&dyn InputContextFactory>,
    ) {
        if self.initialized {
            debug!("integration already initialized");
            return;
        }
        self.initialized = true;
        if self.screens.is_none() {
            self.screens = Some(ScreenRegistry::with_dummy(toolkit));
        }
        if let Some(factory) = input_contexts {
            self.input = InputMethodWiring::install(factory, &mut self.config);
        }
        info!(
            input_context = self.input.context().is_some(),
            "platform integration initialized"
        );
    }

    /// Called once the session has created its screens.
    ///
    /// Starts following geometry changes and runs the first enumeration.
    pub fn screens_created(&mut self, source: &dyn ScreenSource, toolkit: &mut dyn ScreenSink) {
        self.tracking_screens = true;
        self.screens_changed(source, toolkit);
    }

    /// Rebuilds the screen set after a session geometry change.
    ///
    /// Ignored until [`Self::screens_created`] has run.
    pub fn screens_changed(&mut self, source: &dyn ScreenSource, toolkit: &mut dyn ScreenSink) {
        if !self.tracking_screens {
            debug!("screen change before screens were created, ignoring");
            return;
        }
        match &mut self.screens {
            Some(registry) => registry.rebuild(source, toolkit),
            None => {
                let mut registry = ScreenRegistry::with_dummy(toolkit);
                registry.rebuild(source, toolkit);
                self.screens = Some(registry);
            }
        }
    }

    /// The tracked screens. Empty only before [`Self::initialize`].
    #[must_use]
    pub fn screens(&self) -> &[Screen] {
        match &self.screens {
            Some(registry) => registry.screens(),
            None => &[],
        }
    }

    /// Creates the platform window for a toolkit window. Never fails.
    pub fn create_window(&self, request: &WindowRequest) -> PlatformWindow<B> {
        let id = WindowId(self.next_window.get());
        self.next_window.set(id.0 + 1);
        window::create_window_surface(&self.protocols, id, request)
    }

    /// Creates a backing store, or `None` without shared-memory pools.
    pub fn create_backing_store(&self, window: &PlatformWindow<B>) -> Option<BackingStore<B>> {
        backing_store::create_backing_store(&self.protocols, window)
    }

    /// Uploads `store` at the window's current pixel size and presents it.
    pub fn flush_backing_store(
        &self,
        window: &PlatformWindow<B>,
        store: &mut BackingStore<B>,
    ) -> Result<(), PlatformError> {
        let size = window.pixel_size();
        let client = self.protocols.client();
        let buffer = store.flush(client, size)?;
        window.present(client, buffer.buffer(), size);
        Ok(())
    }

    /// Creates an offscreen surface. Always succeeds.
    #[must_use]
    pub fn create_offscreen_surface(&self, request: &OffscreenRequest) -> OffscreenSurface {
        window::create_offscreen_surface(request)
    }

    /// Creates a GPU context, or `None` if the scene cannot share.
    pub fn create_graphics_context(&self, request: &ContextRequest) -> Option<GraphicsContext> {
        gpu::create_context(&self.scene, request)
    }

    /// The desktop font database.
    #[must_use]
    pub fn font_database(&self) -> &FontDatabase {
        self.desktop.font_database()
    }

    /// Creates the theme called `name`.
    #[must_use]
    pub fn theme(&self, name: &str) -> Option<Theme> {
        self.desktop.create_theme(name)
    }

    /// Theme names the toolkit should try.
    #[must_use]
    pub fn theme_names(&self) -> Vec<String> {
        theme::theme_names(&self.config)
    }

    /// The process event dispatcher, created on first use.
    pub fn event_dispatcher(&self) -> &RefCell<B::Dispatcher> {
        self.dispatcher
            .get_or_init(|| RefCell::new(self.protocols.client().create_event_dispatcher()))
    }

    /// Native handles for interop.
    #[must_use]
    pub fn native_interface(&self) -> NativeInterface<'_, B, P> {
        NativeInterface::new(self)
    }

    /// The installed input context, if any.
    #[must_use]
    pub fn input_context(&self) -> Option<&dyn InputContext> {
        self.input.context()
    }

    /// Forwards a toolkit focus change to the input-method wiring.
    pub fn focus_object_changed(
        &mut self,
        focus: Option<FocusObject>,
        keyboard: Option<&dyn VirtualKeyboard>,
    ) {
        self.input.focus_object_changed(focus, keyboard);
    }

    /// Forwards workspace creation to the input-method wiring.
    pub fn workspace_created(&mut self, keyboard: Option<&dyn VirtualKeyboard>) {
        self.input.workspace_created(keyboard);
    }

    /// Forwards an input-method visibility change.
    pub fn input_method_visibility_changed(
        &self,
        visible: bool,
        keyboard: Option<&dyn VirtualKeyboard>,
        activation: &mut dyn WindowActivation,
    ) {
        self.input.visibility_changed(visible, keyboard, activation);
    }
}

impl<B: CompositorClient, P> Integration<B, P> {
    /// The effective configuration.
    #[must_use]
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// The protocol cache.
    #[must_use]
    pub fn protocols(&self) -> &ProtocolCache<B> {
        &self.protocols
    }

    /// The compositor's rendering scene.
    #[must_use]
    pub fn scene(&self) -> &P {
        &self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::Integration;
    use crate::backend::InterfaceKind;
    use crate::cache::Resolution;
    use crate::capability::Capability;
    use crate::config::PlatformConfig;
    use crate::gpu::{ContextRequest, ContextSharing};
    use crate::input::{FocusObject, InputContext, InputContextFactory, VirtualKeyboard};
    use crate::screen::{Screen, ScreenId, ScreenSink, StaticScreens};
    use crate::test_support::{MockClient, MockScene};
    use crate::window::{OffscreenRequest, WindowId, WindowRequest};
    use kurbo::Rect;

    #[derive(Debug, Default)]
    struct Toolkit {
        added: Vec<ScreenId>,
        removed: Vec<ScreenId>,
    }

    impl ScreenSink for Toolkit {
        fn screen_added(&mut self, screen: &Screen) {
            self.added.push(screen.id());
        }

        fn screen_removed(&mut self, screen: Screen) {
            self.removed.push(screen.id());
        }
    }

    #[derive(Debug, Default)]
    struct Panel {
        focus: Option<FocusObject>,
    }

    impl InputContext for Panel {
        fn set_focus_object(&mut self, object: FocusObject) {
            self.focus = Some(object);
        }

        fn focus_object(&self) -> Option<FocusObject> {
            self.focus
        }
    }

    struct Plugins;

    impl InputContextFactory for Plugins {
        fn create(&self, _key: &str) -> Option<Box<dyn InputContext>> {
            Some(Box::new(Panel::default()))
        }
    }

    struct Keyboard;

    impl VirtualKeyboard for Keyboard {
        fn focus_object(&self) -> FocusObject {
            FocusObject(1)
        }

        fn input_panel(&self) -> Option<WindowId> {
            None
        }
    }

    fn integration(client: MockClient) -> Integration<MockClient, MockScene> {
        Integration::new(client, MockScene::with_surface(), PlatformConfig::default())
    }

    fn two_screens() -> StaticScreens {
        StaticScreens(vec![
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(1920.0, 0.0, 3840.0, 1080.0),
        ])
    }

    #[test]
    fn capabilities_match_table() {
        let integration = integration(MockClient::full());
        assert!(integration.has_capability(Capability::OpenGl));
        assert!(!integration.has_capability(Capability::ThreadedOpenGl));
    }

    #[test]
    fn construction_looks_up_nothing() {
        let integration = integration(MockClient::full());
        for kind in InterfaceKind::ALL {
            assert_eq!(integration.protocols().state(kind), Resolution::Unresolved);
        }
        assert!(integration.screens().is_empty());
    }

    #[test]
    fn screen_changes_wait_for_screens_created() {
        let mut toolkit = Toolkit::default();
        let mut integration = integration(MockClient::full());
        integration.initialize(&mut toolkit, None);
        assert_eq!(toolkit.added, vec![ScreenId::DUMMY]);

        integration.screens_changed(&two_screens(), &mut toolkit);
        assert_eq!(toolkit.added.len(), 1, "not tracking yet");

        integration.screens_created(&two_screens(), &mut toolkit);
        assert_eq!(
            toolkit.added,
            vec![ScreenId::DUMMY, ScreenId(0), ScreenId(1)]
        );
        assert_eq!(toolkit.removed, vec![ScreenId::DUMMY]);

        integration.screens_changed(&StaticScreens::default(), &mut toolkit);
        assert_eq!(integration.screens().len(), 1);
        assert!(integration.screens()[0].is_dummy());
        assert_eq!(
            toolkit.removed,
            vec![ScreenId::DUMMY, ScreenId(1), ScreenId(0)]
        );
    }

    #[test]
    fn windows_get_distinct_ids_and_surfaces() {
        let integration = integration(MockClient::full());
        let first = integration.create_window(&WindowRequest::default());
        let second = integration.create_window(&WindowRequest::default());

        assert_ne!(first.id(), second.id());
        assert!(!first.is_degraded());
        assert_eq!(
            integration.protocols().client().lookups(InterfaceKind::Shell),
            1
        );
    }

    #[test]
    fn degraded_window_when_shell_missing() {
        let integration = integration(MockClient::without(&[InterfaceKind::Shell]));
        let window = integration.create_window(&WindowRequest::default());
        assert!(window.is_degraded());
    }

    #[test]
    fn flush_presents_on_window_surface() {
        let integration = integration(MockClient::full());
        let window = integration.create_window(&WindowRequest {
            geometry: Rect::new(0.0, 0.0, 32.0, 16.0),
            ..WindowRequest::default()
        });
        let Some(mut store) = integration.create_backing_store(&window) else {
            panic!("shm is advertised");
        };

        integration.flush_backing_store(&window, &mut store).unwrap();
        integration.flush_backing_store(&window, &mut store).unwrap();

        let client = integration.protocols().client();
        assert_eq!(client.allocations(), 1);
        assert_eq!(client.presented().len(), 2);
        let surface = window.surface().map(|s| s.id);
        assert!(client.presented().iter().all(|(s, _)| Some(*s) == surface));
    }

    #[test]
    fn resized_window_reallocates_once() {
        let integration = integration(MockClient::full());
        let mut window = integration.create_window(&WindowRequest {
            geometry: Rect::new(0.0, 0.0, 32.0, 16.0),
            ..WindowRequest::default()
        });
        let Some(mut store) = integration.create_backing_store(&window) else {
            panic!("shm is advertised");
        };

        integration.flush_backing_store(&window, &mut store).unwrap();
        window.set_geometry(Rect::new(0.0, 0.0, 64.0, 16.0));
        integration.flush_backing_store(&window, &mut store).unwrap();
        integration.flush_backing_store(&window, &mut store).unwrap();

        assert_eq!(store.allocation_count(), 2);
    }

    #[test]
    fn graphics_context_uses_scene_surface() {
        let integration = integration(MockClient::full());
        let context = integration.create_graphics_context(&ContextRequest::default());
        assert!(matches!(
            context.map(|c| c.sharing()),
            Some(ContextSharing::SceneSurface { .. })
        ));
        assert_eq!(
            integration.native_interface().egl_display(),
            MockScene::with_surface().display
        );
    }

    #[test]
    fn offscreen_surfaces_need_no_protocol() {
        let integration = integration(MockClient::full());
        let surface = integration.create_offscreen_surface(&OffscreenRequest::default());
        assert!(surface.is_valid());
        for kind in InterfaceKind::ALL {
            assert_eq!(integration.protocols().client().lookups(kind), 0);
        }
    }

    #[test]
    fn event_dispatcher_is_created_once() {
        let integration = integration(MockClient::full());
        let first: *const _ = integration.event_dispatcher();
        let second: *const _ = integration.event_dispatcher();

        assert_eq!(first, second);
        assert_eq!(integration.protocols().client().dispatchers(), 1);
        integration.event_dispatcher().borrow_mut().dispatched += 1;
    }

    #[test]
    fn initialize_installs_input_method_and_clears_environment() {
        let mut toolkit = Toolkit::default();
        let mut integration = Integration::new(
            MockClient::full(),
            MockScene::default(),
            PlatformConfig {
                input_method_module: Some("ibus".to_owned()),
                ..PlatformConfig::default()
            },
        );

        integration.initialize(&mut toolkit, Some(&Plugins));
        assert!(integration.input_context().is_some());
        assert_eq!(integration.config().input_method_module, None);

        integration.focus_object_changed(Some(FocusObject(9)), Some(&Keyboard));
        assert_eq!(
            integration.input_context().and_then(|c| c.focus_object()),
            Some(FocusObject(1))
        );
    }

    #[test]
    fn initialize_twice_announces_one_dummy() {
        let mut toolkit = Toolkit::default();
        let mut integration = integration(MockClient::full());
        integration.initialize(&mut toolkit, None);
        integration.initialize(&mut toolkit, None);
        assert_eq!(toolkit.added, vec![ScreenId::DUMMY]);
    }

    #[test]
    fn initialize_after_screens_created_still_installs_input_method() {
        let mut toolkit = Toolkit::default();
        let mut integration = Integration::new(
            MockClient::full(),
            MockScene::default(),
            PlatformConfig {
                input_method_module: Some("ibus".to_owned()),
                ..PlatformConfig::default()
            },
        );

        integration.screens_created(&two_screens(), &mut toolkit);
        integration.initialize(&mut toolkit, Some(&Plugins));

        assert!(integration.input_context().is_some());
        assert_eq!(integration.config().input_method_module, None);
        assert_eq!(integration.screens().len(), 2, "reported screens are kept");
        assert_eq!(
            toolkit.added,
            vec![ScreenId::DUMMY, ScreenId(0), ScreenId(1)],
            "no second dummy is announced"
        );
    }

    #[test]
    fn theme_names_follow_session() {
        let integration = integration(MockClient::full());
        assert_eq!(integration.theme_names(), vec!["generic".to_owned()]);
        assert!(integration.theme("generic").is_some());
    }

    #[test]
    fn native_interface_exposes_screens_and_compositor() {
        let mut toolkit = Toolkit::default();
        let mut integration = integration(MockClient::full());
        integration.initialize(&mut toolkit, None);
        integration.screens_created(&two_screens(), &mut toolkit);

        let native = integration.native_interface();
        assert_eq!(
            native.screen(ScreenId(1)).map(Screen::geometry),
            Some(Rect::new(1920.0, 0.0, 3840.0, 1080.0))
        );
        assert!(native.compositor().is_some());
        assert!(native.screen(ScreenId::DUMMY).is_none());
    }
}
