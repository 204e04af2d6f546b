use gtk::glib;
use gtk4 as gtk;
use libadwaita as adw;
use log::{debug, error, info, warn};

use gtk4::prelude::*;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use crate::app::AppState;
use crate::capture::external::{self, ExternalOutcome};
use crate::capture::screen;
use crate::capture::{CaptureOrigin, CaptureRequest, CapturedImage, Region};
use crate::probe::ime;
use crate::ui::dialogs;
use crate::ui::header::HeaderComponents;
use crate::ui::input_test::InputTestComponents;
use crate::ui::preview::{self, PreviewComponents};

const PROCESS_POLL_INTERVAL: Duration = Duration::from_millis(200);

pub struct UiComponents {
    pub window: adw::ApplicationWindow,
    pub header: HeaderComponents,
    pub preview: PreviewComponents,
    pub input_test: InputTestComponents,
}

/// The widgets a capture in flight needs to touch, cloneable into timer callbacks.
#[derive(Clone)]
struct CaptureUi {
    window: adw::ApplicationWindow,
    region_btn: gtk::Button,
    full_screen_btn: gtk::Button,
    recorder_btn: gtk::Button,
    save_btn: gtk::Button,
    picture: gtk::Picture,
    placeholder: gtk::Label,
}

impl CaptureUi {
    fn from_components(components: &UiComponents) -> Self {
        Self {
            window: components.window.clone(),
            region_btn: components.header.region_btn.clone(),
            full_screen_btn: components.header.full_screen_btn.clone(),
            recorder_btn: components.header.recorder_btn.clone(),
            save_btn: components.header.save_btn.clone(),
            picture: components.preview.picture.clone(),
            placeholder: components.preview.placeholder.clone(),
        }
    }

    fn set_capture_controls_enabled(&self, enabled: bool) {
        self.region_btn.set_sensitive(enabled);
        self.full_screen_btn.set_sensitive(enabled);
        self.recorder_btn.set_sensitive(enabled);
    }
}

pub fn connect_region_capture_handler(state: &Rc<RefCell<AppState>>, components: &UiComponents) {
    components.header.region_btn.connect_clicked({
        let state = state.clone();
        let ui = CaptureUi::from_components(components);
        move |_| {
            let mut s = state.borrow_mut();
            if let Err(busy) = s.session.try_begin(CaptureOrigin::Region) {
                debug!("Ignoring region capture request: {}", busy);
                return;
            }
            drop(s);

            let bounds = match screen::primary_monitor_bounds() {
                Ok(bounds) => bounds,
                Err(e) => {
                    error!("Cannot determine capture region: {}", e);
                    state.borrow_mut().session.finish_without_image();
                    return;
                }
            };

            // The window tracks its own size but not its on-screen position,
            // so the region is a window-sized rectangle centered on the display.
            let width = ui.window.width().max(1) as u32;
            let height = ui.window.height().max(1) as u32;
            let region = Region::centered_in(bounds, width, height);
            schedule_capture(&state, &ui, CaptureRequest::Region(region));
        }
    });
}

pub fn connect_full_screen_capture_handler(
    state: &Rc<RefCell<AppState>>,
    components: &UiComponents,
) {
    components.header.full_screen_btn.connect_clicked({
        let state = state.clone();
        let ui = CaptureUi::from_components(components);
        move |_| {
            let mut s = state.borrow_mut();
            if let Err(busy) = s.session.try_begin(CaptureOrigin::FullScreen) {
                debug!("Ignoring full screen capture request: {}", busy);
                return;
            }
            drop(s);
            schedule_capture(&state, &ui, CaptureRequest::FullScreen);
        }
    });
}

pub fn connect_recorder_capture_handler(state: &Rc<RefCell<AppState>>, components: &UiComponents) {
    components.header.recorder_btn.connect_clicked({
        let state = state.clone();
        let ui = CaptureUi::from_components(components);
        move |_| {
            let mut s = state.borrow_mut();
            if let Err(busy) = s.session.try_begin(CaptureOrigin::ExternalTool) {
                debug!("Ignoring external capture request: {}", busy);
                return;
            }

            if !s.recorder.tool_available() {
                let program = s.recorder.program().to_string();
                warn!("{} not found on PATH", program);
                s.session.finish_without_image();
                drop(s);
                dialogs::alert(
                    &ui.window,
                    "Screenshot tool not found",
                    &format!("{} is not installed or not on PATH.", program),
                );
                return;
            }
            drop(s);

            schedule_capture(
                &state,
                &ui,
                CaptureRequest::ExternalTool {
                    output_path: external::default_output_path(),
                },
            );
        }
    });
}

/// Minimizes the window and runs the capture after the request's settle
/// delay, so the compositor has time to get this window out of the shot.
fn schedule_capture(state: &Rc<RefCell<AppState>>, ui: &CaptureUi, request: CaptureRequest) {
    info!("Starting {} capture", request.origin());
    ui.set_capture_controls_enabled(false);
    ui.save_btn.set_sensitive(false);
    ui.window.minimize();

    let delay = request.settle_delay();
    glib::timeout_add_local_once(delay, {
        let state = state.clone();
        let ui = ui.clone();
        move || match request {
            CaptureRequest::Region(region) => match screen::grab_region(region) {
                Ok(image) => finish_capture(&state, &ui, Some(image)),
                Err(e) => {
                    error!("Region capture failed: {}", e);
                    finish_capture(&state, &ui, None);
                }
            },
            CaptureRequest::FullScreen => match screen::grab_full_screen() {
                Ok(image) => finish_capture(&state, &ui, Some(image)),
                Err(e) => {
                    error!("Full screen capture failed: {}", e);
                    finish_capture(&state, &ui, None);
                }
            },
            CaptureRequest::ExternalTool { output_path } => {
                launch_external(&state, &ui, &output_path);
            }
        }
    });
}

fn launch_external(state: &Rc<RefCell<AppState>>, ui: &CaptureUi, output_path: &Path) {
    let mut s = state.borrow_mut();
    if let Err(e) = s.recorder.launch(output_path) {
        error!("Failed to launch screenshot tool: {}", e);
        drop(s);
        finish_capture(state, ui, None);
        return;
    }
    drop(s);

    glib::timeout_add_local(PROCESS_POLL_INTERVAL, {
        let state = state.clone();
        let ui = ui.clone();
        move || {
            let mut s = state.borrow_mut();
            let outcome = s.recorder.poll();
            let running = s.recorder.is_running();
            drop(s);

            match outcome {
                Some(ExternalOutcome::Captured(image)) => {
                    finish_capture(&state, &ui, Some(image));
                    glib::ControlFlow::Break
                }
                Some(ExternalOutcome::Dismissed) => {
                    finish_capture(&state, &ui, None);
                    glib::ControlFlow::Break
                }
                // The bridge stopped tracking the child, e.g. after a
                // mid-capture shutdown. Release the session anyway.
                None if !running => {
                    debug!("External capture ended without an outcome");
                    finish_capture(&state, &ui, None);
                    glib::ControlFlow::Break
                }
                None => glib::ControlFlow::Continue,
            }
        }
    });
}

fn finish_capture(state: &Rc<RefCell<AppState>>, ui: &CaptureUi, captured: Option<CapturedImage>) {
    let mut s = state.borrow_mut();
    let has_new_image = captured.is_some();
    match captured {
        Some(image) => s.session.finish_with(image),
        None => s.session.finish_without_image(),
    }
    if has_new_image {
        if let Some(captured) = s.session.image() {
            preview::show_captured(&ui.picture, &ui.placeholder, captured);
        }
    }
    let save_enabled = s.session.save_enabled();
    drop(s);

    ui.save_btn.set_sensitive(save_enabled);
    ui.set_capture_controls_enabled(true);
    ui.window.unminimize();
    ui.window.present();
}

pub fn connect_save_handler(state: &Rc<RefCell<AppState>>, components: &UiComponents) {
    components.header.save_btn.connect_clicked({
        let state = state.clone();
        let window = components.window.clone();
        move |_| {
            let s = state.borrow();
            let has_image = s.session.image().is_some();
            drop(s);

            if !has_image {
                dialogs::alert(&window, "Nothing to save", "Take a screenshot before saving.");
                return;
            }
            dialogs::run_save_dialog(&state, &window);
        }
    });
}

pub fn connect_input_test_handlers(components: &UiComponents) {
    components.input_test.entry.connect_changed({
        let status_label = components.input_test.status_label.clone();
        move |_| {
            status_label.set_text(&ime::probe().status_line());
        }
    });

    components.input_test.text_view.buffer().connect_changed({
        let status_label = components.input_test.status_label.clone();
        move |_| {
            status_label.set_text(&ime::probe().status_line());
        }
    });
}

pub fn connect_close_handler(state: &Rc<RefCell<AppState>>, components: &UiComponents) {
    components.window.connect_close_request({
        let state = state.clone();
        move |_| {
            let mut s = state.borrow_mut();
            if s.session.is_capturing() {
                debug!("Window closing mid-capture ({:?})", s.session.phase());
            }
            s.recorder.shutdown();
            debug!("Recorder bridge state at exit: {:?}", s.recorder.state());
            glib::Propagation::Proceed
        }
    });
}

pub fn connect_all_handlers(state: &Rc<RefCell<AppState>>, components: &UiComponents) {
    debug!("Initializing UI handlers");
    connect_region_capture_handler(state, components);
    connect_full_screen_capture_handler(state, components);
    connect_recorder_capture_handler(state, components);
    connect_save_handler(state, components);
    connect_input_test_handlers(components);
    connect_close_handler(state, components);
}
