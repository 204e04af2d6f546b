pub mod dialogs;
pub mod handlers;
pub mod header;
pub mod preview;

use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use gtk::Orientation;
use std::cell::RefCell;
use std::rc::Rc;

use crate::app::AppState;
use crate::probe::system;

pub fn build_ui(app: &adw::Application) {
    let state = Rc::new(RefCell::new(AppState::new()));

    let header = header::create_header_bar();
    let input_test = input_test::create_input_test_panel();
    let preview = preview::create_preview_area();

    let system_info = {
        let s = state.borrow();
        let report = system::collect(s.recorder.program(), s.recorder.tool_available());
        gtk::Label::builder()
            .label(report.summary())
            .halign(gtk::Align::Start)
            .wrap(true)
            .margin_start(12)
            .margin_end(12)
            .build()
    };
    system_info.add_css_class("dim-label");

    let content = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(12)
        .build();
    content.append(&header.header_bar);
    content.append(&system_info);
    content.append(&input_test.frame);
    content.append(&preview.frame);

    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Screenshot & Input Method Probe")
        .content(&content)
        .default_width(800)
        .default_height(600)
        .build();

    let components = handlers::UiComponents {
        window: window.clone(),
        header,
        preview,
        input_test,
    };

    handlers::connect_all_handlers(&state, &components);

    window.present();
}
