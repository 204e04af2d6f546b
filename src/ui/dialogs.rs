use gtk::glib;
use gtk4 as gtk;
use libadwaita as adw;
use log::{error, info};

use gtk4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

use crate::app::AppState;
use crate::persist::{self, SaveError};

pub fn alert(window: &adw::ApplicationWindow, message: &str, detail: &str) {
    let dialog = gtk::AlertDialog::builder()
        .modal(true)
        .message(message)
        .detail(detail)
        .build();
    dialog.show(Some(window));
}

pub fn run_save_dialog(state: &Rc<RefCell<AppState>>, window: &adw::ApplicationWindow) {
    let state = state.clone();
    let window = window.clone();
    glib::spawn_future_local(async move {
        let dialog = gtk::FileDialog::builder()
            .title("Save Screenshot")
            .initial_name(persist::timestamped_file_name())
            .build();
        dialog.set_initial_folder(Some(&gtk::gio::File::for_path(
            persist::default_save_dir(),
        )));

        match dialog.save_future(Some(&window)).await {
            Ok(file) => {
                let Some(path) = file.path() else {
                    error!("Save dialog returned a file without a local path");
                    return;
                };
                let s = state.borrow();
                let result = persist::save_captured(s.session.image(), &path);
                drop(s);
                match result {
                    Ok(()) => {
                        alert(
                            &window,
                            "Screenshot saved",
                            &format!("Written to {}", path.display()),
                        );
                    }
                    Err(SaveError::NoImage) => {
                        alert(&window, "Nothing to save", "Take a screenshot first.");
                    }
                    Err(e) => {
                        error!("Failed to save screenshot: {}", e);
                        alert(&window, "Saving failed", &e.to_string());
                    }
                }
            }
            Err(_) => {
                info!("Save dialog dismissed");
            }
        }
    });
}
