use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use gtk::Orientation;

pub struct HeaderComponents {
    pub header_bar: adw::HeaderBar,
    pub region_btn: gtk::Button,
    pub full_screen_btn: gtk::Button,
    pub recorder_btn: gtk::Button,
    pub save_btn: gtk::Button,
}

pub fn create_header_bar() -> HeaderComponents {
    let region_btn = gtk::Button::builder()
        .label("Capture Region")
        .tooltip_text("Capture a window-sized region of the screen")
        .build();
    let full_screen_btn = gtk::Button::builder()
        .label("Capture Screen")
        .tooltip_text("Capture the entire primary screen")
        .build();
    let recorder_btn = gtk::Button::builder()
        .label("External Tool")
        .tooltip_text("Capture with the system screenshot utility")
        .build();

    let capture_box = gtk::Box::builder()
        .orientation(Orientation::Horizontal)
        .build();
    capture_box.add_css_class("linked");
    capture_box.append(&region_btn);
    capture_box.append(&full_screen_btn);
    capture_box.append(&recorder_btn);

    let save_btn = gtk::Button::builder()
        .label("Save")
        .sensitive(false)
        .build();
    save_btn.add_css_class("suggested-action");

    let header_bar = adw::HeaderBar::new();
    header_bar.pack_start(&capture_box);
    header_bar.pack_end(&save_btn);

    HeaderComponents {
        header_bar,
        region_btn,
        full_screen_btn,
        recorder_btn,
        save_btn,
    }
}
