use gtk4 as gtk;

use gtk4::prelude::*;
use log::debug;

use crate::capture::CapturedImage;

pub struct PreviewComponents {
    pub frame: gtk::Frame,
    pub picture: gtk::Picture,
    pub placeholder: gtk::Label,
}

pub fn create_preview_area() -> PreviewComponents {
    let picture = gtk::Picture::builder()
        .hexpand(true)
        .vexpand(true)
        .content_fit(gtk::ContentFit::Contain)
        .build();

    let placeholder = gtk::Label::builder()
        .label("No capture yet")
        .halign(gtk::Align::Center)
        .valign(gtk::Align::Center)
        .build();
    placeholder.add_css_class("dim-label");

    let overlay = gtk::Overlay::builder().child(&picture).build();
    overlay.add_overlay(&placeholder);

    let frame = gtk::Frame::builder()
        .label("Latest Capture")
        .child(&overlay)
        .vexpand(true)
        .margin_start(12)
        .margin_end(12)
        .margin_bottom(12)
        .build();

    PreviewComponents {
        frame,
        picture,
        placeholder,
    }
}

/// Show `image` in the preview, replacing whatever was there.
pub fn show_captured(picture: &gtk::Picture, placeholder: &gtk::Label, image: &CapturedImage) {
    if image.width() == 0 || image.height() == 0 {
        // a pixbuf cannot represent an empty image
        debug!("Skipping preview of empty {} capture", image.origin);
        return;
    }

    let pixbuf = image_to_pixbuf(&image.image);
    let texture = gtk::gdk::Texture::for_pixbuf(&pixbuf);
    picture.set_paintable(Some(&texture));
    placeholder.set_visible(false);
}

/// Convert a captured RGBA buffer to a GDK pixbuf.
fn image_to_pixbuf(image: &image::RgbaImage) -> gtk::gdk_pixbuf::Pixbuf {
    let width = image.width() as i32;
    let height = image.height() as i32;
    let stride = width * 4; // RGBA = 4 bytes per pixel

    let bytes = gtk::glib::Bytes::from(image.as_raw());

    gtk::gdk_pixbuf::Pixbuf::from_bytes(
        &bytes,
        gtk::gdk_pixbuf::Colorspace::Rgb,
        true, // has_alpha
        8,    // bits_per_sample
        width,
        height,
        stride,
    )
}
