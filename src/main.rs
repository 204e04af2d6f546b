use libadwaita as adw;

use adw::prelude::*;
use log::info;

mod app;
mod capture;
mod persist;
mod probe;
mod ui;

const APP_ID: &str = "org.example.ScreenshotProbe";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting screenshot probe");

    let app = adw::Application::builder().application_id(APP_ID).build();

    app.connect_activate(ui::build_ui);
    app.run();
}
