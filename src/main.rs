mod app;
mod audio;
mod auth;
mod config;
mod error;
mod library;
mod logging;
mod playlist;
mod queue;
mod runtime;
mod settings;
mod store;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
