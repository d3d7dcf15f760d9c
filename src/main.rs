mod app;
mod capture;
mod commands;
mod config;
mod logging;
mod monitor;
mod ui;

fn main() -> Result<(), anyhow::Error> {
    app::run()
}
