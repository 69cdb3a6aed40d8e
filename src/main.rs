use std::path::PathBuf;

use anyhow::Context;
use eframe::egui;

use econ_atlas::app::EconAtlasApp;
use econ_atlas::data;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // One optional positional argument: the indicator table to load at
    // startup. A failed startup load aborts rather than opening an
    // empty-but-wrong session.
    let source: Option<PathBuf> = std::env::args_os().nth(1).map(PathBuf::from);
    let dataset = source
        .map(|path| {
            data::loader::load_file(&path)
                .with_context(|| format!("loading {}", path.display()))
        })
        .transpose()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Econ Atlas – Global Economy Indicators",
        options,
        Box::new(move |_cc| {
            let mut app = EconAtlasApp::default();
            if let Some(dataset) = dataset {
                log::info!(
                    "loaded {} records across {} years",
                    dataset.len(),
                    dataset.years.len()
                );
                app.state.set_dataset(dataset);
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("failed to start UI: {e}"))
}
