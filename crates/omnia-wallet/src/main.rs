//! Omnia Wallet: connect a Keplr or Leap wallet and keep the session across restarts

mod app;
mod state;
mod ui;
mod wallet_bridge;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Omnia Wallet");

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("Omnia Wallet")
            .with_inner_size([520.0, 560.0])
            .with_min_inner_size([420.0, 380.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Omnia Wallet",
        native_options,
        Box::new(|cc| Ok(Box::new(app::App::new(cc)))),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {
    use wasm_bindgen::JsCast;

    tracing_wasm::set_as_global_default();
    tracing::info!("Starting Omnia Wallet");

    wasm_bindgen_futures::spawn_local(async {
        let Some(canvas) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("omnia_wallet_canvas"))
            .and_then(|el| el.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            tracing::error!("canvas #omnia_wallet_canvas not found");
            return;
        };

        let result = eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(|cc| Ok(Box::new(app::App::new(cc)))),
            )
            .await;
        if let Err(e) = result {
            tracing::error!(error = ?e, "failed to start eframe");
        }
    });
}
