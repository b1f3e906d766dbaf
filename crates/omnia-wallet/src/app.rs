//! Main application state and update loop

use eframe::egui;
use omnia_wallet_adapters::WalletAdapterConfig;
use omnia_wallet_core::{ProviderKind, WalletSnapshot};

use crate::state::{prune_toasts, ConnectionStatus, ShellToast, SignerCheck};
use crate::ui;
use crate::wallet_bridge::WalletBridge;

/// The main application state
pub struct App {
    bridge: WalletBridge,
    /// Latest state published by the session manager
    snapshot: WalletSnapshot,
    toasts: Vec<ShellToast>,
    signer_check: Option<SignerCheck>,
    check_loading: bool,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = WalletAdapterConfig::from_env();
        let bridge = WalletBridge::new(&config);
        bridge.start(&cc.egui_ctx);

        Self {
            snapshot: bridge.snapshot(),
            bridge,
            toasts: Vec::new(),
            signer_check: None,
            check_loading: false,
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        self.snapshot = self.bridge.snapshot();
        self.poll_notices(ctx);
        if let Some(check) = self.bridge.take_signer_check() {
            self.signer_check = Some(check);
            self.check_loading = false;
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading(
                    egui::RichText::new("Omnia Wallet")
                        .size(22.0)
                        .color(egui::Color32::from_rgb(0, 212, 170)),
                );
                ui.add_space(20.0);
                ui.separator();
                ui::status_badge(ui, &ConnectionStatus::from_snapshot(&self.snapshot));
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(10.0);
                self.render_wallet(ui, ctx);
                ui.add_space(20.0);
            });
        });

        self.render_toasts(ctx);
    }
}

impl App {
    fn render_wallet(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui::styled_heading(ui, "Wallet");

        let status = ConnectionStatus::from_snapshot(&self.snapshot);
        match self.snapshot.session.clone() {
            Some(session) if self.snapshot.is_connected() => {
                ui::card(ui, |ui| {
                    ui::labeled_field_with_copy(
                        ui,
                        "Address",
                        &session.short_address(),
                        &session.address,
                    );
                    ui::labeled_field(ui, "Chain", &session.chain_id);
                    ui::labeled_field(ui, "Wallet", session.wallet_type.display_name());
                });
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if ui::secondary_button(ui, "Disconnect").clicked() {
                        self.signer_check = None;
                        self.bridge.disconnect();
                    }
                    if ui
                        .add_enabled(!self.check_loading, egui::Button::new("Get offline signer"))
                        .clicked()
                    {
                        self.check_loading = true;
                        self.bridge.check_signer(ctx);
                    }
                });
                self.render_signer_check(ui);
            }
            _ => {
                ui.label("Connect a Cosmos wallet extension to continue.");
                ui.add_space(10.0);
                let installed = self.bridge.installed();
                ui.horizontal(|ui| {
                    for kind in ProviderKind::ALL {
                        let label = format!("Connect {}", kind.display_name());
                        let enabled = !status.is_busy();
                        let response = ui::primary_button_enabled(ui, &label, enabled);
                        let response = if installed.contains(&kind) {
                            response
                        } else {
                            response.on_hover_text(format!("{} extension not detected", kind))
                        };
                        if response.clicked() {
                            self.bridge.connect(kind, ctx);
                        }
                    }
                });
            }
        }
    }

    fn render_signer_check(&self, ui: &mut egui::Ui) {
        if self.check_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Requesting signer...");
            });
            return;
        }
        let Some(check) = &self.signer_check else {
            return;
        };
        ui::section_header(ui, "Offline signer");
        match check {
            SignerCheck::NoSession => ui::error_message(ui, "No active wallet session"),
            SignerCheck::Ready { chain_id, accounts } => ui::success_message(
                ui,
                &format!("Signer ready for {chain_id} ({accounts} account(s))"),
            ),
            SignerCheck::Failed { chain_id, error } => {
                ui::error_message(ui, &format!("Signer for {chain_id} failed: {error}"))
            }
        }
    }

    fn poll_notices(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        for notice in self.bridge.drain_notices() {
            self.toasts.push(ShellToast::new(notice, now));
        }
        prune_toasts(&mut self.toasts, now);
        if !self.toasts.is_empty() || ConnectionStatus::from_snapshot(&self.snapshot).is_busy() {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }

    fn render_toasts(&self, ctx: &egui::Context) {
        if self.toasts.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    ui::notice_card(ui, &toast.notice);
                    ui.add_space(6.0);
                }
            });
    }
}
