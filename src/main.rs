use anyhow::{Context, anyhow};
use eframe::egui::{self, Button, Color32, ComboBox, RichText, ScrollArea, Stroke, TextEdit};
use eframe::Frame;
use glossary_ai::llm::Backend;
use glossary_ai::{ApiKey, AppConfig, TranslationClient, TranslationError, TranslationForm};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use tokio::runtime::Runtime;

const SUBTITLE: &str = "O'zbekcha so'zlarning ma'nosini dunyo tillarida kashf eting";

fn main() -> anyhow::Result<()> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let cfg = AppConfig::load().context("Failed to load configuration")?;
    let api_key = if cfg.needs_api_key() {
        Some(ApiKey::from_env()?)
    } else {
        None
    };
    let client = TranslationClient::new(cfg.build_backend(api_key.as_ref())?);
    let form = TranslationForm::new(cfg.languages(), &cfg.default_language);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    let (tx, rx) = std::sync::mpsc::channel();
    eframe::run_native(
        "Glossary AI",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(GlossaryGui {
                form,
                client: Arc::new(client),
                runtime,
                tx,
                rx,
            }))
        }),
    )
    .map_err(|e| anyhow!("eframe/egui run failed: {e}"))
}

enum TranslationEvent {
    Settled {
        seq: u64,
        outcome: Result<String, TranslationError>,
    },
    Abandoned {
        seq: u64,
    },
}

struct GlossaryGui {
    form: TranslationForm,
    client: Arc<TranslationClient<Backend>>,
    runtime: Runtime,
    tx: Sender<TranslationEvent>,
    rx: Receiver<TranslationEvent>,
}

impl GlossaryGui {
    fn start_translation(&mut self, ctx: &egui::Context) {
        let Some(pending) = self.form.begin() else {
            return;
        };

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let seq = pending.seq;
            let task = tokio::spawn(async move {
                client
                    .translate(&pending.word, &pending.target_language)
                    .await
            });
            let event = match task.await {
                Ok(outcome) => TranslationEvent::Settled { seq, outcome },
                Err(err) => {
                    log::error!("Translation #{seq} crashed: {err}");
                    TranslationEvent::Abandoned { seq }
                }
            };
            if tx.send(event).is_err() {
                log::warn!("Window closed, dropping translation #{seq}");
            }
            ctx.request_repaint();
        });
    }
}

impl eframe::App for GlossaryGui {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                TranslationEvent::Settled { seq, outcome } => {
                    self.form.settle(seq, outcome);
                }
                TranslationEvent::Abandoned { seq } => {
                    self.form.abandon(seq);
                }
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Glossary AI");
                ui.label(RichText::new(SUBTITLE).weak());
            });
            ui.add_space(16.0);

            ui.horizontal(|ui| {
                let label = ui.label("So'zni kiriting (O'zbekcha)");
                let mut word = self.form.state().word.clone();
                let text_edit = TextEdit::singleline(&mut word)
                    .hint_text("Masalan: salom")
                    .desired_width(f32::INFINITY);
                if ui.add(text_edit).labelled_by(label.id).changed() {
                    self.form.set_word(word);
                }
            });

            ui.horizontal(|ui| {
                ui.label("Tilni tanlang");
                let mut selected = self.form.state().target_language.clone();
                ComboBox::from_id_salt("language-select")
                    .selected_text(selected.as_str())
                    .show_ui(ui, |ui| {
                        for lang in self.form.languages() {
                            ui.selectable_value(&mut selected, lang.name.clone(), lang.name.as_str());
                        }
                    });
                if selected != self.form.state().target_language {
                    self.form.select_language(&selected);
                }
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let loading = self.form.state().is_loading;
                let btn = ui
                    .add_enabled(
                        self.form.can_trigger(),
                        Button::new(if loading {
                            "Tarjima qilinmoqda..."
                        } else {
                            "Tarjima qilish"
                        }),
                    )
                    .on_hover_text("Translate the word");
                if loading {
                    ui.spinner();
                }
                if btn.clicked() {
                    self.start_translation(ctx);
                }
            });

            let state = self.form.state();

            if let Some(error) = state.error_message.as_deref() {
                ui.add_space(12.0);
                egui::Frame::group(ui.style())
                    .stroke(Stroke::new(1.0, Color32::RED))
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.colored_label(Color32::RED, error);
                    });
            }

            if (state.is_loading || !state.result_text.is_empty()) && state.error_message.is_none()
            {
                ui.add_space(12.0);
                ui.label(RichText::new("Natija:").strong());
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.set_min_height(150.0);
                    if state.is_loading {
                        ui.label(RichText::new("Javob kutilmoqda...").weak());
                    } else {
                        ScrollArea::vertical().show(ui, |ui| {
                            ui.label(state.result_text.as_str());
                        });
                    }
                });
            }
        });
    }
}
