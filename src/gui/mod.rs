use crate::executor::{Executor, QueryResult};
use eframe::{App, egui};
use egui::Color32;
use egui_extras::syntax_highlighting::CodeTheme;

pub struct Application {
    exe: Executor,
    query: String,
    results: Vec<QueryResult>,
}

impl App for Application {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let max_rect = ui.max_rect();
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.set_width(max_rect.width() * 0.5);
                    self.draw_code_editor(max_rect.height() - 20., ui);
                    if ui.button("Query!").clicked() {
                        self.results = self.exe.run(&self.query);
                    }
                });
                ui.separator();
                ui.vertical(|ui| {
                    egui::ScrollArea::both().show(ui, |ui| self.draw_results(ui));
                });
            });
        });
    }
}

impl Application {
    pub fn new(exe: Executor) -> Self {
        Self {
            exe,
            query: String::new(),
            results: Vec::new(),
        }
    }

    pub fn launch(self) -> eframe::Result {
        let options = eframe::NativeOptions::default();
        eframe::run_native("dbql", options, Box::new(|_cc| Ok(Box::new(self))))
    }

    fn draw_results(&self, ui: &mut egui::Ui) {
        if self.results.is_empty() {
            ui.label("No results yet.");
            return;
        }
        for (n, result) in self.results.iter().enumerate() {
            match result {
                QueryResult::Rows {
                    columns,
                    rows,
                    warnings,
                } => {
                    for warning in warnings {
                        ui.colored_label(Color32::YELLOW, format!("Warning: {warning}"));
                    }
                    egui::Grid::new(("result_rows", n))
                        .striped(true)
                        .show(ui, |ui| {
                            for column in columns {
                                ui.strong(column.as_str());
                            }
                            ui.end_row();
                            for row in rows {
                                for cell in row {
                                    ui.label(cell.as_str());
                                }
                                ui.end_row();
                            }
                        });
                    ui.label(format!("{} row(s)", rows.len()));
                }
                QueryResult::Success(msg) => {
                    ui.colored_label(Color32::GREEN, msg.as_str());
                }
                QueryResult::Error(msg) => {
                    ui.colored_label(Color32::RED, format!("Error: {msg}"));
                }
            }
            ui.separator();
        }
    }

    fn draw_code_editor(&mut self, height: f32, ui: &mut egui::Ui) {
        let mut layouter = |ui: &egui::Ui, buf: &dyn egui::TextBuffer, wrap_width: f32| {
            let mut layout_job = egui_extras::syntax_highlighting::highlight(
                ui.ctx(),
                ui.style(),
                &CodeTheme::dark(20.0),
                buf.as_str(),
                "SQL",
            );
            layout_job.wrap.max_width = wrap_width;
            ui.fonts_mut(|f| f.layout_job(layout_job))
        };
        egui::ScrollArea::vertical()
            .min_scrolled_height(height)
            .show(ui, |ui| {
                ui.take_available_height();
                let editor = egui::TextEdit::multiline(&mut self.query)
                    .font(egui::TextStyle::Monospace) // for cursor height
                    .code_editor()
                    .desired_rows(999)
                    .lock_focus(true)
                    .desired_width(f32::INFINITY)
                    .hint_text("create users id INT name STRING;")
                    .layouter(&mut layouter);
                ui.add(editor);
            });
    }
}
