//! Main application UI and state management.
//! Handles the question bank interface, quiz sessions, and progress display.
//! All decision logic lives in the engine; this layer only calls into it
//! and renders what comes back.

use crate::database::store::{QuestionFilter, QuestionStore};
use crate::export::csv::import_csv_path;
use crate::export::json::{export_json_to_path, import_json_path};
use crate::export::ImportReport;
use crate::models::{Question, QuestionKind, QuizSession, ReviewState};
use crate::stats::{self, ProgressReport};
use chrono::{DateTime, Local};
use eframe::egui;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Most questions a single quiz session will pull in.
const SESSION_LIMIT: usize = 20;

/// Application screen states
#[derive(Default)]
enum AppScreen {
    #[default]
    Main,
    Quiz,
}

/// Main application state
pub struct StudyApp {
    store: Arc<Mutex<QuestionStore>>,

    current_screen: AppScreen,
    quiz_session: Option<QuizSession>,

    // Cached store views, refreshed after every mutation.
    questions: Vec<(Question, ReviewState)>,
    known_domains: Vec<String>,
    report: ProgressReport,
    current_date_display: String,

    // Add-question form fields
    new_domain: String,
    new_prompt: String,
    new_answer: String,
    new_kind: QuestionKind,

    domain_filter: Option<String>,

    show_confirmation_dialog: bool,
    allowed_to_close: bool,
    show_reset_dialog: bool,
    show_result_dialog: bool,
    result_message: String,
}

/// Formats SystemTime as YYYY-MM-DD string
fn format_system_time(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d").to_string()
}

/// Summarizes an import for the result dialog, listing rejected records.
fn format_import_report(report: &ImportReport) -> String {
    let mut message = format!("Imported {} question(s).", report.added);
    if !report.errors.is_empty() {
        message.push_str(&format!("\n{} record(s) rejected:", report.errors.len()));
        for error in &report.errors {
            message.push_str(&format!("\n  record {}: {}", error.record, error.reason));
        }
    }
    message
}

impl eframe::App for StudyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.current_screen {
            AppScreen::Main => self.render_main_screen(ctx),
            AppScreen::Quiz => self.render_quiz_screen(ctx),
        }

        // Handle window close requests with confirmation dialog
        if ctx.input(|i| i.viewport().close_requested()) {
            if self.allowed_to_close {
                // Allow close
            } else {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                self.show_confirmation_dialog = true;
            }
        }

        if self.show_confirmation_dialog {
            egui::Window::new("Do you want to quit?")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("No").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = false;
                        }

                        if ui.button("Yes").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = true;
                            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                });
        }

        // Resetting is destructive; it only runs after explicit confirmation.
        if self.show_reset_dialog {
            let mut do_reset = false;
            let mut cancel = false;

            egui::Window::new("Reset Database")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Delete every question and all review progress?");
                    ui.label("This cannot be undone.");
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            cancel = true;
                        }
                        if ui.button("Reset").clicked() {
                            do_reset = true;
                        }
                    });
                });

            if do_reset {
                self.handle_reset();
            }
            if cancel {
                self.show_reset_dialog = false;
            }
        }

        if self.show_result_dialog {
            egui::Window::new("Result")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&self.result_message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.show_result_dialog = false;
                    }
                });
        }
    }
}

impl StudyApp {
    /// Creates a new application instance over an already opened store
    pub fn new(store: QuestionStore) -> Self {
        let mut app = Self {
            store: Arc::new(Mutex::new(store)),
            current_screen: AppScreen::Main,
            quiz_session: None,
            questions: Vec::new(),
            known_domains: Vec::new(),
            report: ProgressReport::default(),
            current_date_display: String::new(),
            new_domain: String::new(),
            new_prompt: String::new(),
            new_answer: String::new(),
            new_kind: QuestionKind::Flashcard,
            domain_filter: None,
            show_confirmation_dialog: false,
            allowed_to_close: false,
            show_reset_dialog: false,
            show_result_dialog: false,
            result_message: String::new(),
        };
        app.reload();
        app
    }

    fn list_filter(&self) -> QuestionFilter {
        QuestionFilter {
            domain: self.domain_filter.clone(),
            kind: None,
        }
    }

    /// Refreshes the cached question list, domains, and progress report.
    fn reload(&mut self) {
        let filter = self.list_filter();
        let store = self.store.lock().unwrap();
        self.questions = store.list(&filter).unwrap_or_default();
        self.known_domains = store.domains().unwrap_or_default();
        if let Ok(now) = store.current_time() {
            self.current_date_display = format_system_time(now);
            self.report = stats::progress_report(&store, now).unwrap_or_default();
        }
    }

    fn show_result(&mut self, message: impl Into<String>) {
        self.result_message = message.into();
        self.show_result_dialog = true;
    }

    /// Renders the main screen with the question bank and progress stats
    fn render_main_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("Study date: {}", self.current_date_display));

                if ui.button("Next Day").clicked() {
                    {
                        let store = self.store.lock().unwrap();
                        let _ = store.advance_day();
                    }
                    self.reload();
                }
            });
            ui.separator();

            // Import/Export/Reset row
            ui.horizontal(|ui| {
                if ui.button("Import CSV").clicked() {
                    self.handle_import(ImportFormat::Csv);
                }
                if ui.button("Import JSON").clicked() {
                    self.handle_import(ImportFormat::Json);
                }
                if ui.button("Export JSON").clicked() {
                    self.handle_export();
                }
                if ui.button("Reset Database").clicked() {
                    self.show_reset_dialog = true;
                }
            });

            ui.separator();

            // Question creation section
            ui.heading("Add Question");
            ui.horizontal(|ui| {
                ui.label("Domain:");
                ui.text_edit_singleline(&mut self.new_domain);
            });
            ui.horizontal(|ui| {
                ui.label("Question:");
                ui.text_edit_singleline(&mut self.new_prompt);
            });
            ui.horizontal(|ui| {
                ui.label("Answer:");
                ui.text_edit_singleline(&mut self.new_answer);
            });
            ui.horizontal(|ui| {
                ui.label("Type:");
                egui::ComboBox::from_id_source("new_kind")
                    .selected_text(self.new_kind.as_str())
                    .show_ui(ui, |ui| {
                        for kind in [
                            QuestionKind::Flashcard,
                            QuestionKind::MultipleChoice,
                            QuestionKind::PerformanceBased,
                        ] {
                            ui.selectable_value(&mut self.new_kind, kind, kind.as_str());
                        }
                    });

                if ui.button("Add").clicked() {
                    self.handle_add_question();
                }
            });

            ui.separator();

            // Domain filter and quiz start
            ui.horizontal(|ui| {
                ui.label("Domain filter:");
                let selected = self
                    .domain_filter
                    .clone()
                    .unwrap_or_else(|| "All domains".to_string());
                let mut changed = false;
                egui::ComboBox::from_id_source("domain_filter")
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        if ui
                            .selectable_label(self.domain_filter.is_none(), "All domains")
                            .clicked()
                        {
                            self.domain_filter = None;
                            changed = true;
                        }
                        for domain in self.known_domains.clone() {
                            let is_selected = self.domain_filter.as_deref() == Some(&domain);
                            if ui.selectable_label(is_selected, &domain).clicked() {
                                self.domain_filter = Some(domain);
                                changed = true;
                            }
                        }
                    });
                if changed {
                    self.reload();
                }

                if ui.button("Start Quiz").clicked() {
                    self.start_quiz();
                }
            });

            ui.separator();

            ui.heading(format!(
                "Questions ({}, {} due)",
                self.report.total_questions, self.report.due_questions
            ));

            // Deferred delete to avoid mutating while iterating
            let mut action_delete: Option<i64> = None;

            egui::ScrollArea::vertical()
                .id_source("question_list")
                .max_height(200.0)
                .show(ui, |ui| {
                    for (i, (question, state)) in self.questions.iter().enumerate() {
                        ui.group(|ui| {
                            ui.label(format!(
                                "{}. [{}] {} ({})",
                                i + 1,
                                question.domain,
                                question.prompt,
                                question.kind
                            ));
                            ui.horizontal(|ui| {
                                ui.label(format!(
                                    "level {} · streak {} · due {}",
                                    state.interval,
                                    state.streak,
                                    format_system_time(state.next_due)
                                ));
                                if ui.button("Delete").clicked() {
                                    action_delete = Some(question.id);
                                }
                            });
                        });
                    }
                });

            if let Some(id) = action_delete {
                self.handle_delete(id);
            }

            ui.separator();

            // Progress section, read-only
            ui.heading("Progress");
            if self.report.per_domain.is_empty() {
                ui.label("No questions yet.");
            } else {
                for domain in &self.report.per_domain {
                    let accuracy = match domain.accuracy {
                        Some(a) => format!("{:.0}%", a * 100.0),
                        None => "no data".to_string(),
                    };
                    ui.label(format!(
                        "{}: {} questions, {}/{} correct ({})",
                        domain.domain, domain.questions, domain.correct, domain.attempts, accuracy
                    ));
                }
            }
        });
    }

    /// Renders the quiz screen with the reveal-and-grade flow
    fn render_quiz_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = &mut self.quiz_session else {
                self.current_screen = AppScreen::Main;
                return;
            };

            ui.heading("Quiz");
            ui.label(session.progress_message());
            ui.add_space(20.0);

            let mut action_back = false;

            if session.is_completed() {
                ui.heading("Session complete!");
                ui.label(format!(
                    "{} of {} answered correctly.",
                    session.correct_count,
                    session.total_count()
                ));

                ui.add_space(20.0);

                if ui.button("Back to Main Screen").clicked() {
                    action_back = true;
                }
            } else if let Some(question) = session.current_question() {
                let show_answer = session.show_answer;
                let domain = question.domain.clone();
                let kind = question.kind;
                let prompt = question.prompt.clone();
                let answer = question.answer.clone();

                ui.group(|ui| {
                    ui.set_min_height(200.0);
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);

                        ui.label(format!("{domain} · {kind}"));
                        ui.add_space(10.0);
                        ui.heading(&prompt);

                        ui.add_space(20.0);

                        if show_answer {
                            ui.heading("Answer:");
                            ui.label(&answer);
                        } else {
                            ui.label("(Click 'Show Answer' to reveal)");
                        }

                        ui.add_space(20.0);
                    });
                });

                ui.add_space(20.0);

                // Store actions to execute after UI rendering
                let mut action_reveal = false;
                let mut action_grade: Option<bool> = None;

                if !show_answer {
                    if ui.button("Show Answer").clicked() {
                        action_reveal = true;
                    }
                } else {
                    ui.label("Did you get it right?");
                    ui.horizontal(|ui| {
                        if ui.button("Correct").clicked() {
                            action_grade = Some(true);
                        }
                        if ui.button("Incorrect").clicked() {
                            action_grade = Some(false);
                        }
                    });
                }

                ui.add_space(20.0);

                if ui.button("Back to Main Screen").clicked() {
                    action_back = true;
                }

                // Execute deferred actions
                if action_reveal {
                    session.reveal_answer();
                }
                if let Some(correct) = action_grade {
                    if let Err(e) = session.answer(correct) {
                        self.result_message = format!("Failed to record answer: {e}");
                        self.show_result_dialog = true;
                    }
                }
            }

            if action_back {
                self.current_screen = AppScreen::Main;
                self.quiz_session = None;
                self.reload();
            }
        });
    }

    fn handle_add_question(&mut self) {
        let result = {
            let mut store = self.store.lock().unwrap();
            store.create(
                &self.new_domain,
                &self.new_prompt,
                &self.new_answer,
                self.new_kind,
            )
        };

        match result {
            Ok(_) => {
                self.new_domain.clear();
                self.new_prompt.clear();
                self.new_answer.clear();
                self.reload();
            }
            Err(e) => self.show_result(format!("Could not add question: {e}")),
        }
    }

    fn handle_delete(&mut self, id: i64) {
        let result = self.store.lock().unwrap().delete(id);
        if let Err(e) = result {
            self.show_result(format!("Delete failed: {e}"));
        }
        self.reload();
    }

    fn handle_reset(&mut self) {
        let result = self.store.lock().unwrap().reset_all();
        self.show_reset_dialog = false;
        match result {
            Ok(()) => self.show_result("Database reset."),
            Err(e) => self.show_result(format!("Reset failed: {e}")),
        }
        self.reload();
    }

    /// Starts a quiz over the questions currently due in the filtered domain
    fn start_quiz(&mut self) {
        let filter = self.list_filter();
        match QuizSession::start(Arc::clone(&self.store), &filter, SESSION_LIMIT) {
            Ok(session) if session.total_count() == 0 => {
                self.show_result("Nothing due to review right now.");
            }
            Ok(session) => {
                self.quiz_session = Some(session);
                self.current_screen = AppScreen::Quiz;
            }
            Err(e) => self.show_result(format!("Could not start quiz: {e}")),
        }
    }

    /// Handles question import from a CSV or JSON file
    fn handle_import(&mut self, format: ImportFormat) {
        let (label, extensions): (_, &[&str]) = match format {
            ImportFormat::Csv => ("CSV files", &["csv"]),
            ImportFormat::Json => ("JSON files", &["json"]),
        };

        // Open file selection dialog
        if let Some(path) = rfd::FileDialog::new()
            .add_filter(label, extensions)
            .pick_file()
        {
            let result = {
                let mut store = self.store.lock().unwrap();
                match format {
                    ImportFormat::Csv => import_csv_path(&mut store, &path),
                    ImportFormat::Json => import_json_path(&mut store, &path),
                }
            };

            match result {
                Ok(report) => self.show_result(format_import_report(&report)),
                Err(e) => self.show_result(format!("Import failed: {e}")),
            }
            self.reload();
        }
    }

    /// Handles export of the question bank to a JSON file
    fn handle_export(&mut self) {
        // Open file save dialog
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name("questions.json")
            .add_filter("JSON files", &["json"])
            .save_file()
        {
            let result = {
                let store = self.store.lock().unwrap();
                export_json_to_path(&store, &path)
            };

            match result {
                Ok(()) => self.show_result(format!(
                    "Exported {} question(s).",
                    self.report.total_questions
                )),
                Err(e) => self.show_result(format!("Export failed: {e}")),
            }
        }
    }
}

enum ImportFormat {
    Csv,
    Json,
}
