mod app;
use study_app::*;

use app::StudyApp;
use database::store::{QuestionFilter, QuestionStore};
use models::QuestionKind;

fn main() -> eframe::Result<()> {
    let mut store = QuestionStore::open_default().expect("Failed to open question database");

    let existing = store
        .list(&QuestionFilter::default())
        .unwrap_or_default()
        .len();

    if existing == 0 {
        let samples = [
            (
                "Network Security",
                "What port does HTTPS use?",
                "443",
                QuestionKind::Flashcard,
            ),
            (
                "Network Security",
                "Which protocol replaced SSL?",
                "TLS",
                QuestionKind::Flashcard,
            ),
            (
                "Cryptography",
                "Is AES symmetric or asymmetric?",
                "Symmetric",
                QuestionKind::MultipleChoice,
            ),
            (
                "Threats",
                "Describe how you would mitigate a brute-force login attack.",
                "Account lockout; rate limiting; MFA",
                QuestionKind::PerformanceBased,
            ),
        ];
        for (domain, prompt, answer, kind) in samples {
            let _ = store.create(domain, prompt, answer, kind);
        }

        println!("Sample questions created!");
    }

    let count = store
        .list(&QuestionFilter::default())
        .map(|q| q.len())
        .unwrap_or(0);
    println!("Loaded {} questions from database", count);
    for domain in store.domains().unwrap_or_default() {
        println!("  - {}", domain);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([500.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Exam Study App",
        options,
        Box::new(|_cc| Ok(Box::new(StudyApp::new(store)))),
    )
}
