use std::sync::Arc;

use ratatui::{backend::TestBackend, Terminal};

use clarifind::api::CompanyLite;
use clarifind::indicators::{Category, DetailState, DisplayCategory, NormalizedIndicator, Status};
use clarifind::reveal::RevealPhase;
use clarifind::tui::{draw, App, Mode};
use clarifind::{DetailRegistry, NormalizedReport};

fn indicator(
    id: usize,
    code: &str,
    name_en: &str,
    status: Status,
    category: Category,
) -> NormalizedIndicator {
    NormalizedIndicator {
        display_id: id,
        code: code.to_string(),
        name_th: code.to_string(),
        name_en: name_en.to_string(),
        status,
        category,
        display_category: category.display_category(),
        description: None,
        updated_at: None,
        placeholder: false,
    }
}

fn revealed_app() -> App {
    let report = Arc::new(NormalizedReport::new(
        "0105551234567",
        "ACME CO., LTD.",
        vec![
            indicator(1, "ad10000", "Shared Address", Status::Fail, Category::SharedResources),
            indicator(2, "au10000", "Shared Auditor", Status::Pass, Category::SharedResources),
            indicator(3, "d40000", "Foreign Director", Status::Pass, Category::ForeignerControl),
        ],
    ));
    let mut app = App::new(DetailRegistry::default());
    app.load_report(report);
    app.reveal.phase = RevealPhase::Complete;
    app.reveal.displayed_categories = vec![Category::SharedResources, Category::ForeignerControl];
    app.reveal
        .displayed_by_category
        .insert(Category::SharedResources, vec!["ad10000".into(), "au10000".into()]);
    app.reveal
        .displayed_by_category
        .insert(Category::ForeignerControl, vec!["d40000".into()]);
    app
}

fn render(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
    terminal.draw(|f| draw(f, app)).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[test]
fn test_results_screen_shows_company_and_rows() {
    let app = revealed_app();
    let screen = render(&app);

    assert!(screen.contains("ACME CO., LTD."));
    assert!(screen.contains("0105551234567"));
    assert!(screen.contains("Shared Resources"));
    assert!(screen.contains("Foreigner Control"));
    assert!(screen.contains("Shared Address"));
    assert!(screen.contains("Shared Auditor"));
    assert!(screen.contains("Foreign Director"));
    // Only the fail row can expand
    assert!(screen.contains("Shared Address ▼"));
    assert!(!screen.contains("Shared Auditor ▼"));
}

#[test]
fn test_unrevealed_categories_are_hidden() {
    let mut app = revealed_app();
    app.reveal.phase = RevealPhase::RevealingCategory(1);
    app.reveal.displayed_categories = vec![Category::SharedResources];
    app.reveal.displayed_by_category.remove(&Category::ForeignerControl);

    let screen = render(&app);
    assert!(screen.contains("Shared Resources"));
    assert!(!screen.contains("Foreigner Control"));
    assert!(!screen.contains("Foreign Director"));
}

#[test]
fn test_expanded_row_shows_detail_error() {
    let mut app = revealed_app();
    app.expanded.insert("ad10000".into());
    app.details
        .insert("AD10000".into(), DetailState::Failed("exploded".into()));

    let screen = render(&app);
    assert!(screen.contains("Shared Address ▲"));
    assert!(screen.contains("exploded"));
}

#[test]
fn test_picker_lists_candidates() {
    let mut app = App::default();
    app.mode = Mode::Picking {
        candidates: vec![
            CompanyLite {
                registration_id: Some("0105551234567".into()),
                name_en: Some("ACME CO., LTD.".into()),
                ..Default::default()
            },
            CompanyLite {
                registration_id: Some("0105559999999".into()),
                name_en: Some("ACME TRADING".into()),
                ..Default::default()
            },
        ],
        selected: 1,
    };

    let screen = render(&app);
    assert!(screen.contains("ClariFind"));
    assert!(screen.contains("ACME TRADING"));
    assert!(screen.contains("0105559999999"));
}

#[test]
fn test_no_data_message_names_registration() {
    let mut app = App::default();
    app.mode = Mode::NoData("0105550000000".into());
    assert!(render(&app).contains("0105550000000"));
}

#[test]
fn test_display_category_is_derived() {
    let ind = indicator(1, "f10000", "", Status::Pass, Category::FinancialIndicators);
    assert_eq!(ind.display_category, DisplayCategory::Financial);
    assert_eq!(ind.title(), "f10000");
}
