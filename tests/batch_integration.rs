use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use chrono::NaiveDate;
use order_report::clients::DocumentModel;
use order_report::config::Config;
use order_report::error::{ExtractionError, GENERIC_EXTRACTION_ERROR};
use order_report::models::outcome::{BatchPhase, OutcomeStatus};
use order_report::models::{accept_pdfs, OrderRecord, Platform, UploadedFile};
use order_report::orchestrator::BatchProcessor;
use order_report::report::export::{export_report_at, ExportFormat};
use order_report::report::{RestaurantFilter, SummaryView};
use order_report::services::{ExtractionService, MockExtractor, MockResponse};
use order_report::utils::logging;

fn order(n: &str, platform: Platform) -> OrderRecord {
    OrderRecord {
        order_number: n.to_string(),
        restaurant_name: "Almada Fórum".to_string(),
        date: "05/03/2024".to_string(),
        time: "20:15".to_string(),
        customer_name: "N/A".to_string(),
        platform,
    }
}

fn pdf(name: &str) -> UploadedFile {
    UploadedFile::new(name, b"%PDF-1.4\n".to_vec())
}

/// 按文件名返回固定 JSON 的模型，名字里带 "broken" 的文件返回 500
struct ScriptedModel;

impl DocumentModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate<'a>(
        &'a self,
        file: &'a UploadedFile,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ExtractionError>> + Send + 'a>> {
        Box::pin(async move {
            if file.name.contains("broken") {
                return Err(ExtractionError::BadStatus {
                    backend: "scripted".to_string(),
                    status: 500,
                    body: "internal".to_string(),
                });
            }
            Ok(r#"```json
[
  {"orderNumber": "G-101", "restaurantName": "Rua Sérgio Malpique 2, Almada", "date": "Today", "time": "12:10", "customerName": null, "platform": "Glovo"},
  {"orderNumber": "G-102", "restaurantName": "Almada Fórum", "date": "Yesterday", "time": "13:40", "customerName": "Rita", "platform": "glovo"},
  {"orderNumber": "U-201", "restaurantName": "ALMADA FORUM", "date": "04/03/2024", "time": "19:05", "platform": "Uber Eats"}
]
```"#
                .to_string())
        })
    }
}

#[tokio::test]
async fn test_two_files_one_failure() {
    logging::init(false);

    let extractor = MockExtractor::with_sequence(vec![
        MockResponse::Orders(vec![
            order("G-1", Platform::Glovo),
            order("G-2", Platform::Glovo),
            order("U-1", Platform::UberEats),
        ]),
        MockResponse::Fail("upstream timeout".to_string()),
    ]);
    let mut processor = BatchProcessor::new(extractor);

    processor
        .run_batch(vec![pdf("glovo.pdf"), pdf("uber.pdf")])
        .await
        .unwrap();

    let state = processor.state();
    assert_eq!(state.phase(), BatchPhase::Completed);
    assert_eq!(state.outcomes().len(), 2);

    let first = &state.outcomes()[0];
    assert_eq!(first.status, OutcomeStatus::Success);
    assert_eq!(first.orders.len(), 3);

    let second = &state.outcomes()[1];
    assert_eq!(second.status, OutcomeStatus::Error);
    assert!(second.orders.is_empty());
    assert_eq!(second.error_message.as_deref(), Some(GENERIC_EXTRACTION_ERROR));

    let view = SummaryView::derive(state.outcomes(), &RestaurantFilter::new());
    assert_eq!(view.all_records.len(), 3);

    let row = view.crosstab.row("Almada Fórum").unwrap();
    assert_eq!(row.count(Platform::Glovo), 2);
    assert_eq!(row.count(Platform::UberEats), 1);
    assert_eq!(row.total, 3);
    assert_eq!(view.platforms_in_view, vec![Platform::UberEats, Platform::Glovo]);
}

#[tokio::test]
async fn test_extraction_service_end_to_end() {
    let service = ExtractionService::with_model(Box::new(ScriptedModel))
        .with_fallback_date(NaiveDate::from_ymd_opt(2024, 3, 5));
    let mut processor = BatchProcessor::new(service);

    processor
        .run_batch(vec![pdf("glovo.pdf"), pdf("broken.pdf")])
        .await
        .unwrap();

    let outcomes = processor.state().outcomes();
    assert_eq!(outcomes[0].status, OutcomeStatus::Success);
    assert_eq!(outcomes[1].status, OutcomeStatus::Error);

    let orders = &outcomes[0].orders;
    assert_eq!(orders.len(), 3);
    assert!(orders.iter().all(|o| o.restaurant_name == "Almada Fórum"));
    assert_eq!(orders[0].date, "05/03/2024");
    assert_eq!(orders[1].date, "04/03/2024");
    assert_eq!(orders[0].customer_name, "N/A");
    assert_eq!(orders[2].customer_name, "N/A");
    assert_eq!(orders[1].platform, Platform::Glovo);

    let view = SummaryView::derive(outcomes, &RestaurantFilter::new());
    let row = view.crosstab.row("Almada Fórum").unwrap();
    assert_eq!(row.count(Platform::Glovo), 2);
    assert_eq!(row.count(Platform::UberEats), 1);
    assert_eq!(row.total, 3);
}

#[tokio::test]
async fn test_empty_batch_has_no_summary() {
    let mut processor = BatchProcessor::new(MockExtractor::new(MockResponse::Orders(vec![])));
    processor.run_batch(Vec::new()).await.unwrap();

    assert_eq!(processor.state().phase(), BatchPhase::Completed);
    assert_eq!(processor.extractor().call_count(), 0);

    let view = SummaryView::derive(processor.state().outcomes(), &RestaurantFilter::new());
    assert!(!view.has_records());
    assert!(view.crosstab.rows.is_empty());
}

#[test]
fn test_non_pdf_files_are_discarded() {
    let files = vec![
        pdf("a.pdf"),
        UploadedFile::new("photo.png", vec![0x89, b'P', b'N', b'G']),
    ];
    let accepted = accept_pdfs(files).unwrap();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].name, "a.pdf");

    let only_images = vec![UploadedFile::new("photo.png", vec![0x89, b'P', b'N', b'G'])];
    assert!(accept_pdfs(only_images).is_err());
}

#[tokio::test]
async fn test_filtered_export() {
    let mut processor = BatchProcessor::new(MockExtractor::with_sequence(vec![
        MockResponse::Orders(vec![order("G-1", Platform::Glovo)]),
        MockResponse::Orders(vec![OrderRecord {
            restaurant_name: "Miraflores".to_string(),
            ..order("B-1", Platform::Bolt)
        }]),
    ]));
    processor
        .run_batch(vec![pdf("glovo.pdf"), pdf("bolt.pdf")])
        .await
        .unwrap();

    let filter: RestaurantFilter = ["Miraflores"].into_iter().collect();
    let view = SummaryView::derive(processor.state().outcomes(), &filter);

    let dir = tempfile::tempdir().unwrap();
    let generated_at = NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let path = export_report_at(&view, ExportFormat::Csv, dir.path(), generated_at).unwrap();

    assert_eq!(path.file_name().unwrap().to_str().unwrap(), "relatorio-pedidos-2024-03-05.csv");
    let csv = std::fs::read_to_string(path).unwrap();
    assert!(csv.contains("Bolt,B-1,Miraflores"));
    assert!(!csv.contains("G-1"));
    assert!(csv.contains("Restaurant,Bolt,Total"));
    assert!(csv.contains("Filtered restaurants: Miraflores"));
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_live_extraction() {
    logging::init(true);

    // 需要 GEMINI_API_KEY 和一个真实的订单报表 PDF
    let config = Config::from_env();
    let path = PathBuf::from(
        std::env::var("ORDER_REPORT_SAMPLE_PDF").unwrap_or_else(|_| "sample.pdf".to_string()),
    );
    let content = std::fs::read(&path).expect("读取样例 PDF 失败");

    let mut processor = BatchProcessor::new(ExtractionService::new(&config));
    processor
        .run_batch(vec![UploadedFile::new("sample.pdf", content)])
        .await
        .unwrap();

    assert_eq!(processor.state().outcomes()[0].status, OutcomeStatus::Success);
}
