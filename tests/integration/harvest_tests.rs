//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the registry site and test
//! fetching, pagination, the detail phase, and a full run end-to-end.

use ces_harvest::config::{
    parse_config, Config, DetailConfig, FetchConfig, HarvestConfig, OutputConfig,
};
use ces_harvest::harvest::{
    build_http_client, Coordinator, DetailHarvester, FetchFailure, Fetcher, Paginator, RetryPolicy,
};
use ces_harvest::output::{read_table, write_table, Table, STATUS_COLUMN};
use ces_harvest::records::{SummaryRecord, DETAIL_COLUMNS};
use ces_harvest::state::Category;
use chrono::NaiveDate;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at a mock server
fn create_test_config(base_url: &str, dir: &Path, categories: Vec<Category>) -> Config {
    Config {
        harvest: HarvestConfig {
            base_url: base_url.to_string(),
            categories,
        },
        fetch: FetchConfig {
            max_retries: 2,
            retry_sleep_ms: 0, // No waiting between attempts in tests
            request_timeout_secs: 5,
            ..FetchConfig::default()
        },
        detail: DetailConfig {
            concurrency: 3,
            progress_every: 2,
        },
        output: OutputConfig {
            directory: dir.to_path_buf(),
        },
    }
}

fn test_fetcher(max_attempts: u32) -> Fetcher {
    let client = build_http_client(&FetchConfig::default()).unwrap();
    Fetcher::with_client(client, RetryPolicy::fixed(max_attempts, Duration::ZERO))
}

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

/// Renders a listing page with the given `(slug, name)` entries
fn listing_page(base_url: &str, entries: &[(&str, &str)], pages: u32) -> String {
    let mut html = String::from("<html><body><main>");
    for (slug, name) in entries {
        html.push_str(&format!(
            r#"<article>
                <div class="layer-media"><a href="{base}/proyecto/{slug}/"><img src="{base}/img/{slug}.jpg"></a></div>
                <div class="layer-content">
                    <a href="{base}/proyecto/{slug}/">{name}</a>
                    <div>Mandante {name}</div>
                    <div>Arquitecto {name}</div>
                </div>
            </article>"#,
            base = base_url,
            slug = slug,
            name = name
        ));
    }
    if pages > 1 {
        html.push_str(r#"<div class="paginate">"#);
        for n in 1..=pages {
            html.push_str(&format!(r#"<a class="page-numbers" href="/page/{n}/">{n}</a>"#, n = n));
        }
        html.push_str(r#"<a class="next page-numbers" href="/page/2/">Siguiente</a></div>"#);
    }
    html.push_str("</main></body></html>");
    html
}

/// Renders a project page
fn project_page(name: &str, comuna: &str) -> String {
    format!(
        r#"<html><body>
            <h1 class="entry-title">{name}</h1>
            <time class="entry-date published" datetime="2022-08-15T12:30:00+00:00">15 agosto</time>
            <figure class="wp-block-image size-large"><img src="http://cdn.example.com/{comuna}.jpg"></figure>
            <div class="entry-content"><ul>
                <li><b>Mandante:</b> Mandante {name}</li>
                <li><b>Región:</b> Araucanía</li>
                <li><b>Comuna:</b> {comuna}</li>
                <li><b>Nivel obtenido:</b> Certificado</li>
            </ul></div>
        </body></html>"#,
        name = name,
        comuna = comuna
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_retries_exactly_max_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(4);
    let url = format!("{}/broken/", mock_server.uri());
    let err = fetcher.fetch(&url).await.unwrap_err();

    assert_eq!(err.attempts, 4);
    assert_eq!(err.last, FetchFailure::Status(500));
    assert_eq!(err.url, url);
    // The expectation of exactly 4 requests is verified when the server drops
}

#[tokio::test]
async fn test_fetch_recovers_after_transient_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(5);
    let body = fetcher
        .fetch(&format!("{}/flaky/", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_non_200_success_status_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empty/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&mock_server)
        .await;

    let err = test_fetcher(2)
        .fetch(&format!("{}/empty/", mock_server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.last, FetchFailure::Status(204));
}

#[tokio::test]
async fn test_page_count_degrades_to_one() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Unreachable first page
    Mock::given(method("GET"))
        .and(path("/en-proceso/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    // First page without a pagination block
    mount_page(
        &mock_server,
        "/sello-plus/",
        listing_page(&base_url, &[("uno", "Uno")], 1),
    )
    .await;

    // First page with markers up to 4
    mount_page(
        &mock_server,
        "/certificacion/",
        listing_page(&base_url, &[("dos", "Dos")], 4),
    )
    .await;

    let fetcher = test_fetcher(2);
    let paginator = Paginator::new(&base_url).unwrap();

    assert_eq!(paginator.page_count(&fetcher, Category::EnProceso).await, 1);
    assert_eq!(paginator.page_count(&fetcher, Category::SelloPlus).await, 1);
    assert_eq!(paginator.page_count(&fetcher, Category::Certificacion).await, 4);
}

#[tokio::test]
async fn test_detail_phase_tolerates_failed_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let mut summaries = Vec::new();
    for i in 0..10 {
        let route = format!("/proyecto/p{}/", i);
        if i == 3 || i == 7 {
            Mock::given(method("GET"))
                .and(path(route.as_str()))
                .respond_with(ResponseTemplate::new(404))
                .mount(&mock_server)
                .await;
        } else {
            mount_page(
                &mock_server,
                &route,
                project_page(&format!("Proyecto {}", i), "Temuco"),
            )
            .await;
        }

        summaries.push(SummaryRecord {
            name: format!("Proyecto {}", i),
            detail_url: format!("{}{}", base_url, route),
            image_url: None,
            mandante: None,
            arquitecto: None,
        });
    }

    let fetcher = test_fetcher(2);
    let outcome = DetailHarvester::new(&fetcher, 4, 3)
        .harvest(Category::EnProceso, &summaries)
        .await;

    assert_eq!(outcome.records.len(), 8);
    assert_eq!(outcome.failures.len(), 2);
    assert!(outcome
        .failures
        .iter()
        .all(|f| f.last == FetchFailure::Status(404)));

    // Records come back in listing order regardless of completion order
    let names: Vec<_> = outcome
        .records
        .iter()
        .map(|r| r.name.clone().unwrap())
        .collect();
    assert_eq!(names[0], "Proyecto 0");
    assert_eq!(names[3], "Proyecto 4");
    assert_eq!(names[7], "Proyecto 9");
}

#[tokio::test]
async fn test_full_harvest_run() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = tempdir().unwrap();

    // en-proceso: two listing pages, one project listed twice
    mount_page(
        &mock_server,
        "/en-proceso/",
        listing_page(&base_url, &[("casa-sur", "Casa Sur"), ("liceo", "Liceo")], 2),
    )
    .await;
    mount_page(
        &mock_server,
        "/en-proceso/page/2/",
        listing_page(&base_url, &[("liceo", "Liceo"), ("hospital", "Hospital")], 2),
    )
    .await;

    // certificacion: one page; Casa Sur is also listed here
    mount_page(
        &mock_server,
        "/certificacion/",
        listing_page(&base_url, &[("casa-sur", "Casa Sur")], 1),
    )
    .await;

    mount_page(&mock_server, "/proyecto/casa-sur/", project_page("Casa Sur", "Temuco")).await;
    mount_page(&mock_server, "/proyecto/liceo/", project_page("Liceo", "Angol")).await;
    mount_page(&mock_server, "/proyecto/hospital/", project_page("Hospital", "Victoria")).await;

    let config = create_test_config(
        &base_url,
        dir.path(),
        vec![Category::EnProceso, Category::Certificacion],
    );
    let coordinator = Coordinator::new(config, run_date()).unwrap();
    let report = coordinator.run().await;

    assert!(report.failed_categories().is_empty());
    assert_eq!(report.categories[0].total_pages, 2);
    assert_eq!(report.categories[0].summaries, 3);
    assert_eq!(report.categories[0].details, 3);
    assert_eq!(report.categories[1].summaries, 1);

    let outcome = report.consolidated.clone().unwrap();
    assert_eq!(
        outcome.path,
        dir.path().join("[CES]_Projects_Full_List-2024_05_01.csv")
    );
    assert_eq!(outcome.rows, 4);
    assert_eq!(outcome.sources, 2);

    let table = read_table(&outcome.path).unwrap();
    assert_eq!(table.headers[0], STATUS_COLUMN);
    assert_eq!(&table.headers[1..], &DETAIL_COLUMNS[..]);

    let status = table.column("status").unwrap();
    let name = table.column("project_name").unwrap();
    let comuna = table.column("comuna").unwrap();
    let region = table.column("region").unwrap();
    let image = table.column("project_image_url").unwrap();
    let date = table.column("project_entry_date").unwrap();

    let casa_sur: Vec<_> = table
        .rows
        .iter()
        .filter(|row| row[name] == "Casa Sur")
        .collect();
    assert_eq!(casa_sur.len(), 2);
    let mut statuses: Vec<_> = casa_sur.iter().map(|row| row[status].as_str()).collect();
    statuses.sort();
    assert_eq!(statuses, vec!["certificacion", "en-proceso"]);

    let row = casa_sur[0];
    assert_eq!(row[comuna], "Temuco");
    assert_eq!(row[region], "Araucanía");
    assert_eq!(row[image], "https://cdn.example.com/Temuco.jpg");
    assert_eq!(row[date], "2022-08-15");

    // Intermediates are purged; only the consolidated table is left
    let remaining: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(remaining, vec!["[CES]_Projects_Full_List-2024_05_01.csv"]);
}

#[tokio::test]
async fn test_category_failure_writes_diagnostic() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = tempdir().unwrap();

    // Three pages advertised; page 2 is down
    mount_page(
        &mock_server,
        "/pre-certificacion/",
        listing_page(&base_url, &[("escuela", "Escuela")], 3),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/pre-certificacion/page/2/"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pre-certificacion/page/3/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    // sello-plus still runs after the failure
    mount_page(
        &mock_server,
        "/sello-plus/",
        listing_page(&base_url, &[("faro", "Faro")], 1),
    )
    .await;

    mount_page(&mock_server, "/proyecto/escuela/", project_page("Escuela", "Lautaro")).await;
    mount_page(&mock_server, "/proyecto/faro/", project_page("Faro", "Arica")).await;

    let config = create_test_config(
        &base_url,
        dir.path(),
        vec![Category::PreCertificacion, Category::SelloPlus],
    );
    let report = Coordinator::new(config, run_date()).unwrap().run().await;

    assert_eq!(report.failed_categories(), vec![Category::PreCertificacion]);
    let failed = &report.categories[0];
    assert_eq!(failed.pages_harvested, 1);
    assert_eq!(failed.total_pages, 3);
    assert_eq!(failed.details, 1);

    let diagnostic =
        std::fs::read_to_string(dir.path().join("pre-certificacion_failed.txt")).unwrap();
    assert!(diagnostic.starts_with("Category pre-certificacion: the process stopped at page 2 out of 3."));
    assert!(diagnostic.contains("HTTP 502"));

    // Records collected before the failure still reach the final table
    let outcome = report.consolidated.unwrap();
    assert_eq!(outcome.rows, 2);
    let table = read_table(&outcome.path).unwrap();
    let statuses: Vec<_> = table.rows.iter().map(|r| r[0].clone()).collect();
    assert!(statuses.contains(&"pre-certificacion".to_string()));
    assert!(statuses.contains(&"sello-plus".to_string()));

    // The diagnostic is not an intermediate and survives the purge
    assert!(dir.path().join("pre-certificacion_failed.txt").exists());
}

#[tokio::test]
async fn test_misaligned_listing_fails_category() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = tempdir().unwrap();

    let body = format!(
        r#"<div class="layer-media"><a href="{base}/proyecto/a/"><img src="/a.jpg"></a></div>
           <div class="layer-content"><a>A</a><div>Solo mandante</div></div>"#,
        base = base_url
    );
    mount_page(&mock_server, "/en-proceso/", body).await;

    let config = create_test_config(&base_url, dir.path(), vec![Category::EnProceso]);
    let report = Coordinator::new(config, run_date()).unwrap().run().await;

    let category = &report.categories[0];
    assert!(!category.is_complete());
    assert_eq!(category.summaries, 0);
    assert!(report.consolidated.is_none());
    assert!(dir.path().join("en-proceso_failed.txt").exists());
}

#[tokio::test]
async fn test_consolidate_existing_artifacts() {
    let dir = tempdir().unwrap();

    let mut detail = Table::new(&DETAIL_COLUMNS);
    let mut row = vec![String::new(); DETAIL_COLUMNS.len()];
    row[0] = "Torre Norte".to_string();
    row[9] = "None".to_string();
    detail.rows.push(row.clone());
    detail.rows.push(row);
    write_table(&dir.path().join("2024_04_30-en-proceso-2.csv"), &detail).unwrap();
    write_table(
        &dir.path().join("2024_04_30-en-proceso-1.csv"),
        &Table::new(&["name", "url", "image", "mandante", "arquitecto"]),
    )
    .unwrap();

    let config = create_test_config("https://example.com/", dir.path(), Category::all());
    let coordinator = Coordinator::new(config, run_date()).unwrap();
    let outcome = coordinator.consolidate_existing().unwrap().unwrap();

    assert_eq!(outcome.rows, 1);
    let table = read_table(&outcome.path).unwrap();
    assert_eq!(table.rows[0][0], "en-proceso");
    assert_eq!(table.rows[0][10], "");
    assert!(!dir.path().join("2024_04_30-en-proceso-2.csv").exists());
    assert!(!dir.path().join("2024_04_30-en-proceso-1.csv").exists());
}

#[tokio::test]
async fn test_consolidation_with_no_artifacts_is_noop() {
    let dir = tempdir().unwrap();
    let config = create_test_config("https://example.com/", dir.path(), Category::all());
    let coordinator = Coordinator::new(config, run_date()).unwrap();

    assert!(coordinator.consolidate_existing().unwrap().is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_invalid_config_fails_before_network() {
    assert!(parse_config("[harvest]\ncategories = [\"bogus\"]\n").is_err());
    assert!(parse_config("[fetch]\nmax-retries = 0\n").is_err());
    assert!(parse_config("[detail]\nconcurrency = 0\n").is_err());
    assert!(parse_config("[harvest]\nbase-url = \"not a url\"\n").is_err());

    let dir = tempdir().unwrap();
    let mut config = create_test_config("https://example.com/", dir.path(), vec![]);
    assert!(Coordinator::new(config.clone(), run_date()).is_err());
    config.harvest.categories = vec![Category::EnProceso];
    assert!(Coordinator::new(config, run_date()).is_ok());
}
